//! Frozen CSR (Compressed Sparse Row) representation of the downstream order.
//!
//! The downstream graph says where a token may move in a single step. Every
//! edge points from a lower vertex id to a strictly higher one, which makes
//! the graph acyclic and turns each move into a canonical, non-repeating
//! derivation. Target lists are sorted, so iteration order is deterministic.

use std::sync::Arc;

use crate::conf_error::ConfError;
use crate::debug_invariants::DebugInvariants;
use crate::topology::vertex::VertexId;

/// Immutable downstream adjacency backed by CSR arrays.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownstreamGraph {
    /// `offsets[v]..offsets[v + 1]` indexes the targets of vertex `v`.
    offsets: Arc<[u32]>,
    targets: Arc<[VertexId]>,
}

impl DownstreamGraph {
    /// Freeze per-vertex target lists into CSR form.
    ///
    /// Each list is sorted; an edge that does not go strictly downstream or
    /// leaves the vertex range is rejected.
    pub fn from_adjacency(lists: Vec<Vec<VertexId>>) -> Result<Self, ConfError> {
        let vertex_count = lists.len();
        let mut offsets = Vec::with_capacity(vertex_count + 1);
        let mut targets = Vec::new();
        offsets.push(0u32);
        for (src, mut list) in lists.into_iter().enumerate() {
            list.sort_unstable();
            list.dedup();
            for &dst in &list {
                if dst.index() >= vertex_count {
                    return Err(ConfError::VertexOutOfRange {
                        vertex: dst,
                        vertex_count,
                    });
                }
                if dst.index() <= src {
                    return Err(ConfError::invariant(format!(
                        "edge {src} -> {dst} does not point downstream"
                    )));
                }
            }
            targets.extend(list);
            let end = u32::try_from(targets.len())
                .map_err(|_| ConfError::invariant("downstream graph exceeds u32 edges"))?;
            offsets.push(end);
        }
        Ok(Self {
            offsets: offsets.into(),
            targets: targets.into(),
        })
    }

    /// Number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Number of downstream edges.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.targets.len()
    }

    /// Sorted downstream targets of `v`; empty for terminal or unknown vertices.
    #[inline]
    pub fn targets(&self, v: VertexId) -> &[VertexId] {
        let i = v.index();
        if i >= self.vertex_count() {
            return &[];
        }
        &self.targets[self.offsets[i] as usize..self.offsets[i + 1] as usize]
    }

    /// Checked variant of [`targets`](Self::targets).
    pub fn try_targets(&self, v: VertexId) -> Result<&[VertexId], ConfError> {
        if v.index() >= self.vertex_count() {
            return Err(ConfError::VertexOutOfRange {
                vertex: v,
                vertex_count: self.vertex_count(),
            });
        }
        Ok(self.targets(v))
    }

    /// `true` if a token at `v` can never move.
    #[inline]
    pub fn is_terminal(&self, v: VertexId) -> bool {
        self.targets(v).is_empty()
    }

    /// `true` if `to` is one downstream step from `from`.
    #[inline]
    pub fn has_edge(&self, from: VertexId, to: VertexId) -> bool {
        self.targets(from).binary_search(&to).is_ok()
    }

    /// All vertices in id order.
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.vertex_count() as u32).map(VertexId::new)
    }

    /// All edges `(from, to)` in CSR order.
    pub fn edges(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        self.vertices()
            .flat_map(move |v| self.targets(v).iter().map(move |&t| (v, t)))
    }
}

impl DebugInvariants for DownstreamGraph {
    fn validate_invariants(&self) -> Result<(), ConfError> {
        if self.offsets.first() != Some(&0) {
            return Err(ConfError::invariant("CSR offsets must start at 0"));
        }
        if self.offsets.windows(2).any(|w| w[0] > w[1]) {
            return Err(ConfError::invariant("CSR offsets must be non-decreasing"));
        }
        if self.offsets.last().map(|&o| o as usize) != Some(self.targets.len()) {
            return Err(ConfError::invariant("CSR offsets must end at the edge count"));
        }
        for v in self.vertices() {
            let ts = self.targets(v);
            if ts.windows(2).any(|w| w[0] >= w[1]) {
                return Err(ConfError::invariant(format!(
                    "targets of {v} are not strictly sorted"
                )));
            }
            if let Some(&t) = ts.iter().find(|t| **t <= v) {
                return Err(ConfError::invariant(format!(
                    "edge {v} -> {t} does not point downstream"
                )));
            }
        }
        Ok(())
    }
}
