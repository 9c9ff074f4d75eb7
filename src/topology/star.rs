//! Star-graph generator: vertex numbering, embedding and downstream order.
//!
//! A `d`-star with `n` tokens has `d` arms of `n − 1` edges each meeting at a
//! center, for `V = 1 + d·(n − 1)` vertices. Numbering, for arm length
//! `m = n − 1`:
//!
//! ```text
//!  arm 0 (feeder)        center     arm 1 (outward)
//!  0 → 1 → … → m−1   →     m     →   m+1 → … → 2m
//!                          ↓
//!                     arm 2: 2m+1 → … → 3m     (and so on)
//! ```
//!
//! The feeder arm flows *into* the center, so vertex `0` roots the downstream
//! tree; every other arm flows outward and ends in a terminal vertex. The
//! embedding puts the center at the origin, arm 0 along axis 1, arm 1 along
//! axis 0 and arm `a ≥ 2` along axis `a`; a vertex's coordinate on its axis is
//! its distance from the center.

use crate::conf_error::ConfError;
use crate::debug_invariants::DebugInvariants;
use crate::topology::downstream::DownstreamGraph;
use crate::topology::embedding::{Coord, Embedding};
use crate::topology::vertex::VertexId;

/// Smallest supported arm count.
pub const MIN_ARMS: usize = 2;
/// Largest supported arm count.
pub const MAX_ARMS: usize = 4;

/// Shape parameters of a star graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct StarShape {
    /// Number of arms `d`.
    pub arms: usize,
    /// Number of tokens `n`; each arm has `n − 1` edges.
    pub points: usize,
}

impl StarShape {
    /// Validate and construct a shape.
    pub fn try_new(arms: usize, points: usize) -> Result<Self, ConfError> {
        if arms < MIN_ARMS {
            return Err(ConfError::invalid(
                "arms",
                to_i64(arms),
                "a star needs at least 2 arms",
            ));
        }
        if arms > MAX_ARMS {
            return Err(ConfError::invalid(
                "arms",
                to_i64(arms),
                "only 2-, 3- and 4-armed stars are supported",
            ));
        }
        if points < 1 {
            return Err(ConfError::invalid("n", 0, "at least one token is required"));
        }
        Ok(Self { arms, points })
    }

    /// Edges per arm.
    #[inline]
    pub fn arm_length(&self) -> usize {
        self.points - 1
    }

    /// `1 + d·(n − 1)`.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        1 + self.arms * self.arm_length()
    }

    /// Embedding dimension (one axis per arm).
    #[inline]
    pub fn dimension(&self) -> usize {
        self.arms
    }

    /// The center vertex.
    #[inline]
    pub fn center(&self) -> VertexId {
        VertexId::new(self.arm_length() as u32)
    }

    /// Axis carrying `arm`.
    #[inline]
    fn axis(arm: usize) -> usize {
        match arm {
            0 => 1,
            1 => 0,
            a => a,
        }
    }

    /// Vertex `steps` edges away from the center along `arm` (`1 ≤ steps ≤ m`).
    fn vertex_on_arm(&self, arm: usize, steps: usize) -> usize {
        let m = self.arm_length();
        if arm == 0 {
            m - steps
        } else {
            m + (arm - 1) * m + steps
        }
    }
}

pub(crate) fn to_i64(x: usize) -> i64 {
    i64::try_from(x).unwrap_or(i64::MAX)
}

/// The immutable graph model shared by every pipeline stage.
#[derive(Clone, Debug)]
pub struct StarGraph {
    shape: StarShape,
    embedding: Embedding,
    downstream: DownstreamGraph,
}

impl StarGraph {
    /// Build the `arms`-star for `n` tokens.
    ///
    /// ```rust
    /// # use star_conf::topology::star::StarGraph;
    /// # use star_conf::topology::vertex::VertexId;
    /// let g = StarGraph::build(3, 3).unwrap();
    /// assert_eq!(g.vertex_count(), 7);
    /// assert_eq!(g.downstream().targets(VertexId::new(2)), &[VertexId::new(3), VertexId::new(5)]);
    /// ```
    pub fn build(arms: usize, n: usize) -> Result<Self, ConfError> {
        Self::from_shape(StarShape::try_new(arms, n)?)
    }

    /// Build from an already validated shape.
    pub fn from_shape(shape: StarShape) -> Result<Self, ConfError> {
        let m = shape.arm_length();
        let v_count = shape.vertex_count();
        let dim = shape.dimension();

        let mut points = vec![vec![0 as Coord; dim]; v_count];
        let mut lists: Vec<Vec<VertexId>> = vec![Vec::new(); v_count];
        let id = |i: usize| {
            VertexId::from_index(i).ok_or_else(|| ConfError::invariant("vertex count exceeds u32"))
        };

        for arm in 0..shape.arms {
            let axis = StarShape::axis(arm);
            for steps in 1..=m {
                let v = shape.vertex_on_arm(arm, steps);
                points[v][axis] = to_i64(steps);
                if arm == 0 {
                    // feeder arm flows toward the center
                    lists[v].push(id(v + 1)?);
                } else if steps < m {
                    lists[v].push(id(v + 1)?);
                }
            }
            if arm > 0 && m > 0 {
                lists[m].push(id(shape.vertex_on_arm(arm, 1))?);
            }
        }

        let graph = Self {
            shape,
            embedding: Embedding::try_new(dim, points)?,
            downstream: DownstreamGraph::from_adjacency(lists)?,
        };
        crate::debug_invariants!(graph.validate_invariants(), "star graph");
        Ok(graph)
    }

    #[inline]
    pub fn shape(&self) -> StarShape {
        self.shape
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.shape.vertex_count()
    }

    #[inline]
    pub fn center(&self) -> VertexId {
        self.shape.center()
    }

    #[inline]
    pub fn embedding(&self) -> &Embedding {
        &self.embedding
    }

    #[inline]
    pub fn downstream(&self) -> &DownstreamGraph {
        &self.downstream
    }

    /// Split into the two shared views consumed by the pipeline.
    pub fn into_parts(self) -> (Embedding, DownstreamGraph) {
        (self.embedding, self.downstream)
    }

    /// Vertices of `arm` ordered from the center outward.
    pub fn arm_vertices(&self, arm: usize) -> Vec<VertexId> {
        if arm >= self.shape.arms {
            return Vec::new();
        }
        (1..=self.shape.arm_length())
            .map(|s| VertexId::new(self.shape.vertex_on_arm(arm, s) as u32))
            .collect()
    }

    /// Terminal vertices (ends of the outward arms).
    pub fn terminals(&self) -> Vec<VertexId> {
        self.downstream
            .vertices()
            .filter(|&v| self.downstream.is_terminal(v))
            .collect()
    }
}

impl DebugInvariants for StarGraph {
    fn validate_invariants(&self) -> Result<(), ConfError> {
        self.embedding.validate_invariants()?;
        self.downstream.validate_invariants()?;
        let v_count = self.shape.vertex_count();
        if self.embedding.vertex_count() != v_count || self.downstream.vertex_count() != v_count {
            return Err(ConfError::invariant("graph parts disagree on vertex count"));
        }
        // a tree on V vertices rooted at vertex 0
        if v_count > 1 && self.downstream.edge_count() != v_count - 1 {
            return Err(ConfError::invariant(format!(
                "expected {} downstream edges, found {}",
                v_count - 1,
                self.downstream.edge_count()
            )));
        }
        if self.embedding.coords(self.center()).iter().any(|&c| c != 0) {
            return Err(ConfError::invariant("center is not at the origin"));
        }
        for (from, to) in self.downstream.edges() {
            let a = self.embedding.coords(from);
            let b = self.embedding.coords(to);
            let dist: Coord = a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum();
            if dist != 1 {
                return Err(ConfError::invariant(format!(
                    "edge {from} -> {to} is not a unit step in the embedding"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(raw: u32) -> VertexId {
        VertexId::new(raw)
    }

    #[test]
    fn y_graph_layout() {
        let g = StarGraph::build(3, 3).unwrap();
        assert_eq!(g.vertex_count(), 7);
        assert_eq!(g.center(), v(2));
        let e = g.embedding();
        let expected: [[Coord; 3]; 7] = [
            [0, 2, 0],
            [0, 1, 0],
            [0, 0, 0],
            [1, 0, 0],
            [2, 0, 0],
            [0, 0, 1],
            [0, 0, 2],
        ];
        for (i, p) in expected.iter().enumerate() {
            assert_eq!(e.coords(v(i as u32)), p, "vertex {i}");
        }
        let d = g.downstream();
        assert_eq!(d.targets(v(0)), &[v(1)]);
        assert_eq!(d.targets(v(1)), &[v(2)]);
        assert_eq!(d.targets(v(2)), &[v(3), v(5)]);
        assert_eq!(d.targets(v(3)), &[v(4)]);
        assert!(d.is_terminal(v(4)));
        assert_eq!(d.targets(v(5)), &[v(6)]);
        assert!(d.is_terminal(v(6)));
        assert_eq!(g.terminals(), vec![v(4), v(6)]);
    }

    #[test]
    fn x_graph_has_three_outward_arms() {
        let g = StarGraph::build(4, 2).unwrap();
        assert_eq!(g.vertex_count(), 5);
        assert_eq!(g.center(), v(1));
        assert_eq!(g.downstream().targets(v(1)), &[v(2), v(3), v(4)]);
        assert_eq!(g.embedding().coords(v(0)), &[0, 1, 0, 0]);
        assert_eq!(g.embedding().coords(v(4)), &[0, 0, 0, 1]);
        assert_eq!(g.arm_vertices(3), vec![v(4)]);
    }

    #[test]
    fn interval_is_a_path() {
        let g = StarGraph::build(2, 3).unwrap();
        assert_eq!(g.vertex_count(), 5);
        let edges: Vec<_> = g.downstream().edges().collect();
        assert_eq!(edges, vec![(v(0), v(1)), (v(1), v(2)), (v(2), v(3)), (v(3), v(4))]);
        assert_eq!(g.arm_vertices(0), vec![v(1), v(0)]);
    }

    #[test]
    fn single_token_star_is_one_vertex() {
        let g = StarGraph::build(3, 1).unwrap();
        assert_eq!(g.vertex_count(), 1);
        assert_eq!(g.downstream().edge_count(), 0);
        assert_eq!(g.embedding().coords(v(0)), &[0, 0, 0]);
    }

    #[test]
    fn rejects_unsupported_shapes() {
        assert!(matches!(
            StarGraph::build(1, 3),
            Err(ConfError::InvalidParameter { name: "arms", .. })
        ));
        assert!(matches!(
            StarGraph::build(5, 3),
            Err(ConfError::InvalidParameter { name: "arms", .. })
        ));
        assert!(matches!(
            StarGraph::build(3, 0),
            Err(ConfError::InvalidParameter { name: "n", .. })
        ));
    }

    #[test]
    fn every_supported_shape_validates() {
        for arms in MIN_ARMS..=MAX_ARMS {
            for n in 1..6 {
                let g = StarGraph::build(arms, n).unwrap();
                g.validate_invariants().unwrap();
            }
        }
    }
}
