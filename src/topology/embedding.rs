//! Integer embedding of star-graph vertices into coordinate space.
//!
//! Coordinates are stored row-major with a fixed dimension per vertex. The
//! map is injective, so a coordinate tuple decodes back to its vertex.

use hashbrown::HashMap;

use crate::conf_error::ConfError;
use crate::debug_invariants::DebugInvariants;
use crate::topology::vertex::VertexId;

/// Coordinate type of the embedding and of cube intervals.
pub type Coord = i64;

/// Immutable vertex → point map with a fixed dimension.
#[derive(Clone, Debug)]
pub struct Embedding {
    dimension: usize,
    coords: Vec<Coord>,
    vertex_of: HashMap<Box<[Coord]>, VertexId>,
}

impl Embedding {
    /// Construct an embedding from one point per vertex (vertex `i` ↦ `points[i]`).
    ///
    /// Every point must have length `dimension` and no two vertices may share
    /// a point.
    pub fn try_new(dimension: usize, points: Vec<Vec<Coord>>) -> Result<Self, ConfError> {
        if dimension == 0 {
            return Err(ConfError::invalid("dimension", 0, "embedding dimension must be non-zero"));
        }
        let mut coords = Vec::with_capacity(points.len() * dimension);
        let mut vertex_of = HashMap::with_capacity(points.len());
        for (idx, point) in points.into_iter().enumerate() {
            if point.len() != dimension {
                return Err(ConfError::DimensionMismatch {
                    expected: dimension,
                    found: point.len(),
                });
            }
            let v = VertexId::from_index(idx)
                .ok_or_else(|| ConfError::invariant("vertex count exceeds u32"))?;
            coords.extend_from_slice(&point);
            if let Some(prev) = vertex_of.insert(point.into_boxed_slice(), v) {
                return Err(ConfError::invariant(format!(
                    "vertices {prev} and {v} share an embedded point"
                )));
            }
        }
        Ok(Self {
            dimension,
            coords,
            vertex_of,
        })
    }

    /// Returns the spatial dimension per vertex.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.coords.len() / self.dimension
    }

    /// Coordinates of `v`.
    ///
    /// # Panics
    /// Panics if `v` is not a vertex of the embedding; see
    /// [`try_coords`](Self::try_coords).
    #[inline]
    pub fn coords(&self, v: VertexId) -> &[Coord] {
        let start = v.index() * self.dimension;
        &self.coords[start..start + self.dimension]
    }

    /// Read-only view of the coordinate slice for `v`.
    pub fn try_coords(&self, v: VertexId) -> Result<&[Coord], ConfError> {
        if v.index() >= self.vertex_count() {
            return Err(ConfError::VertexOutOfRange {
                vertex: v,
                vertex_count: self.vertex_count(),
            });
        }
        Ok(self.coords(v))
    }

    /// Inverse lookup: the vertex embedded at `point`, if any.
    #[inline]
    pub fn vertex_at(&self, point: &[Coord]) -> Option<VertexId> {
        self.vertex_of.get(point).copied()
    }
}

impl DebugInvariants for Embedding {
    fn validate_invariants(&self) -> Result<(), ConfError> {
        if self.coords.len() % self.dimension != 0 {
            return Err(ConfError::invariant("coordinate storage is not a whole number of points"));
        }
        if self.vertex_of.len() != self.vertex_count() {
            return Err(ConfError::invariant("embedding is not injective"));
        }
        for idx in 0..self.vertex_count() {
            let v = VertexId::from_index(idx)
                .ok_or_else(|| ConfError::invariant("vertex count exceeds u32"))?;
            if self.vertex_at(self.coords(v)) != Some(v) {
                return Err(ConfError::invariant(format!("inverse lookup broken for {v}")));
            }
        }
        Ok(())
    }
}
