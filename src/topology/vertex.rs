//! `VertexId`: a strong, zero-cost handle for star-graph vertices
//!
//! Vertices of a star graph are numbered densely from `0`, so unlike a mesh
//! point there is no reserved sentinel value. The numbering carries meaning:
//! every downstream edge goes from a lower id to a strictly higher one.
//!
//! This module provides:
//! - A transparent `VertexId` newtype around `u32`.
//! - Conversions to and from dense `usize` indices.
//! - `Debug`/`Display`, ordering and hashing so ids can key maps and sets.

use std::fmt;

/// Dense vertex handle; `repr(transparent)` over `u32`.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct VertexId(u32);

impl VertexId {
    /// Creates a new `VertexId` from a raw index.
    ///
    /// ```rust
    /// # use star_conf::topology::vertex::VertexId;
    /// let v = VertexId::new(3);
    /// assert_eq!(v.get(), 3);
    /// ```
    #[inline]
    pub const fn new(raw: u32) -> Self {
        VertexId(raw)
    }

    /// Returns the raw `u32` id.
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns the id as a dense index into per-vertex arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Builds an id from a dense index; `None` if it does not fit in `u32`.
    #[inline]
    pub fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(VertexId)
    }
}

impl From<u32> for VertexId {
    #[inline]
    fn from(raw: u32) -> Self {
        VertexId(raw)
    }
}

impl fmt::Debug for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("VertexId").field(&self.0).finish()
    }
}

/// Prints only the raw integer.
impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_roundtrip() {
        let v = VertexId::new(42);
        assert_eq!(v.index(), 42);
        assert_eq!(VertexId::from_index(42), Some(v));
        assert_eq!(VertexId::from_index(usize::MAX), None);
    }

    #[test]
    fn debug_and_display() {
        let v = VertexId::new(7);
        assert_eq!(format!("{:?}", v), "VertexId(7)");
        assert_eq!(format!("{}", v), "7");
    }

    #[test]
    fn ordering_follows_raw_id() {
        let mut ids = vec![VertexId::new(5), VertexId::new(0), VertexId::new(3)];
        ids.sort();
        assert_eq!(ids, vec![VertexId::new(0), VertexId::new(3), VertexId::new(5)]);
    }

    #[test]
    fn json_is_a_bare_integer() {
        let v = VertexId::new(123);
        let s = serde_json::to_string(&v).unwrap();
        assert_eq!(s, "123");
        let back: VertexId = serde_json::from_str(&s).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn bincode_roundtrip() {
        let v = VertexId::new(456);
        let bytes = bincode::serialize(&v).unwrap();
        let back: VertexId = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, v);
    }
}
