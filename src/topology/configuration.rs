//! Token configurations: which vertex each labelled token occupies.
//!
//! A configuration is *legal* for a capacity bound `k` when no vertex holds
//! `k` or more tokens. For `k = 2` that is plain injectivity.

use std::fmt;

use crate::conf_error::ConfError;
use crate::topology::vertex::VertexId;

/// Position of every token; entry `t` is the vertex holding token `t`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Configuration(Vec<VertexId>);

impl Configuration {
    #[inline]
    pub fn new(positions: Vec<VertexId>) -> Self {
        Configuration(positions)
    }

    /// Convenience constructor from raw vertex ids.
    pub fn from_raw(raw: &[u32]) -> Self {
        Configuration(raw.iter().copied().map(VertexId::new).collect())
    }

    /// Number of tokens.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn positions(&self) -> &[VertexId] {
        &self.0
    }

    /// Vertex holding token `t`.
    pub fn position(&self, t: usize) -> Result<VertexId, ConfError> {
        self.0.get(t).copied().ok_or(ConfError::TokenOutOfRange {
            token: t,
            tokens: self.0.len(),
        })
    }

    /// Tokens per vertex over a graph of `vertex_count` vertices.
    pub fn occupancy(&self, vertex_count: usize) -> Result<Occupancy, ConfError> {
        let mut counts = vec![0usize; vertex_count];
        for &v in &self.0 {
            *counts.get_mut(v.index()).ok_or(ConfError::VertexOutOfRange {
                vertex: v,
                vertex_count,
            })? += 1;
        }
        Ok(Occupancy(counts))
    }

    /// Tokens resident at each vertex, in increasing token order.
    pub fn location_list(&self, vertex_count: usize) -> Result<Vec<Vec<usize>>, ConfError> {
        let mut out = vec![Vec::new(); vertex_count];
        for (t, &v) in self.0.iter().enumerate() {
            out.get_mut(v.index())
                .ok_or(ConfError::VertexOutOfRange {
                    vertex: v,
                    vertex_count,
                })?
                .push(t);
        }
        Ok(out)
    }

    /// Tokens resident at `v`, in increasing token order.
    pub fn residents(&self, v: VertexId) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(t, &p)| (p == v).then_some(t))
            .collect()
    }

    /// `true` if no vertex holds `k` or more tokens.
    pub fn is_legal(&self, k: usize) -> bool {
        let mut sorted = self.0.clone();
        sorted.sort_unstable();
        sorted.chunk_by(|a, b| a == b).all(|run| run.len() < k)
    }

    /// Check length, vertex range and legality in one pass.
    pub fn validate(&self, n: usize, vertex_count: usize, k: usize) -> Result<(), ConfError> {
        if self.0.len() != n {
            return Err(ConfError::ConfigurationLength {
                expected: n,
                found: self.0.len(),
            });
        }
        let occ = self.occupancy(vertex_count)?;
        if let Some((v, count)) = occ.iter().find(|&(_, c)| c >= k) {
            return Err(ConfError::invariant(format!(
                "configuration {self} holds {count} tokens at vertex {v} (k = {k})"
            )));
        }
        Ok(())
    }

    /// The configuration after every `(token, destination)` pair is applied.
    pub fn apply<'a, I>(&self, moves: I) -> Result<Configuration, ConfError>
    where
        I: IntoIterator<Item = &'a (usize, VertexId)>,
    {
        let mut next = self.0.clone();
        for &(t, dst) in moves {
            let slot = next.get_mut(t).ok_or(ConfError::TokenOutOfRange {
                token: t,
                tokens: self.0.len(),
            })?;
            *slot = dst;
        }
        Ok(Configuration(next))
    }
}

impl From<Vec<VertexId>> for Configuration {
    fn from(positions: Vec<VertexId>) -> Self {
        Configuration(positions)
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Configuration").field(&self.to_string()).finish()
    }
}

/// Prints as `[5, 2, 2]`.
impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, "]")
    }
}

/// Token count per vertex for one configuration snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Occupancy(Vec<usize>);

impl Occupancy {
    /// Tokens at `v` (zero for vertices outside the graph).
    #[inline]
    pub fn get(&self, v: VertexId) -> usize {
        self.0.get(v.index()).copied().unwrap_or(0)
    }

    /// `(vertex, count)` for every occupied vertex, ascending.
    pub fn iter(&self) -> impl Iterator<Item = (VertexId, usize)> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c > 0)
            .map(|(i, &c)| (VertexId::new(i as u32), c))
    }

    /// Largest per-vertex count.
    pub fn max(&self) -> usize {
        self.0.iter().copied().max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(raw: u32) -> VertexId {
        VertexId::new(raw)
    }

    #[test]
    fn legality_is_strictly_below_k() {
        let c = Configuration::from_raw(&[5, 2, 2]);
        assert!(c.is_legal(3));
        assert!(!c.is_legal(2));
        assert!(Configuration::from_raw(&[0, 1, 2]).is_legal(2));
        assert!(!Configuration::from_raw(&[0]).is_legal(1));
    }

    #[test]
    fn occupancy_and_residents() {
        let c = Configuration::from_raw(&[5, 2, 2]);
        let occ = c.occupancy(7).unwrap();
        assert_eq!(occ.get(v(2)), 2);
        assert_eq!(occ.get(v(5)), 1);
        assert_eq!(occ.get(v(6)), 0);
        assert_eq!(occ.iter().collect::<Vec<_>>(), vec![(v(2), 2), (v(5), 1)]);
        assert_eq!(occ.max(), 2);
        assert_eq!(c.residents(v(2)), vec![1, 2]);
        let locations = c.location_list(7).unwrap();
        assert_eq!(locations[2], vec![1, 2]);
        assert_eq!(locations[5], vec![0]);
    }

    #[test]
    fn out_of_range_vertex_is_reported() {
        let c = Configuration::from_raw(&[9]);
        assert_eq!(
            c.occupancy(7).unwrap_err(),
            ConfError::VertexOutOfRange {
                vertex: v(9),
                vertex_count: 7
            }
        );
    }

    #[test]
    fn validate_checks_length_and_capacity() {
        let c = Configuration::from_raw(&[1, 1]);
        assert!(matches!(
            c.validate(3, 4, 2),
            Err(ConfError::ConfigurationLength { expected: 3, found: 2 })
        ));
        assert!(matches!(c.validate(2, 4, 2), Err(ConfError::InvariantViolation(_))));
        assert!(c.validate(2, 4, 3).is_ok());
    }

    #[test]
    fn apply_moves_tokens() {
        let c = Configuration::from_raw(&[5, 2, 2]);
        let next = c.apply(&[(1, v(3)), (0, v(6))]).unwrap();
        assert_eq!(next, Configuration::from_raw(&[6, 3, 2]));
        assert!(c.apply(&[(3, v(0))]).is_err());
        assert_eq!(next.to_string(), "[6, 3, 2]");
    }
}
