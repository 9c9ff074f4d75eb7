//! Lazy enumeration of legal configurations (the 0-cells of the complex).
//!
//! Configurations are produced in lexicographic order of the token positions.
//! The iterator is an odometer over `[0, V)^n` that keeps a running occupancy
//! histogram, so memory stays `O(n + V)` however many configurations exist.

use crate::topology::configuration::Configuration;
use crate::topology::vertex::VertexId;

/// Every length-`n` configuration over `vertex_count` vertices in which no
/// vertex holds `k` or more tokens.
pub fn enumerate(vertex_count: usize, n: usize, k: usize) -> Configurations {
    Configurations::new(vertex_count, n, k)
}

/// Iterator returned by [`enumerate`].
#[derive(Clone, Debug)]
pub struct Configurations {
    digits: Vec<u32>,
    counts: Vec<usize>,
    /// Vertices currently holding `k` or more tokens.
    overfull: usize,
    vertex_count: u32,
    k: usize,
    exhausted: bool,
}

impl Configurations {
    pub fn new(vertex_count: usize, n: usize, k: usize) -> Self {
        let vertex_count = u32::try_from(vertex_count).unwrap_or(u32::MAX);
        let mut counts = vec![0usize; vertex_count as usize];
        let mut overfull = 0;
        if let Some(c) = counts.first_mut() {
            *c = n;
            if n >= k {
                overfull = 1;
            }
        }
        Self {
            digits: vec![0; n],
            counts,
            overfull,
            vertex_count,
            k,
            // an empty configuration is only legal if k > 0
            exhausted: (vertex_count == 0 && n > 0) || k == 0,
        }
    }

    /// Upper bound on the remaining number of sequences, legal or not
    /// (`None` on overflow).
    pub fn sequence_space(&self) -> Option<u64> {
        u64::from(self.vertex_count).checked_pow(u32::try_from(self.digits.len()).ok()?)
    }

    fn bump(&mut self, old: u32, new: u32) {
        let k = self.k;
        let old_c = &mut self.counts[old as usize];
        if *old_c == k {
            self.overfull -= 1;
        }
        *old_c -= 1;
        let new_c = &mut self.counts[new as usize];
        *new_c += 1;
        if *new_c == k {
            self.overfull += 1;
        }
    }

    /// Advance the odometer by one; returns `false` once it wraps around.
    fn advance(&mut self) -> bool {
        for pos in (0..self.digits.len()).rev() {
            let old = self.digits[pos];
            if old + 1 < self.vertex_count {
                self.digits[pos] = old + 1;
                self.bump(old, old + 1);
                return true;
            }
            self.digits[pos] = 0;
            self.bump(old, 0);
        }
        false
    }
}

impl Iterator for Configurations {
    type Item = Configuration;

    fn next(&mut self) -> Option<Configuration> {
        while !self.exhausted {
            let current = (self.overfull == 0).then(|| {
                Configuration::new(self.digits.iter().copied().map(VertexId::new).collect())
            });
            if !self.advance() {
                self.exhausted = true;
            }
            if current.is_some() {
                return current;
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.exhausted {
            return (0, Some(0));
        }
        let upper = self.sequence_space().and_then(|s| usize::try_from(s).ok());
        (0, upper)
    }
}

impl std::iter::FusedIterator for Configurations {}
