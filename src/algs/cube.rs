//! Cubes: axis-aligned boxes embedding one simultaneous move.
//!
//! A cube over `n` tokens in a `dim`-dimensional embedding is a sequence of
//! `n·dim` closed integer intervals; block `t` (intervals `t·dim..(t+1)·dim`)
//! spans token `t`'s position before and after the move. A stationary token
//! contributes degenerate intervals `[c, c]`.

use std::fmt;

use hashbrown::HashSet;
use itertools::Itertools;

use crate::algs::moves::SimultaneousMove;
use crate::conf_error::ConfError;
use crate::debug_invariants::DebugInvariants;
use crate::topology::configuration::Configuration;
use crate::topology::downstream::DownstreamGraph;
use crate::topology::embedding::{Coord, Embedding};

/// Closed interval `[lo, hi]` with `lo ≤ hi`.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct Interval {
    pub lo: Coord,
    pub hi: Coord,
}

impl Interval {
    /// Interval spanned by two endpoints in either order.
    #[inline]
    pub fn spanning(a: Coord, b: Coord) -> Self {
        Interval {
            lo: a.min(b),
            hi: a.max(b),
        }
    }

    /// The single point `[c, c]`.
    #[inline]
    pub fn point(c: Coord) -> Self {
        Interval { lo: c, hi: c }
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.lo == self.hi
    }

    /// `true` if `self` is `other` or one of its endpoints.
    #[inline]
    pub fn is_face_of(&self, other: &Interval) -> bool {
        self == other || (self.is_degenerate() && (self.lo == other.lo || self.lo == other.hi))
    }
}

impl fmt::Debug for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lo, self.hi)
    }
}

/// Ordered interval sequence; equality and hashing are structural.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Cube(Vec<Interval>);

impl Cube {
    pub fn new(intervals: Vec<Interval>) -> Self {
        Cube(intervals)
    }

    /// Build from `(lo, hi)` pairs, normalizing their order.
    pub fn from_pairs(pairs: &[(Coord, Coord)]) -> Self {
        Cube(pairs.iter().map(|&(a, b)| Interval::spanning(a, b)).collect())
    }

    #[inline]
    pub fn intervals(&self) -> &[Interval] {
        &self.0
    }

    /// Number of intervals (`n·dim`).
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Geometric dimension: the number of non-degenerate intervals.
    pub fn dimension(&self) -> usize {
        self.0.iter().filter(|i| !i.is_degenerate()).count()
    }

    /// Intervals of token `t` in an embedding of dimension `dim`.
    pub fn token_block(&self, t: usize, dim: usize) -> Option<&[Interval]> {
        self.0.get(t * dim..(t + 1) * dim)
    }

    /// `true` if `self` is a face of `other` (a cube is a face of itself).
    pub fn is_face_of(&self, other: &Cube) -> bool {
        self.len() == other.len() && self.0.iter().zip(&other.0).all(|(a, b)| a.is_face_of(b))
    }

    /// `true` if `self` is a face of `other` and differs from it.
    pub fn is_proper_face_of(&self, other: &Cube) -> bool {
        self != other && self.is_face_of(other)
    }

    /// Every face of the cube, itself included.
    pub fn faces(&self) -> impl Iterator<Item = Cube> + use<> {
        self.0
            .iter()
            .map(|&i| {
                if i.is_degenerate() {
                    vec![i]
                } else {
                    vec![i, Interval::point(i.lo), Interval::point(i.hi)]
                }
            })
            .collect::<Vec<_>>()
            .into_iter()
            .multi_cartesian_product()
            .map(Cube)
    }

    /// Corner points (0-dimensional faces) as flat coordinate tuples.
    pub fn corners(&self) -> impl Iterator<Item = Vec<Coord>> + use<> {
        self.0
            .iter()
            .map(|&i| if i.is_degenerate() { vec![i.lo] } else { vec![i.lo, i.hi] })
            .collect::<Vec<_>>()
            .into_iter()
            .multi_cartesian_product()
    }
}

impl fmt::Debug for Cube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.0).finish()
    }
}

impl DebugInvariants for Cube {
    fn validate_invariants(&self) -> Result<(), ConfError> {
        match self.0.iter().position(|i| i.lo > i.hi) {
            Some(pos) => Err(ConfError::invariant(format!(
                "interval {pos} of {self:?} is reversed"
            ))),
            None => Ok(()),
        }
    }
}

/// A cube tagged with the configuration and move that produced it.
///
/// The tags are for diagnostics only; deduplication looks at the cube alone.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TaggedCube {
    pub configuration: Configuration,
    pub movement: SimultaneousMove,
    pub cube: Cube,
}

/// Converts simultaneous moves into cubes against a fixed graph model.
#[derive(Clone, Copy, Debug)]
pub struct CubeBuilder<'a> {
    embedding: &'a Embedding,
    downstream: &'a DownstreamGraph,
    k: usize,
}

impl<'a> CubeBuilder<'a> {
    pub fn new(embedding: &'a Embedding, downstream: &'a DownstreamGraph, k: usize) -> Self {
        Self {
            embedding,
            downstream,
            k,
        }
    }

    /// Embed `movement` applied to `config`.
    ///
    /// Every mover must take a single downstream step, no token may move
    /// twice, and the configuration after the move must be legal.
    pub fn build(
        &self,
        config: &Configuration,
        movement: &SimultaneousMove,
    ) -> Result<TaggedCube, ConfError> {
        let n = config.len();
        let vertex_count = self.downstream.vertex_count();
        let mut destination = vec![None; n];
        for &(t, dst) in movement.assignments() {
            let src = config.position(t)?;
            if !self.downstream.has_edge(src, dst) {
                return Err(ConfError::invariant(format!(
                    "token {t} moves {src} -> {dst}, which is not a downstream step"
                )));
            }
            if destination[t].replace(dst).is_some() {
                return Err(ConfError::invariant(format!(
                    "token {t} is moved twice from {config}"
                )));
            }
        }
        let after = config.apply(movement.assignments())?;
        after.validate(n, vertex_count, self.k).map_err(|e| {
            ConfError::invariant(format!("move {movement:?} from {config} is illegal: {e}"))
        })?;

        let dim = self.embedding.dimension();
        let mut intervals = Vec::with_capacity(n * dim);
        for (t, &src) in config.positions().iter().enumerate() {
            let from = self.embedding.try_coords(src)?;
            match destination[t] {
                None => intervals.extend(from.iter().map(|&c| Interval::point(c))),
                Some(dst) => {
                    let to = self.embedding.try_coords(dst)?;
                    intervals.extend(from.iter().zip(to).map(|(&a, &b)| Interval::spanning(a, b)));
                }
            }
        }
        Ok(TaggedCube {
            configuration: config.clone(),
            movement: movement.clone(),
            cube: Cube(intervals),
        })
    }
}

/// Owns the cube storage of one run; skips structurally repeated cubes.
#[derive(Clone, Debug, Default)]
pub struct CubeCollector {
    seen: HashSet<Cube>,
    cubes: Vec<TaggedCube>,
    offered: usize,
}

impl CubeCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `tagged` unless an equal cube is already stored. Returns `true`
    /// if it was new.
    pub fn push(&mut self, tagged: TaggedCube) -> bool {
        self.offered += 1;
        if self.seen.contains(&tagged.cube) {
            return false;
        }
        self.seen.insert(tagged.cube.clone());
        self.cubes.push(tagged);
        true
    }

    /// `true` if an equal cube is stored.
    pub fn contains(&self, cube: &Cube) -> bool {
        self.seen.contains(cube)
    }

    /// Distinct cubes stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.cubes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cubes.is_empty()
    }

    /// Cubes offered so far, repeats included.
    #[inline]
    pub fn offered(&self) -> usize {
        self.offered
    }

    /// Consume the collector, yielding cubes in first-seen order.
    pub fn into_cubes(self) -> Vec<TaggedCube> {
        self.cubes
    }
}

impl Extend<TaggedCube> for CubeCollector {
    fn extend<I: IntoIterator<Item = TaggedCube>>(&mut self, iter: I) {
        for tagged in iter {
            self.push(tagged);
        }
    }
}
