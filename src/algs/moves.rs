//! Simultaneous moves: one local move per planned vertex, expanded into
//! concrete token → destination assignments.
//!
//! Tokens are distinguishable, so for a local move `{3: 1, 5: 1}` at a vertex
//! holding tokens `1, 2` both "1 → 3, 2 → 5" and "2 → 3, 1 → 5" are produced;
//! they lead to different cubes. Selections are ordered (permutations without
//! repetition), which may repeat a cube when several tokens share a target;
//! the cube collector removes those repeats.

use itertools::{Either, Itertools};

use crate::algs::capacity::{CapacityMap, VertexPlan};
use crate::conf_error::ConfError;
use crate::topology::configuration::Configuration;
use crate::topology::vertex::VertexId;

/// Moving tokens and their destinations, grouped by source vertex and
/// ordered by target within each group. Stationary tokens are absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SimultaneousMove(Vec<(usize, VertexId)>);

impl SimultaneousMove {
    /// The move in which no token moves.
    pub fn stationary() -> Self {
        SimultaneousMove(Vec::new())
    }

    #[inline]
    pub fn assignments(&self) -> &[(usize, VertexId)] {
        &self.0
    }

    /// Number of moving tokens, i.e. the dimension of the resulting cube.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Destination of token `t`, if it moves.
    pub fn destination(&self, t: usize) -> Option<VertexId> {
        self.0.iter().find(|&&(tok, _)| tok == t).map(|&(_, dst)| dst)
    }
}

impl From<Vec<(usize, VertexId)>> for SimultaneousMove {
    fn from(assignments: Vec<(usize, VertexId)>) -> Self {
        SimultaneousMove(assignments)
    }
}

/// Every simultaneous move of `config` allowed by `map`.
///
/// The product over vertices is lazy; only the per-vertex assignment lists are
/// materialized. An empty map yields exactly one stationary move.
pub fn combine(
    config: &Configuration,
    map: &CapacityMap,
) -> Result<impl Iterator<Item = SimultaneousMove> + use<>, ConfError> {
    for p in map.plans() {
        let actual = config.residents(p.vertex);
        if actual != p.residents {
            return Err(ConfError::invariant(format!(
                "plan for vertex {} lists residents {:?}, configuration {config} has {:?}",
                p.vertex, p.residents, actual
            )));
        }
    }
    if map.is_empty() {
        return Ok(Either::Left(std::iter::once(SimultaneousMove::stationary())));
    }

    let per_vertex: Vec<Vec<Vec<(usize, VertexId)>>> =
        map.plans().iter().map(vertex_assignments).collect();
    Ok(Either::Right(
        per_vertex
            .into_iter()
            .multi_cartesian_product()
            .map(|choice| SimultaneousMove(choice.into_iter().flatten().collect())),
    ))
}

/// Every token-level realization of every local move at one vertex.
pub fn vertex_assignments(plan: &VertexPlan) -> Vec<Vec<(usize, VertexId)>> {
    let mut out = Vec::new();
    for option in &plan.options {
        let take = option.total();
        for selection in plan.residents.iter().copied().permutations(take) {
            let mut tokens = selection.into_iter();
            let mut assignment = Vec::with_capacity(take);
            for &(target, count) in option.counts() {
                assignment.extend(tokens.by_ref().take(count).map(|t| (t, target)));
            }
            out.push(assignment);
        }
    }
    out
}

/// Number of moves [`combine`] will yield for `map` (`None` on overflow).
pub fn move_count(map: &CapacityMap) -> Option<usize> {
    map.plans().iter().try_fold(1usize, |acc, p| {
        let m = p.residents.len();
        let per_vertex = p
            .options
            .iter()
            .try_fold(0usize, |sum, o| sum.checked_add(falling_factorial(m, o.total())?))?;
        acc.checked_mul(per_vertex)
    })
}

/// `m · (m − 1) ⋯ (m − s + 1)`
fn falling_factorial(m: usize, s: usize) -> Option<usize> {
    if s > m {
        return Some(0);
    }
    ((m - s + 1)..=m).try_fold(1usize, |acc, x| acc.checked_mul(x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::capacity::plan;
    use crate::topology::star::StarGraph;

    fn v(raw: u32) -> VertexId {
        VertexId::new(raw)
    }

    #[test]
    fn non_3_equal_example_moves() {
        let g = StarGraph::build(3, 3).unwrap();
        let cfg = Configuration::from_raw(&[5, 2, 2]);
        let map = plan(&cfg, g.downstream(), 3).unwrap();
        let moves: Vec<_> = combine(&cfg, &map).unwrap().collect();
        let expected: Vec<SimultaneousMove> = vec![
            vec![(1, v(3)), (2, v(5)), (0, v(6))].into(),
            vec![(2, v(3)), (1, v(5)), (0, v(6))].into(),
            vec![(1, v(3)), (2, v(3)), (0, v(6))].into(),
            vec![(2, v(3)), (1, v(3)), (0, v(6))].into(),
        ];
        assert_eq!(moves, expected);
        assert_eq!(move_count(&map), Some(4));
    }

    #[test]
    fn stuck_configuration_yields_one_stationary_move() {
        let g = StarGraph::build(3, 2).unwrap();
        let cfg = Configuration::from_raw(&[2, 3]);
        let map = plan(&cfg, g.downstream(), 2).unwrap();
        let moves: Vec<_> = combine(&cfg, &map).unwrap().collect();
        assert_eq!(moves, vec![SimultaneousMove::stationary()]);
        assert_eq!(move_count(&map), Some(1));
    }

    #[test]
    fn branching_center_gives_one_move_per_arm() {
        let g = StarGraph::build(3, 2).unwrap();
        // token 0 at feeder end, token 1 at the center
        let cfg = Configuration::from_raw(&[0, 1]);
        let map = plan(&cfg, g.downstream(), 2).unwrap();
        let moves: Vec<_> = combine(&cfg, &map).unwrap().collect();
        // token 0 is blocked by token 1, token 1 can go to either arm
        assert_eq!(
            moves,
            vec![
                SimultaneousMove::from(vec![(1, v(3))]),
                SimultaneousMove::from(vec![(1, v(2))]),
            ]
        );
        assert_eq!(moves[1].destination(1), Some(v(2)));
        assert_eq!(moves[1].destination(0), None);
    }

    #[test]
    fn move_count_matches_enumeration() {
        let g = StarGraph::build(4, 3).unwrap();
        for raw in [[0u32, 1, 3], [3, 3, 1], [2, 2, 5], [4, 0, 4]] {
            let cfg = Configuration::from_raw(&raw);
            let map = plan(&cfg, g.downstream(), 3).unwrap();
            let n = combine(&cfg, &map).unwrap().count();
            assert_eq!(move_count(&map), Some(n), "{cfg}");
        }
    }

    #[test]
    fn stale_plan_is_rejected() {
        let g = StarGraph::build(3, 3).unwrap();
        let map = plan(&Configuration::from_raw(&[5, 2, 2]), g.downstream(), 3).unwrap();
        let other = Configuration::from_raw(&[5, 2, 1]);
        assert!(matches!(combine(&other, &map), Err(ConfError::InvariantViolation(_))));
    }

    #[test]
    fn falling_factorials() {
        assert_eq!(falling_factorial(3, 0), Some(1));
        assert_eq!(falling_factorial(3, 2), Some(6));
        assert_eq!(falling_factorial(2, 3), Some(0));
    }
}
