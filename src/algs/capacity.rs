//! Capacity planning: how the tokens resident at one vertex may spread
//! downstream in a single simultaneous step.
//!
//! Every downstream vertex is a bucket holding at most `k − 1` tokens. For a
//! configuration snapshot we record, per occupied vertex, the eligible targets
//! (buckets that are not already full) and their vacancies, then list the
//! *local moves*: ways to send tokens into those buckets such that the
//! resulting cell is maximal.
//!
//! - If the buckets can absorb every resident (`Σ vacancy ≥ m`), each bounded
//!   composition of `m` over the targets is an option; staying put is not.
//! - Otherwise the only option fills every bucket to capacity and leaves the
//!   remainder behind (partial evacuation).
//!
//! All vacancies come from the pre-move snapshot: moves are simultaneous, so
//! a token leaving a bucket does not free room for another one this step.

use crate::conf_error::ConfError;
use crate::debug_invariants::DebugInvariants;
use crate::topology::configuration::Configuration;
use crate::topology::downstream::DownstreamGraph;
use crate::topology::vertex::VertexId;

/// An eligible downstream bucket and the number of tokens it can take.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Target {
    pub vertex: VertexId,
    pub vacancy: usize,
}

/// Whether a vertex empties completely or only as far as capacity allows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Evacuation {
    Full,
    Partial,
}

/// Token counts sent to each target, in ascending target order. Targets
/// receiving nothing are omitted.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LocalMove(Vec<(VertexId, usize)>);

impl LocalMove {
    #[inline]
    pub fn counts(&self) -> &[(VertexId, usize)] {
        &self.0
    }

    /// Tokens leaving the vertex.
    #[inline]
    pub fn total(&self) -> usize {
        self.0.iter().map(|&(_, c)| c).sum()
    }

    /// Count sent to `target` (zero if absent).
    pub fn count_for(&self, target: VertexId) -> usize {
        self.0
            .iter()
            .find(|&&(t, _)| t == target)
            .map_or(0, |&(_, c)| c)
    }
}

impl From<Vec<(VertexId, usize)>> for LocalMove {
    fn from(counts: Vec<(VertexId, usize)>) -> Self {
        LocalMove(counts)
    }
}

/// Plan for a single occupied vertex with at least one eligible target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VertexPlan {
    pub vertex: VertexId,
    /// Tokens at `vertex`, ascending.
    pub residents: Vec<usize>,
    /// Eligible targets, ascending by vertex.
    pub targets: Vec<Target>,
    pub evacuation: Evacuation,
    /// Local-move options; never empty.
    pub options: Vec<LocalMove>,
}

impl VertexPlan {
    /// Sum of target vacancies.
    pub fn total_vacancy(&self) -> usize {
        self.targets.iter().map(|t| t.vacancy).sum()
    }

    /// Vacancy of `target`, if it is eligible.
    pub fn vacancy_of(&self, target: VertexId) -> Option<usize> {
        self.targets
            .iter()
            .find(|t| t.vertex == target)
            .map(|t| t.vacancy)
    }
}

/// Per-vertex plans for one configuration, ascending by vertex.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CapacityMap {
    plans: Vec<VertexPlan>,
}

impl CapacityMap {
    #[inline]
    pub fn plans(&self) -> &[VertexPlan] {
        &self.plans
    }

    /// Plan for `v`, if `v` contributes any move.
    pub fn get(&self, v: VertexId) -> Option<&VertexPlan> {
        self.plans
            .binary_search_by_key(&v, |p| p.vertex)
            .ok()
            .map(|i| &self.plans[i])
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    /// Number of vertex-level option combinations (before token selection).
    pub fn combination_count(&self) -> usize {
        self.plans
            .iter()
            .map(|p| p.options.len())
            .try_fold(1usize, |acc, c| acc.checked_mul(c))
            .unwrap_or(usize::MAX)
    }
}

/// Compute the capacity map of `config` for capacity bound `k`.
///
/// The configuration must be legal; vertices are checked against the
/// downstream graph.
pub fn plan(
    config: &Configuration,
    downstream: &DownstreamGraph,
    k: usize,
) -> Result<CapacityMap, ConfError> {
    let vertex_count = downstream.vertex_count();
    let occupancy = config.occupancy(vertex_count)?;
    let locations = config.location_list(vertex_count)?;
    let bucket = k.saturating_sub(1);

    let mut plans = Vec::new();
    for (vertex, m) in occupancy.iter() {
        if m >= k {
            return Err(ConfError::invariant(format!(
                "vertex {vertex} holds {m} tokens in {config} (k = {k})"
            )));
        }
        let targets: Vec<Target> = downstream
            .targets(vertex)
            .iter()
            .filter(|&&t| occupancy.get(t) < bucket)
            .map(|&t| Target {
                vertex: t,
                vacancy: bucket - occupancy.get(t),
            })
            .collect();
        if targets.is_empty() {
            continue;
        }

        let total_vacancy: usize = targets.iter().map(|t| t.vacancy).sum();
        let (evacuation, options) = if total_vacancy < m {
            let fill = targets.iter().map(|t| (t.vertex, t.vacancy)).collect();
            (Evacuation::Partial, vec![LocalMove(fill)])
        } else {
            let bounds: Vec<usize> = targets.iter().map(|t| t.vacancy).collect();
            let options = bounded_compositions(m, &bounds)
                .into_iter()
                .map(|parts| {
                    LocalMove(
                        targets
                            .iter()
                            .zip(parts)
                            .filter(|&(_, c)| c > 0)
                            .map(|(t, c)| (t.vertex, c))
                            .collect(),
                    )
                })
                .collect();
            (Evacuation::Full, options)
        };

        let vertex_plan = VertexPlan {
            vertex,
            residents: locations[vertex.index()].clone(),
            targets,
            evacuation,
            options,
        };
        check_vertex_plan(&vertex_plan)?;
        plans.push(vertex_plan);
    }

    log::trace!("capacity plan for {config}: {} moving vertices", plans.len());
    Ok(CapacityMap { plans })
}

/// All ways to write `total` as an ordered sum with `parts[i] ≤ bounds[i]`,
/// in lexicographic order.
pub fn bounded_compositions(total: usize, bounds: &[usize]) -> Vec<Vec<usize>> {
    // suffix_cap[i]: most that positions i.. can absorb
    let mut suffix_cap = vec![0usize; bounds.len() + 1];
    for i in (0..bounds.len()).rev() {
        suffix_cap[i] = suffix_cap[i + 1].saturating_add(bounds[i]);
    }
    let mut out = Vec::new();
    let mut current = Vec::with_capacity(bounds.len());
    compositions_rec(total, bounds, &suffix_cap, &mut current, &mut out);
    out
}

fn compositions_rec(
    remaining: usize,
    bounds: &[usize],
    suffix_cap: &[usize],
    current: &mut Vec<usize>,
    out: &mut Vec<Vec<usize>>,
) {
    let pos = current.len();
    if pos == bounds.len() {
        if remaining == 0 {
            out.push(current.clone());
        }
        return;
    }
    if suffix_cap[pos] < remaining {
        return;
    }
    for c in 0..=bounds[pos].min(remaining) {
        current.push(c);
        compositions_rec(remaining - c, bounds, suffix_cap, current, out);
        current.pop();
    }
}

fn check_vertex_plan(p: &VertexPlan) -> Result<(), ConfError> {
    let m = p.residents.len();
    if p.options.is_empty() {
        return Err(ConfError::invariant(format!("vertex {} has no local move", p.vertex)));
    }
    for opt in &p.options {
        for &(t, c) in opt.counts() {
            match p.vacancy_of(t) {
                Some(vac) if c <= vac => {}
                Some(vac) => {
                    return Err(ConfError::invariant(format!(
                        "vertex {} sends {c} tokens to {t} with vacancy {vac}",
                        p.vertex
                    )));
                }
                None => {
                    return Err(ConfError::invariant(format!(
                        "vertex {} targets ineligible vertex {t}",
                        p.vertex
                    )));
                }
            }
        }
        let sent = opt.total();
        let expected = match p.evacuation {
            Evacuation::Full => m,
            Evacuation::Partial => p.total_vacancy(),
        };
        if sent != expected || sent > m {
            return Err(ConfError::invariant(format!(
                "vertex {} moves {sent} of {m} tokens, expected {expected}",
                p.vertex
            )));
        }
    }
    Ok(())
}

impl DebugInvariants for CapacityMap {
    fn validate_invariants(&self) -> Result<(), ConfError> {
        if self.plans.windows(2).any(|w| w[0].vertex >= w[1].vertex) {
            return Err(ConfError::invariant("capacity plans are not sorted by vertex"));
        }
        self.plans.iter().try_for_each(check_vertex_plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::star::StarGraph;

    fn v(raw: u32) -> VertexId {
        VertexId::new(raw)
    }

    #[test]
    fn compositions_are_lexicographic_and_bounded() {
        assert_eq!(bounded_compositions(2, &[2, 1]), vec![vec![1, 1], vec![2, 0]]);
        assert_eq!(
            bounded_compositions(2, &[2, 2]),
            vec![vec![0, 2], vec![1, 1], vec![2, 0]]
        );
        assert!(bounded_compositions(3, &[1, 1]).is_empty());
        assert_eq!(bounded_compositions(0, &[1, 1]), vec![vec![0, 0]]);
    }

    #[test]
    fn non_3_equal_y_graph_example() {
        let g = StarGraph::build(3, 3).unwrap();
        let cfg = Configuration::from_raw(&[5, 2, 2]);
        let map = plan(&cfg, g.downstream(), 3).unwrap();
        assert_eq!(map.len(), 2);

        let at2 = map.get(v(2)).unwrap();
        assert_eq!(
            at2.targets,
            vec![
                Target { vertex: v(3), vacancy: 2 },
                Target { vertex: v(5), vacancy: 1 }
            ]
        );
        assert_eq!(at2.evacuation, Evacuation::Full);
        assert_eq!(
            at2.options,
            vec![
                LocalMove::from(vec![(v(3), 1), (v(5), 1)]),
                LocalMove::from(vec![(v(3), 2)])
            ]
        );

        let at5 = map.get(v(5)).unwrap();
        assert_eq!(at5.targets, vec![Target { vertex: v(6), vacancy: 2 }]);
        assert_eq!(at5.options, vec![LocalMove::from(vec![(v(6), 1)])]);
        map.validate_invariants().unwrap();
    }

    #[test]
    fn full_buckets_are_excluded_entirely() {
        // k = 2: a single occupied target is full, the other is free
        let g = StarGraph::build(3, 3).unwrap();
        let cfg = Configuration::from_raw(&[2, 3, 0]);
        let map = plan(&cfg, g.downstream(), 2).unwrap();
        let at2 = map.get(v(2)).unwrap();
        assert_eq!(at2.targets, vec![Target { vertex: v(5), vacancy: 1 }]);
        assert_eq!(map.get(v(3)).unwrap().targets, vec![Target { vertex: v(4), vacancy: 1 }]);
        assert_eq!(map.get(v(0)).unwrap().targets, vec![Target { vertex: v(1), vacancy: 1 }]);
    }

    #[test]
    fn partial_evacuation_fills_every_bucket() {
        // interval 0 → 1 → 2 → 3 → 4 with k = 3: two tokens at 0, one at 1
        let g = StarGraph::build(2, 3).unwrap();
        let cfg = Configuration::from_raw(&[0, 0, 1]);
        let map = plan(&cfg, g.downstream(), 3).unwrap();
        let at0 = map.get(v(0)).unwrap();
        assert_eq!(at0.evacuation, Evacuation::Partial);
        assert_eq!(at0.options, vec![LocalMove::from(vec![(v(1), 1)])]);
        assert_eq!(at0.options[0].total(), 1);
        map.validate_invariants().unwrap();
    }

    #[test]
    fn terminal_and_blocked_vertices_contribute_nothing() {
        let g = StarGraph::build(3, 2).unwrap();
        // tokens on both arm ends: nothing can move
        let map = plan(&Configuration::from_raw(&[2, 3]), g.downstream(), 2).unwrap();
        assert!(map.is_empty());
        assert_eq!(map.combination_count(), 1);
    }

    #[test]
    fn illegal_snapshot_is_an_invariant_violation() {
        let g = StarGraph::build(3, 3).unwrap();
        let err = plan(&Configuration::from_raw(&[1, 1, 0]), g.downstream(), 2).unwrap_err();
        assert!(matches!(err, ConfError::InvariantViolation(_)));
    }

    #[test]
    fn tampered_option_fails_validation() {
        let g = StarGraph::build(3, 3).unwrap();
        let mut map = plan(&Configuration::from_raw(&[5, 2, 2]), g.downstream(), 3).unwrap();
        map.plans[1].options[0] = LocalMove::from(vec![(v(6), 3)]);
        assert!(map.validate_invariants().is_err());
    }
}
