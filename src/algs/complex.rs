//! Entry point: build the cube list of the discretized configuration space.
//!
//! For every legal configuration the pipeline runs
//! [`plan`] → [`combine`] → [`CubeBuilder::build`] and offers the resulting
//! cubes to a single [`CubeCollector`]. Any error aborts the run and the
//! partially filled collector is dropped; callers never see partial output.
//!
//! With the `rayon` feature and [`ComplexOptions::parallel`] set, the
//! per-configuration work is fanned out over the rayon pool. Results carry the
//! configuration's enumeration rank and are merged in rank order, so the
//! parallel output is identical to the serial one, tags included.

use parking_lot::Mutex;

use crate::algs::capacity::plan;
use crate::algs::cube::{Cube, CubeBuilder, CubeCollector, TaggedCube};
use crate::algs::enumerate::enumerate;
use crate::algs::moves::combine;
use crate::conf_error::ConfError;
use crate::cubical::CubicalComplex;
use crate::debug_invariants::DebugInvariants;
use crate::topology::configuration::Configuration;
use crate::topology::star::{StarGraph, StarShape, to_i64};
use crate::topology::validation::{MaximalityHandling, check_maximality};

/// Capacity bound used when none is given: plain non-collision.
pub const DEFAULT_K: usize = 2;

fn default_k() -> usize {
    DEFAULT_K
}

/// Parameters identifying one complex: a `arms`-star, `points` tokens and
/// the non-k-equal bound `k`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct StarParams {
    pub arms: usize,
    pub points: usize,
    #[serde(default = "default_k")]
    pub k: usize,
}

impl StarParams {
    pub fn new(arms: usize, points: usize, k: usize) -> Self {
        Self { arms, points, k }
    }

    /// Check every parameter before any enumeration happens.
    pub fn validate(&self) -> Result<StarShape, ConfError> {
        let shape = StarShape::try_new(self.arms, self.points)?;
        if self.k < 2 {
            return Err(ConfError::invalid(
                "k",
                to_i64(self.k),
                "k must be at least 2 (k = 1 would forbid every occupied vertex)",
            ));
        }
        if self.k > self.points {
            return Err(ConfError::invalid(
                "k",
                to_i64(self.k),
                "k can be at most the number of tokens",
            ));
        }
        Ok(shape)
    }
}

/// Run-time switches for [`ComplexBuilder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ComplexOptions {
    /// Fan configurations out over the rayon pool (needs the `rayon` feature).
    pub parallel: bool,
    /// What to do with generated cubes that are faces of other generated cubes.
    pub maximality: MaximalityHandling,
    /// Run the full [`DebugInvariants`] checks on every capacity map and cube.
    pub check_invariants: bool,
}

impl Default for ComplexOptions {
    fn default() -> Self {
        Self {
            parallel: false,
            maximality: MaximalityHandling::Ignore,
            check_invariants: cfg!(any(
                feature = "check-invariants",
                feature = "strict-invariants"
            )),
        }
    }
}

/// Optional diagnostic sink; never needed for correctness.
///
/// `emitted` counts the cubes produced for `configuration`, repeats included;
/// `new` counts those not already collected.
pub trait ConfigurationObserver {
    fn configuration_processed(&self, configuration: &Configuration, emitted: usize, new: usize);
}

/// Observer that ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl ConfigurationObserver for NoopObserver {
    fn configuration_processed(&self, _: &Configuration, _: usize, _: usize) {}
}

/// Observer that records `(configuration, emitted, new)` for every event.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<(Configuration, usize, usize)>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events, in processing order.
    pub fn events(&self) -> Vec<(Configuration, usize, usize)> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl ConfigurationObserver for RecordingObserver {
    fn configuration_processed(&self, configuration: &Configuration, emitted: usize, new: usize) {
        self.events.lock().push((configuration.clone(), emitted, new));
    }
}

/// The deduplicated cubes of one run, ready for a cell-complex consumer.
#[derive(Clone, Debug)]
pub struct CubeList {
    params: StarParams,
    dimension: usize,
    cubes: Vec<TaggedCube>,
    configurations: usize,
    offered: usize,
}

impl CubeList {
    #[inline]
    pub fn params(&self) -> StarParams {
        self.params
    }

    /// Embedding dimension; each cube has `points · dimension` intervals.
    #[inline]
    pub fn embedding_dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cubes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cubes.is_empty()
    }

    /// Legal configurations visited.
    #[inline]
    pub fn configuration_count(&self) -> usize {
        self.configurations
    }

    /// Cubes built before deduplication.
    #[inline]
    pub fn offered(&self) -> usize {
        self.offered
    }

    #[inline]
    pub fn tagged(&self) -> &[TaggedCube] {
        &self.cubes
    }

    pub fn cubes(&self) -> impl Iterator<Item = &Cube> + '_ {
        self.cubes.iter().map(|t| &t.cube)
    }

    /// Drop the diagnostic tags.
    pub fn into_cubes(self) -> Vec<Cube> {
        self.cubes.into_iter().map(|t| t.cube).collect()
    }

    /// Close the cube list under faces.
    pub fn to_complex(&self) -> CubicalComplex {
        CubicalComplex::from_cubes(self.cubes().cloned())
    }
}

impl DebugInvariants for CubeList {
    fn validate_invariants(&self) -> Result<(), ConfError> {
        let expected = self.params.points * self.dimension;
        let mut seen = hashbrown::HashSet::with_capacity(self.cubes.len());
        for t in &self.cubes {
            if t.cube.len() != expected {
                return Err(ConfError::DimensionMismatch {
                    expected,
                    found: t.cube.len(),
                });
            }
            t.cube.validate_invariants()?;
            if !seen.insert(&t.cube) {
                return Err(ConfError::invariant(format!("cube {:?} appears twice", t.cube)));
            }
        }
        Ok(())
    }
}

/// Builder for a complex run.
///
/// ```rust
/// # use star_conf::algs::complex::ComplexBuilder;
/// let list = ComplexBuilder::new(3, 2).k(2).run().unwrap();
/// assert_eq!(list.configuration_count(), 12);
/// assert_eq!(list.to_complex().cell_count(), 24);
/// ```
pub struct ComplexBuilder<'o> {
    params: StarParams,
    options: ComplexOptions,
    observer: Option<&'o dyn ConfigurationObserver>,
}

impl<'o> ComplexBuilder<'o> {
    pub fn new(arms: usize, points: usize) -> Self {
        Self::from_params(StarParams::new(arms, points, DEFAULT_K))
    }

    pub fn from_params(params: StarParams) -> Self {
        Self {
            params,
            options: ComplexOptions::default(),
            observer: None,
        }
    }

    pub fn k(mut self, k: usize) -> Self {
        self.params.k = k;
        self
    }

    pub fn options(mut self, options: ComplexOptions) -> Self {
        self.options = options;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.options.parallel = parallel;
        self
    }

    pub fn maximality(mut self, handling: MaximalityHandling) -> Self {
        self.options.maximality = handling;
        self
    }

    pub fn observer(mut self, observer: &'o dyn ConfigurationObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Validate the parameters, enumerate and collect every cube.
    pub fn run(self) -> Result<CubeList, ConfError> {
        let shape = self.params.validate()?;
        let graph = StarGraph::from_shape(shape)?;
        self.run_on(&graph)
    }

    /// Run against an already built graph model.
    pub fn run_on(self, graph: &StarGraph) -> Result<CubeList, ConfError> {
        let StarParams { arms, points, k } = self.params;
        self.params.validate()?;
        if graph.shape() != StarShape::try_new(arms, points)? {
            return Err(ConfError::invariant(format!(
                "graph {:?} does not match parameters {:?}",
                graph.shape(),
                self.params
            )));
        }
        log::info!(
            "building complex: {arms}-star, n = {points}, k = {k}, {} vertices",
            graph.vertex_count()
        );

        let mut collector = CubeCollector::new();
        let configurations = if self.options.parallel {
            self.collect_parallel(graph, &mut collector)?
        } else {
            self.collect_serial(graph, &mut collector)?
        };

        let offered = collector.offered();
        let list = CubeList {
            params: self.params,
            dimension: graph.embedding().dimension(),
            cubes: collector.into_cubes(),
            configurations,
            offered,
        };
        if self.options.check_invariants {
            list.validate_invariants()?;
        }
        check_maximality(list.cubes(), self.options.maximality)?;
        log::info!(
            "complex built: {} configurations, {} cubes offered, {} distinct",
            list.configurations,
            list.offered,
            list.len()
        );
        Ok(list)
    }

    fn collect_serial(
        &self,
        graph: &StarGraph,
        collector: &mut CubeCollector,
    ) -> Result<usize, ConfError> {
        let mut visited = 0;
        for config in enumerate(graph.vertex_count(), self.params.points, self.params.k) {
            let cubes = cubes_for(graph, &config, self.params.k, self.options.check_invariants)?;
            self.merge(collector, &config, cubes);
            visited += 1;
        }
        Ok(visited)
    }

    #[cfg(feature = "rayon")]
    fn collect_parallel(
        &self,
        graph: &StarGraph,
        collector: &mut CubeCollector,
    ) -> Result<usize, ConfError> {
        use rayon::iter::{ParallelBridge, ParallelIterator};

        let StarParams { points, k, .. } = self.params;
        let check = self.options.check_invariants;
        let mut batches = enumerate(graph.vertex_count(), points, k)
            .enumerate()
            .par_bridge()
            .map(|(rank, config)| {
                cubes_for(graph, &config, k, check).map(|cubes| (rank, config, cubes))
            })
            .collect::<Result<Vec<_>, ConfError>>()?;
        batches.sort_unstable_by_key(|(rank, _, _)| *rank);
        let visited = batches.len();
        for (_, config, cubes) in batches {
            self.merge(collector, &config, cubes);
        }
        Ok(visited)
    }

    #[cfg(not(feature = "rayon"))]
    fn collect_parallel(
        &self,
        graph: &StarGraph,
        collector: &mut CubeCollector,
    ) -> Result<usize, ConfError> {
        log::warn!("parallel run requested without the `rayon` feature; running serially");
        self.collect_serial(graph, collector)
    }

    fn merge(&self, collector: &mut CubeCollector, config: &Configuration, cubes: Vec<TaggedCube>) {
        let emitted = cubes.len();
        let new = cubes.into_iter().filter_map(|t| collector.push(t).then_some(())).count();
        log::debug!("configuration {config}: {emitted} cubes, {new} new");
        if let Some(observer) = self.observer {
            observer.configuration_processed(config, emitted, new);
        }
    }
}

/// Every cube generated from one configuration, in move order.
pub fn cubes_for(
    graph: &StarGraph,
    config: &Configuration,
    k: usize,
    check_invariants: bool,
) -> Result<Vec<TaggedCube>, ConfError> {
    config.validate(graph.shape().points, graph.vertex_count(), k)?;
    let map = plan(config, graph.downstream(), k)?;
    if check_invariants {
        map.validate_invariants()?;
    }
    let builder = CubeBuilder::new(graph.embedding(), graph.downstream(), k);
    combine(config, &map)?
        .map(|movement| {
            let tagged = builder.build(config, &movement)?;
            if check_invariants {
                tagged.cube.validate_invariants()?;
            }
            Ok(tagged)
        })
        .collect()
}

/// Cube list of the non-`k`-equal configuration space of `n` tokens on the
/// `arms`-star.
pub fn the_complex(arms: usize, n: usize, k: usize) -> Result<CubeList, ConfError> {
    ComplexBuilder::new(arms, n).k(k).run()
}

/// [`the_complex`] with `k = 2` (tokens may never share a vertex).
pub fn the_complex_default_k(arms: usize, n: usize) -> Result<CubeList, ConfError> {
    the_complex(arms, n, DEFAULT_K)
}
