//! Validation of a finished cube list against its star graph.

use hashbrown::{HashMap, HashSet};

use crate::algs::complex::CubeList;
use crate::algs::cube::{Cube, CubeBuilder};
use crate::conf_error::ConfError;
use crate::debug_invariants::DebugInvariants;
use crate::topology::configuration::Configuration;
use crate::topology::embedding::{Coord, Embedding};
use crate::topology::star::StarGraph;

/// Optional toggles for [`validate_cube_list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CubeValidationOptions {
    /// Every cube has `n·dim` intervals.
    pub check_lengths: bool,
    /// Every interval has `lo ≤ hi`.
    pub check_ordering: bool,
    /// No cube appears twice.
    pub check_duplicates: bool,
    /// Every corner decodes to a legal configuration.
    pub check_corners: bool,
    /// Rebuilding each cube from its configuration and move gives the same cube.
    pub check_tags: bool,
    /// How to handle cubes that are faces of other listed cubes.
    pub maximality: MaximalityHandling,
}

impl CubeValidationOptions {
    /// Enable all checks; non-maximal cubes are reported as warnings.
    pub fn all() -> Self {
        Self {
            check_lengths: true,
            check_ordering: true,
            check_duplicates: true,
            check_corners: true,
            check_tags: true,
            maximality: MaximalityHandling::Warn,
        }
    }
}

impl Default for CubeValidationOptions {
    fn default() -> Self {
        Self {
            maximality: MaximalityHandling::Ignore,
            ..Self::all()
        }
    }
}

/// Behavior when a generated cube is a proper face of another generated cube.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
pub enum MaximalityHandling {
    /// Skip the check.
    #[default]
    Ignore,
    /// Log a warning naming the offending cubes.
    Warn,
    /// Fail with [`ConfError::InvariantViolation`].
    Error,
}

/// Validate `list` against the graph it was built on.
pub fn validate_cube_list(
    list: &CubeList,
    graph: &StarGraph,
    options: CubeValidationOptions,
) -> Result<(), ConfError> {
    let params = list.params();
    let shape = graph.shape();
    if (shape.arms, shape.points) != (params.arms, params.points) {
        return Err(ConfError::invariant(format!(
            "cube list for {params:?} checked against graph {shape:?}"
        )));
    }
    let dim = graph.embedding().dimension();
    let expected = params.points * dim;
    let builder = CubeBuilder::new(graph.embedding(), graph.downstream(), params.k);
    let mut seen = HashSet::with_capacity(list.len());

    for tagged in list.tagged() {
        let cube = &tagged.cube;
        if options.check_lengths && cube.len() != expected {
            return Err(ConfError::DimensionMismatch {
                expected,
                found: cube.len(),
            });
        }
        if options.check_ordering {
            cube.validate_invariants()?;
        }
        if options.check_duplicates && !seen.insert(cube) {
            return Err(ConfError::invariant(format!("cube {cube:?} is listed twice")));
        }
        if options.check_corners {
            for corner in cube.corners() {
                let config = decode_point(&corner, graph.embedding())?;
                config
                    .validate(params.points, graph.vertex_count(), params.k)
                    .map_err(|e| {
                        ConfError::invariant(format!("corner of {cube:?} is illegal: {e}"))
                    })?;
            }
        }
        if options.check_tags {
            let rebuilt = builder.build(&tagged.configuration, &tagged.movement)?;
            if rebuilt.cube != *cube {
                return Err(ConfError::invariant(format!(
                    "cube {cube:?} does not match its move {:?} from {}",
                    tagged.movement, tagged.configuration
                )));
            }
        }
    }

    check_maximality(list.cubes(), options.maximality)
}

/// Decode a flat coordinate tuple of `n` embedded tokens into a configuration.
pub fn decode_point(point: &[Coord], embedding: &Embedding) -> Result<Configuration, ConfError> {
    let dim = embedding.dimension();
    if dim == 0 || point.len() % dim != 0 {
        return Err(ConfError::DimensionMismatch {
            expected: dim,
            found: point.len(),
        });
    }
    point
        .chunks(dim)
        .map(|block| {
            embedding.vertex_at(block).ok_or_else(|| {
                ConfError::invariant(format!("point {block:?} is not a graph vertex"))
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Configuration::new)
}

/// Cubes of `cubes` that are proper faces of another cube in the same list,
/// in input order.
pub fn non_maximal_cubes<'a, I>(cubes: I) -> Vec<&'a Cube>
where
    I: IntoIterator<Item = &'a Cube>,
{
    let cubes: Vec<&Cube> = cubes.into_iter().collect();
    let index: HashMap<&Cube, usize> = cubes.iter().enumerate().map(|(i, &c)| (c, i)).collect();
    let mut covered = vec![false; cubes.len()];
    for &cube in &cubes {
        if cube.dimension() == 0 {
            continue;
        }
        for face in cube.faces() {
            if face == *cube {
                continue;
            }
            if let Some(&i) = index.get(&face) {
                covered[i] = true;
            }
        }
    }
    cubes
        .into_iter()
        .zip(covered)
        .filter_map(|(c, hit)| hit.then_some(c))
        .collect()
}

/// Apply `handling` to the non-maximal cubes of `cubes`.
pub fn check_maximality<'a, I>(cubes: I, handling: MaximalityHandling) -> Result<(), ConfError>
where
    I: IntoIterator<Item = &'a Cube>,
{
    if handling == MaximalityHandling::Ignore {
        return Ok(());
    }
    let faces = non_maximal_cubes(cubes);
    let Some(first) = faces.first() else {
        return Ok(());
    };
    match handling {
        MaximalityHandling::Warn => {
            log::warn!(
                "{} generated cubes are faces of other generated cubes (first: {first:?})",
                faces.len()
            );
            for face in &faces {
                log::debug!("non-maximal cube {face:?}");
            }
            Ok(())
        }
        MaximalityHandling::Error => Err(ConfError::invariant(format!(
            "{} generated cubes are faces of other generated cubes (first: {first:?})",
            faces.len()
        ))),
        MaximalityHandling::Ignore => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::complex::the_complex;
    use crate::topology::vertex::VertexId;

    #[test]
    fn generated_lists_pass_every_check() {
        for (arms, n, k) in [(3, 2, 2), (3, 3, 2), (3, 3, 3), (2, 3, 2), (4, 2, 2)] {
            let list = the_complex(arms, n, k).unwrap();
            let graph = StarGraph::build(arms, n).unwrap();
            validate_cube_list(&list, &graph, CubeValidationOptions::default()).unwrap();
        }
    }

    #[test]
    fn wrong_graph_is_rejected() {
        let list = the_complex(3, 2, 2).unwrap();
        let graph = StarGraph::build(4, 2).unwrap();
        assert!(validate_cube_list(&list, &graph, CubeValidationOptions::all()).is_err());
    }

    #[test]
    fn decode_y_graph_points() {
        let g = StarGraph::build(3, 3).unwrap();
        let c = decode_point(&[0, 0, 2, 1, 0, 0, 0, 1, 0], g.embedding()).unwrap();
        assert_eq!(c, Configuration::from_raw(&[6, 3, 1]));
        assert!(decode_point(&[1, 1, 0], g.embedding()).is_err());
        assert!(matches!(
            decode_point(&[0, 0], g.embedding()),
            Err(ConfError::DimensionMismatch { .. })
        ));
        assert_eq!(c.position(0).unwrap(), VertexId::new(6));
    }

    #[test]
    fn faces_of_listed_cubes_are_reported() {
        let edge = Cube::from_pairs(&[(0, 1), (2, 2)]);
        let end = Cube::from_pairs(&[(1, 1), (2, 2)]);
        let lone = Cube::from_pairs(&[(5, 5), (5, 5)]);
        let cubes = [edge.clone(), end.clone(), lone];
        assert_eq!(non_maximal_cubes(&cubes), vec![&end]);
        assert!(check_maximality(&cubes, MaximalityHandling::Warn).is_ok());
        assert!(check_maximality(&cubes, MaximalityHandling::Error).is_err());
        assert!(check_maximality(&cubes[..1], MaximalityHandling::Error).is_ok());
    }
}
