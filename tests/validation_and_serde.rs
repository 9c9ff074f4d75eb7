mod util;

use star_conf::algs::complex::ComplexOptions;
use star_conf::topology::validation::{decode_point, non_maximal_cubes};
use star_conf::prelude::*;
use util::cube_list;

#[test]
fn full_validation_passes_on_generated_lists() {
    for (arms, n, k) in [(2, 3, 3), (3, 3, 2), (4, 3, 3)] {
        let list = cube_list(arms, n, k);
        let graph = StarGraph::build(arms, n).unwrap();
        validate_cube_list(&list, &graph, CubeValidationOptions::all()).unwrap();
    }
}

#[test]
fn stuck_configurations_give_non_maximal_points() {
    let list = cube_list(3, 2, 2);
    let faces = non_maximal_cubes(list.cubes());
    assert_eq!(faces.len(), 2);
    assert!(faces.iter().all(|c| c.dimension() == 0));

    let graph = StarGraph::build(3, 2).unwrap();
    let strict = CubeValidationOptions {
        maximality: MaximalityHandling::Error,
        ..CubeValidationOptions::all()
    };
    assert!(matches!(
        validate_cube_list(&list, &graph, strict),
        Err(ConfError::InvariantViolation(_))
    ));
}

#[test]
fn corners_decode_to_configurations() {
    let list = cube_list(3, 3, 2);
    let graph = StarGraph::build(3, 3).unwrap();
    for t in list.tagged() {
        let before: Vec<_> = t.cube.corners().collect();
        let decoded: Vec<_> = before
            .iter()
            .map(|p| decode_point(p, graph.embedding()).unwrap())
            .collect();
        assert!(decoded.contains(&t.configuration));
        assert!(decoded.iter().all(|c| c.is_legal(2)));
    }
}

#[test]
fn observer_counts_add_up() {
    let observer = RecordingObserver::new();
    let list = ComplexBuilder::new(3, 3).k(3).observer(&observer).run().unwrap();
    let events = observer.events();
    assert_eq!(events.len(), 336);
    let emitted: usize = events.iter().map(|e| e.1).sum();
    let new: usize = events.iter().map(|e| e.2).sum();
    assert_eq!(emitted, list.offered());
    assert_eq!(new, list.len());
    assert!(events.iter().all(|e| e.2 <= e.1));
}

#[test]
fn noop_observer_changes_nothing() {
    let a = ComplexBuilder::new(4, 2).observer(&NoopObserver).run().unwrap();
    let b = ComplexBuilder::new(4, 2).run().unwrap();
    assert_eq!(a.tagged(), b.tagged());
}

#[test]
fn params_and_options_round_trip_json() {
    let params = StarParams::new(4, 3, 3);
    let json = serde_json::to_string(&params).unwrap();
    assert_eq!(json, r#"{"arms":4,"points":3,"k":3}"#);
    let back: StarParams = serde_json::from_str(&json).unwrap();
    assert_eq!(back, params);

    let opts = ComplexOptions {
        parallel: false,
        maximality: MaximalityHandling::Warn,
        check_invariants: true,
    };
    let back: ComplexOptions = serde_json::from_str(&serde_json::to_string(&opts).unwrap()).unwrap();
    assert_eq!(back, opts);

    let list = ComplexBuilder::from_params(back_params()).options(opts).run().unwrap();
    assert_eq!(list.len(), 14);
}

fn back_params() -> StarParams {
    serde_json::from_str(r#"{"arms":3,"points":2}"#).unwrap()
}

#[test]
fn cubes_serialize_as_interval_lists() {
    let list = cube_list(3, 2, 2);
    let first = list.cubes().next().unwrap();
    let json = serde_json::to_string(first).unwrap();
    assert!(json.starts_with(r#"[{"lo":"#));
    let back: Cube = serde_json::from_str(&json).unwrap();
    assert_eq!(&back, first);

    let bytes = bincode::serialize(list.tagged()).unwrap();
    let tagged: Vec<TaggedCube> = bincode::deserialize(&bytes).unwrap();
    assert_eq!(tagged, list.tagged());
}
