#![allow(dead_code)]
use star_conf::{
    algs::complex::{CubeList, the_complex},
    cubical::CubicalComplex,
    topology::configuration::Configuration,
};

/// Build the cube list, panicking with the parameters on failure.
pub fn cube_list(arms: usize, n: usize, k: usize) -> CubeList {
    the_complex(arms, n, k).unwrap_or_else(|e| panic!("({arms}, {n}, {k}): {e}"))
}

/// Face closure of the cube list.
pub fn closure(arms: usize, n: usize, k: usize) -> CubicalComplex {
    cube_list(arms, n, k).to_complex()
}

/// Every legal sequence counted by brute force.
pub fn brute_force_count(vertex_count: usize, n: usize, k: usize) -> usize {
    let total = vertex_count.pow(n as u32);
    (0..total)
        .filter(|&code| {
            let mut rest = code;
            let raw: Vec<u32> = (0..n)
                .map(|_| {
                    let d = rest % vertex_count;
                    rest /= vertex_count;
                    d as u32
                })
                .collect();
            Configuration::from_raw(&raw).is_legal(k)
        })
        .count()
}

/// `(arms, n, k)` triples small enough for exhaustive checks.
pub fn small_shapes() -> Vec<(usize, usize, usize)> {
    let mut out = Vec::new();
    for arms in 2..=4 {
        for n in 2..=3 {
            for k in 2..=n {
                out.push((arms, n, k));
            }
        }
    }
    out
}
