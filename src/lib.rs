#![cfg_attr(docsrs, feature(doc_cfg))]
//! # star-conf
//!
//! star-conf builds the discretized configuration space of `n` labelled
//! tokens on a star graph with 2, 3 or 4 arms, under the non-k-equal
//! constraint: no vertex may ever hold `k` or more tokens. The result is a
//! list of axis-aligned cubes in `R^(n·d)`; the union of their faces is a
//! cubical complex homotopy equivalent to the configuration space.
//!
//! ## Pipeline
//! - [`topology::star`] builds the star graph, its lattice embedding and the
//!   downstream orientation of its edges.
//! - [`algs::enumerate`] lists the legal configurations (0-cells).
//! - [`algs::capacity`] and [`algs::moves`] decide which tokens may move
//!   together and where.
//! - [`algs::cube`] embeds each simultaneous move as a cube and deduplicates.
//! - [`cubical`] closes the cube list under faces for counting and Euler
//!   characteristics.
//!
//! ## Usage
//! ```rust
//! use star_conf::prelude::*;
//!
//! let list = the_complex(3, 3, 2).unwrap();
//! assert_eq!(list.len(), 246);
//! let complex = list.to_complex();
//! assert_eq!(complex.cell_count(), 756);
//! assert_eq!(complex.euler_characteristic(), -12);
//! ```
//!
//! ## Features
//! - `rayon`: process configurations on the rayon pool
//!   ([`ComplexOptions::parallel`](algs::complex::ComplexOptions)); output is
//!   identical to the serial run.
//! - `check-invariants` / `strict-invariants`: run the full invariant checks
//!   in release builds.

pub mod algs;
pub mod conf_error;
pub mod cubical;
pub mod debug_invariants;
pub mod topology;

pub use algs::complex::{the_complex, the_complex_default_k};
pub use conf_error::ConfError;
pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::complex::{
        ComplexBuilder, ComplexOptions, ConfigurationObserver, CubeList, NoopObserver,
        RecordingObserver, StarParams, the_complex, the_complex_default_k,
    };
    pub use crate::algs::cube::{Cube, Interval, TaggedCube};
    pub use crate::algs::moves::SimultaneousMove;
    pub use crate::conf_error::ConfError;
    pub use crate::cubical::CubicalComplex;
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::topology::configuration::Configuration;
    pub use crate::topology::star::{StarGraph, StarShape};
    pub use crate::topology::validation::{
        CubeValidationOptions, MaximalityHandling, validate_cube_list,
    };
    pub use crate::topology::vertex::VertexId;
}
