//! Re-export public algorithms.

pub mod capacity;
pub mod complex;
pub mod cube;
pub mod enumerate;
pub mod moves;

pub use complex::{ComplexBuilder, CubeList, the_complex, the_complex_default_k};
pub use enumerate::enumerate;
