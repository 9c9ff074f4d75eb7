//! Graph model: vertex ids, the star-graph generator, its embedding and
//! downstream order, token configurations and cube-list validation.

pub mod configuration;
pub mod downstream;
pub mod embedding;
pub mod star;
pub mod validation;
pub mod vertex;
