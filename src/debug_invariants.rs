//! Invariant checking for the graph model, capacity plans and cubes.
//!
//! Validation is always available through [`DebugInvariants::validate_invariants`];
//! the panicking form only fires in debug builds or with the
//! `check-invariants` / `strict-invariants` features.

use crate::conf_error::ConfError;

/// Trait for validating data structure invariants.
pub trait DebugInvariants {
    /// Validate invariants and return the first error encountered.
    fn validate_invariants(&self) -> Result<(), ConfError>;

    /// Panic on the first violated invariant when invariant checking is enabled.
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "invariant check failed");
    }
}

/// Validate every item, stopping at the first failure.
pub fn validate_all<'a, T, I>(items: I) -> Result<(), ConfError>
where
    T: DebugInvariants + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items.into_iter().try_for_each(DebugInvariants::validate_invariants)
}

/// Helper macro to run a fallible check and panic on error when invariant
/// checking is enabled.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants"))]
        if let Err(e) = $expr {
            panic!(concat!("[invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}
