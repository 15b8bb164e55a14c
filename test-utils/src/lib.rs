//! Helpers for the tests of the workspace.

mod approx_eq;
pub mod fixtures;

pub use crate::approx_eq::ApproxEqIter;
#[doc(hidden)]
pub use float_cmp::approx_eq;
