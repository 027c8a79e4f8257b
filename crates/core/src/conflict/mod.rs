//! Git-style conflict marker handling.
//!
//! 1. **Classification** -- recognising the three marker lines by prefix.
//! 2. **Resolution** -- a single forward pass that keeps the stashed side of
//!    every conflict region and drops the upstream side.

pub mod marker;
pub mod resolver;

pub use marker::LineKind;
pub use resolver::{MarkerResolver, ResolveReport, Resolved, ResolverState};
