//! markerfix core library.
//!
//! Resolves Git-style conflict markers in text files by keeping the stashed
//! side of every region, and counts curly-brace balance as a follow-up
//! sanity check. Files are read whole and replaced atomically.

pub mod braces;
pub mod config;
pub mod conflict;
pub mod errors;
pub mod text_file;

// Re-exports for convenience.
pub use braces::{BraceBalance, BraceCounter};
pub use config::MarkerfixConfig;
pub use conflict::{MarkerResolver, ResolveReport, ResolverState};
pub use errors::{ConfigError, FileError};
