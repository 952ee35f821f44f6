//! Version information shared by the harness.
//!
//! ## Notes
//!
//! - `HARNESS_VERSION` comes from Cargo metadata at compile time.
//! - `PINNED_COMPILER_REVISION` is the Lavish revision written into every rendered test
//!   manifest. It is fixed for the whole run so generated projects resolve the same runtime.

/// The harness version string (for example, `0.1.0`).
pub const HARNESS_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git revision of the Lavish runtime that rendered test projects depend on.
pub const PINNED_COMPILER_REVISION: &str = "51aa2bc653454931253c6a396dc160652e458566";
