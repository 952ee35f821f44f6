#![forbid(unsafe_code)]
//! Codegen Test Harness
//!
//! Builds the Lavish compiler once, then for every fixture under the fixtures
//! root: copies it into an isolated harness slot, renders its Cargo manifest
//! from a template, runs `lavish build` on every workspace found inside it, and
//! finally runs `cargo test` on the rendered project.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` with `?` / `map_err`. The `cli` and `harness` modules
//!   enforce `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! Every failure is fatal: components return typed errors, the orchestrator moves to
//! `Stage::Aborted`, and `cli::run()` is the only place that terminates the process.

pub mod cli;
pub mod harness;
pub mod version;

pub use harness::config::{BuildEnvironment, HarnessConfig};
pub use harness::errors::HarnessError;
pub use harness::invoker::{BuildInvoker, CargoInvoker};
pub use harness::{Orchestrator, RunSummary, Stage};
