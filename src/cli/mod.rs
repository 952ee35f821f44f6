//! CLI module for the codegen harness
//!
//! ## Usage
//!
//! - `codegen-harness` - Run every fixture under `codegen-tests/`
//! - `codegen-harness <FIXTURE>` - Run a single fixture
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! `execute` returns `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use std::fmt;
use std::process;

use clap::Parser;

use crate::harness::config::HarnessConfig;
use crate::harness::errors::HarnessError;
use crate::harness::invoker::CargoInvoker;
use crate::harness::{Orchestrator, RunSummary};
use crate::version::HARNESS_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<HarnessError> for CliError {
    /// Render the error as a miette diagnostic (code, message, cause chain, help).
    fn from(err: HarnessError) -> Self {
        let report = miette::Report::new(err);
        CliError::failure(format!("{report:?}"))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Codegen test harness for the Lavish compiler
#[derive(Parser, Debug)]
#[command(name = "codegen-harness")]
#[command(version = HARNESS_VERSION)]
#[command(about = "Build the compiler, then build and test every codegen fixture", long_about = None)]
pub struct Cli {
    /// Run only this fixture (default: every directory under codegen-tests/)
    #[arg(value_name = "FIXTURE")]
    pub fixture: Option<String>,
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    let config = HarnessConfig::from_env()
        .map_err(|e| CliError::failure(format!("Error resolving working directory: {}", e)))?;
    config.validate().map_err(HarnessError::from)?;

    run_harness(&config, cli.fixture.as_deref())?;
    Ok(ExitCode::SUCCESS)
}

/// Run the harness with the real cargo/compiler invoker.
pub fn run_harness(config: &HarnessConfig, fixture: Option<&str>) -> CliResult<RunSummary> {
    let invoker = CargoInvoker::from_config(config);
    let mut orchestrator = Orchestrator::new(config, invoker);
    Ok(orchestrator.run(fixture)?)
}

// ============================================================================
// Tests
// ============================================================================
