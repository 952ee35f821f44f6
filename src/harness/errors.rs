//! Error taxonomy for the harness pipeline.
//!
//! Each pipeline component has its own error type. `HarnessError` wraps them
//! transparently so the CLI can render one diagnostic with the component's
//! code (`harness::discovery`, `harness::render`, ...) and the underlying cause.
//!
//! None of these errors are recovered: the orchestrator aborts on the first one.

use std::io;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// The fixtures root could not be enumerated.
#[derive(Debug, Error, Diagnostic)]
pub enum DiscoveryError {
    #[error("fixtures directory {} does not exist", .path.display())]
    #[diagnostic(
        code(harness::discovery),
        help("run the harness from the directory containing the fixtures (wrong working directory?)")
    )]
    MissingRoot { path: PathBuf },

    #[error("cannot read fixtures directory {}", .path.display())]
    #[diagnostic(code(harness::discovery))]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Copying a fixture into its harness slot failed.
#[derive(Debug, Error, Diagnostic)]
pub enum MaterializationError {
    #[error("`{name}` is not a fixture name")]
    #[diagnostic(
        code(harness::materialize),
        help("pass the name of a single directory under the fixtures directory")
    )]
    InvalidFixtureName { name: String },

    #[error("cannot reset harness root {}", .path.display())]
    #[diagnostic(code(harness::materialize))]
    ResetSlot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot walk fixture source {}", .path.display())]
    #[diagnostic(code(harness::materialize), help("does the fixture exist under the fixtures directory?"))]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("cannot copy {} to {}", .from.display(), .to.display())]
    #[diagnostic(code(harness::materialize))]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A template could not be loaded, parsed, substituted or written.
#[derive(Debug, Error, Diagnostic)]
pub enum RenderError {
    #[error("template `{name}` not found at {}", .path.display())]
    #[diagnostic(code(harness::render))]
    TemplateNotFound { name: String, path: PathBuf },

    #[error("cannot read template {}", .path.display())]
    #[diagnostic(code(harness::render))]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("template `{template}` {line}:{column}: {message}")]
    #[diagnostic(code(harness::render))]
    Parse {
        template: String,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("template `{template}` line {line}: unresolved variable `{name}`")]
    #[diagnostic(code(harness::render), help("available variables: fixture_name, compiler_revision"))]
    UnresolvedVariable { template: String, name: String, line: usize },

    #[error("cannot write rendered output {}", .path.display())]
    #[diagnostic(code(harness::render))]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// An entry of a materialized fixture could not be read while locating workspaces.
#[derive(Debug, Error, Diagnostic)]
#[error("cannot traverse {}", .path.display())]
#[diagnostic(code(harness::traversal))]
pub struct TraversalError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// An external process (compiler build, `lavish build`, `cargo test`) failed.
#[derive(Debug, Error, Diagnostic)]
pub enum InvocationError {
    #[error("failed to run `{command}`")]
    #[diagnostic(code(harness::invocation))]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` {}", describe_exit(.code))]
    #[diagnostic(code(harness::invocation))]
    Failed { command: String, code: Option<i32> },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {code}"),
        None => "was terminated by a signal".to_string(),
    }
}

/// Any fatal harness failure.
#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Materialization(#[from] MaterializationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Traversal(#[from] TraversalError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Invocation(#[from] InvocationError),
}

impl HarnessError {
    /// Short name of the failing component, as used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            HarnessError::Discovery(_) => "discovery",
            HarnessError::Materialization(_) => "materialization",
            HarnessError::Render(_) => "render",
            HarnessError::Traversal(_) => "traversal",
            HarnessError::Invocation(_) => "invocation",
        }
    }
}
