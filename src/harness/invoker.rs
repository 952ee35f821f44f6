//! External process invocation
//!
//! The `BuildInvoker` trait is the seam between the orchestrator and the tools it
//! drives: the compiler's own build, `lavish build <workspace>`, and
//! `cargo test` on the rendered project. `CargoInvoker` is the real
//! implementation; tests plug in recorders.
//!
//! Every call blocks until the child exits. Children inherit stdio so their
//! output streams live, and receive the run's `BuildEnvironment`.

use std::path::{Path, PathBuf};
use std::process::Command;

use super::config::{BuildEnvironment, HarnessConfig};
use super::errors::InvocationError;
use super::locator::Workspace;

/// Runs the external tools of a harness run.
pub trait BuildInvoker {
    /// Build the compiler itself. Called once, before any fixture.
    fn build_compiler(&self, env: &BuildEnvironment) -> Result<(), InvocationError>;

    /// Run the compiler's `build` subcommand against one workspace.
    fn build_workspace(&self, env: &BuildEnvironment, workspace: &Workspace) -> Result<(), InvocationError>;

    /// Run the test suite of the rendered project.
    fn run_tests(&self, env: &BuildEnvironment, manifest: &Path) -> Result<(), InvocationError>;
}

impl<T: BuildInvoker + ?Sized> BuildInvoker for &T {
    fn build_compiler(&self, env: &BuildEnvironment) -> Result<(), InvocationError> {
        (**self).build_compiler(env)
    }

    fn build_workspace(&self, env: &BuildEnvironment, workspace: &Workspace) -> Result<(), InvocationError> {
        (**self).build_workspace(env, workspace)
    }

    fn run_tests(&self, env: &BuildEnvironment, manifest: &Path) -> Result<(), InvocationError> {
        (**self).run_tests(env, manifest)
    }
}

/// Invokes `cargo` and the built compiler as child processes.
#[derive(Debug, Clone)]
pub struct CargoInvoker {
    cargo: PathBuf,
    compiler_manifest: PathBuf,
    compiler: PathBuf,
}

impl CargoInvoker {
    pub fn new(cargo: impl Into<PathBuf>, compiler_manifest: impl Into<PathBuf>, compiler: impl Into<PathBuf>) -> Self {
        Self {
            cargo: cargo.into(),
            compiler_manifest: compiler_manifest.into(),
            compiler: compiler.into(),
        }
    }

    pub fn from_config(config: &HarnessConfig) -> Self {
        Self::new(
            &config.cargo_program,
            &config.compiler_manifest,
            config.compiler_path(),
        )
    }

    fn cargo(&self, subcommand: &str, manifest: &Path) -> Command {
        let mut cmd = Command::new(&self.cargo);
        cmd.arg(subcommand).arg("--manifest-path").arg(manifest);
        cmd
    }

    /// `cargo build --manifest-path <compiler manifest>`
    pub fn compiler_command(&self) -> Command {
        self.cargo("build", &self.compiler_manifest)
    }

    /// `<compiler> build <workspace>`
    pub fn workspace_command(&self, workspace: &Workspace) -> Command {
        let mut cmd = Command::new(&self.compiler);
        cmd.arg("build").arg(&workspace.path);
        cmd
    }

    /// `cargo test --manifest-path <manifest>`
    pub fn test_command(&self, manifest: &Path) -> Command {
        self.cargo("test", manifest)
    }
}

impl BuildInvoker for CargoInvoker {
    fn build_compiler(&self, env: &BuildEnvironment) -> Result<(), InvocationError> {
        run_verbose(&mut self.compiler_command(), env)
    }

    fn build_workspace(&self, env: &BuildEnvironment, workspace: &Workspace) -> Result<(), InvocationError> {
        run_verbose(&mut self.workspace_command(workspace), env)
    }

    fn run_tests(&self, env: &BuildEnvironment, manifest: &Path) -> Result<(), InvocationError> {
        run_verbose(&mut self.test_command(manifest), env)
    }
}

/// Echo `cmd`, run it to completion, and turn a non-zero exit into an error.
pub fn run_verbose(cmd: &mut Command, env: &BuildEnvironment) -> Result<(), InvocationError> {
    for (key, value) in env.vars() {
        cmd.env(key, value);
    }
    cmd.env("RUST_BACKTRACE", "1");

    let command = describe(cmd);
    tracing::info!("$ {}", command);

    let status = cmd.status().map_err(|source| InvocationError::Spawn {
        command: command.clone(),
        source,
    })?;
    if !status.success() {
        tracing::error!(code = ?status.code(), "process failed: {}", command);
        return Err(InvocationError::Failed {
            command,
            code: status.code(),
        });
    }
    Ok(())
}

/// Program and arguments joined for display.
fn describe(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|part| part.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}
