//! Harness configuration
//!
//! All paths, tool names and the pinned compiler revision are resolved once at
//! startup into a `HarnessConfig` and passed by reference to every component.
//! Nothing in the pipeline reads the process environment after that point.
//!
//! ## Layout (relative to `base_dir`)
//!
//! ```text
//! codegen-tests/<fixture>/...     fixtures root
//! templates/<name>.template       manifest templates
//! tmp/harness/<fixture>/...       harness slot (wiped per fixture)
//! tmp/target/                     CARGO_TARGET_DIR for every child process
//! ../Cargo.toml                   compiler manifest
//! ```

use std::env;
use std::path::{Path, PathBuf};

use crate::version::PINNED_COMPILER_REVISION;

use super::errors::DiscoveryError;

/// Overrides the directory all default paths are resolved against.
pub const ENV_BASE_DIR: &str = "HARNESS_BASE_DIR";
/// Points at an already-built compiler binary instead of `<target>/debug/lavish`.
pub const ENV_COMPILER: &str = "HARNESS_COMPILER";
/// Overrides the `cargo` program used for the compiler build and test runs.
pub const ENV_CARGO: &str = "HARNESS_CARGO";

/// Build output location shared by every child process of a run.
///
/// Constructed once and never mutated; invokers apply it to each child as
/// `CARGO_TARGET_DIR` rather than touching the harness's own environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildEnvironment {
    target_dir: PathBuf,
}

impl BuildEnvironment {
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_dir: target_dir.into(),
        }
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// Environment variables every child process receives.
    pub fn vars(&self) -> [(&'static str, &Path); 1] {
        [("CARGO_TARGET_DIR", self.target_dir.as_path())]
    }
}

/// Harness configuration
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Directory every default path is relative to
    pub base_dir: PathBuf,
    /// One subdirectory per fixture
    pub fixtures_dir: PathBuf,
    /// Holds `<name>.template` files
    pub templates_dir: PathBuf,
    /// Shared scratch directory, wiped and repopulated per fixture
    pub harness_root: PathBuf,
    /// Build output override for all child processes
    pub build_env: BuildEnvironment,
    /// Manifest of the compiler itself
    pub compiler_manifest: PathBuf,
    /// Binary name produced by the compiler build
    pub compiler_name: String,
    /// Explicit compiler binary, bypassing `<target>/debug/<compiler_name>`
    pub compiler_override: Option<PathBuf>,
    /// Program used for the compiler build and for test runs
    pub cargo_program: PathBuf,
    /// File whose presence marks a directory as a buildable workspace
    pub marker_file: String,
    /// Logical template name rendered into `<slot>/<manifest_template>`
    pub manifest_template: String,
    /// Compiler revision embedded into every rendered manifest
    pub pinned_revision: String,
}

impl HarnessConfig {
    /// Create a config with the default layout rooted at `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        let scratch_dir = base_dir.join("tmp");
        Self {
            fixtures_dir: base_dir.join("codegen-tests"),
            templates_dir: base_dir.join("templates"),
            harness_root: scratch_dir.join("harness"),
            build_env: BuildEnvironment::new(scratch_dir.join("target")),
            compiler_manifest: base_dir.join("..").join("Cargo.toml"),
            compiler_name: "lavish".to_string(),
            compiler_override: None,
            cargo_program: PathBuf::from("cargo"),
            marker_file: "lavish-rules".to_string(),
            manifest_template: "Cargo.toml".to_string(),
            pinned_revision: PINNED_COMPILER_REVISION.to_string(),
            base_dir,
        }
    }

    /// Build the config from the current directory and the `HARNESS_*` overrides.
    ///
    /// This is the only place the harness reads its own environment.
    pub fn from_env() -> std::io::Result<Self> {
        let base_dir = match env::var_os(ENV_BASE_DIR) {
            Some(dir) => PathBuf::from(dir),
            None => env::current_dir()?,
        };
        let mut config = Self::new(base_dir);
        if let Some(compiler) = env::var_os(ENV_COMPILER) {
            config.compiler_override = Some(PathBuf::from(compiler));
        }
        if let Some(cargo) = env::var_os(ENV_CARGO) {
            config.cargo_program = PathBuf::from(cargo);
        }
        Ok(config)
    }

    /// Set the fixtures root
    pub fn with_fixtures_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fixtures_dir = dir.into();
        self
    }

    /// Set the templates directory
    pub fn with_templates_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.templates_dir = dir.into();
        self
    }

    /// Set the harness root
    pub fn with_harness_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.harness_root = dir.into();
        self
    }

    /// Set the build output directory
    pub fn with_target_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.build_env = BuildEnvironment::new(dir);
        self
    }

    /// Use an explicit compiler binary
    pub fn with_compiler(mut self, path: impl Into<PathBuf>) -> Self {
        self.compiler_override = Some(path.into());
        self
    }

    /// Set the program used for compiler builds and test runs
    pub fn with_cargo_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.cargo_program = program.into();
        self
    }

    /// Set the workspace marker file name
    pub fn with_marker_file(mut self, name: impl Into<String>) -> Self {
        self.marker_file = name.into();
        self
    }

    /// Path of the compiler binary used for `build <workspace>` calls.
    pub fn compiler_path(&self) -> PathBuf {
        match &self.compiler_override {
            Some(path) => path.clone(),
            None => self
                .build_env
                .target_dir()
                .join("debug")
                .join(format!("{}{}", self.compiler_name, env::consts::EXE_SUFFIX)),
        }
    }

    /// Check the layout before any work starts.
    pub fn validate(&self) -> Result<(), DiscoveryError> {
        if !self.fixtures_dir.is_dir() {
            return Err(DiscoveryError::MissingRoot {
                path: self.fixtures_dir.clone(),
            });
        }
        Ok(())
    }
}
