//! Codegen test orchestration
//!
//! ## Pipeline
//!
//! ```text
//! build compiler ─▶ select fixtures ─▶ for each fixture:
//!     reset harness root ─▶ copy fixture ─▶ render Cargo.toml
//!     ─▶ lavish build <each workspace> ─▶ cargo test
//! ```
//!
//! Everything runs sequentially on the calling thread. The first error moves the
//! orchestrator to `Stage::Aborted` and is returned unchanged; remaining
//! fixtures are never started.
//!
//! ## Modules
//!
//! - `config` - Paths, tool names and the pinned compiler revision
//! - `discovery` - Fixture enumeration
//! - `materialize` - Harness slot reset and recursive copy
//! - `template` - Strict `{{ variable }}` rendering
//! - `locator` - Marker-file workspace discovery
//! - `invoker` - External process calls

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod config;
pub mod discovery;
pub mod errors;
pub mod invoker;
pub mod locator;
pub mod materialize;
pub mod template;

use std::fmt;

use config::HarnessConfig;
use discovery::{Fixture, discover_fixtures};
use errors::HarnessError;
use invoker::BuildInvoker;
use locator::locate_workspaces;
use materialize::{HarnessSlot, materialize};
use template::{TemplateContext, TemplateRenderer};

/// Orchestrator state.
///
/// `Done` and `Aborted` are terminal. Per-fixture states carry the fixture name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Init,
    BuildingCompiler,
    SelectingFixtures,
    PreparingFixture(String),
    RenderingConfig(String),
    BuildingWorkspaces(String),
    RunningTests(String),
    Done,
    Aborted,
}

impl Stage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Done | Stage::Aborted)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Init => write!(f, "init"),
            Stage::BuildingCompiler => write!(f, "building compiler"),
            Stage::SelectingFixtures => write!(f, "selecting fixtures"),
            Stage::PreparingFixture(name) => write!(f, "preparing {name}"),
            Stage::RenderingConfig(name) => write!(f, "rendering config for {name}"),
            Stage::BuildingWorkspaces(name) => write!(f, "building workspaces of {name}"),
            Stage::RunningTests(name) => write!(f, "running tests of {name}"),
            Stage::Done => write!(f, "done"),
            Stage::Aborted => write!(f, "aborted"),
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Fixture names, in the order they were processed
    pub fixtures: Vec<String>,
}

/// Drives a whole harness run.
pub struct Orchestrator<'a, I> {
    config: &'a HarnessConfig,
    invoker: I,
    renderer: TemplateRenderer,
    stage: Stage,
}

impl<'a, I: BuildInvoker> Orchestrator<'a, I> {
    pub fn new(config: &'a HarnessConfig, invoker: I) -> Self {
        Self {
            renderer: TemplateRenderer::new(&config.templates_dir),
            config,
            invoker,
            stage: Stage::Init,
        }
    }

    /// Current state of the run
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Run the pipeline for every fixture, or only `filter` when given.
    #[tracing::instrument(skip_all, fields(filter = ?filter))]
    pub fn run(&mut self, filter: Option<&str>) -> Result<RunSummary, HarnessError> {
        match self.run_stages(filter) {
            Ok(summary) => {
                self.enter(Stage::Done);
                tracing::info!(fixtures = summary.fixtures.len(), "All done!");
                Ok(summary)
            }
            Err(err) => {
                tracing::error!(kind = err.kind(), stage = %self.stage, "aborting run");
                self.enter(Stage::Aborted);
                Err(err)
            }
        }
    }

    fn run_stages(&mut self, filter: Option<&str>) -> Result<RunSummary, HarnessError> {
        let config = self.config;

        self.enter(Stage::BuildingCompiler);
        tracing::info!("Building compiler");
        self.invoker.build_compiler(&config.build_env)?;

        self.enter(Stage::SelectingFixtures);
        let fixtures = discover_fixtures(&config.fixtures_dir, filter)?;
        tracing::info!(count = fixtures.len(), "Running codegen tests");

        let mut processed = Vec::with_capacity(fixtures.len());
        for fixture in &fixtures {
            self.run_fixture(fixture)?;
            processed.push(fixture.name.clone());
        }

        Ok(RunSummary { fixtures: processed })
    }

    fn run_fixture(&mut self, fixture: &Fixture) -> Result<(), HarnessError> {
        let config = self.config;
        tracing::info!(fixture = %fixture.name, "Running test");

        self.enter(Stage::PreparingFixture(fixture.name.clone()));
        let slot = HarnessSlot::new(&config.harness_root, &fixture.name)?;
        slot.reset()?;
        materialize(&fixture.source, slot.path())?;

        self.enter(Stage::RenderingConfig(fixture.name.clone()));
        let manifest = slot.path().join(&config.manifest_template);
        let context = TemplateContext::new(&fixture.name, &config.pinned_revision);
        self.renderer
            .render_to_file(&config.manifest_template, &context, &manifest)?;

        self.enter(Stage::BuildingWorkspaces(fixture.name.clone()));
        let workspaces = locate_workspaces(slot.path(), &config.marker_file)?;
        if workspaces.is_empty() {
            tracing::warn!(fixture = %fixture.name, "no workspaces found");
        }
        for workspace in &workspaces {
            self.invoker.build_workspace(&config.build_env, workspace)?;
        }

        self.enter(Stage::RunningTests(fixture.name.clone()));
        self.invoker.run_tests(&config.build_env, &manifest)?;
        Ok(())
    }

    fn enter(&mut self, stage: Stage) {
        tracing::debug!(from = %self.stage, to = %stage, "stage transition");
        self.stage = stage;
    }
}
