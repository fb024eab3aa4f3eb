//! LR-005: Observed project state — the snapshot plans are computed from.
//!
//! Only what an operation needs is probed: the environment manager is
//! queried for `setup` alone, optional host tools only for `lint` and
//! `docs`. `dag` checks its two required tools up front.

use super::error::{DispatchError, DispatchResult};
use super::layout::Layout;
use super::planner::{GRAPH_RENDERER, WORKFLOW_ENGINE};
use super::types::{Invocation, Manifest, Operation};
use crate::transport::Runner;
use std::collections::BTreeSet;
use std::path::Path;

/// Optional tools probed on `PATH`.
pub const WORKFLOW_LINTER: &str = "snakefmt";
pub const CODE_FORMATTER: &str = "black";
pub const DOCS_BUILDER: &str = "mkdocs";

/// Result of asking the environment manager for its environments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvState {
    Present,
    Absent,
    /// The listing itself exited non-zero.
    Unknown(i32),
    /// Not queried for this operation.
    NotQueried,
}

/// Filesystem and host facts at the moment of invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectState {
    pub config: bool,
    pub config_template: bool,
    pub tests: bool,
    pub docs_index: bool,
    pub mkdocs_config: bool,
    pub dockerfile: bool,
    pub results: bool,
    pub env: EnvState,
    pub tools: BTreeSet<String>,
}

impl ProjectState {
    /// Filesystem-only snapshot.
    pub fn scan(layout: &Layout) -> Self {
        Self {
            config: layout.config.is_file(),
            config_template: layout.config_template.is_file(),
            tests: layout.tests.is_dir(),
            docs_index: layout.docs_index.is_file(),
            mkdocs_config: layout.mkdocs_config.is_file(),
            dockerfile: layout.dockerfile.is_file(),
            results: layout.results.is_dir(),
            env: EnvState::NotQueried,
            tools: BTreeSet::new(),
        }
    }

    pub fn has_tool(&self, program: &str) -> bool {
        self.tools.contains(program)
    }
}

/// Snapshot the state `op` depends on.
pub fn observe(
    op: Operation,
    layout: &Layout,
    manifest: &Manifest,
    runner: &dyn Runner,
) -> DispatchResult<ProjectState> {
    let mut state = ProjectState::scan(layout);
    match op {
        Operation::Setup => {
            state.env = query_env(manifest, runner)?;
        }
        Operation::Dag => {
            // Fail before the output directory is created.
            for tool in [WORKFLOW_ENGINE, GRAPH_RENDERER] {
                if !runner.has_program(tool) {
                    return Err(DispatchError::ToolNotFound(tool.to_string()));
                }
            }
        }
        Operation::Lint | Operation::Docs => {
            for tool in [WORKFLOW_LINTER, CODE_FORMATTER, DOCS_BUILDER] {
                if runner.has_program(tool) {
                    state.tools.insert(tool.to_string());
                }
            }
        }
        _ => {}
    }
    log::debug!("observed state for {}: {:?}", op, state);
    Ok(state)
}

/// The environment manager's listing query.
pub fn env_list_invocation(manifest: &Manifest) -> Invocation {
    Invocation::new(&manifest.env_manager).args(["env", "list"])
}

/// Ask the environment manager whether `manifest.env_name` exists.
/// A missing manager binary is fatal.
pub fn query_env(manifest: &Manifest, runner: &dyn Runner) -> DispatchResult<EnvState> {
    let out = runner.capture(&env_list_invocation(manifest))?;
    if !out.success() {
        log::debug!("{} env list stderr: {}", manifest.env_manager, out.stderr.trim());
        return Ok(EnvState::Unknown(out.exit_code));
    }
    if env_listed(&out.stdout, &manifest.env_name) {
        Ok(EnvState::Present)
    } else {
        Ok(EnvState::Absent)
    }
}

/// Parse `conda env list` output for a named environment.
///
/// Rows are `name [*] prefix`. Unnamed environments show only a prefix
/// and never match: `env create -n` would make a separate named env.
pub fn env_listed(listing: &str, name: &str) -> bool {
    listing
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .filter_map(|l| l.split_whitespace().next())
        .filter(|first| !Path::new(first).has_root())
        .any(|first| first == name)
}

/// Treat a missing manager as an absent environment for read-only reports.
pub fn query_env_lenient(manifest: &Manifest, runner: &dyn Runner) -> Result<EnvState, String> {
    match query_env(manifest, runner) {
        Ok(state) => Ok(state),
        Err(DispatchError::ToolNotFound(p)) => Err(format!("{} not found", p)),
        Err(e) => Err(e.to_string()),
    }
}
