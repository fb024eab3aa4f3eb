//! LR-001: Core types — manifest schema, operations, plans, outcomes.
//!
//! The manifest types derive Serialize/Deserialize for YAML roundtripping.
//! Plans and outcomes are plain in-memory values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// ============================================================================
// labrun.yaml
// ============================================================================

/// Optional project manifest. Every field has a conventional default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Schema version (must be "1.0")
    #[serde(default = "default_version")]
    pub version: String,

    /// Name of the conda environment
    #[serde(default = "default_env_name")]
    pub env_name: String,

    /// Environment manager binary (conda, mamba, micromamba)
    #[serde(default = "default_env_manager")]
    pub env_manager: String,

    /// Container image name (tagged `latest`)
    #[serde(default = "default_image")]
    pub image: String,

    /// Fixed parallelism for `run`
    #[serde(default = "default_cores")]
    pub cores: u32,

    /// Command re-invoked inside the container by `docker-run`
    #[serde(default = "default_container_command")]
    pub container_command: Vec<String>,

    /// Path overrides, relative to the project root
    #[serde(default)]
    pub paths: PathOverrides,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            version: default_version(),
            env_name: default_env_name(),
            env_manager: default_env_manager(),
            image: default_image(),
            cores: default_cores(),
            container_command: default_container_command(),
            paths: PathOverrides::default(),
        }
    }
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_env_name() -> String {
    "bioinfo-pipeline".to_string()
}

fn default_env_manager() -> String {
    "conda".to_string()
}

fn default_image() -> String {
    "bioinfo-pipeline".to_string()
}

fn default_cores() -> u32 {
    4
}

fn default_container_command() -> Vec<String> {
    vec!["labrun".to_string(), "run".to_string()]
}

/// Per-artifact path overrides. `None` keeps the convention.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathOverrides {
    #[serde(default)]
    pub config: Option<PathBuf>,
    #[serde(default)]
    pub config_template: Option<PathBuf>,
    #[serde(default)]
    pub snakefile: Option<PathBuf>,
    #[serde(default)]
    pub env_file: Option<PathBuf>,
    #[serde(default)]
    pub dockerfile: Option<PathBuf>,
    #[serde(default)]
    pub results: Option<PathBuf>,
    #[serde(default)]
    pub tests: Option<PathBuf>,
    #[serde(default)]
    pub docs: Option<PathBuf>,
    #[serde(default)]
    pub dag: Option<PathBuf>,
    #[serde(default)]
    pub scripts: Option<PathBuf>,
    #[serde(default)]
    pub tmp: Option<PathBuf>,
}

impl PathOverrides {
    /// All set overrides, labelled by field name.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &PathBuf)> {
        [
            ("config", &self.config),
            ("config_template", &self.config_template),
            ("snakefile", &self.snakefile),
            ("env_file", &self.env_file),
            ("dockerfile", &self.dockerfile),
            ("results", &self.results),
            ("tests", &self.tests),
            ("docs", &self.docs),
            ("dag", &self.dag),
            ("scripts", &self.scripts),
            ("tmp", &self.tmp),
        ]
        .into_iter()
        .filter_map(|(name, p)| p.as_ref().map(|p| (name, p)))
    }
}

// ============================================================================
// Operations
// ============================================================================

/// The closed set of planned operations. `status` and `help` are reports
/// and never produce a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Setup,
    UpdateEnv,
    Run,
    RunParallel,
    DryRun,
    Dag,
    Test,
    Lint,
    Clean,
    CleanAll,
    Docs,
    DockerBuild,
    DockerRun,
}

impl Operation {
    pub const ALL: [Operation; 13] = [
        Self::Setup,
        Self::UpdateEnv,
        Self::Run,
        Self::RunParallel,
        Self::DryRun,
        Self::Dag,
        Self::Test,
        Self::Lint,
        Self::Clean,
        Self::CleanAll,
        Self::Docs,
        Self::DockerBuild,
        Self::DockerRun,
    ];

    /// Command-line name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::UpdateEnv => "update-env",
            Self::Run => "run",
            Self::RunParallel => "run-parallel",
            Self::DryRun => "dry-run",
            Self::Dag => "dag",
            Self::Test => "test",
            Self::Lint => "lint",
            Self::Clean => "clean",
            Self::CleanAll => "clean-all",
            Self::Docs => "docs",
            Self::DockerBuild => "docker-build",
            Self::DockerRun => "docker-run",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Plans
// ============================================================================

/// One external process: program plus argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory; `None` inherits the dispatcher's.
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for a in &self.args {
            if a.is_empty() || a.contains(char::is_whitespace) {
                write!(f, " '{}'", a)?;
            } else {
                write!(f, " {}", a)?;
            }
        }
        Ok(())
    }
}

/// A single planned action.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Status line only.
    Note(String),
    /// Warning line; marks the run as a no-op warning outcome.
    Warn(String),
    CopyFile { from: PathBuf, to: PathBuf },
    /// Materialize a placeholder. Never overwrites an existing file.
    WriteFile { path: PathBuf, contents: String },
    CreateDir(PathBuf),
    /// Remove a directory tree; absent is fine.
    RemoveDir(PathBuf),
    /// Remove every file or directory matching a glob pattern,
    /// except matches under an excluded directory.
    RemoveGlob { pattern: String, exclude: Vec<PathBuf> },
    /// Process whose non-zero exit ends the plan; a missing program is fatal.
    Exec(Invocation),
    /// Feed `producer`'s stdout into `consumer`'s stdin.
    Pipe {
        producer: Invocation,
        consumer: Invocation,
    },
    /// Ask before running `steps`; a declined answer aborts.
    Confirm { prompt: String, steps: Vec<Step> },
    /// Stop with a pass-through exit code.
    Fail { reason: String, code: i32 },
}

/// Ordered steps for one operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub operation: Operation,
    pub steps: Vec<Step>,
}

impl Plan {
    /// Every invocation the plan would make, in order (nested gates included).
    pub fn invocations(&self) -> Vec<&Invocation> {
        fn walk<'a>(steps: &'a [Step], out: &mut Vec<&'a Invocation>) {
            for step in steps {
                match step {
                    Step::Exec(inv) => out.push(inv),
                    Step::Pipe { producer, consumer } => {
                        out.push(producer);
                        out.push(consumer);
                    }
                    Step::Confirm { steps, .. } => walk(steps, out),
                    _ => {}
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.steps, &mut out);
        out
    }
}

/// Terminal result of executing a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Nothing was changed on purpose (e.g. environment already present).
    Warning,
    /// The confirmation gate was accepted and the guarded steps ran.
    Confirmed,
    /// The confirmation gate was declined; nothing was mutated.
    Aborted,
    /// A delegated tool exited non-zero; its code is passed through.
    Failed(i32),
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Failed(code) => code,
            _ => 0,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning (no-op)"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Aborted => write!(f, "aborted"),
            Self::Failed(code) => write!(f, "failed (exit {})", code),
        }
    }
}

// ============================================================================
// Status
// ============================================================================

/// One independent pass/fail diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Check {
    pub name: String,
    pub ok: bool,
    pub detail: String,
}

/// Config, results, environment — always exactly three checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub config: Check,
    pub results: Check,
    pub environment: Check,
}

impl StatusReport {
    pub fn checks(&self) -> [&Check; 3] {
        [&self.config, &self.results, &self.environment]
    }
}
