//! LR-013: CLI subcommands — the flat operation namespace.
//!
//! Each variant's doc comment is its one-line description; `labrun help`
//! reads them back from the clap command tree.

use crate::core::error::{DispatchError, DispatchResult};
use crate::core::layout::{Layout, MANIFEST_FILE};
use crate::core::prompt::{self, Confirm};
use crate::core::types::{Manifest, Operation, Outcome};
use crate::core::{executor, parser, planner, state, status};
use crate::transport::{LocalRunner, Runner};
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "labrun",
    version,
    about = "Task dispatcher for bioinformatics project templates",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Project root
    #[arg(short = 'C', long, global = true, default_value = ".")]
    pub project_dir: PathBuf,

    /// Manifest path (default: <project-dir>/labrun.yaml)
    #[arg(long, global = true)]
    pub manifest: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Create the conda environment from environment.yml unless it already exists
    Setup,

    /// Apply environment.yml to the existing environment, pruning removed packages
    UpdateEnv,

    /// Run the workflow with the default core count, creating the config from its template if needed
    Run,

    /// Run the workflow on all available cores
    RunParallel,

    /// Preview the workflow's execution plan without producing outputs
    DryRun,

    /// Render the workflow graph with Graphviz
    Dag,

    /// Run the test suite, scaffolding tests/ on first use
    Test,

    /// Lint the workflow and check script formatting with whichever tools are installed
    Lint,

    /// Remove temporary outputs, workflow engine state, logs and Python caches
    Clean,

    /// Clean, then delete all results after confirmation
    CleanAll,

    /// Scaffold docs/ or build it with mkdocs
    Docs,

    /// Build the container image, generating a placeholder Dockerfile if missing
    DockerBuild,

    /// Run the workflow inside the container image
    DockerRun,

    /// Report config, results and environment status
    Status {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List all operations
    Help,
}

impl Commands {
    /// The planned operation behind this command, if any.
    pub fn operation(&self) -> Option<Operation> {
        Some(match self {
            Self::Setup => Operation::Setup,
            Self::UpdateEnv => Operation::UpdateEnv,
            Self::Run => Operation::Run,
            Self::RunParallel => Operation::RunParallel,
            Self::DryRun => Operation::DryRun,
            Self::Dag => Operation::Dag,
            Self::Test => Operation::Test,
            Self::Lint => Operation::Lint,
            Self::Clean => Operation::Clean,
            Self::CleanAll => Operation::CleanAll,
            Self::Docs => Operation::Docs,
            Self::DockerBuild => Operation::DockerBuild,
            Self::DockerRun => Operation::DockerRun,
            Self::Status { .. } | Self::Help => return None,
        })
    }
}

/// Dispatch a parsed command line. Returns the process exit code.
pub fn dispatch(cli: Cli) -> DispatchResult<i32> {
    let runner = LocalRunner::new();
    match cli.command {
        Commands::Help => {
            print!("{}", help_text());
            Ok(0)
        }
        Commands::Status { json } => {
            let (layout, manifest) = load_project(&cli.project_dir, cli.manifest.as_deref())?;
            cmd_status(&layout, &manifest, &runner, json)
        }
        ref cmd => {
            let op = cmd
                .operation()
                .ok_or_else(|| DispatchError::Unplanned(format!("{:?}", cmd)))?;
            let (layout, manifest) = load_project(&cli.project_dir, cli.manifest.as_deref())?;
            let outcome = run_operation(op, &layout, &manifest, &runner, &mut prompt::terminal())?;
            Ok(outcome.exit_code())
        }
    }
}

/// Canonicalize the root, load the manifest and resolve the layout.
fn load_project(project_dir: &Path, manifest: Option<&Path>) -> DispatchResult<(Layout, Manifest)> {
    let root =
        std::fs::canonicalize(project_dir).map_err(|e| DispatchError::io(project_dir, e))?;
    let manifest_path = manifest
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.join(MANIFEST_FILE));
    let manifest = parser::load_manifest(&manifest_path)?;
    Ok((Layout::resolve(&root, &manifest), manifest))
}

/// Observe, plan and execute one operation.
pub fn run_operation(
    op: Operation,
    layout: &Layout,
    manifest: &Manifest,
    runner: &dyn Runner,
    confirm: &mut dyn Confirm,
) -> DispatchResult<Outcome> {
    log::debug!("{} in {}", op, layout.root.display());
    let observed = state::observe(op, layout, manifest, runner)?;
    let plan = planner::plan(op, layout, manifest, &observed)?;
    let outcome = executor::execute(&plan, runner, confirm)?;
    match outcome {
        Outcome::Failed(_) => log::error!("{}: {}", op, outcome),
        _ => log::debug!("{}: {}", op, outcome),
    }
    Ok(outcome)
}

fn cmd_status(
    layout: &Layout,
    manifest: &Manifest,
    runner: &dyn Runner,
    json: bool,
) -> DispatchResult<i32> {
    let report = status::report(layout, manifest, runner);
    if json {
        println!("{}", status::render_json(&report)?);
    } else {
        println!("Project: {}", layout.root.display());
        print!("{}", status::render(&report));
    }
    Ok(0)
}

/// One line per operation, taken from the command doc comments.
pub fn help_text() -> String {
    let cmd = Cli::command();
    let mut out = String::from("labrun: project operations\n\nUsage: labrun [-C <DIR>] <OPERATION>\n\nOperations:\n");
    for sub in cmd.get_subcommands() {
        let about = sub.get_about().map(|a| a.to_string()).unwrap_or_default();
        out.push_str(&format!("  {:<14} {}\n", sub.get_name(), about));
    }
    out
}
