//! LR-006: Plan generation — observed state in, ordered steps out.
//!
//! Planning is pure: no filesystem access, no processes. Every
//! create-if-missing step is emitted only when the snapshot says the
//! artifact is absent, so replanning after execution yields no writes.

use super::error::{DispatchError, DispatchResult};
use super::layout::Layout;
use super::state::{EnvState, ProjectState, CODE_FORMATTER, DOCS_BUILDER, WORKFLOW_LINTER};
use super::types::{Invocation, Manifest, Operation, Plan, Step};
use crate::resources::{docs, dockerfile, testsuite};

pub const WORKFLOW_ENGINE: &str = "snakemake";
pub const GRAPH_RENDERER: &str = "dot";
pub const TEST_RUNNER: &str = "pytest";
pub const CONTAINER_TOOL: &str = "docker";
pub const CONTAINER_WORKDIR: &str = "/workspace";

/// Parallelism requested from the workflow engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cores {
    Fixed(u32),
    All,
}

/// Generate the plan for `op` against an observed snapshot.
pub fn plan(
    op: Operation,
    layout: &Layout,
    manifest: &Manifest,
    state: &ProjectState,
) -> DispatchResult<Plan> {
    let steps = match op {
        Operation::Setup => plan_setup(layout, manifest, state),
        Operation::UpdateEnv => plan_update_env(layout, manifest),
        Operation::Run => plan_run(layout, state, Cores::Fixed(manifest.cores))?,
        Operation::RunParallel => plan_run(layout, state, Cores::All)?,
        Operation::DryRun => plan_dry_run(layout, state),
        Operation::Dag => plan_dag(layout, state),
        Operation::Test => plan_test(layout, state),
        Operation::Lint => plan_lint(layout, state),
        Operation::Clean => plan_clean(layout),
        Operation::CleanAll => plan_clean_all(layout),
        Operation::Docs => plan_docs(layout, state),
        Operation::DockerBuild => plan_docker_build(layout, manifest, state),
        Operation::DockerRun => plan_docker_run(layout, manifest),
    };
    Ok(Plan {
        operation: op,
        steps,
    })
}

/// An invocation run from the project root.
fn tool(layout: &Layout, program: &str) -> Invocation {
    Invocation::new(program).current_dir(&layout.root)
}

fn rel(layout: &Layout, path: &std::path::Path) -> String {
    layout.rel(path).to_string()
}

fn plan_setup(layout: &Layout, manifest: &Manifest, state: &ProjectState) -> Vec<Step> {
    let env = &manifest.env_name;
    match state.env {
        EnvState::Present => vec![Step::Warn(format!(
            "environment '{}' already exists; run `labrun update-env` to apply descriptor changes",
            env
        ))],
        EnvState::Absent => vec![
            Step::Note(format!(
                "creating environment '{}' from {}",
                env,
                rel(layout, &layout.env_file)
            )),
            Step::Exec(tool(layout, &manifest.env_manager).args([
                "env".to_string(),
                "create".to_string(),
                "-n".to_string(),
                env.clone(),
                "-f".to_string(),
                rel(layout, &layout.env_file),
            ])),
            Step::Note(format!("environment '{}' created", env)),
        ],
        EnvState::Unknown(code) => vec![Step::Fail {
            reason: format!("{} env list failed", manifest.env_manager),
            code,
        }],
        EnvState::NotQueried => vec![Step::Fail {
            reason: "environment state was not observed".to_string(),
            code: 1,
        }],
    }
}

fn plan_update_env(layout: &Layout, manifest: &Manifest) -> Vec<Step> {
    vec![
        Step::Note(format!(
            "updating environment '{}' from {}",
            manifest.env_name,
            rel(layout, &layout.env_file)
        )),
        Step::Exec(tool(layout, &manifest.env_manager).args([
            "env".to_string(),
            "update".to_string(),
            "-n".to_string(),
            manifest.env_name.clone(),
            "-f".to_string(),
            rel(layout, &layout.env_file),
            "--prune".to_string(),
        ])),
    ]
}

/// `snakemake --snakefile … [--configfile …]`
fn engine(layout: &Layout, with_config: bool) -> Invocation {
    let inv = tool(layout, WORKFLOW_ENGINE)
        .args(["--snakefile".to_string(), rel(layout, &layout.snakefile)]);
    if with_config {
        inv.args(["--configfile".to_string(), rel(layout, &layout.config)])
    } else {
        inv
    }
}

fn plan_run(layout: &Layout, state: &ProjectState, cores: Cores) -> DispatchResult<Vec<Step>> {
    let mut steps = Vec::new();
    if !state.config {
        if !state.config_template {
            return Err(DispatchError::MissingTemplate(layout.config_template.clone()));
        }
        steps.push(Step::Note(format!(
            "{} not found, creating it from {}",
            rel(layout, &layout.config),
            rel(layout, &layout.config_template)
        )));
        steps.push(Step::CopyFile {
            from: layout.config_template.clone(),
            to: layout.config.clone(),
        });
    }
    if !state.results {
        steps.push(Step::CreateDir(layout.results.clone()));
    }
    let cores = match cores {
        Cores::Fixed(n) => n.to_string(),
        Cores::All => "all".to_string(),
    };
    steps.push(Step::Note(format!("running workflow with --cores {}", cores)));
    steps.push(Step::Exec(engine(layout, true).args(["--cores".to_string(), cores])));
    Ok(steps)
}

fn plan_dry_run(layout: &Layout, state: &ProjectState) -> Vec<Step> {
    vec![
        Step::Note("previewing execution plan (no outputs are written)".to_string()),
        Step::Exec(engine(layout, state.config).arg("--dry-run")),
    ]
}

fn plan_dag(layout: &Layout, state: &ProjectState) -> Vec<Step> {
    let mut steps = Vec::new();
    if let Some(parent) = layout.dag.parent() {
        if parent != layout.root {
            steps.push(Step::CreateDir(parent.to_path_buf()));
        }
    }
    steps.push(Step::Pipe {
        producer: engine(layout, state.config).arg("--dag"),
        consumer: tool(layout, GRAPH_RENDERER).args([
            "-Tpng".to_string(),
            "-o".to_string(),
            rel(layout, &layout.dag),
        ]),
    });
    steps.push(Step::Note(format!(
        "workflow graph written to {}",
        rel(layout, &layout.dag)
    )));
    steps
}

fn plan_test(layout: &Layout, state: &ProjectState) -> Vec<Step> {
    if state.tests {
        return vec![Step::Exec(
            tool(layout, TEST_RUNNER).arg(rel(layout, &layout.tests)),
        )];
    }
    vec![
        Step::CreateDir(layout.tests.clone()),
        Step::WriteFile {
            path: layout.tests.join(testsuite::PLACEHOLDER_FILE),
            contents: testsuite::placeholder().to_string(),
        },
        Step::Note(format!(
            "created placeholder {}/; add tests and re-run",
            rel(layout, &layout.tests)
        )),
    ]
}

fn plan_lint(layout: &Layout, state: &ProjectState) -> Vec<Step> {
    let workflow_dir = layout
        .snakefile
        .parent()
        .map(|p| rel(layout, p))
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| ".".to_string());
    let mut steps = Vec::new();
    if state.has_tool(WORKFLOW_LINTER) {
        steps.push(Step::Exec(
            tool(layout, WORKFLOW_LINTER).args(["--check".to_string(), workflow_dir]),
        ));
    }
    if state.has_tool(CODE_FORMATTER) {
        steps.push(Step::Exec(
            tool(layout, CODE_FORMATTER).args(["--check".to_string(), rel(layout, &layout.scripts)]),
        ));
    }
    steps
}

fn plan_clean(layout: &Layout) -> Vec<Step> {
    let mut steps = vec![
        Step::RemoveDir(layout.tmp.clone()),
        Step::RemoveDir(layout.engine_state.clone()),
        Step::RemoveDir(layout.logs.clone()),
    ];
    steps.extend(
        layout
            .cache_patterns()
            .into_iter()
            .map(|pattern| Step::RemoveGlob {
                pattern,
                exclude: vec![layout.results.clone()],
            }),
    );
    steps.push(Step::Note("transient files removed".to_string()));
    steps
}

fn plan_clean_all(layout: &Layout) -> Vec<Step> {
    let results = rel(layout, &layout.results);
    let mut steps = plan_clean(layout);
    steps.push(Step::Confirm {
        prompt: format!("Delete all of {}/? [y/N] ", results),
        steps: vec![
            Step::RemoveDir(layout.results.clone()),
            Step::CreateDir(layout.results.clone()),
            Step::Note(format!("{}/ emptied", results)),
        ],
    });
    steps
}

fn plan_docs(layout: &Layout, state: &ProjectState) -> Vec<Step> {
    if !state.docs_index {
        let project = layout
            .root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "Pipeline".to_string());
        return vec![
            Step::CreateDir(layout.docs.clone()),
            Step::WriteFile {
                path: layout.docs_index.clone(),
                contents: docs::placeholder(&project),
            },
            Step::Note(format!("created {}", rel(layout, &layout.docs_index))),
        ];
    }
    if state.mkdocs_config && state.has_tool(DOCS_BUILDER) {
        return vec![Step::Exec(tool(layout, DOCS_BUILDER).arg("build"))];
    }
    vec![Step::Note(format!("{}/ ready", rel(layout, &layout.docs)))]
}

fn image_ref(manifest: &Manifest) -> String {
    format!("{}:latest", manifest.image)
}

fn plan_docker_build(layout: &Layout, manifest: &Manifest, state: &ProjectState) -> Vec<Step> {
    if !state.dockerfile {
        return vec![
            Step::WriteFile {
                path: layout.dockerfile.clone(),
                contents: dockerfile::placeholder(layout, &manifest.env_name),
            },
            Step::Note(format!(
                "created placeholder {}; customize it and re-run `labrun docker-build`",
                rel(layout, &layout.dockerfile)
            )),
        ];
    }
    vec![
        Step::Note(format!("building image {}", image_ref(manifest))),
        Step::Exec(tool(layout, CONTAINER_TOOL).args([
            "build".to_string(),
            "-t".to_string(),
            image_ref(manifest),
            "-f".to_string(),
            rel(layout, &layout.dockerfile),
            ".".to_string(),
        ])),
    ]
}

fn plan_docker_run(layout: &Layout, manifest: &Manifest) -> Vec<Step> {
    let mount = format!("{}:{}", layout.root.display(), CONTAINER_WORKDIR);
    vec![Step::Exec(
        tool(layout, CONTAINER_TOOL)
            .args([
                "run".to_string(),
                "--rm".to_string(),
                "-v".to_string(),
                mount,
                "-w".to_string(),
                CONTAINER_WORKDIR.to_string(),
                image_ref(manifest),
            ])
            .args(manifest.container_command.iter().cloned()),
    )]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::path::{Path, PathBuf};

    fn layout() -> Layout {
        Layout::new(Path::new("/proj"))
    }

    fn empty_state() -> ProjectState {
        ProjectState {
            config: false,
            config_template: false,
            tests: false,
            docs_index: false,
            mkdocs_config: false,
            dockerfile: false,
            results: false,
            env: EnvState::NotQueried,
            tools: BTreeSet::new(),
        }
    }

    fn lines(plan: &Plan) -> Vec<String> {
        plan.invocations().iter().map(|i| i.to_string()).collect()
    }

    fn go(op: Operation, state: &ProjectState) -> Plan {
        plan(op, &layout(), &Manifest::default(), state).unwrap()
    }

    #[test]
    fn test_lr006_setup_present_is_warning_only() {
        let state = ProjectState { env: EnvState::Present, ..empty_state() };
        let p = go(Operation::Setup, &state);
        assert_eq!(p.steps.len(), 1);
        assert!(matches!(p.steps[0], Step::Warn(_)));
        assert!(p.invocations().is_empty());
    }

    #[test]
    fn test_lr006_setup_absent_creates() {
        let state = ProjectState { env: EnvState::Absent, ..empty_state() };
        let p = go(Operation::Setup, &state);
        assert_eq!(
            lines(&p),
            vec!["conda env create -n bioinfo-pipeline -f environment.yml"]
        );
    }

    #[test]
    fn test_lr006_setup_listing_failure_passes_code() {
        let state = ProjectState { env: EnvState::Unknown(5), ..empty_state() };
        let p = go(Operation::Setup, &state);
        assert!(matches!(p.steps[0], Step::Fail { code: 5, .. }));
    }

    #[test]
    fn test_lr006_update_env_prunes() {
        let p = go(Operation::UpdateEnv, &empty_state());
        assert_eq!(
            lines(&p),
            vec!["conda env update -n bioinfo-pipeline -f environment.yml --prune"]
        );
    }

    #[test]
    fn test_lr006_run_copies_template_then_runs_with_four_cores() {
        let state = ProjectState { config_template: true, ..empty_state() };
        let p = go(Operation::Run, &state);
        assert!(p.steps.contains(&Step::CopyFile {
            from: PathBuf::from("/proj/config/config.template.yaml"),
            to: PathBuf::from("/proj/config/config.yaml"),
        }));
        assert!(p.steps.contains(&Step::CreateDir(PathBuf::from("/proj/results"))));
        assert_eq!(
            lines(&p),
            vec!["snakemake --snakefile workflow/Snakefile --configfile config/config.yaml --cores 4"]
        );
        assert_eq!(p.invocations()[0].cwd.as_deref(), Some(Path::new("/proj")));
    }

    #[test]
    fn test_lr006_run_with_config_skips_copy() {
        let state = ProjectState { config: true, results: true, ..empty_state() };
        let p = go(Operation::Run, &state);
        assert!(!p.steps.iter().any(|s| matches!(s, Step::CopyFile { .. } | Step::CreateDir(_))));
    }

    #[test]
    fn test_lr006_run_missing_template_is_fatal() {
        let err = plan(Operation::Run, &layout(), &Manifest::default(), &empty_state()).unwrap_err();
        assert!(matches!(err, DispatchError::MissingTemplate(ref p) if p.ends_with("config.template.yaml")));
    }

    #[test]
    fn test_lr006_run_parallel_uses_all_cores() {
        let state = ProjectState { config: true, results: true, ..empty_state() };
        let p = go(Operation::RunParallel, &state);
        assert!(lines(&p)[0].ends_with("--cores all"));
    }

    #[test]
    fn test_lr006_manifest_cores() {
        let m = Manifest { cores: 16, ..Manifest::default() };
        let state = ProjectState { config: true, results: true, ..empty_state() };
        let p = plan(Operation::Run, &layout(), &m, &state).unwrap();
        assert!(lines(&p)[0].ends_with("--cores 16"));
    }

    #[test]
    fn test_lr006_dry_run_never_writes() {
        for state in [empty_state(), ProjectState { config: true, ..empty_state() }] {
            let p = go(Operation::DryRun, &state);
            assert!(p.steps.iter().all(|s| matches!(s, Step::Note(_) | Step::Exec(_))));
            assert!(lines(&p)[0].ends_with("--dry-run"));
            assert_eq!(lines(&p)[0].contains("--configfile"), state.config);
        }
    }

    #[test]
    fn test_lr006_dag_pipes_into_renderer() {
        let p = go(Operation::Dag, &empty_state());
        let pipe = p.steps.iter().find_map(|s| match s {
            Step::Pipe { producer, consumer } => Some((producer, consumer)),
            _ => None,
        });
        let (producer, consumer) = pipe.unwrap();
        assert!(producer.to_string().ends_with("--dag"));
        assert_eq!(consumer.to_string(), "dot -Tpng -o docs/dag.png");
    }

    #[test]
    fn test_lr006_test_scaffolds_when_missing() {
        let p = go(Operation::Test, &empty_state());
        assert!(p.invocations().is_empty());
        assert!(p.steps.contains(&Step::CreateDir(PathBuf::from("/proj/tests"))));
        assert!(p.steps.iter().any(
            |s| matches!(s, Step::WriteFile { path, .. } if path.ends_with("tests/test_placeholder.py"))
        ));
    }

    #[test]
    fn test_lr006_test_runs_pytest_when_present() {
        let state = ProjectState { tests: true, ..empty_state() };
        assert_eq!(lines(&go(Operation::Test, &state)), vec!["pytest tests"]);
    }

    #[test]
    fn test_lr006_lint_skips_absent_tools() {
        assert!(go(Operation::Lint, &empty_state()).steps.is_empty());

        let mut state = empty_state();
        state.tools.insert(CODE_FORMATTER.to_string());
        assert_eq!(lines(&go(Operation::Lint, &state)), vec!["black --check scripts"]);

        state.tools.insert(WORKFLOW_LINTER.to_string());
        assert_eq!(
            lines(&go(Operation::Lint, &state)),
            vec!["snakefmt --check workflow", "black --check scripts"]
        );
    }

    #[test]
    fn test_lr006_clean_targets() {
        let p = go(Operation::Clean, &empty_state());
        assert!(p.steps.contains(&Step::RemoveDir(PathBuf::from("/proj/.snakemake"))));
        assert!(p.steps.contains(&Step::RemoveDir(PathBuf::from("/proj/logs"))));
        assert!(p.steps.contains(&Step::RemoveDir(PathBuf::from("/proj/tmp"))));
        assert!(p.steps.contains(&Step::RemoveGlob {
            pattern: "/proj/**/__pycache__".to_string(),
            exclude: vec![PathBuf::from("/proj/results")],
        }));
        assert!(!p.steps.contains(&Step::RemoveDir(PathBuf::from("/proj/results"))));
        assert!(p.invocations().is_empty());
    }

    #[test]
    fn test_lr006_clean_all_gates_results() {
        let p = go(Operation::CleanAll, &empty_state());
        let gate = p.steps.last().unwrap();
        match gate {
            Step::Confirm { prompt, steps } => {
                assert!(prompt.contains("results/"));
                assert_eq!(steps[0], Step::RemoveDir(PathBuf::from("/proj/results")));
                assert_eq!(steps[1], Step::CreateDir(PathBuf::from("/proj/results")));
            }
            other => panic!("expected confirmation gate, got {:?}", other),
        }
        // Only the gated steps touch results/ itself.
        let ungated = &p.steps[..p.steps.len() - 1];
        assert!(!ungated.contains(&Step::RemoveDir(PathBuf::from("/proj/results"))));
    }

    #[test]
    fn test_lr006_docs_variants() {
        let p = go(Operation::Docs, &empty_state());
        assert!(p.steps.iter().any(
            |s| matches!(s, Step::WriteFile { path, contents } if path.ends_with("docs/index.md") && contents.starts_with("# proj"))
        ));

        let mut state = ProjectState { docs_index: true, ..empty_state() };
        assert!(go(Operation::Docs, &state).invocations().is_empty());

        state.mkdocs_config = true;
        assert!(go(Operation::Docs, &state).invocations().is_empty());

        state.tools.insert(DOCS_BUILDER.to_string());
        assert_eq!(lines(&go(Operation::Docs, &state)), vec!["mkdocs build"]);
    }

    #[test]
    fn test_lr006_docker_build_placeholder_without_build() {
        let p = go(Operation::DockerBuild, &empty_state());
        assert!(p.invocations().is_empty());
        assert!(matches!(&p.steps[0], Step::WriteFile { path, .. } if path == Path::new("/proj/Dockerfile")));
    }

    #[test]
    fn test_lr006_docker_build_with_dockerfile() {
        let state = ProjectState { dockerfile: true, ..empty_state() };
        assert_eq!(
            lines(&go(Operation::DockerBuild, &state)),
            vec!["docker build -t bioinfo-pipeline:latest -f Dockerfile ."]
        );
    }

    #[test]
    fn test_lr006_docker_run_mounts_root() {
        assert_eq!(
            lines(&go(Operation::DockerRun, &empty_state())),
            vec!["docker run --rm -v /proj:/workspace -w /workspace bioinfo-pipeline:latest labrun run"]
        );
    }

    #[test]
    fn test_lr006_every_operation_plans() {
        let state = ProjectState {
            config: true,
            config_template: true,
            env: EnvState::Absent,
            ..empty_state()
        };
        for op in Operation::ALL {
            let p = go(op, &state);
            assert_eq!(p.operation, op);
        }
    }
}
