//! LR-002: Project layout — the fixed file-path contract.

use super::types::Manifest;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "labrun.yaml";

/// Resolved absolute-or-root-relative paths of every conventional artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub root: PathBuf,
    pub config: PathBuf,
    pub config_template: PathBuf,
    pub snakefile: PathBuf,
    pub env_file: PathBuf,
    pub dockerfile: PathBuf,
    pub results: PathBuf,
    pub tests: PathBuf,
    pub docs: PathBuf,
    /// Docs landing page (`docs/index.md`)
    pub docs_index: PathBuf,
    pub dag: PathBuf,
    pub scripts: PathBuf,
    pub mkdocs_config: PathBuf,
    /// Engine working state (`.snakemake/`)
    pub engine_state: PathBuf,
    pub logs: PathBuf,
    /// Transient intermediate outputs (`tmp/`)
    pub tmp: PathBuf,
}

impl Layout {
    /// Conventional layout rooted at `root`.
    pub fn new(root: &Path) -> Self {
        Self::resolve(root, &Manifest::default())
    }

    /// Apply manifest path overrides on top of the conventions.
    pub fn resolve(root: &Path, manifest: &Manifest) -> Self {
        let p = &manifest.paths;
        let pick = |o: &Option<PathBuf>, default: &str| {
            root.join(o.as_deref().unwrap_or(Path::new(default)))
        };
        Self {
            root: root.to_path_buf(),
            config: pick(&p.config, "config/config.yaml"),
            config_template: pick(&p.config_template, "config/config.template.yaml"),
            snakefile: pick(&p.snakefile, "workflow/Snakefile"),
            env_file: pick(&p.env_file, "environment.yml"),
            dockerfile: pick(&p.dockerfile, "Dockerfile"),
            results: pick(&p.results, "results"),
            tmp: pick(&p.tmp, "tmp"),
            tests: pick(&p.tests, "tests"),
            docs: pick(&p.docs, "docs"),
            docs_index: pick(&p.docs, "docs").join(crate::resources::docs::INDEX_FILE),
            dag: pick(&p.dag, "docs/dag.png"),
            scripts: pick(&p.scripts, "scripts"),
            mkdocs_config: root.join("mkdocs.yml"),
            engine_state: root.join(".snakemake"),
            logs: root.join("logs"),
        }
    }

    /// Display a path relative to the root where possible.
    pub fn rel<'a>(&self, path: &'a Path) -> std::path::Display<'a> {
        path.strip_prefix(&self.root).unwrap_or(path).display()
    }

    /// Glob patterns for compiled-cache artifacts under the root.
    pub fn cache_patterns(&self) -> Vec<String> {
        let root = self.root.to_string_lossy();
        let root = glob::Pattern::escape(root.trim_end_matches('/'));
        vec![
            format!("{}/**/__pycache__", root),
            format!("{}/**/*.pyc", root),
        ]
    }
}
