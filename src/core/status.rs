//! LR-012: Read-only status report — three independent checks.

use super::error::DispatchResult;
use super::hasher;
use super::layout::Layout;
use super::state::{query_env_lenient, EnvState};
use super::types::{Check, Manifest, StatusReport};
use crate::transport::Runner;

/// Build the report. Each check is computed on its own; one failing
/// never influences another.
pub fn report(layout: &Layout, manifest: &Manifest, runner: &dyn Runner) -> StatusReport {
    StatusReport {
        config: check_config(layout),
        results: check_results(layout),
        environment: check_environment(manifest, runner),
    }
}

fn check_config(layout: &Layout) -> Check {
    let name = layout.rel(&layout.config).to_string();
    if !layout.config.is_file() {
        return Check {
            name,
            ok: false,
            detail: "missing (created from template by `labrun run`)".to_string(),
        };
    }
    let detail = match hasher::hash_file(&layout.config) {
        Ok(h) => format!("present ({})", hasher::short(&h)),
        Err(e) => format!("present (unreadable: {})", e),
    };
    Check {
        name,
        ok: true,
        detail,
    }
}

fn check_results(layout: &Layout) -> Check {
    let name = format!("{}/", layout.rel(&layout.results));
    if !layout.results.is_dir() {
        return Check {
            name,
            ok: false,
            detail: "missing".to_string(),
        };
    }
    let detail = match hasher::dir_size(&layout.results) {
        Ok(bytes) => format!("present ({})", hasher::human_size(bytes)),
        Err(e) => format!("present (size unknown: {})", e),
    };
    Check {
        name,
        ok: true,
        detail,
    }
}

fn check_environment(manifest: &Manifest, runner: &dyn Runner) -> Check {
    let name = format!("environment '{}'", manifest.env_name);
    let (ok, detail) = match query_env_lenient(manifest, runner) {
        Ok(EnvState::Present) => (true, "present".to_string()),
        Ok(EnvState::Absent) => (false, "missing (run `labrun setup`)".to_string()),
        Ok(EnvState::Unknown(code)) => (
            false,
            format!("{} env list exited with status {}", manifest.env_manager, code),
        ),
        Ok(EnvState::NotQueried) => (false, "not queried".to_string()),
        Err(msg) => (false, msg),
    };
    Check { name, ok, detail }
}

/// Render the report for the terminal.
pub fn render(report: &StatusReport) -> String {
    let mut out = String::new();
    for check in report.checks() {
        let mark = if check.ok { "ok" } else { "MISSING" };
        out.push_str(&format!("  [{:>7}] {}: {}\n", mark, check.name, check.detail));
    }
    out
}

/// Render the report as pretty JSON.
pub fn render_json(report: &StatusReport) -> DispatchResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
