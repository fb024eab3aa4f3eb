//! LR-007: Executor — run a plan's steps in order.
//!
//! Steps short-circuit: the first non-zero process exit, explicit failure,
//! or declined confirmation ends the plan. Filesystem steps are idempotent:
//! copies and placeholder writes never overwrite, removals tolerate absence.

use super::error::{DispatchError, DispatchResult};
use super::prompt::Confirm;
use super::types::{Outcome, Plan, Step};
use crate::transport::Runner;
use std::path::{Path, PathBuf};

/// Whether to keep going after a step.
enum Flow {
    Continue,
    Stop(Outcome),
}

struct Ctx<'a> {
    runner: &'a dyn Runner,
    confirm: &'a mut dyn Confirm,
    warned: bool,
    confirmed: bool,
}

/// Execute `plan`, delegating processes to `runner` and the destructive
/// gate to `confirm`.
pub fn execute(
    plan: &Plan,
    runner: &dyn Runner,
    confirm: &mut dyn Confirm,
) -> DispatchResult<Outcome> {
    log::debug!("executing {} ({} steps)", plan.operation, plan.steps.len());
    let mut ctx = Ctx {
        runner,
        confirm,
        warned: false,
        confirmed: false,
    };
    if let Flow::Stop(outcome) = run_steps(&mut ctx, &plan.steps)? {
        return Ok(outcome);
    }
    Ok(if ctx.confirmed {
        Outcome::Confirmed
    } else if ctx.warned {
        Outcome::Warning
    } else {
        Outcome::Success
    })
}

fn run_steps(ctx: &mut Ctx, steps: &[Step]) -> DispatchResult<Flow> {
    for step in steps {
        if let Flow::Stop(outcome) = run_step(ctx, step)? {
            return Ok(Flow::Stop(outcome));
        }
    }
    Ok(Flow::Continue)
}

fn run_step(ctx: &mut Ctx, step: &Step) -> DispatchResult<Flow> {
    match step {
        Step::Note(msg) => log::info!("{}", msg),
        Step::Warn(msg) => {
            log::warn!("{}", msg);
            ctx.warned = true;
        }
        Step::CopyFile { from, to } => copy_if_missing(from, to)?,
        Step::WriteFile { path, contents } => write_if_missing(path, contents)?,
        Step::CreateDir(path) => {
            if !path.is_dir() {
                std::fs::create_dir_all(path).map_err(|e| DispatchError::io(path, e))?;
                log::info!("created {}/", path.display());
            }
        }
        Step::RemoveDir(path) => {
            if remove_tree(path)? {
                log::info!("removed {}", path.display());
            }
        }
        Step::RemoveGlob { pattern, exclude } => remove_matches(pattern, exclude)?,
        Step::Exec(inv) => {
            log::info!("$ {}", inv);
            let code = ctx.runner.run(inv)?;
            if code != 0 {
                log::error!("{} exited with status {}", inv.program, code);
                return Ok(Flow::Stop(Outcome::Failed(code)));
            }
        }
        Step::Pipe { producer, consumer } => {
            log::info!("$ {} | {}", producer, consumer);
            let code = ctx.runner.pipe(producer, consumer)?;
            if code != 0 {
                log::error!("{} | {} exited with status {}", producer.program, consumer.program, code);
                return Ok(Flow::Stop(Outcome::Failed(code)));
            }
        }
        Step::Confirm { prompt, steps } => {
            if !ctx.confirm.confirm(prompt)? {
                log::warn!("aborted, nothing deleted");
                return Ok(Flow::Stop(Outcome::Aborted));
            }
            if let Flow::Stop(outcome) = run_steps(ctx, steps)? {
                return Ok(Flow::Stop(outcome));
            }
            ctx.confirmed = true;
        }
        Step::Fail { reason, code } => {
            log::error!("{}", reason);
            return Ok(Flow::Stop(Outcome::Failed(*code)));
        }
    }
    Ok(Flow::Continue)
}

fn ensure_parent(path: &Path) -> DispatchResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| DispatchError::io(parent, e))?;
        }
    }
    Ok(())
}

fn copy_if_missing(from: &Path, to: &Path) -> DispatchResult<()> {
    if to.exists() {
        log::debug!("{} exists, not copying", to.display());
        return Ok(());
    }
    ensure_parent(to)?;
    std::fs::copy(from, to).map_err(|e| DispatchError::io(from, e))?;
    log::info!("copied {} -> {}", from.display(), to.display());
    Ok(())
}

fn write_if_missing(path: &Path, contents: &str) -> DispatchResult<()> {
    use std::io::Write;
    ensure_parent(path)?;
    let file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path);
    let mut file = match file {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            log::debug!("{} exists, not overwriting", path.display());
            return Ok(());
        }
        Err(e) => return Err(DispatchError::io(path, e)),
    };
    file.write_all(contents.as_bytes())
        .map_err(|e| DispatchError::io(path, e))?;
    log::info!("created {}", path.display());
    Ok(())
}

/// Remove a file or directory tree. Returns whether anything was removed.
fn remove_tree(path: &Path) -> DispatchResult<bool> {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(DispatchError::io(path, e)),
    };
    let res = if meta.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    match res {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(DispatchError::io(path, e)),
    }
}

fn remove_matches(pattern: &str, exclude: &[PathBuf]) -> DispatchResult<()> {
    let mut removed = 0usize;
    for entry in glob::glob(pattern)? {
        match entry {
            Ok(path) if exclude.iter().any(|x| path.starts_with(x)) => {
                log::debug!("keeping {}", path.display());
            }
            // Nested matches under an already-removed directory are gone.
            Ok(path) => {
                if remove_tree(&path)? {
                    removed += 1;
                }
            }
            Err(e) => log::debug!("skipping unreadable path: {}", e),
        }
    }
    if removed > 0 {
        log::info!("removed {} match(es) of {}", removed, pattern);
    }
    Ok(())
}
