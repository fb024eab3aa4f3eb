//! LR-011: Local process runner.
//!
//! Invokes programs directly (no shell), so argument vectors are passed
//! through verbatim.

use super::{ExecOutput, Runner};
use crate::core::error::{DispatchError, DispatchResult};
use crate::core::types::Invocation;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};

#[derive(Debug, Default, Clone, Copy)]
pub struct LocalRunner;

impl LocalRunner {
    pub fn new() -> Self {
        Self
    }
}

fn command(inv: &Invocation) -> Command {
    let mut cmd = Command::new(&inv.program);
    cmd.args(&inv.args);
    if let Some(ref dir) = inv.cwd {
        cmd.current_dir(dir);
    }
    cmd
}

fn spawn_error(program: &str, e: std::io::Error) -> DispatchError {
    if e.kind() == std::io::ErrorKind::NotFound {
        DispatchError::ToolNotFound(program.to_string())
    } else {
        DispatchError::Spawn {
            program: program.to_string(),
            source: e,
        }
    }
}

fn wait(program: &str, child: &mut Child) -> DispatchResult<ExitStatus> {
    child.wait().map_err(|e| DispatchError::Spawn {
        program: program.to_string(),
        source: e,
    })
}

/// Killed-by-signal has no exit code.
fn code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

impl Runner for LocalRunner {
    fn run(&self, inv: &Invocation) -> DispatchResult<i32> {
        let mut child = command(inv)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| spawn_error(&inv.program, e))?;
        Ok(code(wait(&inv.program, &mut child)?))
    }

    fn capture(&self, inv: &Invocation) -> DispatchResult<ExecOutput> {
        let output = command(inv)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| spawn_error(&inv.program, e))?;
        Ok(ExecOutput {
            exit_code: code(output.status),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    fn pipe(&self, producer: &Invocation, consumer: &Invocation) -> DispatchResult<i32> {
        let mut upstream = command(producer)
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| spawn_error(&producer.program, e))?;

        let stdin = match upstream.stdout.take() {
            Some(out) => Stdio::from(out),
            None => Stdio::null(),
        };
        let downstream = command(consumer)
            .stdin(stdin)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn();
        let mut downstream = match downstream {
            Ok(child) => child,
            Err(e) => {
                // Reap the producer before surfacing the consumer's failure.
                let _ = upstream.kill();
                let _ = upstream.wait();
                return Err(spawn_error(&consumer.program, e));
            }
        };

        let down = wait(&consumer.program, &mut downstream)?;
        let up = wait(&producer.program, &mut upstream)?;
        // A consumer that exits early takes the producer down with SIGPIPE;
        // its own status is the one worth reporting.
        if !down.success() {
            return Ok(code(down));
        }
        Ok(code(up))
    }

    fn has_program(&self, program: &str) -> bool {
        if program.contains('/') {
            return is_executable(Path::new(program));
        }
        let Some(path) = std::env::var_os("PATH") else {
            return false;
        };
        std::env::split_paths(&path).any(|dir| is_executable(&dir.join(program)))
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
