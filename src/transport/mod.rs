//! LR-010: Process runner abstraction.
//!
//! Every external tool (conda, snakemake, dot, pytest, docker, …) is reached
//! through [`Runner`], so plans can be executed against a recording mock.

pub mod local;
#[cfg(test)]
pub mod mock;

use crate::core::error::DispatchResult;
use crate::core::types::Invocation;

pub use local::LocalRunner;

/// Captured output from a process.
#[derive(Debug, Clone)]
pub struct ExecOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// The narrow interface to the outside world.
///
/// A program that cannot be found must surface as
/// `DispatchError::ToolNotFound`, never as a non-zero exit code.
pub trait Runner {
    /// Run with inherited stdio and return the exit code.
    fn run(&self, inv: &Invocation) -> DispatchResult<i32>;

    /// Run with captured stdout/stderr (queries such as `conda env list`).
    fn capture(&self, inv: &Invocation) -> DispatchResult<ExecOutput>;

    /// Feed `producer`'s stdout into `consumer`'s stdin. Returns the
    /// consumer's code if it failed, otherwise the producer's.
    fn pipe(&self, producer: &Invocation, consumer: &Invocation) -> DispatchResult<i32>;

    /// Whether `program` resolves on this host.
    fn has_program(&self, program: &str) -> bool;
}
