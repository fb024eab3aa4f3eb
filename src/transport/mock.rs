//! Recording runner for tests: scripted exit codes, no real processes.

use super::{ExecOutput, Runner};
use crate::core::error::{DispatchError, DispatchResult};
use crate::core::types::Invocation;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

/// Every program is present and exits 0 unless configured otherwise.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: RefCell<Vec<Invocation>>,
    exit_codes: HashMap<String, i32>,
    stdout: HashMap<String, String>,
    missing: HashSet<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exit(mut self, program: &str, code: i32) -> Self {
        self.exit_codes.insert(program.to_string(), code);
        self
    }

    pub fn with_stdout(mut self, program: &str, out: &str) -> Self {
        self.stdout.insert(program.to_string(), out.to_string());
        self
    }

    pub fn without(mut self, program: &str) -> Self {
        self.missing.insert(program.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    /// Recorded invocations rendered as command lines.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|i| i.to_string()).collect()
    }

    fn record(&self, inv: &Invocation) -> DispatchResult<i32> {
        if self.missing.contains(&inv.program) {
            return Err(DispatchError::ToolNotFound(inv.program.clone()));
        }
        self.calls.borrow_mut().push(inv.clone());
        Ok(self.exit_codes.get(&inv.program).copied().unwrap_or(0))
    }
}

impl Runner for RecordingRunner {
    fn run(&self, inv: &Invocation) -> DispatchResult<i32> {
        self.record(inv)
    }

    fn capture(&self, inv: &Invocation) -> DispatchResult<ExecOutput> {
        let exit_code = self.record(inv)?;
        Ok(ExecOutput {
            exit_code,
            stdout: self.stdout.get(&inv.program).cloned().unwrap_or_default(),
            stderr: String::new(),
        })
    }

    fn pipe(&self, producer: &Invocation, consumer: &Invocation) -> DispatchResult<i32> {
        let up = self.record(producer)?;
        let down = self.record(consumer)?;
        Ok(if down != 0 { down } else { up })
    }

    fn has_program(&self, program: &str) -> bool {
        !self.missing.contains(program)
    }
}
