//! LR-009: Interactive confirmation gate for destructive steps.

use super::error::DispatchResult;
use std::io::{BufRead, Write};

/// Source of yes/no answers.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> DispatchResult<bool>;
}

/// Only a case-insensitive `y` accepts.
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

/// Prompts on a writer and reads one line from a reader.
/// End of input counts as a decline.
pub struct LineConfirm<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LineConfirm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

/// Terminal confirmation: prompt on stderr, answer from stdin.
pub fn terminal() -> LineConfirm<std::io::StdinLock<'static>, std::io::Stderr> {
    LineConfirm::new(std::io::stdin().lock(), std::io::stderr())
}

impl<R: BufRead, W: Write> Confirm for LineConfirm<R, W> {
    fn confirm(&mut self, prompt: &str) -> DispatchResult<bool> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;
        let mut answer = String::new();
        let n = self.input.read_line(&mut answer)?;
        Ok(n > 0 && is_affirmative(&answer))
    }
}

/// Fixed answer, for non-interactive callers.
#[derive(Debug, Clone, Copy)]
pub struct Answer(pub bool);

impl Confirm for Answer {
    fn confirm(&mut self, _prompt: &str) -> DispatchResult<bool> {
        Ok(self.0)
    }
}
