//! Line-oriented terminal abstraction
//!
//! Every component that talks to the user receives a `&mut dyn Terminal`
//! explicitly. Production wires it to stdin/stdout/stderr; tests feed a
//! scripted `Cursor` and capture the output buffers.

use crate::EmergencyError;
use std::io::{self, BufRead, Write};

/// A text channel: one input stream, one output stream and one error stream
pub trait Terminal {
    /// Read one line without its terminator. `Ok(None)` at end of input.
    /// Invalid UTF-8 is decoded lossily rather than reported as an error.
    fn read_line(&mut self) -> io::Result<Option<String>>;

    /// Write text without a trailing newline and flush it
    fn print(&mut self, text: &str);

    /// Write a line to the output stream
    fn println(&mut self, text: &str);

    /// Write a line to the error stream
    fn eprintln(&mut self, text: &str);

    /// Show a prompt and read the trimmed answer.
    ///
    /// End of input is fatal: [`EmergencyError::InputExhausted`].
    fn prompt(&mut self, question: &str) -> Result<String, EmergencyError> {
        self.print(question);
        match self.read_line()? {
            Some(line) => Ok(line.trim().to_string()),
            None => Err(EmergencyError::InputExhausted),
        }
    }

    /// Ask a yes/no question; only the affirmative token (any case) counts as yes
    fn confirm(&mut self, question: &str, affirmative: &str) -> Result<bool, EmergencyError> {
        let answer = self.prompt(question)?;
        Ok(is_affirmative(&answer, affirmative))
    }
}

/// Case-insensitive comparison of a trimmed answer against the affirmative token
pub fn is_affirmative(answer: &str, affirmative: &str) -> bool {
    answer.trim().eq_ignore_ascii_case(affirmative.trim())
}

/// Concrete terminal over any reader and pair of writers
pub struct Console<R, W, E> {
    input: R,
    output: W,
    error: E,
}

impl<R: BufRead, W: Write, E: Write> Console<R, W, E> {
    pub fn new(input: R, output: W, error: E) -> Self {
        Self { input, output, error }
    }

    /// Output written so far
    pub fn output(&self) -> &W {
        &self.output
    }

    /// Error output written so far
    pub fn error_output(&self) -> &E {
        &self.error
    }
}

impl Console<io::StdinLock<'static>, io::Stdout, io::Stderr> {
    /// Console bound to the process's standard streams
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout(), io::stderr())
    }
}

impl<R: BufRead, W: Write, E: Write> Terminal for Console<R, W, E> {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut bytes = Vec::new();
        if self.input.read_until(b'\n', &mut bytes)? == 0 {
            return Ok(None);
        }
        while matches!(bytes.last(), Some(b'\n' | b'\r')) {
            bytes.pop();
        }
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }

    // Console writes are best-effort, like println!
    fn print(&mut self, text: &str) {
        let _ = write!(self.output, "{}", text);
        let _ = self.output.flush();
    }

    fn println(&mut self, text: &str) {
        let _ = writeln!(self.output, "{}", text);
    }

    fn eprintln(&mut self, text: &str) {
        let _ = writeln!(self.error, "{}", text);
    }
}
