use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use tracing::warn;

/// Line-oriented terminal the interpreter reads commands from and writes
/// output to.
pub trait Console {
    /// Show `prompt` and read one line without its terminator.
    /// `None` means the input is exhausted.
    fn read_line(&mut self, prompt: &str) -> Option<String>;

    fn write_line(&mut self, text: &str);
}

pub struct StdConsole {
    stdin: io::Stdin,
    stdout: io::Stdout,
}

impl StdConsole {
    pub fn new() -> Self {
        Self {
            stdin: io::stdin(),
            stdout: io::stdout(),
        }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for StdConsole {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        let mut out = self.stdout.lock();
        let _ = write!(out, "{prompt}");
        let _ = out.flush();
        drop(out);

        let mut line = String::new();
        match self.stdin.lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\n', '\r']).to_string()),
            Err(e) => {
                warn!(error = %e, "failed to read input");
                None
            }
        }
    }

    fn write_line(&mut self, text: &str) {
        let _ = writeln!(self.stdout.lock(), "{text}");
    }
}

/// Console fed from a fixed list of input lines, recording everything
/// written and every prompt shown.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    input: VecDeque<String>,
    output: Vec<String>,
    prompts: Vec<String>,
}

impl ScriptedConsole {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            input: lines.into_iter().map(Into::into).collect(),
            output: Vec::new(),
            prompts: Vec::new(),
        }
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn remaining_input(&self) -> usize {
        self.input.len()
    }
}

impl Console for ScriptedConsole {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        self.prompts.push(prompt.to_string());
        self.input.pop_front()
    }

    fn write_line(&mut self, text: &str) {
        self.output.push(text.to_string());
    }
}
