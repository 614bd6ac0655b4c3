//! Line-oriented terminal I/O for the navigator.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Read-line / write-line access to the user.
pub trait Terminal {
    /// Show `prompt` and read one line without its line ending.
    ///
    /// Returns `Ok(None)` at end of input.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Write one line of output.
    fn write_line(&mut self, line: &str) -> io::Result<()>;
}

/// Terminal on the process's stdin and stdout.
#[derive(Debug, Default)]
pub struct StdTerminal;

impl StdTerminal {
    pub fn new() -> Self {
        Self
    }
}

impl Terminal for StdTerminal {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(prompt.as_bytes())?;
        stdout.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(io::stdout().lock(), "{line}")
    }
}

/// Terminal that replays scripted input and captures everything written.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTerminal {
    input: VecDeque<String>,
    prompts: Vec<String>,
    output: Vec<String>,
}

impl ScriptedTerminal {
    pub fn new<I, S>(input: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            input: input.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
            output: Vec::new(),
        }
    }

    /// Every prompt shown, in order.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Every line written, in order.
    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Whether any written line equals `line`.
    pub fn printed(&self, line: &str) -> bool {
        self.output.iter().any(|l| l == line)
    }

    /// Input lines not yet consumed.
    pub fn remaining(&self) -> usize {
        self.input.len()
    }
}

impl Terminal for ScriptedTerminal {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.input.pop_front())
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.output.push(line.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_terminal_replays_then_reports_eof() {
        let mut term = ScriptedTerminal::new(["goto", "Optics"]);
        assert_eq!(term.read_line("Enter a command: ").unwrap().as_deref(), Some("goto"));
        assert_eq!(term.read_line("Enter the concept: ").unwrap().as_deref(), Some("Optics"));
        assert_eq!(term.read_line("Enter a command: ").unwrap(), None);
        assert_eq!(term.prompts().len(), 3);
        assert_eq!(term.remaining(), 0);
    }

    #[test]
    fn scripted_terminal_captures_output() {
        let mut term = ScriptedTerminal::default();
        term.write_line("Physics").unwrap();
        term.write_line("").unwrap();
        assert!(term.printed("Physics"));
        assert!(!term.printed("Chemistry"));
        assert_eq!(term.output(), ["Physics", ""]);
    }
}
