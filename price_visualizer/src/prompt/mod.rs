//! Line-based interactive prompts.
//!
//! Everything reads through [`Console`] so the loops can be driven from
//! in-memory buffers in tests and from stdin/stdout in the binaries.

pub mod dates;
pub mod symbol;

use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};

pub struct Console<R, W> {
    input: R,
    output: W,
}

impl Console<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Prints `prompt` without a newline and reads one line.
    ///
    /// Returns `None` once input is exhausted. The trailing line terminator
    /// is stripped; other whitespace is kept.
    pub fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            // Keep the transcript readable when stdin closes mid-prompt.
            writeln!(self.output)?;
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    pub fn say(&mut self, message: impl std::fmt::Display) -> io::Result<()> {
        writeln!(self.output, "{message}")
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn ask_strips_line_endings_only() {
        let mut console = Console::new(Cursor::new(" msft \r\nnext\n"), Vec::new());
        assert_eq!(console.ask("? ").unwrap().as_deref(), Some(" msft "));
        assert_eq!(console.ask("? ").unwrap().as_deref(), Some("next"));
        assert_eq!(console.ask("? ").unwrap(), None);
        assert_eq!(String::from_utf8(console.into_output()).unwrap(), "? ? ? \n");
    }
}
