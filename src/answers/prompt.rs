//! Terminal interaction for the wizard

use std::io::{BufRead, Write};

use crate::error::Result;

use super::question::parse_yes_no;

/// Source of user input. `None` from `prompt` means input was closed.
pub trait Prompter {
    fn prompt(&mut self, label: &str, default: Option<&str>) -> Result<Option<String>>;

    /// Print a message (validation feedback, suggestions)
    fn notify(&mut self, message: &str);

    /// Yes/no question; closed input takes the default
    fn confirm(&mut self, label: &str, default: bool) -> Result<bool> {
        let shown = if default { "Y/n" } else { "y/N" };
        loop {
            let Some(line) = self.prompt(&format!("{} [{}]", label, shown), None)? else {
                return Ok(default);
            };
            if line.trim().is_empty() {
                return Ok(default);
            }
            match parse_yes_no(&line) {
                Some(answer) => return Ok(answer),
                None => self.notify("Please answer 'y' or 'n'."),
            }
        }
    }
}

/// Line-based prompter over any reader/writer pair
pub struct TerminalPrompter<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl TerminalPrompter<std::io::StdinLock<'static>, std::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn prompt(&mut self, label: &str, default: Option<&str>) -> Result<Option<String>> {
        match default {
            Some(d) => write!(self.writer, "{} [{}]: ", label, d)?,
            None => write!(self.writer, "{}: ", label)?,
        }
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn notify(&mut self, message: &str) {
        let _ = writeln!(self.writer, "{}", message);
    }
}

/// Prompter with line editing and history
#[cfg(feature = "readline")]
pub struct ReadlinePrompter {
    editor: rustyline::DefaultEditor,
}

#[cfg(feature = "readline")]
impl ReadlinePrompter {
    pub fn new() -> Result<Self> {
        let editor = rustyline::DefaultEditor::new()
            .map_err(|e| crate::error::ScaffoldError::Collaborator(e.to_string()))?;
        Ok(Self { editor })
    }
}

#[cfg(feature = "readline")]
impl Prompter for ReadlinePrompter {
    fn prompt(&mut self, label: &str, default: Option<&str>) -> Result<Option<String>> {
        use rustyline::error::ReadlineError;

        let prompt = match default {
            Some(d) => format!("{} [{}]: ", label, d),
            None => format!("{}: ", label),
        };
        match self.editor.readline(&prompt) {
            Ok(line) => {
                let _ = self.editor.add_history_entry(line.as_str());
                Ok(Some(line))
            }
            Err(ReadlineError::Eof) => Ok(None),
            Err(ReadlineError::Interrupted) => Err(crate::error::ScaffoldError::Interrupted),
            Err(e) => Err(crate::error::ScaffoldError::Collaborator(e.to_string())),
        }
    }

    fn notify(&mut self, message: &str) {
        println!("{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_prompt_shows_default() {
        let mut prompter = TerminalPrompter::new(Cursor::new("value\n"), Vec::new());
        let answer = prompter.prompt("Project name", Some("demo")).unwrap();
        assert_eq!(answer.as_deref(), Some("value"));
        let out = String::from_utf8(prompter.into_writer()).unwrap();
        assert_eq!(out, "Project name [demo]: ");
    }

    #[test]
    fn test_prompt_eof() {
        let mut prompter = TerminalPrompter::new(Cursor::new(""), Vec::new());
        assert_eq!(prompter.prompt("Anything", None).unwrap(), None);
    }

    #[test]
    fn test_confirm_reprompts_on_garbage() {
        let mut prompter = TerminalPrompter::new(Cursor::new("what\ny\n"), Vec::new());
        assert!(prompter.confirm("Continue?", false).unwrap());
        let out = String::from_utf8(prompter.into_writer()).unwrap();
        assert!(out.contains("Please answer 'y' or 'n'."));
    }

    #[test]
    fn test_confirm_default_on_empty() {
        let mut prompter = TerminalPrompter::new(Cursor::new("\n"), Vec::new());
        assert!(prompter.confirm("Continue?", true).unwrap());
    }
}
