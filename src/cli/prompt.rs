use crate::checker::engine::{Operator, Prompt};
use crate::cli::output::{render_file_report, render_help, render_prompt};
use crate::FileReport;
use console::{Key, Term};
use dialoguer::Input;
use std::io::{self, BufRead, IsTerminal, Write};
use tracing::warn;

/// Operator that talks to a person at the terminal.
///
/// Prompts go to stderr so stdout carries only the session summary. With a
/// real terminal, decisions are single key presses and replacements use a
/// line editor. When stdin is piped, both are read line by line so the tool
/// can be scripted.
pub struct TerminalOperator {
    term: Term,
    interactive: bool,
    colored: bool,
}

impl TerminalOperator {
    pub fn new(colored: bool) -> Self {
        let term = Term::stderr();
        let interactive = term.is_term() && io::stdin().is_terminal();
        Self {
            term,
            interactive,
            colored,
        }
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut input = String::new();
        let read = io::stdin().lock().read_line(&mut input)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(input.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn read_key(&mut self) -> io::Result<Option<String>> {
        match self.term.read_key() {
            Ok(Key::Char(c)) => {
                self.term.write_line(&c.to_string())?;
                Ok(Some(c.to_string()))
            }
            Ok(Key::Escape) => Ok(Some("q".to_string())),
            Ok(Key::Enter) => {
                self.term.write_line("")?;
                Ok(Some(String::new()))
            }
            Ok(_) => Ok(Some(String::new())),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl Operator for TerminalOperator {
    fn ask_decision(&mut self, prompt: &Prompt<'_>) -> io::Result<Option<String>> {
        self.term.write_str(&render_prompt(prompt, self.colored))?;
        self.term.flush()?;

        if self.interactive {
            self.read_key()
        } else {
            self.read_line()
        }
    }

    fn ask_replacement(&mut self, prompt: &Prompt<'_>) -> io::Result<Option<String>> {
        if self.interactive {
            let result = Input::<String>::new()
                .with_prompt("Replacement word")
                .with_initial_text(prompt.occurrence.word.clone())
                .allow_empty(true)
                .interact_text_on(&self.term);
            return match result {
                Ok(text) => Ok(Some(text)),
                Err(dialoguer::Error::IO(e)) if e.kind() == io::ErrorKind::Interrupted => {
                    Ok(None)
                }
                Err(e) => Err(io::Error::new(io::ErrorKind::Other, e)),
            };
        }

        self.term.write_str("Replacement word? ")?;
        self.term.flush()?;
        self.read_line()
    }

    fn rejected(&mut self, input: &str) {
        let message = if input.trim().is_empty() {
            "Please answer with one of:".to_string()
        } else {
            format!(
                "Unrecognized answer \"{}\". Please answer with one of:",
                input.trim()
            )
        };
        let written = self
            .term
            .write_line(&message)
            .and_then(|()| self.term.write_line(&render_help()));
        if let Err(e) = written {
            warn!("failed to show answer help: {}", e);
        }
    }

    fn notify(&mut self, report: &FileReport) {
        if let Some(line) = render_file_report(report, self.colored) {
            if let Err(e) = writeln!(io::stderr(), "{}", line) {
                warn!("failed to report {}: {}", report.path.display(), e);
            }
        }
    }
}
