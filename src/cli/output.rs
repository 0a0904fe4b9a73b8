use crate::checker::engine::{Context, Decision, Prompt};
use crate::checker::tokenizer::PriorDecision;
use crate::{FileOutcome, FileReport, SessionReport};
use colored::*;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Header, context line and key legend for one unknown word.
pub fn render_prompt(prompt: &Prompt<'_>, colored: bool) -> String {
    let occurrence = prompt.occurrence;
    let header = format!(
        "{} {} line {}:{}",
        "-".repeat(10),
        prompt.path.display(),
        occurrence.line,
        occurrence.column
    );

    let mut out = String::new();
    if colored {
        out.push_str(&format!("\n{}\n", header.dimmed()));
    } else {
        out.push_str(&format!("\n{}\n", header));
    }
    out.push_str(&format!("  {}\n", format_context(&prompt.context, colored)));

    match &occurrence.prior {
        Some(PriorDecision::Skipped) => out.push_str("  (skipped earlier in this file)\n"),
        Some(PriorDecision::Replaced(with)) => {
            out.push_str(&format!("  (replaced with \"{}\" earlier in this file)\n", with))
        }
        None => {}
    }

    let legend = Decision::KEYS
        .iter()
        .map(|(key, _, _)| key.to_string())
        .collect::<Vec<_>>()
        .join("/");
    if colored {
        out.push_str(&format!(
            "Replace {}? {} ",
            occurrence.word.red().bold(),
            legend.cyan()
        ));
    } else {
        out.push_str(&format!("Replace {}? {} ", occurrence.word, legend));
    }
    out
}

/// One line per key, shown after invalid input.
pub fn render_help() -> String {
    Decision::KEYS
        .iter()
        .map(|(key, _, meaning)| format!("  {} - {}", key, meaning))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_context(context: &Context<'_>, colored: bool) -> String {
    let before = if context.truncated_before { "..." } else { "" };
    let after = if context.truncated_after { "..." } else { "" };
    let word = if colored {
        context.word.red().bold().underline().to_string()
    } else {
        context.word.to_string()
    };
    format!(
        "{}{}{}{}{}",
        before, context.before, word, context.after, after
    )
}

/// Short status line for a finished file. Untouched files print nothing.
pub fn render_file_report(report: &FileReport, colored: bool) -> Option<String> {
    let path = report.path.display().to_string();
    let line = match &report.outcome {
        FileOutcome::Untouched { .. } => return None,
        FileOutcome::Committed { edits } => {
            let text = format!("Saved {}: {} {}", path, edits, changes(*edits));
            if colored {
                format!("{} {}", "✓".green().bold(), text)
            } else {
                format!("✓ {}", text)
            }
        }
        FileOutcome::DryRun { edits } => {
            format!("Would save {}: {} {} (dry run)", path, edits, changes(*edits))
        }
        FileOutcome::Discarded { edits } => {
            let text = format!("Discarded {} {} for {}", edits, changes(*edits), path);
            if colored {
                text.yellow().to_string()
            } else {
                text
            }
        }
        FileOutcome::Skipped { reason } => {
            let text = format!("Skipped: {}", reason);
            if colored {
                text.yellow().to_string()
            } else {
                text
            }
        }
        FileOutcome::WriteFailed { edits, reason } => {
            let text = format!(
                "{} {} NOT saved: {}",
                edits,
                changes(*edits),
                reason
            );
            if colored {
                format!("{} {}", "✗".red().bold(), text.red())
            } else {
                format!("✗ {}", text)
            }
        }
    };
    Some(line)
}

fn changes(n: usize) -> &'static str {
    if n == 1 {
        "change"
    } else {
        "changes"
    }
}

pub fn print_summary(report: &SessionReport, format: OutputFormat, colored: bool) {
    match format {
        OutputFormat::Text => print_text_summary(report, colored),
        OutputFormat::Json => match serde_json::to_string_pretty(report) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error: failed to serialize report: {}", e),
        },
    }
}

fn print_text_summary(report: &SessionReport, colored: bool) {
    println!();
    let files = report.files.len();
    let file_word = if files == 1 { "file" } else { "files" };

    if report.aborted {
        let text = "Session aborted.";
        if colored {
            println!("{}", text.yellow().bold());
        } else {
            println!("{}", text);
        }
    }

    let total_fixed = report.corrections();
    if total_fixed == 0 {
        let text = format!("No corrections written ({} {} visited)", files, file_word);
        if colored {
            println!("{}", text.green().bold());
        } else {
            println!("{}", text);
        }
    } else {
        let fix_word = if total_fixed == 1 {
            "correction"
        } else {
            "corrections"
        };
        let changed = report.files_changed();
        if colored {
            println!(
                "{} {} {} applied to {} of {} {}",
                "✓".green().bold(),
                total_fixed.to_string().green().bold(),
                fix_word,
                changed,
                files,
                file_word
            );
        } else {
            println!(
                "✓ {} {} applied to {} of {} {}",
                total_fixed, fix_word, changed, files, file_word
            );
        }
    }

    if report.skipped() > 0 {
        println!("  {} skipped (unreadable or not text)", report.skipped());
    }

    let failures = report.write_failures();
    if failures > 0 {
        let text = format!(
            "✗ {} {} could not be written; their edits were lost",
            failures,
            if failures == 1 { "file" } else { "files" }
        );
        if colored {
            println!("{}", text.red().bold());
        } else {
            println!("{}", text);
        }
    }

    if !report.learned.is_empty() {
        println!("  learned this session: {}", report.learned.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::tokenizer::Tokenizer;
    use std::path::{Path, PathBuf};

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_plain_prompt_rendering() {
        let content = "The quikc fox";
        let mut occurrence = Tokenizer::new(content).occurrences().nth(1).unwrap();
        occurrence.prior = Some(PriorDecision::Skipped);
        let prompt = Prompt {
            path: Path::new("notes.txt"),
            occurrence: &occurrence,
            context: Context::new(content, &occurrence, 40),
        };

        let rendered = render_prompt(&prompt, false);
        assert!(rendered.contains("---------- notes.txt line 1:5"));
        assert!(rendered.contains("  The quikc fox\n"));
        assert!(rendered.contains("skipped earlier"));
        assert!(rendered.ends_with("Replace quikc? y/n/a/s/q "));
    }

    #[test]
    fn test_file_report_lines() {
        let untouched = FileReport {
            path: PathBuf::from("a.txt"),
            outcome: FileOutcome::Untouched { prompts: 2 },
        };
        assert!(render_file_report(&untouched, false).is_none());

        let failed = FileReport {
            path: PathBuf::from("b.txt"),
            outcome: FileOutcome::WriteFailed {
                edits: 2,
                reason: "disk full".to_string(),
            },
        };
        let line = render_file_report(&failed, false).unwrap();
        assert!(line.contains("NOT saved"));
        assert!(line.contains("disk full"));
    }

    #[test]
    fn test_help_lists_every_key() {
        let help = render_help();
        for (key, _, _) in Decision::KEYS {
            assert!(help.contains(&format!("  {} - ", key)));
        }
    }
}
