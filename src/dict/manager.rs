use crate::checker::dictionary::{read_word_list, DictionaryStore};
use anyhow::{Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};

pub const COMPILED_NAME: &str = "words.dict";

const SYSTEM_WORD_LISTS: [&str; 2] = ["/usr/share/dict/words", "/usr/dict/words"];

/// Where to look for a dictionary, most specific first.
pub fn candidates(configured: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(path) = configured {
        paths.push(path.to_path_buf());
    }
    if let Some(data_dir) = crate::config::Config::data_dir() {
        paths.push(data_dir.join(COMPILED_NAME));
    }
    paths.extend(SYSTEM_WORD_LISTS.iter().map(PathBuf::from));
    paths
}

/// Pick the dictionary to load. An explicitly configured path always wins,
/// even when missing, so the load reports it as unavailable. With nothing
/// installed this falls back to the usual system word list.
pub fn resolve_dictionary(configured: Option<&Path>) -> PathBuf {
    if let Some(path) = configured {
        return path.to_path_buf();
    }
    candidates(None)
        .into_iter()
        .find(|p| p.is_file())
        .unwrap_or_else(|| PathBuf::from(SYSTEM_WORD_LISTS[0]))
}

/// Load a dictionary, showing a spinner for large word lists.
pub fn load_dictionary(path: &Path, show_progress: bool) -> crate::Result<DictionaryStore> {
    let pb = if show_progress {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("Loading dictionary {}", path.display()));
        Some(pb)
    } else {
        None
    };

    let result = DictionaryStore::load(path);

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    result
}

pub fn list_dictionaries(configured: Option<&Path>) -> Result<()> {
    println!("{}", "Dictionary search order:".bold());
    println!();

    let chosen = resolve_dictionary(configured);
    for path in candidates(configured) {
        let marker = if path.is_file() {
            "✓".green()
        } else {
            "✗".red()
        };
        let name = path.display().to_string();
        if path == chosen {
            println!("  {} {} {}", marker, name.cyan().bold(), "(selected)".dimmed());
        } else {
            println!("  {} {}", marker, name);
        }
    }

    Ok(())
}

/// Compile a plain word list into an FST dictionary. Defaults to the data directory.
pub fn compile_dictionary(word_list: &Path, output: Option<&Path>) -> Result<PathBuf> {
    let output = match output {
        Some(path) => path.to_path_buf(),
        None => {
            let data_dir =
                crate::config::Config::data_dir().context("Failed to get data directory")?;
            fs::create_dir_all(&data_dir).context("Failed to create data directory")?;
            data_dir.join(COMPILED_NAME)
        }
    };

    println!(
        "{} {} -> {}",
        "Compiling".cyan().bold(),
        word_list.display(),
        output.display().to_string().dimmed()
    );

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .context("Invalid progress template")?,
    );
    pb.set_message("Reading word list...");

    let words = read_word_list(word_list)
        .with_context(|| format!("Failed to read word list: {}", word_list.display()))?;

    pb.set_message("Building dictionary...");
    let count = DictionaryStore::build_from_words(&words, &output)?;
    pb.finish_and_clear();

    println!(
        "{} {} words written to {}",
        "✓".green().bold(),
        count.to_string().yellow(),
        output.display().to_string().cyan()
    );

    Ok(output)
}

pub fn show_info(path: &Path) -> Result<()> {
    if !path.exists() {
        println!(
            "{} Dictionary {} not found.",
            "✗".red().bold(),
            path.display().to_string().yellow()
        );
        return Ok(());
    }

    let metadata = fs::metadata(path)?;
    let format = if path.extension().and_then(|e| e.to_str()) == Some("dict") {
        "FST (Finite State Transducer)"
    } else {
        "Word list"
    };

    println!("{}", format!("Dictionary: {}", path.display()).bold());
    println!("  Size: {} KB", metadata.len() / 1024);
    println!("  Format: {}", format);

    match DictionaryStore::load(path) {
        Ok(dict) => println!("  Words: {}", dict.len()),
        Err(e) => println!("  {}: {}", "Error loading dictionary".red(), e),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_configured_path_wins_even_when_missing() {
        let missing = Path::new("/definitely/not/here/words");
        assert_eq!(resolve_dictionary(Some(missing)), missing);
        assert_eq!(candidates(Some(missing))[0], missing);
    }

    #[test]
    fn test_system_lists_are_candidates() {
        let paths = candidates(None);
        assert!(paths.contains(&PathBuf::from("/usr/share/dict/words")));
        assert!(paths.contains(&PathBuf::from("/usr/dict/words")));
    }

    #[test]
    fn test_compile_then_load() {
        let dir = tempdir().unwrap();
        let list = dir.path().join("words.txt");
        fs::write(&list, "Zebra\napple\napple\n# comment\n").unwrap();
        let output = dir.path().join("custom.dict");

        let written = compile_dictionary(&list, Some(&output)).unwrap();
        assert_eq!(written, output);

        let dict = load_dictionary(&output, false).unwrap();
        assert_eq!(dict.len(), 2);
        assert!(dict.contains("zebra"));
    }
}
