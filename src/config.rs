use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const LOCAL_CONFIG_FILE: &str = ".spellwalk.toml";

/// What happens to the in-progress file's edits when the operator quits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbortPolicy {
    #[default]
    Discard,
    Commit,
}

impl FromStr for AbortPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "discard" => Ok(AbortPolicy::Discard),
            "commit" => Ok(AbortPolicy::Commit),
            _ => Err(format!("Unknown abort policy: {}", s)),
        }
    }
}

impl fmt::Display for AbortPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortPolicy::Discard => write!(f, "discard"),
            AbortPolicy::Commit => write!(f, "commit"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dictionary: Option<PathBuf>,

    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    #[serde(default)]
    pub hidden: bool,

    #[serde(default)]
    pub follow_links: bool,

    #[serde(default = "default_context_width")]
    pub context_width: usize,

    #[serde(default)]
    pub on_abort: AbortPolicy,

    #[serde(default = "default_learn_replacements")]
    pub learn_replacements: bool,

    #[serde(default)]
    pub dry_run: bool,
}

fn default_context_width() -> usize {
    40
}

fn default_learn_replacements() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dictionary: None,
            ignore_patterns: vec![
                r"https?://\S+".to_string(),         // URLs
                r"\b[a-fA-F0-9]{32,}\b".to_string(), // Hashes
                r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}".to_string(), // Emails
            ],
            hidden: false,
            follow_links: false,
            context_width: default_context_width(),
            on_abort: AbortPolicy::Discard,
            learn_replacements: true,
            dry_run: false,
        }
    }
}

/// One config file. Only the keys a file sets are applied over earlier layers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    pub dictionary: Option<PathBuf>,
    pub ignore_patterns: Option<Vec<String>>,
    pub hidden: Option<bool>,
    pub follow_links: Option<bool>,
    pub context_width: Option<usize>,
    pub on_abort: Option<AbortPolicy>,
    pub learn_replacements: Option<bool>,
    pub dry_run: Option<bool>,
}

impl ConfigLayer {
    fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

/// Values given on the command line. `None`/`false` means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub dictionary: Option<PathBuf>,
    pub ignore_patterns: Vec<String>,
    pub hidden: bool,
    pub follow_links: bool,
    pub context_width: Option<usize>,
    pub on_abort: Option<AbortPolicy>,
    pub no_learn_replacements: bool,
    pub dry_run: bool,
}

impl Config {
    /// Load configuration with priority: CLI args > local config > global config > defaults
    pub fn load(root: &Path, overrides: Overrides) -> Result<Self> {
        let mut config = Self::default();

        // Load global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                config = config.merge(ConfigLayer::from_file(&global_path)?);
            }
        }

        // Load local config (overrides global)
        let local_dir = if root.is_dir() {
            root
        } else {
            root.parent().unwrap_or(Path::new("."))
        };
        let local_path = local_dir.join(LOCAL_CONFIG_FILE);
        if local_path.exists() {
            config = config.merge(ConfigLayer::from_file(&local_path)?);
        }

        Ok(config.apply(overrides))
    }

    fn merge(mut self, layer: ConfigLayer) -> Self {
        if let Some(dictionary) = layer.dictionary {
            self.dictionary = Some(dictionary);
        }
        if let Some(patterns) = layer.ignore_patterns {
            self.ignore_patterns = patterns;
        }
        if let Some(hidden) = layer.hidden {
            self.hidden = hidden;
        }
        if let Some(follow_links) = layer.follow_links {
            self.follow_links = follow_links;
        }
        if let Some(width) = layer.context_width {
            self.context_width = width;
        }
        if let Some(policy) = layer.on_abort {
            self.on_abort = policy;
        }
        if let Some(learn) = layer.learn_replacements {
            self.learn_replacements = learn;
        }
        if let Some(dry_run) = layer.dry_run {
            self.dry_run = dry_run;
        }
        self
    }

    fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(dict) = overrides.dictionary {
            self.dictionary = Some(dict);
        }
        if !overrides.ignore_patterns.is_empty() {
            self.ignore_patterns.extend(overrides.ignore_patterns);
        }
        if let Some(width) = overrides.context_width {
            self.context_width = width;
        }
        if let Some(policy) = overrides.on_abort {
            self.on_abort = policy;
        }
        self.hidden |= overrides.hidden;
        self.follow_links |= overrides.follow_links;
        self.dry_run |= overrides.dry_run;
        if overrides.no_learn_replacements {
            self.learn_replacements = false;
        }
        self
    }

    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "spellwalk").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "spellwalk").map(|dirs| dirs.data_dir().to_path_buf())
    }
}
