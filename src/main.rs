use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use spellwalk::cli::{output, OutputFormat, TerminalOperator};
use spellwalk::config::{AbortPolicy, Overrides};
use spellwalk::{dict, logging, Config, FileTraverser, SpellChecker};
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "spellwalk")]
#[command(
    version,
    about = "Interactively spellcheck every file under a directory",
    long_about = None
)]
struct Cli {
    /// Directory (or single file) to check
    #[arg(value_name = "ROOT", default_value = ".")]
    root: PathBuf,

    /// Word list or compiled .dict file
    #[arg(short = 'd', long = "dict", env = "SPELLWALK_DICT")]
    dictionary: Option<PathBuf>,

    /// Also check hidden files and directories
    #[arg(long)]
    hidden: bool,

    /// Follow symbolic links
    #[arg(long)]
    follow_links: bool,

    /// Ask about every word but write nothing
    #[arg(long)]
    dry_run: bool,

    /// Characters of context shown on each side of a word
    #[arg(long, value_name = "CHARS")]
    context: Option<usize>,

    /// What to do with the current file's edits on quit (discard, commit)
    #[arg(long, value_name = "POLICY")]
    on_abort: Option<AbortPolicy>,

    /// Pattern to ignore (regex)
    #[arg(long)]
    ignore_pattern: Vec<String>,

    /// Do not add replacement words to the session dictionary
    #[arg(long)]
    no_learn_replacements: bool,

    /// Summary format (text, json)
    #[arg(short = 'o', long, default_value = "text")]
    format: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completion: Option<Shell>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Dictionary management
    Dict {
        #[command(subcommand)]
        action: DictCommands,
    },
}

#[derive(Parser, Debug)]
enum DictCommands {
    /// Show where dictionaries are looked for
    List,
    /// Compile a word list into a fast .dict file
    Compile {
        /// Plain word list, one word per line
        word_list: PathBuf,
        /// Output path (defaults to the data directory)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show dictionary info
    Info {
        /// Dictionary path (defaults to the one that would be used)
        path: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Handle shell completion generation
    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "spellwalk", &mut io::stdout());
        return Ok(());
    }

    // Handle subcommands
    if let Some(command) = cli.command {
        return handle_command(command, cli.dictionary);
    }

    if !cli.root.exists() {
        anyhow::bail!("Root not found: {}", cli.root.display());
    }

    // Load configuration
    let config = Config::load(
        &cli.root,
        Overrides {
            dictionary: cli.dictionary.clone(),
            ignore_patterns: cli.ignore_pattern.clone(),
            hidden: cli.hidden,
            follow_links: cli.follow_links,
            context_width: cli.context,
            on_abort: cli.on_abort,
            no_learn_replacements: cli.no_learn_replacements,
            dry_run: cli.dry_run,
        },
    )?;

    let colored = !cli.no_color;

    // Nothing is touched until the dictionary has loaded
    let dict_path = dict::manager::resolve_dictionary(config.dictionary.as_deref());
    let dictionary =
        dict::manager::load_dictionary(&dict_path, console::user_attended_stderr())?;

    let traverser = FileTraverser::new(&cli.root)
        .hidden(config.hidden)
        .follow_links(config.follow_links);

    let mut checker = SpellChecker::new(dictionary, TerminalOperator::new(colored), &config);
    let report = checker.run(&traverser)?;

    output::print_summary(&report, cli.format, colored);

    if report.write_failures() > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn handle_command(command: Commands, dictionary: Option<PathBuf>) -> Result<()> {
    match command {
        Commands::Dict { action } => match action {
            DictCommands::List => {
                dict::manager::list_dictionaries(dictionary.as_deref())?;
            }
            DictCommands::Compile { word_list, output } => {
                dict::manager::compile_dictionary(&word_list, output.as_deref())?;
            }
            DictCommands::Info { path } => {
                let path = path.unwrap_or_else(|| {
                    dict::manager::resolve_dictionary(dictionary.as_deref())
                });
                dict::manager::show_info(&path)?;
            }
        },
    }
    Ok(())
}
