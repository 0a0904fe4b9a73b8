pub mod output;
pub mod prompt;

pub use output::OutputFormat;
pub use prompt::TerminalOperator;
