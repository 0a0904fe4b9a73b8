//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

pub const LOG_ENV: &str = "SPELLWALK_LOG";

/// Default filter for a given `-v` count.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "spellwalk=warn",
        1 => "spellwalk=info",
        _ => "spellwalk=debug",
    }
}

/// Initialize logging to stderr.
///
/// Reads `SPELLWALK_LOG` (e.g. `SPELLWALK_LOG=spellwalk=debug`) and falls back
/// to a level chosen by `verbosity`. Safe to call more than once.
pub fn init_tracing(verbosity: u8) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .with(filter)
            .init();
    });
}
