//! Logging setup for the CLI
//!
//! The library only emits `tracing` events; the binary decides where they go. Everything is
//! written to stderr so converted output on stdout stays clean.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable overriding the CLI flags, in `EnvFilter` syntax
pub const LOG_ENV: &str = "NOTES_LOG";

/// Initialize logging from the CLI flags. `--log-level` wins over `--verbose`.
pub fn init_tracing(
    verbose: bool,
    log_level: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let level = match (verbose, log_level) {
        (_, Some(level)) => level,
        (true, None) => "debug",
        (false, None) => "warn",
    };

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(directives(level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .try_init()?;
    Ok(())
}

/// A bare level applies to our crates only; full directives pass through.
fn directives(level: &str) -> String {
    if level.contains('=') {
        level.to_string()
    } else {
        format!("note_babel={level},notes={level}")
    }
}
