//! Logging bootstrap
//!
//! Components log through `tracing` under their module path (`neo4u::model`,
//! `neo4u::query`, ...). Nothing here is required: without a subscriber,
//! events are dropped. [`init`] installs a default `fmt` subscriber that
//! writes warnings and errors to stderr and everything else to stdout.

use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Default maximum level
pub const DEFAULT_LEVEL: Level = Level::DEBUG;

/// Install the default subscriber at `level`.
///
/// Best-effort: returns `false` if a global subscriber was already set
/// (by an earlier call or by the host application).
pub fn init(level: Level) -> bool {
    let writer = std::io::stderr
        .with_max_level(Level::WARN)
        .or_else(std::io::stdout);

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(writer)
        .try_init()
        .is_ok()
}

/// Install the default subscriber from a level name, falling back to
/// [`DEFAULT_LEVEL`] when the name is not recognised.
pub fn init_with(level: &str) -> bool {
    init(parse_level(level))
}

/// Install the default subscriber at [`DEFAULT_LEVEL`] unless one exists.
pub fn init_default() -> bool {
    init(DEFAULT_LEVEL)
}

fn parse_level(level: &str) -> Level {
    Level::from_str(level.trim()).unwrap_or(DEFAULT_LEVEL)
}
