//! File-backed tracing setup. The terminal is owned by the UI, so log output
//! never goes to stdout or stderr.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing::Level;

use crate::error::{IoResultExt, Result};

/// Parse a config level name, falling back to `INFO` for anything unknown.
pub fn parse_level(level: &str) -> (Level, Option<String>) {
    match level.trim().parse::<Level>() {
        Ok(parsed) => (parsed, None),
        Err(_) => (
            Level::INFO,
            Some(format!("unknown log level {:?}, using info", level)),
        ),
    }
}

/// Install the global subscriber writing to `path`.
///
/// Returns a warning for an unrecognised level so the caller can log it once
/// the subscriber is live.
pub fn init(path: &Path, level: &str) -> Result<Option<String>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).at(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .at(path)?;

    let (level, warning) = parse_level(level);
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .init();
    Ok(warning)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_levels_parse() {
        assert_eq!(parse_level("debug"), (Level::DEBUG, None));
        assert_eq!(parse_level("WARN"), (Level::WARN, None));
        assert_eq!(parse_level(" trace "), (Level::TRACE, None));
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        let (level, warning) = parse_level("loud");
        assert_eq!(level, Level::INFO);
        assert!(warning.unwrap().contains("loud"));
    }
}
