//! Line relay
//!
//! Turns `<level> <message>` text lines into tracing events so that they
//! reach every installed layer, the counting hook included.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, error, info, trace, warn};

use crate::level::SeverityLevel;

/// A parsed input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayLine<'a> {
    /// Empty or whitespace only
    Blank,
    /// Line naming a known level
    Event {
        level: SeverityLevel,
        message: &'a str,
    },
    /// First word is not a level name
    Unknown(&'a str),
}

/// Split a line into its level word and message
pub fn parse_line(line: &str) -> RelayLine<'_> {
    let line = line.trim();
    if line.is_empty() {
        return RelayLine::Blank;
    }

    let (name, message) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    match SeverityLevel::from_name(name) {
        Some(level) => RelayLine::Event {
            level,
            message: message.trim_start(),
        },
        None => RelayLine::Unknown(name),
    }
}

/// Emit `message` as a tracing event at `level`.
///
/// Panic and fatal go out as ERROR events flagged `panic = true` /
/// `fatal = true`, which the counting hook escalates.
pub fn emit(level: SeverityLevel, message: &str) {
    match level {
        SeverityLevel::Panic => error!(target: "relay", panic = true, "{message}"),
        SeverityLevel::Fatal => error!(target: "relay", fatal = true, "{message}"),
        SeverityLevel::Error => error!(target: "relay", "{message}"),
        SeverityLevel::Warning => warn!(target: "relay", "{message}"),
        SeverityLevel::Info => info!(target: "relay", "{message}"),
        SeverityLevel::Debug => debug!(target: "relay", "{message}"),
        SeverityLevel::Trace => trace!(target: "relay", "{message}"),
    }
}

/// Relay every line of `input` until EOF, returning how many were emitted
pub async fn relay_lines<R>(input: R) -> std::io::Result<u64>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut emitted = 0;

    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            RelayLine::Blank => {}
            RelayLine::Event { level, message } => {
                emit(level, message);
                emitted += 1;
            }
            RelayLine::Unknown(word) => debug!(word, "Skipping line with unrecognized level"),
        }
    }

    Ok(emitted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LevelSet;
    use crate::metrics::{EventHook, LevelCounterStore};
    use std::sync::Arc;
    use tracing_subscriber::prelude::*;

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("   "), RelayLine::Blank);
        assert_eq!(
            parse_line("error disk full"),
            RelayLine::Event {
                level: SeverityLevel::Error,
                message: "disk full",
            }
        );
        assert_eq!(
            parse_line("WARN\t  slow response "),
            RelayLine::Event {
                level: SeverityLevel::Warning,
                message: "slow response",
            }
        );
        assert_eq!(
            parse_line("fatal"),
            RelayLine::Event {
                level: SeverityLevel::Fatal,
                message: "",
            }
        );
        assert_eq!(parse_line("loud something"), RelayLine::Unknown("loud"));
    }

    #[tokio::test]
    async fn test_relayed_lines_are_counted_by_level() {
        let store = Arc::new(LevelCounterStore::new(LevelSet::default()));
        let subscriber = tracing_subscriber::registry().with(EventHook::new(store.clone()));
        let _guard = tracing::subscriber::set_default(subscriber);

        let input = b"panic stack overflow\n\
                      fatal cannot continue\n\
                      error request failed\n\
                      warning retrying\n\
                      \n\
                      info started\n\
                      bogus ignored\n" as &[u8];

        let emitted = relay_lines(input).await.unwrap();

        assert_eq!(emitted, 5);
        assert_eq!(store.snapshot(SeverityLevel::Panic), Some(1));
        assert_eq!(store.snapshot(SeverityLevel::Fatal), Some(1));
        assert_eq!(store.snapshot(SeverityLevel::Error), Some(1));
        assert_eq!(store.snapshot(SeverityLevel::Warning), Some(1));
        assert_eq!(store.snapshot(SeverityLevel::Info), None);
    }
}
