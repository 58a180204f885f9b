//! Bridges the engine's log callback onto `tracing`.

use std::sync::Arc;

use super::APP_TAG;
use crate::srtp::{LogHandler, LogLevel};

/// Handler to install into the engine.
pub fn handler() -> LogHandler {
    Arc::new(|level: LogLevel, msg: &str| forward(level, msg))
}

/// Re-emit one engine log line at the matching severity.
///
/// An unknown severity is reported at error level and the message is
/// still emitted.
pub fn forward(level: LogLevel, msg: &str) {
    match level {
        LogLevel::Error => tracing::error!(target: APP_TAG, "{}", msg),
        LogLevel::Warning => tracing::warn!(target: APP_TAG, "{}", msg),
        LogLevel::Info => tracing::info!(target: APP_TAG, "{}", msg),
        LogLevel::Debug => tracing::debug!(target: APP_TAG, "{}", msg),
        LogLevel::Unknown(code) => {
            tracing::error!(
                target: APP_TAG,
                "SRTP log handler called with an unexpected level of {}.",
                code
            );
            tracing::error!(target: APP_TAG, "{}", msg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_capture::capture;

    #[test]
    fn test_known_levels_map_one_to_one() {
        let ((), lines) = capture(|| {
            forward(LogLevel::Error, "e-msg");
            forward(LogLevel::Warning, "w-msg");
            forward(LogLevel::Info, "i-msg");
            forward(LogLevel::Debug, "d-msg");
        });
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("ERROR") && lines[0].ends_with("e-msg"));
        assert!(lines[1].starts_with(" WARN") && lines[1].ends_with("w-msg"));
        assert!(lines[2].starts_with(" INFO") && lines[2].ends_with("i-msg"));
        assert!(lines[3].starts_with("DEBUG") && lines[3].ends_with("d-msg"));
        assert!(lines.iter().all(|l| l.contains(APP_TAG)));
    }

    #[test]
    fn test_unknown_level_keeps_message() {
        for code in [4, 99, -1] {
            let ((), lines) = capture(|| forward(LogLevel::from(code), "kernel says hi"));
            assert_eq!(lines.len(), 2);
            assert!(lines[0].starts_with("ERROR"));
            assert!(lines[0].contains(&format!("unexpected level of {}", code)));
            assert!(lines[1].starts_with("ERROR"));
            assert!(lines[1].ends_with("kernel says hi"));
        }
    }

    #[test]
    fn test_handler_forwards() {
        let h = handler();
        let ((), lines) = capture(|| h(LogLevel::Warning, "from engine"));
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("from engine"));
    }
}
