//! Progress-reporting collaborator
//!
//! Purely observational: nothing written here feeds back into generation.

use std::sync::{Arc, Mutex};
use tracing::info;

/// Sink for human-readable progress lines
pub trait Log {
    fn write(&self, message: &str);
}

/// Forwards progress lines to `tracing` at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl Log for TracingLog {
    fn write(&self, message: &str) {
        info!("{}", message);
    }
}

/// Keeps progress lines in memory; clones share the same buffer
#[derive(Debug, Clone, Default)]
pub struct CapturingLog {
    lines: Arc<Mutex<Vec<String>>>,
}

impl CapturingLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every line written so far
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }
}

impl Log for CapturingLog {
    fn write(&self, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(message.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capturing_log_shares_buffer() {
        let log = CapturingLog::new();
        let handle = log.clone();
        log.write("first");
        handle.write("second");
        assert_eq!(log.lines(), vec!["first".to_string(), "second".to_string()]);
    }
}
