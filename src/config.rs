use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::serial_terminal::{DEFAULT_MAX_LINE_LEN, DEFAULT_REPLY_TIMEOUT};

pub const DEFAULT_BAUD_RATE: u32 = 115_200;
pub const DEFAULT_CAPTURE_FILE: &str = "data1.txt";

/// Everything needed to open and drive one analyzer session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Serial device path. `None` picks the first discovered analyzer.
    pub port: Option<String>,
    pub baud_rate: u32,
    /// Longest silence tolerated while waiting for a reply.
    pub read_timeout: Duration,
    /// Longest time one complete reply may take.
    pub reply_timeout: Duration,
    /// Longest reply line accepted, in bytes.
    pub max_line_len: usize,
    /// Timeout of a single read on the serial port.
    pub poll_interval: Duration,
    pub capture_file: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: Duration::from_secs(10),
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
            max_line_len: DEFAULT_MAX_LINE_LEN,
            poll_interval: Duration::from_millis(10),
            capture_file: PathBuf::from(DEFAULT_CAPTURE_FILE),
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.port = Some(port.into());
        self
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn with_reply_timeout(mut self, reply_timeout: Duration) -> Self {
        self.reply_timeout = reply_timeout;
        self
    }

    pub fn with_max_line_len(mut self, max_line_len: usize) -> Self {
        self.max_line_len = max_line_len;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_capture_file(mut self, path: impl AsRef<Path>) -> Self {
        self.capture_file = path.as_ref().to_path_buf();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.port, None);
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.capture_file, PathBuf::from("data1.txt"));
    }

    #[test]
    fn test_builder() {
        let config = SessionConfig::new()
            .with_port("/dev/ttyACM1")
            .with_read_timeout(Duration::from_millis(250))
            .with_reply_timeout(Duration::from_secs(2))
            .with_max_line_len(4096)
            .with_capture_file("/tmp/run.txt");
        assert_eq!(config.port.as_deref(), Some("/dev/ttyACM1"));
        assert_eq!(config.read_timeout, Duration::from_millis(250));
        assert_eq!(config.reply_timeout, Duration::from_secs(2));
        assert_eq!(config.max_line_len, 4096);
        assert_eq!(config.capture_file, PathBuf::from("/tmp/run.txt"));
    }
}
