use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};

use crate::command::Command;

/// Longest reply line accepted by default, in bytes.
pub const DEFAULT_MAX_LINE_LEN: usize = 1 << 20;

/// Longest time a complete reply may take by default.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(60);

/// Failures of a command/reply exchange with the analyzer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(
        "Timeout error: '{command}' expected {expected} reply line(s) but got {received} before {timeout:?} of silence. Partial line: '{partial}'"
    )]
    Timeout {
        command: &'static str,
        expected: usize,
        received: usize,
        timeout: Duration,
        partial: String,
    },

    #[error(
        "Reply to '{command}' took longer than {limit:?}: got {received} of {expected} line(s)"
    )]
    ReplyTooSlow {
        command: &'static str,
        expected: usize,
        received: usize,
        limit: Duration,
    },

    #[error("Reply line to '{command}' exceeds {limit} bytes without a line feed")]
    LineTooLong { command: &'static str, limit: usize },

    #[error(
        "Device disconnected: '{command}' expected {expected} reply line(s) but the channel closed after {received}"
    )]
    Disconnected {
        command: &'static str,
        expected: usize,
        received: usize,
    },

    #[error("UTF-8 conversion error in reply to '{command}': {source}")]
    Utf8 {
        command: &'static str,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Unexpected reply to '{command}': '{reply}'")]
    UnexpectedReply { command: &'static str, reply: String },

    #[error("Session is out of step with the device since '{failed}' failed. Reconnect to continue")]
    OutOfStep { failed: &'static str },
}

/// Line oriented view of the serial channel.
///
/// Owns the channel for as long as the session lasts; dropping the terminal
/// releases (and for a real port, closes) it. Once an exchange fails, unread
/// reply bytes may still be on their way, so every later command is refused
/// with [`ProtocolError::OutOfStep`].
#[derive(Debug)]
pub struct PicoTerminal<C> {
    channel: C,
    read_timeout: Duration,
    reply_timeout: Duration,
    max_line_len: usize,
    failed: Option<&'static str>,
}

impl<C: Read + Write> PicoTerminal<C> {
    /// Create a terminal with the default reply limits.
    pub fn new(channel: C, read_timeout: Duration) -> Self {
        Self {
            channel,
            read_timeout,
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
            max_line_len: DEFAULT_MAX_LINE_LEN,
            failed: None,
        }
    }

    /// Cap the total time of one reply, however chatty the device is.
    pub fn with_reply_timeout(mut self, reply_timeout: Duration) -> Self {
        self.reply_timeout = reply_timeout;
        self
    }

    /// Cap the length of a single reply line.
    pub fn with_max_line_len(mut self, max_line_len: usize) -> Self {
        self.max_line_len = max_line_len;
        self
    }

    /// True once an exchange failed and the session must be reopened.
    pub fn is_out_of_step(&self) -> bool {
        self.failed.is_some()
    }

    /// Send `command` and collect exactly as many reply lines as it produces.
    pub fn exec(&mut self, command: Command) -> Result<Vec<String>, ProtocolError> {
        if let Some(failed) = self.failed {
            return Err(ProtocolError::OutOfStep { failed });
        }
        let result = self.send(command).and_then(|()| self.read_lines(command));
        if let Err(e) = &result {
            log::debug!("'{}' failed, refusing further commands: {}", command.name(), e);
            self.failed = Some(command.name());
        }
        result
    }

    /// Write the frame for `command` without waiting for a reply.
    fn send(&mut self, command: Command) -> Result<(), ProtocolError> {
        let frame = command.encode();
        log::debug!(
            "Sending '{}' ({:?})",
            command.name(),
            String::from_utf8_lossy(&frame)
        );
        self.channel.write_all(&frame)?;
        self.channel.flush()?;
        Ok(())
    }

    fn read_lines(&mut self, command: Command) -> Result<Vec<String>, ProtocolError> {
        let expected = command.reply_lines();
        let started = Instant::now();
        let mut lines = Vec::with_capacity(expected);
        while lines.len() < expected {
            let raw = self.read_raw_line(command, expected, lines.len(), started)?;
            let line = String::from_utf8(raw).map_err(|source| ProtocolError::Utf8 {
                command: command.name(),
                source,
            })?;
            let line = line.trim_end_matches(['\r', '\n']).to_string();
            log::trace!("Reply line {} to '{}': {}", lines.len(), command.name(), line);
            lines.push(line);
        }
        Ok(lines)
    }

    /// Read up to and including the next LF.
    ///
    /// `read_timeout` is measured from the last byte received, `reply_timeout`
    /// from the start of the reply.
    fn read_raw_line(
        &mut self,
        command: Command,
        expected: usize,
        received: usize,
        started: Instant,
    ) -> Result<Vec<u8>, ProtocolError> {
        let mut line = Vec::new();
        let mut last_activity = Instant::now();

        loop {
            if started.elapsed() >= self.reply_timeout {
                return Err(ProtocolError::ReplyTooSlow {
                    command: command.name(),
                    expected,
                    received,
                    limit: self.reply_timeout,
                });
            }

            let mut byte = [0u8; 1];
            match self.channel.read(&mut byte) {
                Ok(0) => {
                    return Err(ProtocolError::Disconnected {
                        command: command.name(),
                        expected,
                        received,
                    });
                }
                Ok(_) => {
                    last_activity = Instant::now();
                    if byte[0] == b'\n' {
                        line.push(byte[0]);
                        return Ok(line);
                    }
                    if line.len() >= self.max_line_len {
                        return Err(ProtocolError::LineTooLong {
                            command: command.name(),
                            limit: self.max_line_len,
                        });
                    }
                    line.push(byte[0]);
                }
                Err(e)
                    if matches!(
                        e.kind(),
                        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                    ) =>
                {
                    if last_activity.elapsed() >= self.read_timeout {
                        return Err(ProtocolError::Timeout {
                            command: command.name(),
                            expected,
                            received,
                            timeout: self.read_timeout,
                            partial: String::from_utf8_lossy(&line).into_owned(),
                        });
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Give the channel back, whatever state the session is in.
    pub fn into_inner(self) -> C {
        self.channel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture_config::SampleInterval;
    use crate::mock_channel::MockChannel;

    #[test]
    fn test_exec_strips_terminators() {
        let channel = MockChannel::new(b"first\r\nsecond\r\n");
        let mut terminal = PicoTerminal::new(channel, Duration::from_millis(50));
        let interval = SampleInterval::from_micros(56).unwrap();

        let lines = terminal.exec(Command::SetSampleInterval(interval)).unwrap();

        assert_eq!(lines, vec!["first".to_string(), "second".to_string()]);
        assert_eq!(terminal.into_inner().written(), b"u000056");
    }

    #[test]
    fn test_bare_lf_ends_a_line() {
        let channel = MockChannel::new(b"ok\n");
        let mut terminal = PicoTerminal::new(channel, Duration::from_millis(50));
        let lines = terminal.exec(Command::QueryFifo).unwrap();
        assert_eq!(lines, vec!["ok".to_string()]);
    }

    #[test]
    fn test_closed_channel_is_disconnect() {
        let channel = MockChannel::new(b"only one\r\n");
        let mut terminal = PicoTerminal::new(channel, Duration::from_millis(50));
        let interval = SampleInterval::from_micros(56).unwrap();

        match terminal.exec(Command::SetSampleInterval(interval)) {
            Err(ProtocolError::Disconnected {
                expected, received, ..
            }) => {
                assert_eq!(expected, 2);
                assert_eq!(received, 1);
            }
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_silent_channel_times_out() {
        let channel = MockChannel::new(b"partial").silent_when_drained();
        let mut terminal = PicoTerminal::new(channel, Duration::from_millis(20));

        match terminal.exec(Command::Capture) {
            Err(ProtocolError::Timeout {
                partial, received, ..
            }) => {
                assert_eq!(partial, "partial");
                assert_eq!(received, 0);
            }
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_utf8_reply() {
        let channel = MockChannel::new(b"\xff\xfe\r\n");
        let mut terminal = PicoTerminal::new(channel, Duration::from_millis(50));
        assert!(matches!(
            terminal.exec(Command::Capture),
            Err(ProtocolError::Utf8 { .. })
        ));
    }

    #[test]
    fn test_failed_exchange_blocks_later_commands() {
        let channel = MockChannel::new(b"")
            .then_silence(Duration::from_millis(40))
            .then_reply(b"0101\r\n");
        let mut terminal = PicoTerminal::new(channel, Duration::from_millis(20));

        assert!(matches!(
            terminal.exec(Command::Capture),
            Err(ProtocolError::Timeout { .. })
        ));
        assert!(terminal.is_out_of_step());

        std::thread::sleep(Duration::from_millis(40));
        match terminal.exec(Command::Capture) {
            Err(ProtocolError::OutOfStep { failed }) => assert_eq!(failed, "capture"),
            other => panic!("Unexpected result: {:?}", other),
        }
        // nothing else went out on the wire
        assert_eq!(terminal.into_inner().written(), b"c");
    }

    #[test]
    fn test_endless_line_hits_reply_timeout() {
        let mut channel = MockChannel::new(b"");
        for _ in 0..100 {
            channel = channel
                .then_reply(b"x")
                .then_silence(Duration::from_millis(5));
        }
        let mut terminal = PicoTerminal::new(channel, Duration::from_millis(20))
            .with_reply_timeout(Duration::from_millis(100));
        let start = Instant::now();

        assert!(matches!(
            terminal.exec(Command::Capture),
            Err(ProtocolError::ReplyTooSlow { received: 0, .. })
        ));
        assert!(start.elapsed() < Duration::from_millis(400));
    }

    #[test]
    fn test_line_length_is_capped() {
        let channel = MockChannel::new(&[b'x'; 100]).then_reply(b"\r\n");
        let mut terminal =
            PicoTerminal::new(channel, Duration::from_millis(50)).with_max_line_len(16);

        match terminal.exec(Command::Capture) {
            Err(ProtocolError::LineTooLong { limit, .. }) => assert_eq!(limit, 16),
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_line_at_the_limit_is_accepted() {
        let channel = MockChannel::new(b"0123456789abcdef\r\n");
        let mut terminal =
            PicoTerminal::new(channel, Duration::from_millis(50)).with_max_line_len(17);

        let lines = terminal.exec(Command::Capture).unwrap();
        assert_eq!(lines, vec!["0123456789abcdef".to_string()]);
    }
}
