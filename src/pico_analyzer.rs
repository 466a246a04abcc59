use std::io::{Read, Write};
use std::time::Duration;

use crate::capture::CaptureResult;
use crate::capture_config::{CapturePlan, SampleInterval, TriggerEdge};
use crate::command::Command;
use crate::config::SessionConfig;
use crate::serial_terminal::{PicoTerminal, ProtocolError};

/// Reply to `q` when the sampler has not pushed a word yet.
pub const EMPTY_FIFO_REPLY: &str = "No data in logic analyzer FIFO";

/// Protocol client for the Pico logic analyzer firmware.
///
/// Each call writes one command and blocks until every reply line for it has
/// been read, so the host and device never get out of step. After a failed
/// exchange every call returns [`ProtocolError::OutOfStep`]; open a new
/// session to retry. `C` is either an owned port (`Box<dyn SerialPort>`) or a
/// borrowed one (`&mut port`).
#[derive(Debug)]
pub struct PicoAnalyzer<C> {
    serial: PicoTerminal<C>,
}

impl<C: Read + Write> PicoAnalyzer<C> {
    /// Create an analyzer session with default reply limits.
    pub fn new(channel: C, read_timeout: Duration) -> Self {
        Self {
            serial: PicoTerminal::new(channel, read_timeout),
        }
    }

    /// Create an analyzer session with the timeouts and limits of `config`.
    pub fn from_config(channel: C, config: &SessionConfig) -> Self {
        let serial = PicoTerminal::new(channel, config.read_timeout)
            .with_reply_timeout(config.reply_timeout)
            .with_max_line_len(config.max_line_len);
        Self { serial }
    }

    /// True once an exchange failed; the session then refuses all commands.
    pub fn is_out_of_step(&self) -> bool {
        self.serial.is_out_of_step()
    }

    /// Send `u` plus six digits and wait for the two acknowledgment lines.
    #[tracing::instrument(skip_all, fields(interval = %interval))]
    pub fn configure_sample_rate(
        &mut self,
        interval: SampleInterval,
    ) -> Result<Vec<String>, ProtocolError> {
        log::debug!(
            "Configuring sample interval of {} as '{}'",
            interval,
            interval.encode()
        );
        let ack = self.serial.exec(Command::SetSampleInterval(interval))?;
        for line in &ack {
            log::debug!("Device: {}", line);
        }
        Ok(ack)
    }

    /// Select the edge that arms the next capture and read its acknowledgment.
    #[tracing::instrument(skip_all, fields(edge = %edge))]
    pub fn configure_trigger_edge(&mut self, edge: TriggerEdge) -> Result<String, ProtocolError> {
        let mut ack = self.serial.exec(Command::TriggerOn(edge))?;
        let line = ack.remove(0);
        log::debug!("Trigger set to {} edge. Device: {}", edge, line);
        Ok(line)
    }

    /// Trigger an acquisition and read the single line of samples.
    #[tracing::instrument(skip_all)]
    pub fn capture(&mut self) -> Result<CaptureResult, ProtocolError> {
        #[cfg(feature = "cpu-profiling")]
        let _span = tracy_client::span!("PicoAnalyzer::capture");

        let mut reply = self.serial.exec(Command::Capture)?;
        let capture = CaptureResult::new(reply.remove(0));
        log::debug!("Captured {} samples", capture.sample_count());
        Ok(capture)
    }

    /// Pop one raw word from the sampler's receive FIFO, if there is one.
    pub fn query_fifo(&mut self) -> Result<Option<u32>, ProtocolError> {
        let command = Command::QueryFifo;
        let mut reply = self.serial.exec(command)?;
        let line = reply.remove(0);
        if line == EMPTY_FIFO_REPLY {
            return Ok(None);
        }
        let word = line
            .strip_prefix("0x")
            .and_then(|hex| u32::from_str_radix(hex, 16).ok());
        match word {
            Some(word) => Ok(Some(word)),
            None => Err(ProtocolError::UnexpectedReply {
                command: command.name(),
                reply: line,
            }),
        }
    }

    /// Stop, clear and restart the sampling state machine.
    ///
    /// Returns the device's diagnostic output (program counter before and
    /// after, state machine and offset in use).
    pub fn restart_sampler(&mut self) -> Result<Vec<String>, ProtocolError> {
        let lines = self.serial.exec(Command::RestartSampler)?;
        for line in &lines {
            log::debug!("Device: {}", line);
        }
        Ok(lines)
    }

    /// Run interval, trigger edge and capture in order.
    pub fn run_capture(&mut self, plan: CapturePlan) -> Result<CaptureResult, ProtocolError> {
        self.configure_sample_rate(plan.interval)?;
        self.configure_trigger_edge(plan.edge)?;
        self.capture()
    }

    /// Hand the channel back to the caller.
    pub fn into_inner(self) -> C {
        self.serial.into_inner()
    }
}
