use crate::capture_config::{SampleInterval, TriggerEdge};

/// Outbound commands understood by the analyzer firmware.
///
/// Every frame starts with a single tag octet. Only [`Command::SetSampleInterval`]
/// carries a payload: six ASCII digits, with no separator or terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SetSampleInterval(SampleInterval),
    TriggerOn(TriggerEdge),
    Capture,
    QueryFifo,
    RestartSampler,
}

impl Command {
    pub const SET_SAMPLE_INTERVAL_TAG: u8 = b'u';
    pub const TRIGGER_RISING_TAG: u8 = b'o';
    pub const TRIGGER_FALLING_TAG: u8 = b'z';
    pub const CAPTURE_TAG: u8 = b'c';
    pub const QUERY_FIFO_TAG: u8 = b'q';
    pub const RESTART_SAMPLER_TAG: u8 = b'r';

    /// Leading octet identifying the command.
    pub fn tag(&self) -> u8 {
        match self {
            Command::SetSampleInterval(_) => Self::SET_SAMPLE_INTERVAL_TAG,
            Command::TriggerOn(TriggerEdge::RisingFromLow) => Self::TRIGGER_RISING_TAG,
            Command::TriggerOn(TriggerEdge::FallingFromHigh) => Self::TRIGGER_FALLING_TAG,
            Command::Capture => Self::CAPTURE_TAG,
            Command::QueryFifo => Self::QUERY_FIFO_TAG,
            Command::RestartSampler => Self::RESTART_SAMPLER_TAG,
        }
    }

    /// Number of CR-LF terminated lines the device answers with.
    pub fn reply_lines(&self) -> usize {
        match self {
            Command::SetSampleInterval(_) => 2,
            Command::TriggerOn(_) | Command::Capture | Command::QueryFifo => 1,
            Command::RestartSampler => 4,
        }
    }

    /// Complete frame as written to the wire.
    pub fn encode(&self) -> Vec<u8> {
        let mut frame = vec![self.tag()];
        if let Command::SetSampleInterval(interval) = self {
            frame.extend_from_slice(interval.encode().as_bytes());
        }
        frame
    }

    /// Human readable name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Command::SetSampleInterval(_) => "set sample interval",
            Command::TriggerOn(TriggerEdge::RisingFromLow) => "trigger on rising edge",
            Command::TriggerOn(TriggerEdge::FallingFromHigh) => "trigger on falling edge",
            Command::Capture => "capture",
            Command::QueryFifo => "query fifo",
            Command::RestartSampler => "restart sampler",
        }
    }
}
