//! # pico-la-rs
//!
//! Host side client for a Raspberry Pi Pico running a PIO logic analyzer.
//!
//! The firmware speaks a small line oriented protocol over USB serial: single
//! byte command tags, CR-LF terminated replies, and captures delivered as one
//! line of ASCII digits. This crate configures the sample interval and trigger
//! edge, runs a capture and turns the payload into a time series.
//!
//! ## Features
//!
//! - **Typed command set**: every wire frame comes from [`Command`]
//! - **Bounded reads**: replies are read with a configurable inactivity timeout
//! - **Capture decoding**: digit payloads become samples with a time axis
//! - **DataFrame output**: uses `polars` to hand samples to a plotter or CSV
//!
//! ## Examples
//!
//! ### Capture
//!
//! ```rust,no_run
//! use pico_la_rs::{CapturePlan, PicoConnector, SampleInterval, SessionConfig, TimeSeries, TriggerEdge};
//!
//! let config = SessionConfig::new().with_port("/dev/ttyACM0");
//! let mut analyzer = PicoConnector::connect(&config)?;
//!
//! let plan = CapturePlan::new(SampleInterval::from_micros(56)?, TriggerEdge::RisingFromLow);
//! let capture = analyzer.run_capture(plan)?;
//! capture.save(&config.capture_file)?;
//!
//! let series = TimeSeries::from_capture(&capture, plan.interval)?;
//! println!("Captured {} samples", series.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ### Decoding
//!
//! ```rust
//! use pico_la_rs::capture::{build_time_axis, decode};
//!
//! let samples = decode("0110").unwrap();
//! assert_eq!(samples, vec![0, 1, 1, 0]);
//!
//! let times = build_time_axis(samples.len(), 0.5).unwrap();
//! assert_eq!(times, vec![0.0, 0.5, 1.0, 1.5]);
//! ```
//!
//! ### Wire format
//!
//! ```rust
//! use pico_la_rs::{Command, SampleInterval};
//!
//! let interval = SampleInterval::from_micros(56).unwrap();
//! assert_eq!(Command::SetSampleInterval(interval).encode(), b"u000056".to_vec());
//! ```

pub mod capture;
pub mod capture_config;
pub mod command;
pub mod config;
pub mod pico_analyzer;
pub mod pico_connector;
pub mod serial_terminal;

#[cfg(test)]
pub(crate) mod mock_channel;

pub use capture::{CaptureError, CaptureFileError, CaptureResult, DecodeError, TimeSeries};
pub use capture_config::{CapturePlan, ConfigError, SampleInterval, TriggerEdge};
pub use command::Command;
pub use config::SessionConfig;
pub use pico_analyzer::PicoAnalyzer;
pub use pico_connector::{PicoConnector, PicoConnectorError, PicoDevice};
pub use serial_terminal::{PicoTerminal, ProtocolError};

/// Any failure of a connect, capture, decode and store run.
#[derive(Debug, thiserror::Error)]
pub enum PicoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Capture file error: {0}")]
    CaptureFile(#[from] CaptureFileError),

    #[error("Connection error: {0}")]
    Connector(#[from] PicoConnectorError),

    #[error("DataFrame error: {0}")]
    DataFrame(#[from] polars::prelude::PolarsError),
}
