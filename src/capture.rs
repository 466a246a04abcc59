use std::fs::File;
use std::path::Path;

use polars::prelude::*;

use crate::capture_config::{ConfigError, SampleInterval};

pub const TIME_COLUMN_NAME: &str = "time";
pub const VALUE_COLUMN_NAME: &str = "value";
pub const TIME_AXIS_LABEL: &str = "Time [s]";
pub const VALUE_AXIS_LABEL: &str = "Value";

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Sample {index} is '{found}', expected a decimal digit")]
    NonDigit { index: usize, found: char },

    #[error("Capture is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// Failures turning a capture into a [`TimeSeries`].
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum CaptureError {
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Map every character of a capture payload to its digit value.
pub fn decode(raw_text: &str) -> Result<Vec<u8>, DecodeError> {
    #[cfg(feature = "cpu-profiling")]
    let _span = tracy_client::span!("capture::decode");

    raw_text
        .chars()
        .enumerate()
        .map(|(index, found)| {
            found
                .to_digit(10)
                .map(|digit| digit as u8)
                .ok_or(DecodeError::NonDigit { index, found })
        })
        .collect()
}

/// Timestamps `0, d, 2d, ...` for `sample_count` samples spaced `d` seconds apart.
pub fn build_time_axis(
    sample_count: usize,
    seconds_per_sample: f64,
) -> Result<Vec<f64>, ConfigError> {
    if sample_count == 0 {
        return Ok(Vec::new());
    }
    check_seconds_per_sample(seconds_per_sample)?;
    Ok((0..sample_count)
        .map(|i| i as f64 * seconds_per_sample)
        .collect())
}

fn check_seconds_per_sample(seconds: f64) -> Result<(), ConfigError> {
    // also catches NaN
    if seconds > 0.0 && seconds.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositiveSampleTime { seconds })
    }
}

/// Raw text of one capture, exactly as the device sent it minus the line terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureResult {
    payload: String,
}

impl CaptureResult {
    pub fn new(payload: String) -> Self {
        Self { payload }
    }

    pub fn as_str(&self) -> &str {
        &self.payload
    }

    pub fn sample_count(&self) -> usize {
        self.payload.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn decode(&self) -> Result<Vec<u8>, DecodeError> {
        decode(&self.payload)
    }

    /// Write the payload verbatim: no header, no delimiters, no trailing newline.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CaptureFileError> {
        std::fs::write(path.as_ref(), self.payload.as_bytes())?;
        log::debug!(
            "Wrote {} samples to {}",
            self.sample_count(),
            path.as_ref().display()
        );
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CaptureFileError> {
        let bytes = std::fs::read(path.as_ref())?;
        let payload = String::from_utf8(bytes).map_err(DecodeError::from)?;
        log::debug!(
            "Read {} bytes of capture data from {}",
            payload.len(),
            path.as_ref().display()
        );
        Ok(Self { payload })
    }
}

/// Decoded samples together with their spacing in time.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    samples: Vec<u8>,
    seconds_per_sample: f64,
}

impl TimeSeries {
    pub fn new(samples: Vec<u8>, seconds_per_sample: f64) -> Result<Self, ConfigError> {
        if !samples.is_empty() {
            check_seconds_per_sample(seconds_per_sample)?;
        }
        Ok(Self {
            samples,
            seconds_per_sample,
        })
    }

    pub fn from_capture(
        capture: &CaptureResult,
        interval: SampleInterval,
    ) -> Result<Self, CaptureError> {
        let samples = capture.decode()?;
        Ok(Self::new(samples, interval.seconds_per_sample())?)
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub fn seconds_per_sample(&self) -> f64 {
        self.seconds_per_sample
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn time_axis(&self) -> Vec<f64> {
        (0..self.samples.len())
            .map(|i| i as f64 * self.seconds_per_sample)
            .collect()
    }

    /// `(time, value)` pairs in sample order.
    pub fn points(&self) -> impl Iterator<Item = (f64, u8)> + '_ {
        self.samples
            .iter()
            .enumerate()
            .map(|(i, &value)| (i as f64 * self.seconds_per_sample, value))
    }

    pub fn to_lazy_frame(&self) -> Result<LazyFrame, PolarsError> {
        #[cfg(feature = "cpu-profiling")]
        let _span = tracy_client::span!("TimeSeries::to_lazy_frame");

        let time: Column = Series::new(TIME_COLUMN_NAME.into(), self.time_axis()).into();
        let values: Vec<u32> = self.samples.iter().map(|&v| u32::from(v)).collect();
        let value: Column = Series::new(VALUE_COLUMN_NAME.into(), values).into();

        Ok(DataFrame::new(vec![time, value])?.lazy())
    }

    /// Dump `time,value` rows with a header for external plotting tools.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<(), PolarsError> {
        let mut df = self.to_lazy_frame()?.collect()?;
        let mut file = File::create(path.as_ref())?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df)?;
        Ok(())
    }
}
