use std::fmt;
use std::time::Duration;

/// Number of ASCII digits the device reads after the `u` tag.
pub const INTERVAL_DIGITS: usize = 6;

/// Parameters rejected before anything is sent to the device.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Sample interval of {micros}us does not fit in 6 digits (max 999999us)")]
    IntervalOutOfRange { micros: u64 },

    #[error("'{text}' is not a 6-digit sample interval")]
    MalformedInterval { text: String },

    #[error("Seconds per sample must be positive, got {seconds}")]
    NonPositiveSampleTime { seconds: f64 },
}

/// Time between two samples, in whole microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SampleInterval {
    micros: u32,
}

impl SampleInterval {
    pub const MAX_MICROS: u32 = 999_999;

    /// Validate `micros` against the six digit wire field.
    pub fn from_micros(micros: u64) -> Result<Self, ConfigError> {
        if micros > u64::from(Self::MAX_MICROS) {
            return Err(ConfigError::IntervalOutOfRange { micros });
        }
        Ok(Self {
            micros: micros as u32,
        })
    }

    /// Sub-microsecond parts of `duration` are truncated.
    pub fn from_duration(duration: Duration) -> Result<Self, ConfigError> {
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        Self::from_micros(micros)
    }

    /// Parse the fixed-width form the device receives, e.g. `"000056"`.
    pub fn parse_encoded(text: &str) -> Result<Self, ConfigError> {
        if text.len() != INTERVAL_DIGITS || !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ConfigError::MalformedInterval {
                text: text.to_string(),
            });
        }
        let micros = text
            .parse::<u64>()
            .map_err(|_| ConfigError::MalformedInterval {
                text: text.to_string(),
            })?;
        Self::from_micros(micros)
    }

    pub fn as_micros(&self) -> u32 {
        self.micros
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_micros(u64::from(self.micros))
    }

    pub fn seconds_per_sample(&self) -> f64 {
        f64::from(self.micros) / 1_000_000.0
    }

    /// Zero-left-padded ASCII digits, always exactly six characters.
    pub fn encode(&self) -> String {
        format!("{:06}", self.micros)
    }
}

impl fmt::Display for SampleInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}us", self.micros)
    }
}

impl TryFrom<Duration> for SampleInterval {
    type Error = ConfigError;

    fn try_from(duration: Duration) -> Result<Self, Self::Error> {
        Self::from_duration(duration)
    }
}

/// Logic level transition that arms a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerEdge {
    /// Capture starts once the input goes to logic 1.
    RisingFromLow,
    /// Capture starts once the input goes to logic 0.
    FallingFromHigh,
}

impl TriggerEdge {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerEdge::RisingFromLow => "rising",
            TriggerEdge::FallingFromHigh => "falling",
        }
    }
}

impl fmt::Display for TriggerEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for one complete acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapturePlan {
    pub interval: SampleInterval,
    pub edge: TriggerEdge,
}

impl CapturePlan {
    pub fn new(interval: SampleInterval, edge: TriggerEdge) -> Self {
        Self { interval, edge }
    }
}
