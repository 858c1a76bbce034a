//! Queue policy knobs.
//!
//! # Example
//!
//! ```
//! use xeq::QueueConfig;
//!
//! let config = QueueConfig::default()
//!     .with_initial_capacity(64)
//!     .with_max_capacity(1024);
//! assert!(config.validate().is_ok());
//! ```

use crate::error::{Error, Result};
use crate::event::Time;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "serde")]
use std::path::Path;

/// Default number of slots allocated at init.
pub const DEFAULT_INITIAL_CAPACITY: usize = 512;
/// Default capacity ceiling.
pub const DEFAULT_MAX_CAPACITY: usize = 4096;
/// Default backward clock skew that is silently clamped, in milliseconds.
pub const DEFAULT_CLOCK_SKEW_TOLERANCE: Time = 10_000;
/// Default number of drops between overflow reports.
pub const DEFAULT_DROP_REPORT_FREQUENCY: u64 = 100;
/// Default number of overflow reports before going quiet.
pub const DEFAULT_DROP_REPORT_MAX: u64 = 10;

/// Event queue policy.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct QueueConfig {
    /// Slots allocated at init. One slot is always kept free, so the queue
    /// holds `initial_capacity - 1` events before it first grows.
    pub initial_capacity: usize,
    /// Capacity the queue never grows beyond.
    pub max_capacity: usize,
    /// Events whose timestamp is earlier than the previous one by less than
    /// this many milliseconds get the previous timestamp.
    pub clock_skew_tolerance: Time,
    /// After the first dropped event, report every this many drops.
    pub drop_report_frequency: u64,
    /// Stop reporting after this many periodic reports.
    pub drop_report_max: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            max_capacity: DEFAULT_MAX_CAPACITY,
            clock_skew_tolerance: DEFAULT_CLOCK_SKEW_TOLERANCE,
            drop_report_frequency: DEFAULT_DROP_REPORT_FREQUENCY,
            drop_report_max: DEFAULT_DROP_REPORT_MAX,
        }
    }
}

impl QueueConfig {
    /// Set the initial capacity.
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Set the capacity ceiling.
    pub fn with_max_capacity(mut self, capacity: usize) -> Self {
        self.max_capacity = capacity;
        self
    }

    /// Set the backward clock skew tolerance in milliseconds.
    pub fn with_clock_skew_tolerance(mut self, tolerance: Time) -> Self {
        self.clock_skew_tolerance = tolerance;
        self
    }

    /// Set how often and how many times overflow is reported.
    pub fn with_drop_reports(mut self, frequency: u64, max: u64) -> Self {
        self.drop_report_frequency = frequency;
        self.drop_report_max = max;
        self
    }

    /// Check that the knobs are consistent.
    pub fn validate(&self) -> Result<()> {
        if self.initial_capacity < 2 {
            return Err(Error::InvalidConfig(format!(
                "initial capacity must be at least 2, got {}",
                self.initial_capacity
            )));
        }
        if self.max_capacity < self.initial_capacity {
            return Err(Error::InvalidConfig(format!(
                "max capacity {} is below initial capacity {}",
                self.max_capacity, self.initial_capacity
            )));
        }
        if self.drop_report_frequency == 0 {
            return Err(Error::InvalidConfig(
                "drop report frequency must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Load a configuration from a JSON file. Missing fields take their
    /// default values.
    #[cfg(feature = "serde")]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: QueueConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save this configuration as pretty-printed JSON.
    #[cfg(feature = "serde")]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
