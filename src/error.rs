//! Error types for the event queue.
//!
//! Producers never see these: enqueue failures degrade to drop-and-count.
//! They surface from configuration, from storage growth, and as the text of
//! developer-facing diagnostics written to the log.

use crate::event::EventKind;
use thiserror::Error;

/// Result type alias for xeq operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur inside the event queue.
#[derive(Debug, Error)]
pub enum Error {
    /// Reserving memory for a larger slot array failed.
    #[error("failed to allocate {requested} queue slots")]
    AllocationFailure {
        /// Number of slots that could not be allocated.
        requested: usize,
    },

    /// The queue is at its capacity ceiling and cannot grow any further.
    #[error("event queue overflow at maximum capacity {capacity}")]
    QueueOverflow {
        /// The ceiling that was hit.
        capacity: usize,
    },

    /// Growth was requested to a capacity that is not larger than the current one.
    #[error("cannot grow queue from {current} to {requested} slots")]
    InvalidCapacity {
        /// Current slot count.
        current: usize,
        /// Requested slot count.
        requested: usize,
    },

    /// `drain` was entered while another drain was still running.
    #[error("drain called recursively (depth {depth})")]
    ReentrantDrain {
        /// Nesting depth at the time of the call, the outermost drain being 1.
        depth: usize,
    },

    /// The event kind has no device id field and cannot be addressed to a master.
    #[error("unknown event type {0:?}, cannot change device id")]
    NoDeviceField(EventKind),

    /// The queue configuration is inconsistent.
    #[error("invalid queue configuration: {0}")]
    InvalidConfig(String),

    /// Reading or writing a configuration file failed.
    #[cfg(feature = "serde")]
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file could not be parsed or serialized.
    #[cfg(feature = "serde")]
    #[error("config format error: {0}")]
    Parse(#[from] serde_json::Error),
}
