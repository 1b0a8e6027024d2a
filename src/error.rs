//! Error taxonomy for session initialization and per-frame processing.

use std::path::PathBuf;

use thiserror::Error;

/// An optional backend could not be constructed.
///
/// This is always recovered locally by selecting the next backend in the
/// degradation chain; it is logged but never surfaced to the caller as a
/// session failure.
#[derive(Debug, Error)]
pub enum BackendUnavailable {
    /// No checkpoint path was configured for this backend.
    #[error("no checkpoint path configured")]
    NotConfigured,

    /// The checkpoint file could not be read.
    #[error("failed to read checkpoint {path}: {source}")]
    CheckpointUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The checkpoint file exists but holds no data.
    #[error("checkpoint {0} is empty")]
    CheckpointEmpty(PathBuf),

    /// The backend could not be allocated on the compute device.
    #[error("device allocation failed: {0}")]
    DeviceAllocation(String),

    /// The visual encoder failed to load.
    #[error("visual encoder failed to load: {0}")]
    EncoderLoad(String),
}

/// A per-frame processing failure.
///
/// A `Computation` error inside a tracking backend is contained by the
/// [`EnhancedTracker`](crate::tracker::EnhancedTracker): live tracks coast
/// one frame on prediction alone and the session continues. `OutOfOrder` is
/// a caller contract violation and is returned as-is.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame {frame}: {reason}")]
    Computation { frame: u64, reason: String },

    #[error("frame index {got} does not follow {last}; frames must be submitted in order")]
    OutOfOrder { last: u64, got: u64 },
}

/// No usable tracking backend could be constructed at all.
///
/// The classical backend needs no external model, so with the built-in
/// fallback chain this error is unreachable in practice. It exists so the
/// initialization contract stays honest if the chain is ever reconfigured.
#[derive(Debug, Error)]
#[error("no tracking backend available: {reason}")]
pub struct ConfigurationError {
    pub reason: String,
}
