//! Multi-object tracking and team assignment for football match video.
//!
//! The crate consumes per-frame detections from an external detector (see
//! [`integration::DetectionSource`]) together with decoded RGB frames, and
//! produces persistent object tracks plus a stable binary team label per
//! tracked player.
//!
//! Two degradation chains keep the pipeline running when optional heavyweight
//! models are missing:
//!
//! - tracking: segmentation-and-propagation backend when its checkpoint loads,
//!   otherwise a classical Kalman + IoU tracker ([`EnhancedTracker`]);
//! - appearance features: a pluggable deep visual encoder when one loads,
//!   otherwise a jersey color histogram ([`team::FeatureExtractor`]).
//!
//! Fallbacks are selected once per session, logged, and reported through
//! session metadata; callers otherwise cannot observe which backend runs.

pub mod config;
pub mod error;
pub mod frame;
pub mod integration;
pub mod team;
pub mod tracker;

pub use config::{DetectorConfig, SessionConfig};
pub use error::{BackendUnavailable, ConfigurationError, FrameError};
pub use frame::{Crop, Frame};
pub use integration::{AnalysisPipeline, DetectionBuilder, DetectionSource, FrameAnalysis};
pub use team::{TeamAssigner, TeamLabel};
pub use tracker::{BackendKind, Detection, EnhancedTracker, ObjectClass, Rect, TrackRecord};
