//! Session configuration surface.

use std::path::PathBuf;

/// Credentials and workspace identifiers for the external detection service.
///
/// These are carried for [`DetectionSource`](crate::integration::DetectionSource)
/// implementations and are never interpreted by this crate.
#[derive(Debug, Clone, Default)]
pub struct DetectorConfig {
    pub api_key: Option<String>,
    pub workspace: Option<String>,
    pub project: Option<String>,
    pub version: Option<u32>,
}

/// Configuration for one video analysis session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Opaque pass-through for the external detector.
    pub detector: DetectorConfig,
    /// Segmentation model checkpoint. Absence selects the classical backend.
    pub segmentation_checkpoint: Option<PathBuf>,
    /// Visual encoder checkpoint for deep appearance features. Absence selects
    /// the jersey histogram extractor.
    pub encoder_checkpoint: Option<PathBuf>,
    /// Detections below this confidence are dropped before association.
    pub confidence_threshold: f32,
    /// Maximum association cost (1 - similarity) for accepting a match.
    pub match_threshold: f32,
    /// Consecutive unmatched frames before a track is marked lost.
    pub max_age: u32,
    /// Embeddings required across all tracks before the team cluster model
    /// is fit.
    pub min_calibration_pool: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            detector: DetectorConfig::default(),
            segmentation_checkpoint: None,
            encoder_checkpoint: None,
            confidence_threshold: 0.5,
            match_threshold: 0.8,
            max_age: 30,
            min_calibration_pool: 20,
        }
    }
}
