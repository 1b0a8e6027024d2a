//! End-to-end per-frame driver: detector → tracker → team assignment.

use std::collections::HashMap;

use thiserror::Error;

use crate::config::SessionConfig;
use crate::error::{ConfigurationError, FrameError};
use crate::frame::Frame;
use crate::team::{EncoderLoader, TeamAssigner, TeamLabel};
use crate::tracker::{EnhancedTracker, TrackRecord};

use super::DetectionSource;

/// Everything the pipeline derives from one frame.
#[derive(Debug, Clone)]
pub struct FrameAnalysis {
    pub tracks: Vec<TrackRecord>,
    /// Team labels for the tracks assigned so far. Tracks still calibrating
    /// are absent.
    pub teams: HashMap<u64, TeamLabel>,
}

#[derive(Debug, Error)]
pub enum PipelineError<E> {
    #[error("detection failed: {0}")]
    Detection(E),
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Combined analysis session over any [`DetectionSource`].
pub struct AnalysisPipeline<D: DetectionSource> {
    detector: D,
    tracker: EnhancedTracker,
    assigner: TeamAssigner,
}

impl<D: DetectionSource> AnalysisPipeline<D> {
    pub fn new(detector: D, config: &SessionConfig) -> Result<Self, ConfigurationError> {
        Self::with_encoder_loader(detector, config, None)
    }

    /// Build the pipeline with a deep-encoder constructor for the team
    /// assignment chain.
    pub fn with_encoder_loader(
        detector: D,
        config: &SessionConfig,
        loader: Option<EncoderLoader>,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self {
            detector,
            tracker: EnhancedTracker::initialize(config)?,
            assigner: TeamAssigner::with_encoder_loader(config, loader),
        })
    }

    /// Detect, track and team-label one frame.
    pub fn process_frame(
        &mut self,
        frame: &Frame,
    ) -> Result<FrameAnalysis, PipelineError<D::Error>> {
        let detections = self
            .detector
            .detect(frame)
            .map_err(PipelineError::Detection)?;
        let tracks = self.tracker.track(frame, detections)?;

        let mut teams = HashMap::new();
        for track in &tracks {
            if !track.class.is_team_member() {
                continue;
            }
            let label = match frame.crop(&track.bbox) {
                Some(crop) => {
                    self.assigner
                        .assign(track.track_id, track.class, &crop, frame.index)
                }
                None => self.assigner.team_of(track.track_id),
            };
            if let Some(label) = label {
                teams.insert(track.track_id, label);
            }
        }
        Ok(FrameAnalysis { tracks, teams })
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    pub fn tracker(&self) -> &EnhancedTracker {
        &self.tracker
    }

    pub fn assigner(&self) -> &TeamAssigner {
        &self.assigner
    }

    pub fn assigner_mut(&mut self) -> &mut TeamAssigner {
        &mut self.assigner
    }
}
