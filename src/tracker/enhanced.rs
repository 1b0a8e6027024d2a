//! Tracking facade with one-shot backend selection and fallback.

use tracing::{info, warn};

use crate::config::SessionConfig;
use crate::error::{ConfigurationError, FrameError};
use crate::frame::Frame;
use crate::tracker::classical::ClassicalTracker;
use crate::tracker::detection::{Detection, ObjectClass};
use crate::tracker::geometry::Rect;
use crate::tracker::segmentation::SegmentationTracker;
use crate::tracker::track::Track;

/// Which tracking backend a session runs on. Recorded once at
/// initialization; the choice is never revisited mid-video because switching
/// backends would break identity continuity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Segmentation,
    Classical,
}

impl BackendKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Segmentation => "segmentation",
            Self::Classical => "classical",
        }
    }
}

/// Backend-normalized per-frame track output.
#[derive(Debug, Clone)]
pub struct TrackRecord {
    pub frame_index: u64,
    pub track_id: u64,
    pub class: ObjectClass,
    pub bbox: Rect,
    pub confidence: f32,
    pub backend: BackendKind,
}

enum Backend {
    Segmentation(SegmentationTracker),
    Classical(ClassicalTracker),
}

/// Facade over the two tracking backends.
///
/// The backend is chosen once at initialization by trying constructors in
/// priority order: segmentation first, classical otherwise. Callers observe
/// the choice only through [`BackendKind`] on the session and its records.
pub struct EnhancedTracker {
    backend: Backend,
    kind: BackendKind,
    last_frame: Option<u64>,
}

impl EnhancedTracker {
    /// Select a backend and open a tracking session.
    ///
    /// A missing or unloadable segmentation checkpoint is not an error; it
    /// is logged and the classical backend is constructed instead. With the
    /// built-in chain a `ConfigurationError` cannot occur.
    pub fn initialize(config: &SessionConfig) -> Result<Self, ConfigurationError> {
        let (backend, kind) = match SegmentationTracker::load(config) {
            Ok(seg) => (Backend::Segmentation(seg), BackendKind::Segmentation),
            Err(err) => {
                warn!(
                    error = %err,
                    "segmentation backend unavailable, degrading to classical tracking"
                );
                (
                    Backend::Classical(ClassicalTracker::new(config)),
                    BackendKind::Classical,
                )
            }
        };
        info!(backend = kind.name(), "tracking session initialized");
        Ok(Self {
            backend,
            kind,
            last_frame: None,
        })
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.kind
    }

    pub fn backend_name(&self) -> &'static str {
        self.kind.name()
    }

    /// Track one frame of detections.
    ///
    /// Frames must arrive with strictly increasing indices. A backend
    /// failure on a single frame is contained: live tracks coast that frame
    /// on prediction alone and the error is logged.
    pub fn track(
        &mut self,
        frame: &Frame,
        detections: Vec<Detection>,
    ) -> Result<Vec<TrackRecord>, FrameError> {
        if let Some(last) = self.last_frame {
            if frame.index <= last {
                return Err(FrameError::OutOfOrder {
                    last,
                    got: frame.index,
                });
            }
        }
        self.last_frame = Some(frame.index);

        let tracks = match &mut self.backend {
            Backend::Segmentation(seg) => match seg.step(frame, &detections) {
                Ok(tracks) => tracks,
                Err(err) => {
                    warn!(error = %err, "frame failed, coasting tracks on prediction");
                    seg.coast_frame(frame.index)
                }
            },
            Backend::Classical(classical) => classical.step(frame.index, &detections),
        };

        Ok(tracks
            .iter()
            .map(|t| self.record(frame.index, t))
            .collect())
    }

    fn record(&self, frame_index: u64, track: &Track) -> TrackRecord {
        TrackRecord {
            frame_index,
            track_id: track.track_id,
            class: track.class,
            bbox: track.bbox(),
            confidence: track.confidence,
            backend: self.kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_frame(index: u64) -> Frame {
        Frame::new(index, 32, 32, vec![0; 32 * 32 * 3])
    }

    #[test]
    fn out_of_order_frames_are_rejected() {
        let mut tracker = EnhancedTracker::initialize(&SessionConfig::default()).unwrap();
        tracker.track(&blank_frame(5), vec![]).unwrap();
        assert!(matches!(
            tracker.track(&blank_frame(5), vec![]),
            Err(FrameError::OutOfOrder { last: 5, got: 5 })
        ));
    }

    #[test]
    fn records_carry_the_backend_kind() {
        let mut tracker = EnhancedTracker::initialize(&SessionConfig::default()).unwrap();
        assert_eq!(tracker.backend_name(), "classical");
        let det = Detection::new(
            ObjectClass::Player,
            Rect::new(4.0, 4.0, 8.0, 16.0),
            0.9,
        );
        let records = tracker.track(&blank_frame(1), vec![det]).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].backend, BackendKind::Classical);
        assert_eq!(records[0].frame_index, 1);
    }
}
