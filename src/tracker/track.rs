//! Persistent object tracks and their lifecycle.

use ndarray::{Array1, Array2};

use crate::tracker::detection::{Detection, ObjectClass};
use crate::tracker::geometry::Rect;
use crate::tracker::kalman::KalmanFilter;

/// Lifecycle state of a track.
///
/// `Active` tracks are reported every frame, at a predicted box when the
/// current frame had no matching detection. After `max_age` consecutive
/// misses a track becomes `Lost`, leaves the live set and is never matched
/// again; a reappearing object receives a fresh id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    Active,
    Lost,
}

/// Hands out track ids for one session. Ids are monotonically increasing and
/// never reused, so each backend owns one source scoped to its session.
#[derive(Debug, Default)]
pub(crate) struct TrackIdSource {
    next: u64,
}

impl TrackIdSource {
    pub fn next_id(&mut self) -> u64 {
        self.next += 1;
        self.next
    }
}

/// One tracked object. Owned exclusively by the backend that created it.
#[derive(Debug, Clone)]
pub struct Track {
    pub track_id: u64,
    pub class: ObjectClass,
    pub state: TrackState,
    /// Confidence of the most recent matched detection.
    pub confidence: f32,
    pub start_frame: u64,
    /// Frame of the most recent matched detection.
    pub last_matched_frame: u64,
    /// Consecutive frames without a matching detection.
    pub misses: u32,
    mean: Array1<f64>,
    covariance: Array2<f64>,
}

impl Track {
    pub(crate) fn spawn(
        track_id: u64,
        detection: &Detection,
        frame_index: u64,
        kalman: &KalmanFilter,
    ) -> Self {
        let xyah = detection.bbox.to_xyah();
        let (mean, covariance) =
            kalman.initiate([xyah[0] as f64, xyah[1] as f64, xyah[2] as f64, xyah[3] as f64]);
        Self {
            track_id,
            class: detection.class,
            state: TrackState::Active,
            confidence: detection.confidence,
            start_frame: frame_index,
            last_matched_frame: frame_index,
            misses: 0,
            mean,
            covariance,
        }
    }

    /// Current box estimate from the motion state.
    pub fn bbox(&self) -> Rect {
        Rect::from_xyah(
            self.mean[0] as f32,
            self.mean[1] as f32,
            self.mean[2] as f32,
            self.mean[3] as f32,
        )
    }

    /// Estimated center velocity in pixels per frame.
    pub fn velocity(&self) -> (f32, f32) {
        (self.mean[4] as f32, self.mean[5] as f32)
    }

    /// Advance the motion state one frame.
    pub(crate) fn predict(&mut self, kalman: &KalmanFilter) {
        // Aspect ratio does not drift while the track is coasting.
        if self.misses > 0 {
            self.mean[6] = 0.0;
        }
        let (mean, covariance) = kalman.predict(&self.mean, &self.covariance);
        self.mean = mean;
        self.covariance = covariance;
    }

    /// Fold a matched detection into the motion state.
    pub(crate) fn update(
        &mut self,
        detection: &Detection,
        frame_index: u64,
        kalman: &KalmanFilter,
    ) {
        let xyah = detection.bbox.to_xyah();
        let (mean, covariance) = kalman.update(
            &self.mean,
            &self.covariance,
            [xyah[0] as f64, xyah[1] as f64, xyah[2] as f64, xyah[3] as f64],
        );
        self.mean = mean;
        self.covariance = covariance;
        self.confidence = detection.confidence;
        self.last_matched_frame = frame_index;
        self.misses = 0;
    }

    /// Note an unmatched frame; marks the track lost once `max_age` is
    /// exceeded.
    pub(crate) fn coast(&mut self, max_age: u32) {
        self.misses += 1;
        if self.misses > max_age {
            self.state = TrackState::Lost;
        }
    }
}
