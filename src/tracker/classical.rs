//! Classical fallback tracker: Kalman motion prediction plus spatial overlap.
//!
//! No segmentation, no visual features. This backend has no external model
//! dependency and must alone uphold the track identity invariants, so it is
//! the terminal link of the degradation chain.

use tracing::debug;

use crate::config::SessionConfig;
use crate::tracker::assignment;
use crate::tracker::detection::{Detection, ObjectClass};
use crate::tracker::geometry::Rect;
use crate::tracker::kalman::KalmanFilter;
use crate::tracker::track::{Track, TrackIdSource, TrackState};

pub struct ClassicalTracker {
    live: Vec<Track>,
    lost: Vec<Track>,
    ids: TrackIdSource,
    kalman: KalmanFilter,
    confidence_threshold: f32,
    match_threshold: f32,
    max_age: u32,
}

impl ClassicalTracker {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            live: Vec::new(),
            lost: Vec::new(),
            ids: TrackIdSource::default(),
            kalman: KalmanFilter::new(),
            confidence_threshold: config.confidence_threshold,
            match_threshold: config.match_threshold,
            max_age: config.max_age,
        }
    }

    /// Process one frame of detections and return the live track set.
    pub fn step(&mut self, frame_index: u64, detections: &[Detection]) -> Vec<Track> {
        let detections: Vec<&Detection> = detections
            .iter()
            .filter(|d| d.confidence >= self.confidence_threshold)
            .collect();

        for track in &mut self.live {
            track.predict(&self.kalman);
        }

        let track_boxes: Vec<Rect> = self.live.iter().map(|t| t.bbox()).collect();
        let track_classes: Vec<ObjectClass> = self.live.iter().map(|t| t.class).collect();
        let det_boxes: Vec<Rect> = detections.iter().map(|d| d.bbox).collect();
        let det_classes: Vec<ObjectClass> = detections.iter().map(|d| d.class).collect();
        let det_confidences: Vec<f32> = detections.iter().map(|d| d.confidence).collect();

        let mut cost = assignment::iou_distance(&track_boxes, &det_boxes);
        assignment::gate_classes(&mut cost, &track_classes, &det_classes);
        assignment::fuse_confidence(&mut cost, &det_confidences);
        let result = assignment::solve(&cost, self.match_threshold);

        for &(itrack, idet) in &result.matches {
            self.live[itrack].update(detections[idet], frame_index, &self.kalman);
        }
        for &itrack in &result.unmatched_tracks {
            self.live[itrack].coast(self.max_age);
        }
        for &idet in &result.unmatched_detections {
            let track = Track::spawn(self.ids.next_id(), detections[idet], frame_index, &self.kalman);
            debug!(track_id = track.track_id, class = ?track.class, "new track");
            self.live.push(track);
        }

        self.retire_lost();
        self.live.clone()
    }

    /// Prediction-only continuation for a frame whose detections could not be
    /// processed.
    pub fn coast_frame(&mut self, _frame_index: u64) -> Vec<Track> {
        for track in &mut self.live {
            track.predict(&self.kalman);
            track.coast(self.max_age);
        }
        self.retire_lost();
        self.live.clone()
    }

    fn retire_lost(&mut self) {
        let mut i = 0;
        while i < self.live.len() {
            if self.live[i].state == TrackState::Lost {
                let track = self.live.swap_remove(i);
                debug!(track_id = track.track_id, "track lost");
                self.lost.push(track);
            } else {
                i += 1;
            }
        }
    }

    /// Tracks that aged out of the live set. Kept for session history; they
    /// never rejoin association.
    pub fn lost_tracks(&self) -> &[Track] {
        &self.lost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(x: f32, y: f32, confidence: f32) -> Detection {
        Detection::new(ObjectClass::Player, Rect::new(x, y, 20.0, 40.0), confidence)
    }

    fn tracker() -> ClassicalTracker {
        ClassicalTracker::new(&SessionConfig {
            max_age: 3,
            ..SessionConfig::default()
        })
    }

    #[test]
    fn identity_persists_across_motion() {
        let mut tracker = tracker();
        let first = tracker.step(1, &[player(100.0, 100.0, 0.9)]);
        assert_eq!(first.len(), 1);
        let id = first[0].track_id;

        for f in 2..=20 {
            let x = 100.0 + f as f32 * 3.0;
            let tracks = tracker.step(f, &[player(x, 100.0, 0.9)]);
            assert_eq!(tracks.len(), 1);
            assert_eq!(tracks[0].track_id, id);
        }
    }

    #[test]
    fn low_confidence_detections_are_dropped() {
        let mut tracker = tracker();
        let tracks = tracker.step(1, &[player(0.0, 0.0, 0.2)]);
        assert!(tracks.is_empty());
    }

    #[test]
    fn lost_id_is_not_reassigned() {
        let mut tracker = tracker();
        let id = tracker.step(1, &[player(100.0, 100.0, 0.9)])[0].track_id;

        // Age the track out (max_age = 3).
        let mut frame = 1;
        for _ in 0..5 {
            frame += 1;
            tracker.step(frame, &[]);
        }
        assert!(tracker.step(frame + 1, &[]).is_empty());
        assert_eq!(tracker.lost_tracks().len(), 1);

        // Same position reappears: it must be a new identity.
        let tracks = tracker.step(frame + 2, &[player(100.0, 100.0, 0.9)]);
        assert_eq!(tracks.len(), 1);
        assert_ne!(tracks[0].track_id, id);
    }

    #[test]
    fn referee_and_player_do_not_swap() {
        let mut tracker = tracker();
        let referee = |x: f32| {
            Detection::new(ObjectClass::Referee, Rect::new(x, 100.0, 20.0, 40.0), 0.9)
        };
        let tracks = tracker.step(1, &[player(100.0, 100.0, 0.9), referee(130.0)]);
        assert_eq!(tracks.len(), 2);
        let player_id = tracks.iter().find(|t| t.class == ObjectClass::Player).unwrap().track_id;

        // Referee crosses over the player's spot while the player vanishes.
        let tracks = tracker.step(2, &[referee(102.0)]);
        let matched: Vec<_> = tracks.iter().filter(|t| t.misses == 0).collect();
        assert_eq!(matched.len(), 1);
        assert_ne!(matched[0].track_id, player_id);
        assert_eq!(matched[0].class, ObjectClass::Referee);
    }
}
