//! Segmentation-and-propagation tracker, the primary backend.
//!
//! Each detection box is segmented into a foreground mask against the
//! dominant field color, and identity is propagated by matching current
//! masks against a one-frame memory of velocity-shifted prior masks. Box
//! IoU covers pairs where either side has no usable mask.
//!
//! Construction requires a loadable checkpoint; any failure there selects
//! the classical fallback instead (see `EnhancedTracker`).

use std::collections::HashMap;
use std::path::Path;

use ndarray::Array2;
use tracing::debug;

use crate::config::SessionConfig;
use crate::error::{BackendUnavailable, FrameError};
use crate::frame::Frame;
use crate::tracker::assignment;
use crate::tracker::detection::{Detection, ObjectClass};
use crate::tracker::geometry::Rect;
use crate::tracker::kalman::KalmanFilter;
use crate::tracker::track::{Track, TrackIdSource, TrackState};

/// Squared RGB distance from the field color beyond which a pixel counts as
/// foreground.
const FOREGROUND_DIST_SQ: i32 = 4000;

/// Minimum foreground pixels for a mask to be used in matching.
const MIN_MASK_PIXELS: usize = 12;

/// Binary foreground mask anchored in frame pixel coordinates.
#[derive(Debug, Clone)]
pub struct Mask {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    data: Vec<bool>,
    foreground: usize,
}

impl Mask {
    fn new(x: i32, y: i32, width: u32, height: u32, data: Vec<bool>) -> Self {
        let foreground = data.iter().filter(|&&b| b).count();
        Self {
            x,
            y,
            width,
            height,
            data,
            foreground,
        }
    }

    /// Foreground pixel count.
    pub fn coverage(&self) -> usize {
        self.foreground
    }

    #[inline]
    fn get(&self, x: i32, y: i32) -> bool {
        let dx = x - self.x;
        let dy = y - self.y;
        if dx < 0 || dy < 0 || dx >= self.width as i32 || dy >= self.height as i32 {
            return false;
        }
        self.data[(dy as u32 * self.width + dx as u32) as usize]
    }

    /// The same mask translated by (dx, dy), used to project a prior-frame
    /// mask along the track's estimated motion.
    pub fn shifted(&self, dx: f32, dy: f32) -> Mask {
        Mask {
            x: self.x + dx.round() as i32,
            y: self.y + dy.round() as i32,
            ..self.clone()
        }
    }

    /// Foreground IoU of two masks in frame coordinates.
    pub fn iou(&self, other: &Mask) -> f32 {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = (self.x + self.width as i32).min(other.x + other.width as i32);
        let y1 = (self.y + self.height as i32).min(other.y + other.height as i32);

        let mut inter = 0usize;
        for y in y0..y1 {
            for x in x0..x1 {
                if self.get(x, y) && other.get(x, y) {
                    inter += 1;
                }
            }
        }
        let union = self.foreground + other.foreground - inter;
        if union > 0 {
            inter as f32 / union as f32
        } else {
            0.0
        }
    }
}

pub struct SegmentationTracker {
    live: Vec<Track>,
    lost: Vec<Track>,
    /// Most recent mask per live track id.
    memory: HashMap<u64, Mask>,
    ids: TrackIdSource,
    kalman: KalmanFilter,
    confidence_threshold: f32,
    match_threshold: f32,
    max_age: u32,
}

impl SegmentationTracker {
    /// Load the backend. The checkpoint must exist and be non-empty; any
    /// failure here means "backend unavailable", never a session abort.
    pub fn load(config: &SessionConfig) -> Result<Self, BackendUnavailable> {
        let path = config
            .segmentation_checkpoint
            .as_deref()
            .ok_or(BackendUnavailable::NotConfigured)?;
        Self::validate_checkpoint(path)?;

        Ok(Self {
            live: Vec::new(),
            lost: Vec::new(),
            memory: HashMap::new(),
            ids: TrackIdSource::default(),
            kalman: KalmanFilter::new(),
            confidence_threshold: config.confidence_threshold,
            match_threshold: config.match_threshold,
            max_age: config.max_age,
        })
    }

    fn validate_checkpoint(path: &Path) -> Result<(), BackendUnavailable> {
        let meta = std::fs::metadata(path).map_err(|source| {
            BackendUnavailable::CheckpointUnreadable {
                path: path.to_path_buf(),
                source,
            }
        })?;
        if meta.len() == 0 {
            return Err(BackendUnavailable::CheckpointEmpty(path.to_path_buf()));
        }
        Ok(())
    }

    /// Process one frame and return the live track set.
    ///
    /// A failure here is transient: the caller coasts the frame and the
    /// session continues.
    pub fn step(
        &mut self,
        frame: &Frame,
        detections: &[Detection],
    ) -> Result<Vec<Track>, FrameError> {
        if frame.width == 0
            || frame.height == 0
            || frame.data.len() != (frame.width * frame.height * 3) as usize
        {
            return Err(FrameError::Computation {
                frame: frame.index,
                reason: "frame buffer does not match its dimensions".into(),
            });
        }

        let field = estimate_field_color(frame);
        let detections: Vec<&Detection> = detections
            .iter()
            .filter(|d| d.confidence >= self.confidence_threshold)
            .collect();
        let det_masks: Vec<Option<Mask>> = detections
            .iter()
            .map(|d| segment_box(frame, &d.bbox, field))
            .collect();

        for track in &mut self.live {
            track.predict(&self.kalman);
        }

        let cost = self.association_cost(&detections, &det_masks);
        let result = assignment::solve(&cost, self.match_threshold);

        for &(itrack, idet) in &result.matches {
            let track = &mut self.live[itrack];
            track.update(detections[idet], frame.index, &self.kalman);
            if let Some(mask) = &det_masks[idet] {
                self.memory.insert(track.track_id, mask.clone());
            }
        }
        for &itrack in &result.unmatched_tracks {
            self.live[itrack].coast(self.max_age);
        }
        for &idet in &result.unmatched_detections {
            let track = Track::spawn(self.ids.next_id(), detections[idet], frame.index, &self.kalman);
            debug!(track_id = track.track_id, class = ?track.class, "new track");
            if let Some(mask) = &det_masks[idet] {
                self.memory.insert(track.track_id, mask.clone());
            }
            self.live.push(track);
        }

        self.retire_lost();
        Ok(self.live.clone())
    }

    /// Prediction-only continuation for a frame that failed to process.
    pub fn coast_frame(&mut self, _frame_index: u64) -> Vec<Track> {
        for track in &mut self.live {
            track.predict(&self.kalman);
            track.coast(self.max_age);
        }
        self.retire_lost();
        self.live.clone()
    }

    pub fn lost_tracks(&self) -> &[Track] {
        &self.lost
    }

    /// Most recent foreground mask of a live track, when one was usable.
    pub fn mask_of(&self, track_id: u64) -> Option<&Mask> {
        self.memory.get(&track_id)
    }

    /// Mask similarity where both sides have usable masks, box IoU otherwise,
    /// with class gating and confidence fusion on top.
    fn association_cost(
        &self,
        detections: &[&Detection],
        det_masks: &[Option<Mask>],
    ) -> Array2<f32> {
        let mut cost = Array2::zeros((self.live.len(), detections.len()));
        for (i, track) in self.live.iter().enumerate() {
            let (vx, vy) = track.velocity();
            let projected = self
                .memory
                .get(&track.track_id)
                .filter(|m| m.coverage() >= MIN_MASK_PIXELS)
                .map(|m| m.shifted(vx, vy));
            for (j, det) in detections.iter().enumerate() {
                let sim = match (&projected, &det_masks[j]) {
                    (Some(tm), Some(dm)) if dm.coverage() >= MIN_MASK_PIXELS => tm.iou(dm),
                    _ => track.bbox().iou(&det.bbox),
                };
                cost[[i, j]] = 1.0 - sim;
            }
        }

        let track_classes: Vec<ObjectClass> = self.live.iter().map(|t| t.class).collect();
        let det_classes: Vec<ObjectClass> = detections.iter().map(|d| d.class).collect();
        let det_confidences: Vec<f32> = detections.iter().map(|d| d.confidence).collect();
        assignment::gate_classes(&mut cost, &track_classes, &det_classes);
        assignment::fuse_confidence(&mut cost, &det_confidences);
        cost
    }

    fn retire_lost(&mut self) {
        let mut i = 0;
        while i < self.live.len() {
            if self.live[i].state == TrackState::Lost {
                let track = self.live.swap_remove(i);
                debug!(track_id = track.track_id, "track lost");
                self.memory.remove(&track.track_id);
                self.lost.push(track);
            } else {
                i += 1;
            }
        }
    }
}

/// Dominant field color as the per-channel median of a sparse pixel grid.
/// Wide match footage is mostly grass, so the median lands on the pitch.
fn estimate_field_color(frame: &Frame) -> [u8; 3] {
    let stride = (frame.width.max(frame.height) / 64).max(1);
    let mut channels: [Vec<u8>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    let mut y = 0;
    while y < frame.height {
        let mut x = 0;
        while x < frame.width {
            let px = frame.pixel(x, y);
            for c in 0..3 {
                channels[c].push(px[c]);
            }
            x += stride;
        }
        y += stride;
    }
    let mut out = [0u8; 3];
    for c in 0..3 {
        channels[c].sort_unstable();
        out[c] = channels[c][channels[c].len() / 2];
    }
    out
}

/// Foreground mask of the frame region under `bbox`; `None` when the box
/// lies outside the frame.
fn segment_box(frame: &Frame, bbox: &Rect, field: [u8; 3]) -> Option<Mask> {
    let crop = frame.crop(bbox)?;
    let x0 = bbox.x.clamp(0.0, frame.width as f32).floor() as i32;
    let y0 = bbox.y.clamp(0.0, frame.height as f32).floor() as i32;

    let mut data = Vec::with_capacity(crop.area() as usize);
    for y in 0..crop.height {
        for x in 0..crop.width {
            let px = crop.pixel(x, y);
            let dist: i32 = (0..3)
                .map(|c| {
                    let d = px[c] as i32 - field[c] as i32;
                    d * d
                })
                .sum();
            data.push(dist > FOREGROUND_DIST_SQ);
        }
    }
    Some(Mask::new(x0, y0, crop.width, crop.height, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Green frame with solid-color squares painted on it.
    fn synthetic_frame(index: u64, squares: &[(u32, u32, [u8; 3])]) -> Frame {
        let (w, h) = (200u32, 200u32);
        let mut data = vec![0u8; (w * h * 3) as usize];
        for px in data.chunks_exact_mut(3) {
            px.copy_from_slice(&[20, 140, 30]);
        }
        for &(sx, sy, color) in squares {
            for y in sy..(sy + 20).min(h) {
                for x in sx..(sx + 10).min(w) {
                    let i = ((y * w + x) * 3) as usize;
                    data[i..i + 3].copy_from_slice(&color);
                }
            }
        }
        Frame::new(index, w, h, data)
    }

    fn player_at(x: f32, y: f32) -> Detection {
        Detection::new(ObjectClass::Player, Rect::new(x, y, 10.0, 20.0), 0.9)
    }

    fn checkpoint_config(name: &str) -> SessionConfig {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, b"segmentation weights").unwrap();
        SessionConfig {
            segmentation_checkpoint: Some(path),
            ..SessionConfig::default()
        }
    }

    #[test]
    fn load_requires_checkpoint() {
        let config = SessionConfig::default();
        assert!(matches!(
            SegmentationTracker::load(&config),
            Err(BackendUnavailable::NotConfigured)
        ));
    }

    #[test]
    fn mask_iou_tracks_overlap() {
        let full = |x, y| Mask::new(x, y, 10, 10, vec![true; 100]);
        assert!((full(0, 0).iou(&full(0, 0)) - 1.0).abs() < 1e-6);
        assert_eq!(full(0, 0).iou(&full(20, 20)), 0.0);
        let half = full(0, 0).iou(&full(0, 5));
        assert!((half - 50.0 / 150.0).abs() < 1e-6);
    }

    #[test]
    fn segment_box_separates_player_from_grass() {
        let frame = synthetic_frame(0, &[(50, 50, [220, 30, 30])]);
        let mask = segment_box(&frame, &Rect::new(48.0, 48.0, 14.0, 24.0), [20, 140, 30]).unwrap();
        assert_eq!(mask.coverage(), 200);
    }

    #[test]
    fn identity_persists_under_mask_propagation() {
        let mut tracker =
            SegmentationTracker::load(&checkpoint_config("pitchtrack-seg-identity.ckpt")).unwrap();

        let first = tracker
            .step(&synthetic_frame(1, &[(50, 50, [220, 30, 30])]), &[player_at(50.0, 50.0)])
            .unwrap();
        assert_eq!(first.len(), 1);
        let id = first[0].track_id;

        for f in 2..=10u64 {
            let x = 50 + (f as u32 - 1) * 3;
            let tracks = tracker
                .step(
                    &synthetic_frame(f, &[(x, 50, [220, 30, 30])]),
                    &[player_at(x as f32, 50.0)],
                )
                .unwrap();
            assert_eq!(tracks.len(), 1);
            assert_eq!(tracks[0].track_id, id);
        }
        assert!(tracker.mask_of(id).is_some_and(|m| m.coverage() > 0));
    }

    #[test]
    fn corrupt_frame_is_a_transient_error() {
        let mut tracker =
            SegmentationTracker::load(&checkpoint_config("pitchtrack-seg-corrupt.ckpt")).unwrap();
        let bad = Frame {
            index: 1,
            width: 100,
            height: 100,
            data: vec![0; 10],
        };
        assert!(matches!(
            tracker.step(&bad, &[]),
            Err(FrameError::Computation { .. })
        ));
    }
}
