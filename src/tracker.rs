mod assignment;
mod ball;
mod classical;
mod detection;
mod enhanced;
mod geometry;
mod kalman;
mod segmentation;
mod track;

pub use ball::interpolate_ball_track;
pub use classical::ClassicalTracker;
pub use detection::{Detection, ObjectClass};
pub use enhanced::{BackendKind, EnhancedTracker, TrackRecord};
pub use geometry::Rect;
pub use segmentation::{Mask, SegmentationTracker};
pub use track::{Track, TrackState};
