//! Trait for external object detection services.

use crate::frame::Frame;
use crate::tracker::Detection;

/// Per-frame detection boundary.
///
/// Implement this to connect a detection service or model. Credentials and
/// workspace identifiers live in
/// [`DetectorConfig`](crate::config::DetectorConfig) and are passed through
/// to implementations untouched.
///
/// # Example
///
/// ```ignore
/// use pitchtrack::{DetectionSource, Detection, Frame};
///
/// struct HostedDetector {
///     // client for the remote detection service
/// }
///
/// impl DetectionSource for HostedDetector {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Self::Error> {
///         // send the frame, map the response to Detections
///         Ok(vec![])
///     }
/// }
/// ```
pub trait DetectionSource {
    /// Error type for detection failures.
    type Error;

    /// Run detection on one decoded frame.
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Self::Error>;
}
