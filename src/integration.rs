//! Integration of external detection backends with the tracking and team
//! assignment pipeline.
//!
//! The detector itself is an external collaborator: anything that can turn a
//! frame into class-labelled bounding boxes plugs in through
//! [`DetectionSource`].

mod builder;
mod detector;
mod pipeline;

pub use builder::DetectionBuilder;
pub use detector::DetectionSource;
pub use pipeline::{AnalysisPipeline, FrameAnalysis, PipelineError};
