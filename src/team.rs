mod assigner;
mod cluster;
mod features;

pub use assigner::{AssignState, TeamAssigner};
pub use cluster::{ClusterModel, TeamLabel};
pub use features::{EncoderLoader, FeatureExtractor, JerseyHistogram, VisualEncoder};
