use std::path::PathBuf;

use pitchtrack::team::TeamAssigner;
use pitchtrack::{BackendUnavailable, EnhancedTracker, SessionConfig};

#[test]
fn no_checkpoint_selects_classical_without_error() {
    let tracker = EnhancedTracker::initialize(&SessionConfig::default()).unwrap();
    assert_eq!(tracker.backend_name(), "classical");
}

#[test]
fn missing_checkpoint_file_selects_classical() {
    let config = SessionConfig {
        segmentation_checkpoint: Some(PathBuf::from("/no/such/dir/sam.ckpt")),
        ..SessionConfig::default()
    };
    let tracker = EnhancedTracker::initialize(&config).unwrap();
    assert_eq!(tracker.backend_name(), "classical");
}

#[test]
fn empty_checkpoint_file_selects_classical() {
    let path = std::env::temp_dir().join("pitchtrack-empty.ckpt");
    std::fs::write(&path, b"").unwrap();
    let config = SessionConfig {
        segmentation_checkpoint: Some(path),
        ..SessionConfig::default()
    };
    let tracker = EnhancedTracker::initialize(&config).unwrap();
    assert_eq!(tracker.backend_name(), "classical");
}

#[test]
fn loadable_checkpoint_selects_segmentation() {
    let path = std::env::temp_dir().join("pitchtrack-valid.ckpt");
    std::fs::write(&path, b"segmentation weights").unwrap();
    let config = SessionConfig {
        segmentation_checkpoint: Some(path),
        ..SessionConfig::default()
    };
    let tracker = EnhancedTracker::initialize(&config).unwrap();
    assert_eq!(tracker.backend_name(), "segmentation");
}

#[test]
fn encoder_failure_degrades_to_histogram() {
    let config = SessionConfig {
        encoder_checkpoint: Some(PathBuf::from("/no/such/encoder.safetensors")),
        ..SessionConfig::default()
    };
    let assigner = TeamAssigner::with_encoder_loader(
        &config,
        Some(Box::new(|_| {
            Err(BackendUnavailable::EncoderLoad("checkpoint unreadable".into()))
        })),
    );
    assert_eq!(assigner.extractor_name(), "histogram");
}

#[test]
fn no_encoder_configured_uses_histogram() {
    let assigner = TeamAssigner::new(&SessionConfig::default());
    assert_eq!(assigner.extractor_name(), "histogram");
}
