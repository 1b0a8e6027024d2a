//! Per-track team assignment with an explicit calibration state machine.

use std::collections::HashMap;
use std::sync::Arc;

use ndarray::Array1;
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::frame::Crop;
use crate::team::cluster::{ClusterModel, TeamLabel};
use crate::team::features::{EncoderLoader, FeatureExtractor};
use crate::tracker::ObjectClass;

/// Crops smaller than this are too small to carry jersey color reliably and
/// are skipped during calibration.
const MIN_CROP_PIXELS: u32 = 64;

/// Cap on retained calibration embeddings.
const MAX_POOL: usize = 512;

/// Assignment state of one track id.
///
/// `Unseen → Calibrating → Assigned`; once assigned the label is cached and
/// stable for the rest of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignState {
    Unseen,
    Calibrating { samples: u32 },
    Assigned(TeamLabel),
}

/// Assigns each tracked player to one of two teams.
///
/// Embeddings are pooled across all tracks during the calibration window;
/// once the pool is large enough a [`ClusterModel`] is fit and every track's
/// first classified embedding fixes its label. The fitted model is shared
/// behind an `Arc` and replaced whole on refit, never mutated in place.
pub struct TeamAssigner {
    extractor: FeatureExtractor,
    model: Option<Arc<ClusterModel>>,
    pool: Vec<Array1<f32>>,
    states: HashMap<u64, AssignState>,
    min_pool: usize,
    /// Total embeddings ever pooled, including evicted ones.
    samples_seen: usize,
    /// `samples_seen` at the last failed fit; a retry waits for new samples.
    last_attempt: usize,
}

impl TeamAssigner {
    pub fn new(config: &SessionConfig) -> Self {
        Self::with_encoder_loader(config, None)
    }

    /// Build the assigner, attempting the deep encoder chain with `loader`.
    pub fn with_encoder_loader(config: &SessionConfig, loader: Option<EncoderLoader>) -> Self {
        Self {
            extractor: FeatureExtractor::resolve(config, loader),
            model: None,
            pool: Vec::new(),
            states: HashMap::new(),
            min_pool: config.min_calibration_pool,
            samples_seen: 0,
            last_attempt: 0,
        }
    }

    pub fn extractor_name(&self) -> &'static str {
        self.extractor.name()
    }

    pub fn state_of(&self, track_id: u64) -> AssignState {
        self.states
            .get(&track_id)
            .copied()
            .unwrap_or(AssignState::Unseen)
    }

    /// Team of `track_id` given a current crop, or `None` while the track is
    /// calibrating or clustering is still indeterminate.
    ///
    /// Ball and referee tracks are never assigned. Once a label is cached
    /// the extractor and clusterer are not consulted again for that id.
    pub fn assign(
        &mut self,
        track_id: u64,
        class: ObjectClass,
        crop: &Crop,
        frame_index: u64,
    ) -> Option<TeamLabel> {
        if !class.is_team_member() {
            return None;
        }
        if let AssignState::Assigned(label) = self.state_of(track_id) {
            return Some(label);
        }
        if crop.area() < MIN_CROP_PIXELS {
            return None;
        }

        let embedding = self.extractor.extract(crop);
        // The pool is a sliding window: when full, the oldest sample ages
        // out so later appearances still reach calibration.
        if self.pool.len() == MAX_POOL {
            self.pool.remove(0);
        }
        self.pool.push(embedding.clone());
        self.samples_seen += 1;
        let samples = match self.state_of(track_id) {
            AssignState::Calibrating { samples } => samples + 1,
            _ => 1,
        };
        self.states
            .insert(track_id, AssignState::Calibrating { samples });

        if self.model.is_none() {
            self.try_fit(frame_index);
        }

        let model = self.model.clone()?;
        let label = model.predict(&embedding);
        self.states.insert(track_id, AssignState::Assigned(label));
        debug!(track_id, team = label.index(), frame_index, "team assigned");
        Some(label)
    }

    /// Cached label of a track, without recomputation.
    pub fn team_of(&self, track_id: u64) -> Option<TeamLabel> {
        match self.state_of(track_id) {
            AssignState::Assigned(label) => Some(label),
            _ => None,
        }
    }

    fn try_fit(&mut self, frame_index: u64) {
        if self.pool.len() < self.min_pool || self.samples_seen == self.last_attempt {
            return;
        }
        match ClusterModel::fit(&self.pool) {
            Some(model) => {
                info!(
                    frame_index,
                    pool = self.pool.len(),
                    extractor = self.extractor.name(),
                    "team cluster model calibrated"
                );
                self.model = Some(Arc::new(model));
            }
            None => {
                debug!(frame_index, pool = self.pool.len(), "clustering indeterminate, deferred");
                self.last_attempt = self.samples_seen;
            }
        }
    }

    /// Refit the cluster model from the accumulated pool, aligning centroids
    /// to the previous model so cached labels stay consistent. The new model
    /// replaces the old in one reference swap.
    pub fn refit(&mut self) {
        let Some(previous) = self.model.clone() else {
            return;
        };
        if let Some(refit) = ClusterModel::fit(&self.pool) {
            self.model = Some(Arc::new(refit.aligned_to(&previous)));
        }
    }
}
