//! Two-cluster partitioning of appearance embeddings.

use ndarray::Array1;
use tracing::debug;

/// Binary team label. The two values carry no home/away semantics; only
/// within-session consistency matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TeamLabel {
    A,
    B,
}

impl TeamLabel {
    pub fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }
}

/// Smallest acceptable share of samples in the minority cluster. A split
/// below this is symptomatic of too little appearance variance and is
/// treated as indeterminate rather than forced.
const MIN_MINORITY_FRACTION: f32 = 0.10;

/// Squared seed separation below which the sample set is considered
/// colorless (e.g. all-black crops).
const MIN_SEED_SEPARATION_SQ: f32 = 1e-3;

const MAX_ITERATIONS: usize = 25;

/// Fitted two-centroid model. Read-only after fit; refits swap the whole
/// model reference.
#[derive(Debug, Clone)]
pub struct ClusterModel {
    centroids: [Array1<f32>; 2],
}

fn dist_sq(a: &Array1<f32>, b: &Array1<f32>) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

impl ClusterModel {
    /// Two-means with deterministic farthest-pair seeding.
    ///
    /// Returns `None` when the data cannot support a confident binary split:
    /// too few samples, near-identical samples, or a degenerate partition
    /// where the minority cluster falls under [`MIN_MINORITY_FRACTION`].
    /// Callers defer assignment and retry as more samples accumulate.
    pub fn fit(samples: &[Array1<f32>]) -> Option<ClusterModel> {
        if samples.len() < 2 {
            return None;
        }

        // Seed with the most separated pair.
        let mut seed = (0, 1);
        let mut best = 0.0f32;
        for i in 0..samples.len() {
            for j in (i + 1)..samples.len() {
                let d = dist_sq(&samples[i], &samples[j]);
                if d > best {
                    best = d;
                    seed = (i, j);
                }
            }
        }
        if best < MIN_SEED_SEPARATION_SQ {
            debug!(samples = samples.len(), "embeddings nearly identical, split deferred");
            return None;
        }

        let mut centroids = [samples[seed.0].clone(), samples[seed.1].clone()];
        let mut membership = vec![0usize; samples.len()];

        for _ in 0..MAX_ITERATIONS {
            let mut changed = false;
            for (i, s) in samples.iter().enumerate() {
                let nearest =
                    usize::from(dist_sq(s, &centroids[1]) < dist_sq(s, &centroids[0]));
                if membership[i] != nearest {
                    membership[i] = nearest;
                    changed = true;
                }
            }
            if !changed {
                break;
            }

            for k in 0..2 {
                let members: Vec<&Array1<f32>> = samples
                    .iter()
                    .zip(&membership)
                    .filter(|&(_, &m)| m == k)
                    .map(|(s, _)| s)
                    .collect();
                if members.is_empty() {
                    continue;
                }
                let mut sum = Array1::zeros(members[0].len());
                for m in &members {
                    sum = sum + *m;
                }
                centroids[k] = sum / members.len() as f32;
            }
        }

        let minority = membership.iter().filter(|&&m| m == 1).count();
        let minority = minority.min(samples.len() - minority);
        if (minority as f32) < MIN_MINORITY_FRACTION * samples.len() as f32 {
            debug!(
                samples = samples.len(),
                minority, "degenerate cluster split, assignment deferred"
            );
            return None;
        }

        Some(ClusterModel { centroids })
    }

    pub fn predict(&self, embedding: &Array1<f32>) -> TeamLabel {
        if dist_sq(embedding, &self.centroids[0]) <= dist_sq(embedding, &self.centroids[1]) {
            TeamLabel::A
        } else {
            TeamLabel::B
        }
    }

    /// Keep label identity across a refit: when this model's centroid A sits
    /// closer to the previous centroid B, the centroids are swapped so
    /// already-assigned labels stay valid.
    pub fn aligned_to(mut self, previous: &ClusterModel) -> ClusterModel {
        let straight = dist_sq(&self.centroids[0], &previous.centroids[0])
            + dist_sq(&self.centroids[1], &previous.centroids[1]);
        let crossed = dist_sq(&self.centroids[0], &previous.centroids[1])
            + dist_sq(&self.centroids[1], &previous.centroids[0]);
        if crossed < straight {
            self.centroids.swap(0, 1);
        }
        self
    }
}
