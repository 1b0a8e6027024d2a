//! Appearance feature extraction with a deep/histogram degradation chain.

use std::path::Path;

use ndarray::Array1;
use tracing::{info, warn};

use crate::config::SessionConfig;
use crate::error::BackendUnavailable;
use crate::frame::Crop;

/// A pretrained visual encoder producing fixed-length embeddings.
///
/// Implement this to plug a deep appearance model into team assignment. The
/// crate ships no weights; when no encoder loads, the
/// [`JerseyHistogram`] fallback is used for the whole session.
pub trait VisualEncoder: Send {
    fn embedding_dim(&self) -> usize;
    fn encode(&self, crop: &Crop) -> Array1<f32>;
}

/// Constructor for a deep encoder, attempted once at startup against the
/// configured checkpoint path.
pub type EncoderLoader =
    Box<dyn FnOnce(&Path) -> Result<Box<dyn VisualEncoder>, BackendUnavailable>>;

/// Color-distribution descriptor of the jersey area of a crop.
///
/// Only the upper region of the box is sampled so the jersey dominates over
/// grass and shorts. Always available; the terminal link of the extractor
/// chain.
#[derive(Debug, Clone)]
pub struct JerseyHistogram {
    /// Fraction of crop rows counted as jersey, measured from the top.
    upper_fraction: f32,
}

impl Default for JerseyHistogram {
    fn default() -> Self {
        Self {
            upper_fraction: 0.5,
        }
    }
}

impl JerseyHistogram {
    /// 2x2x2 coarse RGB occupancy plus mean channel intensities, all in
    /// [0, 1]. 11 dimensions.
    pub fn extract(&self, crop: &Crop) -> Array1<f32> {
        let rows = ((crop.height as f32 * self.upper_fraction).ceil() as u32)
            .clamp(1, crop.height);

        let mut bins = [0f32; 8];
        let mut means = [0f32; 3];
        let mut count = 0f32;
        for y in 0..rows {
            for x in 0..crop.width {
                let px = crop.pixel(x, y);
                let bin = (px[0] as usize >> 7) << 2 | (px[1] as usize >> 7) << 1
                    | (px[2] as usize >> 7);
                bins[bin] += 1.0;
                for c in 0..3 {
                    means[c] += px[c] as f32 / 255.0;
                }
                count += 1.0;
            }
        }

        let mut out = Array1::zeros(11);
        if count > 0.0 {
            for (i, b) in bins.iter().enumerate() {
                out[i] = b / count;
            }
            for (c, m) in means.iter().enumerate() {
                out[8 + c] = m / count;
            }
        }
        out
    }
}

/// The resolved appearance extractor for one session.
pub enum FeatureExtractor {
    Deep(Box<dyn VisualEncoder>),
    Histogram(JerseyHistogram),
}

impl FeatureExtractor {
    /// Resolve the extractor chain once at startup.
    ///
    /// The deep encoder wins when a checkpoint is configured and its loader
    /// succeeds; every failure mode degrades permanently to the histogram
    /// variant for this session.
    pub fn resolve(config: &SessionConfig, loader: Option<EncoderLoader>) -> Self {
        match (config.encoder_checkpoint.as_deref(), loader) {
            (Some(path), Some(loader)) => match loader(path) {
                Ok(encoder) => {
                    info!(extractor = "deep", "appearance extractor selected");
                    Self::Deep(encoder)
                }
                Err(err) => {
                    warn!(
                        error = %err,
                        "visual encoder unavailable, degrading to jersey histogram"
                    );
                    Self::Histogram(JerseyHistogram::default())
                }
            },
            _ => {
                info!(extractor = "histogram", "appearance extractor selected");
                Self::Histogram(JerseyHistogram::default())
            }
        }
    }

    pub fn extract(&self, crop: &Crop) -> Array1<f32> {
        match self {
            Self::Deep(encoder) => encoder.encode(crop),
            Self::Histogram(histogram) => histogram.extract(crop),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Deep(_) => "deep",
            Self::Histogram(_) => "histogram",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_crop(rgb: [u8; 3]) -> Crop {
        Crop {
            width: 8,
            height: 16,
            data: rgb.iter().copied().cycle().take(8 * 16 * 3).collect(),
        }
    }

    #[test]
    fn histogram_separates_jersey_colors() {
        let hist = JerseyHistogram::default();
        let red = hist.extract(&solid_crop([220, 30, 30]));
        let blue = hist.extract(&solid_crop([30, 30, 220]));
        let dist = (&red - &blue).mapv(|v| v * v).sum().sqrt();
        assert!(dist > 1.0);
    }

    #[test]
    fn histogram_is_stable_for_same_color() {
        let hist = JerseyHistogram::default();
        let a = hist.extract(&solid_crop([220, 30, 30]));
        let b = hist.extract(&solid_crop([220, 30, 30]));
        assert_eq!(a, b);
    }

    #[test]
    fn failing_loader_degrades_to_histogram() {
        let config = SessionConfig {
            encoder_checkpoint: Some("/nonexistent/encoder.ckpt".into()),
            ..SessionConfig::default()
        };
        let loader: EncoderLoader =
            Box::new(|_| Err(BackendUnavailable::EncoderLoad("no weights".into())));
        let extractor = FeatureExtractor::resolve(&config, Some(loader));
        assert_eq!(extractor.name(), "histogram");
    }

    #[test]
    fn successful_loader_selects_deep() {
        struct Stub;
        impl VisualEncoder for Stub {
            fn embedding_dim(&self) -> usize {
                4
            }
            fn encode(&self, _crop: &Crop) -> Array1<f32> {
                Array1::zeros(4)
            }
        }
        let config = SessionConfig {
            encoder_checkpoint: Some("/tmp/encoder.ckpt".into()),
            ..SessionConfig::default()
        };
        let loader: EncoderLoader = Box::new(|_| Ok(Box::new(Stub)));
        let extractor = FeatureExtractor::resolve(&config, Some(loader));
        assert_eq!(extractor.name(), "deep");
    }
}
