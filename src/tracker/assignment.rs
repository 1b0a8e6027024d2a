//! Track/detection association: cost matrices and optimal assignment.

use ndarray::Array2;

use crate::tracker::detection::ObjectClass;
use crate::tracker::geometry::Rect;

/// Cost assigned to pairs that must never match (different classes).
/// Any value above the match threshold works; this one also survives the
/// f64 padding used by the solver.
const GATED_COST: f32 = 1e4;

#[derive(Debug, Clone)]
pub struct AssignmentResult {
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

/// IoU distance matrix (1 - IoU) between predicted track boxes and
/// detection boxes.
pub fn iou_distance(track_boxes: &[Rect], det_boxes: &[Rect]) -> Array2<f32> {
    let mut dists = Array2::zeros((track_boxes.len(), det_boxes.len()));
    for (i, t) in track_boxes.iter().enumerate() {
        for (j, d) in det_boxes.iter().enumerate() {
            dists[[i, j]] = 1.0 - t.iou(d);
        }
    }
    dists
}

/// Forbid matches across object classes. A player track never inherits a
/// referee detection even when their boxes overlap.
pub fn gate_classes(
    cost: &mut Array2<f32>,
    track_classes: &[ObjectClass],
    det_classes: &[ObjectClass],
) {
    for (i, tc) in track_classes.iter().enumerate() {
        for (j, dc) in det_classes.iter().enumerate() {
            if tc != dc {
                cost[[i, j]] = GATED_COST;
            }
        }
    }
}

/// Fold detection confidence into the cost so confident detections win ties.
pub fn fuse_confidence(cost: &mut Array2<f32>, confidences: &[f32]) {
    let (rows, cols) = cost.dim();
    for i in 0..rows {
        for j in 0..cols {
            if cost[[i, j]] >= GATED_COST {
                continue;
            }
            let sim = (1.0 - cost[[i, j]]) * confidences[j];
            cost[[i, j]] = 1.0 - sim;
        }
    }
}

/// Solve the assignment problem with LAPJV, keeping only pairs whose cost is
/// within `threshold`.
pub fn solve(cost: &Array2<f32>, threshold: f32) -> AssignmentResult {
    let (num_tracks, num_dets) = cost.dim();

    if num_tracks == 0 || num_dets == 0 {
        return AssignmentResult {
            matches: vec![],
            unmatched_tracks: (0..num_tracks).collect(),
            unmatched_detections: (0..num_dets).collect(),
        };
    }

    // LAPJV wants a square matrix; pad with a cost no real pair can beat.
    let size = num_tracks.max(num_dets);
    let mut padded = Array2::<f64>::from_elem((size, size), 1e6);
    for i in 0..num_tracks {
        for j in 0..num_dets {
            padded[[i, j]] = cost[[i, j]] as f64;
        }
    }

    let mut matches = vec![];
    let mut unmatched_tracks = vec![];
    let mut det_matched = vec![false; num_dets];

    match lapjv::lapjv(&padded) {
        Ok((row_to_col, _)) => {
            for (row, &col) in row_to_col.iter().enumerate().take(num_tracks) {
                if col < num_dets && cost[[row, col]] <= threshold {
                    matches.push((row, col));
                    det_matched[col] = true;
                } else {
                    unmatched_tracks.push(row);
                }
            }
        }
        Err(_) => {
            unmatched_tracks = (0..num_tracks).collect();
        }
    }

    let unmatched_detections = det_matched
        .iter()
        .enumerate()
        .filter_map(|(j, &m)| if m { None } else { Some(j) })
        .collect();

    AssignmentResult {
        matches,
        unmatched_tracks,
        unmatched_detections,
    }
}
