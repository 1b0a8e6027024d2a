//! Ball trajectory gap filling.
//!
//! The ball is small and frequently missed by the detector; downstream
//! possession logic wants a continuous trajectory. Gaps between sightings
//! are filled by linear interpolation; leading and trailing gaps stay empty.

use crate::tracker::geometry::Rect;

pub fn interpolate_ball_track(boxes: &[Option<Rect>]) -> Vec<Option<Rect>> {
    let mut out = boxes.to_vec();
    let mut prev: Option<usize> = None;

    for i in 0..out.len() {
        if out[i].is_none() {
            continue;
        }
        if let Some(p) = prev {
            let gap = i - p;
            if let (Some(a), Some(b)) = (out[p], out[i]) {
                for k in 1..gap {
                    let t = k as f32 / gap as f32;
                    out[p + k] = Some(Rect::new(
                        a.x + (b.x - a.x) * t,
                        a.y + (b.y - a.y) * t,
                        a.width + (b.width - a.width) * t,
                        a.height + (b.height - a.height) * t,
                    ));
                }
            }
        }
        prev = Some(i);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_interior_gaps_linearly() {
        let boxes = vec![
            Some(Rect::new(0.0, 0.0, 4.0, 4.0)),
            None,
            None,
            None,
            Some(Rect::new(40.0, 0.0, 4.0, 4.0)),
        ];
        let filled = interpolate_ball_track(&boxes);
        assert!(filled.iter().all(|b| b.is_some()));
        let mid = filled[2].unwrap();
        assert!((mid.x - 20.0).abs() < 1e-5);
        assert_eq!(mid.width, 4.0);
    }

    #[test]
    fn leading_and_trailing_gaps_stay_empty() {
        let boxes = vec![
            None,
            Some(Rect::new(0.0, 0.0, 4.0, 4.0)),
            Some(Rect::new(1.0, 0.0, 4.0, 4.0)),
            None,
        ];
        let filled = interpolate_ball_track(&boxes);
        assert!(filled[0].is_none());
        assert!(filled[3].is_none());
    }
}
