use std::collections::HashMap;

use pitchtrack::team::{AssignState, TeamAssigner, TeamLabel};
use pitchtrack::{
    AnalysisPipeline, Crop, Detection, DetectionSource, Frame, ObjectClass, Rect, SessionConfig,
};

const RED: [u8; 3] = [220, 30, 30];
const BLUE: [u8; 3] = [30, 30, 220];
const GRASS: [u8; 3] = [20, 140, 30];

fn jersey_crop(rgb: [u8; 3]) -> Crop {
    Crop {
        width: 12,
        height: 24,
        data: rgb.iter().copied().cycle().take(12 * 24 * 3).collect(),
    }
}

#[test]
fn ten_players_split_into_exactly_two_teams() {
    let config = SessionConfig {
        min_calibration_pool: 20,
        ..SessionConfig::default()
    };
    let mut assigner = TeamAssigner::new(&config);

    // Ids 1-5 wear red, 6-10 wear blue.
    let mut labels: HashMap<u64, TeamLabel> = HashMap::new();
    for frame in 1..=10u64 {
        for id in 1..=10u64 {
            let color = if id <= 5 { RED } else { BLUE };
            if let Some(label) =
                assigner.assign(id, ObjectClass::Player, &jersey_crop(color), frame)
            {
                labels.insert(id, label);
            }
        }
    }

    assert_eq!(labels.len(), 10);
    let red_team = labels[&1];
    for id in 1..=5 {
        assert_eq!(labels[&id], red_team);
    }
    let blue_team = labels[&6];
    assert_ne!(red_team, blue_team);
    for id in 6..=10 {
        assert_eq!(labels[&id], blue_team);
    }
}

struct ScriptedDetector;

impl DetectionSource for ScriptedDetector {
    type Error = std::convert::Infallible;

    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Self::Error> {
        let (red_x, blue_x) = player_positions(frame.index);
        Ok(vec![
            Detection::new(
                ObjectClass::Player,
                Rect::new(red_x, 60.0, 12.0, 24.0),
                0.9,
            ),
            Detection::new(
                ObjectClass::Player,
                Rect::new(blue_x, 160.0, 12.0, 24.0),
                0.9,
            ),
        ])
    }
}

fn player_positions(frame_index: u64) -> (f32, f32) {
    (20.0 + frame_index as f32 * 2.0, 280.0 - frame_index as f32 * 2.0)
}

fn scenario_frame(index: u64) -> Frame {
    let (w, h) = (320u32, 240u32);
    let mut data = vec![0u8; (w * h * 3) as usize];
    for px in data.chunks_exact_mut(3) {
        px.copy_from_slice(&GRASS);
    }
    let (red_x, blue_x) = player_positions(index);
    for (x0, y0, color) in [(red_x as u32, 60u32, RED), (blue_x as u32, 160u32, BLUE)] {
        for y in y0..(y0 + 24).min(h) {
            for x in x0..(x0 + 12).min(w) {
                let i = ((y * w + x) * 3) as usize;
                data[i..i + 3].copy_from_slice(&color);
            }
        }
    }
    Frame::new(index, w, h, data)
}

/// 50 synthetic frames, two players in different jerseys moving without
/// occlusion: two stable track ids, both present in every frame, with
/// opposite team labels once calibration completes.
#[test]
fn fifty_frame_two_player_scenario() {
    let mut pipeline =
        AnalysisPipeline::new(ScriptedDetector, &SessionConfig::default()).unwrap();

    let mut per_frame_ids: Vec<Vec<u64>> = Vec::new();
    let mut final_teams: HashMap<u64, TeamLabel> = HashMap::new();
    let mut first_full_assignment = None;

    for f in 1..=50u64 {
        let analysis = pipeline.process_frame(&scenario_frame(f)).unwrap();
        assert_eq!(analysis.tracks.len(), 2);
        per_frame_ids.push(analysis.tracks.iter().map(|t| t.track_id).collect());

        if analysis.teams.len() == 2 {
            if first_full_assignment.is_none() {
                first_full_assignment = Some(f);
            }
            for (&id, &label) in &analysis.teams {
                // Once assigned, a label never flips.
                if let Some(&earlier) = final_teams.get(&id) {
                    assert_eq!(earlier, label);
                }
                final_teams.insert(id, label);
            }
        }
    }

    // Exactly two identities for the whole video, each present in all frames.
    let ids = per_frame_ids[0].clone();
    assert_eq!(ids.len(), 2);
    for frame_ids in &per_frame_ids {
        assert_eq!(frame_ids.len(), 2);
        for id in &ids {
            assert!(frame_ids.contains(id));
        }
    }

    // Default pool of 20 at 2 embeddings per frame: both labels exist by
    // frame ~11 and the two players land on opposite teams.
    let calibrated_at = first_full_assignment.expect("calibration never completed");
    assert!(calibrated_at <= 15, "calibrated at frame {calibrated_at}");
    assert_eq!(final_teams.len(), 2);
    let labels: Vec<TeamLabel> = final_teams.values().copied().collect();
    assert_ne!(labels[0], labels[1]);
}

#[test]
fn identical_dark_jerseys_stay_unassigned() {
    let config = SessionConfig {
        min_calibration_pool: 8,
        ..SessionConfig::default()
    };
    let mut assigner = TeamAssigner::new(&config);

    for frame in 1..=20u64 {
        for id in 1..=4u64 {
            assert!(
                assigner
                    .assign(id, ObjectClass::Player, &jersey_crop([0, 0, 0]), frame)
                    .is_none()
            );
        }
    }
    for id in 1..=4u64 {
        assert!(matches!(
            assigner.state_of(id),
            AssignState::Calibrating { .. }
        ));
    }
}
