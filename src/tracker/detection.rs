//! Detection records consumed from the external detector.

use crate::tracker::geometry::Rect;

/// Fixed detector class taxonomy: 0=ball, 1=goalkeeper, 2=player, 3=referee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectClass {
    Ball,
    Goalkeeper,
    Player,
    Referee,
}

impl ObjectClass {
    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            0 => Some(Self::Ball),
            1 => Some(Self::Goalkeeper),
            2 => Some(Self::Player),
            3 => Some(Self::Referee),
            _ => None,
        }
    }

    pub fn id(self) -> u32 {
        match self {
            Self::Ball => 0,
            Self::Goalkeeper => 1,
            Self::Player => 2,
            Self::Referee => 3,
        }
    }

    /// Classes that take part in team assignment. Ball and referee are never
    /// clustered.
    pub fn is_team_member(self) -> bool {
        matches!(self, Self::Goalkeeper | Self::Player)
    }
}

/// One detection from the external detector for one frame.
#[derive(Debug, Clone)]
pub struct Detection {
    pub class: ObjectClass,
    /// Bounding box in frame pixel coordinates.
    pub bbox: Rect,
    pub confidence: f32,
}

impl Detection {
    pub fn new(class: ObjectClass, bbox: Rect, confidence: f32) -> Self {
        Self {
            class,
            bbox,
            confidence,
        }
    }
}
