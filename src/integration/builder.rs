//! Builder for `Detection` records from the box formats detectors emit.

use crate::tracker::{Detection, ObjectClass, Rect};

#[derive(Debug, Clone)]
pub struct DetectionBuilder {
    bbox: Rect,
    class: ObjectClass,
    confidence: f32,
}

impl Default for DetectionBuilder {
    fn default() -> Self {
        Self {
            bbox: Rect::default(),
            class: ObjectClass::Player,
            confidence: 0.0,
        }
    }
}

impl DetectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Box as (x1, y1, x2, y2).
    pub fn tlbr(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.bbox = Rect::from_tlbr(x1, y1, x2, y2);
        self
    }

    /// Box as (center_x, center_y, width, height).
    pub fn xywh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.bbox = Rect::new(cx - w / 2.0, cy - h / 2.0, w, h);
        self
    }

    /// Box as (top-left x, top-left y, width, height).
    pub fn tlwh(mut self, x: f32, y: f32, w: f32, h: f32) -> Self {
        self.bbox = Rect::new(x, y, w, h);
        self
    }

    /// Object class; defaults to `Player`.
    pub fn class(mut self, class: ObjectClass) -> Self {
        self.class = class;
        self
    }

    /// Numeric class id from the fixed taxonomy; unknown ids are ignored.
    pub fn class_id(mut self, id: u32) -> Self {
        if let Some(class) = ObjectClass::from_id(id) {
            self.class = class;
        }
        self
    }

    pub fn confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn build(self) -> Detection {
        Detection::new(self.class, self.bbox, self.confidence)
    }
}
