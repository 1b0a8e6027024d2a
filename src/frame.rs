//! Decoded video frames and pixel regions cut from them.

use crate::tracker::Rect;

/// One decoded RGB8 video frame.
///
/// Frames arrive from the video source with monotonically increasing indices;
/// the crate never seeks or reorders.
#[derive(Debug, Clone)]
pub struct Frame {
    pub index: u64,
    pub width: u32,
    pub height: u32,
    /// Row-major RGB8 pixel data, `width * height * 3` bytes.
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(index: u64, width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), (width * height * 3) as usize);
        Self {
            index,
            width,
            height,
            data,
        }
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = ((y * self.width + x) * 3) as usize;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Extract the pixels under `rect`, clamped to the frame bounds.
    ///
    /// Returns `None` when the clamped region is empty, e.g. for a box that
    /// has drifted fully outside the frame.
    pub fn crop(&self, rect: &Rect) -> Option<Crop> {
        let x0 = rect.x.clamp(0.0, self.width as f32).floor() as u32;
        let y0 = rect.y.clamp(0.0, self.height as f32).floor() as u32;
        let x1 = (rect.x + rect.width).clamp(0.0, self.width as f32).ceil() as u32;
        let y1 = (rect.y + rect.height).clamp(0.0, self.height as f32).ceil() as u32;
        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        let w = x1 - x0;
        let mut data = Vec::with_capacity((w * (y1 - y0) * 3) as usize);
        for y in y0..y1 {
            let start = ((y * self.width + x0) * 3) as usize;
            data.extend_from_slice(&self.data[start..start + (w * 3) as usize]);
        }
        Some(Crop {
            width: w,
            height: y1 - y0,
            data,
        })
    }
}

/// An owned RGB8 region cut from a frame.
#[derive(Debug, Clone)]
pub struct Crop {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Crop {
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = ((y * self.width + x) * 3) as usize;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Total pixel count.
    #[inline]
    pub fn area(&self) -> u32 {
        self.width * self.height
    }
}
