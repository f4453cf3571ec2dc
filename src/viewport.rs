use serde::{Deserialize, Serialize};

use crate::types::Pixel;

/// Height of the logical playfield.
const PLAYFIELD_HEIGHT: f64 = 384.0;

/// Maps logical 512x384 coordinates onto a frame of a given size.
///
/// The playfield takes 80% of the frame height at a 4:3 aspect ratio, is
/// centered horizontally and nudged down by 2% of its height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub origin: Pixel,
    pub scale: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        let h = height as f64 * 0.8;
        let w = (h / 0.75).floor();
        let origin = Pixel::new(
            ((width as f64 - w) / 2.0).floor(),
            ((height as f64 - h) / 2.0).floor() + (h * 0.02).trunc(),
        );

        Self {
            width,
            height,
            origin,
            scale: h / PLAYFIELD_HEIGHT,
        }
    }

    pub fn to_screen(&self, position: Pixel) -> (i32, i32) {
        let screen = position * self.scale + self.origin;
        (screen.x.floor() as i32, screen.y.floor() as i32)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}
