//! Positioned bitmap sprites for the touch overlay

use anyhow::{Context, Result};
use image::RgbaImage;
use std::path::Path;
use std::sync::Arc;

use crate::canvas::Canvas;

/// A bitmap with an on-screen position.
///
/// The bitmap is shared, so cloning a sprite (e.g. stamping out FPS digits
/// from the numeral set) does not copy pixel data. Position and extents are
/// plain integers in surface coordinates; half-extents are cached because
/// every layout operation centers on them.
#[derive(Debug, Clone)]
pub struct Sprite {
    bitmap: Arc<RgbaImage>,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub half_width: i32,
    pub half_height: i32,
}

impl Sprite {
    pub fn from_bitmap(bitmap: RgbaImage) -> Self {
        let width = bitmap.width() as i32;
        let height = bitmap.height() as i32;
        Self {
            bitmap: Arc::new(bitmap),
            x: 0,
            y: 0,
            width,
            height,
            half_width: width / 2,
            half_height: height / 2,
        }
    }

    /// Decode a PNG asset from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let bitmap = image::open(path)
            .with_context(|| format!("Failed to load sprite image {:?}", path))?
            .to_rgba8();
        Ok(Self::from_bitmap(bitmap))
    }

    pub fn set_pos(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    /// Center the sprite at `(cx, cy)` within the surface rect `(0, 0, w, h)`,
    /// clamped so the sprite stays fully inside.
    pub fn fit_center(&mut self, cx: i32, cy: i32, w: i32, h: i32) {
        self.fit_center_within(cx, cy, 0, 0, w, h);
    }

    /// Center the sprite at `(cx, cy)` within an arbitrary rect, clamped so
    /// the sprite stays fully inside. When the sprite is larger than the rect
    /// the high-edge clamp wins and the sprite overhangs left/top.
    pub fn fit_center_within(
        &mut self,
        cx: i32,
        cy: i32,
        rect_x: i32,
        rect_y: i32,
        rect_w: i32,
        rect_h: i32,
    ) {
        let mut cx = cx.max(rect_x + self.half_width);
        let mut cy = cy.max(rect_y + self.half_height);
        if cx + self.half_width > rect_x + rect_w {
            cx = rect_x + rect_w - self.half_width;
        }
        if cy + self.half_height > rect_y + rect_h {
            cy = rect_y + rect_h - self.half_height;
        }
        self.x = cx - self.half_width;
        self.y = cy - self.half_height;
    }

    /// Blit the sprite onto the canvas at its current position.
    pub fn draw(&self, canvas: &mut Canvas) {
        canvas.blit(&self.bitmap, self.x, self.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sprite(w: u32, h: u32) -> Sprite {
        Sprite::from_bitmap(RgbaImage::new(w, h))
    }

    #[test]
    fn test_half_extents_cached() {
        let s = sprite(10, 7);
        assert_eq!((s.width, s.height), (10, 7));
        assert_eq!((s.half_width, s.half_height), (5, 3));
    }

    #[test]
    fn test_fit_center_inside_bounds() {
        let mut s = sprite(10, 10);
        s.fit_center(50, 40, 100, 100);
        assert_eq!((s.x, s.y), (45, 35));
    }

    #[test]
    fn test_fit_center_clamps_low_edge() {
        let mut s = sprite(10, 10);
        s.fit_center(2, 3, 100, 100);
        assert_eq!((s.x, s.y), (0, 0));
    }

    #[test]
    fn test_fit_center_clamps_high_edge() {
        let mut s = sprite(10, 10);
        s.fit_center(99, 98, 100, 100);
        assert_eq!((s.x, s.y), (90, 90));
    }

    #[test]
    fn test_fit_center_within_rect() {
        let mut s = sprite(20, 20);
        s.fit_center_within(30, 30, 20, 20, 60, 60);
        assert_eq!((s.x, s.y), (20, 20));

        // Clamped against the rect's far edge
        s.fit_center_within(200, 200, 20, 20, 60, 60);
        assert_eq!((s.x, s.y), (60, 60));
    }

    #[test]
    fn test_clone_shares_bitmap() {
        let s = sprite(4, 4);
        let mut c = s.clone();
        c.set_pos(9, 9);
        assert!(Arc::ptr_eq(&s.bitmap, &c.bitmap));
        assert_eq!((s.x, s.y), (0, 0));
        assert_eq!((c.x, c.y), (9, 9));
    }
}
