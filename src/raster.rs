// src/raster.rs

//! Off-screen pixel buffer and the shape rasterisers behind `Canvas`.
//!
//! Pixels are stored row-major as `0x00RRGGBB`. Every primitive clips to the
//! buffer, so callers may pass coordinates partially or wholly outside it.

use crate::geometry::Rect;
use font8x8::{UnicodeFonts, BASIC_FONTS};
use std::sync::{Arc, Mutex, MutexGuard};

/// Width and height of one glyph of the built-in bitmap font.
pub const GLYPH_SIZE: i32 = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Raster {
    /// Allocates a `width` x `height` buffer cleared to `background`.
    pub fn new(width: u32, height: u32, background: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![background; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Reads one pixel, `None` outside the buffer.
    pub fn pixel(&self, x: i32, y: i32) -> Option<u32> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Writes one pixel; out-of-range writes are ignored.
    pub fn put(&mut self, x: i32, y: i32, color: u32) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    fn hline(&mut self, x0: i32, x1: i32, y: i32, color: u32) {
        if y < 0 || y as u32 >= self.height || self.width == 0 {
            return;
        }
        let lo = x0.min(x1).max(0);
        let hi = x0.max(x1).min(self.width as i32 - 1);
        if lo > hi {
            return;
        }
        let row = y as usize * self.width as usize;
        self.pixels[row + lo as usize..=row + hi as usize].fill(color);
    }

    /// Fills the rectangle with top-left `(x, y)`. Non-positive sizes draw nothing.
    pub fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: u32) {
        if width <= 0 || height <= 0 {
            return;
        }
        let x1 = x.saturating_add(width - 1);
        let y_end = y.saturating_add(height - 1).min(self.height as i32 - 1);
        for row in y.max(0)..=y_end {
            self.hline(x, x1, row, color);
        }
    }

    /// Outlines the rectangle one pixel inside its bounds.
    pub fn stroke_rect(&mut self, rect: Rect, color: u32) {
        if rect.width <= 0 || rect.height <= 0 {
            return;
        }
        let right = rect.x + rect.width - 1;
        let bottom = rect.y + rect.height - 1;
        self.draw_line(rect.x, rect.y, right, rect.y, color);
        self.draw_line(rect.x, bottom, right, bottom, color);
        self.draw_line(rect.x, rect.y, rect.x, bottom, color);
        self.draw_line(right, rect.y, right, bottom, color);
    }

    /// Bresenham line, both endpoints inclusive.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
        let (mut x, mut y) = (x0 as i64, y0 as i64);
        let (x1, y1) = (x1 as i64, y1 as i64);
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            if let (Ok(px), Ok(py)) = (i32::try_from(x), i32::try_from(y)) {
                self.put(px, py, color);
            }
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Outline of the ellipse centred at `(cx, cy)` with radii `rx`, `ry`
    /// (midpoint algorithm). Negative radii draw nothing.
    pub fn draw_ellipse(&mut self, cx: i32, cy: i32, rx: i32, ry: i32, color: u32) {
        if rx < 0 || ry < 0 {
            return;
        }
        if rx == 0 || ry == 0 {
            self.draw_line(
                cx.saturating_sub(rx),
                cy.saturating_sub(ry),
                cx.saturating_add(rx),
                cy.saturating_add(ry),
                color,
            );
            return;
        }
        if !self.overlaps(cx, cy, rx, ry) {
            return;
        }

        // Decision terms reach ~2^126 for radii near i32::MAX.
        let rx2 = rx as i128 * rx as i128;
        let ry2 = ry as i128 * ry as i128;
        let (mut x, mut y) = (0i128, ry as i128);
        let mut px = 0i128;
        let mut py = 2 * rx2 * y;
        self.plot_quadrants(cx, cy, x, y, color);

        // Region 1: slope shallower than -1. Decision values are scaled by 4.
        let mut p = 4 * ry2 - 4 * rx2 * ry as i128 + rx2;
        while px < py {
            x += 1;
            px += 2 * ry2;
            if p < 0 {
                p += 4 * (ry2 + px);
            } else {
                y -= 1;
                py -= 2 * rx2;
                p += 4 * (ry2 + px - py);
            }
            self.plot_quadrants(cx, cy, x, y, color);
        }

        // Region 2: steeper than -1.
        let mut p = ry2 * (2 * x + 1) * (2 * x + 1) - 4 * rx2 * ry2 + 4 * rx2 * (y - 1) * (y - 1);
        while y > 0 {
            y -= 1;
            py -= 2 * rx2;
            if p > 0 {
                p += 4 * (rx2 - py);
            } else {
                x += 1;
                px += 2 * ry2;
                p += 4 * (rx2 - py + px);
            }
            self.plot_quadrants(cx, cy, x, y, color);
        }
        // Very flat ellipses can stop short of the horizontal extreme.
        while x < rx as i128 {
            x += 1;
            self.plot_quadrants(cx, cy, x, 0, color);
        }
    }

    /// Whether the bounding box of the ellipse meets the buffer.
    fn overlaps(&self, cx: i32, cy: i32, rx: i32, ry: i32) -> bool {
        let (cx, cy, rx, ry) = (cx as i64, cy as i64, rx as i64, ry as i64);
        cx + rx >= 0 && cx - rx < self.width as i64 && cy + ry >= 0 && cy - ry < self.height as i64
    }

    fn plot_quadrants(&mut self, cx: i32, cy: i32, x: i128, y: i128, color: u32) {
        let (x, y) = (x as i64, y as i64);
        let (cx, cy) = (cx as i64, cy as i64);
        self.put_wide(cx + x, cy + y, color);
        self.put_wide(cx - x, cy + y, color);
        self.put_wide(cx + x, cy - y, color);
        self.put_wide(cx - x, cy - y, color);
    }

    /// `put` for coordinates that may not fit in an i32.
    fn put_wide(&mut self, x: i64, y: i64, color: u32) {
        if let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) {
            self.put(x, y, color);
        }
    }

    /// Solid ellipse centred at `(cx, cy)`. Zero or negative radii draw nothing.
    pub fn fill_ellipse(&mut self, cx: i32, cy: i32, rx: i32, ry: i32, color: u32) {
        if rx <= 0 || ry <= 0 || self.height == 0 {
            return;
        }
        let rx2 = rx as i128 * rx as i128;
        let ry2 = ry as i128 * ry as i128;
        let limit = rx2 * ry2;
        // Only the rows inside the buffer.
        let first = (-(ry as i64)).max(-(cy as i64));
        let last = (ry as i64).min(self.height as i64 - 1 - cy as i64);
        for dy in first..=last {
            let row = cy as i64 + dy;
            // Widest dx with dx^2 * ry^2 + dy^2 * rx^2 <= rx^2 * ry^2.
            let budget = limit - (dy as i128) * (dy as i128) * rx2;
            let mut half = (budget as f64 / ry2 as f64).sqrt() as i128;
            while half * half * ry2 > budget {
                half -= 1;
            }
            while (half + 1) * (half + 1) * ry2 <= budget {
                half += 1;
            }
            let x0 = (cx as i128 - half).max(i32::MIN as i128) as i32;
            let x1 = (cx as i128 + half).min(i32::MAX as i128) as i32;
            self.hline(x0, x1, row as i32, color);
        }
    }

    /// Draws `text` with its baseline at `baseline_y`, starting at `x`.
    /// Characters outside the basic font advance without drawing.
    pub fn draw_text(&mut self, x: i32, baseline_y: i32, text: &str, color: u32) {
        let top = baseline_y as i64 - (GLYPH_SIZE - 1) as i64;
        let mut pen_x = x as i64;
        for ch in text.chars() {
            if pen_x >= self.width as i64 {
                break;
            }
            if let Some(glyph) = BASIC_FONTS.get(ch) {
                for (row, bits) in glyph.iter().enumerate() {
                    for col in 0..GLYPH_SIZE {
                        if (bits >> col) & 1 == 1 {
                            self.put_wide(pen_x + col as i64, top + row as i64, color);
                        }
                    }
                }
            }
            pen_x += GLYPH_SIZE as i64;
        }
    }

    /// Pixel width of `text` in the built-in font.
    pub fn text_width(text: &str) -> i32 {
        text.chars().count() as i32 * GLYPH_SIZE
    }

    /// Nearest-neighbour resample to `width` x `height`, for presenting the
    /// buffer in a window whose size differs from the logical size.
    pub fn scaled(&self, width: u32, height: u32) -> Box<[u32]> {
        if width == self.width && height == self.height {
            return self.pixels.clone().into_boxed_slice();
        }
        let mut out = vec![0u32; width as usize * height as usize];
        if self.width == 0 || self.height == 0 {
            return out.into_boxed_slice();
        }
        for y in 0..height as u64 {
            let src_y = (y * self.height as u64 / height as u64) as usize;
            let src_row = src_y * self.width as usize;
            let dst_row = y as usize * width as usize;
            for x in 0..width as u64 {
                let src_x = (x * self.width as u64 / width as u64) as usize;
                out[dst_row + x as usize] = self.pixels[src_row + src_x];
            }
        }
        out.into_boxed_slice()
    }

    /// Packed `RGB8` bytes, row-major, for image encoding.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for &p in &self.pixels {
            bytes.extend_from_slice(&[(p >> 16) as u8, (p >> 8) as u8, p as u8]);
        }
        bytes
    }
}

/// A raster shared between canvas handles and the display thread.
///
/// The buffer is allocated on first access. Every access holds the mutex for
/// its whole duration, so a draw call is complete before any reader can
/// observe the buffer.
#[derive(Debug, Clone)]
pub struct SharedRaster {
    inner: Arc<Mutex<Option<Raster>>>,
    width: u32,
    height: u32,
    background: u32,
}

impl SharedRaster {
    pub fn new(width: u32, height: u32, background: u32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(None)),
            width,
            height,
            background,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn lock(&self) -> MutexGuard<'_, Option<Raster>> {
        // A panic mid-draw leaves at worst a half-drawn shape.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Runs `f` on the buffer, allocating it first if needed.
    pub fn with<R>(&self, f: impl FnOnce(&mut Raster) -> R) -> R {
        let mut guard = self.lock();
        let raster = guard.get_or_insert_with(|| Raster::new(self.width, self.height, self.background));
        f(raster)
    }

    /// A copy of the current buffer.
    pub fn snapshot(&self) -> Raster {
        self.with(|raster| raster.clone())
    }

    pub fn is_allocated(&self) -> bool {
        self.lock().is_some()
    }
}
