use std::path::Path;

use image::RgbaImage;

use super::text::{blend, TextOverlay};
use crate::error::SetupError;

const WHITE: [u8; 4] = [255, 255, 255, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];
const OUTLINE_THICKNESS: i32 = 2;

/// Horizontal bar strip geometry, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarStyle {
    pub width: f32,
    pub spacing: f32,
    /// Distance of the baseline from the bottom edge.
    pub baseline_offset: f32,
    pub color: [u8; 3],
}

impl Default for BarStyle {
    fn default() -> Self {
        Self {
            width: 5.0,
            spacing: 3.0,
            baseline_offset: 100.0,
            color: [0, 0, 255],
        }
    }
}

/// Builds one RGBA frame: background, title, elapsed time and bars.
pub struct FrameComposer {
    width: u32,
    height: u32,
    background: Option<RgbaImage>,
    title: String,
    title_text: TextOverlay,
    time_text: TextOverlay,
    bars: BarStyle,
}

impl FrameComposer {
    pub fn new(
        width: u32,
        height: u32,
        background: Option<RgbaImage>,
        title: String,
        title_text: TextOverlay,
        time_text: TextOverlay,
        bars: BarStyle,
    ) -> Self {
        Self {
            width,
            height,
            background,
            title,
            title_text,
            time_text,
            bars,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn compose(&self, bars: &[f32], elapsed_label: &str) -> Vec<u8> {
        let mut pixels = vec![0u8; self.width as usize * self.height as usize * 4];
        for px in pixels.chunks_exact_mut(4) {
            px[3] = 255;
        }

        if let Some(ref background) = self.background {
            draw_image(&mut pixels, self.width, self.height, background);
        }

        self.title_text.composite_outlined(
            &mut pixels,
            self.width,
            self.height,
            &self.title,
            (58, 3),
            WHITE,
            BLACK,
            OUTLINE_THICKNESS,
        );

        let time_y = self.height as i32 - 70;
        self.time_text.composite_outlined(
            &mut pixels,
            self.width,
            self.height,
            elapsed_label,
            (30, time_y),
            WHITE,
            BLACK,
            OUTLINE_THICKNESS,
        );

        draw_bars(&mut pixels, self.width, self.height, &self.bars, bars);
        pixels
    }
}

pub fn load_background(path: &Path) -> Result<RgbaImage, SetupError> {
    image::open(path)
        .map(|img| img.to_rgba8())
        .map_err(|e| SetupError::Image {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// Bars centered horizontally, growing upward from the baseline.
fn draw_bars(pixels: &mut [u8], width: u32, height: u32, style: &BarStyle, bars: &[f32]) {
    let count = bars.len() as f32;
    let total_width = count * style.width + (count - 1.0).max(0.0) * style.spacing;
    let start_x = (width as f32 - total_width) / 2.0;
    let baseline = height as f32 - style.baseline_offset;
    let color = [style.color[0], style.color[1], style.color[2], 255];

    for (i, &bar) in bars.iter().enumerate() {
        let bar = bar.max(0.0);
        let x = start_x + i as f32 * (style.width + style.spacing);
        fill_rect(pixels, width, height, x, baseline - bar, style.width, bar, color);
    }
}

/// Copy `image` onto the frame at the origin, at native size.
fn draw_image(pixels: &mut [u8], width: u32, height: u32, image: &RgbaImage) {
    let w = image.width().min(width);
    let h = image.height().min(height);
    for y in 0..h {
        for x in 0..w {
            let src = image.get_pixel(x, y).0;
            let idx = (y as usize * width as usize + x as usize) * 4;
            blend(&mut pixels[idx..idx + 4], src, src[3] as f32 / 255.0);
        }
    }
}

/// Fill the rectangle covering pixel centers inside `[x, x+w) x [y, y+h)`,
/// clipped to the frame.
pub fn fill_rect(
    pixels: &mut [u8],
    width: u32,
    height: u32,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    color: [u8; 4],
) {
    let x0 = x.round().clamp(0.0, width as f32) as u32;
    let x1 = (x + w).round().clamp(0.0, width as f32) as u32;
    let y0 = y.round().clamp(0.0, height as f32) as u32;
    let y1 = (y + h).round().clamp(0.0, height as f32) as u32;
    let a = color[3] as f32 / 255.0;

    for py in y0..y1 {
        for px in x0..x1 {
            let idx = (py as usize * width as usize + px as usize) * 4;
            blend(&mut pixels[idx..idx + 4], color, a);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(pixels: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * width + x) * 4) as usize;
        [pixels[idx], pixels[idx + 1], pixels[idx + 2], pixels[idx + 3]]
    }

    #[test]
    fn fill_rect_clips_to_frame() {
        let mut pixels = vec![0u8; 4 * 4 * 4];
        fill_rect(&mut pixels, 4, 4, -2.0, 2.0, 4.0, 10.0, [0, 0, 255, 255]);
        assert_eq!(pixel(&pixels, 4, 0, 3), [0, 0, 255, 255]);
        assert_eq!(pixel(&pixels, 4, 1, 2), [0, 0, 255, 255]);
        assert_eq!(pixel(&pixels, 4, 2, 2), [0, 0, 0, 0]);
        assert_eq!(pixel(&pixels, 4, 0, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn bars_grow_up_from_baseline() {
        let (width, height) = (20, 20);
        let mut pixels = vec![0u8; (width * height * 4) as usize];
        let style = BarStyle {
            width: 2.0,
            spacing: 2.0,
            baseline_offset: 5.0,
            color: [1, 2, 3],
        };
        // total width 2+2+2 = 6, so bars start at x=7 and x=11
        draw_bars(&mut pixels, width, height, &style, &[4.0, 0.0]);

        assert_eq!(pixel(&pixels, width, 7, 14), [1, 2, 3, 255]);
        assert_eq!(pixel(&pixels, width, 8, 11), [1, 2, 3, 255]);
        assert_eq!(pixel(&pixels, width, 7, 10), [0, 0, 0, 0]);
        assert_eq!(pixel(&pixels, width, 7, 15), [0, 0, 0, 0]);
        assert!((0..height).all(|y| pixel(&pixels, width, 11, y) == [0, 0, 0, 0]));
    }

    #[test]
    fn background_is_drawn_at_origin_without_scaling() {
        let mut pixels = vec![0u8; 3 * 3 * 4];
        let image = RgbaImage::from_pixel(2, 5, image::Rgba([10, 20, 30, 255]));
        draw_image(&mut pixels, 3, 3, &image);
        assert_eq!(pixel(&pixels, 3, 1, 2), [10, 20, 30, 255]);
        assert_eq!(pixel(&pixels, 3, 2, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn missing_background_is_a_setup_error() {
        let err = load_background(Path::new("/nonexistent/bg.png")).unwrap_err();
        assert!(matches!(err, SetupError::Image { .. }));
    }
}
