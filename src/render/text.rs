use std::path::Path;

use fontdue::{Font, FontSettings};

use crate::error::SetupError;

/// Rasterized text at one pixel size, alpha-blended onto RGBA frames.
pub struct TextOverlay {
    font: Font,
    font_size: f32,
}

impl TextOverlay {
    pub fn from_font(font: Font, font_size: f32) -> Self {
        Self { font, font_size }
    }

    /// Composite text onto an RGBA pixel buffer with its top-left at (x, y).
    /// Glyphs falling outside the frame are clipped.
    pub fn composite(
        &self,
        pixels: &mut [u8],
        width: u32,
        height: u32,
        text: &str,
        x: i32,
        y: i32,
        color: [u8; 4],
    ) {
        let mut cursor_x = x;
        for ch in text.chars() {
            let (metrics, bitmap) = self.font.rasterize(ch, self.font_size);
            let glyph_y = y + self.font_size as i32 - metrics.height as i32 - metrics.ymin;

            for gy in 0..metrics.height {
                for gx in 0..metrics.width {
                    let alpha = bitmap[gy * metrics.width + gx];
                    if alpha == 0 {
                        continue;
                    }

                    let px = cursor_x + metrics.xmin + gx as i32;
                    let py = glyph_y + gy as i32;

                    if px < 0 || py < 0 || px >= width as i32 || py >= height as i32 {
                        continue;
                    }

                    let idx = (py as usize * width as usize + px as usize) * 4;
                    if idx + 3 >= pixels.len() {
                        continue;
                    }

                    let a = alpha as f32 / 255.0 * (color[3] as f32 / 255.0);
                    blend(&mut pixels[idx..idx + 4], color, a);
                }
            }

            cursor_x += metrics.advance_width.round() as i32;
        }
    }

    /// Composite text with a solid outline `thickness` pixels wide drawn
    /// underneath it.
    pub fn composite_outlined(
        &self,
        pixels: &mut [u8],
        width: u32,
        height: u32,
        text: &str,
        (x, y): (i32, i32),
        fill: [u8; 4],
        outline: [u8; 4],
        thickness: i32,
    ) {
        for dy in -thickness..=thickness {
            for dx in -thickness..=thickness {
                if (dx != 0 || dy != 0) && dx * dx + dy * dy <= thickness * thickness {
                    self.composite(pixels, width, height, text, x + dx, y + dy, outline);
                }
            }
        }
        self.composite(pixels, width, height, text, x, y, fill);
    }
}

pub fn load_font(path: &Path) -> Result<Font, SetupError> {
    let fail = |reason: String| SetupError::Font {
        path: path.to_path_buf(),
        reason,
    };
    let bytes = std::fs::read(path).map_err(|e| fail(e.to_string()))?;
    Font::from_bytes(bytes, FontSettings::default()).map_err(|e| fail(e.to_string()))
}

/// Source-over blend of `color` at opacity `a` into one RGBA pixel.
pub fn blend(pixel: &mut [u8], color: [u8; 4], a: f32) {
    let inv_a = 1.0 - a;
    for c in 0..3 {
        pixel[c] = (color[c] as f32 * a + pixel[c] as f32 * inv_a) as u8;
    }
    pixel[3] = 255;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_is_source_over() {
        let mut pixel = [100u8, 0, 200, 0];
        blend(&mut pixel, [200, 255, 0, 255], 0.5);
        assert_eq!(pixel, [150, 127, 100, 255]);

        let mut opaque = [1u8, 2, 3, 4];
        blend(&mut opaque, [9, 8, 7, 255], 1.0);
        assert_eq!(opaque, [9, 8, 7, 255]);
    }

    #[test]
    fn missing_font_is_a_setup_error() {
        let err = load_font(Path::new("/nonexistent/font.ttf")).unwrap_err();
        assert!(matches!(err, SetupError::Font { .. }));
    }

    #[test]
    fn garbage_font_is_a_setup_error() {
        let path = std::env::temp_dir().join(format!("spectra-bad-font-{}.ttf", std::process::id()));
        std::fs::write(&path, b"definitely not a font").unwrap();
        let result = load_font(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(SetupError::Font { .. })));
    }
}
