//! Top-down PNG preview of a relief before it is placed.

use std::path::Path;

use image::{ImageError, Rgba, RgbaImage};
use relief_heightmap::HeightField;
use relief_palette::{ColorField, ColorLabel};

/// Darkest shade factor, applied to the lowest cells.
const MIN_SHADE: f32 = 0.35;

/// Brightness factor in `[MIN_SHADE, 1]` for height `h` out of `max`.
pub fn height_shade(h: i32, max: i32) -> f32 {
    if max <= 0 {
        return 1.0;
    }
    let t = (h.clamp(0, max) as f32) / (max as f32);
    MIN_SHADE + (1.0 - MIN_SHADE) * t
}

/// One pixel per cell: the cell's palette color darkened by depth.
/// Cells that classify as unknown are drawn in grayscale.
pub fn render_preview(heights: &HeightField, colors: &ColorField) -> RgbaImage {
    let (width, height) = heights.dimensions();
    let max = heights.values().iter().copied().max().unwrap_or(0);

    RgbaImage::from_fn(width, height, |px, py| {
        let cell = glam::IVec2::new(px as i32, py as i32);
        let shade = height_shade(heights[cell], max);
        let base = match colors.get(cell) {
            Some(&label) if label != ColorLabel::Unknown => label.rgb(),
            _ => [255, 255, 255],
        };
        let [r, g, b] = base.map(|channel| (channel as f32 * shade).round() as u8);
        Rgba([r, g, b, 255])
    })
}

/// Render and write the preview as a PNG.
pub fn save_preview(
    heights: &HeightField,
    colors: &ColorField,
    path: &Path,
) -> Result<(), ImageError> {
    render_preview(heights, colors).save(path)
}
