use image::{DynamicImage, Rgb, Rgba, RgbaImage};

use crate::options::IgnoreArea;

/// Border thickness of every ignore-area rectangle, in pixels.
pub const BORDER_WIDTH: u32 = 2;

/// How ignore areas are painted. Opacities are fractions of full alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub color: Rgb<u8>,
    pub border_opacity: f32,
    /// `0.0` draws the border only and leaves the interior untouched.
    pub fill_opacity: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            color: Rgb([255, 0, 0]),
            border_opacity: 1.0,
            fill_opacity: 0.3,
        }
    }
}

fn alpha(opacity: f32) -> u8 {
    (opacity.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Transparent image of `dimensions` with every ignore area drawn on it,
/// or `None` when there is nothing to draw.
///
/// Areas are painted last-to-first, so the first declared area ends up on
/// top where rectangles overlap.
pub fn create_ignore_areas_overlay(
    dimensions: (u32, u32),
    areas: &[IgnoreArea],
    style: &OverlayStyle,
) -> Option<RgbaImage> {
    if areas.is_empty() {
        return None;
    }

    let (width, height) = dimensions;
    let mut overlay = RgbaImage::new(width, height);
    let [r, g, b] = style.color.0;
    let border = Rgba([r, g, b, alpha(style.border_opacity)]);
    let fill = (style.fill_opacity > 0.0).then(|| Rgba([r, g, b, alpha(style.fill_opacity)]));

    for area in areas.iter().rev() {
        let (x1, x2) = (area.x1.min(area.x2), area.x1.max(area.x2));
        let (y1, y2) = (area.y1.min(area.y2), area.y1.max(area.y2));
        if x1 >= width || y1 >= height {
            continue;
        }

        for y in y1..=y2.min(height - 1) {
            for x in x1..=x2.min(width - 1) {
                let on_border = x < x1.saturating_add(BORDER_WIDTH)
                    || y < y1.saturating_add(BORDER_WIDTH)
                    || x.saturating_add(BORDER_WIDTH) > x2
                    || y.saturating_add(BORDER_WIDTH) > y2;
                if on_border {
                    overlay.put_pixel(x, y, border);
                } else if let Some(fill) = fill {
                    overlay.put_pixel(x, y, fill);
                }
            }
        }
    }

    Some(overlay)
}

/// Blend `overlay` onto a copy of `image`, anchored top-left.
pub fn composite(image: &DynamicImage, overlay: &RgbaImage) -> DynamicImage {
    let mut out = image.clone();
    image::imageops::overlay(&mut out, overlay, 0, 0);
    out
}
