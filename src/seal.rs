//! Procedural certification seal.
//!
//! The seal is a translucent disc with a colored outline, a thin decorative
//! ring and a checkmark or a cross, blended into the bottom-right corner of a
//! copy of the photo.

pub mod drawing;
pub mod style;

use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_circle_mut;

pub use style::{Palette, SealStyle, Symbol};

use drawing::{blend_over, draw_ringed_disc, draw_thick_line};

/// The photo with its seal, always RGBA.
pub type CertifiedImage = RgbaImage;

/// Where a seal lands on a given image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SealPlacement {
    pub size: u32,
    pub x: i64,
    pub y: i64,
}

impl SealPlacement {
    /// `None` when the image is too small to carry a seal.
    pub fn for_image(width: u32, height: u32, style: &SealStyle) -> Option<Self> {
        let size = style.seal_size(width, height);
        if size < style.min_size {
            return None;
        }
        let (x, y) = style.position(width, height, size);
        Some(Self { size, x, y })
    }
}

/// Copy `image` and stamp it with the seal for the given outcome.
pub fn composite(image: &DynamicImage, is_positive: bool) -> CertifiedImage {
    composite_with_style(image, is_positive, &SealStyle::default())
}

pub fn composite_with_style(
    image: &DynamicImage,
    is_positive: bool,
    style: &SealStyle,
) -> CertifiedImage {
    let mut certified = image.to_rgba8();
    let (width, height) = certified.dimensions();

    let Some(placement) = SealPlacement::for_image(width, height, style) else {
        tracing::debug!("Image {}x{} is too small for a seal", width, height);
        return certified;
    };
    tracing::debug!(
        "Seal of {}px at ({}, {})",
        placement.size,
        placement.x,
        placement.y
    );

    let seal = render_seal(placement.size, &Palette::for_outcome(is_positive), style);
    blend_over(&mut certified, &seal, placement.x, placement.y);
    certified
}

/// Draw a standalone seal on a transparent square canvas.
pub fn render_seal(size: u32, palette: &Palette, style: &SealStyle) -> RgbaImage {
    let mut seal = RgbaImage::from_pixel(size, size, Rgba([0, 0, 0, 0]));
    draw_ringed_disc(&mut seal, palette.fill, palette.ring, style.outline_width);

    let center = size / 2;
    let radius = f64::from(center) - 2.0;
    let inner_radius = (radius * style.inner_ring_ratio).round() as i32;
    if inner_radius > 0 {
        draw_hollow_circle_mut(
            &mut seal,
            (center as i32, center as i32),
            inner_radius,
            palette.ring,
        );
    }

    let stroke = style.symbol_stroke(size);
    let c = center as f32;
    match palette.symbol {
        Symbol::Checkmark => {
            let k = (f64::from(size) * style.checkmark_ratio).floor() as u32;
            let (full, half) = (k as f32, (k / 2) as f32);
            let elbow = (c - half, c + half);
            draw_thick_line(&mut seal, (c - full, c), elbow, stroke, palette.ring);
            draw_thick_line(&mut seal, elbow, (c + full, c - half), stroke, palette.ring);
        }
        Symbol::Cross => {
            let q = ((f64::from(size) * style.cross_ratio).floor() as u32) as f32;
            draw_thick_line(&mut seal, (c - q, c - q), (c + q, c + q), stroke, palette.ring);
            draw_thick_line(&mut seal, (c + q, c - q), (c - q, c + q), stroke, palette.ring);
        }
    }

    seal
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn green_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([0, 255, 0])))
    }

    #[test]
    fn test_composite_is_deterministic() {
        let image = green_image(640, 480);
        for is_positive in [true, false] {
            let first = composite(&image, is_positive);
            let second = composite(&image, is_positive);
            assert_eq!(first.as_raw(), second.as_raw());
        }
    }

    #[test]
    fn test_composite_keeps_dimensions_and_adds_alpha() {
        let certified = composite(&green_image(1000, 500), true);
        assert_eq!(certified.dimensions(), (1000, 500));
        assert_eq!(*certified.get_pixel(0, 0), Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn test_placement_for_wide_image() {
        let placement = SealPlacement::for_image(1000, 500, &SealStyle::default());
        assert_eq!(
            placement,
            Some(SealPlacement {
                size: 110,
                x: 870,
                y: 370
            })
        );
    }

    #[test]
    fn test_seal_lands_in_bottom_right_corner() {
        let original = green_image(1000, 500);
        let certified = composite(&original, false);
        let untouched = Rgba([0, 255, 0, 255]);

        // left edge midpoint of the seal is on the outline
        let outline = certified.get_pixel(870, 370 + 55);
        assert!(outline[0] > 200, "{outline:?}");

        for (x, y, pixel) in certified.enumerate_pixels() {
            let inside = (870..980).contains(&x) && (370..480).contains(&y);
            if !inside {
                assert_eq!(*pixel, untouched, "pixel ({x}, {y}) changed");
            }
        }
    }

    #[test]
    fn test_positive_seal_colors() {
        let certified = composite(&green_image(300, 300), true);

        // outline, blended over green
        let outline = certified.get_pixel(214, 214 + 33);
        assert!((60..=70).contains(&outline[0]), "{outline:?}");
        assert_eq!(outline[3], 255);

        // dark inner fill
        let fill = certified.get_pixel(214 + 33, 214 + 20);
        assert!(fill[0] < 5, "{fill:?}");
        assert!((90..=100).contains(&fill[1]), "{fill:?}");
        assert_eq!(fill[3], 255);

        // on the long stroke of the checkmark
        let check = certified.get_pixel(214 + 37, 214 + 33);
        assert!((60..=70).contains(&check[0]), "{check:?}");

        // transparent corner of the seal canvas
        assert_eq!(*certified.get_pixel(214, 214), Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn test_negative_seal_has_cross_at_center() {
        let certified = composite(&green_image(300, 300), false);
        let center = certified.get_pixel(214 + 33, 214 + 33);
        assert!(center[0] > 200, "{center:?}");

        let positive = composite(&green_image(300, 300), true);
        let center = positive.get_pixel(214 + 33, 214 + 33);
        assert!(center[0] < 100, "{center:?}");
    }

    #[test]
    fn test_opaque_photo_stays_opaque() {
        for is_positive in [true, false] {
            let certified = composite(&green_image(300, 300), is_positive);
            assert!(certified.pixels().all(|p| p[3] == 255));
        }
    }

    #[test]
    fn test_tiny_images_are_left_alone() {
        for (width, height) in [(1, 1), (10, 10), (30, 500), (36, 36)] {
            let image = green_image(width, height);
            let certified = composite(&image, true);
            assert_eq!(certified, image.to_rgba8());
        }
    }

    #[test]
    fn test_smallest_seal_fits() {
        let certified = composite(&green_image(37, 37), false);
        assert_eq!(certified.dimensions(), (37, 37));
        assert_ne!(certified, green_image(37, 37).to_rgba8());
    }

    #[test]
    fn test_render_seal_is_transparent_outside_disc() {
        let seal = render_seal(110, &Palette::for_outcome(true), &SealStyle::default());
        assert_eq!(seal.dimensions(), (110, 110));
        assert_eq!(seal.get_pixel(0, 0)[3], 0);
        assert_eq!(seal.get_pixel(109, 0)[3], 0);
        assert_eq!(*seal.get_pixel(0, 55), style::POSITIVE_RING);
    }
}
