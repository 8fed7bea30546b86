use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point;

/// Fill the largest disc that fits the canvas and give it an outline.
///
/// Pixels are replaced, not blended, so translucent colors keep their own
/// alpha. The outline is `ring_width` pixels thick, measured inwards.
pub fn draw_ringed_disc(canvas: &mut RgbaImage, fill: Rgba<u8>, ring: Rgba<u8>, ring_width: u32) {
    let size = canvas.width().min(canvas.height());
    let radius = size as f32 / 2.0;
    let center = (size as f32 - 1.0) / 2.0;
    let ring_start = radius - ring_width as f32;

    for (x, y, pixel) in canvas.enumerate_pixels_mut() {
        let distance = (x as f32 - center).hypot(y as f32 - center);
        if distance >= radius {
            continue;
        }
        *pixel = if distance >= ring_start { ring } else { fill };
    }
}

/// Straight stroke of the given width with flat ends.
pub fn draw_thick_line(
    canvas: &mut RgbaImage,
    start: (f32, f32),
    end: (f32, f32),
    width: u32,
    color: Rgba<u8>,
) {
    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let length = dx.hypot(dy);
    if length == 0.0 {
        return;
    }
    if width <= 1 {
        draw_line_segment_mut(canvas, start, end, color);
        return;
    }

    let half = width as f32 / 2.0;
    let (nx, ny) = (-dy / length * half, dx / length * half);
    let corner = |(x, y): (f32, f32), sign: f32| {
        Point::new((x + sign * nx).round() as i32, (y + sign * ny).round() as i32)
    };

    let polygon = [
        corner(start, 1.0),
        corner(end, 1.0),
        corner(end, -1.0),
        corner(start, -1.0),
    ];
    draw_polygon_mut(canvas, &polygon, color);
}

/// Alpha-blend `top` onto `base` with its top-left corner at `(x, y)`.
///
/// Uses the "over" operator with rounding, so an opaque base stays fully
/// opaque. Parts of `top` that fall outside `base` are clipped.
pub fn blend_over(base: &mut RgbaImage, top: &RgbaImage, x: i64, y: i64) {
    let (width, height) = (i64::from(base.width()), i64::from(base.height()));
    for (tx, ty, src) in top.enumerate_pixels() {
        let (bx, by) = (x + i64::from(tx), y + i64::from(ty));
        if src[3] == 0 || bx < 0 || by < 0 || bx >= width || by >= height {
            continue;
        }
        let dst = base.get_pixel_mut(bx as u32, by as u32);
        *dst = over(*src, *dst);
    }
}

fn over(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    let src_alpha = f32::from(src[3]) / 255.0;
    let dst_alpha = f32::from(dst[3]) / 255.0 * (1.0 - src_alpha);
    let alpha = src_alpha + dst_alpha;
    if alpha <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |i: usize| {
        ((f32::from(src[i]) * src_alpha + f32::from(dst[i]) * dst_alpha) / alpha).round() as u8
    };
    Rgba([
        channel(0),
        channel(1),
        channel(2),
        (alpha * 255.0).round() as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILL: Rgba<u8> = Rgba([0, 0, 0, 160]);
    const RING: Rgba<u8> = Rgba([76, 175, 80, 220]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    #[test]
    fn test_disc_layers() {
        let mut canvas = RgbaImage::from_pixel(66, 66, CLEAR);
        draw_ringed_disc(&mut canvas, FILL, RING, 3);

        assert_eq!(*canvas.get_pixel(0, 0), CLEAR);
        assert_eq!(*canvas.get_pixel(65, 65), CLEAR);
        assert_eq!(*canvas.get_pixel(0, 33), RING);
        assert_eq!(*canvas.get_pixel(2, 33), RING);
        assert_eq!(*canvas.get_pixel(3, 33), FILL);
        assert_eq!(*canvas.get_pixel(65, 32), RING);
        assert_eq!(*canvas.get_pixel(33, 33), FILL);
    }

    #[test]
    fn test_disc_is_symmetric() {
        let mut canvas = RgbaImage::from_pixel(41, 41, CLEAR);
        draw_ringed_disc(&mut canvas, FILL, RING, 3);

        for (x, y, pixel) in canvas.enumerate_pixels() {
            assert_eq!(pixel, canvas.get_pixel(40 - x, y));
            assert_eq!(pixel, canvas.get_pixel(x, 40 - y));
        }
    }

    #[test]
    fn test_thick_line_covers_its_path() {
        let mut canvas = RgbaImage::from_pixel(40, 40, CLEAR);
        draw_thick_line(&mut canvas, (5.0, 20.0), (35.0, 20.0), 4, RING);

        for x in 6..35 {
            assert_eq!(*canvas.get_pixel(x, 20), RING);
            assert_eq!(*canvas.get_pixel(x, 19), RING);
        }
        assert_eq!(*canvas.get_pixel(20, 10), CLEAR);
        assert_eq!(*canvas.get_pixel(20, 30), CLEAR);
    }

    #[test]
    fn test_degenerate_line_is_skipped() {
        let mut canvas = RgbaImage::from_pixel(10, 10, CLEAR);
        draw_thick_line(&mut canvas, (4.0, 4.0), (4.0, 4.0), 2, RING);
        assert!(canvas.pixels().all(|p| *p == CLEAR));
    }

    #[test]
    fn test_thin_diagonal_line() {
        let mut canvas = RgbaImage::from_pixel(10, 10, CLEAR);
        draw_thick_line(&mut canvas, (0.0, 0.0), (9.0, 9.0), 1, RING);
        for i in 0..10 {
            assert_eq!(*canvas.get_pixel(i, i), RING);
        }
    }

    #[test]
    fn test_blend_over_opaque_base_stays_opaque() {
        let mut base = RgbaImage::from_pixel(4, 4, Rgba([0, 255, 0, 255]));
        let top = RgbaImage::from_fn(2, 2, |x, _| if x == 0 { RING } else { FILL });
        blend_over(&mut base, &top, 1, 1);

        assert_eq!(*base.get_pixel(1, 1), Rgba([66, 186, 69, 255]));
        assert_eq!(*base.get_pixel(2, 1), Rgba([0, 95, 0, 255]));
        assert!(base.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn test_blend_over_skips_transparent_and_clips() {
        let background = Rgba([10, 20, 30, 255]);
        let mut base = RgbaImage::from_pixel(4, 4, background);
        let mut top = RgbaImage::from_pixel(3, 3, RING);
        top.put_pixel(2, 0, CLEAR);
        blend_over(&mut base, &top, -1, 2);

        // only base columns 0..=1 of rows 2..=3 are covered
        assert_ne!(*base.get_pixel(0, 2), background);
        assert_ne!(*base.get_pixel(1, 3), background);
        assert_eq!(*base.get_pixel(1, 2), background);
        assert_eq!(*base.get_pixel(2, 3), background);
        assert_eq!(*base.get_pixel(0, 1), background);
    }

    #[test]
    fn test_blend_over_transparent_base_takes_top() {
        let mut base = RgbaImage::from_pixel(1, 1, CLEAR);
        blend_over(&mut base, &RgbaImage::from_pixel(1, 1, RING), 0, 0);
        assert_eq!(*base.get_pixel(0, 0), RING);
    }
}
