use image::imageops;
use image::{Rgba, RgbaImage};

use crate::frame::ColorFrame;
use crate::misc::Point2;
use crate::texturing::misc::{brightness, sample_rgb, uv_to_canvas};
use crate::texturing::BakeParams;

/// Draws one opaque disc per visible vertex at its UV location, colored by
/// the frame pixel the vertex projects to. Returns the number of splats.
pub fn splat_frame(
    canvas: &mut RgbaImage,
    frame: &ColorFrame,
    pixels: &[Option<Point2>],
    uvs: &[Point2],
    params: &BakeParams,
) -> usize {
    let mut num = 0;
    for (pixel, uv) in pixels.iter().zip(uvs) {
        let pixel = match pixel {
            Some(pixel) => pixel,
            None => continue,
        };
        let rgb = sample_rgb(&frame.raster, pixel);
        if brightness(rgb) < params.brightness_floor {
            continue; // Shadow or unlit background.
        }
        let (cx, cy) = uv_to_canvas(uv, canvas);
        draw_disc(canvas, cx, cy, params.splat_radius as i64, rgb);
        num += 1;
    }
    num
}

fn draw_disc(canvas: &mut RgbaImage, cx: i64, cy: i64, r: i64, rgb: [u8; 3]) {
    let (w, h) = (canvas.width() as i64, canvas.height() as i64);
    let color = Rgba([rgb[0], rgb[1], rgb[2], 255]);
    for y in (cy - r).max(0)..=(cy + r).min(h - 1) {
        for x in (cx - r).max(0)..=(cx + r).min(w - 1) {
            let (dx, dy) = (x - cx, y - cy);
            if dx * dx + dy * dy <= r * r {
                canvas.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

/// Gaussian blur over the finished canvas; a non-positive sigma disables it.
pub fn smoothen(canvas: &RgbaImage, sigma: f32) -> RgbaImage {
    if sigma <= 0.0 {
        return canvas.clone();
    }
    let mut blurred = imageops::blur(canvas, sigma);
    for p in blurred.pixels_mut() {
        p.0[3] = 255;
    }
    blurred
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_util::solid_frame;

    fn canvas() -> RgbaImage {
        RgbaImage::from_pixel(16, 16, Rgba([128, 128, 128, 255]))
    }

    #[test]
    fn test_splat_frame_draws_discs() {
        let frame = solid_frame([50, 60, 70], 1.0, -0.5);
        let params = BakeParams {
            splat_radius: 2,
            ..Default::default()
        };
        let mut canvas = canvas();
        let num = splat_frame(
            &mut canvas,
            &frame,
            &[Some(Point2::new(3.0, 3.0)), None],
            &[Point2::new(0.5, 0.5), Point2::new(0.0, 0.0)],
            &params,
        );

        assert_eq!(num, 1);
        assert_eq!(canvas.get_pixel(8, 8).0, [50, 60, 70, 255]);
        assert_eq!(canvas.get_pixel(10, 8).0, [50, 60, 70, 255]);
        assert_eq!(canvas.get_pixel(10, 10).0, [128, 128, 128, 255]);
        assert_eq!(canvas.get_pixel(0, 0).0, [128, 128, 128, 255]);
    }

    #[test]
    fn test_splat_frame_skips_dark_samples() {
        let frame = solid_frame([2, 3, 1], 1.0, -0.5);
        let mut canvas = canvas();
        let num = splat_frame(
            &mut canvas,
            &frame,
            &[Some(Point2::new(3.0, 3.0))],
            &[Point2::new(0.5, 0.5)],
            &BakeParams::default(),
        );
        assert_eq!(num, 0);
        assert!(canvas.pixels().all(|p| p.0 == [128, 128, 128, 255]));
    }

    #[test]
    fn test_splat_frame_clips_at_border() {
        let frame = solid_frame([200, 10, 10], 1.0, -0.5);
        let mut canvas = canvas();
        splat_frame(
            &mut canvas,
            &frame,
            &[Some(Point2::new(3.0, 3.0))],
            &[Point2::new(1.0, 1.0)],
            &BakeParams::default(),
        );
        assert_eq!(canvas.get_pixel(15, 15).0, [200, 10, 10, 255]);
    }

    #[test]
    fn test_smoothen() {
        let uniform = canvas();
        assert_eq!(smoothen(&uniform, 0.0), uniform);

        let mut spot = canvas();
        spot.put_pixel(8, 8, Rgba([255, 255, 255, 255]));
        let blurred = smoothen(&spot, 1.0);
        let center = blurred.get_pixel(8, 8).0;
        assert!(center[0] < 255 && center[0] > 128);
        assert!(blurred.get_pixel(9, 8).0[0] > 128);
        assert_eq!(blurred.get_pixel(8, 8).0[3], 255);
    }
}
