use image::RgbaImage;

use crate::frame::Raster;
use crate::misc::Point2;

pub type Rgb = [u8; 3];

/// Nearest-pixel color lookup; `pixel` must lie within the raster.
pub fn sample_rgb(raster: &Raster, pixel: &Point2) -> Rgb {
    let x = (pixel.x as u32).min(raster.width.saturating_sub(1));
    let y = (pixel.y as u32).min(raster.height.saturating_sub(1));
    raster.rgb(x, y)
}

/// Rec. 601 luma scaled to [0, 1].
pub fn brightness(rgb: Rgb) -> f32 {
    let [r, g, b] = rgb.map(|c| c as f32);
    (0.299 * r + 0.587 * g + 0.114 * b) / 255.0
}

/// Maps a UV coordinate to the texel containing it.
pub fn uv_to_canvas(uv: &Point2, canvas: &RgbaImage) -> (i64, i64) {
    let to_texel = |t: f32, size: u32| {
        ((t * size as f32) as i64).clamp(0, size as i64 - 1)
    };
    (to_texel(uv.x, canvas.width()), to_texel(uv.y, canvas.height()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::frame::PixelFormat;
    use base::assert_eq_f32;

    #[test]
    fn test_brightness() {
        assert_eq_f32!(brightness([0, 0, 0]), 0.0);
        assert_eq_f32!(brightness([255, 255, 255]), 1.0);
        assert!(brightness([0, 255, 0]) > brightness([0, 0, 255]));
    }

    #[test]
    fn test_uv_to_canvas() {
        let canvas = RgbaImage::new(64, 32);
        assert_eq!(uv_to_canvas(&Point2::new(0.0, 0.0), &canvas), (0, 0));
        assert_eq!(uv_to_canvas(&Point2::new(0.5, 0.5), &canvas), (32, 16));
        assert_eq!(uv_to_canvas(&Point2::new(1.0, 1.0), &canvas), (63, 31));
    }

    #[test]
    fn test_sample_rgb() {
        let data = vec![
            1, 2, 3, 255, 4, 5, 6, 255, //
            7, 8, 9, 255, 10, 11, 12, 255,
        ];
        let raster = Raster::new(2, 2, PixelFormat::Rgba8, data).unwrap();
        assert_eq!(sample_rgb(&raster, &Point2::new(1.7, 0.2)), [4, 5, 6]);
        assert_eq!(sample_rgb(&raster, &Point2::new(0.0, 1.9)), [7, 8, 9]);
    }
}
