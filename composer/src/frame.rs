use std::collections::HashMap;
use std::sync::Arc;

use image::RgbaImage;

use crate::misc::{Isometry3, Point3};
use base::defs::{Error, ErrorKind::*, Result};

/// One tracked face sample: per-vertex positions in mesh-local space plus the
/// pose and expression signals reported by the tracker.
#[derive(Clone, Debug)]
pub struct GeometrySample {
    pub vertices: Vec<Point3>,
    pub topology: Arc<[u32]>,
    pub transform: Isometry3,
    pub tracking_ok: bool,
    pub expressions: HashMap<String, f32>,
    pub timestamp: f64, // Seconds.
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PixelFormat {
    Rgba8,
    Bgra8,
}

#[derive(Clone, Debug)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

impl Raster {
    pub fn new(
        width: u32,
        height: u32,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<Raster> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(Error::new(
                MalformedData,
                format!(
                    "raster {}x{} needs {} bytes, got {}",
                    width,
                    height,
                    expected,
                    data.len()
                ),
            ));
        }
        Ok(Raster {
            width,
            height,
            format,
            data,
        })
    }

    pub fn from_rgba_image(image: RgbaImage) -> Raster {
        Raster {
            width: image.width(),
            height: image.height(),
            format: PixelFormat::Rgba8,
            data: image.into_raw(),
        }
    }

    pub fn rgb(&self, x: u32, y: u32) -> [u8; 3] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let p = &self.data[i..i + 4];
        match self.format {
            PixelFormat::Rgba8 => [p[0], p[1], p[2]],
            PixelFormat::Bgra8 => [p[2], p[1], p[0]],
        }
    }
}

/// Pinhole intrinsics, valid for the calibration resolution they carry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intrinsics {
    pub fx: f32,
    pub fy: f32,
    pub cx: f32,
    pub cy: f32,
    pub width: u32,
    pub height: u32,
}

impl Intrinsics {
    pub fn scaled_to(&self, width: u32, height: u32) -> Intrinsics {
        if self.width == 0 || self.height == 0 {
            return *self;
        }
        let sx = width as f32 / self.width as f32;
        let sy = height as f32 / self.height as f32;
        Intrinsics {
            fx: self.fx * sx,
            fy: self.fy * sy,
            cx: self.cx * sx,
            cy: self.cy * sy,
            width,
            height,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ColorFrame {
    pub raster: Raster,
    pub camera_transform: Isometry3,
    pub intrinsics: Intrinsics,
    pub face_transform: Isometry3,
    pub quality: f32,
}
