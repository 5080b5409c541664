// Fixtures shared by the unit tests of the composer.

use std::collections::HashMap;
use std::sync::Arc;

use crate::frame::{ColorFrame, GeometrySample, Intrinsics, PixelFormat, Raster};
use crate::misc::{Isometry3, Point3};

pub const FRAME_SIZE: u32 = 64;

/// Uniformly colored 64×64 frame seen by an identity camera, with the face
/// placed `face_z` along the Z axis.
pub fn solid_frame(rgb: [u8; 3], quality: f32, face_z: f32) -> ColorFrame {
    let num_pixels = (FRAME_SIZE * FRAME_SIZE) as usize;
    let data = [rgb[0], rgb[1], rgb[2], 255].repeat(num_pixels);
    ColorFrame {
        raster: Raster::new(FRAME_SIZE, FRAME_SIZE, PixelFormat::Rgba8, data)
            .unwrap(),
        camera_transform: Isometry3::identity(),
        intrinsics: Intrinsics {
            fx: 64.0,
            fy: 64.0,
            cx: 32.0,
            cy: 32.0,
            width: FRAME_SIZE,
            height: FRAME_SIZE,
        },
        face_transform: Isometry3::translation(0.0, 0.0, face_z),
        quality,
    }
}

/// Small square face: four corners around a center vertex.
pub fn quad_face() -> (Vec<Point3>, Arc<[u32]>) {
    let vertices = vec![
        Point3::new(-0.05, -0.05, 0.0),
        Point3::new(0.05, -0.05, 0.0),
        Point3::new(0.05, 0.05, 0.0),
        Point3::new(-0.05, 0.05, 0.0),
        Point3::new(0.0, 0.0, 0.0),
    ];
    let topology: Arc<[u32]> =
        vec![0, 1, 4, 1, 2, 4, 2, 3, 4, 3, 0, 4].into();
    (vertices, topology)
}

/// Triangle fan over `n` points of a wavy surface.
pub fn fan_face(n: usize) -> (Vec<Point3>, Arc<[u32]>) {
    let vertices = (0..n)
        .map(|i| {
            let t = i as f32 * 0.37;
            let r = 0.001 * i as f32;
            Point3::new(r * t.cos(), r * t.sin(), 0.01 * (3.0 * t).sin())
        })
        .collect();
    let topology: Vec<u32> = (1..n as u32 - 1)
        .flat_map(|i| [0, i, i + 1])
        .collect();
    (vertices, topology.into())
}

pub fn sample(
    vertices: &[Point3],
    topology: &Arc<[u32]>,
    timestamp: f64,
) -> GeometrySample {
    GeometrySample {
        vertices: vertices.to_vec(),
        topology: topology.clone(),
        transform: Isometry3::translation(0.0, 0.0, -0.5),
        tracking_ok: true,
        expressions: HashMap::new(),
        timestamp,
    }
}
