use crate::frame::ColorFrame;
use crate::misc::{Point2, Point3};

/// Projects mesh-local vertices into the raster of a color frame.
///
/// Vertices are moved to world space with the face pose, then into the
/// camera frame, which looks down its local -Z with +Y up. Intrinsics are
/// rescaled to the raster in case it was downsampled. Vertices closer than
/// `near` or outside the raster map to `None`.
pub fn project_like_camera(
    frame: &ColorFrame,
    vertices: &[Point3],
    near: f32,
) -> Vec<Option<Point2>> {
    let (width, height) = (frame.raster.width, frame.raster.height);
    let intrinsics = frame.intrinsics.scaled_to(width, height);

    vertices
        .iter()
        .map(|v| {
            let world = frame.face_transform.transform_point(v);
            let camera = frame.camera_transform.inverse_transform_point(&world);

            let depth = -camera.z;
            if depth <= near {
                return None;
            }

            let x = intrinsics.fx * camera.x / depth + intrinsics.cx;
            let y = intrinsics.fy * -camera.y / depth + intrinsics.cy;
            if x < 0.0 || y < 0.0 || x >= width as f32 || y >= height as f32 {
                return None;
            }
            Some(Point2::new(x, y))
        })
        .collect()
}
