use crate::misc::{Point2, Point3};

pub const UV_PADDING: f32 = 0.1;

const MIN_EXTENT: f32 = 1e-9;

/// Orthographic projection of mesh-local XY onto the unit texture square.
///
/// The bounding box is padded by `UV_PADDING` of its extent on every side and
/// scaled uniformly (the tighter axis wins) around its midpoint. V grows
/// downwards. An axis without extent is left unscaled.
pub fn generate_uvs(vertices: &[Point3]) -> Vec<Point2> {
    let first = match vertices.first() {
        Some(v) => v,
        None => return vec![],
    };

    let (mut min, mut max) = ([first.x, first.y], [first.x, first.y]);
    for v in vertices {
        for k in 0..2 {
            min[k] = min[k].min(v[k]);
            max[k] = max[k].max(v[k]);
        }
    }

    let axis_scale = |k: usize| {
        let extent = max[k] - min[k];
        if extent > MIN_EXTENT {
            Some(1.0 / (extent * (1.0 + 2.0 * UV_PADDING)))
        } else {
            None
        }
    };
    let (sx, sy) = (axis_scale(0), axis_scale(1));
    let uniform = match (sx, sy) {
        (Some(a), Some(b)) => a.min(b),
        (Some(s), None) | (None, Some(s)) => s,
        (None, None) => 1.0,
    };
    let scale_x = sx.map_or(1.0, |_| uniform);
    let scale_y = sy.map_or(1.0, |_| uniform);

    let cx = (min[0] + max[0]) / 2.0;
    let cy = (min[1] + max[1]) / 2.0;

    vertices
        .iter()
        .map(|v| {
            Point2::new(
                (0.5 + (v.x - cx) * scale_x).clamp(0.0, 1.0),
                (0.5 - (v.y - cy) * scale_y).clamp(0.0, 1.0),
            )
        })
        .collect()
}
