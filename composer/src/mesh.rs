use std::io::Cursor;

use image::codecs::png::PngEncoder;
use image::io::Reader as ImageReader;
use image::{ColorType, ImageEncoder, RgbaImage};
use uuid::Uuid;

use crate::misc::{Point2, Point3, Vector3};
use crate::uv::generate_uvs;
use base::defs::{Error, ErrorKind::*, IntoResult, Result};

/// Albedo texture, kept both decoded and PNG-compressed for embedding.
#[derive(Clone, Debug)]
pub struct Texture {
    pub image: RgbaImage,
    pub png: Vec<u8>,
}

impl Texture {
    pub fn from_image(image: RgbaImage) -> Result<Texture> {
        let mut png = Vec::new();
        PngEncoder::new(&mut png)
            .write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                ColorType::Rgba8,
            )
            .res(|| "failed to encode texture PNG".to_string())?;
        Ok(Texture { image, png })
    }

    pub fn from_png(png: Vec<u8>) -> Result<Texture> {
        let image = ImageReader::new(Cursor::new(&png))
            .with_guessed_format()
            .res(|| "failed to guess texture format".to_string())?
            .decode()
            .res(|| "failed to decode texture".to_string())?
            .into_rgba8();
        Ok(Texture { image, png })
    }
}

#[derive(Clone, Debug)]
pub struct Mesh {
    pub id: Uuid,
    pub vertices: Vec<Point3>,
    pub normals: Vec<Vector3>,
    pub uvs: Vec<Point2>,
    pub indices: Vec<u32>,
    pub texture: Option<Texture>,
}

impl Mesh {
    /// Creates an untextured mesh, deriving normals and UVs from geometry.
    pub fn new(vertices: Vec<Point3>, indices: Vec<u32>) -> Mesh {
        let normals = compute_normals(&vertices, &indices);
        let uvs = generate_uvs(&vertices);
        Mesh {
            id: Uuid::new_v4(),
            vertices,
            normals,
            uvs,
            indices,
            texture: None,
        }
    }

    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn validate(&self) -> Result<()> {
        let malformed = |desc: String| Err(Error::new(MalformedData, desc));

        if self.vertices.is_empty() {
            return malformed("mesh has no vertices".to_string());
        }
        if self.indices.is_empty() {
            return malformed("mesh has no indices".to_string());
        }
        if self.indices.len() % 3 != 0 {
            return malformed(format!(
                "index count {} is not a multiple of 3",
                self.indices.len()
            ));
        }
        if self.normals.len() != self.vertices.len()
            || self.uvs.len() != self.vertices.len()
        {
            return malformed(format!(
                "attribute length mismatch ({} vertices, {} normals, {} uvs)",
                self.vertices.len(),
                self.normals.len(),
                self.uvs.len()
            ));
        }
        if let Some(&i) = self
            .indices
            .iter()
            .find(|&&i| i as usize >= self.vertices.len())
        {
            return malformed(format!(
                "index {} out of range for {} vertices",
                i,
                self.vertices.len()
            ));
        }
        Ok(())
    }

    pub fn bounds(&self) -> Option<(Point3, Point3)> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().fold((first, first), |(lo, hi), v| {
            (
                Point3::from(lo.coords.inf(&v.coords)),
                Point3::from(hi.coords.sup(&v.coords)),
            )
        }))
    }
}

/// Per-vertex normals as normalized sums of the adjacent face normals.
///
/// Each face normal is normalized before accumulation, so every triangle
/// contributes equally regardless of area. Vertices without a usable
/// contribution get +Z. Triangles referencing missing vertices are skipped.
pub fn compute_normals(vertices: &[Point3], indices: &[u32]) -> Vec<Vector3> {
    let mut sums = vec![Vector3::zeros(); vertices.len()];

    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] =
            [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        let (v0, v1, v2) =
            match (vertices.get(i0), vertices.get(i1), vertices.get(i2)) {
                (Some(v0), Some(v1), Some(v2)) => (v0, v1, v2),
                _ => continue,
            };

        let cross = (v1 - v0).cross(&(v2 - v0));
        if let Some(face_normal) = cross.try_normalize(f32::EPSILON) {
            sums[i0] += face_normal;
            sums[i1] += face_normal;
            sums[i2] += face_normal;
        }
    }

    sums.into_iter()
        .map(|sum| {
            sum.try_normalize(f32::EPSILON)
                .unwrap_or_else(|| Vector3::new(0.0, 0.0, 1.0))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use nalgebra::UnitQuaternion;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use base::assert_eq_f32;

    fn assert_eq_vector3(a: &Vector3, b: &Vector3) {
        for k in 0..3 {
            assert_eq_f32!(a[k], b[k], 1e-4);
        }
    }

    #[test]
    fn test_compute_normals_single_triangle() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(5.0, 5.0, 5.0),
        ];
        let normals = compute_normals(&vertices, &[0, 1, 2]);
        for n in &normals[..3] {
            assert_eq_vector3(n, &Vector3::new(0.0, 0.0, 1.0));
        }
        // Unreferenced vertex gets the default.
        assert_eq_vector3(&normals[3], &Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_compute_normals_sums_faces() {
        // Two faces folded along the Y axis at a right angle.
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let normals = compute_normals(&vertices, &[0, 2, 1, 0, 1, 3]);
        let diagonal = Vector3::new(1.0, 0.0, 1.0).normalize();
        assert_eq_vector3(&normals[0], &diagonal);
        assert_eq_vector3(&normals[1], &diagonal);
        assert_eq_vector3(&normals[2], &Vector3::new(0.0, 0.0, 1.0));
        assert_eq_vector3(&normals[3], &Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_compute_normals_degenerate() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        let normals = compute_normals(&vertices, &[0, 1, 2, 0, 1, 7]);
        for n in &normals {
            assert_eq_vector3(n, &Vector3::new(0.0, 0.0, 1.0));
        }
    }

    #[test]
    fn test_compute_normals_rotation_equivariant() {
        let mut rng = StdRng::seed_from_u64(7);
        let n = 40;
        let vertices: Vec<Point3> = (0..n)
            .map(|_| {
                Point3::new(
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                )
            })
            .collect();
        let indices: Vec<u32> =
            (0..3 * n).map(|_| rng.gen_range(0..n as u32)).collect();

        let rotation = UnitQuaternion::from_euler_angles(0.3, -1.2, 2.0);
        let rotated: Vec<Point3> =
            vertices.iter().map(|v| rotation * v).collect();

        let normals = compute_normals(&vertices, &indices);
        let rotated_normals = compute_normals(&rotated, &indices);
        for (n, rn) in normals.iter().zip(rotated_normals.iter()) {
            // Vertices that fell back to the default do not rotate.
            if (n - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-6 {
                continue;
            }
            assert_eq_vector3(&(rotation * n), rn);
        }
    }

    #[test]
    fn test_validate() {
        let mut mesh = Mesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![0, 1, 2],
        );
        assert!(mesh.validate().is_ok());

        mesh.indices = vec![0, 1, 3];
        assert_eq!(mesh.validate().unwrap_err().kind, MalformedData);

        mesh.indices = vec![0, 1];
        assert!(mesh.validate().is_err());

        mesh.indices = vec![0, 1, 2];
        mesh.normals.pop();
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn test_texture_png_round_trip() {
        let image = RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 255]));
        let texture = Texture::from_image(image.clone()).unwrap();
        let decoded = Texture::from_png(texture.png.clone()).unwrap();
        assert_eq!(decoded.image, image);
    }
}
