use uuid::Uuid;

use crate::mesh::{compute_normals, Mesh, Texture};
use crate::misc::{Point2, Point3, Vector3};
use crate::uv::generate_uvs;
use base::defs::{Error, ErrorKind::*, Result};
use base::glb::{self, AccessorType, Glb};

fn malformed<T>(desc: String) -> Result<T> {
    Err(Error::new(MalformedData, desc))
}

/// Resolves an accessor to its raw little-endian elements, honoring the
/// byte stride of its buffer view.
fn accessor_elements<'a>(
    glb: &'a Glb,
    index: usize,
    component_type: u32,
    kind: AccessorType,
) -> Result<Vec<&'a [u8]>> {
    let accessor = match glb.document.accessors.get(index) {
        Some(accessor) => accessor,
        None => return malformed(format!("no accessor #{}", index)),
    };
    if accessor.component_type != component_type || accessor.kind != kind {
        return Err(Error::new(
            UnsupportedFeature,
            format!(
                "accessor #{} has type {:?}/{} instead of {:?}/{}",
                index,
                accessor.kind,
                accessor.component_type,
                kind,
                component_type
            ),
        ));
    }

    let view = match accessor
        .buffer_view
        .and_then(|i| glb.document.buffer_views.get(i))
    {
        Some(view) => view,
        None => {
            return malformed(format!("accessor #{} has no buffer view", index))
        }
    };

    let elem_len = kind.num_components() * 4;
    let stride = view.byte_stride.unwrap_or(elem_len);
    let bytes = match view_bytes(glb, view) {
        Some(bytes) if stride >= elem_len => bytes,
        _ => {
            return malformed(format!(
                "bad buffer view for accessor #{}",
                index
            ))
        }
    };

    // The last element only needs `elem_len` bytes, not a full stride.
    let span = match accessor.count {
        0 => Some(0),
        count => (count - 1)
            .checked_mul(stride)
            .and_then(|len| len.checked_add(elem_len))
            .and_then(|len| len.checked_add(accessor.byte_offset)),
    };
    if span.map_or(true, |span| span > bytes.len()) {
        return malformed(format!(
            "accessor #{} overruns its buffer view",
            index
        ));
    }

    let start = accessor.byte_offset;
    Ok((0..accessor.count)
        .map(|i| {
            let offset = start + i * stride;
            &bytes[offset..offset + elem_len]
        })
        .collect())
}

/// Slice of the binary chunk covered by a buffer view, if it fits.
fn view_bytes<'a>(
    asset: &'a Glb,
    view: &glb::BufferView,
) -> Option<&'a [u8]> {
    let end = view.byte_offset.checked_add(view.byte_length)?;
    asset.bin.get(view.byte_offset..end)
}

fn le_f32s<const N: usize>(bytes: &[u8]) -> [f32; N] {
    let mut values = [0.0; N];
    for (value, chunk) in values.iter_mut().zip(bytes.chunks_exact(4)) {
        *value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    values
}

fn read_texture(glb: &Glb, material: Option<usize>) -> Result<Option<Texture>> {
    let doc = &glb.document;
    let texture_index = material
        .and_then(|i| doc.materials.get(i))
        .and_then(|m| m.pbr_metallic_roughness.as_ref())
        .and_then(|pbr| pbr.base_color_texture.as_ref())
        .map(|info| info.index);
    let texture_index = match texture_index {
        Some(index) => index,
        None => return Ok(None),
    };

    let view = doc
        .textures
        .get(texture_index)
        .and_then(|t| t.source)
        .and_then(|source| doc.images.get(source))
        .and_then(|image| image.buffer_view)
        .and_then(|view| doc.buffer_views.get(view));
    let view = match view {
        Some(view) => view,
        None => {
            return malformed(format!(
                "texture #{} does not resolve to embedded image data",
                texture_index
            ))
        }
    };

    match view_bytes(glb, view) {
        Some(png) => Texture::from_png(png.to_vec()).map(Some),
        None => malformed("texture image outside of binary chunk".to_string()),
    }
}

/// Parses a binary glTF asset holding a single triangle mesh.
///
/// Normals and UVs are derived from the geometry when the asset lacks them.
/// The mesh gets a fresh identity.
pub fn import_glb(data: &[u8]) -> Result<Mesh> {
    let asset = glb::decode(data)?;

    let primitive = match asset
        .document
        .meshes
        .first()
        .and_then(|m| m.primitives.first())
    {
        Some(primitive) => primitive,
        None => return malformed("asset contains no mesh".to_string()),
    };
    if let Some(mode) = primitive.mode {
        if mode != glb::MODE_TRIANGLES {
            return Err(Error::new(
                UnsupportedFeature,
                format!("unsupported primitive mode {}", mode),
            ));
        }
    }

    let attribute = |name: &str| primitive.attributes.get(name).copied();

    let position = match attribute(glb::ATTRIBUTE_POSITION) {
        Some(position) => position,
        None => return malformed("mesh has no positions".to_string()),
    };
    let vertices: Vec<Point3> = accessor_elements(
        &asset,
        position,
        glb::COMPONENT_FLOAT,
        AccessorType::Vec3,
    )?
    .into_iter()
    .map(|e| Point3::from(le_f32s::<3>(e)))
    .collect();

    let indices: Vec<u32> = match primitive.indices {
        Some(index) => accessor_elements(
            &asset,
            index,
            glb::COMPONENT_UNSIGNED_INT,
            AccessorType::Scalar,
        )?
        .into_iter()
        .map(|e| u32::from_le_bytes([e[0], e[1], e[2], e[3]]))
        .collect(),
        None => (0..vertices.len() as u32).collect(),
    };

    let normals: Vec<Vector3> = match attribute(glb::ATTRIBUTE_NORMAL) {
        Some(normal) => accessor_elements(
            &asset,
            normal,
            glb::COMPONENT_FLOAT,
            AccessorType::Vec3,
        )?
        .into_iter()
        .map(|e| Vector3::from(le_f32s::<3>(e)))
        .collect(),
        None => compute_normals(&vertices, &indices),
    };

    let uvs: Vec<Point2> = match attribute(glb::ATTRIBUTE_TEXCOORD) {
        Some(texcoord) => accessor_elements(
            &asset,
            texcoord,
            glb::COMPONENT_FLOAT,
            AccessorType::Vec2,
        )?
        .into_iter()
        .map(|e| Point2::from(le_f32s::<2>(e)))
        .collect(),
        None => generate_uvs(&vertices),
    };

    let texture = read_texture(&asset, primitive.material)?;

    let mesh = Mesh {
        id: Uuid::new_v4(),
        vertices,
        normals,
        uvs,
        indices,
        texture,
    };
    mesh.validate()?;
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    use image::{Rgba, RgbaImage};

    use crate::export_glb::export_glb;

    fn triangle() -> Mesh {
        Mesh::new(
            vec![
                Point3::new(0.1, -0.2, 0.3),
                Point3::new(1.5, 0.25, -0.125),
                Point3::new(-0.7, 0.9, 0.0),
            ],
            vec![0, 1, 2],
        )
    }

    #[test]
    fn test_round_trip_triangle() {
        let mesh = triangle();
        let imported = import_glb(&export_glb(&mesh).unwrap()).unwrap();

        assert_eq!(imported.vertices.len(), 3);
        assert_eq!(imported.num_triangles(), 1);
        for (a, b) in imported.vertices.iter().zip(&mesh.vertices) {
            for k in 0..3 {
                assert_eq!(a[k].to_bits(), b[k].to_bits());
            }
        }
        assert_eq!(imported.normals, mesh.normals);
        assert_eq!(imported.uvs, mesh.uvs);
        assert_eq!(imported.indices, mesh.indices);
        assert!(imported.texture.is_none());
        assert_ne!(imported.id, mesh.id);
    }

    #[test]
    fn test_round_trip_texture() {
        let mut mesh = triangle();
        let image = RgbaImage::from_fn(5, 3, |x, y| {
            Rgba([x as u8 * 40, y as u8 * 80, 7, 255])
        });
        mesh.texture = Some(Texture::from_image(image.clone()).unwrap());

        let imported = import_glb(&export_glb(&mesh).unwrap()).unwrap();
        assert_eq!(imported.texture.unwrap().image, image);
    }

    #[test]
    fn test_import_garbage() {
        assert!(import_glb(b"not a glb at all").is_err());
        assert!(import_glb(&[]).is_err());
    }

    #[test]
    fn test_import_without_optional_attributes() {
        let mesh = triangle();
        let mut asset = glb::decode(&export_glb(&mesh).unwrap()).unwrap();
        let attributes = &mut asset.document.meshes[0].primitives[0].attributes;
        attributes.remove(glb::ATTRIBUTE_NORMAL);
        attributes.remove(glb::ATTRIBUTE_TEXCOORD);
        let data = glb::encode(&asset.document, &asset.bin).unwrap();

        let imported = import_glb(&data).unwrap();
        assert_eq!(imported.normals, mesh.normals);
        assert_eq!(imported.uvs, mesh.uvs);
    }

    fn reencoded(edit: impl FnOnce(&mut Glb)) -> Vec<u8> {
        let mut asset = glb::decode(&export_glb(&triangle()).unwrap()).unwrap();
        edit(&mut asset);
        glb::encode(&asset.document, &asset.bin).unwrap()
    }

    #[test]
    fn test_import_rejects_huge_count() {
        let data = reencoded(|asset| {
            asset.document.accessors[0].count = usize::MAX / 2;
        });
        assert_eq!(import_glb(&data).unwrap_err().kind, MalformedData);

        let data = reencoded(|asset| {
            asset.document.accessors[3].count = usize::MAX;
        });
        assert_eq!(import_glb(&data).unwrap_err().kind, MalformedData);
    }

    #[test]
    fn test_import_rejects_overflowing_offsets() {
        let data = reencoded(|asset| {
            asset.document.buffer_views[0].byte_offset = usize::MAX - 10;
        });
        assert_eq!(import_glb(&data).unwrap_err().kind, MalformedData);

        let data = reencoded(|asset| {
            asset.document.accessors[1].byte_offset = usize::MAX - 4;
        });
        assert_eq!(import_glb(&data).unwrap_err().kind, MalformedData);

        let data = reencoded(|asset| {
            asset.document.buffer_views[0].byte_stride = Some(usize::MAX / 2);
        });
        assert_eq!(import_glb(&data).unwrap_err().kind, MalformedData);
    }

    #[test]
    fn test_import_exact_triangle() {
        let mesh = Mesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![0, 1, 2],
        );
        let imported = import_glb(&export_glb(&mesh).unwrap()).unwrap();
        assert_eq!(imported.vertices, mesh.vertices);
        assert_eq!(imported.num_triangles(), 1);
    }

    #[test]
    fn test_import_rejects_truncated_views() {
        let mesh = triangle();
        let mut asset = glb::decode(&export_glb(&mesh).unwrap()).unwrap();
        asset.document.buffer_views[0].byte_length = 64;
        let data = glb::encode(&asset.document, &asset.bin).unwrap();
        assert_eq!(import_glb(&data).unwrap_err().kind, MalformedData);
    }
}
