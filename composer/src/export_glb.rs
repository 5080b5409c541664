use std::collections::BTreeMap;

use log::debug;

use crate::mesh::Mesh;
use base::defs::Result;
use base::glb::{self, Document};

pub const VERTEX_STRIDE: usize = 32;
pub const POSITION_OFFSET: usize = 0;
pub const NORMAL_OFFSET: usize = 12;
pub const TEXCOORD_OFFSET: usize = 24;

const PNG_MIME_TYPE: &str = "image/png";

/// Byte ranges of the mesh data inside the binary chunk.
struct Layout {
    vertices_len: usize,
    indices_offset: usize,
    indices_len: usize,
    image_offset: usize,
    image_len: usize,
}

impl Layout {
    fn new(mesh: &Mesh) -> Layout {
        let vertices_len = mesh.vertices.len() * VERTEX_STRIDE;
        let indices_len = mesh.indices.len() * 4;
        let image_len = mesh.texture.as_ref().map_or(0, |t| t.png.len());
        Layout {
            vertices_len,
            indices_offset: vertices_len,
            indices_len,
            image_offset: vertices_len + indices_len,
            image_len,
        }
    }

    fn total_len(&self) -> usize {
        glb::padded_len(self.image_offset + self.image_len)
    }
}

/// Serializes a mesh with its optional texture into a binary glTF asset.
///
/// Vertex attributes are interleaved in one 32-byte record per vertex
/// (position, normal, texcoord), followed by the 32-bit indices and the PNG
/// texture. Fails before producing any output if the mesh is inconsistent.
pub fn export_glb(mesh: &Mesh) -> Result<Vec<u8>> {
    mesh.validate()?;

    let layout = Layout::new(mesh);
    let document = build_document(mesh, &layout);
    let bin = build_bin(mesh, &layout);

    let data = glb::encode(&document, &bin)?;
    debug!(
        "exported mesh {} into {} bytes of {}",
        mesh.id,
        data.len(),
        glb::MIME_TYPE
    );
    Ok(data)
}

fn build_bin(mesh: &Mesh, layout: &Layout) -> Vec<u8> {
    let mut bin = Vec::with_capacity(layout.total_len());

    for ((v, n), uv) in mesh.vertices.iter().zip(&mesh.normals).zip(&mesh.uvs)
    {
        for value in [v.x, v.y, v.z, n.x, n.y, n.z, uv.x, uv.y] {
            bin.extend_from_slice(&value.to_le_bytes());
        }
    }
    for index in &mesh.indices {
        bin.extend_from_slice(&index.to_le_bytes());
    }
    if let Some(texture) = &mesh.texture {
        bin.extend_from_slice(&texture.png);
    }

    bin.resize(layout.total_len(), 0);
    bin
}

fn build_document(mesh: &Mesh, layout: &Layout) -> Document {
    let (min, max) = match mesh.bounds() {
        Some((lo, hi)) => (vec![lo.x, lo.y, lo.z], vec![hi.x, hi.y, hi.z]),
        None => (vec![0.0; 3], vec![0.0; 3]),
    };

    let vertex_accessor = |offset, kind| glb::Accessor {
        buffer_view: Some(0),
        byte_offset: offset,
        component_type: glb::COMPONENT_FLOAT,
        count: mesh.vertices.len(),
        kind,
        min: None,
        max: None,
    };
    let accessors = vec![
        glb::Accessor {
            min: Some(min),
            max: Some(max),
            ..vertex_accessor(POSITION_OFFSET, glb::AccessorType::Vec3)
        },
        vertex_accessor(NORMAL_OFFSET, glb::AccessorType::Vec3),
        vertex_accessor(TEXCOORD_OFFSET, glb::AccessorType::Vec2),
        glb::Accessor {
            buffer_view: Some(1),
            byte_offset: 0,
            component_type: glb::COMPONENT_UNSIGNED_INT,
            count: mesh.indices.len(),
            kind: glb::AccessorType::Scalar,
            min: None,
            max: None,
        },
    ];

    let mut buffer_views = vec![
        glb::BufferView {
            buffer: 0,
            byte_offset: 0,
            byte_length: layout.vertices_len,
            byte_stride: Some(VERTEX_STRIDE),
            target: Some(glb::TARGET_ARRAY_BUFFER),
        },
        glb::BufferView {
            buffer: 0,
            byte_offset: layout.indices_offset,
            byte_length: layout.indices_len,
            byte_stride: None,
            target: Some(glb::TARGET_ELEMENT_ARRAY_BUFFER),
        },
    ];

    let attributes: BTreeMap<String, usize> = [
        (glb::ATTRIBUTE_POSITION.to_string(), 0),
        (glb::ATTRIBUTE_NORMAL.to_string(), 1),
        (glb::ATTRIBUTE_TEXCOORD.to_string(), 2),
    ]
    .into_iter()
    .collect();

    let mut document = Document {
        asset: glb::Asset {
            version: "2.0".to_string(),
            generator: Some(format!("composer {}", env!("CARGO_PKG_VERSION"))),
        },
        scene: Some(0),
        scenes: vec![glb::Scene { nodes: vec![0] }],
        nodes: vec![glb::Node {
            name: Some("face".to_string()),
            mesh: Some(0),
        }],
        meshes: vec![glb::Mesh {
            primitives: vec![glb::Primitive {
                attributes,
                indices: Some(3),
                material: None,
                mode: Some(glb::MODE_TRIANGLES),
            }],
        }],
        accessors,
        buffers: vec![glb::Buffer {
            byte_length: layout.total_len(),
        }],
        ..Default::default()
    };

    if mesh.texture.is_some() {
        buffer_views.push(glb::BufferView {
            buffer: 0,
            byte_offset: layout.image_offset,
            byte_length: layout.image_len,
            byte_stride: None,
            target: None,
        });
        document.images = vec![glb::Image {
            buffer_view: Some(2),
            mime_type: Some(PNG_MIME_TYPE.to_string()),
        }];
        document.samplers = vec![glb::Sampler {
            mag_filter: Some(glb::FILTER_LINEAR),
            min_filter: Some(glb::FILTER_LINEAR),
            wrap_s: Some(glb::WRAP_CLAMP_TO_EDGE),
            wrap_t: Some(glb::WRAP_CLAMP_TO_EDGE),
        }];
        document.textures = vec![glb::Texture {
            sampler: Some(0),
            source: Some(0),
        }];
        document.materials = vec![glb::Material {
            name: Some("face".to_string()),
            pbr_metallic_roughness: Some(glb::PbrMetallicRoughness {
                base_color_texture: Some(glb::TextureInfo { index: 0 }),
                metallic_factor: Some(0.0),
                roughness_factor: Some(1.0),
            }),
        }];
        document.meshes[0].primitives[0].material = Some(0);
    }

    document.buffer_views = buffer_views;
    document
}
