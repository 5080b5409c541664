use std::path::PathBuf;

use serde::Serialize;
use structopt::StructOpt;

use crate::import_glb::import_glb;
use crate::misc::Point3;
use base::defs::{IntoResult, Result};
use base::glb;
use base::util::fs;

#[derive(StructOpt)]
#[structopt(about = "Print a JSON summary of a .glb asset")]
pub struct InspectCommand {
    #[structopt(help = "Input .glb file")]
    in_file: PathBuf,
}

impl InspectCommand {
    pub fn run(&self) -> Result<()> {
        let data = fs::read_file(&self.in_file)?;
        let summary = inspect(&data)?;
        let json = serde_json::to_string_pretty(&summary)
            .res(|| "failed to serialize summary".to_string())?;
        println!("{}", json);
        Ok(())
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct Summary {
    pub mime_type: &'static str,
    pub byte_length: usize,
    pub num_vertices: usize,
    pub num_triangles: usize,
    pub bounds_min: [f32; 3],
    pub bounds_max: [f32; 3],
    pub texture_size: Option<[u32; 2]>,
}

pub fn inspect(data: &[u8]) -> Result<Summary> {
    let mesh = import_glb(data)?;
    let origin = Point3::origin();
    let (lo, hi) = mesh.bounds().unwrap_or((origin, origin));
    Ok(Summary {
        mime_type: glb::MIME_TYPE,
        byte_length: data.len(),
        num_vertices: mesh.vertices.len(),
        num_triangles: mesh.num_triangles(),
        bounds_min: [lo.x, lo.y, lo.z],
        bounds_max: [hi.x, hi.y, hi.z],
        texture_size: mesh
            .texture
            .as_ref()
            .map(|t| [t.image.width(), t.image.height()]),
    })
}
