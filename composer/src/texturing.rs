pub mod input_projection;
pub mod input_selection;
pub mod misc;
pub mod output_baking;

use std::str::FromStr;
use std::sync::Arc;

use image::{Rgba, RgbaImage};
use log::{debug, info, warn};
use structopt::StructOpt;

use crate::frame::ColorFrame;
use crate::misc::{Point2, Point3};
use base::defs::{Error, ErrorKind::*, Result};
use base::util::cli::Array as CliArray;
use input_projection::project_like_camera;
use input_selection::select_frames;
use output_baking::{smoothen, splat_frame};

pub const DEFAULT_TEXTURE_SIZE: u32 = 1024;
pub const DEFAULT_NUM_FRAMES: usize = 3;
pub const DEFAULT_NEAR_DEPTH: f32 = 0.1;
pub const DEFAULT_SPLAT_RADIUS: u32 = 3;
pub const DEFAULT_BRIGHTNESS_FLOOR: f32 = 0.04;
pub const DEFAULT_BLUR_SIGMA: f32 = 1.0;
pub const DEFAULT_FALLBACK_COLOR: [u8; 3] = [128, 128, 128];

/// Resolution of overlapping splats from different frames.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DrawOrder {
    /// Frames are drawn worst first, so the best frame ends up on top.
    HighestQualityWins,
    /// Frames are drawn best first, so the worst selected frame ends up on
    /// top.
    LastDrawnWins,
}

impl FromStr for DrawOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "highest-quality-wins" => Ok(DrawOrder::HighestQualityWins),
            "last-drawn-wins" => Ok(DrawOrder::LastDrawnWins),
            _ => Err(Error::new(
                MalformedData,
                concat!(
                    "unknown draw order (can be 'highest-quality-wins' ",
                    "or 'last-drawn-wins')"
                )
                .to_string(),
            )),
        }
    }
}

#[derive(Clone, StructOpt)]
pub struct BakeParams {
    #[structopt(
        help = "Side of the square texture in pixels",
        long,
        default_value = "1024"
    )]
    pub texture_size: u32,

    #[structopt(
        help = "Number of best color frames to project",
        long,
        default_value = "3"
    )]
    pub num_bake_frames: usize,

    #[structopt(
        help = "Minimum camera-space depth of a projected vertex",
        long,
        default_value = "0.1"
    )]
    pub near_depth: f32,

    #[structopt(
        help = "Radius of a vertex splat in texture pixels",
        long,
        default_value = "3"
    )]
    pub splat_radius: u32,

    #[structopt(
        help = "Brightness below which samples are treated as shadow",
        long,
        default_value = "0.04"
    )]
    pub brightness_floor: f32,

    #[structopt(
        help = "Sigma of the final smoothing blur (0 disables it)",
        long,
        default_value = "1.0"
    )]
    pub blur_sigma: f32,

    #[structopt(
        help = "Texture color where no frame contributes",
        long,
        default_value = "128,128,128"
    )]
    pub fallback_color: CliArray<u8, 3>,

    #[structopt(
        help = "Overlap policy ('highest-quality-wins' or 'last-drawn-wins')",
        long,
        default_value = "highest-quality-wins"
    )]
    pub draw_order: DrawOrder,
}

impl Default for BakeParams {
    fn default() -> Self {
        Self {
            texture_size: DEFAULT_TEXTURE_SIZE,
            num_bake_frames: DEFAULT_NUM_FRAMES,
            near_depth: DEFAULT_NEAR_DEPTH,
            splat_radius: DEFAULT_SPLAT_RADIUS,
            brightness_floor: DEFAULT_BRIGHTNESS_FLOOR,
            blur_sigma: DEFAULT_BLUR_SIGMA,
            fallback_color: CliArray(DEFAULT_FALLBACK_COLOR),
            draw_order: DrawOrder::HighestQualityWins,
        }
    }
}

/// Projects the best color frames onto the UV layout of a mesh.
///
/// Returns `None` when there are no frames to project. Otherwise the result
/// is always a full canvas; texels no frame reached keep the fallback color.
pub fn bake_texture(
    vertices: &[Point3],
    uvs: &[Point2],
    frames: &[Arc<ColorFrame>],
    params: &BakeParams,
) -> Option<RgbaImage> {
    if frames.is_empty() {
        info!("  no color frames buffered, skipping texture");
        return None;
    }
    if params.texture_size == 0 {
        warn!("  texture size is zero, skipping texture");
        return None;
    }

    let selected = select_frames(frames, params.num_bake_frames);
    info!(
        "  baking {} of {} color frames into {}x{} texture...",
        selected.len(),
        frames.len(),
        params.texture_size,
        params.texture_size
    );

    let [r, g, b] = params.fallback_color.0;
    let mut canvas = RgbaImage::from_pixel(
        params.texture_size,
        params.texture_size,
        Rgba([r, g, b, 255]),
    );

    let ordered: Vec<&ColorFrame> = match params.draw_order {
        DrawOrder::HighestQualityWins => selected.into_iter().rev().collect(),
        DrawOrder::LastDrawnWins => selected,
    };

    for frame in ordered {
        let pixels = project_like_camera(frame, vertices, params.near_depth);
        let num = splat_frame(&mut canvas, frame, &pixels, uvs, params);
        debug!(
            "  frame with quality {:.3} contributed {} of {} vertices",
            frame.quality,
            num,
            vertices.len()
        );
    }

    Some(smoothen(&canvas, params.blur_sigma))
}
