use std::path::PathBuf;

use log::info;
use structopt::StructOpt;

use crate::capture::{Capture, CaptureParams, SampleOutcome, SessionState};
use crate::export_glb::export_glb;
use crate::recording::RecordingReader;
use crate::texturing::BakeParams;
use base::defs::{Error, ErrorKind::*, Result};
use base::util::cli;

#[derive(StructOpt)]
#[structopt(about = "Replay a capture recording into a .glb asset")]
pub struct ComposeCommand {
    #[structopt(help = "Input recording (JSON lines, optionally gzipped)")]
    in_file: PathBuf,

    #[structopt(flatten)]
    output: cli::GlbOutput,

    #[structopt(flatten)]
    params: ComposeParams,
}

impl ComposeCommand {
    pub fn run(&self) -> Result<()> {
        let mut reader =
            RecordingReader::open(&self.in_file, self.params.image_downsample)?;
        let asset = compose(&mut reader, &self.params)?;
        info!(
            "writing {} bytes into '{}'...",
            asset.len(),
            self.output.path.display()
        );
        self.output.put(&asset)
    }
}

#[derive(Clone, StructOpt)]
pub struct ComposeParams {
    #[structopt(flatten)]
    pub capture: CaptureParams,

    #[structopt(flatten)]
    pub bake: BakeParams,

    #[structopt(
        help = "Downsampling factor applied to color images",
        long,
        default_value = "1"
    )]
    pub image_downsample: u32,

    #[structopt(help = "Export without waiting for the texture", long)]
    pub skip_texture: bool,
}

impl Default for ComposeParams {
    fn default() -> Self {
        Self {
            capture: CaptureParams::default(),
            bake: BakeParams::default(),
            image_downsample: 1,
            skip_texture: false,
        }
    }
}

/// Drives a capture session with the recorded ticks and exports its mesh.
///
/// Capturing starts at the first tick and ends when the session finishes on
/// its own or the recording runs out.
pub fn compose(
    reader: &mut RecordingReader,
    params: &ComposeParams,
) -> Result<Vec<u8>> {
    let mut capture =
        Capture::new(true, params.capture.clone(), params.bake.clone());

    let (mut num_ticks, mut num_accepted) = (0, 0);
    while let Some((sample, frame)) = reader.read_tick()? {
        if num_ticks == 0 {
            capture.start(sample.timestamp);
        }
        num_ticks += 1;
        match capture.on_tick(sample, frame) {
            SampleOutcome::Accepted => num_accepted += 1,
            SampleOutcome::Finished => break,
            _ => {}
        }
    }
    capture.finish();
    info!("replayed {} ticks, {} accepted", num_ticks, num_accepted);

    match capture.state() {
        SessionState::Ready => {}
        SessionState::Idle => {
            return Err(Error::new(
                MalformedData,
                "recording holds no ticks".to_string(),
            ))
        }
        state => {
            return Err(Error::new(
                BadOperation,
                format!(
                    "capture {} with {} accepted samples (minimum is {})",
                    state, num_accepted, params.capture.min_accepted_frames
                ),
            ))
        }
    }

    if !params.skip_texture {
        capture.wait_bake();
    }

    match capture.mesh() {
        Some(mesh) => export_glb(mesh),
        None => Err(Error::new(
            InconsistentState,
            "ready session has no mesh".to_string(),
        )),
    }
}
