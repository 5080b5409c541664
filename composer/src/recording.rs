use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use flate2::bufread::GzDecoder;
use image::imageops::{self, FilterType};
use image::io::Reader as ImageReader;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::frame::{ColorFrame, GeometrySample, Intrinsics, Raster};
use crate::misc::{isometry_from_columns, Point3};
use crate::quality::frame_quality;
use base::defs::{Error, ErrorKind::*, IntoResult, Result};
use base::util::fs;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Record {
    Topology { indices: Vec<u32> },
    Tick(TickRecord),
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TickRecord {
    pub geometry: GeometryRecord,
    #[serde(default)]
    pub color: Option<ColorRecord>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GeometryRecord {
    pub timestamp: f64,
    pub vertices: Vec<[f32; 3]>,
    pub transform: [f32; 16], // Column-major.
    pub tracking_ok: bool,
    #[serde(default)]
    pub expressions: HashMap<String, f32>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ColorRecord {
    pub image: PathBuf, // Relative to the recording.
    pub camera_transform: [f32; 16],
    #[serde(default)]
    pub face_transform: Option<[f32; 16]>,
    pub intrinsics: IntrinsicsRecord,
    #[serde(default = "default_tracking_confidence")]
    pub tracking_confidence: f32,
    #[serde(default)]
    pub angular_speed: f32,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct IntrinsicsRecord {
    pub fx: f32,
    pub fy: f32,
    pub cx: f32,
    pub cy: f32,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

fn default_tracking_confidence() -> f32 {
    1.0
}

/// Sequential reader of a capture recording.
///
/// A recording is a JSON-lines stream, optionally gzip-compressed, starting
/// with a `topology` record and followed by `tick` records.
pub struct RecordingReader {
    lines: std::io::Lines<Box<dyn BufRead>>,
    line_num: usize,
    base_dir: PathBuf,
    image_downsample: u32,
    topology: Arc<[u32]>,
}

impl RecordingReader {
    pub fn open<P: AsRef<Path>>(
        path: P,
        image_downsample: u32,
    ) -> Result<RecordingReader> {
        let path = path.as_ref();
        let file = BufReader::new(fs::open_file(path)?);
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        info!("reading recording '{}'...", path.display());
        Self::new(file, base_dir, image_downsample)
    }

    pub fn new<R: BufRead + 'static>(
        mut reader: R,
        base_dir: PathBuf,
        image_downsample: u32,
    ) -> Result<RecordingReader> {
        let head = reader
            .fill_buf()
            .res(|| "failed to read recording".to_string())?;
        let reader: Box<dyn BufRead> = if head.starts_with(&GZIP_MAGIC) {
            debug!("recording is gzip-compressed");
            Box::new(BufReader::new(GzDecoder::new(reader)))
        } else {
            Box::new(reader)
        };

        let mut recording = RecordingReader {
            lines: reader.lines(),
            line_num: 0,
            base_dir,
            image_downsample: image_downsample.max(1),
            topology: Arc::from(Vec::new()),
        };

        match recording.read_record()? {
            Some(Record::Topology { indices }) => {
                debug!("recording topology has {} indices", indices.len());
                recording.topology = indices.into();
                Ok(recording)
            }
            _ => Err(Error::new(
                MalformedData,
                "recording must start with a topology record".to_string(),
            )),
        }
    }

    pub fn topology(&self) -> &Arc<[u32]> {
        &self.topology
    }

    pub fn read_record(&mut self) -> Result<Option<Record>> {
        for line in &mut self.lines {
            self.line_num += 1;
            let line = line.res(|| "failed to read recording".to_string())?;
            if line.trim().is_empty() {
                continue;
            }
            let num = self.line_num;
            let record = serde_json::from_str(&line)
                .res(|| format!("malformed record at line {}", num))?;
            return Ok(Some(record));
        }
        Ok(None)
    }

    /// Reads the next tick as a geometry sample and an optional color frame.
    pub fn read_tick(
        &mut self,
    ) -> Result<Option<(GeometrySample, Option<ColorFrame>)>> {
        let tick = match self.read_record()? {
            Some(Record::Tick(tick)) => tick,
            Some(Record::Topology { .. }) => {
                return Err(Error::new(
                    MalformedData,
                    format!("unexpected topology at line {}", self.line_num),
                ))
            }
            None => return Ok(None),
        };

        let geometry = tick.geometry;
        let transform = isometry_from_columns(&geometry.transform);
        let frame = match tick.color {
            Some(color) => Some(self.load_color_frame(&color, &geometry)?),
            None => None,
        };

        let sample = GeometrySample {
            vertices: geometry.vertices.into_iter().map(Point3::from).collect(),
            topology: self.topology.clone(),
            transform,
            tracking_ok: geometry.tracking_ok,
            expressions: geometry.expressions,
            timestamp: geometry.timestamp,
        };
        Ok(Some((sample, frame)))
    }

    fn load_color_frame(
        &self,
        color: &ColorRecord,
        geometry: &GeometryRecord,
    ) -> Result<ColorFrame> {
        let path = self.base_dir.join(&color.image);
        let image = ImageReader::open(&path)
            .res(|| format!("failed to open image '{}'", path.display()))?
            .decode()
            .res(|| format!("failed to decode image '{}'", path.display()))?
            .into_rgba8();
        let (width, height) = image.dimensions();

        let image = if self.image_downsample > 1 {
            let w = (width / self.image_downsample).max(1);
            let h = (height / self.image_downsample).max(1);
            imageops::resize(&image, w, h, FilterType::Triangle)
        } else {
            image
        };

        let rec = &color.intrinsics;
        let intrinsics = Intrinsics {
            fx: rec.fx,
            fy: rec.fy,
            cx: rec.cx,
            cy: rec.cy,
            width: if rec.width == 0 { width } else { rec.width },
            height: if rec.height == 0 { height } else { rec.height },
        };

        let face_transform = color.face_transform.unwrap_or(geometry.transform);
        Ok(ColorFrame {
            raster: Raster::from_rgba_image(image),
            camera_transform: isometry_from_columns(&color.camera_transform),
            intrinsics,
            face_transform: isometry_from_columns(&face_transform),
            quality: frame_quality(
                color.tracking_confidence,
                color.angular_speed,
                &geometry.expressions,
            ),
        })
    }
}
