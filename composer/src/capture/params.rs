use indexmap::IndexMap;
use structopt::StructOpt;

use base::util::cli::parse_key_val;

pub const DEFAULT_DURATION: f64 = 2.0;
pub const DEFAULT_MIN_ACCEPTED_FRAMES: usize = 20;
pub const DEFAULT_MOTION_THRESHOLD: f32 = 0.01;
pub const DEFAULT_COLOR_STRIDE: usize = 2;
pub const DEFAULT_BAKE_CAPACITY: usize = 10;
pub const DEFAULT_CLOUD_CAPACITY: usize = 60;

pub const DEFAULT_EXPRESSION_THRESHOLDS: [(&str, f32); 4] = [
    ("jawOpen", 0.1),
    ("mouthSmileLeft", 0.3),
    ("mouthSmileRight", 0.3),
    ("browInnerUp", 0.3),
];

#[derive(Clone, StructOpt)]
pub struct CaptureParams {
    #[structopt(
        help = "Capture duration in seconds",
        long,
        default_value = "2.0"
    )]
    pub duration: f64,

    #[structopt(
        help = "Minimum number of accepted samples for a mesh",
        long,
        default_value = "20"
    )]
    pub min_accepted_frames: usize,

    #[structopt(
        help = "Maximum head translation between accepted samples",
        long,
        default_value = "0.01"
    )]
    pub motion_threshold: f32,

    #[structopt(
        help = "Expression threshold override in form 'name=value'",
        long = "expression-threshold",
        number_of_values = 1,
        parse(try_from_str = parse_key_val)
    )]
    pub expression_thresholds: Vec<(String, f32)>,

    #[structopt(
        help = "Buffer a color frame every N accepted samples",
        long,
        default_value = "2"
    )]
    pub color_stride: usize,

    #[structopt(
        help = "Number of color frames kept for texture baking",
        long,
        default_value = "10"
    )]
    pub bake_capacity: usize,

    #[structopt(
        help = "Number of color frames kept for upload",
        long,
        default_value = "60"
    )]
    pub cloud_capacity: usize,
}

impl Default for CaptureParams {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DURATION,
            min_accepted_frames: DEFAULT_MIN_ACCEPTED_FRAMES,
            motion_threshold: DEFAULT_MOTION_THRESHOLD,
            expression_thresholds: Vec::new(),
            color_stride: DEFAULT_COLOR_STRIDE,
            bake_capacity: DEFAULT_BAKE_CAPACITY,
            cloud_capacity: DEFAULT_CLOUD_CAPACITY,
        }
    }
}

impl CaptureParams {
    /// Default expression thresholds with the overrides applied in order.
    pub fn thresholds(&self) -> IndexMap<String, f32> {
        let mut thresholds: IndexMap<String, f32> =
            DEFAULT_EXPRESSION_THRESHOLDS
                .iter()
                .map(|&(name, limit)| (name.to_string(), limit))
                .collect();
        for (name, limit) in &self.expression_thresholds {
            thresholds.insert(name.clone(), *limit);
        }
        thresholds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds() {
        let params = CaptureParams {
            expression_thresholds: vec![
                ("mouthSmileLeft".to_string(), 0.5),
                ("cheekPuff".to_string(), 0.2),
            ],
            ..Default::default()
        };
        let thresholds = params.thresholds();
        let pairs: Vec<(&str, f32)> =
            thresholds.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        assert_eq!(
            pairs,
            vec![
                ("jawOpen", 0.1),
                ("mouthSmileLeft", 0.5),
                ("mouthSmileRight", 0.3),
                ("browInnerUp", 0.3),
                ("cheekPuff", 0.2),
            ]
        );
    }

    #[test]
    fn test_from_args() {
        let params = CaptureParams::from_iter(&[
            "capture",
            "--duration",
            "3.5",
            "--expression-threshold",
            "jawOpen=0.25",
        ]);
        assert_eq!(params.duration, 3.5);
        assert_eq!(params.min_accepted_frames, 20);
        assert_eq!(params.thresholds()["jawOpen"], 0.25);
    }
}
