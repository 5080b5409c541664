use log::warn;

use crate::misc::Point3;

type Sum3 = nalgebra::Vector3<f64>;

/// Collects accepted per-frame vertex snapshots of one capture session.
#[derive(Default)]
pub struct VertexAccumulator {
    frames: Vec<Vec<Point3>>,
}

impl VertexAccumulator {
    pub fn push(&mut self, vertices: Vec<Point3>) {
        self.frames.push(vertices);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    pub fn average(&self) -> Option<Vec<Point3>> {
        average(&self.frames)
    }
}

/// Per-index arithmetic mean of vertex snapshots.
///
/// The vertex count is fixed by the first frame; frames of any other size are
/// skipped. Sums are kept in double precision, so averaging identical frames
/// reproduces them exactly.
pub fn average<F: AsRef<[Point3]>>(frames: &[F]) -> Option<Vec<Point3>> {
    let count = frames.first()?.as_ref().len();

    let mut sums = vec![Sum3::zeros(); count];
    let mut num = 0usize;
    for frame in frames {
        let frame = frame.as_ref();
        if frame.len() != count {
            warn!(
                "skipping frame with {} vertices (expected {})",
                frame.len(),
                count
            );
            continue;
        }
        for (sum, v) in sums.iter_mut().zip(frame) {
            *sum += v.coords.cast::<f64>();
        }
        num += 1;
    }

    Some(
        sums.into_iter()
            .map(|sum| Point3::from((sum / num as f64).cast::<f32>()))
            .collect(),
    )
}
