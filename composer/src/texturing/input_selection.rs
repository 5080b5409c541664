use std::cmp::Ordering;
use std::sync::Arc;

use crate::frame::ColorFrame;

/// Picks up to `k` frames in descending order of quality.
///
/// Frames of equal quality keep their buffering order.
pub fn select_frames(frames: &[Arc<ColorFrame>], k: usize) -> Vec<&ColorFrame> {
    let mut sorted: Vec<&ColorFrame> =
        frames.iter().map(|f| f.as_ref()).collect();
    sorted.sort_by(|a, b| {
        b.quality.partial_cmp(&a.quality).unwrap_or(Ordering::Equal)
    });
    sorted.truncate(k);
    sorted
}
