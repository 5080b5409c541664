use std::collections::HashMap;

pub const TRACKING_WEIGHT: f32 = 0.5;
pub const STABILITY_WEIGHT: f32 = 0.3;
pub const NEUTRALITY_WEIGHT: f32 = 0.2;

/// Scores a color frame for texturing, in [0, 1], higher is better.
///
/// Blends tracking confidence, angular stability of the head (`angular_speed`
/// in radians per second) and expression neutrality (one minus the strongest
/// expression signal).
pub fn frame_quality(
    tracking_confidence: f32,
    angular_speed: f32,
    expressions: &HashMap<String, f32>,
) -> f32 {
    let stability = 1.0 / (1.0 + angular_speed.abs());
    let strongest = expressions
        .values()
        .fold(0.0f32, |acc, &v| acc.max(v.clamp(0.0, 1.0)));
    let neutrality = 1.0 - strongest;

    let score = TRACKING_WEIGHT * tracking_confidence.clamp(0.0, 1.0)
        + STABILITY_WEIGHT * stability
        + NEUTRALITY_WEIGHT * neutrality;
    score.clamp(0.0, 1.0)
}
