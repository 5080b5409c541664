use derive_more::Display;
use indexmap::IndexMap;

use crate::frame::GeometrySample;
use crate::misc::{translation_distance, Isometry3};

#[derive(Clone, Debug, Display, PartialEq)]
pub enum Rejection {
    #[display(fmt = "tracking lost")]
    TrackingLost,
    #[display(
        fmt = "expression '{}' at {:.3} exceeds {:.3}",
        name,
        value,
        limit
    )]
    Expression { name: String, value: f32, limit: f32 },
    #[display(fmt = "head moved by {:.4}", _0)]
    Motion(f32),
}

/// Checks a sample against the tracking, expression and motion gates in
/// that order.
///
/// Expressions missing from the sample pass. The motion gate only applies
/// once a sample has been accepted.
pub fn evaluate(
    sample: &GeometrySample,
    thresholds: &IndexMap<String, f32>,
    motion_threshold: f32,
    last_accepted: Option<&Isometry3>,
) -> Result<(), Rejection> {
    if !sample.tracking_ok {
        return Err(Rejection::TrackingLost);
    }

    for (name, &limit) in thresholds {
        if let Some(&value) = sample.expressions.get(name) {
            if value > limit {
                return Err(Rejection::Expression {
                    name: name.clone(),
                    value,
                    limit,
                });
            }
        }
    }

    if let Some(last) = last_accepted {
        let distance = translation_distance(last, &sample.transform);
        if distance > motion_threshold {
            return Err(Rejection::Motion(distance));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::capture::params::CaptureParams;
    use crate::test_util::{quad_face, sample};

    fn gate(
        sample: &GeometrySample,
        last: Option<&Isometry3>,
    ) -> Result<(), Rejection> {
        evaluate(sample, &CaptureParams::default().thresholds(), 0.01, last)
    }

    #[test]
    fn test_tracking_gate() {
        let (vertices, topology) = quad_face();
        let mut s = sample(&vertices, &topology, 0.0);
        assert_eq!(gate(&s, None), Ok(()));
        s.tracking_ok = false;
        assert_eq!(gate(&s, None), Err(Rejection::TrackingLost));
    }

    #[test]
    fn test_expression_gate() {
        let (vertices, topology) = quad_face();
        let mut s = sample(&vertices, &topology, 0.0);

        s.expressions.insert("jawOpen".to_string(), 0.1);
        s.expressions.insert("eyeBlinkLeft".to_string(), 0.9);
        assert_eq!(gate(&s, None), Ok(()));

        s.expressions.insert("mouthSmileRight".to_string(), 0.35);
        assert_eq!(
            gate(&s, None),
            Err(Rejection::Expression {
                name: "mouthSmileRight".to_string(),
                value: 0.35,
                limit: 0.3,
            })
        );
    }

    #[test]
    fn test_motion_gate() {
        let (vertices, topology) = quad_face();
        let s = sample(&vertices, &topology, 0.0);

        let near = Isometry3::translation(0.0, 0.005, -0.5);
        assert_eq!(gate(&s, Some(&near)), Ok(()));

        let far = Isometry3::translation(0.0, 0.02, -0.5);
        match gate(&s, Some(&far)) {
            Err(Rejection::Motion(d)) => assert!((d - 0.02).abs() < 1e-5),
            other => panic!("unexpected verdict {:?}", other),
        }
    }

    #[test]
    fn test_gate_order() {
        let (vertices, topology) = quad_face();
        let mut s = sample(&vertices, &topology, 0.0);
        s.tracking_ok = false;
        s.expressions.insert("jawOpen".to_string(), 1.0);
        let far = Isometry3::translation(1.0, 0.0, 0.0);
        assert_eq!(gate(&s, Some(&far)), Err(Rejection::TrackingLost));
    }
}
