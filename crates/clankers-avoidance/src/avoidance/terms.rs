//! Scalar terms of the avoidance constraint: push-away error and status.

use tracing::debug;

use super::config::{LinkAvoidance, SigmoidShape};
use super::snapshot::DistanceSample;

/// Sigmoid push-away magnitude at `distance`.
///
/// `amplitude / (1 + exp(distance / scale - shift))` with
/// `scale = avoidance_distance / (zero_point + shift)`. Close to
/// `amplitude` at contact, negligible at `avoidance_distance`.
pub fn sigmoid_error(distance: f64, avoidance_distance: f64, amplitude: f64, shape: &SigmoidShape) -> f64 {
    let scale = avoidance_distance / shape.span();
    amplitude / (1.0 + ((distance / scale) - shape.shift).exp())
}

/// Error row value for `link`. No sample means nothing nearby: zero.
pub fn link_error(link: &LinkAvoidance, sample: Option<&DistanceSample>, shape: &SigmoidShape) -> f64 {
    match sample {
        Some(sample) => sigmoid_error(sample.distance, link.avoidance_distance(), link.amplitude(), shape),
        None => {
            debug!("no distance info for link {}", link.link_name());
            0.0
        }
    }
}

/// Whether a link is far enough away. Only a sample strictly inside
/// `min_distance` violates; no sample is satisfied.
pub fn is_satisfied(sample: Option<&DistanceSample>, min_distance: f64) -> bool {
    sample.is_none_or(|s| s.distance >= min_distance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avoidance::config::AvoidanceDefaults;
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3};

    fn sample(distance: f64) -> DistanceSample {
        DistanceSample {
            distance,
            closest_point: Point3::origin(),
            avoidance_direction: Vector3::z_axis(),
        }
    }

    fn error(distance: f64) -> f64 {
        sigmoid_error(distance, 0.3, 0.3, &SigmoidShape::default())
    }

    #[test]
    fn saturates_near_amplitude_at_contact() {
        for avoidance_distance in [0.05, 0.3, 2.0] {
            let e = sigmoid_error(0.0, avoidance_distance, 0.3, &SigmoidShape::default());
            assert_relative_eq!(e, 0.3 / (1.0 + (-5.0_f64).exp()), epsilon = 1e-15);
        }
        assert_relative_eq!(error(0.0) / 0.3, 0.993_307, epsilon = 1e-6);
    }

    #[test]
    fn negligible_at_avoidance_distance() {
        assert!(error(0.3) < 0.01 * 0.3);
        assert!(error(0.3) > 0.0);
    }

    #[test]
    fn strictly_decreasing() {
        let samples: Vec<f64> = (0..=60).map(|i| f64::from(i) * 0.01).collect();
        for pair in samples.windows(2) {
            assert!(error(pair[0]) > error(pair[1]), "not decreasing at {}", pair[0]);
        }
    }

    #[test]
    fn midpoint_is_half_amplitude() {
        // distance / scale == shift at one third of 0.3 with default shape
        assert_relative_eq!(error(0.1), 0.15, epsilon = 1e-12);
    }

    #[test]
    fn overlap_pushes_harder_than_contact() {
        assert!(error(-0.05) > error(0.0));
        assert!(error(-0.05) < 0.3);
    }

    #[test]
    fn missing_sample_gives_zero_error() {
        let link = LinkAvoidance::new("forearm", &AvoidanceDefaults::default());
        assert_eq!(link_error(&link, None, &SigmoidShape::default()), 0.0);
        let close = link_error(&link, Some(&sample(0.05)), &SigmoidShape::default());
        assert_relative_eq!(close, 0.3 / (1.0 + (-2.5_f64).exp()), epsilon = 1e-12);
        assert!(close > 0.9 * 0.3);
    }

    #[test]
    fn status_boundary() {
        assert!(is_satisfied(Some(&sample(0.1)), 0.1));
        assert!(!is_satisfied(Some(&sample(0.1 - 1e-9)), 0.1));
        assert!(is_satisfied(Some(&sample(0.5)), 0.1));
        assert!(!is_satisfied(Some(&sample(-0.01)), 0.1));
        assert!(is_satisfied(None, 0.1));
    }
}
