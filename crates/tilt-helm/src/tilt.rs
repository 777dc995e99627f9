use crate::{Steering, Turn};
use tilt_telemetry::OrientationSample;

/// Maps orientation samples to steering decisions.
///
/// Thresholds are in degrees and symmetric about level; inside the deadzone
/// nothing happens, so small hand tremor does not steer.
pub struct TiltHelm {
    /// Roll past this steers left or right.
    roll_threshold: f32,
    /// Pitching the nose down past this engages thrust.
    pitch_threshold: f32,
}

impl TiltHelm {
    pub fn new(roll_threshold_deg: f32, pitch_threshold_deg: f32) -> Self {
        Self {
            roll_threshold: roll_threshold_deg,
            pitch_threshold: pitch_threshold_deg,
        }
    }

    /// Decide steering for one sample.
    pub fn steer(&self, sample: OrientationSample) -> Steering {
        if !sample.roll.is_finite() || !sample.pitch.is_finite() {
            return Steering::NEUTRAL;
        }

        let turn = if sample.roll > self.roll_threshold {
            Turn::Right
        } else if sample.roll < -self.roll_threshold {
            Turn::Left
        } else {
            Turn::Neutral
        };

        // Nose down is negative pitch.
        let thrust = sample.pitch < -self.pitch_threshold;

        Steering { turn, thrust }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(roll: f32, pitch: f32) -> OrientationSample {
        OrientationSample {
            roll,
            pitch,
            yaw: 0.0,
        }
    }

    #[test]
    fn level_orientation_is_neutral() {
        let helm = TiltHelm::new(15.0, 10.0);
        assert_eq!(helm.steer(sample(0.0, 0.0)), Steering::NEUTRAL);
    }

    #[test]
    fn threshold_itself_is_still_inside_the_deadzone() {
        let helm = TiltHelm::new(15.0, 10.0);
        assert_eq!(helm.steer(sample(15.0, -10.0)), Steering::NEUTRAL);
        assert_eq!(helm.steer(sample(-15.0, 10.0)), Steering::NEUTRAL);
    }

    #[test]
    fn leaning_past_the_threshold_turns() {
        let helm = TiltHelm::new(15.0, 10.0);
        assert_eq!(helm.steer(sample(20.0, 0.0)).turn, Turn::Right);
        assert_eq!(helm.steer(sample(-20.0, 0.0)).turn, Turn::Left);
    }

    #[test]
    fn thrust_only_on_nose_down() {
        let helm = TiltHelm::new(15.0, 10.0);
        assert!(helm.steer(sample(0.0, -11.0)).thrust);
        assert!(!helm.steer(sample(0.0, 11.0)).thrust);
    }

    #[test]
    fn non_finite_samples_steer_neutral() {
        let helm = TiltHelm::new(15.0, 10.0);
        assert_eq!(helm.steer(sample(f32::NAN, -30.0)), Steering::NEUTRAL);
        assert_eq!(helm.steer(sample(30.0, f32::INFINITY)), Steering::NEUTRAL);
    }
}
