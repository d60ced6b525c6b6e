/// Per-frame animation offsets. Derived from elapsed time, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    /// Vertical body offset in px (positive is down).
    pub bob: f32,
    /// Horizontal body offset in px.
    pub shimmy: f32,
    pub head_tilt_deg: f32,
    pub ear_wiggle_deg: f32,
    /// Foot lift in px, always >= 0.
    pub foot_tap: f32,
}

/// `amplitude * sin(freq * t)`, freq in rad/s.
#[derive(Debug, Clone, Copy)]
struct Wave {
    amplitude: f32,
    freq: f64,
}

impl Wave {
    const fn new(amplitude: f32, freq: f64) -> Self {
        Self { amplitude, freq }
    }

    fn sample(self, t: f64) -> f32 {
        self.amplitude * (self.freq * t).sin() as f32
    }
}

const BOB: Wave = Wave::new(8.0, 2.2);
const SHIMMY: Wave = Wave::new(6.0, 3.0);
const HEAD_TILT: Wave = Wave::new(10.0, 2.6);
const EAR_WIGGLE: Wave = Wave::new(8.0, 8.0);
/// Half-wave rectified: feet only ever lift.
const FOOT_TAP: Wave = Wave::new(5.0, 6.0);

/// Pose at `elapsed` seconds.
pub fn pose(elapsed: f64) -> Pose {
    Pose {
        bob: BOB.sample(elapsed),
        shimmy: SHIMMY.sample(elapsed),
        head_tilt_deg: HEAD_TILT.sample(elapsed),
        ear_wiggle_deg: EAR_WIGGLE.sample(elapsed),
        foot_tap: FOOT_TAP.sample(elapsed).max(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_pose_at_zero() {
        assert_eq!(pose(0.0), Pose::default());
    }

    #[test]
    fn offsets_stay_within_amplitude() {
        // 0..120s in uneven steps so we don't alias with any frequency.
        let mut t = 0.0;
        while t < 120.0 {
            let p = pose(t);
            assert!((-8.0..=8.0).contains(&p.bob), "bob {} at {t}", p.bob);
            assert!((-6.0..=6.0).contains(&p.shimmy));
            assert!((-10.0..=10.0).contains(&p.head_tilt_deg));
            assert!((-8.0..=8.0).contains(&p.ear_wiggle_deg));
            assert!((0.0..=5.0).contains(&p.foot_tap), "tap {} at {t}", p.foot_tap);
            t += 0.0137;
        }
    }

    #[test]
    fn peaks_hit_amplitude() {
        let quarter = |freq: f64| std::f64::consts::FRAC_PI_2 / freq;
        assert!((pose(quarter(2.2)).bob - 8.0).abs() < 1e-4);
        assert!((pose(quarter(3.0)).shimmy - 6.0).abs() < 1e-4);
        assert!((pose(quarter(2.6)).head_tilt_deg - 10.0).abs() < 1e-4);
        assert!((pose(quarter(8.0)).ear_wiggle_deg - 8.0).abs() < 1e-4);
        assert!((pose(quarter(6.0)).foot_tap - 5.0).abs() < 1e-4);
    }

    #[test]
    fn foot_tap_rests_on_negative_half_wave() {
        // sin(6t) < 0 for t in (pi/6, pi/3).
        let t = std::f64::consts::FRAC_PI_4;
        assert_eq!(pose(t).foot_tap, 0.0);
    }

    #[test]
    fn pure_function_of_time() {
        assert_eq!(pose(3.21), pose(3.21));
    }
}
