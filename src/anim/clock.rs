/// Observable form of the pause flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Paused,
}

impl RunState {
    pub fn label(self) -> &'static str {
        match self {
            RunState::Running => "Running",
            RunState::Paused => "Paused",
        }
    }
}

/// Animation clock: elapsed seconds since start or last reset.
#[derive(Debug, Clone, Default)]
pub struct Clock {
    elapsed: f64,
    paused: bool,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn run_state(&self) -> RunState {
        if self.paused {
            RunState::Paused
        } else {
            RunState::Running
        }
    }

    /// Advance by `dt` seconds. Returns false while paused, in which case
    /// elapsed time is untouched and no redraw is owed.
    pub fn tick(&mut self, dt: f64) -> bool {
        if self.paused {
            return false;
        }
        self.elapsed += sanitize_dt(dt);
        true
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }

    /// Flip the pause flag and return the new state.
    pub fn toggle_pause(&mut self) -> RunState {
        self.paused = !self.paused;
        self.run_state()
    }
}

/// Negative or non-finite deltas count as zero so elapsed stays monotonic.
pub fn sanitize_dt(dt: f64) -> f64 {
    if dt.is_finite() && dt > 0.0 {
        dt
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_accumulate_while_running() {
        let mut clock = Clock::new();
        assert!(clock.tick(0.5));
        assert!(clock.tick(0.25));
        assert!((clock.elapsed() - 0.75).abs() < 1e-12);
        assert_eq!(clock.run_state(), RunState::Running);
    }

    #[test]
    fn pause_freezes_elapsed() {
        let mut clock = Clock::new();
        clock.tick(1.0);
        assert_eq!(clock.toggle_pause(), RunState::Paused);
        for _ in 0..100 {
            assert!(!clock.tick(0.016));
        }
        assert_eq!(clock.elapsed(), 1.0);

        assert_eq!(clock.toggle_pause(), RunState::Running);
        assert!(clock.tick(1.0));
        assert_eq!(clock.elapsed(), 2.0);
    }

    #[test]
    fn reset_zeroes_from_either_state() {
        let mut clock = Clock::new();
        clock.tick(123.4);
        clock.reset();
        assert_eq!(clock.elapsed(), 0.0);
        assert_eq!(clock.run_state(), RunState::Running);

        clock.tick(5.0);
        clock.toggle_pause();
        clock.reset();
        assert_eq!(clock.elapsed(), 0.0);
        // Reset does not leave the paused state.
        assert_eq!(clock.run_state(), RunState::Paused);
    }

    #[test]
    fn bad_deltas_are_ignored() {
        let mut clock = Clock::new();
        clock.tick(1.0);
        clock.tick(-5.0);
        clock.tick(f64::NAN);
        clock.tick(f64::INFINITY);
        assert_eq!(clock.elapsed(), 1.0);
    }
}
