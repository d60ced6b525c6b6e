use glam::Vec2;

/// Env var holding a u64 seed for the note RNG.
pub const SEED_VAR: &str = "CAPYDANCE_SEED";
/// Env var overriding the number of floating notes.
pub const NOTES_VAR: &str = "CAPYDANCE_NOTES";

/// Upper limit accepted from `CAPYDANCE_NOTES`.
const MAX_NOTE_COUNT: usize = 64;

/// Scene layout and note-field tuning. Everything is in logical canvas pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    /// Logical canvas the scene is authored in; fitted into the window.
    pub canvas: Vec2,
    pub note_count: usize,
    /// A note whose y drops below this is respawned.
    pub note_upper_bound: f32,
    /// Respawn y range (min, max), below the visible area.
    pub note_respawn_y: (f32, f32),
    /// Horizontal inset from each canvas edge for respawned notes.
    pub note_margin_x: f32,
    /// Upward drift speed range in px/s.
    pub note_speed: (f32, f32),
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            canvas: Vec2::new(800.0, 600.0),
            note_count: 10,
            note_upper_bound: -60.0,
            note_respawn_y: (620.0, 740.0),
            note_margin_x: 40.0,
            note_speed: (35.0, 80.0),
            seed: None,
        }
    }
}

impl SceneConfig {
    /// Defaults with `CAPYDANCE_SEED` / `CAPYDANCE_NOTES` applied.
    pub fn from_env() -> Self {
        let seed = std::env::var(SEED_VAR).ok();
        let notes = std::env::var(NOTES_VAR).ok();
        Self::default().with_overrides(seed.as_deref(), notes.as_deref())
    }

    /// Apply raw override strings. Invalid values are logged and ignored.
    pub fn with_overrides(mut self, seed: Option<&str>, notes: Option<&str>) -> Self {
        if let Some(raw) = seed {
            match raw.trim().parse::<u64>() {
                Ok(seed) => self.seed = Some(seed),
                Err(e) => log::warn!("Ignoring {SEED_VAR}={raw:?}: {e}"),
            }
        }
        if let Some(raw) = notes {
            match raw.trim().parse::<usize>() {
                Ok(n) if (1..=MAX_NOTE_COUNT).contains(&n) => self.note_count = n,
                Ok(n) => log::warn!(
                    "Ignoring {NOTES_VAR}={n}: expected 1..={MAX_NOTE_COUNT}, keeping {}",
                    self.note_count
                ),
                Err(e) => log::warn!("Ignoring {NOTES_VAR}={raw:?}: {e}"),
            }
        }
        self
    }

    /// Horizontal respawn range (min, max).
    pub fn note_respawn_x(&self) -> (f32, f32) {
        let lo = self.note_margin_x.min(self.canvas.x * 0.5);
        (lo, self.canvas.x - lo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_place_respawn_below_canvas() {
        let cfg = SceneConfig::default();
        assert!(cfg.note_respawn_y.0 > cfg.canvas.y);
        assert!(cfg.note_respawn_y.0 < cfg.note_respawn_y.1);
        assert!(cfg.note_upper_bound < 0.0);
        assert_eq!(cfg.note_respawn_x(), (40.0, 760.0));
    }

    #[test]
    fn valid_overrides_apply() {
        let cfg = SceneConfig::default().with_overrides(Some(" 42 "), Some("16"));
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.note_count, 16);
    }

    #[test]
    fn invalid_overrides_fall_back() {
        let defaults = SceneConfig::default();
        let cfg = defaults
            .clone()
            .with_overrides(Some("capybara"), Some("0"));
        assert_eq!(cfg, defaults);

        let cfg = defaults.clone().with_overrides(None, Some("500"));
        assert_eq!(cfg.note_count, defaults.note_count);

        let cfg = defaults.clone().with_overrides(None, Some("-3"));
        assert_eq!(cfg.note_count, defaults.note_count);
    }

    #[test]
    fn narrow_canvas_keeps_respawn_range_ordered() {
        let cfg = SceneConfig {
            canvas: Vec2::new(50.0, 600.0),
            ..SceneConfig::default()
        };
        let (lo, hi) = cfg.note_respawn_x();
        assert!(lo <= hi);
    }
}
