use glam::Vec2;

use crate::config::SceneConfig;

/// Horizontal sway speed in px/s at the peak of the sine.
const NOTE_SWAY: f32 = 18.0;
/// Number of entries in the scene's note palette.
pub const NOTE_TINTS: usize = 4;
/// Give up re-rolling a respawn after this many identical draws.
const MAX_RESPAWN_ROLLS: usize = 8;

/// A decorative eighth note drifting up the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub pos: Vec2,
    /// Upward drift in px/s.
    pub speed: f32,
    /// Phase offset (radians) for sway and rocking.
    pub phase: f32,
    /// Palette index, < `NOTE_TINTS`.
    pub tint: usize,
}

/// Fixed-size set of notes. Each note updates independently.
pub struct NoteField {
    notes: Vec<Note>,
    rng: fastrand::Rng,
    upper_bound: f32,
    respawn_x: (f32, f32),
    respawn_y: (f32, f32),
    speed: (f32, f32),
}

impl NoteField {
    pub fn new(config: &SceneConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        let respawn_x = config.note_respawn_x();
        let speed = config.note_speed;

        // Spread the initial field over the canvas and the spawn band so
        // the first frame already has notes on screen.
        let initial_y = (0.0, config.note_respawn_y.1);
        let notes = (0..config.note_count)
            .map(|_| random_note(&mut rng, respawn_x, initial_y, speed))
            .collect();

        Self {
            notes,
            rng,
            upper_bound: config.note_upper_bound,
            respawn_x,
            respawn_y: config.note_respawn_y,
            speed,
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Drift every note up by `dt * speed`, sway it sideways, and respawn
    /// any note that crossed the upper bound.
    pub fn update(&mut self, dt: f32, elapsed: f64) {
        for note in &mut self.notes {
            note.pos.y -= dt * note.speed;
            note.pos.x += (elapsed + note.phase as f64).sin() as f32 * NOTE_SWAY * dt;

            if note.pos.y < self.upper_bound {
                *note = respawn(&mut self.rng, note.pos, self.respawn_x, self.respawn_y, self.speed);
            }
        }
    }
}

fn lerp_range(rng: &mut fastrand::Rng, (lo, hi): (f32, f32)) -> f32 {
    lo + rng.f32() * (hi - lo)
}

fn random_note(
    rng: &mut fastrand::Rng,
    x: (f32, f32),
    y: (f32, f32),
    speed: (f32, f32),
) -> Note {
    Note {
        pos: Vec2::new(lerp_range(rng, x), lerp_range(rng, y)),
        speed: lerp_range(rng, speed),
        phase: rng.f32() * std::f32::consts::TAU,
        tint: rng.usize(0..NOTE_TINTS),
    }
}

/// New note in the respawn band, never at exactly `prior`.
fn respawn(
    rng: &mut fastrand::Rng,
    prior: Vec2,
    x: (f32, f32),
    y: (f32, f32),
    speed: (f32, f32),
) -> Note {
    let mut note = random_note(rng, x, y, speed);
    let mut rolls = 1;
    while note.pos == prior && rolls < MAX_RESPAWN_ROLLS {
        note = random_note(rng, x, y, speed);
        rolls += 1;
    }
    if note.pos == prior {
        // Only reachable with a degenerate band that contains `prior`.
        note.pos.y += 1.0;
    }
    log::trace!("Note respawned at ({:.1}, {:.1})", note.pos.x, note.pos.y);
    note
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> SceneConfig {
        SceneConfig {
            seed: Some(seed),
            ..SceneConfig::default()
        }
    }

    #[test]
    fn initial_field_matches_config() {
        let cfg = seeded(7);
        let field = NoteField::new(&cfg);
        assert_eq!(field.len(), cfg.note_count);
        let (x_lo, x_hi) = cfg.note_respawn_x();
        for n in field.notes() {
            assert!(n.pos.x >= x_lo && n.pos.x <= x_hi);
            assert!(n.pos.y >= 0.0 && n.pos.y <= cfg.note_respawn_y.1);
            assert!(n.speed >= cfg.note_speed.0 && n.speed <= cfg.note_speed.1);
            assert!(n.tint < NOTE_TINTS);
        }
    }

    #[test]
    fn same_seed_same_field() {
        let a = NoteField::new(&seeded(99));
        let b = NoteField::new(&seeded(99));
        assert_eq!(a.notes(), b.notes());
    }

    #[test]
    fn notes_drift_upward() {
        let mut field = NoteField::new(&seeded(1));
        for n in &mut field.notes {
            n.pos.y = 300.0;
        }
        let before: Vec<Note> = field.notes().to_vec();
        field.update(0.1, 0.0);
        for (old, new) in before.iter().zip(field.notes()) {
            assert!((old.pos.y - new.pos.y - old.speed * 0.1).abs() < 1e-3);
            // Sway is bounded by NOTE_SWAY * dt.
            assert!((old.pos.x - new.pos.x).abs() <= NOTE_SWAY * 0.1 + 1e-4);
        }
    }

    #[test]
    fn note_above_threshold_respawns_below() {
        let cfg = seeded(3);
        let mut field = NoteField::new(&cfg);
        field.notes[0].pos = Vec2::new(400.0, cfg.note_upper_bound + 0.5);
        field.notes[0].speed = 50.0;
        let prior_after_move = Vec2::new(400.0, cfg.note_upper_bound + 0.5 - 5.0);

        field.update(0.1, 0.0);

        let n = field.notes()[0];
        assert!(n.pos.y >= cfg.note_respawn_y.0 && n.pos.y <= cfg.note_respawn_y.1);
        let (x_lo, x_hi) = cfg.note_respawn_x();
        assert!(n.pos.x >= x_lo && n.pos.x <= x_hi);
        assert_ne!(n.pos, prior_after_move);
    }

    #[test]
    fn respawn_never_repeats_prior_position() {
        let mut rng = fastrand::Rng::with_seed(11);
        // Degenerate band: every roll lands exactly on the prior position.
        let prior = Vec2::new(10.0, 20.0);
        let note = respawn(&mut rng, prior, (10.0, 10.0), (20.0, 20.0), (1.0, 1.0));
        assert_ne!(note.pos, prior);

        for _ in 0..200 {
            let note = respawn(&mut rng, prior, (40.0, 760.0), (620.0, 740.0), (35.0, 80.0));
            assert_ne!(note.pos, prior);
        }
    }

    #[test]
    fn long_run_keeps_every_note_in_play() {
        let cfg = seeded(5);
        let mut field = NoteField::new(&cfg);
        let mut elapsed = 0.0;
        for _ in 0..5000 {
            elapsed += 1.0 / 60.0;
            field.update(1.0 / 60.0, elapsed);
        }
        assert_eq!(field.len(), cfg.note_count);
        for n in field.notes() {
            assert!(n.pos.y >= cfg.note_upper_bound);
            assert!(n.pos.y <= cfg.note_respawn_y.1);
        }
    }
}
