pub mod clock;
pub mod notes;
pub mod pose;

use crate::config::SceneConfig;
use crate::draw::DrawList;
use crate::scene;

use self::clock::{sanitize_dt, Clock, RunState};
use self::notes::{Note, NoteField};
use self::pose::Pose;

/// The animation core: clock, note field, and frame emission.
///
/// Pose is recomputed from the clock on demand, so the only mutable state
/// here is elapsed time, the pause flag, and the notes.
pub struct Animator {
    clock: Clock,
    notes: NoteField,
    config: SceneConfig,
}

impl Animator {
    pub fn new(config: SceneConfig) -> Self {
        let notes = NoteField::new(&config);
        log::info!(
            "Animator ready: {} notes on a {}x{} canvas (seed: {:?})",
            notes.len(),
            config.canvas.x,
            config.canvas.y,
            config.seed,
        );
        Self {
            clock: Clock::new(),
            notes,
            config,
        }
    }

    /// Advance one tick. Returns true when a redraw should be requested.
    pub fn tick(&mut self, dt: f64) -> bool {
        let dt = sanitize_dt(dt);
        if !self.clock.tick(dt) {
            return false;
        }
        self.notes.update(dt as f32, self.clock.elapsed());
        true
    }

    pub fn reset(&mut self) {
        log::info!("Reset at t={:.2}s", self.clock.elapsed());
        self.clock.reset();
    }

    pub fn toggle_pause(&mut self) -> RunState {
        let state = self.clock.toggle_pause();
        log::info!("{} at t={:.2}s", state.label(), self.clock.elapsed());
        state
    }

    pub fn run_state(&self) -> RunState {
        self.clock.run_state()
    }

    pub fn elapsed(&self) -> f64 {
        self.clock.elapsed()
    }

    pub fn pose(&self) -> Pose {
        pose::pose(self.clock.elapsed())
    }

    pub fn notes(&self) -> &[Note] {
        self.notes.notes()
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Emit this frame's draw calls, back to front, in canvas space.
    pub fn build_frame(&self, list: &mut DrawList) {
        scene::build(
            list,
            &scene::FrameInput {
                pose: self.pose(),
                notes: self.notes.notes(),
                elapsed: self.clock.elapsed(),
                config: &self.config,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f64 = 0.016;

    fn animator() -> Animator {
        Animator::new(SceneConfig {
            seed: Some(2024),
            ..SceneConfig::default()
        })
    }

    #[test]
    fn starts_at_rest() {
        let a = animator();
        assert_eq!(a.elapsed(), 0.0);
        assert_eq!(a.run_state(), RunState::Running);
        assert_eq!(a.pose(), pose::pose(0.0));
    }

    #[test]
    fn paused_ticks_request_nothing_and_freeze_notes() {
        let mut a = animator();
        a.tick(FRAME);
        a.toggle_pause();
        let elapsed = a.elapsed();
        let notes = a.notes().to_vec();
        for _ in 0..50 {
            assert!(!a.tick(FRAME));
        }
        assert_eq!(a.elapsed(), elapsed);
        assert_eq!(a.notes(), notes.as_slice());
    }

    #[test]
    fn running_ticks_move_notes() {
        let mut a = animator();
        let before = a.notes().to_vec();
        assert!(a.tick(FRAME));
        assert_ne!(a.notes(), before.as_slice());
    }

    #[test]
    fn reset_keeps_notes_and_run_state() {
        let mut a = animator();
        for _ in 0..10 {
            a.tick(FRAME);
        }
        a.toggle_pause();
        let notes = a.notes().to_vec();
        a.reset();
        assert_eq!(a.elapsed(), 0.0);
        assert_eq!(a.run_state(), RunState::Paused);
        assert_eq!(a.notes(), notes.as_slice());
    }

    #[test]
    fn thousand_ticks_then_reset_returns_to_rest_pose() {
        let mut a = animator();
        let rest = a.pose();
        for _ in 0..1000 {
            assert!(a.tick(FRAME));
        }
        assert!((a.elapsed() - 16.0).abs() < 1e-9);
        assert_ne!(a.pose(), rest);

        a.reset();
        assert_eq!(a.elapsed(), 0.0);
        assert_eq!(a.pose(), rest);
        assert_eq!(a.pose(), Pose::default());
    }

    #[test]
    fn frame_is_emitted_into_list() {
        let mut a = animator();
        a.tick(FRAME);
        let mut list = DrawList::new();
        a.build_frame(&mut list);
        assert!(!list.is_empty());
        assert_eq!(list.depth(), 0);
    }
}
