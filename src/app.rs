use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use glam::Vec2;
use instant::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowAttributes, WindowId};

use crate::anim::clock::RunState;
use crate::anim::Animator;
use crate::config::SceneConfig;
use crate::debug::timer::{FramePhase, PhaseTimers};
use crate::debug::{AnimationSnapshot, DebugOverlay};
use crate::draw::DrawList;
use crate::input::{command_for_key, Command};
use crate::render::tessellate::Tessellator;
use crate::render::GpuState;
use crate::scene;

pub const WINDOW_TITLE: &str = "Dancing Capybara";

/// Animation tick length (seconds).
const TICK_RATE: f64 = 1.0 / 60.0;
/// Redraw timer period while running.
const TICK_INTERVAL: Duration = Duration::from_micros(16_667);
/// Max accumulated time before we clamp (prevents spiral of death).
const MAX_ACCUMULATOR: f64 = 0.25;
/// How often to log FPS (seconds).
const FPS_LOG_INTERVAL: f64 = 5.0;
/// Room for the scene's commands without regrowing.
const DRAW_LIST_CAPACITY: usize = 128;

// ---------------------------------------------------------------------------
// Frame timing
// ---------------------------------------------------------------------------

struct FrameStats {
    frames: u64,
    window_start: Instant,
    sum: f64,
    min: f64,
    max: f64,
    window_frames: u32,
}

impl FrameStats {
    fn new() -> Self {
        Self {
            frames: 0,
            window_start: Instant::now(),
            sum: 0.0,
            min: f64::MAX,
            max: 0.0,
            window_frames: 0,
        }
    }

    fn record_frame(&mut self, dt: f64, ticks: u64) {
        self.frames += 1;
        self.window_frames += 1;
        self.sum += dt;
        self.min = self.min.min(dt);
        self.max = self.max.max(dt);

        let span = self.window_start.elapsed().as_secs_f64();
        if span >= FPS_LOG_INTERVAL {
            log::info!(
                "FPS: {:.0} | avg: {:.2}ms | min: {:.2}ms | max: {:.2}ms | frames: {} | ticks: {}",
                self.window_frames as f64 / span,
                self.sum / self.window_frames as f64 * 1000.0,
                self.min * 1000.0,
                self.max * 1000.0,
                self.frames,
                ticks,
            );
            self.window_start = Instant::now();
            self.sum = 0.0;
            self.min = f64::MAX;
            self.max = 0.0;
            self.window_frames = 0;
        }
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Top-level application state.
struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    overlay: Option<DebugOverlay>,

    animator: Animator,

    // Reused every frame
    draw_list: DrawList,
    tessellator: Tessellator,

    // Fixed timestep
    last_frame_time: Option<Instant>,
    next_tick: Instant,
    accumulator: f64,
    tick_count: u64,

    frame_stats: FrameStats,
    timers: PhaseTimers,

    /// Startup failure, handed back from `run` once the loop exits.
    fatal: Option<Box<dyn Error>>,
}

impl App {
    fn new(config: SceneConfig) -> Self {
        Self {
            window: None,
            gpu: None,
            overlay: None,
            animator: Animator::new(config),
            draw_list: DrawList::with_capacity(DRAW_LIST_CAPACITY),
            tessellator: Tessellator::new(),
            last_frame_time: None,
            next_tick: Instant::now(),
            accumulator: 0.0,
            tick_count: 0,
            frame_stats: FrameStats::new(),
            timers: PhaseTimers::new(),
            fatal: None,
        }
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), Box<dyn Error>> {
        let canvas = self.animator.config().canvas;
        let attrs = WindowAttributes::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size(LogicalSize::new(canvas.x as f64, canvas.y as f64))
            .with_resizable(true);

        let window = Arc::new(event_loop.create_window(attrs)?);
        let size = window.inner_size();
        log::info!("Window created: {}x{}", size.width, size.height);

        let gpu = GpuState::new(window.clone())?;
        log::info!("wgpu + shape pipeline initialized");

        self.overlay = Some(DebugOverlay::new(&window, &gpu));
        self.gpu = Some(gpu);
        self.window = Some(window);
        Ok(())
    }

    /// Run fixed-timestep animation ticks.
    fn run_fixed_update(&mut self, dt: f64) {
        if self.animator.run_state() == RunState::Paused {
            self.accumulator = 0.0;
            return;
        }

        self.accumulator = (self.accumulator + dt).min(MAX_ACCUMULATOR);

        while self.accumulator >= TICK_RATE {
            self.animator.tick(TICK_RATE);
            self.accumulator -= TICK_RATE;
            self.tick_count += 1;
        }
    }

    /// Pause or resume. Resuming restarts frame timing so the paused
    /// interval is never replayed.
    fn toggle_pause(&mut self) -> RunState {
        let state = self.animator.toggle_pause();
        if state == RunState::Running {
            self.last_frame_time = None;
            self.accumulator = 0.0;
            self.next_tick = Instant::now();
        }
        state
    }

    fn apply(&mut self, event_loop: &ActiveEventLoop, command: Command) {
        match command {
            Command::TogglePause => {
                self.toggle_pause();
            }
            Command::Reset => {
                self.animator.reset();
                self.accumulator = 0.0;
                self.tick_count = 0;
            }
            Command::ToggleDebug => {
                if let Some(overlay) = &mut self.overlay {
                    overlay.toggle();
                }
            }
            Command::Quit => {
                log::info!("ESC pressed, exiting");
                event_loop.exit();
                return;
            }
        }
        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }

    fn snapshot(&self) -> AnimationSnapshot {
        AnimationSnapshot {
            elapsed: self.animator.elapsed(),
            pose: self.animator.pose(),
            run_state: self.animator.run_state(),
            tick_count: self.tick_count,
            note_count: self.animator.notes().len(),
            vertex_count: self.tessellator.vertices().len(),
            vertices_truncated: self.tessellator.truncated(),
        }
    }

    fn redraw(&mut self) {
        // --- Timing ---
        self.timers.begin();
        if self.animator.run_state() == RunState::Paused {
            // Paused redraws (reset, resize, overlay input) are not frames.
            self.last_frame_time = None;
            self.accumulator = 0.0;
        } else {
            let now = Instant::now();
            if let Some(last) = self.last_frame_time {
                let dt = now.duration_since(last).as_secs_f64();
                self.frame_stats.record_frame(dt, self.tick_count);
                if let Some(overlay) = &mut self.overlay {
                    overlay.record_frame(dt);
                }
                self.run_fixed_update(dt);
            }
            self.last_frame_time = Some(now);
        }
        self.timers.end(FramePhase::Animate);

        let Some(window) = self.window.clone() else {
            return;
        };
        let size = window.inner_size();

        // --- Scene ---
        self.timers.begin();
        let fit = scene::fit_transform(
            self.animator.config().canvas,
            Vec2::new(size.width as f32, size.height as f32),
        );
        self.draw_list.clear();
        self.draw_list.push(fit);
        self.animator.build_frame(&mut self.draw_list);
        self.draw_list.pop();
        self.timers.end(FramePhase::Scene);

        // --- Tessellate ---
        self.timers.begin();
        self.tessellator.tessellate(&self.draw_list);
        self.timers.end(FramePhase::Tessellate);

        let snapshot = self.snapshot();
        let Some(gpu) = &mut self.gpu else {
            return;
        };

        // --- Upload ---
        self.timers.begin();
        gpu.update_vertices(self.tessellator.vertices());
        self.timers.end(FramePhase::Upload);

        // --- Render ---
        self.timers.begin();
        let Some(mut frame) = gpu.begin_frame() else {
            return;
        };
        gpu.draw_shapes(&mut frame.encoder, &frame.view, scene::LETTERBOX.to_wgpu());

        let mut extra_cmd_bufs = Vec::new();
        let mut textures_delta = None;
        if let Some(overlay) = self.overlay.as_mut().filter(|o| o.visible) {
            let (primitives, delta, screen) =
                overlay.run_frame(&window, size.width, size.height, &snapshot, &self.timers);
            extra_cmd_bufs = overlay.prepare_egui(
                &gpu.device,
                &gpu.queue,
                &mut frame.encoder,
                &primitives,
                &delta,
                &screen,
            );
            {
                let mut pass = GpuState::begin_egui_pass(&mut frame.encoder, &frame.view);
                overlay.render_egui(&mut pass, &primitives, &screen);
            }
            textures_delta = Some(delta);
        }

        gpu.finish_frame(frame.encoder, frame.output, extra_cmd_bufs);

        if let (Some(overlay), Some(delta)) = (&mut self.overlay, textures_delta) {
            overlay.free_textures(&delta);
        }
        self.timers.end(FramePhase::Render);
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.init_window(event_loop) {
            self.fatal = Some(e);
            event_loop.exit();
            return;
        }

        self.last_frame_time = None;
        self.accumulator = 0.0;
        self.next_tick = Instant::now();
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window) = &self.window else {
            return;
        };

        match self.animator.run_state() {
            RunState::Paused => event_loop.set_control_flow(ControlFlow::Wait),
            RunState::Running => {
                let now = Instant::now();
                if now >= self.next_tick {
                    window.request_redraw();
                    self.next_tick = now + TICK_INTERVAL;
                }
                event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_tick));
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let mut consumed = false;
        if let (Some(window), Some(overlay)) = (&self.window, &mut self.overlay) {
            if overlay.visible {
                let response = overlay.on_window_event(window, &event);
                consumed = response.consumed;
                if response.repaint {
                    window.request_redraw();
                }
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                }
                if let Some(w) = &self.window {
                    w.request_redraw();
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } if !consumed => {
                if let Some(command) = command_for_key(code) {
                    self.apply(event_loop, command);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
                let clicked = self.overlay.as_mut().and_then(DebugOverlay::take_command);
                if let Some(command) = clicked {
                    self.apply(event_loop, command);
                }
            }
            _ => {}
        }
    }
}

/// Entry point: create the event loop and run.
pub fn run() -> Result<(), Box<dyn Error>> {
    let config = SceneConfig::from_env();
    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;
    match app.fatal.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_title_names_the_show() {
        assert!(WINDOW_TITLE.contains("Dancing Capybara"));
    }

    #[test]
    fn fixed_update_consumes_whole_ticks() {
        let mut app = App::new(SceneConfig {
            seed: Some(7),
            ..SceneConfig::default()
        });
        app.run_fixed_update(TICK_RATE * 3.5);
        assert_eq!(app.tick_count, 3);
        assert!((app.accumulator - TICK_RATE * 0.5).abs() < 1e-9);
        assert!((app.animator.elapsed() - TICK_RATE * 3.0).abs() < 1e-9);
    }

    #[test]
    fn fixed_update_clamps_long_stalls() {
        let mut app = App::new(SceneConfig::default());
        app.run_fixed_update(10.0);
        // 0.25 s is 15 ticks, give or take float rounding.
        assert!((14..=15).contains(&app.tick_count));
        assert!(app.accumulator < TICK_RATE);
    }

    #[test]
    fn paused_update_discards_time() {
        let mut app = App::new(SceneConfig::default());
        app.animator.toggle_pause();
        app.run_fixed_update(1.0);
        assert_eq!(app.tick_count, 0);
        assert_eq!(app.accumulator, 0.0);
        assert_eq!(app.animator.elapsed(), 0.0);
    }

    #[test]
    fn paused_redraws_record_no_frame_time() {
        let mut app = App::new(SceneConfig::default());
        app.redraw();
        app.toggle_pause();
        std::thread::sleep(Duration::from_millis(200));
        app.animator.reset();
        app.redraw();
        assert!(app.last_frame_time.is_none());

        app.toggle_pause();
        app.redraw();
        assert_eq!(app.frame_stats.frames, 0);
        assert!(app.frame_stats.max < 0.1);
        assert_eq!(app.tick_count, 0);
    }

    #[test]
    fn resume_does_not_replay_the_pause() {
        let mut app = App::new(SceneConfig::default());
        let stale = Instant::now()
            .checked_sub(Duration::from_secs(2))
            .unwrap_or_else(Instant::now);
        app.last_frame_time = Some(stale);
        app.accumulator = TICK_RATE * 0.9;

        assert_eq!(app.toggle_pause(), RunState::Paused);
        assert_eq!(app.toggle_pause(), RunState::Running);
        assert!(app.last_frame_time.is_none());
        assert_eq!(app.accumulator, 0.0);

        app.run_fixed_update(0.0);
        assert_eq!(app.tick_count, 0);
        app.redraw();
        assert_eq!(app.tick_count, 0);
        assert_eq!(app.animator.elapsed(), 0.0);
    }

    #[test]
    fn snapshot_reflects_animator() {
        let mut app = App::new(SceneConfig::default());
        app.run_fixed_update(TICK_RATE * 2.0);
        let s = app.snapshot();
        assert_eq!(s.tick_count, app.tick_count);
        assert_eq!(s.run_state, RunState::Running);
        assert_eq!(s.note_count, app.animator.config().note_count);
    }
}
