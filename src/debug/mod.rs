pub mod ring;
pub mod timer;

use winit::window::Window;

use self::ring::{FrameHistory, FrameSummary};
use self::timer::{FramePhase, PhaseTimers, PHASE_COUNT};

use crate::anim::clock::RunState;
use crate::anim::pose::Pose;
use crate::input::{Command, KEY_HELP};
use crate::render::GpuState;

/// Number of frame times to keep in the histogram.
const FRAME_HISTORY_LEN: usize = 300;
/// Frame budget drawn as the target line, seconds.
const TARGET_FRAME: f64 = 1.0 / 60.0;

/// Animation state shown in the overlay, captured by the app each frame.
#[derive(Debug, Clone, Copy)]
pub struct AnimationSnapshot {
    pub elapsed: f64,
    pub pose: Pose,
    pub run_state: RunState,
    pub tick_count: u64,
    pub note_count: usize,
    pub vertex_count: usize,
    pub vertices_truncated: bool,
}

/// Debug overlay powered by egui.
pub struct DebugOverlay {
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,

    pub visible: bool,

    /// Rolling window of frame times (seconds).
    pub frame_times: FrameHistory,

    /// Command clicked in the panel, drained by the app.
    pending: Option<Command>,
}

impl DebugOverlay {
    pub fn new(window: &Window, gpu: &GpuState) -> Self {
        let egui_ctx = egui::Context::default();

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            Some(gpu.device.limits().max_texture_dimension_2d as usize),
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            &gpu.device,
            gpu.surface_config.format,
            egui_wgpu::RendererOptions {
                depth_stencil_format: None,
                msaa_samples: 1,
                dithering: true,
                predictable_texture_filtering: false,
            },
        );

        Self {
            egui_ctx,
            egui_state,
            egui_renderer,
            visible: false,
            frame_times: FrameHistory::new(FRAME_HISTORY_LEN),
            pending: None,
        }
    }

    /// Flip visibility. Returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.visible = !self.visible;
        log::debug!("Debug overlay {}", if self.visible { "shown" } else { "hidden" });
        self.visible
    }

    pub fn record_frame(&mut self, dt: f64) {
        self.frame_times.push(dt);
    }

    /// Command issued from the panel since the last call, if any.
    pub fn take_command(&mut self) -> Option<Command> {
        self.pending.take()
    }

    /// Forward a winit event to egui.
    pub fn on_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> egui_winit::EventResponse {
        self.egui_state.on_window_event(window, event)
    }

    /// Run the egui frame and produce paint output.
    /// Returns (clipped_primitives, textures_delta, screen_descriptor).
    pub fn run_frame(
        &mut self,
        window: &Window,
        screen_w: u32,
        screen_h: u32,
        anim: &AnimationSnapshot,
        timers: &PhaseTimers,
    ) -> (
        Vec<egui::epaint::ClippedPrimitive>,
        egui::TexturesDelta,
        egui_wgpu::ScreenDescriptor,
    ) {
        let raw_input = self.egui_state.take_egui_input(window);

        // Snapshot read-only state for UI drawing (avoids borrow conflict
        // between egui_ctx.run() borrowing self and the closure borrowing self).
        let ui_state = UiSnapshot {
            visible: self.visible,
            summary: self.frame_times.summary(),
            frame_times: self.frame_times.iter().collect(),
            frame_count: self.frame_times.len(),
            phase_durations: timers.durations_us,
            phase_total: timers.total_us(),
            anim: *anim,
        };

        let mut clicked = None;
        let ctx = self.egui_ctx.clone();
        let full_output = ctx.run(raw_input, |ctx| {
            clicked = draw_ui(ctx, &ui_state);
        });
        if clicked.is_some() {
            self.pending = clicked;
        }

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let pixels_per_point = full_output.pixels_per_point;
        let clipped_primitives = self.egui_ctx.tessellate(full_output.shapes, pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [screen_w, screen_h],
            pixels_per_point,
        };

        (clipped_primitives, full_output.textures_delta, screen_descriptor)
    }

    /// Upload egui textures and buffers. Call before the egui render pass.
    pub fn prepare_egui(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::epaint::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) -> Vec<wgpu::CommandBuffer> {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor)
    }

    /// Render egui into the given render pass.
    pub fn render_egui(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::epaint::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    /// Free textures after present.
    pub fn free_textures(&mut self, textures_delta: &egui::TexturesDelta) {
        for &id in &textures_delta.free {
            self.egui_renderer.free_texture(&id);
        }
    }
}

// ---------------------------------------------------------------------------
// UI snapshot + free-function draw (avoids borrow conflicts with egui_ctx)
// ---------------------------------------------------------------------------

struct UiSnapshot {
    visible: bool,
    summary: Option<FrameSummary>,
    frame_times: Vec<f64>,
    frame_count: usize,
    phase_durations: [f64; PHASE_COUNT],
    phase_total: f64,
    anim: AnimationSnapshot,
}

/// Draw the panel. Returns a command if a control was clicked.
fn draw_ui(ctx: &egui::Context, s: &UiSnapshot) -> Option<Command> {
    if !s.visible {
        return None;
    }
    let mut clicked = None;

    let panel_frame = egui::Frame::NONE
        .fill(egui::Color32::from_rgba_unmultiplied(20, 20, 20, 220))
        .corner_radius(6.0)
        .inner_margin(10.0);

    egui::Window::new("Debug")
        .default_pos([10.0, 10.0])
        .default_width(300.0)
        .resizable(true)
        .frame(panel_frame)
        .show(ctx, |ui| {
            ui.style_mut().visuals.override_text_color = Some(egui::Color32::from_gray(220));

            // --- Performance ---
            ui.heading("Performance");
            if let Some(sum) = s.summary {
                ui.label(format!("FPS: {:.1}", sum.fps));
                ui.label(format!(
                    "Frame: {:.2}ms avg | {:.2} min | {:.2} max",
                    sum.avg * 1000.0,
                    sum.min * 1000.0,
                    sum.max * 1000.0,
                ));
            } else {
                ui.label("FPS: -");
            }
            ui.add_space(4.0);

            // --- Frame time histogram ---
            ui.heading(format!("Frame Time History ({} frames)", s.frame_count));
            if !s.frame_times.is_empty() {
                let max_time = s
                    .frame_times
                    .iter()
                    .copied()
                    .fold(0.0f64, f64::max)
                    .max(0.020);

                let (response, painter) =
                    ui.allocate_painter(egui::vec2(280.0, 60.0), egui::Sense::hover());
                let rect = response.rect;

                let bar_width = rect.width() / s.frame_times.len() as f32;
                let target_y =
                    rect.bottom() - (TARGET_FRAME / max_time) as f32 * rect.height();

                for (i, &t) in s.frame_times.iter().enumerate() {
                    let h = (t / max_time) as f32 * rect.height();
                    let x = rect.left() + i as f32 * bar_width;
                    // Over 1.5x budget.
                    let color = if t > TARGET_FRAME * 1.5 {
                        egui::Color32::from_rgb(255, 100, 80)
                    } else {
                        egui::Color32::from_rgb(80, 200, 120)
                    };
                    painter.rect_filled(
                        egui::Rect::from_min_max(
                            egui::pos2(x, rect.bottom() - h),
                            egui::pos2(x + (bar_width - 1.0).max(1.0), rect.bottom()),
                        ),
                        0.0,
                        color,
                    );
                }

                painter.line_segment(
                    [
                        egui::pos2(rect.left(), target_y),
                        egui::pos2(rect.right(), target_y),
                    ],
                    egui::Stroke::new(1.0, egui::Color32::from_rgb(255, 255, 100)),
                );
            }
            ui.add_space(4.0);

            // --- Phase timers ---
            ui.heading("Frame Phases");
            let total = s.phase_total.max(1.0);
            let max_us = s
                .phase_durations
                .iter()
                .copied()
                .fold(0.0f64, f64::max)
                .max(1.0);

            for phase in FramePhase::ALL {
                let us = s.phase_durations[phase as usize];
                let pct = us / total * 100.0;
                let bar_frac = (us / max_us) as f32;

                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(format!("{:<10}", phase.label())).monospace());
                    ui.label(
                        egui::RichText::new(format!("{:>5.0}us ({:>2.0}%)", us, pct)).monospace(),
                    );

                    let (response, painter) =
                        ui.allocate_painter(egui::vec2(70.0, 12.0), egui::Sense::hover());
                    let r = response.rect;
                    painter.rect_filled(
                        egui::Rect::from_min_max(
                            r.left_top(),
                            egui::pos2(r.left() + r.width() * bar_frac, r.bottom()),
                        ),
                        2.0,
                        egui::Color32::from_rgb(100, 180, 255),
                    );
                });
            }
            ui.add_space(4.0);

            // --- Animation ---
            let a = &s.anim;
            ui.heading("Animation");
            ui.label(format!(
                "{} | t = {:.2}s | ticks: {}",
                a.run_state.label(),
                a.elapsed,
                a.tick_count
            ));
            egui::Grid::new("pose_grid").num_columns(2).show(ui, |ui| {
                for (name, value, unit) in [
                    ("Bob", a.pose.bob, "px"),
                    ("Shimmy", a.pose.shimmy, "px"),
                    ("Head tilt", a.pose.head_tilt_deg, "deg"),
                    ("Ear wiggle", a.pose.ear_wiggle_deg, "deg"),
                    ("Foot tap", a.pose.foot_tap, "px"),
                ] {
                    ui.label(name);
                    ui.label(egui::RichText::new(format!("{value:>6.2} {unit}")).monospace());
                    ui.end_row();
                }
            });
            ui.label(format!(
                "Notes: {} | Vertices: {}{}",
                a.note_count,
                a.vertex_count,
                if a.vertices_truncated { " (truncated)" } else { "" },
            ));
            ui.add_space(4.0);

            // --- Controls ---
            ui.heading("Controls");
            ui.horizontal(|ui| {
                let pause_label = match a.run_state {
                    RunState::Running => "Pause",
                    RunState::Paused => "Resume",
                };
                if ui.button(pause_label).clicked() {
                    clicked = Some(Command::TogglePause);
                }
                if ui.button("Reset").clicked() {
                    clicked = Some(Command::Reset);
                }
            });
            ui.add_space(4.0);

            ui.label(KEY_HELP);
        });

    clicked
}
