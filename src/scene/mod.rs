pub mod capybara;

use glam::{vec2, Affine2, Vec2};

use crate::anim::notes::{Note, NOTE_TINTS};
use crate::anim::pose::Pose;
use crate::config::SceneConfig;
use crate::draw::{translate, DrawList, Paint, PathEl, Primitive, Rgba};

const SKY_TOP: Rgba = Rgba::rgb(0x2E, 0x1F, 0x4F);
const SKY_BOTTOM: Rgba = Rgba::rgb(0xE0, 0x8A, 0x6E);
const SPOTLIGHT: Rgba = Rgba::rgba(0xFF, 0xF2, 0xC8, 0x90);

/// Window area outside the fitted canvas.
pub const LETTERBOX: Rgba = SKY_BOTTOM;

const NOTE_COLORS: [Rgba; NOTE_TINTS] = [
    Rgba::rgb(0xFF, 0xE0, 0x6B),
    Rgba::rgb(0x9F, 0xE8, 0xFF),
    Rgba::rgb(0xFF, 0xA8, 0xD8),
    Rgba::rgb(0xC8, 0xFF, 0xA8),
];
/// Notes fade out over this distance as they approach the upper bound.
const NOTE_FADE_SPAN: f32 = 160.0;
const NOTE_STROKE: f32 = 3.0;
/// Peak rocking angle of a note glyph, radians.
const NOTE_ROCK: f32 = 0.25;

/// Everything the scene needs for one frame.
pub struct FrameInput<'a> {
    pub pose: Pose,
    pub notes: &'a [Note],
    pub elapsed: f64,
    pub config: &'a SceneConfig,
}

/// Character anchor (body center at rest) for a given canvas.
pub fn character_anchor(canvas: Vec2) -> Vec2 {
    vec2(canvas.x * 0.5, canvas.y * 0.56)
}

/// Emit one frame back to front: background, spotlight, notes, capybara.
pub fn build(list: &mut DrawList, frame: &FrameInput) {
    let canvas = frame.config.canvas;
    let anchor = character_anchor(canvas);

    list.draw(
        Primitive::Rect {
            min: Vec2::ZERO,
            size: canvas,
        },
        Paint::VerticalGradient {
            top: SKY_TOP,
            bottom: SKY_BOTTOM,
        },
    );

    list.draw(
        Primitive::Ellipse {
            center: anchor + vec2(0.0, 118.0),
            radii: vec2(250.0, 70.0),
        },
        Paint::RadialGradient {
            inner: SPOTLIGHT,
            outer: Rgba::TRANSPARENT,
        },
    );

    let upper = frame.config.note_upper_bound;
    for note in frame.notes {
        let fade = ((note.pos.y - upper) / NOTE_FADE_SPAN).clamp(0.0, 1.0);
        note_glyph(list, note, frame.elapsed, fade);
    }

    capybara::draw(list, &frame.pose, anchor);
}

/// Scale + offset that fits `canvas` inside `window`, centered.
pub fn fit_transform(canvas: Vec2, window: Vec2) -> Affine2 {
    if canvas.x <= 0.0 || canvas.y <= 0.0 || window.x <= 0.0 || window.y <= 0.0 {
        return Affine2::IDENTITY;
    }
    let scale = (window.x / canvas.x).min(window.y / canvas.y);
    let offset = (window - canvas * scale) * 0.5;
    Affine2::from_translation(offset) * Affine2::from_scale(Vec2::splat(scale))
}

/// Eighth note: stem, curved flag, tilted head. Origin is the head center.
fn note_glyph(list: &mut DrawList, note: &Note, elapsed: f64, fade: f32) {
    let color = NOTE_COLORS[note.tint % NOTE_TINTS].fade(fade);
    let rock = NOTE_ROCK * (2.0 * elapsed + note.phase as f64).sin() as f32;

    list.group(translate(note.pos) * Affine2::from_angle(rock), |list| {
        list.line(vec2(8.0, -2.0), vec2(8.0, -40.0), NOTE_STROKE, color);
        list.stroke_path(
            vec![
                PathEl::MoveTo(vec2(8.0, -40.0)),
                PathEl::CubicTo(vec2(20.0, -34.0), vec2(25.0, -25.0), vec2(17.0, -14.0)),
            ],
            NOTE_STROKE,
            color,
        );
        list.group(Affine2::from_angle((-20.0f32).to_radians()), |list| {
            list.fill_ellipse(Vec2::ZERO, vec2(9.5, 7.0), color);
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::pose::pose;

    fn note_at(y: f32) -> Note {
        Note {
            pos: vec2(200.0, y),
            speed: 50.0,
            phase: 0.0,
            tint: 1,
        }
    }

    fn frame_list(p: Pose, notes: &[Note]) -> DrawList {
        let config = SceneConfig::default();
        let mut list = DrawList::new();
        build(
            &mut list,
            &FrameInput {
                pose: p,
                notes,
                elapsed: 0.0,
                config: &config,
            },
        );
        list
    }

    #[test]
    fn draw_order_is_back_to_front() {
        let notes = [note_at(300.0), note_at(100.0)];
        let list = frame_list(pose(0.0), &notes);
        let cmds = list.commands();

        assert!(matches!(cmds[0].primitive, Primitive::Rect { .. }));
        assert!(matches!(cmds[0].paint, Paint::VerticalGradient { .. }));
        assert!(matches!(cmds[1].primitive, Primitive::Ellipse { .. }));
        assert!(matches!(cmds[1].paint, Paint::RadialGradient { .. }));

        // Each note: stem line, flag path, head ellipse.
        for i in 0..notes.len() {
            let base = 2 + i * 3;
            assert!(matches!(cmds[base].primitive, Primitive::Line { .. }));
            assert!(matches!(cmds[base + 1].primitive, Primitive::Path(_)));
            assert!(matches!(cmds[base + 2].primitive, Primitive::Ellipse { .. }));
        }

        // Character follows the notes and begins with its shadow.
        let shadow = &cmds[2 + notes.len() * 3];
        assert!(matches!(shadow.primitive, Primitive::Ellipse { .. }));
        assert_eq!(list.depth(), 0);
    }

    #[test]
    fn command_count_scales_with_notes() {
        let empty = frame_list(pose(0.0), &[]).len();
        let three = frame_list(pose(0.0), &[note_at(10.0), note_at(20.0), note_at(30.0)]).len();
        assert_eq!(three - empty, 9);
    }

    #[test]
    fn notes_fade_near_upper_bound() {
        let config = SceneConfig::default();
        let list = frame_list(pose(0.0), &[note_at(config.note_upper_bound + 1.0)]);
        match list.commands()[2].paint {
            Paint::Stroke { color, .. } => assert!(color.a() < 10),
            ref other => panic!("unexpected paint {other:?}"),
        }

        let list = frame_list(pose(0.0), &[note_at(500.0)]);
        match list.commands()[2].paint {
            Paint::Stroke { color, .. } => assert_eq!(color.a(), 0xFF),
            ref other => panic!("unexpected paint {other:?}"),
        }
    }

    #[test]
    fn note_glyph_sits_at_note_position() {
        let list = frame_list(pose(0.0), &[note_at(250.0)]);
        let head = &list.commands()[4];
        let origin = head.transform.transform_point2(Vec2::ZERO);
        assert!((origin - vec2(200.0, 250.0)).length() < 1e-3);
    }

    #[test]
    fn fit_preserves_aspect_and_centers() {
        let canvas = vec2(800.0, 600.0);
        let fit = fit_transform(canvas, vec2(1600.0, 900.0));
        // Height-limited: scale 1.5, 200px pillarbox each side.
        let tl = fit.transform_point2(Vec2::ZERO);
        let br = fit.transform_point2(canvas);
        assert!((tl - vec2(200.0, 0.0)).length() < 1e-3);
        assert!((br - vec2(1400.0, 900.0)).length() < 1e-3);

        assert_eq!(fit_transform(canvas, vec2(800.0, 600.0)), Affine2::IDENTITY);
        assert_eq!(fit_transform(canvas, Vec2::ZERO), Affine2::IDENTITY);
    }
}
