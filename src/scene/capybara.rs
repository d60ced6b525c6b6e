use glam::{vec2, Vec2};

use crate::anim::pose::Pose;
use crate::draw::{rotate_deg, translate, DrawList, PathEl, Rgba};

const FUR: Rgba = Rgba::rgb(0x9C, 0x6A, 0x42);
const FUR_DARK: Rgba = Rgba::rgb(0x7A, 0x50, 0x30);
const FUR_LIGHT: Rgba = Rgba::rgb(0xC4, 0x96, 0x68);
const SNOUT: Rgba = Rgba::rgb(0xB0, 0x80, 0x56);
const INK: Rgba = Rgba::rgb(0x2B, 0x1D, 0x14);
const EAR_INNER: Rgba = Rgba::rgb(0xD9, 0x9A, 0x8A);
const BLUSH: Rgba = Rgba::rgba(0xFF, 0x8A, 0x8A, 0x88);
const SHADOW: Rgba = Rgba::rgba(0x1A, 0x0E, 0x22, 0x55);

/// Shadow center below the anchor and its resting radii.
const SHADOW_OFFSET: Vec2 = Vec2::new(0.0, 118.0);
const SHADOW_RADII: Vec2 = Vec2::new(140.0, 22.0);

const BODY_SIZE: Vec2 = Vec2::new(260.0, 150.0);
const BODY_RADIUS: f32 = 70.0;
/// Body lean per px of shimmy, degrees.
const BODY_LEAN: f32 = 0.6;

/// Neck joint in body space; the head group rotates about it.
const NECK: Vec2 = Vec2::new(118.0, -62.0);
/// Ear pivot in head space.
const EAR_PIVOT: Vec2 = Vec2::new(-24.0, -46.0);

/// Hip y in body space, shared by all four legs.
const HIP_Y: f32 = 52.0;

struct Leg {
    x: f32,
    /// Lead legs lift the full foot tap; the others trail at 40%.
    lead: bool,
}

const LEGS: [Leg; 4] = [
    Leg { x: -95.0, lead: true },
    Leg { x: -45.0, lead: false },
    Leg { x: 45.0, lead: false },
    Leg { x: 95.0, lead: true },
];

/// Draw the capybara with its body centered on `anchor` at rest.
pub fn draw(list: &mut DrawList, pose: &Pose, anchor: Vec2) {
    // Shadow stays on the floor; it widens as the body dips toward it.
    list.fill_ellipse(
        anchor + SHADOW_OFFSET + vec2(pose.shimmy * 0.5, 0.0),
        vec2(SHADOW_RADII.x + pose.bob * 1.5, SHADOW_RADII.y),
        SHADOW,
    );

    let body = translate(anchor + vec2(pose.shimmy, pose.bob)) * rotate_deg(pose.shimmy * BODY_LEAN);
    list.group(body, |list| {
        list.fill_rounded_rect(-BODY_SIZE * 0.5, BODY_SIZE, BODY_RADIUS, FUR);
        list.fill_ellipse(vec2(5.0, 28.0), vec2(92.0, 44.0), FUR_LIGHT);

        for leg in &LEGS {
            let lift = if leg.lead {
                pose.foot_tap
            } else {
                pose.foot_tap * 0.4
            };
            list.group(translate(vec2(leg.x, HIP_Y)), |list| draw_leg(list, lift));
        }

        list.group(translate(NECK) * rotate_deg(pose.head_tilt_deg), |list| {
            draw_head(list, pose.ear_wiggle_deg);
        });
    });
}

/// Thigh is fixed at the hip; shin and toe rise with `lift`.
fn draw_leg(list: &mut DrawList, lift: f32) {
    list.fill_rounded_rect(vec2(-20.0, -8.0), vec2(40.0, 44.0), 18.0, FUR);
    list.fill_rounded_rect(vec2(-15.0, 26.0 - lift), vec2(30.0, 38.0), 13.0, FUR_DARK);
    list.fill_ellipse(vec2(6.0, 66.0 - lift), vec2(19.0, 8.0), INK);
}

fn draw_head(list: &mut DrawList, ear_wiggle_deg: f32) {
    list.fill_rounded_rect(vec2(-58.0, -52.0), vec2(130.0, 104.0), 48.0, FUR);

    // snout
    list.fill_rounded_rect(vec2(28.0, -26.0), vec2(74.0, 62.0), 30.0, SNOUT);
    // nose
    list.fill_ellipse(vec2(90.0, -12.0), vec2(10.0, 7.0), INK);
    // mouth
    list.stroke_path(
        vec![
            PathEl::MoveTo(vec2(72.0, 18.0)),
            PathEl::QuadTo(vec2(84.0, 28.0), vec2(96.0, 16.0)),
        ],
        3.0,
        INK,
    );
    // eye + highlight
    list.fill_ellipse(vec2(18.0, -16.0), vec2(7.0, 8.5), INK);
    list.fill_ellipse(vec2(20.5, -19.0), vec2(2.4, 2.4), Rgba::WHITE);

    list.group(translate(EAR_PIVOT) * rotate_deg(ear_wiggle_deg), |list| {
        list.fill_ellipse(vec2(0.0, -6.0), vec2(15.0, 11.0), FUR_DARK);
        list.fill_ellipse(vec2(0.0, -5.0), vec2(8.0, 6.0), EAR_INNER);
    });

    list.fill_ellipse(vec2(42.0, 12.0), vec2(13.0, 7.0), BLUSH);
}
