use bytemuck::{Pod, Zeroable};
use glam::{Affine2, Vec2};

use crate::draw::color::lerp_premul;
use crate::draw::{DrawCmd, DrawList, Paint, PathEl, Primitive};

/// Per-vertex data for the shape pipeline.
/// Stride = 24 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ShapeVertex {
    /// Window position in physical pixels.
    pub position: [f32; 2],
    /// Linear, premultiplied RGBA.
    pub color: [f32; 4],
}

/// Maximum number of vertices uploaded per frame.
pub const MAX_VERTICES: usize = 1 << 17;

const ELLIPSE_SEGMENTS: usize = 48;
const CORNER_SEGMENTS: usize = 8;
const CURVE_SEGMENTS: usize = 16;
/// Below this, points are considered coincident.
const EPSILON: f32 = 1e-4;

/// Local-space axis-aligned bounds used to evaluate gradients.
#[derive(Debug, Clone, Copy)]
struct Bounds {
    min: Vec2,
    max: Vec2,
}

impl Bounds {
    fn from_min_size(min: Vec2, size: Vec2) -> Self {
        Self { min, max: min + size }
    }

    fn from_points(points: &[Vec2]) -> Self {
        let mut min = Vec2::splat(f32::MAX);
        let mut max = Vec2::splat(f32::MIN);
        for &p in points {
            min = min.min(p);
            max = max.max(p);
        }
        Self { min, max }
    }

    fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }
}

/// One flattened subpath.
#[derive(Debug, Clone, Default)]
struct Polyline {
    points: Vec<Vec2>,
    closed: bool,
}

/// Turns a draw list into a flat triangle list. Buffers are reused across frames.
pub struct Tessellator {
    vertices: Vec<ShapeVertex>,
    outline: Vec<Vec2>,
    polylines: Vec<Polyline>,
    triangles: Vec<[usize; 3]>,
    /// Stroke points in window space.
    stroke_points: Vec<Vec2>,
    truncated: bool,
}

impl Tessellator {
    pub fn new() -> Self {
        Self {
            vertices: Vec::with_capacity(MAX_VERTICES / 4),
            outline: Vec::with_capacity(ELLIPSE_SEGMENTS + 1),
            polylines: Vec::new(),
            triangles: Vec::new(),
            stroke_points: Vec::with_capacity(ELLIPSE_SEGMENTS + 1),
            truncated: false,
        }
    }

    pub fn vertices(&self) -> &[ShapeVertex] {
        &self.vertices
    }

    /// Whether the last call dropped geometry at `MAX_VERTICES`.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Tessellate every command in order. Earlier commands end up earlier in
    /// the buffer, so painter's order is preserved without depth testing.
    pub fn tessellate(&mut self, list: &DrawList) -> &[ShapeVertex] {
        let was_truncated = self.truncated;
        self.vertices.clear();
        self.truncated = false;

        for cmd in list.commands() {
            self.command(cmd);
        }

        if self.truncated && !was_truncated {
            log::warn!("Vertex budget of {MAX_VERTICES} exceeded, frame truncated");
        }
        &self.vertices
    }

    fn command(&mut self, cmd: &DrawCmd) {
        let xf = cmd.transform;
        match &cmd.primitive {
            Primitive::Rect { min, size } => {
                self.outline.clear();
                self.outline.extend_from_slice(&[
                    *min,
                    *min + Vec2::new(size.x, 0.0),
                    *min + *size,
                    *min + Vec2::new(0.0, size.y),
                ]);
                self.shape(cmd.paint, Bounds::from_min_size(*min, *size), xf);
            }
            Primitive::RoundedRect { min, size, radius } => {
                self.outline.clear();
                rounded_rect_outline(*min, *size, *radius, &mut self.outline);
                self.shape(cmd.paint, Bounds::from_min_size(*min, *size), xf);
            }
            Primitive::Ellipse { center, radii } => {
                self.outline.clear();
                ellipse_outline(*center, *radii, &mut self.outline);
                let bounds = Bounds {
                    min: *center - radii.abs(),
                    max: *center + radii.abs(),
                };
                self.shape(cmd.paint, bounds, xf);
            }
            Primitive::Path(els) => {
                let mut polylines = std::mem::take(&mut self.polylines);
                flatten(els, &mut polylines);
                for line in &polylines {
                    match cmd.paint {
                        Paint::Stroke { color, width } => {
                            let c = color.to_linear_premultiplied();
                            self.stroke(&line.points, line.closed, width, c, xf);
                        }
                        paint => self.fill_polygon(&line.points, paint, xf),
                    }
                }
                self.polylines = polylines;
            }
            Primitive::Line { from, to } => {
                let (color, width) = match cmd.paint {
                    Paint::Stroke { color, width } => (color, width),
                    Paint::Fill(color) => (color, 1.0),
                    Paint::VerticalGradient { top, .. } => (top, 1.0),
                    Paint::RadialGradient { inner, .. } => (inner, 1.0),
                };
                let c = color.to_linear_premultiplied();
                self.stroke(&[*from, *to], false, width, c, xf);
            }
        }
    }

    /// Fill or stroke the convex outline currently in `self.outline`.
    fn shape(&mut self, paint: Paint, bounds: Bounds, xf: Affine2) {
        let outline = std::mem::take(&mut self.outline);
        match paint {
            Paint::Stroke { color, width } => {
                let c = color.to_linear_premultiplied();
                self.stroke(&outline, true, width, c, xf);
            }
            _ => self.fill_convex(&outline, paint, bounds, xf),
        }
        self.outline = outline;
    }

    /// Triangle fan from the bounds center. Outline must be convex.
    fn fill_convex(&mut self, outline: &[Vec2], paint: Paint, bounds: Bounds, xf: Affine2) {
        if outline.len() < 3 {
            return;
        }
        let center = bounds.center();
        let c_color = shade(paint, center, bounds);
        let c_pos = xf.transform_point2(center);

        for i in 0..outline.len() {
            let a = outline[i];
            let b = outline[(i + 1) % outline.len()];
            let ok = self.push_triangle([
                (c_pos, c_color),
                (xf.transform_point2(a), shade(paint, a, bounds)),
                (xf.transform_point2(b), shade(paint, b, bounds)),
            ]);
            if !ok {
                return;
            }
        }
    }

    /// Ear-clipped fill of an arbitrary simple polygon.
    fn fill_polygon(&mut self, points: &[Vec2], paint: Paint, xf: Affine2) {
        let mut triangles = std::mem::take(&mut self.triangles);
        triangles.clear();
        triangulate(points, &mut triangles);

        let bounds = Bounds::from_points(points);
        for &[a, b, c] in &triangles {
            let ok = self.push_triangle([
                (xf.transform_point2(points[a]), shade(paint, points[a], bounds)),
                (xf.transform_point2(points[b]), shade(paint, points[b], bounds)),
                (xf.transform_point2(points[c]), shade(paint, points[c], bounds)),
            ]);
            if !ok {
                break;
            }
        }
        self.triangles = triangles;
    }

    /// One quad per segment, extended by half the width at both ends so
    /// consecutive segments overlap at joints.
    fn stroke(&mut self, points: &[Vec2], closed: bool, width: f32, color: [f32; 4], xf: Affine2) {
        if points.len() < 2 || width <= 0.0 {
            return;
        }
        let half = 0.5 * width * xf.matrix2.determinant().abs().sqrt();
        let mut world = std::mem::take(&mut self.stroke_points);
        world.clear();
        world.extend(points.iter().map(|&p| xf.transform_point2(p)));

        let segments = if closed { world.len() } else { world.len() - 1 };
        for i in 0..segments {
            let a = world[i];
            let b = world[(i + 1) % world.len()];
            let delta = b - a;
            let len = delta.length();
            if len < EPSILON {
                continue;
            }
            let dir = delta / len;
            let normal = Vec2::new(-dir.y, dir.x) * half;
            let (a, b) = (a - dir * half, b + dir * half);

            let p0 = a + normal;
            let p1 = b + normal;
            let p2 = b - normal;
            let p3 = a - normal;
            if !self.push_triangle([(p0, color), (p1, color), (p2, color)])
                || !self.push_triangle([(p0, color), (p2, color), (p3, color)])
            {
                break;
            }
        }
        self.stroke_points = world;
    }

    /// Append a whole triangle, or nothing if it would exceed the budget.
    fn push_triangle(&mut self, tri: [(Vec2, [f32; 4]); 3]) -> bool {
        if self.vertices.len() + 3 > MAX_VERTICES {
            self.truncated = true;
            return false;
        }
        for (pos, color) in tri {
            self.vertices.push(ShapeVertex {
                position: pos.into(),
                color,
            });
        }
        true
    }
}

impl Default for Tessellator {
    fn default() -> Self {
        Self::new()
    }
}

/// Color of `paint` at local point `p`.
fn shade(paint: Paint, p: Vec2, bounds: Bounds) -> [f32; 4] {
    match paint {
        Paint::Fill(c) | Paint::Stroke { color: c, .. } => c.to_linear_premultiplied(),
        Paint::VerticalGradient { top, bottom } => {
            let h = bounds.max.y - bounds.min.y;
            let t = if h > EPSILON { (p.y - bounds.min.y) / h } else { 0.0 };
            lerp_premul(top.to_linear_premultiplied(), bottom.to_linear_premultiplied(), t)
        }
        Paint::RadialGradient { inner, outer } => {
            let half = (bounds.max - bounds.min) * 0.5;
            let d = if half.x > EPSILON && half.y > EPSILON {
                ((p - bounds.center()) / half).length()
            } else {
                1.0
            };
            lerp_premul(inner.to_linear_premultiplied(), outer.to_linear_premultiplied(), d)
        }
    }
}

fn ellipse_outline(center: Vec2, radii: Vec2, out: &mut Vec<Vec2>) {
    for i in 0..ELLIPSE_SEGMENTS {
        let theta = i as f32 / ELLIPSE_SEGMENTS as f32 * std::f32::consts::TAU;
        out.push(center + radii * Vec2::new(theta.cos(), theta.sin()));
    }
}

/// Clockwise (on screen) outline, radius clamped to half the shorter side.
fn rounded_rect_outline(min: Vec2, size: Vec2, radius: f32, out: &mut Vec<Vec2>) {
    let size = size.abs();
    let r = radius.max(0.0).min(size.x * 0.5).min(size.y * 0.5);
    let max = min + size;
    if r < EPSILON {
        out.extend_from_slice(&[min, Vec2::new(max.x, min.y), max, Vec2::new(min.x, max.y)]);
        return;
    }

    use std::f32::consts::{FRAC_PI_2, PI};
    // (corner center, start angle) going around: top-right, bottom-right,
    // bottom-left, top-left.
    let corners = [
        (Vec2::new(max.x - r, min.y + r), -FRAC_PI_2),
        (Vec2::new(max.x - r, max.y - r), 0.0),
        (Vec2::new(min.x + r, max.y - r), FRAC_PI_2),
        (Vec2::new(min.x + r, min.y + r), PI),
    ];
    for (center, start) in corners {
        for i in 0..=CORNER_SEGMENTS {
            let theta = start + FRAC_PI_2 * i as f32 / CORNER_SEGMENTS as f32;
            let p = center + r * Vec2::new(theta.cos(), theta.sin());
            // Arcs of a full-radius side share an endpoint with the next arc.
            if out.last().map_or(true, |last| last.distance(p) > EPSILON) {
                out.push(p);
            }
        }
    }
    if out.len() > 1 && out[0].distance(out[out.len() - 1]) <= EPSILON {
        out.pop();
    }
}

/// Flatten path elements into polylines, one per subpath.
fn flatten(els: &[PathEl], out: &mut Vec<Polyline>) {
    out.clear();
    let mut current = Polyline::default();
    let mut pen = Vec2::ZERO;
    let mut start = Vec2::ZERO;

    fn finish(line: &mut Polyline, out: &mut Vec<Polyline>) {
        if line.points.len() >= 2 {
            out.push(std::mem::take(line));
        } else {
            line.points.clear();
            line.closed = false;
        }
    }

    for el in els {
        match *el {
            PathEl::MoveTo(p) => {
                finish(&mut current, out);
                current.points.push(p);
                pen = p;
                start = p;
            }
            PathEl::LineTo(p) => {
                push_point(&mut current.points, pen, p);
                pen = p;
            }
            PathEl::QuadTo(c, p) => {
                for i in 1..=CURVE_SEGMENTS {
                    let t = i as f32 / CURVE_SEGMENTS as f32;
                    let mt = 1.0 - t;
                    let q = pen * (mt * mt) + c * (2.0 * mt * t) + p * (t * t);
                    push_point(&mut current.points, pen, q);
                }
                pen = p;
            }
            PathEl::CubicTo(c1, c2, p) => {
                for i in 1..=CURVE_SEGMENTS {
                    let t = i as f32 / CURVE_SEGMENTS as f32;
                    let mt = 1.0 - t;
                    let q = pen * (mt * mt * mt)
                        + c1 * (3.0 * mt * mt * t)
                        + c2 * (3.0 * mt * t * t)
                        + p * (t * t * t);
                    push_point(&mut current.points, pen, q);
                }
                pen = p;
            }
            PathEl::Close => {
                if current.points.len() > 1
                    && current.points[0].distance(current.points[current.points.len() - 1])
                        <= EPSILON
                {
                    current.points.pop();
                }
                current.closed = true;
                finish(&mut current, out);
                pen = start;
            }
        }
    }
    finish(&mut current, out);
}

/// Append `p`, seeding with the pen position for paths without a MoveTo
/// and skipping duplicates.
fn push_point(points: &mut Vec<Vec2>, pen: Vec2, p: Vec2) {
    if points.is_empty() {
        points.push(pen);
    }
    if points.last().map_or(true, |last| last.distance(p) > EPSILON) {
        points.push(p);
    }
}

/// Twice the signed area; positive for counter-clockwise in y-up terms.
fn signed_area2(points: &[Vec2]) -> f32 {
    let n = points.len();
    (0..n)
        .map(|i| points[i].perp_dot(points[(i + 1) % n]))
        .sum()
}

/// Ear clipping for simple polygons. Emits index triples into `out`.
/// Degenerate or self-intersecting input may produce fewer triangles.
fn triangulate(points: &[Vec2], out: &mut Vec<[usize; 3]>) {
    let n = points.len();
    if n < 3 {
        return;
    }
    let area = signed_area2(points);
    if area.abs() < EPSILON {
        return;
    }
    let orientation = area.signum();
    let mut idx: Vec<usize> = (0..n).collect();

    while idx.len() > 3 {
        let m = idx.len();
        let ear = (0..m).find(|&i| {
            let (a, b, c) = (idx[(i + m - 1) % m], idx[i], idx[(i + 1) % m]);
            let (pa, pb, pc) = (points[a], points[b], points[c]);
            // Convex corner relative to the polygon's winding.
            if (pb - pa).perp_dot(pc - pb) * orientation <= EPSILON {
                return false;
            }
            !idx.iter()
                .filter(|&&j| j != a && j != b && j != c)
                .any(|&j| point_in_triangle(points[j], pa, pb, pc))
        });

        match ear {
            Some(i) => {
                out.push([idx[(i + m - 1) % m], idx[i], idx[(i + 1) % m]]);
                idx.remove(i);
            }
            None => {
                log::debug!("Ear clipping stalled with {} vertices left", idx.len());
                return;
            }
        }
    }
    out.push([idx[0], idx[1], idx[2]]);
}

fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let d1 = (b - a).perp_dot(p - a);
    let d2 = (c - b).perp_dot(p - b);
    let d3 = (a - c).perp_dot(p - c);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}
