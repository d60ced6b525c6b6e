pub mod color;

pub use color::Rgba;

use glam::{Affine2, Vec2};

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

/// One element of a path outline, in local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathEl {
    MoveTo(Vec2),
    LineTo(Vec2),
    /// Quadratic curve: control point, end point.
    QuadTo(Vec2, Vec2),
    /// Cubic curve: two control points, end point.
    CubicTo(Vec2, Vec2, Vec2),
    Close,
}

/// Geometry of a single draw call, in the local space of its transform.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Rect { min: Vec2, size: Vec2 },
    RoundedRect { min: Vec2, size: Vec2, radius: f32 },
    Ellipse { center: Vec2, radii: Vec2 },
    Path(Vec<PathEl>),
    Line { from: Vec2, to: Vec2 },
}

/// How a primitive is colored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    Fill(Rgba),
    Stroke { color: Rgba, width: f32 },
    /// Top edge to bottom edge of the primitive's local bounds.
    VerticalGradient { top: Rgba, bottom: Rgba },
    /// Center of the primitive's local bounds out to its edge.
    RadialGradient { inner: Rgba, outer: Rgba },
}

/// A primitive, its paint, and the world transform it was emitted under.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCmd {
    pub primitive: Primitive,
    pub paint: Paint,
    pub transform: Affine2,
}

// ---------------------------------------------------------------------------
// Draw list
// ---------------------------------------------------------------------------

/// Ordered back-to-front list of draw calls with an explicit transform stack.
///
/// `push` composes a local transform onto the current one, primitives are
/// recorded in local space along with the composed transform, and `pop`
/// restores the previous transform. No graphics-context state is involved:
/// the list is plain data handed to the tessellator once per frame.
pub struct DrawList {
    cmds: Vec<DrawCmd>,
    current: Affine2,
    saved: Vec<Affine2>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            cmds: Vec::with_capacity(cap),
            current: Affine2::IDENTITY,
            saved: Vec::with_capacity(8),
        }
    }

    /// Drop all commands and reset the transform stack. Keeps allocations.
    pub fn clear(&mut self) {
        self.cmds.clear();
        self.saved.clear();
        self.current = Affine2::IDENTITY;
    }

    /// Current composed transform.
    #[cfg(test)]
    pub fn transform(&self) -> Affine2 {
        self.current
    }

    /// Number of transforms pushed and not yet popped.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn push(&mut self, local: Affine2) {
        self.saved.push(self.current);
        self.current = self.current * local;
    }

    pub fn pop(&mut self) {
        match self.saved.pop() {
            Some(prev) => self.current = prev,
            None => log::debug!("DrawList::pop on empty transform stack ignored"),
        }
    }

    /// Run `f` with `local` pushed, popping afterwards.
    pub fn group<R>(&mut self, local: Affine2, f: impl FnOnce(&mut Self) -> R) -> R {
        self.push(local);
        let out = f(self);
        self.pop();
        out
    }

    pub fn draw(&mut self, primitive: Primitive, paint: Paint) {
        self.cmds.push(DrawCmd {
            primitive,
            paint,
            transform: self.current,
        });
    }

    pub fn commands(&self) -> &[DrawCmd] {
        &self.cmds
    }

    pub fn len(&self) -> usize {
        self.cmds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    // --- shorthand used by the scene ---

    pub fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, color: Rgba) {
        self.draw(Primitive::Ellipse { center, radii }, Paint::Fill(color));
    }

    pub fn fill_rounded_rect(&mut self, min: Vec2, size: Vec2, radius: f32, color: Rgba) {
        self.draw(
            Primitive::RoundedRect { min, size, radius },
            Paint::Fill(color),
        );
    }

    pub fn stroke_path(&mut self, path: Vec<PathEl>, width: f32, color: Rgba) {
        self.draw(Primitive::Path(path), Paint::Stroke { color, width });
    }

    pub fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba) {
        self.draw(Primitive::Line { from, to }, Paint::Stroke { color, width });
    }
}

impl Default for DrawList {
    fn default() -> Self {
        Self::new()
    }
}

/// Translation by `offset`.
pub fn translate(offset: Vec2) -> Affine2 {
    Affine2::from_translation(offset)
}

/// Rotation about the local origin, in degrees (clockwise on screen, y down).
pub fn rotate_deg(degrees: f32) -> Affine2 {
    Affine2::from_angle(degrees.to_radians())
}
