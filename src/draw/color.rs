/// sRGB color with straight alpha, packed as `0xRRGGBBAA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba(pub u32);

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba(0);
    pub const WHITE: Rgba = Rgba(0xFFFF_FFFF);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 0xFF)
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self((r as u32) << 24 | (g as u32) << 16 | (b as u32) << 8 | a as u32)
    }

    pub fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn a(self) -> u8 {
        self.0 as u8
    }

    /// Replace the alpha channel.
    pub fn with_alpha(self, a: u8) -> Self {
        Self((self.0 & 0xFFFF_FF00) | a as u32)
    }

    /// Scale the alpha channel by `factor` (clamped to 0..=1).
    pub fn fade(self, factor: f32) -> Self {
        let alpha = self.a() as f32 * factor.clamp(0.0, 1.0);
        self.with_alpha(alpha.round() as u8)
    }

    /// Linear-light, premultiplied RGBA for an sRGB render target.
    pub fn to_linear_premultiplied(self) -> [f32; 4] {
        let a = self.a() as f32 / 255.0;
        [
            srgb_to_linear(self.r()) * a,
            srgb_to_linear(self.g()) * a,
            srgb_to_linear(self.b()) * a,
            a,
        ]
    }

    /// Linear premultiplied clear color for the render pass.
    pub fn to_wgpu(self) -> wgpu::Color {
        let [r, g, b, a] = self.to_linear_premultiplied();
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: a as f64,
        }
    }
}

fn srgb_to_linear(c: u8) -> f32 {
    let c = c as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Component-wise lerp between two premultiplied colors.
pub fn lerp_premul(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    let t = t.clamp(0.0, 1.0);
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_channels() {
        let c = Rgba::rgba(0x12, 0x34, 0x56, 0x78);
        assert_eq!(c.0, 0x1234_5678);
        assert_eq!((c.r(), c.g(), c.b(), c.a()), (0x12, 0x34, 0x56, 0x78));
        assert_eq!(Rgba::rgb(1, 2, 3).a(), 0xFF);
    }

    #[test]
    fn fade_scales_only_alpha() {
        let c = Rgba::rgb(200, 100, 50).fade(0.5);
        assert_eq!((c.r(), c.g(), c.b()), (200, 100, 50));
        assert_eq!(c.a(), 128);
        assert_eq!(Rgba::WHITE.fade(-1.0).a(), 0);
        assert_eq!(Rgba::WHITE.fade(3.0).a(), 255);
    }

    #[test]
    fn premultiplied_extremes() {
        assert_eq!(Rgba::TRANSPARENT.to_linear_premultiplied(), [0.0; 4]);
        let white = Rgba::WHITE.to_linear_premultiplied();
        for ch in white {
            assert!((ch - 1.0).abs() < 1e-6);
        }
        // Premultiplied channels never exceed alpha.
        let half = Rgba::rgba(255, 128, 0, 128).to_linear_premultiplied();
        assert!(half[0] <= half[3] + 1e-6);
        assert!(half[1] < half[0]);
        assert_eq!(half[2], 0.0);
    }

    #[test]
    fn lerp_clamps_t() {
        let a = [0.0, 0.0, 0.0, 0.0];
        let b = [1.0, 1.0, 1.0, 1.0];
        assert_eq!(lerp_premul(a, b, 0.5), [0.5; 4]);
        assert_eq!(lerp_premul(a, b, 2.0), b);
    }
}
