//! RGBA colour used for clear colours and vertex colour helpers.
//!
//! Stored as four `f32` values in linear light (0.0 – 1.0).

/// Linear-space RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self::DARK_BLUE
    }
}

impl Color {
    /// Opaque colour from red, green, blue components.
    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Colour from all four components.
    #[inline]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Returns `[r, g, b, a]`.
    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Returns `[r, g, b]`, the layout of a colour attribute stream.
    #[inline]
    pub fn to_rgb_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    // ── Constants ───────────────────────────────────────────────────────────

    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Self = Self::rgb(0.0, 0.0, 1.0);
    /// Background of every playground window.  Alpha is zero, as in the
    /// tutorial's clear colour.
    pub const DARK_BLUE: Self = Self::rgba(0.0, 0.0, 0.4, 0.0);
}

impl From<[f32; 4]> for Color {
    fn from(a: [f32; 4]) -> Self {
        Self::rgba(a[0], a[1], a[2], a[3])
    }
}

impl From<[f32; 3]> for Color {
    fn from(a: [f32; 3]) -> Self {
        Self::rgb(a[0], a[1], a[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_tutorial_background() {
        assert_eq!(Color::default().to_array(), [0.0, 0.0, 0.4, 0.0]);
    }

    #[test]
    fn rgb_is_opaque() {
        let c = Color::from([0.2, 0.4, 0.6]);
        assert_eq!(c.a, 1.0);
        assert_eq!(c.to_rgb_array(), [0.2, 0.4, 0.6]);
    }
}
