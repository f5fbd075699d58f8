//! Model / view / projection math.
//!
//! Matrices are `glam::Mat4`, column-major, and vectors are column vectors
//! (`M * v`), which is the layout the WGSL uniform block expects.  The
//! projection and view are fixed for a run; only the model matrix changes
//! per frame, derived from the clock's angle.

use glam::{Mat4, Vec3, Vec4};

/// Direction of a spinning body around the world Y axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Spin {
    /// Row form `[c 0 s; 0 1 0; -s 0 c]`.  Maps `+X` towards `-Z`.
    Forward,
    /// Same matrix with negated off-diagonal terms: `[c 0 -s; 0 1 0; s 0 c]`.
    Reverse,
}

/// Rotation about Y by `angle` radians.
///
/// Built from explicit columns rather than `Mat4::from_rotation_y` so the sign
/// convention of each variant stays visible in one place.
pub fn compute_model(angle: f32, spin: Spin) -> Mat4 {
    let (s, c) = angle.sin_cos();
    let s = match spin {
        Spin::Forward => s,
        Spin::Reverse => -s,
    };
    Mat4::from_cols(
        Vec4::new(c, 0.0, -s, 0.0),
        Vec4::Y,
        Vec4::new(s, 0.0, c, 0.0),
        Vec4::W,
    )
}

/// `projection * (view * model)`.
#[inline]
pub fn compute_mvp(projection: &Mat4, view: &Mat4, model: &Mat4) -> Mat4 {
    *projection * (*view * *model)
}

/// Fixed camera of a run: perspective projection plus a look-at view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    // --- view parameters --------------------------------------------------
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    // --- projection parameters --------------------------------------------
    /// Vertical field of view in radians.
    pub fovy: f32,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for Camera {
    /// Eye at `(4, 3, 3)` looking at the origin, 45° FOV, 4:3, `0.1..100`.
    fn default() -> Self {
        Self {
            eye: Vec3::new(4.0, 3.0, 3.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fovy: 45.0f32.to_radians(),
            aspect: 4.0 / 3.0,
            znear: 0.1,
            zfar: 100.0,
        }
    }
}

impl Camera {
    /// Same camera with the aspect ratio of a `width x height` surface.
    /// A zero height keeps the current aspect.
    pub fn with_surface_size(mut self, width: u32, height: u32) -> Self {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
        self
    }

    /// Right-handed perspective with a `[0, 1]` depth range.
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy, self.aspect, self.znear, self.zfar)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    const EPS: f32 = 1e-5;

    #[test]
    fn zero_angle_is_identity() {
        for spin in [Spin::Forward, Spin::Reverse] {
            assert!(compute_model(0.0, spin).abs_diff_eq(Mat4::IDENTITY, 1e-7));
        }
    }

    #[test]
    fn quarter_turn_maps_x_axis() {
        let p = compute_model(FRAC_PI_2, Spin::Forward).transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), EPS), "{p:?}");

        let p = compute_model(FRAC_PI_2, Spin::Reverse).transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(0.0, 0.0, 1.0), EPS), "{p:?}");
    }

    #[test]
    fn forward_matches_row_layout() {
        let a = 0.7f32;
        let (s, c) = a.sin_cos();
        let m = compute_model(a, Spin::Forward);
        // row 0 = [c, 0, s, 0], row 2 = [-s, 0, c, 0]
        assert_eq!(m.row(0), Vec4::new(c, 0.0, s, 0.0));
        assert_eq!(m.row(2), Vec4::new(-s, 0.0, c, 0.0));

        let r = compute_model(a, Spin::Reverse);
        assert_eq!(r.row(0), Vec4::new(c, 0.0, -s, 0.0));
        assert_eq!(r.row(2), Vec4::new(s, 0.0, c, 0.0));
    }

    #[test]
    fn forward_agrees_with_glam_rotation() {
        for i in 0..16 {
            let a = i as f32 * PI / 8.0;
            assert!(compute_model(a, Spin::Forward).abs_diff_eq(Mat4::from_rotation_y(a), 1e-6));
            assert!(compute_model(a, Spin::Reverse).abs_diff_eq(Mat4::from_rotation_y(-a), 1e-6));
        }
    }

    #[test]
    fn rotation_preserves_length() {
        let vectors = [
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(-4.5, 0.25, 8.0),
            Vec3::new(0.0, -1.0, 0.0),
        ];
        for i in 0..32 {
            let a = i as f32 * 0.37 - 5.0;
            for spin in [Spin::Forward, Spin::Reverse] {
                let m = compute_model(a, spin);
                for v in vectors {
                    let len = m.transform_vector3(v).length();
                    assert!((len - v.length()).abs() < 1e-4);
                }
            }
        }
    }

    #[test]
    fn mvp_with_identity_model_is_projection_times_view() {
        let cam = Camera::default();
        let (p, v) = (cam.projection(), cam.view());
        assert!(compute_mvp(&p, &v, &Mat4::IDENTITY).abs_diff_eq(p * v, 1e-6));
    }

    #[test]
    fn mvp_applies_model_first() {
        let cam = Camera::default();
        let (p, v) = (cam.projection(), cam.view());
        let m = compute_model(1.0, Spin::Forward);
        let point = Vec3::new(1.0, -1.0, 0.5);
        let lhs = compute_mvp(&p, &v, &m) * point.extend(1.0);
        let rhs = p * (v * (m * point.extend(1.0)));
        assert!(lhs.abs_diff_eq(rhs, 1e-4));
    }

    #[test]
    fn surface_size_sets_aspect() {
        let cam = Camera::default().with_surface_size(1024, 768);
        assert!((cam.aspect - 4.0 / 3.0).abs() < 1e-6);
        let same = cam.with_surface_size(10, 0);
        assert_eq!(same.aspect, cam.aspect);
    }
}
