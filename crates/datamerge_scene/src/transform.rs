//! 2D affine transforms relative to a node's parent
//!
//! A transform is stored as the 2x3 matrix `[[a, c, tx], [b, d, ty]]` mapping a
//! local point `(x, y)` to `(a*x + c*y + tx, b*x + d*y + ty)` in parent space.
//! The y axis points down, so a positive rotation turns the node
//! counter-clockwise on screen.

use glam::{DAffine2, DMat2, DVec2};
use serde::{Deserialize, Serialize};

/// Parent-relative 2D transform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transform2D(pub [[f64; 3]; 2]);

impl Transform2D {
    /// Identity transform
    pub const IDENTITY: Self = Self([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);

    /// Create from translation only
    pub fn from_translation(x: f64, y: f64) -> Self {
        Self([[1.0, 0.0, x], [0.0, 1.0, y]])
    }

    /// Convert to a glam affine
    pub fn to_affine(&self) -> DAffine2 {
        let [[a, c, tx], [b, d, ty]] = self.0;
        DAffine2::from_cols(DVec2::new(a, b), DVec2::new(c, d), DVec2::new(tx, ty))
    }

    /// Build from a glam affine
    pub fn from_affine(affine: DAffine2) -> Self {
        let x_axis = affine.matrix2.x_axis;
        let y_axis = affine.matrix2.y_axis;
        let t = affine.translation;
        Self([[x_axis.x, y_axis.x, t.x], [x_axis.y, y_axis.y, t.y]])
    }

    /// Translation component (the node's x/y)
    pub fn translation(&self) -> DVec2 {
        DVec2::new(self.0[0][2], self.0[1][2])
    }

    /// Replace the translation component
    pub fn set_translation(&mut self, x: f64, y: f64) {
        self.0[0][2] = x;
        self.0[1][2] = y;
    }

    /// Move along the node's own axes
    pub fn translate_local(&mut self, dx: f64, dy: f64) {
        let affine = self.to_affine();
        let offset = affine.transform_vector2(DVec2::new(dx, dy));
        self.set_translation(affine.translation.x + offset.x, affine.translation.y + offset.y);
    }

    /// Rotation in degrees
    pub fn rotation_degrees(&self) -> f64 {
        let [[a, _, _], [b, _, _]] = self.0;
        (-b).atan2(a).to_degrees()
    }

    /// Map a local point into parent space
    pub fn transform_point(&self, point: DVec2) -> DVec2 {
        self.to_affine().transform_point2(point)
    }

    /// Return a transform with absolute rotation `degrees` that keeps the
    /// local point `pivot` fixed in parent space
    ///
    /// Any scale or skew in the current transform is discarded.
    pub fn rotated_about(&self, pivot: DVec2, degrees: f64) -> Self {
        let world_pivot = self.transform_point(pivot);
        let linear = DMat2::from_angle(-degrees.to_radians());
        let translation = world_pivot - linear * pivot;
        Self::from_affine(DAffine2::from_mat2_translation(linear, translation))
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn close(a: DVec2, b: DVec2) -> bool {
        (a - b).length() < EPS
    }

    #[test]
    fn test_affine_round_trip_keeps_layout() {
        let t = Transform2D([[0.5, -0.25, 10.0], [0.25, 0.5, 20.0]]);
        assert_eq!(Transform2D::from_affine(t.to_affine()), t);
    }

    #[test]
    fn test_rotation_about_origin() {
        let t = Transform2D::from_translation(10.0, 20.0).rotated_about(DVec2::ZERO, 90.0);
        assert!((t.rotation_degrees() - 90.0).abs() < EPS);
        assert!(close(t.translation(), DVec2::new(10.0, 20.0)));
    }

    #[test]
    fn test_rotation_keeps_pivot_fixed() {
        let t = Transform2D::from_translation(0.0, 0.0);
        let pivot = DVec2::new(100.0, 0.0);
        let rotated = t.rotated_about(pivot, 90.0);

        assert!(close(rotated.transform_point(pivot), DVec2::new(100.0, 0.0)));
        assert!(close(rotated.translation(), DVec2::new(100.0, 100.0)));
    }

    #[test]
    fn test_rotation_is_absolute() {
        let once = Transform2D::IDENTITY.rotated_about(DVec2::new(5.0, 5.0), 30.0);
        let twice = once.rotated_about(DVec2::new(5.0, 5.0), 30.0);
        assert!((twice.rotation_degrees() - 30.0).abs() < EPS);
        assert!(close(once.translation(), twice.translation()));
    }

    #[test]
    fn test_translate_local_follows_rotation() {
        let mut t = Transform2D::IDENTITY.rotated_about(DVec2::ZERO, 90.0);
        t.translate_local(10.0, 0.0);
        assert!(close(t.translation(), DVec2::new(0.0, -10.0)));
    }
}
