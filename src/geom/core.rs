//! Core linear algebra for the geometry layer: vectors, points, affine
//! transforms and tolerance configuration.

use std::ops::{Add, Div, Mul, Neg, Sub};

// ─────────────────────────────────────────────────────────────────────────────
// Vec3
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// Zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    /// Unit vector along the X axis.
    pub const X: Self = Self::new(1.0, 0.0, 0.0);
    /// Unit vector along the Y axis.
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);
    /// Unit vector along the Z axis.
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub const fn from_array(arr: [f64; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }

    #[must_use]
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    #[must_use]
    pub const fn length_squared(self) -> f64 {
        self.dot(self)
    }

    #[must_use]
    pub const fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[must_use]
    pub const fn cross(self, rhs: Self) -> Self {
        Self {
            x: self.y * rhs.z - self.z * rhs.y,
            y: self.z * rhs.x - self.x * rhs.z,
            z: self.x * rhs.y - self.y * rhs.x,
        }
    }

    /// Returns `None` for zero-length or non-finite vectors.
    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        if len.is_finite() && len > 0.0 {
            Some(Self::new(self.x / len, self.y / len, self.z / len))
        } else {
            None
        }
    }

    /// Linear interpolation: `self * (1 - t) + rhs * t`.
    #[must_use]
    pub fn lerp(self, rhs: Self, t: f64) -> Self {
        Self::new(
            self.x + (rhs.x - self.x) * t,
            self.y + (rhs.y - self.y) * t,
            self.z + (rhs.z - self.z) * t,
        )
    }

    #[must_use]
    pub const fn mul_scalar(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        self.mul_scalar(rhs)
    }
}

impl Mul<Vec3> for f64 {
    type Output = Vec3;
    fn mul(self, rhs: Vec3) -> Self::Output {
        rhs.mul_scalar(self)
    }
}

impl Div<f64> for Vec3 {
    type Output = Self;
    fn div(self, rhs: f64) -> Self::Output {
        Self::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y, -self.z)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Point3
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    /// The origin.
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub const fn from_array(arr: [f64; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }

    #[must_use]
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    #[must_use]
    pub const fn to_vec(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    #[must_use]
    pub const fn add_vec(self, v: Vec3) -> Self {
        Self::new(self.x + v.x, self.y + v.y, self.z + v.z)
    }

    #[must_use]
    pub const fn sub_point(self, rhs: Self) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }

    #[must_use]
    pub fn distance(self, rhs: Self) -> f64 {
        self.sub_point(rhs).length()
    }

    #[must_use]
    pub fn distance_squared(self, rhs: Self) -> f64 {
        self.sub_point(rhs).length_squared()
    }

    /// Linear interpolation between two points.
    #[must_use]
    pub fn lerp(self, rhs: Self, t: f64) -> Self {
        Self::new(
            self.x + (rhs.x - self.x) * t,
            self.y + (rhs.y - self.y) * t,
            self.z + (rhs.z - self.z) * t,
        )
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Default for Point3 {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl From<[f64; 3]> for Point3 {
    fn from(arr: [f64; 3]) -> Self {
        Self::from_array(arr)
    }
}

impl From<Point3> for [f64; 3] {
    fn from(p: Point3) -> Self {
        p.to_array()
    }
}

impl Add<Vec3> for Point3 {
    type Output = Self;
    fn add(self, rhs: Vec3) -> Self::Output {
        self.add_vec(rhs)
    }
}

impl Sub<Vec3> for Point3 {
    type Output = Self;
    fn sub(self, rhs: Vec3) -> Self::Output {
        self.add_vec(-rhs)
    }
}

impl Sub for Point3 {
    type Output = Vec3;
    fn sub(self, rhs: Self) -> Self::Output {
        self.sub_point(rhs)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Transform
// ─────────────────────────────────────────────────────────────────────────────

/// Symmetry planes for mirrored geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorPlane {
    Xy,
    Xz,
    Yz,
}

/// A 4×4 affine transform in homogeneous coordinates, column-vector convention:
/// `world = M · local`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    m: [[f64; 4]; 4],
}

impl Transform {
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            m: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    #[must_use]
    pub const fn translate(offset: Vec3) -> Self {
        Self {
            m: [
                [1.0, 0.0, 0.0, offset.x],
                [0.0, 1.0, 0.0, offset.y],
                [0.0, 0.0, 1.0, offset.z],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    #[must_use]
    pub const fn scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            m: [
                [sx, 0.0, 0.0, 0.0],
                [0.0, sy, 0.0, 0.0],
                [0.0, 0.0, sz, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Rotation about the X axis, angle in radians.
    #[must_use]
    pub fn rotate_x(angle: f64) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        Self {
            m: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, c, -s, 0.0],
                [0.0, s, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Rotation about the Y axis, angle in radians.
    #[must_use]
    pub fn rotate_y(angle: f64) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        Self {
            m: [
                [c, 0.0, s, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [-s, 0.0, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Rotation about the Z axis, angle in radians.
    #[must_use]
    pub fn rotate_z(angle: f64) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        Self {
            m: [
                [c, -s, 0.0, 0.0],
                [s, c, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Reflection through one of the principal planes.
    #[must_use]
    pub const fn mirror(plane: MirrorPlane) -> Self {
        let (sx, sy, sz) = match plane {
            MirrorPlane::Xy => (1.0, 1.0, -1.0),
            MirrorPlane::Xz => (1.0, -1.0, 1.0),
            MirrorPlane::Yz => (-1.0, 1.0, 1.0),
        };
        Self::scale(sx, sy, sz)
    }

    /// Matrix product `self · other`: `other` is applied first when the result
    /// is applied to a point.
    #[must_use]
    pub fn compose(self, other: Self) -> Self {
        let mut result = Self::identity();
        for i in 0..4 {
            for j in 0..4 {
                result.m[i][j] = self.m[i][0] * other.m[0][j]
                    + self.m[i][1] * other.m[1][j]
                    + self.m[i][2] * other.m[2][j]
                    + self.m[i][3] * other.m[3][j];
            }
        }
        result
    }

    /// Inverse via the adjugate method. Returns `None` for singular matrices.
    #[must_use]
    pub fn inverse(self) -> Option<Self> {
        let m = &self.m;

        let s0 = m[0][0] * m[1][1] - m[1][0] * m[0][1];
        let s1 = m[0][0] * m[1][2] - m[1][0] * m[0][2];
        let s2 = m[0][0] * m[1][3] - m[1][0] * m[0][3];
        let s3 = m[0][1] * m[1][2] - m[1][1] * m[0][2];
        let s4 = m[0][1] * m[1][3] - m[1][1] * m[0][3];
        let s5 = m[0][2] * m[1][3] - m[1][2] * m[0][3];

        let c5 = m[2][2] * m[3][3] - m[3][2] * m[2][3];
        let c4 = m[2][1] * m[3][3] - m[3][1] * m[2][3];
        let c3 = m[2][1] * m[3][2] - m[3][1] * m[2][2];
        let c2 = m[2][0] * m[3][3] - m[3][0] * m[2][3];
        let c1 = m[2][0] * m[3][2] - m[3][0] * m[2][2];
        let c0 = m[2][0] * m[3][1] - m[3][0] * m[2][1];

        let det = s0 * c5 - s1 * c4 + s2 * c3 + s3 * c2 - s4 * c1 + s5 * c0;

        if !det.is_finite() || det.abs() < 1e-15 {
            return None;
        }

        let inv_det = 1.0 / det;

        Some(Self {
            m: [
                [
                    (m[1][1] * c5 - m[1][2] * c4 + m[1][3] * c3) * inv_det,
                    (-m[0][1] * c5 + m[0][2] * c4 - m[0][3] * c3) * inv_det,
                    (m[3][1] * s5 - m[3][2] * s4 + m[3][3] * s3) * inv_det,
                    (-m[2][1] * s5 + m[2][2] * s4 - m[2][3] * s3) * inv_det,
                ],
                [
                    (-m[1][0] * c5 + m[1][2] * c2 - m[1][3] * c1) * inv_det,
                    (m[0][0] * c5 - m[0][2] * c2 + m[0][3] * c1) * inv_det,
                    (-m[3][0] * s5 + m[3][2] * s2 - m[3][3] * s1) * inv_det,
                    (m[2][0] * s5 - m[2][2] * s2 + m[2][3] * s1) * inv_det,
                ],
                [
                    (m[1][0] * c4 - m[1][1] * c2 + m[1][3] * c0) * inv_det,
                    (-m[0][0] * c4 + m[0][1] * c2 - m[0][3] * c0) * inv_det,
                    (m[3][0] * s4 - m[3][1] * s2 + m[3][3] * s0) * inv_det,
                    (-m[2][0] * s4 + m[2][1] * s2 - m[2][3] * s0) * inv_det,
                ],
                [
                    (-m[1][0] * c3 + m[1][1] * c1 - m[1][2] * c0) * inv_det,
                    (m[0][0] * c3 - m[0][1] * c1 + m[0][2] * c0) * inv_det,
                    (-m[3][0] * s3 + m[3][1] * s1 - m[3][2] * s0) * inv_det,
                    (m[2][0] * s3 - m[2][1] * s1 + m[2][2] * s0) * inv_det,
                ],
            ],
        })
    }

    /// The translation column.
    #[must_use]
    pub fn translation(self) -> Vec3 {
        Vec3::new(self.m[0][3], self.m[1][3], self.m[2][3])
    }

    #[must_use]
    pub fn apply_point(self, p: Point3) -> Point3 {
        let x = self.m[0][0] * p.x + self.m[0][1] * p.y + self.m[0][2] * p.z + self.m[0][3];
        let y = self.m[1][0] * p.x + self.m[1][1] * p.y + self.m[1][2] * p.z + self.m[1][3];
        let z = self.m[2][0] * p.x + self.m[2][1] * p.y + self.m[2][2] * p.z + self.m[2][3];
        Point3::new(x, y, z)
    }

    /// Applies the linear part only (no translation).
    #[must_use]
    pub fn apply_vec(self, v: Vec3) -> Vec3 {
        let x = self.m[0][0] * v.x + self.m[0][1] * v.y + self.m[0][2] * v.z;
        let y = self.m[1][0] * v.x + self.m[1][1] * v.y + self.m[1][2] * v.z;
        let z = self.m[2][0] * v.x + self.m[2][1] * v.y + self.m[2][2] * v.z;
        Vec3::new(x, y, z)
    }

    #[must_use]
    pub const fn as_matrix(&self) -> &[[f64; 4]; 4] {
        &self.m
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Transform {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        self.compose(rhs)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// BBox
// ─────────────────────────────────────────────────────────────────────────────

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub min: Point3,
    pub max: Point3,
}

impl BBox {
    #[must_use]
    pub const fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing all points. `None` for an empty slice.
    #[must_use]
    pub fn from_points(points: &[Point3]) -> Option<Self> {
        let first = *points.first()?;
        let mut min = first;
        let mut max = first;
        for p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }
        Some(Self { min, max })
    }

    #[must_use]
    pub fn center(self) -> Point3 {
        self.min.lerp(self.max, 0.5)
    }

    #[must_use]
    pub fn diagonal(self) -> f64 {
        self.max.distance(self.min)
    }

    /// Box grown by `margin` on every side.
    #[must_use]
    pub fn expand(self, margin: f64) -> Self {
        let m = Vec3::new(margin, margin, margin);
        Self::new(self.min - m, self.max.add_vec(m))
    }

    #[must_use]
    pub fn contains_point(self, p: Point3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tolerance
// ─────────────────────────────────────────────────────────────────────────────

/// Tolerance configuration for geometric operations.
///
/// Standard instances:
/// - `Tolerance::DEFAULT` - general geometry comparisons (1e-9)
/// - `Tolerance::ZERO_LENGTH` - detecting degenerate/zero-length vectors (1e-12)
/// - `Tolerance::PARAM` - eta/xsi parameter comparisons and clamp warnings (1e-9)
/// - `Tolerance::DERIVATIVE` - finite-difference step size (1e-6)
/// - `Tolerance::PROJECTION` - point-inversion acceptance distance (1e-6)
/// - `Tolerance::WELD` - vertex welding during shape fusing (1e-9)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub eps: f64,
}

impl Tolerance {
    pub const DEFAULT: Self = Self::new(1e-9);
    pub const ZERO_LENGTH: Self = Self::new(1e-12);
    pub const PARAM: Self = Self::new(1e-9);
    pub const DERIVATIVE: Self = Self::new(1e-6);
    pub const PROJECTION: Self = Self::new(1e-6);
    pub const WELD: Self = Self::new(1e-9);

    #[must_use]
    pub const fn new(eps: f64) -> Self {
        Self { eps }
    }

    /// Step size relative to a span, keeping the absolute epsilon as a floor.
    #[must_use]
    pub fn relative_to(self, span: f64) -> f64 {
        (span.abs() * self.eps).max(self.eps)
    }

    #[must_use]
    pub fn approx_eq(self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.eps
    }

    #[must_use]
    pub fn approx_eq_point3(self, a: Point3, b: Point3) -> bool {
        self.approx_eq(a.x, b.x) && self.approx_eq(a.y, b.y) && self.approx_eq(a.z, b.z)
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_basics() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);

        assert_eq!(a + b, Vec3::new(5.0, 7.0, 9.0));
        assert_eq!(b - a, Vec3::new(3.0, 3.0, 3.0));
        assert_eq!(a * 2.0, Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(-a, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(Vec3::X.cross(Vec3::Y), Vec3::Z);
        assert!((Vec3::new(3.0, 4.0, 0.0).length() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_vec3_normalized_degenerate() {
        assert!(Vec3::ZERO.normalized().is_none());
        assert!(Vec3::new(f64::NAN, 0.0, 0.0).normalized().is_none());
        let n = Vec3::new(0.0, 0.0, 2.0).normalized().unwrap();
        assert_eq!(n, Vec3::Z);
    }

    #[test]
    fn test_point3_arithmetic() {
        let p = Point3::new(1.0, 2.0, 3.0);
        let q = Point3::new(4.0, 6.0, 3.0);

        assert_eq!(q - p, Vec3::new(3.0, 4.0, 0.0));
        assert!((p.distance(q) - 5.0).abs() < 1e-12);
        assert_eq!(p.lerp(q, 0.5), Point3::new(2.5, 4.0, 3.0));
    }

    #[test]
    fn test_transform_translate_point() {
        let t = Transform::translate(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.apply_point(Point3::ORIGIN), Point3::new(1.0, 2.0, 3.0));
        // linear part leaves vectors alone
        assert_eq!(t.apply_vec(Vec3::X), Vec3::X);
    }

    #[test]
    fn test_transform_compose_order() {
        // compose(T, S) applies S first
        let s = Transform::scale(2.0, 2.0, 2.0);
        let t = Transform::translate(Vec3::new(1.0, 0.0, 0.0));
        let st = t.compose(s);
        assert_eq!(
            st.apply_point(Point3::new(1.0, 0.0, 0.0)),
            Point3::new(3.0, 0.0, 0.0)
        );
    }

    #[test]
    fn test_transform_rotate_z_quarter_turn() {
        let r = Transform::rotate_z(std::f64::consts::FRAC_PI_2);
        let p = r.apply_point(Point3::new(1.0, 0.0, 0.0));
        assert!(Tolerance::DEFAULT.approx_eq_point3(p, Point3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn test_transform_inverse_roundtrip() {
        let m = Transform::translate(Vec3::new(1.0, -2.0, 0.5))
            .compose(Transform::rotate_y(0.3))
            .compose(Transform::scale(2.0, 1.0, 0.5));
        let inv = m.inverse().unwrap();
        let p = Point3::new(0.7, -1.1, 2.3);
        let back = inv.apply_point(m.apply_point(p));
        assert!(Tolerance::new(1e-10).approx_eq_point3(back, p));
    }

    #[test]
    fn test_transform_singular_inverse() {
        assert!(Transform::scale(1.0, 0.0, 1.0).inverse().is_none());
    }

    #[test]
    fn test_mirror_planes() {
        let p = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(
            Transform::mirror(MirrorPlane::Xz).apply_point(p),
            Point3::new(1.0, -2.0, 3.0)
        );
        assert_eq!(
            Transform::mirror(MirrorPlane::Xy).apply_point(p),
            Point3::new(1.0, 2.0, -3.0)
        );
        assert_eq!(
            Transform::mirror(MirrorPlane::Yz).apply_point(p),
            Point3::new(-1.0, 2.0, 3.0)
        );
    }

    #[test]
    fn test_bbox_from_points() {
        let bbox = BBox::from_points(&[
            Point3::new(1.0, 5.0, -1.0),
            Point3::new(-2.0, 0.0, 4.0),
            Point3::new(0.0, 2.0, 0.0),
        ])
        .unwrap();
        assert_eq!(bbox.min, Point3::new(-2.0, 0.0, -1.0));
        assert_eq!(bbox.max, Point3::new(1.0, 5.0, 4.0));
        assert!(bbox.contains_point(Point3::new(0.0, 1.0, 0.0)));
        assert!(!bbox.contains_point(Point3::new(0.0, 6.0, 0.0)));
        assert!(bbox.expand(1.0).contains_point(Point3::new(0.0, 5.5, 0.0)));
    }

    #[test]
    fn test_tolerance_relative_floor() {
        let tol = Tolerance::DERIVATIVE;
        assert!(tol.relative_to(0.0) >= tol.eps);
        assert!((tol.relative_to(10.0) - 10.0 * tol.eps).abs() < 1e-15);
    }
}
