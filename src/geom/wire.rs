//! Polyline wires: ordered point sequences with arc-length parametrization.
//!
//! A wire is the engine's edge/boundary primitive. Closed wires describe
//! cross-section profiles; open wires describe rails and closure strips.

use log::warn;

use super::core::{BBox, Point3, Tolerance, Transform};
use super::GeometryError;

/// An ordered polyline, optionally closed (an implicit edge connects the last
/// point back to the first). The first point is never repeated at the end.
#[derive(Debug, Clone, PartialEq)]
pub struct Wire {
    points: Vec<Point3>,
    cumulative: Vec<f64>,
    closed: bool,
}

impl Wire {
    /// Builds an open wire through `points`.
    pub fn open(points: Vec<Point3>) -> Result<Self, GeometryError> {
        Self::build(points, false)
    }

    /// Builds a closed wire through `points`. A trailing point coincident with
    /// the first (within weld tolerance) is dropped.
    pub fn closed(mut points: Vec<Point3>) -> Result<Self, GeometryError> {
        if points.len() >= 2 {
            let first = points[0];
            let last = points[points.len() - 1];
            if first.distance(last) <= Tolerance::WELD.eps {
                points.pop();
            }
        }
        Self::build(points, true)
    }

    fn build(points: Vec<Point3>, closed: bool) -> Result<Self, GeometryError> {
        let min = if closed { 3 } else { 2 };
        if points.len() < min {
            return Err(GeometryError::NotEnoughPoints { min });
        }
        if points.iter().any(|p| !p.is_finite()) {
            return Err(GeometryError::NonFinitePoint);
        }

        let mut cumulative = Vec::with_capacity(points.len() + 1);
        cumulative.push(0.0);
        let mut total = 0.0;
        for i in 1..points.len() {
            total += points[i].distance(points[i - 1]);
            cumulative.push(total);
        }
        if closed {
            total += points[0].distance(points[points.len() - 1]);
            cumulative.push(total);
        }

        if total <= Tolerance::ZERO_LENGTH.eps {
            return Err(GeometryError::DegenerateProfile);
        }

        Ok(Self {
            points,
            cumulative,
            closed,
        })
    }

    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Total polyline length, including the closing edge for closed wires.
    #[must_use]
    pub fn arc_length(&self) -> f64 {
        *self.cumulative.last().unwrap_or(&0.0)
    }

    /// Point at normalized arc-length parameter `t ∈ [0, 1]`. Out-of-range
    /// parameters are clamped with a warning.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point3 {
        let t = if (0.0..=1.0).contains(&t) {
            t
        } else {
            warn!("wire parameter {t} outside [0,1], clamping");
            t.clamp(0.0, 1.0)
        };

        let target = t * self.arc_length();
        // cumulative is sorted; find the containing edge
        let idx = match self
            .cumulative
            .binary_search_by(|len| len.partial_cmp(&target).unwrap_or(std::cmp::Ordering::Less))
        {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let idx = idx.min(self.edge_count() - 1);

        let start = self.cumulative[idx];
        let end = self.cumulative[idx + 1];
        let local = if end > start {
            (target - start) / (end - start)
        } else {
            0.0
        };

        let a = self.points[idx];
        let b = self.points[(idx + 1) % self.points.len()];
        a.lerp(b, local)
    }

    fn edge_count(&self) -> usize {
        if self.closed {
            self.points.len()
        } else {
            self.points.len() - 1
        }
    }

    /// Wire with every point mapped through `t`. Arc lengths are recomputed.
    #[must_use]
    pub fn transformed(&self, t: Transform) -> Self {
        let points: Vec<Point3> = self.points.iter().map(|&p| t.apply_point(p)).collect();
        // the source wire was valid and affine maps preserve finiteness of
        // finite inputs, so rebuilding cannot fail except for a collapse to a
        // single point under a zero scale
        Self::build(points, self.closed).unwrap_or_else(|_| Self {
            points: vec![Point3::ORIGIN; self.points.len()],
            cumulative: vec![0.0; self.cumulative.len()],
            closed: self.closed,
        })
    }

    #[must_use]
    pub fn bbox(&self) -> BBox {
        BBox::from_points(&self.points).unwrap_or(BBox::new(Point3::ORIGIN, Point3::ORIGIN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Vec3;

    fn unit_square() -> Vec<Point3> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_closed_wire_drops_duplicate_endpoint() {
        let mut pts = unit_square();
        pts.push(Point3::new(0.0, 0.0, 0.0));
        let wire = Wire::closed(pts).unwrap();
        assert_eq!(wire.point_count(), 4);
        assert!((wire.arc_length() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_open_wire_arc_length() {
        let wire = Wire::open(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
            Point3::new(3.0, 4.0, 0.0),
        ])
        .unwrap();
        assert!((wire.arc_length() - 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_point_at_midpoints() {
        let wire = Wire::closed(unit_square()).unwrap();
        assert_eq!(wire.point_at(0.0), Point3::new(0.0, 0.0, 0.0));
        assert_eq!(wire.point_at(0.25), Point3::new(1.0, 0.0, 0.0));
        assert_eq!(wire.point_at(0.5), Point3::new(1.0, 1.0, 0.0));
        // closing edge wraps back to the start
        let tol = Tolerance::DEFAULT;
        assert!(tol.approx_eq_point3(wire.point_at(1.0), Point3::new(0.0, 0.0, 0.0)));
    }

    #[test]
    fn test_point_at_clamps() {
        let wire = Wire::closed(unit_square()).unwrap();
        assert_eq!(wire.point_at(-0.5), wire.point_at(0.0));
        assert_eq!(wire.point_at(1.5), wire.point_at(1.0));
    }

    #[test]
    fn test_degenerate_inputs_rejected() {
        assert_eq!(
            Wire::open(vec![Point3::ORIGIN]),
            Err(GeometryError::NotEnoughPoints { min: 2 })
        );
        assert_eq!(
            Wire::closed(vec![Point3::ORIGIN; 5]),
            Err(GeometryError::DegenerateProfile)
        );
        assert_eq!(
            Wire::open(vec![Point3::ORIGIN, Point3::new(f64::NAN, 0.0, 0.0)]),
            Err(GeometryError::NonFinitePoint)
        );
    }

    #[test]
    fn test_transformed_recomputes_lengths() {
        let wire = Wire::closed(unit_square()).unwrap();
        let moved = wire.transformed(Transform::scale(2.0, 2.0, 2.0).compose(
            Transform::translate(Vec3::new(0.0, 0.0, 1.0)),
        ));
        assert!((moved.arc_length() - 8.0).abs() < 1e-12);
        assert_eq!(moved.points()[0].z, 2.0);
    }
}
