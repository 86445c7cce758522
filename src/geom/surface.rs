//! Parametric surfaces between sampled profile rails.
//!
//! The engine skins segments with ruled surfaces: two rails sampled at the
//! same chord stations, interpolated linearly across the span. Guide curves
//! override the straight ruling near their chord station via hat-function
//! blending, giving a curve-constrained skin without changing the rails.
//!
//! Convention throughout: `u` runs along the chord (the rails' station
//! parameter), `v` runs across the span from rail A (`v = 0`) to rail B
//! (`v = 1`). Both domains are `[0, 1]`.

use super::core::{Point3, Tolerance, Vec3};
use super::GeometryError;

pub trait Surface {
    /// Evaluates the surface. Parameters outside the domain are clamped.
    fn point_at(&self, u: f64, v: f64) -> Point3;

    /// First partial derivatives `(dP/du, dP/dv)` by central finite
    /// differences, clamped at the domain boundary.
    #[must_use]
    fn partial_derivatives_at(&self, u: f64, v: f64) -> (Vec3, Vec3) {
        let u = u.clamp(0.0, 1.0);
        let v = v.clamp(0.0, 1.0);
        let h = Tolerance::DERIVATIVE.eps;

        let ua = (u - h).max(0.0);
        let ub = (u + h).min(1.0);
        let du = if ub > ua {
            let pa = self.point_at(ua, v);
            let pb = self.point_at(ub, v);
            (pb - pa).mul_scalar(1.0 / (ub - ua))
        } else {
            Vec3::ZERO
        };

        let va = (v - h).max(0.0);
        let vb = (v + h).min(1.0);
        let dv = if vb > va {
            let pa = self.point_at(u, va);
            let pb = self.point_at(u, vb);
            (pb - pa).mul_scalar(1.0 / (vb - va))
        } else {
            Vec3::ZERO
        };

        (du, dv)
    }

    /// Unit surface normal, `None` where the parametrization degenerates.
    #[must_use]
    fn normal_at(&self, u: f64, v: f64) -> Option<Vec3> {
        let (du, dv) = self.partial_derivatives_at(u, v);
        du.cross(dv).normalized()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// RuledSurface
// ─────────────────────────────────────────────────────────────────────────────

/// Straight ruling between two rails sampled at identical chord stations.
///
/// `point_at(u, v)` interpolates both rails piecewise-linearly in the station
/// parameter `u`, then blends them linearly in `v`. At `v = 0` the surface
/// reproduces rail A exactly at every station; likewise rail B at `v = 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct RuledSurface {
    stations: Vec<f64>,
    rail_a: Vec<Point3>,
    rail_b: Vec<Point3>,
}

impl RuledSurface {
    /// `stations` must be strictly increasing over `[0, 1]` and both rails
    /// must be sampled at every station.
    pub fn new(
        stations: Vec<f64>,
        rail_a: Vec<Point3>,
        rail_b: Vec<Point3>,
    ) -> Result<Self, GeometryError> {
        if rail_a.len() != rail_b.len() || rail_a.len() != stations.len() {
            return Err(GeometryError::MismatchedRails {
                left: rail_a.len(),
                right: rail_b.len(),
            });
        }
        if stations.len() < 2 {
            return Err(GeometryError::NotEnoughPoints { min: 2 });
        }
        if rail_a.iter().chain(&rail_b).any(|p| !p.is_finite())
            || stations.iter().any(|s| !s.is_finite())
        {
            return Err(GeometryError::NonFinitePoint);
        }
        if stations.windows(2).any(|w| w[1] <= w[0]) {
            return Err(GeometryError::DegenerateProfile);
        }

        Ok(Self {
            stations,
            rail_a,
            rail_b,
        })
    }

    #[must_use]
    pub fn stations(&self) -> &[f64] {
        &self.stations
    }

    #[must_use]
    pub fn rail(&self, end: RailEnd) -> &[Point3] {
        match end {
            RailEnd::A => &self.rail_a,
            RailEnd::B => &self.rail_b,
        }
    }

    /// Station interval containing `u` and the local blend factor within it.
    fn locate(&self, u: f64) -> (usize, f64) {
        let u = u.clamp(self.stations[0], *self.stations.last().unwrap_or(&1.0));
        let mut idx = match self
            .stations
            .binary_search_by(|s| s.partial_cmp(&u).unwrap_or(std::cmp::Ordering::Less))
        {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        idx = idx.min(self.stations.len() - 2);
        let s0 = self.stations[idx];
        let s1 = self.stations[idx + 1];
        let local = if s1 > s0 { (u - s0) / (s1 - s0) } else { 0.0 };
        (idx, local)
    }

    /// Rail point at station parameter `u`.
    #[must_use]
    pub fn rail_point(&self, end: RailEnd, u: f64) -> Point3 {
        let (idx, local) = self.locate(u);
        let rail = self.rail(end);
        rail[idx].lerp(rail[idx + 1], local)
    }
}

/// Names the two rails of a ruled surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RailEnd {
    A,
    B,
}

impl Surface for RuledSurface {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        let v = v.clamp(0.0, 1.0);
        let (idx, local) = self.locate(u);
        let a = self.rail_a[idx].lerp(self.rail_a[idx + 1], local);
        let b = self.rail_b[idx].lerp(self.rail_b[idx + 1], local);
        a.lerp(b, v)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// GuidedSurface
// ─────────────────────────────────────────────────────────────────────────────

/// A spanwise guide: intermediate points sampled from rail A's station point
/// (`v = 0`) to rail B's (`v = 1`), pinned at chord station `station`.
#[derive(Debug, Clone, PartialEq)]
pub struct GuideRail {
    pub station: f64,
    pub points: Vec<Point3>,
}

impl GuideRail {
    pub fn new(station: f64, points: Vec<Point3>) -> Result<Self, GeometryError> {
        if !(0.0..=1.0).contains(&station) || !station.is_finite() {
            return Err(GeometryError::GuideOutOfRange { station });
        }
        if points.len() < 2 {
            return Err(GeometryError::NotEnoughPoints { min: 2 });
        }
        if points.iter().any(|p| !p.is_finite()) {
            return Err(GeometryError::NonFinitePoint);
        }
        Ok(Self { station, points })
    }

    /// Point along the guide at span parameter `v`, interpolating the sample
    /// points uniformly in index.
    #[must_use]
    pub fn point_at(&self, v: f64) -> Point3 {
        let v = v.clamp(0.0, 1.0);
        let scaled = v * (self.points.len() - 1) as f64;
        let idx = (scaled.floor() as usize).min(self.points.len() - 2);
        let local = scaled - idx as f64;
        self.points[idx].lerp(self.points[idx + 1], local)
    }
}

/// Ruled surface with guide-curve corrections.
///
/// Each guide contributes the displacement between itself and the underlying
/// ruling at its station, faded out linearly towards the neighbouring guide
/// stations (or the chord domain edges). With no guides this degenerates to
/// the plain ruled surface.
#[derive(Debug, Clone, PartialEq)]
pub struct GuidedSurface {
    base: RuledSurface,
    guides: Vec<GuideRail>,
}

impl GuidedSurface {
    pub fn new(base: RuledSurface, mut guides: Vec<GuideRail>) -> Result<Self, GeometryError> {
        guides.sort_by(|a, b| {
            a.station
                .partial_cmp(&b.station)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(Self { base, guides })
    }

    #[must_use]
    pub const fn base(&self) -> &RuledSurface {
        &self.base
    }

    #[must_use]
    pub fn guides(&self) -> &[GuideRail] {
        &self.guides
    }

    /// Hat weight of guide `i` at chord parameter `u`: 1 at its own station,
    /// 0 at the adjacent stations / domain edges.
    fn weight(&self, i: usize, u: f64) -> f64 {
        let center = self.guides[i].station;
        let left = if i == 0 {
            0.0
        } else {
            self.guides[i - 1].station
        };
        let right = if i + 1 == self.guides.len() {
            1.0
        } else {
            self.guides[i + 1].station
        };

        if u < center {
            let span = center - left;
            if span <= Tolerance::ZERO_LENGTH.eps {
                if u >= left { 1.0 } else { 0.0 }
            } else {
                ((u - left) / span).clamp(0.0, 1.0)
            }
        } else {
            let span = right - center;
            if span <= Tolerance::ZERO_LENGTH.eps {
                if u <= right { 1.0 } else { 0.0 }
            } else {
                ((right - u) / span).clamp(0.0, 1.0)
            }
        }
    }
}

impl Surface for GuidedSurface {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        let mut p = self.base.point_at(u, v);
        for (i, guide) in self.guides.iter().enumerate() {
            let w = self.weight(i, u);
            if w <= 0.0 {
                continue;
            }
            let on_ruling = self.base.point_at(guide.station, v);
            let delta = guide.point_at(v) - on_ruling;
            p = p.add_vec(delta.mul_scalar(w));
        }
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_ruled() -> RuledSurface {
        // unit strip in the xy plane: rail A at y=0, rail B at y=1
        RuledSurface::new(
            vec![0.0, 0.5, 1.0],
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(0.5, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
            ],
            vec![
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.5, 1.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_ruled_reproduces_rails() {
        let s = flat_ruled();
        assert_eq!(s.point_at(0.5, 0.0), Point3::new(0.5, 0.0, 0.0));
        assert_eq!(s.point_at(0.5, 1.0), Point3::new(0.5, 1.0, 0.0));
        assert_eq!(s.point_at(0.25, 0.5), Point3::new(0.25, 0.5, 0.0));
    }

    #[test]
    fn test_ruled_clamps_parameters() {
        let s = flat_ruled();
        assert_eq!(s.point_at(-1.0, 0.5), s.point_at(0.0, 0.5));
        assert_eq!(s.point_at(0.5, 2.0), s.point_at(0.5, 1.0));
    }

    #[test]
    fn test_ruled_rejects_mismatched_rails() {
        let err = RuledSurface::new(
            vec![0.0, 1.0],
            vec![Point3::ORIGIN, Point3::new(1.0, 0.0, 0.0)],
            vec![Point3::ORIGIN],
        );
        assert_eq!(
            err,
            Err(GeometryError::MismatchedRails { left: 2, right: 1 })
        );
    }

    #[test]
    fn test_ruled_rejects_unsorted_stations() {
        let err = RuledSurface::new(
            vec![0.0, 0.6, 0.4],
            vec![Point3::ORIGIN; 3],
            vec![Point3::ORIGIN; 3],
        );
        assert_eq!(err, Err(GeometryError::DegenerateProfile));
    }

    #[test]
    fn test_surface_normal_flat_strip() {
        let s = flat_ruled();
        let n = s.normal_at(0.5, 0.5).unwrap();
        assert!((n.z.abs() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_guide_rail_interpolation() {
        let g = GuideRail::new(
            0.5,
            vec![
                Point3::new(0.5, 0.0, 0.0),
                Point3::new(0.5, 0.5, 1.0),
                Point3::new(0.5, 1.0, 0.0),
            ],
        )
        .unwrap();
        assert_eq!(g.point_at(0.5), Point3::new(0.5, 0.5, 1.0));
        assert_eq!(g.point_at(0.25), Point3::new(0.5, 0.25, 0.5));
    }

    #[test]
    fn test_guide_station_out_of_range() {
        let err = GuideRail::new(1.5, vec![Point3::ORIGIN, Point3::ORIGIN]);
        assert!(matches!(err, Err(GeometryError::GuideOutOfRange { .. })));
    }

    #[test]
    fn test_guided_surface_passes_through_guide() {
        // bump the mid-chord guide out of plane; the surface must follow it
        let guide = GuideRail::new(
            0.5,
            vec![
                Point3::new(0.5, 0.0, 0.0),
                Point3::new(0.5, 0.5, 1.0),
                Point3::new(0.5, 1.0, 0.0),
            ],
        )
        .unwrap();
        let s = GuidedSurface::new(flat_ruled(), vec![guide]).unwrap();

        // exact at the guide station
        assert!(
            Tolerance::DEFAULT.approx_eq_point3(s.point_at(0.5, 0.5), Point3::new(0.5, 0.5, 1.0))
        );
        // untouched at the rails
        assert_eq!(s.point_at(0.5, 0.0), Point3::new(0.5, 0.0, 0.0));
        // decays to the ruling at the domain edges
        assert_eq!(s.point_at(0.0, 0.5), Point3::new(0.0, 0.5, 0.0));
        assert_eq!(s.point_at(1.0, 0.5), Point3::new(1.0, 0.5, 0.0));
        // halfway to the station, half the correction remains
        let half = s.point_at(0.25, 0.5);
        assert!((half.z - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_guided_without_guides_is_ruled() {
        let s = GuidedSurface::new(flat_ruled(), Vec::new()).unwrap();
        assert_eq!(s.point_at(0.3, 0.7), flat_ruled().point_at(0.3, 0.7));
    }
}
