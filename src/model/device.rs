//! Stuurvlakken: accessoiregeometrie verankerd in de eta/xsi-ruimte van een
//! componentsegment, met een geïnterpoleerd uitslagpad.

use crate::geom::{Shape, Vec3};

use super::cache::CacheSlot;
use super::ModelError;

/// Grens van een stuurvlak in componentsegmentruimte: de spanwijdtepositie en
/// het koordestation van de voorrand van het vlak. Het vlak loopt van daar
/// tot de achterrand (xsi = 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceBorder {
    pub eta: f64,
    pub xsi: f64,
}

/// Eén stap van het uitslagpad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeflectionStep {
    /// Relatieve uitslag, monotoon over het pad.
    pub rel_deflection: f64,
    /// Translatie van de binnenste scharnierlijn.
    pub hinge_translation: Vec3,
    /// Rotatie om de scharnierlijn, in graden.
    pub hinge_rotation: f64,
}

/// Het uitslagpad: geordende stappen, lineair geïnterpoleerd.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DevicePath {
    steps: Vec<DeflectionStep>,
}

impl DevicePath {
    /// Stappen moeten strikt oplopen in relatieve uitslag.
    pub fn new(steps: Vec<DeflectionStep>) -> Result<Self, ModelError> {
        if steps
            .windows(2)
            .any(|w| w[1].rel_deflection <= w[0].rel_deflection)
        {
            return Err(ModelError::InvalidDevicePath {
                reason: "relatieve uitslagen moeten strikt oplopen".to_owned(),
            });
        }
        Ok(Self { steps })
    }

    #[must_use]
    pub fn steps(&self) -> &[DeflectionStep] {
        &self.steps
    }

    /// Interpoleert translatie en rotatie bij relatieve uitslag `rel`.
    /// Buiten het bereik klemt het pad op de eerste/laatste stap; exact op
    /// een stap komt die stap ongewijzigd terug.
    #[must_use]
    pub fn interpolate(&self, rel: f64) -> Option<(Vec3, f64)> {
        let first = self.steps.first()?;
        let last = self.steps.last()?;
        if rel <= first.rel_deflection {
            return Some((first.hinge_translation, first.hinge_rotation));
        }
        if rel >= last.rel_deflection {
            return Some((last.hinge_translation, last.hinge_rotation));
        }
        let idx = self
            .steps
            .windows(2)
            .position(|w| w[0].rel_deflection <= rel && rel <= w[1].rel_deflection)?;
        let (a, b) = (self.steps[idx], self.steps[idx + 1]);
        let t = (rel - a.rel_deflection) / (b.rel_deflection - a.rel_deflection);
        Some((
            a.hinge_translation.lerp(b.hinge_translation, t),
            a.hinge_rotation + (b.hinge_rotation - a.hinge_rotation) * t,
        ))
    }
}

/// Een stuurvlak, verankerd aan een componentsegment (mogelijk van een
/// andere component).
#[derive(Debug, Clone)]
pub struct ControlSurfaceDevice {
    uid: String,
    name: String,
    component_segment_uid: String,
    inner: DeviceBorder,
    outer: DeviceBorder,
    path: DevicePath,
    pub(crate) shape: CacheSlot<Shape>,
}

impl ControlSurfaceDevice {
    #[must_use]
    pub fn new(
        uid: &str,
        name: &str,
        component_segment_uid: &str,
        inner: DeviceBorder,
        outer: DeviceBorder,
        path: DevicePath,
    ) -> Self {
        Self {
            uid: uid.to_owned(),
            name: name.to_owned(),
            component_segment_uid: component_segment_uid.to_owned(),
            inner,
            outer,
            path,
            shape: CacheSlot::default(),
        }
    }

    #[must_use]
    pub fn uid(&self) -> &str {
        &self.uid
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Uid van het componentsegment waarin de grenzen zijn uitgedrukt.
    #[must_use]
    pub fn component_segment_uid(&self) -> &str {
        &self.component_segment_uid
    }

    #[must_use]
    pub const fn inner_border(&self) -> DeviceBorder {
        self.inner
    }

    #[must_use]
    pub const fn outer_border(&self) -> DeviceBorder {
        self.outer
    }

    #[must_use]
    pub const fn path(&self) -> &DevicePath {
        &self.path
    }

    pub fn invalidate(&mut self) {
        self.shape.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> DevicePath {
        DevicePath::new(vec![
            DeflectionStep {
                rel_deflection: 0.0,
                hinge_translation: Vec3::ZERO,
                hinge_rotation: 0.0,
            },
            DeflectionStep {
                rel_deflection: 0.5,
                hinge_translation: Vec3::new(0.0, 0.0, -0.1),
                hinge_rotation: 15.0,
            },
            DeflectionStep {
                rel_deflection: 1.0,
                hinge_translation: Vec3::new(0.1, 0.0, -0.3),
                hinge_rotation: 40.0,
            },
        ])
        .unwrap()
    }

    #[test]
    fn interpolation_exact_at_knots() {
        let path = path();
        let (t, r) = path.interpolate(0.5).unwrap();
        assert_eq!(t, Vec3::new(0.0, 0.0, -0.1));
        assert_eq!(r, 15.0);
    }

    #[test]
    fn interpolation_linear_between_knots() {
        let path = path();
        let (t, r) = path.interpolate(0.75).unwrap();
        assert!((r - 27.5).abs() < 1e-12);
        assert!((t.z - (-0.2)).abs() < 1e-12);
        assert!((t.x - 0.05).abs() < 1e-12);
    }

    #[test]
    fn interpolation_clamps_outside_range() {
        let path = path();
        assert_eq!(path.interpolate(-1.0).unwrap().1, 0.0);
        assert_eq!(path.interpolate(2.0).unwrap().1, 40.0);
    }

    #[test]
    fn empty_path_interpolates_to_none() {
        let path = DevicePath::default();
        assert!(path.interpolate(0.5).is_none());
    }

    #[test]
    fn non_monotonic_path_rejected() {
        let err = DevicePath::new(vec![
            DeflectionStep {
                rel_deflection: 0.5,
                hinge_translation: Vec3::ZERO,
                hinge_rotation: 0.0,
            },
            DeflectionStep {
                rel_deflection: 0.5,
                hinge_translation: Vec3::ZERO,
                hinge_rotation: 1.0,
            },
        ]);
        assert!(matches!(err, Err(ModelError::InvalidDevicePath { .. })));
    }
}
