//! CPACS-stijl transformaties: optionele schaal-, rotatie- en
//! translatiecomponenten met een vaste toepassingsvolgorde.

use crate::geom::{Transform, Vec3};

/// Een ontbindbare affiene transformatie zoals het document ze beschrijft.
///
/// Ontbrekende componenten dragen de identiteit bij. De volgorde ligt vast:
/// eerst schalen, dan roteren (om x, dan y, dan z, hoeken in graden), dan
/// transleren. Ketens componeren via matrixvermenigvuldiging, waarbij de
/// oudertransformatie na de kindtransformatie wordt toegepast.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transformation {
    scale: Option<Vec3>,
    rotation: Option<Vec3>,
    translation: Option<Vec3>,
}

impl Transformation {
    /// De identiteitstransformatie (alle componenten afwezig).
    pub const IDENTITY: Self = Self {
        scale: None,
        rotation: None,
        translation: None,
    };

    #[must_use]
    pub const fn new(
        scale: Option<Vec3>,
        rotation: Option<Vec3>,
        translation: Option<Vec3>,
    ) -> Self {
        Self {
            scale,
            rotation,
            translation,
        }
    }

    #[must_use]
    pub const fn from_translation(translation: Vec3) -> Self {
        Self {
            scale: None,
            rotation: None,
            translation: Some(translation),
        }
    }

    #[must_use]
    pub const fn scale(&self) -> Option<Vec3> {
        self.scale
    }

    /// Rotatiehoeken in graden om de x-, y- en z-as.
    #[must_use]
    pub const fn rotation(&self) -> Option<Vec3> {
        self.rotation
    }

    #[must_use]
    pub const fn translation(&self) -> Option<Vec3> {
        self.translation
    }

    pub fn set_scale(&mut self, scale: Option<Vec3>) {
        self.scale = scale;
    }

    pub fn set_rotation(&mut self, rotation: Option<Vec3>) {
        self.rotation = rotation;
    }

    pub fn set_translation(&mut self, translation: Option<Vec3>) {
        self.translation = translation;
    }

    /// Verschuift de translatiecomponent met `delta`.
    pub fn translate(&mut self, delta: Vec3) {
        let current = self.translation.unwrap_or(Vec3::ZERO);
        self.translation = Some(current + delta);
    }

    /// De samengestelde matrix: `T · Rz · Ry · Rx · S`.
    #[must_use]
    pub fn matrix(&self) -> Transform {
        let mut m = Transform::identity();
        if let Some(s) = self.scale {
            m = Transform::scale(s.x, s.y, s.z).compose(m);
        }
        if let Some(r) = self.rotation {
            m = Transform::rotate_x(r.x.to_radians()).compose(m);
            m = Transform::rotate_y(r.y.to_radians()).compose(m);
            m = Transform::rotate_z(r.z.to_radians()).compose(m);
        }
        if let Some(t) = self.translation {
            m = Transform::translate(t).compose(m);
        }
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{Point3, Tolerance};

    #[test]
    fn missing_components_give_identity() {
        let t = Transformation::IDENTITY;
        assert_eq!(t.matrix(), Transform::identity());
    }

    #[test]
    fn scale_applies_before_rotation_and_translation() {
        // 90° om z: (2, 0, 0) -> (0, 2, 0), daarna translatie
        let t = Transformation::new(
            Some(Vec3::new(2.0, 1.0, 1.0)),
            Some(Vec3::new(0.0, 0.0, 90.0)),
            Some(Vec3::new(10.0, 0.0, 0.0)),
        );
        let p = t.matrix().apply_point(Point3::new(1.0, 0.0, 0.0));
        assert!(Tolerance::DEFAULT.approx_eq_point3(p, Point3::new(10.0, 2.0, 0.0)));
    }

    #[test]
    fn rotation_order_is_x_then_y_then_z() {
        let t = Transformation::new(None, Some(Vec3::new(90.0, 90.0, 0.0)), None);
        // Ry · Rx: (0, 1, 0) -> Rx -> (0, 0, 1) -> Ry -> (1, 0, 0)
        let p = t.matrix().apply_point(Point3::new(0.0, 1.0, 0.0));
        assert!(Tolerance::DEFAULT.approx_eq_point3(p, Point3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn translate_accumulates() {
        let mut t = Transformation::IDENTITY;
        t.translate(Vec3::new(1.0, 0.0, 0.0));
        t.translate(Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(t.translation(), Some(Vec3::new(1.0, 2.0, 0.0)));
    }

    #[test]
    fn chains_compose_child_first() {
        let child = Transformation::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let parent = Transformation::new(None, Some(Vec3::new(0.0, 0.0, 90.0)), None);
        let world = parent.matrix().compose(child.matrix());
        let p = world.apply_point(Point3::ORIGIN);
        assert!(Tolerance::DEFAULT.approx_eq_point3(p, Point3::new(0.0, 1.0, 0.0)));
    }
}
