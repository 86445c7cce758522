//! Segmenten: het geometrische bereik tussen twee opeenvolgende secties.
//!
//! Een segment verwijst via uids naar zijn van- en naar-sectie en bouwt lui
//! een oppervlaktepaar (boven- en onderzijde) in wereldcoördinaten. De
//! segmentlokale eta loopt van de van-sectie (0) naar de naar-sectie (1);
//! xsi is de koordefractie van het sectieprofiel.

use crate::geom::{BBox, GuideRail, GuidedSurface, Point3, Surface};

use super::cache::CacheSlot;

/// Zijde van het segmentoppervlak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceSide {
    Upper,
    Lower,
}

/// Uiteinde van een segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentEnd {
    From,
    To,
}

/// Geleidingscurve: dwingt het oppervlak door tussenliggende punten op een
/// vast koordestation. De punten staan in componentcoördinaten en lopen van
/// de van-sectie naar de naar-sectie.
#[derive(Debug, Clone, PartialEq)]
pub struct GuideCurve {
    uid: String,
    station: f64,
    side: SurfaceSide,
    points: Vec<Point3>,
}

impl GuideCurve {
    #[must_use]
    pub fn new(uid: &str, station: f64, side: SurfaceSide, points: Vec<Point3>) -> Self {
        Self {
            uid: uid.to_owned(),
            station,
            side,
            points,
        }
    }

    #[must_use]
    pub fn uid(&self) -> &str {
        &self.uid
    }

    #[must_use]
    pub const fn station(&self) -> f64 {
        self.station
    }

    #[must_use]
    pub const fn side(&self) -> SurfaceSide {
        self.side
    }

    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }
}

/// Het luie oppervlaktepaar van een segment, in wereldcoördinaten.
#[derive(Debug, Clone)]
pub struct SegmentSurfaces {
    pub upper: GuidedSurface,
    pub lower: GuidedSurface,
    /// Afstand tussen de voorrandpunten van beide secties.
    pub span_length: f64,
    /// Ruim begrensd kader voor kandidaatselectie bij inversie.
    pub bbox: BBox,
    /// Aantal koordestations van de rails (zaait de projectie).
    pub chord_samples: usize,
}

impl SegmentSurfaces {
    #[must_use]
    pub fn surface(&self, side: SurfaceSide) -> &GuidedSurface {
        match side {
            SurfaceSide::Upper => &self.upper,
            SurfaceSide::Lower => &self.lower,
        }
    }

    /// Evalueert het segment op `(eta, xsi)` aan de gevraagde zijde.
    #[must_use]
    pub fn point_at(&self, eta: f64, xsi: f64, side: SurfaceSide) -> Point3 {
        // oppervlakteconventie: u = koorde (xsi), v = spanwijdte (eta)
        self.surface(side).point_at(xsi, eta)
    }
}

/// Een segment tussen twee secties van dezelfde component.
#[derive(Debug, Clone)]
pub struct Segment {
    uid: String,
    name: String,
    from_section_uid: String,
    to_section_uid: String,
    guide_curves: Vec<GuideCurve>,
    pub(crate) surfaces: CacheSlot<SegmentSurfaces>,
}

impl Segment {
    #[must_use]
    pub fn new(
        uid: &str,
        name: &str,
        from_section_uid: &str,
        to_section_uid: &str,
        guide_curves: Vec<GuideCurve>,
    ) -> Self {
        Self {
            uid: uid.to_owned(),
            name: name.to_owned(),
            from_section_uid: from_section_uid.to_owned(),
            to_section_uid: to_section_uid.to_owned(),
            guide_curves,
            surfaces: CacheSlot::default(),
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

    #[must_use]
    pub fn from_section_uid(&self) -> &str {
        &self.from_section_uid
    }

    #[must_use]
    pub fn to_section_uid(&self) -> &str {
        &self.to_section_uid
    }

    /// De sectie-uid aan het gevraagde uiteinde.
    #[must_use]
    pub fn section_uid(&self, end: SegmentEnd) -> &str {
        match end {
            SegmentEnd::From => &self.from_section_uid,
            SegmentEnd::To => &self.to_section_uid,
        }
    }

    #[must_use]
    pub fn guide_curves(&self) -> &[GuideCurve] {
        &self.guide_curves
    }

    /// Geleidingscurves die bij één zijde horen, als rails voor het
    /// oppervlak van die zijde.
    pub(crate) fn guide_rails(
        &self,
        side: SurfaceSide,
        to_world: impl Fn(Point3) -> Point3,
    ) -> Result<Vec<GuideRail>, crate::geom::GeometryError> {
        self.guide_curves
            .iter()
            .filter(|g| g.side() == side)
            .map(|g| {
                let points = g.points().iter().map(|&p| to_world(p)).collect();
                GuideRail::new(g.station(), points)
            })
            .collect()
    }

    /// Verwijst dit segment naar de sectie met `section_uid`?
    #[must_use]
    pub fn references_section(&self, section_uid: &str) -> bool {
        self.from_section_uid == section_uid || self.to_section_uid == section_uid
    }

    pub fn invalidate(&mut self) {
        self.surfaces.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_end_lookup() {
        let seg = Segment::new("seg", "segment", "sec_a", "sec_b", Vec::new());
        assert_eq!(seg.section_uid(SegmentEnd::From), "sec_a");
        assert_eq!(seg.section_uid(SegmentEnd::To), "sec_b");
        assert!(seg.references_section("sec_a"));
        assert!(!seg.references_section("sec_c"));
    }

    #[test]
    fn guide_rails_filter_by_side() {
        let seg = Segment::new(
            "seg",
            "segment",
            "sec_a",
            "sec_b",
            vec![
                GuideCurve::new(
                    "gc_boven",
                    0.4,
                    SurfaceSide::Upper,
                    vec![Point3::new(0.4, 0.0, 0.1), Point3::new(0.4, 1.0, 0.1)],
                ),
                GuideCurve::new(
                    "gc_onder",
                    0.6,
                    SurfaceSide::Lower,
                    vec![Point3::new(0.6, 0.0, -0.1), Point3::new(0.6, 1.0, -0.1)],
                ),
            ],
        );
        let rails = seg.guide_rails(SurfaceSide::Upper, |p| p).unwrap();
        assert_eq!(rails.len(), 1);
        assert_eq!(rails[0].station, 0.4);
    }
}
