//! Componenten: vleugel-, romp- en rotorbladachtige opbouwen van secties,
//! segmenten en positioneringen, met luie geometriecaches.
//!
//! Alle geometriequeries nemen `&mut self`: een vuile cache wordt ter plekke
//! herbouwd (nooit speculatief). Schone resultaten zijn `Arc`-gedeeld en
//! identiek bij herhaalde aanroepen zonder tussentijdse mutatie.

use std::sync::Arc;

use log::{debug, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::geom::{
    fuse_shapes, project_point_on_surface, tessellate_surface, BBox, Face, FaceKind, FacePatch,
    GuidedSurface, MirrorPlane, Point3, RuledSurface, Shape, Surface, Tolerance, Transform, Vec3,
    Wire,
};

use super::cache::ComponentCaches;
use super::component_segment::ComponentSegment;
use super::positioning::Positionings;
use super::profile::{clamp_param, ProfileLibrary};
use super::section::Section;
use super::segment::{Segment, SegmentEnd, SegmentSurfaces, SurfaceSide};
use super::transformation::Transformation;
use super::ModelError;

/// Spanwijdtebemonstering bij het tesselleren van segmentoppervlakken.
const LOFT_SPAN_SAMPLES: usize = 9;

/// Soort component. Alle soorten delen hetzelfde sectie/segment/loft-skelet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Wing,
    Fuselage,
    RotorBlade,
}

/// Spiegelsymmetrie van een component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Symmetry {
    #[default]
    None,
    XyPlane,
    XzPlane,
    YzPlane,
}

impl Symmetry {
    #[must_use]
    pub const fn mirror_plane(self) -> Option<MirrorPlane> {
        match self {
            Self::None => None,
            Self::XyPlane => Some(MirrorPlane::Xy),
            Self::XzPlane => Some(MirrorPlane::Xz),
            Self::YzPlane => Some(MirrorPlane::Yz),
        }
    }
}

/// Resultaat van de inverse afbeelding: welk segment, waar, en aan welke
/// zijde. Geen treffer binnen tolerantie levert `None` op bij de aanroeper;
/// dat is een normale uitkomst, geen fout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentEtaXsi {
    pub segment_index: usize,
    pub eta: f64,
    pub xsi: f64,
    pub on_top: bool,
}

/// Capaciteit: bezit geordende secties.
pub trait HasSections {
    fn section_count(&self) -> usize;
    fn section(&self, index: usize) -> Result<&Section, ModelError>;
}

/// Capaciteit: bezit geordende segmenten.
pub trait HasSegments {
    fn segment_count(&self) -> usize;
    fn segment(&self, index: usize) -> Result<&Segment, ModelError>;
    fn segment_by_uid(&self, uid: &str) -> Result<&Segment, ModelError>;
}

/// Capaciteit: kan een samengestelde loft leveren.
pub trait ProducesLoft {
    fn loft(&mut self, profiles: &ProfileLibrary) -> Result<Arc<Shape>, ModelError>;
    fn invalidate(&mut self);
}

/// Een loftbare component.
#[derive(Debug, Clone)]
pub struct Component {
    uid: String,
    name: String,
    kind: ComponentKind,
    symmetry: Symmetry,
    transformation: Transformation,
    sections: Vec<Section>,
    positionings: Positionings,
    segments: Vec<Segment>,
    component_segments: Vec<ComponentSegment>,
    pub(crate) caches: ComponentCaches,
}

impl Component {
    /// Valideert de segmentreferenties en lost de componentsegmentreeksen op.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        uid: &str,
        name: &str,
        kind: ComponentKind,
        symmetry: Symmetry,
        transformation: Transformation,
        sections: Vec<Section>,
        positionings: Positionings,
        segments: Vec<Segment>,
        mut component_segments: Vec<ComponentSegment>,
    ) -> Result<Self, ModelError> {
        for seg in &segments {
            for end in [SegmentEnd::From, SegmentEnd::To] {
                let section_uid = seg.section_uid(end);
                if !sections.iter().any(|s| s.uid() == section_uid) {
                    return Err(ModelError::UnknownSectionRef {
                        segment_uid: seg.uid().to_owned(),
                        section_uid: section_uid.to_owned(),
                    });
                }
            }
        }
        for cs in &mut component_segments {
            cs.resolve_segments(&segments)?;
        }

        Ok(Self {
            uid: uid.to_owned(),
            name: name.to_owned(),
            kind,
            symmetry,
            transformation,
            sections,
            positionings,
            segments,
            component_segments,
            caches: ComponentCaches::default(),
        })
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
    pub const fn kind(&self) -> ComponentKind {
        self.kind
    }

    #[must_use]
    pub const fn symmetry(&self) -> Symmetry {
        self.symmetry
    }

    #[must_use]
    pub const fn transformation(&self) -> &Transformation {
        &self.transformation
    }

    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[must_use]
    pub const fn positionings(&self) -> &Positionings {
        &self.positionings
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[must_use]
    pub fn component_segments(&self) -> &[ComponentSegment] {
        &self.component_segments
    }

    pub(crate) fn component_segments_mut(&mut self) -> &mut [ComponentSegment] {
        &mut self.component_segments
    }

    pub fn component_segment(&self, index: usize) -> Result<&ComponentSegment, ModelError> {
        self.component_segments
            .get(index)
            .ok_or(ModelError::NotFound {
                entity: "componentsegment",
                key: index.to_string(),
            })
    }

    pub fn component_segment_by_uid(&self, uid: &str) -> Result<&ComponentSegment, ModelError> {
        self.component_segments
            .iter()
            .find(|cs| cs.uid() == uid)
            .ok_or_else(|| ModelError::NotFound {
                entity: "componentsegment",
                key: uid.to_owned(),
            })
    }

    pub fn section_by_uid(&self, uid: &str) -> Result<&Section, ModelError> {
        self.sections
            .iter()
            .find(|s| s.uid() == uid)
            .ok_or_else(|| ModelError::NotFound {
                entity: "sectie",
                key: uid.to_owned(),
            })
    }

    /// Positioneringstransformatie voor een sectie-uid.
    pub fn positioning_transformation(&self, section_uid: &str) -> Result<Transform, ModelError> {
        // de sectie moet bestaan; een onbekende uid is een opzoekfout
        self.section_by_uid(section_uid)?;
        Ok(self.positionings.transformation_for(section_uid))
    }

    /// Volledige keten voor het loft-element van een sectie:
    /// component · positionering · sectie · element.
    fn section_world_matrix(&self, section: &Section) -> Transform {
        self.transformation
            .matrix()
            .compose(self.positionings.transformation_for(section.uid()))
            .compose(section.transformation().matrix())
            .compose(section.primary_element().transformation().matrix())
    }

    // ── segmentoppervlakken ──────────────────────────────────────────────

    /// Bouwt het oppervlaktepaar van één segment in wereldcoördinaten.
    fn build_segment_surfaces(
        &self,
        index: usize,
        profiles: &ProfileLibrary,
    ) -> Result<SegmentSurfaces, ModelError> {
        let seg = &self.segments[index];
        let geometry = |source| ModelError::Geometry {
            context: format!("segment `{}`", seg.uid()),
            source,
        };

        let from_section = self.section_by_uid(seg.from_section_uid())?;
        let to_section = self.section_by_uid(seg.to_section_uid())?;
        let from_profile = profiles.by_uid(from_section.primary_element().profile_uid())?;
        let to_profile = profiles.by_uid(to_section.primary_element().profile_uid())?;

        let m_from = self.section_world_matrix(from_section);
        let m_to = self.section_world_matrix(to_section);
        let m_component = self.transformation.matrix();

        let stations = from_profile.stations().to_vec();
        let map = |points: &[Point3], m: Transform| -> Vec<Point3> {
            points.iter().map(|&p| m.apply_point(p)).collect()
        };

        let upper_from = map(from_profile.sampled_upper(), m_from);
        let upper_to = map(to_profile.sampled_upper(), m_to);
        let lower_from = map(from_profile.sampled_lower(), m_from);
        let lower_to = map(to_profile.sampled_lower(), m_to);

        let span_length = upper_from[0].distance(upper_to[0]);
        if span_length <= Tolerance::ZERO_LENGTH.eps {
            return Err(geometry(crate::geom::GeometryError::ZeroSpan));
        }

        let mut all_points = upper_from.clone();
        all_points.extend_from_slice(&upper_to);
        all_points.extend_from_slice(&lower_from);
        all_points.extend_from_slice(&lower_to);
        for guide in seg.guide_curves() {
            all_points.extend(guide.points().iter().map(|&p| m_component.apply_point(p)));
        }
        let tight = BBox::from_points(&all_points).ok_or_else(|| {
            geometry(crate::geom::GeometryError::NotEnoughPoints { min: 2 })
        })?;
        let bbox = tight.expand(0.05 * tight.diagonal() + Tolerance::PROJECTION.eps);

        let chord_samples = stations.len();
        let upper_base = RuledSurface::new(stations.clone(), upper_from, upper_to)
            .map_err(geometry)?;
        let lower_base =
            RuledSurface::new(stations, lower_from, lower_to).map_err(geometry)?;

        let to_world = |p: Point3| m_component.apply_point(p);
        let upper = GuidedSurface::new(
            upper_base,
            seg.guide_rails(SurfaceSide::Upper, to_world).map_err(geometry)?,
        )
        .map_err(geometry)?;
        let lower = GuidedSurface::new(
            lower_base,
            seg.guide_rails(SurfaceSide::Lower, to_world).map_err(geometry)?,
        )
        .map_err(geometry)?;

        Ok(SegmentSurfaces {
            upper,
            lower,
            span_length,
            bbox,
            chord_samples,
        })
    }

    /// Zorgt dat alle segmentoppervlakken schoon zijn en geeft ze in
    /// segmentvolgorde terug.
    fn ensure_all_surfaces(
        &mut self,
        profiles: &ProfileLibrary,
    ) -> Result<Vec<Arc<SegmentSurfaces>>, ModelError> {
        let dirty: Vec<usize> = self
            .segments
            .iter()
            .enumerate()
            .filter(|(_, seg)| seg.surfaces.is_dirty())
            .map(|(i, _)| i)
            .collect();

        if !dirty.is_empty() {
            debug!(
                "component `{}`: herbouw van {} segmentoppervlak(ken)",
                self.uid,
                dirty.len()
            );
            let this: &Self = self;
            #[cfg(feature = "parallel")]
            let built: Vec<(usize, Result<SegmentSurfaces, ModelError>)> = dirty
                .par_iter()
                .map(|&i| (i, this.build_segment_surfaces(i, profiles)))
                .collect();
            #[cfg(not(feature = "parallel"))]
            let built: Vec<(usize, Result<SegmentSurfaces, ModelError>)> = dirty
                .iter()
                .map(|&i| (i, this.build_segment_surfaces(i, profiles)))
                .collect();

            for (i, result) in built {
                let surfaces = result?;
                self.segments[i].surfaces.store(surfaces);
            }
        }

        Ok(self
            .segments
            .iter()
            .filter_map(|seg| seg.surfaces.get())
            .collect())
    }

    /// Het schone oppervlaktepaar van één segment.
    pub fn segment_surfaces(
        &mut self,
        index: usize,
        profiles: &ProfileLibrary,
    ) -> Result<Arc<SegmentSurfaces>, ModelError> {
        if index >= self.segments.len() {
            return Err(ModelError::NotFound {
                entity: "segment",
                key: index.to_string(),
            });
        }
        if let Some(surfaces) = self.segments[index].surfaces.get() {
            return Ok(surfaces);
        }
        let surfaces = self.build_segment_surfaces(index, profiles)?;
        Ok(self.segments[index].surfaces.store(surfaces))
    }

    /// De gesloten profieldraad aan een segmentuiteinde, in wereldruimte.
    pub fn profile_wire(
        &self,
        segment_index: usize,
        end: SegmentEnd,
        profiles: &ProfileLibrary,
    ) -> Result<Wire, ModelError> {
        let seg = self.segment(segment_index)?;
        let section = self.section_by_uid(seg.section_uid(end))?;
        let profile = profiles.by_uid(section.primary_element().profile_uid())?;
        Ok(profile.wire()?.transformed(self.section_world_matrix(section)))
    }

    // ── puntqueries ──────────────────────────────────────────────────────

    /// Wereldpunt op `(eta, xsi)` van een segment, aan de gevraagde zijde.
    /// Parameters buiten `[0, 1]` worden geklemd (met waarschuwing), nooit
    /// geweigerd; dezelfde klempolitiek geldt bij de inverse afbeelding.
    pub fn point_at(
        &mut self,
        segment_index: usize,
        eta: f64,
        xsi: f64,
        side: SurfaceSide,
        profiles: &ProfileLibrary,
    ) -> Result<Point3, ModelError> {
        let eta = clamp_param(eta, "eta");
        let xsi = clamp_param(xsi, "xsi");
        let surfaces = self.segment_surfaces(segment_index, profiles)?;
        Ok(surfaces.point_at(eta, xsi, side))
    }

    /// Punt op de bovenzijde van een segment.
    pub fn upper_point(
        &mut self,
        segment_index: usize,
        eta: f64,
        xsi: f64,
        profiles: &ProfileLibrary,
    ) -> Result<Point3, ModelError> {
        self.point_at(segment_index, eta, xsi, SurfaceSide::Upper, profiles)
    }

    /// Punt op de onderzijde van een segment.
    pub fn lower_point(
        &mut self,
        segment_index: usize,
        eta: f64,
        xsi: f64,
        profiles: &ProfileLibrary,
    ) -> Result<Point3, ModelError> {
        self.point_at(segment_index, eta, xsi, SurfaceSide::Lower, profiles)
    }

    /// Punt op de koordelijn van een segment.
    pub fn chord_point(
        &mut self,
        segment_index: usize,
        eta: f64,
        xsi: f64,
        profiles: &ProfileLibrary,
    ) -> Result<Point3, ModelError> {
        let upper = self.upper_point(segment_index, eta, xsi, profiles)?;
        let lower = self.lower_point(segment_index, eta, xsi, profiles)?;
        Ok(upper.lerp(lower, 0.5))
    }

    /// Inverse afbeelding over een deelverzameling segmenten. Bij (vrijwel)
    /// gelijke restafstanden wint deterministisch de eerdere segmentindex.
    fn find_in_segments(
        &mut self,
        indices: &[usize],
        point: Point3,
        profiles: &ProfileLibrary,
    ) -> Result<Option<SegmentEtaXsi>, ModelError> {
        self.ensure_all_surfaces(profiles)?;

        let mut best: Option<(SegmentEtaXsi, f64)> = None;
        for &i in indices {
            let Some(surfaces) = self.segments[i].surfaces.get() else {
                continue;
            };
            if !surfaces.bbox.contains_point(point) {
                continue;
            }
            for side in [SurfaceSide::Upper, SurfaceSide::Lower] {
                let projection = project_point_on_surface(
                    surfaces.surface(side),
                    point,
                    2 * surfaces.chord_samples,
                    LOFT_SPAN_SAMPLES,
                );
                let better = match &best {
                    None => true,
                    Some((_, best_dist)) => {
                        projection.distance + Tolerance::PROJECTION.eps < *best_dist
                    }
                };
                if better {
                    best = Some((
                        SegmentEtaXsi {
                            segment_index: i,
                            eta: projection.v,
                            xsi: projection.u,
                            on_top: side == SurfaceSide::Upper,
                        },
                        projection.distance,
                    ));
                }
            }
        }

        Ok(best
            .filter(|(_, dist)| *dist <= Tolerance::PROJECTION.eps)
            .map(|(hit, _)| hit))
    }

    /// Inverse afbeelding over alle segmenten van de component: van
    /// wereldpunt naar `(segment, eta, xsi, zijde)`. `None` betekent dat het
    /// punt buiten het bereik van de component ligt.
    pub fn segment_eta_xsi(
        &mut self,
        point: Point3,
        profiles: &ProfileLibrary,
    ) -> Result<Option<SegmentEtaXsi>, ModelError> {
        let all: Vec<usize> = (0..self.segments.len()).collect();
        self.find_in_segments(&all, point, profiles)
    }

    // ── componentsegment-queries ─────────────────────────────────────────

    /// Eta-breekpunten van een componentsegmentreeks, gewogen naar
    /// spanwijdte per segment.
    fn component_segment_breakpoints(
        &mut self,
        cs_index: usize,
        profiles: &ProfileLibrary,
    ) -> Result<(Vec<usize>, Vec<f64>), ModelError> {
        let indices = self.component_segment(cs_index)?.segment_indices().to_vec();
        let mut weights = Vec::with_capacity(indices.len());
        for &i in &indices {
            weights.push(self.segment_surfaces(i, profiles)?.span_length);
        }
        let total: f64 = weights.iter().sum();

        let mut breakpoints = Vec::with_capacity(indices.len() + 1);
        breakpoints.push(0.0);
        let mut running = 0.0;
        for w in &weights {
            running += w / total;
            breakpoints.push(running.min(1.0));
        }
        if let Some(last) = breakpoints.last_mut() {
            *last = 1.0;
        }
        Ok((indices, breakpoints))
    }

    /// Voorwaartse afbeelding in componentsegmentruimte: globale eta over de
    /// hele reeks, xsi als koordefractie. Op segmentgrenzen valt de evaluatie
    /// deterministisch in het eerdere segment (eta-lokaal 1).
    pub fn component_segment_point(
        &mut self,
        cs_index: usize,
        eta: f64,
        xsi: f64,
        side: SurfaceSide,
        profiles: &ProfileLibrary,
    ) -> Result<Point3, ModelError> {
        let eta = clamp_param(eta, "eta");
        let xsi = clamp_param(xsi, "xsi");
        let (indices, breakpoints) = self.component_segment_breakpoints(cs_index, profiles)?;

        // eerste interval waarvan het rechterbreekpunt eta bevat
        let slot = breakpoints
            .windows(2)
            .position(|w| eta <= w[1] + Tolerance::PARAM.eps)
            .unwrap_or(indices.len() - 1);
        let (b0, b1) = (breakpoints[slot], breakpoints[slot + 1]);
        let local = if b1 > b0 {
            ((eta - b0) / (b1 - b0)).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let surfaces = self.segment_surfaces(indices[slot], profiles)?;
        Ok(surfaces.point_at(local, xsi, side))
    }

    /// Inverse afbeelding binnen de componentsegmentreeks; het resultaat
    /// draagt de globale eta.
    pub fn component_segment_find(
        &mut self,
        cs_index: usize,
        point: Point3,
        profiles: &ProfileLibrary,
    ) -> Result<Option<SegmentEtaXsi>, ModelError> {
        let (indices, breakpoints) = self.component_segment_breakpoints(cs_index, profiles)?;
        let hit = self.find_in_segments(&indices, point, profiles)?;
        Ok(hit.map(|hit| {
            let slot = indices
                .iter()
                .position(|&i| i == hit.segment_index)
                .unwrap_or(0);
            let (b0, b1) = (breakpoints[slot], breakpoints[slot + 1]);
            SegmentEtaXsi {
                eta: b0 + hit.eta * (b1 - b0),
                ..hit
            }
        }))
    }

    // ── loftopbouw ───────────────────────────────────────────────────────

    /// Gezichten van één segment: boven- en onderhuid plus achterrandsluiting.
    fn segment_faces(surfaces: &SegmentSurfaces, index: usize) -> Vec<Face> {
        vec![
            tessellate_surface(
                &surfaces.upper,
                surfaces.chord_samples,
                LOFT_SPAN_SAMPLES,
                FaceKind::Upper,
                Some(index),
            ),
            tessellate_surface(
                &surfaces.lower,
                surfaces.chord_samples,
                LOFT_SPAN_SAMPLES,
                FaceKind::Lower,
                Some(index),
            ),
            trailing_edge_face(surfaces, LOFT_SPAN_SAMPLES, index),
        ]
    }

    /// Bouwt het samengestelde geheel: per segment een deelvorm, daarna een
    /// fusie over de reeks, afgesloten met wortel- en tipkappen.
    fn build_fused_shape(
        &self,
        surfaces: &[Arc<SegmentSurfaces>],
        profiles: &ProfileLibrary,
    ) -> Result<Shape, ModelError> {
        let mut parts = Vec::with_capacity(surfaces.len() + 2);
        for (i, s) in surfaces.iter().enumerate() {
            let part = Shape::from_faces(Self::segment_faces(s, i)).map_err(|source| {
                ModelError::Geometry {
                    context: format!("segment `{}`", self.segments[i].uid()),
                    source,
                }
            })?;
            parts.push(part);
        }

        // kappen op het eerste en laatste profiel
        let root = self.profile_wire(0, SegmentEnd::From, profiles)?;
        let tip = self.profile_wire(self.segments.len() - 1, SegmentEnd::To, profiles)?;
        let caps = Shape::from_faces(vec![cap_face(&root, Some(0)), cap_face(&tip, Some(self.segments.len() - 1))])
            .map_err(|source| ModelError::Geometry {
                context: format!("component `{}`", self.uid),
                source,
            })?;
        parts.push(caps);

        fuse_shapes(&parts).map_err(|source| ModelError::Geometry {
            context: format!("component `{}`", self.uid),
            source,
        })
    }

    /// De gespiegelde loft volgens de symmetrie-instelling, of `None` zonder
    /// symmetrie.
    pub fn mirrored_loft(
        &mut self,
        profiles: &ProfileLibrary,
    ) -> Result<Option<Shape>, ModelError> {
        let Some(plane) = self.symmetry.mirror_plane() else {
            return Ok(None);
        };
        let loft = self.loft(profiles)?;
        Ok(Some(loft.transformed(Transform::mirror(plane))))
    }

    /// De bovenschil: het boven-gedeelte van de samengestelde loft.
    pub fn upper_shape(&mut self, profiles: &ProfileLibrary) -> Result<Arc<Shape>, ModelError> {
        if let Some(shape) = self.caches.upper_shell.get() {
            return Ok(shape);
        }
        let fused = self.loft(profiles)?;
        let shell = fused
            .partition(|span| span.kind == FaceKind::Upper)
            .map_err(|source| ModelError::Geometry {
                context: format!("component `{}` (bovenschil)", self.uid),
                source,
            })?;
        Ok(self.caches.upper_shell.store(shell))
    }

    /// De onderschil: het onder-gedeelte van de samengestelde loft.
    pub fn lower_shape(&mut self, profiles: &ProfileLibrary) -> Result<Arc<Shape>, ModelError> {
        if let Some(shape) = self.caches.lower_shell.get() {
            return Ok(shape);
        }
        let fused = self.loft(profiles)?;
        let shell = fused
            .partition(|span| span.kind == FaceKind::Lower)
            .map_err(|source| ModelError::Geometry {
                context: format!("component `{}` (onderschil)", self.uid),
                source,
            })?;
        Ok(self.caches.lower_shell.store(shell))
    }

    /// Deelfusie over een aaneengesloten segmentbereik, per paar gecachet.
    pub fn fused_segments(
        &mut self,
        from: usize,
        to: usize,
        profiles: &ProfileLibrary,
    ) -> Result<Arc<Shape>, ModelError> {
        if from > to || to >= self.segments.len() {
            return Err(ModelError::NotFound {
                entity: "segmentbereik",
                key: format!("{from}..={to}"),
            });
        }
        if let Some(shape) = self.caches.fused_pairs.get(&(from, to)) {
            return Ok(Arc::clone(shape));
        }

        self.ensure_all_surfaces(profiles)?;
        let mut parts = Vec::with_capacity(to - from + 1);
        for i in from..=to {
            let Some(s) = self.segments[i].surfaces.get() else {
                continue;
            };
            let part = Shape::from_faces(Self::segment_faces(&s, i)).map_err(|source| {
                ModelError::Geometry {
                    context: format!("segment `{}`", self.segments[i].uid()),
                    source,
                }
            })?;
            parts.push(part);
        }
        let fused = fuse_shapes(&parts).map_err(|source| ModelError::Geometry {
            context: format!("component `{}`", self.uid),
            source,
        })?;
        let shared = Arc::new(fused);
        self.caches
            .fused_pairs
            .insert((from, to), Arc::clone(&shared));
        Ok(shared)
    }

    // ── mutatoren ────────────────────────────────────────────────────────

    /// Vervangt de sectietransformatie en vervuilt alle afhankelijke caches.
    pub(crate) fn set_section_transformation(
        &mut self,
        section_uid: &str,
        transformation: Transformation,
    ) -> Result<(), ModelError> {
        let section = self
            .sections
            .iter_mut()
            .find(|s| s.uid() == section_uid)
            .ok_or_else(|| ModelError::NotFound {
                entity: "sectie",
                key: section_uid.to_owned(),
            })?;
        section.set_transformation(transformation);
        self.invalidate_for_section(section_uid);
        Ok(())
    }

    /// Vervangt de elementtransformatie binnen zijn sectie.
    pub(crate) fn set_element_transformation(
        &mut self,
        element_uid: &str,
        transformation: Transformation,
    ) -> Result<(), ModelError> {
        let mut owner: Option<String> = None;
        for section in &mut self.sections {
            if let Some(element) = section
                .elements_mut()
                .iter_mut()
                .find(|e| e.uid() == element_uid)
            {
                element.set_transformation(transformation);
                owner = Some(section.uid().to_owned());
                break;
            }
        }
        let owner = owner.ok_or_else(|| ModelError::NotFound {
            entity: "element",
            key: element_uid.to_owned(),
        })?;
        self.invalidate_for_section(&owner);
        Ok(())
    }

    /// Past de parameters van een positionering aan. De keten kan elke
    /// sectie stroomafwaarts verplaatsen; alles wordt vervuild.
    pub(crate) fn set_positioning_parameters(
        &mut self,
        positioning_uid: &str,
        length: f64,
        sweep_deg: f64,
        dihedral_deg: f64,
    ) -> Result<(), ModelError> {
        let positioning = self
            .positionings
            .items_mut()
            .iter_mut()
            .find(|p| p.uid() == positioning_uid)
            .ok_or_else(|| ModelError::NotFound {
                entity: "positionering",
                key: positioning_uid.to_owned(),
            })?;
        positioning.set_parameters(length, sweep_deg, dihedral_deg);
        self.invalidate();
        Ok(())
    }

    /// Verschuift de component als geheel.
    pub(crate) fn translate(&mut self, delta: Vec3) {
        self.transformation.translate(delta);
        self.invalidate();
    }

    pub(crate) fn set_transformation(&mut self, transformation: Transformation) {
        self.transformation = transformation;
        self.invalidate();
    }

    /// Verwijdert een sectie. Geweigerd zolang een segment ernaar verwijst.
    pub(crate) fn remove_section(&mut self, section_uid: &str) -> Result<Section, ModelError> {
        if let Some(seg) = self
            .segments
            .iter()
            .find(|seg| seg.references_section(section_uid))
        {
            return Err(ModelError::SectionInUse {
                uid: section_uid.to_owned(),
                segment_uid: seg.uid().to_owned(),
            });
        }
        let idx = self
            .sections
            .iter()
            .position(|s| s.uid() == section_uid)
            .ok_or_else(|| ModelError::NotFound {
                entity: "sectie",
                key: section_uid.to_owned(),
            })?;
        Ok(self.sections.remove(idx))
    }

    /// Is de samengestelde loft op dit moment schoon gecachet?
    #[must_use]
    pub const fn loft_is_cached(&self) -> bool {
        !self.caches.fused.is_dirty()
    }

    /// Aantal segmenten waarvan het oppervlaktepaar schoon is.
    #[must_use]
    pub fn clean_surface_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|seg| !seg.surfaces.is_dirty())
            .count()
    }

    /// Vervuilt de segmenten die de sectie raken plus alle componentcaches.
    fn invalidate_for_section(&mut self, section_uid: &str) {
        let mut touched = 0;
        for seg in &mut self.segments {
            if seg.references_section(section_uid) {
                seg.invalidate();
                touched += 1;
            }
        }
        if touched == 0 {
            warn!(
                "sectie `{section_uid}` van component `{}` wordt door geen segment gebruikt",
                self.uid
            );
        }
        self.caches.invalidate_all();
        for cs in &mut self.component_segments {
            for device in cs.devices_mut() {
                device.invalidate();
            }
        }
    }
}

impl HasSections for Component {
    fn section_count(&self) -> usize {
        self.sections.len()
    }

    fn section(&self, index: usize) -> Result<&Section, ModelError> {
        self.sections.get(index).ok_or(ModelError::NotFound {
            entity: "sectie",
            key: index.to_string(),
        })
    }
}

impl HasSegments for Component {
    fn segment_count(&self) -> usize {
        self.segments.len()
    }

    fn segment(&self, index: usize) -> Result<&Segment, ModelError> {
        self.segments.get(index).ok_or(ModelError::NotFound {
            entity: "segment",
            key: index.to_string(),
        })
    }

    fn segment_by_uid(&self, uid: &str) -> Result<&Segment, ModelError> {
        self.segments
            .iter()
            .find(|seg| seg.uid() == uid)
            .ok_or_else(|| ModelError::NotFound {
                entity: "segment",
                key: uid.to_owned(),
            })
    }
}

impl ProducesLoft for Component {
    /// De samengestelde loft met randsluiting. Een mislukte bouw laat de
    /// cache vuil; er wordt nooit een gedeeltelijke vorm opgeleverd.
    fn loft(&mut self, profiles: &ProfileLibrary) -> Result<Arc<Shape>, ModelError> {
        if let Some(shape) = self.caches.fused.get() {
            return Ok(shape);
        }
        if self.segments.is_empty() {
            return Err(ModelError::Geometry {
                context: format!("component `{}`", self.uid),
                source: crate::geom::GeometryError::EmptyShape,
            });
        }
        debug!("component `{}`: herbouw van de loft", self.uid);
        let surfaces = self.ensure_all_surfaces(profiles)?;
        let shape = self.build_fused_shape(&surfaces, profiles)?;
        Ok(self.caches.fused.store(shape))
    }

    /// Vervuilt alle caches van de component.
    fn invalidate(&mut self) {
        for seg in &mut self.segments {
            seg.invalidate();
        }
        self.caches.invalidate_all();
        for cs in &mut self.component_segments {
            for device in cs.devices_mut() {
                device.invalidate();
            }
        }
    }
}

/// Achterrandsluiting: een strip tussen de achterrandcurves van boven- en
/// onderzijde. Bij een scherpe achterrand vervallen de gelaste driehoeken.
fn trailing_edge_face(surfaces: &SegmentSurfaces, nv: usize, segment: usize) -> Face {
    let nv = nv.max(2);
    let mut positions = Vec::with_capacity(nv * 2);
    for j in 0..nv {
        let v = j as f64 / (nv - 1) as f64;
        positions.push(surfaces.upper.point_at(1.0, v));
        positions.push(surfaces.lower.point_at(1.0, v));
    }
    let mut indices = Vec::with_capacity((nv - 1) * 6);
    for j in 0..nv - 1 {
        let a = (2 * j) as u32;
        let b = a + 1;
        let c = a + 3;
        let d = a + 2;
        indices.extend_from_slice(&[a, b, c, a, c, d]);
    }
    Face {
        kind: FaceKind::TrailingEdge,
        segment: Some(segment),
        patch: FacePatch { positions, indices },
    }
}

/// Kap op een gesloten profieldraad: een waaier rond het zwaartepunt.
fn cap_face(wire: &Wire, segment: Option<usize>) -> Face {
    let points = wire.points();
    let n = points.len();
    let centroid = {
        let sum = points
            .iter()
            .fold(Vec3::ZERO, |acc, p| acc + p.to_vec());
        Point3::ORIGIN.add_vec(sum / n as f64)
    };
    let mut positions = Vec::with_capacity(n + 1);
    positions.extend_from_slice(points);
    positions.push(centroid);
    let centre = n as u32;
    let mut indices = Vec::with_capacity(n * 3);
    for i in 0..n {
        let j = (i + 1) % n;
        indices.extend_from_slice(&[i as u32, j as u32, centre]);
    }
    Face {
        kind: FaceKind::Cap,
        segment,
        patch: FacePatch { positions, indices },
    }
}
