//! Het modelniveau: de hiërarchische vliegtuigbeschrijving en haar
//! geometriequeries.
//!
//! De [`Configuration`] is de wortel: een profielbibliotheek, een geordende
//! componentenlijst, het uid-register voor kruisverwijzingen en de
//! afhankelijkheidsranden waarlangs invalidatie zich voortplant. Alle
//! mutaties verlopen via expliciete setters op dit niveau, zodat zowel de
//! eigen caches als die van refererende componenten precies één keer vervuild
//! raken.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use thiserror::Error;

pub mod cache;
pub mod component;
pub mod component_segment;
pub mod device;
pub mod positioning;
pub mod profile;
pub mod registry;
pub mod section;
pub mod segment;
pub mod transformation;

use crate::geom::{sweep_wire, GeometryError, Point3, Shape, Tolerance, Transform, Vec3, Wire};

use component::{Component, ProducesLoft, SegmentEtaXsi};
use profile::ProfileLibrary;
use registry::{RegistryError, UidRegistry, UidTarget};
use segment::{SegmentEnd, SurfaceSide};
use transformation::Transformation;

/// Fouten op modelniveau.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// Opzoeking op index of uid zonder resultaat.
    #[error("geen {entity} gevonden voor `{key}`")]
    NotFound { entity: &'static str, key: String },
    /// Registratie- of resolutiefout van het uid-register.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// Geometrieconstructie is mislukt; de betrokken caches blijven vuil.
    #[error("geometrieconstructie mislukt voor {context}: {source}")]
    Geometry {
        context: String,
        source: GeometryError,
    },
    #[error("profiel `{uid}` is ongeldig: {reason}")]
    InvalidProfile { uid: String, reason: String },
    #[error("sectie `{uid}` heeft geen elementen")]
    EmptySection { uid: String },
    #[error("sectie `{uid}` heeft meerdere inkomende positioneringen")]
    DuplicatePositioning { uid: String },
    #[error("positioneringsketen bevat een cyclus bij sectie `{uid}`")]
    PositioningCycle { uid: String },
    #[error("segment `{segment_uid}` verwijst naar onbekende sectie `{section_uid}`")]
    UnknownSectionRef {
        segment_uid: String,
        section_uid: String,
    },
    #[error("componentsegment `{uid}` overspant geen aaneengesloten segmentreeks")]
    NonContiguousRun { uid: String },
    #[error("sectie `{uid}` wordt nog gebruikt door segment `{segment_uid}`")]
    SectionInUse { uid: String, segment_uid: String },
    #[error("ongeldig uitslagpad: {reason}")]
    InvalidDevicePath { reason: String },
}

/// De modelwortel.
#[derive(Debug, Clone)]
pub struct Configuration {
    profiles: ProfileLibrary,
    components: Vec<Component>,
    registry: UidRegistry,
    /// Componentindex → indices van componenten die ernaar verwijzen.
    dependents: HashMap<usize, Vec<usize>>,
}

impl Configuration {
    /// Bouwt de configuratie op: registreert alle uids, valideert de
    /// kruisverwijzingen en legt de afhankelijkheidsranden vast.
    pub fn new(
        profiles: ProfileLibrary,
        components: Vec<Component>,
    ) -> Result<Self, ModelError> {
        let mut registry = UidRegistry::new();

        for (pi, p) in profiles.items().iter().enumerate() {
            registry.register(p.uid(), UidTarget::Profile { profile: pi })?;
        }
        for (ci, comp) in components.iter().enumerate() {
            registry.register(comp.uid(), UidTarget::Component { component: ci })?;
            for (si, section) in comp.sections().iter().enumerate() {
                registry.register(
                    section.uid(),
                    UidTarget::Section {
                        component: ci,
                        section: si,
                    },
                )?;
                for (ei, element) in section.elements().iter().enumerate() {
                    registry.register(
                        element.uid(),
                        UidTarget::Element {
                            component: ci,
                            section: si,
                            element: ei,
                        },
                    )?;
                }
            }
            for (gi, segment) in comp.segments().iter().enumerate() {
                registry.register(
                    segment.uid(),
                    UidTarget::Segment {
                        component: ci,
                        segment: gi,
                    },
                )?;
            }
            for (csi, cs) in comp.component_segments().iter().enumerate() {
                registry.register(
                    cs.uid(),
                    UidTarget::ComponentSegment {
                        component: ci,
                        component_segment: csi,
                    },
                )?;
                for (di, dev) in cs.devices().iter().enumerate() {
                    registry.register(
                        dev.uid(),
                        UidTarget::Device {
                            component: ci,
                            component_segment: csi,
                            device: di,
                        },
                    )?;
                }
            }
        }

        // profielreferenties moeten oplossen
        for comp in &components {
            for section in comp.sections() {
                for element in section.elements() {
                    registry.resolve_profile(element.profile_uid())?;
                }
            }
        }

        // ankers van stuurvlakken oplossen en afhankelijkheidsranden leggen
        let mut dependents: HashMap<usize, Vec<usize>> = HashMap::new();
        for (ci, comp) in components.iter().enumerate() {
            for cs in comp.component_segments() {
                for dev in cs.devices() {
                    let (anchor, _) =
                        registry.resolve_component_segment(dev.component_segment_uid())?;
                    if anchor != ci {
                        let entry = dependents.entry(anchor).or_default();
                        if !entry.contains(&ci) {
                            entry.push(ci);
                        }
                    }
                }
            }
        }

        Ok(Self {
            profiles,
            components,
            registry,
            dependents,
        })
    }

    #[must_use]
    pub const fn profiles(&self) -> &ProfileLibrary {
        &self.profiles
    }

    #[must_use]
    pub const fn registry(&self) -> &UidRegistry {
        &self.registry
    }

    #[must_use]
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn component(&self, index: usize) -> Result<&Component, ModelError> {
        self.components.get(index).ok_or(ModelError::NotFound {
            entity: "component",
            key: index.to_string(),
        })
    }

    pub fn component_by_uid(&self, uid: &str) -> Result<&Component, ModelError> {
        let index = self.registry.resolve_component(uid)?;
        self.component(index)
    }

    fn component_mut(&mut self, uid: &str) -> Result<(usize, &mut Component), ModelError> {
        let index = self.registry.resolve_component(uid)?;
        Ok((index, &mut self.components[index]))
    }

    // ── geometriequeries ─────────────────────────────────────────────────

    /// De samengestelde loft (met randsluiting) van een component.
    pub fn loft(&mut self, component_uid: &str) -> Result<Arc<Shape>, ModelError> {
        let index = self.registry.resolve_component(component_uid)?;
        let Self {
            profiles,
            components,
            ..
        } = self;
        components[index].loft(profiles)
    }

    /// De bovenschil van een component.
    pub fn upper_shape(&mut self, component_uid: &str) -> Result<Arc<Shape>, ModelError> {
        let index = self.registry.resolve_component(component_uid)?;
        let Self {
            profiles,
            components,
            ..
        } = self;
        components[index].upper_shape(profiles)
    }

    /// De onderschil van een component.
    pub fn lower_shape(&mut self, component_uid: &str) -> Result<Arc<Shape>, ModelError> {
        let index = self.registry.resolve_component(component_uid)?;
        let Self {
            profiles,
            components,
            ..
        } = self;
        components[index].lower_shape(profiles)
    }

    /// De gespiegelde loft volgens de symmetrie van de component.
    pub fn mirrored_loft(&mut self, component_uid: &str) -> Result<Option<Shape>, ModelError> {
        let index = self.registry.resolve_component(component_uid)?;
        let Self {
            profiles,
            components,
            ..
        } = self;
        components[index].mirrored_loft(profiles)
    }

    /// Deelfusie over een segmentbereik van een component.
    pub fn fused_segments(
        &mut self,
        component_uid: &str,
        from: usize,
        to: usize,
    ) -> Result<Arc<Shape>, ModelError> {
        let index = self.registry.resolve_component(component_uid)?;
        let Self {
            profiles,
            components,
            ..
        } = self;
        components[index].fused_segments(from, to, profiles)
    }

    /// Wereldpunt op een segmentoppervlak.
    pub fn point_at(
        &mut self,
        component_uid: &str,
        segment_index: usize,
        eta: f64,
        xsi: f64,
        side: SurfaceSide,
    ) -> Result<Point3, ModelError> {
        let index = self.registry.resolve_component(component_uid)?;
        let Self {
            profiles,
            components,
            ..
        } = self;
        components[index].point_at(segment_index, eta, xsi, side, profiles)
    }

    /// Inverse afbeelding: wereldpunt → `(segment, eta, xsi, zijde)`.
    /// `None` is de normale uitkomst voor punten buiten het bereik.
    pub fn segment_eta_xsi(
        &mut self,
        component_uid: &str,
        point: Point3,
    ) -> Result<Option<SegmentEtaXsi>, ModelError> {
        let index = self.registry.resolve_component(component_uid)?;
        let Self {
            profiles,
            components,
            ..
        } = self;
        components[index].segment_eta_xsi(point, profiles)
    }

    /// Voorwaartse afbeelding in componentsegmentruimte.
    pub fn component_segment_point(
        &mut self,
        cs_uid: &str,
        eta: f64,
        xsi: f64,
        side: SurfaceSide,
    ) -> Result<Point3, ModelError> {
        let (ci, csi) = self.registry.resolve_component_segment(cs_uid)?;
        let Self {
            profiles,
            components,
            ..
        } = self;
        components[ci].component_segment_point(csi, eta, xsi, side, profiles)
    }

    /// Inverse afbeelding in componentsegmentruimte (globale eta).
    pub fn component_segment_find(
        &mut self,
        cs_uid: &str,
        point: Point3,
    ) -> Result<Option<SegmentEtaXsi>, ModelError> {
        let (ci, csi) = self.registry.resolve_component_segment(cs_uid)?;
        let Self {
            profiles,
            components,
            ..
        } = self;
        components[ci].component_segment_find(csi, point, profiles)
    }

    /// Profieldraad aan een segmentuiteinde, in wereldruimte.
    pub fn profile_wire(
        &mut self,
        component_uid: &str,
        segment_index: usize,
        end: SegmentEnd,
    ) -> Result<Wire, ModelError> {
        let index = self.registry.resolve_component(component_uid)?;
        self.components[index].profile_wire(segment_index, end, &self.profiles)
    }

    /// Positioneringstransformatie voor een sectie.
    pub fn positioning_transformation(
        &self,
        component_uid: &str,
        section_uid: &str,
    ) -> Result<Transform, ModelError> {
        self.component_by_uid(component_uid)?
            .positioning_transformation(section_uid)
    }

    // ── stuurvlakken ─────────────────────────────────────────────────────

    /// De uitsnijdingsprisma van een stuurvlak, gecachet bij de eigenaar en
    /// opgebouwd uit de geometrie van het ankercomponentsegment.
    pub fn device_shape(&mut self, device_uid: &str) -> Result<Arc<Shape>, ModelError> {
        let (owner, csi, di) = self.registry.resolve_device(device_uid)?;
        if let Some(shape) =
            self.components[owner].component_segments()[csi].devices()[di].shape.get()
        {
            return Ok(shape);
        }

        let device = self.components[owner].component_segments()[csi].devices()[di].clone();
        let (anchor_ci, anchor_csi) = self
            .registry
            .resolve_component_segment(device.component_segment_uid())?;
        let inner = device.inner_border();
        let outer = device.outer_border();

        let (corners, sweep) = {
            let Self {
                profiles,
                components,
                ..
            } = self;
            let comp = &mut components[anchor_ci];
            let side_point = |comp: &mut Component, eta: f64, xsi: f64, side: SurfaceSide| {
                comp.component_segment_point(anchor_csi, eta, xsi, side, profiles)
            };
            let iu = side_point(comp, inner.eta, inner.xsi, SurfaceSide::Upper)?;
            let il = side_point(comp, inner.eta, inner.xsi, SurfaceSide::Lower)?;
            let ou = side_point(comp, outer.eta, outer.xsi, SurfaceSide::Upper)?;
            let ol = side_point(comp, outer.eta, outer.xsi, SurfaceSide::Lower)?;
            let ite = side_point(comp, inner.eta, 1.0, SurfaceSide::Upper)?
                .lerp(side_point(comp, inner.eta, 1.0, SurfaceSide::Lower)?, 0.5);
            let ote = side_point(comp, outer.eta, 1.0, SurfaceSide::Upper)?
                .lerp(side_point(comp, outer.eta, 1.0, SurfaceSide::Lower)?, 0.5);

            let ile = iu.lerp(il, 0.5);
            let ole = ou.lerp(ol, 0.5);
            let mut thickness = (iu - il) + (ou - ol);
            if thickness.length() <= Tolerance::ZERO_LENGTH.eps {
                // scherpe doorsnede: neem een verticale dikte van 20% koorde
                thickness = Vec3::Z * (0.2 * ile.distance(ite)).max(Tolerance::DERIVATIVE.eps);
            }
            let sweep = thickness * 1.5;
            (vec![ile, ite, ote, ole], sweep)
        };

        let geometry = |source| ModelError::Geometry {
            context: format!("stuurvlak `{device_uid}`"),
            source,
        };
        let base: Vec<Point3> = corners
            .iter()
            .map(|p| p.add_vec(sweep.mul_scalar(-0.5)))
            .collect();
        let wire = Wire::closed(base).map_err(geometry)?;
        let prism = sweep_wire(&wire, sweep).map_err(geometry)?;

        Ok(self.components[owner].component_segments_mut()[csi].devices_mut()[di]
            .shape
            .store(prism))
    }

    /// Geïnterpoleerde scharniertranslatie en -rotatie bij relatieve uitslag.
    pub fn device_deflection(
        &self,
        device_uid: &str,
        rel_deflection: f64,
    ) -> Result<Option<(Vec3, f64)>, ModelError> {
        let (owner, csi, di) = self.registry.resolve_device(device_uid)?;
        Ok(self.components[owner].component_segments()[csi].devices()[di]
            .path()
            .interpolate(rel_deflection))
    }

    // ── mutatoren en invalidatie ─────────────────────────────────────────

    /// Vervangt de transformatie van een sectie en vervuilt de eigenaar en
    /// alle refererende componenten.
    pub fn set_section_transformation(
        &mut self,
        section_uid: &str,
        transformation: Transformation,
    ) -> Result<(), ModelError> {
        let (ci, _) = self.registry.resolve_section(section_uid)?;
        self.components[ci].set_section_transformation(section_uid, transformation)?;
        self.invalidate_component(ci);
        Ok(())
    }

    /// Vervangt de transformatie van een element.
    pub fn set_element_transformation(
        &mut self,
        element_uid: &str,
        transformation: Transformation,
    ) -> Result<(), ModelError> {
        let (ci, _, _) = self.registry.resolve_element(element_uid)?;
        self.components[ci].set_element_transformation(element_uid, transformation)?;
        self.invalidate_component(ci);
        Ok(())
    }

    /// Past de parameters van een positionering aan.
    pub fn set_positioning_parameters(
        &mut self,
        component_uid: &str,
        positioning_uid: &str,
        length: f64,
        sweep_deg: f64,
        dihedral_deg: f64,
    ) -> Result<(), ModelError> {
        let (ci, comp) = self.component_mut(component_uid)?;
        comp.set_positioning_parameters(positioning_uid, length, sweep_deg, dihedral_deg)?;
        self.invalidate_component(ci);
        Ok(())
    }

    /// Verschuift een component als geheel.
    pub fn translate_component(
        &mut self,
        component_uid: &str,
        delta: Vec3,
    ) -> Result<(), ModelError> {
        let (ci, comp) = self.component_mut(component_uid)?;
        comp.translate(delta);
        self.invalidate_component(ci);
        Ok(())
    }

    /// Vervangt de transformatie van een component.
    pub fn set_component_transformation(
        &mut self,
        component_uid: &str,
        transformation: Transformation,
    ) -> Result<(), ModelError> {
        let (ci, comp) = self.component_mut(component_uid)?;
        comp.set_transformation(transformation);
        self.invalidate_component(ci);
        Ok(())
    }

    /// Vervangt de puntenlus van een profiel en vervuilt alle componenten
    /// die het profiel gebruiken.
    pub fn replace_profile_points(
        &mut self,
        profile_uid: &str,
        points: Vec<Point3>,
    ) -> Result<(), ModelError> {
        self.registry.resolve_profile(profile_uid)?;
        self.profiles.replace_points(profile_uid, points)?;

        let users: Vec<usize> = self
            .components
            .iter()
            .enumerate()
            .filter(|(_, comp)| {
                comp.sections().iter().any(|s| {
                    s.elements()
                        .iter()
                        .any(|e| e.profile_uid() == profile_uid)
                })
            })
            .map(|(ci, _)| ci)
            .collect();
        for ci in users {
            self.invalidate_component(ci);
        }
        Ok(())
    }

    /// Verwijdert een sectie. Geweigerd zolang een segment ernaar verwijst;
    /// bij succes worden de sectie- en element-uids uitgeschreven.
    pub fn remove_section(&mut self, section_uid: &str) -> Result<(), ModelError> {
        let (ci, _) = self.registry.resolve_section(section_uid)?;
        let removed = self.components[ci].remove_section(section_uid)?;
        self.registry.unregister(removed.uid());
        for element in removed.elements() {
            self.registry.unregister(element.uid());
        }
        // indexpaden van latere secties zijn verschoven
        self.reindex_sections(ci);
        self.invalidate_component(ci);
        Ok(())
    }

    /// Herregistreert de sectie- en elementpaden van een component.
    fn reindex_sections(&mut self, ci: usize) {
        for (si, section) in self.components[ci].sections().iter().enumerate() {
            self.registry.unregister(section.uid());
            let _ = self.registry.register(
                section.uid(),
                UidTarget::Section {
                    component: ci,
                    section: si,
                },
            );
            for (ei, element) in section.elements().iter().enumerate() {
                self.registry.unregister(element.uid());
                let _ = self.registry.register(
                    element.uid(),
                    UidTarget::Element {
                        component: ci,
                        section: si,
                        element: ei,
                    },
                );
            }
        }
    }

    /// Vervuilt het object achter `uid` (component of profiel) en alle
    /// componenten die ervan afhangen.
    pub fn invalidate_uid(&mut self, uid: &str) -> Result<(), ModelError> {
        let target = self.registry.lookup(uid).ok_or_else(|| ModelError::NotFound {
            entity: "uid",
            key: uid.to_owned(),
        })?;
        match target {
            UidTarget::Profile { .. } => {
                let uid = uid.to_owned();
                let users: Vec<usize> = self
                    .components
                    .iter()
                    .enumerate()
                    .filter(|(_, comp)| {
                        comp.sections()
                            .iter()
                            .any(|s| s.elements().iter().any(|e| e.profile_uid() == uid))
                    })
                    .map(|(ci, _)| ci)
                    .collect();
                for ci in users {
                    self.invalidate_component(ci);
                }
            }
            UidTarget::Component { component }
            | UidTarget::Section { component, .. }
            | UidTarget::Element { component, .. }
            | UidTarget::Segment { component, .. }
            | UidTarget::ComponentSegment { component, .. }
            | UidTarget::Device { component, .. } => {
                self.invalidate_component(component);
            }
        }
        Ok(())
    }

    /// Vervuilt alle componenten.
    pub fn invalidate_all(&mut self) {
        for comp in &mut self.components {
            comp.invalidate();
        }
    }

    /// Vervuilt een component en, transitief, iedereen die ernaar verwijst.
    /// Een bezocht-verzameling garandeert precies één invalidatie per
    /// component per mutatie.
    fn invalidate_component(&mut self, start: usize) {
        let mut stack = vec![start];
        let mut visited: HashSet<usize> = HashSet::new();
        while let Some(ci) = stack.pop() {
            if !visited.insert(ci) {
                continue;
            }
            self.components[ci].invalidate();
            if let Some(deps) = self.dependents.get(&ci) {
                stack.extend(deps.iter().copied());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::component::{ComponentKind, Symmetry};
    use super::profile::diamond_profile;
    use super::section::Element;
    use super::component::HasSegments;
    use super::positioning::{Positioning, Positionings};
    use super::section::Section;
    use super::segment::Segment;
    use super::*;

    fn wing() -> Component {
        let section = |uid: &str| {
            Section::new(
                uid,
                "",
                Transformation::IDENTITY,
                vec![Element::new(
                    &format!("{uid}_el"),
                    "",
                    "prof",
                    Transformation::IDENTITY,
                )],
            )
            .unwrap()
        };
        Component::new(
            "vleugel",
            "testvleugel",
            ComponentKind::Wing,
            Symmetry::None,
            Transformation::IDENTITY,
            vec![section("sec1"), section("sec2"), section("sec3")],
            Positionings::new(vec![
                Positioning::new("pos2", Some("sec1"), "sec2", 5.0, 0.0, 0.0),
                Positioning::new("pos3", Some("sec2"), "sec3", 5.0, 0.0, 0.0),
            ])
            .unwrap(),
            vec![
                Segment::new("seg1", "", "sec1", "sec2", Vec::new()),
                Segment::new("seg2", "", "sec2", "sec3", Vec::new()),
            ],
            Vec::new(),
        )
        .unwrap()
    }

    fn configuration() -> Configuration {
        Configuration::new(
            ProfileLibrary::new(vec![diamond_profile("prof")]),
            vec![wing()],
        )
        .unwrap()
    }

    #[test]
    fn registry_is_populated_on_construction() {
        let configuration = configuration();
        let registry = configuration.registry();
        assert!(registry.contains("vleugel"));
        assert!(registry.contains("sec2"));
        assert!(registry.contains("sec2_el"));
        assert!(registry.contains("seg2"));
        assert_eq!(registry.resolve_segment("seg2").unwrap(), (0, 1));
    }

    #[test]
    fn unknown_profile_reference_fails_construction() {
        let section = Section::new(
            "sec1",
            "",
            Transformation::IDENTITY,
            vec![Element::new("el", "", "bestaat_niet", Transformation::IDENTITY)],
        )
        .unwrap();
        let component = Component::new(
            "kaal",
            "",
            ComponentKind::Wing,
            Symmetry::None,
            Transformation::IDENTITY,
            vec![section],
            Positionings::default(),
            Vec::new(),
            Vec::new(),
        )
        .unwrap();
        let err = Configuration::new(
            ProfileLibrary::new(vec![diamond_profile("prof")]),
            vec![component],
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::Registry(_)));
    }

    #[test]
    fn segment_lookup_by_index_and_uid() {
        let configuration = configuration();
        let component = configuration.component_by_uid("vleugel").unwrap();
        assert_eq!(component.segment_count(), 2);
        assert_eq!(component.segment(1).unwrap().uid(), "seg2");
        assert!(component.segment(2).is_err());
        assert_eq!(component.segment_by_uid("seg1").unwrap().uid(), "seg1");
        assert!(matches!(
            component.segment_by_uid("seg9"),
            Err(ModelError::NotFound { .. })
        ));
    }

    #[test]
    fn remove_referenced_section_is_rejected() {
        let mut configuration = configuration();
        let err = configuration.remove_section("sec2").unwrap_err();
        assert!(matches!(err, ModelError::SectionInUse { .. }));
        // de registratie blijft bestaan na de geweigerde verwijdering
        assert!(configuration.registry().contains("sec2"));
    }

    #[test]
    fn remove_unreferenced_section_unregisters() {
        // zelfde vleugel, maar zonder het tweede segment zodat sec3 vrijkomt
        let full = wing();
        let component = Component::new(
            full.uid(),
            full.name(),
            full.kind(),
            full.symmetry(),
            *full.transformation(),
            full.sections().to_vec(),
            full.positionings().clone(),
            vec![Segment::new("seg1", "", "sec1", "sec2", Vec::new())],
            Vec::new(),
        )
        .unwrap();
        let mut configuration = Configuration::new(
            ProfileLibrary::new(vec![diamond_profile("prof")]),
            vec![component],
        )
        .unwrap();
        configuration.remove_section("sec3").unwrap();
        assert!(!configuration.registry().contains("sec3"));
        assert!(!configuration.registry().contains("sec3_el"));
    }

    #[test]
    fn invalidate_unknown_uid_is_not_found() {
        let mut configuration = configuration();
        let err = configuration.invalidate_uid("spook").unwrap_err();
        assert!(matches!(err, ModelError::NotFound { .. }));
    }

    #[test]
    fn positioning_transformation_accumulates_chain() {
        let configuration = configuration();
        let t = configuration
            .positioning_transformation("vleugel", "sec3")
            .unwrap();
        let p = t.apply_point(Point3::ORIGIN);
        assert!((p.y - 10.0).abs() < 1e-12);
    }

    #[test]
    fn profile_replacement_invalidates_users() {
        let mut configuration = configuration();
        let loft = configuration.loft("vleugel").unwrap();
        configuration
            .replace_profile_points(
                "prof",
                vec![
                    Point3::new(1.0, 0.0, 0.0),
                    Point3::new(0.5, 0.0, -0.2),
                    Point3::new(0.0, 0.0, 0.0),
                    Point3::new(0.5, 0.0, 0.2),
                ],
            )
            .unwrap();
        assert!(!configuration.component_by_uid("vleugel").unwrap().loft_is_cached());
        let rebuilt = configuration.loft("vleugel").unwrap();
        assert!(!Arc::ptr_eq(&loft, &rebuilt));
    }
}
