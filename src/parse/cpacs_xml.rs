//! Parser en schrijver voor de CPACS-achtige XML-beschrijving.
//!
//! De documentstructs spiegelen de attribuutboom één-op-één; de
//! bouwfuncties daarachter zetten het document om in het gevalideerde model
//! en terug. Semantisch verplichte elementen die structureel optioneel zijn
//! (puntlijsten, sectiereferenties, grenzen) leveren een expliciete
//! [`ParseError::MissingElement`] op in plaats van een stille default.

use quick_xml::de::from_str;
use quick_xml::se::Serializer;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geom::{Point3, Vec3};
use crate::model::component::{Component, ComponentKind, Symmetry};
use crate::model::component_segment::ComponentSegment;
use crate::model::device::{ControlSurfaceDevice, DeflectionStep, DeviceBorder, DevicePath};
use crate::model::positioning::{Positioning, Positionings};
use crate::model::profile::{Profile, ProfileLibrary};
use crate::model::section::{Element, Section};
use crate::model::segment::{GuideCurve, Segment, SurfaceSide};
use crate::model::transformation::Transformation;
use crate::model::{Configuration, ModelError};

/// Resultaattype voor lees- en schrijfoperaties.
pub type ParseResult<T> = Result<T, ParseError>;

/// Beschrijft fouten tijdens het lezen of schrijven van het document.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Het XML-document kon niet (de)geserialiseerd worden.
    #[error("XML-parsefout: {0}")]
    Xml(#[from] quick_xml::DeError),
    /// Een semantisch verplicht element ontbreekt.
    #[error("verplicht element ontbreekt: {path}")]
    MissingElement { path: String },
    /// Een waarde heeft niet de verwachte vorm.
    #[error("misvormde waarde bij {path}: {reason}")]
    Malformed { path: String, reason: String },
    /// Het document is wel leesbaar maar levert geen geldig model op.
    #[error(transparent)]
    Model(#[from] ModelError),
}

// ─── documentstructs ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CpacsDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    header: Option<HeaderDoc>,
    vehicles: VehiclesDoc,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct HeaderDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    creator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct VehiclesDoc {
    #[serde(default)]
    profiles: ProfilesDoc,
    #[serde(default)]
    components: ComponentsDoc,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ProfilesDoc {
    #[serde(default, rename = "profile")]
    items: Vec<ProfileDoc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ProfileDoc {
    #[serde(rename = "@uID")]
    uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, rename = "pointList", skip_serializing_if = "Option::is_none")]
    point_list: Option<PointListDoc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PointListDoc {
    #[serde(default, rename = "point")]
    points: Vec<PointDoc>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct PointDoc {
    x: f64,
    y: f64,
    z: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ComponentsDoc {
    #[serde(default, rename = "component")]
    items: Vec<ComponentDoc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ComponentDoc {
    #[serde(rename = "@uID")]
    uid: String,
    #[serde(default, rename = "@kind", skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default, rename = "@symmetry", skip_serializing_if = "Option::is_none")]
    symmetry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    transformation: Option<TransformationDoc>,
    #[serde(default)]
    sections: SectionsDoc,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    positionings: Option<PositioningsDoc>,
    #[serde(default)]
    segments: SegmentsDoc,
    #[serde(
        default,
        rename = "componentSegments",
        skip_serializing_if = "Option::is_none"
    )]
    component_segments: Option<ComponentSegmentsDoc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TransformationDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scaling: Option<VecDoc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rotation: Option<VecDoc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    translation: Option<VecDoc>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct VecDoc {
    x: f64,
    y: f64,
    z: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SectionsDoc {
    #[serde(default, rename = "section")]
    items: Vec<SectionDoc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SectionDoc {
    #[serde(rename = "@uID")]
    uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    transformation: Option<TransformationDoc>,
    #[serde(default)]
    elements: ElementsDoc,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ElementsDoc {
    #[serde(default, rename = "element")]
    items: Vec<ElementDoc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ElementDoc {
    #[serde(rename = "@uID")]
    uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, rename = "profileUID", skip_serializing_if = "Option::is_none")]
    profile_uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    transformation: Option<TransformationDoc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PositioningsDoc {
    #[serde(default, rename = "positioning")]
    items: Vec<PositioningDoc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PositioningDoc {
    #[serde(rename = "@uID")]
    uid: String,
    #[serde(
        default,
        rename = "fromSectionUID",
        skip_serializing_if = "Option::is_none"
    )]
    from_section_uid: Option<String>,
    #[serde(default, rename = "toSectionUID", skip_serializing_if = "Option::is_none")]
    to_section_uid: Option<String>,
    #[serde(default)]
    length: f64,
    #[serde(default, rename = "sweepAngle")]
    sweep_angle: f64,
    #[serde(default, rename = "dihedralAngle")]
    dihedral_angle: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SegmentsDoc {
    #[serde(default, rename = "segment")]
    items: Vec<SegmentDoc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SegmentDoc {
    #[serde(rename = "@uID")]
    uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(
        default,
        rename = "fromSectionUID",
        skip_serializing_if = "Option::is_none"
    )]
    from_section_uid: Option<String>,
    #[serde(default, rename = "toSectionUID", skip_serializing_if = "Option::is_none")]
    to_section_uid: Option<String>,
    #[serde(default, rename = "guideCurves", skip_serializing_if = "Option::is_none")]
    guide_curves: Option<GuideCurvesDoc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct GuideCurvesDoc {
    #[serde(default, rename = "guideCurve")]
    items: Vec<GuideCurveDoc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct GuideCurveDoc {
    #[serde(rename = "@uID")]
    uid: String,
    #[serde(default, rename = "chordStation", skip_serializing_if = "Option::is_none")]
    chord_station: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    side: Option<String>,
    #[serde(default, rename = "pointList", skip_serializing_if = "Option::is_none")]
    point_list: Option<PointListDoc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ComponentSegmentsDoc {
    #[serde(default, rename = "componentSegment")]
    items: Vec<ComponentSegmentDoc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ComponentSegmentDoc {
    #[serde(rename = "@uID")]
    uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(
        default,
        rename = "fromSectionUID",
        skip_serializing_if = "Option::is_none"
    )]
    from_section_uid: Option<String>,
    #[serde(default, rename = "toSectionUID", skip_serializing_if = "Option::is_none")]
    to_section_uid: Option<String>,
    #[serde(
        default,
        rename = "controlSurfaces",
        skip_serializing_if = "Option::is_none"
    )]
    control_surfaces: Option<ControlSurfacesDoc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ControlSurfacesDoc {
    #[serde(default, rename = "controlSurfaceDevice")]
    items: Vec<DeviceDoc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DeviceDoc {
    #[serde(rename = "@uID")]
    uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(
        default,
        rename = "componentSegmentUID",
        skip_serializing_if = "Option::is_none"
    )]
    component_segment_uid: Option<String>,
    #[serde(default, rename = "innerBorder", skip_serializing_if = "Option::is_none")]
    inner_border: Option<BorderDoc>,
    #[serde(default, rename = "outerBorder", skip_serializing_if = "Option::is_none")]
    outer_border: Option<BorderDoc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<PathDoc>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct BorderDoc {
    eta: f64,
    xsi: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PathDoc {
    #[serde(default, rename = "step")]
    steps: Vec<StepDoc>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct StepDoc {
    #[serde(rename = "relDeflection")]
    rel_deflection: f64,
    #[serde(default, rename = "hingeRotation")]
    hinge_rotation: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    translation: Option<VecDoc>,
}

// ─── lezen ───────────────────────────────────────────────────────────────

/// Leest een document en bouwt de gevalideerde [`Configuration`].
pub fn read_configuration(input: &str) -> ParseResult<Configuration> {
    let document: CpacsDoc = from_str(input)?;
    log::debug!(
        "document gelezen: {} profielen, {} componenten",
        document.vehicles.profiles.items.len(),
        document.vehicles.components.items.len()
    );
    build_configuration(document)
}

fn build_configuration(document: CpacsDoc) -> ParseResult<Configuration> {
    let mut profiles = Vec::with_capacity(document.vehicles.profiles.items.len());
    for doc in &document.vehicles.profiles.items {
        profiles.push(build_profile(doc)?);
    }

    let mut components = Vec::with_capacity(document.vehicles.components.items.len());
    for doc in &document.vehicles.components.items {
        components.push(build_component(doc)?);
    }

    Ok(Configuration::new(
        ProfileLibrary::new(profiles),
        components,
    )?)
}

fn build_profile(doc: &ProfileDoc) -> ParseResult<Profile> {
    let points = doc
        .point_list
        .as_ref()
        .filter(|list| !list.points.is_empty())
        .ok_or_else(|| ParseError::MissingElement {
            path: format!("profile[@uID='{}']/pointList/point", doc.uid),
        })?;
    Ok(Profile::new(
        &doc.uid,
        doc.name.as_deref().unwrap_or(""),
        points.points.iter().map(to_point).collect(),
    )?)
}

fn build_component(doc: &ComponentDoc) -> ParseResult<Component> {
    let kind = match doc.kind.as_deref().unwrap_or("wing") {
        "wing" => ComponentKind::Wing,
        "fuselage" => ComponentKind::Fuselage,
        "rotorBlade" => ComponentKind::RotorBlade,
        other => {
            return Err(ParseError::Malformed {
                path: format!("component[@uID='{}']/@kind", doc.uid),
                reason: format!("onbekende soort `{other}`"),
            });
        }
    };
    let symmetry = match doc.symmetry.as_deref() {
        None => Symmetry::None,
        Some("x-y-plane") => Symmetry::XyPlane,
        Some("x-z-plane") => Symmetry::XzPlane,
        Some("y-z-plane") => Symmetry::YzPlane,
        Some(other) => {
            return Err(ParseError::Malformed {
                path: format!("component[@uID='{}']/@symmetry", doc.uid),
                reason: format!("onbekend symmetrievlak `{other}`"),
            });
        }
    };

    let mut sections = Vec::with_capacity(doc.sections.items.len());
    for section in &doc.sections.items {
        sections.push(build_section(section)?);
    }

    let positionings = match &doc.positionings {
        Some(block) => {
            let mut items = Vec::with_capacity(block.items.len());
            for p in &block.items {
                let to = require(&p.to_section_uid, || {
                    format!("positioning[@uID='{}']/toSectionUID", p.uid)
                })?;
                items.push(Positioning::new(
                    &p.uid,
                    p.from_section_uid.as_deref(),
                    to,
                    p.length,
                    p.sweep_angle,
                    p.dihedral_angle,
                ));
            }
            Positionings::new(items)?
        }
        None => Positionings::default(),
    };

    let mut segments = Vec::with_capacity(doc.segments.items.len());
    for segment in &doc.segments.items {
        segments.push(build_segment(segment)?);
    }

    let mut component_segments = Vec::new();
    if let Some(block) = &doc.component_segments {
        for cs in &block.items {
            component_segments.push(build_component_segment(cs)?);
        }
    }

    Ok(Component::new(
        &doc.uid,
        doc.name.as_deref().unwrap_or(""),
        kind,
        symmetry,
        to_transformation(doc.transformation.as_ref()),
        sections,
        positionings,
        segments,
        component_segments,
    )?)
}

fn build_section(doc: &SectionDoc) -> ParseResult<Section> {
    let mut elements = Vec::with_capacity(doc.elements.items.len());
    for element in &doc.elements.items {
        let profile_uid = require(&element.profile_uid, || {
            format!("element[@uID='{}']/profileUID", element.uid)
        })?;
        elements.push(Element::new(
            &element.uid,
            element.name.as_deref().unwrap_or(""),
            profile_uid,
            to_transformation(element.transformation.as_ref()),
        ));
    }
    Ok(Section::new(
        &doc.uid,
        doc.name.as_deref().unwrap_or(""),
        to_transformation(doc.transformation.as_ref()),
        elements,
    )?)
}

fn build_segment(doc: &SegmentDoc) -> ParseResult<Segment> {
    let from = require(&doc.from_section_uid, || {
        format!("segment[@uID='{}']/fromSectionUID", doc.uid)
    })?;
    let to = require(&doc.to_section_uid, || {
        format!("segment[@uID='{}']/toSectionUID", doc.uid)
    })?;

    let mut guide_curves = Vec::new();
    if let Some(block) = &doc.guide_curves {
        for gc in &block.items {
            let station = gc.chord_station.ok_or_else(|| ParseError::MissingElement {
                path: format!("guideCurve[@uID='{}']/chordStation", gc.uid),
            })?;
            let side = match gc.side.as_deref().unwrap_or("upper") {
                "upper" => SurfaceSide::Upper,
                "lower" => SurfaceSide::Lower,
                other => {
                    return Err(ParseError::Malformed {
                        path: format!("guideCurve[@uID='{}']/side", gc.uid),
                        reason: format!("onbekende zijde `{other}`"),
                    });
                }
            };
            let points = gc
                .point_list
                .as_ref()
                .filter(|list| !list.points.is_empty())
                .ok_or_else(|| ParseError::MissingElement {
                    path: format!("guideCurve[@uID='{}']/pointList/point", gc.uid),
                })?;
            guide_curves.push(GuideCurve::new(
                &gc.uid,
                station,
                side,
                points.points.iter().map(to_point).collect(),
            ));
        }
    }

    Ok(Segment::new(
        &doc.uid,
        doc.name.as_deref().unwrap_or(""),
        from,
        to,
        guide_curves,
    ))
}

fn build_component_segment(doc: &ComponentSegmentDoc) -> ParseResult<ComponentSegment> {
    let from = require(&doc.from_section_uid, || {
        format!("componentSegment[@uID='{}']/fromSectionUID", doc.uid)
    })?;
    let to = require(&doc.to_section_uid, || {
        format!("componentSegment[@uID='{}']/toSectionUID", doc.uid)
    })?;

    let mut devices = Vec::new();
    if let Some(block) = &doc.control_surfaces {
        for device in &block.items {
            let inner = device.inner_border.ok_or_else(|| ParseError::MissingElement {
                path: format!("controlSurfaceDevice[@uID='{}']/innerBorder", device.uid),
            })?;
            let outer = device.outer_border.ok_or_else(|| ParseError::MissingElement {
                path: format!("controlSurfaceDevice[@uID='{}']/outerBorder", device.uid),
            })?;
            let steps = device
                .path
                .as_ref()
                .map(|p| {
                    p.steps
                        .iter()
                        .map(|s| DeflectionStep {
                            rel_deflection: s.rel_deflection,
                            hinge_translation: s
                                .translation
                                .map_or(Vec3::ZERO, |v| Vec3::new(v.x, v.y, v.z)),
                            hinge_rotation: s.hinge_rotation,
                        })
                        .collect()
                })
                .unwrap_or_default();
            devices.push(ControlSurfaceDevice::new(
                &device.uid,
                device.name.as_deref().unwrap_or(""),
                device.component_segment_uid.as_deref().unwrap_or(&doc.uid),
                DeviceBorder {
                    eta: inner.eta,
                    xsi: inner.xsi,
                },
                DeviceBorder {
                    eta: outer.eta,
                    xsi: outer.xsi,
                },
                DevicePath::new(steps)?,
            ));
        }
    }

    Ok(ComponentSegment::new(
        &doc.uid,
        doc.name.as_deref().unwrap_or(""),
        from,
        to,
        devices,
    ))
}

fn require<'a>(
    value: &'a Option<String>,
    path: impl FnOnce() -> String,
) -> ParseResult<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| ParseError::MissingElement { path: path() })
}

fn to_point(doc: &PointDoc) -> Point3 {
    Point3::new(doc.x, doc.y, doc.z)
}

fn to_transformation(doc: Option<&TransformationDoc>) -> Transformation {
    let Some(doc) = doc else {
        return Transformation::IDENTITY;
    };
    let vec = |v: &Option<VecDoc>| v.map(|v| Vec3::new(v.x, v.y, v.z));
    Transformation::new(vec(&doc.scaling), vec(&doc.rotation), vec(&doc.translation))
}

// ─── schrijven ───────────────────────────────────────────────────────────

/// Schrijft het model terug naar zijn documentvorm.
pub fn write_configuration(configuration: &Configuration) -> ParseResult<String> {
    let document = build_document(configuration);
    let mut buffer = String::new();
    let serializer = Serializer::with_root(&mut buffer, Some("cpacs"))?;
    document.serialize(serializer)?;
    Ok(buffer)
}

fn build_document(configuration: &Configuration) -> CpacsDoc {
    CpacsDoc {
        header: None,
        vehicles: VehiclesDoc {
            profiles: ProfilesDoc {
                items: configuration
                    .profiles()
                    .items()
                    .iter()
                    .map(|p| ProfileDoc {
                        uid: p.uid().to_owned(),
                        name: non_empty(p.name()),
                        point_list: Some(PointListDoc {
                            points: p.points().iter().map(from_point).collect(),
                        }),
                    })
                    .collect(),
            },
            components: ComponentsDoc {
                items: configuration
                    .components()
                    .iter()
                    .map(component_doc)
                    .collect(),
            },
        },
    }
}

fn component_doc(component: &Component) -> ComponentDoc {
    ComponentDoc {
        uid: component.uid().to_owned(),
        kind: Some(
            match component.kind() {
                ComponentKind::Wing => "wing",
                ComponentKind::Fuselage => "fuselage",
                ComponentKind::RotorBlade => "rotorBlade",
            }
            .to_owned(),
        ),
        symmetry: match component.symmetry() {
            Symmetry::None => None,
            Symmetry::XyPlane => Some("x-y-plane".to_owned()),
            Symmetry::XzPlane => Some("x-z-plane".to_owned()),
            Symmetry::YzPlane => Some("y-z-plane".to_owned()),
        },
        name: non_empty(component.name()),
        transformation: from_transformation(component.transformation()),
        sections: SectionsDoc {
            items: component
                .sections()
                .iter()
                .map(|section| SectionDoc {
                    uid: section.uid().to_owned(),
                    name: non_empty(section.name()),
                    transformation: from_transformation(section.transformation()),
                    elements: ElementsDoc {
                        items: section
                            .elements()
                            .iter()
                            .map(|element| ElementDoc {
                                uid: element.uid().to_owned(),
                                name: non_empty(element.name()),
                                profile_uid: Some(element.profile_uid().to_owned()),
                                transformation: from_transformation(element.transformation()),
                            })
                            .collect(),
                    },
                })
                .collect(),
        },
        positionings: if component.positionings().is_empty() {
            None
        } else {
            Some(PositioningsDoc {
                items: component
                    .positionings()
                    .items()
                    .iter()
                    .map(|p| PositioningDoc {
                        uid: p.uid().to_owned(),
                        from_section_uid: p.from_section_uid().map(str::to_owned),
                        to_section_uid: Some(p.to_section_uid().to_owned()),
                        length: p.length(),
                        sweep_angle: p.sweep(),
                        dihedral_angle: p.dihedral(),
                    })
                    .collect(),
            })
        },
        segments: SegmentsDoc {
            items: component
                .segments()
                .iter()
                .map(|segment| SegmentDoc {
                    uid: segment.uid().to_owned(),
                    name: non_empty(segment.name()),
                    from_section_uid: Some(segment.from_section_uid().to_owned()),
                    to_section_uid: Some(segment.to_section_uid().to_owned()),
                    guide_curves: if segment.guide_curves().is_empty() {
                        None
                    } else {
                        Some(GuideCurvesDoc {
                            items: segment
                                .guide_curves()
                                .iter()
                                .map(|gc| GuideCurveDoc {
                                    uid: gc.uid().to_owned(),
                                    chord_station: Some(gc.station()),
                                    side: Some(
                                        match gc.side() {
                                            SurfaceSide::Upper => "upper",
                                            SurfaceSide::Lower => "lower",
                                        }
                                        .to_owned(),
                                    ),
                                    point_list: Some(PointListDoc {
                                        points: gc.points().iter().map(from_point).collect(),
                                    }),
                                })
                                .collect(),
                        })
                    },
                })
                .collect(),
        },
        component_segments: if component.component_segments().is_empty() {
            None
        } else {
            Some(ComponentSegmentsDoc {
                items: component
                    .component_segments()
                    .iter()
                    .map(|cs| ComponentSegmentDoc {
                        uid: cs.uid().to_owned(),
                        name: non_empty(cs.name()),
                        from_section_uid: Some(cs.from_section_uid().to_owned()),
                        to_section_uid: Some(cs.to_section_uid().to_owned()),
                        control_surfaces: if cs.devices().is_empty() {
                            None
                        } else {
                            Some(ControlSurfacesDoc {
                                items: cs
                                    .devices()
                                    .iter()
                                    .map(|device| DeviceDoc {
                                        uid: device.uid().to_owned(),
                                        name: non_empty(device.name()),
                                        component_segment_uid: Some(
                                            device.component_segment_uid().to_owned(),
                                        ),
                                        inner_border: Some(BorderDoc {
                                            eta: device.inner_border().eta,
                                            xsi: device.inner_border().xsi,
                                        }),
                                        outer_border: Some(BorderDoc {
                                            eta: device.outer_border().eta,
                                            xsi: device.outer_border().xsi,
                                        }),
                                        path: if device.path().steps().is_empty() {
                                            None
                                        } else {
                                            Some(PathDoc {
                                                steps: device
                                                    .path()
                                                    .steps()
                                                    .iter()
                                                    .map(|s| StepDoc {
                                                        rel_deflection: s.rel_deflection,
                                                        hinge_rotation: s.hinge_rotation,
                                                        translation: Some(VecDoc {
                                                            x: s.hinge_translation.x,
                                                            y: s.hinge_translation.y,
                                                            z: s.hinge_translation.z,
                                                        }),
                                                    })
                                                    .collect(),
                                            })
                                        },
                                    })
                                    .collect(),
                            })
                        },
                    })
                    .collect(),
            })
        },
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}

fn from_point(p: &Point3) -> PointDoc {
    PointDoc {
        x: p.x,
        y: p.y,
        z: p.z,
    }
}

fn from_transformation(t: &Transformation) -> Option<TransformationDoc> {
    if t.scale().is_none() && t.rotation().is_none() && t.translation().is_none() {
        return None;
    }
    let vec = |v: Option<Vec3>| v.map(|v| VecDoc { x: v.x, y: v.y, z: v.z });
    Some(TransformationDoc {
        scaling: vec(t.scale()),
        rotation: vec(t.rotation()),
        translation: vec(t.translation()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<cpacs>
  <vehicles>
    <profiles>
      <profile uID="prof_diamant">
        <name>Diamant</name>
        <pointList>
          <point><x>1.0</x><y>0.0</y><z>0.0</z></point>
          <point><x>0.5</x><y>0.0</y><z>-0.1</z></point>
          <point><x>0.0</x><y>0.0</y><z>0.0</z></point>
          <point><x>0.5</x><y>0.0</y><z>0.1</z></point>
        </pointList>
      </profile>
    </profiles>
    <components>
      <component uID="vleugel" kind="wing" symmetry="x-z-plane">
        <name>Testvleugel</name>
        <sections>
          <section uID="sec1">
            <elements>
              <element uID="sec1_el"><profileUID>prof_diamant</profileUID></element>
            </elements>
          </section>
          <section uID="sec2">
            <elements>
              <element uID="sec2_el"><profileUID>prof_diamant</profileUID></element>
            </elements>
          </section>
        </sections>
        <positionings>
          <positioning uID="pos2">
            <fromSectionUID>sec1</fromSectionUID>
            <toSectionUID>sec2</toSectionUID>
            <length>5.0</length>
          </positioning>
        </positionings>
        <segments>
          <segment uID="seg1">
            <fromSectionUID>sec1</fromSectionUID>
            <toSectionUID>sec2</toSectionUID>
          </segment>
        </segments>
      </component>
    </components>
  </vehicles>
</cpacs>"#;

    #[test]
    fn minimal_document_parses() {
        let configuration = read_configuration(MINIMAL).expect("document moet parsen");
        assert_eq!(configuration.component_count(), 1);
        assert_eq!(configuration.profiles().len(), 1);
        assert!(configuration.registry().contains("seg1"));
        assert!(configuration.registry().contains("sec2_el"));
        let component = configuration.component_by_uid("vleugel").unwrap();
        assert_eq!(component.kind(), ComponentKind::Wing);
        assert_eq!(component.symmetry(), Symmetry::XzPlane);
    }

    #[test]
    fn missing_point_list_is_reported() {
        let broken = MINIMAL.replace(
            r"<pointList>",
            r"<pointListX>",
        ).replace(r"</pointList>", r"</pointListX>");
        let err = read_configuration(&broken).unwrap_err();
        assert!(matches!(err, ParseError::MissingElement { path } if path.contains("pointList")));
    }

    #[test]
    fn unknown_kind_is_malformed() {
        let broken = MINIMAL.replace(r#"kind="wing""#, r#"kind="ballon""#);
        let err = read_configuration(&broken).unwrap_err();
        assert!(matches!(err, ParseError::Malformed { .. }));
    }

    #[test]
    fn missing_segment_reference_is_reported() {
        let broken = MINIMAL.replace(
            "<fromSectionUID>sec1</fromSectionUID>\n            <toSectionUID>sec2</toSectionUID>\n          </segment>",
            "</segment>",
        );
        let err = read_configuration(&broken).unwrap_err();
        assert!(matches!(err, ParseError::MissingElement { .. }));
    }

    #[test]
    fn roundtrip_preserves_structure() {
        let configuration = read_configuration(MINIMAL).unwrap();
        let written = write_configuration(&configuration).unwrap();
        let reread = read_configuration(&written).expect("teruggeschreven document moet parsen");
        assert_eq!(reread.component_count(), configuration.component_count());
        let component = reread.component_by_uid("vleugel").unwrap();
        assert_eq!(component.symmetry(), Symmetry::XzPlane);
        assert_eq!(component.sections().len(), 2);
        assert_eq!(component.positionings().len(), 1);
        assert_eq!(component.segments().len(), 1);
    }

    #[test]
    fn duplicate_uid_is_rejected() {
        let broken = MINIMAL.replace(r#"uID="sec2_el""#, r#"uID="sec1_el""#);
        let err = read_configuration(&broken).unwrap_err();
        assert!(matches!(err, ParseError::Model(ModelError::Registry(_))));
    }
}
