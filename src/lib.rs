#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Parametric aircraft component geometry from a hierarchical XML
//! description.
//!
//! The crate reads a CPACS-flavoured document (profiles, components,
//! sections, positionings, segments, component segments, control-surface
//! devices), places cross-sections in space through composed affine
//! transforms, skins them into fused boundary shapes on demand, and answers
//! parametric queries in both directions: `(segment, eta, xsi)` to world
//! point, and world point back to `(segment, eta, xsi, side)`.
//!
//! Expensive geometry is cached per component behind explicit dirty flags;
//! every mutation goes through [`model::Configuration`] setters so the
//! owning component and any component referencing it by uid are invalidated
//! exactly once, and rebuilt lazily on the next query.

pub mod geom;
pub mod model;
pub mod parse;

pub use geom::{Point3, Shape, Transform, Vec3};
pub use model::component::{
    Component, ComponentKind, HasSections, HasSegments, ProducesLoft, SegmentEtaXsi, Symmetry,
};
pub use model::segment::{SegmentEnd, SurfaceSide};
pub use model::{Configuration, ModelError};
pub use parse::{read_configuration, write_configuration, ParseError};
