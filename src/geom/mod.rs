//! Geometry kernel layer: the boundary-representation primitives the model
//! layer composes. Wires from point lists, ruled/guided surfaces between
//! profile curves, point projection onto surfaces, shape fusing and sweeping.
//!
//! The model layer never builds geometry by hand; everything it needs goes
//! through the types and operations re-exported here.

mod core;
mod project;
mod shape;
mod surface;
mod wire;

pub use core::{BBox, MirrorPlane, Point3, Tolerance, Transform, Vec3};
pub use project::{SurfaceProjection, project_point_on_surface};
pub use shape::{Face, FaceKind, FacePatch, Shape, fuse_shapes, sweep_wire, tessellate_surface};
pub use surface::{GuideRail, GuidedSurface, RailEnd, RuledSurface, Surface};
pub use wire::Wire;

use thiserror::Error;

/// Failure during kernel-level geometry construction.
///
/// These are fatal for the operation that raised them; callers higher up
/// attach the offending segment before surfacing the error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("point coordinates must be finite")]
    NonFinitePoint,
    #[error("wire requires at least {min} points")]
    NotEnoughPoints { min: usize },
    #[error("profile is degenerate (zero chord extent)")]
    DegenerateProfile,
    #[error("ruled surface requires equally sampled rails ({left} vs {right} points)")]
    MismatchedRails { left: usize, right: usize },
    #[error("sweep direction must be finite and non-zero")]
    InvalidDirection,
    #[error("guide rail station {station} lies outside the chord domain")]
    GuideOutOfRange { station: f64 },
    #[error("segment has zero span (coincident end sections)")]
    ZeroSpan,
    #[error("cannot fuse an empty shape list")]
    EmptyShape,
}
