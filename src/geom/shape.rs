//! Boundary shapes: welded triangle compounds with tagged faces.
//!
//! A `Shape` is the kernel's fused output: one vertex pool, one index
//! buffer, and a list of face spans tagging which triangles belong to which
//! logical face (upper skin, lower skin, trailing-edge closure, caps).
//! Fusing concatenates shapes and welds coincident vertices so shared
//! boundaries become topologically common edges.

use std::collections::HashMap;

use log::debug;

use super::core::{BBox, Point3, Tolerance, Vec3};
use super::surface::Surface;
use super::wire::Wire;
use super::GeometryError;

/// Logical role of a face within a lofted shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceKind {
    /// Upper (suction-side) skin.
    Upper,
    /// Lower (pressure-side) skin.
    Lower,
    /// Synthesized trailing-edge closure strip.
    TrailingEdge,
    /// Planar closure at the inner/outer end of a loft.
    Cap,
    /// Wall of a swept prism.
    Swept,
}

/// A tessellated patch: grid-triangulated positions, CCW triangles.
#[derive(Debug, Clone, PartialEq)]
pub struct FacePatch {
    pub positions: Vec<Point3>,
    pub indices: Vec<u32>,
}

/// A patch with its role and (for per-segment faces) its segment index.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub kind: FaceKind,
    pub segment: Option<usize>,
    pub patch: FacePatch,
}

/// Span of triangles belonging to one face inside a fused shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceSpan {
    pub kind: FaceKind,
    pub segment: Option<usize>,
    /// First triangle (not index-buffer offset).
    pub tri_start: usize,
    pub tri_count: usize,
}

/// A fused boundary shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    positions: Vec<Point3>,
    indices: Vec<u32>,
    spans: Vec<FaceSpan>,
}

impl Shape {
    /// Welds a list of faces into one shape. Fails on an empty input or
    /// non-finite coordinates.
    pub fn from_faces(faces: Vec<Face>) -> Result<Self, GeometryError> {
        if faces.is_empty() || faces.iter().all(|f| f.patch.indices.is_empty()) {
            return Err(GeometryError::EmptyShape);
        }

        let mut welder = VertexWelder::new(Tolerance::WELD);
        let mut indices = Vec::new();
        let mut spans = Vec::new();

        for face in &faces {
            if face.patch.positions.iter().any(|p| !p.is_finite()) {
                return Err(GeometryError::NonFinitePoint);
            }
            let tri_start = indices.len() / 3;
            let mut local = Vec::with_capacity(face.patch.indices.len());
            for &i in &face.patch.indices {
                local.push(welder.insert(face.patch.positions[i as usize]));
            }
            // drop triangles collapsed by welding
            let mut kept = 0;
            for tri in local.chunks_exact(3) {
                if tri[0] != tri[1] && tri[1] != tri[2] && tri[0] != tri[2] {
                    indices.extend_from_slice(tri);
                    kept += 1;
                }
            }
            spans.push(FaceSpan {
                kind: face.kind,
                segment: face.segment,
                tri_start,
                tri_count: kept,
            });
        }

        let positions = welder.finish();
        debug!(
            "fused shape: {} faces, {} vertices, {} triangles",
            spans.len(),
            positions.len(),
            indices.len() / 3
        );
        Ok(Self {
            positions,
            indices,
            spans,
        })
    }

    #[must_use]
    pub fn positions(&self) -> &[Point3] {
        &self.positions
    }

    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[must_use]
    pub fn spans(&self) -> &[FaceSpan] {
        &self.spans
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[must_use]
    pub fn bbox(&self) -> Option<BBox> {
        BBox::from_points(&self.positions)
    }

    /// Shape with every vertex mapped through `t`; topology is unchanged.
    #[must_use]
    pub fn transformed(&self, t: super::core::Transform) -> Self {
        Self {
            positions: self.positions.iter().map(|&p| t.apply_point(p)).collect(),
            indices: self.indices.clone(),
            spans: self.spans.clone(),
        }
    }

    /// Extracts the sub-shape of faces matching `keep`, re-welding the
    /// remaining triangles. `EmptyShape` if nothing matches.
    pub fn partition(&self, keep: impl Fn(&FaceSpan) -> bool) -> Result<Self, GeometryError> {
        let faces: Vec<Face> = self
            .spans
            .iter()
            .filter(|span| keep(span))
            .map(|span| {
                let range = span.tri_start * 3..(span.tri_start + span.tri_count) * 3;
                let mut positions = Vec::new();
                let mut remap: HashMap<u32, u32> = HashMap::new();
                let mut indices = Vec::with_capacity(range.len());
                for &i in &self.indices[range] {
                    let next = *remap.entry(i).or_insert_with(|| {
                        positions.push(self.positions[i as usize]);
                        (positions.len() - 1) as u32
                    });
                    indices.push(next);
                }
                Face {
                    kind: span.kind,
                    segment: span.segment,
                    patch: FacePatch { positions, indices },
                }
            })
            .collect();
        Self::from_faces(faces)
    }
}

/// Welds coincident vertices through coordinate quantization.
struct VertexWelder {
    scale: f64,
    lookup: HashMap<(i64, i64, i64), u32>,
    positions: Vec<Point3>,
}

impl VertexWelder {
    fn new(tol: Tolerance) -> Self {
        Self {
            scale: 1.0 / tol.eps,
            lookup: HashMap::new(),
            positions: Vec::new(),
        }
    }

    fn insert(&mut self, p: Point3) -> u32 {
        let key = (
            (p.x * self.scale).round() as i64,
            (p.y * self.scale).round() as i64,
            (p.z * self.scale).round() as i64,
        );
        if let Some(&idx) = self.lookup.get(&key) {
            return idx;
        }
        let idx = self.positions.len() as u32;
        self.positions.push(p);
        self.lookup.insert(key, idx);
        idx
    }

    fn finish(self) -> Vec<Point3> {
        self.positions
    }
}

/// Fuses shapes into one, welding shared boundaries. The result's face spans
/// keep their source order; topology does not depend on the input order.
pub fn fuse_shapes(shapes: &[Shape]) -> Result<Shape, GeometryError> {
    if shapes.is_empty() {
        return Err(GeometryError::EmptyShape);
    }
    let faces: Vec<Face> = shapes
        .iter()
        .flat_map(|shape| {
            shape.spans.iter().map(|span| {
                let range = span.tri_start * 3..(span.tri_start + span.tri_count) * 3;
                Face {
                    kind: span.kind,
                    segment: span.segment,
                    patch: FacePatch {
                        positions: shape.positions.clone(),
                        indices: shape.indices[range].to_vec(),
                    },
                }
            })
        })
        .collect();
    Shape::from_faces(faces)
}

/// Tessellates a surface into a `nu` × `nv` grid face.
#[must_use]
pub fn tessellate_surface(
    surface: &dyn Surface,
    nu: usize,
    nv: usize,
    kind: FaceKind,
    segment: Option<usize>,
) -> Face {
    let nu = nu.max(2);
    let nv = nv.max(2);

    let mut positions = Vec::with_capacity(nu * nv);
    for j in 0..nv {
        let v = j as f64 / (nv - 1) as f64;
        for i in 0..nu {
            let u = i as f64 / (nu - 1) as f64;
            positions.push(surface.point_at(u, v));
        }
    }

    let mut indices = Vec::with_capacity((nu - 1) * (nv - 1) * 6);
    for j in 0..nv - 1 {
        for i in 0..nu - 1 {
            let a = (j * nu + i) as u32;
            let b = (j * nu + i + 1) as u32;
            let c = ((j + 1) * nu + i + 1) as u32;
            let d = ((j + 1) * nu + i) as u32;
            indices.extend_from_slice(&[a, b, c, a, c, d]);
        }
    }

    Face {
        kind,
        segment,
        patch: FacePatch { positions, indices },
    }
}

/// Sweeps a wire along `direction` into a prism shell (side walls only).
pub fn sweep_wire(profile: &Wire, direction: Vec3) -> Result<Shape, GeometryError> {
    if !direction.is_finite() || direction.length_squared() <= Tolerance::ZERO_LENGTH.eps {
        return Err(GeometryError::InvalidDirection);
    }

    let base = profile.points();
    let n = base.len();
    let mut positions = Vec::with_capacity(n * 2);
    positions.extend_from_slice(base);
    positions.extend(base.iter().map(|p| p.add_vec(direction)));

    let edge_count = if profile.is_closed() { n } else { n - 1 };
    let mut indices = Vec::with_capacity(edge_count * 6);
    for i in 0..edge_count {
        let j = (i + 1) % n;
        let (a, b) = (i as u32, j as u32);
        let (c, d) = (b + n as u32, a + n as u32);
        indices.extend_from_slice(&[a, b, c, a, c, d]);
    }

    Shape::from_faces(vec![Face {
        kind: FaceKind::Swept,
        segment: None,
        patch: FacePatch { positions, indices },
    }])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::surface::RuledSurface;

    fn strip(y0: f64, y1: f64) -> RuledSurface {
        RuledSurface::new(
            vec![0.0, 1.0],
            vec![Point3::new(0.0, y0, 0.0), Point3::new(1.0, y0, 0.0)],
            vec![Point3::new(0.0, y1, 0.0), Point3::new(1.0, y1, 0.0)],
        )
        .unwrap()
    }

    #[test]
    fn test_tessellate_surface_counts() {
        let face = tessellate_surface(&strip(0.0, 1.0), 3, 2, FaceKind::Upper, Some(0));
        assert_eq!(face.patch.positions.len(), 6);
        assert_eq!(face.patch.indices.len(), 2 * 1 * 6);
    }

    #[test]
    fn test_from_faces_welds_shared_boundary() {
        // two strips sharing the y=1 boundary
        let f0 = tessellate_surface(&strip(0.0, 1.0), 3, 3, FaceKind::Upper, Some(0));
        let f1 = tessellate_surface(&strip(1.0, 2.0), 3, 3, FaceKind::Upper, Some(1));
        let separate = f0.patch.positions.len() + f1.patch.positions.len();
        let shape = Shape::from_faces(vec![f0, f1]).unwrap();
        // 3 shared vertices welded away
        assert_eq!(shape.positions().len(), separate - 3);
        assert_eq!(shape.spans().len(), 2);
        assert_eq!(shape.triangle_count(), 16);
    }

    #[test]
    fn test_fuse_shapes_matches_direct_weld() {
        let f0 = tessellate_surface(&strip(0.0, 1.0), 3, 3, FaceKind::Upper, Some(0));
        let f1 = tessellate_surface(&strip(1.0, 2.0), 3, 3, FaceKind::Lower, Some(1));
        let s0 = Shape::from_faces(vec![f0.clone()]).unwrap();
        let s1 = Shape::from_faces(vec![f1.clone()]).unwrap();
        let fused = fuse_shapes(&[s0, s1]).unwrap();
        let direct = Shape::from_faces(vec![f0, f1]).unwrap();
        assert_eq!(fused.positions().len(), direct.positions().len());
        assert_eq!(fused.triangle_count(), direct.triangle_count());
    }

    #[test]
    fn test_fuse_empty_fails() {
        assert_eq!(fuse_shapes(&[]), Err(GeometryError::EmptyShape));
        assert_eq!(Shape::from_faces(Vec::new()), Err(GeometryError::EmptyShape));
    }

    #[test]
    fn test_partition_by_kind() {
        let f0 = tessellate_surface(&strip(0.0, 1.0), 3, 3, FaceKind::Upper, Some(0));
        let f1 = tessellate_surface(&strip(1.0, 2.0), 3, 3, FaceKind::Lower, Some(0));
        let shape = Shape::from_faces(vec![f0, f1]).unwrap();

        let upper = shape.partition(|span| span.kind == FaceKind::Upper).unwrap();
        assert_eq!(upper.spans().len(), 1);
        assert_eq!(upper.triangle_count(), 8);

        let none = shape.partition(|span| span.kind == FaceKind::Cap);
        assert_eq!(none, Err(GeometryError::EmptyShape));
    }

    #[test]
    fn test_sweep_wire_prism() {
        let square = Wire::closed(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ])
        .unwrap();
        let prism = sweep_wire(&square, Vec3::new(0.0, 0.0, 2.0)).unwrap();
        assert_eq!(prism.positions().len(), 8);
        assert_eq!(prism.triangle_count(), 8);
        let bbox = prism.bbox().unwrap();
        assert_eq!(bbox.max.z, 2.0);
    }

    #[test]
    fn test_sweep_zero_direction_fails() {
        let square = Wire::closed(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ])
        .unwrap();
        assert_eq!(
            sweep_wire(&square, Vec3::ZERO),
            Err(GeometryError::InvalidDirection)
        );
    }
}
