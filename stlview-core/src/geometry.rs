//! Geometry primitives: facets, meshes and their bounding boxes
use nalgebra::{Point3, Vector3};
use std::fmt;

/// Writes a triple as `<x,y,z>`
fn fmt_triple(f: &mut fmt::Formatter<'_>, x: f32, y: f32, z: f32) -> fmt::Result {
    write!(f, "<{},{},{}>", x, y, z)
}

/// One triangle of a mesh: three corner points plus the normal stored in the file.
///
/// The normal is kept verbatim; it is never recomputed from the corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Facet {
    pub vertices: [Point3<f32>; 3],
    pub normal: Vector3<f32>,
    /// Opaque per-facet attribute word of binary STL (zero for ASCII input).
    pub attribute: u16,
}

impl Facet {
    pub fn new(p1: Point3<f32>, p2: Point3<f32>, p3: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self {
            vertices: [p1, p2, p3],
            normal,
            attribute: 0,
        }
    }

    pub fn p1(&self) -> &Point3<f32> {
        &self.vertices[0]
    }

    pub fn p2(&self) -> &Point3<f32> {
        &self.vertices[1]
    }

    pub fn p3(&self) -> &Point3<f32> {
        &self.vertices[2]
    }

    /// True when all nine corner coordinates are finite
    pub fn is_finite(&self) -> bool {
        self.vertices.iter().all(|p| p.iter().all(|c| c.is_finite()))
    }
}

impl Default for Facet {
    fn default() -> Self {
        Self::new(Point3::origin(), Point3::origin(), Point3::origin(), Vector3::zeros())
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("normal ")?;
        fmt_triple(f, self.normal.x, self.normal.y, self.normal.z)?;
        f.write_str(" vertices")?;
        for p in &self.vertices {
            f.write_str(" ")?;
            fmt_triple(f, p.x, p.y, p.z)?;
        }
        Ok(())
    }
}

/// Axis-aligned box enclosing every facet corner of a mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl BoundingBox {
    pub fn from_point(p: Point3<f32>) -> Self {
        Self { min: p, max: p }
    }

    pub fn include(&mut self, p: &Point3<f32>) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Midpoint of the box, computed as `min + size / 2` per axis
    pub fn center(&self) -> Point3<f32> {
        self.min + self.size() * 0.5
    }

    /// Length of the longest edge
    pub fn max_extent(&self) -> f32 {
        self.size().max()
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.max_extent() > 0.0)
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_triple(f, self.min.x, self.min.y, self.min.z)?;
        f.write_str(" - ")?;
        fmt_triple(f, self.max.x, self.max.y, self.max.z)
    }
}

/// A triangle mesh in file order, together with its display name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub(crate) facets: Vec<Facet>,
    pub(crate) name: String,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            facets: Vec::new(),
            name: name.into(),
        }
    }

    pub fn from_facets(name: impl Into<String>, facets: Vec<Facet>) -> Self {
        Self {
            facets,
            name: name.into(),
        }
    }

    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    pub fn facets_mut(&mut self) -> &mut Vec<Facet> {
        &mut self.facets
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn len(&self) -> usize {
        self.facets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }

    /// Bounding box over all facet corners, `None` for an empty mesh
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let first = self.facets.first()?;
        let mut bbox = BoundingBox::from_point(first.vertices[0]);
        for facet in &self.facets {
            for p in &facet.vertices {
                bbox.include(p);
            }
        }
        Some(bbox)
    }

    /// Cube mesh centred on the origin
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;
        let quad = |n: [f32; 3], a: [f32; 3], b: [f32; 3], c: [f32; 3], d: [f32; 3]| {
            let n = Vector3::new(n[0], n[1], n[2]);
            let p = |v: [f32; 3]| Point3::new(v[0] * h, v[1] * h, v[2] * h);
            [
                Facet::new(p(a), p(b), p(c), n),
                Facet::new(p(a), p(c), p(d), n),
            ]
        };

        let faces = [
            quad([0.0, 0.0, 1.0], [-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]),
            quad([0.0, 0.0, -1.0], [-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0], [1.0, -1.0, -1.0]),
            quad([0.0, 1.0, 0.0], [-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0]),
            quad([0.0, -1.0, 0.0], [-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0]),
            quad([1.0, 0.0, 0.0], [1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0], [1.0, -1.0, 1.0]),
            quad([-1.0, 0.0, 0.0], [-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0]),
        ];

        Self::from_facets("cube", faces.into_iter().flatten().collect())
    }
}
