//! In-place mesh transforms and the view rotation state
use nalgebra::{Matrix4, Vector3};
use tracing::debug;

use crate::geometry::Mesh;

/// Coordinate axis for the fixed 90 degree model rotations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Left-hand 90 degree rotation of one vector about `axis`.
///
/// Pure permutation with a sign flip, so four applications restore the input bit for bit.
pub fn quarter_turn(axis: Axis, v: &mut Vector3<f32>) {
    let (x, y, z) = (v.x, v.y, v.z);
    match axis {
        Axis::X => {
            v.y = z;
            v.z = -y;
        }
        Axis::Y => {
            v.z = x;
            v.x = -z;
        }
        Axis::Z => {
            v.x = y;
            v.y = -x;
        }
    }
}

impl Mesh {
    /// Center the bounding box on the origin and scale its longest edge to 1.
    ///
    /// Normals are left alone. A degenerate box uses a scale of 0, collapsing
    /// every corner onto the origin.
    pub fn normalize(&mut self) {
        let Some(bbox) = self.bounding_box() else {
            return;
        };

        let extent = bbox.max_extent();
        let scale = if extent > 0.0 { 1.0 / extent } else { 0.0 };
        let shift = bbox.center();
        debug!(scale, shift_x = shift.x, shift_y = shift.y, shift_z = shift.z, "normalizing model");

        for facet in &mut self.facets {
            for p in &mut facet.vertices {
                p.x = (p.x - shift.x) * scale;
                p.y = (p.y - shift.y) * scale;
                p.z = (p.z - shift.z) * scale;
            }
        }
    }

    /// Rotate every corner and normal by 90 degrees about `axis`
    pub fn rotate_quarter(&mut self, axis: Axis) {
        debug!(?axis, facets = self.facets.len(), "rotating model");
        for facet in &mut self.facets {
            for p in &mut facet.vertices {
                quarter_turn(axis, &mut p.coords);
            }
            quarter_turn(axis, &mut facet.normal);
        }
    }

    /// `y <- z, z <- -y`
    pub fn rotate_x(&mut self) {
        self.rotate_quarter(Axis::X);
    }

    /// `z <- x, x <- -z`
    pub fn rotate_y(&mut self) {
        self.rotate_quarter(Axis::Y);
    }

    /// `x <- y, y <- -x`
    pub fn rotate_z(&mut self) {
        self.rotate_quarter(Axis::Z);
    }
}

/// Rotation state around three axes (in radians)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Model matrix builders for the view
pub struct Transform;

impl Transform {
    /// Rotation matrix applying Z, then Y, then X
    pub fn rotation_matrix(rotation: &RotationState) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(rotation.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, rotation.y, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, rotation.z));
        rz * ry * rx
    }

    /// Rotation followed by a uniform zoom
    pub fn model_matrix(rotation: &RotationState, zoom: f32) -> Matrix4<f32> {
        Matrix4::new_scaling(zoom) * Self::rotation_matrix(rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Facet;
    use nalgebra::Point3;

    fn sample_mesh() -> Mesh {
        Mesh::from_facets(
            "sample",
            vec![Facet::new(
                Point3::new(1.0, 2.0, 3.0),
                Point3::new(-4.0, 5.5, 0.25),
                Point3::new(7.0, -8.0, 9.0),
                Vector3::new(0.0, 0.6, 0.8),
            )],
        )
    }

    #[test]
    fn test_rotate_x_mapping() {
        let mut mesh = sample_mesh();
        mesh.rotate_x();
        let f = &mesh.facets()[0];
        assert_eq!(*f.p1(), Point3::new(1.0, 3.0, -2.0));
        assert_eq!(f.normal, Vector3::new(0.0, 0.8, -0.6));
    }

    #[test]
    fn test_rotate_y_mapping() {
        let mut mesh = sample_mesh();
        mesh.rotate_y();
        assert_eq!(*mesh.facets()[0].p1(), Point3::new(-3.0, 2.0, 1.0));
    }

    #[test]
    fn test_rotate_z_mapping() {
        let mut mesh = sample_mesh();
        mesh.rotate_z();
        assert_eq!(*mesh.facets()[0].p1(), Point3::new(2.0, -1.0, 3.0));
    }

    #[test]
    fn test_four_quarter_turns_restore_mesh() {
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            let original = sample_mesh();
            let mut mesh = original.clone();
            for _ in 0..4 {
                mesh.rotate_quarter(axis);
            }
            assert_eq!(mesh, original);
        }
    }

    #[test]
    fn test_normalize_unit_extent() {
        let mut mesh = sample_mesh();
        let normal = mesh.facets()[0].normal;
        mesh.normalize();
        let bbox = mesh.bounding_box().unwrap();
        assert!((bbox.max_extent() - 1.0).abs() < 1e-6);
        assert!(bbox.center().coords.norm() < 1e-6);
        assert_eq!(mesh.facets()[0].normal, normal);
    }

    #[test]
    fn test_normalize_degenerate_collapses_to_origin() {
        let p = Point3::new(3.0, 3.0, 3.0);
        let mut mesh = Mesh::from_facets("dot", vec![Facet::new(p, p, p, Vector3::z()); 2]);
        mesh.normalize();
        for facet in mesh.facets() {
            for v in &facet.vertices {
                assert_eq!(*v, Point3::origin());
            }
        }
    }

    #[test]
    fn test_normalize_empty_is_noop() {
        let mut mesh = Mesh::with_name("empty");
        mesh.normalize();
        assert!(mesh.is_empty());
        assert_eq!(mesh.name(), "empty");
    }

    #[test]
    fn test_rotation_state() {
        let mut state = RotationState::zero();
        state.rotate(0.1, 0.2, 0.3);
        assert!((state.x - 0.1).abs() < 1e-6);
        assert!((state.y - 0.2).abs() < 1e-6);
        assert!((state.z - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_identity_rotation() {
        let matrix = Transform::rotation_matrix(&RotationState::zero());
        assert!((matrix - Matrix4::identity()).norm() < 1e-6);
    }
}
