//! Camera and projection for the terminal viewport
use nalgebra::{Matrix4, Point3, Vector3};

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: f32 = 0.5;

/// Perspective camera looking at the origin, where a normalized model sits
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

/// A projected vertex: cell coordinates plus NDC depth
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
}

impl Camera {
    pub fn new(columns: u16, rows: u16) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 2.0),
            target: Point3::origin(),
            up: Vector3::y(),
            fov: std::f32::consts::FRAC_PI_4,
            aspect: Self::cell_aspect(columns, rows),
            near: 0.1,
            far: 100.0,
        }
    }

    fn cell_aspect(columns: u16, rows: u16) -> f32 {
        f32::from(columns.max(1)) * CELL_ASPECT / f32::from(rows.max(1))
    }

    /// Track a terminal resize
    pub fn resize(&mut self, columns: u16, rows: u16) {
        self.aspect = Self::cell_aspect(columns, rows);
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
    }

    /// Combined projection * view * model
    pub fn mvp(&self, model: &Matrix4<f32>) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix() * model
    }

    /// Project a point through `mvp` into a `width` x `height` cell grid.
    ///
    /// Points outside the view volume yield `None`.
    pub fn project(mvp: &Matrix4<f32>, point: &Point3<f32>, width: usize, height: usize) -> Option<ScreenPoint> {
        let ndc = mvp.transform_point(point);
        if !ndc.iter().all(|c| c.is_finite()) || ndc.z.abs() > 1.0 {
            return None;
        }
        if ndc.x.abs() > 1.0 || ndc.y.abs() > 1.0 {
            return None;
        }

        Some(ScreenPoint {
            x: (ndc.x + 1.0) * 0.5 * width as f32,
            y: (1.0 - ndc.y) * 0.5 * height as f32,
            depth: ndc.z,
        })
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_aspect_accounts_for_cells() {
        let camera = Camera::new(80, 20);
        assert!((camera.aspect - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_origin_projects_to_center() {
        let camera = Camera::new(80, 40);
        let mvp = camera.mvp(&Matrix4::identity());
        let p = Camera::project(&mvp, &Point3::origin(), 80, 40).unwrap();
        assert!((p.x - 40.0).abs() < 1e-4);
        assert!((p.y - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_point_behind_camera_is_clipped() {
        let camera = Camera::default();
        let mvp = camera.mvp(&Matrix4::identity());
        assert!(Camera::project(&mvp, &Point3::new(0.0, 0.0, 5.0), 80, 24).is_none());
    }
}
