//! ASCII rasterizer for terminal rendering
use std::io::Write;

use crossterm::{
    cursor::MoveTo,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix4, Vector3};
use stlview_core::{Facet, Mesh};

use crate::camera::{Camera, ScreenPoint};

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];
const EDGE_CHAR: char = '#';
const POINT_CHAR: char = '*';

/// How facets are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawMode {
    #[default]
    Shaded,
    Wireframe,
    Points,
}

impl DrawMode {
    /// Next mode in the tab cycle
    pub fn next(self) -> Self {
        match self {
            DrawMode::Shaded => DrawMode::Wireframe,
            DrawMode::Wireframe => DrawMode::Points,
            DrawMode::Points => DrawMode::Shaded,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DrawMode::Shaded => "shaded",
            DrawMode::Wireframe => "wireframe",
            DrawMode::Points => "points",
        }
    }
}

/// ASCII renderer that converts a mesh to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Reallocate the buffers for a new terminal size
    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
    }

    /// Character at a cell, `None` outside the buffer
    pub fn char_at(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.char_buffer[y * self.width + x])
    }

    pub fn render_mesh(&mut self, mesh: &Mesh, model: &Matrix4<f32>, camera: &Camera, mode: DrawMode) {
        let mvp = camera.mvp(model);
        for facet in mesh.facets() {
            self.render_facet(facet, model, &mvp, mode);
        }
    }

    fn render_facet(&mut self, facet: &Facet, model: &Matrix4<f32>, mvp: &Matrix4<f32>, mode: DrawMode) {
        let (width, height) = (self.width, self.height);
        let project = |i: usize| Camera::project(mvp, &facet.vertices[i], width, height);

        if mode == DrawMode::Points {
            let points: Vec<ScreenPoint> = (0..3).filter_map(project).collect();
            for point in points {
                self.plot(point.x as i32, point.y as i32, point.depth, POINT_CHAR);
            }
            return;
        }

        // Triangle is clipped unless all three corners are visible
        let (Some(a), Some(b), Some(c)) = (project(0), project(1), project(2)) else {
            return;
        };

        match mode {
            DrawMode::Wireframe => {
                self.draw_line(a, b);
                self.draw_line(b, c);
                self.draw_line(c, a);
            }
            _ => {
                let brightness = facing_normal(facet, model).z.max(0.0);
                let index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
                let character = LUMINOSITY_RAMP[index.min(LUMINOSITY_RAMP.len() - 1)];
                self.rasterize_triangle([a, b, c], character);
            }
        }
    }

    fn plot(&mut self, x: i32, y: i32, depth: f32, character: char) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        if depth < self.depth_buffer[idx] {
            self.depth_buffer[idx] = depth;
            self.char_buffer[idx] = character;
        }
    }

    /// Bresenham line with depth interpolated along the major axis
    fn draw_line(&mut self, from: ScreenPoint, to: ScreenPoint) {
        let (mut x, mut y) = (from.x as i32, from.y as i32);
        let (x1, y1) = (to.x as i32, to.y as i32);
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let steps = dx.max(-dy).max(1) as f32;
        let mut err = dx + dy;
        let mut step = 0.0;

        loop {
            let depth = from.depth + (to.depth - from.depth) * (step / steps);
            self.plot(x, y, depth, EDGE_CHAR);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
            step += 1.0;
        }
    }

    fn rasterize_triangle(&mut self, [v0, v1, v2]: [ScreenPoint; 3], character: char) {
        let min_x = (v0.x.min(v1.x).min(v2.x).floor() as i32).max(0);
        let max_x = (v0.x.max(v1.x).max(v2.x).ceil() as i32).min(self.width as i32 - 1);
        let min_y = (v0.y.min(v1.y).min(v2.y).floor() as i32).max(0);
        let max_y = (v0.y.max(v1.y).max(v2.y).ceil() as i32).min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = (x as f32 + 0.5, y as f32 + 0.5);
                if let Some((w0, w1, w2)) = barycentric((v0.x, v0.y), (v1.x, v1.y), (v2.x, v2.y), p) {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        let depth = w0 * v0.depth + w1 * v1.depth + w2 * v2.depth;
                        self.plot(x, y, depth, character);
                    }
                }
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for (y, row) in self.char_buffer.chunks(self.width.max(1)).enumerate() {
            writer.queue(MoveTo(0, y as u16))?;
            for &c in row {
                let color = match c {
                    ' ' | '.' | ':' => Color::DarkGrey,
                    '-' | '=' => Color::Grey,
                    '+' | '*' => Color::White,
                    '#' | '%' | '@' => Color::Cyan,
                    _ => Color::White,
                };
                writer.queue(SetForegroundColor(color))?;
                writer.queue(Print(c))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Unit normal in view orientation. Falls back to the winding when the stored normal is zero.
fn facing_normal(facet: &Facet, model: &Matrix4<f32>) -> Vector3<f32> {
    let stored = model.transform_vector(&facet.normal);
    let normal = if stored.norm_squared() > f32::EPSILON {
        stored
    } else {
        let [a, b, c] = facet.vertices.map(|v| model.transform_point(&v));
        (b - a).cross(&(c - a))
    };
    normal.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::zeros)
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(v0: (f32, f32), v1: (f32, f32), v2: (f32, f32), p: (f32, f32)) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
