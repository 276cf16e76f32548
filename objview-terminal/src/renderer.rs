/// ASCII wireframe rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix4, Point3};
use objview_core::{Camera, Mesh};
use std::io::Write;

/// Glyph used for vertices
const POINT_GLYPH: char = 'o';

/// Vertices are drawn slightly in front of the edges meeting at them
const POINT_DEPTH_BIAS: f32 = 1e-4;

type ScreenPoint = (f32, f32, f32);

/// ASCII renderer that draws mesh edges and vertices as terminal characters
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

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
    }

    pub fn char_at(&self, x: usize, y: usize) -> Option<char> {
        if x < self.width && y < self.height {
            Some(self.char_buffer[y * self.width + x])
        } else {
            None
        }
    }

    /// Rasterize every segment, then every vertex, of `mesh`
    pub fn render_mesh(&mut self, mesh: &Mesh, model_matrix: &Matrix4<f64>, camera: &Camera) {
        let projected: Vec<Option<ScreenPoint>> = mesh
            .positions()
            .chunks_exact(3)
            .map(|xyz| {
                camera.project_to_screen(
                    &Point3::new(xyz[0], xyz[1], xyz[2]),
                    model_matrix,
                    self.width as u32,
                    self.height as u32,
                )
            })
            .collect();

        for (a, b) in mesh.segments() {
            // Segments with an endpoint behind the camera are dropped
            if let (Some(start), Some(end)) = (projected[a as usize], projected[b as usize]) {
                self.draw_line(start, end);
            }
        }

        for (x, y, depth) in projected.into_iter().flatten() {
            self.plot(x, y, depth - POINT_DEPTH_BIAS, POINT_GLYPH);
        }
    }

    fn draw_line(&mut self, start: ScreenPoint, end: ScreenPoint) {
        let Some((start, end)) = clip_segment(start, end, self.width as f32, self.height as f32)
        else {
            return;
        };

        let dx = end.0 - start.0;
        let dy = end.1 - start.1;
        let glyph = line_glyph(dx, dy);
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;

        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            self.plot(
                start.0 + dx * t,
                start.1 + dy * t,
                start.2 + (end.2 - start.2) * t,
                glyph,
            );
        }
    }

    fn plot(&mut self, x: f32, y: f32, depth: f32, glyph: char) {
        if x < 0.0 || y < 0.0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return;
        }

        let idx = y * self.width + x;
        if depth < self.depth_buffer[idx] {
            self.depth_buffer[idx] = depth;
            self.char_buffer[idx] = glyph;
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let c = self.char_buffer[y * self.width + x];

                let color = match c {
                    POINT_GLYPH => Color::Cyan,
                    ' ' => Color::DarkGrey,
                    _ => Color::White,
                };

                writer.queue(SetForegroundColor(color))?;
                writer.queue(Print(c))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Pick a character approximating the on-screen direction of a line.
/// Screen y grows downwards.
fn line_glyph(dx: f32, dy: f32) -> char {
    if dx.abs() > 2.0 * dy.abs() {
        '-'
    } else if dy.abs() > 2.0 * dx.abs() {
        '|'
    } else if (dx > 0.0) == (dy > 0.0) {
        '\\'
    } else {
        '/'
    }
}

/// Liang-Barsky clip of a screen-space segment to `[0, width) x [0, height)`.
/// Depth is interpolated along with x and y.
fn clip_segment(
    start: ScreenPoint,
    end: ScreenPoint,
    width: f32,
    height: f32,
) -> Option<(ScreenPoint, ScreenPoint)> {
    let dx = end.0 - start.0;
    let dy = end.1 - start.1;
    let (mut t0, mut t1) = (0.0f32, 1.0f32);

    let edges = [
        (-dx, start.0),
        (dx, width - 1e-3 - start.0),
        (-dy, start.1),
        (dy, height - 1e-3 - start.1),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }

    let at = |t: f32| {
        (
            start.0 + dx * t,
            start.1 + dy * t,
            start.2 + (end.2 - start.2) * t,
        )
    };
    Some((at(t0), at(t1)))
}
