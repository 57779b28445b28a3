// Software rasterizer for static surface plots: orthographic projection, z-buffered flat shaded triangles.

use std::io::Cursor;

use image::{ImageBuffer, ImageFormat, Rgb, RgbImage};

use crate::error::Result;
use crate::render::{scale_rgb, SurfacePlot};
use crate::view::Camera;

const MARGIN: f32 = 0.05;
const COLORBAR_WIDTH: u32 = 80;
const AMBIENT: f32 = 0.35;


/// Renders a [`SurfacePlot`] into an RGB image of fixed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterRenderer {
    pub width: u32,
    pub height: u32,
}

impl RasterRenderer {
    pub fn new(width: u32, height: u32) -> RasterRenderer {
        RasterRenderer { width: width.max(1), height: height.max(1) }
    }

    /// Draw the plot as seen by `camera`.
    pub fn render(&self, plot: &SurfacePlot<'_>, camera: &Camera) -> RgbImage {
        let (background, foreground) = if plot.options.dark_background {
            (Rgb([0, 0, 0]), Rgb([255, 255, 255]))
        } else {
            (Rgb([255, 255, 255]), Rgb([0, 0, 0]))
        };
        let mut image: RgbImage = ImageBuffer::from_pixel(self.width, self.height, background);

        let colorbar_width = if plot.options.colorbar && self.width > 2 * COLORBAR_WIDTH { COLORBAR_WIDTH } else { 0 };
        let viewport = Viewport { width: (self.width - colorbar_width) as f32, height: self.height as f32 };

        let projected = project(plot, camera, &viewport);
        let mut depth_buffer = vec![f32::NEG_INFINITY; (self.width * self.height) as usize];

        let direction = normalize(camera.direction);
        for face_idx in 0..plot.mesh.num_faces() {
            let [a, b, c] = plot.mesh.face(face_idx);

            let normal = normalize(cross(
                sub(plot.mesh.vertex(b), plot.mesh.vertex(a)),
                sub(plot.mesh.vertex(c), plot.mesh.vertex(a)),
            ));
            let lambert = AMBIENT + (1.0 - AMBIENT) * dot(normal, direction).abs();

            let value = median3(plot.value(a), plot.value(b), plot.value(c));
            let shade = (plot.shade(a) + plot.shade(b) + plot.shade(c)) / 3.0;
            let color = scale_rgb(plot.surface_color(value, shade), lambert);

            fill_triangle(&mut image, &mut depth_buffer, [projected[a], projected[b], projected[c]], Rgb(color));
        }

        if colorbar_width > 0 {
            draw_colorbar(&mut image, plot, self.width - colorbar_width, colorbar_width, foreground);
        }
        image
    }

    /// Draw the plot and encode it as PNG.
    pub fn render_png(&self, plot: &SurfacePlot<'_>, camera: &Camera) -> Result<Vec<u8>> {
        let image = self.render(plot, camera);
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, ImageFormat::Png)?;
        Ok(buf.into_inner())
    }
}


struct Viewport {
    width: f32,
    height: f32,
}

/// Screen position (x right, y down, in pixels) and depth (larger is closer to the camera) of every vertex.
fn project(plot: &SurfacePlot<'_>, camera: &Camera, viewport: &Viewport) -> Vec<[f32; 3]> {
    let direction = normalize(camera.direction);
    let forward = [-direction[0], -direction[1], -direction[2]];
    let right = normalize(cross(forward, camera.up));
    let up = cross(right, forward);

    let mesh = plot.mesh;
    let center = mesh.center().unwrap_or([0.0; 3]);
    let view_coords: Vec<[f32; 3]> = (0..mesh.num_vertices())
        .map(|v| {
            let p = sub(mesh.vertex(v), center);
            [dot(p, right), dot(p, up), dot(p, direction)]
        })
        .collect();

    let (mut min_x, mut max_x, mut min_y, mut max_y) = (f32::INFINITY, f32::NEG_INFINITY, f32::INFINITY, f32::NEG_INFINITY);
    for p in &view_coords {
        min_x = min_x.min(p[0]);
        max_x = max_x.max(p[0]);
        min_y = min_y.min(p[1]);
        max_y = max_y.max(p[1]);
    }
    let extent_x = (max_x - min_x).max(f32::EPSILON);
    let extent_y = (max_y - min_y).max(f32::EPSILON);

    let usable_w = viewport.width * (1.0 - 2.0 * MARGIN);
    let usable_h = viewport.height * (1.0 - 2.0 * MARGIN);
    let scale = (usable_w / extent_x).min(usable_h / extent_y);
    let offset_x = (viewport.width - extent_x * scale) / 2.0;
    let offset_y = (viewport.height - extent_y * scale) / 2.0;

    view_coords.iter()
        .map(|p| [
            offset_x + (p[0] - min_x) * scale,
            viewport.height - (offset_y + (p[1] - min_y) * scale),
            p[2],
        ])
        .collect()
}

fn fill_triangle(image: &mut RgbImage, depth_buffer: &mut [f32], tri: [[f32; 3]; 3], color: Rgb<u8>) {
    let [p0, p1, p2] = tri;
    let area = edge(p0, p1, p2);
    if area.abs() < f32::EPSILON {
        return;
    }

    let (width, height) = image.dimensions();
    let min_x = p0[0].min(p1[0]).min(p2[0]).floor().max(0.0) as u32;
    let min_y = p0[1].min(p1[1]).min(p2[1]).floor().max(0.0) as u32;
    let max_x = (p0[0].max(p1[0]).max(p2[0]).ceil() as i64).min(width as i64 - 1);
    let max_y = (p0[1].max(p1[1]).max(p2[1]).ceil() as i64).min(height as i64 - 1);
    if max_x < 0 || max_y < 0 {
        return;
    }

    for y in min_y..=max_y as u32 {
        for x in min_x..=max_x as u32 {
            let p = [x as f32 + 0.5, y as f32 + 0.5, 0.0];
            let w0 = edge(p1, p2, p) / area;
            let w1 = edge(p2, p0, p) / area;
            let w2 = edge(p0, p1, p) / area;
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }
            let depth = w0 * p0[2] + w1 * p1[2] + w2 * p2[2];
            let idx = (y * width + x) as usize;
            if depth > depth_buffer[idx] {
                depth_buffer[idx] = depth;
                image.put_pixel(x, y, color);
            }
        }
    }
}

/// A vertical color gradient, high values at the top, framed in the foreground color.
fn draw_colorbar(image: &mut RgbImage, plot: &SurfacePlot<'_>, left: u32, width: u32, foreground: Rgb<u8>) {
    let height = image.height();
    let bar_left = left + width / 4;
    let bar_right = left + width / 2;
    let top = height / 10;
    let bottom = height - height / 10;
    if bottom <= top + 1 {
        return;
    }

    for y in top..=bottom {
        let t = (bottom - y) as f64 / (bottom - top) as f64;
        let color = Rgb(plot.options.colormap.eval(t));
        for x in bar_left..=bar_right {
            let on_frame = y == top || y == bottom || x == bar_left || x == bar_right;
            image.put_pixel(x, y, if on_frame { foreground } else { color });
        }
    }
}

fn median3(a: f32, b: f32, c: f32) -> f32 {
    a.min(b).max(a.max(b).min(c))
}

fn edge(a: [f32; 3], b: [f32; 3], p: [f32; 3]) -> f32 {
    (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0])
}

fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[1] * b[2] - a[2] * b[1], a[2] * b[0] - a[0] * b[2], a[0] * b[1] - a[1] * b[0]]
}

fn normalize(a: [f32; 3]) -> [f32; 3] {
    let len = dot(a, a).sqrt();
    if len > 0.0 { [a[0] / len, a[1] / len, a[2] / len] } else { a }
}
