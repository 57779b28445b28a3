//! Rendering of scalar fields on brain meshes, as raster images and as interactive HTML views.

mod html;
mod raster;

pub use html::HtmlRenderer;
pub use raster::RasterRenderer;

use ndarray::ArrayView1;
use ndarray_stats::QuantileExt;

use crate::colormap::{ColorScale, Colormap};
use crate::error::{GlasserPlotError, Result};
use crate::fs_surface::BrainMesh;
use crate::traits::VertexColor;

/// How much the background field darkens the surface, from 0 (not at all) to 1.
pub const DEFAULT_DARKNESS: f32 = 0.5;


/// Display options shared by all renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub colormap: Colormap,
    pub colorbar: bool,
    pub dark_background: bool,
    /// Center the color range on zero.
    pub symmetric: bool,
    /// Values with a magnitude below the threshold are not colored, only the background shows.
    /// The threshold does not change the color range.
    pub threshold: Option<f32>,
    pub darkness: f32,
}

impl Default for RenderOptions {
    fn default() -> RenderOptions {
        RenderOptions {
            colormap: Colormap::default(),
            colorbar: true,
            dark_background: false,
            symmetric: false,
            threshold: None,
            darkness: DEFAULT_DARKNESS,
        }
    }
}


/// A scalar field on a mesh, ready to be drawn.
#[derive(Debug, Clone)]
pub struct SurfacePlot<'a> {
    pub mesh: &'a BrainMesh,
    field: ArrayView1<'a, f32>,
    // per-vertex gray level in [0, 1] derived from the background field
    shade: Vec<f32>,
    pub scale: ColorScale,
    pub options: RenderOptions,
}

impl<'a> SurfacePlot<'a> {
    /// Combine a mesh, a per-vertex field, and an optional per-vertex background field (like sulcal depth).
    ///
    /// # Errors
    ///
    /// `MeshDataMismatch` if the mesh is invalid or a field does not hold one value per vertex.
    pub fn new(mesh: &'a BrainMesh, field: ArrayView1<'a, f32>, bg_map: Option<ArrayView1<'a, f32>>, options: RenderOptions) -> Result<SurfacePlot<'a>> {
        mesh.validate()?;
        let num_vertices = mesh.num_vertices();
        if field.len() != num_vertices {
            return Err(GlasserPlotError::MeshDataMismatch("vertex field", num_vertices, field.len()));
        }

        let shade = match bg_map {
            Some(bg) if bg.len() != num_vertices => {
                return Err(GlasserPlotError::MeshDataMismatch("background field", num_vertices, bg.len()));
            }
            Some(bg) => background_shade(bg, options.darkness),
            None => vec![1.0; num_vertices],
        };

        let scale = ColorScale::from_field(field.iter(), options.symmetric);
        log::debug!("color range [{}, {}] with colormap {}", scale.vmin, scale.vmax, options.colormap);

        Ok(SurfacePlot { mesh, field, shade, scale, options })
    }

    pub fn value(&self, vertex: usize) -> f32 {
        self.field[vertex]
    }

    pub fn shade(&self, vertex: usize) -> f32 {
        self.shade[vertex]
    }

    /// Whether a value is drawn in color, as opposed to showing the background only.
    pub fn is_shown(&self, value: f32) -> bool {
        !value.is_nan() && self.options.threshold.map_or(true, |t| value.abs() >= t)
    }

    /// The colormap color of a value, or `None` if the value is not shown.
    pub fn value_color(&self, value: f32) -> Option<[u8; 3]> {
        if self.is_shown(value) {
            Some(self.options.colormap.eval(self.scale.normalize(value)))
        } else {
            None
        }
    }

    /// The final color of a surface point with the given value and background gray level.
    pub fn surface_color(&self, value: f32, shade: f32) -> [u8; 3] {
        match self.value_color(value) {
            Some(rgb) => scale_rgb(rgb, shade),
            None => scale_rgb([255, 255, 255], shade),
        }
    }
}

impl VertexColor for SurfacePlot<'_> {
    fn vertex_color_rgb(&self) -> Vec<u8> {
        (0..self.mesh.num_vertices())
            .flat_map(|v| self.surface_color(self.value(v), self.shade(v)).to_vec())
            .collect()
    }
}


/// Turn a background field into gray levels: the field is normalized to `[0, 1]`, and high values get darker.
fn background_shade(bg: ArrayView1<'_, f32>, darkness: f32) -> Vec<f32> {
    if bg.is_empty() {
        return Vec::new();
    }
    let min = *bg.min_skipnan();
    let max = *bg.max_skipnan();
    let span = max - min;
    bg.iter()
        .map(|&v| {
            let norm = if span > 0.0 && v.is_finite() { (v - min) / span } else { 0.5 };
            1.0 - darkness * norm
        })
        .collect()
}

pub(crate) fn scale_rgb(rgb: [u8; 3], factor: f32) -> [u8; 3] {
    let f = factor.clamp(0.0, 1.0);
    [
        (rgb[0] as f32 * f).round() as u8,
        (rgb[1] as f32 * f).round() as u8,
        (rgb[2] as f32 * f).round() as u8,
    ]
}


#[cfg(test)]
mod test {
    use super::*;
    use ndarray::Array1;

    fn triangle() -> BrainMesh {
        BrainMesh { vertices: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], faces: vec![0, 1, 2] }
    }

    #[test]
    fn fields_must_cover_all_vertices() {
        let mesh = triangle();
        let field = Array1::from(vec![1.0f32, 2.0]);
        let err = SurfacePlot::new(&mesh, field.view(), None, RenderOptions::default()).unwrap_err();
        assert!(matches!(err, GlasserPlotError::MeshDataMismatch("vertex field", 3, 2)));

        let field = Array1::from(vec![1.0f32, 2.0, 3.0]);
        let bg = Array1::from(vec![0.0f32; 4]);
        let err = SurfacePlot::new(&mesh, field.view(), Some(bg.view()), RenderOptions::default()).unwrap_err();
        assert!(matches!(err, GlasserPlotError::MeshDataMismatch("background field", 3, 4)));
    }

    #[test]
    fn deep_background_is_darker() {
        let bg = Array1::from(vec![-1.0f32, 0.0, 1.0]);
        let shade = background_shade(bg.view(), 0.5);
        assert_eq!(vec![1.0, 0.75, 0.5], shade);
    }

    #[test]
    fn values_below_the_threshold_show_the_background() {
        let mesh = triangle();
        let field = Array1::from(vec![0.0f32, 1.0, 2.0]);
        let options = RenderOptions { threshold: Some(1e-14), ..RenderOptions::default() };
        let plot = SurfacePlot::new(&mesh, field.view(), None, options).unwrap();

        let rgb = plot.vertex_color_rgb();
        assert_eq!(9, rgb.len());
        assert_eq!(&[255, 255, 255], &rgb[0..3]);
        assert_eq!(&plot.options.colormap.eval(0.5)[..], &rgb[3..6]);
        assert_eq!(&plot.options.colormap.eval(1.0)[..], &rgb[6..9]);
    }

    #[test]
    fn hidden_background_values_still_set_the_color_range() {
        let mesh = triangle();
        let field = Array1::from(vec![0.0f32, 5.0, 6.0]);
        let options = RenderOptions { threshold: Some(1e-14), ..RenderOptions::default() };
        let plot = SurfacePlot::new(&mesh, field.view(), None, options).unwrap();

        assert_eq!(0.0, plot.scale.vmin);
        assert_eq!(6.0, plot.scale.vmax);
        assert_eq!(None, plot.value_color(0.0));
        assert_eq!(Some(plot.options.colormap.eval(5.0 / 6.0)), plot.value_color(5.0));
        assert_ne!(plot.value_color(5.0), Some(plot.options.colormap.eval(0.0)));
    }
}
