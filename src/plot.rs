//! The plotting entry points: map a per-parcel signal onto the atlas surfaces and write the plot file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use ndarray::Array1;
use tempfile::NamedTempFile;

use crate::colormap::Colormap;
use crate::config::PlotConfig;
use crate::error::{GlasserPlotError, Result};
use crate::fs_curv::read_vertex_data;
use crate::fs_surface::{combine_meshes, read_mesh, BrainMesh};
use crate::mapping::{check_signal_length, concat_fields, map_signal, split_hemispheres, VertexField, GLASSER_PARCELS_PER_HEMISPHERE};
use crate::parcellation::{find_parcellation_files, hemisphere_parcellation_file, load_parcel_labels};
use crate::render::{HtmlRenderer, RasterRenderer, RenderOptions, SurfacePlot};
use crate::view::{parse_hemisphere, parse_view, Hemisphere, SurfaceKind, View};

/// File name of the 2D plot inside the output directory.
pub const OUTPUT_2D_FILE: &str = "2D_mapped_signal.png";
/// File name of the 3D plot inside the output directory.
pub const OUTPUT_3D_FILE: &str = "3D_mapped_signal.html";

// Keeps background (label 0) vertices uncolored in the static plots.
const THRESHOLD_2D: f32 = 1e-14;


/// Options of the static single hemisphere plot.
#[derive(Debug, Clone, PartialEq)]
pub struct Plot2dOptions {
    pub view: View,
    pub hemisphere: Hemisphere,
    pub colormap: Colormap,
    pub colorbar: bool,
    pub dark_background: bool,
    pub surface: SurfaceKind,
}

impl Default for Plot2dOptions {
    fn default() -> Plot2dOptions {
        Plot2dOptions {
            view: View::default(),
            hemisphere: Hemisphere::default(),
            colormap: Colormap::default(),
            colorbar: true,
            dark_background: false,
            surface: SurfaceKind::default(),
        }
    }
}

impl Plot2dOptions {
    /// Options from the names of the view, hemisphere and colormap, with a colorbar on a light background.
    ///
    /// # Errors
    ///
    /// `InvalidView`, `InvalidHemisphere` or `UnknownColormap` for names that are not recognized.
    pub fn parse(view: &str, hemisphere: &str, colormap: &str) -> Result<Plot2dOptions> {
        Ok(Plot2dOptions {
            view: parse_view(view)?,
            hemisphere: parse_hemisphere(hemisphere)?,
            colormap: colormap.parse()?,
            ..Plot2dOptions::default()
        })
    }
}


/// Options of the interactive plots.
#[derive(Debug, Clone, PartialEq)]
pub struct Plot3dOptions {
    /// The hemisphere of [`plot_hemisphere_3d`]. Ignored when plotting both hemispheres.
    pub hemisphere: Hemisphere,
    pub colormap: Colormap,
    pub colorbar: bool,
    pub dark_background: bool,
    pub symmetric_colormap: bool,
    pub surface: SurfaceKind,
}

impl Default for Plot3dOptions {
    fn default() -> Plot3dOptions {
        Plot3dOptions {
            hemisphere: Hemisphere::default(),
            colormap: Colormap::default(),
            colorbar: true,
            dark_background: false,
            symmetric_colormap: false,
            surface: SurfaceKind::default(),
        }
    }
}


/// Everything loaded from the atlas for one hemisphere.
struct HemisphereData {
    mesh: BrainMesh,
    sulc: Vec<f32>,
    field: VertexField,
}

fn load_hemisphere(signal: &[f32], config: &PlotConfig, hemisphere: Hemisphere, surface: SurfaceKind, parcellation: &Path) -> Result<HemisphereData> {
    let atlas = &config.atlas_dir;
    let layout = &config.layout;

    let surf_file = layout.surface_path(atlas, hemisphere, surface);
    let mesh = read_mesh(&surf_file)?;
    log::debug!("{}: {}", surf_file.display(), mesh);

    let sulc_file = layout.sulc_path(atlas, hemisphere);
    let sulc = read_vertex_data(&sulc_file)?;
    log::debug!("{}: {} sulcal depth values", sulc_file.display(), sulc.len());
    if sulc.len() != mesh.num_vertices() {
        return Err(GlasserPlotError::MeshDataMismatch("sulcal depth", mesh.num_vertices(), sulc.len()));
    }

    let labels = load_parcel_labels(parcellation)?;
    if labels.len() != mesh.num_vertices() {
        return Err(GlasserPlotError::MeshDataMismatch("parcel labels", mesh.num_vertices(), labels.len()));
    }

    let field = map_signal(signal, &labels, GLASSER_PARCELS_PER_HEMISPHERE)?;
    Ok(HemisphereData { mesh, sulc, field })
}

fn parcellation_file(config: &PlotConfig, hemisphere: Hemisphere) -> Result<PathBuf> {
    hemisphere_parcellation_file(&config.layout.parcellation_path(&config.atlas_dir), &config.layout.parcellation_marker, hemisphere)
}

/// Write the file under a temporary name in the output directory first, then move it into place, so that a
/// failed write never leaves a partial plot behind.
fn write_output(config: &PlotConfig, file_name: &str, contents: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(&config.output_dir)?;
    let path = config.output_dir.join(file_name);

    let mut tmp = NamedTempFile::new_in(&config.output_dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(&path).map_err(|e| e.error)?;
    Ok(path)
}

fn open_in_viewer(config: &PlotConfig, path: &Path) {
    if !config.open_viewer {
        return;
    }
    if let Err(e) = opener::open(path) {
        log::warn!("could not open {} in the system viewer: {}", path.display(), e);
    }
}


/// Plot a signal of one value per parcel on one hemisphere, as seen from the given view, and write it as PNG
/// to [`OUTPUT_2D_FILE`] in the output directory.
///
/// Returns the path of the written file.
///
/// # Errors
///
/// `DimensionMismatch` unless the signal holds exactly 180 values, checked before the atlas is read.
/// `MissingParcellationFiles` if the parcellation files cannot be found. Any error while reading the atlas files.
pub fn plot_hemisphere_2d(signal: &[f32], config: &PlotConfig, options: &Plot2dOptions) -> Result<PathBuf> {
    check_signal_length(signal, GLASSER_PARCELS_PER_HEMISPHERE)?;

    let parcellation = parcellation_file(config, options.hemisphere)?;
    let hemi = load_hemisphere(signal, config, options.hemisphere, options.surface, &parcellation)?;

    let render_options = RenderOptions {
        colormap: options.colormap,
        colorbar: options.colorbar,
        dark_background: options.dark_background,
        threshold: Some(THRESHOLD_2D),
        ..RenderOptions::default()
    };
    let sulc = Array1::from(hemi.sulc);
    let plot = SurfacePlot::new(&hemi.mesh, hemi.field.view(), Some(sulc.view()), render_options)?;

    let renderer = RasterRenderer::new(config.image_width, config.image_height);
    let png = renderer.render_png(&plot, &options.view.camera(options.hemisphere))?;

    let path = write_output(config, OUTPUT_2D_FILE, &png)?;
    log::info!("wrote {} view of the {} hemisphere to {}", options.view, options.hemisphere, path.display());
    Ok(path)
}


/// Plot a signal of one value per parcel on one hemisphere as an interactive HTML page, written to
/// [`OUTPUT_3D_FILE`] in the output directory and opened in the system viewer if configured.
///
/// # Errors
///
/// Like [`plot_hemisphere_2d`].
pub fn plot_hemisphere_3d(signal: &[f32], config: &PlotConfig, options: &Plot3dOptions) -> Result<PathBuf> {
    check_signal_length(signal, GLASSER_PARCELS_PER_HEMISPHERE)?;

    let parcellation = parcellation_file(config, options.hemisphere)?;
    let hemi = load_hemisphere(signal, config, options.hemisphere, options.surface, &parcellation)?;

    let title = format!("{} hemisphere", options.hemisphere);
    write_3d(config, options, &title, &hemi.mesh, &hemi.field, hemi.sulc)
}


/// Plot a signal covering both hemispheres, 180 values for the left one followed by 180 for the right one,
/// on the combined meshes as an interactive HTML page. The page is written to [`OUTPUT_3D_FILE`] in the output
/// directory and opened in the system viewer if configured.
///
/// # Errors
///
/// `DimensionMismatch` unless the signal holds exactly 360 values, checked before the atlas is read.
/// `MissingParcellationFiles` if the parcellation files cannot be found. Any error while reading the atlas files.
pub fn plot_both_hemispheres_3d(signal: &[f32], config: &PlotConfig, options: &Plot3dOptions) -> Result<PathBuf> {
    let (left_signal, right_signal) = split_hemispheres(signal, GLASSER_PARCELS_PER_HEMISPHERE)?;

    let [left_parc, right_parc] = find_parcellation_files(&config.layout.parcellation_path(&config.atlas_dir), &config.layout.parcellation_marker)?;
    let left = load_hemisphere(left_signal, config, Hemisphere::Left, options.surface, &left_parc)?;
    let right = load_hemisphere(right_signal, config, Hemisphere::Right, options.surface, &right_parc)?;

    let mesh = combine_meshes(&left.mesh, &right.mesh);
    let field = concat_fields(&left.field, &right.field);
    let mut sulc = left.sulc;
    sulc.extend_from_slice(&right.sulc);

    write_3d(config, options, "both hemispheres", &mesh, &field, sulc)
}

fn write_3d(config: &PlotConfig, options: &Plot3dOptions, title: &str, mesh: &BrainMesh, field: &VertexField, sulc: Vec<f32>) -> Result<PathBuf> {
    let render_options = RenderOptions {
        colormap: options.colormap,
        colorbar: options.colorbar,
        dark_background: options.dark_background,
        symmetric: options.symmetric_colormap,
        threshold: None,
        ..RenderOptions::default()
    };
    let sulc = Array1::from(sulc);
    let plot = SurfacePlot::new(mesh, field.view(), Some(sulc.view()), render_options)?;
    let page = HtmlRenderer::new(title).render(&plot)?;

    let path = write_output(config, OUTPUT_3D_FILE, page.as_bytes())?;
    log::info!("wrote interactive plot of {} to {}", title, path.display());
    open_in_viewer(config, &path);
    Ok(path)
}
