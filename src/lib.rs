//! Plot per-parcel signals of the Glasser (HCP-MMP1) atlas on FreeSurfer cortical surfaces.
//!
//! A signal holds one value per parcel: 180 values for one hemisphere, or 360 for both hemispheres (left first).
//! The values are mapped onto the vertices of the fsaverage surfaces through the atlas parcellation, and drawn
//! either as a static PNG image of one hemisphere, or as an interactive HTML page.
//!
//! The atlas files are read with the GIFTI and FreeSurfer surf, curv and annot readers of this crate, which can
//! also be used on their own. The format of a file is picked by its name: `.gii` files are GIFTI.

pub mod colormap;
pub mod config;
pub mod error;
pub mod fs_annot;
pub mod fs_curv;
pub mod fs_surface;
pub mod gifti;
pub mod mapping;
pub mod parcellation;
pub mod plot;
pub mod render;
pub mod traits;
pub mod util;
pub mod view;

pub use colormap::{ColorScale, Colormap, Gradient};
pub use config::{AtlasLayout, PlotConfig};
pub use error::{GlasserPlotError, Result};
pub use fs_annot::{read_annot, write_annot, FsAnnot, FsAnnotColortable};
pub use fs_curv::{read_curv, read_vertex_data, write_curv, CurvHeader, FsCurv};
pub use fs_surface::{combine_meshes, read_mesh, read_surf, write_surf, BrainMesh, FsSurface, FsSurfaceHeader};
pub use gifti::{read_gifti, write_gifti, GiftiData, GiftiDataArray, GiftiImage};
pub use mapping::{concat_fields, map_signal, split_hemispheres, VertexField, GLASSER_PARCELS_PER_HEMISPHERE};
pub use parcellation::{find_parcellation_files, load_parcel_labels, ParcelLabels};
pub use plot::{plot_both_hemispheres_3d, plot_hemisphere_2d, plot_hemisphere_3d, Plot2dOptions, Plot3dOptions, OUTPUT_2D_FILE, OUTPUT_3D_FILE};
pub use render::{HtmlRenderer, RasterRenderer, RenderOptions, SurfacePlot};
pub use traits::VertexColor;
pub use view::{parse_hemisphere, parse_view, Camera, Hemisphere, SurfaceKind, View};
