//! Explicit configuration of the atlas location, its directory layout, and the output.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;
use crate::view::{Hemisphere, SurfaceKind};

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

/// Prefix of the environment variables that override configuration values, e.g. `GLASSERPLOT_ATLAS_DIR`.
pub const ENV_PREFIX: &str = "GLASSERPLOT";

const HEMI_PLACEHOLDER: &str = "{hemi}";
const SIDE_PLACEHOLDER: &str = "{side}";


/// File names inside the atlas directory.
///
/// In the file name templates, `{side}` is replaced by `left` or `right`, and `{hemi}` by the FreeSurfer
/// prefix `lh` or `rh`. Names ending in `.gii` are read as GIFTI, all others as FreeSurfer binary files.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AtlasLayout {
    pub surface_dir: String,
    pub pial_file: String,
    pub inflated_file: String,
    pub sulc_file: String,
    pub parcellation_dir: String,
    pub parcellation_marker: String,
}

impl Default for AtlasLayout {
    fn default() -> AtlasLayout {
        AtlasLayout {
            surface_dir: String::from("fsaverage"),
            pial_file: String::from("pial_{side}.gii"),
            inflated_file: String::from("inflated_{side}.gii"),
            sulc_file: String::from("sulc_{side}.gii"),
            parcellation_dir: String::from("glasser"),
            parcellation_marker: String::from("HCPMMP1"),
        }
    }
}

impl AtlasLayout {
    fn hemi_file(&self, atlas_dir: &Path, template: &str, hemisphere: Hemisphere) -> PathBuf {
        atlas_dir
            .join(&self.surface_dir)
            .join(template.replace(HEMI_PLACEHOLDER, hemisphere.fs_prefix()).replace(SIDE_PLACEHOLDER, &hemisphere.to_string()))
    }

    pub fn surface_path(&self, atlas_dir: &Path, hemisphere: Hemisphere, kind: SurfaceKind) -> PathBuf {
        let template = match kind {
            SurfaceKind::Pial => &self.pial_file,
            SurfaceKind::Inflated => &self.inflated_file,
        };
        self.hemi_file(atlas_dir, template, hemisphere)
    }

    pub fn sulc_path(&self, atlas_dir: &Path, hemisphere: Hemisphere) -> PathBuf {
        self.hemi_file(atlas_dir, &self.sulc_file, hemisphere)
    }

    pub fn parcellation_path(&self, atlas_dir: &Path) -> PathBuf {
        atlas_dir.join(&self.parcellation_dir)
    }
}


/// Where to find the atlas, where to put the plots, and how to produce them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// The directory that contains the surface and parcellation subdirectories.
    pub atlas_dir: PathBuf,
    /// The directory the plot files are written to.
    pub output_dir: PathBuf,
    pub layout: AtlasLayout,
    /// Whether 3D plots are opened in the system's viewer after they are written.
    pub open_viewer: bool,
    pub image_width: u32,
    pub image_height: u32,
}

impl Default for PlotConfig {
    fn default() -> PlotConfig {
        PlotConfig {
            atlas_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            layout: AtlasLayout::default(),
            open_viewer: true,
            image_width: 800,
            image_height: 800,
        }
    }
}

impl PlotConfig {
    /// A default configuration for the given atlas and output directories.
    pub fn new<A: Into<PathBuf>, O: Into<PathBuf>>(atlas_dir: A, output_dir: O) -> PlotConfig {
        PlotConfig {
            atlas_dir: atlas_dir.into(),
            output_dir: output_dir.into(),
            ..PlotConfig::default()
        }
    }

    /// Load the configuration from the built-in defaults, then the optional TOML `file`, then
    /// environment variables with the prefix [`ENV_PREFIX`]. Later sources override earlier ones.
    pub fn load(file: Option<&Path>) -> Result<PlotConfig> {
        let mut builder = ::config::Config::builder()
            .add_source(::config::File::from_str(DEFAULT_CONFIG, ::config::FileFormat::Toml));

        if let Some(path) = file {
            log::debug!("loading configuration from {}", path.display());
            builder = builder.add_source(::config::File::from(path).format(::config::FileFormat::Toml));
        }

        let config = builder
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize::<PlotConfig>()?;
        Ok(config)
    }
}
