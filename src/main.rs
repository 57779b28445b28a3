use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use eyre::{eyre, Context, Result};

use glasserplot::{
    parse_hemisphere, plot_both_hemispheres_3d, plot_hemisphere_2d, plot_hemisphere_3d, Plot2dOptions,
    Plot3dOptions, PlotConfig, SurfaceKind,
};

/// Plot per-parcel signals of the Glasser (HCP-MMP1) atlas on the fsaverage cortical surfaces.
///
/// The signal file holds one number per parcel, separated by whitespace, commas or newlines.
/// Everything after a `#` on a line is ignored.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Atlas directory, overrides the configuration.
    #[arg(long, global = true)]
    atlas: Option<PathBuf>,
    /// Output directory, overrides the configuration.
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    subcommand: Subcommand,
}

#[derive(clap::Subcommand, Debug)]
enum Subcommand {
    /// Write a PNG image of one hemisphere (180 values).
    #[command(name = "2d")]
    Plot2d {
        /// Signal file.
        #[arg(short, long)]
        signal: PathBuf,
        /// lateral, medial, dorsal, ventral, anterior or posterior.
        #[arg(long, default_value = "lateral")]
        view: String,
        /// left or right.
        #[arg(long, default_value = "left")]
        hemisphere: String,
        /// Colormap name, append `_r` to reverse it.
        #[arg(long, default_value = "jet")]
        cmap: String,
        #[arg(long)]
        no_colorbar: bool,
        #[arg(long)]
        dark: bool,
        /// pial or inflated.
        #[arg(long, default_value = "pial")]
        surface: String,
    },
    /// Write an interactive HTML view of both hemispheres (360 values, left first), or of one (180 values).
    #[command(name = "3d")]
    Plot3d {
        /// Signal file.
        #[arg(short, long)]
        signal: PathBuf,
        /// Plot only this hemisphere.
        #[arg(long)]
        hemisphere: Option<String>,
        #[arg(long, default_value = "jet")]
        cmap: String,
        #[arg(long)]
        no_colorbar: bool,
        #[arg(long)]
        dark: bool,
        /// Center the color range on zero.
        #[arg(long)]
        symmetric: bool,
        #[arg(long, default_value = "pial")]
        surface: String,
        /// Do not open the page in the system viewer.
        #[arg(long)]
        no_open: bool,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    color_eyre::install()?;

    let args = Args::parse();

    let mut config = PlotConfig::load(args.config.as_deref()).wrap_err("failed to load the configuration")?;
    if let Some(atlas) = args.atlas {
        config.atlas_dir = atlas;
    }
    if let Some(output) = args.output {
        config.output_dir = output;
    }

    let written = exec(args.subcommand, config)?;
    println!("{}", written.display());
    Ok(())
}

fn exec(subcommand: Subcommand, mut config: PlotConfig) -> Result<PathBuf> {
    match subcommand {
        Subcommand::Plot2d { signal, view, hemisphere, cmap, no_colorbar, dark, surface } => {
            let signal = read_signal(&signal)?;
            let options = Plot2dOptions {
                colorbar: !no_colorbar,
                dark_background: dark,
                surface: parse_surface(&surface)?,
                ..Plot2dOptions::parse(&view, &hemisphere, &cmap)?
            };
            Ok(plot_hemisphere_2d(&signal, &config, &options)?)
        }
        Subcommand::Plot3d { signal, hemisphere, cmap, no_colorbar, dark, symmetric, surface, no_open } => {
            let signal = read_signal(&signal)?;
            if no_open {
                config.open_viewer = false;
            }
            let mut options = Plot3dOptions {
                colormap: cmap.parse()?,
                colorbar: !no_colorbar,
                dark_background: dark,
                symmetric_colormap: symmetric,
                surface: parse_surface(&surface)?,
                ..Plot3dOptions::default()
            };
            match hemisphere {
                Some(name) => {
                    options.hemisphere = parse_hemisphere(&name)?;
                    Ok(plot_hemisphere_3d(&signal, &config, &options)?)
                }
                None => Ok(plot_both_hemispheres_3d(&signal, &config, &options)?),
            }
        }
    }
}

fn parse_surface(name: &str) -> Result<SurfaceKind> {
    name.parse().map_err(|_| eyre!("invalid surface '{}', options: pial, inflated", name))
}

fn read_signal(path: &Path) -> Result<Vec<f32>> {
    let text = fs::read_to_string(path).wrap_err_with(|| format!("failed to read signal file {}", path.display()))?;
    parse_signal(&text).wrap_err_with(|| format!("invalid signal file {}", path.display()))
}

/// Parse numbers separated by whitespace or commas. `#` starts a comment that runs to the end of the line.
fn parse_signal(text: &str) -> Result<Vec<f32>> {
    let mut values = Vec::new();
    for (line_idx, line) in text.lines().enumerate() {
        let data = line.split('#').next().unwrap_or("");
        for token in data.split(|c: char| c == ',' || c.is_whitespace()).filter(|t| !t.is_empty()) {
            let value = token
                .parse::<f32>()
                .map_err(|e| eyre!("line {}: '{}' is not a number: {}", line_idx + 1, token, e))?;
            values.push(value);
        }
    }
    Ok(values)
}
