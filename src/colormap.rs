//! Colormaps and the scaling of field values into them.

use std::str::FromStr;

use ndarray::Array1;
use ndarray_stats::QuantileExt;
use strum::{Display, EnumIter, EnumString};

use crate::error::GlasserPlotError;


#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Gradient {
    Jet,
    Viridis,
    Plasma,
    Inferno,
    Magma,
    Cividis,
    Turbo,
    Cool,
    Warm,
    Spectral,
    #[strum(serialize = "rdbu")]
    RdBu,
    #[strum(serialize = "rdylbu")]
    RdYlBu,
    Greys,
    Cubehelix,
}

impl Gradient {
    /// Samples the gradient at a point from 0.0 to 1.0.
    pub fn eval_continuous(self, t: f64) -> [u8; 3] {
        fn eval(g: colorous::Gradient, t: f64) -> [u8; 3] {
            g.eval_continuous(t).as_array()
        }

        match self {
            Self::Jet => jet(t),
            Self::Viridis => eval(colorous::VIRIDIS, t),
            Self::Plasma => eval(colorous::PLASMA, t),
            Self::Inferno => eval(colorous::INFERNO, t),
            Self::Magma => eval(colorous::MAGMA, t),
            Self::Cividis => eval(colorous::CIVIDIS, t),
            Self::Turbo => eval(colorous::TURBO, t),
            Self::Cool => eval(colorous::COOL, t),
            Self::Warm => eval(colorous::WARM, t),
            Self::Spectral => eval(colorous::SPECTRAL, t),
            Self::RdBu => eval(colorous::RED_BLUE, t),
            Self::RdYlBu => eval(colorous::RED_YELLOW_BLUE, t),
            Self::Greys => eval(colorous::GREYS, t),
            Self::Cubehelix => eval(colorous::CUBEHELIX, t),
        }
    }
}


// (x, y) control points of matplotlib's jet colormap, per channel.
const JET_RED: &[(f64, f64)] = &[(0.0, 0.0), (0.35, 0.0), (0.66, 1.0), (0.89, 1.0), (1.0, 0.5)];
const JET_GREEN: &[(f64, f64)] = &[(0.0, 0.0), (0.125, 0.0), (0.375, 1.0), (0.64, 1.0), (0.91, 0.0), (1.0, 0.0)];
const JET_BLUE: &[(f64, f64)] = &[(0.0, 0.5), (0.11, 1.0), (0.34, 1.0), (0.65, 0.0), (1.0, 0.0)];

fn interpolate_segments(segments: &[(f64, f64)], t: f64) -> f64 {
    for pair in segments.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if t <= x1 {
            return y0 + (y1 - y0) * (t - x0) / (x1 - x0);
        }
    }
    segments.last().map(|&(_, y)| y).unwrap_or(0.0)
}

fn jet(t: f64) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    let channel = |segments: &[(f64, f64)]| (interpolate_segments(segments, t) * 255.0).round() as u8;
    [channel(JET_RED), channel(JET_GREEN), channel(JET_BLUE)]
}


/// A gradient, optionally reversed. Parsed from names like `jet`, `viridis` or `rdbu_r`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colormap {
    pub gradient: Gradient,
    pub reversed: bool,
}

impl Colormap {
    /// Sample the colormap at `t` in `[0, 1]`. Values outside are clamped.
    pub fn eval(&self, t: f64) -> [u8; 3] {
        let t = if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) };
        let t = if self.reversed { 1.0 - t } else { t };
        self.gradient.eval_continuous(t)
    }
}

impl Default for Colormap {
    fn default() -> Colormap {
        Colormap { gradient: Gradient::Jet, reversed: false }
    }
}

impl FromStr for Colormap {
    type Err = GlasserPlotError;

    fn from_str(name: &str) -> Result<Colormap, GlasserPlotError> {
        let (base, reversed) = match name.strip_suffix("_r") {
            Some(base) => (base, true),
            None => (name, false),
        };
        let gradient = Gradient::from_str(base).map_err(|_| GlasserPlotError::UnknownColormap(name.to_string()))?;
        Ok(Colormap { gradient, reversed })
    }
}

impl std::fmt::Display for Colormap {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}{}", self.gradient, if self.reversed { "_r" } else { "" })
    }
}


/// The value range that is spread over a colormap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    pub vmin: f32,
    pub vmax: f32,
}

impl ColorScale {
    /// Derive the range from all finite field values. A display threshold does not narrow the range,
    /// so values hidden by it (like the background `0`) still count.
    ///
    /// With `symmetric`, the range is centered on zero: `[-m, m]` with `m` the largest magnitude.
    /// A field without finite values gives the range `[0, 0]`.
    pub fn from_field<'a, I>(values: I, symmetric: bool) -> ColorScale
    where
        I: IntoIterator<Item = &'a f32>,
    {
        let finite: Array1<f32> = values.into_iter()
            .copied()
            .filter(|v| v.is_finite())
            .collect();

        let (vmin, vmax) = match (finite.min(), finite.max()) {
            (Ok(min), Ok(max)) => (*min, *max),
            _ => (0.0, 0.0),
        };

        if symmetric {
            let m = vmin.abs().max(vmax.abs());
            ColorScale { vmin: -m, vmax: m }
        } else {
            ColorScale { vmin, vmax }
        }
    }

    /// Map a value into `[0, 1]`, clamping values outside the range. A degenerate range maps everything to `0.5`.
    pub fn normalize(&self, value: f32) -> f64 {
        let span = (self.vmax - self.vmin) as f64;
        if span <= 0.0 || !span.is_finite() {
            return 0.5;
        }
        (((value - self.vmin) as f64) / span).clamp(0.0, 1.0)
    }
}
