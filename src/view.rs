//! Hemispheres, surface kinds and camera views.

use std::str::FromStr;

use strum::{Display, EnumIter, EnumString};

use crate::error::GlasserPlotError;


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Hemisphere {
    #[strum(to_string = "left", serialize = "lh")]
    Left,
    #[strum(to_string = "right", serialize = "rh")]
    Right,
}

impl Hemisphere {
    /// The FreeSurfer file name prefix of the hemisphere.
    pub fn fs_prefix(self) -> &'static str {
        match self {
            Hemisphere::Left => "lh",
            Hemisphere::Right => "rh",
        }
    }
}

impl Default for Hemisphere {
    fn default() -> Hemisphere {
        Hemisphere::Left
    }
}

/// Parses `left`/`lh` and `right`/`rh`.
pub fn parse_hemisphere(name: &str) -> Result<Hemisphere, GlasserPlotError> {
    Hemisphere::from_str(name).map_err(|_| GlasserPlotError::InvalidHemisphere(name.to_string()))
}


/// Which of the surface meshes of a hemisphere to draw the signal on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SurfaceKind {
    Pial,
    Inflated,
}

impl Default for SurfaceKind {
    fn default() -> SurfaceKind {
        SurfaceKind::Pial
    }
}


/// The camera views of the 2D plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum View {
    Lateral,
    Medial,
    Dorsal,
    Ventral,
    Anterior,
    Posterior,
}

impl Default for View {
    fn default() -> View {
        View::Lateral
    }
}

/// Parses one of the view names. Anything else is an `InvalidView` error.
pub fn parse_view(name: &str) -> Result<View, GlasserPlotError> {
    View::from_str(name).map_err(|_| GlasserPlotError::InvalidView(name.to_string()))
}


/// An orthographic camera, given by the direction from the mesh towards the camera and the up direction of the image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub direction: [f32; 3],
    pub up: [f32; 3],
}

impl View {
    /// The camera for this view of the given hemisphere. Lateral and medial depend on the hemisphere,
    /// the other views do not. Coordinates are RAS: +x right, +y anterior, +z superior.
    pub fn camera(self, hemisphere: Hemisphere) -> Camera {
        let outwards = match hemisphere {
            Hemisphere::Left => -1.0,
            Hemisphere::Right => 1.0,
        };
        let (direction, up) = match self {
            View::Lateral => ([outwards, 0.0, 0.0], [0.0, 0.0, 1.0]),
            View::Medial => ([-outwards, 0.0, 0.0], [0.0, 0.0, 1.0]),
            View::Dorsal => ([0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            View::Ventral => ([0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            View::Anterior => ([0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
            View::Posterior => ([0.0, -1.0, 0.0], [0.0, 0.0, 1.0]),
        };
        Camera { direction, up }
    }
}
