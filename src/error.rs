use quick_error::quick_error;
use std::io::Error as IOError;
use std::path::PathBuf;

quick_error! {
    /// Error type for all error variants originated by this crate.
    #[derive(Debug)]
    pub enum GlasserPlotError {
        /// The signal length does not match the parcel count required by the plot mode.
        DimensionMismatch(expected: usize, actual: usize) {
            display("Signal has {} values, but {} are required (one per parcel)", actual, expected)
        }

        /// The requested camera view is not one of the supported views.
        InvalidView(name: String) {
            display("Invalid view '{}', options: lateral, medial, dorsal, ventral, anterior, posterior", name)
        }

        InvalidHemisphere(name: String) {
            display("Invalid hemisphere '{}', options: left, right", name)
        }

        UnknownColormap(name: String) {
            display("Unknown colormap '{}'", name)
        }

        /// Not exactly two parcellation files carrying the atlas marker were found.
        MissingParcellationFiles(dir: PathBuf, found: usize) {
            display("Expected 2 parcellation files in '{}', found {}", dir.display(), found)
        }

        /// Per-vertex data or face indices do not fit the mesh they are used with.
        MeshDataMismatch(what: &'static str, expected: usize, actual: usize) {
            display("Mesh data mismatch for {}: expected {}, got {}", what, expected, actual)
        }

        /// Invalid curv file: wrong magic number.
        InvalidCurvFormat {
            display("Invalid Curv file")
        }

        InvalidFsSurfaceFormat {
            display("Invalid FreeSurfer surf file")
        }

        UnsupportedFsAnnotFormatVersion {
            display("Unsupported FreeSurfer annot file format version")
        }

        InvalidGiftiFormat(reason: String) {
            display("Invalid GIFTI file: {}", reason)
        }

        Xml(err: quick_xml::Error) {
            from()
            source(err)
            display("XML error: {}", err)
        }

        Base64(err: base64::DecodeError) {
            from()
            source(err)
            display("Base64 decoding error: {}", err)
        }

        /// I/O Error
        Io(err: IOError) {
            from()
            source(err)
        }

        Image(err: image::ImageError) {
            from()
            source(err)
            display("Image encoding error: {}", err)
        }

        Json(err: serde_json::Error) {
            from()
            source(err)
            display("JSON encoding error: {}", err)
        }

        Config(err: ::config::ConfigError) {
            from()
            source(err)
            display("Configuration error: {}", err)
        }
    }
}

/// Alias type for results originated from this crate.
pub type Result<T> = ::std::result::Result<T, GlasserPlotError>;
