//! Discovery and loading of the per-hemisphere parcellation files of an atlas.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{GlasserPlotError, Result};
use crate::fs_annot::read_annot;
use crate::gifti::read_gifti;
use crate::util::is_gifti_file;
use crate::view::Hemisphere;


/// The parcel ID of every vertex of a hemisphere mesh, in vertex order. `0` is background.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParcelLabels(Vec<i32>);

impl ParcelLabels {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, i32> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.0
    }
}

impl From<Vec<i32>> for ParcelLabels {
    fn from(labels: Vec<i32>) -> ParcelLabels {
        ParcelLabels(labels)
    }
}


/// Find the parcellation files in `dir` whose names contain `marker`.
///
/// Exactly two files must match. They are returned sorted by file name, so that with FreeSurfer
/// naming (`lh.*`, `rh.*`) the left hemisphere comes first.
///
/// # Errors
///
/// `MissingParcellationFiles` if the directory cannot be listed or does not hold exactly two matching files.
pub fn find_parcellation_files(dir: &Path, marker: &str) -> Result<[PathBuf; 2]> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::debug!("cannot list parcellation directory {}: {}", dir.display(), e);
            return Err(GlasserPlotError::MissingParcellationFiles(dir.to_path_buf(), 0));
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().contains(marker))
        .map(|entry| entry.path())
        .collect();
    files.sort_by_key(|path| path.file_name().map(|name| name.to_os_string()));

    match <[PathBuf; 2]>::try_from(files) {
        Ok(pair) => Ok(pair),
        Err(files) => Err(GlasserPlotError::MissingParcellationFiles(dir.to_path_buf(), files.len())),
    }
}


/// Load the parcel labels from an annot file, or from the label array of a GIFTI file (`.gii`, `.gii.gz`).
///
/// In an annot file, the parcel ID of a vertex is the colortable index of its region. A GIFTI label array
/// holds the parcel IDs directly.
pub fn load_parcel_labels<P: AsRef<Path>>(path: P) -> Result<ParcelLabels> {
    if is_gifti_file(&path) {
        let labels = read_gifti(&path)?.vertex_data()?.data.to_i32();
        log::debug!("{}: {} vertex labels", path.as_ref().display(), labels.len());
        return Ok(ParcelLabels::from(labels));
    }

    let annot = read_annot(&path)?;
    log::debug!("{}: {}", path.as_ref().display(), annot);
    Ok(ParcelLabels::from(annot.vertex_colortable_indices()))
}


/// Discover the two parcellation files in `dir` and pick the one of the requested hemisphere.
pub fn hemisphere_parcellation_file(dir: &Path, marker: &str, hemisphere: Hemisphere) -> Result<PathBuf> {
    let [left, right] = find_parcellation_files(dir, marker)?;
    Ok(match hemisphere {
        Hemisphere::Left => left,
        Hemisphere::Right => right,
    })
}
