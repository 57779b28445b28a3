//! A tiny synthetic atlas: one flat 12 x 15 vertex grid per hemisphere, one parcel per vertex.
#![allow(dead_code)]

use std::fs;
use std::path::Path;

use glasserplot::{
    write_annot, write_curv, write_gifti, write_surf, AtlasLayout, BrainMesh, FsAnnot, FsAnnotColortable, GiftiImage,
    GLASSER_PARCELS_PER_HEMISPHERE,
};

pub const GRID_ROWS: usize = 12;
pub const GRID_COLS: usize = 15;

/// A grid in the y-z plane at `x`, with a bump in the middle.
pub fn grid_mesh(x: f32) -> BrainMesh {
    let mut vertices = Vec::with_capacity(GRID_ROWS * GRID_COLS * 3);
    for row in 0..GRID_ROWS {
        for col in 0..GRID_COLS {
            let bump = if (3..9).contains(&row) && (4..11).contains(&col) { x.signum() * 2.0 } else { 0.0 };
            vertices.extend_from_slice(&[x + bump, col as f32 * 4.0, row as f32 * 4.0]);
        }
    }

    let mut faces = Vec::new();
    for row in 0..GRID_ROWS - 1 {
        for col in 0..GRID_COLS - 1 {
            let v = (row * GRID_COLS + col) as i32;
            let below = v + GRID_COLS as i32;
            faces.extend_from_slice(&[v, v + 1, below + 1, v, below + 1, below]);
        }
    }
    BrainMesh { vertices, faces }
}

/// A parcellation in which vertex `i` belongs to parcel `i + 1`, with a background region at index 0.
pub fn one_parcel_per_vertex(prefix: &str) -> FsAnnot {
    let mut colortable = FsAnnotColortable::default();
    colortable.push(0, String::from("???"), [25, 5, 25, 0]);
    for parcel in 1..=GLASSER_PARCELS_PER_HEMISPHERE as i32 {
        colortable.push(parcel, format!("{}_P{}_ROI", prefix, parcel), [parcel, 10, 20, 0]);
    }
    let num_vertices = GRID_ROWS * GRID_COLS;
    FsAnnot {
        vertex_indices: (0..num_vertices as i32).collect(),
        vertex_labels: (0..num_vertices).map(|v| colortable.label[v + 1]).collect(),
        colortable,
    }
}

fn grid_sulc(mesh: &BrainMesh) -> Vec<f32> {
    (0..mesh.num_vertices()).map(|v| ((v % GRID_COLS) as f32 - 7.0) / 7.0).collect()
}

fn write_parcellations(parc_dir: &Path) {
    fs::create_dir_all(parc_dir).unwrap();
    for prefix in &["lh", "rh"] {
        let annot = one_parcel_per_vertex(&prefix[..1].to_uppercase());
        write_annot(parc_dir.join(format!("{}.HCPMMP1.annot", prefix)), &annot).unwrap();
    }
}

/// Write the default atlas layout below `dir`: GIFTI surfaces and sulcal depth in `fsaverage/`
/// (`pial_left.gii`, `sulc_right.gii`, ...), parcellations in `glasser/`.
pub fn write_atlas(dir: &Path) {
    let surf_dir = dir.join("fsaverage");
    fs::create_dir_all(&surf_dir).unwrap();

    for (side, x) in &[("left", -10.0f32), ("right", 10.0f32)] {
        let mesh = grid_mesh(*x);
        write_gifti(surf_dir.join(format!("pial_{}.gii", side)), &GiftiImage::from_mesh(&mesh)).unwrap();
        write_gifti(surf_dir.join(format!("inflated_{}.gii", side)), &GiftiImage::from_mesh(&mesh)).unwrap();
        write_gifti(surf_dir.join(format!("sulc_{}.gii", side)), &GiftiImage::from_scalars(&grid_sulc(&mesh))).unwrap();
    }
    write_parcellations(&dir.join("glasser"));
}

/// The layout of an atlas written by [`write_freesurfer_atlas`].
pub fn freesurfer_layout() -> AtlasLayout {
    AtlasLayout {
        pial_file: String::from("{hemi}.pial"),
        inflated_file: String::from("{hemi}.inflated.gz"),
        sulc_file: String::from("{hemi}.sulc"),
        ..AtlasLayout::default()
    }
}

/// Write the atlas with FreeSurfer binary surfaces (`lh.pial`, `rh.inflated.gz`, `lh.sulc`, ...).
pub fn write_freesurfer_atlas(dir: &Path) {
    let surf_dir = dir.join("fsaverage");
    fs::create_dir_all(&surf_dir).unwrap();

    for (prefix, x) in &[("lh", -10.0f32), ("rh", 10.0f32)] {
        let mesh = grid_mesh(*x);
        write_surf(surf_dir.join(format!("{}.pial", prefix)), &mesh).unwrap();
        write_surf(surf_dir.join(format!("{}.inflated.gz", prefix)), &mesh).unwrap();
        write_curv(surf_dir.join(format!("{}.sulc", prefix)), &grid_sulc(&mesh), mesh.num_faces() as i32).unwrap();
    }
    write_parcellations(&dir.join("glasser"));
}
