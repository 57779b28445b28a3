mod common;

use std::fs;

use glasserplot::{
    plot_both_hemispheres_3d, plot_hemisphere_2d, plot_hemisphere_3d, GlasserPlotError, Hemisphere, Plot2dOptions,
    Plot3dOptions, PlotConfig, SurfaceKind, View, OUTPUT_2D_FILE, OUTPUT_3D_FILE,
};
use tempfile::tempdir;

fn ramp(len: usize) -> Vec<f32> {
    (1..=len).map(|v| v as f32).collect()
}

fn test_config(atlas: &std::path::Path, out: &std::path::Path) -> PlotConfig {
    PlotConfig { open_viewer: false, image_width: 240, image_height: 160, ..PlotConfig::new(atlas, out) }
}

#[test]
fn the_2d_plot_is_a_png_of_the_configured_size() {
    let atlas = tempdir().unwrap();
    common::write_atlas(atlas.path());
    let out = tempdir().unwrap();
    let config = test_config(atlas.path(), &out.path().join("plots"));

    let path = plot_hemisphere_2d(&ramp(180), &config, &Plot2dOptions::default()).unwrap();
    assert_eq!(out.path().join("plots").join(OUTPUT_2D_FILE), path);

    let image = image::open(&path).unwrap().to_rgb8();
    assert_eq!((240, 160), image.dimensions());
    assert_eq!(&image::Rgb([255, 255, 255]), image.get_pixel(0, 0));
    // the middle of the surface, left of the colorbar
    assert_ne!(&image::Rgb([255, 255, 255]), image.get_pixel(80, 80));
}

#[test]
fn the_2d_plot_works_for_every_view_and_hemisphere() {
    let atlas = tempdir().unwrap();
    common::write_atlas(atlas.path());
    let out = tempdir().unwrap();
    let config = test_config(atlas.path(), out.path());

    for view in &[View::Lateral, View::Medial, View::Dorsal, View::Ventral, View::Anterior, View::Posterior] {
        for hemisphere in &[Hemisphere::Left, Hemisphere::Right] {
            let options = Plot2dOptions { view: *view, hemisphere: *hemisphere, dark_background: true, surface: SurfaceKind::Inflated, ..Plot2dOptions::default() };
            let path = plot_hemisphere_2d(&ramp(180), &config, &options).unwrap();
            assert!(path.is_file());
        }
    }
}

#[test]
fn a_wrong_signal_length_writes_nothing() {
    let atlas = tempdir().unwrap();
    common::write_atlas(atlas.path());
    let out = tempdir().unwrap();
    let config = test_config(atlas.path(), out.path());

    let err = plot_hemisphere_2d(&ramp(179), &config, &Plot2dOptions::default()).unwrap_err();
    assert!(matches!(err, GlasserPlotError::DimensionMismatch(180, 179)));
    let err = plot_both_hemispheres_3d(&ramp(359), &config, &Plot3dOptions::default()).unwrap_err();
    assert!(matches!(err, GlasserPlotError::DimensionMismatch(360, 359)));
    let err = plot_hemisphere_3d(&ramp(360), &config, &Plot3dOptions::default()).unwrap_err();
    assert!(matches!(err, GlasserPlotError::DimensionMismatch(180, 360)));

    assert!(!out.path().join(OUTPUT_2D_FILE).exists());
    assert!(!out.path().join(OUTPUT_3D_FILE).exists());
}

#[test]
fn an_unknown_view_is_rejected() {
    assert!(matches!(Plot2dOptions::parse("sagittal", "left", "jet"), Err(GlasserPlotError::InvalidView(_))));
}

#[test]
fn missing_parcellation_files_are_reported() {
    let atlas = tempdir().unwrap();
    common::write_atlas(atlas.path());
    fs::remove_file(atlas.path().join("glasser").join("rh.HCPMMP1.annot")).unwrap();
    let out = tempdir().unwrap();
    let config = test_config(atlas.path(), out.path());

    let err = plot_hemisphere_2d(&ramp(180), &config, &Plot2dOptions::default()).unwrap_err();
    assert!(matches!(err, GlasserPlotError::MissingParcellationFiles(_, 1)));
    let err = plot_both_hemispheres_3d(&ramp(360), &config, &Plot3dOptions::default()).unwrap_err();
    assert!(matches!(err, GlasserPlotError::MissingParcellationFiles(_, 1)));
    assert!(!out.path().join(OUTPUT_3D_FILE).exists());
}

#[test]
fn a_sulc_file_of_the_wrong_length_is_rejected() {
    let atlas = tempdir().unwrap();
    common::write_atlas(atlas.path());
    let short = glasserplot::GiftiImage::from_scalars(&[0.0; 10]);
    glasserplot::write_gifti(atlas.path().join("fsaverage").join("sulc_left.gii"), &short).unwrap();
    let out = tempdir().unwrap();
    let config = test_config(atlas.path(), out.path());

    let err = plot_hemisphere_2d(&ramp(180), &config, &Plot2dOptions::default()).unwrap_err();
    assert!(matches!(err, GlasserPlotError::MeshDataMismatch("sulcal depth", 180, 10)));
    assert!(!out.path().join(OUTPUT_2D_FILE).exists());
}

#[test]
fn an_atlas_of_freesurfer_binary_files_can_be_plotted() {
    let atlas = tempdir().unwrap();
    common::write_freesurfer_atlas(atlas.path());
    let out = tempdir().unwrap();
    let config = PlotConfig { layout: common::freesurfer_layout(), ..test_config(atlas.path(), out.path()) };

    let path = plot_hemisphere_2d(&ramp(180), &config, &Plot2dOptions::default()).unwrap();
    assert!(path.is_file());

    let options = Plot3dOptions { surface: SurfaceKind::Inflated, ..Plot3dOptions::default() };
    let page = fs::read_to_string(plot_both_hemispheres_3d(&ramp(360), &config, &options).unwrap()).unwrap();
    assert!(page.contains("\"x\":[-10.0,"));

    // the default layout looks for GIFTI files that this atlas does not have
    let err = plot_hemisphere_2d(&ramp(180), &test_config(atlas.path(), out.path()), &Plot2dOptions::default()).unwrap_err();
    assert!(matches!(err, GlasserPlotError::Io(_)));
}

#[test]
fn the_3d_plot_of_both_hemispheres_holds_both_meshes() {
    let atlas = tempdir().unwrap();
    common::write_atlas(atlas.path());
    let out = tempdir().unwrap();
    let config = test_config(atlas.path(), out.path());

    let options = Plot3dOptions { symmetric_colormap: true, ..Plot3dOptions::default() };
    let path = plot_both_hemispheres_3d(&ramp(360), &config, &options).unwrap();
    assert_eq!(out.path().join(OUTPUT_3D_FILE), path);

    let page = fs::read_to_string(&path).unwrap();
    assert!(page.contains("\"type\":\"mesh3d\""));
    assert!(page.contains("\"x\":[-10.0,"));
    assert!(page.contains(",10.0,"));
    // the right faces are offset behind the 180 left vertices
    assert!(page.contains(",180,"));
    assert!(page.contains("\"cmin\":-360.0"));
    assert!(page.contains("\"cmax\":360.0"));
}

#[test]
fn the_3d_plot_of_one_hemisphere_holds_one_mesh() {
    let atlas = tempdir().unwrap();
    common::write_atlas(atlas.path());
    let out = tempdir().unwrap();
    let config = test_config(atlas.path(), out.path());

    let options = Plot3dOptions { hemisphere: Hemisphere::Right, colorbar: false, ..Plot3dOptions::default() };
    let path = plot_hemisphere_3d(&ramp(180), &config, &options).unwrap();

    let page = fs::read_to_string(&path).unwrap();
    assert!(page.contains("<title>right hemisphere</title>"));
    assert!(page.contains("\"x\":[10.0,"));
    assert!(!page.contains("-10.0"));
    assert!(!page.contains("scatter3d"));
}
