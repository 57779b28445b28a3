use glasserplot::{combine_meshes, concat_fields, map_signal, split_hemispheres, BrainMesh, GlasserPlotError, ParcelLabels, GLASSER_PARCELS_PER_HEMISPHERE};

const P: usize = GLASSER_PARCELS_PER_HEMISPHERE;

fn labels_with_background(num_vertices: usize) -> ParcelLabels {
    // every 7th vertex is background, the others cycle through all parcels
    ParcelLabels::from((0..num_vertices).map(|v| if v % 7 == 0 { 0 } else { (v % P) as i32 + 1 }).collect::<Vec<i32>>())
}

#[test]
fn every_vertex_gets_the_value_of_its_parcel() {
    let labels = labels_with_background(1000);
    let signal: Vec<f32> = (0..P).map(|i| (i as f32) * 0.5 - 40.0).collect();
    let field = map_signal(&signal, &labels, P).unwrap();

    assert_eq!(labels.len(), field.len());
    for (label, value) in labels.iter().zip(field.iter()) {
        if *label == 0 {
            assert_eq!(0.0, *value);
        } else {
            assert_eq!(signal[*label as usize - 1], *value);
        }
    }
}

#[test]
fn the_identity_signal_reproduces_the_labels() {
    let labels = labels_with_background(500);
    let signal: Vec<f32> = (1..=P).map(|k| k as f32).collect();
    let field = map_signal(&signal, &labels, P).unwrap();

    let expected: Vec<f32> = labels.iter().map(|&l| l as f32).collect();
    assert_eq!(expected, field.to_vec());
}

#[test]
fn the_signal_must_have_one_value_per_parcel() {
    let labels = labels_with_background(10);
    for len in &[0usize, 179, 181, 360] {
        let signal = vec![1.0f32; *len];
        match map_signal(&signal, &labels, P) {
            Err(GlasserPlotError::DimensionMismatch(expected, actual)) => {
                assert_eq!(P, expected);
                assert_eq!(*len, actual);
            }
            other => panic!("expected DimensionMismatch for length {}, got {:?}", len, other),
        }
    }
}

#[test]
fn mapping_the_halves_matches_one_pass_over_both_hemispheres() {
    let signal: Vec<f32> = (0..2 * P).map(|i| (i as f32).sin() * 10.0).collect();
    let left_labels = labels_with_background(300);
    let right_labels = labels_with_background(250);

    let (left, right) = split_hemispheres(&signal, P).unwrap();
    let per_hemisphere = concat_fields(&map_signal(left, &left_labels, P).unwrap(), &map_signal(right, &right_labels, P).unwrap());

    // One label array for both hemispheres: the right parcels become P+1..=2P, background stays 0.
    let both_labels: Vec<i32> = left_labels.iter()
        .copied()
        .chain(right_labels.iter().map(|&l| if l == 0 { 0 } else { l + P as i32 }))
        .collect();
    let single_pass = map_signal(&signal, &ParcelLabels::from(both_labels), 2 * P).unwrap();

    assert_eq!(550, per_hemisphere.len());
    assert_eq!(single_pass.to_vec(), per_hemisphere.to_vec());
}

#[test]
fn combined_meshes_keep_the_right_faces_on_the_right_vertices() {
    let left = BrainMesh { vertices: vec![0.0; 3 * 4], faces: vec![0, 1, 2, 1, 2, 3] };
    let right = BrainMesh { vertices: vec![1.0; 3 * 3], faces: vec![0, 1, 2] };
    let both = combine_meshes(&left, &right);

    assert_eq!(7, both.num_vertices());
    assert_eq!(3, both.num_faces());
    assert_eq!(vec![0, 1, 2, 1, 2, 3, 4, 5, 6], both.faces);
    assert_eq!([1.0, 1.0, 1.0], both.vertex(4));
    assert!(both.validate().is_ok());
}
