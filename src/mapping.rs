//! Mapping of per-parcel signals onto the vertices of a parcellated surface.
//!
//! A signal holds one value per parcel, where the value at index `i` belongs to the parcel with ID `i + 1`.
//! Mapping replaces the parcel ID of every vertex with the signal value of its parcel. Vertices whose label
//! is not a parcel ID (the background label `0`, or anything outside `1..=num_parcels`) keep their label as value.

use ndarray::Array1;

use crate::error::{GlasserPlotError, Result};
use crate::parcellation::ParcelLabels;

/// The number of parcels per hemisphere in the Glasser HCP-MMP1 atlas.
pub const GLASSER_PARCELS_PER_HEMISPHERE: usize = 180;

/// One value per mesh vertex.
pub type VertexField = Array1<f32>;


/// Check that a signal has exactly the expected number of values.
pub fn check_signal_length(signal: &[f32], expected: usize) -> Result<()> {
    if signal.len() != expected {
        return Err(GlasserPlotError::DimensionMismatch(expected, signal.len()));
    }
    Ok(())
}


/// Map a per-parcel signal onto the vertices.
///
/// `num_parcels` is the parcel count of the atlas, fixed by the caller and never inferred from the labels.
///
/// # Errors
///
/// `DimensionMismatch` if `signal` does not hold exactly `num_parcels` values.
///
/// # Examples
///
/// ```
/// use glasserplot::{map_signal, ParcelLabels};
/// let labels = ParcelLabels::from(vec![0, 1, 2, 2, 7]);
/// let field = map_signal(&[10.0, 20.0, 30.0], &labels, 3).unwrap();
/// assert_eq!(vec![0.0, 10.0, 20.0, 20.0, 7.0], field.to_vec());
/// ```
pub fn map_signal(signal: &[f32], labels: &ParcelLabels, num_parcels: usize) -> Result<VertexField> {
    check_signal_length(signal, num_parcels)?;

    // table[k] is the value for label k, labels beyond the table are kept as they are.
    let mut table: Vec<f32> = Vec::with_capacity(num_parcels + 1);
    table.push(0.0);
    table.extend_from_slice(signal);

    let mut num_unknown = 0usize;
    let field: VertexField = labels.iter()
        .map(|&label| {
            if label >= 0 && (label as usize) < table.len() {
                table[label as usize]
            } else {
                num_unknown += 1;
                label as f32
            }
        })
        .collect();

    if num_unknown > 0 {
        log::warn!("{} of {} vertices have a label outside 0..={}, keeping their label as value", num_unknown, labels.len(), num_parcels);
    }
    Ok(field)
}


/// Split a signal covering both hemispheres into its left and right halves.
///
/// The first `num_parcels` values belong to the left hemisphere, the remaining ones to the right.
///
/// # Errors
///
/// `DimensionMismatch` if `signal` does not hold exactly `2 * num_parcels` values.
pub fn split_hemispheres(signal: &[f32], num_parcels: usize) -> Result<(&[f32], &[f32])> {
    check_signal_length(signal, 2 * num_parcels)?;
    Ok(signal.split_at(num_parcels))
}


/// Concatenate the fields of the left and right hemisphere, left first, to match a mesh combined with [`crate::combine_meshes`].
pub fn concat_fields(left: &VertexField, right: &VertexField) -> VertexField {
    left.iter()
        .chain(right.iter())
        .copied()
        .collect()
}
