//! Functions for managing FreeSurfer brain surface parcellations in annot files.
//!
//! These files assign each vertex of a brain surface mesh to exactly one brain region
//! or label. A so-called colortable contains data on the regions, including the region's
//! name, an RGB display color, and a unique identifier.

use byteordered::{ByteOrdered};
use byteordered::byteorder::{BigEndian, WriteBytesExt};
use flate2::bufread::GzDecoder;

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path};
use std::fmt;

use crate::util::{is_gz_file, read_fixed_length_string, write_length_prefixed_string};
use crate::error::{GlasserPlotError, Result};


/// The colortable index reported for vertices whose label matches no colortable entry.
pub const UNMATCHED_REGION: i32 = -1;


#[derive(Debug, Clone, PartialEq, Default)]
pub struct FsAnnotColortable {
    pub id: Vec<i32>,  // A region index, not really needed. The 'label' is unique as well and more relevant, see below.
    pub name: Vec<String>,
    pub r: Vec<i32>,
    pub g: Vec<i32>,
    pub b: Vec<i32>,
    pub a: Vec<i32>,
    pub label: Vec<i32>, // A unique label computed from r,g,b. Used in annot.vertex_labels to identify the region.
}

impl FsAnnotColortable {

    /// Read a colortable in format version 2 from a reader. The reader must be at the start position of the colortable.
    pub fn from_reader<S>(input: &mut S) -> Result<FsAnnotColortable>
    where
        S: Read,
    {
        let mut input = ByteOrdered::be(input);

        let num_chars_orig_filename: i32 = input.read_i32()?; // Length of following string.
        let _orig_filename = read_fixed_length_string(&mut input, num_chars_orig_filename as usize)?;
        let num_colortable_entries: i32 = input.read_i32()?; // Yes, it is stored twice. Once here, once before.

        let mut ct = FsAnnotColortable::default();

        for _ in 0..num_colortable_entries {
            let id = input.read_i32()?;
            let num_chars_region_name: i32 = input.read_i32()?; // Length of following string.
            let name = read_fixed_length_string(&mut input, num_chars_region_name as usize)?;
            let r = input.read_i32()?;
            let g = input.read_i32()?;
            let b = input.read_i32()?;
            let a = input.read_i32()?;
            ct.push(id, name, [r, g, b, a]);
        }

        Ok(ct)
    }

    /// Append a region. Its unique label is computed from the color.
    pub fn push(&mut self, id: i32, name: String, rgba: [i32; 4]) {
        let [r, g, b, a] = rgba;
        self.id.push(id);
        self.name.push(name);
        self.r.push(r);
        self.g.push(g);
        self.b.push(b);
        self.a.push(a);
        self.label.push(colortable_label(r, g, b));
    }

    pub fn len(&self) -> usize {
        self.id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }

    fn to_writer<W>(&self, output: &mut W) -> Result<()>
    where
        W: Write,
    {
        write_length_prefixed_string(output, "glasserplot.ctab")?;
        output.write_i32::<BigEndian>(self.len() as i32)?;
        for idx in 0..self.len() {
            output.write_i32::<BigEndian>(self.id[idx])?;
            write_length_prefixed_string(output, &self.name[idx])?;
            for channel in &[self.r[idx], self.g[idx], self.b[idx], self.a[idx]] {
                output.write_i32::<BigEndian>(*channel)?;
            }
        }
        Ok(())
    }
}

/// Compute the unique region label FreeSurfer derives from a region color. The 4th color channel is not part of it.
pub fn colortable_label(r: i32, g: i32, b: i32) -> i32 {
    r + (g << 8) + (b << 16)
}

impl fmt::Display for FsAnnotColortable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Colortable for {} brain regions.", self.id.len())
    }
}


/// Models a FreeSurfer brain surface parcellation from an annot file. This is the result of applying a brain atlas (like the Glasser HCP-MMP1 atlas) to a subject. The `vertex_indices` are the 0-based indices used in FreeSurfer and should be ignored. The `vertex_labels` field contains the mesh vertices in order, and assigns to each vertex a brain region using the `label` field (not the `id` field!) from the `colortable`. The field `colortable` contains an [`FsAnnotColortable`] struct that describes the brain regions.
#[derive(Debug, Clone, PartialEq)]
pub struct FsAnnot {
    pub vertex_indices: Vec<i32>, // 0-based indices, not really needed as all vertices need to be covered in order.
    pub vertex_labels: Vec<i32>,
    pub colortable: FsAnnotColortable,
}

impl FsAnnot {
    /// Read an FsAnnot instance from a file.
    /// If the file's name ends with ".gz", the file is assumed to need GZip decoding.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<FsAnnot> {
        let gz = is_gz_file(&path);
        let file = BufReader::new(File::open(path)?);
        if gz {
            FsAnnot::from_reader(GzDecoder::new(file))
        } else {
            FsAnnot::from_reader(file)
        }
    }

    /// Read an FsAnnot from the given byte stream, which must be at the start of the file.
    pub fn from_reader<S>(mut input: S) -> Result<FsAnnot>
    where
        S: Read,
    {
        let mut file = ByteOrdered::be(&mut input);

        let num_vertices: i32 = file.read_i32()?;

        let mut vertex_indices : Vec<i32> = Vec::with_capacity(num_vertices.max(0) as usize);
        let mut vertex_labels : Vec<i32> = Vec::with_capacity(num_vertices.max(0) as usize);
        for _ in 1..=num_vertices {
            vertex_indices.push(file.read_i32()?);
            vertex_labels.push(file.read_i32()?);
        }

        let has_colortable: i32 = file.read_i32()?;

        if has_colortable != 1 {
            return Err(GlasserPlotError::UnsupportedFsAnnotFormatVersion);
        }

        let num_colortable_entries: i32 = file.read_i32()?;

        if num_colortable_entries == -2 { // If this is negative, the absolute value encodes the file format version. We only support version 2.
            let _num_colortable_entries: i32 = file.read_i32()?;  // For version 2, the next i32 stores the actual number of entries.

            let colortable: FsAnnotColortable = FsAnnotColortable::from_reader(&mut input)?;

            Ok(FsAnnot {
                vertex_indices,
                vertex_labels,
                colortable,
            })
        } else {
            Err(GlasserPlotError::UnsupportedFsAnnotFormatVersion)
        }
    }

    /// Write this annot in colortable format version 2 to the given byte stream.
    pub fn to_writer<W>(&self, output: &mut W) -> Result<()>
    where
        W: Write,
    {
        let mut out = ByteOrdered::be(&mut *output);
        out.write_i32(self.vertex_labels.len() as i32)?;
        for (idx, label) in self.vertex_indices.iter().zip(self.vertex_labels.iter()) {
            out.write_i32(*idx)?;
            out.write_i32(*label)?;
        }
        out.write_i32(1)?;
        out.write_i32(-2)?;
        out.write_i32(self.colortable.len() as i32)?;
        self.colortable.to_writer(output)
    }

    /// Get the number of regions contained in the [`FsAnnot`] struct, or its [`FsAnnotColortable`].
    pub fn num_regions(&self) -> usize {
        self.colortable.len()
    }


    /// Returns the colortable index of the region each vertex belongs to.
    ///
    /// For an atlas whose colortable lists the background region first, followed by the parcels in order,
    /// this is the parcel ID of each vertex. Vertices with a label that does not match any region label
    /// get [`UNMATCHED_REGION`].
    pub fn vertex_colortable_indices(&self) -> Vec<i32> {
        let lookup: HashMap<i32, i32> = self.colortable.label.iter()
            .enumerate()
            .rev() // the first region wins for duplicate labels
            .map(|(region_idx, region_label)| (*region_label, region_idx as i32))
            .collect();

        self.vertex_labels.iter()
            .map(|vlabel| *lookup.get(vlabel).unwrap_or(&UNMATCHED_REGION))
            .collect()
    }
}


impl fmt::Display for FsAnnot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Surface parcellation assigning {} vertices to {} brain regions.", self.vertex_indices.len(), self.num_regions())
    }
}


/// Read a brain parcellation from a FreeSurfer annot file.
///
/// A parcellation assigns each vertex of a brain surface mesh to exactly one brain region.
/// The colortable contains data on the regions, including the region's
/// name, an RGB display color, and a unique identifier.
///
/// # Examples
///
/// ```no_run
/// let annot = glasserplot::read_annot("/path/to/glasser/lh.HCPMMP1.annot").unwrap();
/// println!("Annotation assigns the {} brain mesh vertices to {} different regions.", annot.vertex_indices.len(), annot.num_regions());
/// ```
pub fn read_annot<P: AsRef<Path>>(path: P) -> Result<FsAnnot> {
    FsAnnot::from_file(path)
}


/// Write a brain parcellation to a FreeSurfer annot file (colortable format version 2, never compressed).
pub fn write_annot<P: AsRef<Path>>(path: P, annot: &FsAnnot) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    annot.to_writer(&mut file)?;
    file.flush()?;
    Ok(())
}


#[cfg(test)]
mod test {
    use super::*;

    fn demo_annot() -> FsAnnot {
        let mut colortable = FsAnnotColortable::default();
        colortable.push(0, String::from("???"), [25, 5, 25, 0]);
        colortable.push(1, String::from("L_V1_ROI"), [1, 2, 3, 0]);
        colortable.push(2, String::from("L_MST_ROI"), [4, 5, 6, 0]);
        let labels = &colortable.label;
        FsAnnot {
            vertex_indices: vec![0, 1, 2, 3, 4],
            vertex_labels: vec![labels[1], labels[1], labels[0], labels[2], 12345],
            colortable,
        }
    }

    #[test]
    fn colortable_labels_are_computed_from_the_color() {
        assert_eq!(1639705, colortable_label(25, 5, 25));
    }

    #[test]
    fn the_fourth_color_channel_does_not_change_the_label() {
        let mut colortable = FsAnnotColortable::default();
        colortable.push(0, String::from("???"), [25, 5, 25, 255]);
        colortable.push(1, String::from("L_V1_ROI"), [1, 2, 3, 255]);
        assert_eq!(vec![1639705, colortable_label(1, 2, 3)], colortable.label);

        let annot = FsAnnot {
            vertex_indices: vec![0, 1],
            vertex_labels: vec![colortable_label(1, 2, 3), colortable_label(25, 5, 25)],
            colortable,
        };
        assert_eq!(vec![1, 0], annot.vertex_colortable_indices());
    }

    #[test]
    fn an_annot_can_be_read_back_from_memory() {
        let annot = demo_annot();
        let mut buf: Vec<u8> = Vec::new();
        annot.to_writer(&mut buf).unwrap();

        let read = FsAnnot::from_reader(&buf[..]).unwrap();
        assert_eq!(annot, read);
        assert_eq!(3, read.num_regions());
        assert_eq!(vec!["???", "L_V1_ROI", "L_MST_ROI"], read.colortable.name);
    }

    #[test]
    fn vertex_colortable_indices_mark_unmatched_vertices() {
        let annot = demo_annot();
        assert_eq!(vec![1, 1, 0, 2, UNMATCHED_REGION], annot.vertex_colortable_indices());
    }

    #[test]
    fn annots_without_colortable_are_rejected() {
        let mut buf: Vec<u8> = Vec::new();
        {
            let mut out = ByteOrdered::be(&mut buf);
            out.write_i32(1).unwrap();
            out.write_i32(0).unwrap();
            out.write_i32(7).unwrap();
            out.write_i32(0).unwrap();
        }
        assert!(matches!(FsAnnot::from_reader(&buf[..]), Err(GlasserPlotError::UnsupportedFsAnnotFormatVersion)));
    }
}
