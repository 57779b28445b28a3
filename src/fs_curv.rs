// Functions for managing FreeSurfer per-vertex data in binary 'curv' files.
// These files store 1 scalar value (typically a morphological descriptor, like sulcal depth at that point)
// for each vertex of the respective brain surface mesh.


use byteordered::{ByteOrdered};
use flate2::bufread::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path};

use crate::gifti::read_gifti;
use crate::util::{is_gifti_file, is_gz_file};
use crate::error::{GlasserPlotError, Result};

pub const CURV_MAGIC: [u8; 3] = [255; 3];


#[derive(Debug, Clone, PartialEq)]
pub struct CurvHeader {
    pub curv_magic: [u8; 3],
    pub num_vertices: i32,
    pub num_faces: i32,
    pub num_values_per_vertex: i32,
}


impl Default for CurvHeader {
    fn default() -> CurvHeader {
        CurvHeader {
            curv_magic: CURV_MAGIC,
            num_vertices: 0,
            num_faces: 0,
            num_values_per_vertex: 1,
        }
    }
}

impl CurvHeader {

    /// Read a Curv header from the given byte stream.
    /// It is assumed that the input is currently at the start of the
    /// Curv header.
    pub fn from_reader<S>(input: &mut S) -> Result<CurvHeader>
    where
        S: Read,
    {
        let mut hdr = CurvHeader::default();

        let mut input = ByteOrdered::be(input);

        for v in &mut hdr.curv_magic {
            *v = input.read_u8()?;
        }
        if hdr.curv_magic != CURV_MAGIC {
            return Err(GlasserPlotError::InvalidCurvFormat);
        }

        hdr.num_vertices = input.read_i32()?;
        hdr.num_faces = input.read_i32()?;
        hdr.num_values_per_vertex = input.read_i32()?;

        if hdr.num_vertices < 0 || hdr.num_values_per_vertex != 1 {
            return Err(GlasserPlotError::InvalidCurvFormat);
        }
        Ok(hdr)
    }
}


/// Per-vertex data read from a FreeSurfer curv file.
#[derive(Debug, Clone, PartialEq)]
pub struct FsCurv {
    pub header: CurvHeader,
    pub data: Vec<f32>,
}


impl FsCurv {
    /// Read a Curv file.
    /// If the file's name ends with ".gz", the file is assumed to need GZip decoding. This is not typically the case
    /// for FreeSurfer Curv files, but very handy (and it helps us to reduce the size of our test data).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<FsCurv> {
        let gz = is_gz_file(&path);
        let file = BufReader::new(File::open(path)?);
        if gz {
            FsCurv::from_reader(GzDecoder::new(file))
        } else {
            FsCurv::from_reader(file)
        }
    }

    /// Read a Curv file from the given byte stream, which must be at the start of the header.
    pub fn from_reader<S>(mut input: S) -> Result<FsCurv>
    where
        S: Read,
    {
        let hdr = CurvHeader::from_reader(&mut input)?;

        let mut input = ByteOrdered::be(input);
        let mut data: Vec<f32> = Vec::with_capacity(hdr.num_vertices as usize);
        for _ in 1..=hdr.num_vertices {
            data.push(input.read_f32()?);
        }

        Ok(FsCurv { header: hdr, data })
    }

    /// Write this curv data to the given byte stream.
    pub fn to_writer<W>(&self, output: &mut W) -> Result<()>
    where
        W: Write,
    {
        let mut output = ByteOrdered::be(output);
        for b in &CURV_MAGIC {
            output.write_u8(*b)?;
        }
        output.write_i32(self.data.len() as i32)?;
        output.write_i32(self.header.num_faces)?;
        output.write_i32(1)?;
        for v in &self.data {
            output.write_f32(*v)?;
        }
        Ok(())
    }
}


/// Read per-vertex data from a FreeSurfer curv file, like `lh.sulc`.
///
/// # Examples
///
/// ```no_run
/// let sulc = glasserplot::read_curv("/path/to/fsaverage/lh.sulc").unwrap();
/// println!("Loaded {} sulcal depth values.", sulc.data.len());
/// ```
pub fn read_curv<P: AsRef<Path>>(path: P) -> Result<FsCurv> {
    FsCurv::from_file(path)
}


/// Read one value per vertex from a GIFTI file (`.gii`, `.gii.gz`) or, for any other name, from a curv file.
pub fn read_vertex_data<P: AsRef<Path>>(path: P) -> Result<Vec<f32>> {
    if is_gifti_file(&path) {
        Ok(read_gifti(path)?.vertex_data()?.data.to_f32())
    } else {
        Ok(read_curv(path)?.data)
    }
}


/// Write per-vertex data to a FreeSurfer curv file. If the file's name ends with ".gz", the output is GZip-compressed.
///
/// The `num_faces` field of the header is informational only and is written as given.
pub fn write_curv<P: AsRef<Path>>(path: P, data: &[f32], num_faces: i32) -> Result<()> {
    let curv = FsCurv {
        header: CurvHeader { num_vertices: data.len() as i32, num_faces, ..CurvHeader::default() },
        data: data.to_vec(),
    };

    let gz = is_gz_file(&path);
    let file = BufWriter::new(File::create(path)?);
    if gz {
        let mut encoder = GzEncoder::new(file, Compression::default());
        curv.to_writer(&mut encoder)?;
        encoder.finish()?.flush()?;
    } else {
        let mut file = file;
        curv.to_writer(&mut file)?;
        file.flush()?;
    }
    Ok(())
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn curv_data_can_be_read_back_from_memory() {
        let curv = FsCurv {
            header: CurvHeader { num_vertices: 3, num_faces: 1, ..CurvHeader::default() },
            data: vec![-1.5, 0.0, 2.25],
        };
        let mut buf: Vec<u8> = Vec::new();
        curv.to_writer(&mut buf).unwrap();
        assert_eq!(3 + 12 + 12, buf.len());

        let read = FsCurv::from_reader(&buf[..]).unwrap();
        assert_eq!(curv, read);
    }

    #[test]
    fn the_old_curv_format_is_rejected() {
        let buf: Vec<u8> = vec![0, 0, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(matches!(FsCurv::from_reader(&buf[..]), Err(GlasserPlotError::InvalidCurvFormat)));
    }

    #[test]
    fn truncated_curv_data_is_an_io_error() {
        let curv = FsCurv {
            header: CurvHeader { num_vertices: 2, num_faces: 0, ..CurvHeader::default() },
            data: vec![1.0, 2.0],
        };
        let mut buf: Vec<u8> = Vec::new();
        curv.to_writer(&mut buf).unwrap();
        buf.truncate(buf.len() - 2);
        assert!(matches!(FsCurv::from_reader(&buf[..]), Err(GlasserPlotError::Io(_))));
    }
}
