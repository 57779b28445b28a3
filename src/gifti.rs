//! Reading and writing of GIFTI surface files (`.gii`): meshes, per-vertex scalars and label arrays.
//!
//! Supported are the `ASCII`, `Base64Binary` and `GZipBase64Binary` encodings with the data types
//! `NIFTI_TYPE_UINT8`, `NIFTI_TYPE_INT32` and `NIFTI_TYPE_FLOAT32`, in both byte orders and both indexing orders.
//! Written files always use `GZipBase64Binary`, little endian, row major.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use byteordered::{ByteOrdered, Endianness};
use flate2::bufread::GzDecoder;
use flate2::read::ZlibDecoder;
use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use ndarray::{Array2, ShapeBuilder};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{GlasserPlotError, Result};
use crate::fs_surface::BrainMesh;
use crate::util::is_gz_file;

pub const INTENT_POINTSET: &str = "NIFTI_INTENT_POINTSET";
pub const INTENT_TRIANGLE: &str = "NIFTI_INTENT_TRIANGLE";
pub const INTENT_SHAPE: &str = "NIFTI_INTENT_SHAPE";
pub const INTENT_LABEL: &str = "NIFTI_INTENT_LABEL";

const TYPE_UINT8: &str = "NIFTI_TYPE_UINT8";
const TYPE_INT32: &str = "NIFTI_TYPE_INT32";
const TYPE_FLOAT32: &str = "NIFTI_TYPE_FLOAT32";


/// The values of a data array, in row major order.
#[derive(Debug, Clone, PartialEq)]
pub enum GiftiData {
    UInt8(Vec<u8>),
    Int32(Vec<i32>),
    Float32(Vec<f32>),
}

impl GiftiData {
    pub fn len(&self) -> usize {
        match self {
            GiftiData::UInt8(v) => v.len(),
            GiftiData::Int32(v) => v.len(),
            GiftiData::Float32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_f32(&self) -> Vec<f32> {
        match self {
            GiftiData::UInt8(v) => v.iter().map(|&x| x as f32).collect(),
            GiftiData::Int32(v) => v.iter().map(|&x| x as f32).collect(),
            GiftiData::Float32(v) => v.clone(),
        }
    }

    /// The values as integers. Floats are rounded.
    pub fn to_i32(&self) -> Vec<i32> {
        match self {
            GiftiData::UInt8(v) => v.iter().map(|&x| x as i32).collect(),
            GiftiData::Int32(v) => v.clone(),
            GiftiData::Float32(v) => v.iter().map(|&x| x.round() as i32).collect(),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            GiftiData::UInt8(_) => TYPE_UINT8,
            GiftiData::Int32(_) => TYPE_INT32,
            GiftiData::Float32(_) => TYPE_FLOAT32,
        }
    }
}


#[derive(Debug, Clone, PartialEq)]
pub struct GiftiDataArray {
    pub intent: String,
    pub dims: Vec<usize>,
    pub data: GiftiData,
}


/// The data arrays of a GIFTI file. Metadata and label tables are not kept.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GiftiImage {
    pub data_arrays: Vec<GiftiDataArray>,
}

impl GiftiImage {
    /// Read a GIFTI file. If the file's name ends with ".gz", the file is assumed to need GZip decoding.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<GiftiImage> {
        let gz = is_gz_file(&path);
        let file = BufReader::new(File::open(path)?);
        if gz {
            GiftiImage::from_reader(GzDecoder::new(file))
        } else {
            GiftiImage::from_reader(file)
        }
    }

    pub fn from_reader<S>(mut input: S) -> Result<GiftiImage>
    where
        S: Read,
    {
        let mut xml = String::new();
        input.read_to_string(&mut xml)?;
        GiftiImage::parse(&xml)
    }

    /// Parse a GIFTI XML document.
    pub fn parse(xml: &str) -> Result<GiftiImage> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut found_root = false;
        let mut data_arrays = Vec::new();
        let mut pending: Option<PendingArray> = None;
        let mut in_data = false;

        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"GIFTI" => found_root = true,
                    b"DataArray" => pending = Some(PendingArray::from_attributes(&e)?),
                    b"Data" => in_data = pending.is_some(),
                    _ => {}
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"GIFTI" => found_root = true,
                    b"DataArray" => data_arrays.push(PendingArray::from_attributes(&e)?.decode()?),
                    _ => {}
                },
                Event::Text(t) if in_data => {
                    if let Some(array) = pending.as_mut() {
                        array.text.push_str(&t.unescape()?);
                    }
                }
                Event::End(e) => match e.name().as_ref() {
                    b"Data" => in_data = false,
                    b"DataArray" => {
                        if let Some(array) = pending.take() {
                            data_arrays.push(array.decode()?);
                        }
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        if !found_root {
            return Err(GlasserPlotError::InvalidGiftiFormat(String::from("no GIFTI root element")));
        }
        Ok(GiftiImage { data_arrays })
    }

    /// A GIFTI image holding the vertex coordinates and faces of a mesh.
    pub fn from_mesh(mesh: &BrainMesh) -> GiftiImage {
        GiftiImage {
            data_arrays: vec![
                GiftiDataArray { intent: INTENT_POINTSET.to_string(), dims: vec![mesh.num_vertices(), 3], data: GiftiData::Float32(mesh.vertices.clone()) },
                GiftiDataArray { intent: INTENT_TRIANGLE.to_string(), dims: vec![mesh.num_faces(), 3], data: GiftiData::Int32(mesh.faces.clone()) },
            ],
        }
    }

    /// A GIFTI image holding one scalar per vertex, like sulcal depth.
    pub fn from_scalars(values: &[f32]) -> GiftiImage {
        GiftiImage {
            data_arrays: vec![GiftiDataArray { intent: INTENT_SHAPE.to_string(), dims: vec![values.len()], data: GiftiData::Float32(values.to_vec()) }],
        }
    }

    /// A GIFTI image holding one label per vertex.
    pub fn from_labels(labels: &[i32]) -> GiftiImage {
        GiftiImage {
            data_arrays: vec![GiftiDataArray { intent: INTENT_LABEL.to_string(), dims: vec![labels.len()], data: GiftiData::Int32(labels.to_vec()) }],
        }
    }

    pub fn array_with_intent(&self, intent: &str) -> Option<&GiftiDataArray> {
        self.data_arrays.iter().find(|array| array.intent == intent)
    }

    /// The mesh stored in the pointset and triangle arrays.
    pub fn mesh(&self) -> Result<BrainMesh> {
        let points = self.array_with_intent(INTENT_POINTSET)
            .ok_or_else(|| GlasserPlotError::InvalidGiftiFormat(String::from("no pointset array")))?;
        let triangles = self.array_with_intent(INTENT_TRIANGLE)
            .ok_or_else(|| GlasserPlotError::InvalidGiftiFormat(String::from("no triangle array")))?;
        for array in &[points, triangles] {
            if array.dims.len() != 2 || array.dims[1] != 3 {
                return Err(GlasserPlotError::InvalidGiftiFormat(format!("{} array has shape {:?}, expected [n, 3]", array.intent, array.dims)));
            }
        }

        let mesh = BrainMesh { vertices: points.data.to_f32(), faces: triangles.data.to_i32() };
        mesh.validate()?;
        Ok(mesh)
    }

    /// The first array that is not part of a mesh: the per-vertex values of a scalar or label file.
    pub fn vertex_data(&self) -> Result<&GiftiDataArray> {
        self.data_arrays.iter()
            .find(|array| array.intent != INTENT_POINTSET && array.intent != INTENT_TRIANGLE)
            .ok_or_else(|| GlasserPlotError::InvalidGiftiFormat(String::from("no per-vertex data array")))
    }

    /// Write the image as XML, every array encoded as `GZipBase64Binary`.
    pub fn to_writer<W>(&self, output: W) -> Result<()>
    where
        W: Write,
    {
        let mut writer = Writer::new_with_indent(output, b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let num_arrays = self.data_arrays.len().to_string();
        writer.write_event(Event::Start(BytesStart::new("GIFTI").with_attributes([("Version", "1.0"), ("NumberOfDataArrays", num_arrays.as_str())])))?;

        for array in &self.data_arrays {
            let dimensionality = array.dims.len().to_string();
            let mut start = BytesStart::new("DataArray").with_attributes([
                ("Intent", array.intent.as_str()),
                ("DataType", array.data.type_name()),
                ("ArrayIndexingOrder", "RowMajorOrder"),
                ("Dimensionality", dimensionality.as_str()),
            ]);
            for (idx, dim) in array.dims.iter().enumerate() {
                start.push_attribute((format!("Dim{}", idx).as_str(), dim.to_string().as_str()));
            }
            start.extend_attributes([("Encoding", "GZipBase64Binary"), ("Endian", "LittleEndian"), ("ExternalFileName", ""), ("ExternalFileOffset", "")]);

            writer.write_event(Event::Start(start))?;
            writer.write_event(Event::Start(BytesStart::new("Data")))?;
            writer.write_event(Event::Text(BytesText::new(&encode_data(&array.data)?)))?;
            writer.write_event(Event::End(BytesEnd::new("Data")))?;
            writer.write_event(Event::End(BytesEnd::new("DataArray")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("GIFTI")))?;
        Ok(())
    }
}


/// The attributes and raw text of a data array that is being parsed.
#[derive(Debug, Default)]
struct PendingArray {
    intent: String,
    data_type: String,
    encoding: String,
    big_endian: bool,
    column_major: bool,
    dimensionality: Option<usize>,
    dims: BTreeMap<usize, usize>,
    text: String,
}

impl PendingArray {
    fn from_attributes(start: &BytesStart<'_>) -> Result<PendingArray> {
        let mut array = PendingArray::default();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let value = attr.unescape_value()?.into_owned();
            match attr.key.as_ref() {
                b"Intent" => array.intent = value,
                b"DataType" => array.data_type = value,
                b"Encoding" => array.encoding = value,
                b"Endian" => array.big_endian = value == "BigEndian",
                b"ArrayIndexingOrder" => array.column_major = value == "ColumnMajorOrder",
                b"Dimensionality" => array.dimensionality = Some(parse_number(&value)?),
                key if key.starts_with(b"Dim") => {
                    if let Some(idx) = std::str::from_utf8(&key[3..]).ok().and_then(|s| s.parse::<usize>().ok()) {
                        array.dims.insert(idx, parse_number(&value)?);
                    }
                }
                _ => {}
            }
        }
        Ok(array)
    }

    fn decode(self) -> Result<GiftiDataArray> {
        let dims: Vec<usize> = self.dims.values().copied().collect();
        if self.dimensionality.map_or(false, |d| d != dims.len()) || self.dims.keys().enumerate().any(|(pos, idx)| pos != *idx) {
            return Err(GlasserPlotError::InvalidGiftiFormat(format!("inconsistent dimensions in {} array", self.intent)));
        }
        let count: usize = dims.iter().product();

        let data = match self.encoding.as_str() {
            "ASCII" => parse_ascii(&self.data_type, &self.text, count)?,
            "Base64Binary" => {
                let bytes = decode_base64(&self.text)?;
                parse_binary(&self.data_type, &bytes, self.endianness(), count)?
            }
            "GZipBase64Binary" => {
                let compressed = decode_base64(&self.text)?;
                let mut bytes = Vec::new();
                ZlibDecoder::new(&compressed[..]).read_to_end(&mut bytes)?;
                parse_binary(&self.data_type, &bytes, self.endianness(), count)?
            }
            other => return Err(GlasserPlotError::InvalidGiftiFormat(format!("unsupported encoding '{}'", other))),
        };

        let data = if self.column_major && dims.len() == 2 { to_row_major(data, dims[0], dims[1])? } else { data };
        Ok(GiftiDataArray { intent: self.intent, dims, data })
    }

    fn endianness(&self) -> Endianness {
        if self.big_endian { Endianness::Big } else { Endianness::Little }
    }
}

fn parse_number(value: &str) -> Result<usize> {
    value.trim().parse().map_err(|_| GlasserPlotError::InvalidGiftiFormat(format!("'{}' is not a dimension", value)))
}

fn decode_base64(text: &str) -> Result<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(BASE64.decode(compact)?)
}

fn parse_ascii(data_type: &str, text: &str, count: usize) -> Result<GiftiData> {
    fn parse_all<T: std::str::FromStr>(text: &str) -> Result<Vec<T>> {
        text.split_whitespace()
            .map(|token| token.parse().map_err(|_| GlasserPlotError::InvalidGiftiFormat(format!("'{}' is not a number", token))))
            .collect()
    }

    let data = match data_type {
        TYPE_UINT8 => GiftiData::UInt8(parse_all(text)?),
        TYPE_INT32 => GiftiData::Int32(parse_all(text)?),
        TYPE_FLOAT32 => GiftiData::Float32(parse_all(text)?),
        other => return Err(GlasserPlotError::InvalidGiftiFormat(format!("unsupported data type '{}'", other))),
    };
    if data.len() != count {
        return Err(GlasserPlotError::MeshDataMismatch("GIFTI ASCII values", count, data.len()));
    }
    Ok(data)
}

fn parse_binary(data_type: &str, bytes: &[u8], endianness: Endianness, count: usize) -> Result<GiftiData> {
    let value_size = match data_type {
        TYPE_UINT8 => 1,
        TYPE_INT32 | TYPE_FLOAT32 => 4,
        other => return Err(GlasserPlotError::InvalidGiftiFormat(format!("unsupported data type '{}'", other))),
    };
    if bytes.len() != count * value_size {
        return Err(GlasserPlotError::MeshDataMismatch("GIFTI data bytes", count * value_size, bytes.len()));
    }

    let mut input = ByteOrdered::runtime(bytes, endianness);
    Ok(match data_type {
        TYPE_UINT8 => GiftiData::UInt8(bytes.to_vec()),
        TYPE_INT32 => {
            let mut values = Vec::with_capacity(count);
            for _ in 0..count {
                values.push(input.read_i32()?);
            }
            GiftiData::Int32(values)
        }
        _ => {
            let mut values = Vec::with_capacity(count);
            for _ in 0..count {
                values.push(input.read_f32()?);
            }
            GiftiData::Float32(values)
        }
    })
}

fn to_row_major(data: GiftiData, rows: usize, cols: usize) -> Result<GiftiData> {
    fn reorder<T: Clone>(values: Vec<T>, rows: usize, cols: usize) -> Result<Vec<T>> {
        let array = Array2::from_shape_vec((rows, cols).f(), values)
            .map_err(|e| GlasserPlotError::InvalidGiftiFormat(e.to_string()))?;
        Ok(array.iter().cloned().collect())
    }

    Ok(match data {
        GiftiData::UInt8(v) => GiftiData::UInt8(reorder(v, rows, cols)?),
        GiftiData::Int32(v) => GiftiData::Int32(reorder(v, rows, cols)?),
        GiftiData::Float32(v) => GiftiData::Float32(reorder(v, rows, cols)?),
    })
}

fn encode_data(data: &GiftiData) -> Result<String> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    {
        let mut output = ByteOrdered::le(&mut encoder);
        match data {
            GiftiData::UInt8(values) => {
                for v in values {
                    output.write_u8(*v)?;
                }
            }
            GiftiData::Int32(values) => {
                for v in values {
                    output.write_i32(*v)?;
                }
            }
            GiftiData::Float32(values) => {
                for v in values {
                    output.write_f32(*v)?;
                }
            }
        }
    }
    Ok(BASE64.encode(encoder.finish()?))
}


/// Read a GIFTI file, like `fsaverage/pial_left.gii`.
///
/// # Examples
///
/// ```no_run
/// let gii = glasserplot::read_gifti("/path/to/fsaverage/pial_left.gii").unwrap();
/// println!("{}", gii.mesh().unwrap());
/// ```
pub fn read_gifti<P: AsRef<Path>>(path: P) -> Result<GiftiImage> {
    GiftiImage::from_file(path)
}


/// Write a GIFTI file. If the file's name ends with ".gz", the whole file is GZip-compressed as well.
pub fn write_gifti<P: AsRef<Path>>(path: P, image: &GiftiImage) -> Result<()> {
    let gz = is_gz_file(&path);
    let file = BufWriter::new(File::create(path)?);
    if gz {
        let mut encoder = GzEncoder::new(file, Compression::default());
        image.to_writer(&mut encoder)?;
        encoder.finish()?.flush()?;
    } else {
        let mut file = file;
        image.to_writer(&mut file)?;
        file.flush()?;
    }
    Ok(())
}
