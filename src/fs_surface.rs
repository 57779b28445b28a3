// Functions for managing FreeSurfer brain surface meshes in binary 'surf' files.
// These files store a triangular mesh, where each vertex if defined by its x,y,z coord and
// each face is defined by 3 vertices, stored as 3 indices into the vertices.


use byteordered::{ByteOrdered};
use flate2::bufread::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use ndarray::{ArrayView2, Axis};
use ndarray_stats::QuantileExt;

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path};
use std::fmt;

use crate::gifti::read_gifti;
use crate::util::{is_gifti_file, is_gz_file, read_info_line, write_info_line};
use crate::error::{GlasserPlotError, Result};

pub const TRIS_MAGIC_FILE_TYPE_NUMBER: i32 = 16777214;

#[derive(Debug, Clone, PartialEq)]
pub struct FsSurfaceHeader {
    pub surf_magic: [u8; 3],
    pub info_line: String,
    pub num_vertices: i32,
    pub num_faces: i32,
}


impl Default for FsSurfaceHeader {
    fn default() -> FsSurfaceHeader {
        FsSurfaceHeader {
            surf_magic: [255, 255, 254],
            info_line: String::from(""),
            num_vertices: 0,
            num_faces: 0
        }
    }
}

impl FsSurfaceHeader {

    /// Read an FsSurface header from the given byte stream.
    /// It is assumed that the input is currently at the start of the
    /// FsSurface header.
    pub fn from_reader<S>(input: &mut S) -> Result<FsSurfaceHeader>
    where
        S: Read,
    {
        let mut hdr = FsSurfaceHeader::default();

        input.read_exact(&mut hdr.surf_magic)?;

        let magic: i32 = interpret_fs_int24(hdr.surf_magic[0], hdr.surf_magic[1], hdr.surf_magic[2]);
        if magic != TRIS_MAGIC_FILE_TYPE_NUMBER {
            return Err(GlasserPlotError::InvalidFsSurfaceFormat);
        }

        hdr.info_line = read_info_line(input)?;

        let mut input = ByteOrdered::be(input);
        hdr.num_vertices = input.read_i32()?;
        hdr.num_faces = input.read_i32()?;

        if hdr.num_vertices < 0 || hdr.num_faces < 0 {
            return Err(GlasserPlotError::InvalidFsSurfaceFormat);
        }
        Ok(hdr)
    }
}


/// Interpret three bytes as a single 24 bit integer, FreeSurfer style.
pub fn interpret_fs_int24(b1: u8, b2:u8, b3:u8) -> i32 {
    ((b1 as i32) << 16) + ((b2 as i32) << 8) + b3 as i32
}


/// An FsSurface object: a brain mesh read from a FreeSurfer surf file, together with its header.
#[derive(Debug, PartialEq, Clone)]
pub struct FsSurface {
    pub header: FsSurfaceHeader,
    pub mesh: BrainMesh,
}


/// A triangular brain mesh.
///
/// The `vertices` hold 3 coordinates (x, y, z) per vertex, the `faces` hold 3 vertex indices per face.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct BrainMesh {
    pub vertices: Vec<f32>,
    pub faces: Vec<i32>,
}


impl BrainMesh {

    pub fn num_vertices(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len() / 3
    }

    /// Get the coordinates of the vertex with the given index.
    ///
    /// # Panics
    ///
    /// If `idx` is not a valid vertex index for this mesh.
    pub fn vertex(&self, idx: usize) -> [f32; 3] {
        [self.vertices[idx * 3], self.vertices[idx * 3 + 1], self.vertices[idx * 3 + 2]]
    }

    /// Get the 3 vertex indices of the face with the given index.
    ///
    /// # Panics
    ///
    /// If `idx` is not a valid face index for this mesh.
    pub fn face(&self, idx: usize) -> [usize; 3] {
        [self.faces[idx * 3] as usize, self.faces[idx * 3 + 1] as usize, self.faces[idx * 3 + 2] as usize]
    }

    /// Check that the vertex and face arrays are complete triples and that all face indices refer to existing vertices.
    pub fn validate(&self) -> Result<()> {
        if self.vertices.len() % 3 != 0 {
            return Err(GlasserPlotError::MeshDataMismatch("vertex coordinates", self.num_vertices() * 3 + 3, self.vertices.len()));
        }
        if self.faces.len() % 3 != 0 {
            return Err(GlasserPlotError::MeshDataMismatch("face indices", self.num_faces() * 3 + 3, self.faces.len()));
        }
        let num_verts = self.num_vertices();
        if let Some(bad) = self.faces.iter().find(|&&f| f < 0 || f as usize >= num_verts) {
            return Err(GlasserPlotError::MeshDataMismatch("face vertex index bound", num_verts, *bad as usize));
        }
        Ok(())
    }

    /// Combine this mesh and `other` into a new mesh.
    ///
    /// The vertices of `other` are appended after the vertices of `self`, and the face indices of
    /// `other` are shifted by the vertex count of `self`, so they still refer to the same points.
    ///
    /// # Examples
    ///
    /// ```
    /// use glasserplot::BrainMesh;
    /// let tri = BrainMesh { vertices: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], faces: vec![0, 1, 2] };
    /// let both = tri.merge(&tri);
    /// assert_eq!(6, both.num_vertices());
    /// assert_eq!(vec![0, 1, 2, 3, 4, 5], both.faces);
    /// ```
    pub fn merge(&self, other: &BrainMesh) -> BrainMesh {
        let offset = self.num_vertices() as i32;

        let mut vertices: Vec<f32> = Vec::with_capacity(self.vertices.len() + other.vertices.len());
        vertices.extend_from_slice(&self.vertices);
        vertices.extend_from_slice(&other.vertices);

        let mut faces: Vec<i32> = Vec::with_capacity(self.faces.len() + other.faces.len());
        faces.extend_from_slice(&self.faces);
        faces.extend(other.faces.iter().map(|f| f + offset));

        BrainMesh { vertices, faces }
    }

    /// Get the axis-aligned bounding box of the mesh as `(min, max)` corner coordinates.
    ///
    /// Returns `None` for a mesh without vertices.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        if self.num_vertices() == 0 {
            return None;
        }
        let coords = ArrayView2::from_shape((self.num_vertices(), 3), &self.vertices[..self.num_vertices() * 3]).ok()?;
        let mut min = [0f32; 3];
        let mut max = [0f32; 3];
        for (dim, column) in coords.axis_iter(Axis(1)).enumerate() {
            min[dim] = *column.min_skipnan();
            max[dim] = *column.max_skipnan();
        }
        Some((min, max))
    }

    /// Get the center of the bounding box of the mesh.
    pub fn center(&self) -> Option<[f32; 3]> {
        let (min, max) = self.bounds()?;
        Some([(min[0] + max[0]) / 2.0, (min[1] + max[1]) / 2.0, (min[2] + max[2]) / 2.0])
    }
}


impl fmt::Display for BrainMesh {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Brain trimesh with {} vertices and {} faces.", self.num_vertices(), self.num_faces())
    }
}


/// Combine the meshes of the left and right hemisphere into one mesh, left first. See [`BrainMesh::merge`].
pub fn combine_meshes(left: &BrainMesh, right: &BrainMesh) -> BrainMesh {
    left.merge(right)
}


/// Read a brain mesh from a FreeSurfer surf file.
///
/// If the file's name ends with ".gz", the file is assumed to need GZip decoding.
///
/// # Examples
///
/// ```no_run
/// let surf = glasserplot::read_surf("/path/to/fsaverage/lh.pial").unwrap();
/// println!("{}", surf.mesh);
/// ```
pub fn read_surf<P: AsRef<Path>>(path: P) -> Result<FsSurface> {
    FsSurface::from_file(path)
}


/// Read a brain mesh from a GIFTI file (`.gii`, `.gii.gz`) or, for any other name, from a FreeSurfer surf file.
pub fn read_mesh<P: AsRef<Path>>(path: P) -> Result<BrainMesh> {
    if is_gifti_file(&path) {
        read_gifti(path)?.mesh()
    } else {
        Ok(read_surf(path)?.mesh)
    }
}


impl FsSurface {
    /// Read an FsSurface instance from a file.
    /// If the file's name ends with ".gz", the file is assumed to need GZip decoding. This is not typically the case
    /// for FreeSurfer Surface files, but very handy (and it helps us to reduce the size of our test data).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<FsSurface> {
        let gz = is_gz_file(&path);
        let file = BufReader::new(File::open(path)?);
        if gz {
            FsSurface::from_reader(GzDecoder::new(file))
        } else {
            FsSurface::from_reader(file)
        }
    }

    /// Read an FsSurface from the given byte stream, which must be at the start of the header.
    pub fn from_reader<S>(mut input: S) -> Result<FsSurface>
    where
        S: Read,
    {
        let hdr = FsSurfaceHeader::from_reader(&mut input)?;
        let mesh = FsSurface::mesh_from_reader(&mut input, &hdr)?;
        mesh.validate()?;

        Ok(FsSurface {
            header: hdr,
            mesh,
        })
    }

    /// Read the vertex and face data following the header.
    pub fn mesh_from_reader<S>(input: &mut S, hdr: &FsSurfaceHeader) -> Result<BrainMesh>
    where
        S: Read,
    {
        let mut input = ByteOrdered::be(input);

        let mut vertex_data : Vec<f32> = Vec::with_capacity((hdr.num_vertices * 3) as usize);
        for _ in 1..=hdr.num_vertices * 3 {
            vertex_data.push(input.read_f32()?);
        }

        let mut face_data : Vec<i32> = Vec::with_capacity((hdr.num_faces * 3) as usize);
        for _ in 1..=hdr.num_faces * 3 {
            face_data.push(input.read_i32()?);
        }

        Ok(BrainMesh {
            vertices : vertex_data,
            faces : face_data
        })
    }

    /// Write this surface to the given byte stream in FreeSurfer surf format.
    pub fn to_writer<W>(&self, output: &mut W) -> Result<()>
    where
        W: Write,
    {
        output.write_all(&[255, 255, 254])?;
        write_info_line(output, &self.header.info_line)?;

        let mut output = ByteOrdered::be(output);
        output.write_i32(self.mesh.num_vertices() as i32)?;
        output.write_i32(self.mesh.num_faces() as i32)?;
        for v in &self.mesh.vertices {
            output.write_f32(*v)?;
        }
        for f in &self.mesh.faces {
            output.write_i32(*f)?;
        }
        Ok(())
    }
}


/// Write a brain mesh to a FreeSurfer surf file. If the file's name ends with ".gz", the output is GZip-compressed.
pub fn write_surf<P: AsRef<Path>>(path: P, mesh: &BrainMesh) -> Result<()> {
    let surf = FsSurface {
        header: FsSurfaceHeader {
            info_line: String::from("created by glasserplot"),
            num_vertices: mesh.num_vertices() as i32,
            num_faces: mesh.num_faces() as i32,
            ..FsSurfaceHeader::default()
        },
        mesh: mesh.clone(),
    };

    let gz = is_gz_file(&path);
    let file = BufWriter::new(File::create(path)?);
    if gz {
        let mut encoder = GzEncoder::new(file, Compression::default());
        surf.to_writer(&mut encoder)?;
        encoder.finish()?.flush()?;
    } else {
        let mut file = file;
        surf.to_writer(&mut file)?;
        file.flush()?;
    }
    Ok(())
}


#[cfg(test)]
mod test {
    use super::*;

    fn quad() -> BrainMesh {
        BrainMesh {
            vertices: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0],
            faces: vec![0, 1, 2, 0, 2, 3],
        }
    }

    #[test]
    fn the_fs_int24_magic_is_interpreted_correctly() {
        assert_eq!(TRIS_MAGIC_FILE_TYPE_NUMBER, interpret_fs_int24(255, 255, 254));
        assert_eq!(16777215, interpret_fs_int24(255, 255, 255));
    }

    #[test]
    fn a_surface_can_be_read_back_from_memory() {
        let surf = FsSurface {
            header: FsSurfaceHeader { info_line: String::from("created by test"), num_vertices: 4, num_faces: 2, ..FsSurfaceHeader::default() },
            mesh: quad(),
        };
        let mut buf: Vec<u8> = Vec::new();
        surf.to_writer(&mut buf).unwrap();

        let read = FsSurface::from_reader(&buf[..]).unwrap();
        assert_eq!(4, read.header.num_vertices);
        assert_eq!(2, read.header.num_faces);
        assert_eq!("created by test", read.header.info_line);
        assert_eq!(surf.mesh, read.mesh);
    }

    #[test]
    fn a_wrong_magic_number_is_rejected() {
        let buf: Vec<u8> = vec![255, 255, 255, b'\n', b'\n', 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(matches!(FsSurface::from_reader(&buf[..]), Err(GlasserPlotError::InvalidFsSurfaceFormat)));
    }

    #[test]
    fn merged_meshes_offset_the_right_face_indices() {
        let left = quad();
        let right = quad();
        let both = combine_meshes(&left, &right);

        assert_eq!(8, both.num_vertices());
        assert_eq!(4, both.num_faces());
        assert_eq!(&left.vertices[..], &both.vertices[..12]);
        assert_eq!(&right.vertices[..], &both.vertices[12..]);
        assert_eq!(vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7], both.faces);
        assert!(both.validate().is_ok());
    }

    #[test]
    fn merging_with_an_empty_mesh_is_the_identity() {
        let mesh = quad();
        assert_eq!(mesh, mesh.merge(&BrainMesh::default()));
        assert_eq!(mesh, BrainMesh::default().merge(&mesh));
    }

    #[test]
    fn out_of_range_faces_are_rejected() {
        let mut mesh = quad();
        mesh.faces[5] = 4;
        assert!(matches!(mesh.validate(), Err(GlasserPlotError::MeshDataMismatch(..))));
    }

    #[test]
    fn the_mesh_bounds_and_center_are_computed() {
        let (min, max) = quad().bounds().unwrap();
        assert_eq!([0.0, 0.0, 0.0], min);
        assert_eq!([1.0, 1.0, 0.0], max);
        assert_eq!(Some([0.5, 0.5, 0.0]), quad().center());
        assert_eq!(None, BrainMesh::default().center());
    }
}
