use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use log::{debug, warn};

use crate::{Facet, IndexedMesh, Mesh, Vec3};
use super::{binary::RECORD_LEN, Encoding, Error, ReadResults, HEADER_LEN};


/// The text at the start of the header written when the source doesn't
/// provide one.
const DEFAULT_HEADER_TEXT: &[u8] = b"binary STL written by stlkit";

/// Returns the header that is written to binary files when the [`Source`]
/// doesn't specify one: a short text identifying this library, padded with
/// spaces.
pub fn default_header() -> [u8; HEADER_LEN] {
    let mut header = [b' '; HEADER_LEN];
    header[..DEFAULT_HEADER_TEXT.len()].copy_from_slice(DEFAULT_HEADER_TEXT);
    header
}


// ===============================================================================================
// ===== Source
// ===============================================================================================

/// Something that can be written as STL file.
///
/// Only the number of facets and the facets themselves are required. The
/// remaining methods have default implementations.
pub trait Source {
    /// The number of facets.
    fn num_facets(&self) -> usize;

    /// Returns the facet with the given index. Is called with all indices
    /// from `0` to `num_facets() - 1` in order.
    fn facet(&self, index: usize) -> Facet;

    /// The name written after `solid` in ASCII files. *Default*: `None`.
    fn solid_name(&self) -> Option<&str> {
        None
    }

    /// The 80 byte header of binary files. *Default*: `None`, meaning that
    /// [`default_header()`] is used.
    ///
    /// Note that a header starting with `solid` makes the file look like an
    /// ASCII file to most readers (including this one).
    fn header(&self) -> Option<&[u8; HEADER_LEN]> {
        None
    }

    /// If `false`, zero vectors are written instead of the facet normals.
    /// Readers will then calculate the normals themselves. *Default*: `true`.
    fn write_normals(&self) -> bool {
        true
    }

    /// The two attribute bytes of the given facet, only written in binary
    /// files. *Default*: 0.
    fn attribute(&self, _index: usize) -> u16 {
        0
    }
}

impl Source for Mesh {
    fn num_facets(&self) -> usize {
        self.facets.len()
    }

    fn facet(&self, index: usize) -> Facet {
        self.facets[index]
    }
}

impl Source for IndexedMesh {
    fn num_facets(&self) -> usize {
        self.facets.len()
    }

    fn facet(&self, index: usize) -> Facet {
        let f = &self.facets[index];
        Facet::new(self.corners_of(f), f.normal)
    }
}

impl Source for ReadResults {
    fn num_facets(&self) -> usize {
        self.mesh.facets.len()
    }

    fn facet(&self, index: usize) -> Facet {
        self.mesh.facets[index]
    }

    fn solid_name(&self) -> Option<&str> {
        self.solid_name.as_deref()
    }

    fn header(&self) -> Option<&[u8; HEADER_LEN]> {
        self.header.as_ref()
    }

    fn attribute(&self, index: usize) -> u16 {
        self.attribute_of(index)
    }
}

impl<S: Source + ?Sized> Source for &S {
    fn num_facets(&self) -> usize {
        (**self).num_facets()
    }

    fn facet(&self, index: usize) -> Facet {
        (**self).facet(index)
    }

    fn solid_name(&self) -> Option<&str> {
        (**self).solid_name()
    }

    fn header(&self) -> Option<&[u8; HEADER_LEN]> {
        (**self).header()
    }

    fn write_normals(&self) -> bool {
        (**self).write_normals()
    }

    fn attribute(&self, index: usize) -> u16 {
        (**self).attribute(index)
    }
}


// ===============================================================================================
// ===== STL Config
// ===============================================================================================

/// Used to configure and create a [`Writer`].
///
/// You can use the [`Config::into_writer`] method to create a [`Writer`]
/// writing to an arbitrary `io::Write` or use the shortcuts
/// [`Config::write_to_file`] and [`Config::write_to_memory`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    encoding: Encoding,
}

impl Config {
    /// Creates a new builder instance from the given encoding. For
    /// convenience, you can use [`Config::binary()`] or [`Config::ascii()`]
    /// directly.
    pub fn new(encoding: Encoding) -> Self {
        Self { encoding }
    }

    /// Creates a new builder instance for a binary STL file.
    pub fn binary() -> Self {
        Self::new(Encoding::Binary)
    }

    /// Creates a new builder instance for an ASCII STL file.
    ///
    /// **Note**: ASCII files are roughly five times as large as binary ones
    /// and a lot slower to read. Prefer binary files when you can.
    pub fn ascii() -> Self {
        Self::new(Encoding::Ascii)
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Creates a [`Writer`] with `self` as config.
    pub fn into_writer<W: io::Write>(self, writer: W) -> Writer<W> {
        Writer::new(self, writer)
    }

    /// Writes `src` to the file at the given path. Overwrites the file if it
    /// already exists.
    ///
    /// If an error occurs after the file was created, the file is left
    /// incomplete. Write to a temporary path and rename it if you need
    /// atomicity.
    pub fn write_to_file(&self, path: impl AsRef<Path>, src: impl Source) -> Result<(), Error> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|cause| Error::File {
            path: path.display().to_string(),
            cause,
        })?;

        self.into_writer(BufWriter::new(file)).write(src)
    }

    /// Writes `src` into a `Vec<u8>` which is returned on success.
    pub fn write_to_memory(&self, src: impl Source) -> Result<Vec<u8>, Error> {
        let mut out = Vec::new();
        self.into_writer(&mut out).write(src)?;
        Ok(out)
    }
}


// ===============================================================================================
// ===== STL Writer
// ===============================================================================================

/// A writer able to write binary and ASCII STL files.
#[derive(Debug)]
pub struct Writer<W: io::Write> {
    config: Config,
    writer: W,
}

impl<W: io::Write> Writer<W> {
    /// Creates a new STL writer with the given STL config which will write to
    /// the given `io::Write` instance.
    pub fn new(config: Config, writer: W) -> Self {
        Self { config, writer }
    }

    /// Writes all facets of `src` in the configured encoding and flushes the
    /// underlying writer.
    ///
    /// Values are written as they are: degenerate facets, non-finite
    /// coordinates or bogus normals are not checked.
    pub fn write(self, src: impl Source) -> Result<(), Error> {
        debug!("writing {} facets as {} STL", src.num_facets(), self.config.encoding);

        match self.config.encoding {
            Encoding::Ascii => self.write_ascii(&src),
            Encoding::Binary => self.write_binary(&src),
        }
    }

    #[inline(never)]
    fn write_binary(self, src: &impl Source) -> Result<(), Error> {
        let mut w = self.writer;

        let num_facets = src.num_facets();
        let count = u32::try_from(num_facets).map_err(|_| Error::FacetCount {
            count: num_facets as u64,
            limit: u32::MAX.into(),
        })?;

        // First, the 80 bytes header.
        let default;
        let header = match src.header() {
            Some(header) => header,
            None => {
                default = default_header();
                &default
            }
        };
        if header.starts_with(b"solid") {
            warn!("binary STL header starts with 'solid': readers will assume an ASCII file");
        }
        w.write_all(header)?;

        // Next, number of facets
        w.write_u32::<LittleEndian>(count)?;

        let mut buf = [0; RECORD_LEN];
        for i in 0..num_facets {
            let facet = src.facet(i);
            let normal = if src.write_normals() { facet.normal } else { [0.0; 3] };

            write_vec3(&mut buf[0..12], normal);
            write_vec3(&mut buf[12..24], facet.vertices[0]);
            write_vec3(&mut buf[24..36], facet.vertices[1]);
            write_vec3(&mut buf[36..48], facet.vertices[2]);
            LittleEndian::write_u16(&mut buf[48..50], src.attribute(i));

            w.write_all(&buf)?;
        }

        w.flush()?;
        Ok(())
    }

    #[inline(never)]
    fn write_ascii(self, src: &impl Source) -> Result<(), Error> {
        let mut w = self.writer;

        // A line break in the name would break the file.
        let name = src.solid_name()
            .map(|name| name.trim().replace(|c: char| c == '\n' || c == '\r', " "))
            .unwrap_or_default();

        if name.is_empty() {
            writeln!(w, "solid")?;
        } else {
            writeln!(w, "solid {}", name)?;
        }

        for i in 0..src.num_facets() {
            let facet = src.facet(i);
            let normal = if src.write_normals() { facet.normal } else { [0.0; 3] };

            // Write face normal
            write!(w, "  facet normal ")?;
            write_ascii_vector(&mut w, normal)?;
            writeln!(w)?;

            // Write all vertex positions
            writeln!(w, "    outer loop")?;
            for &vertex_pos in &facet.vertices {
                write!(w, "      vertex ")?;
                write_ascii_vector(&mut w, vertex_pos)?;
                writeln!(w)?;
            }

            writeln!(w, "    endloop")?;
            writeln!(w, "  endfacet")?;
        }

        if name.is_empty() {
            writeln!(w, "endsolid")?;
        } else {
            writeln!(w, "endsolid {}", name)?;
        }

        w.flush()?;
        Ok(())
    }
}


// ===============================================================================================
// ===== Helper functions
// ===============================================================================================

fn write_vec3(buf: &mut [u8], [x, y, z]: Vec3) {
    LittleEndian::write_f32(&mut buf[0..4], x);
    LittleEndian::write_f32(&mut buf[4..8], y);
    LittleEndian::write_f32(&mut buf[8..12], z);
}

/// Writes the three values of the given vector (in STL ASCII encoding,
/// separated by ' ') into the writer.
fn write_ascii_vector(w: &mut impl Write, [x, y, z]: Vec3) -> Result<(), io::Error> {
    write_ascii_f32(w, x)?;
    write!(w, " ")?;
    write_ascii_f32(w, y)?;
    write!(w, " ")?;
    write_ascii_f32(w, z)?;

    Ok(())
}

/// Writes the given `f32` in STL ASCII format into the given writer.
///
/// The STL specification is terribly underspecified. The only information
/// about how to encode floats in ASCII is this:
///
/// > The numerical data in the facet normal and vertex lines are single
/// > precision floats, for example, 1.23456E+789.
///
/// In real world STL files, floats are encoded all over the place. We use the
/// scientific notation of `std` (e.g. `1.5e0`, `-2.5e-3`): it is the shortest
/// representation that parses back to exactly the same `f32`.
fn write_ascii_f32(w: &mut impl Write, v: f32) -> Result<(), io::Error> {
    write!(w, "{:e}", v)
}
