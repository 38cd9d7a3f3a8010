use std::{
    cmp,
    fs::File,
    io::{BufReader, Cursor, Read, Seek, SeekFrom},
    path::Path,
};

use log::debug;

use crate::{Facet, Mesh};
use super::{ascii, binary, Encoding, Error, HEADER_LEN};


/// Default for [`ReadOptions::line_limit`].
pub const DEFAULT_LINE_LIMIT: usize = 512;

/// Default for [`ReadOptions::facet_limit`].
pub const DEFAULT_FACET_LIMIT: u32 = 500_000_000;

/// Default for [`ReadOptions::normal_tolerance`].
pub const DEFAULT_NORMAL_TOLERANCE: f32 = 0.001;


/// Used to configure a [`Reader`].
///
/// The limits exist to bound the work done for corrupted or malicious files.
/// They do not bound the total size of the input: if you read untrusted
/// files, you have to limit that yourself.
#[derive(Debug, Clone, Copy)]
pub struct ReadOptions {
    /// Maximum length of one line in ASCII files in bytes, not counting the
    /// line break. Longer lines result in [`Error::LineLimit`]. *Default*:
    /// 512.
    pub line_limit: usize,

    /// Maximum number of facets a binary file may announce. Larger counts
    /// result in [`Error::FacetCount`] before any facet is read. *Default*:
    /// 500 000 000.
    pub facet_limit: u32,

    /// How much the length of a stored normal may differ from 1 before it is
    /// replaced by a recalculated normal. Zero normals are always replaced.
    /// *Default*: 0.001.
    pub normal_tolerance: f32,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            line_limit: DEFAULT_LINE_LIMIT,
            facet_limit: DEFAULT_FACET_LIMIT,
            normal_tolerance: DEFAULT_NORMAL_TOLERANCE,
        }
    }
}


// ===========================================================================
// ===== Reader
// ===========================================================================

/// A reader able to read ASCII and binary STL files.
///
/// The encoding is detected automatically (see [`sniff_encoding`]). Use
/// [`Reader::read`] to get all data at once or [`Reader::read_raw_into`] to
/// stream it into your own [`Sink`].
#[derive(Debug)]
pub struct Reader<R> {
    reader: R,
    options: ReadOptions,
}

impl Reader<File> {
    /// Creates a new `Reader` from the file at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|cause| Error::File {
            path: path.display().to_string(),
            cause,
        })?;

        // We don't need a `BufReader` here, the decoders add one anyway.
        Ok(Self::new(file))
    }
}

impl<'a> Reader<Cursor<&'a [u8]>> {
    /// Creates a new `Reader` reading from the given bytes.
    pub fn from_bytes(data: &'a [u8]) -> Self {
        Self::new(Cursor::new(data))
    }
}

impl<R: Read + Seek> Reader<R> {
    /// Creates a new `Reader` from the given `io::Read` instance. The STL data
    /// is expected to start at the current position of `reader`.
    ///
    /// If you want to open a file, rather use [`Reader::open`].
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            options: ReadOptions::default(),
        }
    }

    /// Replaces the options of this reader.
    pub fn with_options(self, options: ReadOptions) -> Self {
        Self { options, ..self }
    }

    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    /// Reads the whole file into a [`ReadResults`].
    ///
    /// Returns an error if the file is broken in any way. Partial results are
    /// never returned; if you need those, use [`Reader::read_raw_into`].
    pub fn read(self) -> Result<ReadResults, Error> {
        let mut out = ReadResults::default();
        self.read_raw_into(&mut out)?;
        Ok(out)
    }

    /// Reads the whole file into the given sink.
    ///
    /// This is the streaming version of [`Reader::read`]. If an error occurs,
    /// the sink already received everything read before the error. For ASCII
    /// files, the line of the error is also passed to
    /// [`Sink::error_line`].
    pub fn read_raw_into(self, sink: &mut impl Sink) -> Result<(), Error> {
        let Self { mut reader, options } = self;

        let encoding = sniff_encoding(&mut reader)?;
        debug!("reading {} STL data", encoding);
        sink.encoding(encoding);

        let reader = BufReader::new(reader);
        let res = match encoding {
            Encoding::Ascii => ascii::read(reader, &options, sink),
            Encoding::Binary => binary::read(reader, &options, sink),
        };

        if let Err(e) = &res {
            debug!("reading {} STL data failed: {}", encoding, e);
        }
        res
    }
}

/// Checks whether the given data is ASCII or binary STL.
///
/// An ASCII file starts with `solid`. A binary file starts with an 80 byte
/// header with arbitrary content. Which means a binary file can start with
/// `solid`, too: sadly, many exporters do exactly that. We still treat all
/// files starting with `solid` as ASCII, anything else (including data
/// shorter than 5 bytes) as binary.
///
/// The first 5 bytes are read and the reader is then moved back to the
/// position it had before.
pub fn sniff_encoding<R: Read + Seek>(reader: &mut R) -> Result<Encoding, Error> {
    let start = reader.stream_position()?;

    let mut head = Vec::with_capacity(5);
    reader.by_ref().take(5).read_to_end(&mut head)?;
    reader.seek(SeekFrom::Start(start))?;

    if head == b"solid" {
        Ok(Encoding::Ascii)
    } else {
        Ok(Encoding::Binary)
    }
}


// ===========================================================================
// ===== Sinks
// ===========================================================================

/// A sink can accept data from an STL file. This is mainly used for
/// [`Reader::read_raw_into`].
///
/// All methods except [`Sink::facet`] have a default implementation that
/// does nothing.
pub trait Sink {
    /// Is called once before any other method with the detected encoding.
    fn encoding(&mut self, _encoding: Encoding) {}

    /// Is called once before the first facet if an ASCII file specifies a
    /// (non-empty) name after `solid`. The name is trimmed.
    fn solid_name(&mut self, _name: String) {}

    /// Is called once with the header of a binary file, before any facet.
    fn binary_header(&mut self, _header: &[u8; HEADER_LEN]) {}

    /// Is called once for binary files with the number of facets as stored in
    /// the file, before the first facet.
    fn num_facets(&mut self, _num: u32) {}

    /// Might be called for ASCII files right before an error is returned, with
    /// the 1-based number of the offending line.
    ///
    /// This is only a hint; do not rely on this method being called when an
    /// error occurs.
    fn error_line(&mut self, _line: usize) {}

    /// Is called for each facet in the file. The normal was already checked
    /// and, if necessary, recalculated.
    fn facet(&mut self, facet: Facet);

    /// Is called right after [`Sink::facet`] if the facet in a binary file has
    /// a non-zero attribute.
    ///
    /// Nobody really knows what those two bytes mean. They should be zero
    /// "because most software does not understand anything else", but some
    /// exporters abuse them to store a 16 bit color.
    fn facet_attribute(&mut self, _attribute: u16) {}
}

impl Sink for Mesh {
    fn num_facets(&mut self, num: u32) {
        // The count comes straight from the file and might be garbage, so we
        // don't blindly trust it with our memory.
        const MAX_PREALLOC: usize = 1 << 20;
        self.facets.reserve(cmp::min(num as usize, MAX_PREALLOC));
    }

    fn facet(&mut self, facet: Facet) {
        self.facets.push(facet);
    }
}

/// Holds all data from an STL file.
///
/// To obtain a `ReadResults`, call [`Reader::read`]. It also implements
/// [`Source`][super::Source], so it can be written again without losing
/// information.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadResults {
    /// The encoding of the file. `None` if this was not read from a file.
    pub encoding: Option<Encoding>,

    /// The solid name, if specified in the (ASCII) file.
    pub solid_name: Option<String>,

    /// The header of a binary file.
    pub header: Option<[u8; HEADER_LEN]>,

    /// All facets from the file.
    pub mesh: Mesh,

    /// All non-zero facet attributes as `(facet index, attribute)`, sorted by
    /// facet index.
    pub attributes: Vec<(usize, u16)>,
}

impl ReadResults {
    /// Returns the attribute of the facet with the given index (0 if the file
    /// didn't store a non-zero one).
    pub fn attribute_of(&self, facet: usize) -> u16 {
        self.attributes.binary_search_by_key(&facet, |&(i, _)| i)
            .map(|pos| self.attributes[pos].1)
            .unwrap_or(0)
    }
}

impl Sink for ReadResults {
    fn encoding(&mut self, encoding: Encoding) {
        self.encoding = Some(encoding);
    }

    fn solid_name(&mut self, name: String) {
        self.solid_name = Some(name);
    }

    fn binary_header(&mut self, header: &[u8; HEADER_LEN]) {
        self.header = Some(*header);
    }

    fn num_facets(&mut self, num: u32) {
        Sink::num_facets(&mut self.mesh, num);
    }

    fn facet(&mut self, facet: Facet) {
        self.mesh.facets.push(facet);
    }

    fn facet_attribute(&mut self, attribute: u16) {
        // The attribute belongs to the facet added last.
        if let Some(idx) = self.mesh.facets.len().checked_sub(1) {
            self.attributes.push((idx, attribute));
        }
    }
}

/// A sink that only counts facets.
#[derive(Debug, Default)]
pub struct CounterSink {
    /// The solid name if it's specified in the file.
    pub solid_name: Option<String>,

    /// The number of facets in that file.
    pub facet_count: u32,
}

impl CounterSink {
    /// Returns an instance with no name and 0 facets.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sink for CounterSink {
    fn solid_name(&mut self, name: String) {
        self.solid_name = Some(name);
    }

    fn facet(&mut self, _: Facet) {
        self.facet_count += 1;
    }
}
