//! Reading and writing STL files (ASCII and binary).
//!
//! STL files come in two encodings. ASCII files look like this:
//!
//! ```text
//! solid name
//!   facet normal 0 0 1
//!     outer loop
//!       vertex 0 0 0
//!       vertex 1 0 0
//!       vertex 0 1 0
//!     endloop
//!   endfacet
//! endsolid name
//! ```
//!
//! Binary files consist of an 80 byte header, the number of facets as `u32`
//! and one 50 byte record per facet (normal, three corners, two attribute
//! bytes). All numbers are little endian.
//!
//! Use [`Reader`] to read and [`Config`] to write files.

use std::{fmt, io};

use derive_more::Display;
use failure::Fail;


mod ascii;
mod binary;
mod read;
mod write;


pub use self::{
    read::{
        sniff_encoding, CounterSink, ReadOptions, ReadResults, Reader, Sink,
        DEFAULT_FACET_LIMIT, DEFAULT_LINE_LIMIT, DEFAULT_NORMAL_TOLERANCE,
    },
    write::{default_header, Config, Source, Writer},
};

/// Size of the header of binary STL files in bytes.
pub const HEADER_LEN: usize = 80;


/// The two encodings of STL files.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    #[display(fmt = "ASCII")]
    Ascii,
    #[display(fmt = "binary")]
    Binary,
}


// ===========================================================================
// ===== Errors
// ===========================================================================

/// Everything that can go wrong while reading or writing STL files.
///
/// Use [`Error::status`] to map an error to the closed set of outcomes
/// described by [`Status`].
#[derive(Debug, Fail)]
pub enum Error {
    /// The file at the given path could not be opened or created.
    #[fail(display = "unable to open or create '{}': {}", path, cause)]
    File {
        path: String,
        #[cause]
        cause: io::Error,
    },

    /// The underlying reader or writer failed (for reasons other than EOF).
    #[fail(display = "IO error: {}", _0)]
    Io(#[cause] io::Error),

    /// The data ended before the file was complete. Also returned for binary
    /// files announcing zero facets.
    #[fail(display = "STL data is incomplete (unexpected end of data or no facets)")]
    MissingData,

    /// An ASCII keyword appeared where it is not allowed.
    #[fail(display = "unexpected '{}' in line {}", keyword, line)]
    Unexpected {
        keyword: &'static str,
        line: usize,
    },

    /// The numbers in an ASCII `facet normal` or `vertex` line are invalid.
    #[fail(display = "expected three numbers in line {}", line)]
    Parser {
        line: usize,
    },

    /// An ASCII line is longer than the configured limit.
    #[fail(display = "line {} is longer than the limit of {} bytes", line, limit)]
    LineLimit {
        line: usize,
        limit: usize,
    },

    /// The number of facets is larger than the configured limit (or, when
    /// writing, does not fit into the `u32` count field).
    #[fail(display = "number of facets ({}) exceeds the limit of {}", count, limit)]
    FacetCount {
        count: u64,
        limit: u64,
    },
}

impl Error {
    /// Returns the outcome category of this error.
    pub fn status(&self) -> Status {
        match self {
            Error::File { .. } | Error::Io(_) => Status::FileError,
            Error::MissingData => Status::MissingDataError,
            Error::Unexpected { .. } => Status::UnexpectedError,
            Error::Parser { .. } => Status::ParserError,
            Error::LineLimit { .. } => Status::LineLimitError,
            Error::FacetCount { .. } => Status::FacetCountError,
        }
    }

    /// Returns the 1-based line number for errors in ASCII files.
    pub fn line(&self) -> Option<usize> {
        match *self {
            Error::Unexpected { line, .. }
            | Error::Parser { line }
            | Error::LineLimit { line, .. } => Some(line),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(src: io::Error) -> Self {
        // Readers only report `UnexpectedEof` from `read_exact` and friends,
        // i.e. when a fixed amount of data was required but not present.
        if src.kind() == io::ErrorKind::UnexpectedEof {
            Error::MissingData
        } else {
            Error::Io(src)
        }
    }
}


/// The closed set of outcomes of a read or write operation.
///
/// Each variant has a stable numeric code ([`Status::code`]) and a stable
/// name ([`Status::name`], also used by `Display`) suitable for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Completed without error.
    Success,

    /// Could not open or create the path, or the underlying stream failed.
    FileError,

    /// Data ended before the grammar/record was complete, or the binary facet
    /// count was zero.
    MissingDataError,

    /// ASCII grammar violation.
    UnexpectedError,

    /// Malformed number in an ASCII `facet normal` or `vertex` line.
    ParserError,

    /// An ASCII line exceeded the configured length limit.
    LineLimitError,

    /// A binary facet count exceeded the configured limit.
    FacetCountError,

    /// The execution target is not little endian.
    ///
    /// This is never returned: binary data is always read and written with
    /// explicit little endian conversions, which work on every target. It is
    /// part of this set so that codes and names stay stable.
    EndianError,
}

impl Status {
    const ALL: [Status; 8] = [
        Status::Success,
        Status::FileError,
        Status::MissingDataError,
        Status::UnexpectedError,
        Status::ParserError,
        Status::LineLimitError,
        Status::FacetCountError,
        Status::EndianError,
    ];

    /// Returns the status of the given operation result.
    pub fn of<T>(result: &Result<T, Error>) -> Self {
        match result {
            Ok(_) => Status::Success,
            Err(e) => e.status(),
        }
    }

    /// Returns the stable numeric code of this status (0 to 7).
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Returns the status with the given code or `None` if no such status
    /// exists.
    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Returns the stable name of this status.
    pub fn name(self) -> &'static str {
        match self {
            Status::Success => "Success",
            Status::FileError => "FileError",
            Status::MissingDataError => "MissingDataError",
            Status::UnexpectedError => "UnexpectedError",
            Status::ParserError => "ParserError",
            Status::LineLimitError => "LineLimitError",
            Status::FacetCountError => "FacetCountError",
            Status::EndianError => "EndianError",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.name().fmt(f)
    }
}
