//! Reading ASCII STL files.
//!
//! The file is read line by line. Each line is trimmed and classified by its
//! leading keyword; lines without a keyword are ignored. The nesting of
//! `solid`, `facet`, `outer loop` and `vertex` is tracked by a small state
//! machine (see [`State::next`]).

use std::{
    io::{BufRead, Read},
    str,
};

use crate::{algo::normals::rectify_normal, Facet, Vec3};
use super::{Error, ReadOptions, Sink};


/// Reads the ASCII STL data from `reader` into `sink`.
pub(super) fn read(
    reader: impl BufRead,
    options: &ReadOptions,
    sink: &mut impl Sink,
) -> Result<(), Error> {
    let mut lines = Lines::new(reader, options.line_limit);
    let mut state = State::Outside;
    let mut seen_solid = false;

    // The data of the facet we are currently in.
    let mut normal = [0.0; 3];
    let mut corners = [[0.0; 3]; 3];

    loop {
        let (line_number, line) = match lines.next_line() {
            Ok(Some(v)) => v,
            Ok(None) => break,
            Err(e) => {
                if let Some(line) = e.line() {
                    sink.error_line(line);
                }
                return Err(e);
            }
        };

        let (keyword, rest) = match Keyword::classify(trim(line)) {
            Some(v) => v,
            None => continue,
        };

        let next = match state.next(keyword, seen_solid) {
            Some(next) => next,
            None => {
                sink.error_line(line_number);
                return Err(Error::Unexpected { keyword: keyword.as_str(), line: line_number });
            }
        };

        match keyword {
            Keyword::Solid => {
                seen_solid = true;
                let name = trim(rest);
                if !name.is_empty() {
                    sink.solid_name(String::from_utf8_lossy(name).into_owned());
                }
            }
            Keyword::FacetNormal | Keyword::Vertex => {
                let v = match parse_vec3(rest) {
                    Some(v) => v,
                    None => {
                        sink.error_line(line_number);
                        return Err(Error::Parser { line: line_number });
                    }
                };

                match state {
                    State::InLoop { vertices, .. } => corners[vertices as usize] = v,
                    _ => normal = v,
                }
            }
            Keyword::EndFacet => {
                let normal = rectify_normal(normal, corners, options.normal_tolerance);
                sink.facet(Facet::new(corners, normal));
            }
            Keyword::EndSolid | Keyword::OuterLoop | Keyword::EndLoop => {}
        }

        state = next;
    }

    if state != State::Outside || !seen_solid {
        return Err(Error::MissingData);
    }

    Ok(())
}


// ===========================================================================
// ===== State machine
// ===========================================================================

/// Where in the nested structure of an ASCII file we currently are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Before `solid` or after `endsolid`.
    Outside,

    /// Between `solid` and `endsolid`, but not in a facet.
    InSolid,

    /// Between `facet normal` and `endfacet`, but not in a loop. `loops` is
    /// the number of loops already completed in this facet.
    InFacet { loops: u8 },

    /// Between `outer loop` and `endloop`. `vertices` is the number of
    /// `vertex` lines already seen in this loop.
    InLoop { loops: u8, vertices: u8 },
}

impl State {
    /// Returns the state after a line with the given keyword or `None` if
    /// the keyword is not allowed in this state.
    ///
    /// `seen_solid` is `true` if a `solid` line was already encountered:
    /// only one solid per file is allowed.
    fn next(self, keyword: Keyword, seen_solid: bool) -> Option<State> {
        use self::{Keyword as K, State as S};

        match (self, keyword) {
            (S::Outside, K::Solid) if !seen_solid => Some(S::InSolid),
            (S::InSolid, K::EndSolid) => Some(S::Outside),
            (S::InSolid, K::FacetNormal) => Some(S::InFacet { loops: 0 }),
            (S::InFacet { loops }, K::OuterLoop) => Some(S::InLoop { loops, vertices: 0 }),
            (S::InFacet { loops: 1 }, K::EndFacet) => Some(S::InSolid),
            (S::InLoop { loops, vertices }, K::Vertex) if vertices < 3 => {
                Some(S::InLoop { loops, vertices: vertices + 1 })
            }
            (S::InLoop { loops, vertices: 3 }, K::EndLoop) => {
                Some(S::InFacet { loops: loops.saturating_add(1) })
            }
            _ => None,
        }
    }
}

/// The keywords that can start a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Solid,
    EndSolid,
    FacetNormal,
    EndFacet,
    OuterLoop,
    EndLoop,
    Vertex,
}

impl Keyword {
    const ALL: [Keyword; 7] = [
        Keyword::Solid,
        Keyword::EndSolid,
        Keyword::FacetNormal,
        Keyword::EndFacet,
        Keyword::OuterLoop,
        Keyword::EndLoop,
        Keyword::Vertex,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Keyword::Solid => "solid",
            Keyword::EndSolid => "endsolid",
            Keyword::FacetNormal => "facet normal",
            Keyword::EndFacet => "endfacet",
            Keyword::OuterLoop => "outer loop",
            Keyword::EndLoop => "endloop",
            Keyword::Vertex => "vertex",
        }
    }

    /// Returns the keyword the trimmed `line` starts with and the remainder
    /// of the line after the keyword.
    fn classify(line: &[u8]) -> Option<(Keyword, &[u8])> {
        Self::ALL.iter().find_map(|&kw| {
            line.strip_prefix(kw.as_str().as_bytes()).map(|rest| (kw, rest))
        })
    }
}


// ===========================================================================
// ===== Helpers
// ===========================================================================

/// Splits the input into lines (separated by `\n`) while making sure that no
/// line is longer than `limit` bytes.
struct Lines<R> {
    reader: R,
    buf: Vec<u8>,
    limit: usize,

    /// The 1-based number of the line last returned.
    line_number: usize,
}

impl<R: BufRead> Lines<R> {
    fn new(reader: R, limit: usize) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            limit,
            line_number: 0,
        }
    }

    /// Returns the 1-based number and the content (without `\n`) of the next
    /// line or `None` if the input is exhausted.
    fn next_line(&mut self) -> Result<Option<(usize, &[u8])>, Error> {
        self.buf.clear();
        self.line_number += 1;

        // We never read more than `limit + 1` bytes: either the last of those
        // is the line break or the line is too long.
        let max = (self.limit as u64).saturating_add(1);
        let n = (&mut self.reader).take(max).read_until(b'\n', &mut self.buf)?;

        if n == 0 {
            return Ok(None);
        }

        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
        } else if n as u64 == max {
            return Err(Error::LineLimit { line: self.line_number, limit: self.limit });
        }

        Ok(Some((self.line_number, &self.buf[..])))
    }
}

/// Removes spaces, tabs, `\r` and `\n` from the start and end of `s`.
fn trim(s: &[u8]) -> &[u8] {
    let is_ws = |b: &u8| matches!(b, b' ' | b'\t' | b'\r' | b'\n');

    let start = s.iter().position(|b| !is_ws(b)).unwrap_or(s.len());
    let end = s.iter().rposition(|b| !is_ws(b)).map(|i| i + 1).unwrap_or(start);
    &s[start..end]
}

/// Parses exactly three whitespace separated floats.
fn parse_vec3(s: &[u8]) -> Option<Vec3> {
    let s = str::from_utf8(s).ok()?;
    let mut numbers = s.split_ascii_whitespace().map(|n| n.parse::<f32>().ok());

    let x = numbers.next()??;
    let y = numbers.next()??;
    let z = numbers.next()??;
    if numbers.next().is_some() {
        return None;
    }

    Some([x, y, z])
}
