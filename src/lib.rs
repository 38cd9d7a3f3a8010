//! Reading and writing STL files.
//!
//! STL files describe a surface as a plain list of triangles ("facets"), each
//! with its own copy of the three corner positions and a face normal. Two
//! encodings exist: a line based ASCII one and a fixed-size binary one. This
//! crate can read and write both:
//!
//! - [`io::stl::Reader`] detects the encoding and streams all data into a
//!   [`io::stl::Sink`] (or collects it into [`io::stl::ReadResults`]),
//! - [`io::stl::Config`] creates a [`io::stl::Writer`] that serializes any
//!   [`io::stl::Source`],
//! - [`algo::dedup::deduplicate_vertices`] turns the triangle soup into an
//!   [`IndexedMesh`] with shared vertices.
//!
//! ```
//! use stlkit::{algo::dedup::deduplicate_vertices, io::stl::Reader};
//!
//! let data = b"solid x
//!     facet normal -1 0 0
//!         outer loop
//!             vertex 0 0 0
//!             vertex 0 0 1
//!             vertex 0 1 1
//!         endloop
//!     endfacet
//! endsolid";
//!
//! let res = Reader::from_bytes(data).read()?;
//! assert_eq!(res.solid_name.as_deref(), Some("x"));
//! assert_eq!(res.mesh.facets.len(), 1);
//!
//! let indexed = deduplicate_vertices(&res.mesh);
//! assert_eq!(indexed.vertices.len(), 3);
//! # Ok::<(), stlkit::io::stl::Error>(())
//! ```

#[cfg(test)]
#[macro_use]
mod test_utils;

pub mod algo;
pub mod io;
mod mesh;

pub use self::mesh::{Facet, IndexedFacet, IndexedMesh, Mesh, Vec3};
