//! Reading and writing mesh files.
//!
//! Currently, only STL is supported (see [`stl`]).

pub mod stl;
