//! Algorithms working on meshes and facets.

pub mod dedup;
pub mod normals;
