//! Turning a triangle soup into an indexed mesh.

use fxhash::FxHashMap;

use crate::{IndexedFacet, IndexedMesh, Mesh, Vec3};


/// Unifies all corners with exactly the same position into one vertex.
///
/// Corners are visited in facet order (first `v1`, then `v2`, then `v3` of
/// each facet). A corner that is bit-exact equal to an already visited one
/// reuses its index, otherwise it is appended to the vertex list. Facet order
/// and normals are copied as they are.
///
/// Positions are compared by the bit patterns of their components, *not* with
/// some tolerance: two corners that differ in the last bit stay two vertices.
/// This also means that `-0.0` and `0.0` are different positions while a NaN
/// component matches a NaN with the same bit pattern. Thus, no two entries of
/// the resulting vertex list have the same bits.
///
/// Degenerate facets are not treated specially. If two corners of a facet
/// have the same position, the resulting facet references the same vertex
/// twice.
///
/// # Panics
///
/// Panics if the mesh has more than `u32::MAX` distinct corner positions, as
/// those can't be referenced by [`IndexedFacet::vertices`].
pub fn deduplicate_vertices(mesh: &Mesh) -> IndexedMesh {
    // In a well behaved triangle mesh, |V| ≈ |F| / 2. We prepare for slightly
    // more than that to avoid reallocating near the end.
    let expected_vertices = mesh.facets.len() / 2 + mesh.facets.len() / 16;

    let mut vertices = Vec::with_capacity(expected_vertices);
    let mut indices = FxHashMap::with_capacity_and_hasher(expected_vertices, Default::default());

    let mut index_of = |pos: Vec3| -> u32 {
        *indices.entry(key_of(pos)).or_insert_with(|| {
            let idx = next_index(vertices.len());
            vertices.push(pos);
            idx
        })
    };

    let facets = mesh.facets.iter().map(|f| {
        let [a, b, c] = f.vertices;
        IndexedFacet {
            normal: f.normal,
            vertices: [index_of(a), index_of(b), index_of(c)],
        }
    }).collect();

    IndexedMesh { vertices, facets }
}

/// Returns a hash key such that two positions have the same key if and only
/// if they are bit-exact equal.
fn key_of([x, y, z]: Vec3) -> [u32; 3] {
    [x.to_bits(), y.to_bits(), z.to_bits()]
}

/// The index of a vertex appended to a list with `len` entries.
fn next_index(len: usize) -> u32 {
    match u32::try_from(len) {
        Ok(idx) => idx,
        Err(_) => panic!("more than `u32::MAX` distinct vertices can't be indexed"),
    }
}
