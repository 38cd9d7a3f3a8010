/// Three `f32` components (x, y, z). Used for positions and normals alike.
pub type Vec3 = [f32; 3];

/// One triangle of a triangle soup.
///
/// Each facet stores its own copy of the three corner positions. Adjacent
/// facets thus store shared corners multiple times.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Facet {
    /// Face normal.
    pub normal: Vec3,

    /// The 3D positions of the corners in CCW order (that is, when looking at
    /// the face "from the outside").
    pub vertices: [Vec3; 3],
}

impl Facet {
    pub fn new(vertices: [Vec3; 3], normal: Vec3) -> Self {
        Self { normal, vertices }
    }
}

/// A triangle soup: the facets in the order they were encountered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub facets: Vec<Facet>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }
}

impl From<Vec<Facet>> for Mesh {
    fn from(facets: Vec<Facet>) -> Self {
        Self { facets }
    }
}

/// A facet referencing its corners by index into [`IndexedMesh::vertices`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedFacet {
    pub normal: Vec3,

    /// Indices into the vertex list. Limits a mesh to `u32::MAX` distinct
    /// vertices.
    pub vertices: [u32; 3],
}

/// A mesh with a shared vertex list.
///
/// No two entries in `vertices` have the same bit pattern and every index in
/// `facets` is a valid offset into `vertices`.
/// Obtained via [`deduplicate_vertices`][crate::algo::dedup::deduplicate_vertices].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexedMesh {
    pub vertices: Vec<Vec3>,
    pub facets: Vec<IndexedFacet>,
}

impl IndexedMesh {
    /// Returns the positions of the three corners of the given facet.
    ///
    /// Panics if the facet references out of bounds vertices, which cannot
    /// happen for meshes created by this crate.
    pub fn corners_of(&self, facet: &IndexedFacet) -> [Vec3; 3] {
        let [a, b, c] = facet.vertices;
        [
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ]
    }

    /// Converts this mesh back into a triangle soup.
    pub fn to_mesh(&self) -> Mesh {
        self.facets.iter()
            .map(|f| Facet::new(self.corners_of(f), f.normal))
            .collect::<Vec<_>>()
            .into()
    }
}
