//! Reading binary STL files.

use std::io::Read;

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use log::debug;
use static_assertions::const_assert_eq;

use crate::{algo::normals::rectify_normal, Facet, Vec3};
use super::{Error, ReadOptions, Sink, HEADER_LEN};


/// Size of one facet record: normal and three corners (each three `f32`) plus
/// the two attribute bytes.
pub(super) const RECORD_LEN: usize = 4 * 3 * 4 + 2;

const_assert_eq!(RECORD_LEN, 50);


/// Reads the binary STL data from `reader` into `sink`.
///
/// All numbers are explicitly read as little endian, so this works on any
/// target.
pub(super) fn read(
    mut reader: impl Read,
    options: &ReadOptions,
    sink: &mut impl Sink,
) -> Result<(), Error> {
    // The header has no meaning, but we pass it on unchanged.
    let mut header = [0; HEADER_LEN];
    reader.read_exact(&mut header)?;
    sink.binary_header(&header);

    let num_facets = reader.read_u32::<LittleEndian>()?;
    debug!("binary STL announces {} facets", num_facets);

    // By convention, a file without facets is considered broken.
    if num_facets == 0 {
        return Err(Error::MissingData);
    }

    // Check the limit before reading anything: a corrupted count would
    // otherwise make us work through gigabytes of garbage.
    if num_facets > options.facet_limit {
        return Err(Error::FacetCount {
            count: num_facets.into(),
            limit: options.facet_limit.into(),
        });
    }
    sink.num_facets(num_facets);

    let mut buf = [0; RECORD_LEN];
    for _ in 0..num_facets {
        reader.read_exact(&mut buf)?;

        let vertices = [vec3(&buf[12..]), vec3(&buf[24..]), vec3(&buf[36..])];
        let normal = rectify_normal(vec3(&buf[0..]), vertices, options.normal_tolerance);
        sink.facet(Facet::new(vertices, normal));

        let attribute = LittleEndian::read_u16(&buf[48..]);
        if attribute != 0 {
            sink.facet_attribute(attribute);
        }
    }

    Ok(())
}

/// Reads three consecutive `f32`s.
fn vec3(data: &[u8]) -> Vec3 {
    [
        LittleEndian::read_f32(&data[0..]),
        LittleEndian::read_f32(&data[4..]),
        LittleEndian::read_f32(&data[8..]),
    ]
}
