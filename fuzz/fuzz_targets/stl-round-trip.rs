#![no_main]

use libfuzzer_sys::fuzz_target;
use stlkit::io::stl::{Config, Reader};

fuzz_target!(|data: &[u8]| {
    // Everything we manage to read has to survive a binary round trip
    // unchanged.
    let res = match Reader::from_bytes(data).read() {
        Ok(res) if !res.mesh.facets.is_empty() => res,
        _ => return,
    };

    let out = Config::binary().write_to_memory(&res).expect("writing to memory failed");
    let again = Reader::from_bytes(&out).read().expect("reading written file failed");

    assert_eq!(again.mesh.facets.len(), res.mesh.facets.len());
    for (a, b) in res.mesh.facets.iter().zip(&again.mesh.facets) {
        let bits = |f: &stlkit::Facet| {
            let mut v = vec![];
            for p in std::iter::once(&f.normal).chain(&f.vertices) {
                v.extend(p.iter().map(|c| c.to_bits()));
            }
            v
        };
        assert_eq!(bits(a), bits(b));
    }
});
