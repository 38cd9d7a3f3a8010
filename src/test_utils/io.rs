use std::fmt::Write;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::{io::stl::HEADER_LEN, Vec3};


/// Panics with a readable comparison of both byte strings. The actual data is
/// dumped into `dump.stl` so that it can be inspected with other tools.
pub(crate) fn file_failure(actual: &[u8], expected: &[u8], filename: &str) {
    let mut msg = String::new();

    writeln!(msg, "===== Expected data ('{}')", filename).unwrap();
    write_data(&mut msg, expected);
    writeln!(msg).unwrap();

    writeln!(msg, "===== Actual data (written to 'dump.stl')").unwrap();
    std::fs::write("dump.stl", actual).expect("failed to dump actual data");
    write_data(&mut msg, actual);

    panic!("assertion failed: \n{}", msg);

    fn write_data(msg: &mut String, data: &[u8]) {
        match std::str::from_utf8(data) {
            Ok(s) if !data.contains(&0) => writeln!(msg, "{}", s).unwrap(),
            _ => {
                for chunk in data.chunks(32) {
                    for b in chunk {
                        write!(msg, "{:02x} ", b).unwrap();
                    }
                    writeln!(msg).unwrap();
                }
            }
        }
    }
}

/// Builds binary STL data by hand: the header, `count` as facet count and one
/// record per entry of `records` (normal, corners, attribute). `count` may
/// differ from the number of records to simulate broken files.
pub(crate) fn binary_stl(
    header: &[u8; HEADER_LEN],
    count: u32,
    records: &[(Vec3, [Vec3; 3], u16)],
) -> Vec<u8> {
    let mut out = header.to_vec();
    out.write_u32::<LittleEndian>(count).unwrap();
    for (normal, corners, attribute) in records {
        for v in std::iter::once(normal).chain(corners) {
            for &c in v {
                out.write_f32::<LittleEndian>(c).unwrap();
            }
        }
        out.write_u16::<LittleEndian>(*attribute).unwrap();
    }
    out
}

macro_rules! assert_eq_file {
    ($actual:expr, $filename:expr) => {
        let actual = $actual as &[u8];
        let expected = include_bytes!(concat!("test_files/", $filename)) as &[u8];
        if actual != expected {
            crate::test_utils::io::file_failure(actual, expected, $filename);
        }
    }
}

macro_rules! include_test_file {
    ($filename:expr) => {{
        let bytes = include_bytes!(concat!("test_files/", $filename)) as &[u8];
        std::io::Cursor::new(bytes)
    }}
}
