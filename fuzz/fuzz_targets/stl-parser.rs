#![no_main]

use libfuzzer_sys::fuzz_target;
use stlkit::io::stl::{CounterSink, ReadOptions, Reader};

fuzz_target!(|data: &[u8]| {
    // We just pass the data to the parsing function and ignore all parsed
    // data. We are just interested in panics or other even worse crashes. So
    // we also ignore the returned `Result` as it's fine if the parser says
    // "this is not a valid STL file".
    let _ = Reader::from_bytes(data).read_raw_into(&mut CounterSink::new());

    // Tiny limits hit the error paths more often.
    let options = ReadOptions { line_limit: 16, facet_limit: 4, ..ReadOptions::default() };
    let _ = Reader::from_bytes(data).with_options(options).read_raw_into(&mut CounterSink::new());
});
