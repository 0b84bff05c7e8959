#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use lazybody::{ContentEncoding, RawResponse, ResponseMaterializer};
use lazybody_encoding::compression::compress;

#[derive(Arbitrary, Debug)]
enum Coding {
    Identity,
    Gzip,
    Deflate,
}

#[derive(Arbitrary, Debug)]
struct Input {
    coding: Coding,
    payload: Vec<u8>,
    // Read through the Read replay cursor instead of content().
    replay: bool,
}

// Fuzz target: compress→materialize roundtrip.
//
// Compresses an arbitrary payload, materializes it, and asserts the decoded
// bytes match the input exactly.
fuzz_target!(|input: Input| {
    let encoding = match input.coding {
        Coding::Identity => ContentEncoding::Identity,
        Coding::Gzip => ContentEncoding::Gzip,
        Coding::Deflate => ContentEncoding::Deflate,
    };
    let body = compress(encoding, &input.payload).unwrap();

    let raw = RawResponse::from_parts(200, [("Content-Encoding", encoding.as_str())], body.as_slice())
        .unwrap();
    let mut resp = ResponseMaterializer::new(raw);
    assert_eq!(resp.content().unwrap(), input.payload.as_slice());

    if input.replay {
        let mut replayed = Vec::new();
        std::io::Read::read_to_end(&mut resp, &mut replayed).unwrap();
        assert_eq!(replayed, input.payload);
    }
});
