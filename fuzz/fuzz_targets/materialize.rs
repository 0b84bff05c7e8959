#![no_main]

use libfuzzer_sys::fuzz_target;
use lazybody::{MaterializeConfig, RawResponse, ResponseMaterializer};

// Fuzz target: ResponseMaterializer over arbitrary wire bytes.
//
// Input format:
//   byte 0: selects the declared Content-Encoding (identity, gzip, deflate)
//   bytes 1..: the still-encoded body
//
// Catches bugs in:
// - Prefix validation for gzip and zlib headers
// - Truncated or corrupt compressed streams
// - Decoded size limit enforcement
// - Cached error replay across accessors
fuzz_target!(|data: &[u8]| {
    let Some((&selector, body)) = data.split_first() else {
        return;
    };
    let coding = match selector % 3 {
        0 => "identity",
        1 => "gzip",
        _ => "deflate",
    };

    let raw = RawResponse::from_parts(200, [("Content-Encoding", coding)], body).unwrap();
    let config = MaterializeConfig::default().max_body_size(1 << 20);
    let mut resp = ResponseMaterializer::with_config(raw, config);

    let first = resp.content().map(<[u8]>::to_vec).map_err(|e| e.to_string());
    let second = resp.content().map(<[u8]>::to_vec).map_err(|e| e.to_string());
    assert_eq!(first, second);
    if let Ok(payload) = &first {
        assert!(payload.len() <= 1 << 20);
        if coding == "identity" {
            assert_eq!(payload.as_slice(), body);
        }
    }
    let _ = resp.close();
});
