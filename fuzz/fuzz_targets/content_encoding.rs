#![no_main]

use libfuzzer_sys::fuzz_target;
use lazybody_encoding::ContentEncoding;

// Fuzz target: Content-Encoding token detection and strict name parsing.
//
// Every token maps to some coding. A canonical name accepted by strict
// parsing maps to the same coding as header detection.
fuzz_target!(|data: &[u8]| {
    let Ok(token) = std::str::from_utf8(data) else {
        return;
    };

    let detected = ContentEncoding::from_token(token);
    assert_eq!(ContentEncoding::from_token(detected.as_str()), detected);

    // Aliases such as "zlib" are CLI-only and not honoured in headers.
    if let Ok(parsed) = token.parse::<ContentEncoding>() {
        if token.trim().eq_ignore_ascii_case(parsed.as_str()) {
            assert_eq!(parsed, detected);
        }
    }
});
