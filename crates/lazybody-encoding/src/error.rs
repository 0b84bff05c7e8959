use crate::encoding::ContentEncoding;

/// Errors raised while setting up a decompressing reader.
///
/// Every variant describes a body whose first bytes cannot belong to the
/// declared `Content-Encoding`. They are detected before any payload byte is
/// decompressed, so a caller can tell "this was never gzip" apart from "the
/// gzip stream broke halfway through".
///
/// ```text
///   EncodingError
///   ├── TruncatedHeader      ← body ended inside the 2-byte stream header
///   ├── InvalidGzipMagic     ← first two bytes are not 1f 8b
///   ├── InvalidZlibMethod    ← CMF low nibble is not 8 (deflate)
///   ├── InvalidZlibWindow    ← CMF high nibble asks for a window > 32 KiB
///   ├── InvalidZlibChecksum  ← (CMF << 8 | FLG) is not a multiple of 31
///   └── UnknownEncoding      ← a name outside gzip / deflate / identity
/// ```
///
/// The error is `Clone` so a recorded failure can be handed out again on
/// every later access without re-reading the stream.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    /// The body ended after `len` bytes, before the stream header was complete.
    #[error("{encoding} body ended after {len} byte(s), inside the stream header")]
    TruncatedHeader {
        encoding: ContentEncoding,
        len: usize,
    },

    #[error("invalid gzip magic bytes {found:#06x}, expected 0x1f8b")]
    InvalidGzipMagic { found: u16 },

    #[error("unsupported zlib compression method {method}, expected 8 (deflate)")]
    InvalidZlibMethod { method: u8 },

    #[error("zlib window size 2^{bits} exceeds the 32 KiB maximum")]
    InvalidZlibWindow { bits: u8 },

    #[error("zlib header check failed for CMF={cmf:#04x} FLG={flg:#04x}")]
    InvalidZlibChecksum { cmf: u8, flg: u8 },

    /// Returned by `ContentEncoding::from_str` for names outside the fixed table.
    #[error("unknown content encoding {0:?}, expected gzip, deflate or identity")]
    UnknownEncoding(String),
}
