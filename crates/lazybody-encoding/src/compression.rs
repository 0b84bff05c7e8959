use std::io::{self, Write};

use flate2::Compression;
use flate2::write::{GzEncoder, ZlibEncoder};

use crate::encoding::ContentEncoding;

/// Compress `data` the way a server would before sending it with
/// `Content-Encoding: <encoding>`.
///
/// `Identity` copies the input unchanged. Used to build fixture bodies for
/// tests, benchmarks and the `lazybody encode` command.
///
/// # Example
///
/// ```rust
/// use lazybody_encoding::ContentEncoding;
/// use lazybody_encoding::compression::compress;
///
/// let body = compress(ContentEncoding::Gzip, b"hello").unwrap();
/// assert_eq!(&body[..2], &[0x1f, 0x8b]);
/// ```
///
/// # Errors
///
/// Returns the encoder's I/O error; writing into a `Vec` does not fail in
/// practice.
pub fn compress(encoding: ContentEncoding, data: &[u8]) -> io::Result<Vec<u8>> {
    match encoding {
        ContentEncoding::Identity => Ok(data.to_vec()),
        ContentEncoding::Gzip => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(data)?;
            encoder.finish()
        }
        ContentEncoding::Deflate => {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(data)?;
            encoder.finish()
        }
    }
}
