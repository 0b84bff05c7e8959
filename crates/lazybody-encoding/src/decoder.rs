use std::io::{self, Chain, Cursor, Read};

use flate2::read::{MultiGzDecoder, ZlibDecoder};

use crate::encoding::ContentEncoding;
use crate::error::EncodingError;

/// Number of leading bytes inspected before a decompressor is built.
///
/// Both gzip (`ID1 ID2`) and zlib (`CMF FLG`) open with a two-byte header
/// that is enough to reject a body that was never compressed.
pub const PREFIX_LEN: usize = 2;

/// gzip member magic, RFC 1952 §2.3.1.
pub const GZIP_MAGIC: [u8; PREFIX_LEN] = [0x1f, 0x8b];

/// zlib compression method 8 = deflate, RFC 1950 §2.2.
const ZLIB_METHOD_DEFLATE: u8 = 8;

/// Largest zlib `CINFO` value (window of 2^(7+8) = 32 KiB).
const ZLIB_MAX_CINFO: u8 = 7;

type Prefixed<R> = Chain<Cursor<[u8; PREFIX_LEN]>, R>;

/// Why [`DecodingReader::open`] failed.
///
/// The two cases are kept apart because callers report them differently:
/// an I/O failure is a broken transport, a setup failure is a body that
/// does not match its declared coding.
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    /// Reading the stream header from the underlying stream failed.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The stream header does not belong to the declared coding.
    #[error(transparent)]
    Setup(#[from] EncodingError),
}

/// A reader that yields the decoded bytes of a response body.
///
/// Built by [`DecodingReader::open`], which reads and validates the stream
/// header up front. Those bytes are chained back in front of the remaining
/// stream, so the decompressor sees the body exactly as it arrived.
///
/// ```text
///   raw stream ──► [2-byte prefix check] ──► Cursor(prefix) ⧺ rest
///                                               │
///                         ┌─────────────────────┼──────────────────┐
///                         ▼                     ▼                  ▼
///                  MultiGzDecoder         ZlibDecoder         (identity)
/// ```
///
/// An empty body decodes to an empty payload under every coding.
pub enum DecodingReader<R> {
    /// The body was empty; every read returns `Ok(0)`.
    Empty,
    Identity(R),
    /// Every gzip member in the body, in order.
    Gzip(MultiGzDecoder<Prefixed<R>>),
    Deflate(ZlibDecoder<Prefixed<R>>),
}

impl<R: Read> DecodingReader<R> {
    /// Wrap `stream` in the decoder for `encoding`.
    ///
    /// For `Identity` no bytes are read. For `Gzip` and `Deflate` the first
    /// [`PREFIX_LEN`] bytes are read and checked.
    ///
    /// # Errors
    ///
    /// - [`OpenError::Io`] if reading the prefix fails.
    /// - [`OpenError::Setup`] if the prefix is truncated or does not match
    ///   the declared coding.
    pub fn open(encoding: ContentEncoding, mut stream: R) -> Result<Self, OpenError> {
        if encoding.is_identity() {
            return Ok(Self::Identity(stream));
        }

        let mut prefix = [0u8; PREFIX_LEN];
        let len = read_prefix(&mut stream, &mut prefix)?;
        if len == 0 {
            return Ok(Self::Empty);
        }
        if len < PREFIX_LEN {
            return Err(EncodingError::TruncatedHeader { encoding, len }.into());
        }

        check_prefix(encoding, prefix)?;
        let chained = Cursor::new(prefix).chain(stream);

        Ok(if encoding == ContentEncoding::Gzip {
            Self::Gzip(MultiGzDecoder::new(chained))
        } else {
            Self::Deflate(ZlibDecoder::new(chained))
        })
    }
}

impl<R: Read> Read for DecodingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Empty => Ok(0),
            Self::Identity(inner) => inner.read(buf),
            Self::Gzip(inner) => inner.read(buf),
            Self::Deflate(inner) => inner.read(buf),
        }
    }
}

/// Validate a complete two-byte stream header against `encoding`.
///
/// # Errors
///
/// Returns the [`EncodingError`] describing the first mismatch found.
pub fn check_prefix(
    encoding: ContentEncoding,
    prefix: [u8; PREFIX_LEN],
) -> Result<(), EncodingError> {
    match encoding {
        ContentEncoding::Identity => Ok(()),
        ContentEncoding::Gzip => {
            if prefix == GZIP_MAGIC {
                Ok(())
            } else {
                Err(EncodingError::InvalidGzipMagic {
                    found: u16::from_be_bytes(prefix),
                })
            }
        }
        ContentEncoding::Deflate => {
            let [cmf, flg] = prefix;
            let method = cmf & 0x0f;
            let cinfo = cmf >> 4;
            if method != ZLIB_METHOD_DEFLATE {
                return Err(EncodingError::InvalidZlibMethod { method });
            }
            if cinfo > ZLIB_MAX_CINFO {
                return Err(EncodingError::InvalidZlibWindow { bits: cinfo + 8 });
            }
            if u16::from_be_bytes(prefix) % 31 != 0 {
                return Err(EncodingError::InvalidZlibChecksum { cmf, flg });
            }
            Ok(())
        }
    }
}

/// Fill `prefix` from `stream`, stopping early only at end of stream.
///
/// Never reads again once the stream has reported end of stream.
fn read_prefix<R: Read>(stream: &mut R, prefix: &mut [u8; PREFIX_LEN]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < PREFIX_LEN {
        match stream.read(&mut prefix[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
