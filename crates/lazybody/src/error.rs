use std::io;
use std::path::PathBuf;
use std::str::Utf8Error;
use std::sync::Arc;

use lazybody_encoding::{ContentEncoding, EncodingError};

/// Errors raised while building a [`RawResponse`](crate::RawResponse).
///
/// These are the only failures possible before any byte is read.
#[derive(Debug, thiserror::Error)]
pub enum ConstructionError {
    #[error("invalid status code {0}, expected 100..=999")]
    InvalidStatus(u16),

    #[error("invalid header name {name:?}")]
    InvalidHeaderName { name: String },

    #[error("invalid value for header {name:?}")]
    InvalidHeaderValue { name: String },
}

/// Terminal failures of the decode step.
///
/// Once one of these is recorded, every later content access returns a
/// clone of it without touching the stream again. The I/O error is held in
/// an [`Arc`] so the error stays `Clone`.
///
/// ```text
///   MaterializeError
///   ├── DecodeSetup    ← body does not start like its declared coding
///   ├── Read           ← I/O or decompression failure while draining
///   ├── BodyTooLarge   ← decoded payload passed max_body_size
///   ├── Forwarded      ← raw bytes were already handed out via Read
///   └── Closed         ← close() ran before the body was loaded
/// ```
#[derive(Clone, Debug, thiserror::Error)]
pub enum MaterializeError {
    #[error("failed to initialise {encoding} decoder: {source}")]
    DecodeSetup {
        encoding: ContentEncoding,
        #[source]
        source: EncodingError,
    },

    #[error("failed to read response body: {0}")]
    Read(#[source] Arc<io::Error>),

    #[error("decoded response body exceeds the {limit} byte limit")]
    BodyTooLarge { limit: usize },

    /// The undecoded stream was forwarded through `Read` before any
    /// content accessor ran, so the full payload can no longer be decoded.
    #[error("response body was forwarded as a raw stream and cannot be decoded")]
    Forwarded,

    #[error("response body was closed before it was read")]
    Closed,
}

impl MaterializeError {
    pub(crate) fn read(err: io::Error) -> Self {
        Self::Read(Arc::new(err))
    }
}

/// Errors returned by the content accessors of
/// [`ResponseMaterializer`](crate::ResponseMaterializer).
///
/// `Materialize` is the only variant tied to the stream. The other variants
/// come from one accessor's view of an already cached payload and leave
/// the cache usable by every other accessor.
///
/// ```text
/// ┌─────────────┬──────────────────────────────┬───────────────────────┐
/// │ Variant     │ Raised by                    │ Cache afterwards      │
/// ├─────────────┼──────────────────────────────┼───────────────────────┤
/// │ Materialize │ any content accessor         │ never populated       │
/// │ Text        │ text()                       │ intact                │
/// │ Parse       │ json() / dynamic_json()      │ intact                │
/// │ Persist     │ save_to_file()               │ intact                │
/// │ Close       │ close()                      │ unchanged             │
/// └─────────────┴──────────────────────────────┴───────────────────────┘
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    #[error(transparent)]
    Materialize(#[from] MaterializeError),

    #[error("response body is not valid UTF-8: {0}")]
    Text(#[source] Utf8Error),

    #[error("response body is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("failed to write response body to {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to release response body: {0}")]
    Close(#[source] io::Error),
}
