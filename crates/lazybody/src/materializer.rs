use std::borrow::Cow;
use std::fmt;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use lazybody_encoding::{ContentEncoding, DecodingReader, OpenError};
use log::{debug, trace, warn};
use serde::de::DeserializeOwned;

use crate::body::Body;
use crate::config::MaterializeConfig;
use crate::error::{MaterializeError, ResponseError};
use crate::raw::RawResponse;

/// Lifecycle of the response body.
///
/// ```text
///                 content accessor
///   NotLoaded ─────────────────────────► Loaded { payload }
///      │  │                              (terminal, read-only)
///      │  │     content accessor fails
///      │  └────────────────────────────► Failed(err)
///      │                                 (terminal)
///      │  Read::read                       ▲
///      └──────────► Forwarded ─────────────┘
///                               content accessor
/// ```
///
/// `Loaded` and `Failed` are terminal and mutually exclusive; a cached
/// payload can never coexist with a recorded error.
enum BodyState {
    NotLoaded,
    Forwarded,
    Loaded {
        payload: Bytes,
        /// Position of the `Read` replay cursor inside `payload`.
        replay: usize,
    },
    Failed(MaterializeError),
}

impl BodyState {
    fn label(&self) -> &'static str {
        match self {
            Self::NotLoaded => "not-loaded",
            Self::Forwarded => "forwarded",
            Self::Loaded { .. } => "loaded",
            Self::Failed(_) => "failed",
        }
    }
}

/// Lazily decodes and caches the body of a received HTTP response.
///
/// The first content access reads the body stream to its end, undoes the
/// declared `Content-Encoding`, and caches the result. Every later access
/// is served from the cache without touching the stream. A failure is
/// cached the same way and returned again on every later access.
///
/// ```text
/// ┌────────────────────────────────────────────────────────────────┐
/// │ ResponseMaterializer<B>                                        │
/// │   status, headers      ← immutable, from the RawResponse       │
/// │   encoding             ← detected once at construction         │
/// │   stream: Option<B>    ← None once released                    │
/// │   state: BodyState     ← NotLoaded | Forwarded | Loaded | Failed│
/// └────────────────────────────────────────────────────────────────┘
/// ```
///
/// Content accessors take `&mut self`, so one materializer is used from
/// one place at a time. To share the payload, call [`payload`](Self::payload)
/// and pass the returned [`Bytes`] around; it is `Send + Sync` and cheap
/// to clone.
///
/// # Example
///
/// ```rust
/// use lazybody::{RawResponse, ResponseMaterializer};
/// use lazybody_encoding::ContentEncoding;
/// use lazybody_encoding::compression::compress;
///
/// let body = compress(ContentEncoding::Gzip, br#"{"id":7}"#).unwrap();
/// let raw = RawResponse::from_parts(200, [("Content-Encoding", "gzip")], body.as_slice()).unwrap();
/// let mut response = ResponseMaterializer::new(raw);
///
/// assert!(response.ok());
/// assert_eq!(response.text().unwrap(), r#"{"id":7}"#);
/// assert_eq!(response.dynamic_json().unwrap()["id"], 7);
/// ```
pub struct ResponseMaterializer<B: Body> {
    status: StatusCode,
    headers: HeaderMap,
    encoding: ContentEncoding,
    stream: Option<B>,
    state: BodyState,
    config: MaterializeConfig,
    /// Failure from releasing the stream, reported by the next `close()`.
    release_error: Option<io::Error>,
}

impl<B: Body> ResponseMaterializer<B> {
    /// Wrap a received response using the default [`MaterializeConfig`].
    pub fn new(raw: RawResponse<B>) -> Self {
        Self::with_config(raw, MaterializeConfig::default())
    }

    /// Wrap a received response. Performs no I/O.
    pub fn with_config(raw: RawResponse<B>, config: MaterializeConfig) -> Self {
        let (status, headers, body) = raw.into_parts();
        let encoding = ContentEncoding::from_headers(&headers);
        Self {
            status,
            headers,
            encoding,
            stream: Some(body),
            state: BodyState::NotLoaded,
            config,
            release_error: None,
        }
    }

    /// `true` for a status in `200..400`. Never reads the body.
    #[must_use]
    pub fn ok(&self) -> bool {
        (200..400).contains(&self.status.as_u16())
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The coding detected from `Content-Encoding` at construction.
    #[must_use]
    pub fn content_encoding(&self) -> ContentEncoding {
        self.encoding
    }

    /// `true` once the decoded payload is cached.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self.state, BodyState::Loaded { .. })
    }

    #[must_use]
    pub fn config(&self) -> &MaterializeConfig {
        &self.config
    }

    /// The decoded payload. May be empty.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::Materialize`] if the body could not be
    /// read or decoded, now or on an earlier call.
    pub fn content(&mut self) -> Result<&[u8], ResponseError> {
        Ok(&self.materialize()?[..])
    }

    /// A shared handle to the decoded payload.
    ///
    /// # Errors
    ///
    /// Same as [`content`](Self::content).
    pub fn payload(&mut self) -> Result<Bytes, ResponseError> {
        Ok(self.materialize()?.clone())
    }

    /// Consume the materializer and keep only the decoded payload.
    ///
    /// # Errors
    ///
    /// Same as [`content`](Self::content).
    pub fn into_bytes(mut self) -> Result<Bytes, ResponseError> {
        self.payload()
    }

    /// The decoded payload as text. No charset negotiation is performed.
    ///
    /// # Errors
    ///
    /// - [`ResponseError::Materialize`] if the body could not be decoded.
    /// - [`ResponseError::Text`] if the payload is not UTF-8. The cache
    ///   stays intact for the other accessors.
    pub fn text(&mut self) -> Result<&str, ResponseError> {
        std::str::from_utf8(self.materialize()?).map_err(ResponseError::Text)
    }

    /// The decoded payload as text, replacing invalid UTF-8 sequences.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::Materialize`] if the body could not be
    /// decoded.
    pub fn text_lossy(&mut self) -> Result<Cow<'_, str>, ResponseError> {
        Ok(String::from_utf8_lossy(self.materialize()?))
    }

    /// Deserialize the decoded payload into `T`.
    ///
    /// # Errors
    ///
    /// - [`ResponseError::Materialize`] if the body could not be decoded.
    /// - [`ResponseError::Parse`] if the payload is not valid JSON for `T`.
    ///   The cache stays intact.
    pub fn json<T: DeserializeOwned>(&mut self) -> Result<T, ResponseError> {
        serde_json::from_slice(self.materialize()?).map_err(ResponseError::Parse)
    }

    /// Parse the decoded payload into an untyped JSON value.
    ///
    /// # Errors
    ///
    /// Same as [`json`](Self::json).
    pub fn dynamic_json(&mut self) -> Result<serde_json::Value, ResponseError> {
        self.json()
    }

    /// Write the decoded payload to `path`, creating or truncating it.
    ///
    /// The body is decoded before the file is touched, so a decode failure
    /// leaves an existing file alone. A failed write may leave a partial
    /// file behind.
    ///
    /// # Errors
    ///
    /// - [`ResponseError::Materialize`] if the body could not be decoded.
    /// - [`ResponseError::Persist`] if the file cannot be created or
    ///   written.
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ResponseError> {
        let path = path.as_ref();
        let payload = self.materialize()?;

        let mut file = File::create(path).map_err(|e| persist_error(path, e))?;
        file.write_all(payload)
            .and_then(|()| file.flush())
            .map_err(|e| persist_error(path, e))?;

        debug!("saved {} decoded bytes to {}", payload.len(), path.display());
        Ok(())
    }

    /// Drain and release the body stream.
    ///
    /// Safe to call any number of times. After materialization the stream
    /// is already released and this only reports a deferred release
    /// failure, if there was one. Closing before any content access makes
    /// later content accesses fail with [`MaterializeError::Closed`].
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::Close`] if draining or releasing the stream
    /// failed. If a decode failure was recorded earlier, that error is
    /// returned instead.
    pub fn close(&mut self) -> Result<(), ResponseError> {
        if let Some(mut stream) = self.stream.take() {
            if matches!(self.state, BodyState::NotLoaded) {
                trace!("closing response body before it was read");
                self.state = BodyState::Failed(MaterializeError::Closed);
            }
            let drained = if self.config.drain_on_close {
                io::copy(&mut stream, &mut io::sink()).map(|n| {
                    trace!("drained {n} unread body bytes");
                })
            } else {
                Ok(())
            };
            let closed = stream.close();
            if let Err(e) = drained.and(closed) {
                self.release_error = Some(e);
            }
        }

        let Some(err) = self.release_error.take() else {
            return Ok(());
        };
        match &self.state {
            BodyState::Failed(recorded) if !matches!(recorded, MaterializeError::Closed) => {
                warn!("releasing response body failed after an earlier error: {err}");
                Err(recorded.clone().into())
            }
            _ => Err(ResponseError::Close(err)),
        }
    }

    /// Decode the body on first use, then serve the cache.
    fn materialize(&mut self) -> Result<&Bytes, MaterializeError> {
        match self.state {
            BodyState::Loaded { ref payload, .. } => Ok(payload),
            BodyState::Failed(ref err) => Err(err.clone()),
            BodyState::Forwarded => Err(self.record(MaterializeError::Forwarded)),
            BodyState::NotLoaded => match self.load() {
                Ok(payload) => {
                    self.state = BodyState::Loaded { payload, replay: 0 };
                    self.materialize()
                }
                Err(err) => {
                    debug!("response body failed to materialize: {err}");
                    Err(self.record(err))
                }
            },
        }
    }

    /// Store `err` as the terminal state and hand it back.
    fn record(&mut self, err: MaterializeError) -> MaterializeError {
        self.state = BodyState::Failed(err.clone());
        err
    }

    /// Read the stream to its end through the decoder, then release it.
    fn load(&mut self) -> Result<Bytes, MaterializeError> {
        let Some(mut stream) = self.stream.take() else {
            return Err(MaterializeError::Closed);
        };

        let decoded = decode_all(&mut stream, self.encoding, self.config.max_body_size);
        if let Err(e) = stream.close() {
            warn!("failed to release response body stream: {e}");
            self.release_error = Some(e);
        }

        let payload = Bytes::from(decoded?);
        debug!(
            "materialized {} decoded bytes (content-encoding: {})",
            payload.len(),
            self.encoding
        );
        Ok(payload)
    }
}

/// Read `stream` to exhaustion through the decoder for `encoding`.
fn decode_all<R: Read>(
    stream: R,
    encoding: ContentEncoding,
    limit: usize,
) -> Result<Vec<u8>, MaterializeError> {
    let reader = DecodingReader::open(encoding, stream).map_err(|err| match err {
        OpenError::Io(e) => MaterializeError::read(e),
        OpenError::Setup(source) => MaterializeError::DecodeSetup { encoding, source },
    })?;

    // One byte past the limit is enough to tell "exactly at" from "over".
    let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
    let mut buf = Vec::new();
    reader
        .take(cap)
        .read_to_end(&mut buf)
        .map_err(MaterializeError::read)?;

    if buf.len() > limit {
        return Err(MaterializeError::BodyTooLarge { limit });
    }
    Ok(buf)
}

fn persist_error(path: &Path, source: io::Error) -> ResponseError {
    ResponseError::Persist {
        path: path.to_path_buf(),
        source,
    }
}

/// Generic byte-source view of the response.
///
/// Once the payload is cached, reads replay the decoded payload from its
/// start with a cursor of their own. Before that, reads forward the live,
/// still-encoded stream and mark the materializer as forwarded; the
/// content accessors then fail with [`MaterializeError::Forwarded`] rather
/// than decode a partially consumed stream.
impl<B: Body> Read for ResponseMaterializer<B> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if matches!(self.state, BodyState::NotLoaded) {
            trace!("forwarding raw response body stream");
            self.state = BodyState::Forwarded;
        }

        match &mut self.state {
            BodyState::Loaded { payload, replay } => {
                let remaining = &payload[*replay..];
                let n = remaining.len().min(buf.len());
                buf[..n].copy_from_slice(&remaining[..n]);
                *replay += n;
                Ok(n)
            }
            BodyState::Failed(err) => Err(io::Error::other(err.clone())),
            BodyState::NotLoaded | BodyState::Forwarded => match self.stream.as_mut() {
                Some(stream) => stream.read(buf),
                None => Ok(0),
            },
        }
    }
}

/// A materializer is itself a body, so a forwarded response can be handed
/// to anything that consumes one.
impl<B: Body> Body for ResponseMaterializer<B> {
    fn close(&mut self) -> io::Result<()> {
        ResponseMaterializer::close(self).map_err(io::Error::other)
    }
}

impl<B: Body> Drop for ResponseMaterializer<B> {
    fn drop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.close() {
                warn!("failed to release response body stream on drop: {e}");
            }
        }
    }
}

impl<B: Body> fmt::Debug for ResponseMaterializer<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseMaterializer")
            .field("status", &self.status)
            .field("encoding", &self.encoding)
            .field("state", &self.state.label())
            .field("stream_open", &self.stream.is_some())
            .finish_non_exhaustive()
    }
}
