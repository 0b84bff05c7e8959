//! Shared fixtures for the lazybody integration tests and benchmarks.
//!
//! The streams here stand in for a transport's body stream and record what
//! the materializer did to them: how often it read, whether it read past
//! end of stream, and how often it closed the stream.

use std::io::{self, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use lazybody::{Body, ContentEncoding, MaterializeConfig, RawResponse, ResponseMaterializer};
use lazybody_encoding::compression::compress;

/// Counters shared between a [`ProbeStream`] and the test that owns it.
#[derive(Debug, Default)]
pub struct Probe {
    reads: AtomicUsize,
    closes: AtomicUsize,
}

impl Probe {
    /// Number of `read` calls the stream has served.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

/// A body stream that serves its bytes once.
///
/// A strict stream fails any read issued after it has reported end of
/// stream, so a second pass over the body shows up as an error instead of
/// an empty payload. A lenient stream keeps answering `Ok(0)`, for
/// decompressors that may poll the end of stream more than once.
pub struct ProbeStream {
    data: Vec<u8>,
    pos: usize,
    chunk: usize,
    strict: bool,
    exhausted: bool,
    probe: Arc<Probe>,
}

impl ProbeStream {
    pub fn new(data: impl Into<Vec<u8>>) -> (Self, Arc<Probe>) {
        Self::build(data.into(), usize::MAX, true)
    }

    /// Like [`new`](Self::new), but hands out at most `chunk` bytes per read.
    pub fn chunked(data: impl Into<Vec<u8>>, chunk: usize) -> (Self, Arc<Probe>) {
        Self::build(data.into(), chunk, true)
    }

    pub fn lenient(data: impl Into<Vec<u8>>) -> (Self, Arc<Probe>) {
        Self::build(data.into(), usize::MAX, false)
    }

    fn build(data: Vec<u8>, chunk: usize, strict: bool) -> (Self, Arc<Probe>) {
        let probe = Arc::new(Probe::default());
        let stream = Self {
            data,
            pos: 0,
            chunk: chunk.max(1),
            strict,
            exhausted: false,
            probe: Arc::clone(&probe),
        };
        (stream, probe)
    }
}

impl Read for ProbeStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.exhausted && self.strict {
            return Err(io::Error::other("body stream read a second time"));
        }
        self.probe.reads.fetch_add(1, Ordering::SeqCst);

        let n = (self.data.len() - self.pos).min(buf.len()).min(self.chunk);
        if n == 0 && !buf.is_empty() {
            self.exhausted = true;
        }
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl Body for ProbeStream {
    fn close(&mut self) -> io::Result<()> {
        self.probe.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A body stream that delivers `good` bytes and then fails with `kind`.
pub struct FailingStream {
    good: Vec<u8>,
    kind: io::ErrorKind,
}

impl FailingStream {
    pub fn new(good: impl Into<Vec<u8>>, kind: io::ErrorKind) -> Self {
        Self {
            good: good.into(),
            kind,
        }
    }
}

impl Read for FailingStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.good.is_empty() {
            return Err(io::Error::new(self.kind, "transport failure"));
        }
        let n = self.good.len().min(buf.len());
        buf[..n].copy_from_slice(&self.good[..n]);
        self.good.drain(..n);
        Ok(n)
    }
}

impl Body for FailingStream {}

/// Encode `plain` with `encoding`, panicking on encoder failure.
pub fn encoded(encoding: ContentEncoding, plain: &[u8]) -> Vec<u8> {
    compress(encoding, plain).unwrap_or_else(|e| panic!("{encoding} encoding failed: {e}"))
}

/// A `200 OK` materializer over `body` with the given `Content-Encoding`.
///
/// `None` leaves the header out entirely.
pub fn response<B: Body>(content_encoding: Option<&str>, body: B) -> ResponseMaterializer<B> {
    response_with(200, content_encoding, body, MaterializeConfig::default())
}

pub fn response_with<B: Body>(
    status: u16,
    content_encoding: Option<&str>,
    body: B,
    config: MaterializeConfig,
) -> ResponseMaterializer<B> {
    let headers = content_encoding.map(|value| ("Content-Encoding", value));
    let raw = RawResponse::from_parts(status, headers, body)
        .unwrap_or_else(|e| panic!("fixture response is invalid: {e}"));
    ResponseMaterializer::with_config(raw, config)
}
