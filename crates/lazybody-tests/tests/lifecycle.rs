//! Stream lifecycle and persistence tests.
//!
//! Covers what happens around the decode step: terminal errors being
//! cached, `close()` before and after materialization, raw forwarding
//! through `Read`, writing the payload to disk, and sharing the decoded
//! payload across threads.

use std::fs;
use std::io::{self, Read};
use std::thread;

use insta::assert_snapshot;
use lazybody::{
    ContentEncoding, MaterializeConfig, MaterializeError, RawResponse, ResponseError,
    ResponseMaterializer,
};
use lazybody_tests::{FailingStream, ProbeStream, encoded, response, response_with};

// ── Terminal errors ───────────────────────────────────────────────────────────

#[test]
fn read_failure_is_returned_by_every_later_accessor() {
    let stream = FailingStream::new(b"partial".to_vec(), io::ErrorKind::ConnectionReset);
    let mut resp = response(None, stream);

    let first = resp.content().unwrap_err().to_string();
    assert_snapshot!(first, @"failed to read response body: transport failure");

    assert_eq!(resp.text().unwrap_err().to_string(), first);
    assert_eq!(resp.dynamic_json().unwrap_err().to_string(), first);
    assert!(!resp.is_loaded());
}

#[test]
fn setup_failure_is_cached_without_rereading() {
    let (stream, probe) = ProbeStream::new(b"not gzip".to_vec());
    let mut resp = response(Some("gzip"), stream);

    let err = resp.content().unwrap_err();
    assert_snapshot!(
        err.to_string(),
        @"failed to initialise gzip decoder: invalid gzip magic bytes 0x6e6f, expected 0x1f8b"
    );
    let reads = probe.reads();
    assert!(resp.content().is_err());
    assert_eq!(probe.reads(), reads);
    assert_eq!(probe.closes(), 1);
}

#[test]
fn size_limit_message_names_the_limit() {
    let config = MaterializeConfig::default().max_body_size(8);
    let mut resp = response_with(200, None, &b"more than eight bytes"[..], config);
    assert_snapshot!(
        resp.content().unwrap_err().to_string(),
        @"decoded response body exceeds the 8 byte limit"
    );
}

// ── close() ───────────────────────────────────────────────────────────────────

#[test]
fn close_drains_unread_body_and_is_idempotent() {
    let (stream, probe) = ProbeStream::chunked(vec![b'x'; 1000], 64);
    let mut resp = response(None, stream);

    resp.close().unwrap();
    assert!(probe.reads() > 1000 / 64);
    assert_eq!(probe.closes(), 1);

    resp.close().unwrap();
    assert_eq!(probe.closes(), 1);

    let err = resp.content().unwrap_err();
    assert!(matches!(
        err,
        ResponseError::Materialize(MaterializeError::Closed)
    ));
    assert_snapshot!(err.to_string(), @"response body was closed before it was read");
}

#[test]
fn close_without_drain_releases_immediately() {
    let (stream, probe) = ProbeStream::new(vec![b'x'; 1000]);
    let config = MaterializeConfig::default().drain_on_close(false);
    let mut resp = response_with(200, None, stream, config);

    resp.close().unwrap();
    assert_eq!(probe.reads(), 0);
    assert_eq!(probe.closes(), 1);
}

#[test]
fn close_after_materialize_keeps_the_cache() {
    let (stream, probe) = ProbeStream::new(b"cached".to_vec());
    let mut resp = response(None, stream);

    assert_eq!(resp.content().unwrap(), b"cached");
    resp.close().unwrap();
    resp.close().unwrap();

    assert_eq!(probe.closes(), 1);
    assert_eq!(resp.content().unwrap(), b"cached");
}

#[test]
fn close_after_failed_decode_succeeds() {
    let stream = FailingStream::new(Vec::new(), io::ErrorKind::TimedOut);
    let mut resp = response(None, stream);
    assert!(resp.content().is_err());
    // The stream was released during the failed decode and closed cleanly.
    resp.close().unwrap();
    assert!(resp.content().is_err());
}

// ── Read ──────────────────────────────────────────────────────────────────────

#[test]
fn read_after_load_replays_decoded_payload() {
    let body = encoded(ContentEncoding::Deflate, b"replayed payload");
    let mut resp = response(Some("deflate"), body.as_slice());
    assert_eq!(resp.text().unwrap(), "replayed payload");

    let mut replay = String::new();
    resp.read_to_string(&mut replay).unwrap();
    assert_eq!(replay, "replayed payload");

    // The replay cursor is exhausted; the cache is not.
    assert_eq!(resp.read(&mut [0u8; 16]).unwrap(), 0);
    assert_eq!(resp.content().unwrap(), b"replayed payload");
}

#[test]
fn read_before_load_forwards_the_encoded_stream() {
    let body = encoded(ContentEncoding::Gzip, b"piped elsewhere");
    let mut resp = response(Some("gzip"), body.as_slice());

    let mut piped = Vec::new();
    io::copy(&mut resp, &mut piped).unwrap();
    assert_eq!(piped, body);

    let err = resp.text().unwrap_err();
    assert_snapshot!(
        err.to_string(),
        @"response body was forwarded as a raw stream and cannot be decoded"
    );
}

#[test]
fn forwarded_body_can_feed_another_decoder() {
    let body = encoded(ContentEncoding::Gzip, b"second stage");
    let outer = response(Some("gzip"), body.as_slice());

    let raw = RawResponse::from_parts(200, [("Content-Encoding", "gzip")], outer).unwrap();
    let mut inner = ResponseMaterializer::new(raw);
    assert_eq!(inner.text().unwrap(), "second stage");
}

// ── save_to_file ──────────────────────────────────────────────────────────────

#[test]
fn saved_file_matches_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("body.json");

    let body = encoded(ContentEncoding::Gzip, b"{\"saved\":true}");
    let mut resp = response(Some("gzip"), body.as_slice());
    resp.save_to_file(&path).unwrap();

    assert_eq!(fs::read(&path).unwrap(), resp.content().unwrap());
}

#[test]
fn save_truncates_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("body.txt");
    fs::write(&path, "a much longer previous file body").unwrap();

    let mut resp = response(None, &b"short"[..]);
    resp.save_to_file(&path).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "short");
}

#[test]
fn save_into_missing_directory_is_a_persist_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("body.bin");

    let mut resp = response(None, &b"data"[..]);
    let err = resp.save_to_file(&path).unwrap_err();
    assert!(matches!(
        err,
        ResponseError::Persist { path: ref p, .. } if *p == path
    ));
    // The payload is still cached after a failed write.
    assert_eq!(resp.content().unwrap(), b"data");
}

#[test]
fn failed_decode_leaves_existing_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("keep.txt");
    fs::write(&path, "previous").unwrap();

    let mut resp = response(Some("gzip"), &b"garbage"[..]);
    assert!(matches!(
        resp.save_to_file(&path),
        Err(ResponseError::Materialize(_))
    ));
    assert_eq!(fs::read_to_string(&path).unwrap(), "previous");
}

// ── Sharing and interop ───────────────────────────────────────────────────────

#[test]
fn decoded_bytes_are_shared_across_threads() {
    let mut resp = response(None, &b"shared payload"[..]);
    let payload = resp.payload().unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let payload = payload.clone();
            thread::spawn(move || payload.len())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 14);
    }
    assert_eq!(resp.into_bytes().unwrap(), payload);
}

#[test]
fn builds_from_http_response() {
    let body = encoded(ContentEncoding::Deflate, b"from http");
    let response = lazybody::http::Response::builder()
        .status(201)
        .header("Content-Encoding", "deflate")
        .header("Content-Type", "text/plain")
        .body(io::Cursor::new(body))
        .unwrap();

    let mut resp = ResponseMaterializer::new(RawResponse::from(response));
    assert!(resp.ok());
    assert_eq!(resp.headers()["content-type"], "text/plain");
    assert_eq!(resp.text().unwrap(), "from http");
}
