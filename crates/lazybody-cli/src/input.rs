use std::fs::File;

use anyhow::{Context, Result, anyhow};
use lazybody::RawResponse;

use crate::ResponseArgs;

/// Splits a `--header` argument of the form `Name: value`.
///
/// Whitespace around both halves is trimmed; the value may be empty.
///
/// # Errors
///
/// Returns an error if there is no `:` or the name is empty.
pub fn parse_header(arg: &str) -> Result<(&str, &str)> {
    let (name, value) = arg
        .split_once(':')
        .ok_or_else(|| anyhow!("header {arg:?} is not of the form NAME:VALUE"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("header {arg:?} has an empty name"));
    }
    Ok((name, value.trim()))
}

/// Opens the captured body and pairs it with the given status and headers.
///
/// # Errors
///
/// Returns an error if a header argument is malformed, the status or a
/// header is rejected, or the file cannot be opened.
pub fn open(args: &ResponseArgs) -> Result<RawResponse<File>> {
    let file = File::open(&args.file)
        .with_context(|| format!("cannot open {}", args.file.display()))?;
    build(args, file)
}

/// Pairs an already opened body with the status and headers in `args`.
///
/// # Errors
///
/// Same as [`open`], minus the file error.
pub fn build<B: lazybody::Body>(args: &ResponseArgs, body: B) -> Result<RawResponse<B>> {
    let headers = args
        .headers
        .iter()
        .map(|h| parse_header(h))
        .collect::<Result<Vec<_>>>()?;
    RawResponse::from_parts(args.status, headers, body).context("invalid response metadata")
}
