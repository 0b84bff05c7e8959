/// Implementation of `lazybody inspect`.
///
/// Reads a captured body, materializes it with the given status and
/// headers, and prints what the materializer saw. A body that fails to
/// decode is reported as a `✗` diagnostic and exits with code 1.
///
/// # Output format
///
/// ```text
/// Status:   200 (ok)
/// Encoding: gzip
/// Raw:      41 bytes
/// Preview:  1f8b08000000000000ff
/// ✓ Decoded: 21 bytes
/// ```
///
/// ```text
/// ✗ Error: failed to initialise gzip decoder: invalid gzip magic bytes 0x7b22, expected 0x1f8b
/// ```
use std::fs;
use std::io::{self, Write};

use anyhow::{Context, Result, anyhow};
use lazybody::ResponseMaterializer;

use crate::{InspectArgs, input};

/// Number of raw bytes shown in the hex preview.
const PREVIEW_LEN: usize = 16;

/// Run the `lazybody inspect` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the response metadata is
/// invalid, or the body does not decode.
pub fn run(args: &InspectArgs) -> Result<()> {
    let path = &args.response.file;
    let raw = fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    let response = ResponseMaterializer::new(input::build(&args.response, raw.as_slice())?);

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let decoded = inspect(response, &raw, &mut handle).context("cannot write to stdout")?;
    if decoded {
        Ok(())
    } else {
        Err(anyhow!("inspect failed"))
    }
}

/// Writes the report for `response`, whose body is `raw`, to `out`.
/// Returns whether the body decoded.
fn inspect(
    mut response: ResponseMaterializer<&[u8]>,
    raw: &[u8],
    out: &mut impl Write,
) -> io::Result<bool> {
    let status = response.status();
    let verdict = if response.ok() { "ok" } else { "not ok" };
    writeln!(out, "Status:   {} ({verdict})", status.as_u16())?;
    writeln!(out, "Encoding: {}", response.content_encoding())?;
    writeln!(
        out,
        "Raw:      {} byte{}",
        raw.len(),
        if raw.len() == 1 { "" } else { "s" }
    )?;
    if !raw.is_empty() {
        let shown = &raw[..raw.len().min(PREVIEW_LEN)];
        let ellipsis = if raw.len() > PREVIEW_LEN { "…" } else { "" };
        writeln!(out, "Preview:  {}{ellipsis}", hex::encode(shown))?;
    }

    match response.content() {
        Ok(payload) => {
            writeln!(
                out,
                "✓ Decoded: {} byte{}",
                payload.len(),
                if payload.len() == 1 { "" } else { "s" }
            )?;
            Ok(true)
        }
        Err(e) => {
            writeln!(out, "✗ Error: {e}")?;
            Ok(false)
        }
    }
}
