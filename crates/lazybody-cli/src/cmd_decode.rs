/// Implementation of `lazybody decode`.
///
/// Materializes a captured body and writes the decoded payload to stdout or
/// to `-o <file>`.
///
/// ```text
/// ┌───────┬────────────────────────────────────────────────────────────────┐
/// │ --as  │ Output                                                         │
/// ├───────┼────────────────────────────────────────────────────────────────┤
/// │ bytes │ decoded payload verbatim (default); `-o` uses save_to_file     │
/// │ text  │ payload checked as UTF-8, newline-terminated on stdout         │
/// │ json  │ payload parsed as JSON and pretty-printed                      │
/// └───────┴────────────────────────────────────────────────────────────────┘
/// ```
use std::fs;
use std::io::{self, Write as _};

use anyhow::{Context, Result, anyhow};
use lazybody::{Body, MaterializeConfig, ResponseMaterializer};
use log::debug;

use crate::{DecodeArgs, input};

/// What `--as` selects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OutputAs {
    Bytes,
    Text,
    Json,
}

/// Run the `lazybody decode` command.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, the flags are invalid,
/// the body does not decode into the requested form, or the output cannot
/// be written.
pub fn run(args: &DecodeArgs) -> Result<()> {
    let raw = input::open(&args.response)?;
    let mut response = ResponseMaterializer::with_config(raw, config(args));
    let output_as = parse_output_as(&args.output_as)?;

    let rendered = render(&mut response, output_as, args)?;
    response
        .close()
        .with_context(|| format!("cannot release {}", args.response.file.display()))?;
    let Some(rendered) = rendered else {
        return Ok(());
    };

    if let Some(path) = &args.output {
        fs::write(path, &rendered).with_context(|| format!("cannot write {}", path.display()))?;
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(&rendered)
            .context("cannot write to stdout")?;
        if output_as != OutputAs::Bytes && !rendered.ends_with(b"\n") {
            handle.write_all(b"\n").context("cannot write to stdout")?;
        }
    }
    Ok(())
}

fn config(args: &DecodeArgs) -> MaterializeConfig {
    let config = MaterializeConfig::default();
    match args.max_size {
        Some(limit) => config.max_body_size(limit),
        None => config,
    }
}

/// Produces the bytes to write for `output_as`.
///
/// Returns `None` when the payload was already persisted through
/// [`ResponseMaterializer::save_to_file`].
fn render<B: Body>(
    response: &mut ResponseMaterializer<B>,
    output_as: OutputAs,
    args: &DecodeArgs,
) -> Result<Option<Vec<u8>>> {
    let source = args.response.file.display();
    match output_as {
        OutputAs::Bytes => {
            if let Some(path) = &args.output {
                response
                    .save_to_file(path)
                    .with_context(|| format!("failed to decode {source}"))?;
                debug!("wrote decoded payload of {source} to {}", path.display());
                return Ok(None);
            }
            let payload = response
                .content()
                .with_context(|| format!("failed to decode {source}"))?;
            Ok(Some(payload.to_vec()))
        }
        OutputAs::Text => {
            let text = response
                .text()
                .with_context(|| format!("failed to decode {source}"))?;
            Ok(Some(text.as_bytes().to_vec()))
        }
        OutputAs::Json => {
            let value = response
                .dynamic_json()
                .with_context(|| format!("failed to decode {source}"))?;
            let pretty = serde_json::to_vec_pretty(&value).context("cannot render JSON")?;
            Ok(Some(pretty))
        }
    }
}

/// Parses the `--as` string to an [`OutputAs`].
///
/// # Errors
///
/// Returns an error for unrecognised names.
fn parse_output_as(s: &str) -> Result<OutputAs> {
    match s.to_lowercase().as_str() {
        "bytes" | "raw" => Ok(OutputAs::Bytes),
        "text" => Ok(OutputAs::Text),
        "json" => Ok(OutputAs::Json),
        _ => Err(anyhow!("unknown output form {s:?}, expected bytes|text|json")),
    }
}
