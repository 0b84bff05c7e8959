/// Implementation of `lazybody encode`.
///
/// Compresses a plain file with the named content coding, producing a body
/// that `lazybody decode --header "Content-Encoding: <coding>"` turns back
/// into the original bytes.
///
/// ```text
/// ┌──────────┬────────────────────────────────────────────┐
/// │ Coding   │ Output                                     │
/// ├──────────┼────────────────────────────────────────────┤
/// │ gzip     │ RFC 1952 stream, starts 1f 8b              │
/// │ deflate  │ zlib-wrapped RFC 1950 stream, starts 78 9c │
/// │ identity │ verbatim copy                              │
/// └──────────┴────────────────────────────────────────────┘
/// ```
use std::fs;

use anyhow::{Context, Result};
use lazybody::ContentEncoding;
use lazybody_encoding::compression::compress;

use crate::EncodeArgs;

/// Run the `lazybody encode` command.
///
/// # Errors
///
/// Returns an error if the coding name is unknown, the input cannot be
/// read, or the output cannot be written.
pub fn run(args: &EncodeArgs) -> Result<()> {
    let encoding: ContentEncoding = args
        .encoding
        .parse()
        .with_context(|| format!("invalid --encoding {:?}", args.encoding))?;

    let plain = fs::read(&args.input)
        .with_context(|| format!("cannot read {}", args.input.display()))?;
    let body = compress(encoding, &plain).with_context(|| format!("{encoding} encoding failed"))?;

    fs::write(&args.output, &body)
        .with_context(|| format!("cannot write {}", args.output.display()))?;

    println!(
        "Encoded {} -> {} ({encoding}, {} -> {} bytes)",
        args.input.display(),
        args.output.display(),
        plain.len(),
        body.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_file_starts_with_coding_header() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("plain.txt");
        let output = dir.path().join("plain.txt.gz");
        fs::write(&input, "fixture body ".repeat(20)).unwrap();

        run(&EncodeArgs {
            input,
            encoding: "GZIP".to_string(),
            output: output.clone(),
        })
        .unwrap();

        assert_eq!(&fs::read(&output).unwrap()[..2], &[0x1f, 0x8b]);
    }

    #[test]
    fn unknown_coding_is_rejected_before_io() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(&EncodeArgs {
            input: dir.path().join("missing.txt"),
            encoding: "br".to_string(),
            output: dir.path().join("out"),
        })
        .unwrap_err();
        assert!(format!("{err:#}").starts_with("invalid --encoding \"br\""));
    }
}
