/// lazybody command-line tool: inspect, decode, and produce captured HTTP
/// response bodies with the same materializer an HTTP client would use.
///
/// # Command overview
///
/// ```text
/// lazybody <COMMAND> [OPTIONS]
///
/// Commands:
///   inspect    Summarise a captured body: status, coding, sizes, raw preview
///   decode     Materialize a captured body and write the decoded payload
///   encode     Compress a file into a gzip or deflate fixture body
///   help       Print help information
///
/// Global options:
///   -v, --verbose    Log materialization details to stderr
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                      |
/// |------|----------------------------------------------|
/// | 0    | Success                                      |
/// | 1    | Error (I/O failure, undecodable body, etc.)  |
///
/// All error details are written to stderr so stdout can be piped cleanly.
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod cmd_decode;
mod cmd_encode;
mod cmd_inspect;
mod input;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// Decode captured HTTP response bodies.
#[derive(Parser)]
#[command(name = "lazybody", version, about = "HTTP response body materializer CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log materialization details (sets the default log filter to `debug`).
    #[arg(short, long, global = true)]
    verbose: bool,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Summarise a captured response body.
    Inspect(InspectArgs),
    /// Materialize a captured response body and write the decoded payload.
    Decode(DecodeArgs),
    /// Compress a file into a fixture body.
    Encode(EncodeArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// The response metadata that accompanies a captured body file.
///
/// The file holds the body exactly as it came off the wire, still encoded.
/// Headers are given as `Name: value` pairs and may repeat.
#[derive(clap::Args)]
pub struct ResponseArgs {
    /// Path to the captured (still encoded) body.
    pub file: PathBuf,

    /// Response header as `Name: value`, e.g. `--header "Content-Encoding: gzip"`.
    #[arg(short = 'H', long = "header", value_name = "NAME:VALUE")]
    pub headers: Vec<String>,

    /// Response status code.
    #[arg(long, default_value_t = 200)]
    pub status: u16,
}

/// Arguments for `lazybody inspect`.
#[derive(clap::Args)]
pub struct InspectArgs {
    #[command(flatten)]
    pub response: ResponseArgs,
}

/// Arguments for `lazybody decode`.
///
/// ```text
/// ┌───────────────┬───────────────────────────────────────────────────────┐
/// │ Flag          │ Values / default                                      │
/// ├───────────────┼───────────────────────────────────────────────────────┤
/// │ --as          │ bytes (default) | text | json                         │
/// │ -o / --output │ write to file instead of stdout                       │
/// │ --max-size    │ decoded size limit in bytes (default 256 MiB)         │
/// └───────────────┴───────────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct DecodeArgs {
    #[command(flatten)]
    pub response: ResponseArgs,

    /// Output form: `bytes`, `text`, or `json` (pretty-printed).
    #[arg(long = "as", default_value = "bytes")]
    pub output_as: String,

    /// Write the decoded payload to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Largest decoded payload accepted, in bytes.
    #[arg(long)]
    pub max_size: Option<usize>,
}

/// Arguments for `lazybody encode`.
#[derive(clap::Args)]
pub struct EncodeArgs {
    /// File holding the plain payload.
    pub input: PathBuf,

    /// Content coding to apply: `gzip` or `deflate`.
    #[arg(short, long)]
    pub encoding: String,

    /// Output path for the encoded body.
    #[arg(short, long)]
    pub output: PathBuf,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let result = match cli.command {
        Commands::Inspect(args) => cmd_inspect::run(&args),
        Commands::Decode(args) => cmd_decode::run(&args),
        Commands::Encode(args) => cmd_encode::run(&args),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}
