/// eiflow command-line tool: decode, encode and inspect ESB analytics
/// flow payloads.
///
/// # Command overview
///
/// ```text
/// eiflow <COMMAND> [OPTIONS]
///
/// Commands:
///   decode     Run the decompress processor over a JSON array of envelopes
///   encode     Build flow data from a JSON manifest
///   inspect    Print a summary of one flow-data payload
///   schema     Validate and list an output definition
///   tokenize   Split a comma-separated value into entity tokens
///   help       Print help information
///
/// Global options:
///   -v, --verbose        Debug logging
///   --log-json           Structured JSON log lines
///   --config <FILE>      JSON file with `processor` and `log` sections
///   -h, --help           Print help
///   -V, --version        Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                   |
/// |------|-------------------------------------------|
/// | 0    | Success                                   |
/// | 1    | Error (I/O failure, malformed input, etc.) |
///
/// Logs and error details go to stderr so stdout can be piped cleanly.
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eiflow_driver::ProcessorConfig;
use serde::Deserialize;

mod cmd_decode;
mod cmd_encode;
mod cmd_inspect;
mod cmd_schema;
mod cmd_tokenize;
mod logging;

use logging::LogConfig;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// Decode, encode and inspect ESB analytics flow payloads.
#[derive(Parser)]
#[command(name = "eiflow", version, about = "ESB analytics flow decompression CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging (one line per decoded flow).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// JSON configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Run the decompress processor over a JSON array of envelopes.
    Decode(DecodeArgs),
    /// Build flow data from a JSON manifest.
    Encode(EncodeArgs),
    /// Print a summary of one flow-data payload.
    Inspect(InspectArgs),
    /// Validate and list an output definition.
    Schema(SchemaArgs),
    /// Split a comma-separated value into entity tokens.
    Tokenize(TokenizeArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Arguments for `eiflow decode`.
///
/// The input file is a JSON array of envelopes:
///
/// ```json
/// [
///   { "compressed": true, "tenantId": -1234, "messageId": "urn:uuid:1",
///     "flowData": "H4sIAAAA...", "timestamp": 1700000000000 }
/// ]
/// ```
///
/// ```text
/// ┌──────────────┬─────────────────────────────────────────────────────┐
/// │ Flag         │ Effect                                              │
/// ├──────────────┼─────────────────────────────────────────────────────┤
/// │ --definition │ Read the output schema from FILE, not the bundle    │
/// │ --layout     │ Comma-separated names of the event record positions │
/// │ --pretty     │ Print each row as indented JSON                     │
/// └──────────────┴─────────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct DecodeArgs {
    /// Path to the JSON envelope array.
    pub input: PathBuf,

    /// Output definition file.
    #[arg(long)]
    pub definition: Option<PathBuf>,

    /// Comma-separated event layout, e.g. `messageFlowId,host,hashCode`.
    #[arg(long)]
    pub layout: Option<String>,

    /// Pretty-print output rows.
    #[arg(long)]
    pub pretty: bool,
}

/// Arguments for `eiflow encode`.
///
/// The manifest lists the flow's host and its parallel event and payload
/// records:
///
/// ```json
/// {
///   "host": "esb-node-1",
///   "events": [["flow-1", "esb-node-1", "h", "ProxyA"]],
///   "payloads": [{ "beforePayload": "<a/>", "faultCount": 0 }]
/// }
/// ```
///
/// `payloads` may be shorter than `events` or absent; missing records are
/// empty.
#[derive(clap::Args)]
pub struct EncodeArgs {
    /// Path to the JSON manifest.
    pub input: PathBuf,

    /// Compression: `gzip` (default), `zstd` or `none`.
    #[arg(long, default_value = "gzip")]
    pub compress: String,

    /// Write flow data to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for `eiflow inspect`.
#[derive(clap::Args)]
pub struct InspectArgs {
    /// File holding the base64 flow-data text.
    pub file: PathBuf,

    /// The payload is gzip or zstd compressed.
    #[arg(long)]
    pub compressed: bool,
}

/// Arguments for `eiflow schema`.
#[derive(clap::Args)]
pub struct SchemaArgs {
    /// Definition file; the bundled definition when omitted.
    #[arg(long)]
    pub definition: Option<PathBuf>,
}

/// Arguments for `eiflow tokenize`.
#[derive(clap::Args)]
pub struct TokenizeArgs {
    /// Comma-separated entity list.
    pub text: String,
}

// ── Configuration file ────────────────────────────────────────────────────────

/// Contents of `--config`. Both sections are optional.
///
/// ```json
/// { "processor": { "context": "esb-analytics" },
///   "log": { "level": "info", "components": { "eiflow-driver": "debug" } } }
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub processor: ProcessorConfig,
    pub log: LogConfig,
}

fn load_config(path: Option<&Path>) -> Result<CliConfig> {
    let Some(path) = path else {
        return Ok(CliConfig::default());
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e:#}");
            process::exit(1);
        }
    };

    let mut log = config.log;
    if cli.verbose {
        log.level = "debug".to_string();
    }
    log.json |= cli.log_json;
    logging::init_tracing(&log);

    let result = match cli.command {
        Commands::Decode(args) => cmd_decode::run(&args, config.processor),
        Commands::Encode(args) => cmd_encode::run(&args),
        Commands::Inspect(args) => cmd_inspect::run(&args, &config.processor),
        Commands::Schema(args) => cmd_schema::run(&args),
        Commands::Tokenize(args) => cmd_tokenize::run(&args),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}
