//! kvframe CLI
//!
//! Builds and inspects raw protocol messages.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use kvframe::protocol::{read_message_with, OpCode, OpFlags, ShardId, Status};
use kvframe::{CodecConfig, FrameError, Message, MessageDecoder, MessageEncoder, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// kvframe CLI
#[derive(Parser, Debug)]
#[command(name = "kvframe")]
#[command(about = "Encode and decode key-value protocol messages")]
#[command(version)]
struct Args {
    /// Component alignment in bytes
    #[arg(long, default_value = "8", global = true)]
    alignment: usize,

    /// Maximum message size in bytes
    #[arg(long, default_value = "16777216", global = true)]
    max_message_size: u32,

    /// Reject components with unrecognized tags
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a message and print it as hex (or write raw bytes to a file)
    Encode {
        /// Operation code
        #[arg(long, default_value = "0")]
        opcode: u8,

        /// Target shard (requests)
        #[arg(long, default_value = "0", conflicts_with = "status")]
        shard: u16,

        /// Status code; builds a response instead of a request
        #[arg(long)]
        status: Option<u16>,

        /// Correlation id
        #[arg(long, default_value = "0")]
        opaque: u32,

        /// Record namespace
        #[arg(long)]
        namespace: Option<String>,

        /// Record key
        #[arg(long)]
        key: Option<String>,

        /// Record value
        #[arg(long, default_value = "")]
        value: String,

        /// Set the replication flag
        #[arg(long)]
        replication: bool,

        /// Set the mark-delete flag
        #[arg(long)]
        mark_delete: bool,

        /// Set the delete-replication flags
        #[arg(long)]
        delete_replication: bool,

        /// Expect no response (requests only)
        #[arg(long, conflicts_with = "status")]
        one_way: bool,

        /// Write raw bytes here instead of printing hex
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Decode a message and print its fields
    Decode {
        /// File holding one raw message
        #[arg(required_unless_present = "hex", conflicts_with = "hex")]
        file: Option<PathBuf>,

        /// Message as a hex string
        #[arg(long)]
        hex: Option<String>,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kvframe=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = CodecConfig::builder()
        .component_alignment(args.alignment)
        .max_message_size(args.max_message_size)
        .reject_unknown_components(args.strict)
        .build()?;

    match args.command {
        Commands::Encode {
            opcode,
            shard,
            status,
            opaque,
            namespace,
            key,
            value,
            replication,
            mark_delete,
            delete_replication,
            one_way,
            out,
        } => {
            let mut flags = OpFlags::empty();
            if replication {
                flags.set_replication();
            }
            if mark_delete {
                flags.set_mark_delete();
            }
            if delete_replication {
                flags.set_delete_replication();
            }

            let request = Message::request(OpCode(opcode), ShardId(shard)).with_opaque(opaque);
            let mut message = match status {
                Some(code) => Message::response_to(&request, Status(code)),
                None if one_way => request.one_way(),
                None => request,
            }
            .with_flags(flags);

            if namespace.is_some() || key.is_some() {
                message = message.with_payload(
                    namespace.unwrap_or_default().into_bytes(),
                    key.unwrap_or_default().into_bytes(),
                    value.into_bytes(),
                );
            }

            let bytes = MessageEncoder::new(config).encode(&message)?;
            tracing::debug!("Encoded {} bytes", bytes.len());

            match out {
                Some(path) => fs::write(&path, &bytes)?,
                None => println!("{}", hex::encode(&bytes)),
            }
        }

        Commands::Decode { file, hex } => {
            let message = match (file, hex) {
                (_, Some(text)) => {
                    let bytes = hex::decode(text.trim())
                        .map_err(|e| FrameError::Malformed(format!("invalid hex input: {}", e)))?;
                    MessageDecoder::new(config).decode(bytes.into())?
                }
                (Some(path), None) => {
                    let mut reader = fs::File::open(&path)?;
                    read_message_with(&mut reader, &config)?
                }
                (None, None) => {
                    return Err(FrameError::Config("decode needs a file or --hex".to_string()))
                }
            };

            println!("{}", message);
        }
    }

    Ok(())
}
