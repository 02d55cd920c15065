//! `ldn`: inspect JSON-LD blocks from the command line.
//!
//! - **`resolve`**: print the value at a path.
//! - **`link`**: print the CID of the link at a path.
//! - **`flatten`**: print the flattened node graph.
//! - **`cid`**: print the CID of the canonical block encoding.
//! - **`tree`**: list every addressable path.
//!
//! All subcommands read JSON from a file path or from stdin (`-`). Paths are
//! `/`-separated; empty segments are ignored, so `/a//b/` is `a/b`.
//!
//! Log output goes to stderr and is controlled by `RUST_LOG`
//! (default `ldnode=warn`).

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use ldnode::codec::decode_document;
use ldnode::document::CONTEXT;
use ldnode::{Block, Document, Node, Resolver, ResolverConfig};

/// ldn: JSON-LD block inspector
#[derive(Parser)]
#[command(name = "ldn", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: FlattenArgs,

    #[command(subcommand)]
    command: Command,
}

/// Overrides for the `LDNODE_*` environment settings.
#[derive(Args)]
struct FlattenArgs {
    /// Base IRI joined onto relative node ids while flattening.
    #[arg(long, global = true, value_name = "IRI")]
    base: Option<String>,

    /// Prefix for generated blank node ids.
    #[arg(long, global = true, value_name = "PREFIX")]
    blank_prefix: Option<String>,

    /// Emit flattened nodes sorted by id.
    #[arg(long, global = true)]
    ordered: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Print the value found at PATH as JSON.
    ///
    /// If the walk stops at a link, the link is printed and the rest of the
    /// path is reported on stderr.
    Resolve {
        /// Path to a JSON-LD file, or `-` for stdin.
        file: PathBuf,
        /// `/`-separated path inside the document.
        path: String,
    },

    /// Print the CID of the link at PATH.
    ///
    /// Exits 1 if PATH does not lead to a link.
    Link {
        /// Path to a JSON-LD file, or `-` for stdin.
        file: PathBuf,
        /// `/`-separated path inside the document.
        path: String,
    },

    /// Print the flattened form of the document.
    Flatten {
        /// Path to a JSON-LD file, or `-` for stdin.
        file: PathBuf,
    },

    /// Print the CID of the document's canonical block encoding.
    Cid {
        /// Path to a JSON-LD file, or `-` for stdin.
        file: PathBuf,
    },

    /// List the addressable paths in the document.
    Tree {
        /// Path to a JSON-LD file, or `-` for stdin.
        file: PathBuf,
        /// Only list paths below this `/`-separated prefix.
        #[arg(long, default_value = "")]
        path: String,
        /// How many segments deep to list.
        #[arg(long, value_name = "N")]
        depth: Option<usize>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ldnode=warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let resolver = Resolver::new(config(cli.settings));

    match cli.command {
        Command::Resolve { file, path } => {
            let doc = read_document(&file);
            let resolution = resolver
                .resolve(&doc, &segments(&path)[..])
                .unwrap_or_else(|e| fail(&e));
            print_json(&resolution.value);
            if !resolution.is_complete() {
                eprintln!("ldn: remaining path: {}", resolution.remaining.join("/"));
            }
        }

        Command::Link { file, path } => {
            let doc = read_document(&file);
            let (cid, remaining) = resolver
                .resolve_link(&doc, &segments(&path)[..])
                .unwrap_or_else(|e| fail(&e));
            println!("{cid}");
            if !remaining.is_empty() {
                eprintln!("ldn: remaining path: {}", remaining.join("/"));
            }
        }

        Command::Flatten { file } => {
            let doc = read_document(&file);
            let flattened = resolver
                .flatten(&doc, doc.get(CONTEXT))
                .unwrap_or_else(|e| fail(&e));
            print_json(&flattened);
        }

        Command::Cid { file } => {
            let doc = read_document(&file);
            let block = Block::encode(&doc).unwrap_or_else(|e| fatal(&e.to_string()));
            println!("{}", block.cid);
        }

        Command::Tree { file, path, depth } => {
            let doc = read_document(&file);
            let node = Node::from_document(doc).unwrap_or_else(|e| fatal(&e.to_string()));
            for entry in node.tree(&segments(&path)[..], depth) {
                println!("{entry}");
            }
        }
    }
}

/// Environment settings first, then any flags given on the command line.
fn config(args: FlattenArgs) -> ResolverConfig {
    let mut config = ResolverConfig::from_env();
    if let Some(base) = args.base {
        config.flatten.base = Some(base);
    }
    if let Some(prefix) = args.blank_prefix {
        config.flatten.blank_node_prefix = prefix;
    }
    if args.ordered {
        config.flatten.ordered = true;
    }
    config
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Read and decode a file, or stdin when the path is `"-"`.
fn read_document(path: &Path) -> Document {
    let bytes = if path.to_str() == Some("-") {
        let mut buf = Vec::new();
        io::stdin()
            .read_to_end(&mut buf)
            .unwrap_or_else(|e| fatal(&format!("failed to read stdin: {e}")));
        buf
    } else {
        fs::read(path)
            .unwrap_or_else(|e| fatal(&format!("failed to read {}: {e}", path.display())))
    };
    tracing::debug!(bytes = bytes.len(), "read input");
    decode_document(&bytes)
        .unwrap_or_else(|e| fatal(&format!("failed to parse {}: {e}", path.display())))
}

fn print_json(doc: &Document) {
    match serde_json::to_string_pretty(doc) {
        Ok(text) => println!("{text}"),
        Err(e) => fatal(&format!("failed to serialize output: {e}")),
    }
}

/// Print an error message to stderr and exit with code 2.
fn fatal(msg: &str) -> ! {
    eprintln!("ldn: {msg}");
    process::exit(2);
}

/// Report a failed lookup or flatten and exit with code 1.
fn fail(err: &dyn std::error::Error) -> ! {
    eprintln!("ldn: {err}");
    process::exit(1);
}
