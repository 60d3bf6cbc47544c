//! Command-line argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "binpatch")]
#[command(version, about = "Static byte-pattern patcher for executables")]
pub struct Cli {
    /// Config file with default target, output and patch set
    #[arg(short, long, default_value = "binpatch.toml", global = true)]
    pub config: PathBuf,

    /// Wait for Enter before exiting
    #[arg(long, global = true)]
    pub pause: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Apply a patch set to the target file
    Apply {
        /// File to patch
        #[arg(short, long, env = "BINPATCH_TARGET")]
        target: Option<PathBuf>,

        /// Patch set (JSON); the built-in set is used when omitted
        #[arg(short, long)]
        patches: Option<PathBuf>,

        /// Copy the target here and patch the copy instead
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only report where each pattern would be patched
        #[arg(long)]
        dry_run: bool,
    },

    /// Find the first offset of a pattern without modifying the file
    Scan {
        /// File to search
        #[arg(short, long, env = "BINPATCH_TARGET")]
        target: Option<PathBuf>,

        /// Pattern to search for (e.g. "4C 8D 05")
        #[arg(short, long)]
        find: String,
    },

    /// Write bytes at a fixed offset
    Write {
        /// File to modify
        #[arg(short, long, env = "BINPATCH_TARGET")]
        target: Option<PathBuf>,

        /// Offset to write at (0x-prefixed hex or decimal)
        #[arg(long)]
        offset: String,

        /// Bytes to write (e.g. "90 90 90")
        #[arg(short, long)]
        bytes: String,
    },

    /// Write the built-in patch set as JSON
    ExportBuiltin {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
