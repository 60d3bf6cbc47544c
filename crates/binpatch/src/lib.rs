//! # binpatch
//!
//! Core library for static byte-pattern patching.
//!
//! This crate provides:
//! - Pattern normalization (hex strings or raw bytes to canonical bytes)
//! - Scan-and-patch of a file: first occurrence only, replacement of equal length
//! - Patch sets that can be loaded from and saved to JSON
//!
//! The target file is treated as opaque bytes. There is no notion of
//! sections, relocations or instructions.

pub mod error;
pub mod patcher;
pub mod pattern;
pub mod task;

pub use error::{Error, Result};
pub use patcher::{
    PatchOutcome, PatchSummary, Patcher, TaskReport, TaskStatus, find_pattern, first_fatal_error,
    patch_at_offset, scan, scan_and_patch,
};
pub use pattern::{Pattern, format_hex, normalize, parse_hex};
pub use task::{
    PatchSet, PatchTask, ResolvedTask, builtin_patches, load_patch_set, save_patch_set,
};
