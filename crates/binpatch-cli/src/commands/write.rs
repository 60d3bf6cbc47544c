//! Write command implementation.
//!
//! Thin wrapper over [`binpatch::patch_at_offset`]. Unlike the library
//! primitive, this refuses writes that would run past the end of the file.

use anyhow::{Context, Result, anyhow, bail};
use binpatch::{Pattern, format_hex, patch_at_offset};
use std::fs;
use std::path::Path;

/// Parse an offset given as `0x`-prefixed hex or plain decimal.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(parse_offset("0x1F").unwrap(), 0x1F);
/// assert_eq!(parse_offset("31").unwrap(), 31);
/// ```
pub fn parse_offset(s: &str) -> Result<u64> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse::<u64>(),
    };
    parsed.map_err(|e| anyhow!("Invalid offset '{}': {}", s, e))
}

/// Ensure `len` bytes at `offset` fit inside a file of `file_size` bytes.
pub fn check_bounds(file_size: u64, offset: u64, len: usize) -> Result<()> {
    let end = offset
        .checked_add(len as u64)
        .ok_or_else(|| anyhow!("Offset {:#x} is out of range", offset))?;

    if end > file_size {
        bail!(
            "Writing {} bytes at {:#x} would run past the end of the file ({} bytes)",
            len,
            offset,
            file_size
        );
    }
    Ok(())
}

/// Run the write command
pub fn run(target: &Path, offset: &str, bytes: &str) -> Result<()> {
    let offset = parse_offset(offset)?;
    let patch = Pattern::hex(bytes).to_bytes()?;

    let file_size = fs::metadata(target)
        .with_context(|| format!("Could not stat '{}'", target.display()))?
        .len();
    check_bounds(file_size, offset, patch.len())?;

    patch_at_offset(target, offset, &patch)
        .with_context(|| format!("Could not write to '{}'", target.display()))?;

    println!(
        "Wrote {} ({} bytes) at offset {:#x}",
        format_hex(&patch),
        patch.len(),
        offset
    );
    Ok(())
}
