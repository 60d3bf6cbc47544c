//! Scan command implementation.

use anyhow::{Context, Result};
use binpatch::Pattern;
use std::path::Path;

/// Run the scan command
pub fn run(target: &Path, find: &str) -> Result<()> {
    let pattern = Pattern::hex(find);
    let needle = pattern.to_bytes()?;

    println!(
        "Searching '{}' for {} ({} bytes)",
        target.display(),
        pattern,
        needle.len()
    );

    let found = binpatch::scan(target, needle)
        .with_context(|| format!("Could not read '{}'", target.display()))?;
    println!("{}", describe(found));

    Ok(())
}

fn describe(found: Option<u64>) -> String {
    match found {
        Some(offset) => format!("Found at offset {:#x}", offset),
        None => "Pattern can't be found".to_string(),
    }
}
