//! Export command for writing the built-in patch set.

use anyhow::{Context, Result};
use binpatch::{builtin_patches, save_patch_set};
use std::path::Path;

/// Export the built-in patch set as JSON
pub fn run(output: Option<&Path>) -> Result<()> {
    let set = builtin_patches();

    match output {
        Some(path) => {
            save_patch_set(path, &set)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "Exported {} patch task(s) to {}",
                set.tasks.len(),
                path.display()
            );
        }
        None => println!("{}", serde_json::to_string_pretty(&set)?),
    }

    Ok(())
}
