use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::pattern::Pattern;

/// A find/replace pair applied to a target file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub find: Pattern,
    pub replace: Pattern,
}

/// A patch task whose patterns have been normalized and length-checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTask {
    pub find: Vec<u8>,
    pub replace: Vec<u8>,
}

impl PatchTask {
    pub fn new(find: impl Into<Pattern>, replace: impl Into<Pattern>) -> Self {
        Self {
            name: None,
            find: find.into(),
            replace: replace.into(),
        }
    }

    pub fn named(
        name: impl Into<String>,
        find: impl Into<Pattern>,
        replace: impl Into<Pattern>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(find, replace)
        }
    }

    /// Normalize both patterns and enforce equal length.
    ///
    /// Replacement happens in place, so a length difference would shift every
    /// byte after the match. It is rejected here, before any file is opened.
    pub fn resolve(&self) -> Result<ResolvedTask> {
        let find = self.find.to_bytes()?;
        let replace = self.replace.to_bytes()?;

        if find.len() != replace.len() {
            return Err(Error::LengthMismatch {
                find: find.len(),
                replace: replace.len(),
            });
        }

        Ok(ResolvedTask { find, replace })
    }

    /// Label used when reporting on this task.
    pub fn label(&self, index: usize) -> String {
        task_label(index, self.name.as_deref())
    }
}

/// `#<n>` or `#<n> <name>`, with `n` counted from one.
pub(crate) fn task_label(index: usize, name: Option<&str>) -> String {
    match name {
        Some(name) => format!("#{} {}", index + 1, name),
        None => format!("#{}", index + 1),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchSet {
    #[serde(default)]
    pub description: String,
    pub tasks: Vec<PatchTask>,
}

pub fn load_patch_set<P: AsRef<Path>>(path: P) -> Result<PatchSet> {
    let content = fs::read_to_string(&path)?;
    let data = serde_json::from_str(&content)?;
    Ok(data)
}

pub fn save_patch_set<P: AsRef<Path>>(path: P, patches: &PatchSet) -> Result<()> {
    let content = serde_json::to_string_pretty(patches)?;
    fs::write(path, content)?;
    Ok(())
}

/// Built-in patch set: NOP out the client's hardware-ID telemetry calls.
///
/// Each task keeps the surrounding instructions intact and replaces the
/// `E8 rel32` calls (plus the one-byte `90` padding where present) with NOPs,
/// so the server only receives IP and MAC address.
pub fn builtin_patches() -> PatchSet {
    PatchSet {
        description: "Disable hardware ID logging".to_string(),
        tasks: vec![
            PatchTask::named(
                "SL_ClientComputerInfo",
                "4C 8D 05 82 FE 17 01 BA 0A 00 00 00 48 8D 4C 24 20 E8 F3 8F 4B 00 90 C7 44 24 30 E7 05 00 00 48 8D 4C 24 34 48 8B D3 41 B8 8C 01 00 00 E8 E3 B5 CD 00 4C 8D 44 24 30 BA 90 01 00 00 48 8B 0D 86 8F 8B 01 E8 F1 44 BC 00 90 48 8D 4C 24 20 E8 06 90 4B 00 48 8B 8C 24 C0 01 00 00 48 33 CC E8 96 B4 CD 00 48 81 C4 D0 01 00 00 5B",
                "4C 8D 05 82 FE 17 01 BA 0A 00 00 00 48 8D 4C 24 20 90 90 90 90 90 90 C7 44 24 30 E7 05 00 00 48 8D 4C 24 34 48 8B D3 41 B8 8C 01 00 00 90 90 90 90 90 4C 8D 44 24 30 BA 90 01 00 00 48 8B 0D 86 8F 8B 01 90 90 90 90 90 90 48 8D 4C 24 20 90 90 90 90 90 48 8B 8C 24 C0 01 00 00 48 33 CC 90 90 90 90 90 48 81 C4 D0 01 00 00 5B",
            ),
            PatchTask::named(
                "SL_ClientPerformance",
                "4C 8D 05 37 FE 17 01 BA 0A 00 00 00 48 8D 4C 24 58 E8 68 8F 4B 00 90 C7 44 24 28 ED 05 00 00 48 8D 4C 24 2C 8B 03 89 01 8B 43 04 89 41 04 8B 43 08 89 41 08 8B 43 0C 89 41 0C 8B 43 10 89 41 10 4C 8D 44 24 28 BA 18 00 00 00 48 8B 0D ED 8E 8B 01 E8 58 44 BC 00 90 48 8D 4C 24 58 E8 6D 8F 4B 00 48 83 C4 40 5B",
                "4C 8D 05 37 FE 17 01 BA 0A 00 00 00 48 8D 4C 24 58 90 90 90 90 90 90 C7 44 24 28 ED 05 00 00 48 8D 4C 24 2C 8B 03 89 01 8B 43 04 89 41 04 8B 43 08 89 41 08 8B 43 0C 89 41 0C 8B 43 10 89 41 10 4C 8D 44 24 28 BA 18 00 00 00 48 8B 0D ED 8E 8B 01 90 90 90 90 90 90 48 8D 4C 24 58 90 90 90 90 90 48 83 C4 40 5B",
            ),
        ],
    }
}
