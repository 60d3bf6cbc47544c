//! Scan-and-patch engine
//!
//! Reads the whole target into memory, finds the first occurrence of a
//! byte pattern and overwrites exactly that range in place. File handles
//! are scoped to a single call; nothing stays open between calls.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use memchr::memmem;
use strum::{Display, IntoStaticStr};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::pattern::{Pattern, format_hex};
use crate::task::{PatchTask, ResolvedTask, task_label};

/// Result of a single scan-and-patch call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The pattern was found and overwritten at this offset.
    Patched { offset: u64 },
    /// The pattern does not occur in the file; nothing was written.
    NotFound,
}

impl PatchOutcome {
    pub fn is_patched(&self) -> bool {
        matches!(self, PatchOutcome::Patched { .. })
    }

    pub fn offset(&self) -> Option<u64> {
        match self {
            PatchOutcome::Patched { offset } => Some(*offset),
            PatchOutcome::NotFound => None,
        }
    }
}

impl fmt::Display for PatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchOutcome::Patched { offset } => {
                write!(f, "pattern found & patched at offset {:#x}", offset)
            }
            PatchOutcome::NotFound => f.write_str("pattern can't be found"),
        }
    }
}

/// Find the leftmost occurrence of `needle` in `haystack`.
pub fn find_pattern(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    memmem::find(haystack, needle)
}

/// Overwrite `patch.len()` bytes of the file starting at `offset`.
///
/// The file is neither created nor truncated. Callers must keep
/// `offset + patch.len()` within the file; writing past the end would
/// extend it.
pub fn patch_at_offset<P: AsRef<Path>>(path: P, offset: u64, patch: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let mut file = OpenOptions::new().read(true).write(true).open(path)?;

    file.seek(SeekFrom::Start(offset))?;
    file.write_all(patch)?;
    file.flush()?;

    debug!(
        "Wrote {} bytes at {:#x} in {}",
        patch.len(),
        offset,
        path.display()
    );
    Ok(())
}

/// Locate `find` in the file without modifying it.
pub fn scan<P: AsRef<Path>>(path: P, find: impl Into<Pattern>) -> Result<Option<u64>> {
    let needle = find.into().to_bytes()?;
    let content = fs::read(path)?;
    Ok(find_pattern(&content, &needle).map(|pos| pos as u64))
}

/// Replace the first occurrence of `find` with `replace`.
///
/// Both patterns are normalized and length-checked before the file is
/// opened, so a malformed or mismatched pair never touches the target.
pub fn scan_and_patch<P: AsRef<Path>>(
    path: P,
    find: impl Into<Pattern>,
    replace: impl Into<Pattern>,
) -> Result<PatchOutcome> {
    let task = PatchTask::new(find, replace).resolve()?;
    apply_resolved(path.as_ref(), &task, false)
}

fn apply_resolved(path: &Path, task: &ResolvedTask, dry_run: bool) -> Result<PatchOutcome> {
    let content = fs::read(path)?;
    debug!("Read {} bytes from {}", content.len(), path.display());

    let Some(pos) = find_pattern(&content, &task.find) else {
        debug!("Pattern {} not found", format_hex(&task.find));
        return Ok(PatchOutcome::NotFound);
    };
    let offset = pos as u64;

    if dry_run {
        debug!("Dry run: pattern found at {:#x}, skipping write", offset);
    } else {
        patch_at_offset(path, offset, &task.replace)?;
        info!(
            "Patched {} bytes at {:#x} in {}",
            task.replace.len(),
            offset,
            path.display()
        );
    }

    Ok(PatchOutcome::Patched { offset })
}

/// Per-task status used in summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
pub enum TaskStatus {
    #[strum(serialize = "PATCHED")]
    Patched,
    #[strum(serialize = "NOT FOUND")]
    NotFound,
    #[strum(serialize = "FAILED")]
    Failed,
}

/// Outcome of one task within a batch.
#[derive(Debug)]
pub struct TaskReport {
    pub index: usize,
    pub name: Option<String>,
    pub result: Result<PatchOutcome>,
}

impl TaskReport {
    pub fn status(&self) -> TaskStatus {
        match &self.result {
            Ok(PatchOutcome::Patched { .. }) => TaskStatus::Patched,
            Ok(PatchOutcome::NotFound) => TaskStatus::NotFound,
            Err(_) => TaskStatus::Failed,
        }
    }

    pub fn label(&self) -> String {
        task_label(self.index, self.name.as_deref())
    }
}

/// Aggregate counts over a batch of task reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchSummary {
    pub patched: usize,
    pub not_found: usize,
    pub failed: usize,
}

impl PatchSummary {
    pub fn from_reports(reports: &[TaskReport]) -> Self {
        let mut summary = Self::default();
        for report in reports {
            match report.status() {
                TaskStatus::Patched => summary.patched += 1,
                TaskStatus::NotFound => summary.not_found += 1,
                TaskStatus::Failed => summary.failed += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.patched + self.not_found + self.failed
    }
}

/// First error in a batch that is not confined to its own task.
pub fn first_fatal_error(reports: &[TaskReport]) -> Option<&Error> {
    reports
        .iter()
        .filter_map(|r| r.result.as_ref().err())
        .find(|e| !e.is_task_error())
}

/// Applies patch tasks to a single target file.
pub struct Patcher {
    target: PathBuf,
    dry_run: bool,
}

impl Patcher {
    pub fn new<P: Into<PathBuf>>(target: P) -> Self {
        Self {
            target: target.into(),
            dry_run: false,
        }
    }

    /// Search only; report where tasks would apply without writing.
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    pub fn apply(&self, task: &PatchTask) -> Result<PatchOutcome> {
        let resolved = task.resolve()?;
        apply_resolved(&self.target, &resolved, self.dry_run)
    }

    /// Apply tasks in order against the file's current content.
    ///
    /// Pattern and length errors are confined to their own task. An I/O
    /// error stops the batch, since later tasks would hit the same file.
    pub fn apply_all(&self, tasks: &[PatchTask]) -> Vec<TaskReport> {
        let mut reports = Vec::with_capacity(tasks.len());

        for (index, task) in tasks.iter().enumerate() {
            let result = self.apply(task);
            let fatal = match &result {
                Ok(outcome) => {
                    debug!("Task {}: {}", task.label(index), outcome);
                    false
                }
                Err(e) if e.is_task_error() => {
                    warn!("Task {} skipped: {}", task.label(index), e);
                    false
                }
                Err(e) => {
                    warn!("Task {} failed: {}", task.label(index), e);
                    true
                }
            };

            reports.push(TaskReport {
                index,
                name: task.name.clone(),
                result,
            });

            if fatal {
                break;
            }
        }

        reports
    }
}
