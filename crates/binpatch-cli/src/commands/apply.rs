//! Apply command implementation.

use anyhow::{Context, Result, anyhow, bail};
use binpatch::{
    PatchOutcome, PatchSet, PatchSummary, Patcher, TaskReport, builtin_patches,
    first_fatal_error, load_patch_set,
};
use owo_colors::OwoColorize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Run the apply command
pub fn run(
    target: &Path,
    patches: Option<&Path>,
    output: Option<&Path>,
    dry_run: bool,
) -> Result<()> {
    print!(
        "{} Checking for target file '{}'... ",
        ">".bold(),
        target.display()
    );
    if !target.is_file() {
        println!("{}", "✖ Not Found!".red());
        bail!("The file '{}' was not found", target.display());
    }
    println!("{}", "✔ Found!".green());

    let set = load_set(patches)?;
    info!("Loaded {} patch task(s)", set.tasks.len());

    let file = match output {
        Some(output) if !dry_run => {
            if is_same_file(target, output) {
                bail!(
                    "Output '{}' is the target file itself; copying would truncate it. \
                     Omit --output to patch in place",
                    output.display()
                );
            }
            print!(
                "{} Creating a patchable copy '{}'... ",
                ">".bold(),
                output.display()
            );
            fs::copy(target, output).with_context(|| {
                format!(
                    "Could not copy '{}' to '{}'",
                    target.display(),
                    output.display()
                )
            })?;
            println!("{}", "✔ Done!".green());
            output
        }
        _ => target,
    };

    let patcher = Patcher::new(file).dry_run(dry_run);
    let reports = patcher.apply_all(&set.tasks);

    println!();
    for report in &reports {
        print_report(report, dry_run);
    }

    let summary = PatchSummary::from_reports(&reports);
    println!();
    println!(
        "{} of {} patch(es) applied, {} not found, {} failed",
        summary.patched,
        set.tasks.len(),
        summary.not_found,
        summary.failed
    );

    if let Some(e) = first_fatal_error(&reports) {
        return Err(anyhow!("Patching '{}' aborted: {}", file.display(), e));
    }

    println!("{}", completion_message(file, &summary, dry_run));
    Ok(())
}

fn completion_message(file: &Path, summary: &PatchSummary, dry_run: bool) -> String {
    if dry_run {
        format!("Dry run: '{}' was not modified.", file.display())
    } else if summary.patched == 0 {
        format!("No changes were made to '{}'.", file.display())
    } else {
        format!("The file '{}' has been updated.", file.display())
    }
}

/// Whether both paths resolve to the same existing file.
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn load_set(patches: Option<&Path>) -> Result<PatchSet> {
    match patches {
        Some(path) => load_patch_set(path)
            .with_context(|| format!("Failed to load patch set {}", path.display())),
        None => Ok(builtin_patches()),
    }
}

fn print_report(report: &TaskReport, dry_run: bool) {
    let line = describe(report, dry_run);
    match &report.result {
        Ok(PatchOutcome::Patched { .. }) => {
            println!("  {} {} {}", "✔".green(), report.label().bold(), line)
        }
        Ok(PatchOutcome::NotFound) => {
            println!("  {} {} {}", "✖".yellow(), report.label().bold(), line.yellow())
        }
        Err(_) => println!(
            "  {} {} {}",
            "✖".red(),
            report.label().bold(),
            line.red()
        ),
    }
}

/// Plain-text outcome line for one task.
fn describe(report: &TaskReport, dry_run: bool) -> String {
    match &report.result {
        Ok(PatchOutcome::Patched { offset }) if dry_run => {
            format!("pattern found at offset {:#x} (dry run)", offset)
        }
        Ok(outcome) => outcome.to_string(),
        Err(e) => format!("[{}] {}", report.status(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use binpatch::{Error, PatchTask, save_patch_set};
    use tempfile::tempdir;

    fn report(result: binpatch::Result<PatchOutcome>) -> TaskReport {
        TaskReport {
            index: 0,
            name: Some("test".to_string()),
            result,
        }
    }

    #[test]
    fn test_describe() {
        assert_eq!(
            describe(&report(Ok(PatchOutcome::Patched { offset: 0x1A })), false),
            "pattern found & patched at offset 0x1a"
        );
        assert_eq!(
            describe(&report(Ok(PatchOutcome::Patched { offset: 0x1A })), true),
            "pattern found at offset 0x1a (dry run)"
        );
        assert_eq!(
            describe(&report(Ok(PatchOutcome::NotFound)), false),
            "pattern can't be found"
        );
        assert_eq!(
            describe(
                &report(Err(Error::LengthMismatch { find: 1, replace: 2 })),
                false
            ),
            "[FAILED] Length mismatch: find is 1 bytes, but replace is 2 bytes"
        );
    }

    #[test]
    fn test_completion_message_follows_patched_count() {
        let file = Path::new("game.exe");
        let none = PatchSummary {
            patched: 0,
            not_found: 2,
            failed: 0,
        };
        let some = PatchSummary {
            patched: 1,
            not_found: 1,
            failed: 0,
        };

        assert_eq!(
            completion_message(file, &none, false),
            "No changes were made to 'game.exe'."
        );
        assert_eq!(
            completion_message(file, &some, false),
            "The file 'game.exe' has been updated."
        );
        assert_eq!(
            completion_message(file, &some, true),
            "Dry run: 'game.exe' was not modified."
        );
    }

    #[test]
    fn test_run_missing_target() {
        let dir = tempdir().unwrap();
        let result = run(&dir.path().join("missing.exe"), None, None, false);
        assert!(result.is_err());
    }

    #[test]
    fn test_run_patches_copy_and_keeps_original() {
        let dir = tempdir().unwrap();
        let original = dir.path().join("original.bin");
        let patched = dir.path().join("patched.bin");
        let patches = dir.path().join("patches.json");

        fs::write(&original, [0xAAu8, 0xBB, 0xCC, 0xDD]).unwrap();
        let set = PatchSet {
            description: String::new(),
            tasks: vec![
                PatchTask::new("BB CC", "11 22"),
                PatchTask::new("EE FF", "00 00"),
                PatchTask::new("AA", "AA BB"),
            ],
        };
        save_patch_set(&patches, &set).unwrap();

        run(&original, Some(&patches), Some(&patched), false).unwrap();

        assert_eq!(fs::read(&original).unwrap(), vec![0xAA, 0xBB, 0xCC, 0xDD]);
        assert_eq!(fs::read(&patched).unwrap(), vec![0xAA, 0x11, 0x22, 0xDD]);
    }

    #[test]
    fn test_run_refuses_output_equal_to_target() {
        let dir = tempdir().unwrap();
        let original = dir.path().join("original.bin");
        let patches = dir.path().join("patches.json");

        fs::write(&original, [0xAAu8, 0xBB, 0xCC, 0xDD]).unwrap();
        let set = PatchSet {
            description: String::new(),
            tasks: vec![PatchTask::new("BB CC", "11 22")],
        };
        save_patch_set(&patches, &set).unwrap();

        assert!(run(&original, Some(&patches), Some(&original), false).is_err());
        assert_eq!(fs::read(&original).unwrap(), vec![0xAA, 0xBB, 0xCC, 0xDD]);

        // Same file reached through a different spelling of the path.
        let aliased = dir.path().join(".").join("original.bin");
        assert!(run(&original, Some(&patches), Some(&aliased), false).is_err());
        assert_eq!(fs::read(&original).unwrap(), vec![0xAA, 0xBB, 0xCC, 0xDD]);
    }

    #[test]
    fn test_is_same_file() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.bin");
        let b = dir.path().join("b.bin");
        fs::write(&a, [0u8]).unwrap();

        assert!(is_same_file(&a, &a));
        assert!(is_same_file(&a, &dir.path().join(".").join("a.bin")));
        assert!(!is_same_file(&a, &b));

        fs::write(&b, [0u8]).unwrap();
        assert!(!is_same_file(&a, &b));
    }

    #[test]
    fn test_run_dry_run_writes_nothing() {
        let dir = tempdir().unwrap();
        let original = dir.path().join("original.bin");
        let patched = dir.path().join("patched.bin");
        let patches = dir.path().join("patches.json");

        fs::write(&original, [0xAAu8, 0xBB, 0xCC, 0xDD]).unwrap();
        let set = PatchSet {
            description: String::new(),
            tasks: vec![PatchTask::new("BB CC", "11 22")],
        };
        save_patch_set(&patches, &set).unwrap();

        run(&original, Some(&patches), Some(&patched), true).unwrap();

        assert_eq!(fs::read(&original).unwrap(), vec![0xAA, 0xBB, 0xCC, 0xDD]);
        assert!(!patched.exists());
    }

    #[test]
    fn test_run_builtin_set_not_found_is_not_fatal() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("target.bin");
        fs::write(&target, [0u8; 64]).unwrap();

        run(&target, None, None, false).unwrap();
        assert_eq!(fs::read(&target).unwrap(), vec![0u8; 64]);
    }
}
