pub mod types;

pub use types::Manifest;

use chrono::{DateTime, Local};
use colored::Colorize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::importer::ImportOutcome;
use crate::tracker::{IssueRef, RepoId};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write results file: {0}")]
    FileWrite(#[from] std::io::Error),

    #[error("Failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Build the manifest for a finished run.
pub fn build<'a>(outcome: &'a ImportOutcome, repo: &RepoId, now: &DateTime<Local>) -> Manifest<'a> {
    Manifest {
        timestamp: now.to_rfc3339(),
        repository: repo.to_string(),
        imported_count: outcome.len(),
        results: outcome,
    }
}

/// `import_results_YYYYMMDD_HHMMSS.json`
pub fn manifest_file_name(now: &DateTime<Local>) -> String {
    format!("import_results_{}.json", now.format("%Y%m%d_%H%M%S"))
}

/// Write the manifest into `dir` under a fresh dated name and return the
/// path. An existing file is never overwritten: `_1`, `_2`, ... suffixes
/// are tried instead.
#[instrument(skip(manifest, dir, now), fields(dir = %dir.display(), imported = manifest.imported_count))]
pub fn write_manifest(
    manifest: &Manifest<'_>,
    dir: &Path,
    now: &DateTime<Local>,
) -> Result<PathBuf, ReportError> {
    let json = serde_json::to_string_pretty(manifest)?;
    let base = manifest_file_name(now);
    let stem = base.trim_end_matches(".json");

    let mut attempt = 0u32;
    loop {
        let name = if attempt == 0 {
            base.clone()
        } else {
            format!("{}_{}.json", stem, attempt)
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(json.as_bytes())?;
                file.write_all(b"\n")?;
                info!("Results saved to: {}", path.display());
                return Ok(path);
            }
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                debug!(path = %path.display(), "results file exists, trying next name");
                attempt += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }
}

/// Log one line per imported ticket.
pub fn log_results(outcome: &ImportOutcome) {
    info!("Successfully imported {} issues:", outcome.len());
    for (id, issue) in outcome.iter() {
        info!("  {} -> {}", id, describe(issue));
    }
}

/// Print a colored summary of the run to stdout.
pub fn print_summary(outcome: &ImportOutcome, repo: &RepoId) {
    println!();
    println!("Import into {}", repo.to_string().bold());
    println!("═══ Imported {} of {} ═══", outcome.len(), outcome.total_records);
    for (id, issue) in outcome.iter() {
        println!("  • {} -> {}", id, colorize_issue(issue));
    }
    let skipped = outcome.total_records.saturating_sub(outcome.len());
    if skipped > 0 {
        println!("  {}", format!("{} skipped, see log for details", skipped).yellow());
    }
    println!();
}

fn describe(issue: &IssueRef) -> String {
    match issue {
        IssueRef::Number(n) => format!("Issue #{}", n),
        IssueRef::Simulated(placeholder) => placeholder.clone(),
    }
}

fn colorize_issue(issue: &IssueRef) -> colored::ColoredString {
    match issue {
        IssueRef::Number(_) => describe(issue).green().bold(),
        IssueRef::Simulated(_) => describe(issue).cyan(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_outcome() -> ImportOutcome {
        let mut outcome = ImportOutcome::new(3);
        outcome.insert("BUG-1".to_string(), IssueRef::Number(41));
        outcome.insert("BUG-2".to_string(), IssueRef::Number(42));
        outcome
    }

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap()
    }

    fn repo() -> RepoId {
        "acme/widgets".parse().unwrap()
    }

    #[test]
    fn test_manifest_file_name() {
        assert_eq!(
            manifest_file_name(&fixed_now()),
            "import_results_20240305_140709.json"
        );
    }

    #[test]
    fn test_build_manifest() {
        let outcome = sample_outcome();
        let manifest = build(&outcome, &repo(), &fixed_now());
        assert_eq!(manifest.repository, "acme/widgets");
        assert_eq!(manifest.imported_count, 2);
        assert!(manifest.timestamp.starts_with("2024-03-05T14:07:09"));
    }

    #[test]
    fn test_write_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = sample_outcome();
        let manifest = build(&outcome, &repo(), &fixed_now());

        let path = write_manifest(&manifest, dir.path(), &fixed_now()).unwrap();

        assert_eq!(path.file_name().unwrap(), "import_results_20240305_140709.json");
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["repository"], "acme/widgets");
        assert_eq!(written["imported_count"], 2);
        assert_eq!(written["results"]["BUG-1"], "41");
        assert_eq!(written["results"]["BUG-2"], "42");
    }

    #[test]
    fn test_write_manifest_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = sample_outcome();
        let manifest = build(&outcome, &repo(), &fixed_now());

        let first = write_manifest(&manifest, dir.path(), &fixed_now()).unwrap();
        let second = write_manifest(&manifest, dir.path(), &fixed_now()).unwrap();

        assert_ne!(first, second);
        assert_eq!(
            second.file_name().unwrap(),
            "import_results_20240305_140709_1.json"
        );
    }

    #[test]
    fn test_write_manifest_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = sample_outcome();
        let manifest = build(&outcome, &repo(), &fixed_now());
        let err = write_manifest(&manifest, &dir.path().join("absent"), &fixed_now()).unwrap_err();
        assert!(matches!(err, ReportError::FileWrite(_)));
    }

    #[test]
    fn test_describe_issue() {
        assert_eq!(describe(&IssueRef::Number(7)), "Issue #7");
        assert_eq!(describe(&IssueRef::simulated_for("BUG-1")), "dry-run-BUG-1");
    }

    #[test]
    fn test_summary_does_not_panic() {
        print_summary(&sample_outcome(), &repo());
        log_results(&sample_outcome());
    }
}
