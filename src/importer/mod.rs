pub mod types;

pub use types::{ImportOutcome, ImportPhase, LabelSummary};

use chrono::Local;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::issue::{self, LabelSpec, STANDARD_LABELS};
use crate::records::{self, BugEntry, LoadError, MalformedRecordError};
use crate::tracker::{IssueRef, IssueTracker, RepoId, TrackerError};

/// Failures that stop a run before any issue is created.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Failed to connect to GitHub: {0}")]
    Connect(#[from] TrackerError),
}

/// Failures that skip one ticket and let the run continue.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    Malformed(#[from] MalformedRecordError),

    #[error(transparent)]
    Submission(#[from] TrackerError),
}

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub token: String,
    pub repo: RepoId,
    pub bugs_file: PathBuf,
    /// Pause between consecutive submissions; ignored in dry-run mode
    pub request_delay: Duration,
    /// Create the standard label palette after connecting
    pub bootstrap_labels: bool,
}

/// Drives one import: load, connect, submit every ticket in order.
pub struct Importer {
    tracker: Box<dyn IssueTracker>,
    options: ImportOptions,
    phase: ImportPhase,
}

impl Importer {
    pub fn new(tracker: Box<dyn IssueTracker>, options: ImportOptions) -> Self {
        Self {
            tracker,
            options,
            phase: ImportPhase::NotStarted,
        }
    }

    #[cfg(test)]
    pub fn phase(&self) -> ImportPhase {
        self.phase
    }

    /// Run the import. Fatal failures are logged and yield an empty outcome.
    pub async fn run(&mut self) -> ImportOutcome {
        match self.try_run().await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!("{}", err);
                ImportOutcome::default()
            }
        }
    }

    /// Run the import, returning the fatal error instead of logging it.
    pub async fn try_run(&mut self) -> Result<ImportOutcome, ImportError> {
        let span = info_span!(
            "import",
            repo = %self.options.repo,
            dry_run = self.tracker.is_simulated()
        );
        async {
            let result = self.execute().await;
            if result.is_err() {
                self.enter(ImportPhase::Failed);
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn execute(&mut self) -> Result<ImportOutcome, ImportError> {
        self.enter(ImportPhase::Loading);
        let entries = records::load_records(&self.options.bugs_file)?;

        self.enter(ImportPhase::Connecting);
        self.tracker
            .connect(&self.options.token, &self.options.repo)
            .await?;

        if self.options.bootstrap_labels {
            self.enter(ImportPhase::BootstrappingLabels);
            info!("Creating standard labels...");
            bootstrap_labels(self.tracker.as_ref(), STANDARD_LABELS).await;
        }

        self.enter(ImportPhase::Importing);
        let outcome = self.import_all(&entries).await;

        self.enter(ImportPhase::Done);
        Ok(outcome)
    }

    async fn import_all(&self, entries: &[BugEntry]) -> ImportOutcome {
        let total = entries.len();
        let simulated = self.tracker.is_simulated();
        let mut outcome = ImportOutcome::new(total);
        info!("Starting import of {} bugs...", total);

        for (i, entry) in entries.iter().enumerate() {
            let position = i + 1;
            info!("Processing bug {}/{}: {}", position, total, entry.display_id());

            match self.import_one(entry).await {
                Ok(issue) => {
                    let id = entry.display_id().to_string();
                    if let Some(previous) = outcome.insert(id.clone(), issue) {
                        warn!(previous = %previous, "Duplicate bug id {}, keeping the later issue", id);
                    }
                }
                Err(RecordError::Malformed(err)) => {
                    error!("Skipping malformed bug ticket: {}", err);
                }
                Err(RecordError::Submission(err)) => {
                    error!("Failed to create issue for {}: {}", entry.display_id(), err);
                }
            }

            if !simulated && position < total {
                debug!(delay_ms = self.options.request_delay.as_millis() as u64, "pausing before next submission");
                tokio::time::sleep(self.options.request_delay).await;
            }
        }

        info!(
            imported = outcome.len(),
            total,
            "Import completed. Successfully imported {} out of {} bugs.",
            outcome.len(),
            total
        );
        outcome
    }

    async fn import_one(&self, entry: &BugEntry) -> Result<IssueRef, RecordError> {
        let draft = issue::format_issue(entry, &Local::now())?;
        let record_id = entry.display_id();
        let issue = self.tracker.create_issue(record_id, &draft).await?;
        if let IssueRef::Number(number) = issue {
            info!("Created issue #{}: {}", number, draft.title);
        }
        Ok(issue)
    }

    fn enter(&mut self, next: ImportPhase) {
        debug!(from = %self.phase, to = %next, "import phase");
        self.phase = next;
    }
}

/// Create every palette label the repository does not have yet.
///
/// Never fails: listing or creation errors are logged as warnings and
/// counted.
pub async fn bootstrap_labels(tracker: &dyn IssueTracker, palette: &[LabelSpec]) -> LabelSummary {
    let mut summary = LabelSummary::default();

    let existing = match tracker.list_labels().await {
        Ok(names) => names,
        Err(err) => {
            warn!("Could not list existing labels: {}", err);
            summary.failed = palette.len();
            return summary;
        }
    };

    for label in palette {
        if existing.contains(label.name) {
            summary.already_present += 1;
            continue;
        }
        match tracker
            .create_label(label.name, label.color, label.description)
            .await
        {
            Ok(()) => {
                info!("Created label: {}", label.name);
                summary.created += 1;
            }
            Err(err) => {
                warn!("Could not create label {}: {}", label.name, err);
                summary.failed += 1;
            }
        }
    }

    debug!(
        created = summary.created,
        already_present = summary.already_present,
        failed = summary.failed,
        "label bootstrap finished"
    );
    summary
}
