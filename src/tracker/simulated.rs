use async_trait::async_trait;
use std::collections::HashSet;
use tracing::info;

use super::{IssueRef, IssueTracker, RepoId, TrackerError};
use crate::issue::IssueDraft;

/// Dry-run wrapper: reads go to the inner tracker, writes are only logged.
///
/// `create_issue` answers with a `dry-run-<id>` placeholder so the rest of
/// the import (outcome mapping, manifest) runs exactly as it would for real.
pub struct SimulatedTracker<T> {
    inner: T,
}

impl<T: IssueTracker> SimulatedTracker<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<T: IssueTracker> IssueTracker for SimulatedTracker<T> {
    async fn connect(&mut self, token: &str, repo: &RepoId) -> Result<(), TrackerError> {
        self.inner.connect(token, repo).await
    }

    async fn create_issue(&self, record_id: &str, draft: &IssueDraft) -> Result<IssueRef, TrackerError> {
        info!("DRY RUN - Would create issue: {}", draft.title);
        info!("  Labels: {}", draft.labels.join(", "));
        Ok(IssueRef::simulated_for(record_id))
    }

    async fn list_labels(&self) -> Result<HashSet<String>, TrackerError> {
        self.inner.list_labels().await
    }

    async fn create_label(&self, name: &str, color: &str, _description: &str) -> Result<(), TrackerError> {
        info!(color, "DRY RUN - Would create label: {}", name);
        Ok(())
    }

    fn is_simulated(&self) -> bool {
        true
    }
}
