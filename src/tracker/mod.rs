#[cfg(test)]
pub mod fake;
pub mod github;
pub mod simulated;
pub mod types;

pub use github::GitHubClient;
pub use simulated::SimulatedTracker;
pub use types::{IssueRef, RepoId};

use async_trait::async_trait;
use std::collections::HashSet;
use thiserror::Error;

use crate::issue::IssueDraft;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Authentication rejected by GitHub: {0}")]
    Auth(String),

    #[error("Repository not found: {0}")]
    RepoNotFound(RepoId),

    #[error("GitHub rejected the request ({status}): {message}")]
    Submission { status: u16, message: String },

    #[error("GitHub API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Tracker used before connect()")]
    NotConnected,
}

/// The remote issue tracker, narrowed to what an import needs.
///
/// `connect` must succeed before any other call. Implementations must be
/// Send + Sync so the importer can hold them behind a `Box<dyn _>`.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Authenticate with `token` and resolve the target repository.
    async fn connect(&mut self, token: &str, repo: &RepoId) -> Result<(), TrackerError>;

    /// Open one issue. `record_id` is the originating ticket's id.
    async fn create_issue(&self, record_id: &str, draft: &IssueDraft) -> Result<IssueRef, TrackerError>;

    /// Names of every label already defined in the repository.
    async fn list_labels(&self) -> Result<HashSet<String>, TrackerError>;

    async fn create_label(&self, name: &str, color: &str, description: &str) -> Result<(), TrackerError>;

    /// True when create calls never reach the remote service.
    fn is_simulated(&self) -> bool {
        false
    }
}
