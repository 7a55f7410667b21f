//! In-memory tracker used by tests. Records every call it receives.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::{IssueRef, IssueTracker, RepoId, TrackerError};
use crate::issue::IssueDraft;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect { repo: String },
    CreateIssue { record_id: String, title: String, labels: Vec<String> },
    ListLabels,
    CreateLabel { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectOutcome {
    #[default]
    Ok,
    BadCredentials,
    MissingRepo,
}

#[derive(Default)]
pub struct FakeTracker {
    pub connect: ConnectOutcome,
    /// Record ids whose create_issue call is rejected
    pub reject_issues: HashSet<String>,
    /// Label names whose create_label call is rejected
    pub reject_labels: HashSet<String>,
    pub existing_labels: HashSet<String>,
    pub fail_list_labels: bool,
    calls: Arc<Mutex<Vec<Call>>>,
    next_number: AtomicU64,
}

impl FakeTracker {
    pub fn new() -> Self {
        Self {
            next_number: AtomicU64::new(1),
            ..Default::default()
        }
    }

    /// Shared handle to the call log, usable after the tracker is boxed.
    pub fn call_log(&self) -> Arc<Mutex<Vec<Call>>> {
        Arc::clone(&self.calls)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl IssueTracker for FakeTracker {
    async fn connect(&mut self, _token: &str, repo: &RepoId) -> Result<(), TrackerError> {
        self.record(Call::Connect { repo: repo.to_string() });
        match self.connect {
            ConnectOutcome::Ok => Ok(()),
            ConnectOutcome::BadCredentials => Err(TrackerError::Auth("Bad credentials".to_string())),
            ConnectOutcome::MissingRepo => Err(TrackerError::RepoNotFound(repo.clone())),
        }
    }

    async fn create_issue(&self, record_id: &str, draft: &IssueDraft) -> Result<IssueRef, TrackerError> {
        self.record(Call::CreateIssue {
            record_id: record_id.to_string(),
            title: draft.title.clone(),
            labels: draft.labels.clone(),
        });
        if self.reject_issues.contains(record_id) {
            return Err(TrackerError::Submission {
                status: 422,
                message: "Validation Failed".to_string(),
            });
        }
        Ok(IssueRef::Number(self.next_number.fetch_add(1, Ordering::SeqCst)))
    }

    async fn list_labels(&self) -> Result<HashSet<String>, TrackerError> {
        self.record(Call::ListLabels);
        if self.fail_list_labels {
            return Err(TrackerError::Submission {
                status: 500,
                message: "Server Error".to_string(),
            });
        }
        Ok(self.existing_labels.clone())
    }

    async fn create_label(&self, name: &str, _color: &str, _description: &str) -> Result<(), TrackerError> {
        self.record(Call::CreateLabel { name: name.to_string() });
        if self.reject_labels.contains(name) {
            return Err(TrackerError::Submission {
                status: 422,
                message: "already_exists".to_string(),
            });
        }
        Ok(())
    }
}
