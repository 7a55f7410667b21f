use serde::{Serialize, Serializer};
use std::fmt;

use crate::tracker::IssueRef;

/// Where an import run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportPhase {
    NotStarted,
    Loading,
    Connecting,
    BootstrappingLabels,
    Importing,
    Done,
    Failed,
}

impl fmt::Display for ImportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImportPhase::NotStarted => "not-started",
            ImportPhase::Loading => "loading",
            ImportPhase::Connecting => "connecting",
            ImportPhase::BootstrappingLabels => "bootstrapping-labels",
            ImportPhase::Importing => "importing",
            ImportPhase::Done => "done",
            ImportPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Ticket id -> issue, in the order tickets were imported.
///
/// Serializes as a JSON object. Tickets that failed are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    entries: Vec<(String, IssueRef)>,
    /// Number of tickets in the input file, imported or not
    pub total_records: usize,
}

impl ImportOutcome {
    pub fn new(total_records: usize) -> Self {
        Self {
            entries: Vec::new(),
            total_records,
        }
    }

    /// Record an imported ticket. A repeated id replaces the earlier entry
    /// and returns it.
    pub fn insert(&mut self, id: String, issue: IssueRef) -> Option<IssueRef> {
        match self.entries.iter_mut().find(|(existing, _)| *existing == id) {
            Some((_, slot)) => Some(std::mem::replace(slot, issue)),
            None => {
                self.entries.push((id, issue));
                None
            }
        }
    }

    #[cfg(test)]
    pub fn get(&self, id: &str) -> Option<&IssueRef> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == id)
            .map(|(_, issue)| issue)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IssueRef)> {
        self.entries.iter().map(|(id, issue)| (id.as_str(), issue))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A run succeeds when at least one ticket was imported.
    pub fn is_success(&self) -> bool {
        !self.is_empty()
    }
}

impl Serialize for ImportOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(id, issue)| (id, issue)))
    }
}

/// What the label bootstrap step did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelSummary {
    pub created: usize,
    pub already_present: usize,
    pub failed: usize,
}
