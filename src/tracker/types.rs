use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A GitHub repository in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid repository '{0}', expected owner/name")]
pub struct InvalidRepoId(pub String);

impl FromStr for RepoId {
    type Err = InvalidRepoId;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidRepoId(value.to_string());
        let (owner, name) = value.trim().split_once('/').ok_or_else(invalid)?;
        let valid_part = |part: &str| !part.is_empty() && !part.contains('/') && !part.contains(char::is_whitespace);
        if !valid_part(owner) || !valid_part(name) {
            return Err(invalid());
        }
        Ok(RepoId {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// What a successful create-issue call hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueRef {
    /// Issue number assigned by the tracker
    Number(u64),
    /// Placeholder produced in dry-run mode, e.g. "dry-run-BUG-1"
    Simulated(String),
}

impl IssueRef {
    pub fn simulated_for(record_id: &str) -> IssueRef {
        IssueRef::Simulated(format!("dry-run-{}", record_id))
    }
}

impl fmt::Display for IssueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueRef::Number(n) => write!(f, "{}", n),
            IssueRef::Simulated(placeholder) => write!(f, "{}", placeholder),
        }
    }
}

/// Serialized as a string in both cases so the results map has a single
/// value type.
impl Serialize for IssueRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
