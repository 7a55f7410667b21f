use serde::Serialize;

use crate::importer::ImportOutcome;

/// Result manifest written once at the end of a run.
#[derive(Debug, Serialize)]
pub struct Manifest<'a> {
    /// When the manifest was produced (RFC 3339)
    pub timestamp: String,
    /// Target repository in owner/name form
    pub repository: String,
    /// Number of tickets that became issues
    pub imported_count: usize,
    /// Ticket id -> issue number (or dry-run placeholder)
    pub results: &'a ImportOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::IssueRef;

    #[test]
    fn test_manifest_field_names() {
        let mut outcome = ImportOutcome::new(1);
        outcome.insert("BUG-1".to_string(), IssueRef::Number(12));
        let manifest = Manifest {
            timestamp: "2024-03-05T14:07:09+00:00".to_string(),
            repository: "acme/widgets".to_string(),
            imported_count: 1,
            results: &outcome,
        };
        let json = serde_json::to_value(&manifest).unwrap();
        assert_eq!(json["repository"], "acme/widgets");
        assert_eq!(json["imported_count"], 1);
        assert_eq!(json["results"]["BUG-1"], "12");
        assert!(json["timestamp"].is_string());
    }
}
