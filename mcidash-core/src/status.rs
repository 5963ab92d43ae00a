//! Canonical status classification
//!
//! Raw status strings arrive from the feed in several shapes: plain verbs
//! ("Running"), compound markers ("Partial-Failed"), progress annotations
//! ("Creating(10/20)"). Every call site in the dashboard normalizes through
//! the single ladder below so that tables, charts, and badges can never
//! disagree about what bucket a record falls into.

use serde::Serialize;

/// The fixed classification bucket for a raw status string.
///
/// Exactly nine members; anything the ladder cannot place resolves to
/// `Other`, never a distinct "unknown" value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum CanonicalStatus {
    Preparing,
    Creating,
    Running,
    Suspended,
    Terminating,
    Terminated,
    Failed,
    Partial,
    Other,
}

impl CanonicalStatus {
    /// Presentation order for chart series and badge rows. Series arrays in
    /// the view model align index-for-index with this sequence.
    pub const ALL: [CanonicalStatus; 9] = [
        CanonicalStatus::Preparing,
        CanonicalStatus::Creating,
        CanonicalStatus::Running,
        CanonicalStatus::Suspended,
        CanonicalStatus::Terminating,
        CanonicalStatus::Terminated,
        CanonicalStatus::Failed,
        CanonicalStatus::Partial,
        CanonicalStatus::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CanonicalStatus::Preparing => "Preparing",
            CanonicalStatus::Creating => "Creating",
            CanonicalStatus::Running => "Running",
            CanonicalStatus::Suspended => "Suspended",
            CanonicalStatus::Terminating => "Terminating",
            CanonicalStatus::Terminated => "Terminated",
            CanonicalStatus::Failed => "Failed",
            CanonicalStatus::Partial => "Partial",
            CanonicalStatus::Other => "Other",
        }
    }
}

impl std::fmt::Display for CanonicalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Containment ladder, highest priority first. The order is semantic, not
/// alphabetical: a compound string like "Partial-Failed" must land on
/// `Failed` before the bare `Partial` fallback gets a chance, and
/// "Creating(10/20)" must land on the verb it contains.
const LADDER: [(&str, CanonicalStatus); 7] = [
    ("Running", CanonicalStatus::Running),
    ("Creating", CanonicalStatus::Creating),
    ("Preparing", CanonicalStatus::Preparing),
    ("Suspended", CanonicalStatus::Suspended),
    ("Failed", CanonicalStatus::Failed),
    ("Terminating", CanonicalStatus::Terminating),
    ("Terminated", CanonicalStatus::Terminated),
];

/// Map a raw status string to its canonical bucket.
///
/// Total and pure: never panics, every input resolves to exactly one of the
/// nine buckets. Substring checks are case-sensitive because the feed emits
/// proper-cased verbs; a lowercased or garbled string is `Other` by design
/// of the taxonomy, not an error.
pub fn classify(raw: &str) -> CanonicalStatus {
    let s = raw.trim();
    if s.is_empty() {
        return CanonicalStatus::Other;
    }
    for (needle, tag) in LADDER {
        if s.contains(needle) {
            return tag;
        }
    }
    // Partial-Running and Partial-Failed were already caught by the ladder;
    // only a bare partial marker reaches this point.
    if s.contains("Partial") {
        return CanonicalStatus::Partial;
    }
    CanonicalStatus::Other
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_verbs() {
        assert_eq!(classify("Running"), CanonicalStatus::Running);
        assert_eq!(classify("Creating"), CanonicalStatus::Creating);
        assert_eq!(classify("Preparing"), CanonicalStatus::Preparing);
        assert_eq!(classify("Suspended"), CanonicalStatus::Suspended);
        assert_eq!(classify("Terminating"), CanonicalStatus::Terminating);
        assert_eq!(classify("Terminated"), CanonicalStatus::Terminated);
        assert_eq!(classify("Failed"), CanonicalStatus::Failed);
    }

    #[test]
    fn test_progress_annotations_land_on_the_verb() {
        assert_eq!(classify("Creating(10/20)"), CanonicalStatus::Creating);
        assert_eq!(classify("Creating(3/5)"), CanonicalStatus::Creating);
        assert_eq!(classify("Terminating(1/4)"), CanonicalStatus::Terminating);
    }

    #[test]
    fn test_partial_compounds() {
        assert_eq!(classify("Partial-Failed"), CanonicalStatus::Failed);
        assert_eq!(classify("Partial-Running"), CanonicalStatus::Running);
        assert_eq!(classify("Partial"), CanonicalStatus::Partial);
        assert_eq!(classify("Partial-Suspended"), CanonicalStatus::Suspended);
    }

    #[test]
    fn test_empty_and_garbage_resolve_to_other() {
        assert_eq!(classify(""), CanonicalStatus::Other);
        assert_eq!(classify("   "), CanonicalStatus::Other);
        assert_eq!(classify("???"), CanonicalStatus::Other);
        assert_eq!(classify("deleted"), CanonicalStatus::Other);
    }

    #[test]
    fn test_case_sensitive() {
        // The feed emits proper-cased verbs; anything else is Other.
        assert_eq!(classify("running"), CanonicalStatus::Other);
        assert_eq!(classify("RUNNING"), CanonicalStatus::Other);
    }

    #[test]
    fn test_ladder_priority() {
        // Running outranks everything else it co-occurs with.
        assert_eq!(classify("Running-Failed"), CanonicalStatus::Running);
        // Failed outranks the terminate family.
        assert_eq!(classify("Terminating-Failed"), CanonicalStatus::Failed);
    }

    #[test]
    fn test_mixed_feed_corpus() {
        let raw = ["Running", "Partial-Failed", "Creating(3/5)", ""];
        let got: Vec<CanonicalStatus> = raw.iter().map(|s| classify(s)).collect();
        assert_eq!(
            got,
            vec![
                CanonicalStatus::Running,
                CanonicalStatus::Failed,
                CanonicalStatus::Creating,
                CanonicalStatus::Other,
            ]
        );
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        assert_eq!(classify("  Running  "), CanonicalStatus::Running);
    }
}
