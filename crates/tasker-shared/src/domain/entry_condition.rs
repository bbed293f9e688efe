use serde::{Deserialize, Serialize};

/// The observed terminal status of an upstream activity (§3, §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ActivityStatus {
    Processing,
    Completed,
    Failed,
    Cancelled,
}

/// Predicate on the upstream activity's terminal status deciding whether
/// an edge fires (§3, §4.5 step 5.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum EntryCondition {
    PreviousProcessing,
    PreviousCompleted,
    PreviousFailed,
    PreviousCancelled,
    Always,
    Never,
}

impl EntryCondition {
    /// Evaluate this edge's entry condition against the observed status.
    ///
    /// `Always` is always true, `Never` is always false; the
    /// `Previous*` variants require an exact status match. There is no
    /// "unknown" variant left un-mapped in this enum (that case is
    /// handled at the deserialization boundary instead), matching §4.5's
    /// "unknown ⇒ false" rule by construction.
    pub fn is_satisfied_by(&self, status: ActivityStatus) -> bool {
        match self {
            EntryCondition::PreviousProcessing => status == ActivityStatus::Processing,
            EntryCondition::PreviousCompleted => status == ActivityStatus::Completed,
            EntryCondition::PreviousFailed => status == ActivityStatus::Failed,
            EntryCondition::PreviousCancelled => status == ActivityStatus::Cancelled,
            EntryCondition::Always => true,
            EntryCondition::Never => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_and_never_ignore_status() {
        for status in [
            ActivityStatus::Processing,
            ActivityStatus::Completed,
            ActivityStatus::Failed,
            ActivityStatus::Cancelled,
        ] {
            assert!(EntryCondition::Always.is_satisfied_by(status));
            assert!(!EntryCondition::Never.is_satisfied_by(status));
        }
    }

    #[test]
    fn previous_conditions_require_exact_match() {
        assert!(EntryCondition::PreviousCompleted.is_satisfied_by(ActivityStatus::Completed));
        assert!(!EntryCondition::PreviousCompleted.is_satisfied_by(ActivityStatus::Failed));
        assert!(EntryCondition::PreviousFailed.is_satisfied_by(ActivityStatus::Failed));
        assert!(!EntryCondition::PreviousFailed.is_satisfied_by(ActivityStatus::Completed));
    }
}
