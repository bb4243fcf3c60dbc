use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Patient identifiers grouped by alert category.
///
/// Each category is a set, so duplicates introduced by pagination or
/// retries collapse. A patient may sit in several categories at once.
/// `BTreeSet` keeps the serialized arrays in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSets {
    pub high_risk_patients: BTreeSet<String>,
    pub fever_patients: BTreeSet<String>,
    pub data_quality_issues: BTreeSet<String>,
}

impl AlertSets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.high_risk_patients.is_empty()
            && self.fever_patients.is_empty()
            && self.data_quality_issues.is_empty()
    }

    /// Per-category counts, for logging and run summaries.
    pub fn counts(&self) -> AlertCounts {
        AlertCounts {
            high_risk: self.high_risk_patients.len(),
            fever: self.fever_patients.len(),
            data_quality: self.data_quality_issues.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertCounts {
    pub high_risk: usize,
    pub fever: usize,
    pub data_quality: usize,
}
