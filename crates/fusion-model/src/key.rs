//! Composite specimen key used to join PCR and LIS rows.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator placed between the key components.
pub const KEY_SEPARATOR: &str = "_";

/// `(Specimen Barcode, Run ID, Test order #)`, unique per specimen within a run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpecimenKey {
    pub barcode: String,
    pub run_id: String,
    pub test_order: String,
}

impl SpecimenKey {
    pub fn new(
        barcode: impl Into<String>,
        run_id: impl Into<String>,
        test_order: impl Into<String>,
    ) -> Self {
        Self {
            barcode: barcode.into(),
            run_id: run_id.into(),
            test_order: test_order.into(),
        }
    }

    /// Joined form used as the row index of the combined table.
    pub fn joined(&self) -> String {
        [
            self.barcode.as_str(),
            self.run_id.as_str(),
            self.test_order.as_str(),
        ]
        .join(KEY_SEPARATOR)
    }
}

impl fmt::Display for SpecimenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}
