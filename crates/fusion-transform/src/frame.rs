//! The combined specimen table.

use std::path::PathBuf;

use fusion_common::column_value_string;
use fusion_model::SpecimenKey;
use polars::prelude::DataFrame;

use crate::join::JoinReport;

/// Where a combined frame came from.
#[derive(Debug, Clone, Default)]
pub struct FrameMeta {
    /// Key shared by the paired export file names.
    pub pair_key: String,
    pub pcr_file: Option<PathBuf>,
    pub lis_file: Option<PathBuf>,
    pub device_id: Option<String>,
}

/// One row per specimen key: LIS fields, pivoted PCR fields and
/// consolidated fields, all held as text.
#[derive(Debug, Clone)]
pub struct CombinedFrame {
    pub data: DataFrame,
    /// Specimen key of each row, in row order.
    pub keys: Vec<SpecimenKey>,
    pub report: JoinReport,
    pub meta: FrameMeta,
}

impl CombinedFrame {
    pub fn record_count(&self) -> usize {
        self.data.height()
    }

    pub fn value(&self, column: &str, row: usize) -> String {
        column_value_string(&self.data, column, row)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.data.column(column).is_ok()
    }
}
