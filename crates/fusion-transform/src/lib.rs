//! Reshape & join engine for paired PCR/LIS exports.
//!
//! The PCR export is pivoted from one row per (specimen, channel) to one row
//! per specimen and left-joined onto the LIS export, which is the
//! authoritative specimen list. Signal fields of negative channels are
//! blanked and channel-duplicated identifiers are consolidated.

pub mod cleanup;
pub mod combine;
pub mod error;
pub mod frame;
pub mod join;
pub mod pivot;
pub mod prepare;
pub mod schema;

pub use cleanup::{NO_SIGNAL, blank_negative_signals, consolidate_fields};
pub use combine::{CombineOptions, combine_pair, prepare_lis, prepare_pcr};
pub use error::{Result, TransformError};
pub use frame::{CombinedFrame, FrameMeta};
pub use join::{JoinReport, JoinedTable, UnmatchedPolicy, join_sources};
pub use pivot::{PcrPivot, pivot_channels};
pub use schema::{
    engine_columns, missing_columns, required_lis_columns, required_pcr_columns,
    validate_columns,
};
