//! Aggregation and output for qualified specimen tables.
//!
//! - [`compute_statistics`] groups a stacked table and summarizes each channel.
//! - [`write_combined_csv`], [`write_statistics_json`] and [`write_pq_results`]
//!   write the result files, each through a temporary file and a rename.

pub mod output;
pub mod pq_results;
pub mod stats;

pub use output::{
    COMBINED_FILE_NAME, STATISTICS_FILE_NAME, StatisticsReport, write_atomic, write_combined_csv,
    write_statistics_json,
};
pub use pq_results::{pq_results_file_name, render_pq_results, write_pq_results};
pub use stats::{
    CallCounts, CategoryStatistics, ChannelStatistics, GroupStatistics, Summary,
    compute_statistics,
};
