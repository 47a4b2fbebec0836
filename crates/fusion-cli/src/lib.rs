//! CLI library components for the fusion reconciliation tool.

pub mod logging;
pub mod pipeline;
