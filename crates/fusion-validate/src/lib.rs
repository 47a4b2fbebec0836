//! Qualification rule engine.
//!
//! Every specimen of a combined table passes through five stages in a fixed
//! order: labeling, false-call detection, validity, PQ thresholds and the
//! overall verdict. Each stage is a pure function of the specimen's fields
//! and the assay profile; the results are appended to the table as derived
//! columns. [`assess_run`] then decides whether the run's controls meet the
//! acceptance limits.

pub mod acceptance;
pub mod engine;
pub mod error;
pub mod labels;
pub mod rules;
pub mod stages;

pub use acceptance::{RejectionReason, RunAssessment, assess_run};
pub use engine::{QualifiedFrame, RuleEngine};
pub use error::{Result, ValidateError};
pub use labels::LabelMatcher;
pub use rules::{channel_validity, overall_verdict, pq_threshold, pq_value, truth_flag};
pub use stages::{
    FalseCalled, Labeled, QualifiedSpecimen, SpecimenRecord, Thresholded, Validated,
    apply_thresholds, conclude, detect_false_calls, label, run_stages, validate,
};
