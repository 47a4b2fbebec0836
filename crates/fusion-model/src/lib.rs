pub mod channel;
pub mod columns;
pub mod error;
pub mod key;
pub mod profile;
pub mod verdict;

pub use channel::{Channel, ChannelRole};
pub use error::{ModelError, Result};
pub use key::{KEY_SEPARATOR, SpecimenKey};
pub use profile::{
    AcceptanceRules, AssayProfile, CanonicalColumns, ChannelSpec, ComparisonMode, LabelRules,
    PqAllowance, SourceLayout, Threshold, ThresholdRule, TrimRule, compile_pattern,
};
pub use verdict::{
    CallResult, IcStatus, OverallResult, PqResult, SampleCategory, TruthFlag, Validity,
};
