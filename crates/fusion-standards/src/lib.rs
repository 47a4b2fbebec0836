#![deny(unsafe_code)]

pub mod error;
pub mod instruments;
pub mod profiles;

pub use crate::error::{Result, StandardsError};
pub use crate::instruments::InstrumentRegistry;
pub use crate::profiles::{ProfileRegistry, builtin_profile_names, load_profile_file, parse_profile};
