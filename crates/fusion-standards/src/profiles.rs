#![deny(unsafe_code)]

use std::path::Path;

use fusion_model::AssayProfile;
use tracing::debug;

use crate::error::{Result, StandardsError};

/// Profiles compiled into the binary: (origin label, TOML source).
const BUILTIN_PROFILES: &[(&str, &str)] = &[(
    "builtin:paraflu",
    include_str!("../profiles/paraflu.toml"),
)];

/// Parses and validates one profile. `origin` names the source in errors.
pub fn parse_profile(origin: &str, contents: &str) -> Result<AssayProfile> {
    let profile: AssayProfile = toml::from_str(contents).map_err(|e| StandardsError::Toml {
        origin: origin.to_string(),
        source: e,
    })?;
    profile
        .validate()
        .map_err(|e| StandardsError::InvalidProfile {
            origin: origin.to_string(),
            source: e,
        })?;
    Ok(profile)
}

/// Loads a user-supplied profile with the same schema as the built-in ones.
pub fn load_profile_file(path: &Path) -> Result<AssayProfile> {
    let contents = std::fs::read_to_string(path).map_err(|e| StandardsError::io(path, e))?;
    let profile = parse_profile(&path.display().to_string(), &contents)?;
    debug!(profile = %profile.name, path = %path.display(), "loaded assay profile file");
    Ok(profile)
}

/// Names of the built-in profiles, without parsing them.
pub fn builtin_profile_names() -> Vec<&'static str> {
    BUILTIN_PROFILES
        .iter()
        .map(|(origin, _)| origin.trim_start_matches("builtin:"))
        .collect()
}

/// The set of assay profiles available to a run.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: Vec<AssayProfile>,
}

impl ProfileRegistry {
    /// Parses every built-in profile.
    pub fn builtin() -> Result<Self> {
        let profiles = BUILTIN_PROFILES
            .iter()
            .map(|(origin, contents)| parse_profile(origin, contents))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { profiles })
    }

    /// Adds a profile, replacing any existing profile of the same name.
    pub fn insert(&mut self, profile: AssayProfile) {
        self.profiles.retain(|p| !p.name.eq_ignore_ascii_case(&profile.name));
        self.profiles.push(profile);
    }

    pub fn profiles(&self) -> &[AssayProfile] {
        &self.profiles
    }

    /// Finds a profile by name or alias.
    pub fn resolve(&self, name: &str) -> Result<&AssayProfile> {
        self.profiles
            .iter()
            .find(|profile| profile.matches_name(name))
            .ok_or_else(|| StandardsError::UnknownProfile {
                name: name.to_string(),
                available: self
                    .profiles
                    .iter()
                    .map(|profile| profile.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fusion_model::{Channel, SampleCategory};

    #[test]
    fn builtin_paraflu_is_valid() {
        let registry = ProfileRegistry::builtin().unwrap();
        let profile = registry.resolve("paraflu").unwrap();
        assert_eq!(profile.channels.len(), 5);
        assert_eq!(profile.target_channels().count(), 4);
        assert_eq!(profile.lis.delimiter, '\t');
        assert_eq!(profile.pcr.delimiter, ',');
        assert_eq!(profile.trims.len(), 6);
        assert_eq!(
            profile.lis.canonical_name("Interpretation 10"),
            "Valid/Invalid for IC"
        );
    }

    #[test]
    fn alias_resolves_to_paraflu() {
        let registry = ProfileRegistry::builtin().unwrap();
        assert_eq!(registry.resolve("P 1/2/3/4").unwrap().name, "paraflu");
    }

    #[test]
    fn paraflu_thresholds() {
        let registry = ProfileRegistry::builtin().unwrap();
        let profile = registry.resolve("paraflu").unwrap();
        let expected = [
            (Channel::Fam, 1200.0),
            (Channel::Hex, 2000.0),
            (Channel::Rox, 1500.0),
            (Channel::Red647, 400.0),
        ];
        for (channel, bound) in expected {
            let pos = profile.threshold(SampleCategory::Positive, channel);
            assert_eq!((pos.min, pos.max), (Some(bound), None), "{channel}");
            let neg = profile.threshold(SampleCategory::Negative, channel);
            assert_eq!((neg.min, neg.max), (None, Some(bound)), "{channel}");
        }
        assert!(
            profile
                .threshold(SampleCategory::Positive, Channel::Ic)
                .is_unbounded()
        );
        assert_eq!(
            profile
                .threshold(SampleCategory::Negative, Channel::Ic)
                .min,
            Some(0.0)
        );
        assert_eq!(profile.acceptance.pq_allowance(Channel::Red647), 2);
        assert_eq!(profile.acceptance.pq_allowance(Channel::Hex), 1);
    }

    #[test]
    fn unknown_profile_lists_available() {
        let registry = ProfileRegistry::builtin().unwrap();
        let err = registry.resolve("adeno").unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown assay profile 'adeno' (available: paraflu)"
        );
    }

    #[test]
    fn builtin_names() {
        assert_eq!(builtin_profile_names(), vec!["paraflu"]);
    }
}
