use std::fs;

use fusion_standards::{InstrumentRegistry, ProfileRegistry, StandardsError, load_profile_file};

const BUILTIN: &str = include_str!("../profiles/paraflu.toml");

#[test]
fn profile_file_overrides_builtin() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    let contents = BUILTIN
        .replace("name = \"paraflu\"", "name = \"paraflu-lab\"")
        .replace("aliases = [\"P 1/2/3/4\"]", "aliases = []");
    fs::write(&path, contents).unwrap();

    let profile = load_profile_file(&path).unwrap();
    assert_eq!(profile.name, "paraflu-lab");

    let mut registry = ProfileRegistry::builtin().unwrap();
    registry.insert(profile);
    assert_eq!(registry.profiles().len(), 2);
    assert_eq!(registry.resolve("PARAFLU-LAB").unwrap().name, "paraflu-lab");
}

#[test]
fn missing_profile_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_profile_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, StandardsError::Io { .. }));
}

#[test]
fn invalid_regex_is_reported_as_invalid_profile() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(
        &path,
        BUILTIN.replace("positive_pattern = \"^103101\"", "positive_pattern = \"(103101\""),
    )
    .unwrap();

    let err = load_profile_file(&path).unwrap_err();
    assert!(matches!(err, StandardsError::InvalidProfile { .. }), "{err}");
}

#[test]
fn duplicate_channel_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dup.toml");
    let duplicate = "\n[[channels]]\nchannel = \"FAM\"\nrole = \"target\"\ninterpretation_column = \"x\"\nct_column = \"y\"\nrfu_column = \"z\"\n";
    // Inserted ahead of the first trim table so it joins the channel array.
    let (head, tail) = BUILTIN.split_at(BUILTIN.find("[[trims]]").unwrap());
    fs::write(&path, format!("{head}{duplicate}\n{tail}")).unwrap();

    let err = load_profile_file(&path).unwrap_err();
    assert!(err.to_string().contains("listed twice"), "{err}");
}

#[test]
fn instrument_registry_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("instruments.toml");
    fs::write(
        &path,
        "[devices]\n\"2090000574\" = \"SN-1\"\n\n[software]\n\"SN-1\" = \"7.2\"\n",
    )
    .unwrap();

    let registry = InstrumentRegistry::load(&path).unwrap();
    assert_eq!(registry.serial_for("2090000574"), Some("SN-1"));
    assert_eq!(registry.software_for("SN-1"), Some("7.2"));
}
