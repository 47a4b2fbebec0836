//! Optional mapping from decoded device identifiers to instrument serials
//! and from serials to installed software versions.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, StandardsError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstrumentRegistry {
    /// Device identifier (from the export file name) to instrument serial.
    #[serde(default)]
    pub devices: BTreeMap<String, String>,
    /// Instrument serial to software version.
    #[serde(default)]
    pub software: BTreeMap<String, String>,
}

impl InstrumentRegistry {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| StandardsError::io(path, e))?;
        let registry = Self::parse(&path.display().to_string(), &contents)?;
        debug!(
            devices = registry.devices.len(),
            versions = registry.software.len(),
            "loaded instrument registry"
        );
        Ok(registry)
    }

    pub fn parse(origin: &str, contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| StandardsError::Toml {
            origin: origin.to_string(),
            source: e,
        })
    }

    pub fn serial_for(&self, device_id: &str) -> Option<&str> {
        self.devices.get(device_id.trim()).map(String::as_str)
    }

    pub fn software_for(&self, serial: &str) -> Option<&str> {
        self.software.get(serial.trim()).map(String::as_str)
    }

    /// Serial and software version for a device, falling back to the
    /// serial reported by the LIS export when the device is unmapped.
    pub fn resolve(&self, device_id: &str, lis_serial: &str) -> (String, String) {
        let serial = self
            .serial_for(device_id)
            .unwrap_or(lis_serial)
            .to_string();
        let version = self.software_for(&serial).unwrap_or_default().to_string();
        (serial, version)
    }
}
