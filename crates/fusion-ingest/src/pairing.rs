//! Pairs PCR and LIS exports that describe the same run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::codec::{DecodedFileName, ExportKind, PairKey, decode_file_name};

/// A PCR export and the LIS export that shares its key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilePair {
    pub key: PairKey,
    pub pcr: PathBuf,
    pub lis: PathBuf,
    /// Device identifier decoded from the PCR file name.
    pub device_id: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PairingResult {
    pub paired: BTreeMap<PairKey, FilePair>,
    /// Files whose key had only one side.
    pub no_pairs: Vec<PathBuf>,
    /// Files matching neither marker, or failing to decode.
    pub unrecognized: Vec<PathBuf>,
    /// PCR files replaced by a later PCR file with the same key.
    pub superseded: Vec<PathBuf>,
}

impl PairingResult {
    pub fn pair_count(&self) -> usize {
        self.paired.len()
    }
}

struct PcrSlot {
    path: PathBuf,
    decoded: DecodedFileName,
    lis: Option<PathBuf>,
}

/// Groups a flat list of paths into pairs, single-sided files and
/// unrecognized files.
///
/// PCR files seed the pairing map; LIS files are then matched against it.
/// When two PCR files share a key the later one in `paths` wins and the
/// earlier one is listed in [`PairingResult::superseded`]. A second LIS
/// file for an already matched key is reported in `no_pairs`.
pub fn pair_files(paths: &[PathBuf]) -> PairingResult {
    let mut result = PairingResult::default();
    let mut pcr_files = Vec::new();
    let mut lis_files = Vec::new();

    for path in paths {
        let name = path_text(path);
        match decode_file_name(&name) {
            Ok(decoded) => match decoded.kind {
                ExportKind::Pcr => pcr_files.push((path.clone(), decoded)),
                ExportKind::Lis => lis_files.push((path.clone(), decoded)),
            },
            Err(err) => {
                debug!(path = %path.display(), error = %err, "unrecognized export file");
                result.unrecognized.push(path.clone());
            }
        }
    }

    let mut slots: BTreeMap<PairKey, PcrSlot> = BTreeMap::new();
    for (path, decoded) in pcr_files {
        let key = decoded.key.clone();
        let slot = PcrSlot {
            path,
            decoded,
            lis: None,
        };
        if let Some(previous) = slots.insert(key.clone(), slot) {
            warn!(
                pair_key = %key,
                replaced = %previous.path.display(),
                "duplicate PCR export key, keeping the later file"
            );
            result.superseded.push(previous.path);
        }
    }

    for (path, decoded) in lis_files {
        match slots.get_mut(&decoded.key) {
            Some(slot) if slot.lis.is_none() => slot.lis = Some(path),
            Some(_) => {
                warn!(pair_key = %decoded.key, path = %path.display(), "second LIS export for key");
                result.no_pairs.push(path);
            }
            None => result.no_pairs.push(path),
        }
    }

    for (key, slot) in slots {
        match slot.lis {
            Some(lis) => {
                result.paired.insert(
                    key.clone(),
                    FilePair {
                        key,
                        pcr: slot.path,
                        lis,
                        device_id: slot.decoded.device_id,
                    },
                );
            }
            None => result.no_pairs.push(slot.path),
        }
    }

    debug!(
        paired = result.paired.len(),
        no_pairs = result.no_pairs.len(),
        unrecognized = result.unrecognized.len(),
        "paired export files"
    );
    result
}

fn path_text(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.to_string_lossy(), |name| name.to_string_lossy())
        .into_owned()
}
