//! Export file name codec.
//!
//! Instruments name their exports `…@DI<device>-<a>-<b>-<c>-<d>-<e>.csv`
//! (PCR) and `…@Pt2<device>-<a>-<b>-<c>-<d>-<e>.lis` (LIS). The text after
//! the marker is split on `-`; the device identifier and segments 3, 4
//! and 5 (without the extension) form the key shared by both files of a run.

use std::fmt;

use serde::Serialize;

use crate::error::{IngestError, Result};

pub const PCR_MARKER: &str = "@DI";
pub const LIS_MARKER: &str = "@Pt2";

const MIN_SEGMENTS: usize = 6;
const KEY_SEPARATOR: &str = "_";

/// Which export family a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ExportKind {
    Pcr,
    Lis,
}

impl ExportKind {
    pub fn marker(&self) -> &'static str {
        match self {
            ExportKind::Pcr => PCR_MARKER,
            ExportKind::Lis => LIS_MARKER,
        }
    }

    /// File extension carried by the last key segment.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportKind::Pcr => ".csv",
            ExportKind::Lis => ".lis",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::Pcr => "PCR",
            ExportKind::Lis => "LIS",
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Key pairing a PCR export with its LIS export.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PairKey(String);

impl PairKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PairKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The parts of a decoded export file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedFileName {
    pub kind: ExportKind,
    /// Segment 0 without the marker.
    pub device_id: String,
    /// Every `-`-delimited segment after the marker, extension stripped from segment 5.
    pub segments: Vec<String>,
    pub key: PairKey,
}

/// Classifies a path by its marker; `None` for files of neither family.
pub fn export_kind(path: &str) -> Option<ExportKind> {
    if path.contains(PCR_MARKER) {
        Some(ExportKind::Pcr)
    } else if path.contains(LIS_MARKER) {
        Some(ExportKind::Lis)
    } else {
        None
    }
}

/// Decodes an export file name (or full path) into its key.
pub fn decode_file_name(path: &str) -> Result<DecodedFileName> {
    let unrecognized = |reason: String| IngestError::UnrecognizedFileName {
        name: path.to_string(),
        reason,
    };

    let kind = export_kind(path).ok_or_else(|| {
        unrecognized(format!(
            "neither {PCR_MARKER} nor {LIS_MARKER} marker present"
        ))
    })?;
    let marker = kind.marker();
    let start = path
        .find(marker)
        .ok_or_else(|| unrecognized(format!("{marker} marker not found")))?;
    let tail = &path[start + marker.len()..];

    let mut segments: Vec<String> = tail.split('-').map(str::to_string).collect();
    if segments.len() < MIN_SEGMENTS {
        return Err(unrecognized(format!(
            "expected at least {MIN_SEGMENTS} '-'-delimited segments after {marker}, found {}",
            segments.len()
        )));
    }
    segments[5] = strip_extension(&segments[5], kind.extension()).to_string();

    let device_id = segments[0].clone();
    let key = [
        device_id.as_str(),
        segments[3].as_str(),
        segments[4].as_str(),
        segments[5].as_str(),
    ]
    .join(KEY_SEPARATOR);

    Ok(DecodedFileName {
        kind,
        device_id,
        segments,
        key: PairKey(key),
    })
}

fn strip_extension<'a>(segment: &'a str, extension: &str) -> &'a str {
    let split = segment.len().saturating_sub(extension.len());
    match (segment.get(..split), segment.get(split..)) {
        (Some(stem), Some(ext)) if ext.eq_ignore_ascii_case(extension) => stem,
        _ => segment,
    }
}
