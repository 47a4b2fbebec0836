//! The per-run PQ results file.

use std::fmt::Write as _;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fusion_model::SpecimenKey;
use fusion_validate::{RejectionReason, RunAssessment};
use tracing::info;

use crate::output::write_atomic;

const COLUMN_HEADER: &str = "SPECIMEN BARCODE\tRUN ID\tTEST ORDER #";

/// `PASS_PQ-<id>-pq_results.tsv` or `FAIL_PQ-<id>-pq_results.tsv`.
pub fn pq_results_file_name(run_id: &str, accepted: bool) -> String {
    let tag = if accepted { "PASS" } else { "FAIL" };
    format!("{tag}_PQ-{run_id}-pq_results.tsv")
}

fn push_key(out: &mut String, key: &SpecimenKey) {
    let _ = writeln!(out, "{}\t{}\t{}", key.barcode, key.run_id, key.test_order);
}

/// Renders the file body: one section per rejection reason, or
/// `PQ passed.` for an accepted run.
pub fn render_pq_results(assessment: &RunAssessment) -> String {
    if assessment.is_accepted() {
        return "PQ passed.".to_string();
    }
    let mut out = String::new();
    for reason in &assessment.rejections {
        match reason {
            RejectionReason::PqThreshold => {
                let _ = writeln!(out, "FAIL REASON:\t{reason}\n");
                let _ = writeln!(out, "{COLUMN_HEADER}");
                for (channel, keys) in &assessment.pq_failures {
                    if keys.is_empty() {
                        continue;
                    }
                    let _ = writeln!(out, "CHANNEL:\t{channel}");
                    for key in keys {
                        push_key(&mut out, key);
                    }
                }
            }
            _ => {
                let _ = writeln!(out, "FAIL REASON:\t{reason}");
                let _ = writeln!(out, "{COLUMN_HEADER}");
                for key in assessment.specimens_for(*reason) {
                    push_key(&mut out, key);
                }
            }
        }
    }
    out
}

/// Writes the PQ results file for one run into `dir` and returns its path.
pub fn write_pq_results(dir: &Path, run_id: &str, assessment: &RunAssessment) -> Result<PathBuf> {
    let path = dir.join(pq_results_file_name(run_id, assessment.is_accepted()));
    let body = render_pq_results(assessment);
    write_atomic(&path, |writer| {
        writer
            .write_all(body.as_bytes())
            .with_context(|| format!("write {}", path.display()))
    })?;
    info!(
        path = %path.display(),
        accepted = assessment.is_accepted(),
        "wrote PQ results"
    );
    Ok(path)
}
