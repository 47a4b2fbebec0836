//! Batch pipeline stages.
//!
//! A batch is discovered and paired once, then every pair is combined,
//! qualified and assessed on its own. A failing pair is recorded and the
//! batch moves on. Output files are written only after every pair and the
//! statistics have been computed in memory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use fusion_common::stack_string_frames;
use fusion_ingest::{FilePair, PairingResult, collect_inputs, pair_files, read_export};
use fusion_model::AssayProfile;
use fusion_report::{
    COMBINED_FILE_NAME, GroupStatistics, STATISTICS_FILE_NAME, StatisticsReport,
    compute_statistics, write_combined_csv, write_pq_results, write_statistics_json,
};
use fusion_standards::{InstrumentRegistry, ProfileRegistry, load_profile_file};
use fusion_transform::{CombineOptions, FrameMeta, UnmatchedPolicy, combine_pair};
use fusion_validate::{QualifiedFrame, RejectionReason, RuleEngine, RunAssessment, assess_run};
use polars::prelude::DataFrame;
use tracing::{debug, info, info_span, warn};

use crate::logging::redact_value;

/// Resolves the assay profile: a profile file wins over a built-in name.
pub fn resolve_profile(name: &str, profile_file: Option<&Path>) -> Result<AssayProfile> {
    if let Some(path) = profile_file {
        return load_profile_file(path)
            .with_context(|| format!("load assay profile {}", path.display()));
    }
    let registry = ProfileRegistry::builtin().context("load built-in assay profiles")?;
    let profile = registry.resolve(name)?;
    Ok(profile.clone())
}

/// Replaces the profile's positive and negative label sets for one run.
/// An empty list keeps the profile's labels; label patterns are untouched.
pub fn override_labels(profile: &mut AssayProfile, positive: &[String], negative: &[String]) {
    if !positive.is_empty() {
        debug!(labels = ?positive, "overriding positive labels");
        profile.labels.positive = positive.to_vec();
    }
    if !negative.is_empty() {
        debug!(labels = ?negative, "overriding negative labels");
        profile.labels.negative = negative.to_vec();
    }
}

pub fn load_instruments(path: Option<&Path>) -> Result<Option<InstrumentRegistry>> {
    path.map(|path| {
        InstrumentRegistry::load(path)
            .with_context(|| format!("load instrument registry {}", path.display()))
    })
    .transpose()
}

/// Expands directories and pairs every export file found.
pub fn discover(inputs: &[PathBuf]) -> Result<PairingResult> {
    let files = collect_inputs(inputs).context("collect input files")?;
    let pairing = pair_files(&files);
    info!(
        file_count = files.len(),
        paired = pairing.pair_count(),
        no_pairs = pairing.no_pairs.len(),
        unrecognized = pairing.unrecognized.len(),
        "paired export files"
    );
    for path in &pairing.no_pairs {
        debug!(path = %path.display(), "export file has no counterpart");
    }
    Ok(pairing)
}

/// The outcome of one qualified pair.
#[derive(Debug, Clone)]
pub struct PairOutcome {
    pub frame: QualifiedFrame,
    pub assessment: RunAssessment,
}

/// Combines, qualifies and assesses one file pair.
pub fn process_pair(
    pair: &FilePair,
    profile: &AssayProfile,
    engine: &RuleEngine<'_>,
    instruments: Option<&InstrumentRegistry>,
    unmatched: UnmatchedPolicy,
) -> Result<PairOutcome> {
    let pcr = read_export(&pair.pcr, &profile.pcr)?;
    let lis = read_export(&pair.lis, &profile.lis)?;
    let options = CombineOptions {
        unmatched,
        instruments,
        meta: FrameMeta {
            pair_key: pair.key.to_string(),
            pcr_file: Some(pair.pcr.clone()),
            lis_file: Some(pair.lis.clone()),
            device_id: Some(pair.device_id.clone()),
        },
    };
    let combined = combine_pair(pcr, lis, profile, options)?;
    for key in &combined.report.lis_without_pcr {
        warn!(specimen = redact_value(key), "LIS specimen has no PCR rows");
    }
    for key in &combined.report.pcr_without_lis {
        warn!(specimen = redact_value(key), "PCR specimen has no LIS row");
    }

    let frame = engine.qualify(&combined)?;
    let assessment = assess_run(&frame.specimens, &profile.acceptance);
    if !assessment.is_accepted() {
        let reasons: Vec<&str> = assessment
            .rejections
            .iter()
            .map(RejectionReason::as_str)
            .collect();
        warn!(pair_key = %pair.key, reasons = ?reasons, "run rejected");
    }
    Ok(PairOutcome { frame, assessment })
}

/// Per-pair result kept for the summary.
#[derive(Debug, Clone)]
pub struct PairSummary {
    pub key: String,
    pub outcome: Result<PairOutcome, String>,
    pub pq_results: Option<PathBuf>,
}

impl PairSummary {
    pub fn is_rejected(&self) -> bool {
        match &self.outcome {
            Ok(outcome) => !outcome.assessment.is_accepted(),
            Err(_) => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub inputs: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub group_by: String,
    pub unmatched: UnmatchedPolicy,
    pub dry_run: bool,
}

#[derive(Debug)]
pub struct BatchResult {
    pub profile: String,
    pub output_dir: PathBuf,
    pub pairing: PairingResult,
    pub pairs: Vec<PairSummary>,
    pub statistics: Vec<GroupStatistics>,
    pub combined: Option<PathBuf>,
    pub statistics_file: Option<PathBuf>,
    pub errors: Vec<String>,
}

impl BatchResult {
    /// True when any pair failed or any run was rejected.
    pub fn has_failures(&self) -> bool {
        !self.errors.is_empty() || self.pairs.iter().any(PairSummary::is_rejected)
    }
}

/// Default output directory: `output/` beside the first input.
pub fn default_output_dir(inputs: &[PathBuf]) -> PathBuf {
    let base = match inputs.first() {
        Some(path) if path.is_dir() => path.clone(),
        Some(path) => path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
        None => PathBuf::new(),
    };
    base.join("output")
}

/// Stacks every qualified pair into one table.
pub fn stack_pairs(pairs: &[PairSummary]) -> Result<Option<DataFrame>> {
    let frames: Vec<&DataFrame> = pairs
        .iter()
        .filter_map(|pair| pair.outcome.as_ref().ok())
        .map(|outcome| &outcome.frame.data)
        .collect();
    if frames.is_empty() {
        return Ok(None);
    }
    let stacked = stack_string_frames(&frames).context("stack qualified tables")?;
    Ok(Some(stacked))
}

pub fn run_batch(
    config: &BatchConfig,
    profile: &AssayProfile,
    instruments: Option<&InstrumentRegistry>,
) -> Result<BatchResult> {
    let engine = RuleEngine::new(profile).context("compile label rules")?;

    // =========================================================================
    // Stage 1: Discover and pair export files
    // =========================================================================
    let pairing = discover(&config.inputs)?;

    // =========================================================================
    // Stage 2: Combine, qualify and assess each pair
    // =========================================================================
    let mut errors = Vec::new();
    let mut pairs = Vec::with_capacity(pairing.pair_count());
    for (key, pair) in &pairing.paired {
        let span = info_span!("pair", pair_key = %key);
        let start = Instant::now();
        let outcome = span.in_scope(|| {
            process_pair(pair, profile, &engine, instruments, config.unmatched)
        });
        let outcome = match outcome {
            Ok(outcome) => {
                debug!(
                    pair_key = %key,
                    records = outcome.frame.record_count(),
                    duration_ms = start.elapsed().as_millis(),
                    "pair complete"
                );
                Ok(outcome)
            }
            Err(error) => {
                let message = format!("{key}: {error:#}");
                warn!(pair_key = %key, error = %format!("{error:#}"), "pair failed");
                errors.push(message.clone());
                Err(message)
            }
        };
        pairs.push(PairSummary {
            key: key.to_string(),
            outcome,
            pq_results: None,
        });
    }

    // =========================================================================
    // Stage 3: Aggregate across pairs
    // =========================================================================
    let stacked = stack_pairs(&pairs)?;
    let statistics = match &stacked {
        Some(data) => compute_statistics(data, profile, engine.labels(), &config.group_by)?,
        None => Vec::new(),
    };
    info!(
        pairs = pairs.len(),
        groups = statistics.len(),
        group_by = %config.group_by,
        "aggregated statistics"
    );

    let mut result = BatchResult {
        profile: profile.name.clone(),
        output_dir: config.output_dir.clone(),
        pairing,
        pairs,
        statistics,
        combined: None,
        statistics_file: None,
        errors,
    };

    // =========================================================================
    // Stage 4: Write outputs
    // =========================================================================
    if config.dry_run {
        info!("dry run, skipping output files");
        return Ok(result);
    }
    if let Err(error) = write_outputs(&mut result, stacked.as_ref(), &config.group_by) {
        result.errors.push(format!("write outputs: {error:#}"));
    }
    Ok(result)
}

fn write_outputs(
    result: &mut BatchResult,
    stacked: Option<&DataFrame>,
    group_by: &str,
) -> Result<()> {
    let Some(stacked) = stacked else {
        return Ok(());
    };
    fs::create_dir_all(&result.output_dir)
        .with_context(|| format!("create {}", result.output_dir.display()))?;

    let combined = result.output_dir.join(COMBINED_FILE_NAME);
    write_combined_csv(&combined, stacked)?;
    result.combined = Some(combined);

    let statistics = result.output_dir.join(STATISTICS_FILE_NAME);
    write_statistics_json(
        &statistics,
        &StatisticsReport::new(&result.profile, group_by, &result.statistics),
    )?;
    result.statistics_file = Some(statistics);

    for pair in &mut result.pairs {
        if let Ok(outcome) = &pair.outcome {
            let path = write_pq_results(&result.output_dir, &pair.key, &outcome.assessment)?;
            pair.pq_results = Some(path);
        }
    }
    Ok(())
}
