//! Rendering and writing the PQ results file.

use std::collections::BTreeMap;

use fusion_model::{Channel, SpecimenKey};
use fusion_report::{pq_results_file_name, render_pq_results, write_pq_results};
use fusion_validate::{RejectionReason, RunAssessment};

fn key(idx: usize) -> SpecimenKey {
    SpecimenKey::new(format!("PARA PANEL C_{idx:03}"), "1043", format!("{idx:06}"))
}

fn failing_run() -> RunAssessment {
    RunAssessment {
        invalid_positives: vec![key(2), key(3)],
        pq_failures: BTreeMap::from([(Channel::Rox, vec![key(4), key(5)])]),
        failed_channels: vec![Channel::Rox],
        rejections: vec![RejectionReason::InvalidPositives, RejectionReason::PqThreshold],
        ..RunAssessment::default()
    }
}

#[test]
fn renders_failure_sections() {
    insta::assert_snapshot!(render_pq_results(&failing_run()), @r"
    FAIL REASON:	INVALID POSITIVES
    SPECIMEN BARCODE	RUN ID	TEST ORDER #
    PARA PANEL C_002	1043	000002
    PARA PANEL C_003	1043	000003
    FAIL REASON:	DID NOT MEET PQ THRESHOLD

    SPECIMEN BARCODE	RUN ID	TEST ORDER #
    CHANNEL:	ROX
    PARA PANEL C_004	1043	000004
    PARA PANEL C_005	1043	000005
    ");
}

#[test]
fn renders_passing_run() {
    insta::assert_snapshot!(render_pq_results(&RunAssessment::default()), @"PQ passed.");
}

#[test]
fn file_name_carries_outcome() {
    assert_eq!(
        pq_results_file_name("2090000574_000574_20160701_04", true),
        "PASS_PQ-2090000574_000574_20160701_04-pq_results.tsv"
    );
    assert_eq!(
        pq_results_file_name("x", false),
        "FAIL_PQ-x-pq_results.tsv"
    );
}

#[test]
fn writes_file_into_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pq_results(dir.path(), "run-7", &failing_run()).unwrap();
    assert_eq!(path, dir.path().join("FAIL_PQ-run-7-pq_results.tsv"));
    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.starts_with("FAIL REASON:\tINVALID POSITIVES\n"));
    assert!(contents.contains("CHANNEL:\tROX\n"));

    let path = write_pq_results(dir.path(), "run-8", &RunAssessment::default()).unwrap();
    assert_eq!(std::fs::read_to_string(path).unwrap(), "PQ passed.");
}
