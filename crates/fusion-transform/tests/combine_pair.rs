//! Combining a paraflu PCR/LIS pair end to end.

use fusion_ingest::SourceTable;
use fusion_model::columns::{INSTRUMENT_SERIAL, SOFTWARE_VERSION};
use fusion_model::{AssayProfile, Channel};
use fusion_standards::{InstrumentRegistry, ProfileRegistry};
use fusion_transform::{
    CombineOptions, FrameMeta, TransformError, UnmatchedPolicy, combine_pair,
};

const PCR_HEADERS: [&str; 18] = [
    "Specimen Barcode",
    "Analyte",
    "Run ID",
    "Channel",
    "RFU Range",
    "EstimatedBaseline",
    "LR_Ct_NonNormalized",
    "LR_TSlope_NonNormalized",
    "Cartridge Lot #",
    "CapAndVialTrayID",
    "Test order #",
    "FCRBarcode",
    "FERBarcode",
    "ElutionBufferRFID",
    "ReconstitutionBufferRFID",
    "OilRFID",
    "WellID",
    "FusionTestOrder",
];

const LIS_HEADERS: [&str; 23] = [
    "Specimen Barcode",
    "Analyte",
    "Run ID",
    "Instrument Flags",
    "Interpretation 1",
    "Interpretation 2",
    "Interpretation 3",
    "Interpretation 4",
    "Interpretation 5",
    "Interpretation 6",
    "Interpretation 7",
    "Interpretation 8",
    "Interpretation 9",
    "Interpretation 10",
    "Serial Number",
    "Sample Type",
    "Sample Name",
    "Test order #",
    "OtherData 1",
    "OtherData 2",
    "OtherData 3",
    "OtherData 4",
    "OtherData 5",
];

fn paraflu() -> AssayProfile {
    ProfileRegistry::builtin()
        .unwrap()
        .resolve("paraflu")
        .unwrap()
        .clone()
}

fn table(headers: &[&str], rows: Vec<Vec<String>>) -> SourceTable {
    SourceTable::new(headers.iter().map(|h| (*h).to_string()).collect(), rows)
}

fn pcr_rows(barcode: &str, order: &str) -> Vec<Vec<String>> {
    Channel::ALL
        .iter()
        .enumerate()
        .map(|(idx, channel)| {
            [
                barcode,
                "P 1/2/3/4",
                "1043",
                channel.as_str(),
                &format!("{}.5", 1000 + idx),
                &format!("{}", 50 + idx),
                &format!("{}.25", 30 + idx),
                "0.9",
                "LOT-1",
                "00TRAY567890123456",
                order,
                "FCR-12345678901234567",
                "FER-12345678901234567",
                "ELU-12345678901234567",
                "REC-12345678901234567",
                "OIL-12345678901234567",
                &format!("W{}", idx + 1),
                "FTO-1",
            ]
            .iter()
            .map(|v| (*v).to_string())
            .collect()
        })
        .collect()
}

fn lis_row(barcode: &str, order: &str, calls: [&str; 4], ic: &str) -> Vec<String> {
    [
        barcode, "P 1/2/3/4", "1043", "", "31", "32", "33", "34", "28", calls[0], calls[1],
        calls[2], calls[3], ic, "SN-LIS", "Specimen", "", order, "1500", "2500", "900", "600",
        "1800",
    ]
    .iter()
    .map(|v| (*v).to_string())
    .collect()
}

fn end_row(width: usize) -> Vec<String> {
    let mut row = vec![String::new(); width];
    row[0] = "[end]".to_string();
    row
}

#[test]
fn combines_one_row_per_specimen() {
    let profile = paraflu();
    let mut pcr = pcr_rows("PARA PANEL C_007", "000001");
    pcr.extend(pcr_rows("UWH-211", "000002"));
    pcr.push(end_row(PCR_HEADERS.len()));
    let lis = vec![
        lis_row(
            "PARA PANEL C_007",
            "000001",
            ["Positive", "Positive", "Positive", "Positive"],
            "Valid",
        ),
        lis_row(
            "UWH-211",
            "000002",
            ["Negative", "Negative", "Negative", "Negative"],
            "Valid",
        ),
        end_row(LIS_HEADERS.len()),
    ];

    let frame = combine_pair(
        table(&PCR_HEADERS, pcr),
        table(&LIS_HEADERS, lis),
        &profile,
        CombineOptions::default(),
    )
    .unwrap();

    assert_eq!(frame.record_count(), 2);
    assert!(frame.report.is_complete());
    assert_eq!(frame.keys[0].joined(), "PARA PANEL C_007_1043_000001");
    assert_eq!(frame.data.width(), profile.output_columns.len());

    assert_eq!(frame.value("Test order #", 0), "000001");
    assert_eq!(frame.value("FAM Rounded RFU Range (HPIV-1)", 0), "1500");
    assert_eq!(frame.value("HEX-Unrounded RFU Range", 0), "1001.5");
    assert_eq!(frame.value("IC-EstimatedBaseline", 0), "54");
    assert_eq!(frame.value("WellID", 0), "W1");
    assert_eq!(frame.value("CapAndVialTrayID", 0), "TRAY56");
    assert_eq!(frame.value("OilRFID", 0), "123456");

    // Negative calls blank the rounded RFU; a valid IC keeps its signal.
    assert_eq!(frame.value("FAM Rounded RFU Range (HPIV-1)", 1), "-");
    assert_eq!(frame.value("RED647 Rounded RFU Range (HPIV-4)", 1), "-");
    assert_eq!(frame.value("IC Rounded RFU Range", 1), "900");
}

#[test]
fn invalid_ic_blanks_ic_signal() {
    let profile = paraflu();
    let frame = combine_pair(
        table(&PCR_HEADERS, pcr_rows("S1", "1")),
        table(
            &LIS_HEADERS,
            vec![lis_row("S1", "1", ["Positive"; 4], "Invalid")],
        ),
        &profile,
        CombineOptions::default(),
    )
    .unwrap();
    assert_eq!(frame.value("IC Rounded RFU Range", 0), "-");
    assert_eq!(frame.value("FAM Rounded RFU Range (HPIV-1)", 0), "1500");
}

#[test]
fn unmatched_lis_rows_follow_policy() {
    let profile = paraflu();
    let lis = || {
        table(
            &LIS_HEADERS,
            vec![
                lis_row("S1", "1", ["Negative"; 4], "Valid"),
                lis_row("S2", "2", ["Negative"; 4], "Valid"),
            ],
        )
    };
    let mut pcr = pcr_rows("S1", "1");
    pcr.extend(pcr_rows("S9", "9"));

    let kept = combine_pair(
        table(&PCR_HEADERS, pcr.clone()),
        lis(),
        &profile,
        CombineOptions::default(),
    )
    .unwrap();
    assert_eq!(kept.record_count(), 2);
    assert_eq!(kept.report.lis_without_pcr, vec!["S2_1043_2"]);
    assert_eq!(kept.report.pcr_without_lis, vec!["S9_1043_9"]);
    assert_eq!(kept.value("FAM-Unrounded RFU Range", 1), "");

    let diverted = combine_pair(
        table(&PCR_HEADERS, pcr),
        lis(),
        &profile,
        CombineOptions {
            unmatched: UnmatchedPolicy::Divert,
            ..CombineOptions::default()
        },
    )
    .unwrap();
    assert_eq!(diverted.record_count(), 1);
    assert_eq!(diverted.report.diverted, 1);
    assert_eq!(diverted.keys.len(), 1);
}

#[test]
fn schema_drift_names_missing_columns() {
    let profile = paraflu();
    let headers: Vec<&str> = PCR_HEADERS
        .iter()
        .copied()
        .filter(|h| *h != "WellID" && *h != "OilRFID")
        .collect();
    let rows = pcr_rows("S1", "1")
        .into_iter()
        .map(|row| {
            row.into_iter()
                .enumerate()
                .filter(|(idx, _)| *idx != 15 && *idx != 16)
                .map(|(_, v)| v)
                .collect()
        })
        .collect();

    let err = combine_pair(
        table(&headers, rows),
        table(&LIS_HEADERS, vec![lis_row("S1", "1", ["Positive"; 4], "Valid")]),
        &profile,
        CombineOptions::default(),
    )
    .unwrap_err();

    match err {
        TransformError::MissingColumns { table, columns } => {
            assert_eq!(table, "PCR");
            assert_eq!(columns, vec!["OilRFID", "WellID"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn duplicate_channel_rows_fail_the_pair() {
    let profile = paraflu();
    let mut pcr = pcr_rows("S1", "1");
    pcr.push(pcr[0].clone());
    let err = combine_pair(
        table(&PCR_HEADERS, pcr),
        table(&LIS_HEADERS, vec![lis_row("S1", "1", ["Positive"; 4], "Valid")]),
        &profile,
        CombineOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, TransformError::DuplicateChannel { .. }));
}

#[test]
fn repeated_lis_specimen_fails_the_pair() {
    let profile = paraflu();
    let row = lis_row("UWH-211", "000002", ["Negative"; 4], "Valid");
    let err = combine_pair(
        table(&PCR_HEADERS, pcr_rows("UWH-211", "000002")),
        table(&LIS_HEADERS, vec![row.clone(), row]),
        &profile,
        CombineOptions::default(),
    )
    .unwrap_err();
    match err {
        TransformError::DuplicateSpecimen { key } => assert_eq!(key, "UWH-211_1043_000002"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn repeated_unmatched_lis_specimen_fails_even_when_diverted() {
    let profile = paraflu();
    let row = lis_row("S2", "2", ["Negative"; 4], "Valid");
    let err = combine_pair(
        table(&PCR_HEADERS, pcr_rows("S1", "1")),
        table(&LIS_HEADERS, vec![row.clone(), row]),
        &profile,
        CombineOptions {
            unmatched: UnmatchedPolicy::Divert,
            ..CombineOptions::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, TransformError::DuplicateSpecimen { .. }));
}

#[test]
fn instrument_registry_adds_columns() {
    let profile = paraflu();
    let registry = InstrumentRegistry::parse(
        "inline",
        "[devices]\n\"2090000574\" = \"SN-0574\"\n\n[software]\n\"SN-0574\" = \"7.2.6\"\n",
    )
    .unwrap();
    let frame = combine_pair(
        table(&PCR_HEADERS, pcr_rows("S1", "1")),
        table(&LIS_HEADERS, vec![lis_row("S1", "1", ["Positive"; 4], "Valid")]),
        &profile,
        CombineOptions {
            instruments: Some(&registry),
            meta: FrameMeta {
                pair_key: "2090000574_000574_20160701_04".to_string(),
                device_id: Some("2090000574".to_string()),
                ..FrameMeta::default()
            },
            ..CombineOptions::default()
        },
    )
    .unwrap();
    assert_eq!(frame.value(INSTRUMENT_SERIAL, 0), "SN-0574");
    assert_eq!(frame.value(SOFTWARE_VERSION, 0), "7.2.6");
}
