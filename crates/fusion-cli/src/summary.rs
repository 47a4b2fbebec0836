use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use fusion_cli::pipeline::{BatchResult, PairSummary};
use fusion_ingest::PairingResult;
use fusion_report::{GroupStatistics, Summary};

pub fn print_summary(result: &BatchResult) {
    println!("Profile: {}", result.profile);
    println!("Output: {}", result.output_dir.display());
    if let Some(path) = &result.combined {
        println!("Combined table: {}", path.display());
    }
    if let Some(path) = &result.statistics_file {
        println!("Statistics: {}", path.display());
    }
    print_pairs_table(&result.pairs);
    print_statistics_table(&result.statistics);
    print_unpaired(&result.pairing);
    if !result.errors.is_empty() {
        eprintln!("Errors:");
        for error in &result.errors {
            eprintln!("- {error}");
        }
    }
}

fn print_pairs_table(pairs: &[PairSummary]) {
    if pairs.is_empty() {
        println!("No file pairs found.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Run"),
        header_cell("Records"),
        header_cell("Failed"),
        header_cell("Unmatched"),
        header_cell("PQ"),
        header_cell("Results file"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Center);
    let mut total_records = 0usize;
    let mut total_failed = 0usize;
    for pair in pairs {
        let results_file = match &pair.pq_results {
            Some(path) => Cell::new(
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            ),
            None => dim_cell("-"),
        };
        match &pair.outcome {
            Ok(outcome) => {
                let records = outcome.frame.record_count();
                let failed = outcome.frame.failed_count();
                let report = &outcome.frame.report;
                let unmatched = report.lis_without_pcr.len() + report.pcr_without_lis.len();
                total_records += records;
                total_failed += failed;
                table.add_row(vec![
                    run_cell(&pair.key),
                    Cell::new(records),
                    count_cell(failed, Color::Red),
                    count_cell(unmatched, Color::Yellow),
                    acceptance_cell(outcome.assessment.is_accepted()),
                    results_file,
                ]);
            }
            Err(_) => {
                table.add_row(vec![
                    run_cell(&pair.key),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    Cell::new("ERROR")
                        .fg(Color::Red)
                        .add_attribute(Attribute::Bold),
                    results_file,
                ]);
            }
        }
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total_records).add_attribute(Attribute::Bold),
        count_cell(total_failed, Color::Red).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
    ]);
    println!("{table}");
}

fn print_statistics_table(groups: &[GroupStatistics]) {
    if groups.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Group"),
        header_cell("Channel"),
        header_cell("Count"),
        header_cell("Pass"),
        header_cell("Fail"),
        header_cell("Invalid"),
        header_cell("False calls"),
        header_cell("POS RFU"),
        header_cell("NEG RFU"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 2..9 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for group in groups {
        for (index, channel) in group.channels.iter().enumerate() {
            let group_cell = if index == 0 {
                Cell::new(&group.group)
                    .fg(Color::Blue)
                    .add_attribute(Attribute::Bold)
            } else {
                Cell::new("")
            };
            let counts = channel.counts;
            table.add_row(vec![
                group_cell,
                Cell::new(channel.channel.as_str()),
                Cell::new(counts.count),
                count_cell(counts.pass, Color::Green),
                count_cell(counts.fail, Color::Red),
                count_cell(counts.invalid, Color::Yellow),
                count_cell(counts.false_calls, Color::Red),
                summary_cell(&channel.positive.rfu),
                summary_cell(&channel.negative.rfu),
            ]);
        }
    }
    println!();
    println!("Statistics:");
    println!("{table}");
}

fn print_unpaired(pairing: &PairingResult) {
    let sections = [
        ("Without counterpart", &pairing.no_pairs),
        ("Unrecognized", &pairing.unrecognized),
        ("Superseded", &pairing.superseded),
    ];
    for (title, paths) in sections {
        if paths.is_empty() {
            continue;
        }
        println!("{title}:");
        for path in paths {
            println!("- {}", path.display());
        }
    }
}

/// Prints the pairing of export files without processing them.
pub fn print_pairing(pairing: &PairingResult) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Run"),
        header_cell("Device"),
        header_cell("PCR export"),
        header_cell("LIS export"),
    ]);
    apply_table_style(&mut table);
    for (key, pair) in &pairing.paired {
        table.add_row(vec![
            run_cell(key.as_str()),
            Cell::new(&pair.device_id),
            Cell::new(pair.pcr.display()),
            Cell::new(pair.lis.display()),
        ]);
    }
    println!("{table}");
    print_unpaired(pairing);
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(150);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn run_cell(key: &str) -> Cell {
    Cell::new(key).fg(Color::Blue).add_attribute(Attribute::Bold)
}

fn acceptance_cell(accepted: bool) -> Cell {
    if accepted {
        Cell::new("PASS")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new("FAIL")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold)
    }
}

fn summary_cell(summary: &Summary) -> Cell {
    match (summary.mean, summary.std_dev) {
        (Some(mean), Some(std_dev)) => Cell::new(format!("{mean:.1} ± {std_dev:.1}")),
        (Some(mean), None) => Cell::new(format!("{mean:.1}")),
        _ => dim_cell("-"),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
