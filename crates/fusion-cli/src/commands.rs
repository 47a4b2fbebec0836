use anyhow::Result;
use comfy_table::Table;
use fusion_cli::pipeline::{
    BatchConfig, BatchResult, default_output_dir, discover, load_instruments, override_labels,
    resolve_profile, run_batch,
};
use fusion_ingest::PairingResult;
use fusion_standards::ProfileRegistry;
use fusion_transform::UnmatchedPolicy;
use tracing::info_span;

use crate::cli::{PairArgs, RunArgs};
use crate::summary::apply_table_style;

pub fn run_profiles() -> Result<()> {
    let registry = ProfileRegistry::builtin()?;
    let mut table = Table::new();
    table.set_header(vec!["Profile", "Aliases", "Channels", "Description"]);
    apply_table_style(&mut table);
    for profile in registry.profiles() {
        let channels: Vec<&str> = profile
            .channels
            .iter()
            .map(|spec| spec.channel.as_str())
            .collect();
        table.add_row(vec![
            profile.name.clone(),
            profile.aliases.join(", "),
            channels.join(", "),
            profile.description.clone(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_pair(args: &PairArgs) -> Result<PairingResult> {
    discover(&args.inputs)
}

pub fn run_batch_command(args: &RunArgs) -> Result<BatchResult> {
    let mut profile = resolve_profile(&args.profile, args.profile_file.as_deref())?;
    override_labels(&mut profile, &args.pos_labels, &args.neg_labels);
    let instruments = load_instruments(args.instruments.as_deref())?;
    let config = BatchConfig {
        inputs: args.inputs.clone(),
        output_dir: args
            .output_dir
            .clone()
            .unwrap_or_else(|| default_output_dir(&args.inputs)),
        group_by: args.group_by.clone(),
        unmatched: if args.divert_unmatched {
            UnmatchedPolicy::Divert
        } else {
            UnmatchedPolicy::Keep
        },
        dry_run: args.dry_run,
    };
    let span = info_span!("batch", profile = %profile.name);
    let _guard = span.enter();
    run_batch(&config, &profile, instruments.as_ref())
}
