//! History command - list stored certificate records.

use std::time::Duration;

use clap::Args;
use console::style;

use certgen_core::{CertgenConfig, SqliteStore};

/// Arguments for the history command.
#[derive(Args)]
pub struct HistoryArgs {
    /// Number of records to show
    #[arg(short = 'n', long, default_value_t = 20)]
    limit: usize,

    /// Print records as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: HistoryArgs, config: CertgenConfig) -> anyhow::Result<()> {
    let store = SqliteStore::open(
        &config.storage.database,
        Duration::from_secs(config.storage.busy_timeout_secs),
    )?;
    let records = store.recent(args.limit)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("{} No certificates generated yet.", style("ℹ").blue());
        return Ok(());
    }

    for record in &records {
        println!(
            "{}  {}  {}  гр. {}  {} - {}",
            style(&record.protocol_number).bold(),
            record.created_at.format("%d.%m.%Y %H:%M"),
            record.full_name,
            record.qualification_group,
            record.cert_date.format("%d.%m.%Y"),
            record.next_cert_date.format("%d.%m.%Y"),
        );
    }

    Ok(())
}
