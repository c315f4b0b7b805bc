//! Batch commands of the `apportion` binary.

use anyhow::{Context, bail};
use apportion_calculator::{AllocationError, Session};
use apportion_io::{
    ColumnAliases, export_file_name, format_currency, format_percent, ingest_path, title_case,
    write_export,
};
use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "apportion", version, about = "Weighted division of fixed income across contracts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the web interface (the default when no command is given)
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Show contract totals per salesperson
    Summary {
        /// Contract spreadsheet (.csv, .xlsx, .xls, .ods)
        file: PathBuf,
    },
    /// Allocate one salesperson's fixed income and write the CSV export
    Allocate {
        /// Contract spreadsheet (.csv, .xlsx, .xls, .ods)
        file: PathBuf,
        #[arg(long)]
        salesperson: String,
        #[arg(long, default_value_t = 0.0)]
        salary: f64,
        #[arg(long, default_value_t = 0.0)]
        stipend: f64,
        /// Export path; defaults to `<salesperson>_contratos_ponderados.csv`
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn load_session(file: &Path, aliases: &ColumnAliases) -> anyhow::Result<Session> {
    let ingested = ingest_path(file, aliases)
        .with_context(|| format!("failed to read contracts from '{}'", file.display()))?;
    let mut session = Session::new();
    session.load_contracts(ingested.records, ingested.summary.dropped_rows);
    Ok(session)
}

/// Text report of every salesperson's contract total.
pub fn summary(file: &Path, aliases: &ColumnAliases) -> anyhow::Result<String> {
    let session = load_session(file, aliases)?;
    let ingestion = session.ingestion_summary();

    let mut out = String::new();
    writeln!(
        out,
        "Contracts: {} | Salespeople: {} | Skipped rows: {}",
        ingestion.accepted_rows,
        ingestion.salespeople.len(),
        ingestion.dropped_rows
    )?;
    for summary in session.summaries() {
        writeln!(
            out,
            "{:<30} {:>6} contracts {:>20}",
            title_case(&summary.salesperson),
            summary.contract_count,
            format_currency(summary.contract_total)
        )?;
    }
    Ok(out)
}

/// Allocates, writes the export, and returns the printed table.
pub fn allocate(
    file: &Path,
    salesperson: &str,
    salary: f64,
    stipend: f64,
    output: Option<&Path>,
    aliases: &ColumnAliases,
) -> anyhow::Result<(String, PathBuf)> {
    let mut session = load_session(file, aliases)?;
    session.set_fixed_income(salesperson, salary, stipend)?;

    let report = match session.report(salesperson) {
        Ok(report) => report,
        Err(AllocationError::NotAllocatable { contracts: 0, .. }) => {
            bail!("salesperson '{salesperson}' has no valid contracts in '{}'", file.display())
        }
        Err(err) => return Err(err.into()),
    };

    let output =
        output.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(export_file_name(salesperson)));
    std::fs::write(&output, write_export(&report.results)?)
        .with_context(|| format!("failed to write '{}'", output.display()))?;
    info!(path = %output.display(), rows = report.results.len(), "wrote export");

    let summary = &report.summary;
    let mut out = String::new();
    writeln!(out, "Results for {}", title_case(salesperson))?;
    writeln!(
        out,
        "Fixed salary: {} | Stipend: {} | Total: {}",
        format_currency(summary.fixed_income.salary),
        format_currency(summary.fixed_income.stipend),
        format_currency(summary.fixed_income.total())
    )?;
    writeln!(
        out,
        "Contracts total: {} | Grand total: {}",
        format_currency(summary.contract_total),
        format_currency(summary.grand_total)
    )?;
    writeln!(out, "{:<20} {:>20} {:>10} {:>20}", "Contract", "Amount", "Share", "Allocated")?;
    for row in &report.results {
        writeln!(
            out,
            "{:<20} {:>20} {:>10} {:>20}",
            row.contract_id,
            format_currency(row.contract_amount),
            format_percent(row.proportion),
            format_currency(row.allocated_amount)
        )?;
    }
    writeln!(out, "Check: allocated amounts add up to {}", format_currency(report.allocated_sum))?;
    Ok((out, output))
}
