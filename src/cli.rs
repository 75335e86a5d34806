use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about = "Analytics over ERP order exports", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check that a file carries every required order column
    Validate(ValidateArgs),
    /// Show the first rows of a file after normalization
    Preview(PreviewArgs),
    /// Compute the dashboard KPI card values
    Kpis(KpisArgs),
    /// Compute advanced metrics: moving average, inactivity, anomalies, forecast
    Metrics(MetricsArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Input CSV/TSV export ('-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Input CSV/TSV export ('-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Number of rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
}

/// Filter flags shared by the KPI and metrics commands. Each one narrows
/// the table before aggregation; unset flags leave it untouched.
#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Keep rows entered on or after this date (day-first, e.g. 01/03/2024)
    #[arg(long = "from", value_parser = parse_day_first)]
    pub from: Option<NaiveDate>,
    /// Keep rows entered on or before this date (day-first)
    #[arg(long = "to", value_parser = parse_day_first)]
    pub to: Option<NaiveDate>,
    /// Keep rows for this customer name only
    #[arg(long)]
    pub customer: Option<String>,
    /// Keep rows with this O/T order-type value only
    #[arg(long = "order-type")]
    pub order_type: Option<String>,
}

#[derive(Debug, Args)]
pub struct KpisArgs {
    /// Input CSV/TSV export ('-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    #[command(flatten)]
    pub filters: FilterArgs,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
}

#[derive(Debug, Args)]
pub struct MetricsArgs {
    /// Input CSV/TSV export ('-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    #[command(flatten)]
    pub filters: FilterArgs,
    /// Days of future forecast to project
    #[arg(long = "forecast-days", default_value_t = 30)]
    pub forecast_days: usize,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

pub fn parse_day_first(value: &str) -> Result<NaiveDate, String> {
    for fmt in ["%d/%m/%Y", "%Y-%m-%d"] {
        if let Ok(parsed) = NaiveDate::parse_from_str(value.trim(), fmt) {
            return Ok(parsed);
        }
    }
    Err(format!("'{value}' is not a day-first date (expected dd/mm/yyyy)"))
}
