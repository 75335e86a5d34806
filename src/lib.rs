pub mod cli;
pub mod data;
pub mod forecast;
pub mod holidays;
pub mod io_utils;
pub mod metrics;
pub mod orders;
pub mod prepare;
pub mod report;
pub mod schema;

use std::{env, path::Path, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use crate::{
    cli::{Cli, Commands, FilterArgs, OutputFormat},
    holidays::HolidayCalendar,
    orders::{OrdersTable, RawTable},
    report::format_number,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("sales_lens", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Validate(args) => handle_validate(&args),
        Commands::Preview(args) => handle_preview(&args),
        Commands::Kpis(args) => handle_kpis(&args),
        Commands::Metrics(args) => handle_metrics(&args),
    }
}

/// Load, validate, and normalize in one step. Every analytics command
/// starts here; a file that fails the schema check never reaches the
/// normalizer.
pub fn load_normalized(path: &Path, delimiter: Option<u8>) -> Result<OrdersTable> {
    let raw = RawTable::load(path, delimiter)
        .with_context(|| format!("Loading order export {path:?}"))?;
    schema::validate_columns(&raw.headers)?;
    Ok(prepare::normalize(&raw))
}

fn apply_filters(table: &OrdersTable, filters: &FilterArgs) -> OrdersTable {
    let mut filtered = table.filter_entered(filters.from, filters.to);
    if let Some(customer) = &filters.customer {
        filtered = filtered.filter_customer(customer);
    }
    if let Some(order_type) = &filters.order_type {
        filtered = filtered.filter_order_type(order_type);
    }
    filtered
}

fn holiday_calendar_for(table: &OrdersTable) -> HolidayCalendar {
    match table.year_span() {
        Some(years) => HolidayCalendar::united_kingdom(years),
        None => HolidayCalendar::none(),
    }
}

fn handle_validate(args: &cli::ValidateArgs) -> Result<()> {
    let raw = RawTable::load(&args.input, args.delimiter)
        .with_context(|| format!("Loading order export {input:?}", input = args.input))?;
    schema::validate_columns(&raw.headers)?;
    info!(
        "{:?}: all {} required column(s) present across {} row(s)",
        args.input,
        schema::REQUIRED_COLUMNS.len(),
        raw.rows.len()
    );
    println!("ok");
    Ok(())
}

fn handle_preview(args: &cli::PreviewArgs) -> Result<()> {
    let table = load_normalized(&args.input, args.delimiter)?;
    let headers = vec![
        "Order".to_string(),
        "Name".to_string(),
        "Entered".to_string(),
        "Sent".to_string(),
        "Qty".to_string(),
        "Nett".to_string(),
        "Margin_%".to_string(),
        "O/T".to_string(),
    ];
    let rows: Vec<Vec<String>> = table
        .rows()
        .iter()
        .take(args.rows)
        .map(|rec| {
            vec![
                rec.order.clone(),
                rec.name.clone(),
                format_date(rec.entered),
                format_date(rec.sent),
                rec.qty.map(format_number).unwrap_or_default(),
                rec.nett.map(format_number).unwrap_or_default(),
                rec.margin_pct.map(format_number).unwrap_or_default(),
                rec.order_type.clone(),
            ]
        })
        .collect();
    report::print_table(&headers, &rows);
    info!("Previewed {} of {} row(s)", rows.len(), table.len());
    Ok(())
}

fn handle_kpis(args: &cli::KpisArgs) -> Result<()> {
    let table = load_normalized(&args.input, args.delimiter)?;
    let filtered = apply_filters(&table, &args.filters);
    let holidays = holiday_calendar_for(&filtered);
    let kpis = metrics::compute_kpis(&filtered, &holidays);

    match args.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&kpis).context("Serializing KPIs to JSON")?
            );
        }
        OutputFormat::Table => {
            let headers = vec!["metric".to_string(), "value".to_string()];
            let rows = vec![
                vec!["Total Nett Sales".to_string(), format_number(kpis.total_nett_sales)],
                vec!["Total Orders".to_string(), kpis.total_orders.to_string()],
                vec!["Total Units Sold".to_string(), format_number(kpis.total_units)],
                vec!["Average Order Value".to_string(), format_number(kpis.avg_order_value)],
                vec!["Average Margin %".to_string(), format_number(kpis.avg_margin_pct)],
                vec!["Average Turnaround".to_string(), format_number(kpis.avg_turnaround_days)],
            ];
            report::print_table(&headers, &rows);
        }
    }
    info!("Computed KPIs over {} row(s)", filtered.len());
    Ok(())
}

fn handle_metrics(args: &cli::MetricsArgs) -> Result<()> {
    let table = load_normalized(&args.input, args.delimiter)?;
    let filtered = apply_filters(&table, &args.filters);
    let advanced = metrics::compute_advanced_metrics(&filtered, args.forecast_days);

    match args.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&advanced)
                    .context("Serializing advanced metrics to JSON")?
            );
            return Ok(());
        }
        OutputFormat::Table => {}
    }

    println!("7-day moving average (daily Nett)");
    let ma_headers = vec!["date".to_string(), "7d_ma".to_string()];
    let ma_rows: Vec<Vec<String>> = advanced
        .ma7
        .iter()
        .map(|p| {
            vec![
                p.date.format("%d/%m/%Y").to_string(),
                p.value.map(format_number).unwrap_or_default(),
            ]
        })
        .collect();
    report::print_table(&ma_headers, &ma_rows);

    println!("\nInactive customers (no order in the last 30 days)");
    let inactive_rows: Vec<Vec<String>> = advanced
        .inactive_customers
        .iter()
        .map(|name| vec![name.clone()])
        .collect();
    report::print_table(&["customer".to_string()], &inactive_rows);

    println!("\nLow days (daily Nett below mean - 2 sigma)");
    let low_rows: Vec<Vec<String>> = advanced
        .low_days
        .iter()
        .map(|date| vec![date.format("%d/%m/%Y").to_string()])
        .collect();
    report::print_table(&["date".to_string()], &low_rows);

    if advanced.forecast.is_empty() {
        println!("\nForecast skipped: insufficient history (need more than 10 observed days)");
    } else {
        println!("\nNett forecast, next {} day(s) at 95% confidence", args.forecast_days);
        let fc_headers = vec![
            "date".to_string(),
            "forecast".to_string(),
            "lower".to_string(),
            "upper".to_string(),
        ];
        let fc = &advanced.forecast;
        let future: Vec<usize> = fc
            .dates
            .iter()
            .enumerate()
            .filter(|(_, date)| fc.last_observed.is_none_or(|last| **date > last))
            .map(|(idx, _)| idx)
            .collect();
        let fc_rows: Vec<Vec<String>> = future
            .iter()
            .map(|&idx| {
                vec![
                    fc.dates[idx].format("%d/%m/%Y").to_string(),
                    format_number(fc.point[idx]),
                    fc.lower.get(idx).copied().map(format_number).unwrap_or_default(),
                    fc.upper.get(idx).copied().map(format_number).unwrap_or_default(),
                ]
            })
            .collect();
        report::print_table(&fc_headers, &fc_rows);

        println!("\nDaily order-count forecast");
        let orders_rows: Vec<Vec<String>> = advanced
            .forecast_orders
            .future_points()
            .map(|(date, value)| {
                vec![date.format("%d/%m/%Y").to_string(), format_number(value)]
            })
            .collect();
        report::print_table(
            &["date".to_string(), "orders".to_string()],
            &orders_rows,
        );
    }
    Ok(())
}

fn format_date(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_default()
}
