mod common;

use assert_cmd::Command;
use chrono::{Duration, NaiveDate};
use predicates::str::contains;
use serde_json::Value;
use tempfile::tempdir;

use common::{order_line, write_orders_csv};

fn sales_lens() -> Command {
    Command::cargo_bin("sales-lens").expect("binary under test")
}

fn metrics_json(path: &std::path::Path, extra: &[&str]) -> Value {
    let output = sales_lens()
        .args(["metrics", "--format", "json", "-i"])
        .arg(path)
        .args(extra)
        .output()
        .expect("run metrics");
    assert!(output.status.success(), "metrics failed: {output:?}");
    serde_json::from_slice(&output.stdout).expect("valid JSON")
}

/// One order per day for `days` consecutive days starting 1 March 2024.
fn daily_lines(days: i64, nett: impl Fn(i64) -> f64) -> Vec<String> {
    let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    (0..days)
        .map(|i| {
            let date = (start + Duration::days(i)).format("%d/%m/%Y").to_string();
            order_line(
                &format!("A{i}"),
                "Smith",
                &date,
                "",
                "1",
                &nett(i).to_string(),
                "5",
                "S",
            )
        })
        .collect()
}

#[test]
fn short_history_returns_empty_forecast_series() {
    let dir = tempdir().unwrap();
    let path = write_orders_csv(dir.path(), "orders.csv", &daily_lines(10, |_| 100.0));

    let metrics = metrics_json(&path, &[]);
    assert_eq!(metrics["forecast"]["dates"].as_array().unwrap().len(), 0);
    assert_eq!(metrics["forecast"]["point"].as_array().unwrap().len(), 0);
    assert_eq!(metrics["forecast"]["lower"].as_array().unwrap().len(), 0);
    assert_eq!(metrics["forecast"]["upper"].as_array().unwrap().len(), 0);
    assert_eq!(
        metrics["forecast_orders"]["point"].as_array().unwrap().len(),
        0
    );
    // The rest of the metric set still computes.
    assert_eq!(metrics["7d_ma"].as_array().unwrap().len(), 10);
}

#[test]
fn forecast_covers_history_plus_horizon_with_bounds() {
    let dir = tempdir().unwrap();
    let lines = daily_lines(28, |i| if i % 7 < 5 { 200.0 + i as f64 } else { 60.0 });
    let path = write_orders_csv(dir.path(), "orders.csv", &lines);

    let metrics = metrics_json(&path, &["--forecast-days", "7"]);
    let forecast = &metrics["forecast"];
    assert_eq!(forecast["dates"].as_array().unwrap().len(), 35);
    assert_eq!(forecast["point"].as_array().unwrap().len(), 35);
    assert_eq!(forecast["lower"].as_array().unwrap().len(), 35);
    assert_eq!(forecast["upper"].as_array().unwrap().len(), 35);
    assert_eq!(forecast["last_observed"], "2024-03-28");

    // Orders series is point-only.
    let orders = &metrics["forecast_orders"];
    assert_eq!(orders["point"].as_array().unwrap().len(), 35);
    assert_eq!(orders["lower"].as_array().unwrap().len(), 0);

    // Bounds bracket the point estimates.
    let point = forecast["point"].as_array().unwrap();
    let lower = forecast["lower"].as_array().unwrap();
    let upper = forecast["upper"].as_array().unwrap();
    for i in 0..point.len() {
        let (p, l, u) = (
            point[i].as_f64().unwrap(),
            lower[i].as_f64().unwrap(),
            upper[i].as_f64().unwrap(),
        );
        assert!(l <= p && p <= u, "interval must bracket point at {i}");
    }
}

#[test]
fn moving_average_starts_after_seven_days() {
    let dir = tempdir().unwrap();
    let path = write_orders_csv(
        dir.path(),
        "orders.csv",
        &daily_lines(9, |i| 10.0 * (i + 1) as f64),
    );

    let metrics = metrics_json(&path, &[]);
    let ma = metrics["7d_ma"].as_array().unwrap();
    assert_eq!(ma.len(), 9);
    assert!(ma[5]["value"].is_null());
    assert_eq!(ma[6]["value"], 40.0); // mean of 10..=70
    assert_eq!(ma[7]["value"], 50.0);
}

#[test]
fn inactive_customers_split_on_thirty_day_cutoff() {
    let dir = tempdir().unwrap();
    // "X" last ordered 40 days before the max Entered date, "Y" 5 days.
    let path = write_orders_csv(
        dir.path(),
        "orders.csv",
        &[
            order_line("A1", "X", "20/02/2024", "", "1", "100", "50", "S"),
            order_line("A2", "Y", "26/03/2024", "", "1", "100", "50", "S"),
            order_line("A3", "Z", "31/03/2024", "", "1", "100", "50", "S"),
        ],
    );
    let metrics = metrics_json(&path, &[]);
    let inactive = metrics["inactive_customers"].as_array().unwrap();
    assert_eq!(inactive.len(), 1);
    assert_eq!(inactive[0], "X");
}

#[test]
fn low_days_flag_deep_drops_only() {
    let dir = tempdir().unwrap();
    let mut lines = daily_lines(20, |_| 100.0);
    lines.push(order_line("C1", "Smith", "21/03/2024", "", "1", "-500", "0", "S"));
    let path = write_orders_csv(dir.path(), "orders.csv", &lines);

    let metrics = metrics_json(&path, &[]);
    let low = metrics["low_days"].as_array().unwrap();
    assert_eq!(low.len(), 1);
    assert_eq!(low[0], "2024-03-21");
}

#[test]
fn table_format_announces_degraded_forecast() {
    let dir = tempdir().unwrap();
    let path = write_orders_csv(dir.path(), "orders.csv", &daily_lines(5, |_| 100.0));

    sales_lens()
        .args(["metrics", "-i"])
        .arg(&path)
        .assert()
        .success()
        .stdout(contains("Forecast skipped"));
}

#[test]
fn table_format_lists_future_forecast_rows() {
    let dir = tempdir().unwrap();
    let path = write_orders_csv(dir.path(), "orders.csv", &daily_lines(28, |i| 100.0 + i as f64));

    sales_lens()
        .args(["metrics", "--forecast-days", "5", "-i"])
        .arg(&path)
        .assert()
        .success()
        .stdout(contains("Nett forecast"))
        .stdout(contains("02/04/2024")); // last projected day: 28 Mar + 5
}
