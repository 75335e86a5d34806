//! Seasonal forecasting over daily series using augurs (MSTL + AutoETS).
//!
//! Two target series are fitted independently: daily summed Nett and daily
//! distinct order counts. With at least two full weeks of history the model
//! is MSTL with weekly seasonality over an AutoETS trend; shorter histories
//! fall back to plain AutoETS. Calendar gaps are filled with NaN and
//! linearly interpolated inside the model pipeline.
//!
//! Anything that stops a fit — too little history, numerical failure — is
//! absorbed here and reported as empty output series, a defined degraded
//! mode the caller can distinguish from a genuine zero-valued forecast.

use augurs::{
    ets::AutoETS,
    forecaster::{Forecaster, transforms::LinearInterpolator},
    mstl::MSTLModel,
};
use chrono::{Duration, NaiveDate};
use log::{info, warn};
use serde::Serialize;

/// Fitting needs more than this many observed days, for both target series.
pub const MIN_OBSERVED_DAYS: usize = 10;

/// Grid length at which weekly seasonal decomposition switches on.
const MIN_SEASONAL_DAYS: usize = 14;

const WEEKLY_PERIOD: usize = 7;

/// Confidence level of the prediction interval.
pub const CONFIDENCE_LEVEL: f64 = 0.95;

/// One observed day of a target series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Date-indexed forecast covering the fitted range plus the horizon.
///
/// `lower`/`upper` are empty when no interval was requested for the series.
/// Downstream code that only wants the projection trims with
/// [`ForecastSeries::future_points`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct ForecastSeries {
    pub dates: Vec<NaiveDate>,
    pub point: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub last_observed: Option<NaiveDate>,
}

impl ForecastSeries {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Points dated strictly after the last observed date.
    pub fn future_points(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        let cutoff = self.last_observed;
        self.dates
            .iter()
            .zip(&self.point)
            .filter(move |(date, _)| cutoff.is_none_or(|last| **date > last))
            .map(|(date, value)| (*date, *value))
    }
}

/// Fit and predict both target series under the joint minimum-history
/// policy: if either series is too short, every output is empty. Internal
/// fit failures degrade the same way instead of propagating.
pub fn forecast_pair(
    nett: &[DailyPoint],
    orders: &[DailyPoint],
    horizon: usize,
) -> (ForecastSeries, ForecastSeries) {
    if nett.len() <= MIN_OBSERVED_DAYS || orders.len() <= MIN_OBSERVED_DAYS {
        info!(
            "Skipping forecast: {} nett day(s) and {} order day(s) observed, need more than {}",
            nett.len(),
            orders.len(),
            MIN_OBSERVED_DAYS
        );
        return (ForecastSeries::empty(), ForecastSeries::empty());
    }
    match (
        fit_predict(nett, horizon, Some(CONFIDENCE_LEVEL)),
        fit_predict(orders, horizon, None),
    ) {
        (Ok(nett_series), Ok(orders_series)) => (nett_series, orders_series),
        (nett_result, orders_result) => {
            for err in [nett_result.err(), orders_result.err()].into_iter().flatten() {
                warn!("Forecast fit degraded to empty output: {err:#}");
            }
            (ForecastSeries::empty(), ForecastSeries::empty())
        }
    }
}

/// Fit one series and predict `horizon` days past the observed range. The
/// returned series includes in-sample fitted values for the whole grid.
pub fn fit_predict(
    observed: &[DailyPoint],
    horizon: usize,
    level: Option<f64>,
) -> anyhow::Result<ForecastSeries> {
    let (values, first_date, last_date) = calendar_grid(observed)
        .ok_or_else(|| anyhow::anyhow!("Cannot forecast an empty series"))?;

    let (in_sample, future) = if values.len() >= MIN_SEASONAL_DAYS {
        run_mstl(&values, horizon, level)?
    } else {
        run_ets(&values, horizon, level)?
    };

    let mut dates = Vec::with_capacity(values.len() + horizon);
    let mut day = first_date;
    while day <= last_date {
        dates.push(day);
        day += Duration::days(1);
    }
    for offset in 1..=horizon {
        dates.push(last_date + Duration::days(offset as i64));
    }

    let mut point = in_sample.point;
    point.extend(future.point);
    let (mut lower, mut upper) = match in_sample.intervals {
        Some(intervals) => (intervals.lower, intervals.upper),
        None => (Vec::new(), Vec::new()),
    };
    if let Some(intervals) = future.intervals {
        lower.extend(intervals.lower);
        upper.extend(intervals.upper);
    }

    Ok(ForecastSeries {
        dates,
        point,
        lower,
        upper,
        last_observed: Some(last_date),
    })
}

/// Place observed points on a contiguous calendar grid, NaN for gap days.
fn calendar_grid(observed: &[DailyPoint]) -> Option<(Vec<f64>, NaiveDate, NaiveDate)> {
    let mut sorted: Vec<DailyPoint> = observed.to_vec();
    sorted.sort_by_key(|p| p.date);
    let first = sorted.first()?.date;
    let last = sorted.last()?.date;

    let span = (last - first).num_days() as usize + 1;
    let mut values = vec![f64::NAN; span];
    for point in &sorted {
        let idx = (point.date - first).num_days() as usize;
        values[idx] = point.value;
    }
    Some((values, first, last))
}

/// MSTL with weekly seasonality over an AutoETS trend model.
fn run_mstl(
    values: &[f64],
    horizon: usize,
    level: Option<f64>,
) -> anyhow::Result<(augurs::Forecast, augurs::Forecast)> {
    let trend = AutoETS::non_seasonal().into_trend_model();
    let model = MSTLModel::new(vec![WEEKLY_PERIOD], trend);
    let transformers: Vec<Box<dyn augurs::forecaster::Transformer>> =
        vec![Box::new(LinearInterpolator::default())];
    let mut forecaster = Forecaster::new(model).with_transformers(transformers);
    forecaster
        .fit(values)
        .map_err(|e| anyhow::anyhow!("MSTL fit error: {e}"))?;
    let in_sample = forecaster
        .predict_in_sample(level)
        .map_err(|e| anyhow::anyhow!("MSTL in-sample predict error: {e}"))?;
    let future = forecaster
        .predict(horizon, level)
        .map_err(|e| anyhow::anyhow!("MSTL predict error: {e}"))?;
    Ok((in_sample, future))
}

/// Plain AutoETS, used when the grid is shorter than two weekly periods.
fn run_ets(
    values: &[f64],
    horizon: usize,
    level: Option<f64>,
) -> anyhow::Result<(augurs::Forecast, augurs::Forecast)> {
    let model = AutoETS::non_seasonal();
    let transformers: Vec<Box<dyn augurs::forecaster::Transformer>> =
        vec![Box::new(LinearInterpolator::default())];
    let mut forecaster = Forecaster::new(model).with_transformers(transformers);
    forecaster
        .fit(values)
        .map_err(|e| anyhow::anyhow!("ETS fit error: {e}"))?;
    let in_sample = forecaster
        .predict_in_sample(level)
        .map_err(|e| anyhow::anyhow!("ETS in-sample predict error: {e}"))?;
    let future = forecaster
        .predict(horizon, level)
        .map_err(|e| anyhow::anyhow!("ETS predict error: {e}"))?;
    Ok((in_sample, future))
}
