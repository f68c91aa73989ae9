//! Data quality checks, consumption outliers and the summary report
//!
//! Outliers use a Z-score test on the derived consumption metric
//! (liters per 100 distance units). Only entries with a positive distance
//! take part in consumption statistics; monetary totals include everything.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::sync::Arc;

use crate::locale::ReportLocale;
use crate::models::{EntryId, FuelEntry};

/// Minimum number of consumption samples before outliers are considered
const MIN_SAMPLES: usize = 3;

/// Deviation threshold in population standard deviations
const OUTLIER_THRESHOLD: f64 = 2.0;

/// Kind of data quality problem found on an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IssueKind {
    /// liters <= 0
    InvalidLiters,
    /// price_per_liter <= 0
    InvalidPrice,
    /// odometer < 0
    NegativeOdometer,
    /// distance < 0
    NegativeDistance,
    /// Consumption is a statistical outlier
    UnusualConsumption,
}

impl IssueKind {
    /// Field the issue refers to
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidLiters => "liters",
            Self::InvalidPrice => "pricePerLiter",
            Self::NegativeOdometer => "odometer",
            Self::NegativeDistance => "distance",
            Self::UnusualConsumption => "consumption",
        }
    }

    fn text<'a>(&self, locale: &'a ReportLocale) -> &'a str {
        let labels = &locale.labels;
        match self {
            Self::InvalidLiters => &labels.invalid_liters,
            Self::InvalidPrice => &labels.invalid_price,
            Self::NegativeOdometer => &labels.invalid_odometer,
            Self::NegativeDistance => &labels.negative_distance,
            Self::UnusualConsumption => &labels.unusual_consumption,
        }
    }
}

/// A single validation finding tied to an entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub entry_id: EntryId,
    pub date: NaiveDateTime,
    pub kind: IssueKind,
}

impl ValidationIssue {
    /// Render as "<Date>: <formatted date> - <description>"
    pub fn message(&self, locale: &ReportLocale) -> String {
        format!(
            "{}: {} - {}",
            locale.labels.date,
            locale.format_date(&self.date),
            self.kind.text(locale)
        )
    }
}

/// Population statistics over consumption samples
#[derive(Debug, Clone)]
struct ConsumptionStats {
    mean: f64,
    std_dev: f64,
}

impl ConsumptionStats {
    fn compute(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let count = values.len() as f64;
        let mean = values.iter().sum::<f64>() / count;

        // Population variance (divide by N)
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;

        Some(Self {
            mean,
            std_dev: variance.sqrt(),
        })
    }

    fn is_outlier(&self, value: f64) -> bool {
        (value - self.mean).abs() > OUTLIER_THRESHOLD * self.std_dev
    }
}

/// Detect entries with unusual consumption
///
/// # Algorithm
/// - Collect consumption of every entry with a positive distance
/// - Compute population mean (μ) and standard deviation (σ)
/// - Flag if |x - μ| > 2σ (strict)
///
/// # Requirements
/// - At least 3 consumption samples, otherwise returns empty
///
/// # Returns
/// Flagged entries in input order. Identical samples (σ = 0) never qualify.
pub fn detect_outliers(entries: &[Arc<FuelEntry>]) -> Vec<Arc<FuelEntry>> {
    let consumptions: Vec<f64> = entries.iter().filter_map(|e| e.consumption()).collect();

    if consumptions.len() < MIN_SAMPLES {
        return vec![];
    }

    let Some(stats) = ConsumptionStats::compute(&consumptions) else {
        return vec![];
    };

    let outliers: Vec<Arc<FuelEntry>> = entries
        .iter()
        .filter(|e| e.consumption().is_some_and(|c| stats.is_outlier(c)))
        .cloned()
        .collect();

    tracing::debug!(
        samples = consumptions.len(),
        mean = stats.mean,
        std_dev = stats.std_dev,
        outliers = outliers.len(),
        "Consumption outlier scan"
    );

    outliers
}

/// Field-level checks followed by one issue per consumption outlier
pub fn collect_issues(entries: &[Arc<FuelEntry>]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for entry in entries {
        let mut push = |kind| {
            issues.push(ValidationIssue {
                entry_id: entry.id.clone(),
                date: entry.date,
                kind,
            })
        };

        if entry.liters <= 0.0 {
            push(IssueKind::InvalidLiters);
        }
        if entry.price_per_liter <= 0.0 {
            push(IssueKind::InvalidPrice);
        }
        if entry.odometer < 0.0 {
            push(IssueKind::NegativeOdometer);
        }
        if entry.distance.is_some_and(|d| d < 0.0) {
            push(IssueKind::NegativeDistance);
        }
    }

    for entry in detect_outliers(entries) {
        issues.push(ValidationIssue {
            entry_id: entry.id.clone(),
            date: entry.date,
            kind: IssueKind::UnusualConsumption,
        });
    }

    issues
}

/// Validate entries and render the issues through the locale
pub fn validate(entries: &[Arc<FuelEntry>], locale: &ReportLocale) -> Vec<String> {
    collect_issues(entries)
        .iter()
        .map(|issue| issue.message(locale))
        .collect()
}

/// Totals and consumption statistics behind the text report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    pub entry_count: usize,
    pub total_amount: f64,
    /// Total divided by entry count
    pub average_amount: f64,
    pub total_liters: f64,
    pub mean_consumption: f64,
    pub max_consumption: f64,
    pub min_consumption: f64,
}

impl SummaryReport {
    /// Returns `None` for an empty entry list
    pub fn compute(entries: &[Arc<FuelEntry>]) -> Option<Self> {
        if entries.is_empty() {
            return None;
        }

        let total_amount: f64 = entries.iter().map(|e| e.total_amount).sum();
        let total_liters: f64 = entries.iter().map(|e| e.liters).sum();
        let average_amount = total_amount / entries.len() as f64;

        let consumptions: Vec<f64> = entries.iter().filter_map(|e| e.consumption()).collect();
        let (mean_consumption, max_consumption, min_consumption) = if consumptions.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            let mean = consumptions.iter().sum::<f64>() / consumptions.len() as f64;
            let max = consumptions.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let min = consumptions.iter().copied().fold(f64::INFINITY, f64::min);
            (mean, max, min)
        };

        Some(Self {
            entry_count: entries.len(),
            total_amount,
            average_amount,
            total_liters,
            mean_consumption,
            max_consumption,
            min_consumption,
        })
    }

    /// One "Label: value" line per field, newline separated
    pub fn render(&self, locale: &ReportLocale) -> String {
        let labels = &locale.labels;
        [
            format!("{}: {}", labels.total_spend, locale.format_money(self.total_amount)),
            format!("{}: {}", labels.average_spend, locale.format_money(self.average_amount)),
            format!("{}: {}", labels.total_liters, locale.format_volume(self.total_liters)),
            format!(
                "{}: {}",
                labels.mean_consumption,
                locale.format_consumption(self.mean_consumption)
            ),
            format!(
                "{}: {}",
                labels.max_consumption,
                locale.format_consumption(self.max_consumption)
            ),
            format!(
                "{}: {}",
                labels.min_consumption,
                locale.format_consumption(self.min_consumption)
            ),
        ]
        .join("\n")
    }
}

/// Summary report text, or the locale's "no records" message
pub fn generate_report(entries: &[Arc<FuelEntry>], locale: &ReportLocale) -> String {
    match SummaryReport::compute(entries) {
        Some(report) => report.render(locale),
        None => locale.labels.no_records.clone(),
    }
}
