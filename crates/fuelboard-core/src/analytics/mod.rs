//! Fuel analytics engine
//!
//! Turns a date-ordered list of refueling entries into data quality issues,
//! a summary report, monthly aggregates and naive next-refuel predictions.
//! Every function here is a pure computation over an entry snapshot.

use chrono::{DateTime, Datelike, Local, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

use crate::locale::ReportLocale;
use crate::models::FuelEntry;

pub mod forecasting;
pub mod monthly;
pub mod statistics;


pub use forecasting::{
    predict_next_consumption, predict_next_total_amount, PredictionWindow, Predictions,
    RemotePredictor,
};
pub use monthly::{aggregate_by_month, select_period, MonthlyAggregate};
pub use statistics::{
    collect_issues, detect_outliers, generate_report, validate, IssueKind, SummaryReport,
    ValidationIssue,
};

/// Filter granularity for analytics display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFrame {
    #[default]
    Month,
    Year,
    All,
}

impl TimeFrame {
    pub fn label<'a>(&self, locale: &'a ReportLocale) -> &'a str {
        match self {
            Self::Month => &locale.labels.time_frame_month,
            Self::Year => &locale.labels.time_frame_year,
            Self::All => &locale.labels.time_frame_all,
        }
    }
}

impl FromStr for TimeFrame {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "month" | "m" => Ok(Self::Month),
            "year" | "y" => Ok(Self::Year),
            "all" | "a" => Ok(Self::All),
            other => Err(format!(
                "Invalid time frame '{}' (expected: month, year, all)",
                other
            )),
        }
    }
}

/// Time frame plus the month/year it refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSelection {
    pub time_frame: TimeFrame,
    /// 1-based, only used by [`TimeFrame::Month`]
    pub month: u32,
    pub year: i32,
}

impl PeriodSelection {
    pub fn new(time_frame: TimeFrame, month: u32, year: i32) -> Self {
        Self {
            time_frame,
            month,
            year,
        }
    }

    /// Selection anchored on the current local month
    pub fn current(time_frame: TimeFrame) -> Self {
        let today = Local::now().date_naive();
        Self::new(time_frame, today.month(), today.year())
    }

    pub fn apply(&self, entries: &[Arc<FuelEntry>]) -> Vec<Arc<FuelEntry>> {
        select_period(entries, self.time_frame, self.month, self.year)
    }

    /// "Mart 2024", "2024" or the locale's "all" label
    pub fn display(&self, locale: &ReportLocale) -> String {
        match self.time_frame {
            TimeFrame::Month => format!("{} {}", locale.month_name(self.month), self.year),
            TimeFrame::Year => self.year.to_string(),
            TimeFrame::All => self.time_frame.label(locale).to_string(),
        }
    }
}

impl Default for PeriodSelection {
    fn default() -> Self {
        Self::current(TimeFrame::default())
    }
}

/// Complete analytics output for one period
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsData {
    /// Period the issues and report were computed over
    pub selection: PeriodSelection,
    /// Entries inside the selected period
    pub entry_count: usize,
    /// Localized validation messages for the period
    pub issues: Vec<String>,
    /// Report numbers (None when the period is empty)
    pub summary: Option<SummaryReport>,
    /// Localized report text
    pub report: String,
    /// Monthly aggregates over all entries, latest first
    pub monthly: Vec<MonthlyAggregate>,
    /// Two-point predictions over all entries
    pub predictions: Predictions,
    pub computed_at: DateTime<Utc>,
}

impl AnalyticsData {
    /// Compute analytics from a date-ascending entry snapshot
    ///
    /// Issues and the report cover the selected period; monthly aggregates and
    /// predictions always use the full history.
    pub fn compute(
        entries: &[Arc<FuelEntry>],
        selection: PeriodSelection,
        locale: &ReportLocale,
    ) -> Self {
        let period = selection.apply(entries);
        let summary = SummaryReport::compute(&period);
        let report = match &summary {
            Some(summary) => summary.render(locale),
            None => locale.labels.no_records.clone(),
        };

        let data = Self {
            selection,
            entry_count: period.len(),
            issues: validate(&period, locale),
            summary,
            report,
            monthly: aggregate_by_month(entries),
            predictions: Predictions::compute(entries),
            computed_at: Utc::now(),
        };

        tracing::debug!(
            period = %selection.display(locale),
            entries = data.entry_count,
            issues = data.issues.len(),
            months = data.monthly.len(),
            "Analytics computed"
        );

        data
    }
}
