//! Calendar-month aggregation and period selection
//!
//! Groups entries by (year, month) of their event date for charting, and
//! filters entry lists down to the time frame selected for display.

use chrono::Datelike;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::TimeFrame;
use crate::locale::ReportLocale;
use crate::models::FuelEntry;

/// Totals for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyAggregate {
    pub year: i32,
    /// 1-based
    pub month: u32,
    pub total_amount: f64,
    pub total_liters: f64,
    /// total_amount / total_liters, 0 when no liters
    pub average_price_per_liter: f64,
    /// Odometer span between the first and last entry of the month
    pub total_distance: f64,
    pub number_of_entries: usize,
}

impl MonthlyAggregate {
    fn from_group(year: i32, month: u32, entries: &[&Arc<FuelEntry>]) -> Self {
        let total_amount: f64 = entries.iter().map(|e| e.total_amount).sum();
        let total_liters: f64 = entries.iter().map(|e| e.liters).sum();
        let average_price_per_liter = if total_liters > 0.0 {
            total_amount / total_liters
        } else {
            0.0
        };

        // First/last in list order, not re-sorted by date
        let total_distance = match (entries.first(), entries.last()) {
            (Some(first), Some(last)) => {
                let span = last.odometer - first.odometer;
                if span >= 0.0 {
                    span
                } else {
                    0.0
                }
            }
            _ => 0.0,
        };

        Self {
            year,
            month,
            total_amount,
            total_liters,
            average_price_per_liter,
            total_distance,
            number_of_entries: entries.len(),
        }
    }

    pub fn month_name<'a>(&self, locale: &'a ReportLocale) -> &'a str {
        locale.month_name(self.month)
    }

    /// "Mart 2024"
    pub fn title(&self, locale: &ReportLocale) -> String {
        format!("{} {}", self.month_name(locale), self.year)
    }
}

/// Aggregate entries per calendar month
///
/// Entries keep their relative input order inside each month, so
/// `total_distance` depends on the caller handing in date-ascending data
/// (the store's `snapshot()` does).
///
/// # Returns
/// One aggregate per month present, most recent month first
pub fn aggregate_by_month(entries: &[Arc<FuelEntry>]) -> Vec<MonthlyAggregate> {
    let mut groups: BTreeMap<(i32, u32), Vec<&Arc<FuelEntry>>> = BTreeMap::new();

    for entry in entries {
        groups
            .entry((entry.date.year(), entry.date.month()))
            .or_default()
            .push(entry);
    }

    // BTreeMap iterates ascending; reverse for year desc, month desc
    groups
        .iter()
        .rev()
        .map(|(&(year, month), group)| MonthlyAggregate::from_group(year, month, group))
        .collect()
}

/// Filter entries to a time frame, preserving input order
///
/// `month` is ignored for [`TimeFrame::Year`]; both are ignored for
/// [`TimeFrame::All`].
pub fn select_period(
    entries: &[Arc<FuelEntry>],
    time_frame: TimeFrame,
    month: u32,
    year: i32,
) -> Vec<Arc<FuelEntry>> {
    match time_frame {
        TimeFrame::Month => entries
            .iter()
            .filter(|e| e.date.year() == year && e.date.month() == month)
            .cloned()
            .collect(),
        TimeFrame::Year => entries
            .iter()
            .filter(|e| e.date.year() == year)
            .cloned()
            .collect(),
        TimeFrame::All => entries.to_vec(),
    }
}
