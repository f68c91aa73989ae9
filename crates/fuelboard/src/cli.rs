//! Output formatting and argument parsing helpers for the CLI
//!
//! Table rendering goes through comfy-table; JSON output goes through serde.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};
use fuelboard_core::analytics::{MonthlyAggregate, Predictions};
use fuelboard_core::{compare_to_max, FuelEntry, FuelPrice, FuelType, ReportLocale};
use std::sync::Arc;

// ============================================================================
// Argument Parsing
// ============================================================================

/// Date-time patterns accepted by `--date`, tried in order
const DATE_TIME_PATTERNS: [&str; 4] = [
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%d.%m.%Y %H:%M",
];

const DATE_PATTERNS: [&str; 2] = ["%Y-%m-%d", "%d.%m.%Y"];

/// Parse "YYYY-MM-DD[ HH:MM]" (or the Turkish "DD.MM.YYYY[ HH:MM]")
///
/// A bare date means midnight.
pub fn parse_date(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();

    if let Some(dt) = DATE_TIME_PATTERNS
        .iter()
        .find_map(|p| NaiveDateTime::parse_from_str(s, p).ok())
    {
        return Ok(dt);
    }

    let date = DATE_PATTERNS
        .iter()
        .find_map(|p| NaiveDate::parse_from_str(s, p).ok())
        .with_context(|| {
            format!(
                "Invalid date '{}' (expected: YYYY-MM-DD or \"YYYY-MM-DD HH:MM\")",
                s
            )
        })?;
    date.and_hms_opt(0, 0, 0).context("Invalid time")
}

/// Parse a 1-based month number
pub fn parse_month(s: &str) -> Result<u32, String> {
    match s.trim().parse::<u32>() {
        Ok(month) if (1..=12).contains(&month) => Ok(month),
        _ => Err(format!("Invalid month '{}' (expected: 1-12)", s)),
    }
}

// ============================================================================
// Formatting
// ============================================================================

fn new_table(headers: &[&str], no_color: bool) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    // Apply colors only if enabled
    if no_color {
        table.set_header(headers.to_vec());
    } else {
        table.set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    }

    table
}

/// Format entries as table (human) or JSON
pub fn format_entry_table(
    entries: &[Arc<FuelEntry>],
    locale: &ReportLocale,
    json: bool,
    no_color: bool,
) -> String {
    if json {
        let plain: Vec<&FuelEntry> = entries.iter().map(|e| e.as_ref()).collect();
        return serde_json::to_string_pretty(&plain).unwrap_or_else(|_| "[]".to_string());
    }

    if entries.is_empty() {
        return locale.labels.no_records.clone();
    }

    let mut table = new_table(
        &[
            "ID", "Date", "Fuel", "Liters", "Price/L", "Total", "Odometer", "Distance",
            "L/100km", "Station",
        ],
        no_color,
    );

    for entry in entries {
        let distance = entry
            .distance
            .map(|d| format!("{:.0}", d))
            .unwrap_or_else(|| "-".to_string());
        let consumption = entry
            .consumption()
            .map(|c| locale.format_decimal(c))
            .unwrap_or_else(|| "-".to_string());

        table.add_row(Row::from(vec![
            entry.id.short().to_string(),
            locale.format_date(&entry.date),
            entry.fuel_type.label().to_string(),
            locale.format_decimal(entry.liters),
            locale.format_decimal(entry.price_per_liter),
            locale.format_money(entry.total_amount),
            format!("{:.0}", entry.odometer),
            distance,
            consumption,
            truncate(&entry.station, 20),
        ]));
    }

    table.to_string()
}

/// Format monthly aggregates as table (human) or JSON
pub fn format_monthly_table(
    months: &[MonthlyAggregate],
    locale: &ReportLocale,
    json: bool,
    no_color: bool,
) -> String {
    if json {
        return serde_json::to_string_pretty(months).unwrap_or_else(|_| "[]".to_string());
    }

    if months.is_empty() {
        return locale.labels.no_records.clone();
    }

    let mut table = new_table(
        &["Month", "Entries", "Liters", "Total", "Avg Price/L", "Distance"],
        no_color,
    );

    for month in months {
        table.add_row(Row::from(vec![
            month.title(locale),
            month.number_of_entries.to_string(),
            locale.format_volume(month.total_liters),
            locale.format_money(month.total_amount),
            locale.format_unit_price(month.average_price_per_liter),
            format!("{:.0}", month.total_distance),
        ]));
    }

    table.to_string()
}

/// Width of a full comparison bar, in characters
const PRICE_BAR_WIDTH: f64 = 20.0;

fn fuel_color(fuel_type: &FuelType) -> Color {
    match fuel_type {
        FuelType::Benzin95 => Color::Green,
        FuelType::Benzin97 => Color::Blue,
        FuelType::Dizel => Color::DarkYellow,
        FuelType::EuroDizel => Color::Magenta,
        FuelType::Lpg => Color::Red,
        FuelType::Other(_) => Color::Grey,
    }
}

/// Format current prices as table (human) or JSON
///
/// The comparison columns show each price relative to the most expensive grade.
pub fn format_price_table(
    prices: &[FuelPrice],
    locale: &ReportLocale,
    json: bool,
    no_color: bool,
) -> String {
    if json {
        return serde_json::to_string_pretty(prices).unwrap_or_else(|_| "[]".to_string());
    }

    if prices.is_empty() {
        return locale.labels.no_records.clone();
    }

    let mut table = new_table(&["Fuel", "Price", "vs. max", ""], no_color);

    for comparison in compare_to_max(prices) {
        let bar = "█".repeat((comparison.ratio * PRICE_BAR_WIDTH).round() as usize);
        let percent = format!("{:.0}%", comparison.ratio * 100.0);
        let price = locale.format_unit_price(comparison.price_per_liter);

        if no_color {
            table.add_row(Row::from(vec![
                comparison.fuel_type.label().to_string(),
                price,
                percent,
                bar,
            ]));
        } else {
            let color = fuel_color(&comparison.fuel_type);
            table.add_row(Row::from(vec![
                Cell::new(comparison.fuel_type.label()),
                Cell::new(price),
                Cell::new(percent),
                Cell::new(bar).fg(color),
            ]));
        }
    }

    table.to_string()
}

/// Two prediction lines; "n/a" when there is not enough history
pub fn format_predictions(
    consumption: Option<f64>,
    total_amount: Option<f64>,
    locale: &ReportLocale,
) -> String {
    let consumption = consumption
        .map(|v| locale.format_consumption(v))
        .unwrap_or_else(|| "n/a".to_string());
    let total_amount = total_amount
        .map(|v| locale.format_money(v))
        .unwrap_or_else(|| "n/a".to_string());

    format!(
        "Next consumption:  {}\nNext total amount: {}",
        consumption, total_amount
    )
}

/// Sync predictions, as printed by `predict`
pub fn format_sync_predictions(predictions: &Predictions, locale: &ReportLocale) -> String {
    format_predictions(
        predictions.next_consumption,
        predictions.next_total_amount,
        locale,
    )
}

fn truncate(s: &str, max: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max {
        s.to_string()
    } else {
        s.chars().take(max - 1).collect::<String>() + "…"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use fuelboard_core::analytics::aggregate_by_month;
    use fuelboard_core::FuelType;

    fn sample_entry(distance: Option<f64>) -> Arc<FuelEntry> {
        Arc::new(FuelEntry {
            id: "3f2a9c1e-0000-4000-8000-000000000000".into(),
            date: NaiveDate::from_ymd_opt(2024, 3, 14)
                .unwrap()
                .and_hms_opt(18, 5, 0)
                .unwrap(),
            fuel_type: FuelType::Lpg,
            liters: 30.0,
            price_per_liter: 21.5,
            total_amount: 645.0,
            odometer: 84_250.0,
            distance,
            station: "Petrol Ofisi Beşiktaş Sahil Yolu".to_string(),
            notes: None,
        })
    }

    #[test]
    fn test_parse_date_variants() {
        let dt = parse_date("2024-03-14 18:05").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2024-03-14 18:05");

        let dt = parse_date("2024-03-14T07:30").unwrap();
        assert_eq!(dt.hour(), 7);

        let dt = parse_date("14.03.2024").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2024-03-14 00:00");
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date("yesterday").is_err());
        assert!(parse_date("2024-13-01").is_err());
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("3"), Ok(3));
        assert!(parse_month("0").is_err());
        assert!(parse_month("13").is_err());
    }

    #[test]
    fn test_entry_table_plain() {
        let locale = ReportLocale::english();
        let out = format_entry_table(&[sample_entry(Some(400.0))], &locale, false, true);

        assert!(out.contains("3f2a9c1e"));
        assert!(out.contains("2024-03-14 18:05"));
        assert!(out.contains("LPG"));
        assert!(out.contains("7.50"));
        assert!(out.contains("645.00 ₺"));
    }

    #[test]
    fn test_entry_table_missing_distance() {
        let locale = ReportLocale::english();
        let out = format_entry_table(&[sample_entry(None)], &locale, false, true);
        assert!(out.contains(" - "));
    }

    #[test]
    fn test_entry_table_non_ascii_id() {
        let locale = ReportLocale::turkish();
        let entry = Arc::new(FuelEntry {
            id: "kayıt-çok-önemli".into(),
            ..(*sample_entry(None)).clone()
        });

        let out = format_entry_table(&[entry], &locale, false, true);
        assert!(out.contains("kayıt-ço"));
        assert!(!out.contains("kayıt-çok"));
    }

    #[test]
    fn test_entry_table_json() {
        let locale = ReportLocale::english();
        let out = format_entry_table(&[sample_entry(Some(400.0))], &locale, true, true);

        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["fuelType"], "LPG");
        assert_eq!(value[0]["distance"], 400.0);
    }

    #[test]
    fn test_empty_tables_show_no_records() {
        let locale = ReportLocale::turkish();
        assert_eq!(
            format_entry_table(&[], &locale, false, false),
            "Kayıt bulunamadı."
        );
        assert_eq!(
            format_monthly_table(&[], &locale, false, false),
            "Kayıt bulunamadı."
        );
    }

    #[test]
    fn test_monthly_table() {
        let locale = ReportLocale::turkish();
        let months = aggregate_by_month(&[sample_entry(Some(400.0))]);
        let out = format_monthly_table(&months, &locale, false, true);

        assert!(out.contains("Mart 2024"));
        assert!(out.contains("21.50 ₺/L"));
    }

    #[test]
    fn test_price_table() {
        use fuelboard_core::prices::current_prices;
        use fuelboard_core::Region;

        let locale = ReportLocale::turkish();
        let date = NaiveDate::from_ymd_opt(2024, 5, 20)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let prices = current_prices(Region::Izmir, date);
        let out = format_price_table(&prices, &locale, false, true);

        assert!(out.contains("Benzin (97)"));
        assert!(out.contains("41.85 ₺/L"));
        assert!(out.contains("100%"));
        assert!(out.contains(&"█".repeat(20)));
        // LPG at 16.28 / 41.85
        assert!(out.contains("39%"));
        assert!(out.contains("16.28 ₺/L"));

        let json = format_price_table(&prices, &locale, true, true);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[4]["fuelType"], "LPG");
        assert_eq!(value[4]["region"], "Izmir");
    }

    #[test]
    fn test_format_predictions() {
        let locale = ReportLocale::english();
        let out = format_predictions(Some(9.0), None, &locale);
        assert_eq!(
            out,
            "Next consumption:  9.00 L/100km\nNext total amount: n/a"
        );
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Opet", 20), "Opet");
        assert_eq!(truncate("Petrol Ofisi Beşiktaş", 8), "Petrol …");
    }
}
