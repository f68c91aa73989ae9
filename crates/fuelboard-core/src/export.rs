//! Export functionality for entries and monthly aggregates
//!
//! CSV output is plain `BufWriter` + `writeln!`; JSON goes through serde.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use crate::analytics::MonthlyAggregate;
use crate::models::FuelEntry;

fn create_writer(path: &Path) -> Result<BufWriter<File>> {
    // Create parent directory if needed
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let file =
        File::create(path).with_context(|| format!("Failed to create file: {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Quote a free-text CSV field, doubling embedded quotes
fn csv_text(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn csv_number(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_default()
}

/// Export entries to CSV
///
/// CSV columns: Date, Fuel Type, Liters, Price/L, Total, Odometer, Distance,
/// Consumption, Station, Notes. Rows in input order. Distance and consumption
/// are left empty when undefined.
///
/// # Errors
/// Returns error if file creation or write operations fail
pub fn export_entries_to_csv(entries: &[Arc<FuelEntry>], path: &Path) -> Result<()> {
    let mut writer = create_writer(path)?;

    writeln!(
        writer,
        "Date,Fuel Type,Liters,Price/L,Total,Odometer,Distance,Consumption,Station,Notes"
    )
    .context("Failed to write CSV header")?;

    for entry in entries {
        writeln!(
            writer,
            "\"{}\",{},{:.2},{:.2},{:.2},{:.0},{},{},{},{}",
            entry.date.format("%Y-%m-%d %H:%M"),
            csv_text(entry.fuel_type.label()),
            entry.liters,
            entry.price_per_liter,
            entry.total_amount,
            entry.odometer,
            csv_number(entry.distance),
            csv_number(entry.consumption()),
            csv_text(&entry.station),
            csv_text(entry.notes.as_deref().unwrap_or("")),
        )
        .with_context(|| format!("Failed to write row for entry {}", entry.id))?;
    }

    writer.flush().context("Failed to flush CSV writer")?;

    Ok(())
}

/// Export entries to pretty-printed JSON (same shape as the store file)
pub fn export_entries_to_json(entries: &[Arc<FuelEntry>], path: &Path) -> Result<()> {
    let mut writer = create_writer(path)?;

    let plain: Vec<&FuelEntry> = entries.iter().map(|e| e.as_ref()).collect();
    serde_json::to_writer_pretty(&mut writer, &plain).context("Failed to serialize entries")?;

    writer.flush().context("Failed to flush JSON writer")?;

    Ok(())
}

/// Export monthly aggregates to CSV
///
/// CSV columns: Year, Month, Entries, Liters, Total, Avg Price/L, Distance.
/// Rows in the given order (most recent first as produced by aggregation).
pub fn export_monthly_to_csv(months: &[MonthlyAggregate], path: &Path) -> Result<()> {
    let mut writer = create_writer(path)?;

    writeln!(writer, "Year,Month,Entries,Liters,Total,Avg Price/L,Distance")
        .context("Failed to write CSV header")?;

    for month in months {
        writeln!(
            writer,
            "{},{},{},{:.2},{:.2},{:.2},{:.0}",
            month.year,
            month.month,
            month.number_of_entries,
            month.total_liters,
            month.total_amount,
            month.average_price_per_liter,
            month.total_distance
        )
        .with_context(|| format!("Failed to write row for {}-{:02}", month.year, month.month))?;
    }

    writer.flush().context("Failed to flush CSV writer")?;

    Ok(())
}

/// Export monthly aggregates to pretty-printed JSON
pub fn export_monthly_to_json(months: &[MonthlyAggregate], path: &Path) -> Result<()> {
    let mut writer = create_writer(path)?;

    serde_json::to_writer_pretty(&mut writer, months)
        .context("Failed to serialize monthly aggregates")?;

    writer.flush().context("Failed to flush JSON writer")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::aggregate_by_month;
    use crate::models::FuelType;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn sample_entries() -> Vec<Arc<FuelEntry>> {
        let base = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        vec![
            Arc::new(FuelEntry {
                id: "first".into(),
                date: base.and_hms_opt(8, 0, 0).unwrap(),
                fuel_type: FuelType::Dizel,
                liters: 40.0,
                price_per_liter: 41.5,
                total_amount: 1660.0,
                odometer: 52_000.0,
                distance: None,
                station: "BP".to_string(),
                notes: None,
            }),
            Arc::new(FuelEntry {
                id: "second".into(),
                date: base.and_hms_opt(8, 0, 0).unwrap() + chrono::Duration::days(12),
                fuel_type: FuelType::Dizel,
                liters: 45.0,
                price_per_liter: 42.0,
                total_amount: 1890.0,
                odometer: 52_600.0,
                distance: Some(600.0),
                station: "Shell \"Merkez\"".to_string(),
                notes: Some("full tank".to_string()),
            }),
        ]
    }

    #[test]
    fn test_export_entries_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out/entries.csv");

        export_entries_to_csv(&sample_entries(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Date,Fuel Type,Liters"));
        assert_eq!(
            lines[1],
            "\"2024-03-01 08:00\",\"Dizel\",40.00,41.50,1660.00,52000,,,\"BP\",\"\""
        );
        assert_eq!(
            lines[2],
            "\"2024-03-13 08:00\",\"Dizel\",45.00,42.00,1890.00,52600,600.00,7.50,\"Shell \"\"Merkez\"\"\",\"full tank\""
        );
    }

    #[test]
    fn test_export_entries_json_matches_store_shape() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("entries.json");

        export_entries_to_json(&sample_entries(), &path).unwrap();

        let parsed: Vec<FuelEntry> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].distance, Some(600.0));
        assert_eq!(parsed[0].fuel_type, FuelType::Dizel);
    }

    #[test]
    fn test_export_monthly() {
        let dir = tempdir().unwrap();
        let months = aggregate_by_month(&sample_entries());

        let csv_path = dir.path().join("monthly.csv");
        export_monthly_to_csv(&months, &csv_path).unwrap();
        let content = std::fs::read_to_string(&csv_path).unwrap();
        assert_eq!(
            content.lines().nth(1),
            Some("2024,3,2,85.00,3550.00,41.76,600")
        );

        let json_path = dir.path().join("monthly.json");
        export_monthly_to_json(&months, &json_path).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(value[0]["numberOfEntries"], 2);
    }
}
