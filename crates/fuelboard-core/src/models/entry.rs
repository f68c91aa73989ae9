//! Refueling entry model

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Newtype for entry IDs
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Generate a fresh random ID (UUID v4)
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if the ID starts with a given prefix
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    /// First 8 characters, for table display
    pub fn short(&self) -> &str {
        self.0
            .char_indices()
            .nth(8)
            .map_or(&self.0[..], |(idx, _)| &self.0[..idx])
    }
}

impl From<String> for EntryId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for EntryId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for EntryId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Fuel grade sold at the pump
///
/// Serialized as its display label so stored files stay human-readable.
/// Anything that is not one of the known grades is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FuelType {
    #[default]
    Benzin95,
    Benzin97,
    Dizel,
    EuroDizel,
    Lpg,
    Other(String),
}

impl FuelType {
    /// All known grades, in pump order
    pub const KNOWN: [FuelType; 5] = [
        FuelType::Benzin95,
        FuelType::Benzin97,
        FuelType::Dizel,
        FuelType::EuroDizel,
        FuelType::Lpg,
    ];

    pub fn label(&self) -> &str {
        match self {
            Self::Benzin95 => "Benzin (95)",
            Self::Benzin97 => "Benzin (97)",
            Self::Dizel => "Dizel",
            Self::EuroDizel => "Euro Dizel",
            Self::Lpg => "LPG",
            Self::Other(name) => name,
        }
    }

    /// Exact label match, anything else is kept verbatim in `Other`
    ///
    /// Used for stored data so that every value round-trips unchanged.
    pub fn from_label(label: &str) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|known| known.label() == label)
            .unwrap_or_else(|| Self::Other(label.to_string()))
    }

    /// Parse a label or a short slug ("benzin-95", "diesel", "lpg", ...)
    ///
    /// Never fails: unknown input becomes `Other` with surrounding whitespace trimmed.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        let normalized: String = trimmed
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect();

        match normalized.as_str() {
            "benzin95" | "benzin" | "95" | "petrol95" | "gasoline95" => Self::Benzin95,
            "benzin97" | "97" | "petrol97" | "gasoline97" => Self::Benzin97,
            "dizel" | "diesel" => Self::Dizel,
            "eurodizel" | "eurodiesel" => Self::EuroDizel,
            "lpg" | "autogas" => Self::Lpg,
            _ => Self::Other(trimmed.to_string()),
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for FuelType {
    fn from(s: String) -> Self {
        Self::from_label(&s)
    }
}

impl From<FuelType> for String {
    fn from(fuel_type: FuelType) -> Self {
        fuel_type.label().to_string()
    }
}

/// One refueling event
///
/// `distance` is the odometer delta since the previous entry. It is computed by
/// the store when the entry is recorded and treated as given input everywhere
/// else; it is absent for the very first entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelEntry {
    pub id: EntryId,
    pub date: NaiveDateTime,
    pub fuel_type: FuelType,
    pub liters: f64,
    pub price_per_liter: f64,
    pub total_amount: f64,
    pub odometer: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(default)]
    pub station: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl FuelEntry {
    /// Liters per 100 distance units since the previous entry
    ///
    /// Only defined when `distance` is present and strictly positive.
    pub fn consumption(&self) -> Option<f64> {
        self.distance
            .filter(|&d| d > 0.0)
            .map(|d| (self.liters * 100.0) / d)
    }

    /// Consumption with a missing distance treated as 1
    ///
    /// Used by the two-point predictor; a missing distance yields `liters * 100`.
    pub fn consumption_or_degenerate(&self) -> f64 {
        (self.liters * 100.0) / self.distance.unwrap_or(1.0)
    }

    /// Format date using a strftime pattern
    pub fn format_date(&self, pattern: &str) -> String {
        self.date.format(pattern).to_string()
    }
}

/// Payload for recording a new entry
///
/// Mirrors the add form: `total_amount` may be left out (or zero) and is then
/// derived from liters and unit price. The store fills in id and distance.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub date: NaiveDateTime,
    pub fuel_type: FuelType,
    pub liters: f64,
    pub price_per_liter: f64,
    pub total_amount: Option<f64>,
    pub odometer: f64,
    pub station: String,
    pub notes: Option<String>,
}

impl Default for NewEntry {
    fn default() -> Self {
        Self {
            date: Local::now().naive_local(),
            fuel_type: FuelType::default(),
            liters: 0.0,
            price_per_liter: 0.0,
            total_amount: None,
            odometer: 0.0,
            station: String::new(),
            notes: None,
        }
    }
}

impl NewEntry {
    /// Total amount as entered, or liters × unit price when not entered
    pub fn resolved_total(&self) -> f64 {
        match self.total_amount {
            Some(total) if total != 0.0 => total,
            _ => self.liters * self.price_per_liter,
        }
    }

    /// Build the stored entry, given the previous odometer reading (if any)
    pub fn into_entry(self, previous_odometer: Option<f64>) -> FuelEntry {
        let total_amount = self.resolved_total();
        let distance = previous_odometer.map(|prev| self.odometer - prev);

        FuelEntry {
            id: EntryId::generate(),
            date: self.date,
            fuel_type: self.fuel_type,
            liters: self.liters,
            price_per_liter: self.price_per_liter,
            total_amount,
            odometer: self.odometer,
            distance,
            station: self.station,
            notes: self.notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(liters: f64, distance: Option<f64>) -> FuelEntry {
        FuelEntry {
            id: EntryId::from("e1"),
            date: NaiveDate::from_ymd_opt(2024, 3, 5)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            fuel_type: FuelType::Dizel,
            liters,
            price_per_liter: 40.0,
            total_amount: liters * 40.0,
            odometer: 12_000.0,
            distance,
            station: "Shell".to_string(),
            notes: None,
        }
    }

    #[test]
    fn test_consumption_requires_positive_distance() {
        assert_eq!(entry(40.0, Some(500.0)).consumption(), Some(8.0));
        assert_eq!(entry(40.0, Some(0.0)).consumption(), None);
        assert_eq!(entry(40.0, Some(-10.0)).consumption(), None);
        assert_eq!(entry(40.0, None).consumption(), None);
    }

    #[test]
    fn test_degenerate_consumption_falls_back_to_one() {
        assert_eq!(entry(40.0, None).consumption_or_degenerate(), 4000.0);
        assert_eq!(entry(40.0, Some(400.0)).consumption_or_degenerate(), 10.0);
    }

    #[test]
    fn test_fuel_type_parse() {
        assert_eq!(FuelType::parse("Benzin (95)"), FuelType::Benzin95);
        assert_eq!(FuelType::parse("benzin-97"), FuelType::Benzin97);
        assert_eq!(FuelType::parse("Diesel"), FuelType::Dizel);
        assert_eq!(FuelType::parse("Euro Dizel"), FuelType::EuroDizel);
        assert_eq!(FuelType::parse("lpg"), FuelType::Lpg);
        assert_eq!(
            FuelType::parse("  Hydrogen "),
            FuelType::Other("Hydrogen".to_string())
        );
    }

    #[test]
    fn test_fuel_type_serializes_as_label() {
        let json = serde_json::to_string(&FuelType::EuroDizel).unwrap();
        assert_eq!(json, "\"Euro Dizel\"");

        let back: FuelType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, FuelType::EuroDizel);
    }

    #[test]
    fn test_other_fuel_type_round_trips() {
        for value in [
            FuelType::Other("Diesel".to_string()),
            FuelType::Other("lpg".to_string()),
            FuelType::Other(" Hydrogen ".to_string()),
            FuelType::Lpg,
        ] {
            let json = serde_json::to_string(&value).unwrap();
            let back: FuelType = serde_json::from_str(&json).unwrap();
            assert_eq!(back, value);
        }
    }

    #[test]
    fn test_short_id() {
        assert_eq!(EntryId::from("3f2a9c1e-0000-4000").short(), "3f2a9c1e");
        assert_eq!(EntryId::from("abc").short(), "abc");
        assert_eq!(EntryId::from("").short(), "");
    }

    #[test]
    fn test_short_id_non_ascii() {
        assert_eq!(EntryId::from("kayıt-çok-önemli").short(), "kayıt-ço");
        assert_eq!(EntryId::from("ğüşiöçĞÜ").short(), "ğüşiöçĞÜ");
    }

    #[test]
    fn test_new_entry_defaults_total_and_distance() {
        let new = NewEntry {
            liters: 30.0,
            price_per_liter: 2.5,
            odometer: 10_450.0,
            ..NewEntry::default()
        };

        let stored = new.clone().into_entry(Some(10_000.0));
        assert_eq!(stored.total_amount, 75.0);
        assert_eq!(stored.distance, Some(450.0));

        let first = new.into_entry(None);
        assert_eq!(first.distance, None);
    }

    #[test]
    fn test_new_entry_keeps_explicit_total() {
        let new = NewEntry {
            liters: 30.0,
            price_per_liter: 2.5,
            total_amount: Some(80.0),
            ..NewEntry::default()
        };
        assert_eq!(new.resolved_total(), 80.0);
    }
}
