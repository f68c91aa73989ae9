//! Locale-dependent labels and number/date formatting
//!
//! The analytics engines never hard-code user-facing text: every report line,
//! issue message and month name goes through a [`ReportLocale`]. Turkish is the
//! default (the tracker's home market), English is provided as an alternative.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Built-in locale selector (persisted in preferences)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LocaleId {
    #[default]
    #[serde(rename = "tr")]
    Turkish,
    #[serde(rename = "en")]
    English,
}

impl LocaleId {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Turkish => "tr",
            Self::English => "en",
        }
    }
}

impl FromStr for LocaleId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tr" | "tr_tr" | "tr-tr" | "turkish" => Ok(Self::Turkish),
            "en" | "en_us" | "en-us" | "en_gb" | "english" => Ok(Self::English),
            other => Err(format!("Unknown locale '{}' (expected: tr, en)", other)),
        }
    }
}

/// Labels for the summary report and validation messages
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLabels {
    pub no_records: String,
    pub total_spend: String,
    pub average_spend: String,
    pub total_liters: String,
    pub mean_consumption: String,
    pub max_consumption: String,
    pub min_consumption: String,
    pub date: String,
    pub invalid_liters: String,
    pub invalid_price: String,
    pub invalid_odometer: String,
    pub negative_distance: String,
    pub unusual_consumption: String,
    pub time_frame_month: String,
    pub time_frame_year: String,
    pub time_frame_all: String,
}

/// Formatting parameters for everything the engines render as text
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLocale {
    pub id: LocaleId,
    pub currency_symbol: String,
    pub decimal_separator: char,
    pub volume_unit: String,
    pub consumption_unit: String,
    /// strftime pattern used in issue messages and history search
    pub date_format: String,
    /// January first
    pub month_names: Vec<String>,
    pub labels: ReportLabels,
}

impl Default for ReportLocale {
    fn default() -> Self {
        Self::turkish()
    }
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl ReportLocale {
    pub fn for_id(id: LocaleId) -> Self {
        match id {
            LocaleId::Turkish => Self::turkish(),
            LocaleId::English => Self::english(),
        }
    }

    pub fn turkish() -> Self {
        Self {
            id: LocaleId::Turkish,
            currency_symbol: "₺".to_string(),
            decimal_separator: '.',
            volume_unit: "L".to_string(),
            consumption_unit: "L/100km".to_string(),
            date_format: "%d.%m.%Y %H:%M".to_string(),
            month_names: owned(&[
                "Ocak", "Şubat", "Mart", "Nisan", "Mayıs", "Haziran", "Temmuz", "Ağustos",
                "Eylül", "Ekim", "Kasım", "Aralık",
            ]),
            labels: ReportLabels {
                no_records: "Kayıt bulunamadı.".to_string(),
                total_spend: "Toplam Harcama".to_string(),
                average_spend: "Ortalama Harcama".to_string(),
                total_liters: "Toplam Litre".to_string(),
                mean_consumption: "Ortalama Tüketim".to_string(),
                max_consumption: "Maksimum Tüketim".to_string(),
                min_consumption: "Minimum Tüketim".to_string(),
                date: "Tarih".to_string(),
                invalid_liters: "Litre bilgisi eksik veya hatalı.".to_string(),
                invalid_price: "Litre fiyatı eksik veya hatalı.".to_string(),
                invalid_odometer: "Kilometre bilgisi eksik veya hatalı.".to_string(),
                negative_distance: "Mesafe negatif olamaz.".to_string(),
                unusual_consumption: "Olağan dışı tüketim değeri tespit edildi.".to_string(),
                time_frame_month: "Aylık".to_string(),
                time_frame_year: "Yıllık".to_string(),
                time_frame_all: "Tümü".to_string(),
            },
        }
    }

    pub fn english() -> Self {
        Self {
            id: LocaleId::English,
            currency_symbol: "₺".to_string(),
            decimal_separator: '.',
            volume_unit: "L".to_string(),
            consumption_unit: "L/100km".to_string(),
            date_format: "%Y-%m-%d %H:%M".to_string(),
            month_names: owned(&[
                "January",
                "February",
                "March",
                "April",
                "May",
                "June",
                "July",
                "August",
                "September",
                "October",
                "November",
                "December",
            ]),
            labels: ReportLabels {
                no_records: "No records found.".to_string(),
                total_spend: "Total Spend".to_string(),
                average_spend: "Average Spend".to_string(),
                total_liters: "Total Liters".to_string(),
                mean_consumption: "Average Consumption".to_string(),
                max_consumption: "Maximum Consumption".to_string(),
                min_consumption: "Minimum Consumption".to_string(),
                date: "Date".to_string(),
                invalid_liters: "Liters missing or invalid.".to_string(),
                invalid_price: "Price per liter missing or invalid.".to_string(),
                invalid_odometer: "Odometer reading missing or invalid.".to_string(),
                negative_distance: "Distance cannot be negative.".to_string(),
                unusual_consumption: "Unusual consumption value detected.".to_string(),
                time_frame_month: "Monthly".to_string(),
                time_frame_year: "Yearly".to_string(),
                time_frame_all: "All".to_string(),
            },
        }
    }

    /// Override the currency symbol (no conversion is performed)
    pub fn with_currency(mut self, symbol: impl Into<String>) -> Self {
        self.currency_symbol = symbol.into();
        self
    }

    /// Two decimal places with the locale's separator
    pub fn format_decimal(&self, value: f64) -> String {
        let formatted = format!("{:.2}", value);
        if self.decimal_separator == '.' {
            formatted
        } else {
            formatted.replace('.', &self.decimal_separator.to_string())
        }
    }

    pub fn format_money(&self, value: f64) -> String {
        format!("{} {}", self.format_decimal(value), self.currency_symbol)
    }

    pub fn format_unit_price(&self, value: f64) -> String {
        format!(
            "{} {}/{}",
            self.format_decimal(value),
            self.currency_symbol,
            self.volume_unit
        )
    }

    pub fn format_volume(&self, value: f64) -> String {
        format!("{} {}", self.format_decimal(value), self.volume_unit)
    }

    pub fn format_consumption(&self, value: f64) -> String {
        format!("{} {}", self.format_decimal(value), self.consumption_unit)
    }

    pub fn format_date(&self, date: &NaiveDateTime) -> String {
        date.format(&self.date_format).to_string()
    }

    /// Month name for a 1-based month number ("?" when out of range)
    pub fn month_name(&self, month: u32) -> &str {
        (month as usize)
            .checked_sub(1)
            .and_then(|idx| self.month_names.get(idx))
            .map(String::as_str)
            .unwrap_or("?")
    }
}
