//! User preferences persistence for fuelboard
//!
//! Stores display preferences in `<data_dir>/fuelboard-preferences.json`.

use crate::analytics::TimeFrame;
use crate::locale::{LocaleId, ReportLocale};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

const PREFERENCES_FILE: &str = "fuelboard-preferences.json";

/// fuelboard-specific user preferences
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FuelboardPreferences {
    /// Language of reports and messages
    pub locale: LocaleId,
    /// Time frame used when none is given
    pub default_time_frame: TimeFrame,
    /// Currency symbol override (locale default when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_symbol: Option<String>,
}

impl FuelboardPreferences {
    /// Load preferences from `<data_dir>/fuelboard-preferences.json`.
    /// Returns defaults on any I/O or parse error.
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(PREFERENCES_FILE);
        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring malformed preferences");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Persist preferences to `<data_dir>/fuelboard-preferences.json`.
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(data_dir)
            .context("Failed to create data directory for preferences")?;
        let path = data_dir.join(PREFERENCES_FILE);
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize preferences")?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write preferences to {}", path.display()))
    }

    /// Locale with the currency override applied
    pub fn report_locale(&self) -> ReportLocale {
        let locale = ReportLocale::for_id(self.locale);
        match &self.currency_symbol {
            Some(symbol) => locale.with_currency(symbol.clone()),
            None => locale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let prefs = FuelboardPreferences::load(dir.path());

        assert_eq!(prefs, FuelboardPreferences::default());
        assert_eq!(prefs.locale, LocaleId::Turkish);
        assert_eq!(prefs.default_time_frame, TimeFrame::Month);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let prefs = FuelboardPreferences {
            locale: LocaleId::English,
            default_time_frame: TimeFrame::Year,
            currency_symbol: Some("€".to_string()),
        };
        prefs.save(&dir.path().join("nested")).unwrap();

        let loaded = FuelboardPreferences::load(&dir.path().join("nested"));
        assert_eq!(loaded, prefs);
        assert_eq!(loaded.report_locale().format_money(1.0), "1.00 €");
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(PREFERENCES_FILE), "[1, 2").unwrap();

        assert_eq!(
            FuelboardPreferences::load(dir.path()),
            FuelboardPreferences::default()
        );
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(PREFERENCES_FILE), r#"{"locale":"en"}"#).unwrap();

        let prefs = FuelboardPreferences::load(dir.path());
        assert_eq!(prefs.locale, LocaleId::English);
        assert_eq!(prefs.default_time_frame, TimeFrame::Month);
    }
}
