//! fuelboard-core - Core library for fuelboard
//!
//! Provides the fuel analytics engine (validation, outliers, reports, monthly
//! aggregates, predictions) plus the JSON entry store that feeds it and a
//! simulated current pump price feed.

pub mod analytics;
pub mod error;
pub mod event;
pub mod export;
pub mod locale;
pub mod models;
pub mod preferences;
pub mod prices;
pub mod store;

pub use analytics::{AnalyticsData, PeriodSelection, TimeFrame};
pub use error::CoreError;
pub use event::{DataEvent, EventBus};
pub use export::{
    export_entries_to_csv, export_entries_to_json, export_monthly_to_csv, export_monthly_to_json,
};
pub use locale::{LocaleId, ReportLocale};
pub use models::{EntryId, FuelEntry, FuelPrice, FuelType, NewEntry, Region};
pub use preferences::FuelboardPreferences;
pub use prices::{compare_to_max, PriceComparison, PriceFeed};
pub use store::{EntryStore, HistoryFilter};
