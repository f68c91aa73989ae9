//! Pump price model

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::entry::FuelType;

/// Regions the price feed covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Region {
    #[default]
    Istanbul,
    Ankara,
    Izmir,
    Antalya,
    Bursa,
}

impl Region {
    /// All regions, in picker order
    pub const ALL: [Region; 5] = [
        Region::Istanbul,
        Region::Ankara,
        Region::Izmir,
        Region::Antalya,
        Region::Bursa,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Istanbul => "Istanbul",
            Self::Ankara => "Ankara",
            Self::Izmir => "Izmir",
            Self::Antalya => "Antalya",
            Self::Bursa => "Bursa",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Region {
    type Err = String;

    /// Case-insensitive; Turkish spellings ("İstanbul", "İzmir") are accepted
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| match c {
                'İ' | 'ı' => 'i',
                other => other,
            })
            .collect::<String>()
            .to_lowercase();

        Self::ALL
            .into_iter()
            .find(|region| region.name().to_lowercase() == normalized)
            .ok_or_else(|| {
                let names: Vec<_> = Self::ALL.iter().map(|r| r.name()).collect();
                format!("Unknown region '{}' (expected: {})", s, names.join(", "))
            })
    }
}

/// Current pump price of one grade in one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelPrice {
    pub date: NaiveDateTime,
    pub fuel_type: FuelType,
    pub price_per_liter: f64,
    pub region: Region,
}
