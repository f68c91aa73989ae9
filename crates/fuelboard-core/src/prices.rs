//! Current pump prices
//!
//! A simulated price feed: after an artificial delay it returns a fixed price
//! list for every known grade, stamped with the fetch time and the requested
//! region. Regions share one list; only the stamp differs.

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;

use crate::models::{FuelPrice, FuelType, Region};

/// Default artificial fetch delay
pub const DEFAULT_FETCH_DELAY: Duration = Duration::from_secs(1);

/// Price per liter for each grade, in [`FuelType::KNOWN`] order
const CURRENT_PRICES: [(FuelType, f64); 5] = [
    (FuelType::Benzin95, 38.76),
    (FuelType::Benzin97, 41.85),
    (FuelType::Dizel, 37.94),
    (FuelType::EuroDizel, 38.52),
    (FuelType::Lpg, 16.28),
];

/// Price list for `region`, stamped with `date`
pub fn current_prices(region: Region, date: NaiveDateTime) -> Vec<FuelPrice> {
    CURRENT_PRICES
        .iter()
        .map(|(fuel_type, price)| FuelPrice {
            date,
            fuel_type: fuel_type.clone(),
            price_per_liter: *price,
            region,
        })
        .collect()
}

/// Simulated price service
#[derive(Debug, Clone, Copy)]
pub struct PriceFeed {
    delay: Duration,
}

impl Default for PriceFeed {
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_DELAY)
    }
}

impl PriceFeed {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Fetch current prices for `region`
    ///
    /// Switching region is just another fetch; nothing is cached between calls.
    pub fn fetch_current_prices(
        &self,
        region: Region,
    ) -> impl Future<Output = Vec<FuelPrice>> + Send + 'static {
        let delay = self.delay;

        async move {
            tokio::time::sleep(delay).await;
            let prices = current_prices(region, Local::now().naive_local());
            tracing::debug!(%region, grades = prices.len(), "Fuel prices fetched");
            prices
        }
    }
}

/// One grade's price relative to the most expensive grade
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceComparison {
    pub fuel_type: FuelType,
    pub price_per_liter: f64,
    /// price / max price, in [0, 1]; 0 when no price is positive
    pub ratio: f64,
}

/// Compare every price against the highest one, keeping input order
pub fn compare_to_max(prices: &[FuelPrice]) -> Vec<PriceComparison> {
    let max = prices
        .iter()
        .map(|p| p.price_per_liter)
        .fold(f64::NEG_INFINITY, f64::max);

    prices
        .iter()
        .map(|p| PriceComparison {
            fuel_type: p.fuel_type.clone(),
            price_per_liter: p.price_per_liter,
            ratio: if max > 0.0 {
                p.price_per_liter / max
            } else {
                0.0
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn stamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 20)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_every_known_grade_priced() {
        let prices = current_prices(Region::Ankara, stamp());

        let grades: Vec<_> = prices.iter().map(|p| p.fuel_type.clone()).collect();
        assert_eq!(grades, FuelType::KNOWN.to_vec());
        assert!(prices.iter().all(|p| p.region == Region::Ankara));
        assert!(prices.iter().all(|p| p.date == stamp()));
    }

    #[test]
    fn test_price_values() {
        let prices = current_prices(Region::Istanbul, stamp());
        let values: Vec<_> = prices.iter().map(|p| p.price_per_liter).collect();
        assert_eq!(values, vec![38.76, 41.85, 37.94, 38.52, 16.28]);
    }

    #[test]
    fn test_compare_to_max() {
        let comparison = compare_to_max(&current_prices(Region::Bursa, stamp()));

        assert_eq!(comparison.len(), 5);
        assert_eq!(comparison[1].fuel_type, FuelType::Benzin97);
        assert_eq!(comparison[1].ratio, 1.0);
        assert!((comparison[4].ratio - 16.28 / 41.85).abs() < 1e-12);
        assert!(comparison.iter().all(|c| c.ratio > 0.0 && c.ratio <= 1.0));
    }

    #[test]
    fn test_compare_to_max_degenerate() {
        assert!(compare_to_max(&[]).is_empty());

        let zero = vec![FuelPrice {
            date: stamp(),
            fuel_type: FuelType::Lpg,
            price_per_liter: 0.0,
            region: Region::Izmir,
        }];
        assert_eq!(compare_to_max(&zero)[0].ratio, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_waits_and_stamps_region() {
        let feed = PriceFeed::new(Duration::from_millis(500));

        let started = tokio::time::Instant::now();
        let prices = feed.fetch_current_prices(Region::Antalya).await;

        assert!(started.elapsed() >= Duration::from_millis(500));
        assert_eq!(prices.len(), FuelType::KNOWN.len());
        assert!(prices.iter().all(|p| p.region == Region::Antalya));
    }

    #[tokio::test(start_paused = true)]
    async fn test_region_switch_refetches() {
        let feed = PriceFeed::default();

        let istanbul = feed.fetch_current_prices(Region::Istanbul).await;
        let izmir = feed.fetch_current_prices(Region::Izmir).await;

        assert_eq!(istanbul[0].region, Region::Istanbul);
        assert_eq!(izmir[0].region, Region::Izmir);
        assert_eq!(istanbul[0].price_per_liter, izmir[0].price_per_liter);
    }
}
