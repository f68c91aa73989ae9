//! Next-refuel predictions
//!
//! Two estimators, both deliberately naive:
//! - a two-point moving average over the last two entries (sync)
//! - a simulated remote prediction service that averages the last five
//!   entries and applies ±10% uniform noise after an artificial delay (async)
//!
//! Callers must hand in entries in increasing date order; both estimators
//! read from the tail of the slice.

use rand::Rng;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::models::FuelEntry;

/// Entries considered by the remote estimator
pub const REMOTE_WINDOW: usize = 5;

/// Multiplicative noise bounds applied by the remote estimator
pub const JITTER_MIN: f64 = 0.9;
pub const JITTER_MAX: f64 = 1.1;

/// Artificial latency of the simulated service
pub const DEFAULT_REMOTE_DELAY: Duration = Duration::from_secs(1);

/// Sync predictions for the next refuel
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Predictions {
    pub next_consumption: Option<f64>,
    pub next_total_amount: Option<f64>,
}

impl Predictions {
    pub fn compute(entries: &[Arc<FuelEntry>]) -> Self {
        Self {
            next_consumption: predict_next_consumption(entries),
            next_total_amount: predict_next_total_amount(entries),
        }
    }

    pub fn is_available(&self) -> bool {
        self.next_consumption.is_some() || self.next_total_amount.is_some()
    }
}

fn last_two(entries: &[Arc<FuelEntry>]) -> Option<(&FuelEntry, &FuelEntry)> {
    match entries {
        [.., prev, last] => Some((prev.as_ref(), last.as_ref())),
        _ => None,
    }
}

/// Mean consumption of the last two entries
///
/// A missing distance divides by 1 (so contributes `liters * 100`).
///
/// # Returns
/// `None` with fewer than 2 entries
pub fn predict_next_consumption(entries: &[Arc<FuelEntry>]) -> Option<f64> {
    let (prev, last) = last_two(entries)?;
    Some((last.consumption_or_degenerate() + prev.consumption_or_degenerate()) / 2.0)
}

/// Mean unit price × mean liters of the last two entries
///
/// # Returns
/// `None` with fewer than 2 entries
pub fn predict_next_total_amount(entries: &[Arc<FuelEntry>]) -> Option<f64> {
    let (prev, last) = last_two(entries)?;
    let avg_price = (last.price_per_liter + prev.price_per_liter) / 2.0;
    let avg_liters = (last.liters + prev.liters) / 2.0;
    Some(avg_price * avg_liters)
}

#[derive(Debug, Clone, Copy)]
struct WindowSample {
    liters: f64,
    price_per_liter: f64,
}

/// Owned copy of the tail entries sent to the remote estimator
///
/// Captured before any await point so later store mutations cannot leak
/// into an in-flight prediction.
#[derive(Debug, Clone)]
pub struct PredictionWindow {
    samples: Vec<WindowSample>,
}

impl PredictionWindow {
    /// Copy the last [`REMOTE_WINDOW`] entries (or fewer)
    pub fn capture(entries: &[Arc<FuelEntry>]) -> Self {
        let start = entries.len().saturating_sub(REMOTE_WINDOW);
        let samples = entries[start..]
            .iter()
            .map(|e| WindowSample {
                liters: e.liters,
                price_per_liter: e.price_per_liter,
            })
            .collect();
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    fn mean(&self, field: impl Fn(&WindowSample) -> f64) -> f64 {
        let sum: f64 = self.samples.iter().map(field).sum();
        sum / self.samples.len().max(1) as f64
    }

    /// Average liters per fill, before noise
    pub fn baseline_consumption(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        Some(self.mean(|s| s.liters))
    }

    /// Average unit price × average liters, before noise
    pub fn baseline_total_amount(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        Some(self.mean(|s| s.price_per_liter) * self.mean(|s| s.liters))
    }
}

/// Uniform factor in [`JITTER_MIN`, `JITTER_MAX`]
pub fn jitter_factor() -> f64 {
    rand::thread_rng().gen_range(JITTER_MIN..=JITTER_MAX)
}

/// Simulated remote prediction service
///
/// Each call is an independent one-shot request: no cancellation, no retry,
/// and concurrent calls may complete in any order.
#[derive(Debug, Clone, Copy)]
pub struct RemotePredictor {
    delay: Duration,
}

impl Default for RemotePredictor {
    fn default() -> Self {
        Self::new(DEFAULT_REMOTE_DELAY)
    }
}

impl RemotePredictor {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Noisy average of liters over the last five entries
    ///
    /// The window is copied before this returns; the future owns its data.
    pub fn predict_consumption(
        &self,
        entries: &[Arc<FuelEntry>],
    ) -> impl Future<Output = Option<f64>> + Send + 'static {
        let window = PredictionWindow::capture(entries);
        let delay = self.delay;

        async move {
            tokio::time::sleep(delay).await;
            let prediction = window.baseline_consumption().map(|v| v * jitter_factor());
            tracing::debug!(samples = window.len(), ?prediction, "Remote consumption prediction");
            prediction
        }
    }

    /// Noisy average price × average liters over the last five entries
    pub fn predict_total_amount(
        &self,
        entries: &[Arc<FuelEntry>],
    ) -> impl Future<Output = Option<f64>> + Send + 'static {
        let window = PredictionWindow::capture(entries);
        let delay = self.delay;

        async move {
            tokio::time::sleep(delay).await;
            let prediction = window.baseline_total_amount().map(|v| v * jitter_factor());
            tracing::debug!(samples = window.len(), ?prediction, "Remote amount prediction");
            prediction
        }
    }

    /// Fire-and-forget variant: `on_complete` runs exactly once on a tokio task
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_consumption<F>(&self, entries: &[Arc<FuelEntry>], on_complete: F) -> JoinHandle<()>
    where
        F: FnOnce(Option<f64>) + Send + 'static,
    {
        let request = self.predict_consumption(entries);
        tokio::spawn(async move { on_complete(request.await) })
    }

    /// Fire-and-forget variant of [`Self::predict_total_amount`]
    pub fn spawn_total_amount<F>(&self, entries: &[Arc<FuelEntry>], on_complete: F) -> JoinHandle<()>
    where
        F: FnOnce(Option<f64>) + Send + 'static,
    {
        let request = self.predict_total_amount(entries);
        tokio::spawn(async move { on_complete(request.await) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FuelType;
    use chrono::NaiveDate;

    fn create_test_entry(day: u32, liters: f64, price: f64, distance: Option<f64>) -> Arc<FuelEntry> {
        Arc::new(FuelEntry {
            id: format!("entry-{}", day).into(),
            date: NaiveDate::from_ymd_opt(2024, 7, day)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            fuel_type: FuelType::Dizel,
            liters,
            price_per_liter: price,
            total_amount: liters * price,
            odometer: 0.0,
            distance,
            station: String::new(),
            notes: None,
        })
    }

    fn assert_within_jitter(value: f64, baseline: f64) {
        assert!(
            value >= baseline * JITTER_MIN - 1e-9 && value <= baseline * JITTER_MAX + 1e-9,
            "{} outside ±10% of {}",
            value,
            baseline
        );
    }

    #[test]
    fn test_two_point_consumption() {
        let entries = vec![
            create_test_entry(1, 40.0, 2.0, Some(500.0)),
            create_test_entry(2, 45.0, 2.0, Some(450.0)),
        ];
        assert_eq!(predict_next_consumption(&entries), Some(9.0));
    }

    #[test]
    fn test_two_point_uses_last_two_only() {
        let entries = vec![
            create_test_entry(1, 90.0, 9.0, Some(10.0)),
            create_test_entry(2, 40.0, 2.0, Some(500.0)),
            create_test_entry(3, 45.0, 2.0, Some(450.0)),
        ];
        assert_eq!(predict_next_consumption(&entries), Some(9.0));
    }

    #[test]
    fn test_two_point_missing_distance_divides_by_one() {
        let entries = vec![
            create_test_entry(1, 40.0, 2.0, None),
            create_test_entry(2, 45.0, 2.0, Some(450.0)),
        ];
        assert_eq!(predict_next_consumption(&entries), Some((4000.0 + 10.0) / 2.0));
    }

    #[test]
    fn test_two_point_insufficient_data() {
        assert_eq!(predict_next_consumption(&[]), None);
        assert_eq!(
            predict_next_total_amount(&[create_test_entry(1, 40.0, 2.0, None)]),
            None
        );
    }

    #[test]
    fn test_two_point_total_amount() {
        let entries = vec![
            create_test_entry(1, 40.0, 30.0, None),
            create_test_entry(2, 50.0, 40.0, None),
        ];
        // avg price 35 × avg liters 45
        assert_eq!(predict_next_total_amount(&entries), Some(1575.0));
    }

    #[test]
    fn test_window_keeps_last_five() {
        let entries: Vec<_> = (1..=8)
            .map(|d| create_test_entry(d, d as f64 * 10.0, 1.0, None))
            .collect();
        let window = PredictionWindow::capture(&entries);

        assert_eq!(window.len(), 5);
        // liters 40..=80
        assert_eq!(window.baseline_consumption(), Some(60.0));
    }

    #[test]
    fn test_jitter_bounds() {
        for _ in 0..1000 {
            let factor = jitter_factor();
            assert!((JITTER_MIN..=JITTER_MAX).contains(&factor));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_consumption_within_jitter() {
        let entries = vec![
            create_test_entry(1, 40.0, 2.0, None),
            create_test_entry(2, 50.0, 2.0, None),
        ];
        let predictor = RemotePredictor::default();

        let value = predictor.predict_consumption(&entries).await.unwrap();
        assert_within_jitter(value, 45.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_total_amount_within_jitter() {
        let entries = vec![
            create_test_entry(1, 40.0, 30.0, None),
            create_test_entry(2, 50.0, 40.0, None),
        ];
        let predictor = RemotePredictor::default();

        let value = predictor.predict_total_amount(&entries).await.unwrap();
        assert_within_jitter(value, 1575.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_empty_window_is_none() {
        let predictor = RemotePredictor::default();
        assert_eq!(predictor.predict_consumption(&[]).await, None);
        assert_eq!(predictor.predict_total_amount(&[]).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_snapshot_isolated_from_later_mutation() {
        let mut entries = vec![
            create_test_entry(1, 40.0, 2.0, None),
            create_test_entry(2, 40.0, 2.0, None),
        ];
        let predictor = RemotePredictor::default();

        let request = predictor.predict_consumption(&entries);
        entries.clear();
        entries.push(create_test_entry(3, 1000.0, 2.0, None));

        let value = request.await.unwrap();
        assert_within_jitter(value, 40.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_waits_for_delay() {
        let predictor = RemotePredictor::new(Duration::from_millis(750));
        let entries = vec![create_test_entry(1, 40.0, 2.0, None)];

        let started = tokio::time::Instant::now();
        predictor.predict_consumption(&entries).await;
        assert!(started.elapsed() >= Duration::from_millis(750));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_delivers_once() {
        let predictor = RemotePredictor::default();
        let entries = vec![create_test_entry(1, 30.0, 2.0, None)];
        let (tx, rx) = tokio::sync::oneshot::channel();

        let handle = predictor.spawn_consumption(&entries, move |value| {
            let _ = tx.send(value);
        });

        let value = rx.await.unwrap().unwrap();
        assert_within_jitter(value, 30.0);
        handle.await.unwrap();
    }
}
