//! # Windowed Counter Reader
//!
//! Nodes increment one cache key per second per counter
//! (`{prefix}|{token}|{epoch_second}`). A reporting cycle reads the trailing
//! window of those keys in a single batched round trip and reduces each series
//! to a sum or a per-second average.
//!
//! Averages always divide by the full window size, so seconds without a
//! recorded value pull the average down and an empty window averages to 0.

use super::types::{DurationMetrics, LocalPeerRates};
use crate::cache::CounterStore;
use crate::constants::WINDOW_SECONDS;
use crate::error::ReporterResult;
use crate::key_namer::KeyNamer;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// The exact set of per-second keys read for one counter series
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterWindow {
    pub key_prefix: String,
    pub node_token: String,
    pub window_seconds: i64,
    pub now_epoch_seconds: i64,
}

impl CounterWindow {
    /// Standard 600 second window ending just before `now_epoch_seconds`
    pub fn new(
        key_prefix: impl Into<String>,
        node_token: impl Into<String>,
        now_epoch_seconds: i64,
    ) -> Self {
        Self {
            key_prefix: key_prefix.into(),
            node_token: node_token.into(),
            window_seconds: WINDOW_SECONDS,
            now_epoch_seconds,
        }
    }

    /// Keys for offsets `1..=window_seconds` back from now, most recent first
    pub fn keys(&self) -> Vec<String> {
        let namer = KeyNamer::from_token(self.node_token.as_str());
        (1..=self.window_seconds)
            .map(|offset| namer.windowed_key(&self.key_prefix, self.now_epoch_seconds - offset))
            .collect()
    }
}

/// Parse a raw counter the way nodes write them: an optional sign followed by
/// leading digits, anything else ignored. Missing or non-numeric values are 0.
pub fn parse_counter(raw: Option<&str>) -> i64 {
    let Some(raw) = raw else {
        return 0;
    };

    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    let digits = &digits[..end];
    if digits.is_empty() {
        return 0;
    }

    // Only overflow can fail here; saturate rather than report an idle counter
    match digits.parse::<i64>() {
        Ok(value) if negative => -value,
        Ok(value) => value,
        Err(_) if negative => i64::MIN,
        Err(_) => i64::MAX,
    }
}

pub fn sum(values: &[i64]) -> i64 {
    values.iter().fold(0i64, |acc, v| acc.saturating_add(*v))
}

/// Per-sample average over the whole window; 0 for an empty slice
pub fn average(values: &[i64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    sum(values) as f64 / values.len() as f64
}

/// Average rounded half toward positive infinity
pub fn rounded_average(values: &[i64]) -> i64 {
    round_half_up(average(values))
}

pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Reads counter windows and scalar counters from a shared counter store
#[derive(Debug, Clone)]
pub struct WindowedCounterReader {
    store: Arc<dyn CounterStore>,
}

impl WindowedCounterReader {
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self { store }
    }

    /// Read every window with a single batched request
    ///
    /// Returns one series per window keyed by its prefix, each exactly
    /// `window_seconds` long. A store failure fails the whole read.
    #[instrument(skip(self, windows), fields(windows = windows.len()))]
    pub async fn read_windows(
        &self,
        windows: &[CounterWindow],
    ) -> ReporterResult<HashMap<String, Vec<i64>>> {
        let key_sets: Vec<Vec<String>> = windows.iter().map(CounterWindow::keys).collect();
        let all_keys: Vec<String> = key_sets.iter().flatten().cloned().collect();

        let raw = self.store.mget(&all_keys).await?;

        let mut raw_iter = raw.into_iter();
        let mut series = HashMap::with_capacity(windows.len());
        for (window, keys) in windows.iter().zip(&key_sets) {
            let values: Vec<i64> = raw_iter
                .by_ref()
                .take(keys.len())
                .map(|value| parse_counter(value.as_deref()))
                .collect();

            debug!(
                prefix = %window.key_prefix,
                samples = values.len(),
                sum = sum(&values),
                "Read counter window"
            );
            series.insert(window.key_prefix.clone(), values);
        }

        Ok(series)
    }

    /// Read the standard window for each prefix
    pub async fn read_window(
        &self,
        prefixes: &[&str],
        token: &str,
        now_epoch_seconds: i64,
    ) -> ReporterResult<HashMap<String, Vec<i64>>> {
        let windows: Vec<CounterWindow> = prefixes
            .iter()
            .map(|prefix| CounterWindow::new(*prefix, token, now_epoch_seconds))
            .collect();
        self.read_windows(&windows).await
    }

    /// Rounded per-second average of one series
    pub async fn read_rate(
        &self,
        prefix: &str,
        token: &str,
        now_epoch_seconds: i64,
    ) -> ReporterResult<i64> {
        let series = self.read_window(&[prefix], token, now_epoch_seconds).await?;
        Ok(series
            .get(prefix)
            .map(|values| rounded_average(values))
            .unwrap_or_default())
    }

    /// Rounded per-second averages of a local/peer pair, read together
    pub async fn read_local_peer(
        &self,
        local_prefix: &str,
        peer_prefix: &str,
        token: &str,
        now_epoch_seconds: i64,
    ) -> ReporterResult<LocalPeerRates> {
        let series = self
            .read_window(&[local_prefix, peer_prefix], token, now_epoch_seconds)
            .await?;

        let rate = |prefix: &str| {
            series
                .get(prefix)
                .map(|values| rounded_average(values))
                .unwrap_or_default()
        };

        Ok(LocalPeerRates {
            local: rate(local_prefix),
            peer: rate(peer_prefix),
        })
    }

    /// Read the three scalar duration counters in one request
    pub async fn read_durations(&self, namer: &KeyNamer) -> ReporterResult<DurationMetrics> {
        let keys = namer.duration_keys();
        let raw = self.store.mget(&keys).await?;

        let value = |index: usize| parse_counter(raw.get(index).and_then(|v| v.as_deref()));

        Ok(DurationMetrics {
            aggregate: value(0),
            find_consensus: value(1),
            recent_history_merge_only: value(2),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCounterStore;

    #[test]
    fn test_window_keys_cover_every_offset_once() {
        let window = CounterWindow::new("ocl", "abc", 1_000);
        let keys = window.keys();

        assert_eq!(keys.len(), 600);
        assert_eq!(keys[0], "ocl|abc|999");
        assert_eq!(keys[599], "ocl|abc|400");
        let unique: std::collections::HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), 600);
    }

    #[test]
    fn test_parse_counter_follows_integer_prefix_rules() {
        assert_eq!(parse_counter(None), 0);
        assert_eq!(parse_counter(Some("")), 0);
        assert_eq!(parse_counter(Some("42")), 42);
        assert_eq!(parse_counter(Some("  7")), 7);
        assert_eq!(parse_counter(Some("12abc")), 12);
        assert_eq!(parse_counter(Some("3.9")), 3);
        assert_eq!(parse_counter(Some("-5")), -5);
        assert_eq!(parse_counter(Some("abc")), 0);
        assert_eq!(parse_counter(Some("-")), 0);
    }

    #[test]
    fn test_parse_counter_saturates_on_overflow() {
        assert_eq!(parse_counter(Some("99999999999999999999")), i64::MAX);
        assert_eq!(parse_counter(Some("-99999999999999999999")), i64::MIN);
        assert_eq!(parse_counter(Some("9223372036854775807")), i64::MAX);
    }

    #[test]
    fn test_average_of_empty_window_is_zero() {
        let values = vec![0i64; 600];
        assert_eq!(average(&values), 0.0);
        assert_eq!(rounded_average(&values), 0);
        assert_eq!(average(&[]), 0.0);
    }

    #[test]
    fn test_sparse_window_sum_and_average() {
        let mut values = vec![0i64; 600];
        for v in values.iter_mut().take(10) {
            *v = 5;
        }
        assert_eq!(sum(&values), 50);
        assert!((average(&values) - 50.0 / 600.0).abs() < f64::EPSILON);
        assert_eq!(rounded_average(&values), 0);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(0.5), 1);
        assert_eq!(round_half_up(1.49), 1);
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-0.5), 0);
    }

    #[tokio::test]
    async fn test_read_window_uses_single_round_trip() {
        let store = Arc::new(InMemoryCounterStore::new());
        store.set("ocl|abc|999", "4");
        store.set("ocp|abc|998", "junk");
        let reader = WindowedCounterReader::new(store.clone());

        let series = reader
            .read_window(&["ocl", "ocp"], "abc", 1_000)
            .await
            .unwrap();

        assert_eq!(store.round_trips(), 1);
        assert_eq!(series["ocl"].len(), 600);
        assert_eq!(sum(&series["ocl"]), 4);
        assert_eq!(sum(&series["ocp"]), 0);
    }

    #[tokio::test]
    async fn test_local_and_peer_are_averaged_independently() {
        let store = Arc::new(InMemoryCounterStore::new());
        for offset in 1..=600 {
            store.set(format!("ocl|abc|{}", 1_000 - offset), "3");
        }
        for offset in 1..=300 {
            store.set(format!("ocp|abc|{}", 1_000 - offset), "1");
        }
        let reader = WindowedCounterReader::new(store);

        let rates = reader
            .read_local_peer("ocl", "ocp", "abc", 1_000)
            .await
            .unwrap();

        assert_eq!(rates, LocalPeerRates { local: 3, peer: 1 });
    }

    #[tokio::test]
    async fn test_durations_default_to_zero() {
        let store = Arc::new(InMemoryCounterStore::new());
        store.set("t|aggregate|abc", "120");
        store.set("t|recentHistoryMergeOnly|abc", "nope");
        let reader = WindowedCounterReader::new(store);

        let durations = reader
            .read_durations(&KeyNamer::from_token("abc"))
            .await
            .unwrap();

        assert_eq!(
            durations,
            DurationMetrics {
                aggregate: 120,
                find_consensus: 0,
                recent_history_merge_only: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_as_cache_unavailable() {
        let store = Arc::new(InMemoryCounterStore::new());
        store.set_unavailable(true);
        let reader = WindowedCounterReader::new(store);

        let result = reader.read_rate("ecl", "abc", 1_000).await;
        assert!(matches!(
            result,
            Err(crate::error::ReporterError::CacheUnavailable(_))
        ));
    }
}
