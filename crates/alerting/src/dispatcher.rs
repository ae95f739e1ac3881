//! Alert state machine: `created → severity_checked → dedup_checked →
//! dispatched → delivered_to_sink_1..N`.

use crate::dedup::{dedup_key, DedupCache};
use crate::sink::NotificationSink;
use smart_money_core::types::{Alert, Severity};
use std::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchStats {
    pub dispatched: u64,
    pub filtered: u64,
    pub deduplicated: u64,
}

pub struct AlertDispatcher {
    sinks: Vec<Box<dyn NotificationSink>>,
    dedup: Mutex<DedupCache>,
    min_severity: Severity,
    stats: Mutex<DispatchStats>,
}

impl AlertDispatcher {
    pub fn new(sinks: Vec<Box<dyn NotificationSink>>, min_severity: Severity) -> Self {
        Self { sinks, dedup: Mutex::new(DedupCache::with_defaults()), min_severity, stats: Mutex::new(DispatchStats::default()) }
    }

    /// Returns `true` if at least one sink accepted the alert.
    pub async fn dispatch(&self, alert: &Alert) -> bool {
        if alert.severity < self.min_severity {
            self.stats.lock().unwrap().filtered += 1;
            return false;
        }

        let key = dedup_key(
            &format!("{:?}", alert.alert_type),
            alert.market_id.as_deref().unwrap_or(""),
            alert.wallet_id.as_deref().unwrap_or(""),
            alert.direction.as_deref().unwrap_or(""),
            alert.volume.unwrap_or(0.0),
        );

        let is_duplicate = self.dedup.lock().unwrap().check_and_insert(key);
        if is_duplicate {
            self.stats.lock().unwrap().deduplicated += 1;
            return false;
        }

        let mut delivered = false;
        for sink in &self.sinks {
            match sink.send(alert).await {
                Ok(true) => delivered = true,
                Ok(false) => warn!(sink = sink.name(), alert_id = %alert.alert_id, "sink declined delivery"),
                Err(err) => warn!(sink = sink.name(), alert_id = %alert.alert_id, error = %err, "sink delivery failed"),
            }
        }

        if delivered {
            self.stats.lock().unwrap().dispatched += 1;
            info!(alert_id = %alert.alert_id, "alert dispatched");
        }
        delivered
    }

    pub fn stats(&self) -> DispatchStats {
        *self.stats.lock().unwrap()
    }

    pub fn cache_size(&self) -> usize {
        self.dedup.lock().unwrap().len()
    }

    pub fn active_sink_count(&self) -> usize {
        self.sinks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use smart_money_core::types::AlertType;
    use smart_money_core::Result;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSink {
        calls: Arc<AtomicUsize>,
        succeeds: bool,
    }

    #[async_trait]
    impl NotificationSink for CountingSink {
        fn name(&self) -> &str {
            "counting"
        }
        async fn send(&self, _alert: &Alert) -> Result<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.succeeds)
        }
    }

    fn sample_alert(severity: Severity) -> Alert {
        Alert {
            alert_id: "a1".to_string(),
            alert_type: AlertType::ConsensusSignal,
            severity,
            title: "t".to_string(),
            message: "m".to_string(),
            wallet_id: Some("w1".to_string()),
            market_id: Some("m1".to_string()),
            direction: Some("YES".to_string()),
            volume: Some(1000.0),
            data: serde_json::json!({}),
            created_at: Utc::now(),
            delivered_at: None,
        }
    }

    #[tokio::test]
    async fn below_min_severity_is_filtered() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = AlertDispatcher::new(
            vec![Box::new(CountingSink { calls: calls.clone(), succeeds: true })],
            Severity::High,
        );
        let dispatched = dispatcher.dispatch(&sample_alert(Severity::Low)).await;
        assert!(!dispatched);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(dispatcher.stats().filtered, 1);
    }

    #[tokio::test]
    async fn duplicate_alert_is_deduplicated() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = AlertDispatcher::new(
            vec![Box::new(CountingSink { calls: calls.clone(), succeeds: true })],
            Severity::Low,
        );
        assert!(dispatcher.dispatch(&sample_alert(Severity::High)).await);
        assert!(!dispatcher.dispatch(&sample_alert(Severity::High)).await);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(dispatcher.stats().deduplicated, 1);
    }

    #[tokio::test]
    async fn one_failing_sink_does_not_block_others() {
        let failing_calls = Arc::new(AtomicUsize::new(0));
        let succeeding_calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = AlertDispatcher::new(
            vec![
                Box::new(CountingSink { calls: failing_calls.clone(), succeeds: false }),
                Box::new(CountingSink { calls: succeeding_calls.clone(), succeeds: true }),
            ],
            Severity::Low,
        );
        let dispatched = dispatcher.dispatch(&sample_alert(Severity::High)).await;
        assert!(dispatched);
        assert_eq!(failing_calls.load(Ordering::SeqCst), 1);
        assert_eq!(succeeding_calls.load(Ordering::SeqCst), 1);
    }
}
