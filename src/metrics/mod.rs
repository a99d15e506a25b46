use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;

/// Counters describing screen stack activity.
#[derive(Debug, Default, Clone)]
pub struct StackMetrics {
    pushes: u64,
    pops: u64,
    invalidations: u64,
    lifecycle_events: u64,
    dropped_host_events: u64,
}

impl StackMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_push(&mut self) {
        self.pushes = self.pushes.saturating_add(1);
    }

    pub fn record_pops(&mut self, count: usize) {
        if count > 0 {
            self.pops = self.pops.saturating_add(count as u64);
        }
    }

    pub fn record_invalidation(&mut self) {
        self.invalidations = self.invalidations.saturating_add(1);
    }

    pub fn record_lifecycle_events(&mut self, count: usize) {
        if count > 0 {
            self.lifecycle_events = self.lifecycle_events.saturating_add(count as u64);
        }
    }

    pub fn record_dropped_host_event(&mut self) {
        self.dropped_host_events = self.dropped_host_events.saturating_add(1);
    }

    pub fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot {
            pushes: self.pushes,
            pops: self.pops,
            invalidations: self.invalidations,
            lifecycle_events: self.lifecycle_events,
            dropped_host_events: self.dropped_host_events,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub pushes: u64,
    pub pops: u64,
    pub invalidations: u64,
    pub lifecycle_events: u64,
    pub dropped_host_events: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "stack_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("pushes".to_string(), json!(self.pushes));
        map.insert("pops".to_string(), json!(self.pops));
        map.insert("invalidations".to_string(), json!(self.invalidations));
        map.insert("lifecycle_events".to_string(), json!(self.lifecycle_events));
        map.insert(
            "dropped_host_events".to_string(),
            json!(self.dropped_host_events),
        );
        map
    }
}
