use chrono::{DateTime, Utc};
use serde::Serialize;

/// Counters for one adapter run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScraperMetrics {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    /// Listings kept after normalization
    pub listings_found: u64,
    /// Records dropped by the discard rule
    pub listings_discarded: u64,
    /// Records dropped by the domain filter
    pub listings_filtered: u64,
    pub amounts_clamped: u64,
    pub extraction_errors: u64,
    pub errors: Vec<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_ms: Option<i64>,
}

impl ScraperMetrics {
    /// Fresh counters with the start time set to now
    pub fn started() -> Self {
        Self {
            start_time: Some(Utc::now()),
            ..Default::default()
        }
    }

    pub fn record_request(&mut self, succeeded: bool) {
        self.total_requests += 1;
        if succeeded {
            self.successful_requests += 1;
        } else {
            self.failed_requests += 1;
        }
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Sets the end time and duration
    pub fn finish(&mut self) {
        let end = Utc::now();
        self.duration_ms = self
            .start_time
            .map(|start| (end - start).num_milliseconds());
        self.end_time = Some(end);
    }
}
