use crate::listing::RawListing;
use crate::source::{ScraperMetrics, ScrapingResult};
use crate::storage::{PersistReport, SessionRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;
use uuid::Uuid;

/// Binary session status
///
/// A finished session is `Failed` as soon as any error was recorded, even
/// if most sources succeeded. `SessionOutcome` tells partial failure apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Running,
    Completed,
    Failed,
}

impl SessionStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// How a finished session went across its sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    /// Every source succeeded and no error was recorded
    Succeeded,
    /// At least one source succeeded, but not everything went well
    PartiallySucceeded,
    /// No source succeeded
    Failed,
}

impl SessionOutcome {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::PartiallySucceeded => "partially_succeeded",
            Self::Failed => "failed",
        }
    }
}

/// One orchestration run across one or more sources
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapingSession {
    id: Uuid,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<SessionOutcome>,
    total_listings: usize,
    sources: Vec<String>,
    results: BTreeMap<String, ScrapingResult>,
    errors: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    metrics: BTreeMap<String, ScraperMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    persisted: Option<PersistReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    config_hash: Option<String>,
}

impl ScrapingSession {
    /// Starts a new session
    pub fn start(config_hash: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_time: Utc::now(),
            end_time: None,
            status: SessionStatus::Running,
            outcome: None,
            total_listings: 0,
            sources: Vec::new(),
            results: BTreeMap::new(),
            errors: Vec::new(),
            metrics: BTreeMap::new(),
            persisted: None,
            config_hash,
        }
    }

    /// Records the result of a source that ran to completion
    pub(crate) fn record_result(&mut self, source: &str, result: ScrapingResult) {
        if self.is_finished() {
            return;
        }

        self.sources.push(source.to_string());
        if result.success() {
            self.total_listings += result.listings().len();
        } else {
            for error in result.errors() {
                self.errors.push(format!("{}: {}", source, error));
            }
            if result.errors().is_empty() {
                self.errors.push(format!("{}: scrape failed", source));
            }
        }
        self.results.insert(source.to_string(), result);
    }

    /// Records a source whose adapter raised instead of returning a result
    pub(crate) fn record_failure(&mut self, source: &str, error: impl Display) {
        if self.is_finished() {
            return;
        }

        self.sources.push(source.to_string());
        self.errors.push(format!("{}: {}", source, error));
        self.results
            .insert(source.to_string(), ScrapingResult::failed(error));
    }

    /// Records a requested source that does not exist
    pub(crate) fn record_unknown(&mut self, source: &str) {
        if !self.is_finished() {
            self.errors.push(format!("{}: unknown source", source));
        }
    }

    pub(crate) fn record_metrics(&mut self, source: &str, metrics: ScraperMetrics) {
        if !self.is_finished() {
            self.metrics.insert(source.to_string(), metrics);
        }
    }

    pub(crate) fn record_persisted(&mut self, report: PersistReport) {
        if !self.is_finished() {
            self.persisted = Some(report);
        }
    }

    /// Ends the session and computes its status and outcome
    pub(crate) fn finish(&mut self) {
        if self.is_finished() {
            return;
        }

        self.end_time = Some(Utc::now());
        self.status = if self.errors.is_empty() {
            SessionStatus::Completed
        } else {
            SessionStatus::Failed
        };

        let attempted = self.results.len();
        let succeeded = self.results.values().filter(|r| r.success()).count();
        self.outcome = Some(if succeeded == 0 {
            SessionOutcome::Failed
        } else if succeeded == attempted && self.errors.is_empty() {
            SessionOutcome::Succeeded
        } else {
            SessionOutcome::PartiallySucceeded
        });
    }

    pub fn is_finished(&self) -> bool {
        self.end_time.is_some()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.outcome
    }

    pub fn total_listings(&self) -> usize {
        self.total_listings
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn results(&self) -> &BTreeMap<String, ScrapingResult> {
        &self.results
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn metrics(&self) -> &BTreeMap<String, ScraperMetrics> {
        &self.metrics
    }

    pub fn persisted(&self) -> Option<&PersistReport> {
        self.persisted.as_ref()
    }

    /// Listings of all successful results, in source order of the run
    pub fn listings(&self) -> Vec<RawListing> {
        self.sources
            .iter()
            .filter_map(|source| self.results.get(source))
            .filter(|result| result.success())
            .flat_map(|result| result.listings().iter().cloned())
            .collect()
    }

    /// Builds the summary row stored in `scraping_sessions`
    pub fn to_record(&self) -> SessionRecord {
        SessionRecord {
            id: self.id.to_string(),
            started_at: self.start_time.to_rfc3339(),
            finished_at: self.end_time.map(|t| t.to_rfc3339()),
            status: self.status.to_db_string().to_string(),
            outcome: self.outcome.map(|o| o.to_db_string().to_string()),
            total_listings: self.total_listings as u64,
            sources: self.sources.clone(),
            errors: self.errors.clone(),
            config_hash: self.config_hash.clone().unwrap_or_default(),
        }
    }
}
