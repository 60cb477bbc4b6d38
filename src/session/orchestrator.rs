//! Session orchestration
//!
//! Runs source adapters one after another, collects their results into a
//! `ScrapingSession`, and optionally hands the listings to the persistence
//! gateway. One failing source never aborts the session.

use crate::session::ScrapingSession;
use crate::source::{ScrapingResult, SourceAdapter};
use crate::storage::{ListingStore, PersistenceGateway};
use crate::HarvestError;
use std::time::Duration;

/// Sequential runner over a set of source adapters
pub struct Orchestrator {
    adapters: Vec<Box<dyn SourceAdapter>>,
    source_delay: Duration,
    config_hash: Option<String>,
}

impl Orchestrator {
    /// Creates an orchestrator
    ///
    /// # Arguments
    ///
    /// * `adapters` - Adapters in run order
    /// * `source_delay` - Pause between two adapters
    pub fn new(adapters: Vec<Box<dyn SourceAdapter>>, source_delay: Duration) -> Self {
        Self {
            adapters,
            source_delay,
            config_hash: None,
        }
    }

    /// Tags every session with the hash of the configuration it ran under
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    fn find(&self, name: &str) -> Option<&dyn SourceAdapter> {
        self.adapters
            .iter()
            .find(|a| a.name() == name)
            .map(|a| &**a)
    }

    /// Runs every adapter
    pub async fn run_all(&self) -> ScrapingSession {
        let selected: Vec<&dyn SourceAdapter> = self.adapters.iter().map(|a| &**a).collect();
        self.run_selected(selected, &[]).await
    }

    /// Runs the named adapters in the given order
    ///
    /// Unknown names are recorded as session errors; the other sources
    /// still run.
    pub async fn run_subset<S: AsRef<str>>(&self, names: &[S]) -> ScrapingSession {
        let (selected, unknown) = self.partition(names);
        self.run_selected(selected, &unknown).await
    }

    /// Runs a single adapter
    ///
    /// # Returns
    ///
    /// * `Ok(ScrapingResult)` - The adapter's result; an adapter that raised
    ///   yields an error-only result
    /// * `Err(HarvestError::UnknownSource)` - No adapter has this name
    pub async fn run_one(&self, name: &str) -> Result<ScrapingResult, HarvestError> {
        let adapter = self
            .find(name)
            .ok_or_else(|| HarvestError::UnknownSource(name.to_string()))?;

        match adapter.scrape().await {
            Ok(result) => Ok(result),
            Err(e) => {
                tracing::error!("Source {} failed: {}", name, e);
                Ok(ScrapingResult::failed(e))
            }
        }
    }

    /// Runs the adapters, then persists the aggregate and the session record
    ///
    /// # Arguments
    ///
    /// * `names` - Sources to run; `None` runs all
    /// * `gateway` - Persistence gateway over the listing store
    pub async fn run_and_persist<S, N>(
        &self,
        names: Option<&[N]>,
        gateway: &mut PersistenceGateway<S>,
    ) -> ScrapingSession
    where
        S: ListingStore,
        N: AsRef<str>,
    {
        let mut session = ScrapingSession::start(self.config_hash.clone());
        match names {
            Some(names) => {
                let (selected, unknown) = self.partition(names);
                self.run_into(&mut session, selected, &unknown).await;
            }
            None => {
                let selected = self.adapters.iter().map(|a| &**a).collect();
                self.run_into(&mut session, selected, &[]).await;
            }
        }

        let report = gateway.persist(&session.listings());
        session.record_persisted(report);
        session.finish();

        if let Err(e) = gateway.store_mut().record_session(&session.to_record()) {
            tracing::warn!("Failed to record session {}: {}", session.id(), e);
        }

        session
    }

    fn partition<N: AsRef<str>>(&self, names: &[N]) -> (Vec<&dyn SourceAdapter>, Vec<String>) {
        let mut selected: Vec<&dyn SourceAdapter> = Vec::new();
        let mut unknown = Vec::new();

        for name in names {
            let name = name.as_ref();
            match self.find(name) {
                Some(adapter) => {
                    if selected.iter().any(|a| a.name() == name) {
                        tracing::debug!("Source {} requested twice, running once", name);
                    } else {
                        selected.push(adapter);
                    }
                }
                None => unknown.push(name.to_string()),
            }
        }

        (selected, unknown)
    }

    async fn run_selected(
        &self,
        selected: Vec<&dyn SourceAdapter>,
        unknown: &[String],
    ) -> ScrapingSession {
        let mut session = ScrapingSession::start(self.config_hash.clone());
        self.run_into(&mut session, selected, unknown).await;
        session.finish();
        session
    }

    async fn run_into(
        &self,
        session: &mut ScrapingSession,
        selected: Vec<&dyn SourceAdapter>,
        unknown: &[String],
    ) {
        tracing::info!(
            "Starting session {} with {} sources",
            session.id(),
            selected.len()
        );

        for name in unknown {
            tracing::warn!("Unknown source requested: {}", name);
            session.record_unknown(name);
        }

        for (index, adapter) in selected.iter().enumerate() {
            if index > 0 && !self.source_delay.is_zero() {
                tokio::time::sleep(self.source_delay).await;
            }

            let name = adapter.name();
            match adapter.scrape().await {
                Ok(result) => {
                    tracing::info!(
                        "Source {} finished: success={}, {} listings",
                        name,
                        result.success(),
                        result.total_scraped()
                    );
                    session.record_result(name, result);
                }
                Err(e) => {
                    tracing::error!("Source {} failed: {}", name, e);
                    session.record_failure(name, e);
                }
            }
            session.record_metrics(name, adapter.metrics());
        }

        tracing::info!(
            "Session {}: {} listings, {} errors",
            session.id(),
            session.total_listings(),
            session.errors().len()
        );
    }
}
