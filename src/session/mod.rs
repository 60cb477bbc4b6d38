//! Orchestration sessions
//!
//! This module handles:
//! - Running source adapters sequentially with a pause between them
//! - Tracking each run as a `ScrapingSession`
//! - Handing the aggregate to the persistence gateway
//! - Building adapters and fetchers from configuration

mod builder;
mod orchestrator;
mod types;

pub use builder::{build_orchestrator, resolve_sites, selected_sources};
pub use orchestrator::Orchestrator;
pub use types::{ScrapingSession, SessionOutcome, SessionStatus};
