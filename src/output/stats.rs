//! Statistics generation from the listing store
//!
//! This module provides functionality for extracting and displaying
//! store statistics from the storage layer.

use crate::output::OutputResult;
use crate::storage::{ListingStore, SessionRecord};

/// Listing store statistics summary
#[derive(Debug, Clone)]
pub struct StoreStatistics {
    /// Total number of listings
    pub total_listings: u64,

    /// Listing counts per source, largest first
    pub by_source: Vec<(String, u64)>,

    /// Listing counts per industry, largest first
    pub by_industry: Vec<(String, u64)>,

    /// The most recent session, if any ran
    pub latest_session: Option<SessionRecord>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(StoreStatistics)` - Successfully loaded statistics
/// * `Err(OutputError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn ListingStore) -> OutputResult<StoreStatistics> {
    Ok(StoreStatistics {
        total_listings: storage.count_listings()?,
        by_source: storage.count_by_source()?,
        by_industry: storage.count_by_industry()?,
        latest_session: storage.get_latest_session()?,
    })
}

fn percentage(count: u64, total: u64) -> f64 {
    if total > 0 {
        (count as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Listing Store Statistics ===\n");

    println!("Overview:");
    println!("  Total listings: {}", stats.total_listings);
    println!("  Sources: {}", stats.by_source.len());
    println!();

    println!("Listings by Source:");
    for (source, count) in &stats.by_source {
        println!(
            "  {}: {} ({:.1}%)",
            source,
            count,
            percentage(*count, stats.total_listings)
        );
    }
    println!();

    println!("Listings by Industry:");
    for (industry, count) in &stats.by_industry {
        println!(
            "  {}: {} ({:.1}%)",
            industry,
            count,
            percentage(*count, stats.total_listings)
        );
    }
    println!();

    if let Some(session) = &stats.latest_session {
        println!("Latest Session:");
        println!("  ID: {}", session.id);
        println!("  Started: {}", session.started_at);
        if let Some(finished) = &session.finished_at {
            println!("  Finished: {}", finished);
        }
        println!(
            "  Status: {} ({})",
            session.status,
            session.outcome.as_deref().unwrap_or("unknown")
        );
        println!("  Listings: {}", session.total_listings);
        println!("  Sources: {}", session.sources.join(", "));
        if !session.errors.is_empty() {
            println!("  Errors ({}):", session.errors.len());
            for error in &session.errors {
                println!("    - {}", error);
            }
        }
    }
}
