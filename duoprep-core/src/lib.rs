//! # duoprep-core
//!
//! Core library for duoprep - a two-participant daily practice tracker.
//!
//! This library provides:
//! - Domain types for participants, activity events, and daily rollups
//! - The pure stats engine: consistency, streaks, time-of-day buckets,
//!   scoring, and race-banner message selection
//! - Local-day resolution on the tracker's fixed UTC+5:30 clock
//! - A thin client for the remote row store
//! - Notification novelty checks, configuration, and logging
//!
//! ## Architecture
//!
//! The stats engine is a set of pure functions over snapshots:
//! - **Store (remote):** rows owned by the hosted row store, mutated only
//!   through explicit client calls
//! - **Snapshot (in memory):** the three read shapes fetched by the caller
//! - **Derived (recomputed):** consistency, streaks, buckets, and scores,
//!   cheap enough to re-run on every poll tick
//!
//! ## Example
//!
//! ```rust,no_run
//! use duoprep_core::{Config, StoreClient};
//! use duoprep_core::stats::resolve_consistency_and_streak;
//!
//! # async fn run() -> duoprep_core::Result<()> {
//! let config = Config::load()?;
//! let client = StoreClient::new(config.store.clone())?;
//!
//! let rollups = client.fetch_daily_rollups().await?;
//! let entries: Vec<_> = rollups
//!     .iter()
//!     .map(|r| r.entry_for(duoprep_core::Participant::One))
//!     .collect();
//! let result = resolve_consistency_and_streak(&entries);
//! println!("streak: {}", result.streak);
//! # Ok(())
//! # }
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use stats::{DAILY_TARGET, MIN_ACCURACY_TARGET};
pub use store::StoreClient;
pub use types::*;

// Public modules
pub mod config;
pub mod day;
pub mod error;
pub mod logging;
pub mod notify;
pub mod stats;
pub mod store;
pub mod types;
