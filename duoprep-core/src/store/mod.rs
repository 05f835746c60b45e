//! Remote row-store access.
//!
//! The tracker keeps all persistent state in a hosted Postgres-style row
//! store reached over its REST surface. This module is a thin client: it
//! fetches the three read shapes the stats engine consumes and performs the
//! write calls for a submission. It contains no aggregation logic of its
//! own; the engine only ever sees snapshots the caller fetched here.

mod client;

pub use client::StoreClient;
