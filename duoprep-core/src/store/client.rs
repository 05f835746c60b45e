//! HTTP client for the remote row store's REST API.
//!
//! Row-level reads and writes only. Concurrent submissions from the two
//! participants are serialized by the store's atomic insert/upsert; this
//! client never holds locks and callers are expected to re-fetch a fresh
//! snapshot after every mutation.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::StoreConfig;
use crate::day::local_day;
use crate::error::{Error, Result};
use crate::types::{
    validate_submission, ActivityEvent, CumulativePair, DailyRollup, Participant,
    ParticipantTotals,
};

/// Table holding one row per submission.
const EVENTS_TABLE: &str = "activity_log";
/// Table holding one additive rollup row per local day.
const ROLLUPS_TABLE: &str = "daily_progress";
/// Table holding the single all-time totals row.
const CUMULATIVE_TABLE: &str = "cumulative_stats";

/// The fixed id of the cumulative totals row.
const CUMULATIVE_ROW_ID: i64 = 1;

/// HTTP client for the remote row store
pub struct StoreClient {
    config: StoreConfig,
    http_client: reqwest::Client,
    base_url: String,
}

impl StoreClient {
    /// Create a new store client from configuration
    ///
    /// Returns an error if the configuration is invalid or missing required fields.
    pub fn new(config: StoreConfig) -> Result<Self> {
        config.validate()?;

        let base_url = config
            .url
            .clone()
            .ok_or_else(|| Error::Config("store.url is required".to_string()))?
            .trim_end_matches('/')
            .to_string();

        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::Config("store.api_key is required".to_string()))?;

        // Build default headers
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "apikey",
            HeaderValue::from_str(&api_key)
                .map_err(|e| Error::Config(format!("invalid api_key: {}", e)))?,
        );
        let auth_value = format!("Bearer {}", api_key);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value)
                .map_err(|e| Error::Config(format!("invalid api_key: {}", e)))?,
        );

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
            base_url,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn read_rows<T: DeserializeOwned>(&self, table: &str, query: &str) -> Result<Vec<T>> {
        let url = format!("{}?{}", self.table_url(table), query);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Store(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| Error::Store(format!("failed to parse response: {}", e)))
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            Err(Error::Store(format!(
                "API error ({}): {}",
                status, error_text
            )))
        }
    }

    async fn write_row<T: Serialize>(
        &self,
        method: reqwest::Method,
        url: String,
        body: &T,
        merge_duplicates: bool,
    ) -> Result<()> {
        let mut request = self.http_client.request(method, &url).json(body);
        if merge_duplicates {
            request = request.header("Prefer", "resolution=merge-duplicates");
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Store(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            Err(Error::Store(format!(
                "API error ({}): {}",
                status, error_text
            )))
        }
    }

    /// Fetch both participants' all-time totals.
    pub async fn fetch_cumulative(&self) -> Result<CumulativePair> {
        let query = format!("select=*&id=eq.{}", CUMULATIVE_ROW_ID);
        let rows: Vec<CumulativeRow> = self.read_rows(CUMULATIVE_TABLE, &query).await?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| Error::Store("cumulative stats row is missing".to_string()))?;
        Ok(row.into_pair())
    }

    /// Fetch all daily rollups, oldest first.
    pub async fn fetch_daily_rollups(&self) -> Result<Vec<DailyRollup>> {
        self.read_rows(ROLLUPS_TABLE, "select=*&order=date.asc")
            .await
    }

    /// Fetch the most recent activity events, newest first.
    pub async fn fetch_events(&self, limit: usize) -> Result<Vec<ActivityEvent>> {
        let query = format!("select=*&order=id.desc&limit={}", limit);
        self.read_rows(EVENTS_TABLE, &query).await
    }

    /// Record one submission: insert the event row, fold it into the day's
    /// rollup, and advance the cumulative totals.
    ///
    /// The rollup and cumulative writes go through the store's atomic
    /// upsert/update; after this returns the caller should re-fetch rather
    /// than patch its local snapshot.
    pub async fn submit_activity(
        &self,
        participant: Participant,
        completed: i64,
        correct: i64,
        occurred_at: DateTime<Utc>,
    ) -> Result<()> {
        validate_submission(completed, correct)?;

        tracing::info!(
            participant = %participant,
            completed,
            correct,
            "Submitting activity"
        );

        let event = NewEventRow {
            user_type: participant,
            completed,
            correct,
            timestamp: occurred_at,
        };
        self.write_row(
            reqwest::Method::POST,
            self.table_url(EVENTS_TABLE),
            &event,
            false,
        )
        .await?;

        // Fold into the local day's rollup.
        let date = local_day(occurred_at);
        let query = format!("select=*&date=eq.{}", date.format("%Y-%m-%d"));
        let existing: Vec<DailyRollup> = self.read_rows(ROLLUPS_TABLE, &query).await?;
        let mut rollup = existing
            .into_iter()
            .next()
            .unwrap_or_else(|| DailyRollup::empty(date));
        rollup.add(participant, completed, correct);
        self.write_row(
            reqwest::Method::POST,
            self.table_url(ROLLUPS_TABLE),
            &rollup,
            true,
        )
        .await?;

        // Advance the all-time totals.
        let mut pair = self.fetch_cumulative().await?;
        {
            let totals = pair.totals_for_mut(participant);
            totals.completed += completed;
            totals.correct += correct;
        }
        let url = format!(
            "{}?id=eq.{}",
            self.table_url(CUMULATIVE_TABLE),
            CUMULATIVE_ROW_ID
        );
        self.write_row(
            reqwest::Method::PATCH,
            url,
            &CumulativeRow::from_pair(&pair),
            false,
        )
        .await?;

        Ok(())
    }

    /// Submit with retry on transient failures (5xx, timeouts), with
    /// exponential backoff.
    pub async fn submit_activity_with_retry(
        &self,
        participant: Participant,
        completed: i64,
        correct: i64,
        occurred_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut last_error = None;
        let mut delay = Duration::from_millis(500);

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tracing::debug!(
                    "Retrying submit_activity (attempt {}/{}), waiting {:?}",
                    attempt + 1,
                    self.config.max_retries + 1,
                    delay
                );
                tokio::time::sleep(delay).await;
                delay = std::cmp::min(delay * 2, Duration::from_secs(30));
            }

            match self
                .submit_activity(participant, completed, correct, occurred_at)
                .await
            {
                Ok(()) => return Ok(()),
                Err(e) => {
                    if is_retryable_error(&e) {
                        tracing::warn!("Transient error submitting activity: {}", e);
                        last_error = Some(e);
                        continue;
                    } else {
                        return Err(e);
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::Store("max retries exceeded".to_string())))
    }

    /// Check if the store is reachable
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/rest/v1/", self.base_url);

        match self.http_client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }
}

/// Insert body for a new event row; id and created_at are store-assigned.
#[derive(Serialize)]
struct NewEventRow {
    user_type: Participant,
    completed: i64,
    correct: i64,
    timestamp: DateTime<Utc>,
}

/// Flat wire shape of the cumulative totals row.
#[derive(Debug, Serialize, Deserialize)]
struct CumulativeRow {
    id: i64,
    user1_completed: i64,
    user1_correct: i64,
    user1_name: String,
    user2_completed: i64,
    user2_correct: i64,
    user2_name: String,
}

impl CumulativeRow {
    fn into_pair(self) -> CumulativePair {
        CumulativePair {
            user1: ParticipantTotals {
                completed: self.user1_completed,
                correct: self.user1_correct,
                name: self.user1_name,
            },
            user2: ParticipantTotals {
                completed: self.user2_completed,
                correct: self.user2_correct,
                name: self.user2_name,
            },
        }
    }

    fn from_pair(pair: &CumulativePair) -> Self {
        Self {
            id: CUMULATIVE_ROW_ID,
            user1_completed: pair.user1.completed,
            user1_correct: pair.user1.correct,
            user1_name: pair.user1.name.clone(),
            user2_completed: pair.user2.completed,
            user2_correct: pair.user2.correct,
            user2_name: pair.user2.name.clone(),
        }
    }
}

/// Check if an error is retryable (transient)
fn is_retryable_error(error: &Error) -> bool {
    match error {
        Error::Store(msg) => {
            // Retry on 5xx errors
            msg.contains("50") && (msg.contains("API error") || msg.contains("HTTP"))
                // Retry on network/timeout errors
                || msg.contains("timeout")
                || msg.contains("connection")
                || msg.contains("request failed")
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_requires_valid_config() {
        let config = StoreConfig::default();
        assert!(StoreClient::new(config).is_err());
    }

    #[test]
    fn test_client_with_valid_config() {
        let config = StoreConfig {
            url: Some("https://abc.supabase.co/".to_string()),
            api_key: Some("anon-key".to_string()),
            ..Default::default()
        };
        let client = StoreClient::new(config).unwrap();
        assert_eq!(
            client.table_url("daily_progress"),
            "https://abc.supabase.co/rest/v1/daily_progress"
        );
    }

    #[test]
    fn test_is_retryable_error() {
        assert!(is_retryable_error(&Error::Store(
            "API error (500): internal error".to_string()
        )));
        assert!(is_retryable_error(&Error::Store(
            "HTTP request failed: timeout".to_string()
        )));
        assert!(!is_retryable_error(&Error::Store(
            "API error (400): bad request".to_string()
        )));
        assert!(!is_retryable_error(&Error::InvalidSubmission(
            "completed must be positive, got 0".to_string()
        )));
    }

    #[test]
    fn test_cumulative_row_conversion() {
        let row = CumulativeRow {
            id: 1,
            user1_completed: 1200,
            user1_correct: 960,
            user1_name: "Asha".to_string(),
            user2_completed: 900,
            user2_correct: 810,
            user2_name: "Ravi".to_string(),
        };
        let pair = row.into_pair();
        assert_eq!(pair.totals_for(Participant::One).completed, 1200);
        assert_eq!(pair.totals_for(Participant::Two).name, "Ravi");

        let back = CumulativeRow::from_pair(&pair);
        assert_eq!(back.id, CUMULATIVE_ROW_ID);
        assert_eq!(back.user2_correct, 810);
    }
}
