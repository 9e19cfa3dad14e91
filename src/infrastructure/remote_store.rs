//! Remote store adapter for a PostgREST-style hosted table

use crate::domain::JournalEntry;
use crate::error::{DiarioError, Result};
use crate::infrastructure::RemoteConfig;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Method;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Operations the journal needs from the hosted datastore.
///
/// Every method is a single round trip. Transport failures and non-success
/// responses come back as `DiarioError::Connectivity`, undecodable bodies as
/// `DiarioError::Parse`.
pub trait RemoteBackend {
    /// Cheap read used to decide whether the store is reachable
    fn probe(&self) -> Result<()>;

    /// All rows, newest first
    fn list(&self) -> Result<Vec<JournalEntry>>;

    /// Insert a row; the store assigns `id` and `created_at`
    fn create(&self, title: &str, content: &str, author: &str) -> Result<JournalEntry>;

    /// Replace title and content; `NotFound` when no row matches
    fn update(&self, id: &str, title: &str, content: &str) -> Result<JournalEntry>;

    /// Delete a row, reporting whether one matched
    fn delete(&self, id: &str) -> Result<bool>;

    /// Bulk insert full rows, keeping their ids and timestamps
    fn insert_all(&self, entries: &[JournalEntry]) -> Result<()>;
}

#[derive(Serialize)]
struct NewRow<'a> {
    title: &'a str,
    content: &'a str,
    author: &'a str,
}

#[derive(Serialize)]
struct RowEdit<'a> {
    title: &'a str,
    content: &'a str,
}

/// HTTP client for `<url>/rest/v1/<table>`
#[derive(Debug, Clone)]
pub struct RemoteStore {
    client: Client,
    base_url: String,
    table: String,
    api_key: String,
}

impl RemoteStore {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DiarioError::Connectivity(format!("HTTP client setup failed: {}", e)))?;

        Ok(RemoteStore {
            client,
            base_url: config.url.trim().trim_end_matches('/').to_string(),
            table: config.table.clone(),
            api_key: config.anon_key.clone(),
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn request(&self, method: Method) -> Result<RequestBuilder> {
        if self.base_url.is_empty() {
            return Err(DiarioError::Connectivity(
                "remote.url is not configured".to_string(),
            ));
        }

        Ok(self
            .client
            .request(method, self.table_url())
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json"))
    }

    fn send(&self, builder: RequestBuilder) -> Result<String> {
        let response = builder
            .send()
            .map_err(|e| DiarioError::Connectivity(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| DiarioError::Connectivity(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(DiarioError::Connectivity(format!(
                "HTTP {}: {}",
                status,
                error_message(&body)
            )));
        }

        Ok(body)
    }

    fn send_rows(&self, builder: RequestBuilder) -> Result<Vec<JournalEntry>> {
        let body = self.send(builder)?;
        decode_rows(&body)
    }
}

impl RemoteBackend for RemoteStore {
    fn probe(&self) -> Result<()> {
        let builder = self
            .request(Method::GET)?
            .query(&[("select", "id"), ("limit", "1")]);
        self.send(builder)?;
        debug!(url = %self.table_url(), "remote store reachable");
        Ok(())
    }

    fn list(&self) -> Result<Vec<JournalEntry>> {
        let builder = self
            .request(Method::GET)?
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        self.send_rows(builder)
    }

    fn create(&self, title: &str, content: &str, author: &str) -> Result<JournalEntry> {
        let builder = self
            .request(Method::POST)?
            .header("Prefer", "return=representation")
            .json(&NewRow {
                title,
                content,
                author,
            });

        self.send_rows(builder)?
            .into_iter()
            .next()
            .ok_or_else(|| DiarioError::Parse("insert returned no row".to_string()))
    }

    fn update(&self, id: &str, title: &str, content: &str) -> Result<JournalEntry> {
        let builder = self
            .request(Method::PATCH)?
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(&RowEdit { title, content });

        self.send_rows(builder)?
            .into_iter()
            .next()
            .ok_or_else(|| DiarioError::NotFound(id.to_string()))
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let builder = self
            .request(Method::DELETE)?
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation");

        Ok(!self.send_rows(builder)?.is_empty())
    }

    fn insert_all(&self, entries: &[JournalEntry]) -> Result<()> {
        let builder = self.request(Method::POST)?.json(entries);
        self.send(builder)?;
        Ok(())
    }
}

fn decode_rows(body: &str) -> Result<Vec<JournalEntry>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(body)
        .map_err(|e| DiarioError::Parse(format!("Failed to parse response rows: {}", e)))
}

/// Pull the `message` field out of a PostgREST error body when there is one
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["message"].as_str().map(|s| s.to_string()))
        .unwrap_or_else(|| body.to_string())
}
