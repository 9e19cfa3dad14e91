//! Journal entries and their stored representations

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// One journal record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

impl JournalEntry {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        author: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        JournalEntry {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            author: author.into(),
            created_at,
        }
    }

    /// Replace the editable fields. Author and timestamp never change.
    pub fn apply_edit(&mut self, title: &str, content: &str) {
        self.title = title.to_string();
        self.content = content.to_string();
    }
}

/// Sort entries newest-first by `created_at`
pub fn sort_newest_first(entries: &mut [JournalEntry]) {
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// The two household users allowed to write entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    Esposa,
    Esposo,
}

impl Author {
    pub fn as_str(&self) -> &'static str {
        match self {
            Author::Esposa => "Esposa",
            Author::Esposo => "Esposo",
        }
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Author {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "esposa" => Ok(Author::Esposa),
            "esposo" => Ok(Author::Esposo),
            _ => Err(format!("Unknown user: '{}'. Valid users: Esposa, Esposo", s)),
        }
    }
}

/// An entry as found in local storage.
///
/// Older data stores `date` (`d/m/yyyy`) and `time` (`HH:MM`) instead of
/// `created_at`, and may lack an `id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoredEntry {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
}

impl StoredEntry {
    /// Resolve the record's timestamp, preferring `created_at`
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.created_at
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|| match (&self.date, &self.time) {
                (Some(date), Some(time)) => parse_legacy_timestamp(date, time),
                _ => None,
            })
    }

    /// Whether the record carries its own non-empty id
    pub fn has_id(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// Convert into a unified entry; `None` when no timestamp can be recovered.
    ///
    /// A missing id is derived from the timestamp, so it is only unique once
    /// the whole collection has been checked.
    pub fn into_entry(self) -> Option<JournalEntry> {
        let created_at = self.timestamp()?;
        let id = self
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| created_at.timestamp_millis().to_string());

        Some(JournalEntry {
            id,
            title: self.title,
            content: self.content,
            author: self.author,
            created_at,
        })
    }
}

/// Parse es-ES `date`/`time` strings, interpreted in local time
pub fn parse_legacy_timestamp(date: &str, time: &str) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(date.trim(), "%d/%m/%Y").ok()?;
    let time = time.trim();
    let time = NaiveTime::parse_from_str(time, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
        .ok()?;

    Some(resolve_local(&Local, NaiveDateTime::new(date, time)))
}

/// Map a wall-clock time to UTC. Times skipped by a daylight-saving jump
/// resolve to the instant the clocks jumped to; a zone that still cannot map
/// the time is treated as UTC.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

// Remote rows may use integer keys.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawId>::deserialize(deserializer).map(|raw| raw.map(String::from))
}
