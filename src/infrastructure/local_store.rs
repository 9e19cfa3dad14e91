//! Local fallback store over on-device key-value storage

use crate::domain::{sort_newest_first, JournalEntry, StoredEntry};
use crate::error::{DiarioError, Result};
use crate::infrastructure::storage::{KeyValueStorage, MESSAGES_KEY, MIGRATED_KEY};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Entry collection kept as one JSON array under the `messages` key.
///
/// Every mutation reads the whole collection and rewrites it.
#[derive(Debug, Clone)]
pub struct LocalStore {
    storage: KeyValueStorage,
}

/// The stored array split into usable entries and records that could not be
/// mapped. Unmapped records are written back unchanged.
#[derive(Debug, Default)]
struct Collection {
    entries: Vec<JournalEntry>,
    unmapped: Vec<Value>,
}

impl LocalStore {
    pub fn new(storage: KeyValueStorage) -> Self {
        LocalStore { storage }
    }

    /// Load the collection, failing on unreadable or malformed data
    pub fn load(&self) -> Result<Vec<JournalEntry>> {
        Ok(self.read()?.entries)
    }

    /// All entries newest-first; unreadable data counts as an empty collection
    pub fn list(&self) -> Vec<JournalEntry> {
        self.read_or_empty().entries
    }

    pub fn create(&self, title: &str, content: &str, author: &str) -> Result<JournalEntry> {
        let mut collection = self.read_or_empty();
        let created_at = Utc::now();
        let entry = JournalEntry::new(
            fresh_id(&collection.entries, created_at),
            title,
            content,
            author,
            created_at,
        );

        collection.entries.push(entry.clone());
        self.save(collection)?;
        debug!(id = %entry.id, "created local entry");
        Ok(entry)
    }

    pub fn update(&self, id: &str, title: &str, content: &str) -> Result<JournalEntry> {
        let mut collection = self.read_or_empty();
        let entry = collection
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| DiarioError::NotFound(id.to_string()))?;

        entry.apply_edit(title, content);
        let updated = entry.clone();

        self.save(collection)?;
        debug!(id = %id, "updated local entry");
        Ok(updated)
    }

    /// Remove an entry; `false` without writing when no entry has that id
    pub fn delete(&self, id: &str) -> Result<bool> {
        let mut collection = self.read_or_empty();
        let before = collection.entries.len();
        collection.entries.retain(|e| e.id != id);

        if collection.entries.len() == before {
            return Ok(false);
        }

        self.save(collection)?;
        debug!(id = %id, "deleted local entry");
        Ok(true)
    }

    pub fn is_migrated(&self) -> bool {
        self.storage.contains(MIGRATED_KEY)
    }

    pub fn mark_migrated(&self) -> Result<()> {
        self.storage.set(MIGRATED_KEY, "true")
    }

    fn read(&self) -> Result<Collection> {
        let Some(raw) = self.storage.get(MESSAGES_KEY)? else {
            return Ok(Collection::default());
        };
        if raw.trim().is_empty() {
            return Ok(Collection::default());
        }

        let values: Vec<Value> = serde_json::from_str(&raw)
            .map_err(|e| DiarioError::Parse(format!("local messages: {}", e)))?;

        let mut collection = Collection::default();
        let mut derived = Vec::new();
        let mut taken: HashSet<String> = HashSet::new();

        // Stored ids are claimed before any derived id is assigned
        for value in values {
            let record = match serde_json::from_value::<StoredEntry>(value.clone()) {
                Ok(record) => record,
                Err(e) => {
                    warn!(error = %e, "keeping stored record with an unreadable shape as-is");
                    collection.unmapped.push(value);
                    continue;
                }
            };
            let has_id = record.has_id();
            match record.into_entry() {
                Some(mut entry) if has_id => {
                    entry.id = unique_id(&entry.id, |id| taken.contains(id));
                    taken.insert(entry.id.clone());
                    collection.entries.push(entry);
                }
                Some(entry) => derived.push(entry),
                None => {
                    warn!("keeping stored record without a usable timestamp as-is");
                    collection.unmapped.push(value);
                }
            }
        }

        for mut entry in derived {
            entry.id = unique_id(&entry.id, |id| taken.contains(id));
            taken.insert(entry.id.clone());
            collection.entries.push(entry);
        }

        sort_newest_first(&mut collection.entries);
        Ok(collection)
    }

    fn read_or_empty(&self) -> Collection {
        self.read().unwrap_or_else(|e| {
            warn!(error = %e, "failed to load local entries, treating as empty");
            Collection::default()
        })
    }

    /// Rewrite the whole collection, oldest first, unmapped records last
    fn save(&self, collection: Collection) -> Result<()> {
        let Collection {
            mut entries,
            unmapped,
        } = collection;
        sort_newest_first(&mut entries);
        entries.reverse();

        let mut values = Vec::with_capacity(entries.len() + unmapped.len());
        for entry in &entries {
            values.push(serde_json::to_value(entry)?);
        }
        values.extend(unmapped);

        let json = serde_json::to_string_pretty(&values)?;
        self.storage.set(MESSAGES_KEY, &json)
    }
}

/// Millisecond timestamp id, bumped until unique in the collection
fn fresh_id(entries: &[JournalEntry], now: DateTime<Utc>) -> String {
    unique_id(&now.timestamp_millis().to_string(), |id| {
        entries.iter().any(|e| e.id == id)
    })
}

/// `candidate` itself when free; numeric ids count upwards, others get a
/// `-2`, `-3`, ... suffix.
fn unique_id(candidate: &str, is_taken: impl Fn(&str) -> bool) -> String {
    if !is_taken(candidate) {
        return candidate.to_string();
    }

    if let Ok(mut n) = candidate.parse::<i64>() {
        loop {
            n += 1;
            let next = n.to_string();
            if !is_taken(&next) {
                return next;
            }
        }
    }

    let mut suffix = 2;
    loop {
        let next = format!("{}-{}", candidate, suffix);
        if !is_taken(&next) {
            return next;
        }
        suffix += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, LocalStore) {
        let temp = TempDir::new().unwrap();
        let store = LocalStore::new(KeyValueStorage::new(temp.path().to_path_buf()));
        (temp, store)
    }

    fn raw_storage(temp: &TempDir) -> KeyValueStorage {
        KeyValueStorage::new(temp.path().to_path_buf())
    }

    #[test]
    fn test_empty_store_lists_nothing() {
        let (_temp, store) = store();
        assert!(store.list().is_empty());
        assert!(!store.is_migrated());
    }

    #[test]
    fn test_create_then_list() {
        let (_temp, store) = store();
        let before = Utc::now();

        let entry = store.create("Hola", "Te quiero", "Esposa").unwrap();
        let listed = store.list();

        assert_eq!(listed, vec![entry.clone()]);
        assert_eq!(entry.title, "Hola");
        assert_eq!(entry.content, "Te quiero");
        assert_eq!(entry.author, "Esposa");
        assert!(entry.created_at >= before);
    }

    #[test]
    fn test_ids_are_unique_for_rapid_creates() {
        let (_temp, store) = store();
        for i in 0..5 {
            store.create(&format!("t{}", i), "c", "Esposo").unwrap();
        }

        let mut ids: Vec<String> = store.list().into_iter().map(|e| e.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn test_update_changes_only_title_and_content() {
        let (_temp, store) = store();
        let original = store.create("A", "B", "Esposa").unwrap();

        let updated = store.update(&original.id, "A2", "B2").unwrap();

        assert_eq!(updated.title, "A2");
        assert_eq!(updated.content, "B2");
        assert_eq!(updated.author, original.author);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(store.list(), vec![updated]);
    }

    #[test]
    fn test_update_missing_entry() {
        let (_temp, store) = store();
        store.create("A", "B", "Esposa").unwrap();

        match store.update("nope", "x", "y") {
            Err(DiarioError::NotFound(id)) => assert_eq!(id, "nope"),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_delete() {
        let (_temp, store) = store();
        let keep = store.create("keep", "c", "Esposa").unwrap();
        let drop = store.create("drop", "c", "Esposo").unwrap();

        assert!(store.delete(&drop.id).unwrap());
        assert_eq!(store.list(), vec![keep.clone()]);

        assert!(!store.delete(&drop.id).unwrap());
        assert_eq!(store.list(), vec![keep]);
    }

    #[test]
    fn test_delete_missing_does_not_rewrite() {
        let (temp, store) = store();
        let storage = raw_storage(&temp);
        storage
            .set(MESSAGES_KEY, r#"[{"id":"1","title":"A","content":"B","author":"Esposa","created_at":"2025-03-10T12:00:00Z"}]"#)
            .unwrap();
        let before = storage.get(MESSAGES_KEY).unwrap();

        assert!(!store.delete("2").unwrap());
        assert_eq!(storage.get(MESSAGES_KEY).unwrap(), before);
    }

    #[test]
    fn test_list_sorts_any_stored_order() {
        let (temp, store) = store();
        raw_storage(&temp)
            .set(
                MESSAGES_KEY,
                r#"[
                    {"id":"2","title":"b","content":"c","author":"Esposa","created_at":"2025-02-01T00:00:00Z"},
                    {"id":"3","title":"c","content":"c","author":"Esposo","created_at":"2025-03-01T00:00:00Z"},
                    {"id":"1","title":"a","content":"c","author":"Esposa","created_at":"2025-01-01T00:00:00Z"}
                ]"#,
            )
            .unwrap();

        let ids: Vec<String> = store.list().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["3", "2", "1"]);
    }

    #[test]
    fn test_legacy_records_are_upgraded_on_write() {
        let (temp, store) = store();
        let storage = raw_storage(&temp);
        storage
            .set(
                MESSAGES_KEY,
                r#"[{"id":"1","title":"viejo","content":"c","author":"Esposo","date":"14/2/2025","time":"20:30"}]"#,
            )
            .unwrap();

        let legacy = store.list().remove(0);
        store.create("nuevo", "c", "Esposa").unwrap();

        let raw = storage.get(MESSAGES_KEY).unwrap().unwrap();
        assert!(raw.contains("created_at"));
        assert!(!raw.contains("\"date\""));
        assert!(store.list().contains(&legacy));
    }

    #[test]
    fn test_idless_records_from_the_same_minute_get_distinct_ids() {
        let (temp, store) = store();
        raw_storage(&temp)
            .set(
                MESSAGES_KEY,
                r#"[
                    {"title":"uno","content":"c","author":"Esposo","date":"14/2/2025","time":"20:30"},
                    {"title":"dos","content":"c","author":"Esposa","date":"14/2/2025","time":"20:30"}
                ]"#,
            )
            .unwrap();

        let ids: Vec<String> = store.list().into_iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
        // Stable across reads
        let again: Vec<String> = store.list().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, again);

        assert!(store.delete(&ids[0]).unwrap());
        let remaining = store.list();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, ids[1]);
    }

    #[test]
    fn test_derived_id_does_not_take_a_stored_id() {
        let (temp, store) = store();
        let storage = raw_storage(&temp);
        storage
            .set(
                MESSAGES_KEY,
                r#"[{"title":"sin id","content":"c","author":"Esposo","date":"14/2/2025","time":"20:30"}]"#,
            )
            .unwrap();
        let derived = store.list().remove(0).id;

        storage
            .set(
                MESSAGES_KEY,
                &format!(
                    r#"[
                        {{"title":"sin id","content":"c","author":"Esposo","date":"14/2/2025","time":"20:30"}},
                        {{"id":"{}","title":"con id","content":"c","author":"Esposa","created_at":"2025-03-10T12:00:00Z"}}
                    ]"#,
                    derived
                ),
            )
            .unwrap();

        let entries = store.list();
        let with_id = entries.iter().find(|e| e.title == "con id").unwrap();
        let without_id = entries.iter().find(|e| e.title == "sin id").unwrap();
        assert_eq!(with_id.id, derived);
        assert_ne!(without_id.id, derived);
    }

    #[test]
    fn test_unmappable_records_survive_rewrites() {
        let (temp, store) = store();
        let storage = raw_storage(&temp);
        storage
            .set(
                MESSAGES_KEY,
                r#"[
                    {"id":"1","title":"sin fecha","content":"c","author":"Esposa"},
                    {"id":"2","title":["raro"]},
                    {"id":"3","title":"ok","content":"c","author":"Esposo","created_at":"2025-03-10T12:00:00Z"}
                ]"#,
            )
            .unwrap();

        assert_eq!(store.list().len(), 1);
        let created = store.create("nuevo", "c", "Esposa").unwrap();
        assert!(store.delete("3").unwrap());

        let raw: Vec<Value> =
            serde_json::from_str(&storage.get(MESSAGES_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(raw.len(), 3);
        assert_eq!(raw[0]["id"], created.id.as_str());
        assert_eq!(raw[1]["title"], "sin fecha");
        assert_eq!(raw[2]["title"][0], "raro");
        assert_eq!(store.list(), vec![created]);
    }

    #[test]
    fn test_unique_id_suffixes_non_numeric_ids() {
        let is_taken = |id: &str| id == "abc" || id == "abc-2";
        assert_eq!(unique_id("abc", is_taken), "abc-3");
        assert_eq!(unique_id("xyz", is_taken), "xyz");
    }

    #[test]
    fn test_corrupt_json_is_treated_as_empty() {
        let (temp, store) = store();
        raw_storage(&temp).set(MESSAGES_KEY, "{not json").unwrap();

        assert!(matches!(store.load(), Err(DiarioError::Parse(_))));
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_migration_flag() {
        let (_temp, store) = store();
        store.mark_migrated().unwrap();
        assert!(store.is_migrated());
    }

    #[test]
    fn test_fresh_id_skips_taken_ids() {
        let now = DateTime::parse_from_rfc3339("2025-03-10T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let millis = now.timestamp_millis();
        let taken = vec![JournalEntry::new(millis.to_string(), "t", "c", "Esposa", now)];

        assert_eq!(fresh_id(&taken, now), (millis + 1).to_string());
    }
}
