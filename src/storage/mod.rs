//! Durable storage of the four workspace collections.
//!
//! Each collection lives under its own `<prefix>_<name>` key as one JSON
//! array (or object for settings). Reads are lenient: anything missing or
//! unreadable falls back to the built-in defaults. Writes are strict and
//! report failure to the caller.

pub mod backend;
mod defaults;

pub use backend::{FileBackend, KeyValueBackend, MemoryBackend};
pub use defaults::{default_pages, default_templates};

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::model::{Database, Page, Settings, Template};

pub const DEFAULT_KEY_PREFIX: &str = "pagebook";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Pages,
    Databases,
    Templates,
    Settings,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Pages,
        Collection::Databases,
        Collection::Templates,
        Collection::Settings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Pages => "pages",
            Collection::Databases => "databases",
            Collection::Templates => "templates",
            Collection::Settings => "settings",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sent to subscribers after every successful write.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreEvent {
    pub collection: Collection,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportOutcome {
    Imported { collections: Vec<Collection> },
    Failed(String),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportBundle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pages: Option<Vec<Page>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    databases: Option<Vec<Database>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    templates: Option<Vec<Template>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    settings: Option<Settings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exported_at: Option<DateTime<Utc>>,
}

/// One element of a stored collection array.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Stored<T> {
    Record(T),
    Unparsed(Value),
}

impl<T: Keyed> Stored<T> {
    fn id(&self) -> Option<&str> {
        match self {
            Stored::Record(record) => Some(record.id()),
            Stored::Unparsed(value) => raw_str(value, "id"),
        }
    }
}

fn raw_str<'a>(value: &'a Value, field: &str) -> Option<&'a str> {
    value.get(field).and_then(Value::as_str)
}

/// Records that can be upserted by id.
trait Keyed {
    fn id(&self) -> &str;

    /// Called on the incoming record when it replaces a stored one.
    fn touch(&mut self) {}
}

impl Keyed for Page {
    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Keyed for Database {
    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Keyed for Template {
    fn id(&self) -> &str {
        &self.id
    }
}

type Callback = Arc<dyn Fn(&StoreEvent) + Send + Sync>;

struct Inner {
    backend: Box<dyn KeyValueBackend>,
    prefix: String,
    subscribers: Mutex<Vec<(u64, Callback)>>,
    next_subscriber: AtomicU64,
}

/// Cheap to clone; every clone talks to the same backend and subscriber list.
#[derive(Clone)]
pub struct PersistenceStore {
    inner: Arc<Inner>,
}

impl fmt::Debug for PersistenceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistenceStore")
            .field("prefix", &self.inner.prefix)
            .finish_non_exhaustive()
    }
}

/// Handle returned by [`PersistenceStore::subscribe`]. Dropping it removes the
/// callback.
pub struct Subscription {
    id: u64,
    store: Weak<Inner>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            if let Ok(mut subscribers) = inner.subscribers.lock() {
                subscribers.retain(|(id, _)| *id != self.id);
            }
        }
    }
}

impl PersistenceStore {
    pub fn new(backend: impl KeyValueBackend + 'static, prefix: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend: Box::new(backend),
                prefix: prefix.into(),
                subscribers: Mutex::new(Vec::new()),
                next_subscriber: AtomicU64::new(0),
            }),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new(), DEFAULT_KEY_PREFIX)
    }

    pub fn key(&self, collection: Collection) -> String {
        format!("{}_{}", self.inner.prefix, collection.as_str())
    }

    pub fn subscribe(
        &self,
        callback: impl Fn(&StoreEvent) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.inner.next_subscriber.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut subscribers) = self.inner.subscribers.lock() {
            subscribers.push((id, Arc::new(callback)));
        }
        Subscription {
            id,
            store: Arc::downgrade(&self.inner),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().map(|s| s.len()).unwrap_or(0)
    }

    // --- pages ---

    pub fn load_pages(&self) -> Vec<Page> {
        self.load_records(Collection::Pages, default_pages)
    }

    pub fn load_page(&self, page_id: &str) -> Option<Page> {
        self.load_pages().into_iter().find(|p| p.id == page_id)
    }

    pub fn save_pages(&self, pages: &[Page]) -> Result<()> {
        self.write(Collection::Pages, pages)
    }

    /// Replace the page with the same id (stamping a fresh `updatedAt`) or
    /// append it.
    pub fn save_page(&self, page: &Page) -> Result<()> {
        self.upsert(Collection::Pages, default_pages, page)
    }

    /// Remove a page and its direct children. Grandchildren keep their now
    /// dangling parent and surface as roots in the tree. Returns how many
    /// pages were removed.
    pub fn delete_page(&self, page_id: &str) -> Result<usize> {
        let mut entries = self.load_entries(Collection::Pages, default_pages);
        let before = entries.len();
        entries.retain(|entry| {
            let (id, parent) = match entry {
                Stored::Record(page) => (Some(page.id.as_str()), page.parent_id.as_deref()),
                Stored::Unparsed(value) => (raw_str(value, "id"), raw_str(value, "parentId")),
            };
            id != Some(page_id) && parent != Some(page_id)
        });
        let removed = before - entries.len();
        if removed == 0 {
            debug!(page_id, "delete_page: nothing to remove");
            return Ok(0);
        }
        self.write(Collection::Pages, &entries)?;
        info!(page_id, removed, "deleted page");
        Ok(removed)
    }

    // --- databases ---

    pub fn load_databases(&self) -> Vec<Database> {
        self.load_records(Collection::Databases, Vec::new)
    }

    pub fn save_databases(&self, databases: &[Database]) -> Result<()> {
        self.write(Collection::Databases, databases)
    }

    pub fn save_database(&self, database: &Database) -> Result<()> {
        self.upsert(Collection::Databases, Vec::new, database)
    }

    // --- templates ---

    pub fn load_templates(&self) -> Vec<Template> {
        self.load_records(Collection::Templates, default_templates)
    }

    pub fn save_templates(&self, templates: &[Template]) -> Result<()> {
        self.write(Collection::Templates, templates)
    }

    /// Replace the template with the same id or append it.
    pub fn save_template(&self, template: &Template) -> Result<()> {
        self.upsert(Collection::Templates, default_templates, template)
    }

    // --- settings ---

    pub fn load_settings(&self) -> Settings {
        let key = self.key(Collection::Settings);
        match self.read_raw(&key) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(key = %key, error = %e, "unreadable settings, using defaults");
                Settings::default()
            }),
            None => Settings::default(),
        }
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.write(Collection::Settings, settings)
    }

    // --- backup ---

    pub fn export_data(&self) -> Result<String> {
        let bundle = ExportBundle {
            pages: Some(self.load_pages()),
            databases: Some(self.load_databases()),
            templates: Some(self.load_templates()),
            settings: Some(self.load_settings()),
            exported_at: Some(Utc::now()),
        };
        Ok(serde_json::to_string_pretty(&bundle)?)
    }

    /// Write every collection present in an export bundle. The whole bundle is
    /// parsed before anything is written, so a malformed one changes nothing.
    pub fn import_data(&self, json: &str) -> Result<ImportOutcome> {
        let bundle: ExportBundle = match serde_json::from_str(json) {
            Ok(bundle) => bundle,
            Err(e) => {
                warn!(error = %e, "rejected import");
                return Ok(ImportOutcome::Failed("Invalid JSON format".into()));
            }
        };

        let mut collections = Vec::new();
        if let Some(pages) = bundle.pages {
            self.save_pages(&pages)?;
            collections.push(Collection::Pages);
        }
        if let Some(databases) = bundle.databases {
            self.save_databases(&databases)?;
            collections.push(Collection::Databases);
        }
        if let Some(templates) = bundle.templates {
            self.save_templates(&templates)?;
            collections.push(Collection::Templates);
        }
        if let Some(settings) = bundle.settings {
            self.save_settings(&settings)?;
            collections.push(Collection::Settings);
        }
        info!(count = collections.len(), "imported collections");
        Ok(ImportOutcome::Imported { collections })
    }

    // --- internals ---

    fn read_raw(&self, key: &str) -> Option<String> {
        match self.inner.backend.get(key) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "storage read failed");
                None
            }
        }
    }

    /// Records that match the schema. A value that is not an array, or an
    /// array in which no record is readable, falls back to `fallback`.
    fn load_records<T: DeserializeOwned>(
        &self,
        collection: Collection,
        fallback: impl FnOnce() -> Vec<T>,
    ) -> Vec<T> {
        self.load_entries(collection, fallback)
            .into_iter()
            .filter_map(|entry| match entry {
                Stored::Record(record) => Some(record),
                Stored::Unparsed(_) => None,
            })
            .collect()
    }

    /// Every stored element in order, keeping unreadable ones as raw JSON so
    /// a read-modify-write hands them back to the backend untouched.
    fn load_entries<T: DeserializeOwned>(
        &self,
        collection: Collection,
        fallback: impl FnOnce() -> Vec<T>,
    ) -> Vec<Stored<T>> {
        let seed = |records: Vec<T>| records.into_iter().map(Stored::Record).collect::<Vec<_>>();
        let key = self.key(collection);
        let Some(raw) = self.read_raw(&key) else {
            debug!(key = %key, "no stored value, using defaults");
            return seed(fallback());
        };
        let values: Vec<Value> = match serde_json::from_str(&raw) {
            Ok(values) => values,
            Err(e) => {
                warn!(key = %key, error = %e, "unreadable collection, using defaults");
                return seed(fallback());
            }
        };

        let mut entries: Vec<Stored<T>> = values
            .into_iter()
            .map(|value| match T::deserialize(&value) {
                Ok(record) => Stored::Record(record),
                Err(e) => {
                    warn!(key = %key, error = %e, "skipping unreadable record");
                    Stored::Unparsed(value)
                }
            })
            .collect();

        if !entries.is_empty() && !entries.iter().any(|e| matches!(e, Stored::Record(_))) {
            warn!(key = %key, "no readable records, using defaults");
            let mut seeded = seed(fallback());
            seeded.append(&mut entries);
            return seeded;
        }
        entries
    }

    /// Replace the element with the record's id or append the record.
    fn upsert<T>(
        &self,
        collection: Collection,
        fallback: impl FnOnce() -> Vec<T>,
        record: &T,
    ) -> Result<()>
    where
        T: Keyed + Clone + Serialize + DeserializeOwned,
    {
        let mut entries = self.load_entries(collection, fallback);
        match entries.iter_mut().find(|e| e.id() == Some(record.id())) {
            Some(existing) => {
                let mut fresh = record.clone();
                fresh.touch();
                *existing = Stored::Record(fresh);
            }
            None => entries.push(Stored::Record(record.clone())),
        }
        self.write(collection, &entries)
    }

    fn write<T: Serialize + ?Sized>(&self, collection: Collection, value: &T) -> Result<()> {
        let key = self.key(collection);
        let raw = serde_json::to_string(value)?;
        if let Err(e) = self.inner.backend.set(&key, &raw) {
            error!(key = %key, error = %e, "storage write failed");
            return Err(e);
        }
        debug!(key = %key, bytes = raw.len(), "stored collection");
        self.notify(&StoreEvent { collection, key });
        Ok(())
    }

    fn notify(&self, event: &StoreEvent) {
        let callbacks: Vec<Callback> = match self.inner.subscribers.lock() {
            Ok(subscribers) => subscribers.iter().map(|(_, cb)| Arc::clone(cb)).collect(),
            Err(_) => {
                warn!("subscriber list poisoned, skipping notification");
                return;
            }
        };
        for callback in callbacks {
            callback(event);
        }
    }
}
