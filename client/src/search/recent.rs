use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info, warn};

use crate::error::StoreError;

/// Backing storage for the recent-search list.
pub trait RecentStore: Send + Sync {
    fn load(&self) -> Result<Vec<String>, StoreError>;
    fn save(&self, terms: &[String]) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

/// JSON array of strings in a file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/rcview/recent_searches.json`
    pub fn default_location() -> Result<Self, StoreError> {
        let base = dirs::data_dir().ok_or(StoreError::NoDataDir)?;
        Ok(Self::new(base.join("rcview").join("recent_searches.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecentStore for JsonFileStore {
    fn load(&self) -> Result<Vec<String>, StoreError> {
        if !self.path.exists() {
            debug!("No recent searches file at {}", self.path.display());
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn save(&self, terms: &[String]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string(terms)?)?;
        debug!("Saved {} recent searches to {}", terms.len(), self.path.display());
        Ok(())
    }
}

/// Process-lifetime store, used in tests and when no data dir exists.
#[derive(Debug, Default)]
pub struct MemoryRecentStore {
    terms: Mutex<Vec<String>>,
}

impl RecentStore for MemoryRecentStore {
    fn load(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.terms.lock().map(|t| t.clone()).unwrap_or_default())
    }

    fn save(&self, terms: &[String]) -> Result<(), StoreError> {
        if let Ok(mut stored) = self.terms.lock() {
            *stored = terms.to_vec();
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Recent searches
// ---------------------------------------------------------------------------

/// Most-recent-first list of searched registration numbers.
///
/// Terms are stored trimmed and upper-cased, so duplicates are detected
/// case-insensitively. The list is independent of the login session.
pub struct RecentSearches {
    store: Box<dyn RecentStore>,
    terms: Vec<String>,
    capacity: usize,
}

impl RecentSearches {
    /// Load from `store`. An unreadable or corrupt store starts empty.
    pub fn load(store: Box<dyn RecentStore>, capacity: usize) -> Self {
        let terms = match store.load() {
            Ok(stored) => {
                let mut terms: Vec<String> = Vec::with_capacity(stored.len().min(capacity));
                for term in stored.iter().map(|t| t.trim().to_uppercase()) {
                    if !term.is_empty() && !terms.contains(&term) {
                        terms.push(term);
                    }
                }
                terms.truncate(capacity);
                terms
            }
            Err(e) => {
                warn!("Ignoring unreadable recent searches: {}", e);
                Vec::new()
            }
        };

        Self {
            store,
            terms,
            capacity,
        }
    }

    pub fn in_memory(capacity: usize) -> Self {
        Self::load(Box::new(MemoryRecentStore::default()), capacity)
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record a search at the front. Blank input is ignored.
    pub fn add(&mut self, term: &str) -> Result<(), StoreError> {
        let normalized = term.trim().to_uppercase();
        if normalized.is_empty() {
            return Ok(());
        }

        self.terms.retain(|t| !t.eq_ignore_ascii_case(&normalized));
        self.terms.insert(0, normalized);
        self.terms.truncate(self.capacity);
        self.store.save(&self.terms)
    }

    /// Returns whether anything was removed.
    pub fn remove(&mut self, term: &str) -> Result<bool, StoreError> {
        let target = term.trim();
        let before = self.terms.len();
        self.terms.retain(|t| !t.eq_ignore_ascii_case(target));
        if self.terms.len() == before {
            return Ok(false);
        }
        self.store.save(&self.terms)?;
        Ok(true)
    }

    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.terms.clear();
        self.store.save(&self.terms)?;
        info!("Cleared recent searches");
        Ok(())
    }
}

impl std::fmt::Debug for RecentSearches {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecentSearches")
            .field("terms", &self.terms)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
