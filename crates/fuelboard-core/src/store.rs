//! Entry store backed by a JSON file
//!
//! Holds the single source of truth for refueling entries. Entries are kept
//! sorted by date ascending behind a parking_lot::RwLock; readers get cheap
//! `Arc` snapshots that later writes cannot affect.

use crate::error::CoreError;
use crate::event::{DataEvent, EventBus};
use crate::models::{FuelEntry, FuelType, NewEntry};
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// File name used inside a data directory
pub const ENTRIES_FILE: &str = "entries.json";

/// Minimum prefix length accepted by [`EntryStore::find_by_id_or_prefix`]
const MIN_PREFIX_LEN: usize = 4;

/// History view filter
#[derive(Debug, Clone)]
pub struct HistoryFilter {
    /// Exact fuel type match
    pub fuel_type: Option<FuelType>,
    /// Case-insensitive match on station, notes or formatted date
    pub search: Option<String>,
    /// strftime pattern the search text is matched against
    pub date_format: String,
}

impl Default for HistoryFilter {
    fn default() -> Self {
        Self {
            fuel_type: None,
            search: None,
            date_format: "%Y-%m-%d %H:%M".to_string(),
        }
    }
}

impl HistoryFilter {
    fn matches(&self, entry: &FuelEntry) -> bool {
        if let Some(fuel_type) = &self.fuel_type {
            if &entry.fuel_type != fuel_type {
                return false;
            }
        }

        let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) else {
            return true;
        };
        let needle = search.to_lowercase();

        entry.station.to_lowercase().contains(&needle)
            || entry
                .notes
                .as_ref()
                .map(|n| n.to_lowercase().contains(&needle))
                .unwrap_or(false)
            || entry
                .format_date(&self.date_format)
                .to_lowercase()
                .contains(&needle)
    }
}

/// Central entry store
pub struct EntryStore {
    /// Backing JSON file
    path: PathBuf,

    /// Entries sorted by date ascending
    entries: RwLock<Vec<Arc<FuelEntry>>>,

    /// Event bus for notifying subscribers
    event_bus: EventBus,
}

impl EntryStore {
    /// Open the store at `path`
    ///
    /// A missing file yields an empty store; the file is created on first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();
        let entries = load_sorted(&path)?;

        info!(path = %path.display(), entries = entries.len(), "Entry store loaded");

        Ok(Self {
            path,
            entries: RwLock::new(entries),
            event_bus: EventBus::default_capacity(),
        })
    }

    /// Re-read the backing file, replacing the in-memory entries
    ///
    /// Picks up edits made to the file by other processes. Publishes
    /// [`DataEvent::LoadCompleted`]; on error the current entries are kept.
    pub fn reload(&self) -> Result<usize, CoreError> {
        let loaded = load_sorted(&self.path)?;
        let count = loaded.len();
        *self.entries.write() = loaded;

        debug!(path = %self.path.display(), entries = count, "Entry store reloaded");
        self.event_bus.publish(DataEvent::LoadCompleted { entries: count });

        Ok(count)
    }

    /// Open `<data_dir>/entries.json`
    pub fn in_data_dir(data_dir: &Path) -> Result<Self, CoreError> {
        Self::open(data_dir.join(ENTRIES_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the event bus for subscribing to updates
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// All entries, date ascending (the order the analytics engines expect)
    pub fn snapshot(&self) -> Vec<Arc<FuelEntry>> {
        self.entries.read().clone()
    }

    /// Filtered entries, most recent first
    pub fn history(&self, filter: &HistoryFilter) -> Vec<Arc<FuelEntry>> {
        self.entries
            .read()
            .iter()
            .rev()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect()
    }

    /// Distinct fuel type labels in use, sorted
    pub fn fuel_types(&self) -> Vec<String> {
        self.entries
            .read()
            .iter()
            .map(|e| e.fuel_type.label().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Odometer of the most recent entry (default for the next form)
    pub fn last_odometer(&self) -> Option<f64> {
        self.entries.read().last().map(|e| e.odometer)
    }

    pub fn get(&self, id: &str) -> Option<Arc<FuelEntry>> {
        self.entries.read().iter().find(|e| e.id == id).cloned()
    }

    /// Find entry by exact ID or unique prefix (min 4 chars)
    pub fn find_by_id_or_prefix(&self, id: &str) -> Result<Arc<FuelEntry>, CoreError> {
        let entries = self.entries.read();

        if let Some(entry) = entries.iter().find(|e| e.id == id) {
            return Ok(Arc::clone(entry));
        }

        if id.len() < MIN_PREFIX_LEN {
            return Err(CoreError::EntryNotFound { id: id.to_string() });
        }

        let matches: Vec<_> = entries.iter().filter(|e| e.id.starts_with(id)).collect();
        match matches.len() {
            0 => Err(CoreError::EntryNotFound { id: id.to_string() }),
            1 => Ok(Arc::clone(matches[0])),
            count => Err(CoreError::AmbiguousId {
                prefix: id.to_string(),
                count,
            }),
        }
    }

    /// Record a new entry
    ///
    /// Fills in the total amount (liters × unit price when not entered) and the
    /// distance since the most recent existing entry, then persists.
    pub fn add_entry(&self, new: NewEntry) -> Result<Arc<FuelEntry>, CoreError> {
        ensure_finite("liters", new.liters)?;
        ensure_finite("pricePerLiter", new.price_per_liter)?;
        ensure_finite("odometer", new.odometer)?;
        if let Some(total) = new.total_amount {
            ensure_finite("totalAmount", total)?;
        }

        let entry = {
            let mut entries = self.entries.write();
            let previous_odometer = entries.last().map(|e| e.odometer);
            let entry = Arc::new(new.into_entry(previous_odometer));

            let mut updated = entries.clone();
            let idx = updated.partition_point(|e| e.date <= entry.date);
            updated.insert(idx, Arc::clone(&entry));

            self.persist(&updated)?;
            *entries = updated;
            entry
        };

        debug!(id = %entry.id, distance = ?entry.distance, "Entry added");
        self.event_bus.publish(DataEvent::EntryAdded(entry.id.clone()));

        Ok(entry)
    }

    /// Remove an entry by exact ID
    pub fn delete_entry(&self, id: &str) -> Result<Arc<FuelEntry>, CoreError> {
        let removed = {
            let mut entries = self.entries.write();
            let idx = entries
                .iter()
                .position(|e| e.id == id)
                .ok_or_else(|| CoreError::EntryNotFound { id: id.to_string() })?;

            let mut updated = entries.clone();
            let removed = updated.remove(idx);

            self.persist(&updated)?;
            *entries = updated;
            removed
        };

        debug!(id = %removed.id, "Entry deleted");
        self.event_bus.publish(DataEvent::EntryDeleted(removed.id.clone()));

        Ok(removed)
    }

    /// Write entries to disk (temp file + rename)
    fn persist(&self, entries: &[Arc<FuelEntry>]) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| CoreError::FileWrite {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let plain: Vec<&FuelEntry> = entries.iter().map(|e| e.as_ref()).collect();
        let content = serde_json::to_string_pretty(&plain).map_err(|e| CoreError::FileWrite {
            path: self.path.clone(),
            source: std::io::Error::from(e),
        })?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content).map_err(|source| CoreError::FileWrite {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| CoreError::FileWrite {
            path: self.path.clone(),
            source,
        })?;

        Ok(())
    }
}

/// Load entries sorted by date ascending
fn load_sorted(path: &Path) -> Result<Vec<Arc<FuelEntry>>, CoreError> {
    let mut entries = load_entries(path)?;
    entries.sort_by(|a, b| a.date.cmp(&b.date));
    Ok(entries.into_iter().map(Arc::new).collect())
}

fn load_entries(path: &Path) -> Result<Vec<FuelEntry>, CoreError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No entry file yet, starting empty");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(CoreError::FileRead {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(&content).map_err(|source| CoreError::JsonParse {
        path: path.to_path_buf(),
        message: source.to_string(),
        source,
    })
}

fn ensure_finite(field: &str, value: f64) -> Result<(), CoreError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CoreError::InvalidEntry {
            message: format!("{} must be a finite number (got {})", field, value),
        })
    }
}
