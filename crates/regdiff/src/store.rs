//! Result retention collaborator.
//!
//! The engine itself keeps no state; callers that serve results over a
//! transport hold them behind this interface. Entries pair a comparison
//! with the two uploaded temp files so eviction can clean both up.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use uuid::Uuid;

use crate::types::ComparisonResult;

/// Stored results must outlive at least this long.
pub const MIN_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Lifecycle state of a stored id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Ok,
    Missing,
    Expired,
}

/// A retained comparison plus the temp files backing its viewer.
#[derive(Debug, Clone)]
pub struct StoredComparison {
    pub result: ComparisonResult,
    pub base_path: PathBuf,
    pub compared_path: PathBuf,
}

pub trait ResultStore {
    fn save(&self, stored: StoredComparison) -> Uuid;
    fn get(&self, id: Uuid) -> Option<StoredComparison>;
    fn state(&self, id: Uuid) -> StoreState;
}

struct Entry {
    stored: StoredComparison,
    stored_at: Instant,
}

/// In-memory store with TTL eviction.
pub struct MemoryStore {
    ttl: Duration,
    entries: RwLock<HashMap<Uuid, Entry>>,
}

impl MemoryStore {
    /// Create a store; TTLs shorter than [`MIN_TTL`] are clamped up.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: ttl.max(MIN_TTL),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Drop expired entries and delete their temp files. Returns the
    /// number of evicted entries.
    pub fn evict_expired(&self) -> usize {
        let mut entries = self.entries.write();
        let expired: Vec<Uuid> = entries
            .iter()
            .filter(|(_, entry)| entry.stored_at.elapsed() >= self.ttl)
            .map(|(id, _)| *id)
            .collect();
        for id in &expired {
            if let Some(entry) = entries.remove(id) {
                remove_temp_file(&entry.stored.base_path);
                remove_temp_file(&entry.stored.compared_path);
            }
        }
        if !expired.is_empty() {
            tracing::debug!(count = expired.len(), "store: evicted expired comparisons");
        }
        expired.len()
    }

    #[cfg(test)]
    fn backdate(&self, id: Uuid, age: Duration) {
        if let Some(entry) = self.entries.write().get_mut(&id) {
            entry.stored_at = Instant::now() - age;
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(MIN_TTL)
    }
}

impl ResultStore for MemoryStore {
    fn save(&self, stored: StoredComparison) -> Uuid {
        let id = Uuid::new_v4();
        self.entries.write().insert(
            id,
            Entry {
                stored,
                stored_at: Instant::now(),
            },
        );
        id
    }

    fn get(&self, id: Uuid) -> Option<StoredComparison> {
        let entries = self.entries.read();
        let entry = entries.get(&id)?;
        if entry.stored_at.elapsed() >= self.ttl {
            return None;
        }
        Some(entry.stored.clone())
    }

    fn state(&self, id: Uuid) -> StoreState {
        let entries = self.entries.read();
        match entries.get(&id) {
            None => StoreState::Missing,
            Some(entry) if entry.stored_at.elapsed() >= self.ttl => StoreState::Expired,
            Some(_) => StoreState::Ok,
        }
    }
}

fn remove_temp_file(path: &std::path::Path) {
    if let Err(error) = std::fs::remove_file(path) {
        tracing::warn!(path = %path.display(), %error, "store: temp file cleanup failed");
    }
}
