//! Shared memory store for concurrent agent nodes.
//!
//! The store is owned by the execution context and passed by reference
//! into each wave's dispatch — never ambient global state. Consistency
//! model is "read committed per wave": reads see only values committed at
//! a wave boundary, so a node never observes a partial write from a
//! same-wave peer. Writes are serialized into a staging buffer; the
//! executor drains it with [`SharedMemory::commit_wave`] after every wave
//! settles.

use std::collections::HashMap;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use tygent_core::error::RuntimeError;
use tygent_core::tygent_mem;
use tygent_core::types::{Value, ValueMap};

/// Configuration for the shared memory store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Maximum number of keys the committed store may hold.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl MemoryConfig {
    /// Default maximum entries.
    pub const DEFAULT_MAX_ENTRIES: usize = 1_024;

    /// Creates a configuration, clamping the capacity to at least 1.
    pub fn new(max_entries: usize) -> Self {
        MemoryConfig {
            max_entries: max_entries.max(1),
        }
    }

    /// Validates that configuration values are usable.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_entries == 0 {
            return Err("memory max_entries must be greater than zero".to_string());
        }
        Ok(())
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        MemoryConfig {
            max_entries: default_max_entries(),
        }
    }
}

fn default_max_entries() -> usize {
    MemoryConfig::DEFAULT_MAX_ENTRIES
}

/// Wave-consistent key/value store shared by concurrent nodes.
pub struct SharedMemory {
    config: MemoryConfig,
    /// Values visible to readers. Concurrent reads, exclusive commit.
    committed: RwLock<HashMap<String, Value>>,
    /// Writes staged during the current wave, in stage order.
    staged: Mutex<Vec<(String, Value)>>,
}

impl SharedMemory {
    /// Creates an empty store with the given configuration.
    pub fn new(config: MemoryConfig) -> Self {
        SharedMemory {
            config,
            committed: RwLock::new(HashMap::new()),
            staged: Mutex::new(Vec::new()),
        }
    }

    /// Reads a committed value.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.committed.read().get(key).cloned()
    }

    /// Copies the entire committed store.
    pub fn snapshot(&self) -> ValueMap {
        self.committed.read().clone()
    }

    /// Number of committed keys.
    pub fn len(&self) -> usize {
        self.committed.read().len()
    }

    /// True when nothing has been committed.
    pub fn is_empty(&self) -> bool {
        self.committed.read().is_empty()
    }

    /// Stages a write. Invisible to readers until the next wave commit.
    pub fn stage(&self, key: impl Into<String>, value: Value) {
        let key = key.into();
        tygent_mem!(trace, key = %key, "Write staged");
        self.staged.lock().push((key, value));
    }

    /// Number of writes staged and not yet committed.
    pub fn staged_len(&self) -> usize {
        self.staged.lock().len()
    }

    /// Applies all staged writes in stage order (last write per key wins)
    /// and makes them visible to readers.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Memory`] if the commit would exceed the
    /// configured capacity; no staged write is dropped silently.
    pub fn commit_wave(&self) -> Result<(), RuntimeError> {
        let staged: Vec<(String, Value)> = std::mem::take(&mut *self.staged.lock());
        if staged.is_empty() {
            return Ok(());
        }

        let mut committed = self.committed.write();
        let new_keys = staged
            .iter()
            .filter(|(key, _)| !committed.contains_key(key))
            .map(|(key, _)| key.as_str())
            .collect::<std::collections::HashSet<_>>()
            .len();

        if committed.len() + new_keys > self.config.max_entries {
            return Err(RuntimeError::Memory {
                message: format!(
                    "Committing {} new key(s) would exceed capacity of {}",
                    new_keys, self.config.max_entries
                ),
            });
        }

        let count = staged.len();
        for (key, value) in staged {
            committed.insert(key, value);
        }

        tygent_mem!(debug, writes = count, keys = committed.len(), "Wave committed");
        Ok(())
    }
}

impl Default for SharedMemory {
    fn default() -> Self {
        SharedMemory::new(MemoryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staged_writes_invisible_until_commit() {
        let memory = SharedMemory::default();
        memory.stage("topic", Value::from("quantum computing"));

        // Same-wave readers see nothing.
        assert_eq!(memory.get("topic"), None);
        assert_eq!(memory.staged_len(), 1);

        memory.commit_wave().expect("commit");
        assert_eq!(memory.get("topic"), Some(Value::from("quantum computing")));
        assert_eq!(memory.staged_len(), 0);
    }

    #[test]
    fn test_same_wave_writers_both_visible_next_wave() {
        let memory = SharedMemory::default();
        memory.stage("researcher", Value::from("findings"));
        memory.stage("critic", Value::from("objections"));
        memory.commit_wave().expect("commit");

        let snapshot = memory.snapshot();
        assert_eq!(snapshot.get("researcher"), Some(&Value::from("findings")));
        assert_eq!(snapshot.get("critic"), Some(&Value::from("objections")));
        assert_eq!(memory.len(), 2);
    }

    #[test]
    fn test_last_write_per_key_wins() {
        let memory = SharedMemory::default();
        memory.stage("answer", Value::from(1));
        memory.stage("answer", Value::from(2));
        memory.commit_wave().expect("commit");

        assert_eq!(memory.get("answer"), Some(Value::from(2)));
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn test_capacity_is_enforced_not_silently_truncated() {
        let memory = SharedMemory::new(MemoryConfig::new(1));
        memory.stage("a", Value::from(1));
        memory.stage("b", Value::from(2));

        let err = memory.commit_wave().unwrap_err();
        assert!(matches!(err, RuntimeError::Memory { .. }));
    }

    #[test]
    fn test_rewriting_existing_key_does_not_count_against_capacity() {
        let memory = SharedMemory::new(MemoryConfig::new(1));
        memory.stage("a", Value::from(1));
        memory.commit_wave().expect("first commit");

        memory.stage("a", Value::from(2));
        memory.commit_wave().expect("rewrite commit");
        assert_eq!(memory.get("a"), Some(Value::from(2)));
    }
}
