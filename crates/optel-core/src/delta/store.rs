//! Counter state persistence backends.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::warn;

use optel_common::{Error, Result, SCHEMA_VERSION};

use super::{CounterKey, CounterState};

/// Persistence for last-seen counter values across collection cycles.
pub trait StateStore {
    fn get(&mut self, key: &CounterKey) -> Result<Option<CounterState>>;
    fn put(&mut self, key: &CounterKey, state: CounterState) -> Result<()>;
}

/// In-memory store for tests and single-process callers.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    states: BTreeMap<CounterKey, CounterState>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn get(&mut self, key: &CounterKey) -> Result<Option<CounterState>> {
        Ok(self.states.get(key).cloned())
    }

    fn put(&mut self, key: &CounterKey, state: CounterState) -> Result<()> {
        self.states.insert(key.clone(), state);
        Ok(())
    }
}

/// Per-device JSON state file: `{interface}|{counter}` keys mapping to
/// the last observed value and timestamp.
#[derive(Debug, Serialize, Deserialize)]
struct DeviceStateFile {
    #[serde(default = "current_schema_version")]
    schema_version: String,
    counters: BTreeMap<String, CounterState>,
}

fn current_schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

impl Default for DeviceStateFile {
    fn default() -> Self {
        DeviceStateFile {
            schema_version: current_schema_version(),
            counters: BTreeMap::new(),
        }
    }
}

/// Filesystem-backed store, one JSON file per device.
///
/// Writes go to a temp file first and are renamed into place, so a
/// crash mid-write leaves the previous state intact rather than a
/// truncated file. A corrupt or unreadable file degrades to empty
/// state and is replaced by the next write, so one bad file costs one
/// cold-start cycle, not the key forever.
#[derive(Debug)]
pub struct JsonStateStore {
    state_dir: PathBuf,
    // Loaded device files; flushed on every put.
    cache: BTreeMap<String, DeviceStateFile>,
}

impl JsonStateStore {
    pub fn new(state_dir: impl Into<PathBuf>) -> Result<Self> {
        let state_dir = state_dir.into();
        fs::create_dir_all(&state_dir)?;
        Ok(JsonStateStore {
            state_dir,
            cache: BTreeMap::new(),
        })
    }

    fn device_path(&self, device: &str) -> PathBuf {
        self.state_dir.join(format!("{}.json", sanitize(device)))
    }

    fn load_device(&mut self, device: &str) -> &mut DeviceStateFile {
        let path = self.device_path(device);
        match self.cache.entry(device.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let file = match fs::read_to_string(&path) {
                    Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                        warn!(target: "optel::delta", path = %path.display(), error = %e,
                              "corrupt state file, starting fresh");
                        DeviceStateFile::default()
                    }),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        DeviceStateFile::default()
                    }
                    Err(e) => {
                        warn!(target: "optel::delta", path = %path.display(), error = %e,
                              "unreadable state file, starting fresh");
                        DeviceStateFile::default()
                    }
                };
                entry.insert(file)
            }
        }
    }

    fn flush_device(&self, device: &str) -> Result<()> {
        let Some(file) = self.cache.get(device) else {
            return Ok(());
        };
        let path = self.device_path(device);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(file)?;
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

impl StateStore for JsonStateStore {
    fn get(&mut self, key: &CounterKey) -> Result<Option<CounterState>> {
        let file = self.load_device(&key.device);
        Ok(file.counters.get(&key.counter_id()).cloned())
    }

    fn put(&mut self, key: &CounterKey, state: CounterState) -> Result<()> {
        let counter_id = key.counter_id();
        self.load_device(&key.device)
            .counters
            .insert(counter_id, state);
        self.flush_device(&key.device)
    }
}

/// Mutex-guarded store for callers that may schedule the same device
/// from more than one thread.
#[derive(Debug, Clone)]
pub struct SharedStateStore<S> {
    inner: Arc<Mutex<S>>,
}

impl<S: StateStore> SharedStateStore<S> {
    pub fn new(store: S) -> Self {
        SharedStateStore {
            inner: Arc::new(Mutex::new(store)),
        }
    }
}

impl<S: StateStore> StateStore for SharedStateStore<S> {
    fn get(&mut self, key: &CounterKey) -> Result<Option<CounterState>> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| Error::Persistence("state store mutex poisoned".to_string()))?;
        guard.get(key)
    }

    fn put(&mut self, key: &CounterKey, state: CounterState) -> Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| Error::Persistence("state store mutex poisoned".to_string()))?;
        guard.put(key, state)
    }
}

/// Interface and device names carry `/` and `:`, unusable in filenames.
fn sanitize(name: &str) -> String {
    name.replace(['/', ':'], "_")
}

impl CounterKey {
    /// Key within a device state file.
    pub(super) fn counter_id(&self) -> String {
        format!("{}|{}", self.interface, self.counter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(counter: &str) -> CounterKey {
        CounterKey {
            device: "r1.example".into(),
            interface: "et-0/0/6".into(),
            counter: counter.into(),
        }
    }

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemoryStateStore::new();
        assert_eq!(store.get(&key("fec_ccw")).unwrap(), None);
        let state = CounterState {
            last_value: 100.0,
            last_timestamp_us: 1_700_000_000_000_000,
        };
        store.put(&key("fec_ccw"), state.clone()).unwrap();
        assert_eq!(store.get(&key("fec_ccw")).unwrap(), Some(state));
    }

    #[test]
    fn json_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let state = CounterState {
            last_value: 42.0,
            last_timestamp_us: 1,
        };
        {
            let mut store = JsonStateStore::new(dir.path()).unwrap();
            store.put(&key("fec_ccw"), state.clone()).unwrap();
        }
        assert!(dir.path().join("r1.example.json").exists());

        let mut store = JsonStateStore::new(dir.path()).unwrap();
        assert_eq!(store.get(&key("fec_ccw")).unwrap(), Some(state));
        assert_eq!(store.get(&key("fec_nccw")).unwrap(), None);
    }

    #[test]
    fn corrupt_state_file_is_replaced_on_write() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("r1.example.json"), "not json").unwrap();

        let mut store = JsonStateStore::new(dir.path()).unwrap();
        // Unreadable prior state degrades to no prior state.
        assert_eq!(store.get(&key("fec_ccw")).unwrap(), None);
        let state = CounterState {
            last_value: 100.0,
            last_timestamp_us: 1,
        };
        store.put(&key("fec_ccw"), state.clone()).unwrap();

        // A fresh store sees the rewritten file, not the corrupt one.
        let mut store = JsonStateStore::new(dir.path()).unwrap();
        assert_eq!(store.get(&key("fec_ccw")).unwrap(), Some(state));
    }

    #[test]
    fn state_files_carry_schema_version() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonStateStore::new(dir.path()).unwrap();
        store
            .put(
                &key("fec_ccw"),
                CounterState {
                    last_value: 1.0,
                    last_timestamp_us: 1,
                },
            )
            .unwrap();
        let text = fs::read_to_string(dir.path().join("r1.example.json")).unwrap();
        assert!(text.contains("schema_version"));
        assert!(text.contains(SCHEMA_VERSION));
    }

    #[test]
    fn no_leftover_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonStateStore::new(dir.path()).unwrap();
        store
            .put(
                &key("fec_ccw"),
                CounterState {
                    last_value: 1.0,
                    last_timestamp_us: 1,
                },
            )
            .unwrap();
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
