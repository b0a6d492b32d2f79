use crate::kernel::services::ports::store::{
    is_protected, DocCategory, DocEntry, DocumentStore, Result, StaticLookup, StoreError,
};
use crate::models::DocPath;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Default)]
struct Inner {
    docs: BTreeMap<DocPath, String>,
    fail_reads: Option<String>,
    fail_writes: Option<String>,
    read_delays: BTreeMap<DocPath, Duration>,
    writes: usize,
}

/// In-memory store for tests and demos, with failure and latency injection.
#[derive(Debug, Default)]
pub struct MemoryDocStore {
    inner: Mutex<Inner>,
}

impl MemoryDocStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_docs<'a>(docs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self> {
        let store = Self::new();
        {
            let mut inner = store.lock();
            for (path, text) in docs {
                inner.docs.insert(DocPath::parse(path)?, text.to_string());
            }
        }
        Ok(store)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Every read fails with `Unavailable(message)` until cleared.
    pub fn fail_reads(&self, message: Option<&str>) {
        self.lock().fail_reads = message.map(str::to_string);
    }

    /// Every write fails with `Unavailable(message)` until cleared.
    pub fn fail_writes(&self, message: Option<&str>) {
        self.lock().fail_writes = message.map(str::to_string);
    }

    /// Reads of `path` sleep first; the blocking thread stands in for a slow backend.
    pub fn delay_reads(&self, path: &DocPath, delay: Duration) {
        self.lock().read_delays.insert(path.clone(), delay);
    }

    pub fn get(&self, path: &DocPath) -> Option<String> {
        self.lock().docs.get(path).cloned()
    }

    pub fn write_count(&self) -> usize {
        self.lock().writes
    }
}

impl DocumentStore for MemoryDocStore {
    fn read(&self, path: &DocPath) -> Result<String> {
        let delay = self.lock().read_delays.get(path).copied();
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        let inner = self.lock();
        if let Some(message) = &inner.fail_reads {
            return Err(StoreError::Unavailable(message.clone()));
        }
        inner
            .docs
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.clone()))
    }

    fn write(&self, path: &DocPath, text: &str) -> Result<()> {
        let mut inner = self.lock();
        if let Some(message) = &inner.fail_writes {
            return Err(StoreError::Unavailable(message.clone()));
        }
        inner.docs.insert(path.clone(), text.to_string());
        inner.writes += 1;
        Ok(())
    }

    fn list(&self) -> Result<Vec<DocEntry>> {
        let inner = self.lock();
        Ok(inner
            .docs
            .iter()
            .map(|(path, text)| DocEntry {
                path: path.clone(),
                name: path.file_name().to_string(),
                category: if path.is_root_file() {
                    DocCategory::Root
                } else {
                    DocCategory::Docs
                },
                size: text.len() as u64,
            })
            .collect())
    }

    fn delete(&self, path: &DocPath) -> Result<()> {
        let mut inner = self.lock();
        if !inner.docs.contains_key(path) {
            return Err(StoreError::NotFound(path.clone()));
        }
        if is_protected(path) {
            return Err(StoreError::Protected(path.clone()));
        }
        inner.docs.remove(path);
        Ok(())
    }
}

impl StaticLookup for MemoryDocStore {
    fn lookup(&self, path: &DocPath) -> Result<String> {
        self.read(path)
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/store/memory.rs"]
mod tests;
