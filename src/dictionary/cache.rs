use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::dictionary::aux_codes::SplitAuxEntry;
use crate::dictionary::chaifen::ChaifenDictionary;
use crate::error::LoadError;
use crate::scheme::Scheme;

/// Downloaded resources, one file per key under the data dir.
#[derive(Clone, Debug)]
pub struct DiskCache {
    base_dir: PathBuf,
}

impl DiskCache {
    pub fn new(subdir: &str) -> Option<Self> {
        let base = dirs::data_dir()?.join("shouyou").join(subdir);
        Self::with_base_dir(base)
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Option<Self> {
        fs::create_dir_all(&base_dir).ok()?;
        Some(Self { base_dir })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let path = self.base_dir.join(Self::sanitize_key(key));
        fs::read_to_string(path).ok()
    }

    pub fn put(&self, key: &str, content: &str) -> bool {
        let path = self.base_dir.join(Self::sanitize_key(key));
        fs::write(path, content).is_ok()
    }

    fn sanitize_key(key: &str) -> String {
        key.chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}

#[cfg(feature = "network")]
pub fn fetch_url(url: &str) -> Result<String, LoadError> {
    let download_error = |reason: String| LoadError::Download {
        url: url.to_string(),
        reason,
    };
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .map_err(|e| download_error(e.to_string()))?;
    let response = client
        .get(url)
        .send()
        .map_err(|e| download_error(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(download_error(format!("HTTP {}", status.as_u16())));
    }
    response.text().map_err(|e| download_error(e.to_string()))
}

#[cfg(not(feature = "network"))]
pub fn fetch_url(url: &str) -> Result<String, LoadError> {
    Err(LoadError::Download {
        url: url.to_string(),
        reason: "built without network support".to_string(),
    })
}

/// Parsed dictionaries shared by every loader in the process. Entries live
/// until `clear` is called.
#[derive(Debug, Default)]
pub struct DictionaryCache {
    chaifen: Mutex<HashMap<Scheme, Arc<ChaifenDictionary>>>,
    aux_entries: Mutex<HashMap<Scheme, Arc<Vec<SplitAuxEntry>>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl DictionaryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chaifen_or_load(
        &self,
        scheme: Scheme,
        load: impl FnOnce() -> Result<ChaifenDictionary, LoadError>,
    ) -> Result<Arc<ChaifenDictionary>, LoadError> {
        if let Some(hit) = lock(&self.chaifen).get(&scheme) {
            return Ok(Arc::clone(hit));
        }
        // Parse outside the lock; a concurrent loader may race us, last one wins.
        let dictionary = Arc::new(load()?);
        lock(&self.chaifen).insert(scheme, Arc::clone(&dictionary));
        Ok(dictionary)
    }

    pub fn aux_or_load(
        &self,
        scheme: Scheme,
        load: impl FnOnce() -> Result<Vec<SplitAuxEntry>, LoadError>,
    ) -> Result<Arc<Vec<SplitAuxEntry>>, LoadError> {
        if let Some(hit) = lock(&self.aux_entries).get(&scheme) {
            return Ok(Arc::clone(hit));
        }
        let entries = Arc::new(load()?);
        lock(&self.aux_entries).insert(scheme, Arc::clone(&entries));
        Ok(entries)
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.chaifen).is_empty() && lock(&self.aux_entries).is_empty()
    }

    pub fn clear(&self) {
        lock(&self.chaifen).clear();
        lock(&self.aux_entries).clear();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn test_disk_cache_sanitizes_keys() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::with_base_dir(dir.path().to_path_buf()).unwrap();
        assert!(cache.put("https://host/a b.txt", "hello"));
        assert_eq!(cache.get("https://host/a b.txt").as_deref(), Some("hello"));
        assert!(dir.path().join("https___host_a_b.txt").exists());
        assert!(cache.get("missing").is_none());
    }

    #[test]
    fn test_dictionary_cache_loads_once_until_cleared() {
        let cache = DictionaryCache::new();
        let calls = Cell::new(0);
        let load = || {
            calls.set(calls.get() + 1);
            Ok::<_, LoadError>(ChaifenDictionary::new())
        };

        cache.chaifen_or_load(Scheme::Basic, load).unwrap();
        cache.chaifen_or_load(Scheme::Basic, load).unwrap();
        assert_eq!(calls.get(), 1);
        assert!(!cache.is_empty());

        cache.clear();
        assert!(cache.is_empty());
        cache.chaifen_or_load(Scheme::Basic, load).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_dictionary_cache_does_not_store_failures() {
        let cache = DictionaryCache::new();
        let result = cache.aux_or_load(Scheme::Plus, || {
            Err(LoadError::Missing {
                name: "aux".to_string(),
            })
        });
        assert!(result.is_err());
        assert!(cache.is_empty());
    }
}
