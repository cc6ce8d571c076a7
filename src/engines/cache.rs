//! Process-lifetime cache of deep OCR readers, one per language set.

use crate::engine::{DeepOcrReader, ReaderLoader};
use crate::error::PipelineError;
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

type ReaderCell = Arc<OnceCell<Arc<dyn DeepOcrReader>>>;

/// Memoizing reader factory.
///
/// Each distinct language set is loaded at most once, even with concurrent
/// callers: the map lock only hands out the per-key cell and loading happens
/// under that cell's own init guard. A failed load leaves the cell empty so
/// the next call retries. Entries are never evicted.
pub struct ReaderCache {
    loader: Arc<dyn ReaderLoader>,
    readers: Mutex<HashMap<Vec<String>, ReaderCell>>,
}

impl ReaderCache {
    pub fn new(loader: Arc<dyn ReaderLoader>) -> Self {
        Self {
            loader,
            readers: Mutex::new(HashMap::new()),
        }
    }

    pub fn loader_name(&self) -> &'static str {
        self.loader.name()
    }

    /// Get the reader for `languages`, loading it on first use
    pub fn get(&self, languages: &[String]) -> Result<Arc<dyn DeepOcrReader>, PipelineError> {
        let key = language_key(languages);

        let cell = {
            let mut readers = self
                .readers
                .lock()
                .map_err(|_| PipelineError::InitializationError("reader cache poisoned".into()))?;
            readers.entry(key.clone()).or_default().clone()
        };

        let reader = cell.get_or_try_init(|| {
            tracing::info!(
                "Loading {} reader for languages {:?}",
                self.loader.name(),
                key
            );
            self.loader.load(&key)
        })?;

        Ok(Arc::clone(reader))
    }

    /// Number of language sets with a loaded reader
    pub fn len(&self) -> usize {
        self.readers
            .lock()
            .map(|readers| readers.values().filter(|cell| cell.get().is_some()).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Trimmed, lowercased, de-duplicated and sorted language hints
pub fn language_key(languages: &[String]) -> Vec<String> {
    let mut key: Vec<String> = languages
        .iter()
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
        .collect();
    key.sort();
    key.dedup();
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    struct StaticReader(String);

    impl DeepOcrReader for StaticReader {
        fn read_blocks(&self, _path: &Path) -> Result<Vec<String>, PipelineError> {
            Ok(vec![self.0.clone()])
        }
    }

    #[derive(Default)]
    struct CountingLoader {
        loads: AtomicUsize,
        fail_first: bool,
    }

    impl ReaderLoader for CountingLoader {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn load(&self, languages: &[String]) -> Result<Arc<dyn DeepOcrReader>, PipelineError> {
            let n = self.loads.fetch_add(1, Ordering::SeqCst);
            if self.fail_first && n == 0 {
                return Err(PipelineError::InitializationError("download failed".into()));
            }
            thread::sleep(Duration::from_millis(20));
            Ok(Arc::new(StaticReader(languages.join("+"))))
        }
    }

    fn langs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_same_languages_load_once() {
        let loader = Arc::new(CountingLoader::default());
        let cache = ReaderCache::new(loader.clone());

        let first = cache.get(&langs(&["en"])).unwrap();
        let second = cache.get(&langs(&["en"])).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_language_sets_are_normalized() {
        let loader = Arc::new(CountingLoader::default());
        let cache = ReaderCache::new(loader.clone());

        cache.get(&langs(&["en", "fr"])).unwrap();
        cache.get(&langs(&[" FR", "en", "en"])).unwrap();
        cache.get(&langs(&["hi"])).unwrap();

        assert_eq!(loader.loads.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_failed_load_is_retried() {
        let loader = Arc::new(CountingLoader {
            fail_first: true,
            ..Default::default()
        });
        let cache = ReaderCache::new(loader.clone());

        assert!(cache.get(&langs(&["en"])).is_err());
        assert!(cache.is_empty());
        assert!(cache.get(&langs(&["en"])).is_ok());
        assert_eq!(loader.loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_concurrent_callers_share_one_load() {
        let loader = Arc::new(CountingLoader::default());
        let cache = Arc::new(ReaderCache::new(loader.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.get(&langs(&["en"])).map(|_| ()))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_language_key() {
        assert_eq!(language_key(&langs(&["fr", " EN ", "", "fr"])), langs(&["en", "fr"]));
    }
}
