//! Storage strategies for the shared strings table

use std::path::Path;

use stream_sheets_core::ReaderOptions;

use super::file::FileBasedStrategy;
use super::memory::InMemoryStrategy;
use crate::error::XlsxResult;

/// Storage for shared strings, filled once in index order and then read
/// randomly by the row iterators.
pub trait CachingStrategy: Send + Sync {
    /// Short name of the strategy, for logging
    fn name(&self) -> &'static str;

    /// Store the string found at `index` in the shared strings table
    fn add_string(&mut self, index: usize, value: String) -> XlsxResult<()>;

    /// Called once every string was added. Strings can be read afterwards.
    fn close_cache(&mut self) -> XlsxResult<()>;

    /// Get the string at `index`.
    ///
    /// Fails with [`XlsxError::SharedStringNotFound`](crate::XlsxError::SharedStringNotFound)
    /// when no string was stored at that index.
    fn get(&self, index: usize) -> XlsxResult<String>;

    /// Number of strings stored
    fn len(&self) -> usize;

    /// Check if no string is stored
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Release memory and temporary files. Safe to call more than once.
    fn clear(&mut self);
}

/// Picks the storage strategy that fits the size of the shared strings table
#[derive(Debug, Clone, Copy)]
pub struct CachingStrategyFactory {
    in_memory_threshold: usize,
    strings_per_page: usize,
}

impl CachingStrategyFactory {
    /// Create a factory using the thresholds of the given options
    pub fn new(options: &ReaderOptions) -> Self {
        Self {
            in_memory_threshold: options.shared_strings_in_memory_threshold,
            strings_per_page: options.shared_strings_per_page.max(1),
        }
    }

    /// Whether a table with `count` unique strings should be kept in memory.
    ///
    /// An unknown count may hide an arbitrarily large table, so it never is.
    pub fn fits_in_memory(&self, count: Option<usize>) -> bool {
        matches!(count, Some(count) if count < self.in_memory_threshold)
    }

    /// Create the best strategy for a table declaring `count` unique strings.
    ///
    /// File-backed strategies keep their pages in a new directory under `temp_dir`.
    pub fn create_best_caching_strategy(
        &self,
        count: Option<usize>,
        temp_dir: &Path,
    ) -> XlsxResult<Box<dyn CachingStrategy>> {
        let strategy: Box<dyn CachingStrategy> = if self.fits_in_memory(count) {
            Box::new(InMemoryStrategy::with_capacity(count.unwrap_or_default()))
        } else {
            Box::new(FileBasedStrategy::new(temp_dir, self.strings_per_page)?)
        };
        log::debug!(
            "Caching {} shared strings with the {} strategy",
            count.map_or_else(|| "an unknown number of".to_string(), |c| c.to_string()),
            strategy.name()
        );
        Ok(strategy)
    }
}

impl Default for CachingStrategyFactory {
    fn default() -> Self {
        Self::new(&ReaderOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory(threshold: usize) -> CachingStrategyFactory {
        CachingStrategyFactory::new(&ReaderOptions::default().with_in_memory_threshold(threshold))
    }

    #[test]
    fn test_strategy_selection() {
        let dir = tempfile::tempdir().unwrap();
        let factory = factory(10);

        let small = factory.create_best_caching_strategy(Some(9), dir.path()).unwrap();
        assert_eq!(small.name(), "in-memory");

        let large = factory.create_best_caching_strategy(Some(10), dir.path()).unwrap();
        assert_eq!(large.name(), "file-based");

        let unknown = factory.create_best_caching_strategy(None, dir.path()).unwrap();
        assert_eq!(unknown.name(), "file-based");
    }

    #[test]
    fn test_default_threshold() {
        let factory = CachingStrategyFactory::default();
        assert!(factory.fits_in_memory(Some(99_999)));
        assert!(!factory.fits_in_memory(Some(100_000)));
        assert!(!factory.fits_in_memory(None));
    }
}
