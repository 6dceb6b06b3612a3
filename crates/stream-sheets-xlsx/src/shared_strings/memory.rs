//! Shared strings kept in memory

use crate::error::{XlsxError, XlsxResult};

use super::strategy::CachingStrategy;

/// Keeps every shared string in a `Vec`. Used for small tables.
#[derive(Debug, Default)]
pub struct InMemoryStrategy {
    strings: Vec<String>,
}

impl InMemoryStrategy {
    /// Create an empty strategy
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty strategy with room for `capacity` strings
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            strings: Vec::with_capacity(capacity),
        }
    }
}

impl CachingStrategy for InMemoryStrategy {
    fn name(&self) -> &'static str {
        "in-memory"
    }

    fn add_string(&mut self, index: usize, value: String) -> XlsxResult<()> {
        if index >= self.strings.len() {
            self.strings.resize(index + 1, String::new());
        }
        self.strings[index] = value;
        Ok(())
    }

    fn close_cache(&mut self) -> XlsxResult<()> {
        self.strings.shrink_to_fit();
        Ok(())
    }

    fn get(&self, index: usize) -> XlsxResult<String> {
        self.strings
            .get(index)
            .cloned()
            .ok_or(XlsxError::SharedStringNotFound {
                index: index as i64,
                count: self.strings.len(),
            })
    }

    fn len(&self) -> usize {
        self.strings.len()
    }

    fn clear(&mut self) {
        self.strings = Vec::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_by_index() {
        let mut strategy = InMemoryStrategy::new();
        strategy.add_string(0, "a".into()).unwrap();
        strategy.add_string(1, "b".into()).unwrap();
        strategy.close_cache().unwrap();

        assert_eq!(strategy.get(1).unwrap(), "b");
        assert!(matches!(
            strategy.get(2),
            Err(XlsxError::SharedStringNotFound { index: 2, count: 2 })
        ));

        strategy.clear();
        strategy.clear();
        assert!(strategy.is_empty());
    }
}
