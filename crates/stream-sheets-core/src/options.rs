//! Reader options

use std::path::PathBuf;

/// Default number of unique shared strings below which they are kept in memory
pub const DEFAULT_IN_MEMORY_THRESHOLD: usize = 100_000;

/// Default number of shared strings stored in each temporary page file
pub const DEFAULT_STRINGS_PER_PAGE: usize = 10_000;

/// Options for reading workbooks
#[derive(Debug, Clone)]
pub struct ReaderOptions {
    /// Return date/time cells as the text the file displays instead of typed values
    pub format_dates: bool,
    /// Yield rows that contain no value (default: skipped)
    pub preserve_empty_rows: bool,
    /// Directory for temporary files (default: system temp directory)
    pub temp_dir: Option<PathBuf>,
    /// Declared unique shared-string count below which strings stay in memory
    pub shared_strings_in_memory_threshold: usize,
    /// Number of shared strings per temporary page file
    pub shared_strings_per_page: usize,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            format_dates: false,
            preserve_empty_rows: false,
            temp_dir: None,
            shared_strings_in_memory_threshold: DEFAULT_IN_MEMORY_THRESHOLD,
            shared_strings_per_page: DEFAULT_STRINGS_PER_PAGE,
        }
    }
}

impl ReaderOptions {
    /// Create options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether date/time cells are returned as displayed text
    pub fn with_format_dates(mut self, format_dates: bool) -> Self {
        self.format_dates = format_dates;
        self
    }

    /// Set whether empty rows are yielded
    pub fn with_preserve_empty_rows(mut self, preserve: bool) -> Self {
        self.preserve_empty_rows = preserve;
        self
    }

    /// Set the directory for temporary files
    pub fn with_temp_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Set the in-memory shared strings threshold
    pub fn with_in_memory_threshold(mut self, threshold: usize) -> Self {
        self.shared_strings_in_memory_threshold = threshold;
        self
    }

    /// Set the number of shared strings per temporary page file (at least 1)
    pub fn with_strings_per_page(mut self, per_page: usize) -> Self {
        self.shared_strings_per_page = per_page.max(1);
        self
    }

    /// Directory where temporary files are created
    pub fn temp_dir_or_default(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}
