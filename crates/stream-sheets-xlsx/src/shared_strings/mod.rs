//! Shared strings table (`xl/sharedStrings.xml`).
//!
//! Cells of type `s` hold an index into this table. It is read once, before
//! the first sheet, into a [`CachingStrategy`] chosen from the declared size
//! of the table.

mod file;
mod memory;
mod strategy;

pub use file::FileBasedStrategy;
pub use memory::InMemoryStrategy;
pub use strategy::{CachingStrategy, CachingStrategyFactory};

use std::io::{Read, Seek};

use stream_sheets_core::xml::XmlResult;
use stream_sheets_core::{Archive, ReaderOptions, XmlCursor, XmlElement};

use crate::error::{XlsxError, XlsxResult};

/// Default location of the shared strings table
pub const DEFAULT_SHARED_STRINGS_PATH: &str = "xl/sharedStrings.xml";

const XML_NODE_SST: &str = "sst";
const XML_NODE_SI: &str = "si";
const XML_NODE_IS: &str = "is";
const XML_NODE_R: &str = "r";
const XML_NODE_T: &str = "t";
const XML_ATTRIBUTE_COUNT: &str = "count";
const XML_ATTRIBUTE_UNIQUE_COUNT: &str = "uniqueCount";
const XML_ATTRIBUTE_XML_SPACE: &str = "xml:space";
const XML_ATTRIBUTE_VALUE_PRESERVE: &str = "preserve";

/// Characters trimmed from text runs that do not preserve whitespace
const TRIMMED_CHARS: &[char] = &[' ', '\t', '\n', '\r', '\0', '\x0B'];

/// Owns the shared strings of one workbook
pub struct SharedStringsManager {
    strategy: Box<dyn CachingStrategy>,
}

impl SharedStringsManager {
    /// A manager without any string, for workbooks without a shared strings table
    pub fn empty() -> Self {
        Self {
            strategy: Box::new(InMemoryStrategy::new()),
        }
    }

    /// A manager over an already filled strategy
    pub fn with_strategy(strategy: Box<dyn CachingStrategy>) -> Self {
        Self { strategy }
    }

    /// Read every shared string of `entry` into the best caching strategy.
    ///
    /// A workbook without the entry has no shared strings. When reading
    /// fails, whatever was cached so far is cleared before returning.
    pub fn extract<R: Read + Seek>(
        archive: &mut Archive<R>,
        entry: &str,
        options: &ReaderOptions,
    ) -> XlsxResult<Self> {
        let mut cursor = match archive.cursor(entry)? {
            Some(cursor) => cursor,
            None => return Ok(Self::empty()),
        };

        let declared = read_unique_count(&mut cursor)
            .map_err(|e| XlsxError::invalid_xml(shared_strings_name(entry), e))?;

        let factory = CachingStrategyFactory::new(options);
        let mut strategy =
            factory.create_best_caching_strategy(declared, &options.temp_dir_or_default())?;

        let filled = fill(&mut cursor, strategy.as_mut(), shared_strings_name(entry))
            .and_then(|()| strategy.close_cache());
        cursor.close();
        if let Err(e) = filled {
            strategy.clear();
            return Err(e);
        }

        if let Some(declared) = declared {
            if declared != strategy.len() {
                log::warn!(
                    "{} declares {} unique strings but holds {}",
                    entry,
                    declared,
                    strategy.len()
                );
            }
        }
        log::debug!("Read {} shared strings from {}", strategy.len(), entry);
        Ok(Self { strategy })
    }

    /// Get the shared string at `index`
    pub fn get(&self, index: usize) -> XlsxResult<String> {
        self.strategy.get(index)
    }

    /// Number of shared strings
    pub fn len(&self) -> usize {
        self.strategy.len()
    }

    /// Check if the table holds no string
    pub fn is_empty(&self) -> bool {
        self.strategy.is_empty()
    }

    /// Name of the caching strategy in use
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Release the cache and its temporary files. Safe to call more than once.
    pub fn dispose(&mut self) {
        self.strategy.clear();
    }
}

impl Drop for SharedStringsManager {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for SharedStringsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedStringsManager")
            .field("strategy", &self.strategy.name())
            .field("len", &self.strategy.len())
            .finish()
    }
}

/// File name used in error messages (`sharedStrings.xml`)
fn shared_strings_name(entry: &str) -> &str {
    entry.rsplit('/').next().unwrap_or(entry)
}

/// Read the declared number of unique strings, falling back to `count`
/// since some producers only write that one
fn read_unique_count(cursor: &mut XmlCursor<'_>) -> XmlResult<Option<usize>> {
    if !cursor.advance_until(XML_NODE_SST)? {
        return Ok(None);
    }
    let count = cursor
        .attribute(XML_ATTRIBUTE_UNIQUE_COUNT)
        .or_else(|| cursor.attribute(XML_ATTRIBUTE_COUNT))
        .and_then(|c| c.trim().parse().ok());
    Ok(count)
}

fn fill(
    cursor: &mut XmlCursor<'_>,
    strategy: &mut dyn CachingStrategy,
    name: &str,
) -> XlsxResult<()> {
    let invalid = |e| XlsxError::invalid_xml(name, e);
    let mut index = 0;
    while cursor.advance_until(XML_NODE_SI).map_err(invalid)? {
        let item = cursor.materialize_subtree().map_err(invalid)?;
        strategy.add_string(index, shared_string_value(&item))?;
        index += 1;
    }
    Ok(())
}

/// Concatenate the text runs of one `<si>` item, or of the `<is>` of an
/// inline string cell.
///
/// Only `<t>` directly under the item or a rich text run `<r>` count; phonetic
/// hints (`<rPh>`) are skipped.
pub fn shared_string_value(item: &XmlElement) -> String {
    let mut value = String::new();
    for (parent, text) in item.descendants_with_parent(XML_NODE_T) {
        if !matches!(parent.local_name(), XML_NODE_SI | XML_NODE_IS | XML_NODE_R) {
            continue;
        }
        let content = text.text_content();
        if text.attribute(XML_ATTRIBUTE_XML_SPACE) == Some(XML_ATTRIBUTE_VALUE_PRESERVE) {
            value.push_str(&content);
        } else {
            value.push_str(content.trim_matches(TRIMMED_CHARS));
        }
    }
    value
}
