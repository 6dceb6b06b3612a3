//! Pull-style access to the XML entries of a zip container.
//!
//! [`Archive`] owns the container and hands out one [`XmlCursor`] per entry.
//! A cursor advances node by node and never holds more than the current start
//! tag, except when a bounded subtree is explicitly materialized.

mod node;

pub use node::{name_matches, XmlElement, XmlNode};

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{Error, Result, XmlProcessingError};

/// Result type for cursor operations
pub type XmlResult<T> = std::result::Result<T, XmlProcessingError>;

/// A zip container holding XML entries
pub struct Archive<R = BufReader<File>> {
    zip: zip::ZipArchive<R>,
    path: Option<PathBuf>,
}

impl Archive<BufReader<File>> {
    /// Open a container from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut archive = Self::from_reader(BufReader::new(file))?;
        archive.path = Some(path.to_path_buf());
        Ok(archive)
    }
}

impl<R: Read + Seek> Archive<R> {
    /// Open a container from any seekable reader
    pub fn from_reader(reader: R) -> Result<Self> {
        let zip = zip::ZipArchive::new(reader)?;
        Ok(Self { zip, path: None })
    }

    /// Path the container was opened from, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Names of all entries in the container
    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.zip.file_names()
    }

    /// Check if an entry exists (names compare case-insensitively)
    pub fn has_entry(&self, name: &str) -> bool {
        self.resolve_name(name).is_some()
    }

    fn resolve_name(&self, name: &str) -> Option<String> {
        self.zip
            .file_names()
            .find(|n| n.eq_ignore_ascii_case(name))
            .map(str::to_owned)
    }

    /// Open a cursor positioned before the first node of an entry.
    ///
    /// Returns `Ok(None)` when the entry does not exist.
    pub fn cursor(&mut self, entry: &str) -> Result<Option<XmlCursor<'_>>> {
        let actual = match self.resolve_name(entry) {
            Some(name) => name,
            None => return Ok(None),
        };
        match self.zip.by_name(&actual) {
            Ok(file) => {
                let source: Box<dyn Read + '_> = Box::new(file);
                Ok(Some(XmlCursor::new(entry, source)))
            }
            Err(zip::result::ZipError::FileNotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Open a cursor on an entry that must exist
    pub fn required_cursor(&mut self, entry: &str) -> Result<XmlCursor<'_>> {
        self.cursor(entry)?
            .ok_or_else(|| Error::MissingEntry(entry.to_string()))
    }
}

/// Forward-only cursor over one XML entry
pub struct XmlCursor<'a> {
    entry: String,
    reader: Option<Reader<BufReader<Box<dyn Read + 'a>>>>,
    buf: Vec<u8>,
    current: Option<BytesStart<'static>>,
    current_name: String,
    consumed: bool,
}

impl<'a> XmlCursor<'a> {
    /// Wrap any reader producing XML
    pub fn new(entry: &str, source: Box<dyn Read + 'a>) -> Self {
        let mut reader = Reader::from_reader(BufReader::new(source));
        reader.trim_text(false).expand_empty_elements(true);

        Self {
            entry: entry.to_string(),
            reader: Some(reader),
            buf: Vec::with_capacity(1024),
            current: None,
            current_name: String::new(),
            consumed: false,
        }
    }

    /// Name of the entry this cursor reads
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Advance until the start of an element named `name`.
    ///
    /// Returns `false` when the end of the entry is reached without a match.
    pub fn advance_until(&mut self, name: &str) -> XmlResult<bool> {
        Ok(self.advance(&[name], None)?.is_some())
    }

    /// Advance until the start of an element matching any of `names`.
    ///
    /// Returns the position in `names` of the matched name.
    pub fn advance_until_any(&mut self, names: &[&str]) -> XmlResult<Option<usize>> {
        self.advance(names, None)
    }

    /// Advance until the start of an element matching any of `names`, without
    /// leaving the element `parent` the cursor is currently inside.
    ///
    /// Returns `false` once the closing tag of `parent` has been consumed.
    pub fn advance_within(&mut self, names: &[&str], parent: &str) -> XmlResult<bool> {
        Ok(self.advance(names, Some(parent))?.is_some())
    }

    fn advance(&mut self, names: &[&str], parent: Option<&str>) -> XmlResult<Option<usize>> {
        let reader = match self.reader.as_mut() {
            Some(reader) => reader,
            None => return Ok(None),
        };
        self.current = None;
        self.consumed = false;

        loop {
            self.buf.clear();
            match reader.read_event_into(&mut self.buf)? {
                Event::Start(e) => {
                    let qname = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    if let Some(pos) = names.iter().position(|n| name_matches(&qname, n)) {
                        self.current = Some(e.into_owned());
                        self.current_name = qname;
                        return Ok(Some(pos));
                    }
                }
                Event::End(e) => {
                    if let Some(parent) = parent {
                        let name = e.name();
                        let qname = String::from_utf8_lossy(name.as_ref());
                        if name_matches(&qname, parent) {
                            return Ok(None);
                        }
                    }
                }
                Event::Eof => return Ok(None),
                _ => {}
            }
        }
    }

    /// Qualified name of the element the cursor is positioned on
    pub fn current_node_name(&self) -> &str {
        &self.current_name
    }

    /// Check if the cursor is positioned on an element named `name`
    pub fn is_positioned_on(&self, name: &str) -> bool {
        self.current.is_some() && name_matches(&self.current_name, name)
    }

    /// Get an (entity-decoded) attribute of the current element
    pub fn attribute(&self, name: &str) -> Option<String> {
        let start = self.current.as_ref()?;
        start
            .attributes()
            .flatten()
            .find(|attr| attr.key.as_ref() == name.as_bytes())
            .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
    }

    /// Expand the current element and its descendants into memory.
    ///
    /// Consumes the element's closing tag; the cursor continues after it.
    pub fn materialize_subtree(&mut self) -> XmlResult<XmlElement> {
        let start = self.take_current()?;
        let reader = match self.reader.as_mut() {
            Some(reader) => reader,
            None => return Err(XmlProcessingError::UnexpectedEof(self.current_name.clone())),
        };

        let mut stack = vec![element_from_start(&start)?];
        loop {
            self.buf.clear();
            match reader.read_event_into(&mut self.buf)? {
                Event::Start(e) => stack.push(element_from_start(&e)?),
                Event::End(_) => {
                    let done = stack.pop().unwrap_or_default();
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XmlNode::Element(done)),
                        None => return Ok(done),
                    }
                }
                Event::Text(t) => {
                    let text = t.unescape()?;
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(XmlNode::Text(text.into_owned()));
                    }
                }
                Event::CData(c) => {
                    let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(XmlNode::Text(text));
                    }
                }
                Event::Eof => {
                    return Err(XmlProcessingError::UnexpectedEof(self.current_name.clone()))
                }
                _ => {}
            }
        }
    }

    /// Skip the current element and its descendants
    pub fn skip_subtree(&mut self) -> XmlResult<()> {
        self.take_current()?;
        let reader = match self.reader.as_mut() {
            Some(reader) => reader,
            None => return Ok(()),
        };

        let mut depth = 1usize;
        while depth > 0 {
            self.buf.clear();
            match reader.read_event_into(&mut self.buf)? {
                Event::Start(_) => depth += 1,
                Event::End(_) => depth -= 1,
                Event::Eof => {
                    return Err(XmlProcessingError::UnexpectedEof(self.current_name.clone()))
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn take_current(&mut self) -> XmlResult<BytesStart<'static>> {
        if self.consumed {
            return Err(XmlProcessingError::NotPositioned);
        }
        let start = self
            .current
            .clone()
            .ok_or(XmlProcessingError::NotPositioned)?;
        self.consumed = true;
        Ok(start)
    }

    /// Release the underlying entry. Safe to call more than once.
    pub fn close(&mut self) {
        if self.reader.take().is_some() {
            log::trace!("Closed XML cursor on {}", self.entry);
        }
        self.current = None;
    }

    /// Check if the cursor was closed
    pub fn is_closed(&self) -> bool {
        self.reader.is_none()
    }
}

fn element_from_start(start: &BytesStart<'_>) -> XmlResult<XmlElement> {
    let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()));
    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cursor(xml: &'static str) -> XmlCursor<'static> {
        XmlCursor::new("test.xml", Box::new(xml.as_bytes()))
    }

    #[test]
    fn test_advance_until_reports_exhaustion() {
        let mut c = cursor(r#"<root><a x="1"/><b/><a x="2"/></root>"#);
        assert!(c.advance_until("a").unwrap());
        assert_eq!(c.attribute("x").as_deref(), Some("1"));
        assert!(c.advance_until("a").unwrap());
        assert_eq!(c.attribute("x").as_deref(), Some("2"));
        assert!(!c.advance_until("a").unwrap());
        assert!(!c.advance_until("a").unwrap());
    }

    #[test]
    fn test_advance_within_stops_at_parent_end() {
        let mut c = cursor("<root><sheet><row/><row/></sheet><row/></root>");
        assert!(c.advance_until("sheet").unwrap());
        assert!(c.advance_within(&["row"], "sheet").unwrap());
        assert!(c.advance_within(&["row"], "sheet").unwrap());
        assert!(!c.advance_within(&["row"], "sheet").unwrap());
        // The row after the sheet is still reachable
        assert!(c.advance_until("row").unwrap());
    }

    #[test]
    fn test_materialize_subtree() {
        let mut c = cursor(
            r#"<sst><si><t xml:space="preserve"> a &amp; b </t><r><t>c</t></r></si><si/></sst>"#,
        );
        assert!(c.advance_until("si").unwrap());
        let si = c.materialize_subtree().unwrap();
        assert_eq!(si.name, "si");
        assert_eq!(si.text_content(), " a & b c");
        assert_eq!(
            si.first_child("t").and_then(|t| t.attribute("xml:space")),
            Some("preserve")
        );

        // The cursor continues after the materialized element
        assert!(c.advance_until("si").unwrap());
        let empty = c.materialize_subtree().unwrap();
        assert!(empty.children.is_empty());
        assert!(!c.advance_until("si").unwrap());
    }

    #[test]
    fn test_materialize_twice_fails() {
        let mut c = cursor("<a><b/></a>");
        assert!(c.advance_until("a").unwrap());
        c.materialize_subtree().unwrap();
        assert!(matches!(
            c.materialize_subtree(),
            Err(XmlProcessingError::NotPositioned)
        ));
    }

    #[test]
    fn test_malformed_xml_is_reported() {
        let mut c = cursor("<a><b></a>");
        assert!(c.advance_until("a").unwrap());
        assert!(c.materialize_subtree().is_err());
    }

    #[test]
    fn test_skip_subtree() {
        let mut c = cursor("<r><a><a/><b/></a><b id=\"x\"/></r>");
        assert!(c.advance_until("a").unwrap());
        c.skip_subtree().unwrap();
        assert!(c.advance_until_any(&["a", "b"]).unwrap() == Some(1));
        assert_eq!(c.attribute("id").as_deref(), Some("x"));
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut c = cursor("<a/>");
        c.close();
        c.close();
        assert!(c.is_closed());
        assert!(!c.advance_until("a").unwrap());
    }
}
