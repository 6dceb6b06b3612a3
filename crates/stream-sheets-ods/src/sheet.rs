//! Sheet enumeration over `content.xml`

use ahash::AHashMap;
use stream_sheets_core::{
    Escaper, OdsEscaper, ReaderOptions, SheetDescriptor, XmlCursor, XmlElement,
};

use crate::cell::CellValueDecoder;
use crate::error::{OdsError, OdsResult};
use crate::rows::RowIterator;

pub(crate) const CONTENT_XML: &str = "content.xml";

const XML_NODE_AUTOMATIC_STYLES: &str = "office:automatic-styles";
const XML_NODE_BODY: &str = "office:body";
const XML_NODE_TABLE: &str = "table:table";
const XML_NODE_TABLE_PROPERTIES: &str = "style:table-properties";
const XML_ATTRIBUTE_STYLE_NAME: &str = "style:name";
const XML_ATTRIBUTE_TABLE_DISPLAY: &str = "table:display";
const XML_ATTRIBUTE_TABLE_NAME: &str = "table:name";
const XML_ATTRIBUTE_TABLE_STYLE_NAME: &str = "table:style-name";

/// Visibility of table styles, keyed by style name
#[derive(Debug, Clone, Default)]
pub struct StyleVisibility {
    styles: AHashMap<String, bool>,
}

impl StyleVisibility {
    /// Collect every `style:table-properties` of an `office:automatic-styles` block
    pub fn from_automatic_styles(styles: &XmlElement) -> Self {
        let mut visibility = Self::default();
        for (style, properties) in styles.descendants_with_parent(XML_NODE_TABLE_PROPERTIES) {
            if let Some(name) = style.attribute(XML_ATTRIBUTE_STYLE_NAME) {
                let visible = properties.attribute(XML_ATTRIBUTE_TABLE_DISPLAY) != Some("false");
                visibility.styles.insert(name.to_string(), visible);
            }
        }
        visibility
    }

    /// Whether a table using `style_name` is visible. Unknown styles are visible.
    pub fn is_visible(&self, style_name: Option<&str>) -> bool {
        style_name
            .and_then(|name| self.styles.get(name).copied())
            .unwrap_or(true)
    }

    /// Number of styles with a declared visibility
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Check if no style declares a visibility
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    LookingForNextSheet,
    Exhausted,
}

/// Iterates over the sheets of an ODS file, in file order.
///
/// Each [`Sheet`] borrows the iterator: its rows must be read before asking
/// for the next sheet.
pub struct SheetIterator<'a> {
    cursor: XmlCursor<'a>,
    state: State,
    visibility: StyleVisibility,
    active_sheet_name: Option<String>,
    decoder: CellValueDecoder,
    preserve_empty_rows: bool,
    next_index: usize,
}

impl<'a> SheetIterator<'a> {
    pub(crate) fn new(
        cursor: XmlCursor<'a>,
        active_sheet_name: Option<String>,
        options: &ReaderOptions,
    ) -> Self {
        Self {
            cursor,
            state: State::Start,
            visibility: StyleVisibility::default(),
            active_sheet_name,
            decoder: CellValueDecoder::new(options.format_dates),
            preserve_empty_rows: options.preserve_empty_rows,
            next_index: 0,
        }
    }

    /// Move to the next sheet. Returns `None` once every sheet was seen.
    pub fn next_sheet(&mut self) -> OdsResult<Option<Sheet<'_, 'a>>> {
        if self.state == State::Start {
            if let Err(e) = self.read_style_visibility() {
                self.finish();
                return Err(e);
            }
            self.state = State::LookingForNextSheet;
        }
        if self.state == State::Exhausted {
            return Ok(None);
        }

        match self.cursor.advance_until(XML_NODE_TABLE) {
            Ok(true) => {}
            Ok(false) => {
                self.finish();
                return Ok(None);
            }
            Err(e) => {
                self.finish();
                return Err(OdsError::invalid_xml(CONTENT_XML, e));
            }
        }

        let descriptor = self.current_descriptor();
        log::debug!(
            "Found sheet {} \"{}\" (active: {}, visible: {})",
            descriptor.index,
            descriptor.name,
            descriptor.is_active,
            descriptor.is_visible
        );

        Ok(Some(Sheet {
            descriptor,
            rows: RowIterator::new(&mut self.cursor, self.decoder, self.preserve_empty_rows),
        }))
    }

    fn current_descriptor(&mut self) -> SheetDescriptor {
        let raw_name = self
            .cursor
            .attribute(XML_ATTRIBUTE_TABLE_NAME)
            .unwrap_or_default();
        let name = OdsEscaper.unescape(&raw_name).into_owned();
        let style_name = self.cursor.attribute(XML_ATTRIBUTE_TABLE_STYLE_NAME);

        let index = self.next_index;
        self.next_index += 1;

        let is_active =
            SheetDescriptor::resolve_active(index, &name, self.active_sheet_name.as_deref());
        let is_visible = self.visibility.is_visible(style_name.as_deref());
        SheetDescriptor::new(index, name, is_active, is_visible)
    }

    /// Scan the automatic styles once, before the first sheet.
    ///
    /// Stops at `office:body` when the document has no automatic styles.
    fn read_style_visibility(&mut self) -> OdsResult<()> {
        let found = self
            .cursor
            .advance_until_any(&[XML_NODE_AUTOMATIC_STYLES, XML_NODE_BODY])
            .map_err(|e| OdsError::invalid_xml(CONTENT_XML, e))?;

        if found == Some(0) {
            let styles = self
                .cursor
                .materialize_subtree()
                .map_err(|e| OdsError::invalid_xml(CONTENT_XML, e))?;
            self.visibility = StyleVisibility::from_automatic_styles(&styles);
            log::trace!("Read visibility of {} table styles", self.visibility.len());
        }
        Ok(())
    }

    fn finish(&mut self) {
        self.state = State::Exhausted;
        self.cursor.close();
    }

    /// Stop iterating and release `content.xml`. Safe to call more than once.
    pub fn close(&mut self) {
        self.finish();
    }
}

/// One sheet of an ODS file: its descriptor and a lazy row iterator
pub struct Sheet<'s, 'a> {
    descriptor: SheetDescriptor,
    rows: RowIterator<'s, 'a>,
}

impl<'s, 'a> Sheet<'s, 'a> {
    /// Metadata of the sheet
    pub fn descriptor(&self) -> &SheetDescriptor {
        &self.descriptor
    }

    /// Name of the sheet
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Rows of the sheet, read on demand
    pub fn rows(&mut self) -> &mut RowIterator<'s, 'a> {
        &mut self.rows
    }

    /// Consume the sheet, keeping only its row iterator
    pub fn into_rows(self) -> RowIterator<'s, 'a> {
        self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn iterator(xml: &'static str, active: Option<&str>) -> SheetIterator<'static> {
        let cursor = XmlCursor::new(CONTENT_XML, Box::new(xml.as_bytes()));
        SheetIterator::new(cursor, active.map(String::from), &ReaderOptions::default())
    }

    fn descriptors(iter: &mut SheetIterator<'_>) -> Vec<SheetDescriptor> {
        let mut found = Vec::new();
        while let Some(sheet) = iter.next_sheet().unwrap() {
            found.push(sheet.descriptor().clone());
        }
        found
    }

    const CONTENT: &str = r#"<office:document-content>
        <office:automatic-styles>
            <style:style style:name="ta1" style:family="table">
                <style:table-properties table:display="true"/>
            </style:style>
            <style:style style:name="ta2" style:family="table">
                <style:table-properties table:display="false"/>
            </style:style>
        </office:automatic-styles>
        <office:body><office:spreadsheet>
            <table:table table:name="First" table:style-name="ta1"/>
            <table:table table:name="Hidden" table:style-name="ta2"/>
            <table:table table:name="R&amp;D"/>
        </office:spreadsheet></office:body>
    </office:document-content>"#;

    #[test]
    fn test_visibility_from_styles() {
        let mut iter = iterator(CONTENT, None);
        let found = descriptors(&mut iter);
        assert_eq!(
            found,
            vec![
                SheetDescriptor::new(0, "First", true, true),
                SheetDescriptor::new(1, "Hidden", false, false),
                SheetDescriptor::new(2, "R&D", false, true),
            ]
        );
    }

    #[test]
    fn test_declared_active_sheet() {
        let mut iter = iterator(CONTENT, Some("Hidden"));
        let active: Vec<bool> = descriptors(&mut iter).iter().map(|d| d.is_active).collect();
        assert_eq!(active, vec![false, true, false]);
    }

    #[test]
    fn test_no_automatic_styles() {
        let mut iter = iterator(
            r#"<office:document-content><office:body><office:spreadsheet>
                <table:table table:name="Only" table:style-name="ta1"/>
            </office:spreadsheet></office:body></office:document-content>"#,
            None,
        );
        let found = descriptors(&mut iter);
        assert_eq!(found, vec![SheetDescriptor::new(0, "Only", true, true)]);
    }

    #[test]
    fn test_exhausted_iterator_stays_exhausted() {
        let mut iter = iterator(CONTENT, None);
        descriptors(&mut iter);
        assert!(iter.next_sheet().unwrap().is_none());
        assert!(iter.next_sheet().unwrap().is_none());
    }

    #[test]
    fn test_malformed_content_is_fatal() {
        let mut iter = iterator(
            "<office:document-content><office:automatic-styles><style:style></office:document-content>",
            None,
        );
        match iter.next_sheet() {
            Err(OdsError::InvalidXml { entry, .. }) => assert_eq!(entry, CONTENT_XML),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("malformed XML was accepted"),
        }
        assert!(iter.next_sheet().unwrap().is_none());
    }
}
