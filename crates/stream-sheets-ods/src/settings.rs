//! Reading `settings.xml`

use std::io::{Read, Seek};

use stream_sheets_core::xml::XmlResult;
use stream_sheets_core::{Archive, XmlCursor};

use crate::error::OdsResult;

pub(crate) const SETTINGS_XML: &str = "settings.xml";

const XML_NODE_CONFIG_ITEM: &str = "config:config-item";
const XML_ATTRIBUTE_CONFIG_NAME: &str = "config:name";
const XML_ATTRIBUTE_VALUE_ACTIVE_TABLE: &str = "ActiveTable";

/// Read the name of the sheet that was active when the file was saved.
///
/// `settings.xml` is optional: a missing or unreadable entry means no active
/// sheet was declared.
pub fn read_active_sheet_name<R: Read + Seek>(
    archive: &mut Archive<R>,
) -> OdsResult<Option<String>> {
    let mut cursor = match archive.cursor(SETTINGS_XML)? {
        Some(cursor) => cursor,
        None => return Ok(None),
    };

    let name = match find_active_table(&mut cursor) {
        Ok(name) => name,
        Err(e) => {
            log::warn!("Ignoring unreadable {}: {}", SETTINGS_XML, e);
            None
        }
    };
    cursor.close();
    Ok(name)
}

fn find_active_table(cursor: &mut XmlCursor<'_>) -> XmlResult<Option<String>> {
    while cursor.advance_until(XML_NODE_CONFIG_ITEM)? {
        if cursor.attribute(XML_ATTRIBUTE_CONFIG_NAME).as_deref()
            == Some(XML_ATTRIBUTE_VALUE_ACTIVE_TABLE)
        {
            let item = cursor.materialize_subtree()?;
            return Ok(Some(item.text_content()));
        }
    }
    Ok(None)
}
