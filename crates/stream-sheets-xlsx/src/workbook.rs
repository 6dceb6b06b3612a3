//! Workbook metadata: `xl/workbook.xml` and its relationships

use std::io::{Read, Seek};

use ahash::AHashMap;
use stream_sheets_core::xml::XmlResult;
use stream_sheets_core::{Archive, SheetDescriptor, XmlCursor};

use crate::error::{XlsxError, XlsxResult};
use crate::shared_strings::DEFAULT_SHARED_STRINGS_PATH;
use crate::styles::DEFAULT_STYLES_PATH;

/// Location of the workbook part
pub const WORKBOOK_PATH: &str = "xl/workbook.xml";

/// Location of the workbook relationships part
pub const WORKBOOK_RELS_PATH: &str = "xl/_rels/workbook.xml.rels";

const XML_NODE_WORKBOOK_PR: &str = "workbookPr";
const XML_NODE_WORKBOOK_VIEW: &str = "workbookView";
const XML_NODE_SHEET: &str = "sheet";
const XML_NODE_RELATIONSHIP: &str = "Relationship";
const XML_ATTRIBUTE_DATE_1904: &str = "date1904";
const XML_ATTRIBUTE_ACTIVE_TAB: &str = "activeTab";
const XML_ATTRIBUTE_NAME: &str = "name";
const XML_ATTRIBUTE_STATE: &str = "state";
const XML_ATTRIBUTE_R_ID: &str = "r:id";
const XML_ATTRIBUTE_ID: &str = "Id";
const XML_ATTRIBUTE_TARGET: &str = "Target";
const XML_ATTRIBUTE_TYPE: &str = "Type";

const RELATIONSHIP_WORKSHEET: &str = "/worksheet";
const RELATIONSHIP_SHARED_STRINGS: &str = "/sharedStrings";
const RELATIONSHIP_STYLES: &str = "/styles";

/// One `<sheet>` of the workbook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetEntry {
    /// Name of the sheet
    pub name: String,
    /// Archive path of the worksheet part, if its relationship resolves
    pub path: Option<String>,
    /// Whether the sheet is neither `hidden` nor `veryHidden`
    pub is_visible: bool,
}

/// What the reader needs to know about a workbook before reading any sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkbookInfo {
    /// Sheets in workbook order
    pub sheets: Vec<SheetEntry>,
    /// Index of the active sheet
    pub active_tab: usize,
    /// Whether date serials count from 1904-01-01 instead of 1899-12-30
    pub date1904: bool,
    /// Archive path of the shared strings part
    pub shared_strings_path: String,
    /// Archive path of the styles part
    pub styles_path: String,
}

#[derive(Debug, Default)]
struct Relationships {
    worksheets: AHashMap<String, String>,
    shared_strings: Option<String>,
    styles: Option<String>,
}

#[derive(Debug, Default)]
struct WorkbookPart {
    sheets: Vec<(String, Option<String>, bool)>,
    active_tab: usize,
    date1904: bool,
}

impl WorkbookInfo {
    /// Read the workbook part and its relationships
    pub fn read<R: Read + Seek>(archive: &mut Archive<R>) -> XlsxResult<Self> {
        let relationships = {
            let mut cursor = archive
                .cursor(WORKBOOK_RELS_PATH)?
                .ok_or_else(|| XlsxError::MissingPart(WORKBOOK_RELS_PATH.into()))?;
            read_relationships(&mut cursor)
                .map_err(|e| XlsxError::invalid_xml("workbook.xml.rels", e))?
        };

        let workbook = {
            let mut cursor = archive
                .cursor(WORKBOOK_PATH)?
                .ok_or_else(|| XlsxError::MissingPart(WORKBOOK_PATH.into()))?;
            read_workbook(&mut cursor).map_err(|e| XlsxError::invalid_xml("workbook.xml", e))?
        };

        let sheets = workbook
            .sheets
            .into_iter()
            .map(|(name, r_id, is_visible)| SheetEntry {
                path: r_id.and_then(|id| relationships.worksheets.get(&id).cloned()),
                name,
                is_visible,
            })
            .collect();

        Ok(Self {
            sheets,
            active_tab: workbook.active_tab,
            date1904: workbook.date1904,
            shared_strings_path: relationships
                .shared_strings
                .unwrap_or_else(|| DEFAULT_SHARED_STRINGS_PATH.to_string()),
            styles_path: relationships
                .styles
                .unwrap_or_else(|| DEFAULT_STYLES_PATH.to_string()),
        })
    }

    /// Descriptor of the sheet at `index`
    pub fn descriptor(&self, index: usize) -> Option<SheetDescriptor> {
        let sheet = self.sheets.get(index)?;
        Some(SheetDescriptor::new(
            index,
            sheet.name.clone(),
            index == self.active_tab,
            sheet.is_visible,
        ))
    }
}

fn read_relationships(cursor: &mut XmlCursor<'_>) -> XmlResult<Relationships> {
    let mut relationships = Relationships::default();
    while cursor.advance_until(XML_NODE_RELATIONSHIP)? {
        let (id, target, kind) = match (
            cursor.attribute(XML_ATTRIBUTE_ID),
            cursor.attribute(XML_ATTRIBUTE_TARGET),
            cursor.attribute(XML_ATTRIBUTE_TYPE),
        ) {
            (Some(id), Some(target), Some(kind)) => (id, target, kind),
            _ => continue,
        };

        let path = resolve_target(&target);
        if kind.ends_with(RELATIONSHIP_WORKSHEET) {
            relationships.worksheets.insert(id, path);
        } else if kind.ends_with(RELATIONSHIP_SHARED_STRINGS) {
            relationships.shared_strings = Some(path);
        } else if kind.ends_with(RELATIONSHIP_STYLES) {
            relationships.styles = Some(path);
        }
    }
    cursor.close();
    Ok(relationships)
}

fn read_workbook(cursor: &mut XmlCursor<'_>) -> XmlResult<WorkbookPart> {
    let mut workbook = WorkbookPart::default();
    let mut seen_view = false;
    let names = [XML_NODE_WORKBOOK_PR, XML_NODE_WORKBOOK_VIEW, XML_NODE_SHEET];

    while let Some(found) = cursor.advance_until_any(&names)? {
        match found {
            0 => {
                workbook.date1904 = cursor
                    .attribute(XML_ATTRIBUTE_DATE_1904)
                    .is_some_and(|v| is_true(&v));
            }
            // Only the first view matters
            1 if !seen_view => {
                seen_view = true;
                workbook.active_tab = cursor
                    .attribute(XML_ATTRIBUTE_ACTIVE_TAB)
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(0);
            }
            2 => {
                let name = cursor.attribute(XML_ATTRIBUTE_NAME).unwrap_or_default();
                let is_visible = !matches!(
                    cursor.attribute(XML_ATTRIBUTE_STATE).as_deref(),
                    Some("hidden") | Some("veryHidden")
                );
                workbook
                    .sheets
                    .push((name, cursor.attribute(XML_ATTRIBUTE_R_ID), is_visible));
            }
            _ => {}
        }
    }
    cursor.close();
    Ok(workbook)
}

fn is_true(value: &str) -> bool {
    matches!(value.trim(), "1" | "true")
}

/// Targets are relative to `xl/` unless absolute within the package
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target.trim_start_matches("./")),
    }
}
