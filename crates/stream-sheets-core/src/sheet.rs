//! Sheet metadata

/// Metadata identifying one worksheet, without its row data
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SheetDescriptor {
    /// Index of the sheet, in discovery order (0-based)
    pub index: usize,
    /// Name of the sheet (unescaped)
    pub name: String,
    /// Whether the sheet was defined as the active one
    pub is_active: bool,
    /// Whether the sheet is visible
    pub is_visible: bool,
}

impl SheetDescriptor {
    /// Create a new descriptor
    pub fn new<S: Into<String>>(index: usize, name: S, is_active: bool, is_visible: bool) -> Self {
        Self {
            index,
            name: name.into(),
            is_active,
            is_visible,
        }
    }

    /// Resolve whether a sheet is the active one.
    ///
    /// A sheet is active if its name matches the declared active sheet, or, when
    /// no active sheet was declared, if it is the first sheet.
    pub fn resolve_active(index: usize, name: &str, declared_active: Option<&str>) -> bool {
        match declared_active {
            Some(active) => active == name,
            None => index == 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sheet_is_active_by_default() {
        let active: Vec<bool> = ["One", "Two", "Three"]
            .iter()
            .enumerate()
            .map(|(i, name)| SheetDescriptor::resolve_active(i, name, None))
            .collect();
        assert_eq!(active, vec![true, false, false]);
    }

    #[test]
    fn test_declared_active_sheet_wins() {
        let active: Vec<bool> = ["One", "Two", "Three"]
            .iter()
            .enumerate()
            .map(|(i, name)| SheetDescriptor::resolve_active(i, name, Some("Three")))
            .collect();
        assert_eq!(active, vec![false, false, true]);
    }
}
