//! Bounded in-memory XML tree.
//!
//! Built by [`XmlCursor::materialize_subtree`](super::XmlCursor::materialize_subtree)
//! for small regions only (one shared string item, one cell, one styles block).

/// A node of a materialized subtree
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    /// Child element
    Element(XmlElement),
    /// Text content, entities already decoded
    Text(String),
}

/// An element with its attributes and children
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    /// Qualified name (e.g. `table:table-cell`)
    pub name: String,
    /// Attributes in document order, values entity-decoded
    pub attributes: Vec<(String, String)>,
    /// Child nodes in document order
    pub children: Vec<XmlNode>,
}

/// Check whether a qualified element name matches the wanted name.
///
/// A wanted name without prefix also matches any prefixed element with the same
/// local name, so `si` matches both `<si>` and `<x:si>`.
pub fn name_matches(qualified: &str, wanted: &str) -> bool {
    if qualified == wanted {
        return true;
    }
    !wanted.contains(':') && local_part(qualified) == wanted
}

fn local_part(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

impl XmlElement {
    /// Create an element without attributes or children
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Name without namespace prefix
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Check if this element has the given name
    pub fn is(&self, name: &str) -> bool {
        name_matches(&self.name, name)
    }

    /// Get an attribute value by qualified name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterate over child elements, skipping text
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|child| match child {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// Iterate over direct children with the given name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.child_elements().filter(move |e| e.is(name))
    }

    /// First direct child with the given name
    pub fn first_child(&self, name: &str) -> Option<&XmlElement> {
        self.child_elements().find(|e| e.is(name))
    }

    /// All descendants with the given name, in document order
    pub fn descendants(&self, name: &str) -> Vec<&XmlElement> {
        self.descendants_with_parent(name)
            .into_iter()
            .map(|(_, e)| e)
            .collect()
    }

    /// All descendants with the given name paired with their parent element
    pub fn descendants_with_parent(&self, name: &str) -> Vec<(&XmlElement, &XmlElement)> {
        let mut found = Vec::new();
        self.collect_descendants(name, &mut found);
        found
    }

    fn collect_descendants<'a>(
        &'a self,
        name: &str,
        found: &mut Vec<(&'a XmlElement, &'a XmlElement)>,
    ) {
        for child in self.child_elements() {
            if child.is(name) {
                found.push((self, child));
            }
            child.collect_descendants(name, found);
        }
    }

    /// Concatenated text of this element and all its descendants
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.push_text(&mut text);
        text
    }

    fn push_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                XmlNode::Text(t) => out.push_str(t),
                XmlNode::Element(e) => e.push_text(out),
            }
        }
    }
}
