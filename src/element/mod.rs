//! Labeled tree node backing the document file format.

mod value;
mod xml;

use std::collections::BTreeMap;

pub use value::{FromAttrib, ToAttrib};

/// Result of a typed attribute read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttribLookup<T> {
    /// Present and parsed.
    Found(T),
    /// Absent.
    NotFound,
    /// Present but unparsable as the requested type.
    Invalid,
}

impl<T> AttribLookup<T> {
    /// Parsed value, if any.
    pub fn found(self) -> Option<T> {
        match self {
            AttribLookup::Found(value) => Some(value),
            _ => None,
        }
    }

    /// True when the attribute exists but failed to parse.
    pub fn is_invalid(&self) -> bool {
        matches!(self, AttribLookup::Invalid)
    }
}

/// A named node with sorted attributes, ordered children and a text value.
///
/// Children are owned exclusively; there is no parent link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    name: String,
    attribs: BTreeMap<String, String>,
    children: Vec<Element>,
    value: String,
}

impl Element {
    /// Creates an empty node.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Node name, fixed at creation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Text content.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replaces the text content.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Children in document order.
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Children with the given name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// First child with the given name.
    pub fn find_child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Appends an empty child and returns it for filling in.
    pub fn add_element(&mut self, name: impl Into<String>) -> &mut Element {
        self.children.push(Element::new(name));
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Appends an already-built child.
    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Appends a child holding only text, skipping empty text.
    pub fn add_text_element(&mut self, name: &str, text: &str) {
        if !text.is_empty() {
            self.add_element(name).set_value(text);
        }
    }

    /// Raw attribute text.
    pub fn raw_attrib(&self, name: &str) -> Option<&str> {
        self.attribs.get(name).map(String::as_str)
    }

    /// Attributes in name order.
    pub fn attribs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attribs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Typed attribute read.
    pub fn attrib<T: FromAttrib>(&self, name: &str) -> AttribLookup<T> {
        match self.attribs.get(name) {
            None => AttribLookup::NotFound,
            Some(raw) => match T::from_attrib(raw) {
                Some(value) => AttribLookup::Found(value),
                None => AttribLookup::Invalid,
            },
        }
    }

    /// Writes an attribute, replacing any previous value.
    pub fn add_attrib(&mut self, name: &str, value: impl ToAttrib) {
        self.attribs.insert(name.to_string(), value.to_attrib());
    }

    /// Removes an attribute, returning its raw text.
    pub fn remove_attrib(&mut self, name: &str) -> Option<String> {
        self.attribs.remove(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Date, Version};

    #[test]
    fn typed_lookup_distinguishes_missing_from_invalid() {
        let mut el = Element::new("Run");
        el.add_attrib("Date", "2024-02-30");
        el.add_attrib("Points", "");
        el.add_attrib("Yards", 150i16);

        assert_eq!(el.attrib::<Date>("Date"), AttribLookup::Invalid);
        assert_eq!(el.attrib::<f64>("Points"), AttribLookup::Invalid);
        assert_eq!(el.attrib::<i16>("Yards"), AttribLookup::Found(150));
        assert_eq!(el.attrib::<i16>("Missing"), AttribLookup::NotFound);
    }

    #[test]
    fn add_attrib_overwrites() {
        let mut el = Element::new("Dog");
        el.add_attrib("CallName", "Tess");
        el.add_attrib("CallName", "Rex");
        assert_eq!(el.raw_attrib("CallName"), Some("Rex"));
        assert_eq!(el.attribs().count(), 1);
    }

    #[test]
    fn bool_and_version_spellings() {
        let mut el = Element::new("Config");
        el.add_attrib("update", false);
        el.add_attrib("Book", Version::new(12, 9));
        assert_eq!(el.raw_attrib("update"), Some("n"));
        assert_eq!(el.raw_attrib("Book"), Some("12.9"));
        assert_eq!(el.attrib::<bool>("update").found(), Some(false));
        assert_eq!(el.attrib::<Version>("Book").found(), Some(Version::new(12, 9)));
    }
}
