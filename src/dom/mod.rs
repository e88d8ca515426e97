//! Owned markup tree consumed and produced by the renderer.
//!
//! The tree is intentionally small: elements with ordered attributes, text,
//! raw (pre-escaped) HTML, comments and a doctype. Parsing goes through the
//! WHATWG tokenizer in [`html5gum`] with a lenient tree builder; serialization
//! escapes text and attribute values with [`html_escape`].
//!
//! Every node is plain owned data, so `Clone` is a deep copy. The renderer
//! relies on this to unroll loops over a shared, immutable template tree.
//!
//! # Examples
//!
//! ```
//! use vtpl::dom::Document;
//!
//! let doc = Document::parse(r#"<p class="lead">Fish &amp; chips<br></p>"#).unwrap();
//! assert_eq!(doc.to_html(), r#"<p class="lead">Fish &amp; chips<br></p>"#);
//! ```

mod parser;
mod serializer;

use std::fmt;

use thiserror::Error;

/// Elements that never have children or a closing tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose text content is emitted without escaping.
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

pub fn is_raw_text_element(name: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&name)
}

#[derive(Debug, Error)]
pub enum DomError {
    #[error("input is not valid UTF-8")]
    InvalidUtf8,

    #[error("markup tokenizer failed")]
    Tokenizer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Text content, stored unescaped.
    Text(String),
    /// Trusted HTML emitted verbatim.
    Raw(String),
    Comment(String),
    Doctype(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Whitespace-only text and comments; these may sit between the
    /// branches of a conditional chain.
    pub fn is_insignificant(&self) -> bool {
        match self {
            Node::Text(text) => text.trim().is_empty(),
            Node::Comment(_) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercase tag name.
    pub name: String,
    /// Attributes sorted by name, as the tokenizer reports them; names are
    /// unique.
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|(n, _)| n == name)
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let index = self.attrs.iter().position(|(n, _)| n == name)?;
        Some(self.attrs.remove(index).1)
    }

    pub fn is_void(&self) -> bool {
        is_void_element(&self.name)
    }
}

/// A parsed markup document: an ordered list of top-level nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub nodes: Vec<Node>,
}

impl Document {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self {
            nodes,
        }
    }

    /// Parse markup into a tree.
    ///
    /// Parsing is lenient: stray end tags are ignored and open elements are
    /// closed at end of input.
    pub fn parse(source: &str) -> Result<Self, DomError> {
        parser::parse(source)
    }

    /// Parse UTF-8 encoded markup.
    pub fn parse_bytes(source: &[u8]) -> Result<Self, DomError> {
        let source = std::str::from_utf8(source).map_err(|_| DomError::InvalidUtf8)?;
        Self::parse(source)
    }

    /// Serialize back to markup.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        serializer::write_nodes(&mut out, &self.nodes, false);
        out
    }

    /// Top-level elements, skipping text, comments and the doctype.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.nodes.iter().filter_map(Node::as_element)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_html())
    }
}
