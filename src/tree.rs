//! Filter document tree.
//!
//! [`FilterNode`] is the read-only input of the compiler: a labelled element
//! with attributes, its own text content and ordered children. Trees are
//! either built in code with the builder helpers or loaded from an XML filter
//! document with [`FilterNode::from_xml`].
//!
//! ```rust
//! use ogc_filter::FilterNode;
//!
//! let tree = FilterNode::from_xml(
//!     r#"<Or>
//!          <PropertyIsEqualTo><PropertyName>country</PropertyName><Literal>US</Literal></PropertyIsEqualTo>
//!          <PropertyIsEqualTo><PropertyName>country</PropertyName><Literal>CA</Literal></PropertyIsEqualTo>
//!        </Or>"#,
//! )?;
//!
//! assert_eq!(tree.local_name(), "Or");
//! assert_eq!(tree.children().len(), 2);
//! # Ok::<(), ogc_filter::FilterError>(())
//! ```

use crate::error::{FilterError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// A node of a filter document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterNode {
    tag: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<FilterNode>,
}

impl FilterNode {
    /// Create an element with no attributes, text or children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: FilterNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = FilterNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// `<PropertyName>name</PropertyName>`
    pub fn property_name(name: impl Into<String>) -> Self {
        Self::new("PropertyName").with_text(name)
    }

    /// `<Literal>value</Literal>`
    pub fn literal(value: impl Into<String>) -> Self {
        Self::new("Literal").with_text(value)
    }

    /// A binary comparison such as `PropertyIsEqualTo` over one property and one literal.
    pub fn comparison(
        operator: impl Into<String>,
        property: impl Into<String>,
        literal: impl Into<String>,
    ) -> Self {
        Self::new(operator)
            .with_child(Self::property_name(property))
            .with_child(Self::literal(literal))
    }

    /// The full tag, including any namespace prefix (`ogc:And`).
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The tag without its namespace prefix (`And`).
    pub fn local_name(&self) -> &str {
        local_name(&self.tag)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn children(&self) -> &[FilterNode] {
        &self.children
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Look up an attribute by name, ignoring namespace prefixes on either side.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        let wanted = local_name(name);
        self.attributes
            .iter()
            .find(|(key, _)| local_name(key) == wanted)
            .map(|(_, value)| value.as_str())
    }

    /// First direct child with the given local name.
    pub fn child(&self, name: &str) -> Option<&FilterNode> {
        self.children.iter().find(|c| c.local_name() == name)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Depth-first, document-order traversal starting with `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Parse an XML filter document into a tree rooted at its document element.
    ///
    /// Whitespace-only text is dropped and entity references are unescaped.
    /// Comments, processing instructions and declarations are ignored.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<FilterNode> = Vec::new();
        let mut root: Option<FilterNode> = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => stack.push(element_from_start(&start)?),
                Event::Empty(start) => {
                    let node = element_from_start(&start)?;
                    attach(&mut stack, &mut root, node);
                }
                Event::End(_) => {
                    let node = stack.pop().ok_or_else(|| {
                        FilterError::Xml("closing tag without matching opening tag".to_string())
                    })?;
                    attach(&mut stack, &mut root, node);
                }
                Event::Text(text) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&text.unescape()?);
                    }
                }
                Event::CData(data) => {
                    if let Some(current) = stack.last_mut() {
                        current
                            .text
                            .push_str(&String::from_utf8_lossy(&data.into_inner()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(FilterError::Xml(format!(
                "unclosed element <{}>",
                stack.last().map(|n| n.tag.as_str()).unwrap_or_default()
            )));
        }

        root.ok_or(FilterError::EmptyDocument)
    }
}

/// Iterator returned by [`FilterNode::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a FilterNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a FilterNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Strip a namespace prefix: `ogc:PropertyName` -> `PropertyName`.
pub fn local_name(tag: &str) -> &str {
    tag.rsplit_once(':').map_or(tag, |(_, local)| local)
}

fn element_from_start(start: &BytesStart<'_>) -> Result<FilterNode> {
    let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut node = FilterNode::new(tag);

    for attr in start.attributes() {
        let attr = attr.map_err(|e| FilterError::Xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        node.attributes.push((key, value));
    }

    Ok(node)
}

fn attach(stack: &mut [FilterNode], root: &mut Option<FilterNode>, node: FilterNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        // Content after the document element is ignored.
        None if root.is_none() => *root = Some(node),
        None => {}
    }
}
