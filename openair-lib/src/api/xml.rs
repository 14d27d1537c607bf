//! Minimal XML element tree for API responses.

use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::ApiError;

/// Escapes a string for use in XML text and attribute values.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// An element of a parsed response document.
///
/// Only what the API uses is kept: tag name, attributes, child elements and
/// concatenated text content. Comments and processing instructions are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    /// Parses a document and returns its root element.
    pub fn parse(xml: &str) -> Result<Element, ApiError> {
        let mut reader = Reader::from_str(xml);

        // Stack of open elements; the bottom entry is a synthetic document node.
        let mut stack: Vec<Element> = vec![Element::default()];

        loop {
            match reader.read_event()? {
                Event::Start(start) => stack.push(Element::open(&start)?),
                Event::Empty(start) => {
                    let element = Element::open(&start)?;
                    attach(&mut stack, element)?;
                }
                Event::End(_) => {
                    let mut element = stack
                        .pop()
                        .ok_or_else(|| ApiError::parse("unbalanced closing tag"))?;
                    // Indentation between child tags is not content.
                    if !element.children.is_empty() && element.text.trim().is_empty() {
                        element.text.clear();
                    }
                    attach(&mut stack, element)?;
                }
                Event::Text(text) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&text.unescape()?);
                    }
                }
                Event::CData(data) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if stack.len() != 1 {
            return Err(ApiError::parse("unexpected end of document"));
        }
        let document = stack.pop().unwrap_or_default();
        document
            .children
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::parse("document has no root element"))
    }

    fn open(start: &BytesStart<'_>) -> Result<Element, ApiError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| ApiError::parse(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(Element {
            name,
            attributes,
            children: Vec::new(),
            text: String::new(),
        })
    }

    /// Returns the tag name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the value of an attribute, if present.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the direct child elements in document order.
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Returns the first direct child with the given tag name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Returns every direct child with the given tag name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Returns the element's own text content exactly as sent.
    ///
    /// Whitespace-only text of an element with children is dropped.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the text of the first child with the given name.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(Element::text)
    }
}

fn attach(stack: &mut [Element], element: Element) -> Result<(), ApiError> {
    let parent = stack
        .last_mut()
        .ok_or_else(|| ApiError::parse("unbalanced closing tag"))?;
    parent.children.push(element);
    Ok(())
}
