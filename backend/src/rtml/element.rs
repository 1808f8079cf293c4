//! Immutable XML element tree.
//!
//! Fragments are built with consuming builder methods and composed once; the
//! tree is then serialized with `quick-xml`. Attributes and children keep
//! insertion order, so the same tree always serializes to the same bytes.

use std::borrow::Cow;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{RtmlError, RtmlResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Convenience for `<name>text</name>`.
    pub fn leaf(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name).with_text(text)
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = Element>,
    {
        self.children.extend(children);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Element name without any namespace prefix.
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// First direct child with the given local name.
    pub fn child(&self, local_name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.local_name() == local_name)
    }

    /// Follow a chain of child local names, e.g. `["Device", "Setup", "Filter"]`.
    pub fn find_path(&self, path: &[&str]) -> Option<&Element> {
        path.iter().try_fold(self, |el, name| el.child(name))
    }

    /// Depth-first search for the first descendant with the given local name.
    pub fn descendant(&self, local_name: &str) -> Option<&Element> {
        self.children.iter().find_map(|c| {
            if c.local_name() == local_name {
                Some(c)
            } else {
                c.descendant(local_name)
            }
        })
    }

    /// Compact serialization, as sent over the wire.
    pub fn to_xml(&self) -> RtmlResult<String> {
        let mut writer = Writer::new(Vec::new());
        self.write_to(&mut writer)?;
        into_string(writer.into_inner())
    }

    /// Indented serialization for diagnostic output.
    pub fn to_pretty_xml(&self) -> RtmlResult<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        self.write_to(&mut writer)?;
        let mut xml = into_string(writer.into_inner())?;
        xml.push('\n');
        Ok(xml)
    }

    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> RtmlResult<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.text.is_none() && self.children.is_empty() {
            return emit(writer, Event::Empty(start));
        }

        emit(writer, Event::Start(start))?;
        if let Some(text) = &self.text {
            emit(writer, Event::Text(BytesText::new(text)))?;
        }
        for child in &self.children {
            child.write_to(writer)?;
        }
        emit(writer, Event::End(BytesEnd::new(self.name.as_str())))
    }

    /// Parse a document into a tree.
    ///
    /// Whitespace between child elements is dropped; comments, processing
    /// instructions and the XML declaration are skipped.
    pub fn parse(xml: &str) -> Result<Element, String> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(start)) => stack.push(element_from_start(&start)?),
                Ok(Event::Empty(start)) => {
                    let element = element_from_start(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::End(_)) => {
                    let mut element = stack
                        .pop()
                        .ok_or_else(|| "closing tag without matching opening tag".to_string())?;
                    if !element.children.is_empty()
                        && element.text.as_deref().is_some_and(|t| t.trim().is_empty())
                    {
                        element.text = None;
                    } else if element.children.is_empty() && element.text.is_none() {
                        // `<a></a>` keeps its (empty) text so it writes back the same way.
                        element.text = Some(String::new());
                    }
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::Text(text)) => {
                    let text = text.unescape().map_err(|e| e.to_string())?;
                    append_text(&mut stack, &text);
                }
                Ok(Event::CData(data)) => {
                    let bytes = data.into_inner();
                    append_text(&mut stack, &String::from_utf8_lossy(&bytes));
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(format!(
                        "XML error at position {}: {}",
                        reader.buffer_position(),
                        e
                    ))
                }
            }
        }

        if !stack.is_empty() {
            return Err("unexpected end of document".to_string());
        }
        root.ok_or_else(|| "document has no root element".to_string())
    }
}

fn emit<W: std::io::Write>(writer: &mut Writer<W>, event: Event<'_>) -> RtmlResult<()> {
    writer
        .write_event(event)
        .map_err(|e| RtmlError::Serialization(e.to_string()))
}

fn into_string(bytes: Vec<u8>) -> RtmlResult<String> {
    String::from_utf8(bytes).map_err(|e| RtmlError::Serialization(e.to_string()))
}

fn element_from_start(start: &BytesStart<'_>) -> Result<Element, String> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value: Cow<'_, str> = attr.unescape_value().map_err(|e| e.to_string())?;
        element.attributes.push((key, value.into_owned()));
    }
    Ok(element)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), String> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err("document has more than one root element".to_string()),
    }
}

fn append_text(stack: &mut [Element], text: &str) {
    if let Some(current) = stack.last_mut() {
        match current.text.as_mut() {
            Some(existing) => existing.push_str(text),
            None => current.text = Some(text.to_string()),
        }
    }
}
