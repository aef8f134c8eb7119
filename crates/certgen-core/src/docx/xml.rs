//! Lossless XML tree for WordprocessingML parts.
//!
//! Text and attribute values are kept in their escaped form so untouched
//! content is written back exactly as read.

use std::io::Write;

use quick_xml::escape::{escape, unescape};
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};

use crate::error::DocxError;

/// A node in a parsed part.
#[derive(Debug, Clone)]
pub enum XmlNode {
    Element(Element),
    /// Character data, escaped.
    Text(String),
    /// Declarations, comments, CDATA and processing instructions, verbatim.
    Other(Event<'static>),
}

/// An XML element with its attributes and children.
#[derive(Debug, Clone, Default)]
pub struct Element {
    /// Qualified name, e.g. `w:p`.
    pub name: String,
    /// Attributes as (qualified name, escaped value).
    pub attrs: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
    /// Written as `<name/>` when it still has no children.
    self_closing: bool,
}

impl Element {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
            self_closing: true,
        }
    }

    /// Builder-style attribute setter; `value` is unescaped text.
    pub fn with_attr(mut self, name: impl Into<String>, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder-style child append.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Name without namespace prefix.
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Namespace prefix including the colon (`w:`), or empty.
    pub fn prefix(&self) -> &str {
        match self.name.find(':') {
            Some(i) => &self.name[..=i],
            None => "",
        }
    }

    /// Attribute value by local name, unescaped.
    pub fn attr(&self, local: &str) -> Option<String> {
        self.attrs
            .iter()
            .find(|(name, _)| local_name(name) == local)
            .map(|(_, value)| unescape(value).map(|v| v.into_owned()).unwrap_or_else(|_| value.clone()))
    }

    /// Set or replace an attribute; `value` is unescaped text.
    pub fn set_attr(&mut self, name: impl Into<String>, value: &str) {
        let name = name.into();
        let escaped = escape(value).into_owned();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = escaped,
            None => self.attrs.push((name, escaped)),
        }
    }

    /// Child elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Mutable child elements in document order.
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// First child element with the given local name.
    pub fn child(&self, local: &str) -> Option<&Element> {
        self.elements().find(|e| e.local_name() == local)
    }

    /// First child element with the given local name, mutably.
    pub fn child_mut(&mut self, local: &str) -> Option<&mut Element> {
        self.elements_mut().find(|e| e.local_name() == local)
    }

    /// Concatenated unescaped text of direct text children.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            if let XmlNode::Text(raw) = node {
                match unescape(raw) {
                    Ok(text) => out.push_str(&text),
                    Err(_) => out.push_str(raw),
                }
            }
        }
        out
    }

    /// Append a text node; `text` is unescaped.
    pub fn push_text(&mut self, text: &str) {
        self.children.push(XmlNode::Text(escape(text).into_owned()));
    }

    fn write<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), String> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attrs {
            start.push_attribute(Attribute {
                key: QName(key.as_bytes()),
                value: value.as_bytes().into(),
            });
        }

        if self.children.is_empty() && self.self_closing {
            return writer.write_event(Event::Empty(start)).map_err(|e| e.to_string());
        }

        writer
            .write_event(Event::Start(start))
            .map_err(|e| e.to_string())?;
        for child in &self.children {
            write_loose(child, writer)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(|e| e.to_string())
    }
}

/// A parsed XML part: prolog nodes plus a single root element.
#[derive(Debug, Clone)]
pub struct XmlPart {
    /// Zip entry name, e.g. `word/document.xml`.
    pub name: String,
    prolog: Vec<XmlNode>,
    pub root: Element,
    epilog: Vec<XmlNode>,
}

impl XmlPart {
    /// Parse a part from raw bytes.
    pub fn parse(name: &str, data: &[u8]) -> Result<Self, DocxError> {
        let xml_err = |reason: String| DocxError::Xml {
            part: name.to_string(),
            reason,
        };

        let mut reader = Reader::from_reader(data);
        let mut buf = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|e| xml_err(format!("at byte {}: {}", reader.buffer_position(), e)))?;

            match event {
                Event::Start(e) => {
                    let mut element = start_element(&e).map_err(xml_err)?;
                    element.self_closing = false;
                    stack.push(element);
                }
                Event::Empty(e) => {
                    let element = start_element(&e).map_err(xml_err)?;
                    attach(XmlNode::Element(element), &mut stack, &mut root, &mut prolog, &mut epilog);
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| xml_err("unbalanced end tag".to_string()))?;
                    attach(XmlNode::Element(element), &mut stack, &mut root, &mut prolog, &mut epilog);
                }
                Event::Text(e) => {
                    let raw = String::from_utf8(e.to_vec())
                        .map_err(|e| xml_err(e.to_string()))?;
                    attach(XmlNode::Text(raw), &mut stack, &mut root, &mut prolog, &mut epilog);
                }
                Event::Eof => break,
                other => {
                    attach(
                        XmlNode::Other(other.into_owned()),
                        &mut stack,
                        &mut root,
                        &mut prolog,
                        &mut epilog,
                    );
                }
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(xml_err("unexpected end of document".to_string()));
        }
        let root = root.ok_or_else(|| xml_err("no root element".to_string()))?;

        Ok(Self {
            name: name.to_string(),
            prolog,
            root,
            epilog,
        })
    }

    /// Serialize the part back to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, DocxError> {
        let mut writer = Writer::new(Vec::new());
        self.prolog
            .iter()
            .try_for_each(|node| write_loose(node, &mut writer))
            .and_then(|_| self.root.write(&mut writer))
            .and_then(|_| {
                self.epilog
                    .iter()
                    .try_for_each(|node| write_loose(node, &mut writer))
            })
            .map_err(|reason| DocxError::Xml {
                part: self.name.clone(),
                reason,
            })?;
        Ok(writer.into_inner())
    }
}

fn write_loose<W: Write>(node: &XmlNode, writer: &mut Writer<W>) -> Result<(), String> {
    match node {
        XmlNode::Element(e) => e.write(writer),
        XmlNode::Text(raw) => writer
            .write_event(Event::Text(BytesText::from_escaped(raw.as_str())))
            .map_err(|e| e.to_string()),
        XmlNode::Other(event) => writer.write_event(event.borrow()).map_err(|e| e.to_string()),
    }
}

fn start_element(e: &BytesStart<'_>) -> Result<Element, String> {
    let name = String::from_utf8(e.name().as_ref().to_vec()).map_err(|e| e.to_string())?;
    let mut element = Element::new(name);
    for attr in e.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let key = String::from_utf8(attr.key.as_ref().to_vec()).map_err(|e| e.to_string())?;
        let value = String::from_utf8(attr.value.into_owned()).map_err(|e| e.to_string())?;
        element.attrs.push((key, value));
    }
    Ok(element)
}

fn attach(
    node: XmlNode,
    stack: &mut [Element],
    root: &mut Option<Element>,
    prolog: &mut Vec<XmlNode>,
    epilog: &mut Vec<XmlNode>,
) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return;
    }
    match node {
        XmlNode::Element(e) if root.is_none() => *root = Some(e),
        other if root.is_none() => prolog.push(other),
        other => epilog.push(other),
    }
}

/// Strip a namespace prefix from a qualified name.
pub fn local_name(name: &str) -> &str {
    match name.rfind(':') {
        Some(i) => &name[i + 1..],
        None => name,
    }
}
