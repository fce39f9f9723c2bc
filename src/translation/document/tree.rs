//! Attributed element trees parsed from XML.
//!
//! Only elements, attributes and character data are modeled. Comments,
//! processing instructions and the doctype are not carried to the output.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::errors::FormatError;

/// One XML element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    /// Attributes in document order
    pub attributes: Vec<(String, String)>,
    /// Character data before the first child
    pub text: Option<String>,
    /// Character data after this element's end tag, inside the parent
    pub tail: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Number of elements in this subtree, including itself
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Element::count).sum::<usize>()
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self, FormatError> {
        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| FormatError::Encoding(e.to_string()))?
            .to_string();

        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|e| FormatError::Xml(e.to_string()))?;
            let key = std::str::from_utf8(attribute.key.as_ref())
                .map_err(|e| FormatError::Encoding(e.to_string()))?
                .to_string();
            let value = attribute
                .unescape_value()
                .map_err(|e| FormatError::Xml(e.to_string()))?
                .into_owned();
            attributes.push((key, value));
        }

        Ok(Self {
            name,
            attributes,
            ..Self::default()
        })
    }

    fn write<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<(), FormatError> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        let text = self.text.as_deref().filter(|t| !t.is_empty());
        if text.is_none() && self.children.is_empty() {
            writer.write_event(Event::Empty(start)).map_err(xml_write_error)?;
            return Ok(());
        }

        writer.write_event(Event::Start(start)).map_err(xml_write_error)?;
        if let Some(text) = text {
            writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(xml_write_error)?;
        }
        for child in &self.children {
            child.write(writer)?;
            if let Some(tail) = child.tail.as_deref().filter(|t| !t.is_empty()) {
                writer
                    .write_event(Event::Text(BytesText::new(tail)))
                    .map_err(xml_write_error)?;
            }
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(xml_write_error)?;
        Ok(())
    }
}

fn xml_write_error(error: impl std::fmt::Display) -> FormatError {
    FormatError::Xml(error.to_string())
}

/// A parsed XML document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeDocument {
    pub root: Element,
}

impl TreeDocument {
    pub fn parse(bytes: &[u8]) -> Result<Self, FormatError> {
        let text = std::str::from_utf8(bytes).map_err(|e| FormatError::Encoding(e.to_string()))?;
        Self::parse_str(text.strip_prefix('\u{feff}').unwrap_or(text))
    }

    pub fn parse_str(xml: &str) -> Result<Self, FormatError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| FormatError::Xml(format!("at byte {}: {}", reader.buffer_position(), e)))?;

            match event {
                Event::Start(start) => stack.push(Element::from_start(&start)?),
                Event::Empty(start) => {
                    let element = Element::from_start(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| FormatError::Xml("unexpected closing tag".to_string()))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(|e| FormatError::Xml(e.to_string()))?;
                    append_text(&mut stack, &text)?;
                }
                Event::CData(data) => {
                    let text = std::str::from_utf8(&data)
                        .map_err(|e| FormatError::Encoding(e.to_string()))?;
                    append_text(&mut stack, text)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(FormatError::Xml(format!("unclosed element <{}>", open.name)));
        }

        root.map(|root| Self { root })
            .ok_or_else(|| FormatError::Xml("document has no root element".to_string()))
    }

    /// Number of elements in the document
    pub fn element_count(&self) -> usize {
        self.root.count()
    }

    /// Serialize with an XML declaration
    pub fn to_bytes(&self) -> Result<Vec<u8>, FormatError> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(xml_write_error)?;
        writer
            .write_event(Event::Text(BytesText::new("\n")))
            .map_err(xml_write_error)?;
        self.root.write(&mut writer)?;
        Ok(writer.into_inner())
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<(), FormatError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(FormatError::Xml("multiple root elements".to_string())),
    }
    Ok(())
}

fn append_text(stack: &mut [Element], text: &str) -> Result<(), FormatError> {
    let Some(parent) = stack.last_mut() else {
        if text.trim().is_empty() {
            return Ok(());
        }
        return Err(FormatError::Xml("text outside the root element".to_string()));
    };

    let slot = match parent.children.last_mut() {
        Some(child) => &mut child.tail,
        None => &mut parent.text,
    };
    slot.get_or_insert_with(String::new).push_str(text);
    Ok(())
}
