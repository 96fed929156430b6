//! Minimal XML tree used by the engine, read and written with quick-xml

use std::borrow::Cow;

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, String> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| e.to_string())?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(|e| e.to_string())?;
            attributes.push((key, value.into_owned()));
        }
        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Parse a document and return its root element.
///
/// Declarations, processing instructions, doctypes and anything outside the
/// root element other than whitespace are discarded.
pub fn parse(source: &str) -> Result<Element, String> {
    let mut reader = Reader::from_str(source);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("at byte {}: {}", reader.buffer_position(), e))?;

        match event {
            Event::Start(start) => stack.push(Element::from_start(&start)?),
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| "unexpected closing tag".to_string())?;
                attach(&mut stack, &mut root, Node::Element(element))?;
            }
            Event::Empty(start) => {
                let element = Element::from_start(&start)?;
                attach(&mut stack, &mut root, Node::Element(element))?;
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| e.to_string())?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::Text(text.into_owned())),
                    None if text.trim().is_empty() => {}
                    None => return Err("text outside of the root element".to_string()),
                }
            }
            Event::CData(data) => {
                if let Some(parent) = stack.last_mut() {
                    parent
                        .children
                        .push(Node::CData(String::from_utf8_lossy(&data).into_owned()));
                }
            }
            Event::Comment(comment) => {
                if let Some(parent) = stack.last_mut() {
                    parent
                        .children
                        .push(Node::Comment(String::from_utf8_lossy(&comment).into_owned()));
                }
            }
            Event::Eof => break,
            // Decl, PI, DocType
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(format!("unclosed element <{}>", open.name));
    }
    root.ok_or_else(|| "document has no root element".to_string())
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, node: Node) -> Result<(), String> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(node);
            Ok(())
        }
        None => match (node, root.is_some()) {
            (Node::Element(element), false) => {
                *root = Some(element);
                Ok(())
            }
            _ => Err("document has more than one root element".to_string()),
        },
    }
}

/// Serialize a root element as a standalone XML document
pub fn write(root: &Element) -> Result<String, String> {
    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", None, None)))
        .map_err(|e| e.to_string())?;
    writer
        .write_event(Event::Text(BytesText::from_escaped("\n")))
        .map_err(|e| e.to_string())?;
    write_element(&mut writer, root)?;

    String::from_utf8(writer.into_inner()).map_err(|e| e.to_string())
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), String> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| e.to_string());
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| e.to_string())?;
    for child in &element.children {
        match child {
            Node::Element(inner) => write_element(writer, inner)?,
            Node::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(|e| e.to_string())?,
            Node::CData(data) => writer
                .write_event(Event::CData(BytesCData::new(data.as_str())))
                .map_err(|e| e.to_string())?,
            Node::Comment(comment) => writer
                .write_event(Event::Comment(BytesText::from_escaped(Cow::Borrowed(
                    comment.as_str(),
                ))))
                .map_err(|e| e.to_string())?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_elements() {
        let root = parse(r#"<?xml version="1.0"?><robot name="r"><link name="a"/><joint>x</joint></robot>"#)
            .unwrap();

        assert_eq!(root.name, "robot");
        assert_eq!(root.attribute("name"), Some("r"));
        assert_eq!(root.children.len(), 2);
        match &root.children[1] {
            Node::Element(joint) => assert_eq!(joint.children, vec![Node::Text("x".to_string())]),
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_mismatched_tags() {
        assert!(parse("<robot><link></robot>").is_err());
    }

    #[test]
    fn test_parse_rejects_multiple_roots() {
        assert!(parse("<a/><b/>").is_err());
    }

    #[test]
    fn test_parse_rejects_empty_document() {
        assert!(parse("  ").is_err());
    }

    #[test]
    fn test_write_escapes_text_and_attributes() {
        let root = Element {
            name: "robot".to_string(),
            attributes: vec![("name".to_string(), "a&b".to_string())],
            children: vec![Node::Text("1 < 2".to_string())],
        };

        let output = write(&root).unwrap();
        assert!(output.starts_with("<?xml version=\"1.0\"?>"));
        assert!(output.contains(r#"<robot name="a&amp;b">1 &lt; 2</robot>"#));
    }
}
