//! XMLTV serialization
//!
//! Renders an [`Element`] tree with quick-xml's writer. Attribute values and text are
//! escaped by quick-xml; childless elements are written self-closing. Elements whose
//! children are all elements are indented by two spaces per level, while text-bearing
//! content is written exactly as held so mixed content survives a round trip.

use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::errors::{AppError, AppResult};
use crate::xmltv::element::{Element, Node};

/// Declaration every written guide starts with
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

const INDENT: &str = "  ";

/// Render a full document: declaration, newline, then the root element
pub fn write_document(root: &Element) -> AppResult<String> {
    let mut writer = Writer::new(Vec::new());

    write_event(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;
    write_layout(&mut writer, 0)?;
    write_element(&mut writer, root, 0)?;

    let mut output = String::from_utf8(writer.into_inner())
        .map_err(|e| AppError::serialization(format!("Generated XML is not UTF-8: {e}")))?;
    output.push('\n');
    Ok(output)
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element, depth: usize) -> AppResult<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return write_event(writer, Event::Empty(start));
    }

    let element_only = element
        .children
        .iter()
        .all(|child| matches!(child, Node::Element(_)));

    write_event(writer, Event::Start(start))?;
    for child in &element.children {
        if element_only {
            write_layout(writer, depth + 1)?;
        }
        match child {
            Node::Element(child) => write_element(writer, child, depth + 1)?,
            Node::Text(text) => write_event(writer, Event::Text(BytesText::new(text)))?,
            Node::CData(text) => {
                write_event(writer, Event::CData(BytesCData::new(text.as_str())))?
            }
        }
    }
    if element_only {
        write_layout(writer, depth)?;
    }
    write_event(writer, Event::End(BytesEnd::new(element.name.as_str())))
}

/// Newline followed by the indentation for `depth`
fn write_layout(writer: &mut Writer<Vec<u8>>, depth: usize) -> AppResult<()> {
    let layout = format!("\n{}", INDENT.repeat(depth));
    write_event(writer, Event::Text(BytesText::from_escaped(layout)))
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> AppResult<()> {
    writer
        .write_event(event)
        .map_err(|e| AppError::serialization(format!("Failed to write XML event: {e}")))
}
