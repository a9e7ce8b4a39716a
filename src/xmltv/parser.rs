//! Quick-XML based XMLTV parser
//!
//! Builds an owned [`Element`] tree from a streaming quick-xml reader. Unlike a
//! field-extracting parser, every element, attribute and text node is kept so the
//! merge stage can copy channel and programme children verbatim.
//!
//! Input is decoded with the encoding named in the XML declaration (UTF-8 when
//! absent). Whitespace-only text is dropped only when it separates the children of an
//! element that holds no other text; comments, processing instructions and the
//! DOCTYPE are dropped as well.

use quick_xml::Reader;
use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, Event};

use crate::errors::{SourceError, SourceResult};
use crate::xmltv::element::{Element, Node};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Parse raw bytes into a document tree, returning its root element
pub fn parse_document(data: &[u8]) -> SourceResult<Element> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    let mut reader = Reader::from_reader(data);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if root.is_some() {
                    return Err(SourceError::parse("content found after the root element"));
                }
                stack.push(element_from_start(e, reader.decoder())?);
            }

            Ok(Event::Empty(ref e)) => {
                let element = element_from_start(e, reader.decoder())?;
                attach(&mut stack, &mut root, element)?;
            }

            Ok(Event::End(ref e)) => {
                let mut element = stack.pop().ok_or_else(|| {
                    SourceError::parse(format!(
                        "unexpected closing tag </{}>",
                        String::from_utf8_lossy(e.name().as_ref())
                    ))
                })?;
                drop_formatting_whitespace(&mut element);
                attach(&mut stack, &mut root, element)?;
            }

            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| SourceError::parse(format!("Invalid text content: {e}")))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::Text(text.into_owned())),
                    None if text.trim().is_empty() => {}
                    None => return Err(SourceError::parse("text found outside the root element")),
                }
            }

            Ok(Event::CData(e)) => {
                let text = reader
                    .decoder()
                    .decode(&e)
                    .map_err(|e| SourceError::parse(format!("Invalid CDATA content: {e}")))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::CData(text.into_owned())),
                    None => {
                        return Err(SourceError::parse("CDATA found outside the root element"));
                    }
                }
            }

            Ok(Event::Eof) => break,

            Err(e) => {
                return Err(SourceError::parse(format!(
                    "XML parsing error at position {}: {e}",
                    reader.buffer_position()
                )));
            }

            // Declarations, comments, processing instructions, DOCTYPE
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(SourceError::parse(format!(
            "unexpected end of document, <{}> is not closed",
            open.name
        )));
    }

    root.ok_or_else(|| SourceError::parse("document has no root element"))
}

/// Strip indentation from element-only content; mixed content is left untouched
fn drop_formatting_whitespace(element: &mut Element) {
    let mut has_elements = false;
    for node in &element.children {
        match node {
            Node::Element(_) => has_elements = true,
            Node::Text(text) if text.trim().is_empty() => {}
            Node::Text(_) | Node::CData(_) => return,
        }
    }
    if has_elements {
        element
            .children
            .retain(|node| matches!(node, Node::Element(_)));
    }
}

/// Hang a completed element under the innermost open element, or make it the root
fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> SourceResult<()> {
    if let Some(parent) = stack.last_mut() {
        parent.push_element(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(SourceError::parse("document has more than one root element"));
    }
    *root = Some(element);
    Ok(())
}

fn element_from_start(start: &BytesStart, decoder: Decoder) -> SourceResult<Element> {
    let name = decoder
        .decode(start.name().as_ref())
        .map_err(|e| SourceError::parse(format!("Invalid XML element name: {e}")))?
        .into_owned();

    let mut element = Element::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| {
            SourceError::parse(format!("Malformed attribute in <{}>: {e}", element.name))
        })?;
        let key = decoder
            .decode(attr.key.as_ref())
            .map_err(|e| SourceError::parse(format!("Invalid attribute name: {e}")))?
            .into_owned();
        let value = attr
            .decode_and_unescape_value(decoder)
            .map_err(|e| SourceError::parse(format!("Invalid value for attribute '{key}': {e}")))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}
