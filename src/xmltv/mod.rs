//! XMLTV document handling
//!
//! An owned element tree ([`Element`]) built from a quick-xml event stream and
//! rendered back to text. The tree keeps attribute and child order so a guide can
//! be filtered and re-serialized without disturbing the parts it does not touch.

pub mod element;
pub mod parser;
pub mod writer;

pub use element::{Element, Node};
pub use parser::parse_document;
pub use writer::write_document;

/// Root element of every XMLTV document
pub const TV: &str = "tv";
pub const CHANNEL: &str = "channel";
pub const PROGRAMME: &str = "programme";
