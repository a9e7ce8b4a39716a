//! Owned XML element tree
//!
//! Children are held by value, so re-parenting a node is a move out of one
//! element's `children` into another's; the old parent is consumed in the process.

/// A node inside an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    /// Attributes in document order; values are unescaped
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attribute<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// Builder-style child element append
    pub fn with_child(mut self, child: Element) -> Self {
        self.push_element(child);
        self
    }

    /// Builder-style text append
    pub fn with_text<S: Into<String>>(mut self, text: S) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing the value in place when it already exists
    pub fn set_attribute<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn push_element(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Move every child node out of this element, leaving it empty
    pub fn take_children(&mut self) -> Vec<Node> {
        std::mem::take(&mut self.children)
    }

    /// Direct child elements in document order
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Direct child elements with the given tag name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.child_elements().filter(move |element| element.name == name)
    }

    /// Concatenated text and CDATA directly under this element
    #[cfg(test)]
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) | Node::CData(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_attribute_replaces_in_place() {
        let mut element = Element::new("programme")
            .with_attribute("start", "20240101000000 +0000")
            .with_attribute("channel", "1");
        element.set_attribute("start", "20240101010000 +0000");

        assert_eq!(
            element.attributes,
            vec![
                ("start".to_string(), "20240101010000 +0000".to_string()),
                ("channel".to_string(), "1".to_string()),
            ]
        );
        assert_eq!(element.attribute("channel"), Some("1"));
        assert_eq!(element.attribute("stop"), None);
    }

    #[test]
    fn test_take_children_moves_nodes() {
        let mut channel = Element::new("channel")
            .with_child(Element::new("display-name").with_text("BBC One"))
            .with_child(Element::new("icon").with_attribute("src", "http://x/bbc.png"));

        let children = channel.take_children();
        assert_eq!(children.len(), 2);
        assert!(channel.children.is_empty());
    }

    #[test]
    fn test_children_named_and_text() {
        let tv = Element::new("tv")
            .with_child(Element::new("channel").with_attribute("id", "1"))
            .with_child(Element::new("programme").with_attribute("channel", "1"))
            .with_child(Element::new("channel").with_attribute("id", "2"));

        let ids: Vec<_> = tv
            .children_named("channel")
            .filter_map(|c| c.attribute("id"))
            .collect();
        assert_eq!(ids, vec!["1", "2"]);

        let title = Element::new("title").with_text("News at ").with_text("Ten");
        assert_eq!(title.text(), "News at Ten");
    }
}
