use std::fmt::{self, Write};

/// Elements that never carry children or a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// A node in a markup tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }
}

/// A single HTML element with ordered attributes.
///
/// Attributes without a value are boolean attributes (`controls`,
/// `allowfullscreen`) and render as a bare name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, Option<String>)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder form of [`Element::set_attr`]
    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder form of [`Element::set_flag`]
    pub fn flag(mut self, name: &str) -> Self {
        self.set_flag(name);
        self
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn push(&mut self, node: impl Into<Node>) {
        self.children.push(node.into());
    }

    /// Set an attribute, replacing an existing value in place
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = Some(value.into());
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn set_flag(&mut self, name: &str) {
        if !self.has_attr(name) {
            self.attributes.push((name.to_string(), None));
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attributes.retain(|(key, _)| key != name);
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.iter().any(|(key, _)| key == name)
    }

    /// Value of an attribute; boolean attributes yield an empty string
    pub fn attr_value(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_deref().unwrap_or(""))
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr_value("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// Depth-first search over this element and its descendants
    pub fn find(&self, predicate: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        if predicate(self) {
            return Some(self);
        }
        self.children
            .iter()
            .filter_map(Node::as_element)
            .find_map(|child| child.find(predicate))
    }

    pub fn find_mut(&mut self, predicate: &dyn Fn(&Element) -> bool) -> Option<&mut Element> {
        if predicate(self) {
            return Some(self);
        }
        for child in &mut self.children {
            if let Node::Element(element) = child {
                if let Some(found) = element.find_mut(predicate) {
                    return Some(found);
                }
            }
        }
        None
    }

    fn write_html(&self, out: &mut impl Write) -> fmt::Result {
        write!(out, "<{}", self.tag)?;
        for (name, value) in &self.attributes {
            match value {
                Some(value) => write!(out, " {}=\"{}\"", name, escape_attribute(value))?,
                None => write!(out, " {}", name)?,
            }
        }
        out.write_char('>')?;
        if VOID_ELEMENTS.contains(&self.tag.as_str()) {
            return Ok(());
        }
        for child in &self.children {
            write_node(child, out)?;
        }
        write!(out, "</{}>", self.tag)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_html(f)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(self, f)
    }
}

pub(crate) fn write_node(node: &Node, out: &mut impl Write) -> fmt::Result {
    match node {
        Node::Element(element) => element.write_html(out),
        Node::Text(text) => out.write_str(&escape_text(text)),
    }
}

fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub(crate) fn escape_attribute(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_and_valued_attributes() {
        let video = Element::new("video")
            .flag("controls")
            .child(Element::new("source").attr("src", "clip.mp4").attr("type", "video/mp4"));

        assert_eq!(
            video.to_string(),
            r#"<video controls><source src="clip.mp4" type="video/mp4"></video>"#
        );
    }

    #[test]
    fn test_set_attr_replaces_in_place() {
        let mut el = Element::new("iframe").attr("src", "a").attr("title", "t");
        el.set_attr("src", "b");
        assert_eq!(el.to_string(), r#"<iframe src="b" title="t"></iframe>"#);

        el.remove_attr("title");
        assert!(!el.has_attr("title"));
    }

    #[test]
    fn test_escaping() {
        let el = Element::new("div")
            .attr("title", r#"say "hi" & <bye>"#)
            .text("1 < 2 & 3");
        assert_eq!(
            el.to_string(),
            r#"<div title="say &quot;hi&quot; &amp; &lt;bye&gt;">1 &lt; 2 &amp; 3</div>"#
        );
    }

    #[test]
    fn test_find_nested() {
        let tree = Element::new("div").attr("class", "outer wrap").child(
            Element::new("div").child(Element::new("iframe").attr("src", "x")),
        );

        assert!(tree.has_class("wrap"));
        let iframe = tree.find(&|e| e.tag() == "iframe").unwrap();
        assert_eq!(iframe.attr_value("src"), Some("x"));
        assert!(tree.find(&|e| e.tag() == "video").is_none());
    }
}
