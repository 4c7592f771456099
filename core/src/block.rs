//! The block as authored by the CMS and the live subtree it is decorated into.

use std::fmt::{self, Write};

use serde::{Deserialize, Serialize};

use crate::markup::{Element, Node, escape_attribute, write_node};

/// `data-*` attributes the authoring tool may place on the block or on one of
/// its descendants. Values are kept as authored strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataAttributes {
    pub src: Option<String>,
    pub title: Option<String>,
    pub autoplay: Option<String>,
    pub background: Option<String>,
}

/// Static preview image authored inside the block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Picture {
    pub src: String,
    #[serde(default)]
    pub alt: String,
}

impl Picture {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            alt: String::new(),
        }
    }

    pub fn to_element(&self) -> Element {
        Element::new("picture").child(
            Element::new("img")
                .attr("src", self.src.clone())
                .attr("alt", self.alt.clone())
                .attr("loading", "lazy"),
        )
    }
}

/// Read-only view of an authored block, as handed over by the CMS
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlockContent {
    /// Optional label hosts use to tell blocks apart
    pub name: Option<String>,
    /// Authored class list, e.g. `["video", "autoplay"]`
    pub classes: Vec<String>,
    /// Attributes on the block element itself
    pub dataset: DataAttributes,
    /// Attributes found on descendants, in document order
    pub descendants: Vec<DataAttributes>,
    /// `href` of the first link element, as authored
    pub link: Option<String>,
    pub picture: Option<Picture>,
    /// Full text content of the block
    pub text: String,
    /// URL of the page the block lives on
    pub page_url: Option<String>,
}

impl BlockContent {
    pub fn new() -> Self {
        Self {
            classes: vec!["video".to_string()],
            ..Default::default()
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.has_class(&class) {
            self.classes.push(class);
        }
        self
    }

    pub fn with_link(mut self, href: impl Into<String>) -> Self {
        let href = href.into();
        // a link's text content is its href unless authored otherwise
        if self.text.is_empty() {
            self.text = href.clone();
        }
        self.link = Some(href);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_picture(mut self, picture: Picture) -> Self {
        self.picture = Some(picture);
        self
    }

    pub fn with_data(mut self, dataset: DataAttributes) -> Self {
        self.dataset = dataset;
        self
    }

    pub fn with_page_url(mut self, url: impl Into<String>) -> Self {
        self.page_url = Some(url.into());
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Remove a class marker, returning whether it was present
    pub fn remove_class(&mut self, class: &str) -> bool {
        let before = self.classes.len();
        self.classes.retain(|c| c != class);
        before != self.classes.len()
    }

    /// First value of a data attribute: the block's own, then descendants'
    pub fn data_value<'a>(
        &'a self,
        pick: impl Fn(&'a DataAttributes) -> Option<&'a String>,
    ) -> Option<&'a str> {
        pick(&self.dataset)
            .or_else(|| self.descendants.iter().find_map(&pick))
            .map(String::as_str)
    }
}

/// The live subtree a block is decorated into.
///
/// `embed_loaded` mirrors the `data-embed-loaded` flag: `None` until the
/// decorator found a reference, then `false` until the attached embed reports
/// readiness.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    classes: Vec<String>,
    children: Vec<Node>,
    embed_loaded: Option<bool>,
}

impl Block {
    pub fn new(classes: Vec<String>) -> Self {
        Self {
            classes,
            children: Vec::new(),
            embed_loaded: None,
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn append(&mut self, node: impl Into<Node>) {
        self.children.push(node.into());
    }

    /// Remove every direct child element carrying `class`
    pub fn remove_children_with_class(&mut self, class: &str) -> usize {
        let before = self.children.len();
        self.children
            .retain(|node| !node.as_element().is_some_and(|el| el.has_class(class)));
        before - self.children.len()
    }

    pub fn embed_loaded(&self) -> bool {
        self.embed_loaded == Some(true)
    }

    pub fn embed_loaded_flag(&self) -> Option<bool> {
        self.embed_loaded
    }

    pub fn set_embed_loaded(&mut self, loaded: bool) {
        self.embed_loaded = Some(loaded);
    }

    pub fn find(&self, predicate: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        self.children
            .iter()
            .filter_map(Node::as_element)
            .find_map(|el| el.find(predicate))
    }

    pub fn find_mut(&mut self, predicate: &dyn Fn(&Element) -> bool) -> Option<&mut Element> {
        for child in &mut self.children {
            if let Node::Element(element) = child {
                if let Some(found) = element.find_mut(predicate) {
                    return Some(found);
                }
            }
        }
        None
    }

    pub fn find_tag(&self, tag: &str) -> Option<&Element> {
        self.find(&|el| el.tag() == tag)
    }

    pub fn count_tag(&self, tag: &str) -> usize {
        fn count(el: &Element, tag: &str) -> usize {
            let own = usize::from(el.tag() == tag);
            own + el
                .children()
                .iter()
                .filter_map(Node::as_element)
                .map(|child| count(child, tag))
                .sum::<usize>()
        }
        self.children
            .iter()
            .filter_map(Node::as_element)
            .map(|el| count(el, tag))
            .sum()
    }

    /// Serialize the block and its subtree
    pub fn to_html(&self) -> String {
        self.to_string()
    }

    /// Markup of the children only
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            // writing into a String never fails
            let _ = write_node(child, &mut out);
        }
        out
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<div")?;
        if !self.classes.is_empty() {
            write!(f, " class=\"{}\"", escape_attribute(&self.classes.join(" ")))?;
        }
        if let Some(loaded) = self.embed_loaded {
            write!(f, " data-embed-loaded=\"{}\"", loaded)?;
        }
        f.write_char('>')?;
        for child in &self.children {
            write_node(child, f)?;
        }
        f.write_str("</div>")
    }
}
