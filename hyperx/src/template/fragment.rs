//! Owned HTML fragment model
//!
//! Markup is parsed with `html5ever` in template-contents mode and copied
//! into a small owned tree of [`Node`]s that can be cloned, partitioned,
//! mutated and serialized back without a live DOM. `<template>` contents
//! are stored as the element's ordinary children, so serializing a template
//! reproduces its `innerHTML`.
//!
//! Serialization goes through html5ever's [`HtmlSerializer`](html5ever::serialize)
//! by implementing [`Serialize`] for the owned tree, so void elements, raw
//! text elements and escaping follow the HTML fragment serialization rules.

use std::io;

use html5ever::serialize::{serialize, Serialize, SerializeOpts, Serializer, TraversalScope};
use html5ever::tendril::TendrilSink;
use html5ever::{parse_fragment, LocalName, Namespace, ParseOpts, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

fn html_name(tag: &str) -> QualName {
    QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(tag))
}

/// A node in a parsed fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// An element with attributes and children
    Element(Element),
    /// A text node
    Text(String),
    /// A comment
    Comment(String),
}

impl Node {
    /// The element, if this node is one
    #[must_use]
    pub const fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Serialize this node
    #[must_use]
    pub fn to_html(&self) -> String {
        to_markup(self, TraversalScope::IncludeNode)
    }
}

/// An HTML element
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Lowercase tag name
    pub tag: String,
    /// Attributes in source order
    pub attrs: Vec<(String, String)>,
    /// Child nodes (template contents for `<template>`)
    pub children: Vec<Node>,
}

impl Element {
    /// Create an empty element
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Get an attribute value
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Whether the attribute is present
    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Set (or overwrite) an attribute
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into().to_ascii_lowercase();
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    /// Remove an attribute, returning its previous value
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let idx = self.attrs.iter().position(|(n, _)| n.eq_ignore_ascii_case(name))?;
        Some(self.attrs.remove(idx).1)
    }

    /// The `id` attribute
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attr("id").filter(|id| !id.is_empty())
    }

    /// Whether this is a `<template>` element
    #[must_use]
    pub fn is_template(&self) -> bool {
        self.tag == "template"
    }

    /// Child elements, skipping text and comments
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Hide the element with an inline `display:none`, keeping other styles
    pub fn hide(&mut self) {
        let style = self.attr("style").unwrap_or_default().trim().trim_end_matches(';');
        if style.split(';').any(|decl| decl.replace(' ', "") == "display:none") {
            return;
        }
        let hidden = if style.is_empty() {
            "display:none".to_string()
        } else {
            format!("{style};display:none")
        };
        self.set_attr("style", hidden);
    }

    /// Serialize the element including its own tag
    #[must_use]
    pub fn outer_html(&self) -> String {
        to_markup(self, TraversalScope::IncludeNode)
    }

    /// Serialize the element's children
    #[must_use]
    pub fn inner_html(&self) -> String {
        to_markup(self, TraversalScope::ChildrenOnly(Some(html_name(&self.tag))))
    }

    /// Replace the children with parsed markup
    pub fn set_inner_html(&mut self, markup: &str) {
        self.children = Fragment::parse(markup).nodes;
    }

    /// Concatenated text of all descendant text nodes
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// Depth-first search among descendants (not including `self`)
    #[must_use]
    pub fn find_descendant(&self, pred: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        find_in(&self.children, pred)
    }

    /// Visit every descendant element mutably, depth-first
    pub fn walk_descendants_mut(&mut self, f: &mut dyn FnMut(&mut Element)) {
        walk_mut(&mut self.children, f);
    }

    /// Collect every descendant element matching `pred`, depth-first
    #[must_use]
    pub fn descendants_matching(&self, pred: &dyn Fn(&Element) -> bool) -> Vec<&Element> {
        let mut out = Vec::new();
        collect_matching(&self.children, pred, &mut out);
        out
    }
}

/// A parsed sequence of sibling nodes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fragment {
    /// Top-level nodes
    pub nodes: Vec<Node>,
}

impl Fragment {
    /// Parse markup as template contents
    ///
    /// Parsing never fails; malformed markup is repaired the way a browser
    /// would repair it.
    #[must_use]
    pub fn parse(markup: &str) -> Self {
        let context = QualName::new(
            None,
            Namespace::from(HTML_NAMESPACE),
            LocalName::from("template"),
        );
        let dom = parse_fragment(RcDom::default(), ParseOpts::default(), context, Vec::new())
            .one(markup);

        let mut nodes = Vec::new();
        for child in dom.document.children.borrow().iter() {
            match &child.data {
                NodeData::Element { name, .. } if &*name.local == "html" => {
                    nodes.extend(convert_children(child));
                }
                _ => nodes.extend(convert(child)),
            }
        }
        Self { nodes }
    }

    /// Build a fragment from existing nodes
    #[must_use]
    pub const fn from_nodes(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Serialize the fragment
    #[must_use]
    pub fn to_html(&self) -> String {
        to_markup(self, TraversalScope::ChildrenOnly(None))
    }

    /// Top-level elements
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.nodes.iter().filter_map(Node::as_element)
    }

    /// Whether the fragment has no nodes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First element (depth-first) matching `pred`
    #[must_use]
    pub fn find(&self, pred: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        find_in(&self.nodes, pred)
    }

    /// Every element (depth-first) matching `pred`
    #[must_use]
    pub fn find_all(&self, pred: &dyn Fn(&Element) -> bool) -> Vec<&Element> {
        let mut out = Vec::new();
        collect_matching(&self.nodes, pred, &mut out);
        out
    }

    /// Element with the given `id`
    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        self.find(&|el| el.id() == Some(id))
    }

    /// Index path to the first element matching `pred`
    ///
    /// Each entry indexes into the children of the previous step, starting
    /// at the fragment's top-level nodes.
    #[must_use]
    pub fn locate(&self, pred: &dyn Fn(&Element) -> bool) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        locate_in(&self.nodes, pred, &mut path).then_some(path)
    }

    /// Mutable element at an index path produced by [`Fragment::locate`]
    pub fn element_at_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let (first, rest) = path.split_first()?;
        let mut current = match self.nodes.get_mut(*first)? {
            Node::Element(el) => el,
            _ => return None,
        };
        for idx in rest {
            current = match current.children.get_mut(*idx)? {
                Node::Element(el) => el,
                _ => return None,
            };
        }
        Some(current)
    }

    /// The sibling list containing the node at `path`, with its index
    pub fn siblings_at_mut(&mut self, path: &[usize]) -> Option<(&mut Vec<Node>, usize)> {
        let (last, parents) = path.split_last()?;
        if parents.is_empty() {
            return Some((&mut self.nodes, *last));
        }
        let parent = self.element_at_mut(parents)?;
        Some((&mut parent.children, *last))
    }

    /// Visit every element mutably, depth-first
    pub fn walk_mut(&mut self, f: &mut dyn FnMut(&mut Element)) {
        walk_mut(&mut self.nodes, f);
    }
}

impl std::fmt::Display for Fragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_html())
    }
}

fn convert_children(handle: &Handle) -> Vec<Node> {
    handle.children.borrow().iter().filter_map(convert).collect()
}

fn convert(handle: &Handle) -> Option<Node> {
    match &handle.data {
        NodeData::Text { contents } => Some(Node::Text(contents.borrow().to_string())),
        NodeData::Comment { contents } => Some(Node::Comment(contents.to_string())),
        NodeData::Element {
            name,
            attrs,
            template_contents,
            ..
        } => {
            let attrs = attrs
                .borrow()
                .iter()
                .map(|a| (a.name.local.to_string(), a.value.to_string()))
                .collect();
            let children = template_contents
                .borrow()
                .as_ref()
                .map_or_else(|| convert_children(handle), convert_children);
            Some(Node::Element(Element {
                tag: name.local.to_string(),
                attrs,
                children,
            }))
        }
        _ => None,
    }
}

fn find_in<'a>(nodes: &'a [Node], pred: &dyn Fn(&Element) -> bool) -> Option<&'a Element> {
    for node in nodes {
        if let Node::Element(el) = node {
            if pred(el) {
                return Some(el);
            }
            if let Some(found) = find_in(&el.children, pred) {
                return Some(found);
            }
        }
    }
    None
}

fn collect_matching<'a>(nodes: &'a [Node], pred: &dyn Fn(&Element) -> bool, out: &mut Vec<&'a Element>) {
    for node in nodes {
        if let Node::Element(el) = node {
            if pred(el) {
                out.push(el);
            }
            collect_matching(&el.children, pred, out);
        }
    }
}

fn locate_in(nodes: &[Node], pred: &dyn Fn(&Element) -> bool, path: &mut Vec<usize>) -> bool {
    for (idx, node) in nodes.iter().enumerate() {
        if let Node::Element(el) = node {
            path.push(idx);
            if pred(el) || locate_in(&el.children, pred, path) {
                return true;
            }
            path.pop();
        }
    }
    false
}

fn walk_mut(nodes: &mut [Node], f: &mut dyn FnMut(&mut Element)) {
    for node in nodes {
        if let Node::Element(el) = node {
            f(el);
            walk_mut(&mut el.children, f);
        }
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => collect_text(&el.children, out),
            Node::Comment(_) => {}
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(
        &self,
        serializer: &mut S,
        traversal_scope: TraversalScope,
    ) -> io::Result<()> {
        match self {
            Self::Element(el) => el.serialize(serializer, traversal_scope),
            Self::Text(text) => serializer.write_text(text),
            Self::Comment(text) => serializer.write_comment(text),
        }
    }
}

impl Serialize for Element {
    fn serialize<S: Serializer>(
        &self,
        serializer: &mut S,
        traversal_scope: TraversalScope,
    ) -> io::Result<()> {
        if matches!(traversal_scope, TraversalScope::ChildrenOnly(_)) {
            return serialize_children(&self.children, serializer);
        }

        let name = html_name(&self.tag);
        let attrs: Vec<(QualName, &str)> = self
            .attrs
            .iter()
            .map(|(attr, value)| {
                (
                    QualName::new(None, Namespace::from(""), LocalName::from(attr.as_str())),
                    value.as_str(),
                )
            })
            .collect();

        serializer.start_elem(name.clone(), attrs.iter().map(|(attr, value)| (attr, *value)))?;
        serialize_children(&self.children, serializer)?;
        serializer.end_elem(name)
    }
}

impl Serialize for Fragment {
    fn serialize<S: Serializer>(
        &self,
        serializer: &mut S,
        traversal_scope: TraversalScope,
    ) -> io::Result<()> {
        match traversal_scope {
            TraversalScope::ChildrenOnly(_) => serialize_children(&self.nodes, serializer),
            TraversalScope::IncludeNode => {
                for node in &self.nodes {
                    node.serialize(serializer, TraversalScope::IncludeNode)?;
                }
                Ok(())
            }
        }
    }
}

fn serialize_children<S: Serializer>(nodes: &[Node], serializer: &mut S) -> io::Result<()> {
    for node in nodes {
        node.serialize(serializer, TraversalScope::IncludeNode)?;
    }
    Ok(())
}

// Writes into a Vec<u8> only fail on allocation, which aborts.
fn to_markup<T: Serialize>(node: &T, traversal_scope: TraversalScope) -> String {
    let mut buf = Vec::new();
    let opts = SerializeOpts {
        traversal_scope,
        ..SerializeOpts::default()
    };
    if let Err(err) = serialize(&mut buf, node, opts) {
        tracing::error!(error = %err, "HTML serialization failed");
    }
    String::from_utf8_lossy(&buf).into_owned()
}
