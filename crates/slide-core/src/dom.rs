//! In-process document model.
//!
//! A [`Document`] is a cheaply clonable handle to a tree of element, text and
//! document nodes addressed by [`NodeId`]. It carries everything the widget
//! touches on a real page: attributes, the class list, inline style, a
//! host-assigned layout box per element, and event listeners (see
//! [`crate::events`]).
//!
//! Nodes are never freed; removing a node only detaches it from its parent,
//! so a [`NodeId`] stays valid for the lifetime of the document.
//!
//! # Example
//!
//! ```ignore
//! let doc = Document::new();
//! let el = doc.h("div", [("class", "panel"), ("id", "main")], Some("Hello"));
//! doc.append_child(doc.body(), el)?;
//! assert_eq!(doc.query_selector("#main"), Some(el));
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::events::Listener;
use crate::selector::{SelectorError, SelectorList};

/// Escape HTML special characters in a string.
pub fn html_escape_string(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Parse a CSS length in pixels (`"12px"`, `"12.5px"` or a bare `"0"`).
pub fn parse_px(value: &str) -> Option<f64> {
    let value = value.trim();
    if let Some(number) = value.strip_suffix("px") {
        return number.trim().parse().ok();
    }
    match value.parse::<f64>() {
        Ok(n) if n == 0.0 => Some(0.0),
        _ => None,
    }
}

/// Format a pixel length the way the DOM serializes it.
pub fn px(value: f64) -> String {
    format!("{value}px")
}

/// Identifier of a node within its [`Document`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// DOM node type, numbered as `Node.nodeType`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NodeType {
    Element = 1,
    Text = 3,
    Document = 9,
}

/// Errors raised by tree mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomError {
    #[error("node {0} does not exist in this document")]
    UnknownNode(NodeId),
    #[error("node {child} cannot be inserted into {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },
    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
}

/// Geometry assigned to an element by the host, relative to its parent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayoutBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LayoutBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// A bounding rectangle in client coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Whether the point lies inside the rectangle, edges included.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }
}

/// The set of class names on an element, in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassList(Vec<String>);

impl ClassList {
    pub fn parse(value: &str) -> Self {
        let mut list = Self::default();
        for name in value.split_whitespace() {
            list.add(name);
        }
        list
    }

    /// Add a class. Returns `false` if it was already present.
    pub fn add(&mut self, name: &str) -> bool {
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.0.push(name.to_string());
        true
    }

    /// Remove a class. Returns `false` if it was absent.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|c| c != name);
        self.0.len() != before
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|c| c == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ClassList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

/// Inline style declarations, in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Style(Vec<(String, String)>);

impl Style {
    /// Parse a `cssText` string such as `"left: 0; width: 10px;"`.
    pub fn parse(css_text: &str) -> Self {
        let mut style = Self::default();
        for declaration in css_text.split(';') {
            if let Some((name, value)) = declaration.split_once(':') {
                style.set(name, value);
            }
        }
        style
    }

    /// Set a property. An empty value removes it, like assigning `''` in the DOM.
    pub fn set(&mut self, name: &str, value: &str) {
        let name = name.trim().to_ascii_lowercase();
        let value = value.trim();
        if name.is_empty() {
            return;
        }
        if value.is_empty() {
            self.remove(&name);
            return;
        }
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.0.push((name, value.to_string())),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.0.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serialize back to `cssText`.
    pub fn css_text(&self) -> String {
        self.0
            .iter()
            .map(|(n, v)| format!("{n}: {v};"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub(crate) struct ElementData {
    pub(crate) tag: String,
    /// Attribute names in insertion order. Values for `class` and `style`
    /// live in `classes` and `style`.
    pub(crate) attributes: Vec<(String, String)>,
    pub(crate) classes: ClassList,
    pub(crate) style: Style,
}

impl ElementData {
    fn has_attribute_entry(&self, name: &str) -> bool {
        self.attributes.iter().any(|(n, _)| n == name)
    }

    fn ensure_attribute_entry(&mut self, name: &str) {
        if !self.has_attribute_entry(name) {
            self.attributes.push((name.to_string(), String::new()));
        }
    }

    pub(crate) fn attribute(&self, name: &str) -> Option<String> {
        let name = name.to_ascii_lowercase();
        let (_, raw) = self.attributes.iter().find(|(n, _)| *n == name)?;
        Some(match name.as_str() {
            "class" => self.classes.to_string(),
            "style" => self.style.css_text(),
            _ => raw.clone(),
        })
    }
}

pub(crate) enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
}

pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) layout: Option<LayoutBox>,
    pub(crate) listeners: Vec<Listener>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            layout: None,
            listeners: Vec::new(),
        }
    }

    pub(crate) fn element(&self) -> Option<&ElementData> {
        match &self.kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    fn node_type(&self) -> NodeType {
        match self.kind {
            NodeKind::Document => NodeType::Document,
            NodeKind::Element(_) => NodeType::Element,
            NodeKind::Text(_) => NodeType::Text,
        }
    }
}

pub(crate) struct DocumentInner {
    pub(crate) nodes: Vec<NodeData>,
}

impl DocumentInner {
    pub(crate) fn node(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id.0)
    }

    pub(crate) fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.node(id).and_then(NodeData::element)
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.node_mut(id).and_then(NodeData::element_mut)
    }

    pub(crate) fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub(crate) fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|p| self.element(*p).is_some())
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData::new(kind));
        id
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(p) = self.node_mut(parent) {
            p.children.retain(|c| *c != id);
        }
        if let Some(n) = self.node_mut(id) {
            n.parent = None;
        }
    }

    /// Pre-order descendants of `root`, excluding `root` itself.
    pub(crate) fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = match self.node(root) {
            Some(n) => n.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(n) = self.node(id) {
                stack.extend(n.children.iter().rev().copied());
            }
        }
        out
    }

    fn text_content(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        match &node.kind {
            NodeKind::Text(text) => out.push_str(text),
            _ => {
                for child in &node.children {
                    self.text_content(*child, out);
                }
            }
        }
    }

    fn offset_width(&self, id: NodeId) -> f64 {
        let Some(node) = self.node(id) else {
            return 0.0;
        };
        node.element()
            .and_then(|el| el.style.get("width"))
            .and_then(parse_px)
            .or_else(|| node.layout.map(|l| l.width))
            .unwrap_or(0.0)
    }

    fn offset_height(&self, id: NodeId) -> f64 {
        let Some(node) = self.node(id) else {
            return 0.0;
        };
        node.element()
            .and_then(|el| el.style.get("height"))
            .and_then(parse_px)
            .or_else(|| node.layout.map(|l| l.height))
            .unwrap_or(0.0)
    }

    /// Position of a node relative to its parent: layout origin plus inline `left`/`top`.
    fn offset_origin(&self, id: NodeId) -> (f64, f64) {
        let Some(node) = self.node(id) else {
            return (0.0, 0.0);
        };
        let layout = node.layout.unwrap_or_default();
        let shift = |prop: &str| {
            node.element()
                .and_then(|el| el.style.get(prop))
                .and_then(parse_px)
                .unwrap_or(0.0)
        };
        (layout.x + shift("left"), layout.y + shift("top"))
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        match &node.kind {
            NodeKind::Text(text) => out.push_str(&html_escape_string(text)),
            NodeKind::Document => {
                for child in &node.children {
                    self.write_html(*child, out);
                }
            }
            NodeKind::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for (name, _) in &el.attributes {
                    let value = el.attribute(name).unwrap_or_default();
                    out.push_str(&format!(" {}=\"{}\"", name, html_escape_string(&value)));
                }
                out.push('>');
                for child in &node.children {
                    self.write_html(*child, out);
                }
                out.push_str(&format!("</{}>", el.tag));
            }
        }
    }
}

const DOCUMENT_NODE: NodeId = NodeId(0);
const BODY_NODE: NodeId = NodeId(1);

/// Shared handle to a document tree.
///
/// Cloning the handle shares the tree. No method holds a borrow of the tree
/// while user code runs, so listeners may freely mutate the document they are
/// dispatched from.
#[derive(Clone)]
pub struct Document {
    pub(crate) inner: Rc<RefCell<DocumentInner>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.inner.borrow().nodes.len())
            .finish()
    }
}

impl Document {
    /// Create an empty document containing a `<body>` element.
    pub fn new() -> Self {
        let mut inner = DocumentInner { nodes: Vec::new() };
        let doc = inner.push(NodeKind::Document);
        let body = inner.push(NodeKind::Element(ElementData {
            tag: "body".into(),
            attributes: Vec::new(),
            classes: ClassList::default(),
            style: Style::default(),
        }));
        debug_assert_eq!((doc, body), (DOCUMENT_NODE, BODY_NODE));
        if let Some(n) = inner.node_mut(body) {
            n.parent = Some(doc);
        }
        if let Some(n) = inner.node_mut(doc) {
            n.children.push(body);
        }
        Self {
            inner: Rc::new(RefCell::new(inner)),
        }
    }

    /// The document node itself (the root of the tree).
    pub fn document_node(&self) -> NodeId {
        DOCUMENT_NODE
    }

    pub fn body(&self) -> NodeId {
        BODY_NODE
    }

    pub fn create_element(&self, tag: &str) -> NodeId {
        self.inner
            .borrow_mut()
            .push(NodeKind::Element(ElementData {
                tag: tag.to_ascii_lowercase(),
                attributes: Vec::new(),
                classes: ClassList::default(),
                style: Style::default(),
            }))
    }

    pub fn create_text_node(&self, text: &str) -> NodeId {
        self.inner.borrow_mut().push(NodeKind::Text(text.to_string()))
    }

    /// Create an unattached element with attributes and optional text.
    ///
    /// Attributes are applied in iteration order, so a later duplicate name
    /// overwrites an earlier one. A non-empty `text` becomes a single text
    /// node child.
    pub fn h<I, K, V>(&self, tag: &str, attributes: I, text: Option<&str>) -> NodeId
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let el = self.create_element(tag);
        for (name, value) in attributes {
            self.set_attribute(el, name.as_ref(), value.as_ref());
        }
        if let Some(text) = text.filter(|t| !t.is_empty()) {
            let node = self.create_text_node(text);
            let mut inner = self.inner.borrow_mut();
            if let Some(n) = inner.node_mut(node) {
                n.parent = Some(el);
            }
            if let Some(n) = inner.node_mut(el) {
                n.children.push(node);
            }
        }
        el
    }

    pub fn exists(&self, id: NodeId) -> bool {
        self.inner.borrow().node(id).is_some()
    }

    pub fn node_type(&self, id: NodeId) -> Option<NodeType> {
        self.inner.borrow().node(id).map(NodeData::node_type)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.node_type(id) == Some(NodeType::Element)
    }

    pub fn tag_name(&self, id: NodeId) -> Option<String> {
        self.inner.borrow().element(id).map(|el| el.tag.clone())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.inner.borrow().parent(id)
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.inner
            .borrow()
            .node(id)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.inner
            .borrow()
            .node(id)
            .and_then(|n| n.children.first().copied())
    }

    /// Whether the node is attached to this document's tree.
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.inner.borrow().is_inclusive_ancestor(DOCUMENT_NODE, id)
    }

    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<NodeId, DomError> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` into `parent` before `reference`, or at the end when
    /// `reference` is `None`. The child is first detached from any previous
    /// parent.
    pub fn insert_before(
        &self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<NodeId, DomError> {
        let mut inner = self.inner.borrow_mut();
        let parent_node = inner.node(parent).ok_or(DomError::UnknownNode(parent))?;
        if matches!(parent_node.kind, NodeKind::Text(_)) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        let child_node = inner.node(child).ok_or(DomError::UnknownNode(child))?;
        if matches!(child_node.kind, NodeKind::Document)
            || inner.is_inclusive_ancestor(child, parent)
        {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        let mut reference = reference;
        if let Some(r) = reference {
            if inner.parent(r) != Some(parent) {
                return Err(DomError::NotAChild { parent, child: r });
            }
            if r == child {
                let siblings = &parent_node.children;
                reference = siblings
                    .iter()
                    .position(|c| *c == child)
                    .and_then(|i| siblings.get(i + 1).copied());
            }
        }
        inner.detach(child);
        let Some(p) = inner.node_mut(parent) else {
            return Err(DomError::UnknownNode(parent));
        };
        let index = reference
            .and_then(|r| p.children.iter().position(|c| *c == r))
            .unwrap_or(p.children.len());
        p.children.insert(index, child);
        if let Some(c) = inner.node_mut(child) {
            c.parent = Some(parent);
        }
        Ok(child)
    }

    pub fn remove_child(&self, parent: NodeId, child: NodeId) -> Result<NodeId, DomError> {
        let mut inner = self.inner.borrow_mut();
        if inner.node(parent).is_none() {
            return Err(DomError::UnknownNode(parent));
        }
        if inner.parent(child) != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }
        inner.detach(child);
        Ok(child)
    }

    /// Detach a node from its parent, if it has one.
    pub fn remove(&self, id: NodeId) {
        self.inner.borrow_mut().detach(id);
    }

    /// Concatenated text of the node and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.inner.borrow().text_content(id, &mut out);
        out
    }

    /// Replace all children with a single text node (none if `text` is empty).
    pub fn set_text_content(&self, id: NodeId, text: &str) {
        let mut inner = self.inner.borrow_mut();
        let Some(node) = inner.node_mut(id) else {
            return;
        };
        if let NodeKind::Text(current) = &mut node.kind {
            *current = text.to_string();
            return;
        }
        // A lone text child is rewritten in place; the arena never frees nodes.
        let only = match node.children[..] {
            [only] if !text.is_empty() => Some(only),
            _ => None,
        };
        if let Some(only) = only {
            if let Some(NodeData {
                kind: NodeKind::Text(current),
                ..
            }) = inner.node_mut(only)
            {
                *current = text.to_string();
                return;
            }
        }
        let Some(node) = inner.node_mut(id) else {
            return;
        };
        let old = std::mem::take(&mut node.children);
        for child in old {
            if let Some(c) = inner.node_mut(child) {
                c.parent = None;
            }
        }
        if !text.is_empty() {
            let node = inner.push(NodeKind::Text(text.to_string()));
            if let Some(n) = inner.node_mut(node) {
                n.parent = Some(id);
            }
            if let Some(n) = inner.node_mut(id) {
                n.children.push(node);
            }
        }
    }

    pub fn set_attribute(&self, id: NodeId, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        let mut inner = self.inner.borrow_mut();
        let Some(el) = inner.element_mut(id) else {
            return;
        };
        match name.as_str() {
            "class" => {
                el.classes = ClassList::parse(value);
                el.ensure_attribute_entry("class");
            }
            "style" => {
                el.style = Style::parse(value);
                el.ensure_attribute_entry("style");
            }
            _ => match el.attributes.iter_mut().find(|(n, _)| *n == name) {
                Some(entry) => entry.1 = value.to_string(),
                None => el.attributes.push((name, value.to_string())),
            },
        }
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<String> {
        self.inner.borrow().element(id)?.attribute(name)
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.get_attribute(id, name).is_some()
    }

    pub fn remove_attribute(&self, id: NodeId, name: &str) {
        let name = name.to_ascii_lowercase();
        let mut inner = self.inner.borrow_mut();
        let Some(el) = inner.element_mut(id) else {
            return;
        };
        el.attributes.retain(|(n, _)| *n != name);
        match name.as_str() {
            "class" => el.classes = ClassList::default(),
            "style" => el.style = Style::default(),
            _ => {}
        }
    }

    pub fn class_list(&self, id: NodeId) -> Option<ClassList> {
        self.inner.borrow().element(id).map(|el| el.classes.clone())
    }

    pub fn add_class(&self, id: NodeId, name: &str) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(el) = inner.element_mut(id) else {
            return false;
        };
        el.ensure_attribute_entry("class");
        el.classes.add(name)
    }

    pub fn remove_class(&self, id: NodeId, name: &str) -> bool {
        self.inner
            .borrow_mut()
            .element_mut(id)
            .is_some_and(|el| el.classes.remove(name))
    }

    pub fn has_class(&self, id: NodeId, name: &str) -> bool {
        self.inner
            .borrow()
            .element(id)
            .is_some_and(|el| el.classes.contains(name))
    }

    pub fn css_text(&self, id: NodeId) -> String {
        self.inner
            .borrow()
            .element(id)
            .map(|el| el.style.css_text())
            .unwrap_or_default()
    }

    /// Replace the whole inline style, like assigning `style.cssText`.
    pub fn set_css_text(&self, id: NodeId, css_text: &str) {
        let mut inner = self.inner.borrow_mut();
        if let Some(el) = inner.element_mut(id) {
            el.style = Style::parse(css_text);
            el.ensure_attribute_entry("style");
        }
    }

    pub fn style_property(&self, id: NodeId, name: &str) -> Option<String> {
        self.inner
            .borrow()
            .element(id)
            .and_then(|el| el.style.get(name).map(str::to_string))
    }

    /// Set one inline style property; an empty value removes it.
    pub fn set_style_property(&self, id: NodeId, name: &str, value: &str) {
        let mut inner = self.inner.borrow_mut();
        if let Some(el) = inner.element_mut(id) {
            el.style.set(name, value);
            el.ensure_attribute_entry("style");
        }
    }

    /// Assign the element's layout box (what a layout engine would compute).
    pub fn set_layout(&self, id: NodeId, layout: LayoutBox) {
        if let Some(n) = self.inner.borrow_mut().node_mut(id) {
            n.layout = Some(layout);
        }
    }

    pub fn layout(&self, id: NodeId) -> Option<LayoutBox> {
        self.inner.borrow().node(id).and_then(|n| n.layout)
    }

    /// Rendered width: an inline `px` width wins over the layout box.
    pub fn offset_width(&self, id: NodeId) -> f64 {
        self.inner.borrow().offset_width(id)
    }

    pub fn offset_height(&self, id: NodeId) -> f64 {
        self.inner.borrow().offset_height(id)
    }

    /// Client rectangle of an element, accumulating ancestor origins and
    /// inline `left`/`top` offsets.
    pub fn bounding_client_rect(&self, id: NodeId) -> Option<Rect> {
        let inner = self.inner.borrow();
        inner.element(id)?;
        let (mut left, mut top) = (0.0, 0.0);
        let mut current = Some(id);
        while let Some(node) = current {
            let (dx, dy) = inner.offset_origin(node);
            left += dx;
            top += dy;
            current = inner.parent(node);
        }
        Some(Rect {
            left,
            top,
            right: left + inner.offset_width(id),
            bottom: top + inner.offset_height(id),
        })
    }

    /// Serialize a node and its subtree to HTML.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.inner.borrow().write_html(id, &mut out);
        out
    }

    /// First element in document order matching `selectors`, or an error if
    /// the selector is malformed.
    pub fn try_query_selector(&self, selectors: &str) -> Result<Option<NodeId>, SelectorError> {
        let list = SelectorList::parse(selectors)?;
        let inner = self.inner.borrow();
        Ok(inner
            .descendants(DOCUMENT_NODE)
            .into_iter()
            .find(|id| list.matches(&inner, *id)))
    }

    /// First element in document order matching `selectors`.
    ///
    /// A malformed selector is logged and treated as matching nothing.
    pub fn query_selector(&self, selectors: &str) -> Option<NodeId> {
        match self.try_query_selector(selectors) {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!("invalid selector {:?}: {}", selectors, err);
                None
            }
        }
    }

    /// Every element in document order matching `selectors`.
    pub fn query_selector_all(&self, selectors: &str) -> Vec<NodeId> {
        let list = match SelectorList::parse(selectors) {
            Ok(list) => list,
            Err(err) => {
                tracing::warn!("invalid selector {:?}: {}", selectors, err);
                return Vec::new();
            }
        };
        let inner = self.inner.borrow();
        inner
            .descendants(DOCUMENT_NODE)
            .into_iter()
            .filter(|id| list.matches(&inner, *id))
            .collect()
    }
}
