//! This module contains functions and types for parsing HTML into a custom DOM tree
//! and for writing that tree back out as HTML.
//!
//! It uses html5ever as the HTML parser and builds a DOM tree defined in the
//! `crate::dom::dom_tree` module.

use crate::dom::dom_tree::{self, Handle, Node};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{
    interface::{ElemName, ElementFlags, NodeOrText, QuirksMode, TreeSink},
    Attribute, LocalName, Namespace, QualName,
};
use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

/// A list of void (self-closing) elements in HTML.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose text content is written without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "style", "script", "xmp", "iframe", "noembed", "noframes", "plaintext",
];

/// Creates a DOM tree from the provided HTML content.
///
/// # Arguments
///
/// * `html_content` - A string slice containing the HTML to parse.
///
/// # Returns
///
/// A `dom_tree::Document` representing the parsed HTML.
pub fn create_dom_tree(html_content: &str) -> dom_tree::Document {
    let tree_sink = MailTreeSink::new();
    html5ever::parse_document(tree_sink, Default::default()).one(html_content.to_string())
}

/// Serializes a Document, including its DOCTYPE, back to HTML.
///
/// Attribute order is preserved; whitespace is written exactly as parsed.
pub fn serialize_document(document: &dom_tree::Document) -> String {
    let mut output = String::new();
    if let Some(doctype) = &*document.doctype.borrow() {
        output.push_str("<!DOCTYPE ");
        output.push_str(&doctype.name);
        output.push('>');
    }
    serialize_node(&document.root.borrow(), false, &mut output);
    output
}

fn serialize_node(node: &Node, raw_text: bool, output: &mut String) {
    match node {
        Node::DocumentRoot(root) => {
            for child in &root.children {
                serialize_node(&child.borrow(), false, output);
            }
        }
        Node::Element(elem) => {
            output.push('<');
            output.push_str(&elem.tag);
            for (k, v) in &elem.attributes {
                output.push(' ');
                output.push_str(k);
                output.push_str("=\"");
                escape_into(v, true, output);
                output.push('"');
            }
            output.push('>');

            let tag = elem.tag.to_ascii_lowercase();
            if VOID_ELEMENTS.contains(&tag.as_str()) {
                return;
            }
            let raw = RAW_TEXT_ELEMENTS.contains(&tag.as_str());
            for child in &elem.children {
                serialize_node(&child.borrow(), raw, output);
            }
            output.push_str("</");
            output.push_str(&elem.tag);
            output.push('>');
        }
        Node::Text(text) if raw_text => output.push_str(text),
        Node::Text(text) => escape_into(text, false, output),
        Node::Comment(text) => {
            output.push_str("<!--");
            output.push_str(text);
            output.push_str("-->");
        }
    }
}

fn escape_into(text: &str, attribute: bool, output: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            '"' if attribute => output.push_str("&quot;"),
            '<' if !attribute => output.push_str("&lt;"),
            '>' if !attribute => output.push_str("&gt;"),
            c => output.push(c),
        }
    }
}

/// A custom TreeSink for building the DOM tree used by the parser.
///
/// It holds the Document being built and the current quirks mode.
pub struct MailTreeSink {
    document: dom_tree::Document,
    quirks_mode: RefCell<QuirksMode>,
}

impl Default for MailTreeSink {
    fn default() -> Self {
        Self::new()
    }
}

impl MailTreeSink {
    /// Creates a new `MailTreeSink` with an empty document.
    pub fn new() -> Self {
        Self {
            document: dom_tree::new_document(),
            quirks_mode: RefCell::new(QuirksMode::NoQuirks),
        }
    }

    pub fn quirks_mode(&self) -> QuirksMode {
        *self.quirks_mode.borrow()
    }

    fn make_node(child: NodeOrText<Handle>) -> Handle {
        match child {
            NodeOrText::AppendNode(node) => node,
            NodeOrText::AppendText(text) => Rc::new(RefCell::new(Node::Text(text.to_string()))),
        }
    }

    /// Inserts `child` into `parent` at `index` (or at the end), merging
    /// adjacent text the way html5ever expects a sink to.
    fn insert_child(parent: &Handle, index: Option<usize>, child: NodeOrText<Handle>) {
        let mut parent_borrow = parent.borrow_mut();
        let Some(children) = parent_borrow.children_mut() else {
            // Text and comment nodes cannot have children.
            return;
        };
        let position = index.unwrap_or(children.len());
        if let NodeOrText::AppendText(ref text) = child {
            if let Some(prev) = position.checked_sub(1).and_then(|i| children.get(i)) {
                if let Node::Text(ref mut existing) = *prev.borrow_mut() {
                    existing.push_str(text);
                    return;
                }
            }
        }
        let node = Self::make_node(child);
        children.insert(position, node.clone());
        drop(parent_borrow);
        dom_tree::set_parent(&node, Some(parent));
    }
}

/// A simple implementation of the `ElemName` trait for our elements.
#[derive(Debug)]
pub struct MailElemName {
    ns: Namespace,
    local: LocalName,
}

impl ElemName for MailElemName {
    /// Returns a reference to the local name of the element.
    fn local_name(&self) -> &LocalName {
        &self.local
    }

    /// Returns a reference to the namespace of the element.
    fn ns(&self) -> &Namespace {
        &self.ns
    }
}

impl TreeSink for MailTreeSink {
    type Handle = Handle;
    type Output = dom_tree::Document;
    type ElemName<'a>
        = MailElemName
    where
        Self: 'a;

    /// Finalizes and returns the constructed Document.
    fn finish(self) -> Self::Output {
        self.document
    }

    /// Called when a parsing error occurs; html5ever recovers on its own.
    fn parse_error(&self, msg: Cow<'static, str>) {
        log::debug!("html parse error: {}", msg);
    }

    /// Returns the handle to the document's root node.
    fn get_document(&self) -> Self::Handle {
        self.document.root.clone()
    }

    /// Returns the element name for the given element handle.
    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        match &*target.borrow() {
            Node::Element(elem) => MailElemName {
                ns: elem.qual_name.ns.clone(),
                local: elem.qual_name.local.clone(),
            },
            _ => panic!("elem_name called on non-element node"),
        }
    }

    /// Creates a new element node with the given name and attributes.
    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        let mut element = dom_tree::ElementNode::new(name.local.to_string(), name);
        element.attributes = attrs
            .into_iter()
            .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
            .collect();
        Rc::new(RefCell::new(Node::Element(element)))
    }

    fn create_comment(&self, text: StrTendril) -> Self::Handle {
        Rc::new(RefCell::new(Node::Comment(text.to_string())))
    }

    /// Processing instructions are bogus comments in HTML.
    fn create_pi(&self, target: StrTendril, data: StrTendril) -> Self::Handle {
        Rc::new(RefCell::new(Node::Comment(format!("?{} {}", target, data))))
    }

    /// Appends a child node or text to the given parent node.
    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        Self::insert_child(parent, None, child);
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        if dom_tree::parent_of(element).is_some() {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    /// Records the DOCTYPE information on the Document.
    fn append_doctype_to_document(
        &self,
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    ) {
        *self.document.doctype.borrow_mut() = Some(dom_tree::Doctype {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        });
    }

    /// Template contents are kept inline with the template element.
    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        target.clone()
    }

    /// Determines if two node handles refer to the same node.
    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        Rc::ptr_eq(x, y)
    }

    /// Sets the current quirks mode.
    fn set_quirks_mode(&self, mode: QuirksMode) {
        *self.quirks_mode.borrow_mut() = mode;
    }

    /// Inserts a node directly before `sibling` (used for foster parenting).
    fn append_before_sibling(&self, sibling: &Self::Handle, child: NodeOrText<Self::Handle>) {
        let Some(parent) = dom_tree::parent_of(sibling) else {
            return;
        };
        let index = parent
            .borrow()
            .children()
            .iter()
            .position(|c| Rc::ptr_eq(c, sibling));
        Self::insert_child(&parent, index, child);
    }

    /// Adds attributes to the target node if they are missing.
    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<Attribute>) {
        if let Node::Element(elem_node) = &mut *target.borrow_mut() {
            for attr in attrs {
                let key = attr.name.local.to_string();
                if elem_node.attribute(&key).is_none() {
                    elem_node.attributes.push((key, attr.value.to_string()));
                }
            }
        }
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        dom_tree::detach(target);
    }

    /// Moves all children of `node` to the end of `new_parent`.
    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        let moved = match node.borrow_mut().children_mut() {
            Some(children) => std::mem::take(children),
            None => return,
        };
        for child in &moved {
            dom_tree::set_parent(child, Some(new_parent));
        }
        if let Some(children) = new_parent.borrow_mut().children_mut() {
            children.extend(moved);
        }
    }
}
