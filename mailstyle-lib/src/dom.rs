use html5ever::QualName;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub mod dom_tree {
    use super::*;

    /// Shared handle to a node in the tree.
    pub type Handle = Rc<RefCell<Node>>;

    #[derive(Debug, Clone)]
    pub enum Node {
        DocumentRoot(DocumentRootNode),
        Element(ElementNode),
        Text(String),
        /// Kept so Outlook conditional comments survive a round trip.
        Comment(String),
    }

    #[derive(Debug, Clone, Default)]
    pub struct DocumentRootNode {
        pub children: Vec<Handle>,
    }

    #[derive(Debug, Clone)]
    pub struct ElementNode {
        pub tag: String,
        pub qual_name: QualName,
        /// Attributes in source order.
        pub attributes: Vec<(String, String)>,
        pub children: Vec<Handle>,
        pub parent: Option<Weak<RefCell<Node>>>,
    }

    #[derive(Debug)]
    pub struct Document {
        pub root: Handle,
        pub doctype: RefCell<Option<Doctype>>,
    }

    #[derive(Debug)]
    pub struct Doctype {
        pub name: String,
        pub public_id: String,
        pub system_id: String,
    }

    impl DocumentRootNode {
        pub fn new() -> Self {
            DocumentRootNode {
                children: Vec::new(),
            }
        }
    }

    impl ElementNode {
        pub fn new(tag: String, qual_name: QualName) -> Self {
            ElementNode {
                tag,
                qual_name,
                attributes: Vec::new(),
                children: Vec::new(),
                parent: None,
            }
        }

        pub fn attribute(&self, name: &str) -> Option<&str> {
            self.attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }

        /// Overwrites an existing attribute in place, or appends a new one.
        pub fn set_attribute(&mut self, name: &str, value: String) {
            match self
                .attributes
                .iter_mut()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
            {
                Some((_, existing)) => *existing = value,
                None => self.attributes.push((name.to_string(), value)),
            }
        }

        /// Concatenated text of the direct text children.
        pub fn text_content(&self) -> String {
            self.children
                .iter()
                .filter_map(|child| match &*child.borrow() {
                    Node::Text(text) => Some(text.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    impl Node {
        pub fn children(&self) -> &[Handle] {
            match self {
                Node::DocumentRoot(root) => &root.children,
                Node::Element(elem) => &elem.children,
                Node::Text(_) | Node::Comment(_) => &[],
            }
        }

        pub fn children_mut(&mut self) -> Option<&mut Vec<Handle>> {
            match self {
                Node::DocumentRoot(root) => Some(&mut root.children),
                Node::Element(elem) => Some(&mut elem.children),
                Node::Text(_) | Node::Comment(_) => None,
            }
        }

        pub fn is_element(&self, tag: &str) -> bool {
            matches!(self, Node::Element(elem) if elem.tag.eq_ignore_ascii_case(tag))
        }
    }

    /// Sets the parent pointer of an element node; other node kinds do not track it.
    pub fn set_parent(child: &Handle, parent: Option<&Handle>) {
        if let Node::Element(ref mut elem) = *child.borrow_mut() {
            elem.parent = parent.map(Rc::downgrade);
        }
    }

    /// Parent of an element node, if it is still attached.
    pub fn parent_of(node: &Handle) -> Option<Handle> {
        match &*node.borrow() {
            Node::Element(elem) => elem.parent.as_ref().and_then(Weak::upgrade),
            _ => None,
        }
    }

    /// Detaches an element from its parent's child list.
    pub fn detach(node: &Handle) {
        let Some(parent) = parent_of(node) else {
            return;
        };
        if let Some(children) = parent.borrow_mut().children_mut() {
            children.retain(|child| !Rc::ptr_eq(child, node));
        }
        set_parent(node, None);
    }

    /// Replaces the children of `node` with a single text node.
    pub fn replace_text(node: &Handle, text: String) {
        if let Some(children) = node.borrow_mut().children_mut() {
            *children = vec![Rc::new(RefCell::new(Node::Text(text)))];
        }
    }

    pub fn new_document() -> Document {
        Document {
            root: Rc::new(RefCell::new(Node::DocumentRoot(DocumentRootNode::new()))),
            doctype: RefCell::new(None),
        }
    }
}
