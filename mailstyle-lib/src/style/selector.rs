use crate::dom::dom_tree::{parent_of, ElementNode, Handle, Node};
use std::rc::Rc;

/// ------------------------------
/// 1. Selector Parsing
/// ------------------------------

/// Supported attribute selector operators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeOperator {
    /// [attr="value"]
    Exact,
    /// [attr~="value"]
    Includes,
    /// [attr^="value"]
    Prefix,
    /// [attr$="value"]
    Suffix,
    /// [attr*="value"]
    Substring,
}

/// Represents one attribute condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    pub name: String,
    pub operator: Option<AttributeOperator>, // None means only existence check
    pub value: Option<String>,
}

/// A compound selector: optional tag and id, classes, attribute conditions and pseudos.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompoundSelector {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<AttributeSelector>,
    pub pseudo_classes: Vec<String>,
    pub pseudo_elements: Vec<String>,
}

impl CompoundSelector {
    /// Pseudo-classes and pseudo-elements depend on runtime state and cannot
    /// be frozen into a `style` attribute.
    pub fn is_inlinable(&self) -> bool {
        self.pseudo_classes.is_empty() && self.pseudo_elements.is_empty()
    }
}

/// A complex selector composed of a key compound selector and a list of ancestor parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    pub key: CompoundSelector,
    /// Ancestors with their combinators, in right-to-left order.
    pub ancestors: Vec<(Combinator, CompoundSelector)>,
}

impl ComplexSelector {
    pub fn is_inlinable(&self) -> bool {
        self.key.is_inlinable() && self.ancestors.iter().all(|(_, c)| c.is_inlinable())
    }
}

/// Supported combinators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Descendant combinator (a space).
    Descendant,
    /// Child combinator (`>`).
    Child,
    /// Adjacent sibling combinator (`+`).
    AdjacentSibling,
    /// General sibling combinator (`~`).
    GeneralSibling,
}

/// Legacy pseudo-elements that may be written with a single colon.
const LEGACY_PSEUDO_ELEMENTS: &[&str] = &["before", "after", "first-line", "first-letter"];

/// A helper that returns a parsed selector; if parsing fails, returns a fallback.
pub fn parse_selector(selector: &str) -> ComplexSelector {
    parse_complex_selector(selector).unwrap_or_else(|| ComplexSelector {
        key: parse_compound_selector(selector),
        ancestors: Vec::new(),
    })
}

fn is_compound_boundary(ch: char) -> bool {
    matches!(ch, '.' | '#' | '[' | ':')
}

/// Parse a compound selector string, e.g. "td.red#header[disabled][data-type~=\"main\"]"
pub fn parse_compound_selector(selector: &str) -> CompoundSelector {
    let mut compound = CompoundSelector::default();
    let mut chars = selector.trim().chars().peekable();
    let mut buffer = String::new();

    // If first char is alphabetic or '*' assume tag.
    if let Some(&ch) = chars.peek() {
        if ch.is_alphabetic() || ch == '*' {
            while let Some(&ch) = chars.peek() {
                if is_compound_boundary(ch) {
                    break;
                }
                buffer.push(ch);
                chars.next();
            }
            if !buffer.is_empty() && buffer != "*" {
                compound.tag = Some(std::mem::take(&mut buffer));
            }
            buffer.clear();
        }
    }

    while let Some(ch) = chars.next() {
        match ch {
            '#' | '.' => {
                while let Some(&next) = chars.peek() {
                    if is_compound_boundary(next) {
                        break;
                    }
                    buffer.push(next);
                    chars.next();
                }
                if !buffer.is_empty() {
                    let name = std::mem::take(&mut buffer);
                    if ch == '#' {
                        compound.id = Some(name);
                    } else {
                        compound.classes.push(name);
                    }
                }
            }
            ':' => {
                let double = chars.peek() == Some(&':');
                if double {
                    chars.next();
                }
                let mut depth = 0usize;
                while let Some(&next) = chars.peek() {
                    if depth == 0 && is_compound_boundary(next) {
                        break;
                    }
                    match next {
                        '(' => depth += 1,
                        ')' => depth = depth.saturating_sub(1),
                        _ => {}
                    }
                    buffer.push(next);
                    chars.next();
                }
                let name = std::mem::take(&mut buffer);
                if double || LEGACY_PSEUDO_ELEMENTS.contains(&name.to_ascii_lowercase().as_str()) {
                    compound.pseudo_elements.push(name);
                } else {
                    compound.pseudo_classes.push(name);
                }
            }
            '[' => {
                if let Some(attribute) = parse_attribute_selector(&mut chars) {
                    compound.attributes.push(attribute);
                }
            }
            _ => {}
        }
    }

    compound
}

/// Parse the body of an attribute selector; the opening '[' is already consumed.
fn parse_attribute_selector(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> Option<AttributeSelector> {
    let skip_whitespace = |chars: &mut std::iter::Peekable<std::str::Chars<'_>>| {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
    };

    let mut name = String::new();
    let mut operator = None;
    let mut value = None;

    skip_whitespace(chars);
    while let Some(&ch) = chars.peek() {
        if matches!(ch, '=' | ']' | '~' | '^' | '$' | '*') || ch.is_whitespace() {
            break;
        }
        name.push(ch);
        chars.next();
    }
    skip_whitespace(chars);

    if let Some(&ch) = chars.peek() {
        if matches!(ch, '=' | '~' | '^' | '$' | '*') {
            chars.next();
            let mut op = String::from(ch);
            if ch != '=' && chars.peek() == Some(&'=') {
                op.push('=');
                chars.next();
            }
            operator = match op.as_str() {
                "=" => Some(AttributeOperator::Exact),
                "~=" => Some(AttributeOperator::Includes),
                "^=" => Some(AttributeOperator::Prefix),
                "$=" => Some(AttributeOperator::Suffix),
                "*=" => Some(AttributeOperator::Substring),
                _ => None,
            };
            skip_whitespace(chars);

            let mut buf = String::new();
            match chars.peek().copied() {
                Some(q @ ('"' | '\'')) => {
                    chars.next();
                    for ch in chars.by_ref() {
                        if ch == q {
                            break;
                        }
                        buf.push(ch);
                    }
                }
                _ => {
                    while let Some(&ch) = chars.peek() {
                        if ch.is_whitespace() || ch == ']' {
                            break;
                        }
                        buf.push(ch);
                        chars.next();
                    }
                }
            }
            value = Some(buf);
        }
    }

    // Skip until ']' (covers flags such as `i`).
    for ch in chars.by_ref() {
        if ch == ']' {
            break;
        }
    }

    if name.is_empty() {
        None
    } else {
        Some(AttributeSelector { name, operator, value })
    }
}

/// Parse a complex selector string (e.g. "table.red > td#header + td.foo") into a ComplexSelector.
/// Combinators may or may not be surrounded by whitespace.
pub fn parse_complex_selector(selector: &str) -> Option<ComplexSelector> {
    let mut parts: Vec<(Combinator, String)> = Vec::new();
    let mut current = String::new();
    let mut combinator = Combinator::Descendant;
    let mut depth = 0usize;

    let flush = |parts: &mut Vec<(Combinator, String)>, current: &mut String, comb: Combinator| {
        if !current.is_empty() {
            parts.push((comb, std::mem::take(current)));
        }
    };

    for ch in selector.trim().chars() {
        match ch {
            '[' | '(' => {
                depth += 1;
                current.push(ch);
            }
            ']' | ')' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            '>' | '+' | '~' if depth == 0 => {
                flush(&mut parts, &mut current, combinator);
                combinator = match ch {
                    '>' => Combinator::Child,
                    '+' => Combinator::AdjacentSibling,
                    _ => Combinator::GeneralSibling,
                };
            }
            c if c.is_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    flush(&mut parts, &mut current, combinator);
                    combinator = Combinator::Descendant;
                }
            }
            _ => current.push(ch),
        }
    }
    flush(&mut parts, &mut current, combinator);

    let (_, key_text) = parts.last()?;
    let key = parse_compound_selector(key_text);
    let mut ancestors = Vec::with_capacity(parts.len() - 1);
    for i in (1..parts.len()).rev() {
        ancestors.push((parts[i].0, parse_compound_selector(&parts[i - 1].1)));
    }
    Some(ComplexSelector { key, ancestors })
}

/// ------------------------------
/// 2. Selector Matching
/// ------------------------------

/// Returns true if the given ElementNode matches the CompoundSelector.
/// Checks tag, id, classes, and attribute conditions. Pseudo selectors never match.
pub fn matches_compound(elem: &ElementNode, compound: &CompoundSelector) -> bool {
    if !compound.is_inlinable() {
        return false;
    }
    if let Some(ref tag) = compound.tag {
        if !elem.tag.eq_ignore_ascii_case(tag) {
            return false;
        }
    }
    if let Some(ref id_val) = compound.id {
        if elem.attribute("id") != Some(id_val.as_str()) {
            return false;
        }
    }
    if !compound.classes.is_empty() {
        let Some(class_attr) = elem.attribute("class") else {
            return false;
        };
        if !compound
            .classes
            .iter()
            .all(|class| class_attr.split_whitespace().any(|c| c == class))
        {
            return false;
        }
    }
    compound
        .attributes
        .iter()
        .all(|attr_sel| matches_attribute(elem, attr_sel))
}

fn matches_attribute(elem: &ElementNode, attr_sel: &AttributeSelector) -> bool {
    let Some(actual_val) = elem.attribute(&attr_sel.name) else {
        return false;
    };
    let Some(expected) = attr_sel.value.as_deref() else {
        // If no expected value provided, existence is enough.
        return true;
    };
    match attr_sel.operator {
        Some(AttributeOperator::Exact) => actual_val == expected,
        Some(AttributeOperator::Includes) => actual_val.split_whitespace().any(|w| w == expected),
        Some(AttributeOperator::Prefix) => !expected.is_empty() && actual_val.starts_with(expected),
        Some(AttributeOperator::Suffix) => !expected.is_empty() && actual_val.ends_with(expected),
        Some(AttributeOperator::Substring) => !expected.is_empty() && actual_val.contains(expected),
        None => true,
    }
}

fn with_element<R>(node: &Handle, f: impl FnOnce(&ElementNode) -> R) -> Option<R> {
    match &*node.borrow() {
        Node::Element(elem) => Some(f(elem)),
        _ => None,
    }
}

/// Matches a ComplexSelector against a candidate element.
/// The matching proceeds right-to-left, using parent pointers and the parent's child list.
pub fn matches_complex_selector(candidate: &Handle, complex: &ComplexSelector) -> bool {
    if with_element(candidate, |elem| matches_compound(elem, &complex.key)) != Some(true) {
        return false;
    }
    let mut current_node = Rc::clone(candidate);
    for (combinator, compound) in &complex.ancestors {
        let found = match combinator {
            Combinator::Child => parent_of(&current_node)
                .filter(|parent| with_element(parent, |e| matches_compound(e, compound)) == Some(true)),
            Combinator::Descendant => {
                let mut ancestor = parent_of(&current_node);
                while let Some(node) = ancestor.take() {
                    if with_element(&node, |e| matches_compound(e, compound)) == Some(true) {
                        ancestor = Some(node);
                        break;
                    }
                    ancestor = parent_of(&node);
                }
                ancestor
            }
            Combinator::AdjacentSibling => get_prev_sibling(&current_node)
                .filter(|sib| with_element(sib, |e| matches_compound(e, compound)) == Some(true)),
            Combinator::GeneralSibling => get_all_prev_siblings(&current_node)
                .into_iter()
                .find(|sib| with_element(sib, |e| matches_compound(e, compound)) == Some(true)),
        };
        match found {
            Some(node) => current_node = node,
            None => return false,
        }
    }
    true
}

/// Helper: element siblings preceding `node`, nearest first.
fn get_all_prev_siblings(node: &Handle) -> Vec<Handle> {
    let Some(parent) = parent_of(node) else {
        return Vec::new();
    };
    let parent_ref = parent.borrow();
    let children = parent_ref.children();
    let Some(position) = children.iter().position(|child| Rc::ptr_eq(child, node)) else {
        return Vec::new();
    };
    let siblings: Vec<Handle> = children[..position]
        .iter()
        .rev()
        .filter(|child| matches!(*child.borrow(), Node::Element(_)))
        .cloned()
        .collect();
    siblings
}

/// Helper: get immediate previous element sibling.
fn get_prev_sibling(node: &Handle) -> Option<Handle> {
    get_all_prev_siblings(node).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::html::create_dom_tree;

    fn find_by_id(node: &Handle, id: &str) -> Option<Handle> {
        let children = match &*node.borrow() {
            Node::Element(elem) if elem.attribute("id") == Some(id) => return Some(node.clone()),
            Node::Element(elem) => elem.children.clone(),
            Node::DocumentRoot(root) => root.children.clone(),
            _ => return None,
        };
        children.iter().find_map(|child| find_by_id(child, id))
    }

    #[test]
    fn test_parse_compound() {
        let compound = parse_compound_selector("td.red.wide#cell[data-x~=\"a\"]");
        assert_eq!(compound.tag.as_deref(), Some("td"));
        assert_eq!(compound.id.as_deref(), Some("cell"));
        assert_eq!(compound.classes, vec!["red", "wide"]);
        assert_eq!(compound.attributes.len(), 1);
        assert_eq!(compound.attributes[0].operator, Some(AttributeOperator::Includes));
        assert_eq!(compound.attributes[0].value.as_deref(), Some("a"));
    }

    #[test]
    fn test_parse_pseudos() {
        let compound = parse_compound_selector("a:hover::before");
        assert_eq!(compound.pseudo_classes, vec!["hover"]);
        assert_eq!(compound.pseudo_elements, vec!["before"]);
        assert!(!compound.is_inlinable());

        let legacy = parse_compound_selector("p:first-line");
        assert_eq!(legacy.pseudo_elements, vec!["first-line"]);

        let nth = parse_compound_selector("li:nth-child(2n+1)");
        assert_eq!(nth.pseudo_classes, vec!["nth-child(2n+1)"]);
    }

    #[test]
    fn test_parse_complex_without_spaces() {
        let complex = parse_selector("table.main>tr td+td");
        assert_eq!(complex.key.tag.as_deref(), Some("td"));
        assert_eq!(complex.ancestors.len(), 3);
        assert_eq!(complex.ancestors[0].0, Combinator::AdjacentSibling);
        assert_eq!(complex.ancestors[1].0, Combinator::Descendant);
        assert_eq!(complex.ancestors[1].1.tag.as_deref(), Some("tr"));
        assert_eq!(complex.ancestors[2].0, Combinator::Child);
        assert_eq!(complex.ancestors[2].1.classes, vec!["main"]);
    }

    #[test]
    fn test_match_against_dom() {
        let document = create_dom_tree(
            r#"<div class="wrap"><p id="first">a</p><p id="second" lang="en-GB">b</p></div>"#,
        );
        let second = find_by_id(&document.root, "second").expect("second paragraph");

        assert!(matches_complex_selector(&second, &parse_selector("p")));
        assert!(matches_complex_selector(&second, &parse_selector(".wrap p")));
        assert!(matches_complex_selector(&second, &parse_selector("div > #second")));
        assert!(matches_complex_selector(&second, &parse_selector("#first + p")));
        assert!(matches_complex_selector(&second, &parse_selector("#first ~ p[lang^=en]")));
        assert!(!matches_complex_selector(&second, &parse_selector("#second + p")));
        assert!(!matches_complex_selector(&second, &parse_selector("span p")));
        assert!(!matches_complex_selector(&second, &parse_selector("p:hover")));
    }
}
