use crate::dom::dom_tree::{Document, Handle, Node};
use crate::error::InlineError;
use crate::style::merge_mode::MergeMode;
use crate::style::selector::{matches_complex_selector, parse_selector, ComplexSelector};
use crate::style::style_merger::merge;
use crate::style::style_token::StyleToken;
use lightningcss::printer::PrinterOptions;
use lightningcss::rules::{style::StyleRule, CssRule};
use lightningcss::stylesheet::{ParserOptions, StyleSheet as LightningStyleSheet};
use lightningcss::traits::ToCss;
use log::{debug, warn};

/// A stylesheet split into what can be inlined and what must stay in a
/// `<style>` element.
#[derive(Debug, Default, Clone)]
pub struct ParsedStylesheet {
    /// One token per inlinable selector, in source order.
    pub rules: Vec<StyleToken>,
    /// Serialized rules that cannot be expressed as inline styles
    /// (`@media`, `@font-face`, pseudo selectors, ...).
    pub retained: Vec<String>,
}

impl ParsedStylesheet {
    pub fn extend(&mut self, other: ParsedStylesheet) {
        self.rules.extend(other.rules);
        self.retained.extend(other.retained);
    }
}

/// Parse raw CSS with LightningCSS and split it into inlinable tokens and retained rules.
pub fn parse_stylesheet(css_text: &str) -> Result<ParsedStylesheet, InlineError> {
    let parser_opts = ParserOptions {
        error_recovery: true,
        ..ParserOptions::default()
    };
    let sheet = LightningStyleSheet::parse(css_text, parser_opts)
        .map_err(|e| InlineError::Stylesheet(e.to_string()))?;

    let mut parsed = ParsedStylesheet::default();
    for rule in &sheet.rules.0 {
        match rule {
            CssRule::Style(style_rule) => {
                let (tokens, retain) = convert_style_rule(style_rule);
                parsed.rules.extend(tokens);
                if retain {
                    retain_rule(rule, &mut parsed.retained);
                }
            }
            // Media queries and other at-rules stay in the document untouched.
            _ => retain_rule(rule, &mut parsed.retained),
        }
    }
    debug!(
        "parsed stylesheet: {} inlinable selectors, {} retained rules",
        parsed.rules.len(),
        parsed.retained.len()
    );
    Ok(parsed)
}

fn retain_rule(rule: &CssRule<'_>, retained: &mut Vec<String>) {
    match rule.to_css_string(PrinterOptions::default()) {
        Ok(text) => retained.push(text),
        Err(e) => warn!("dropping rule that could not be serialized: {}", e),
    }
}

/// Turns one style rule into a token per inlinable selector.
/// The flag is set when any selector of the rule has to stay in the stylesheet.
fn convert_style_rule(style_rule: &StyleRule<'_>) -> (Vec<StyleToken>, bool) {
    let block = &style_rule.declarations;
    let mut declarations = Vec::new();
    let normal = block.declarations.iter().map(|p| (p, false));
    let important = block.important_declarations.iter().map(|p| (p, true));
    for (property, is_important) in normal.chain(important) {
        match property.to_css_string(is_important, PrinterOptions::default()) {
            Ok(text) => declarations.push(text),
            Err(e) => warn!(
                "skipping declaration `{}`: {}",
                property.property_id().name(),
                e
            ),
        }
    }

    let mut tokens = Vec::new();
    let mut retain = false;
    for selector in &style_rule.selectors.0 {
        let Ok(selector_text) = selector.to_css_string(PrinterOptions::default()) else {
            retain = true;
            continue;
        };
        if !parse_selector(&selector_text).is_inlinable() {
            debug!("selector `{}` is not inlinable", selector_text);
            retain = true;
            continue;
        }
        let mut token = StyleToken::new(selector_text);
        for declaration in &declarations {
            token.push_property(declaration.clone());
        }
        tokens.push(token);
    }
    (tokens, retain)
}

/// Fold every matching rule into the `style` attribute of each element, walking the DOM.
pub fn apply_stylesheet_to_dom(document: &Document, rules: &[StyleToken], mode: MergeMode) {
    let compiled: Vec<(ComplexSelector, &StyleToken)> = rules
        .iter()
        .map(|rule| (parse_selector(rule.selector()), rule))
        .collect();
    apply_styles_recursive(&document.root, &compiled, mode);
}

/// Recursively walk the DOM. The `<head>` subtree is never styled.
fn apply_styles_recursive(
    node_handle: &Handle,
    rules: &[(ComplexSelector, &StyleToken)],
    mode: MergeMode,
) {
    let children = match &*node_handle.borrow() {
        Node::DocumentRoot(root) => root.children.clone(),
        Node::Element(elem) if elem.tag.eq_ignore_ascii_case("head") => return,
        Node::Element(elem) => elem.children.clone(),
        Node::Text(_) | Node::Comment(_) => return,
    };

    if matches!(*node_handle.borrow(), Node::Element(_)) {
        let matched: Vec<&StyleToken> = rules
            .iter()
            .filter(|(selector, _)| matches_complex_selector(node_handle, selector))
            .map(|(_, rule)| *rule)
            .collect();
        if !matched.is_empty() {
            apply_matched_rules(node_handle, matched, mode);
        }
    }

    for child in &children {
        apply_styles_recursive(child, rules, mode);
    }
}

/// Cascade the rules that matched one element into a single declaration list.
///
/// Rules are stable-sorted by ascending specificity and folded with
/// [`MergeMode::Standard`] into an accumulator that has the lowest possible
/// specificity. A later rule in that order replaces an earlier one, except
/// that a normal declaration never displaces an `!important` one.
pub fn cascade_rules(mut matched: Vec<&StyleToken>) -> StyleToken {
    matched.sort_by_key(|rule| rule.specificity());
    let mut cascaded = StyleToken::new("");
    for rule in matched {
        if let Some(style) = merge(Some(&cascaded), Some(rule), Some(MergeMode::Standard)) {
            cascaded = StyleToken::with_properties("", &style);
        }
    }
    cascaded
}

/// Merge an element's authored `style` against its cascaded rules.
///
/// Both sides sit at the same specificity, so the merge mode alone decides
/// whether the inline declaration or the stylesheet wins a plain conflict.
fn apply_matched_rules(node_handle: &Handle, matched: Vec<&StyleToken>, mode: MergeMode) {
    let cascaded = cascade_rules(matched);
    let mut node = node_handle.borrow_mut();
    let Node::Element(elem) = &mut *node else {
        return;
    };
    let inline = StyleToken::with_properties("", elem.attribute("style").unwrap_or(""));
    match merge(Some(&inline), Some(&cascaded), Some(mode)) {
        Some(style) => elem.set_attribute("style", style),
        None => debug!("matched rules left <{}> unchanged", elem.tag),
    }
}
