use crate::dom::dom_tree::{self, Document, Handle, Node};
use crate::error::InlineError;
use crate::parser::html;
use crate::style::mail_css::{self, ParsedStylesheet};
use crate::style::merge_mode::MergeMode;

/// Knobs for a document inlining run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineOptions {
    /// Policy for merging an element's inline style with its cascaded rules.
    pub merge_mode: MergeMode,
    /// Leave `<style>` elements exactly as authored instead of stripping
    /// the rules that were inlined.
    pub keep_style_elements: bool,
}

impl Default for InlineOptions {
    fn default() -> Self {
        InlineOptions {
            merge_mode: MergeMode::ProcessSpecificity,
            keep_style_elements: false,
        }
    }
}

pub mod mail_style {
    use super::*;
    use rayon::prelude::*;

    /// Inline the document's own `<style>` rules, then `extra_css`, into
    /// `style` attributes and return the rewritten HTML.
    pub fn generate(
        html_content: &str,
        extra_css: &str,
        options: &InlineOptions,
    ) -> Result<String, InlineError> {
        let dom_tree = html::create_dom_tree(html_content);
        let stylesheet = collect_stylesheets(&dom_tree, extra_css, options)?;
        mail_css::apply_stylesheet_to_dom(&dom_tree, &stylesheet.rules, options.merge_mode);
        Ok(html::serialize_document(&dom_tree))
    }

    /// Runs [`generate`] over many documents in parallel; results keep input order.
    pub fn generate_batch(
        documents: &[String],
        extra_css: &str,
        options: &InlineOptions,
    ) -> Vec<Result<String, InlineError>> {
        documents
            .par_iter()
            .map(|document| generate(document, extra_css, options))
            .collect()
    }
}

/// Parse every `<style>` element in document order, followed by `extra_css`.
/// Unless asked to keep them, style elements are cut down to their retained rules.
fn collect_stylesheets(
    document: &Document,
    extra_css: &str,
    options: &InlineOptions,
) -> Result<ParsedStylesheet, InlineError> {
    let mut style_elements = Vec::new();
    find_style_elements(&document.root, &mut style_elements);

    let mut combined = ParsedStylesheet::default();
    for style_element in &style_elements {
        let css_text = match &*style_element.borrow() {
            Node::Element(elem) => elem.text_content(),
            _ => continue,
        };
        let parsed = mail_css::parse_stylesheet(&css_text)?;
        if !options.keep_style_elements {
            if parsed.retained.is_empty() {
                dom_tree::detach(style_element);
            } else {
                dom_tree::replace_text(style_element, parsed.retained.join("\n"));
            }
        }
        combined.extend(parsed);
    }
    if !extra_css.trim().is_empty() {
        combined.extend(mail_css::parse_stylesheet(extra_css)?);
    }
    log::debug!(
        "{} style elements, {} inlinable selectors",
        style_elements.len(),
        combined.rules.len()
    );
    Ok(combined)
}

fn find_style_elements(node: &Handle, found: &mut Vec<Handle>) {
    let node_ref = node.borrow();
    if node_ref.is_element("style") {
        found.push(node.clone());
        return;
    }
    for child in node_ref.children() {
        find_style_elements(child, found);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owned_css_application() {
        let html_str = r#"<!DOCTYPE html>
<html>
<head>
<style>
.red { text-align: center; }
#blue { text-align: right; }
</style>
</head>
<body><div class="red" style="display: block">Hello Red<div id="blue">Hello Blue</div></div></body>
</html>"#;

        let output = mail_style::generate(html_str, "", &InlineOptions::default()).unwrap();

        assert!(!output.contains("<style>"), "{output}");
        assert!(
            output.contains(r#"<div class="red" style="text-align: center; display: block">"#),
            "{output}"
        );
        assert!(output.contains(r#"<div id="blue" style="text-align: right">"#), "{output}");
    }

    #[test]
    fn test_keep_style_elements() {
        let html_str = "<style>p { text-align: left; }</style><p>x</p>";
        let options = InlineOptions {
            keep_style_elements: true,
            ..InlineOptions::default()
        };
        let output = mail_style::generate(html_str, "", &options).unwrap();
        assert!(output.contains("<style>p { text-align: left; }</style>"), "{output}");
        assert!(output.contains(r#"<p style="text-align: left">x</p>"#), "{output}");
    }
}
