use crate::style::specificity::{compute_specificity, Specificity};
use std::fmt;

/// One side of a style merge: a selector, its raw declarations in source
/// order, and the selector's specificity.
///
/// A token with an empty selector stands for a plain inline `style`
/// attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleToken {
    selector: String,
    properties: Vec<String>,
    specificity: Specificity,
}

impl StyleToken {
    /// Creates an empty token whose specificity is computed from `selector`.
    pub fn new(selector: impl Into<String>) -> Self {
        let selector = selector.into();
        let specificity = compute_specificity(&selector);
        StyleToken {
            selector,
            properties: Vec::new(),
            specificity,
        }
    }

    /// Convenience constructor: `selector` plus a `;`-separated declaration block.
    pub fn with_properties(selector: impl Into<String>, declarations: &str) -> Self {
        let mut token = StyleToken::new(selector);
        token.add_properties(declarations);
        token
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn properties(&self) -> &[String] {
        &self.properties
    }

    pub fn specificity(&self) -> Specificity {
        self.specificity
    }

    pub fn set_specificity(&mut self, specificity: Specificity) {
        self.specificity = specificity;
    }

    /// Splits a declaration block on top-level `;` and appends every
    /// non-blank declaration. Semicolons inside `url(...)` or quotes are kept.
    pub fn add_properties(&mut self, declarations: &str) {
        self.properties.extend(
            split_top_level(declarations, ';')
                .into_iter()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
        );
    }

    /// Appends a single declaration verbatim.
    pub fn push_property(&mut self, declaration: impl Into<String>) {
        self.properties.push(declaration.into());
    }

    /// The declaration list in the form it is written into a `style` attribute.
    pub fn inlinable_properties(&self) -> String {
        self.properties.join("; ")
    }
}

/// Splits `text` at every `separator` that is outside parentheses,
/// brackets and quoted strings. A backslash escapes the next character.
pub fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (_, '\\') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth = depth.saturating_sub(1),
            (None, c) if c == separator && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            (None, _) => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

impl fmt::Display for StyleToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{ {} }}", self.selector, self.inlinable_properties())
    }
}
