use crate::style::specificity::Specificity;

/// Marker that promotes a declaration above normal cascade order.
pub const IMPORTANT_MARKER: &str = "!important";

/// A single parsed `name: value` declaration taken from a [`StyleToken`].
///
/// `full_property` is the original text and is what ends up in the merged
/// style; name and value only drive conflict resolution.
///
/// [`StyleToken`]: crate::style::style_token::StyleToken
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: Option<String>,
    pub value: Option<String>,
    pub important: bool,
    pub full_property: String,
    pub specificity: Specificity,
}

impl Declaration {
    /// Parses one raw declaration.
    ///
    /// The name is everything before the first `:`, the value everything
    /// after it, so values with embedded colons (`url(https://...)`) stay
    /// whole. The declaration is left unnamed when there is no colon, the
    /// name is blank, or nothing at all follows the colon. A value of only
    /// whitespace (`"color: "`) keeps the name with an empty value.
    pub fn parse(raw: &str, specificity: Specificity) -> Declaration {
        let mut declaration = Declaration {
            name: None,
            value: None,
            important: false,
            full_property: raw.to_string(),
            specificity,
        };
        let Some((name, value)) = raw.split_once(':') else {
            return declaration;
        };
        let name = name.trim();
        if name.is_empty() || value.is_empty() {
            return declaration;
        }
        let value = value.trim();
        declaration.important = value.contains(IMPORTANT_MARKER);
        declaration.name = Some(name.to_string());
        declaration.value = Some(value.to_string());
        declaration
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}
