//! Folds a matched rule into an element's inline style.
//!
//! [`merge`] takes the element's current style and one matched rule and
//! returns the style attribute to write back. Callers fold additional rules
//! by calling it again with the previous result as the element style.

use crate::style::declaration::Declaration;
use crate::style::merge_mode::MergeMode;
use crate::style::merge_policy::{resolve, MergeKey, Resolution, StyleSource};
use crate::style::style_token::StyleToken;
use indexmap::IndexMap;
use log::{debug, trace};

/// Accumulates surviving declarations for a single merge.
///
/// Built fresh per call, threaded by value through each [`fold`](Self::fold)
/// and consumed by [`finish`](Self::finish).
#[derive(Debug)]
pub struct StyleMergeBuilder {
    mode: MergeMode,
    entries: IndexMap<MergeKey, Declaration>,
}

impl StyleMergeBuilder {
    pub fn new(mode: MergeMode) -> Self {
        StyleMergeBuilder {
            mode,
            entries: IndexMap::new(),
        }
    }

    /// Offers every declaration of `token`, in order, to the policy engine.
    pub fn fold(mut self, token: &StyleToken, source: StyleSource) -> Self {
        for (index, raw) in token.properties().iter().enumerate() {
            let declaration = Declaration::parse(raw, token.specificity());
            let key = MergeKey::for_declaration(self.mode, &declaration, source, index);
            match resolve(self.mode, self.entries.get(&key), &declaration) {
                // IndexMap keeps a replaced key in its original slot.
                Resolution::Insert | Resolution::Replace => {
                    self.entries.insert(key, declaration);
                }
                Resolution::Keep => {
                    trace!("keeping earlier declaration over `{}`", declaration.full_property);
                }
            }
        }
        self
    }

    /// Emits the surviving declarations into a token for `selector`.
    pub fn finish(self, selector: &str) -> StyleToken {
        let mut merged = StyleToken::new(selector);
        for declaration in self.entries.into_values() {
            merged.push_property(declaration.full_property);
        }
        merged
    }
}

/// Merges `rule` into `element` under `mode` and returns the new inline style.
///
/// Missing tokens count as empty and a missing mode as
/// [`MergeMode::AlwaysAppend`]. Returns `None` when nothing usable is left:
/// an empty result, or one containing `{`/`}` (which would mean a parsing
/// problem upstream and must not end up in markup).
pub fn merge(
    element: Option<&StyleToken>,
    rule: Option<&StyleToken>,
    mode: Option<MergeMode>,
) -> Option<String> {
    let empty = StyleToken::default();
    let mode = mode.unwrap_or_default();
    let element = element.unwrap_or(&empty);
    let rule = rule.unwrap_or(&empty);

    let builder = StyleMergeBuilder::new(mode);
    let builder = match mode {
        MergeMode::ProcessSpecificity => builder
            .fold(rule, StyleSource::Rule)
            .fold(element, StyleSource::Element),
        _ => builder
            .fold(element, StyleSource::Element)
            .fold(rule, StyleSource::Rule),
    };
    let merged = builder.finish(element.selector());
    checked_style(merged.inlinable_properties())
}

fn checked_style(style: String) -> Option<String> {
    if style.trim().is_empty() {
        return None;
    }
    if style.contains(['{', '}']) {
        debug!("discarding merged style with braces: {style}");
        return None;
    }
    Some(style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::specificity::Specificity;

    fn token(selector: &str, declarations: &str) -> StyleToken {
        StyleToken::with_properties(selector, declarations)
    }

    #[test]
    fn test_merge_with_nothing() {
        for mode in MergeMode::ALL {
            assert_eq!(merge(None, None, Some(mode)), None);
        }
        assert_eq!(merge(None, None, None), None);
    }

    #[test]
    fn test_default_mode_appends() {
        let element = token("", "color: red");
        let rule = token("p", "color: blue");
        assert_eq!(
            merge(Some(&element), Some(&rule), None).as_deref(),
            Some("color: red; color: blue")
        );
    }

    #[test]
    fn test_replaced_entry_keeps_first_slot() {
        let element = token("p", "color: red; margin: 0");
        let rule = token("p", "padding: 1px; color: blue");
        assert_eq!(
            merge(Some(&element), Some(&rule), Some(MergeMode::Standard)).as_deref(),
            Some("color: blue; margin: 0; padding: 1px")
        );
    }

    #[test]
    fn test_duplicates_within_one_token() {
        let rule = token("p", "color: red; color: blue");
        assert_eq!(
            merge(None, Some(&rule), Some(MergeMode::Standard)).as_deref(),
            Some("color: blue")
        );
        assert_eq!(
            merge(None, Some(&rule), Some(MergeMode::AlwaysAppend)).as_deref(),
            Some("color: red; color: blue")
        );
    }

    #[test]
    fn test_unnamed_declarations_survive() {
        let element = token("p", "oops; color: red");
        let rule = token("p", "oops; color: blue");
        for mode in MergeMode::ALL {
            let merged = merge(Some(&element), Some(&rule), Some(mode)).unwrap();
            assert_eq!(merged.matches("oops").count(), 2, "{mode}: {merged}");
        }
    }

    #[test]
    fn test_output_specificity_is_recomputed() {
        let mut element = token("#a .b", "color: red");
        element.set_specificity(Specificity::new(9, 9, 9));
        let merged = StyleMergeBuilder::new(MergeMode::Standard)
            .fold(&element, StyleSource::Element)
            .finish(element.selector());
        assert_eq!(merged.specificity(), Specificity::new(1, 1, 0));
        assert_eq!(merged.selector(), "#a .b");
    }

    #[test]
    fn test_braces_are_rejected() {
        assert_eq!(checked_style("color: red; } p { color: blue".into()), None);
        assert_eq!(checked_style("   ".into()), None);
        assert_eq!(checked_style("color: red".into()).as_deref(), Some("color: red"));
    }
}
