use crate::style::selector::{parse_selector, CompoundSelector};
use crate::style::style_token::split_top_level;
use std::fmt;

/// Selector specificity as `(ids, classes, elements)`.
///
/// Ordering is lexicographic over the three counts, so the derived `Ord`
/// gives the cascade order directly. `Specificity::default()` is the
/// minimum and belongs to the empty selector.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Specificity {
    /// Count of ID selectors.
    pub ids: u32,
    /// Count of class, attribute, and pseudo-class selectors.
    pub classes: u32,
    /// Count of type selectors and pseudo-elements.
    pub elements: u32,
}

impl Specificity {
    pub const fn new(ids: u32, classes: u32, elements: u32) -> Self {
        Self { ids, classes, elements }
    }
}

impl fmt::Display for Specificity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.ids, self.classes, self.elements)
    }
}

impl std::ops::Add for Specificity {
    type Output = Specificity;

    fn add(self, rhs: Self) -> Self::Output {
        Specificity {
            ids: self.ids + rhs.ids,
            classes: self.classes + rhs.classes,
            elements: self.elements + rhs.elements,
        }
    }
}

/// Specificity of a single compound selector.
pub fn compound_specificity(compound: &CompoundSelector) -> Specificity {
    let ids = u32::from(compound.id.is_some());
    // Attributes and pseudo-classes count at class level.
    let classes =
        (compound.classes.len() + compound.attributes.len() + compound.pseudo_classes.len()) as u32;
    let elements = u32::from(compound.tag.is_some()) + compound.pseudo_elements.len() as u32;
    Specificity::new(ids, classes, elements)
}

/// Compute the specificity of a selector string.
///
/// The empty selector (a bare inline style) has the minimum specificity.
/// For a comma-separated list the most specific member wins.
pub fn compute_specificity(selector: &str) -> Specificity {
    split_top_level(selector, ',')
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            let complex = parse_selector(s);
            complex
                .ancestors
                .iter()
                .fold(compound_specificity(&complex.key), |acc, (_, compound)| {
                    acc + compound_specificity(compound)
                })
        })
        .max()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_selector_is_minimum() {
        assert_eq!(compute_specificity(""), Specificity::default());
        assert_eq!(compute_specificity("   "), Specificity::default());
        assert!(compute_specificity("*") >= Specificity::default());
    }

    #[test]
    fn test_counts() {
        assert_eq!(compute_specificity("td"), Specificity::new(0, 0, 1));
        assert_eq!(compute_specificity(".red"), Specificity::new(0, 1, 0));
        assert_eq!(compute_specificity("#header"), Specificity::new(1, 0, 0));
        assert_eq!(
            compute_specificity("table.main > td[align] a:hover::before"),
            Specificity::new(0, 3, 4)
        );
    }

    #[test]
    fn test_ordering() {
        assert!(compute_specificity("#a") > compute_specificity(".a.b.c.d"));
        assert!(compute_specificity(".a") > compute_specificity("div p span"));
        assert_eq!(compute_specificity("p.a"), compute_specificity("p[title]"));
    }

    #[test]
    fn test_selector_list_takes_max() {
        assert_eq!(compute_specificity("p, #x, .y"), Specificity::new(1, 0, 0));
    }

    #[test]
    fn test_commas_inside_functional_pseudo_classes() {
        assert_eq!(compute_specificity(":is(a, b) span"), Specificity::new(0, 1, 1));
        assert_eq!(
            compute_specificity("td:not(.a, .b), :is(#x, p) em"),
            Specificity::new(0, 1, 1)
        );
    }
}
