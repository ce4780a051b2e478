use crate::style::declaration::Declaration;
use crate::style::merge_mode::MergeMode;

/// Which of the two tokens a declaration was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleSource {
    Element,
    Rule,
}

/// Key of the accumulation map.
///
/// `Positional` entries never collide with anything else: they carry every
/// declaration in append mode and every unnamed declaration in all modes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MergeKey {
    Property(String),
    Positional { source: StyleSource, index: usize },
}

impl MergeKey {
    pub fn for_declaration(
        mode: MergeMode,
        declaration: &Declaration,
        source: StyleSource,
        index: usize,
    ) -> MergeKey {
        match (mode, declaration.name()) {
            (MergeMode::AlwaysAppend, _) | (_, None) => MergeKey::Positional { source, index },
            (_, Some(name)) => MergeKey::Property(name.to_string()),
        }
    }
}

/// Outcome of offering a declaration to the accumulation map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// No entry under this key yet.
    Insert,
    /// The incoming declaration overrides the existing entry.
    Replace,
    /// The existing entry stays.
    Keep,
}

/// The cascade decision table.
///
/// `prior` is whatever already sits under the incoming declaration's key.
/// Specificity comparisons use the specificity each declaration was parsed
/// with, i.e. that of the token it came from.
pub fn resolve(mode: MergeMode, prior: Option<&Declaration>, incoming: &Declaration) -> Resolution {
    let Some(prior) = prior else {
        return Resolution::Insert;
    };
    let replace = match mode {
        MergeMode::AlwaysAppend | MergeMode::IgnoreSpecificity => true,
        MergeMode::Standard | MergeMode::ProcessSpecificity => {
            match (prior.important, incoming.important) {
                (true, false) => false,
                (true, true) => incoming.specificity > prior.specificity,
                (false, true) => true,
                // Equal specificity goes to whichever source is processed later.
                (false, false) => incoming.specificity >= prior.specificity,
            }
        }
    };
    if replace {
        Resolution::Replace
    } else {
        Resolution::Keep
    }
}
