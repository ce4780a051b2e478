use crate::error::InlineError;
use std::fmt;
use std::str::FromStr;

/// Policy for reconciling same-name declarations from the element's inline
/// style and a matched rule.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergeMode {
    /// Keep every declaration from both sides, duplicates included.
    #[default]
    AlwaysAppend,
    /// Last write wins per property, regardless of specificity or importance.
    IgnoreSpecificity,
    /// Specificity-aware, processing the rule first so the element's inline
    /// style wins ties.
    ProcessSpecificity,
    /// Specificity-aware, processing the element first so the rule wins ties.
    Standard,
}

impl MergeMode {
    pub const ALL: [MergeMode; 4] = [
        MergeMode::AlwaysAppend,
        MergeMode::IgnoreSpecificity,
        MergeMode::ProcessSpecificity,
        MergeMode::Standard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MergeMode::AlwaysAppend => "always-append",
            MergeMode::IgnoreSpecificity => "ignore-specificity",
            MergeMode::ProcessSpecificity => "process-specificity",
            MergeMode::Standard => "standard",
        }
    }
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeMode {
    type Err = InlineError;

    /// Accepts kebab-case (`process-specificity`) and SCREAMING_SNAKE_CASE
    /// (`PROCESS_SPECIFICITY`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        MergeMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == normalized)
            .ok_or_else(|| InlineError::InvalidMergeMode(s.to_string()))
    }
}
