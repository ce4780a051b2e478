use thiserror::Error;

/// Errors surfaced by the inlining pipeline.
///
/// The style merge itself never fails; these only come from parsing
/// stylesheets and from reading user-supplied configuration.
#[derive(Debug, Error)]
pub enum InlineError {
    #[error("failed to parse stylesheet: {0}")]
    Stylesheet(String),

    #[error("unknown merge mode `{0}`")]
    InvalidMergeMode(String),
}
