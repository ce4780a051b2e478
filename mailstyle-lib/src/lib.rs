//! CSS inlining for HTML email.
//!
//! The heart of the crate is [`style::style_merger::merge`], which folds one
//! matched CSS rule into an element's inline `style` attribute under a
//! [`MergeMode`]. [`mail_generate::mail_style`] drives it over whole
//! documents.

pub mod dom;
pub mod error;
pub mod mail_generate;
pub mod parser;
pub mod style;

pub use error::InlineError;
pub use mail_generate::InlineOptions;
pub use style::merge_mode::MergeMode;
pub use style::style_merger::merge;
pub use style::style_token::StyleToken;
