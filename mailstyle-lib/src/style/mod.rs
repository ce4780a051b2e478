pub mod declaration;
pub mod mail_css;
pub mod merge_mode;
pub mod merge_policy;
pub mod selector;
pub mod specificity;
pub mod style_merger;
pub mod style_token;
