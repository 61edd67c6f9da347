// ABOUTME: Template module for placeholder scanning and substitution
// ABOUTME: Provides the syntaxes, value context, and rendering engine

pub mod context;
pub mod engine;
pub mod error;
pub mod syntax;

pub use context::TemplateContext;
pub use engine::{RenderMode, Rendered, TemplateEngine};
pub use error::{Result, TemplateError};
pub use syntax::{distinct_names, Placeholder, ScanReport, Syntax, SyntaxChoice};
