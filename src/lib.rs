// ABOUTME: Main library module for applytrack
// ABOUTME: Exports all core modules and provides the public API

pub mod cli;
pub mod documents;
pub mod lint;
pub mod market;
pub mod output;
pub mod report;
pub mod template;

// Re-export commonly used types
pub use cli::{App, Args, Config};
pub use documents::{Document, TemplateSource};
pub use lint::{LintReport, Linter};
pub use market::{MarketAnalyzer, MarketSnapshot};
pub use output::OutputHandler;
pub use template::{RenderMode, Syntax, SyntaxChoice, TemplateContext, TemplateEngine};

// Error handling
pub type Result<T> = anyhow::Result<T>;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
