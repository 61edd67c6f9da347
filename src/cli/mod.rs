// ABOUTME: CLI module for applytrack
// ABOUTME: Exports command line interface components and main application logic

pub mod app;
pub mod args;
pub mod commands;
pub mod config;

pub use app::App;
pub use args::{Args, Commands, TemplatesAction};
pub use config::Config;
