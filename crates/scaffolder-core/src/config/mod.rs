//! Template configuration (`.scaffold/config.json`)
//!
//! This module provides:
//! - The prompt DSL types (`Prompt` and its per-kind payloads)
//! - Loading and cross-field validation of `ScaffoldConfig`

pub mod schema;

pub use schema::{
    ConfigError, ConfirmPrompt, Issue, MultiSelectPrompt, PasswordPrompt, Prompt, PromptOption,
    ScaffoldConfig, SelectPrompt, TextPrompt, CONFIG_DIR, CONFIG_FILE,
};
