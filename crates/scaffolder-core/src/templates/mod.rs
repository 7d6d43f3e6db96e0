//! Template acquisition, filtering, and copying
//!
//! This module provides:
//! - Source classification (local directory vs. provider repository)
//! - Remote template download and archive extraction
//! - Ignore-pattern matching and filtered recursive copy
//! - The curated stack list

pub mod copier;
pub mod fetcher;
pub mod ignore;
pub mod source;
pub mod stacks;

pub use copier::copy_template;
pub use fetcher::TemplateFetcher;
pub use ignore::{should_ignore, IgnoreList, DEFAULT_IGNORE};
pub use source::{Provider, RemoteRef, SourceError, TemplateSource};
pub use stacks::{find_stack, Stack, STACKS};
