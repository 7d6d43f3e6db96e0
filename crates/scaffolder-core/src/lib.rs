//! Scaffolder Core - Shared library for the `scaffold` CLI
//!
//! This library materializes a new project directory from a template: a local
//! directory or a repository on GitHub, GitLab, or Bitbucket. Templates can
//! carry a `.scaffold/` directory with a `config.json` (ignore patterns and
//! prompts) and optional `pre-install.sh` / `post-install.sh` hooks.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - Config parsing, source resolution, fetching,
//!   ignore-filtered copying, hook execution, prompt running
//! - **Layer 2: Workflow Orchestration** - `Scaffolder` drives the pipeline and
//!   reports progress through the `Frontend` trait, so custom UIs can plug in
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based TUI prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use scaffolder_core::{Frontend, ScaffoldRequest, Scaffolder, TemplateFetcher};
//!
//! let fetcher = TemplateFetcher::from_env("my-tool")?;
//! let request = ScaffoldRequest {
//!     source: "owner/repo".into(),
//!     target_dir: cwd.join("my-app"),
//!     non_interactive: true,
//!     cwd,
//! };
//! let outcome = Scaffolder::new(&fetcher).run(&request, &mut my_frontend).await?;
//! ```

pub mod config;
pub mod error;
pub mod prompts;
pub mod runtime;
pub mod scaffold;
pub mod templates;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use config::{ConfigError, Prompt, ScaffoldConfig};
pub use error::ScaffoldError;
pub use prompts::{run_prompts, AnswerMap, PromptBackend, PromptError, Prompted};
pub use runtime::{HookKind, HookScript};
pub use scaffold::{
    Frontend, HookStatus, ScaffoldOutcome, ScaffoldReport, ScaffoldRequest, Scaffolder, Stage,
};
pub use templates::{
    copy_template, should_ignore, IgnoreList, TemplateFetcher, TemplateSource, STACKS,
};

#[cfg(feature = "tui")]
pub use tui::run;

/// Product token of the HTTP user agent; the binary appends its version
pub const DEFAULT_USER_AGENT: &str = "scaffold";
