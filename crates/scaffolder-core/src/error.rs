//! Error taxonomy for a scaffold run

use crate::config::ConfigError;
use crate::prompts::PromptError;
use crate::runtime::HookError;
use crate::templates::SourceError;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can abort a scaffold run.
///
/// A failing post-install hook is not an error: it is reported through
/// [`crate::scaffold::HookStatus::Failed`] and the project is kept.
#[derive(Debug, Error)]
pub enum ScaffoldError {
    #[error("Directory \"{}\" already exists", .0.display())]
    TargetExists(PathBuf),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Local path not found: {}", .0.display())]
    LocalNotFound(PathBuf),

    #[error("Failed to create staging directory: {0}")]
    Staging(#[source] std::io::Error),

    #[error("{0:#}")]
    Fetch(anyhow::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Hook(#[from] HookError),

    #[error("{0:#}")]
    Copy(anyhow::Error),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
