//! Prompt execution
//!
//! The runner is independent of any terminal library: interactive questions
//! go through the [`PromptBackend`] trait, and cancellation is returned as
//! [`Prompted::Cancelled`] rather than exiting the process.

pub mod runner;

pub use runner::{
    env_key, run_prompts, shell_escape, AnswerMap, PromptBackend, PromptError, Prompted,
    ENV_PREFIX,
};
