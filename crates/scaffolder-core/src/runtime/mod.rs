//! External process execution
//!
//! This module provides:
//! - Pre/post-install hook extraction and execution

pub mod hook;

pub use hook::{base_env, HookError, HookKind, HookScript, NON_INTERACTIVE_ENV, TARGET_ENV};
