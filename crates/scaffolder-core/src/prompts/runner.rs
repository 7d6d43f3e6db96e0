//! Runs a template's prompts and turns the answers into hook variables

use crate::config::{
    ConfirmPrompt, MultiSelectPrompt, PasswordPrompt, Prompt, SelectPrompt, TextPrompt,
};
use std::collections::{BTreeMap, HashSet};
use std::io;
use thiserror::Error;

/// Prefix for every answer variable
pub const ENV_PREFIX: &str = "SCAFFOLD_";

/// Answer variables keyed by `SCAFFOLD_<NAME>`
pub type AnswerMap = BTreeMap<String, String>;

/// Result of an interactive question: an answer or a user cancellation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompted<T> {
    Answer(T),
    Cancelled,
}

impl<T> Prompted<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Prompted<U> {
        match self {
            Prompted::Answer(value) => Prompted::Answer(f(value)),
            Prompted::Cancelled => Prompted::Cancelled,
        }
    }
}

/// Interactive capability that renders one question of each kind
pub trait PromptBackend {
    fn text(&mut self, prompt: &TextPrompt) -> io::Result<Prompted<String>>;
    fn password(&mut self, prompt: &PasswordPrompt) -> io::Result<Prompted<String>>;
    fn select(&mut self, prompt: &SelectPrompt) -> io::Result<Prompted<String>>;
    fn confirm(&mut self, prompt: &ConfirmPrompt) -> io::Result<Prompted<bool>>;
    fn multiselect(&mut self, prompt: &MultiSelectPrompt) -> io::Result<Prompted<Vec<String>>>;
}

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Duplicate prompt name \"{0}\"")]
    DuplicateName(String),

    #[error("Password prompt \"{0}\" cannot run in non-interactive mode (-y)")]
    PasswordNonInteractive(String),

    #[error("Prompt \"{0}\" needs initialValue for non-interactive mode (-y)")]
    MissingDefault(String),

    #[error("Prompt \"{name}\" failed: {source}")]
    Terminal {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// Environment key for a prompt name
pub fn env_key(name: &str) -> String {
    format!("{}{}", ENV_PREFIX, name.to_uppercase())
}

/// Escape a value for use inside a POSIX single-quoted string
pub fn shell_escape(value: &str) -> String {
    value.replace('\'', "'\\''")
}

/// Run `prompts` in order.
///
/// In non-interactive mode every prompt resolves to its declared default;
/// a password prompt or a prompt without a default fails the run. A user
/// cancellation stops immediately and yields [`Prompted::Cancelled`].
pub fn run_prompts<B: PromptBackend + ?Sized>(
    prompts: &[Prompt],
    non_interactive: bool,
    backend: &mut B,
) -> Result<Prompted<AnswerMap>, PromptError> {
    let mut answers = AnswerMap::new();
    let mut seen = HashSet::new();

    for prompt in prompts {
        let name = prompt.name();
        let key = env_key(name);
        if !seen.insert(key.clone()) {
            return Err(PromptError::DuplicateName(name.to_string()));
        }

        let answer = if non_interactive {
            resolve_default(prompt)?
        } else {
            match ask(prompt, backend) {
                Ok(Prompted::Answer(answer)) => answer,
                Ok(Prompted::Cancelled) => return Ok(Prompted::Cancelled),
                Err(source) => {
                    return Err(PromptError::Terminal {
                        name: name.to_string(),
                        source,
                    })
                }
            }
        };

        answers.insert(key, shell_escape(&answer));
    }

    Ok(Prompted::Answer(answers))
}

fn resolve_default(prompt: &Prompt) -> Result<String, PromptError> {
    if let Prompt::Password(p) = prompt {
        return Err(PromptError::PasswordNonInteractive(p.name.clone()));
    }
    prompt
        .default_answer()
        .ok_or_else(|| PromptError::MissingDefault(prompt.name().to_string()))
}

fn ask<B: PromptBackend + ?Sized>(
    prompt: &Prompt,
    backend: &mut B,
) -> io::Result<Prompted<String>> {
    Ok(match prompt {
        Prompt::Text(p) => backend.text(p)?,
        Prompt::Password(p) => backend.password(p)?,
        Prompt::Select(p) => backend.select(p)?,
        Prompt::Confirm(p) => backend.confirm(p)?.map(|v| v.to_string()),
        Prompt::MultiSelect(p) => backend.multiselect(p)?.map(|v| v.join(",")),
    })
}
