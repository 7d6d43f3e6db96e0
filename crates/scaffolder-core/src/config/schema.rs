//! `.scaffold/config.json` types, parsing, and cross-field validation

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Directory inside a template that holds the config and hook scripts
pub const CONFIG_DIR: &str = ".scaffold";

/// Config file name inside [`CONFIG_DIR`]
pub const CONFIG_FILE: &str = "config.json";

/// A single problem found while validating a config
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// Dotted field path, e.g. `prompts.1.initialValue`
    pub path: String,
    pub message: String,
}

impl Issue {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Errors raised while loading a template config
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in .scaffold/config.json: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Invalid .scaffold/config.json: {}", join_issues(.0))]
    Invalid(Vec<Issue>),
}

fn join_issues(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(Issue::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Template configuration loaded from `.scaffold/config.json`.
///
/// Fields are decoded one at a time by [`ScaffoldConfig::from_value`] so every
/// problem is reported with its path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScaffoldConfig {
    /// Display name of the template (informational only)
    pub name: Option<String>,

    /// Description of the template (informational only)
    pub description: Option<String>,

    /// Extra ignore patterns, appended to the built-in list
    pub ignore: Vec<String>,

    /// Prompts run after the copy, in declaration order
    pub prompts: Vec<Prompt>,
}

/// One choice in a select or multiselect prompt.
///
/// A bare string `"x"` in the config is shorthand for `{ "value": "x", "label": "x" }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawOption")]
pub struct PromptOption {
    pub value: String,
    pub label: String,
    pub hint: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOption {
    Bare(String),
    Full {
        value: String,
        label: String,
        #[serde(default)]
        hint: Option<String>,
    },
}

impl From<RawOption> for PromptOption {
    fn from(raw: RawOption) -> Self {
        match raw {
            RawOption::Bare(value) => Self {
                label: value.clone(),
                value,
                hint: None,
            },
            RawOption::Full { value, label, hint } => Self { value, label, hint },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextPrompt {
    pub name: String,
    pub message: String,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub initial_value: Option<String>,
}

/// Password prompts have no `initialValue`, so they can never resolve unattended
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordPrompt {
    pub name: String,
    pub message: String,
    #[serde(default)]
    pub mask: Option<char>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectPrompt {
    pub name: String,
    pub message: String,
    pub options: Vec<PromptOption>,
    #[serde(default)]
    pub initial_value: Option<String>,
    /// Display hint only
    #[serde(default)]
    pub max_items: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPrompt {
    pub name: String,
    pub message: String,
    #[serde(default)]
    pub active: Option<String>,
    #[serde(default)]
    pub inactive: Option<String>,
    #[serde(default)]
    pub initial_value: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiSelectPrompt {
    pub name: String,
    pub message: String,
    pub options: Vec<PromptOption>,
    #[serde(default)]
    pub initial_value: Option<Vec<String>>,
    #[serde(default)]
    pub max_items: Option<usize>,
    /// Require at least one selection
    #[serde(default)]
    pub required: Option<bool>,
}

/// One question in a template, tagged by its `type` field
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Prompt {
    Text(TextPrompt),
    Password(PasswordPrompt),
    Select(SelectPrompt),
    Confirm(ConfirmPrompt),
    #[serde(rename = "multiselect")]
    MultiSelect(MultiSelectPrompt),
}

impl Prompt {
    pub fn name(&self) -> &str {
        match self {
            Prompt::Text(p) => &p.name,
            Prompt::Password(p) => &p.name,
            Prompt::Select(p) => &p.name,
            Prompt::Confirm(p) => &p.name,
            Prompt::MultiSelect(p) => &p.name,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Prompt::Text(p) => &p.message,
            Prompt::Password(p) => &p.message,
            Prompt::Select(p) => &p.message,
            Prompt::Confirm(p) => &p.message,
            Prompt::MultiSelect(p) => &p.message,
        }
    }

    /// The `type` tag as written in the config
    pub fn kind(&self) -> &'static str {
        match self {
            Prompt::Text(_) => "text",
            Prompt::Password(_) => "password",
            Prompt::Select(_) => "select",
            Prompt::Confirm(_) => "confirm",
            Prompt::MultiSelect(_) => "multiselect",
        }
    }

    /// Declared default rendered as an answer string, if the prompt has one
    pub fn default_answer(&self) -> Option<String> {
        match self {
            Prompt::Text(p) => p.initial_value.clone(),
            Prompt::Password(_) => None,
            Prompt::Select(p) => p.initial_value.clone(),
            Prompt::Confirm(p) => p.initial_value.map(|v| v.to_string()),
            Prompt::MultiSelect(p) => p.initial_value.as_ref().map(|v| v.join(",")),
        }
    }

    fn validate(&self, path: &str, issues: &mut Vec<Issue>) {
        check_name(path, self.name(), issues);

        match self {
            Prompt::Text(_) | Prompt::Password(_) | Prompt::Confirm(_) => {}
            Prompt::Select(p) => {
                validate_options(path, &p.options, issues);
                validate_max_items(path, p.max_items, issues);
                if let Some(initial) = &p.initial_value {
                    if !p.options.is_empty() && !has_option(&p.options, initial) {
                        issues.push(Issue::new(
                            format!("{}.initialValue", path),
                            format!("'{}' is not one of the option values", initial),
                        ));
                    }
                }
            }
            Prompt::MultiSelect(p) => {
                validate_options(path, &p.options, issues);
                validate_max_items(path, p.max_items, issues);
                if let Some(initial) = &p.initial_value {
                    for (i, value) in initial.iter().enumerate() {
                        if !p.options.is_empty() && !has_option(&p.options, value) {
                            issues.push(Issue::new(
                                format!("{}.initialValue.{}", path, i),
                                format!("'{}' is not one of the option values", value),
                            ));
                        }
                    }
                }
            }
        }
    }
}

fn has_option(options: &[PromptOption], value: &str) -> bool {
    options.iter().any(|o| o.value == value)
}

fn validate_options(path: &str, options: &[PromptOption], issues: &mut Vec<Issue>) {
    if options.is_empty() {
        issues.push(Issue::new(
            format!("{}.options", path),
            "needs at least one option",
        ));
    }
}

fn validate_max_items(path: &str, max_items: Option<usize>, issues: &mut Vec<Issue>) {
    if max_items == Some(0) {
        issues.push(Issue::new(
            format!("{}.maxItems", path),
            "must be a positive number",
        ));
    }
}

/// Check a prompt name against `^[A-Za-z_][A-Za-z0-9_]*$`
pub fn is_env_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn check_name(path: &str, name: &str, issues: &mut Vec<Issue>) {
    if !is_env_identifier(name) {
        issues.push(Issue::new(
            format!("{}.name", path),
            "must be valid env var name (letters, numbers, underscore)",
        ));
    }
}

/// Names become `SCAFFOLD_<NAME>` variables, so uniqueness ignores case
fn check_unique(path: &str, name: &str, seen: &mut HashSet<String>, issues: &mut Vec<Issue>) {
    if !seen.insert(name.to_uppercase()) {
        issues.push(Issue::new(
            format!("{}.name", path),
            format!(
                "prompt names must be unique, ignoring case ('{}' is repeated)",
                name
            ),
        ));
    }
}

/// Decode one top-level field, recording a failure under its key
fn take_field<T: DeserializeOwned>(
    fields: &mut Map<String, Value>,
    key: &str,
    issues: &mut Vec<Issue>,
) -> Option<T> {
    let value = fields.remove(key)?;
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            issues.push(Issue::new(key, e.to_string()));
            None
        }
    }
}

impl ScaffoldConfig {
    /// Parse and validate a config document
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(raw).map_err(ConfigError::InvalidJson)?;
        Self::from_value(value)
    }

    /// Decode and validate an already-parsed JSON value.
    ///
    /// Structural and cross-field problems are collected together, each
    /// tagged with its field path; a prompt that fails to decode still has
    /// its `name` checked.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let Value::Object(mut fields) = value else {
            return Err(ConfigError::Invalid(vec![Issue::new(
                "",
                "expected a JSON object",
            )]));
        };

        let mut issues = Vec::new();
        let name = take_field::<Option<String>>(&mut fields, "name", &mut issues).flatten();
        let description =
            take_field::<Option<String>>(&mut fields, "description", &mut issues).flatten();
        let ignore = take_field::<Vec<String>>(&mut fields, "ignore", &mut issues)
            .unwrap_or_default();

        let mut prompts = Vec::new();
        let mut seen = HashSet::new();
        match fields.remove("prompts") {
            None => {}
            Some(Value::Array(items)) => {
                for (i, item) in items.into_iter().enumerate() {
                    let path = format!("prompts.{}", i);
                    let raw_name = item.get("name").and_then(Value::as_str).map(str::to_string);

                    match serde_json::from_value::<Prompt>(item) {
                        Ok(prompt) => {
                            prompt.validate(&path, &mut issues);
                            check_unique(&path, prompt.name(), &mut seen, &mut issues);
                            prompts.push(prompt);
                        }
                        Err(e) => {
                            issues.push(Issue::new(path.clone(), e.to_string()));
                            if let Some(name) = raw_name {
                                check_name(&path, &name, &mut issues);
                                check_unique(&path, &name, &mut seen, &mut issues);
                            }
                        }
                    }
                }
            }
            Some(_) => issues.push(Issue::new("prompts", "expected an array of prompts")),
        }

        if issues.is_empty() {
            Ok(Self {
                name,
                description,
                ignore,
                prompts,
            })
        } else {
            Err(ConfigError::Invalid(issues))
        }
    }

    /// Load `<template>/.scaffold/config.json`; a missing file yields the empty config
    pub fn load(template_root: &Path) -> Result<Self, ConfigError> {
        let path = template_root.join(CONFIG_DIR).join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Cross-field checks on already-decoded prompts, in encounter order
    pub fn validate(&self) -> Vec<Issue> {
        let mut issues = Vec::new();
        let mut seen = HashSet::new();

        for (i, prompt) in self.prompts.iter().enumerate() {
            let path = format!("prompts.{}", i);
            prompt.validate(&path, &mut issues);
            check_unique(&path, prompt.name(), &mut seen, &mut issues);
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Result<ScaffoldConfig, ConfigError> {
        ScaffoldConfig::from_value(value)
    }

    fn issues(value: serde_json::Value) -> Vec<Issue> {
        match parse(value) {
            Err(ConfigError::Invalid(issues)) => issues,
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_object_is_empty_config() {
        let config = parse(json!({})).unwrap();
        assert_eq!(config, ScaffoldConfig::default());
        assert!(config.name.is_none());
        assert!(config.description.is_none());
        assert!(config.ignore.is_empty());
        assert!(config.prompts.is_empty());
    }

    #[test]
    fn test_full_config_without_prompts() {
        let config = parse(json!({
            "name": "my-stack",
            "description": "A stack",
            "ignore": ["node_modules", "*.log"]
        }))
        .unwrap();
        assert_eq!(config.name.as_deref(), Some("my-stack"));
        assert_eq!(config.ignore, vec!["node_modules", "*.log"]);
    }

    #[test]
    fn test_every_prompt_kind_parses() {
        let config = parse(json!({
            "prompts": [
                { "name": "app_name", "type": "text", "message": "App name?", "initialValue": "my-app" },
                { "name": "token", "type": "password", "message": "Token?", "mask": "*" },
                { "name": "ui", "type": "select", "message": "UI?", "options": ["tailwind", "bootstrap"], "initialValue": "tailwind" },
                { "name": "typescript", "type": "confirm", "message": "Use TypeScript?", "initialValue": true },
                { "name": "features", "type": "multiselect", "message": "Features?", "options": ["auth", "api", "admin"], "initialValue": ["auth"] }
            ]
        }))
        .unwrap();

        let kinds: Vec<_> = config.prompts.iter().map(Prompt::kind).collect();
        assert_eq!(
            kinds,
            vec!["text", "password", "select", "confirm", "multiselect"]
        );
        match &config.prompts[1] {
            Prompt::Password(p) => assert_eq!(p.mask, Some('*')),
            other => panic!("unexpected prompt {:?}", other),
        }
    }

    #[test]
    fn test_bare_and_object_options_normalize() {
        let config = parse(json!({
            "prompts": [{
                "name": "ui",
                "type": "select",
                "message": "UI?",
                "options": [
                    "plain",
                    { "value": "tailwind", "label": "Tailwind CSS", "hint": "utility-first" }
                ]
            }]
        }))
        .unwrap();

        let Prompt::Select(select) = &config.prompts[0] else {
            panic!("expected select");
        };
        assert_eq!(select.options[0].value, "plain");
        assert_eq!(select.options[0].label, "plain");
        assert_eq!(select.options[1].label, "Tailwind CSS");
        assert_eq!(select.options[1].hint.as_deref(), Some("utility-first"));
    }

    #[test]
    fn test_invalid_prompt_name_rejected() {
        let found = issues(json!({
            "prompts": [{ "name": "my-app", "type": "text", "message": "Name?" }]
        }));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, "prompts.0.name");
    }

    #[test]
    fn test_select_without_options_rejected() {
        let err = parse(json!({
            "prompts": [{ "name": "ui", "type": "select", "message": "UI?" }]
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("options"));
    }

    #[test]
    fn test_empty_options_rejected() {
        let found = issues(json!({
            "prompts": [{ "name": "ui", "type": "select", "message": "UI?", "options": [] }]
        }));
        assert_eq!(found[0].path, "prompts.0.options");
    }

    #[test]
    fn test_select_initial_value_must_be_an_option() {
        let err = parse(json!({
            "prompts": [{
                "name": "ui",
                "type": "select",
                "message": "UI?",
                "options": ["tailwind", "bootstrap"],
                "initialValue": "bulma"
            }]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("initialValue"));
    }

    #[test]
    fn test_multiselect_initial_values_must_be_options() {
        let found = issues(json!({
            "prompts": [{
                "name": "features",
                "type": "multiselect",
                "message": "Features?",
                "options": [{ "value": "auth", "label": "Auth" }],
                "initialValue": ["auth", "billing"]
            }]
        }));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, "prompts.0.initialValue.1");
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = parse(json!({
            "prompts": [
                { "name": "features", "type": "multiselect", "message": "A?", "options": ["a"] },
                { "name": "features", "type": "multiselect", "message": "B?", "options": ["b"] }
            ]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("unique"));
    }

    #[test]
    fn test_issues_are_aggregated_in_order() {
        let err = parse(json!({
            "prompts": [
                { "name": "bad-name", "type": "text", "message": "?" },
                { "name": "ui", "type": "select", "message": "?", "options": [], "maxItems": 0 }
            ]
        }))
        .unwrap_err();

        let ConfigError::Invalid(found) = &err else {
            panic!("expected validation failure");
        };
        let paths: Vec<_> = found.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["prompts.0.name", "prompts.1.options", "prompts.1.maxItems"]
        );
        assert!(err.to_string().contains(", prompts.1.options"));
    }

    #[test]
    fn test_structural_and_cross_field_issues_reported_together() {
        let found = issues(json!({
            "prompts": [
                { "name": "bad-name", "type": "text", "message": "?" },
                { "name": "ui", "type": "select", "message": "?" }
            ]
        }));

        let paths: Vec<_> = found.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["prompts.0.name", "prompts.1"]);
        assert!(found[1].message.contains("options"));
    }

    #[test]
    fn test_undecodable_prompt_still_checks_name() {
        let found = issues(json!({
            "prompts": [
                { "name": "ok", "type": "text", "message": "?" },
                { "name": "OK", "type": "select", "message": "?" },
                { "name": "my-app", "type": "slider", "message": "?" }
            ]
        }));

        let paths: Vec<_> = found.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["prompts.1", "prompts.1.name", "prompts.2", "prompts.2.name"]
        );
    }

    #[test]
    fn test_top_level_type_errors_carry_field_path() {
        let found = issues(json!({ "name": 5, "ignore": "tmp" }));

        let paths: Vec<_> = found.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["name", "ignore"]);
        let err = parse(json!({ "ignore": "tmp" })).unwrap_err();
        assert!(err.to_string().starts_with("Invalid .scaffold/config.json: ignore: "));
    }

    #[test]
    fn test_prompts_must_be_an_array() {
        let found = issues(json!({ "prompts": { "name": "x" } }));
        assert_eq!(found[0].path, "prompts");
        assert!(parse(json!(["not", "an", "object"])).is_err());
    }

    #[test]
    fn test_names_differing_only_by_case_rejected() {
        let found = issues(json!({
            "prompts": [
                { "name": "app", "type": "text", "message": "?" },
                { "name": "APP", "type": "text", "message": "?" }
            ]
        }));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, "prompts.1.name");
        assert!(found[0].message.contains("unique"));
    }

    #[test]
    fn test_unknown_top_level_fields_ignored() {
        let config = parse(json!({ "name": "x", "$schema": "./schema.json" })).unwrap();
        assert_eq!(config.name.as_deref(), Some("x"));
    }

    #[test]
    fn test_malformed_json_is_distinct_error() {
        let err = ScaffoldConfig::parse("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidJson(_)));
    }

    #[test]
    fn test_unknown_prompt_type_rejected() {
        let err = parse(json!({
            "prompts": [{ "name": "x", "type": "slider", "message": "?" }]
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_missing_file_is_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = ScaffoldConfig::load(dir.path()).unwrap();
        assert_eq!(config, ScaffoldConfig::default());
    }

    #[test]
    fn test_load_reads_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(CONFIG_DIR)).unwrap();
        std::fs::write(
            dir.path().join(CONFIG_DIR).join(CONFIG_FILE),
            r#"{ "name": "test-template", "ignore": ["*.log", "tmp"] }"#,
        )
        .unwrap();

        let config = ScaffoldConfig::load(dir.path()).unwrap();
        assert_eq!(config.name.as_deref(), Some("test-template"));
        assert_eq!(config.ignore, vec!["*.log", "tmp"]);
    }

    #[test]
    fn test_default_answers() {
        let config = parse(json!({
            "prompts": [
                { "name": "ts", "type": "confirm", "message": "?", "initialValue": false },
                { "name": "f", "type": "multiselect", "message": "?", "options": ["a", "b"], "initialValue": ["a", "b"] }
            ]
        }))
        .unwrap();
        assert_eq!(config.prompts[0].default_answer().as_deref(), Some("false"));
        assert_eq!(config.prompts[1].default_answer().as_deref(), Some("a,b"));
    }

    #[test]
    fn test_env_identifier() {
        assert!(is_env_identifier("app_name"));
        assert!(is_env_identifier("_private"));
        assert!(is_env_identifier("A1"));
        assert!(!is_env_identifier("1abc"));
        assert!(!is_env_identifier("my-app"));
        assert!(!is_env_identifier(""));
    }
}
