//! Pre/post-install hook scripts
//!
//! Hooks live at `<template>/.scaffold/{pre,post}-install.sh` and run through
//! `sh` with the parent's stdio, so their output streams live.

use crate::config::CONFIG_DIR;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::process::Command as TokioCommand;

/// Absolute path of the project being created
pub const TARGET_ENV: &str = "SCAFFOLD_TARGET";

/// `"1"` in non-interactive mode, empty otherwise
pub const NON_INTERACTIVE_ENV: &str = "SCAFFOLD_NON_INTERACTIVE";

/// Which hook a script implements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    PreInstall,
    PostInstall,
}

impl HookKind {
    pub fn name(&self) -> &'static str {
        match self {
            HookKind::PreInstall => "pre-install",
            HookKind::PostInstall => "post-install",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.sh", self.name())
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Error)]
pub enum HookError {
    #[error("Failed to extract {kind} hook: {source}")]
    Extract {
        kind: HookKind,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start {kind} hook: {source}")]
    Spawn {
        kind: HookKind,
        #[source]
        source: std::io::Error,
    },

    #[error("{kind} hook failed ({status})")]
    Failed { kind: HookKind, status: ExitStatus },
}

/// A hook script ready to run
#[derive(Debug)]
pub enum HookScript {
    /// Referenced inside a template directory that outlives the run
    InPlace { kind: HookKind, path: PathBuf },
    /// Private copy that survives deletion of the staging directory
    Extracted { kind: HookKind, file: NamedTempFile },
}

impl HookScript {
    /// Location of a hook inside a template, if the template ships one
    pub fn locate(template_root: &Path, kind: HookKind) -> Option<PathBuf> {
        let path = template_root.join(CONFIG_DIR).join(kind.file_name());
        path.is_file().then_some(path)
    }

    /// Reference a hook where it lives
    pub fn in_place(template_root: &Path, kind: HookKind) -> Option<Self> {
        Self::locate(template_root, kind).map(|path| Self::InPlace { kind, path })
    }

    /// Copy a hook into its own temporary file
    pub fn extract(template_root: &Path, kind: HookKind) -> Result<Option<Self>, HookError> {
        let Some(path) = Self::locate(template_root, kind) else {
            return Ok(None);
        };

        let io_err = |source| HookError::Extract { kind, source };
        let mut file = tempfile::Builder::new()
            .prefix(&format!("scaffold-{}-", kind.name()))
            .suffix(".sh")
            .tempfile()
            .map_err(io_err)?;
        let mut script = File::open(&path).map_err(io_err)?;
        std::io::copy(&mut script, file.as_file_mut()).map_err(io_err)?;

        Ok(Some(Self::Extracted { kind, file }))
    }

    pub fn kind(&self) -> HookKind {
        match self {
            Self::InPlace { kind, .. } | Self::Extracted { kind, .. } => *kind,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::InPlace { path, .. } => path,
            Self::Extracted { file, .. } => file.path(),
        }
    }

    /// Run the script with `sh` in `cwd`, adding `env` to the inherited environment
    pub async fn run(&self, cwd: &Path, env: &BTreeMap<String, String>) -> Result<(), HookError> {
        let kind = self.kind();
        let status = TokioCommand::new("sh")
            .arg(self.path())
            .current_dir(cwd)
            .envs(env)
            .status()
            .await
            .map_err(|source| HookError::Spawn { kind, source })?;

        if status.success() {
            Ok(())
        } else {
            Err(HookError::Failed { kind, status })
        }
    }

    /// Delete an extracted copy; in-place scripts are left alone.
    /// Deletion failures are not reported.
    pub fn release(self) {
        if let Self::Extracted { file, .. } = self {
            let _ = file.close();
        }
    }
}

/// Variables every hook receives
pub fn base_env(target_dir: &Path, non_interactive: bool) -> BTreeMap<String, String> {
    let mut env = BTreeMap::new();
    env.insert(TARGET_ENV.to_string(), target_dir.display().to_string());
    env.insert(
        NON_INTERACTIVE_ENV.to_string(),
        if non_interactive { "1" } else { "" }.to_string(),
    );
    env
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn template_with_hook(kind: HookKind, body: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(CONFIG_DIR)).unwrap();
        fs::write(dir.path().join(CONFIG_DIR).join(kind.file_name()), body).unwrap();
        dir
    }

    #[test]
    fn test_missing_hook() {
        let dir = TempDir::new().unwrap();
        assert!(HookScript::in_place(dir.path(), HookKind::PreInstall).is_none());
        assert!(HookScript::extract(dir.path(), HookKind::PreInstall)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_extracted_hook_survives_template_removal() {
        let dir = template_with_hook(HookKind::PostInstall, "echo hi\n");
        let hook = HookScript::extract(dir.path(), HookKind::PostInstall)
            .unwrap()
            .unwrap();
        dir.close().unwrap();

        let path = hook.path().to_path_buf();
        assert_eq!(fs::read_to_string(&path).unwrap(), "echo hi\n");

        hook.release();
        assert!(!path.exists());
    }

    #[test]
    fn test_in_place_release_keeps_script() {
        let dir = template_with_hook(HookKind::PreInstall, "true\n");
        let hook = HookScript::in_place(dir.path(), HookKind::PreInstall).unwrap();
        let path = hook.path().to_path_buf();
        hook.release();
        assert!(path.exists());
    }

    #[test]
    fn test_base_env() {
        let env = base_env(Path::new("/work/app"), true);
        assert_eq!(env[TARGET_ENV], "/work/app");
        assert_eq!(env[NON_INTERACTIVE_ENV], "1");
        assert_eq!(base_env(Path::new("/x"), false)[NON_INTERACTIVE_ENV], "");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_passes_env_and_cwd() {
        let dir = template_with_hook(
            HookKind::PostInstall,
            "printf '%s|%s' \"$SCAFFOLD_TARGET\" \"$SCAFFOLD_NAME\" > out.txt\n",
        );
        let work = TempDir::new().unwrap();
        let hook = HookScript::in_place(dir.path(), HookKind::PostInstall).unwrap();

        let mut env = base_env(work.path(), false);
        env.insert("SCAFFOLD_NAME".to_string(), "demo".to_string());
        hook.run(work.path(), &env).await.unwrap();

        let out = fs::read_to_string(work.path().join("out.txt")).unwrap();
        assert_eq!(out, format!("{}|demo", work.path().display()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_reports_failure() {
        let dir = template_with_hook(HookKind::PreInstall, "exit 3\n");
        let hook = HookScript::extract(dir.path(), HookKind::PreInstall)
            .unwrap()
            .unwrap();

        let err = hook
            .run(dir.path(), &BTreeMap::new())
            .await
            .unwrap_err();
        match err {
            HookError::Failed { kind, status } => {
                assert_eq!(kind, HookKind::PreInstall);
                assert_eq!(status.code(), Some(3));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
