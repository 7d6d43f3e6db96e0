//! Scaffold orchestration
//!
//! A run moves through fixed stages:
//!
//! 1. Resolve the source string (local path or repository reference)
//! 2. Acquire the template into a staging root (remote: a private temp dir)
//! 3. Extract hooks so they outlive the staging root
//! 4. Load `.scaffold/config.json`
//! 5. Run the pre-install hook in the staging root
//! 6. Copy the staging root into the target directory through the ignore list
//! 7. Release the staging root (remote only)
//! 8. Run the template's prompts
//! 9. Run the post-install hook in the target directory
//!
//! Any failure up to and including the copy aborts the run, and temporary
//! staging directories and hook copies are dropped on the way out. After the
//! copy the project is kept: a failing post-install hook is only reported.

use crate::config::ScaffoldConfig;
use crate::error::ScaffoldError;
use crate::prompts::{run_prompts, AnswerMap, PromptBackend, Prompted};
use crate::runtime::{base_env, HookKind, HookScript};
use crate::templates::{copy_template, IgnoreList, TemplateFetcher, TemplateSource};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Pipeline stages reported to the [`Frontend`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Acquire,
    PreInstall,
    Copy,
    Prompt,
    PostInstall,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Acquire => "acquire",
            Stage::PreInstall => "pre-install",
            Stage::Copy => "copy",
            Stage::Prompt => "prompt",
            Stage::PostInstall => "post-install",
        };
        write!(f, "{}", name)
    }
}

/// Everything the orchestrator needs from the user interface.
///
/// Progress callbacks default to no-ops so headless callers stay silent.
pub trait Frontend: PromptBackend {
    fn stage_started(&mut self, _stage: Stage, _detail: &str) {}

    fn stage_finished(&mut self, _stage: Stage, _detail: &str) {}

    fn stage_failed(&mut self, _stage: Stage, _detail: &str) {}

    /// Asked before the post-install hook in interactive mode
    fn confirm_post_install(&mut self) -> io::Result<bool> {
        Ok(true)
    }
}

/// Inputs for one scaffold run
#[derive(Debug, Clone)]
pub struct ScaffoldRequest {
    /// Repository reference or local path
    pub source: String,
    /// Absolute path of the project directory to create
    pub target_dir: PathBuf,
    pub non_interactive: bool,
    /// Base for relative local sources
    pub cwd: PathBuf,
}

/// What happened to a hook during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookStatus {
    NotPresent,
    Succeeded,
    /// The user declined to run it
    Skipped,
    Failed(String),
}

/// Summary of a completed run
#[derive(Debug, Clone)]
pub struct ScaffoldReport {
    pub target_dir: PathBuf,
    pub template_name: Option<String>,
    pub copied_files: Vec<String>,
    pub answers: AnswerMap,
    pub pre_install: HookStatus,
    pub post_install: HookStatus,
}

#[derive(Debug, Clone)]
pub enum ScaffoldOutcome {
    Completed(ScaffoldReport),
    /// The user cancelled a prompt; files already copied are left in place
    Cancelled { target_dir: PathBuf },
}

/// Local directory holding the template for the run
enum Staging {
    /// The user's own template directory; never modified or removed
    Local(PathBuf),
    /// Private download directory, removed on release or drop
    Temporary { dir: TempDir, root: PathBuf },
}

impl Staging {
    fn root(&self) -> &Path {
        match self {
            Staging::Local(path) => path,
            Staging::Temporary { root, .. } => root,
        }
    }

    fn release(self) {
        if let Staging::Temporary { dir, .. } = self {
            let _ = dir.close();
        }
    }
}

/// Runs the scaffold pipeline
pub struct Scaffolder<'a> {
    fetcher: &'a TemplateFetcher,
}

impl<'a> Scaffolder<'a> {
    pub fn new(fetcher: &'a TemplateFetcher) -> Self {
        Self { fetcher }
    }

    pub async fn run<F: Frontend + ?Sized>(
        &self,
        request: &ScaffoldRequest,
        frontend: &mut F,
    ) -> Result<ScaffoldOutcome, ScaffoldError> {
        let target_dir = &request.target_dir;
        if target_dir.exists() {
            return Err(ScaffoldError::TargetExists(target_dir.clone()));
        }

        let source = TemplateSource::resolve(&request.source, &request.cwd)?;

        frontend.stage_started(Stage::Acquire, &source.to_string());
        let staging = match self.acquire(&source).await {
            Ok(staging) => staging,
            Err(e) => {
                frontend.stage_failed(Stage::Acquire, &e.to_string());
                return Err(e);
            }
        };
        frontend.stage_finished(Stage::Acquire, &staging.root().display().to_string());

        let (pre_hook, mut post_hook) = extract_hooks(&staging)?;
        let config = ScaffoldConfig::load(staging.root())?;
        let env = base_env(target_dir, request.non_interactive);

        let pre_install = match pre_hook {
            Some(hook) => {
                frontend.stage_started(Stage::PreInstall, &hook.path().display().to_string());
                let result = hook.run(staging.root(), &env).await;
                hook.release();
                if let Err(e) = result {
                    frontend.stage_failed(Stage::PreInstall, &e.to_string());
                    return Err(e.into());
                }
                frontend.stage_finished(Stage::PreInstall, "");
                HookStatus::Succeeded
            }
            None => HookStatus::NotPresent,
        };

        frontend.stage_started(Stage::Copy, &target_dir.display().to_string());
        if target_dir.exists() {
            frontend.stage_failed(Stage::Copy, "target exists");
            return Err(ScaffoldError::TargetExists(target_dir.clone()));
        }
        let ignore = IgnoreList::new(&config.ignore);
        let copied_files = match copy_template(staging.root(), target_dir, &ignore) {
            Ok(files) => files,
            Err(e) => {
                frontend.stage_failed(Stage::Copy, &format!("{:#}", e));
                return Err(ScaffoldError::Copy(e));
            }
        };
        frontend.stage_finished(
            Stage::Copy,
            &format!("{} files into {}", copied_files.len(), target_dir.display()),
        );

        staging.release();

        let answers = if config.prompts.is_empty() {
            AnswerMap::new()
        } else {
            frontend.stage_started(Stage::Prompt, "");
            match run_prompts(&config.prompts, request.non_interactive, frontend)? {
                Prompted::Answer(answers) => answers,
                Prompted::Cancelled => {
                    return Ok(ScaffoldOutcome::Cancelled {
                        target_dir: target_dir.clone(),
                    })
                }
            }
        };

        let post_install = match post_hook.take() {
            Some(hook) => {
                let approved = request.non_interactive || frontend.confirm_post_install()?;
                if approved {
                    let mut post_env = env.clone();
                    post_env.extend(answers.clone());

                    let script = hook.path().display().to_string();
                    frontend.stage_started(Stage::PostInstall, &script);
                    let result = hook.run(target_dir, &post_env).await;
                    hook.release();
                    match result {
                        Ok(()) => {
                            frontend.stage_finished(Stage::PostInstall, "");
                            HookStatus::Succeeded
                        }
                        Err(e) => {
                            frontend.stage_failed(Stage::PostInstall, &e.to_string());
                            HookStatus::Failed(e.to_string())
                        }
                    }
                } else {
                    hook.release();
                    HookStatus::Skipped
                }
            }
            None => HookStatus::NotPresent,
        };

        Ok(ScaffoldOutcome::Completed(ScaffoldReport {
            target_dir: target_dir.clone(),
            template_name: config.name,
            copied_files,
            answers,
            pre_install,
            post_install,
        }))
    }

    async fn acquire(&self, source: &TemplateSource) -> Result<Staging, ScaffoldError> {
        match source {
            TemplateSource::Local(path) => {
                if !path.is_dir() {
                    return Err(ScaffoldError::LocalNotFound(path.clone()));
                }
                Ok(Staging::Local(path.clone()))
            }
            TemplateSource::Remote(remote) => {
                let dir = tempfile::Builder::new()
                    .prefix("scaffold-")
                    .tempdir()
                    .map_err(ScaffoldError::Staging)?;
                let root = self
                    .fetcher
                    .download(remote, dir.path())
                    .await
                    .map_err(ScaffoldError::Fetch)?;
                Ok(Staging::Temporary { dir, root })
            }
        }
    }
}

/// Local templates keep their hooks in place; downloaded ones get private copies
fn extract_hooks(
    staging: &Staging,
) -> Result<(Option<HookScript>, Option<HookScript>), ScaffoldError> {
    let root = staging.root();
    Ok(match staging {
        Staging::Local(_) => (
            HookScript::in_place(root, HookKind::PreInstall),
            HookScript::in_place(root, HookKind::PostInstall),
        ),
        Staging::Temporary { .. } => (
            HookScript::extract(root, HookKind::PreInstall)?,
            HookScript::extract(root, HookKind::PostInstall)?,
        ),
    })
}
