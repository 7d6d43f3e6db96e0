//! Charm-style CLI prompts using cliclack

use crate::config::{
    ConfirmPrompt, MultiSelectPrompt, PasswordPrompt, SelectPrompt, TextPrompt,
};
use crate::prompts::{PromptBackend, Prompted};
use crate::scaffold::{Frontend, HookStatus, ScaffoldOutcome, ScaffoldRequest, Scaffolder, Stage};
use crate::templates::{find_stack, TemplateFetcher, TemplateSource, STACKS};
use anyhow::{Context, Result};
use colored::Colorize;
use std::io;
use std::path::{Path, PathBuf};

/// CLI arguments for the create command
#[derive(Debug, Clone, Default)]
pub struct CreateArgs {
    /// Project name; becomes the target directory under the current directory
    pub name: Option<String>,

    /// Repository reference or local path
    pub from: Option<String>,

    /// Curated stack name (ignored when `from` is set)
    pub stack: Option<String>,

    /// Non-interactive mode: never prompt, use declared defaults
    pub yes: bool,
}

/// Map cliclack's Esc/Ctrl-C signal to a cancellation
fn prompted<T>(result: io::Result<T>) -> io::Result<Prompted<T>> {
    match result {
        Ok(value) => Ok(Prompted::Answer(value)),
        Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(Prompted::Cancelled),
        Err(e) => Err(e),
    }
}

/// cliclack implementation of the orchestrator's frontend
#[derive(Default)]
pub struct ClackFrontend {
    spinner: Option<cliclack::ProgressBar>,
}

impl ClackFrontend {
    pub fn new() -> Self {
        Self::default()
    }

    fn start_spinner(&mut self, message: String) {
        let spinner = cliclack::spinner();
        spinner.start(message);
        self.spinner = Some(spinner);
    }

    fn stop_spinner(&mut self, message: String) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop(message);
        }
    }
}

impl PromptBackend for ClackFrontend {
    fn text(&mut self, prompt: &TextPrompt) -> io::Result<Prompted<String>> {
        let mut input = cliclack::input(&prompt.message).required(false);
        if let Some(placeholder) = &prompt.placeholder {
            input = input.placeholder(placeholder);
        }
        if let Some(initial) = &prompt.initial_value {
            input = input.default_input(initial);
        }
        prompted(input.interact())
    }

    fn password(&mut self, prompt: &PasswordPrompt) -> io::Result<Prompted<String>> {
        let mut password = cliclack::password(&prompt.message);
        if let Some(mask) = prompt.mask {
            password = password.mask(mask);
        }
        prompted(password.interact())
    }

    fn select(&mut self, prompt: &SelectPrompt) -> io::Result<Prompted<String>> {
        let mut select = cliclack::select(&prompt.message);
        for option in &prompt.options {
            select = select.item(
                option.value.clone(),
                &option.label,
                option.hint.as_deref().unwrap_or(""),
            );
        }
        if let Some(initial) = &prompt.initial_value {
            select = select.initial_value(initial.clone());
        }
        if let Some(max_items) = prompt.max_items {
            select = select.max_rows(max_items);
        }
        prompted(select.interact())
    }

    fn confirm(&mut self, prompt: &ConfirmPrompt) -> io::Result<Prompted<bool>> {
        // cliclack's confirm has fixed Yes/No labels; custom labels need a select
        if prompt.active.is_some() || prompt.inactive.is_some() {
            let mut select = cliclack::select(&prompt.message)
                .item(true, prompt.active.as_deref().unwrap_or("Yes"), "")
                .item(false, prompt.inactive.as_deref().unwrap_or("No"), "")
                .initial_value(prompt.initial_value.unwrap_or(true));
            return prompted(select.interact());
        }

        let mut confirm = cliclack::confirm(&prompt.message);
        if let Some(initial) = prompt.initial_value {
            confirm = confirm.initial_value(initial);
        }
        prompted(confirm.interact())
    }

    fn multiselect(&mut self, prompt: &MultiSelectPrompt) -> io::Result<Prompted<Vec<String>>> {
        let mut multi = cliclack::multiselect(&prompt.message);
        for option in &prompt.options {
            multi = multi.item(
                option.value.clone(),
                &option.label,
                option.hint.as_deref().unwrap_or(""),
            );
        }
        if let Some(initial) = &prompt.initial_value {
            multi = multi.initial_values(initial.clone());
        }
        if let Some(max_items) = prompt.max_items {
            multi = multi.max_rows(max_items);
        }
        prompted(multi.required(prompt.required.unwrap_or(true)).interact())
    }
}

impl Frontend for ClackFrontend {
    fn stage_started(&mut self, stage: Stage, detail: &str) {
        match stage {
            Stage::Acquire => self.start_spinner(format!("Fetching {}", detail.cyan())),
            Stage::Copy => self.start_spinner("Copying files...".to_string()),
            Stage::PreInstall => {
                let _ = cliclack::log::step("Running pre-install hook...");
            }
            Stage::PostInstall => {
                let _ = cliclack::log::step("Running post-install hook...");
            }
            Stage::Prompt => {}
        }
    }

    fn stage_finished(&mut self, stage: Stage, detail: &str) {
        match stage {
            Stage::Acquire => self.stop_spinner("Template ready".to_string()),
            Stage::Copy => self.stop_spinner(format!("Scaffolded {}", detail)),
            Stage::PreInstall => {
                let _ = cliclack::log::success("Pre-install complete");
            }
            Stage::PostInstall => {
                let _ = cliclack::log::success("Post-install complete");
            }
            Stage::Prompt => {}
        }
    }

    fn stage_failed(&mut self, stage: Stage, detail: &str) {
        match stage {
            Stage::Acquire | Stage::Copy => self.stop_spinner("Failed to scaffold".to_string()),
            Stage::PreInstall => {
                let _ = cliclack::log::error(format!("Pre-install failed: {}", detail));
            }
            Stage::PostInstall => {
                let _ = cliclack::log::warning(format!(
                    "Post-install failed (continuing anyway): {}",
                    detail
                ));
            }
            Stage::Prompt => {}
        }
    }

    fn confirm_post_install(&mut self) -> io::Result<bool> {
        let answer = prompted(
            cliclack::confirm("Run post-install script?")
                .initial_value(true)
                .interact(),
        )?;
        Ok(matches!(answer, Prompted::Answer(true)))
    }
}

/// Print the curated stacks
pub fn list_stacks() {
    println!();
    println!("{}", "Available stacks:".bold());
    println!();
    for stack in STACKS {
        println!("  {} - {}", stack.name.cyan(), stack.description);
    }
    println!();
    println!(
        "{}",
        "Or use --from <user/repo> or --from <./local/path>".dimmed()
    );
    println!();
}

/// Run the CLI with interactive prompts
pub async fn run(args: CreateArgs, user_agent: &str) -> Result<()> {
    cliclack::intro(" scaffold ".on_cyan().black().to_string())?;

    let cwd = std::env::current_dir().context("Failed to read current directory")?;

    // Step 1: Resolve --from / --stack
    let mut source = match (&args.from, &args.stack) {
        (Some(from), _) => Some(from.clone()),
        (None, Some(stack_name)) => match find_stack(stack_name) {
            Some(stack) => Some(stack.repo.to_string()),
            None => {
                cliclack::outro_cancel("Unknown stack")?;
                anyhow::bail!(
                    "Stack \"{}\" not found. Use --list to see available stacks.",
                    stack_name
                );
            }
        },
        (None, None) => None,
    };

    // Step 2: Project name
    let name = match &args.name {
        Some(name) => name.clone(),
        None if args.yes => anyhow::bail!("Project name is required in non-interactive mode (-y)"),
        None => match ask_project_name(&cwd)? {
            Prompted::Answer(name) => name,
            Prompted::Cancelled => return cancelled(),
        },
    };

    let target_dir = cwd.join(&name);
    if target_dir.exists() {
        cliclack::outro_cancel("Failed to scaffold")?;
        anyhow::bail!("Directory \"{}\" already exists", name);
    }

    // Step 3: Template source
    if source.is_none() {
        if args.yes {
            anyhow::bail!("A template source is required in non-interactive mode (--from or --stack)");
        }
        match ask_source()? {
            Prompted::Answer(chosen) => source = Some(chosen),
            Prompted::Cancelled => return cancelled(),
        }
    }
    let source = source.context("No template source selected")?;

    if let Ok(TemplateSource::Local(path)) = TemplateSource::resolve(&source, &cwd) {
        cliclack::log::info(format!("Using local template {}", path.display()))?;
    }

    // Step 4: Scaffold
    let fetcher = TemplateFetcher::from_env(user_agent)?;
    let request = ScaffoldRequest {
        source,
        target_dir: target_dir.clone(),
        non_interactive: args.yes,
        cwd,
    };

    let mut frontend = ClackFrontend::new();
    let outcome = Scaffolder::new(&fetcher).run(&request, &mut frontend).await;
    frontend.stop_spinner("Failed to scaffold".to_string());

    match outcome {
        Ok(ScaffoldOutcome::Completed(report)) => {
            if let HookStatus::Failed(_) = report.post_install {
                cliclack::log::warning(format!(
                    "The project in {} was kept; re-run the hook manually if needed",
                    target_dir.display()
                ))?;
            }
            print_next_steps(&name)
        }
        Ok(ScaffoldOutcome::Cancelled { .. }) => cancelled(),
        Err(e) => {
            cliclack::outro_cancel("Failed to scaffold")?;
            Err(e.into())
        }
    }
}

fn cancelled() -> Result<()> {
    cliclack::outro_cancel("Cancelled")?;
    Ok(())
}

fn ask_project_name(cwd: &Path) -> Result<Prompted<String>> {
    let cwd: PathBuf = cwd.to_path_buf();
    let answer = prompted(
        cliclack::input("Project name?")
            .placeholder("my-app")
            .validate(move |input: &String| {
                if input.is_empty() {
                    Err("Project name is required".to_string())
                } else if cwd.join(input).exists() {
                    Err(format!("Directory \"{}\" already exists", input))
                } else {
                    Ok(())
                }
            })
            .interact(),
    )?;
    Ok(answer)
}

fn ask_source() -> Result<Prompted<String>> {
    let kind = prompted(
        cliclack::select("Choose a source")
            .item("curated", "Curated stacks", "Pre-configured templates")
            .item("custom", "Custom", "GitHub repo or local path")
            .interact(),
    )?;

    let answer = match kind {
        Prompted::Cancelled => Prompted::Cancelled,
        Prompted::Answer("curated") => {
            let mut select = cliclack::select("Which stack?");
            for stack in STACKS {
                select = select.item(stack.repo.to_string(), stack.name, stack.description);
            }
            prompted(select.interact())?
        }
        Prompted::Answer(_) => prompted(
            cliclack::input("Enter GitHub repo (user/repo) or local path")
                .placeholder("username/repo or ./local/path")
                .validate(|input: &String| {
                    if input.is_empty() {
                        Err("Source is required")
                    } else {
                        Ok(())
                    }
                })
                .interact(),
        )?,
    };
    Ok(answer)
}

fn print_next_steps(name: &str) -> Result<()> {
    cliclack::note(
        "Next steps",
        format!("cd {}\n\n# Then follow the template's README", name),
    )?;
    cliclack::outro("Done!".green())?;
    Ok(())
}
