//! scaffold - Create projects from curated stacks, git repositories, or local templates

use anyhow::Result;
use clap::Parser;
use scaffolder_core::tui::{list_stacks, CreateArgs};

/// CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(name = "scaffold")]
#[command(about = "Scaffold projects from curated stacks, git repositories, or local templates")]
#[command(version)]
pub struct Args {
    /// Project name (also the directory to create)
    pub name: Option<String>,

    /// Template source: [provider:]owner/repo[/subdir][#ref] or a local path
    #[arg(short, long)]
    pub from: Option<String>,

    /// Curated stack to use (see --list)
    #[arg(short, long)]
    pub stack: Option<String>,

    /// List curated stacks and exit
    #[arg(short, long)]
    pub list: bool,

    /// Skip all prompts and use template defaults (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

impl From<Args> for CreateArgs {
    fn from(args: Args) -> Self {
        CreateArgs {
            name: args.name,
            from: args.from,
            stack: args.stack,
            yes: args.yes,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();

    if args.list {
        list_stacks();
        return Ok(());
    }

    let user_agent = format!("{}/{}", scaffolder_core::DEFAULT_USER_AGENT, CLI_VERSION);
    let result = scaffolder_core::run(args.into(), &user_agent).await;

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    result
}
