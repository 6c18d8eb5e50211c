//! Command-line front end for the todo service.
//!
//! Every invocation drives one `Session`: it loads the page selected by the
//! global filter flags, applies at most one mutation, then prints the page the
//! server reports afterwards together with the notifications it produced.

mod render;

use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use todo_sync::config::{BASE_URL_ENV, DEFAULT_BASE_URL};
use todo_sync::{
    ClientConfig, HealthProbe, NewTodoForm, Outcome, PageLimit, Session, SyncConfig, TodoApi,
    TodoClient, TodoFilter, TodoId, UpdateTodo, UreqTransport,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "todo")]
#[command(about = "Manage todos on a todo API server")]
struct Cli {
    /// API origin, without the /api/v1 prefix
    #[arg(long, global = true, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    timeout: u64,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    view: ViewArgs,

    #[command(subcommand)]
    command: Command,
}

/// Selects the page that is loaded and printed.
#[derive(Args, Debug)]
struct ViewArgs {
    /// Which todos to show
    #[arg(long, global = true, value_enum, default_value_t = Status::All)]
    status: Status,

    /// Case-insensitive text matched against title and description
    #[arg(long, global = true)]
    search: Option<String>,

    #[arg(long, global = true, default_value_t = 1)]
    page: u32,

    /// Page size: 5, 10, 25 or 50
    #[arg(long, global = true, default_value = "10", value_parser = parse_limit)]
    limit: PageLimit,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Status {
    All,
    Pending,
    Completed,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Probe {
    Health,
    Readiness,
    Liveness,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a page of todos
    List,
    /// Create a todo
    Add {
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Change the title or description of a todo
    Edit {
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Flip the completion flag of a todo on the selected page
    Toggle { id: String },
    /// Mark a todo completed
    Complete { id: String },
    /// Mark a todo pending again
    Reopen { id: String },
    /// Delete a todo
    Rm { id: String },
    /// Print one todo in full
    Show { id: String },
    /// Query a health endpoint
    Health {
        #[arg(value_enum, default_value_t = Probe::Health)]
        probe: Probe,
    },
}

fn parse_limit(s: &str) -> Result<PageLimit, String> {
    let n: u32 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    PageLimit::try_from(n).map_err(|e| e.to_string())
}

impl ViewArgs {
    fn filter(&self) -> TodoFilter {
        TodoFilter {
            completed: match self.status {
                Status::All => None,
                Status::Pending => Some(false),
                Status::Completed => Some(true),
            },
            search: self
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            page: self.page.max(1),
            limit: self.limit,
        }
    }
}

impl From<Probe> for HealthProbe {
    fn from(probe: Probe) -> Self {
        match probe {
            Probe::Health => HealthProbe::Health,
            Probe::Readiness => HealthProbe::Readiness,
            Probe::Liveness => HealthProbe::Liveness,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    let config = ClientConfig::new(cli.base_url.as_str()).context("invalid --base-url")?;
    let transport = UreqTransport::new(Duration::from_secs(cli.timeout));
    debug!(base_url = config.base_url(), command = ?cli.command, "starting");

    match &cli.command {
        Command::Show { id } => {
            let api = TodoApi::new(TodoClient::new(config.base_url()), transport);
            let todo = api
                .get(&TodoId::new(id.as_str()))
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            print!("{}", render::detail(&todo));
            Ok(())
        }
        Command::Health { probe } => {
            let api = TodoApi::new(TodoClient::new(config.base_url()), transport);
            let status = api
                .health((*probe).into())
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!("{}", render::health(&status));
            Ok(())
        }
        command => run_session(&config, transport, &cli.view, command),
    }
}

fn run_session(
    config: &ClientConfig,
    transport: UreqTransport,
    view: &ViewArgs,
    command: &Command,
) -> anyhow::Result<()> {
    let mut session = Session::new(config, SyncConfig::default(), transport);
    let mut outcomes = session.replace_filter(view.filter());
    // Clamps a page past the end once the total is known; a no-op otherwise.
    outcomes.extend(session.set_page(view.page));

    let result = match command {
        Command::List => Ok(Vec::new()),
        Command::Add { title, description } => {
            session.create(&NewTodoForm::new(title.as_str(), description.as_str()))
        }
        Command::Edit {
            id,
            title,
            description,
        } => {
            let input = UpdateTodo {
                title: title.clone(),
                description: description.clone().filter(|d| !d.trim().is_empty()),
                completed: None,
            };
            if input.is_empty() {
                bail!("nothing to change: pass --title or --description");
            }
            session.update(&TodoId::new(id.as_str()), &input)
        }
        Command::Toggle { id } => session.toggle(&TodoId::new(id.as_str())),
        Command::Complete { id } => {
            session.update(&TodoId::new(id.as_str()), &UpdateTodo::completed(true))
        }
        Command::Reopen { id } => {
            session.update(&TodoId::new(id.as_str()), &UpdateTodo::completed(false))
        }
        Command::Rm { id } => session.delete(&TodoId::new(id.as_str())),
        Command::Show { .. } | Command::Health { .. } => Ok(Vec::new()),
    };

    let rejected = result.as_ref().err().map(|e| e.message());
    if let Ok(more) = result {
        outcomes.extend(more);
    }

    print!("{}", render::list(&todo_sync::ListView::derive(session.store())));
    for toast in session.toasts_mut().drain() {
        eprintln!("{}", render::toast(&toast));
    }

    if let Some(message) = rejected {
        bail!(message);
    }
    if outcomes.iter().any(|o| !o.is_success()) {
        bail!("{}", failure_summary(&outcomes));
    }
    if let Some(error) = session.store().list_error() {
        bail!(error.user_message());
    }
    Ok(())
}

fn failure_summary(outcomes: &[Outcome]) -> String {
    outcomes
        .iter()
        .filter(|o| !o.is_success())
        .map(Outcome::message)
        .collect::<Vec<_>>()
        .join("; ")
}

fn setup_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("todo=debug,todo_sync=debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
