// sql-assistant/crates/sql-assistant/src/main.rs

#[cfg(feature = "cli")]
use std::io::Write;
#[cfg(feature = "cli")]
use std::sync::Arc;

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use sql_assistant::{
    config::Config,
    profile::TRANSPORT_OPTIONS,
    sql_database::resolve_database_path,
    telemetry, ChatCompletionClient, CredentialStore, NewAccount, OrchestratorConfig,
    SessionContext, Transport, TurnOrchestrator, UserProfile,
};
#[cfg(feature = "cli")]
use tokio::io::{AsyncBufReadExt, BufReader};
#[cfg(feature = "cli")]
use tracing::{error, info};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "sql-assistant")]
#[command(about = "Ask questions about a SQLite database in natural language", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Chat with a database
    Chat {
        /// Database name (`chinook` means `./chinook.db`) or path; defaults to DATABASE_PATH
        #[arg(short, long)]
        database: Option<String>,
    },
    /// Create a grocery-assistant account
    Signup {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        city: String,
        /// Free text such as "Bio" or allergies
        #[arg(long, default_value = "")]
        preferences: String,
        /// Repeatable; usual values are Walking, Bus, Car, Bicycle
        #[arg(long = "transport")]
        transport: Vec<String>,
        #[arg(long, default_value_t = 0)]
        age: u32,
        /// Euro amount
        #[arg(long, default_value_t = 0.0)]
        budget: f64,
    },
    /// Chat with the grocery assistant as a signed-in user
    Shop {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
        #[arg(short, long)]
        database: Option<String>,
    },
}

/// Lines starting with `/` inside the chat loop.
#[cfg(feature = "cli")]
#[derive(Debug, PartialEq)]
enum ReplCommand<'a> {
    Quit,
    Reset,
    History,
    Connect(&'a str),
    Unknown(&'a str),
    Question(&'a str),
}

#[cfg(feature = "cli")]
impl<'a> ReplCommand<'a> {
    fn parse(input: &'a str) -> Self {
        let Some(command) = input.strip_prefix('/') else {
            return ReplCommand::Question(input);
        };
        let (name, arg) = command
            .split_once(char::is_whitespace)
            .map(|(n, a)| (n, a.trim()))
            .unwrap_or((command, ""));
        match name {
            "quit" | "exit" => ReplCommand::Quit,
            "reset" => ReplCommand::Reset,
            "history" => ReplCommand::History,
            "connect" if !arg.is_empty() => ReplCommand::Connect(arg),
            _ => ReplCommand::Unknown(input),
        }
    }
}

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();
    let cli = Cli::parse();
    let cfg = Config::from_env()?;

    match cli.command {
        Commands::Chat { database } => {
            let (orchestrator, mut ctx) = start_session(&cfg, database.as_deref(), None)?;
            if let Some(greeting) = ctx.history().last() {
                println!("{}", greeting.content);
            }
            run_repl(&orchestrator, &mut ctx).await
        }
        Commands::Signup {
            username,
            password,
            name,
            city,
            preferences,
            transport,
            age,
            budget,
        } => {
            for mode in transport.iter().filter(|m| !TRANSPORT_OPTIONS.contains(&m.as_str())) {
                info!("Custom transport mode: {}", mode);
            }
            let store = CredentialStore::open(&cfg.credentials_file())
                .context("Failed to open credential store")?;
            let account = NewAccount {
                username,
                password,
                profile: UserProfile {
                    name,
                    city,
                    preferences,
                    transport: Transport::Many(transport),
                    age,
                    budget,
                },
            };
            match store.create_account(account) {
                Ok(profile) => {
                    println!("Account created. Welcome, {}!", profile.name);
                    Ok(())
                }
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Shop {
            username,
            password,
            database,
        } => {
            let store = CredentialStore::open(&cfg.credentials_file())
                .context("Failed to open credential store")?;
            let profile = match store.login(&username, &password) {
                Ok(profile) => profile,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            };
            println!("Logged in as {}.", profile.name);
            let (orchestrator, mut ctx) = start_session(&cfg, database.as_deref(), Some(profile))?;
            run_repl(&orchestrator, &mut ctx).await
        }
    }
}

#[cfg(feature = "cli")]
fn start_session(
    cfg: &Config,
    database: Option<&str>,
    profile: Option<UserProfile>,
) -> Result<(TurnOrchestrator, SessionContext)> {
    cfg.require_model_credentials()?;
    cfg.print_config();

    let model = Arc::new(ChatCompletionClient::from_config(cfg)?);
    let orchestrator = TurnOrchestrator::new(model, OrchestratorConfig::from_config(cfg))?;

    let mut ctx = match profile {
        None => orchestrator.new_session(cfg.model_name.clone()),
        Some(profile) => SessionContext::new(cfg.model_name.clone()).with_profile(profile),
    };

    let path = database
        .map(resolve_database_path)
        .unwrap_or_else(|| cfg.database_file());
    ctx.connect_path(&path)
        .with_context(|| format!("Failed to connect to {}", path.display()))?;
    info!("Session {} ready", ctx.id());

    Ok((orchestrator, ctx))
}

#[cfg(feature = "cli")]
async fn run_repl(orchestrator: &TurnOrchestrator, ctx: &mut SessionContext) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match ReplCommand::parse(input) {
            ReplCommand::Quit => break,
            ReplCommand::Reset => {
                ctx.reset_history();
                println!("History cleared.");
            }
            ReplCommand::History => println!("{}", ctx.history().render()),
            ReplCommand::Connect(target) => {
                let path = resolve_database_path(target);
                match ctx.connect_path(&path) {
                    Ok(()) => println!("Connected to {}.", path.display()),
                    Err(e) => eprintln!("{}", e),
                }
            }
            ReplCommand::Unknown(command) => {
                eprintln!("Unknown command: {} (try /connect, /history, /reset, /quit)", command)
            }
            ReplCommand::Question(question) => match orchestrator.run_turn(ctx, question).await {
                Ok(outcome) => println!("{}", outcome.answer),
                Err(e) => {
                    error!("Turn failed: {}", e);
                    eprintln!("{}", e);
                }
            },
        }
    }

    info!("Session {} closed", ctx.id());
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    println!("CLI feature not enabled. Enable with --features cli");
}
