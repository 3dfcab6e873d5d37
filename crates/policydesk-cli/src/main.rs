//! Policydesk CLI - a terminal front-end for the session router.
//!
//! Shows which navigation tree the app would render for the persisted
//! session, and drives login and logout against the configured store.

use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use policydesk_core::{Config, KeyValueStore, NavigationTree, SessionRouter, UserData};

// ============================================================================
// Constants
// ============================================================================

/// Log file name inside `<data_dir>/logs`
const LOG_FILE: &str = "policydesk.log";

const USAGE: &str = "\
Usage: policydesk [COMMAND]

Commands:
  status                          Show the active navigation tree (default)
  login [id] [--admin] [k=v ...]  Log in as <id> (default: last user), optionally as admin
  logout                          End the current session
  routes                          List the screens of every navigation tree
  help                            Show this message

Environment:
  RUST_LOG              Log filter (default: warn)
  POLICYDESK_STORAGE    file | keyring | memory
  POLICYDESK_DATA_DIR   Directory for the session file and logs";

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Status,
    Login(LoginArgs),
    Logout,
    Routes,
    Help,
}

/// Parsed `login` arguments; the id may come from the config instead
#[derive(Debug, Clone, PartialEq, Default)]
struct LoginArgs {
    id: Option<String>,
    is_admin: bool,
    fields: Vec<(String, Value)>,
}

impl LoginArgs {
    /// Build the record, falling back to the last user who logged in
    fn into_user(self, last_user_id: Option<&str>) -> Result<UserData> {
        let id = self
            .id
            .or_else(|| last_user_id.map(str::to_string))
            .ok_or_else(|| anyhow::anyhow!("login requires a user id\n\n{}", USAGE))?;
        let user = self
            .fields
            .into_iter()
            .fold(UserData::new(id, self.is_admin), |user, (k, v)| user.with_field(k, v));
        user.validate()?;
        Ok(user)
    }
}

fn parse_args(args: &[String]) -> Result<Command> {
    let Some(command) = args.first() else {
        return Ok(Command::Status);
    };

    match command.as_str() {
        "status" => Ok(Command::Status),
        "logout" => Ok(Command::Logout),
        "routes" => Ok(Command::Routes),
        "help" | "--help" | "-h" => Ok(Command::Help),
        "login" => parse_login(&args[1..]),
        other => Err(anyhow::anyhow!("Unknown command: {}\n\n{}", other, USAGE)),
    }
}

fn parse_login(args: &[String]) -> Result<Command> {
    let mut login = LoginArgs::default();

    for arg in args {
        if arg == "--admin" {
            login.is_admin = true;
        } else if let Some((key, value)) = arg.split_once('=') {
            // Values that parse as JSON keep their type, everything else is a string
            let value = serde_json::from_str::<Value>(value)
                .unwrap_or_else(|_| Value::String(value.to_string()));
            login.fields.push((key.to_string(), value));
        } else if login.id.is_none() {
            login.id = Some(arg.clone());
        } else {
            return Err(anyhow::anyhow!("Unexpected argument: {}", arg));
        }
    }

    Ok(Command::Login(login))
}

/// Initialize the tracing subscriber for logging.
/// The returned guard flushes the file log on drop.
fn init_tracing(data_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match data_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir.join("logs"), LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

fn load_config() -> Config {
    let mut config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config, using defaults: {:#}", e);
            Config::default()
        }
    };
    if let Err(e) = config.apply_env() {
        eprintln!("Warning: ignoring environment overrides: {:#}", e);
    }
    config
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_args(&args)?;

    let mut config = load_config();
    let _log_guard = init_tracing(config.data_dir().ok().as_deref());
    info!(storage = ?config.storage, "Policydesk starting");

    match command {
        Command::Help => println!("{}", USAGE),
        Command::Routes => print_routes(),
        Command::Status => {
            let router = open_router(&config).await?;
            print_status(&router);
        }
        Command::Login(login) => {
            let user = login.into_user(config.last_user_id.as_deref())?;
            let router = open_router(&config).await?;
            let session = router
                .login(user)
                .await
                .context("Login did not take effect")?;

            config.last_user_id = Some(session.id().to_string());
            if let Err(e) = config.save() {
                warn!(error = %e, "Failed to save config");
            }
            print_status(&router);
        }
        Command::Logout => {
            let router = open_router(&config).await?;
            if let Err(e) = router.logout().await {
                // Memory is already cleared; report and carry on
                eprintln!("Warning: {}", e);
            }
            print_status(&router);
        }
    }

    Ok(())
}

async fn open_router(config: &Config) -> Result<SessionRouter<Box<dyn KeyValueStore>>> {
    let store = config.open_store().context("Failed to open session store")?;
    Ok(SessionRouter::start(store).await)
}

fn print_status<S: KeyValueStore>(router: &SessionRouter<S>) {
    let tree = router.navigation_tree();
    match router.current() {
        Some(session) => println!(
            "Logged in as {} ({})",
            session.id(),
            if session.is_admin() { "admin" } else { "user" }
        ),
        None => println!("Not logged in"),
    }
    print!("{}", describe_tree(tree));
}

fn print_routes() {
    for tree in [
        NavigationTree::Unauthenticated,
        NavigationTree::StandardUser,
        NavigationTree::Admin,
    ] {
        print!("{}", describe_tree(tree));
        println!();
    }
}

/// Render a tree's layout as indented text
fn describe_tree(tree: NavigationTree) -> String {
    let mut out = format!("Navigation: {} (starts at {})\n", tree, tree.initial_screen().route_name());
    if tree.tabs().is_empty() {
        for screen in tree.screens() {
            out.push_str(&format!("  {}\n", screen.route_name()));
        }
    } else {
        for tab in tree.tabs() {
            let screens: Vec<&str> = tree.tab_screens(*tab).iter().map(|s| s.route_name()).collect();
            out.push_str(&format!("  [{}] {}\n", tab.title(), screens.join(", ")));
        }
    }
    out
}
