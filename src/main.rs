use clap::{Parser, Subcommand};
use reqwest::Method;
use sarathi::config::{ClientConfig, ConfigError};
use sarathi::net::{ApiError, ApiResponse};
use sarathi::router::NavigationOutcome;
use sarathi::session::SessionState;
use sarathi::state::AppState;
use sarathi::storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),
}

#[derive(Parser, Debug)]
#[command(name = "sarathi", about = "Sarathi session and authorized API client")]
struct Cli {
    /// Keep the session in memory for this invocation only.
    #[arg(long, default_value_t = false)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store a token issued by the login flow.
    Login {
        #[arg(long, env = "SARATHI_TOKEN", hide_env_values = true)]
        token: String,
        #[arg(long)]
        identity: Option<String>,
    },
    Logout,
    Status,
    /// Navigate to a route, subject to the auth guard.
    Open { path: String },
    /// Send an authorized request to the API.
    Request {
        path: String,
        #[arg(long, default_value = "GET")]
        method: String,
        #[arg(long)]
        data: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env()?;
    let state = if cli.ephemeral {
        tracing::debug!("using in-memory session");
        build_state(&config, MemoryStorage::new())?
    } else {
        let storage = FileStorage::open(&config.session_file)?;
        tracing::debug!(session_file = %storage.path().display(), "using session file");
        build_state(&config, storage)?
    };

    match cli.command {
        Command::Login { token, identity } => run_login(&state, &token, identity.as_deref()),
        Command::Logout => run_logout(&state),
        Command::Status => {
            run_status(&state);
            Ok(())
        }
        Command::Open { path } => {
            run_open(&state, &path);
            Ok(())
        }
        Command::Request { path, method, data } => run_request(&state, &config, &path, &method, data.as_deref()).await,
    }
}

fn build_state(config: &ClientConfig, storage: impl KeyValueStorage + 'static) -> Result<AppState, CliError> {
    Ok(AppState::from_config(config, storage)?)
}

fn run_login(state: &AppState, token: &str, identity: Option<&str>) -> Result<(), CliError> {
    state.session.save(token, identity)?;
    run_status(state);
    Ok(())
}

fn run_logout(state: &AppState) -> Result<(), CliError> {
    let route = state.router.logout()?;
    println!("logged out; now at {route}");
    Ok(())
}

fn run_status(state: &AppState) {
    let session = state.session.snapshot();
    match session.state() {
        SessionState::Authenticated => match session.identity {
            Some(identity) => println!("authenticated as {identity}"),
            None => println!("authenticated"),
        },
        SessionState::Anonymous => println!("anonymous"),
    }
}

fn run_open(state: &AppState, path: &str) {
    match state.router.open(path) {
        NavigationOutcome::Entered(route) => println!("entered {route}"),
        NavigationOutcome::Redirected { requested: Some(requested), to } => {
            println!("access to {requested} denied; redirected to {to}");
        }
        NavigationOutcome::Redirected { requested: None, to } => println!("no route for {path}; redirected to {to}"),
    }
}

async fn run_request(
    state: &AppState,
    config: &ClientConfig,
    path: &str,
    method: &str,
    data: Option<&str>,
) -> Result<(), CliError> {
    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .map_err(|_| CliError::InvalidMethod(method.to_owned()))?;
    let body = data.map(serde_json::from_str::<serde_json::Value>).transpose()?;

    match state.request(method, &config.endpoint(path), body.as_ref()).await {
        Ok(response) => {
            print_body(&response)?;
            Ok(())
        }
        Err(err) => {
            if err.is_unauthorized() {
                eprintln!("session rejected; redirected to {}", state.navigation.current());
            }
            Err(err.into())
        }
    }
}

fn print_body(response: &ApiResponse) -> Result<(), CliError> {
    if response.is_json() {
        let value = response.json::<serde_json::Value>()?;
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{}", response.body);
    }
    Ok(())
}
