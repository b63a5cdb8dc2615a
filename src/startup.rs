//! Application startup and command execution.
//!
//! Wires the storage, session context and API client together from the
//! configuration, then runs one admin command against the backend.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::client::{ApiClient, ApiError};
use crate::config::ConfigV1;
use crate::models::SessionState;
use crate::services::dashboard;
use crate::session::{AuthStore, SessionContext};
use crate::state::AppState;
use crate::storage::{create_storage, MemoryStorage};

/// A single invocation of the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the configuration JSON schema.
    Schema,
    Login { email: String, password: String },
    WhoAmI,
    Logout,
    Dashboard,
}

impl Command {
    /// Parses the arguments that follow the program name.
    pub fn parse<I, S>(args: I) -> Result<Command, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
        match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
            ["schema"] => Ok(Command::Schema),
            ["login", email, password] => Ok(Command::Login {
                email: email.to_string(),
                password: password.to_string(),
            }),
            ["whoami"] => Ok(Command::WhoAmI),
            ["logout"] => Ok(Command::Logout),
            ["dashboard"] | [] => Ok(Command::Dashboard),
            other => Err(format!(
                "unknown command '{}'. Usage: shopadmin [schema | login <email> <password> | whoami | logout | dashboard]",
                other.join(" ")
            )),
        }
    }
}

/// Route of the dashboard page, remembered as the place to resume at.
pub const DASHBOARD_ROUTE: &str = "/";

/// What `login` prints: the new session and where the admin UI resumes.
#[derive(Serialize)]
struct LoginOutput {
    #[serde(flatten)]
    session: SessionState,
    resume_path: Option<String>,
}

/// Builds the shared state: persistent storage for the token, a fresh
/// in-memory store for the per-run session data, and the client on top.
pub fn build(config: Arc<ConfigV1>) -> Result<AppState, ApiError> {
    let local = create_storage(&config.storage);
    let session = Arc::new(SessionContext::new(local, Arc::new(MemoryStorage::new())));
    let client = ApiClient::new(&config.api, session.clone())?;
    let auth = AuthStore::new(client.clone());

    Ok(AppState {
        config,
        session,
        client,
        auth,
    })
}

/// Runs `command` and returns what should be printed.
pub async fn run(state: &AppState, command: Command) -> Result<String, ApiError> {
    info!("Running {} against {}", command_name(&command), state.client.base_url());

    match command {
        Command::Schema => Err(ApiError::InvalidRequest(
            "the schema command does not talk to the backend".to_string(),
        )),
        Command::Login { email, password } => {
            let session = state.auth.sign_in(&email, &password).await?;
            Ok(to_json(&LoginOutput {
                session,
                resume_path: state.session.resume_path(),
            }))
        }
        Command::WhoAmI => {
            state.auth.load_user().await;
            Ok(to_json(&state.auth.state()))
        }
        Command::Logout => {
            state.auth.sign_out().await;
            Ok(to_json(&state.auth.state()))
        }
        Command::Dashboard => {
            let summary = dashboard::summary(&state.client).await?;
            state.session.remember_path(DASHBOARD_ROUTE);
            Ok(to_json(&summary))
        }
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Schema => "schema",
        Command::Login { .. } => "login",
        Command::WhoAmI => "whoami",
        Command::Logout => "logout",
        Command::Dashboard => "dashboard",
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}
