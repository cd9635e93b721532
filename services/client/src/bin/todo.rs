//! services/client/src/bin/todo.rs
//!
//! The command-line view: thin presentation over the session store and the
//! API client. Each subcommand maps onto one user-visible flow.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use client_lib::{
    client::ApiClient,
    config::{ApiMode, Config},
    error::ClientError,
    session::SessionStore,
};
use todo_core::ports::ApiError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "todo", about = "Manage a personal todo list from the terminal")]
struct Cli {
    /// Override the configured backend mode (`mock` or `real`) for this run.
    #[arg(long, value_name = "MODE")]
    mode: Option<ApiMode>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and store the session
    Login { username: String, password: String },
    /// Create a new account (log in separately afterwards)
    Register { username: String, password: String },
    /// List all todos
    List,
    /// Create a todo
    Add { title: String, description: String },
    /// Rewrite a todo's title and description
    Edit {
        id: String,
        title: String,
        description: String,
    },
    /// Delete a todo
    Rm { id: String },
    /// Show the logged-in user
    Whoami,
    /// Clear the stored session
    Logout,
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    let cli = Cli::parse();

    // --- 1. Load Configuration & Set Up Logging ---
    let mut config = Config::from_env()?;
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- 2. Restore the Session ---
    let session = Arc::new(SessionStore::new(config.session_path.clone()));
    session.restore();

    // --- 3. Build the API Client ---
    let client = ApiClient::new(&config, session.clone());

    // --- 4. Dispatch the Command ---
    if let Err(err) = run_command(cli.command, &client, &session).await {
        force_logout_if_token_rejected(&session, &err);
        eprintln!("{}", err);
        std::process::exit(1);
    }
    Ok(())
}

async fn run_command(
    command: Command,
    client: &ApiClient,
    session: &SessionStore,
) -> Result<(), ClientError> {
    match command {
        Command::Login { username, password } => {
            let token = client.auth().login(&username, &password).await?;
            session.login(&token.username, &token.access_token)?;
            println!("Successfully logged in!");
        }
        Command::Register { username, password } => {
            let user = client.auth().register(&username, &password).await?;
            println!(
                "Registration successful! Please log in as '{}'.",
                user.username
            );
        }
        Command::List => {
            require_login(client, session)?;
            let tasks = client.tasks().get_all().await?;
            match session.current() {
                Some(s) => println!("Todos for {}:", s.username),
                None => println!("Todos:"),
            }
            if tasks.is_empty() {
                println!("  (none yet)");
            }
            for task in tasks {
                println!("  {}  {}", task.id, task.title);
                println!(
                    "      {}  (updated {})",
                    task.description,
                    task.updated_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        Command::Add { title, description } => {
            require_login(client, session)?;
            let task = client.tasks().create(&title, &description).await?;
            println!("Todo created successfully ({})", task.id);
        }
        Command::Edit {
            id,
            title,
            description,
        } => {
            require_login(client, session)?;
            client.tasks().update(&id, &title, &description).await?;
            println!("Todo updated successfully");
        }
        Command::Rm { id } => {
            require_login(client, session)?;
            client.tasks().delete(&id).await?;
            println!("Todo deleted successfully");
        }
        Command::Whoami => match session.current() {
            Some(s) => println!("Logged in as {}", s.username),
            None => println!("Not logged in"),
        },
        Command::Logout => {
            session.logout()?;
            println!("You have been logged out");
        }
    }
    Ok(())
}

/// The real backend rejects unauthenticated task calls anyway; failing here
/// gives the user the login hint instead of a bare 401.
fn require_login(client: &ApiClient, session: &SessionStore) -> Result<(), ClientError> {
    if client.mode() == ApiMode::Real && !session.is_authenticated() {
        return Err(ClientError::Api(ApiError::Auth(
            "Not logged in. Run `todo login <username> <password>` first.".to_string(),
        )));
    }
    Ok(())
}

/// Mirrors the recovery rule for stale sessions: an auth failure whose
/// message mentions the token means the stored session is invalid, so force
/// a logout.
fn force_logout_if_token_rejected(session: &SessionStore, err: &ClientError) {
    if let ClientError::Api(ApiError::Auth(message)) = err {
        if message.to_lowercase().contains("token") && session.logout().is_ok() {
            eprintln!("Your session is no longer valid; you have been logged out.");
        }
    }
}
