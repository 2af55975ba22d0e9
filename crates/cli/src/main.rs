//! Shopper CLI - drive the client against a live backend.
//!
//! # Usage
//!
//! ```bash
//! # Look up identity and session, fetch the cart
//! shopper session
//!
//! # Sign in
//! shopper login -e a@b.com -p hunter2
//!
//! # Manage products
//! shopper products list
//! shopper products create --attrs '{"title": "Mango"}'
//! shopper products update 42 --attrs '{"price": "3.50"}'
//! shopper products remove 42
//!
//! # Manage users (admin)
//! shopper users list
//! ```
//!
//! Every command bootstraps the session first and prints the resulting
//! state as JSON. The exit status is non-zero when any operation reported
//! an error.
//!
//! Cookies live only for one invocation. A `shopper logout` therefore ends
//! the session of its own invocation, not one started by an earlier
//! `shopper login`; use it against a backend that identifies the client by
//! other means.
//!
//! # Environment Variables
//!
//! See [`shopper_client::config`]. `RUST_LOG` overrides the log filter.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use shopper_client::ClientConfig;
use shopper_core::{ProductId, UserId};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "shopper")]
#[command(author, version, about = "Shopper client shell")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up identity and session and fetch the cart
    Session,
    /// Sign in with existing credentials
    Login {
        #[command(flatten)]
        credentials: CredentialArgs,
    },
    /// Create an account and sign in
    Signup {
        #[command(flatten)]
        credentials: CredentialArgs,
    },
    /// Sign out and fall back to the anonymous session
    ///
    /// Cookies are not kept between invocations, so this cannot end a
    /// session started by an earlier `shopper login`.
    Logout,
    /// Manage products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Manage users (admin)
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(clap::Args)]
struct CredentialArgs {
    /// Account email address
    #[arg(short, long)]
    email: String,

    /// Account password
    #[arg(short, long)]
    password: String,
}

#[derive(Subcommand)]
enum ProductAction {
    /// List all products
    List,
    /// Create a product from a JSON object of attributes
    Create {
        #[arg(long)]
        attrs: String,
    },
    /// Update a product with a JSON object of attributes
    Update {
        id: ProductId,
        #[arg(long)]
        attrs: String,
    },
    /// Remove a product
    Remove { id: ProductId },
}

#[derive(Subcommand)]
enum UserAction {
    /// List all users
    List,
    /// Update a user with a JSON object of attributes
    Update {
        id: UserId,
        #[arg(long)]
        attrs: String,
    },
    /// Remove a user
    Remove { id: UserId },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
#[allow(clippy::print_stderr)]
async fn main() {
    let cli = Cli::parse();

    // Load configuration from environment (needed for Sentry init)
    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Logs go to stderr so stdout carries only the state JSON
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopper_client=info,shopper_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    match run(cli, &config).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            tracing::error!("Command failed: {e}");
            std::process::exit(1);
        }
    }
}

/// Run one command. Returns `false` when an operation reported an error.
async fn run(cli: Cli, config: &ClientConfig) -> Result<bool, commands::CliError> {
    let shell = commands::Shell::connect(config)?;
    shell.ctx.auth().bootstrap().await;

    match cli.command {
        Commands::Session => {}
        Commands::Login { credentials } => {
            commands::auth::login(&shell, &credentials.email, credentials.password).await?;
        }
        Commands::Signup { credentials } => {
            commands::auth::signup(&shell, &credentials.email, credentials.password).await?;
        }
        Commands::Logout => shell.ctx.auth().logout().await,
        Commands::Products { action } => {
            let products = shell.ctx.products();
            match action {
                ProductAction::List => products.fetch_all().await,
                ProductAction::Create { attrs } => {
                    products.create(&commands::parse_attributes(&attrs)?).await;
                }
                ProductAction::Update { id, attrs } => {
                    products.fetch_all().await;
                    products.update(id, &commands::parse_attributes(&attrs)?).await;
                }
                ProductAction::Remove { id } => {
                    products.fetch_all().await;
                    products.remove(id).await;
                }
            }
        }
        Commands::Users { action } => {
            let users = shell.ctx.users();
            match action {
                UserAction::List => users.fetch_all().await,
                UserAction::Update { id, attrs } => {
                    users.fetch_all().await;
                    users.update(id, &commands::parse_attributes(&attrs)?).await;
                }
                UserAction::Remove { id } => {
                    users.fetch_all().await;
                    users.remove(id).await;
                }
            }
        }
    }

    shell.finish()
}
