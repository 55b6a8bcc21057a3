//! Create the first administrator account from the command line.
//!
//! Runs the same bootstrap rule as `POST /api/v1/create-admin` with no
//! caller, so it only succeeds while no administrator exists.
//!
//! # Examples
//! ```sh
//! DISPATCH_ADMIN_PASSWORD=... cargo run --bin bootstrap-admin -- \
//!     --name "Ops" --email ops@example.com --database-url postgres://localhost/dispatch
//! ```

use std::env;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Context, Report, Result, eyre};
use mockable::DefaultClock;
use tokio::runtime::Builder;

use dispatch::domain::ports::AccountCommand;
use dispatch::domain::{AccountService, ContactDetails, LoginPolicy, NewUserAccount};
use dispatch::outbound::credentials::Argon2PasswordHasher;
use dispatch::outbound::persistence::{self, DbPool, PoolConfig, run_migrations};

const PASSWORD_ENV: &str = "DISPATCH_ADMIN_PASSWORD";

/// `bootstrap-admin` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "bootstrap-admin",
    about = "Create the first administrator account",
    version
)]
struct CliArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    /// Database connection URL. Falls back to `DISPATCH_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
    /// Apply pending migrations first.
    #[arg(long)]
    migrate: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    let password = env::var(PASSWORD_ENV)
        .map_err(|_| eyre!("set {PASSWORD_ENV} to the administrator password"))?;
    let database_url = resolve_database_url(args.database_url.clone())?;
    let account = NewUserAccount::try_new(&args.name, &args.email, &password, ContactDetails::default())
        .wrap_err("invalid administrator details")?;

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build Tokio runtime")?;
    runtime.block_on(async move {
        if args.migrate {
            run_migrations(&database_url).await?;
        }
        let pool = DbPool::new(PoolConfig::new(&database_url))
            .await
            .wrap_err("failed to create database pool")?;
        let ports = persistence::driven_ports(
            &pool,
            Arc::new(Argon2PasswordHasher::default()),
            Arc::new(DefaultClock),
        );
        let accounts = AccountService::new(
            ports.users,
            ports.technicians,
            ports.hasher,
            LoginPolicy::default(),
        );
        let admin = accounts
            .create_admin(None, account)
            .await
            .map_err(|error| eyre!("bootstrap refused: {error}"))?;
        println!("user_id={}", admin.id);
        println!("email={}", admin.email);
        Ok::<(), Report>(())
    })
}

fn resolve_database_url(explicit: Option<String>) -> Result<String> {
    let value = match explicit {
        Some(value) => value,
        None => env::var("DISPATCH_DATABASE_URL")
            .map_err(|_| eyre!("database URL missing: set --database-url or DISPATCH_DATABASE_URL"))?,
    };
    if value.trim().is_empty() {
        return Err(eyre!("database URL must not be empty"));
    }
    Ok(value)
}
