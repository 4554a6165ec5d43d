mod render;
mod repl;

use clap::Parser;
use painel_core::{
    ConnectionProfile, ConnectionProvider, DbConfig, DbError, ExplorerController, HistoryStore,
    MemorySecretStore, PostgresDialect, ProfileStore, QueryCache, SchemaCache, SecretStore,
    SslMode, create_secret_store,
};
use painel_driver_postgres::PostgresDriver;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "painel", about = "Cached SQL table explorer", version)]
struct Args {
    /// Saved profile name (from profiles.json).
    #[arg(long)]
    profile: Option<String>,

    /// Connect to host, overriding the saved profile.
    #[arg(long)]
    host: Option<String>,

    /// Port number to use for the connection.
    #[arg(short = 'P', long)]
    port: Option<u16>,

    /// User for login.
    #[arg(short, long)]
    user: Option<String>,

    /// Database to use.
    #[arg(short = 'D', long)]
    database: Option<String>,

    /// Row bound for interactive reads.
    #[arg(long, default_value_t = painel_core::DEFAULT_ROW_LIMIT)]
    limit: u32,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), DbError> {
    let args = Args::parse();

    let profile = resolve_profile(&args)?;
    let secrets = resolve_secrets(&profile)?;

    let provider = ConnectionProvider::new(Box::new(PostgresDriver::new()), profile, secrets);
    let handle = provider.get()?;

    let schema = Arc::new(SchemaCache::new());
    let queries = Arc::new(QueryCache::new());

    let mut explorer =
        ExplorerController::new(handle, schema, queries, Box::new(PostgresDialect))
            .with_row_limit(args.limit);

    match HistoryStore::new() {
        Ok(history) => explorer = explorer.with_history(history),
        Err(e) => log::warn!("Query history disabled: {}", e),
    }

    let profile_name = provider.profile().name.clone();
    repl::Repl::new(explorer, profile_name)?.run()
}

/// CLI flags override the saved profile; with no saved profile, enough
/// flags alone describe an ad-hoc connection.
fn resolve_profile(args: &Args) -> Result<ConnectionProfile, DbError> {
    let store = ProfileStore::new()?;

    let saved = match &args.profile {
        Some(name) => Some(store.find(name)?.ok_or_else(|| {
            DbError::Configuration(format!("No saved profile named '{name}'"))
        })?),
        None => store.load()?.into_iter().next(),
    };

    match saved {
        Some(mut profile) => {
            let DbConfig::Postgres {
                host,
                port,
                user,
                database,
                ..
            } = &mut profile.config;

            if let Some(value) = &args.host {
                *host = value.clone();
            }
            if let Some(value) = args.port {
                *port = value;
            }
            if let Some(value) = &args.user {
                *user = value.clone();
            }
            if let Some(value) = &args.database {
                *database = value.clone();
            }

            Ok(profile)
        }
        None => {
            let (Some(host), Some(user), Some(database)) =
                (args.host.clone(), args.user.clone(), args.database.clone())
            else {
                return Err(DbError::Configuration(
                    "No saved profile; pass --host, --user and --database".to_string(),
                ));
            };

            Ok(ConnectionProfile::new(
                "ad-hoc",
                DbConfig::Postgres {
                    host,
                    port: args.port.unwrap_or(5432),
                    user,
                    database,
                    ssl_mode: SslMode::default(),
                },
            ))
        }
    }
}

/// Use the keyring when it has an entry for this profile, otherwise
/// prompt once and keep the password in memory for the session.
fn resolve_secrets(profile: &ConnectionProfile) -> Result<Arc<dyn SecretStore>, DbError> {
    let keyring = create_secret_store();

    if keyring.get(&profile.secret_ref())?.is_some() {
        return Ok(Arc::from(keyring));
    }

    let password = rpassword::prompt_password("Password: ")?;

    Ok(Arc::new(MemorySecretStore::with_secret(
        profile.secret_ref(),
        password,
    )))
}
