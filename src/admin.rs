use clap::{Parser, Subcommand};
use diagnosee_api::contact::handlers::postgres_handler::PostgresHandler as ContactPostgresHandler;
use diagnosee_api::contact::util::handler::ContactHandler;
use diagnosee_api::demo::handlers::postgres_handler::PostgresHandler as DemoPostgresHandler;
use diagnosee_api::demo::registry::{JobError, Registry};
use diagnosee_api::demo::util::handler::DemoJobHandler;
use diagnosee_api::shared::util::clock::{SystemClock, UuidProvider};
use diagnosee_api::shared::util::config;
use std::process::exit;
use std::sync::Arc;

/// Maintenance for the Postgres-backed store
#[derive(Parser)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the tables if they do not exist
    Init,
    /// Print the current status of a demo job
    Show { id: String },
    /// Print a stored contact submission
    Contact { id: uuid::Uuid },
    /// Delete demo jobs created more than the given number of seconds ago
    Purge { older_than_seconds: u32 },
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = config::get_config();
    let Some(database) = config.database.as_ref() else {
        eprintln!("Error: config has no [database] section");
        exit(1);
    };
    let pool = match config::connect_pool(database).await {
        Ok(pool) => pool,
        Err(err) => {
            eprintln!("Error: could not connect to {}:{}: {}", database.ip, database.port, err);
            exit(1);
        }
    };

    let jobs = Arc::new(DemoPostgresHandler::new(pool.clone()));
    let registry = Registry::new(jobs.clone(), Arc::new(SystemClock), Arc::new(UuidProvider));

    match &cli.command {
        Commands::Init => {
            let contacts = ContactPostgresHandler::new(pool);
            match (jobs.init().await, contacts.init().await) {
                (Ok(_), Ok(_)) => println!("Tables ready"),
                (Err(err), _) | (_, Err(err)) => println!("db error: {}", err),
            }
        },
        Commands::Show { id } => match registry.get_status(id).await {
            Ok(report) => match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{}", json),
                Err(err) => println!("Error: {}", err),
            },
            Err(JobError::NotFound(_)) => println!("Error: no job with id `{id}`"),
            Err(err) => println!("db error: {}", err),
        },
        Commands::Contact { id } => {
            let contacts = ContactPostgresHandler::new(pool);
            match contacts.get(id).await {
                Ok(Some(submission)) => match serde_json::to_string_pretty(&submission) {
                    Ok(json) => println!("{}", json),
                    Err(err) => println!("Error: {}", err),
                },
                Ok(None) => println!("Error: no contact submission with id `{id}`"),
                Err(err) => println!("db error: {}", err),
            }
        },
        Commands::Purge { older_than_seconds } => {
            match registry.purge_expired(chrono::Duration::seconds(i64::from(*older_than_seconds))).await {
                Ok(removed) => println!("Removed {} job(s)", removed),
                Err(err) => println!("db error: {}", err),
            }
        },
    }
}
