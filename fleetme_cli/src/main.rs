use clap::{Parser, Subcommand};
use fleetme_store::SqliteFleetStore;
use mimalloc::MiMalloc;
use tracing::debug;

use crate::assign::AssignArgs;

mod assign;
mod list;
mod output;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const DEFAULT_DATABASE_URL: &str = "sqlite://fleetme.db?mode=rwc";

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(short, long)]
    debug: bool,

    /// Database to open, e.g. "sqlite://fleetme.db?mode=rwc"
    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL, global = true)]
    database_url: String,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Creates or upgrades the database schema
    Migrate,
    /// Lists vehicles, newest first
    Vehicles {
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = 20)]
        per_page: u32,
    },
    /// Lists drivers
    Drivers,
    /// Lists vehicle types
    #[command(visible_alias = "vehicle-types")]
    Types,
    /// Finds active drivers by name or license number
    #[command(visible_alias = "s")]
    Search { query: String },
    /// Edits the drivers assigned to a vehicle
    Assign {
        #[command(flatten)]
        args: AssignArgs,
    },
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::from_filename("./.env.local").ok();

    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    let Some(command) = cli.command else {
        return Ok(());
    };

    let store = SqliteFleetStore::connect(&cli.database_url, 1).await?;
    debug!(database_url = %cli.database_url, "database opened");
    let format = output::Format::from_json_flag(cli.json);

    let result = match command {
        Commands::Migrate => store.migrate().await.map_err(anyhow::Error::from),
        Commands::Vehicles { page, per_page } => {
            list::vehicles(&store, page, per_page, format).await
        }
        Commands::Drivers => list::drivers(&store, format).await,
        Commands::Types => list::vehicle_types(&store, format).await,
        Commands::Search { query } => list::search(&store, &query, format).await,
        Commands::Assign { args } => assign::run(&store, args, format).await,
    };

    store.close().await;
    result
}
