mod db;
mod import;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    #[clap(short, long, global = true, default_value = "blockport.db")]
    database: String,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Db {
        #[clap(subcommand)]
        command: DbCommands,
    },
    /// Import a building block from the templates directory into a page
    ImportBlock {
        #[clap(flatten)]
        target: import::TargetArgs,
        #[clap(short, long)]
        template: String,
        /// Overrides BLOCKPORT_TEMPLATES_DIR
        #[clap(long)]
        templates_dir: Option<String>,
        #[clap(flatten)]
        actor: import::ActorArgs,
    },
    /// Import an exported fragment file into a page
    ImportFile {
        #[clap(flatten)]
        target: import::TargetArgs,
        #[clap(short, long)]
        file: String,
        #[clap(flatten)]
        actor: import::ActorArgs,
    },
}

#[derive(Subcommand, Debug)]
enum DbCommands {
    Init,
    Migrate {
        #[clap(subcommand)]
        direction: db::MigrateDirection,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(&args.log_level);

    match args.command {
        Commands::Db { command } => match command {
            DbCommands::Init => {
                info!("Initializing database: {}", args.database);
                db::migrate_database(&args.database, db::MigrateDirection::Up).await?;
            }
            DbCommands::Migrate { direction } => {
                info!("Running database migration: {:?}", direction);
                db::migrate_database(&args.database, direction).await?;
            }
        },
        Commands::ImportBlock {
            target,
            template,
            templates_dir,
            actor,
        } => {
            info!("Importing building block '{}' into page {}", template, target.page);
            let response = import::import_block(
                &args.database,
                target,
                template,
                templates_dir,
                actor,
            )
            .await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::ImportFile {
            target,
            file,
            actor,
        } => {
            info!("Importing fragment {} into page {}", file, target.page);
            let summary = import::import_file(&args.database, target, &file, actor).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_ref()
        .unwrap_or(&"info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("sqlx=warn,{}", log_level)))
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
