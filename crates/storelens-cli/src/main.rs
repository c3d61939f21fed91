mod analyze;
mod stores;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "storelens")]
#[command(about = "Shopify storefront insights from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyze one storefront and print the record as JSON (nothing is stored)
    Analyze {
        /// Store address, e.g. `shop.example.com` or `https://shop.example.com`
        url: String,

        /// Run model enhancement (requires `GOOGLE_API_KEY`)
        #[arg(long)]
        llm: bool,

        /// Print single-line JSON
        #[arg(long)]
        compact: bool,
    },
    /// List recently analyzed stores
    Stores {
        /// Maximum number of rows
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
    /// Print a stored record as JSON
    Show {
        /// Row id as listed by `stores`
        id: i64,
    },
    /// Database utilities
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = storelens_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    // Logs go to stderr so JSON on stdout stays pipeable.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Analyze { url, llm, compact }) => {
            analyze::run_analyze(&config, &url, llm, compact).await?;
        }
        Some(Commands::Stores { limit }) => {
            let pool = storelens_db::connect_pool_from_config(&config).await?;
            stores::run_stores(&pool, limit).await?;
        }
        Some(Commands::Show { id }) => {
            let pool = storelens_db::connect_pool_from_config(&config).await?;
            stores::run_show(&pool, id).await?;
        }
        Some(Commands::Db { command }) => {
            let pool = storelens_db::connect_pool_from_config(&config).await?;
            match command {
                DbCommands::Ping => {
                    storelens_db::health_check(&pool).await?;
                    println!("database ok");
                }
                DbCommands::Migrate => {
                    let applied = storelens_db::run_migrations(&pool).await?;
                    println!("applied {applied} migration(s)");
                }
            }
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
        }
    }

    Ok(())
}
