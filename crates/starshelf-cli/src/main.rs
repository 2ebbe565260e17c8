use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use starshelf_api::StarsClient;
use starshelf_core::{BookmarkDatabase, CommandRunner, Config};

mod menu;

#[derive(Parser)]
#[command(name = "starshelf")]
#[command(version, about = "Terminal bookmark manager with GitHub star import", long_about = None)]
struct Cli {
    /// Bookmark database path (overrides the config file)
    #[arg(long)]
    db: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - helps when things go sideways
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "starshelf=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    let db_path = cli.db.unwrap_or_else(|| config.database.path.clone());
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    tracing::info!(path = %db_path.display(), "opening bookmark database");

    let persistence = BookmarkDatabase::open(&db_path)?;
    let stars = StarsClient::with_base_url(config.github.token.clone(), config.github.api_url.clone());
    let runner = CommandRunner::new(Box::new(persistence)).with_star_source(Box::new(stars));

    println!("====================================================");
    println!("                Welcome to Starshelf!               ");
    println!("====================================================");
    println!();

    loop {
        let (command, success_message) = menu::next_command()?;
        match runner.run(command).await {
            Ok(outcome) => menu::render(&outcome, success_message),
            // The shell is the outermost caller: report and go back to
            // the menu, partial work from the failed command stays.
            Err(err) => eprintln!("Error: {}", err),
        }
    }
}
