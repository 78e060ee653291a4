use clap::{Parser, Subcommand};
use kitchen_vibe::config::{AppConfig, LaunchStrategy};
use kitchen_vibe::fetchers::RequestFetcher;
use kitchen_vibe::{fetch_recipe, server};
use log::error;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "kitchen-vibe")]
#[command(version)]
#[command(about = "Paste a blog link, get just the recipe")]
struct Cli {
    /// Override the configured browser launch strategy
    #[arg(long, global = true, value_enum)]
    strategy: Option<StrategyArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum StrategyArg {
    Full,
    Constrained,
}

impl From<StrategyArg> for LaunchStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Full => LaunchStrategy::Full,
            StrategyArg::Constrained => LaunchStrategy::Constrained,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the extraction API
    Serve {
        /// Address to bind, overrides configuration
        #[arg(long)]
        bind: Option<String>,
    },
    /// Render one URL and print the extracted recipe as JSON
    Extract {
        url: String,
    },
    /// Check how a site answers a plain (non-rendering) HTTP request
    Probe {
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    if let Some(strategy) = cli.strategy {
        config.browser.strategy = strategy.into();
    }

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            server::serve(&config).await?;
        }
        Commands::Extract { url } => match fetch_recipe(&url, &config.browser).await {
            Ok(recipe) => println!("{}", serde_json::to_string_pretty(&recipe)?),
            Err(e) => {
                error!("Unable to extract a recipe from {}: {}", url, e);
                return Err(e.into());
            }
        },
        Commands::Probe { url } => {
            let fetcher =
                RequestFetcher::new(&config.browser.user_agent, Some(Duration::from_secs(10)))?;
            let report = fetcher.probe(&url).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
