use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use candidates::config::{Browser, Config};
use candidates::process::{export_reports, scrape_site};
use candidates::{info_time, Result};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// SQLite database file
    #[arg(long, global = true, env = "NSW_DB")]
    db: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape the assembly and council listings into the database
    Scrape(ScrapeArgs),
    /// Export both CSV reports from the database
    Export(ExportArgs),
    /// Scrape, then export
    Run {
        #[command(flatten)]
        scrape: ScrapeArgs,
        #[command(flatten)]
        export: ExportArgs,
    },
}

#[derive(Args)]
struct ScrapeArgs {
    /// WebDriver server URL
    #[arg(long, env = "NSW_WEBDRIVER")]
    webdriver: Option<String>,

    /// Candidate site home page
    #[arg(long, env = "NSW_BASE_URL")]
    base_url: Option<String>,

    /// Browser the WebDriver server drives
    #[arg(long, value_enum, env = "NSW_BROWSER")]
    browser: Option<Browser>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Seconds to wait for each link to appear
    #[arg(long, env = "NSW_ELEMENT_WAIT")]
    element_wait: Option<u64>,

    /// Seconds to wait for the "show all" refresh to settle
    #[arg(long, env = "NSW_SETTLE_WAIT")]
    settle_wait: Option<u64>,
}

#[derive(Args)]
struct ExportArgs {
    /// Directory the CSV reports are written to
    #[arg(short, long, env = "NSW_OUT_DIR")]
    out_dir: Option<PathBuf>,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(db) = &self.db {
            config.db_path = db.clone();
        }
    }
}

impl ScrapeArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.webdriver {
            config.webdriver_url = url.clone();
        }
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if let Some(browser) = self.browser {
            config.browser = browser;
        }
        config.headless = !self.headed;
        if let Some(secs) = self.element_wait {
            config.element_wait = Duration::from_secs(secs);
        }
        if let Some(secs) = self.settle_wait {
            config.settle_wait = Duration::from_secs(secs);
        }
    }
}

impl ExportArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.out_dir {
            config.assembly_csv = dir.join(&config.assembly_csv);
            config.council_csv = dir.join(&config.council_csv);
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run(Cli::parse()).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let start_time = Local::now();
    let mut config = Config::default();
    cli.apply(&mut config);

    match cli.command {
        Command::Scrape(args) => {
            args.apply(&mut config);
            scrape_site(&config).await?;
        }
        Command::Export(args) => {
            args.apply(&mut config);
            export_reports(&config)?;
        }
        Command::Run { scrape, export } => {
            scrape.apply(&mut config);
            export.apply(&mut config);
            scrape_site(&config).await?;
            export_reports(&config)?;
        }
    }

    info_time!(start_time, "Full program time:");
    Ok(())
}
