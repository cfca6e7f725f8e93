use chrono::Local;
use tracing::warn;

use crate::automation::{Automation, WebDriverSession};
use crate::config::Config;
use crate::export::{export, ReportKind};
use crate::request::wait_for_driver;
use crate::store::Store;
use crate::task::{self, Assembly, Council, TaskSummary};
use crate::{info_time, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub assembly: TaskSummary,
    pub council: TaskSummary,
}

impl RunSummary {
    /// Tasks whose listing was read without the page confirming it had settled.
    pub fn unsettled(&self) -> impl Iterator<Item = &'static str> + '_ {
        [&self.assembly, &self.council]
            .into_iter()
            .filter(|t| !t.settled)
            .map(|t| t.report)
    }
}

/// Ensures the schema, then scrapes the assembly and council listings with one
/// browser session. The session is closed whether or not the scrape succeeds.
pub async fn scrape_site(config: &Config) -> Result<RunSummary> {
    let start_time = Local::now();
    info_time!("Started scraping {}", config.base_url);

    let mut store = Store::open(&config.db_path)?;
    store.ensure_schema()?;

    let client = reqwest::Client::new();
    wait_for_driver(&client, &config.webdriver_url, config.driver_ready_wait).await?;
    let mut session = WebDriverSession::connect(config).await?;

    let outcome = scrape_all(&mut session, &mut store, config).await;
    let closed = session.quit().await;
    let summary = outcome?;
    closed?;

    for report in summary.unsettled() {
        warn!("{report} listing was read before the page confirmed it had finished loading");
    }
    info_time!(start_time, "Finished scraping.");
    Ok(summary)
}

/// Assembly first, then council, strictly one after the other.
pub async fn scrape_all<A: Automation>(
    session: &mut A,
    store: &mut Store,
    config: &Config,
) -> Result<RunSummary> {
    let assembly = task::run::<Assembly, _>(session, store, config).await?;
    let council = task::run::<Council, _>(session, store, config).await?;
    Ok(RunSummary { assembly, council })
}

/// Writes both CSV reports from whatever is currently stored.
/// The database is opened read-only; a missing file or table is an error.
pub fn export_reports(config: &Config) -> Result<()> {
    let store = Store::open_read_only(&config.db_path)?;
    export(store.conn(), ReportKind::Assembly, &config.assembly_csv)?;
    export(store.conn(), ReportKind::Council, &config.council_csv)?;
    Ok(())
}
