//! NSW CANDIDATES SCRAPER
//! Walks the candidate listings on the NSW elections site through WebDriver,
//! reconciles every row into SQLite and exports the result as CSV.

use std::time::Duration;

mod macros;

mod error;
pub use error::{Error, Result};

pub mod automation;
pub mod config;
pub mod export;
pub mod model;
pub mod navigate;
pub mod parse;
pub mod process;
pub mod request;
pub mod store;
pub mod task;

const BASE_URL: &str = "http://candidates.elections.nsw.gov.au/";
const DB_PATH: &str = "candidates.sqlite3";
const WEBDRIVER_URL: &str = "http://localhost:4444";
const ASSEMBLY_CSV: &str = "assembly.csv";
const COUNCIL_CSV: &str = "council.csv";

const ELEMENT_WAIT: Duration = Duration::from_secs(20);
const ELEMENT_POLL_INTERVAL: Duration = Duration::from_millis(250);
/// "Show all" triggers an ASP.NET partial postback; past this the table is read as-is.
const SETTLE_WAIT: Duration = Duration::from_secs(30);
const SETTLE_POLL_INTERVAL: Duration = Duration::from_millis(500);
const DRIVER_READY_WAIT: Duration = Duration::from_secs(10);
