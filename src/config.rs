use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use crate::navigate::SettleCheck;
use crate::{
    ASSEMBLY_CSV, BASE_URL, COUNCIL_CSV, DB_PATH, DRIVER_READY_WAIT, ELEMENT_WAIT,
    SETTLE_POLL_INTERVAL, SETTLE_WAIT, WEBDRIVER_URL,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Browser {
    Chrome,
    Firefox,
}

/// Everything a run needs. `Default` uses the crate constants.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub db_path: PathBuf,
    pub webdriver_url: String,
    pub browser: Browser,
    pub headless: bool,
    /// Bound on each "element visible" wait of the navigator.
    pub element_wait: Duration,
    /// Bound on the wait for the page's asynchronous refresh to settle.
    pub settle_wait: Duration,
    pub settle_poll: Duration,
    pub settle_check: SettleCheck,
    pub driver_ready_wait: Duration,
    pub assembly_csv: PathBuf,
    pub council_csv: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.into(),
            db_path: DB_PATH.into(),
            webdriver_url: WEBDRIVER_URL.into(),
            browser: Browser::Chrome,
            headless: true,
            element_wait: ELEMENT_WAIT,
            settle_wait: SETTLE_WAIT,
            settle_poll: SETTLE_POLL_INTERVAL,
            settle_check: SettleCheck::asp_net_postback(),
            driver_ready_wait: DRIVER_READY_WAIT,
            assembly_csv: ASSEMBLY_CSV.into(),
            council_csv: COUNCIL_CSV.into(),
        }
    }
}
