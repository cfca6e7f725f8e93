use std::time::Duration;

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Timed out after {waited:?} waiting for element: {target}")]
    NavigationTimeout { target: String, waited: Duration },

    #[error("The selector you are trying to scrape with is invalid. Selector: {0}")]
    InvalidSelector(String),

    #[error("More than one `{table}` row matches natural key {key}")]
    UniquenessViolation { table: &'static str, key: String },

    #[error("{report} row is missing required field `{field}`")]
    MissingField {
        report: &'static str,
        field: &'static str,
    },

    #[error("WebDriver at {0} never reported ready.")]
    DriverUnavailable(String),

    #[error("Sqlite Error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("WebDriver Error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),

    #[error("Csv Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),
}
