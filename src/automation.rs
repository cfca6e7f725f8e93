//! Browser automation boundary and its WebDriver implementation.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thirtyfour::error::{WebDriverError, WebDriverErrorInner};
use thirtyfour::prelude::*;
use thirtyfour::ChromiumLikeCapabilities;

use crate::config::{Browser, Config};
use crate::parse::RenderedTable;
use crate::{Error, Result, ELEMENT_POLL_INTERVAL};

/// How to locate an element on the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Id(String),
    Css(String),
    XPath(String),
}

impl Locator {
    pub fn id(id: &str) -> Self {
        Self::Id(id.into())
    }

    pub fn css(css: &str) -> Self {
        Self::Css(css.into())
    }

    pub fn xpath(xpath: &str) -> Self {
        Self::XPath(xpath.into())
    }

    fn by(&self) -> By {
        match self {
            Locator::Id(id) => By::Id(id.as_str()),
            Locator::Css(css) => By::Css(css.as_str()),
            Locator::XPath(xpath) => By::XPath(xpath.as_str()),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Id(id) => write!(f, "id={id}"),
            Locator::Css(css) => write!(f, "css={css}"),
            Locator::XPath(xpath) => write!(f, "xpath={xpath}"),
        }
    }
}

/// What the scraper needs from an automated browser session.
#[async_trait]
pub trait Automation: Send {
    type Element: Send + Sync;

    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Waits up to `wait` for `target` to be present.
    /// Fails with [`Error::NavigationTimeout`] when it never appears.
    async fn find_element(&mut self, target: &Locator, wait: Duration) -> Result<Self::Element>;

    async fn click(&mut self, element: &Self::Element) -> Result<()>;

    async fn execute_script(&mut self, code: &str) -> Result<Value>;

    /// The currently rendered document.
    async fn page_source(&mut self) -> Result<String>;

    /// Snapshot of the candidate rows currently rendered. Rows and their cells
    /// are read from one copy of the document.
    async fn read_rows(&mut self, row_selector: &str, cell_selector: &str) -> Result<RenderedTable> {
        let source = self.page_source().await?;
        RenderedTable::parse(&source, row_selector, cell_selector)
    }
}

/// A live WebDriver browser session.
pub struct WebDriverSession {
    driver: WebDriver,
}

impl WebDriverSession {
    pub async fn connect(config: &Config) -> Result<Self> {
        let driver = match config.browser {
            Browser::Chrome => {
                let mut caps = DesiredCapabilities::chrome();
                if config.headless {
                    caps.set_headless()?;
                }
                WebDriver::new(config.webdriver_url.as_str(), caps).await?
            }
            Browser::Firefox => {
                let mut caps = DesiredCapabilities::firefox();
                if config.headless {
                    caps.set_headless()?;
                }
                WebDriver::new(config.webdriver_url.as_str(), caps).await?
            }
        };
        // Element lookups poll through `query().wait()`; an implicit wait would stack on every poll.
        driver.set_implicit_wait_timeout(Duration::ZERO).await?;
        Ok(Self { driver })
    }

    pub async fn quit(self) -> Result<()> {
        self.driver.quit().await?;
        Ok(())
    }
}

#[async_trait]
impl Automation for WebDriverSession {
    type Element = WebElement;

    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.driver.goto(url).await?;
        Ok(())
    }

    async fn find_element(&mut self, target: &Locator, wait: Duration) -> Result<WebElement> {
        self.driver
            .query(target.by())
            .wait(wait, ELEMENT_POLL_INTERVAL)
            .first()
            .await
            .map_err(|e| lookup_error(target, wait, e))
    }

    async fn click(&mut self, element: &WebElement) -> Result<()> {
        element.click().await?;
        Ok(())
    }

    async fn execute_script(&mut self, code: &str) -> Result<Value> {
        let ret = self.driver.execute(code, Vec::new()).await?;
        Ok(ret.json().clone())
    }

    async fn page_source(&mut self) -> Result<String> {
        Ok(self.driver.source().await?)
    }
}

/// An expired query wait is a navigation timeout; anything else is a driver failure.
fn lookup_error(target: &Locator, wait: Duration, err: WebDriverError) -> Error {
    match err.as_inner() {
        WebDriverErrorInner::NoSuchElement(_) => Error::NavigationTimeout {
            target: target.to_string(),
            waited: wait,
        },
        _ => {
            tracing::debug!("lookup of {target} failed: {err}");
            Error::WebDriver(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_failures_are_not_timeouts() {
        let err = lookup_error(
            &Locator::id("category"),
            Duration::from_secs(20),
            WebDriverError::RequestFailed("connection refused".into()),
        );
        assert!(matches!(err, Error::WebDriver(_)));
    }
}
