use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::automation::{Automation, Locator};
use crate::config::Config;
use crate::Result;

/// Script the NSW site answers `true` once its ASP.NET partial postback is done.
pub const ASP_NET_POSTBACK_IDLE: &str = "return window.Sys.WebForms.PageRequestManager.getInstance().get_isInAsyncPostBack() === false;";

/// How to tell that a click-triggered partial refresh has finished.
/// The site gives no completion event, so this is polled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettleCheck {
    /// Settled once the script returns `true`.
    Script(String),
    /// Treat the page as settled right after the click.
    Immediate,
}

impl SettleCheck {
    pub fn asp_net_postback() -> Self {
        Self::Script(ASP_NET_POSTBACK_IDLE.into())
    }

    async fn poll<A: Automation>(&self, session: &mut A) -> Result<bool> {
        match self {
            SettleCheck::Script(code) => Ok(session.execute_script(code).await?.as_bool() == Some(true)),
            SettleCheck::Immediate => Ok(true),
        }
    }
}

/// Click targets that lead from the home page to a full candidate listing.
#[derive(Debug, Clone)]
pub struct NavTargets {
    pub category_link: Locator,
    pub show_all: Locator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    Start,
    Home,
    CategoryLinkVisible,
    CategoryClicked,
    ShowAllVisible,
    ShowAllClicked,
    AsyncSettled,
}

/// Drives a session to the fully rendered candidate table.
pub struct Navigator<'a, A: Automation> {
    session: &'a mut A,
    config: &'a Config,
    state: NavState,
}

impl<'a, A: Automation> Navigator<'a, A> {
    pub fn new(session: &'a mut A, config: &'a Config) -> Self {
        Self {
            session,
            config,
            state: NavState::Start,
        }
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    /// Walks home → category → "show all" → settled.
    /// Returns whether the asynchronous refresh was confirmed as finished;
    /// an unconfirmed refresh is logged and the table is used as-is.
    pub async fn reach_table(&mut self, targets: &NavTargets) -> Result<bool> {
        debug!("[NAV] {}", self.config.base_url);
        self.session.navigate(&self.config.base_url).await?;
        self.advance(NavState::Home);

        let wait = self.config.element_wait;
        let category = self.session.find_element(&targets.category_link, wait).await?;
        self.advance(NavState::CategoryLinkVisible);
        self.session.click(&category).await?;
        self.advance(NavState::CategoryClicked);

        let show_all = self.session.find_element(&targets.show_all, wait).await?;
        self.advance(NavState::ShowAllVisible);
        self.session.click(&show_all).await?;
        self.advance(NavState::ShowAllClicked);

        let settled = self.wait_settled().await;
        self.advance(NavState::AsyncSettled);
        Ok(settled)
    }

    fn advance(&mut self, next: NavState) {
        debug!("[NAV] {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    async fn wait_settled(&mut self) -> bool {
        let deadline = Instant::now() + self.config.settle_wait;
        loop {
            match self.config.settle_check.poll(&mut *self.session).await {
                Ok(true) => return true,
                Ok(false) => debug!("[NAV] async postback still running"),
                Err(e) => debug!("[NAV] settle check failed: {e}"),
            }

            let now = Instant::now();
            if now >= deadline {
                warn!(
                    "[NAV] page did not settle within {:?}, reading table anyway",
                    self.config.settle_wait
                );
                return false;
            }
            sleep(self.config.settle_poll.min(deadline - now)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use super::*;
    use crate::Error;

    /// Page where every element in `present` exists and the settle script
    /// returns `true` from the `settle_after`-th call on.
    struct Scripted {
        present: Vec<Locator>,
        settle_after: usize,
        polls: usize,
        clicks: Vec<Locator>,
    }

    impl Scripted {
        fn new(present: Vec<Locator>, settle_after: usize) -> Self {
            Self {
                present,
                settle_after,
                polls: 0,
                clicks: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl Automation for Scripted {
        type Element = Locator;

        async fn navigate(&mut self, _url: &str) -> Result<()> {
            Ok(())
        }

        async fn find_element(&mut self, target: &Locator, wait: Duration) -> Result<Locator> {
            if self.present.contains(target) {
                Ok(target.clone())
            } else {
                Err(Error::NavigationTimeout {
                    target: target.to_string(),
                    waited: wait,
                })
            }
        }

        async fn click(&mut self, element: &Locator) -> Result<()> {
            self.clicks.push(element.clone());
            Ok(())
        }

        async fn execute_script(&mut self, _code: &str) -> Result<Value> {
            self.polls += 1;
            Ok(json!(self.polls >= self.settle_after))
        }

        async fn page_source(&mut self) -> Result<String> {
            Ok(String::new())
        }
    }

    fn targets() -> NavTargets {
        NavTargets {
            category_link: Locator::id("category"),
            show_all: Locator::xpath("//a[b]"),
        }
    }

    fn config() -> Config {
        Config {
            settle_check: SettleCheck::asp_net_postback(),
            settle_wait: Duration::from_millis(60),
            settle_poll: Duration::from_millis(5),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn clicks_both_targets_and_waits_for_settle() {
        let t = targets();
        let mut page = Scripted::new(vec![t.category_link.clone(), t.show_all.clone()], 3);
        let config = config();
        let mut nav = Navigator::new(&mut page, &config);

        assert!(nav.reach_table(&t).await.unwrap());
        assert_eq!(nav.state(), NavState::AsyncSettled);
        assert_eq!(page.clicks, vec![t.category_link, t.show_all]);
        assert_eq!(page.polls, 3);
    }

    #[tokio::test]
    async fn missing_show_all_is_fatal() {
        let t = targets();
        let mut page = Scripted::new(vec![t.category_link.clone()], 1);
        let config = config();
        let mut nav = Navigator::new(&mut page, &config);

        let err = nav.reach_table(&t).await.unwrap_err();
        assert!(matches!(err, Error::NavigationTimeout { .. }));
        assert_eq!(nav.state(), NavState::CategoryClicked);
    }

    #[tokio::test]
    async fn settle_timeout_is_not_fatal() {
        let t = targets();
        let mut page = Scripted::new(vec![t.category_link.clone(), t.show_all.clone()], usize::MAX);
        let config = config();
        let mut nav = Navigator::new(&mut page, &config);

        assert!(!nav.reach_table(&t).await.unwrap());
        assert_eq!(nav.state(), NavState::AsyncSettled);
        assert!(page.polls > 1);
    }
}
