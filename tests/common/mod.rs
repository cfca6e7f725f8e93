#![allow(dead_code)]

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use candidates::automation::{Automation, Locator};
use candidates::config::Config;
use candidates::store::Store;
use candidates::task::{Assembly, Council, Report};
use candidates::{Error, Result};

pub type Cells<'a> = &'a [(&'a str, &'a str)];

/// In-memory stand-in for the candidates site. Clicking a category link
/// selects which listing `page_source` renders.
pub struct FakeSite {
    assembly: String,
    council: String,
    current: Option<Locator>,
    pub visits: usize,
}

impl FakeSite {
    pub fn new(assembly: &[Cells<'_>], council: &[Cells<'_>]) -> Self {
        Self {
            assembly: listing(assembly),
            council: listing(council),
            current: None,
            visits: 0,
        }
    }

    pub fn set_assembly(&mut self, rows: &[Cells<'_>]) {
        self.assembly = listing(rows);
    }

    fn is_link(&self, target: &Locator) -> bool {
        *target == Assembly::targets().category_link || *target == Council::targets().category_link
    }
}

#[async_trait]
impl Automation for FakeSite {
    type Element = Locator;

    async fn navigate(&mut self, _url: &str) -> Result<()> {
        self.visits += 1;
        self.current = None;
        Ok(())
    }

    async fn find_element(&mut self, target: &Locator, wait: Duration) -> Result<Locator> {
        let visible = self.is_link(target)
            || (self.current.is_some() && *target == Assembly::targets().show_all);
        if visible {
            Ok(target.clone())
        } else {
            Err(Error::NavigationTimeout {
                target: target.to_string(),
                waited: wait,
            })
        }
    }

    async fn click(&mut self, element: &Locator) -> Result<()> {
        if self.is_link(element) {
            self.current = Some(element.clone());
        }
        Ok(())
    }

    async fn execute_script(&mut self, _code: &str) -> Result<Value> {
        Ok(json!(true))
    }

    async fn page_source(&mut self) -> Result<String> {
        let source = match &self.current {
            Some(link) if *link == Assembly::targets().category_link => &self.assembly,
            Some(_) => &self.council,
            None => return Ok("<html><body></body></html>".into()),
        };
        Ok(source.clone())
    }
}

/// Renders rows the way the site does: one `<tr>` per candidate, cells tagged
/// with a `headers` attribute.
pub fn listing(rows: &[Cells<'_>]) -> String {
    let mut html = String::from("<html><body><table><tr><th id=\"CANDIDATEBALLOTNAME\">Name</th></tr>");
    for (i, cells) in rows.iter().enumerate() {
        html.push_str(&format!(
            "<tr id=\"ctl00_cphContent_rptCandidatesBySurnameRow_{i}\">"
        ));
        for (header, text) in cells.iter() {
            html.push_str(&format!("<td headers=\"{header}\">{text}</td>"));
        }
        html.push_str("</tr>");
    }
    html.push_str("</table></body></html>");
    html
}

pub fn config() -> Config {
    Config {
        element_wait: Duration::from_millis(10),
        settle_wait: Duration::from_millis(10),
        settle_poll: Duration::from_millis(1),
        ..Config::default()
    }
}

pub fn store() -> Store {
    let store = Store::open_in_memory().unwrap();
    store.ensure_schema().unwrap();
    store
}

pub const JANE: Cells<'static> = &[
    ("CANDIDATEBALLOTNAME", "Jane Doe"),
    ("LOCALITY", "Townsville"),
    ("CONTESTAREACODE", "Riverside"),
    ("AFFILIATION", "Greens"),
    ("PHONE", "555-1"),
    ("MOBILE", ""),
    ("WEBSITE", ""),
    ("EMAIL", "jane@example.com"),
];
