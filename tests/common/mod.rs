//! Scripted browser session for driving the portal flow without a browser

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use po_harvest::browser::BrowserSession;
use po_harvest::core::{Config, Credentials, ExtractError, Result};
use po_harvest::portal::{
    qty_input_selector, CONTINUE_BUTTON, CREATED_DATE_HEADER, DASHBOARD_MARKER, DETAIL_ROOT,
    ITEMS_TABLE, LISTING_BODY, LISTING_TABLE, PASSWORD_INPUT, PO_NUMBER_INPUT, USERNAME_INPUT,
};

pub const BASE_URL: &str = "https://portal.test";

/// One page the scripted browser can open
#[derive(Debug, Default, Clone)]
pub struct Page {
    present: HashSet<String>,
    html: HashMap<String, String>,
    values: HashMap<String, String>,
}

impl Page {
    pub fn with_present(mut self, selector: &str) -> Self {
        self.present.insert(selector.to_string());
        self
    }

    pub fn with_html(mut self, selector: &str, html: &str) -> Self {
        self.present.insert(selector.to_string());
        self.html.insert(selector.to_string(), html.to_string());
        self
    }

    pub fn with_value(mut self, selector: &str, value: &str) -> Self {
        self.present.insert(selector.to_string());
        self.values.insert(selector.to_string(), value.to_string());
        self
    }
}

#[derive(Debug, Default)]
struct State {
    pages: HashMap<String, Page>,
    driver_lost_at: HashSet<String>,
    current: Option<String>,
    sort_sequence: Vec<Option<String>>,
    sort_index: usize,
    opened: Vec<String>,
    fills: Vec<(String, String)>,
    sort_clicks: usize,
    closed: bool,
}

/// In-memory stand-in for agent-browser
#[derive(Debug, Default)]
pub struct ScriptedSession {
    state: Mutex<State>,
}

impl ScriptedSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, page: Page) -> Self {
        self.state.lock().unwrap().pages.insert(url.to_string(), page);
        self
    }

    /// Opening `url` behaves as if the agent-browser binary disappeared
    pub fn with_driver_lost_at(self, url: &str) -> Self {
        self.state.lock().unwrap().driver_lost_at.insert(url.to_string());
        self
    }

    /// aria-sort values reported by the Created Date header; each header
    /// click advances to the next one (the last value repeats)
    pub fn with_sort_sequence(self, sequence: &[Option<&str>]) -> Self {
        self.state.lock().unwrap().sort_sequence =
            sequence.iter().map(|s| s.map(str::to_string)).collect();
        self
    }

    pub fn opened(&self) -> Vec<String> {
        self.state.lock().unwrap().opened.clone()
    }

    pub fn fills(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().fills.clone()
    }

    pub fn sort_clicks(&self) -> usize {
        self.state.lock().unwrap().sort_clicks
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    fn with_current<T>(&self, f: impl FnOnce(&Page) -> Option<T>, selector: &str) -> Result<T> {
        let state = self.state.lock().unwrap();
        state
            .current
            .as_ref()
            .and_then(|url| state.pages.get(url))
            .and_then(f)
            .ok_or_else(|| ExtractError::ElementNotFound(selector.to_string()))
    }
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    async fn open(&self, url: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.opened.push(url.to_string());
        if state.driver_lost_at.contains(url) {
            return Err(ExtractError::AgentBrowserNotFound);
        }
        if state.pages.contains_key(url) {
            state.current = Some(url.to_string());
            Ok(())
        } else {
            Err(ExtractError::browser(format!("navigation to {} failed", url)))
        }
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if selector == CREATED_DATE_HEADER {
            state.sort_index += 1;
            state.sort_clicks += 1;
        }
        Ok(())
    }

    async fn fill(&self, selector: &str, text: &str) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .fills
            .push((selector.to_string(), text.to_string()));
        Ok(())
    }

    async fn value(&self, selector: &str) -> Result<String> {
        self.with_current(|page| page.values.get(selector).cloned(), selector)
    }

    async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let state = self.state.lock().unwrap();
        if selector == CREATED_DATE_HEADER && name == "aria-sort" {
            let index = state.sort_index.min(state.sort_sequence.len().saturating_sub(1));
            return Ok(state.sort_sequence.get(index).cloned().flatten());
        }
        Ok(None)
    }

    async fn html(&self, selector: &str) -> Result<String> {
        self.with_current(|page| page.html.get(selector).cloned(), selector)
    }

    async fn count(&self, selector: &str) -> Result<usize> {
        let state = self.state.lock().unwrap();
        let present = state
            .current
            .as_ref()
            .and_then(|url| state.pages.get(url))
            .map(|page| page.present.contains(selector))
            .unwrap_or(false);
        Ok(usize::from(present))
    }

    async fn is_visible(&self, selector: &str) -> Result<bool> {
        self.count(selector).await.map(|n| n > 0)
    }

    async fn close(&self) -> Result<()> {
        self.state.lock().unwrap().closed = true;
        Ok(())
    }
}

pub fn login_url() -> String {
    format!("{}/account/login", BASE_URL)
}

pub fn listing_url() -> String {
    format!("{}/dashboard/purchase-orders", BASE_URL)
}

pub fn detail_url(id: u32) -> String {
    format!("{}/dashboard/purchase-orders/details/{}", BASE_URL, id)
}

pub fn config() -> Config {
    let mut config = Config::default();
    config.portal.base_url = BASE_URL.to_string();
    config.timeouts.short_secs = 1;
    config.timeouts.login_secs = 1;
    config.timeouts.page_secs = 1;
    config
}

pub fn credentials() -> Credentials {
    Credentials {
        username: "ops@example.com".to_string(),
        password: "s3cret".to_string(),
    }
}

pub fn login_page() -> Page {
    Page::default()
        .with_present(USERNAME_INPUT)
        .with_present(PASSWORD_INPUT)
        .with_present(CONTINUE_BUTTON)
        .with_present(DASHBOARD_MARKER)
}

/// Listing row: (PO id, PO number, Created Date text)
pub fn listing_page(rows: &[(u32, &str, &str)]) -> Page {
    let body: String = rows
        .iter()
        .map(|(id, po, created)| {
            format!(
                r#"<tr>
                     <td><input type="checkbox"></td>
                     <td>Acme</td>
                     <td>{po}</td>
                     <td>pending</td>
                     <td>{created}</td>
                     <td><a class="btn btn-info" href="/dashboard/purchase-orders/details/{id}">View</a></td>
                   </tr>"#
            )
        })
        .collect();

    Page::default()
        .with_present(LISTING_TABLE)
        .with_present(CREATED_DATE_HEADER)
        .with_html(LISTING_BODY, &body)
}

/// Detail view with one row per (name, sku, qty)
pub fn detail_page(po_number: &str, vendor: &str, items: &[(&str, &str, &str)]) -> Page {
    let total: u32 = items.iter().filter_map(|(_, _, q)| q.parse::<u32>().ok()).sum();
    let rows: String = items
        .iter()
        .map(|(name, sku, _)| {
            format!(
                r#"<tr>
                     <td><img src="p.png"></td>
                     <td><a href="/products/x">{name}</a><br>Sku: {sku}</td>
                     <td><input class="qty_input"></td>
                   </tr>"#
            )
        })
        .collect();

    let body = format!(
        r#"<form>
             <input name="po_number">
             <div><label>Warehouse</label><div><strong>Primary</strong></div></div>
             <div><label>Vendor:</label><div><strong>{vendor}</strong></div></div>
             <div><label>Total Quantity:</label><div><strong>{total}</strong></div></div>
           </form>
           <table class="table po-order-items"><tbody>{rows}</tbody></table>"#
    );

    let mut page = Page::default()
        .with_present(ITEMS_TABLE)
        .with_html(DETAIL_ROOT, &body)
        .with_value(PO_NUMBER_INPUT, po_number);
    for (index, (_, _, qty)) in items.iter().enumerate() {
        page = page.with_value(&qty_input_selector(index + 1), qty);
    }
    page
}
