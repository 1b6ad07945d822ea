use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, LaunchOptions, Tab};
use tracing::{debug, info};

use crate::error::{AgentError, ExecError};
use crate::types::{ActionKind, ActionRequest, RenderSnapshot};

/// Keep Chrome alive across the settle delay between attempts; the crate
/// default reaps an idle browser far sooner than a full run takes.
const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(300);

/// The live page the agent observes and acts on.
#[async_trait]
pub trait Session: Send {
    async fn navigate(&mut self, address: &str) -> Result<(), AgentError>;
    async fn capture(&mut self) -> Result<RenderSnapshot, AgentError>;
    async fn click_text(&mut self, target: &str) -> Result<(), ExecError>;
}

/// Translate a validated action decision into a session operation.
///
/// No retry here; retry policy belongs to the loop.
pub async fn execute<S: Session>(session: &mut S, action: &ActionRequest) -> Result<(), ExecError> {
    match action.action {
        ActionKind::Click => session.click_text(&action.target).await,
        ActionKind::Type => Err(ExecError::UnsupportedAction(action.action)),
    }
}

/// A Chrome instance owned for the duration of one run. The process is torn
/// down when this is dropped, whichever way the run ends.
pub struct ChromeSession {
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeSession {
    /// Blocking; call from `spawn_blocking`.
    pub fn launch(headless: bool) -> Result<Self, AgentError> {
        let options = LaunchOptions {
            headless,
            args: vec![
                OsStr::new("--no-first-run"),
                OsStr::new("--no-default-browser-check"),
                OsStr::new("--disable-blink-features=AutomationControlled"),
            ],
            idle_browser_timeout: IDLE_BROWSER_TIMEOUT,
            ..Default::default()
        };

        let browser =
            Browser::new(options).map_err(|e| AgentError::Session(format!("launch failed: {e}")))?;
        let tab = browser
            .new_tab()
            .map_err(|e| AgentError::Session(format!("could not open tab: {e}")))?;

        info!("chrome ready");
        Ok(Self {
            _browser: browser,
            tab,
        })
    }
}

#[async_trait]
impl Session for ChromeSession {
    async fn navigate(&mut self, address: &str) -> Result<(), AgentError> {
        let tab = self.tab.clone();
        let url = address.to_string();
        let address = address.to_string();

        tokio::task::spawn_blocking(move || {
            tab.navigate_to(&url)?;
            tab.wait_for_element("body")?;
            Ok::<_, anyhow::Error>(())
        })
        .await
        .map_err(|e| AgentError::Session(format!("navigation task panicked: {e}")))?
        .map_err(|e| AgentError::Navigation {
            address,
            reason: e.to_string(),
        })
    }

    async fn capture(&mut self) -> Result<RenderSnapshot, AgentError> {
        let tab = self.tab.clone();

        let png = tokio::task::spawn_blocking(move || {
            tab.capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
        })
        .await
        .map_err(|e| AgentError::Session(format!("capture task panicked: {e}")))?
        .map_err(|e| AgentError::Capture(e.to_string()))?;

        debug!(bytes = png.len(), "captured screenshot");
        Ok(RenderSnapshot::new(png))
    }

    async fn click_text(&mut self, target: &str) -> Result<(), ExecError> {
        let tab = self.tab.clone();
        let target = target.to_string();

        tokio::task::spawn_blocking(move || {
            let elements = tab
                .find_elements_by_xpath(&text_xpath(&target))
                .unwrap_or_default();

            // First match in document order keeps the choice deterministic.
            let Some(element) = elements.first() else {
                return Err(ExecError::ElementNotFound(target));
            };
            element
                .click()
                .map_err(|e| ExecError::Interaction(e.to_string()))?;
            Ok(())
        })
        .await
        .map_err(|e| ExecError::Interaction(format!("click task panicked: {e}")))?
    }
}

/// XPath matching elements whose visible text equals `target`: the innermost
/// elements with that exact normalized text, plus inputs labelled via
/// `value`.
fn text_xpath(target: &str) -> String {
    let lit = xpath_literal(target);
    format!(
        "//*[normalize-space()={lit} and not(.//*[normalize-space()={lit}])] | //input[@value={lit}]"
    )
}

/// Quote a string as an XPath literal. XPath 1.0 has no escaping, so text
/// containing both quote kinds goes through concat().
fn xpath_literal(s: &str) -> String {
    if !s.contains('"') {
        format!("\"{s}\"")
    } else if !s.contains('\'') {
        format!("'{s}'")
    } else {
        let parts: Vec<String> = s.split('"').map(|p| format!("\"{p}\"")).collect();
        format!("concat({})", parts.join(", '\"', "))
    }
}
