//! chromiumoxide (Chrome DevTools Protocol) implementation of the browser
//! capability.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::network::{
    CookieParam, SetCookiesParams, SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams,
};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{BrowserEngine, BrowserEngineConfig, BrowserSession, SessionOptions};
use crate::cookies::CookieRecord;
use crate::error::BrowserError;

/// Resolves once the DOM content has loaded.
const WAIT_FOR_DOM_CONTENT_LOADED: &str = r#"
    new Promise((resolve) => {
        if (document.readyState !== 'loading') {
            resolve(document.readyState);
        } else {
            document.addEventListener('DOMContentLoaded', () => resolve(document.readyState));
        }
    })
"#;

const SCROLL_TO_BOTTOM: &str = r#"
    window.scrollTo(0, Math.max(
        document.body ? document.body.scrollHeight : 0,
        document.documentElement.scrollHeight
    ));
"#;

/// Launches a local headless Chrome per session, or attaches to a remote
/// DevTools endpoint when one is configured.
pub struct ChromiumEngine {
    config: BrowserEngineConfig,
}

impl ChromiumEngine {
    /// Common Chrome executable paths to check.
    const CHROME_PATHS: &'static [&'static str] = &[
        // Linux
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        "/opt/google/chrome/google-chrome",
    ];

    const CHROME_COMMANDS: &'static [&'static str] = &[
        "google-chrome",
        "google-chrome-stable",
        "chromium",
        "chromium-browser",
    ];

    pub fn new(config: BrowserEngineConfig) -> Self {
        Self { config }
    }

    /// Find the Chrome executable: configured path, well-known paths, then `PATH`.
    fn find_chrome(&self) -> Result<PathBuf, BrowserError> {
        if let Some(ref path) = self.config.chrome_path {
            if path.exists() {
                return Ok(path.clone());
            }
            return Err(BrowserError::Launch(format!(
                "configured Chrome executable not found: {}",
                path.display()
            )));
        }

        for path in Self::CHROME_PATHS {
            let p = std::path::Path::new(path);
            if p.exists() {
                debug!("Found Chrome at: {}", path);
                return Ok(p.to_path_buf());
            }
        }

        for cmd in Self::CHROME_COMMANDS {
            if let Ok(path) = which::which(cmd) {
                debug!("Found Chrome in PATH: {}", path.display());
                return Ok(path);
            }
        }

        Err(BrowserError::Launch(
            "Chrome/Chromium not found. Install chromium or set REELGRAB_CHROME".to_string(),
        ))
    }

    /// Launch a local browser on a throwaway profile directory.
    async fn launch(&self) -> Result<(Browser, JoinHandle<()>, TempDir), BrowserError> {
        let chrome_path = self.find_chrome()?;
        let profile = new_profile_dir()?;
        info!(
            "Launching browser (headless={}, profile={})",
            self.config.headless,
            profile.path().display()
        );

        let config = self.browser_config(chrome_path, profile.path())?;
        let (browser, handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        Ok((browser, spawn_handler(handler), profile))
    }

    fn browser_config(
        &self,
        chrome_path: PathBuf,
        profile_dir: &Path,
    ) -> Result<BrowserConfig, BrowserError> {
        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .user_data_dir(profile_dir);

        // with_head means NOT headless
        if !self.config.headless {
            builder = builder.with_head();
        }

        builder = builder
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--no-sandbox")
            .arg("--disable-gpu");

        for arg in &self.config.chrome_args {
            builder = builder.arg(arg);
        }

        builder
            .build()
            .map_err(|e| BrowserError::Launch(format!("invalid browser config: {}", e)))
    }

    async fn connect_remote(&self, url: &str) -> Result<(Browser, JoinHandle<()>), BrowserError> {
        info!("Connecting to remote browser at {}", url);

        // Resolve the WebSocket URL from the /json/version endpoint
        let http_url = url
            .replace("ws://", "http://")
            .replace("wss://", "https://");
        let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

        let resp: serde_json::Value = reqwest::get(&version_url)
            .await
            .map_err(|e| BrowserError::Launch(format!("remote browser unreachable: {}", e)))?
            .json()
            .await
            .map_err(|e| BrowserError::Launch(format!("bad browser version info: {}", e)))?;

        let ws_url = resp
            .get("webSocketDebuggerUrl")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                BrowserError::Launch("no webSocketDebuggerUrl in response".to_string())
            })?;

        debug!("Connecting to WebSocket: {}", ws_url);
        let (browser, handler) = Browser::connect(ws_url)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        Ok((browser, spawn_handler(handler)))
    }
}

/// Drive the CDP connection until it ends.
fn spawn_handler(mut handler: chromiumoxide::Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    })
}

/// Fresh user data directory, removed when the session closes.
fn new_profile_dir() -> Result<TempDir, BrowserError> {
    tempfile::Builder::new()
        .prefix("reelgrab-profile-")
        .tempdir()
        .map_err(|e| BrowserError::Launch(format!("failed to create profile dir: {}", e)))
}

fn cookie_params(cookies: &[CookieRecord]) -> Vec<CookieParam> {
    cookies
        .iter()
        .filter_map(|c| {
            match CookieParam::builder()
                .name(c.name.clone())
                .value(c.value.clone())
                .domain(c.domain.clone())
                .path(c.path.clone())
                .build()
            {
                Ok(param) => Some(param),
                Err(e) => {
                    warn!("Failed to build cookie {}: {}", c.name, e);
                    None
                }
            }
        })
        .collect()
}

/// `Network.setCookies` with domain-scoped cookies, usable before the page
/// has navigated anywhere.
fn set_cookies_command(cookies: &[CookieRecord]) -> Option<SetCookiesParams> {
    let params = cookie_params(cookies);
    if params.is_empty() {
        None
    } else {
        Some(SetCookiesParams::new(params))
    }
}

#[async_trait]
impl BrowserEngine for ChromiumEngine {
    async fn open_session(
        &self,
        options: &SessionOptions,
    ) -> Result<Box<dyn BrowserSession>, BrowserError> {
        Ok(Box::new(self.start(options).await?))
    }
}

impl ChromiumEngine {
    /// Acquire a browser and prepare an isolated page. Anything acquired is
    /// released again if preparation fails.
    async fn start(&self, options: &SessionOptions) -> Result<ChromiumSession, BrowserError> {
        let mut session = match self.config.remote_url.clone() {
            Some(url) => {
                let (browser, handler) = self.connect_remote(&url).await?;
                ChromiumSession::new(browser, handler, None)
            }
            None => {
                let (browser, handler, profile) = self.launch().await?;
                ChromiumSession::new(browser, handler, Some(profile))
            }
        };

        match session.prepare_page(options).await {
            Ok(()) => Ok(session),
            Err(e) => {
                if let Err(close_err) = session.close().await {
                    warn!("Failed to close browser after setup error: {}", close_err);
                }
                Err(e)
            }
        }
    }
}

/// One page in a browser this session owns. A launched browser runs on its
/// own profile directory; a remote one is shared, so the page lives in a
/// browser context created for this session alone.
struct ChromiumSession {
    browser: Browser,
    page: Option<Page>,
    handler: JoinHandle<()>,
    /// Set only for launched browsers.
    profile: Option<TempDir>,
    /// Set only for remote browsers.
    context: Option<BrowserContextId>,
    closed: bool,
}

impl ChromiumSession {
    fn new(browser: Browser, handler: JoinHandle<()>, profile: Option<TempDir>) -> Self {
        Self {
            browser,
            page: None,
            handler,
            profile,
            context: None,
            closed: false,
        }
    }

    fn launched(&self) -> bool {
        self.profile.is_some()
    }

    /// Open a blank page and install the user agent and cookies before any
    /// navigation happens.
    async fn prepare_page(&mut self, options: &SessionOptions) -> Result<(), BrowserError> {
        let mut target = CreateTargetParams::new("about:blank");
        if !self.launched() {
            let context = self
                .browser
                .create_browser_context(CreateBrowserContextParams::default())
                .await
                .map_err(|e| BrowserError::Launch(format!("failed to create context: {}", e)))?;
            target.browser_context_id = Some(context.clone());
            self.context = Some(context);
        }

        let page = self
            .browser
            .new_page(target)
            .await
            .map_err(|e| BrowserError::Launch(format!("failed to open page: {}", e)))?;

        if !options.user_agent.is_empty() {
            page.execute(SetUserAgentOverrideParams::new(options.user_agent.clone()))
                .await
                .map_err(|e| BrowserError::Launch(format!("failed to set user agent: {}", e)))?;
        }

        // Page::set_cookies refuses an about:blank page; Network.setCookies does not
        if let Some(command) = set_cookies_command(&options.cookies) {
            debug!("Installing {} cookies", command.cookies.len());
            page.execute(command)
                .await
                .map_err(|e| BrowserError::Launch(format!("failed to set cookies: {}", e)))?;
        }

        self.page = Some(page);
        Ok(())
    }

    fn page(&self) -> Result<&Page, BrowserError> {
        self.page.as_ref().ok_or(BrowserError::Closed)
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserError> {
        info!("Navigating to {}", url);
        let page = self.page()?;
        let params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(|e| BrowserError::Navigation {
                url: url.to_string(),
                reason: e,
            })?;

        let navigation = async {
            let response = page
                .execute(params)
                .await
                .map_err(|e| BrowserError::Navigation {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;
            if let Some(error_text) = response.result.error_text.clone() {
                return Err(BrowserError::Navigation {
                    url: url.to_string(),
                    reason: error_text,
                });
            }

            match page.evaluate(WAIT_FOR_DOM_CONTENT_LOADED.to_string()).await {
                Ok(result) => {
                    let state: String = result
                        .into_value()
                        .unwrap_or_else(|_| "unknown".to_string());
                    debug!("Page ready state: {}", state);
                }
                Err(e) => debug!("Could not check ready state: {}", e),
            }
            Ok(())
        };

        tokio::time::timeout(timeout, navigation)
            .await
            .map_err(|_| BrowserError::Timeout {
                url: url.to_string(),
                secs: timeout.as_secs(),
            })?
    }

    async fn query_links(&mut self, selector: &str) -> Result<Vec<String>, BrowserError> {
        let selector = serde_json::to_string(selector)
            .map_err(|e| BrowserError::Script(e.to_string()))?;
        let script = format!(
            "Array.from(document.querySelectorAll({})).map(e => e.href).filter(h => typeof h === 'string')",
            selector
        );

        let result = self
            .page()?
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))?;
        result
            .into_value::<Vec<String>>()
            .map_err(|e| BrowserError::Script(e.to_string()))
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), BrowserError> {
        self.page()?
            .evaluate(SCROLL_TO_BOTTOM.to_string())
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))?;
        Ok(())
    }

    async fn content(&mut self) -> Result<String, BrowserError> {
        self.page()?
            .content()
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let mut first_error = None;
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                first_error.get_or_insert(BrowserError::Script(format!("page close: {}", e)));
            }
        }

        // A remote browser is shared; only the context belongs to us
        if let Some(context) = self.context.take() {
            if let Err(e) = self.browser.dispose_browser_context(context).await {
                first_error.get_or_insert(BrowserError::Script(format!("context dispose: {}", e)));
            }
        }

        if let Some(profile) = self.profile.take() {
            if let Err(e) = self.browser.close().await {
                first_error.get_or_insert(BrowserError::Script(format!("browser close: {}", e)));
            }
            if let Err(e) = self.browser.wait().await {
                debug!("Browser process wait failed: {}", e);
            }
            let path = profile.path().display().to_string();
            if let Err(e) = profile.close() {
                warn!("Failed to remove profile dir {}: {}", path, e);
            }
        }

        self.handler.abort();
        first_error.map_or(Ok(()), Err)
    }
}
