//! Headless Chrome session — jeden browser, jeden tab, sdílený celým během.
//!
//! headless_chrome je blokující, takže každé volání jde přes `spawn_blocking`
//! a čeká se na něj hned (nikdy dvě navigace naráz).

use anyhow::{Context, Result};
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::sync::Arc;
use std::time::Duration;
use tokio::task;
use tokio::time::sleep;
use tracing::{debug, info};

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const ACCEPT_LANGUAGE: &str = "de-CH,de;q=0.9,fr-CH;q=0.8,fr;q=0.7,it;q=0.6,en;q=0.5";

/// Načtená stránka: finální URL (po redirectech) + HTML po settle delay
#[derive(Debug, Clone)]
pub struct LoadedPage {
    pub url: String,
    pub html: String,
}

/// Cokoli, co umí načíst stránku. Chrome v produkci, fake v testech.
#[async_trait]
pub trait PageLoader: Send {
    async fn load(&mut self, url: &str) -> Result<LoadedPage>;
}

#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    pub user_agent: String,
    pub nav_timeout: Duration,
    pub settle: Duration,
    /// Minimální rozestup dvou navigací na sdíleném tabu
    pub min_nav_interval: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            nav_timeout: crate::DEFAULT_NAV_TIMEOUT,
            settle: crate::DEFAULT_SETTLE,
            min_nav_interval: Duration::from_millis(500),
        }
    }
}

/// Vlastněný browser + tab. Drop ukončí Chrome proces na každé cestě ven.
pub struct ChromeSession {
    _browser: Browser,
    tab: Arc<Tab>,
    settle: Duration,
    limiter: Option<DefaultDirectRateLimiter>,
}

impl ChromeSession {
    pub async fn launch(opts: BrowserOptions) -> Result<Self> {
        let launch_opts = opts.clone();
        let (browser, tab) = task::spawn_blocking(move || -> Result<(Browser, Arc<Tab>)> {
            let options = LaunchOptions::default_builder()
                .headless(launch_opts.headless)
                .sandbox(false)
                .window_size(Some((1366, 900)))
                .idle_browser_timeout(Duration::from_secs(600))
                .build()
                .context("Failed to build Chrome launch options")?;

            let browser = Browser::new(options).context("Failed to launch Chrome")?;
            let tab = browser.new_tab().context("Failed to create browser tab")?;
            tab.set_default_timeout(launch_opts.nav_timeout);
            tab.set_user_agent(&launch_opts.user_agent, Some(ACCEPT_LANGUAGE), None)
                .context("Failed to set user agent")?;
            Ok((browser, tab))
        })
        .await
        .context("Chrome launch task failed")??;

        info!(
            "🧭 Chrome ready (headless={}, nav_timeout={}s, settle={}ms)",
            opts.headless,
            opts.nav_timeout.as_secs(),
            opts.settle.as_millis()
        );

        Ok(Self {
            _browser: browser,
            tab,
            settle: opts.settle,
            limiter: Quota::with_period(opts.min_nav_interval).map(RateLimiter::direct),
        })
    }

    /// Sdílený tab pro interaktivní drivery (directory)
    pub fn tab(&self) -> Arc<Tab> {
        Arc::clone(&self.tab)
    }

    pub fn settle(&self) -> Duration {
        self.settle
    }

    /// Navigace s timeoutem + settle delay, bez čtení obsahu
    pub async fn navigate(&mut self, url: &str) -> Result<()> {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }

        let tab = self.tab();
        let target = url.to_string();
        task::spawn_blocking(move || -> Result<()> {
            tab.navigate_to(&target)
                .with_context(|| format!("Chrome navigate failed for {target}"))?;
            tab.wait_until_navigated()
                .with_context(|| format!("Chrome navigation timed out for {target}"))?;
            Ok(())
        })
        .await
        .context("navigation task failed")??;

        debug!("navigated {} (settling {}ms)", url, self.settle.as_millis());
        sleep(self.settle).await;
        Ok(())
    }

    /// Aktuální URL + HTML tabu
    pub async fn snapshot(&self) -> Result<LoadedPage> {
        let tab = self.tab();
        task::spawn_blocking(move || -> Result<LoadedPage> {
            let html = tab.get_content().context("Failed to read HTML from browser tab")?;
            Ok(LoadedPage { url: tab.get_url(), html })
        })
        .await
        .context("content task failed")?
    }
}

#[async_trait]
impl PageLoader for ChromeSession {
    async fn load(&mut self, url: &str) -> Result<LoadedPage> {
        self.navigate(url).await?;
        self.snapshot().await
    }
}
