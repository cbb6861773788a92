use anyhow::{Context, Result, anyhow};
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::chrome::ChromeDriver;

#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// DevTools websocket of an already running Chrome
    /// (`ws://127.0.0.1:9222/devtools/browser/<id>`).
    pub debug_url: Option<String>,
    pub headless: bool,
    /// Persistent profile so the portal's cookies survive between runs.
    pub profile_dir: Option<PathBuf>,
}

/// One Chrome instance and the tab the engine works in.
pub struct BrowserSession {
    _browser: Browser,
    pub tab: Arc<Tab>,
}

impl BrowserSession {
    /// Attach to `debug_url` when given and reachable, otherwise launch.
    pub fn open(options: &SessionOptions) -> Result<Self> {
        if let Some(url) = &options.debug_url {
            info!(%url, "attaching to existing Chrome");
            match Browser::connect(url.clone()) {
                Ok(browser) => return Self::attach(browser),
                Err(e) => warn!(error = %e, "could not attach, launching a new browser"),
            }
        }
        Self::launch(options)
    }

    fn attach(browser: Browser) -> Result<Self> {
        let existing = {
            let tabs = browser.get_tabs();
            let tabs = tabs
                .lock()
                .map_err(|_| anyhow!("browser tab list lock poisoned"))?;
            tabs.first().cloned()
        };
        let tab = match existing {
            Some(tab) => {
                debug!("using existing tab");
                tab
            }
            None => browser.new_tab()?,
        };
        Ok(Self {
            _browser: browser,
            tab,
        })
    }

    fn launch(options: &SessionOptions) -> Result<Self> {
        let profile = match &options.profile_dir {
            Some(dir) => dir.clone(),
            None => default_profile_dir()?,
        };
        std::fs::create_dir_all(&profile)
            .with_context(|| format!("failed to create profile dir {}", profile.display()))?;

        let launch = LaunchOptions {
            headless: options.headless,
            path: find_chrome(),
            user_data_dir: Some(profile),
            args: vec![
                OsStr::new("--no-first-run"),
                OsStr::new("--no-default-browser-check"),
                OsStr::new("--disable-blink-features=AutomationControlled"),
                OsStr::new("--disable-infobars"),
                OsStr::new("--password-store=basic"),
            ],
            idle_browser_timeout: Duration::from_secs(600),
            ..Default::default()
        };

        info!(headless = options.headless, "launching Chrome");
        let browser = Browser::new(launch).map_err(|e| anyhow!("Browser launch failed: {e}"))?;
        let tab = browser.new_tab()?;
        tab.navigate_to("about:blank")?;
        info!("Chrome ready");

        Ok(Self {
            _browser: browser,
            tab,
        })
    }

    pub fn driver(&self) -> ChromeDriver {
        ChromeDriver::new(self.tab.clone())
    }

    /// Load `url` and wait for its body, bounded by `timeout`.
    pub fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        info!(%url, "navigating");
        self.tab.set_default_timeout(timeout);
        self.tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .with_context(|| format!("failed to load {url}"))?;
        self.tab.wait_for_element("body")?;
        Ok(())
    }
}

fn default_profile_dir() -> Result<PathBuf> {
    let base = dirs::data_local_dir().ok_or_else(|| anyhow!("no local data directory"))?;
    Ok(base.join("nsws-autofill").join("profile"))
}

/// Well-known install locations; `None` lets headless_chrome search PATH.
fn find_chrome() -> Option<PathBuf> {
    let mut candidates = vec![
        PathBuf::from(r"C:\Program Files\Google\Chrome\Application\chrome.exe"),
        PathBuf::from(r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe"),
        PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
        PathBuf::from("/usr/bin/google-chrome"),
        PathBuf::from("/usr/bin/chromium"),
    ];
    if let Some(local) = dirs::data_local_dir() {
        candidates.push(local.join(r"Google\Chrome\Application\chrome.exe"));
    }
    candidates.into_iter().find(|p| p.exists())
}
