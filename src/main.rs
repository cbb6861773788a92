use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing::{info, warn};

use nsws_autofill::browser::{BrowserSession, SessionOptions};
use nsws_autofill::config::{Credentials, Settings};
use nsws_autofill::logging::{self, log_step};
use nsws_autofill::{Engine, Selector, SelectorPolicy, data, dropdown, form};

#[derive(Parser)]
#[command(name = "nsws-autofill", about = "Fill the NSWS application form from declarative actions")]
struct Cli {
    /// DevTools websocket of a running Chrome to attach to.
    #[arg(long, env = "NSWS_DEBUG_URL", global = true)]
    debug_url: Option<String>,

    #[arg(long, global = true)]
    headless: bool,

    /// Chrome profile directory (defaults to the local data dir).
    #[arg(long, global = true)]
    profile: Option<PathBuf>,

    /// JSON settings file overriding portal selectors and engine timings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    retries: Option<u32>,

    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Resolve multiple selector keys by priority instead of rejecting them.
    #[arg(long, global = true)]
    priority_selectors: bool,

    #[arg(long, default_value = "logs", global = true)]
    log_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Execute an action list file and print the batch result.
    Run { actions: PathBuf },
    /// Select the subForm1 dropdown options from the data file.
    Dropdown {
        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// Sign in and open the application form.
    Login,
}

fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    let log_file = logging::init(&cli.log_dir).context("failed to set up logging")?;
    info!(log_file = %log_file.display(), "logging initialised");

    let mut settings = Settings::load(cli.config.as_deref())?;
    settings.apply_env();
    if let Some(retries) = cli.retries {
        settings.engine.retries = retries;
    }
    if let Some(secs) = cli.timeout_secs {
        settings.engine.set_locate_timeout_secs(secs);
    }
    if cli.priority_selectors {
        settings.engine.selector_policy = SelectorPolicy::Priority;
    }

    let session = BrowserSession::open(&SessionOptions {
        debug_url: cli.debug_url.clone(),
        headless: cli.headless,
        profile_dir: cli.profile.clone(),
    })?;
    let driver = session.driver();
    let engine = Engine::new(&driver, settings.engine.clone());

    match cli.command {
        Command::Run { actions: path } => {
            let actions = data::load_actions(&path)
                .with_context(|| format!("cannot load {}", path.display()))?;
            log_step("Run action list", &format!("{} actions", actions.len()));
            let results = engine.run_batch(&actions);
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Command::Dropdown { data } => {
            let path = data.unwrap_or_else(|| settings.portal.data_file.clone());
            let envelope =
                dropdown::handle_dropdown_file(&engine, &path, &settings.portal.dropdown);
            println!("{}", serde_json::to_string_pretty(&envelope)?);
        }
        Command::Login => {
            let portal = &settings.portal;
            let credentials = Credentials::from_env()?;
            log_step("Login", &portal.login_url);
            session.navigate(&portal.login_url, portal.waits.long())?;

            let login = engine.run_actions(&form::login_actions(&portal.login, &credentials));
            if !login.all_succeeded() {
                warn!("{}", login.summary);
            }

            if let Some(org) = &portal.login.organization_xpath {
                engine.wait_for_presence(&Selector::xpath(org.clone()), portal.waits.medium());
            }
            log_step("Open application form", "");
            let apply = engine.run_actions(&form::apply_actions(&portal.login));
            if apply.all_succeeded() {
                std::thread::sleep(portal.waits.form_load());
            }
            println!("{}", serde_json::to_string_pretty(&[login, apply])?);
        }
    }

    Ok(())
}
