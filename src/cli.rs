//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::adapters::credential_store::{CredentialStore, hash_password};
use crate::adapters::csv_adapter::load_portfolio;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::simulated_market::{MarketSettings, SimulatedMarket};
use crate::domain::analytics::{AnalysisReport, AnalyticsEngine};
use crate::domain::config_validation::{
    DEFAULT_BACKFILL_MAX, DEFAULT_BACKFILL_MIN, DEFAULT_BACKFILL_STEP, DEFAULT_MAX_NAV,
    DEFAULT_MIN_NAV, DEFAULT_REFRESH_STEP, parse_seed, validate_config,
};
use crate::domain::error::NavError;
use crate::domain::instrument::Instrument;
use crate::domain::portfolio::{Portfolio, PortfolioSummary};
use crate::ports::auth_port::Authenticator;
use crate::ports::config_port::ConfigPort;

#[derive(Parser, Debug)]
#[command(name = "navwatch", about = "NAV tracker and signal generator")]
pub struct Cli {
    /// Log domain events (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Count BUY/SELL/HOLD signals across a portfolio
    Summary {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        portfolio: Option<PathBuf>,
    },
    /// Print analytics reports for one or every instrument
    Report {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        portfolio: Option<PathBuf>,
        #[arg(long)]
        name: Option<String>,
    },
    /// Print the valuation history of an instrument
    History {
        #[arg(short, long)]
        portfolio: PathBuf,
        #[arg(long)]
        name: String,
    },
    /// Build a simulated portfolio and analyse it
    Demo {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 5)]
        count: usize,
        #[arg(long, default_value_t = 0)]
        refreshes: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Check a password (read from stdin) against the [auth] section
    Login {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        username: String,
    },
    /// Register a user (password from stdin) and print the [auth] line to add
    Register {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        username: String,
    },
    /// Output an argon2 hash for a password read from stdin
    HashPassword,
}

pub fn run(cli: Cli) -> ExitCode {
    init_tracing(cli.verbose);

    match cli.command {
        Command::Summary { config, portfolio } => {
            run_summary(config.as_deref(), portfolio.as_deref())
        }
        Command::Report {
            config,
            portfolio,
            name,
        } => run_report(config.as_deref(), portfolio.as_deref(), name.as_deref()),
        Command::History { portfolio, name } => run_history(&portfolio, &name),
        Command::Demo {
            config,
            count,
            refreshes,
            seed,
        } => run_demo(config.as_deref(), count, refreshes, seed),
        Command::Login { config, username } => run_login(&config, &username),
        Command::Register { config, username } => run_register(config.as_deref(), &username),
        Command::HashPassword => run_hash_password(),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // A subscriber may already be installed (tests call run() repeatedly).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn fail(err: &NavError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(err)
}

/// Load and validate an INI file.
pub fn load_config(path: &Path) -> Result<FileConfigAdapter, NavError> {
    eprintln!("Loading config from {}", path.display());
    let adapter = FileConfigAdapter::from_file(path)?;
    validate_config(&adapter)?;
    Ok(adapter)
}

fn load_optional_config(path: Option<&Path>) -> Result<Option<FileConfigAdapter>, NavError> {
    path.map(load_config).transpose()
}

pub fn build_market_settings(config: &dyn ConfigPort) -> Result<MarketSettings, NavError> {
    validate_config(config)?;
    Ok(MarketSettings {
        min_nav: config.get_double("market", "min_nav", DEFAULT_MIN_NAV),
        max_nav: config.get_double("market", "max_nav", DEFAULT_MAX_NAV),
        backfill_min: config.get_int("market", "backfill_min", DEFAULT_BACKFILL_MIN) as usize,
        backfill_max: config.get_int("market", "backfill_max", DEFAULT_BACKFILL_MAX) as usize,
        backfill_step: config.get_double("market", "backfill_step", DEFAULT_BACKFILL_STEP),
        refresh_step: config.get_double("market", "refresh_step", DEFAULT_REFRESH_STEP),
    })
}

/// Analytics engine seeded from `seed_override`, then `[analytics] seed`, then entropy.
pub fn build_engine(
    config: Option<&dyn ConfigPort>,
    seed_override: Option<u64>,
) -> Result<AnalyticsEngine, NavError> {
    let seed = match seed_override {
        Some(s) => Some(s),
        None => match config {
            Some(c) => parse_seed(c)?,
            None => None,
        },
    };
    Ok(match seed {
        Some(s) => AnalyticsEngine::seeded(s),
        None => AnalyticsEngine::from_entropy(),
    })
}

/// `--portfolio` wins over `[portfolio] file`.
pub fn resolve_portfolio_path(
    portfolio_override: Option<&Path>,
    config: Option<&dyn ConfigPort>,
) -> Result<PathBuf, NavError> {
    if let Some(p) = portfolio_override {
        return Ok(p.to_path_buf());
    }
    config
        .and_then(|c| c.get_string("portfolio", "file"))
        .filter(|s| !s.trim().is_empty())
        .map(|s| PathBuf::from(s.trim()))
        .ok_or_else(|| NavError::ConfigMissing {
            section: "portfolio".to_string(),
            key: "file".to_string(),
        })
}

pub fn format_summary(summary: Option<PortfolioSummary>) -> String {
    match summary {
        None => "No instruments in portfolio".to_string(),
        Some(s) => format!(
            "Portfolio Summary: {} instruments | BUY: {} | SELL: {} | HOLD: {}",
            s.total, s.buy, s.sell, s.hold
        ),
    }
}

fn format_threshold(value: f64) -> String {
    if value > 0.0 {
        format!("{value:.2}")
    } else {
        "-".to_string()
    }
}

pub fn format_table(portfolio: &Portfolio) -> String {
    let mut out = format!(
        "{:<24} {:<8} {:>12} {:>10} {:>10}  {}\n",
        "Name", "Symbol", "NAV", "Buy", "Sell", "Signal"
    );
    for inst in portfolio.iter() {
        out.push_str(&format!(
            "{:<24} {:<8} {:>12.2} {:>10} {:>10}  {}\n",
            inst.name(),
            inst.symbol(),
            inst.current_value(),
            format_threshold(inst.buy_threshold()),
            format_threshold(inst.sell_threshold()),
            inst.recommendation(),
        ));
    }
    out
}

pub fn format_report(report: &AnalysisReport) -> String {
    format!(
        "=== {} ({}) ===\n\
         Current NAV:      {:.2}\n\
         Trend:            {}\n\
         Projected NAV:    {:.2}\n\
         Confidence:       {}%\n\
         Key factor:       {}\n\
         Recommendation:   {}\n\
         Risk:             {} (volatility {:.2})\n",
        report.name,
        report.symbol,
        report.current_value,
        report.trend,
        report.projected_value,
        report.confidence_pct,
        report.market_factor,
        report.recommendation_detail(),
        report.risk,
        report.volatility,
    )
}

pub fn format_history(instrument: &Instrument) -> String {
    let mut out = format!("{} ({})\n", instrument.name(), instrument.symbol());
    for point in instrument.history_slice() {
        out.push_str(&format!(
            "  {}  {:>12.2}\n",
            point.timestamp.format("%d/%m/%Y %H:%M:%S"),
            point.value
        ));
    }
    out
}

/// Reports for `name`, or for every instrument when `name` is `None`.
pub fn build_reports(
    engine: &mut AnalyticsEngine,
    portfolio: &Portfolio,
    name: Option<&str>,
) -> Result<Vec<AnalysisReport>, NavError> {
    match name {
        Some(n) => Ok(vec![engine.report_for(portfolio, n)?]),
        None => portfolio
            .iter()
            .map(|inst| engine.full_report(Some(inst)))
            .collect(),
    }
}

fn open_portfolio(
    config_path: Option<&Path>,
    portfolio_path: Option<&Path>,
) -> Result<(Option<FileConfigAdapter>, Portfolio), NavError> {
    let config = load_optional_config(config_path)?;
    let path = resolve_portfolio_path(
        portfolio_path,
        config.as_ref().map(|c| c as &dyn ConfigPort),
    )?;
    eprintln!("Loading portfolio from {}", path.display());
    let portfolio = load_portfolio(&path)?;
    Ok((config, portfolio))
}

fn run_summary(config_path: Option<&Path>, portfolio_path: Option<&Path>) -> ExitCode {
    let (_, portfolio) = match open_portfolio(config_path, portfolio_path) {
        Ok(v) => v,
        Err(e) => return fail(&e),
    };

    if !portfolio.is_empty() {
        print!("{}", format_table(&portfolio));
    }
    println!("{}", format_summary(portfolio.summary()));
    ExitCode::SUCCESS
}

fn run_report(
    config_path: Option<&Path>,
    portfolio_path: Option<&Path>,
    name: Option<&str>,
) -> ExitCode {
    let (config, portfolio) = match open_portfolio(config_path, portfolio_path) {
        Ok(v) => v,
        Err(e) => return fail(&e),
    };

    let mut engine = match build_engine(config.as_ref().map(|c| c as &dyn ConfigPort), None) {
        Ok(e) => e,
        Err(e) => return fail(&e),
    };

    match build_reports(&mut engine, &portfolio, name) {
        Ok(reports) => {
            for report in &reports {
                println!("{}", format_report(report));
            }
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_history(portfolio_path: &Path, name: &str) -> ExitCode {
    eprintln!("Loading portfolio from {}", portfolio_path.display());
    let portfolio = match load_portfolio(portfolio_path) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    match portfolio.require(name) {
        Ok(inst) => {
            print!("{}", format_history(inst));
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

/// Simulated portfolio of `count` instruments, ticked `refreshes` times.
pub fn build_demo_portfolio(
    market: &mut SimulatedMarket,
    count: usize,
    refreshes: usize,
) -> Result<Portfolio, NavError> {
    let mut portfolio = Portfolio::new();
    for i in 1..=count {
        portfolio.add_from_source(&format!("Demo Fund {i}"), &format!("DF{i}"), market)?;
    }
    for _ in 0..refreshes {
        portfolio.refresh_all(market);
    }
    Ok(portfolio)
}

fn run_demo(
    config_path: Option<&Path>,
    count: usize,
    refreshes: usize,
    seed: Option<u64>,
) -> ExitCode {
    let config = match load_optional_config(config_path) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let config_port = config.as_ref().map(|c| c as &dyn ConfigPort);

    let settings = match config_port {
        Some(c) => match build_market_settings(c) {
            Ok(s) => s,
            Err(e) => return fail(&e),
        },
        None => MarketSettings::default(),
    };
    let market_seed = match seed {
        Some(s) => Some(s),
        None => match config_port.map(parse_seed).transpose() {
            Ok(s) => s.flatten(),
            Err(e) => return fail(&e),
        },
    };
    let market = match market_seed {
        Some(s) => SimulatedMarket::seeded(settings, s),
        None => SimulatedMarket::from_entropy(settings),
    };
    let mut market = match market {
        Ok(m) => m,
        Err(e) => return fail(&e),
    };
    let mut engine = match build_engine(config_port, seed) {
        Ok(e) => e,
        Err(e) => return fail(&e),
    };

    eprintln!("Simulating {count} instruments, {refreshes} refreshes");
    let portfolio = match build_demo_portfolio(&mut market, count, refreshes) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };

    print!("{}", format_table(&portfolio));
    println!("{}\n", format_summary(portfolio.summary()));
    match build_reports(&mut engine, &portfolio, None) {
        Ok(reports) => {
            for report in &reports {
                println!("{}", format_report(report));
            }
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn read_password() -> Result<String, NavError> {
    let stdin = io::stdin();
    let line = stdin.lock().lines().next().transpose()?;
    Ok(line.unwrap_or_default())
}

fn run_login(config_path: &Path, username: &str) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let store = match CredentialStore::from_config(&config) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    eprintln!("Enter password for {username}:");
    let password = match read_password() {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };

    if store.login(username, &password) {
        eprintln!("Login successful");
        ExitCode::SUCCESS
    } else {
        fail(&NavError::Credential {
            reason: format!("invalid username or password for {username}"),
        })
    }
}

/// Register `username` in `store` and render the `[auth]` line that persists it.
pub fn register_entry(
    store: &mut CredentialStore,
    username: &str,
    password: &str,
) -> Result<String, NavError> {
    if !store.register(username, password) {
        return Err(NavError::Credential {
            reason: format!("username {username:?} is empty or already registered"),
        });
    }
    let hash = store.hash_for(username).ok_or_else(|| NavError::Credential {
        reason: format!("no hash stored for {username}"),
    })?;
    Ok(format!("{username} = {hash}"))
}

fn run_register(config_path: Option<&Path>, username: &str) -> ExitCode {
    let store = match load_optional_config(config_path) {
        Ok(Some(config)) => CredentialStore::from_config(&config),
        Ok(None) => Ok(CredentialStore::new()),
        Err(e) => Err(e),
    };
    let mut store = match store {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    eprintln!("Enter password for {username}:");
    let password = match read_password() {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };

    match register_entry(&mut store, username, &password) {
        Ok(line) => {
            eprintln!("Add this line to the [auth] section:");
            println!("{line}");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_hash_password() -> ExitCode {
    eprintln!("Enter password to hash:");
    let password = match read_password() {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    match hash_password(&password) {
        Ok(hash) => {
            println!("{hash}");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}
