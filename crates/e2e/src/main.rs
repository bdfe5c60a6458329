//! E2E suite entry point
//!
//! Runs the registered UI and API scenarios against a running deployment.
//! Run with: cargo run --package fullstack-e2e -- --marker auth

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use fullstack_e2e::scenario::ScenarioFilter;
use fullstack_e2e::{scenarios, Category, HarnessResult, Settings, TestRunner, WebDriverFactory};

#[derive(Parser, Debug)]
#[command(name = "fullstack-e2e")]
#[command(about = "Browser and API E2E suite for the full-stack admin/items application")]
struct Args {
    /// Run only scenarios carrying this marker (repeatable, any-of)
    #[arg(short = 'm', long = "marker")]
    markers: Vec<Category>,

    /// Run only scenarios whose name contains this substring
    #[arg(short = 'k', long)]
    name: Option<String>,

    /// List the selected scenarios and exit
    #[arg(long)]
    list: bool,

    /// WebDriver endpoint, overrides E2E_WEBDRIVER_URL
    #[arg(long)]
    webdriver_url: Option<String>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Default wait budget in seconds, overrides E2E_WAIT_TIMEOUT_SECS
    #[arg(long)]
    wait_timeout_secs: Option<u64>,

    /// Output directory for results
    #[arg(short, long, default_value = "test-results")]
    output: PathBuf,

    /// Skip waiting for the backend health check
    #[arg(long)]
    skip_preflight: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// How long the preflight waits for the backend to answer
const PREFLIGHT_TIMEOUT: Duration = Duration::from_secs(30);

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {}", e);
            return ExitCode::from(2);
        }
    };

    match runtime.block_on(async_main(args)) {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

async fn async_main(args: Args) -> HarnessResult<ExitCode> {
    let filter = ScenarioFilter {
        markers: args.markers,
        name: args.name,
    };
    let selected = filter.select(&scenarios::all());

    if args.list {
        for scenario in &selected {
            let markers: Vec<&str> = scenario.categories.iter().map(|c| c.as_str()).collect();
            println!("{} [{}]", scenario.name, markers.join(", "));
        }
        return Ok(ExitCode::SUCCESS);
    }

    let mut settings = Settings::from_env();
    if let Some(url) = args.webdriver_url {
        settings.webdriver_url = url;
    }
    if args.headed {
        settings.headless = false;
    }
    if let Some(secs) = args.wait_timeout_secs {
        settings.wait_timeout = Duration::from_secs(secs);
    }
    info!(
        "UI at {}, API at {}, WebDriver at {}",
        settings.ui_base_url, settings.api_base_url, settings.webdriver_url
    );

    let settings = Arc::new(settings);
    let sessions = Arc::new(WebDriverFactory::new(&settings));
    let runner = TestRunner::new(settings, sessions, args.output)?;

    if !args.skip_preflight {
        runner.ensure_backend_ready(PREFLIGHT_TIMEOUT).await?;
    }

    let results = runner.run(&selected).await;
    runner.write_results(&results)?;

    if let Some(reason) = &results.aborted {
        error!("Run aborted: {}", reason);
        eprintln!("Error: run aborted: {}", reason);
        return Ok(ExitCode::from(2));
    }
    Ok(if results.success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}
