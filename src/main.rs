mod aw_client;
mod blocks;
mod categories;
mod chart;
mod config;
mod error;
mod interactive;
mod logging;
mod models;
mod params;
mod pipeline;
mod settings;
mod ui;
mod utils;

#[cfg(test)]
mod testing;

use anyhow::Result;
use aw_client::AwClient;
use clap::Parser;
use config::{Config, OutputFormat};
use params::RawParams;
use pipeline::Outcome;
use std::io::{self, IsTerminal};
use std::process;
use tracing::{debug, error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "blockchart")]
#[command(version, long_version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")"))]
#[command(about = "Planned vs actual time per nextblock block, from ActivityWatch data", long_about = None)]
struct Cli {
    /// Visualization URL whose query string carries hostname, start and end
    #[arg(long)]
    url: Option<String>,

    /// Host whose buckets are charted
    #[arg(short = 'H', long)]
    hostname: Option<String>,

    /// Range start (ISO-8601 instant, local time without an offset, YYYY-MM-DD for local midnight)
    #[arg(short, long)]
    start: Option<String>,

    /// Range end (ISO-8601 instant, local time without an offset, YYYY-MM-DD for local midnight)
    #[arg(short, long)]
    end: Option<String>,

    /// ActivityWatch server (default: http://localhost:5600)
    #[arg(long)]
    server_url: Option<String>,

    /// Output format (default: tui on a terminal, text otherwise)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Store the effective server URL, hostname and format as defaults
    #[arg(long)]
    save_config: bool,

    /// Also write logs to a daily-rotated file with this name
    #[arg(long)]
    log_file: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    if let Err(e) = run(cli).await {
        error!("Error: {:#}", e);
        process::exit(1);
    }
}

fn init_logging(cli: &Cli) {
    match &cli.log_file {
        Some(name) => {
            if let Err(e) = logging::init_with_file(name, cli.verbose) {
                logging::init(cli.verbose);
                warn!("Could not open log file {}: {}", name, e);
            }
        }
        None => logging::init(cli.verbose),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            warn!("{}; using defaults", e);
            Config::default()
        }
    };

    let params = collect_params(&cli, &config)?.resolve()?;
    info!(hostname = %params.hostname, period = %params.period, "Parameters resolved");

    let server_url = cli
        .server_url
        .clone()
        .unwrap_or_else(|| config.server_url.clone());

    if cli.save_config {
        let saved = Config {
            server_url: server_url.clone(),
            hostname: Some(params.hostname.clone()),
            format: cli.format.or(config.format),
        };
        saved.validate()?;
        let path = saved.save()?;
        info!(path = %path.display(), "Configuration saved");
    }

    let client = AwClient::new(&server_url)?;
    let outcome = pipeline::run(&client, &params).await;

    let stdout_is_terminal = io::stdout().is_terminal();
    let format = select_format(cli.format, config.format, stdout_is_terminal);

    match outcome {
        Outcome::NoData(reason) => {
            debug!(?reason, "Nothing to chart");
            ui::print_no_data()?;
        }
        Outcome::Chart(chart) => match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&chart)?),
            OutputFormat::Text => ui::print_chart(&chart, &params, stdout_is_terminal)?,
            OutputFormat::Tui => interactive::run_interactive(chart, params)?,
        },
    }

    Ok(())
}

/// Merges flags, the visualization URL and the config file, in that order.
fn collect_params(cli: &Cli, config: &Config) -> Result<RawParams> {
    let from_url = match &cli.url {
        Some(url) => RawParams::from_url(url)?,
        None => RawParams::default(),
    };

    let from_flags = RawParams {
        hostname: cli.hostname.clone(),
        start: cli.start.clone(),
        end: cli.end.clone(),
    };

    let from_config = RawParams {
        hostname: config.hostname.clone(),
        ..RawParams::default()
    };

    Ok(from_flags.or(from_url).or(from_config))
}

fn select_format(
    flag: Option<OutputFormat>,
    configured: Option<OutputFormat>,
    stdout_is_terminal: bool,
) -> OutputFormat {
    flag.or(configured).unwrap_or(if stdout_is_terminal {
        OutputFormat::Tui
    } else {
        OutputFormat::Text
    })
}
