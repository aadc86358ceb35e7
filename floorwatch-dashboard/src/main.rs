//! Floorwatch Dashboard - terminal front end for the factory machine monitor
//!
//! Each subcommand is one screen of the dashboard:
//! - `map`: floor map with machine and failure counts per area
//! - `area`: paged machine list of one area
//! - `alerts`: severity-ranked alert feed
//! - `machine`: one machine and its alerts
//! - `rpm`: average rotational speed per machine
//! - `fixture`: chart panels computed from the static CSV fixture

mod screens;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use floorwatch_kernel::client::cancellable;
use floorwatch_kernel::stats::{self, average_speed_by_machine};
use floorwatch_kernel::{
    derive_alerts, group_by_area, load_config, load_fixture, load_more_prefix, paginate,
    DashboardConfig, FetchError, LoadOutcome, MachinesClient, ScreenSession, ScreenState, Topology,
};
use serde_json::json;
use std::future::Future;
use std::path::PathBuf;
use time::OffsetDateTime;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "floorwatch-dashboard", version, about = "Factory machine monitor")]
struct Cli {
    /// Print the screen data as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Override the machines API base url
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Factory map for one floor
    Map {
        #[arg(long, default_value_t = 1)]
        floor: u32,
    },
    /// Machines of one area, paged
    Area {
        id: u32,
        /// Needed only when the id exists on several floors
        #[arg(long)]
        floor: Option<u32>,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Alert feed; --page N shows the first N pages
    Alerts {
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// One machine by product id or UDI
    Machine { id: String },
    /// Average rotational speed per machine
    Rpm,
    /// Charts from the CSV fixture (default path from config)
    Fixture { path: Option<PathBuf> },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("floorwatch=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = load_config().await.context("Failed to load configuration")?;
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    debug!(api = %config.api.base_url, "configuration loaded");

    let output = run(&cli, &config).await?;
    print!("{output}");
    Ok(())
}

async fn run(cli: &Cli, config: &DashboardConfig) -> Result<String> {
    let now = OffsetDateTime::now_utc();
    let pages = &config.pagination;

    match &cli.command {
        Command::Map { floor } => {
            let (client, topology) = api(config)?;
            let records = fetch_screen("map", || client.fetch_all()).await?;
            let grouping = group_by_area(&records, &topology);
            if cli.json {
                to_json(&json!({
                    "floors": grouping.floor_summaries(),
                    "areas": grouping.area_summaries(),
                    "unmatched": grouping.unmatched.len(),
                }))
            } else {
                Ok(screens::map::render_map(&grouping, &topology, *floor))
            }
        }
        Command::Area { id, floor, page } => {
            let (client, topology) = api(config)?;
            let area = topology
                .areas()
                .iter()
                .find(|a| a.id == *id && floor.map_or(true, |f| a.floor == f))
                .ok_or_else(|| anyhow!("Unknown area {id}"))?;
            let records = fetch_screen("machine-details", || client.fetch_all()).await?;
            let grouping = group_by_area(&records, &topology);
            let bucket = grouping
                .bucket(area.id, area.floor)
                .ok_or_else(|| anyhow!("Area {id} missing from grouping"))?;
            if cli.json {
                to_json(&paginate(&bucket.machines, pages.machines_page_size, *page))
            } else {
                Ok(screens::details::render_area(bucket, pages.machines_page_size, *page))
            }
        }
        Command::Alerts { page } => {
            let (client, _) = api(config)?;
            let records = fetch_screen("alerts", || client.fetch_all()).await?;
            let alerts = derive_alerts(&records, now);
            info!(alerts = alerts.len(), records = records.len(), "alerts derived");
            if cli.json {
                to_json(&load_more_prefix(&alerts, pages.alerts_page_size, (*page).max(1)))
            } else {
                Ok(screens::alerts::render_alerts(&alerts, pages.alerts_page_size, *page, now))
            }
        }
        Command::Machine { id } => {
            let (client, _) = api(config)?;
            let record = fetch_screen("machine", || client.fetch_by_id(id)).await?;
            let alerts = derive_alerts(std::slice::from_ref(&record), now);
            if cli.json {
                to_json(&json!({ "machine": record, "alerts": alerts }))
            } else {
                Ok(screens::details::render_machine(&record, &alerts, now))
            }
        }
        Command::Rpm => {
            let (client, _) = api(config)?;
            let records = fetch_screen("rpm", || client.fetch_all()).await?;
            let averages = average_speed_by_machine(&records);
            if cli.json {
                to_json(&json!({
                    "machines": averages,
                    "fleet_average": stats::fleet_average(&averages),
                }))
            } else {
                Ok(screens::charts::render_rpm(&averages))
            }
        }
        Command::Fixture { path } => {
            let path = path.clone().unwrap_or_else(|| config.fixture.path.clone());
            let rows = load_fixture(&path)
                .await
                .with_context(|| format!("Failed to load fixture {}", path.display()))?;
            if cli.json {
                to_json(&json!({
                    "statistics": stats::machine_statistics(&rows),
                    "failure_types": screens::charts::nonzero_failures(&rows),
                    "temperature_comparison": stats::temperature_comparison(&rows),
                    "speed_torque_comparison": stats::speed_torque_comparison(&rows),
                }))
            } else {
                Ok(screens::charts::render_fixture(&rows))
            }
        }
    }
}

fn api(config: &DashboardConfig) -> Result<(MachinesClient, Topology)> {
    let client = MachinesClient::new(&config.api).context("Invalid machines API configuration")?;
    let topology = config.topology().context("Invalid area table")?;
    Ok((client, topology))
}

/// Mount a screen session, fetch, and unmount on Ctrl-C.
async fn fetch_screen<T, F, Fut>(screen: &str, fetch: F) -> Result<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let session = ScreenSession::mount(screen);
    let cancel = session.cancellation();

    let outcome = tokio::select! {
        outcome = session.load(|| cancellable(&cancel, fetch())) => outcome,
        _ = tokio::signal::ctrl_c() => {
            session.unmount();
            LoadOutcome::Discarded
        }
    };
    if outcome == LoadOutcome::Discarded {
        bail!("Interrupted while loading {screen}");
    }

    let state = std::mem::take(&mut *session.state().lock());
    match state {
        ScreenState::Ready(data) => Ok(data),
        ScreenState::Failed(message) => {
            Err(anyhow!(message)).with_context(|| format!("Failed to load {screen}"))
        }
        ScreenState::Idle | ScreenState::Loading => bail!("No data for {screen}"),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    let mut text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    text.push('\n');
    Ok(text)
}
