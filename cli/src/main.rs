//! Flowdeck CLI
//!
//! Command-line client for the Flowdeck dashboard API.
//!
//! # Usage
//!
//! ```bash
//! flowdeck --help
//! flowdeck health
//! flowdeck promql http_requests_total --kind events --filter 'status=500' --window 15m
//! flowdeck labels --watch
//! flowdeck notebook <id> --title "Incident review" --paragraph "Deploy at 14:02"
//! ```

#![deny(unsafe_code)]

mod client;
mod filter_arg;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::{or_empty, ApiClient, FlowFilter};
use filter_arg::parse_filter;
use shared::config::ClientConfig;
use shared::models::{
    Aggregation, Block, BlockConfig, Filter, Metric, MetricKind, NotebookPatch, RelativeRange,
    TimeWindow,
};
use shared::persistence::DebouncedSaver;
use shared::promql::{generate_prom_query, reconcile_aggregation, QueryParams};
use shared::uuid::Uuid;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Interval;

/// Flowdeck CLI - dashboard API command-line interface
#[derive(Parser)]
#[command(name = "flowdeck")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// API server URL
    #[arg(
        short,
        long,
        env = "FLOWDECK_API_URL",
        default_value = "http://localhost:8080"
    )]
    api_url: String,

    /// Bearer token for the API
    #[arg(long, env = "FLOWDECK_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = shared::config::client::DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API server health
    Health,

    /// Generate a PromQL query for a metric
    ///
    /// With --kind the query is built locally; otherwise the metric is
    /// looked up in the server's catalog.
    Promql {
        /// Metric key
        metric: String,

        /// Metric kind (events, values, distribution)
        #[arg(long)]
        kind: Option<String>,

        /// Aggregation (defaults to the kind's default)
        #[arg(short, long)]
        aggregation: Option<Aggregation>,

        /// Label filter: label=v, label!=v, label=~re, label!~re,
        /// label*=substr, label!*=substr
        #[arg(short, long = "filter", value_parser = parse_filter)]
        filters: Vec<Filter>,

        /// Label to group by (repeatable)
        #[arg(short, long = "group-by")]
        group_by: Vec<String>,

        /// Relative window (15m, 1h, 3h, 6h, 12h, 24h, 7d, 30d)
        #[arg(short, long, default_value = "1h")]
        window: RelativeRange,

        /// Aggregate over the whole window (values metrics)
        #[arg(long)]
        over_time: bool,
    },

    /// List catalog metrics
    Metrics {
        /// Only metrics of this kind
        #[arg(long)]
        kind: Option<String>,

        /// Search key and display name
        #[arg(short, long)]
        search: Option<String>,
    },

    /// List label names
    Labels {
        /// Only labels of this metric
        #[arg(short, long)]
        metric: Option<String>,

        /// Keep refreshing labels and tenants until Ctrl+C
        #[arg(short, long)]
        watch: bool,

        /// Refresh interval in seconds when watching
        #[arg(long, default_value_t = shared::config::client::DEFAULT_POLL_INTERVAL_SECS)]
        interval: u64,
    },

    /// List flow runs
    Flows {
        /// Tenant id
        #[arg(long)]
        tenant: Option<Uuid>,

        /// Status (running, succeeded, failed, cancelled)
        #[arg(long)]
        status: Option<String>,

        /// Page size
        #[arg(long, default_value_t = 50)]
        limit: usize,

        /// Page offset
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },

    /// Edit a notebook; edits are coalesced and saved once
    Notebook {
        /// Notebook id
        id: Uuid,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// Paragraph to append (repeatable)
        #[arg(short, long = "paragraph")]
        paragraphs: Vec<String>,

        /// Delay before edits are saved, in milliseconds
        #[arg(long, default_value_t = shared::config::client::DEFAULT_SAVE_DEBOUNCE_MS)]
        debounce_ms: u64,
    },
}

impl Cli {
    fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::new(&self.api_url).with_timeout_secs(self.timeout);
        match &self.token {
            Some(token) => config.with_token(token),
            None => config,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut cli = Cli::parse();
    let Some(command) = cli.command.take() else {
        println!("Flowdeck CLI v{}", env!("CARGO_PKG_VERSION"));
        println!("Use --help for usage information");
        return Ok(());
    };
    let client = ApiClient::new(cli.client_config())?;

    match command {
        Commands::Health => {
            let health = client
                .health()
                .await
                .with_context(|| format!("Flowdeck API at {} is unreachable", cli.api_url))?;
            print_json(&health)?;
        }
        Commands::Promql {
            metric,
            kind,
            aggregation,
            filters,
            group_by,
            window,
            over_time,
        } => {
            let config = BlockConfig {
                metric_key: Some(metric.clone()),
                filters,
                aggregation,
                agg_over_time: over_time,
                group_by,
                time_window: TimeWindow::relative(window),
            };
            match kind {
                Some(kind) => println!("{}", local_query(&metric, &kind, &config)?),
                None => {
                    let generated = client.promql(&config).await?;
                    println!("{}", generated.query);
                }
            }
        }
        Commands::Metrics { kind, search } => {
            let kind = kind.as_deref().map(str::parse::<MetricKind>).transpose()?;
            let metrics = or_empty(
                client.metrics(kind, search.as_deref()).await,
                "Failed to load metrics",
            );
            for metric in metrics {
                println!("{:<40} {:<12} {}", metric.key, metric.kind.as_str(), metric.display_as);
            }
        }
        Commands::Labels {
            metric,
            watch,
            interval,
        } => {
            if watch {
                let period = client
                    .config()
                    .clone()
                    .with_poll_interval_secs(interval)
                    .poll_interval();
                watch_labels(&client, metric.as_deref(), period, ctrl_c()).await;
            } else {
                let labels = or_empty(client.labels(metric.as_deref()).await, "Failed to load labels");
                for label in labels {
                    println!("{label}");
                }
            }
        }
        Commands::Flows {
            tenant,
            status,
            limit,
            offset,
        } => {
            let filter = FlowFilter {
                tenant_id: tenant,
                status,
                limit: Some(limit),
                offset: Some(offset),
            };
            let page = or_empty(client.flows(&filter).await, "Failed to load flows");
            for flow in &page.flows {
                println!("{} {:<10} {} {}", flow.id, flow.status.to_string(), flow.start_time, flow.name);
            }
            println!("{} of {} flow(s)", page.flows.len(), page.total_count);
        }
        Commands::Notebook {
            id,
            title,
            paragraphs,
            debounce_ms,
        } => {
            let config = client
                .config()
                .clone()
                .with_save_debounce_ms(debounce_ms);
            edit_notebook(client, &config, id, title, paragraphs).await?;
        }
    }

    Ok(())
}

/// Builds a query without the server, from a kind given as a string.
fn local_query(key: &str, kind: &str, config: &BlockConfig) -> Result<String> {
    let kind: MetricKind = kind.parse()?;
    let metric = Metric::new(key, kind);
    let aggregation = reconcile_aggregation(kind, config.aggregation);
    let window = config.time_window.resolve_now()?;

    Ok(generate_prom_query(&QueryParams {
        metric: &metric,
        filters: &config.filters,
        start: window.start,
        end: window.end,
        aggregation,
        agg_over_time: config.agg_over_time,
        group_by: &config.group_by,
    })?)
}

/// Re-fetches labels and tenants every `period` until `stop` resolves.
///
/// `stop` also cancels a refresh that is still waiting on the server.
/// Returns the number of completed refreshes.
async fn watch_labels(
    client: &ApiClient,
    metric: Option<&str>,
    period: Duration,
    stop: impl Future<Output = ()>,
) -> usize {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    tokio::pin!(stop);

    let mut refreshes = 0;
    loop {
        tokio::select! {
            () = &mut stop => {
                tracing::info!(refreshes, "Stopped watching");
                break;
            }
            () = refresh_labels(client, metric, &mut ticker) => refreshes += 1,
        }
    }
    refreshes
}

async fn refresh_labels(client: &ApiClient, metric: Option<&str>, ticker: &mut Interval) {
    ticker.tick().await;
    let labels = or_empty(client.labels(metric).await, "Failed to refresh labels");
    let tenants = or_empty(client.tenants().await, "Failed to refresh tenants");
    let names: Vec<&str> = tenants.iter().map(|t| t.name.as_str()).collect();
    println!(
        "[{}] labels: {} | tenants: {}",
        chrono::Utc::now().format("%H:%M:%S"),
        labels.join(", "),
        names.join(", ")
    );
}

/// Resolves on the first Ctrl+C. Never resolves if the handler cannot be
/// installed.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

/// Applies edits through a debounced saver so they reach the API as one
/// update, then flushes before exiting.
async fn edit_notebook(
    client: ApiClient,
    config: &ClientConfig,
    id: Uuid,
    title: Option<String>,
    paragraphs: Vec<String>,
) -> Result<()> {
    let notebook = client.notebook(id).await?;
    let mut blocks = notebook.blocks;
    let saver = DebouncedSaver::spawn(Arc::new(client), id, config.save_debounce());

    if let Some(title) = title {
        saver.edit(NotebookPatch::title(title))?;
    }
    for text in paragraphs {
        blocks.push(Block::paragraph(text));
        saver.edit(NotebookPatch::blocks(blocks.clone()))?;
    }

    let result = saver.flush().await;
    saver.close().await;
    result.context("Failed to save notebook")?;

    println!("Saved notebook {id} ({} block(s))", blocks.len());
    Ok(())
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
