//! riskdesk
//!
//! Classifies banking support questions into a risk score, a category, and a
//! card-block decision, optionally through a generative backend with a
//! deterministic fallback.

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use riskdesk_core::{CustomerId, SupportRequest};
use riskdesk_server::evals::{builtin_scenarios, load_scenarios, run_suite};
use riskdesk_server::{
    build_orchestrator, create_router, describe_metrics, AppState, Cli, Commands, ServiceConfig,
};
use riskdesk_telemetry::MetricsCollector;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.json_logs);

    let mut config = ServiceConfig::load(&cli.config, &cli)?;

    match &cli.command {
        Commands::Serve { listen, port } => {
            if let Some(listen) = listen {
                config.listen = listen.clone();
            }
            if let Some(port) = port {
                config.port = *port;
            }
            serve(config).await
        }

        Commands::Classify {
            question,
            name,
            customer_id,
            exclude_pending,
            json,
        } => {
            let orchestrator = build_orchestrator(&config, Arc::new(MetricsCollector::new()))?;
            let request = SupportRequest::new(question.clone(), name.clone())
                .with_customer_id(CustomerId(*customer_id))
                .with_include_pending(!exclude_pending);

            let outcome = orchestrator.classify(&request).await?;
            let bundle = &outcome.bundle;

            if *json {
                println!("{}", serde_json::to_string_pretty(bundle)?);
            } else {
                println!("Risk:        {} ({})", bundle.risk(), bundle.risk_category());
                println!("Block card:  {}", if bundle.block_card() { "yes" } else { "no" });
                println!("Signals:     {}", bundle.risk_signals().join(", "));
                println!("Explanation: {}", bundle.risk_explanation());
                println!("Served by:   {}", outcome.served_by);
                println!();
                println!("{}", bundle.advice());
            }
            Ok(())
        }

        Commands::Eval {
            scenarios,
            min_pass_rate,
            json,
        } => {
            let scenarios = match scenarios {
                Some(path) => load_scenarios(path)?,
                None => builtin_scenarios(),
            };

            let stats = MetricsCollector::new();
            let orchestrator = build_orchestrator(&config, Arc::new(stats.clone()))?;
            let report = run_suite(&orchestrator, &scenarios).await;

            if *json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.render());
                let snapshot = stats.snapshot();
                println!(
                    "mode={} fallbacks={} avg_latency_us={}",
                    orchestrator.mode(),
                    snapshot.fallbacks,
                    snapshot.avg_latency_us()
                );
            }

            if report.pass_rate() < *min_pass_rate {
                anyhow::bail!(
                    "pass rate {:.2} is below the required {:.2}",
                    report.pass_rate(),
                    min_pass_rate
                );
            }
            Ok(())
        }
    }
}

async fn serve(config: ServiceConfig) -> Result<()> {
    info!("Starting riskdesk");

    let metrics_handle = init_metrics()?;

    let addr: SocketAddr = format!("{}:{}", config.listen, config.port).parse()?;
    let state = AppState::new(&config, metrics_handle)?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            warn!("Shutdown signal received, stopping server...");
        })
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool, json: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("riskdesk=debug,riskdesk_core=debug,riskdesk_classifiers=debug,riskdesk_orchestrator=debug,riskdesk_server=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("riskdesk=info,riskdesk_orchestrator=info,riskdesk_server=info")
        })
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    describe_metrics();

    info!("Metrics exporter initialized");
    Ok(handle)
}
