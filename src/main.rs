use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use tracing::info;

use civic_watch::config::AppConfig;
use civic_watch::error::AppError;
use civic_watch::telemetry;
use civic_watch::workflows::enforcement::{
    enforcement_router, DecisionConfig, DecisionEngine, DecisionSnapshot, EnforcementService,
    LoggingNotifier, MemoryPaymentLedger, MemoryPropertyDirectory, MemoryViolationStore,
    RuleCatalog,
};

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Civic Watch",
    about = "Run the municipal violation lifecycle service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Preview the automated decision for a violation type code
    Decide(DecideArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
    /// Override the rule catalogue CSV path
    #[arg(long)]
    rules_csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DecideArgs {
    /// Violation type code to resolve against the catalogue
    code: String,
    /// Entity-type or category hint used when the code has no exact match
    #[arg(long)]
    entity_type: Option<String>,
    /// Free-text description for keyword fallback matching
    #[arg(long)]
    description: Option<String>,
    /// Rule catalogue CSV (bundled standard set when omitted)
    #[arg(long)]
    rules_csv: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Decide(args) => run_decide(args),
    }
}

fn load_catalog(path: Option<&PathBuf>) -> Result<RuleCatalog, AppError> {
    match path {
        Some(path) => Ok(RuleCatalog::from_csv_path(path)?),
        None => Ok(RuleCatalog::standard()),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(path) = args.rules_csv.take() {
        config.rules_csv = Some(path);
    }

    telemetry::init(&config.telemetry)?;

    let catalog = load_catalog(config.rules_csv.as_ref())?;
    info!(rules = catalog.len(), "rule catalogue loaded");

    let service = Arc::new(EnforcementService::new(
        Arc::new(catalog),
        Arc::new(MemoryPropertyDirectory::default()),
        Arc::new(MemoryViolationStore::default()),
        Arc::new(MemoryPaymentLedger::default()),
        Arc::new(LoggingNotifier),
        DecisionConfig::default(),
    ));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(enforcement_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "violation lifecycle service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_decide(args: DecideArgs) -> Result<(), AppError> {
    let DecideArgs {
        code,
        entity_type,
        description,
        rules_csv,
    } = args;

    let catalog = load_catalog(rules_csv.as_ref())?;
    let engine = DecisionEngine::new(DecisionConfig::default());
    let decision = engine.decide(
        &catalog,
        &code,
        entity_type.as_deref(),
        description.as_deref(),
    )?;

    render_decision(&code, &decision);
    Ok(())
}

fn render_decision(code: &str, decision: &DecisionSnapshot) {
    println!("Decision preview for {code}");

    match (&decision.rule_applied, &decision.rule_snapshot) {
        (Some(rule_code), Some(snapshot)) => {
            println!("Matched rule: {} | {}", rule_code, snapshot.title);
            println!(
                "Legal basis: {} s.{} ({})",
                snapshot.act, snapshot.section, snapshot.authority
            );
        }
        _ => println!("No catalogue match; routed to manual review"),
    }

    println!(
        "Decision: {} | amount {:.2} | confidence {:.2}",
        decision.decision.label(),
        decision.amount,
        decision.ai_confidence
    );
    if decision.requires_human {
        println!("Flagged for human review");
    }
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
