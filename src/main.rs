use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use elasticity_quiz::config::AppConfig;
use elasticity_quiz::error::AppError;
use elasticity_quiz::quiz::domain::QuestionResult;
use elasticity_quiz::quiz::{quiz_router, Dataset, QuizService};
use elasticity_quiz::telemetry;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Elasticity Quiz",
    about = "Serve and score the economic elasticity estimation quiz from the command line",
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
    /// Score one guess triple against a named good and print the breakdown
    Score(ScoreArgs),
    /// Inspect a reference dataset
    Dataset {
        #[command(subcommand)]
        command: DatasetCommand,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
    /// Dataset file (JSON or CSV) to serve instead of the built-in catalog
    #[arg(long)]
    dataset: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ScoreArgs {
    /// Name of the good to score against
    #[arg(long)]
    good: String,
    /// Demand elasticity guess
    #[arg(long, allow_hyphen_values = true)]
    demand: f64,
    /// Supply elasticity guess; omit to score the demand quantity only
    #[arg(long, allow_hyphen_values = true)]
    supply: Option<f64>,
    /// Dataset file to look the good up in (defaults to the built-in catalog)
    #[arg(long)]
    dataset: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum DatasetCommand {
    /// Validate a dataset and print its goods
    Inspect(DatasetArgs),
}

#[derive(Args, Debug, Default)]
struct DatasetArgs {
    /// Dataset file to inspect (defaults to the built-in catalog)
    #[arg(long)]
    path: Option<PathBuf>,
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
        Command::Score(args) => run_score(args),
        Command::Dataset {
            command: DatasetCommand::Inspect(args),
        } => run_dataset_inspect(args),
    }
}

fn load_dataset(path: Option<&PathBuf>) -> Result<Dataset, AppError> {
    match path {
        Some(path) => Ok(Dataset::from_path(path)?),
        None => Ok(Dataset::standard()),
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

    telemetry::init(&config.telemetry)?;

    let dataset_path = args.dataset.take().or(config.quiz.dataset_path.clone());
    let dataset = load_dataset(dataset_path.as_ref())?;
    info!(goods = dataset.len(), "reference dataset loaded");

    let service = Arc::new(QuizService::new(
        Arc::new(dataset),
        config.quiz.session_length,
    ));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let infra = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state);

    let app = quiz_router(service).merge(infra).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "elasticity quiz service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let dataset = load_dataset(args.dataset.as_ref())?;
    let good = dataset.find_required(&args.good).map_err(AppError::from)?;

    let result = QuestionResult::evaluate(good, 1, args.demand, args.supply);
    render_score(&result);
    Ok(())
}

fn run_dataset_inspect(args: DatasetArgs) -> Result<(), AppError> {
    let dataset = load_dataset(args.path.as_ref())?;

    println!("Dataset: {} goods", dataset.len());
    for good in dataset.goods() {
        let share = elasticity_quiz::quiz::buyer_share(
            good.demand_elasticity,
            good.supply_elasticity,
        );
        match share {
            Ok(share) => println!(
                "- {} | demand {:.2} | supply {:.2} | buyers pay {:.1}% of a tax",
                good.name,
                good.demand_elasticity,
                good.supply_elasticity,
                share * 100.0
            ),
            Err(_) => println!(
                "- {} | demand {:.2} | supply {:.2} | tax incidence undefined",
                good.name, good.demand_elasticity, good.supply_elasticity
            ),
        }
    }

    Ok(())
}

fn render_score(result: &QuestionResult) {
    println!("Score breakdown for {}", result.good);

    println!(
        "\nDemand elasticity: guessed {:.2}, actual {:.2} -> {} points ({})",
        result.demand.guess,
        result.demand.actual,
        result.demand.points,
        result.demand.tier.label()
    );

    if let Some(supply) = &result.supply {
        println!(
            "Supply elasticity: guessed {:.2}, actual {:.2} -> {} points ({})",
            supply.guess,
            supply.actual,
            supply.points,
            supply.tier.label()
        );
    }

    if let Some(incidence) = &result.incidence {
        match (incidence.guessed_share, incidence.actual_share) {
            (Some(guessed), Some(actual)) => {
                println!(
                    "Tax incidence: guessed buyers pay {:.1}%, actually {:.1}% -> {} points",
                    guessed * 100.0,
                    actual * 100.0,
                    incidence.points
                );
            }
            _ => println!("Tax incidence: undefined for the given elasticities -> 0 points"),
        }
        if let Some(band) = incidence.band {
            println!("  {}", band.narrative());
        }
    }

    println!("\nTotal: {} points", result.total_points);
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
