use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use suplementa_core::catalog::{Catalog, CatalogIssue};
use suplementa_core::config::Settings;
use suplementa_core::domain::contract::RequestPayload;
use suplementa_core::domain::marker::{MarkerId, MarkerModifiers, MarkerRange};
use suplementa_core::domain::parse_id;
use suplementa_core::domain::recommendation::{HomaIrAssessment, RecommendationOutput};
use suplementa_core::domain::request::{Gender, TimeOfDay};
use suplementa_core::error::PipelineError;
use suplementa_core::pipeline::pricing::PlaceholderPricing;
use suplementa_core::pipeline::{classifier, homa, Pipeline, PipelineOptions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let catalog = match Catalog::load(&settings) {
        Ok(catalog) => catalog,
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "catalog load failed");
            return Err(e);
        }
    };

    let state = AppState {
        catalog: Arc::new(catalog),
        settings: Arc::new(settings),
    };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/recommendations", post(create_recommendations))
        .route("/markers/:marker_id/classify", post(classify_marker))
        .route("/homa-ir", post(compute_homa_ir))
        .route("/catalog/issues", get(catalog_issues))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Clone)]
struct AppState {
    catalog: Arc<Catalog>,
    settings: Arc<Settings>,
}

type ApiError = (StatusCode, String);

#[derive(Debug, Serialize)]
struct ApiRecommendation {
    run_id: Uuid,
    output: RecommendationOutput,
}

async fn create_recommendations(
    State(state): State<AppState>,
    Json(payload): Json<RequestPayload>,
) -> Result<Json<ApiRecommendation>, ApiError> {
    let run_id = Uuid::new_v4();

    let request = payload.validate_and_into_request().map_err(|e| {
        let status = match e.downcast_ref::<PipelineError>() {
            Some(PipelineError::InvalidMarkerValue { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::BAD_REQUEST,
        };
        tracing::info!(%run_id, error = %format!("{e:#}"), "rejected request payload");
        (status, format!("{e:#}"))
    })?;

    let pipeline = Pipeline::new(&state.catalog, PipelineOptions::from_settings(&state.settings));
    let mut pricing = PlaceholderPricing::from_settings(&state.settings);
    let output = pipeline
        .run(&request, &mut pricing)
        .map_err(|e| pipeline_error(run_id, e))?;

    tracing::info!(
        %run_id,
        recommendations = output.recommendations.len(),
        diagnostics = output.diagnostics.len(),
        "recommendations generated"
    );
    Ok(Json(ApiRecommendation { run_id, output }))
}

fn pipeline_error(run_id: Uuid, e: PipelineError) -> ApiError {
    let status = match &e {
        PipelineError::InvalidMarkerValue { .. } | PipelineError::InvalidRequest(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        PipelineError::CatalogGap { .. }
        | PipelineError::UnknownMarker(_)
        | PipelineError::UnknownSupplementReference { .. } => {
            let err = anyhow::Error::new(e.clone());
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(%run_id, error = %err, "pipeline failed on catalog data");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, e.to_string())
}

#[derive(Debug, Deserialize)]
struct ClassifyBody {
    value: f64,
    #[serde(default)]
    time_of_day: Option<TimeOfDay>,
    #[serde(default)]
    gender: Option<Gender>,
}

async fn classify_marker(
    State(state): State<AppState>,
    Path(marker_id): Path<String>,
    Json(body): Json<ClassifyBody>,
) -> Result<Json<MarkerRange>, ApiError> {
    let marker = parse_id::<MarkerId>(&marker_id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("unknown marker id: {marker_id}")))?;
    let modifiers = MarkerModifiers {
        time_of_day: body.time_of_day,
        gender: body.gender.filter(|g| *g != Gender::Other),
    };

    classifier::classify(&state.catalog, marker, body.value, &modifiers)
        .map(|range| Json(range.clone()))
        .map_err(|e| pipeline_error(Uuid::nil(), e))
}

#[derive(Debug, Deserialize)]
struct HomaIrBody {
    glucose: f64,
    insulin: f64,
}

async fn compute_homa_ir(
    State(state): State<AppState>,
    Json(body): Json<HomaIrBody>,
) -> Result<Json<HomaIrAssessment>, ApiError> {
    let value = homa::homa_ir(body.glucose, body.insulin)
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;
    let band = homa::interpret(&state.catalog.rules().homa_ir_bands, value)
        .ok_or_else(|| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "catalog has no HOMA-IR bands".to_string(),
            )
        })?
        .to_string();
    Ok(Json(HomaIrAssessment { value, band }))
}

async fn catalog_issues(State(state): State<AppState>) -> Json<Vec<CatalogIssue>> {
    Json(state.catalog.validate())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
