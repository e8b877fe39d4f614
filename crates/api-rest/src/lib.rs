//! # API REST
//!
//! REST API implementation for BioTrack.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, error envelopes)
//!
//! Uses `api-shared` for wire types and `biotrack-core` for everything else.

#![warn(rust_2018_idioms)]

mod error;

pub use error::ApiError;

use api_shared::{
    AxisMarkerRes, CreateTreatmentReq, ErrorDetail, ErrorRes, EventRes, ExcludedRes,
    HealthRes, HealthService, ListTreatmentsRes, PeriodRes, PositionRes, StatusAction,
    StatusChangeReq, SummaryRes, TimelineReq, TimelineRes, TrackRes, TreatmentRes,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use biotrack_core::{
    build_timeline, CoreConfig, TrackGrouping, TreatmentId, TreatmentRecord, TreatmentStore,
    ZoomLevel,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::{IntoParams, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

/// Application state for the REST API server.
///
/// Holds the startup configuration and the treatment store shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    cfg: Arc<CoreConfig>,
    store: TreatmentStore,
}

impl AppState {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self {
            store: TreatmentStore::new(cfg.clone()),
            cfg,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_treatments,
        create_treatment,
        change_status,
        delete_treatment,
        patient_timeline,
        render_timeline,
    ),
    components(schemas(
        HealthRes,
        ErrorRes,
        ErrorDetail,
        TreatmentRes,
        ListTreatmentsRes,
        CreateTreatmentReq,
        StatusAction,
        StatusChangeReq,
        TimelineReq,
        TimelineRes,
        TrackRes,
        PeriodRes,
        AxisMarkerRes,
        EventRes,
        PositionRes,
        SummaryRes,
        ExcludedRes,
    ))
)]
pub struct ApiDoc;

/// Optional overrides of the configured timeline defaults.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TimelineQuery {
    /// `day`, `week` or `month`.
    pub zoom: Option<String>,
    /// `exact` or `normalised`.
    pub grouping: Option<String>,
}

/// Builds the BioTrack router, including Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/patients/:patient_id/treatments",
            get(list_treatments).post(create_treatment),
        )
        .route("/patients/:patient_id/timeline", get(patient_timeline))
        .route("/treatments/:id/status", post(change_status))
        .route("/treatments/:id", delete(delete_treatment))
        .route("/timeline", post(render_timeline))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn parse_overrides(
    zoom: Option<String>,
    grouping: Option<String>,
) -> Result<(Option<ZoomLevel>, Option<TrackGrouping>), ApiError> {
    let zoom = zoom.map(|z| z.parse::<ZoomLevel>()).transpose()?;
    let grouping = grouping.map(|g| g.parse::<TrackGrouping>()).transpose()?;
    Ok((zoom, grouping))
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint, used for monitoring and load balancer checks.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/patients/{patient_id}/treatments",
    params(("patient_id" = String, Path, description = "Patient identifier")),
    responses(
        (status = 200, description = "Treatments of the patient", body = ListTreatmentsRes),
        (status = 400, description = "Invalid patient id", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// List the stored treatments of a patient, in insertion order.
#[axum::debug_handler]
async fn list_treatments(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<ListTreatmentsRes>, ApiError> {
    let treatments = state
        .store
        .list_for_patient(&patient_id)?
        .into_iter()
        .map(TreatmentRes::from)
        .collect();
    Ok(Json(ListTreatmentsRes { treatments }))
}

#[utoipa::path(
    post,
    path = "/patients/{patient_id}/treatments",
    params(("patient_id" = String, Path, description = "Patient identifier")),
    request_body = CreateTreatmentReq,
    responses(
        (status = 201, description = "Treatment created", body = TreatmentRes),
        (status = 400, description = "Bad request", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Start a new treatment for a patient.
///
/// The treatment is created `active` with no applied doses.
#[axum::debug_handler]
async fn create_treatment(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
    Json(req): Json<CreateTreatmentReq>,
) -> Result<(StatusCode, Json<TreatmentRes>), ApiError> {
    let new = req.into_new_treatment()?;
    let record = state.store.create(&patient_id, new)?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

#[utoipa::path(
    post,
    path = "/treatments/{id}/status",
    params(("id" = String, Path, description = "Treatment id (32 hex characters)")),
    request_body = StatusChangeReq,
    responses(
        (status = 200, description = "Updated treatment", body = TreatmentRes),
        (status = 400, description = "Bad request", body = ErrorRes),
        (status = 404, description = "Treatment not found", body = ErrorRes),
        (status = 409, description = "Change not allowed in the current status", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Suspend, finish, extend or record a dose on a treatment.
#[axum::debug_handler]
async fn change_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<StatusChangeReq>,
) -> Result<Json<TreatmentRes>, ApiError> {
    let id = TreatmentId::parse(&id)?;
    let change = req.into_change()?;
    let record = state.store.apply_change(&id, change)?;
    Ok(Json(record.into()))
}

#[utoipa::path(
    delete,
    path = "/treatments/{id}",
    params(("id" = String, Path, description = "Treatment id (32 hex characters)")),
    responses(
        (status = 204, description = "Treatment removed"),
        (status = 400, description = "Bad request", body = ErrorRes),
        (status = 404, description = "Treatment not found", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn delete_treatment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = TreatmentId::parse(&id)?;
    state.store.delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/patients/{patient_id}/timeline",
    params(
        ("patient_id" = String, Path, description = "Patient identifier"),
        TimelineQuery
    ),
    responses(
        (status = 200, description = "Timeline bundle, or the no-data state", body = TimelineRes),
        (status = 400, description = "Bad request", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Timeline of a patient's stored treatments.
#[axum::debug_handler]
async fn patient_timeline(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
    Query(query): Query<TimelineQuery>,
) -> Result<Json<TimelineRes>, ApiError> {
    let (zoom, grouping) = parse_overrides(query.zoom, query.grouping)?;
    let options = state.cfg.timeline_options(zoom, grouping);
    let timeline = state.store.timeline_for_patient(&patient_id, &options)?;
    Ok(Json(TimelineRes::from(&timeline)))
}

#[utoipa::path(
    post,
    path = "/timeline",
    request_body = TimelineReq,
    responses(
        (status = 200, description = "Timeline bundle, or the no-data state", body = TimelineRes),
        (status = 400, description = "Bad request", body = ErrorRes)
    )
)]
/// Render a timeline for records supplied in the request. Nothing is stored.
#[axum::debug_handler]
async fn render_timeline(
    State(state): State<AppState>,
    Json(req): Json<TimelineReq>,
) -> Result<Json<TimelineRes>, ApiError> {
    let (zoom, grouping) = parse_overrides(req.zoom, req.grouping)?;
    let options = state.cfg.timeline_options(zoom, grouping);
    let records: Vec<TreatmentRecord> = req.treatments.into_iter().map(Into::into).collect();
    Ok(Json(TimelineRes::from(&build_timeline(&records, &options))))
}
