//! # API REST
//!
//! REST API implementation for the BPR screening service.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, caller extraction)
//!
//! Uses `api-shared` for request/response types and authentication, and `bpr-core` for the
//! analysis engine and screening storage.

#![warn(rust_2018_idioms)]

use api_shared::auth::{API_KEY_HEADER, USER_ID_HEADER, USER_ROLE_HEADER};
use api_shared::{
    authenticate, AnalyzeScreeningRes, Caller, GetScreeningRes, HealthRes, HealthService,
    PatientQuery, PolicyRes, SubmitScreeningReq, SubmitScreeningRes,
};
use axum::{
    extract::{FromRequestParts, Query, State},
    http::{request::Parts, HeaderMap, StatusCode},
    response::Json,
    routing::get,
    Router,
};
use bpr_core::{
    CoreConfig, NonEmptyText, PatientId, ScreeningEngine, ScreeningRecord, ScreeningResult,
    ScreeningService,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

type ApiError = (StatusCode, &'static str);

/// Application state for the REST API server
///
/// Contains shared state that needs to be accessible to all request handlers. Everything here is
/// resolved once at startup.
#[derive(Clone)]
pub struct AppState {
    cfg: Arc<CoreConfig>,
    engine: Arc<ScreeningEngine>,
    screenings: Arc<ScreeningService>,
    api_key: Option<Arc<str>>,
}

impl AppState {
    /// Builds the handler state from startup configuration.
    ///
    /// `api_key`, when set, must be presented by every authenticated request.
    pub fn new(cfg: Arc<CoreConfig>, api_key: Option<String>) -> ScreeningResult<Self> {
        let engine = ScreeningEngine::new(cfg.policy().clone())?;

        Ok(Self {
            engine: Arc::new(engine),
            screenings: Arc::new(ScreeningService::new(cfg.clone())),
            cfg,
            api_key: api_key.map(Arc::from),
        })
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, analyze_screening, get_screening, submit_screening, get_policy),
    components(schemas(
        HealthRes,
        AnalyzeScreeningRes,
        GetScreeningRes,
        SubmitScreeningReq,
        SubmitScreeningRes,
        PolicyRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router with OpenAPI docs and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/medical-screening",
            get(get_screening).post(submit_screening),
        )
        .route("/medical-screening/analyze", get(analyze_screening))
        .route("/policy", get(get_policy))
        .merge(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// The authenticated caller, taken from gateway-forwarded headers.
pub struct AuthenticatedCaller(pub Caller);

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthenticatedCaller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let headers = &parts.headers;
        authenticate(
            header(headers, API_KEY_HEADER),
            header(headers, USER_ID_HEADER),
            header(headers, USER_ROLE_HEADER),
            state.api_key.as_deref(),
        )
        .map(AuthenticatedCaller)
        .map_err(|e| {
            tracing::warn!("rejected request: {}", e);
            (StatusCode::UNAUTHORIZED, "Unauthorized")
        })
    }
}

fn require_staff(caller: &Caller) -> Result<(), ApiError> {
    if caller.is_staff() {
        Ok(())
    } else {
        Err((StatusCode::FORBIDDEN, "Forbidden: staff access required"))
    }
}

fn parse_patient_id(raw: Option<&str>) -> Result<PatientId, ApiError> {
    let raw = raw.ok_or((StatusCode::BAD_REQUEST, "patientId is required"))?;
    PatientId::parse(raw).map_err(|e| {
        tracing::debug!("invalid patientId: {}", e);
        (StatusCode::BAD_REQUEST, "Invalid patientId")
    })
}

fn load_record(
    state: &AppState,
    patient_id: &PatientId,
) -> Result<Option<ScreeningRecord>, ApiError> {
    state.screenings.load(patient_id).map_err(|e| {
        tracing::error!("Load screening error for patient {}: {:?}", patient_id, e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load screening")
    })
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks. Requires no caller identity.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/medical-screening/analyze",
    params(PatientQuery),
    responses(
        (status = 200, description = "Clinical risk analysis", body = AnalyzeScreeningRes),
        (status = 400, description = "Missing or invalid patientId, or no screening submitted"),
        (status = 401, description = "Missing or invalid caller identity"),
        (status = 403, description = "Caller is not clinic staff"),
        (status = 500, description = "Internal server error")
    )
)]
/// Analyse a patient's stored screening
///
/// Staff only. Runs the clinical risk analysis against the patient's latest screening.
///
/// # Errors
/// Returns `400 Bad Request` if the patient has not completed medical screening yet.
#[axum::debug_handler]
async fn analyze_screening(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Query(query): Query<PatientQuery>,
) -> Result<Json<AnalyzeScreeningRes>, ApiError> {
    require_staff(&caller)?;
    let patient_id = parse_patient_id(query.patient_id.as_deref())?;

    let record = load_record(&state, &patient_id)?.ok_or((
        StatusCode::BAD_REQUEST,
        "Patient has not completed medical screening yet",
    ))?;

    let analysis = state.engine.analyze(&record.screening);

    tracing::info!(
        "analysed screening for patient {} at the request of {}",
        patient_id,
        caller.user_id
    );

    Ok(Json(AnalyzeScreeningRes {
        success: true,
        patient_id: record.patient_id.to_string(),
        patient_name: record.patient_name.into_inner(),
        screening_completed_at: record.submitted_at.to_rfc3339(),
        analysis,
    }))
}

#[utoipa::path(
    get,
    path = "/medical-screening",
    params(PatientQuery),
    responses(
        (status = 200, description = "Stored screening", body = GetScreeningRes),
        (status = 400, description = "Invalid patientId"),
        (status = 401, description = "Missing or invalid caller identity"),
        (status = 403, description = "Caller may not read this patient's screening"),
        (status = 404, description = "No screening submitted"),
        (status = 500, description = "Internal server error")
    )
)]
/// Read a stored screening
///
/// Patients read their own screening (`patientId` defaults to the caller); staff read any.
#[axum::debug_handler]
async fn get_screening(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Query(query): Query<PatientQuery>,
) -> Result<Json<GetScreeningRes>, ApiError> {
    let requested = query
        .patient_id
        .as_deref()
        .or((!caller.is_staff()).then_some(caller.user_id.as_str()));
    let patient_id = parse_patient_id(requested)?;

    if !caller.can_access(patient_id.as_str()) {
        return Err((StatusCode::FORBIDDEN, "Forbidden"));
    }

    let record = load_record(&state, &patient_id)?
        .ok_or((StatusCode::NOT_FOUND, "No medical screening found"))?;

    Ok(Json(GetScreeningRes {
        success: true,
        record,
    }))
}

#[utoipa::path(
    post,
    path = "/medical-screening",
    request_body = SubmitScreeningReq,
    responses(
        (status = 200, description = "Screening stored and analysed", body = SubmitScreeningRes),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Missing or invalid caller identity"),
        (status = 403, description = "Caller may not submit for this patient"),
        (status = 500, description = "Internal server error")
    )
)]
/// Submit or replace a screening
///
/// Patients submit their own screening; staff submit on behalf of the patient named in the body.
/// The stored screening is analysed immediately, and urgent red flags raise a high-risk alert in
/// the service log.
#[axum::debug_handler]
async fn submit_screening(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Json(req): Json<SubmitScreeningReq>,
) -> Result<Json<SubmitScreeningRes>, ApiError> {
    let requested = match (&req.patient_id, caller.is_staff()) {
        (Some(id), _) => Some(id.as_str()),
        (None, false) => Some(caller.user_id.as_str()),
        (None, true) => None,
    };
    let patient_id = parse_patient_id(requested)?;

    if !caller.can_access(patient_id.as_str()) {
        return Err((StatusCode::FORBIDDEN, "Forbidden"));
    }

    let patient_name = NonEmptyText::new(&req.patient_name)
        .map_err(|_| (StatusCode::BAD_REQUEST, "patientName is required"))?;

    let record = state
        .screenings
        .submit(&patient_id, patient_name, req.screening)
        .map_err(|e| {
            tracing::error!("Submit screening error for patient {}: {:?}", patient_id, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to store screening")
        })?;

    let analysis = state.engine.analyze(&record.screening);

    if analysis.needs_alert() {
        tracing::warn!(
            patient_id = %patient_id,
            urgency = %analysis.urgency_level,
            risk_score = analysis.risk_score,
            "HIGH RISK PATIENT ALERT: {} red flag(s) require review before treatment",
            analysis.red_flags.len()
        );
    }

    Ok(Json(SubmitScreeningRes {
        success: true,
        record,
        analysis,
    }))
}

#[utoipa::path(
    get,
    path = "/policy",
    responses(
        (status = 200, description = "Screening policy in force", body = PolicyRes),
        (status = 401, description = "Missing or invalid caller identity"),
        (status = 403, description = "Caller is not clinic staff")
    )
)]
/// Return the screening policy in force, for clinician review
#[axum::debug_handler]
async fn get_policy(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
) -> Result<Json<PolicyRes>, ApiError> {
    require_staff(&caller)?;

    let policy = state.cfg.policy().clone();
    Ok(Json(PolicyRes {
        version: policy.version.clone(),
        policy,
    }))
}
