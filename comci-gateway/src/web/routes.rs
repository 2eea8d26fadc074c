//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderName, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::gateway::{
    ClassTimes, DaySchedule, GatewayError, Scheduled, SchoolList, TimetableQuery, TimetableSlice,
    parse_keyword, parse_school_code,
};

use super::dto::*;
use super::state::AppState;

/// Service name reported by `/`.
const SERVICE_NAME: &str = "comci-api";

/// Create the application router.
///
/// `/school`, `/search` and `/classtime` are only mounted when enabled.
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/timetable", get(timetable))
        .route("/today", get(today));

    if state.endpoints.search {
        router = router
            .route("/school", get(search_schools))
            .route("/search", get(search_schools));
    }
    if state.endpoints.classtime {
        router = router.route("/classtime", get(class_times));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors())
        .with_state(state)
}

/// Any origin, GET only, with the headers automation clients send.
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers([
            header::ORIGIN,
            HeaderName::from_static("x-requested-with"),
            header::CONTENT_TYPE,
            header::ACCEPT,
        ])
}

/// Endpoints served with the given state, for `/` and startup logging.
pub fn enabled_endpoints(state: &AppState) -> Vec<&'static str> {
    let mut endpoints = Vec::new();
    if state.endpoints.search {
        endpoints.extend(["/school", "/search"]);
    }
    endpoints.extend(["/timetable", "/today"]);
    if state.endpoints.classtime {
        endpoints.push("/classtime");
    }
    endpoints
}

/// Service description.
async fn index(State(state): State<AppState>) -> Json<Envelope<IndexResponse>> {
    Json(Envelope::ok(IndexResponse {
        name: SERVICE_NAME,
        endpoints: enabled_endpoints(&state),
    }))
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Search schools by name.
async fn search_schools(
    State(state): State<AppState>,
    query: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Envelope<SchoolList>>, AppError> {
    let params = params(query)?;
    let keyword = parse_keyword(params.term())?;
    let list = state.gateway.search_schools(keyword).await?;
    Ok(Json(Envelope::ok(list)))
}

/// One class's week.
async fn timetable(
    State(state): State<AppState>,
    query: Result<Query<TimetableParams>, QueryRejection>,
) -> Result<Json<Envelope<Scheduled<TimetableSlice>>>, AppError> {
    let query = timetable_query(params(query)?)?;
    let result = state.gateway.get_timetable(query).await?;
    Ok(Json(Envelope::ok(result)))
}

/// One class's periods for the current day.
async fn today(
    State(state): State<AppState>,
    query: Result<Query<TimetableParams>, QueryRejection>,
) -> Result<Json<Envelope<Scheduled<DaySchedule>>>, AppError> {
    let query = timetable_query(params(query)?)?;
    let result = state.gateway.get_today(query).await?;
    Ok(Json(Envelope::ok(result)))
}

/// Period start/end times for a school.
async fn class_times(
    State(state): State<AppState>,
    query: Result<Query<ClassTimeParams>, QueryRejection>,
) -> Result<Json<Envelope<ClassTimes>>, AppError> {
    let params = params(query)?;
    let code = parse_school_code(params.code.as_deref())?;
    let times = state.gateway.get_class_times(code).await?;
    Ok(Json(Envelope::ok(times)))
}

/// Unwrap a query extraction, keeping malformed queries inside the JSON envelope.
fn params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    query
        .map(|Query(params)| params)
        .map_err(|e| AppError::BadRequest {
            message: format!("Invalid query: {}", e.body_text()),
        })
}

fn timetable_query(params: TimetableParams) -> Result<TimetableQuery, GatewayError> {
    TimetableQuery::parse(
        params.code.as_deref(),
        params.grade.as_deref(),
        params.class.as_deref(),
    )
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    BadGateway { message: String },
    Internal { message: String },
}

impl From<GatewayError> for AppError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::InvalidArgument(message) => AppError::BadRequest { message },
            GatewayError::NotFound(message) => AppError::NotFound { message },
            GatewayError::UpstreamFailure(message) => AppError::BadGateway { message },
            GatewayError::Internal(message) => AppError::Internal { message },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::BadGateway { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
