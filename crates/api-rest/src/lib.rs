//! # API REST
//!
//! REST API implementation for MediWhisper.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - Mapping `ReportError` onto status codes and `{ "error": ... }` bodies
//!
//! Uses `api-shared` for wire types and `mw-core` for everything else.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{rejection::JsonRejection, Path as AxumPath, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::SecondsFormat;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{
    ErrorRes, GenerateReportReq, GenerateReportRes, HealthRes, HealthService, MessageRes,
    ReportRes,
};
use mw_core::{Report, ReportError, ReportService};

/// Application state for the REST API server.
#[derive(Clone)]
pub struct AppState {
    pub reports: ReportService,
}

#[derive(OpenApi)]
#[openapi(
    info(title = "MediWhisper API", description = "Consultation transcript to clinical report"),
    paths(
        health,
        generate_report,
        generate_report_status,
        list_reports,
        get_report,
        get_report_markdown,
        delete_report,
    ),
    components(schemas(
        HealthRes,
        GenerateReportReq,
        GenerateReportRes,
        ReportRes,
        MessageRes,
        ErrorRes,
    ))
)]
pub struct ApiDoc;

/// Build the full router, Swagger UI included.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/generate-response",
            get(generate_report_status).post(generate_report),
        )
        .route("/api/reports", get(list_reports))
        .route("/api/reports/:id", get(get_report).delete(delete_report))
        .route("/api/reports/:id/markdown", get(get_report_markdown))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Error returned by every handler.
///
/// Client errors carry their message; server errors are logged with their kind and answered
/// with a fixed generic message.
#[derive(Debug)]
pub struct ApiError {
    error: ReportError,
    server_message: &'static str,
}

impl ApiError {
    fn generation(error: ReportError) -> Self {
        Self {
            error,
            server_message: "Failed to process request",
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(error: ReportError) -> Self {
        Self {
            error,
            server_message: "Internal server error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.error {
            ReportError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ReportError::NotFound(_) => (StatusCode::NOT_FOUND, "Report not found".to_string()),
            ReportError::OracleUnavailable { stage, .. }
            | ReportError::MalformedGeneration { stage, .. } => {
                tracing::error!(kind = self.error.kind(), stage = %stage, "{}", self.error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    self.server_message.to_string(),
                )
            }
            ReportError::PersistenceFailure(_) => {
                tracing::error!(kind = self.error.kind(), "{}", self.error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    self.server_message.to_string(),
                )
            }
        };

        (status, Json(ErrorRes::new(message))).into_response()
    }
}

fn to_report_res(report: Report) -> ReportRes {
    ReportRes {
        id: report.id.to_string(),
        title: report.title,
        transcript: report.transcript,
        soap_note: report.soap_note,
        diagnosis: report.diagnosis,
        timestamp: report.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for load balancers and monitoring.
#[axum::debug_handler]
async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/api/generate-response",
    request_body = GenerateReportReq,
    responses(
        (status = 200, description = "Report generated and stored", body = GenerateReportRes),
        (status = 400, description = "Missing or blank transcript", body = ErrorRes),
        (status = 500, description = "Generation failed", body = ErrorRes)
    )
)]
/// Generate a SOAP note, differential diagnosis and title from a consultation transcript.
///
/// The report is stored before the response is sent. Nothing is stored on failure.
#[axum::debug_handler]
async fn generate_report(
    State(state): State<AppState>,
    body: Result<Json<GenerateReportReq>, JsonRejection>,
) -> Result<Json<GenerateReportRes>, ApiError> {
    let transcript = body
        .ok()
        .and_then(|Json(req)| req.transcript)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ReportError::InvalidInput("Transcription is required".into()))?;

    let generated = state
        .reports
        .generate_report(&transcript)
        .await
        .map_err(ApiError::generation)?;

    Ok(Json(GenerateReportRes {
        id: generated.report.id.to_string(),
        soap: generated.soap,
        diagnosis: generated.diagnosis,
    }))
}

#[utoipa::path(
    get,
    path = "/api/generate-response",
    responses(
        (status = 200, description = "Generation endpoint is reachable", body = MessageRes)
    )
)]
#[axum::debug_handler]
async fn generate_report_status() -> Json<MessageRes> {
    Json(MessageRes::new("OK"))
}

#[utoipa::path(
    get,
    path = "/api/reports",
    responses(
        (status = 200, description = "All stored reports, newest first", body = [ReportRes]),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn list_reports(State(state): State<AppState>) -> Result<Json<Vec<ReportRes>>, ApiError> {
    let reports = state.reports.list_reports()?;
    Ok(Json(reports.into_iter().map(to_report_res).collect()))
}

#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    params(("id" = String, Path, description = "Report id (32 lowercase hex characters)")),
    responses(
        (status = 200, description = "Stored report", body = ReportRes),
        (status = 404, description = "Report not found", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn get_report(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<ReportRes>, ApiError> {
    let report = state.reports.get_report(&id)?;
    Ok(Json(to_report_res(report)))
}

#[utoipa::path(
    get,
    path = "/api/reports/{id}/markdown",
    params(("id" = String, Path, description = "Report id")),
    responses(
        (status = 200, description = "Report rendered as Markdown", body = String, content_type = "text/markdown"),
        (status = 404, description = "Report not found", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn get_report_markdown(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Response, ApiError> {
    let markdown = state.reports.render_markdown(&id)?;
    Ok((
        [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
        markdown,
    )
        .into_response())
}

#[utoipa::path(
    delete,
    path = "/api/reports/{id}",
    params(("id" = String, Path, description = "Report id")),
    responses(
        (status = 200, description = "Report deleted", body = MessageRes),
        (status = 404, description = "Report not found", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn delete_report(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<MessageRes>, ApiError> {
    state.reports.delete_report(&id)?;
    Ok(Json(MessageRes::new("Report deleted successfully")))
}
