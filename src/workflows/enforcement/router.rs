use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{UserId, ViolationId, ViolationReport};
use super::repository::{DecisionNotifier, PaymentLedger, ViolationRecord, ViolationRepository};
use super::service::{EnforcementError, EnforcementService};

/// Router builder exposing the violation lifecycle over HTTP. Authentication
/// and role checks happen in middleware upstream; the payloads carry the
/// already-authenticated actor ids.
pub fn enforcement_router<R, L, N>(service: Arc<EnforcementService<R, L, N>>) -> Router
where
    R: ViolationRepository + 'static,
    L: PaymentLedger + 'static,
    N: DecisionNotifier + 'static,
{
    Router::new()
        .route("/api/v1/violations", post(report_handler::<R, L, N>))
        .route(
            "/api/v1/violations/awaiting-owner",
            get(awaiting_owner_handler::<R, L, N>),
        )
        .route(
            "/api/v1/violations/objected",
            get(objected_handler::<R, L, N>),
        )
        .route(
            "/api/v1/violations/:violation_id",
            get(status_handler::<R, L, N>),
        )
        .route(
            "/api/v1/violations/:violation_id/accept",
            post(accept_handler::<R, L, N>),
        )
        .route(
            "/api/v1/violations/:violation_id/object",
            post(object_handler::<R, L, N>),
        )
        .route(
            "/api/v1/violations/:violation_id/confirm",
            post(confirm_handler::<R, L, N>),
        )
        .route(
            "/api/v1/violations/:violation_id/override",
            post(override_handler::<R, L, N>),
        )
        .route(
            "/api/v1/violations/:violation_id/payments",
            get(payments_handler::<R, L, N>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AcceptRequest {
    acting_owner: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectRequest {
    acting_owner: String,
    reason: String,
}

#[derive(Debug, Deserialize)]
struct OverrideRequest {
    reason: String,
}

pub(crate) async fn report_handler<R, L, N>(
    State(service): State<Arc<EnforcementService<R, L, N>>>,
    axum::Json(report): axum::Json<ViolationReport>,
) -> Response
where
    R: ViolationRepository + 'static,
    L: PaymentLedger + 'static,
    N: DecisionNotifier + 'static,
{
    match service.create_violation(report) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<R, L, N>(
    State(service): State<Arc<EnforcementService<R, L, N>>>,
    Path(violation_id): Path<String>,
) -> Response
where
    R: ViolationRepository + 'static,
    L: PaymentLedger + 'static,
    N: DecisionNotifier + 'static,
{
    match service.violation(&ViolationId(violation_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn awaiting_owner_handler<R, L, N>(
    State(service): State<Arc<EnforcementService<R, L, N>>>,
) -> Response
where
    R: ViolationRepository + 'static,
    L: PaymentLedger + 'static,
    N: DecisionNotifier + 'static,
{
    list_response(service.awaiting_owner())
}

pub(crate) async fn objected_handler<R, L, N>(
    State(service): State<Arc<EnforcementService<R, L, N>>>,
) -> Response
where
    R: ViolationRepository + 'static,
    L: PaymentLedger + 'static,
    N: DecisionNotifier + 'static,
{
    list_response(service.objected())
}

/// Queue listings serve the compact status view, not the full document.
fn list_response(result: Result<Vec<ViolationRecord>, EnforcementError>) -> Response {
    match result {
        Ok(records) => {
            let views: Vec<_> = records.iter().map(|record| record.status_view()).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn accept_handler<R, L, N>(
    State(service): State<Arc<EnforcementService<R, L, N>>>,
    Path(violation_id): Path<String>,
    axum::Json(request): axum::Json<AcceptRequest>,
) -> Response
where
    R: ViolationRepository + 'static,
    L: PaymentLedger + 'static,
    N: DecisionNotifier + 'static,
{
    let id = ViolationId(violation_id);
    let owner = UserId(request.acting_owner);
    match service.owner_accept(&id, &owner) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn object_handler<R, L, N>(
    State(service): State<Arc<EnforcementService<R, L, N>>>,
    Path(violation_id): Path<String>,
    axum::Json(request): axum::Json<ObjectRequest>,
) -> Response
where
    R: ViolationRepository + 'static,
    L: PaymentLedger + 'static,
    N: DecisionNotifier + 'static,
{
    let id = ViolationId(violation_id);
    let owner = UserId(request.acting_owner);
    match service.owner_object(&id, &owner, &request.reason) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn confirm_handler<R, L, N>(
    State(service): State<Arc<EnforcementService<R, L, N>>>,
    Path(violation_id): Path<String>,
) -> Response
where
    R: ViolationRepository + 'static,
    L: PaymentLedger + 'static,
    N: DecisionNotifier + 'static,
{
    match service.officer_confirm(&ViolationId(violation_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn override_handler<R, L, N>(
    State(service): State<Arc<EnforcementService<R, L, N>>>,
    Path(violation_id): Path<String>,
    axum::Json(request): axum::Json<OverrideRequest>,
) -> Response
where
    R: ViolationRepository + 'static,
    L: PaymentLedger + 'static,
    N: DecisionNotifier + 'static,
{
    match service.officer_override(&ViolationId(violation_id), &request.reason) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn payments_handler<R, L, N>(
    State(service): State<Arc<EnforcementService<R, L, N>>>,
    Path(violation_id): Path<String>,
) -> Response
where
    R: ViolationRepository + 'static,
    L: PaymentLedger + 'static,
    N: DecisionNotifier + 'static,
{
    match service.payments_for(&ViolationId(violation_id)) {
        Ok(payments) => (StatusCode::OK, axum::Json(payments)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: EnforcementError) -> Response {
    let status = match &error {
        EnforcementError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EnforcementError::NotFound(_) => StatusCode::NOT_FOUND,
        EnforcementError::Forbidden(_) => StatusCode::FORBIDDEN,
        EnforcementError::Transition(_) => StatusCode::CONFLICT,
        EnforcementError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let body = axum::Json(json!({ "error": error.to_string() }));
    (status, body).into_response()
}
