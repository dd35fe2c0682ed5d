//! # REST API for Bank Management
//!
//! Translates HTTP requests into [`BankService`](crate::domain::BankService)
//! calls and service outcomes into status codes:
//!
//! | Outcome | Status |
//! |---|---|
//! | created | 201 |
//! | read / updated | 200 |
//! | deleted | 204 |
//! | validation or malformed request | 400 |
//! | missing or wrong API key | 401 |
//! | unknown id or route | 404 |
//! | unsupported method on a known route | 405 |
//! | store failure | 503 |
//!
//! Every error body is `{"error": message}`.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        OriginalUri, Path, Request, State,
    },
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use shared::{Bank, CreateBankRequest, ErrorResponse, UpdateBankRequest, API_KEY_HEADER};
use tracing::{error, info, warn};

use crate::domain::BankError;
use crate::AppState;

/// Everything a handler can fail with
#[derive(Debug)]
pub enum ApiError {
    /// Rejected before reaching the service (bad JSON, bad path)
    BadRequest(String),
    Unauthorized,
    RouteNotFound(String),
    MethodNotAllowed(Method, String),
    Service(BankError),
}

impl From<BankError> for ApiError {
    fn from(err: BankError) -> Self {
        ApiError::Service(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(format!("Invalid bank id: {}", rejection.body_text()))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(..) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Service(BankError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Service(BankError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Service(BankError::Persistence(_)) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::BadRequest(message) => message.clone(),
            ApiError::Unauthorized => "Missing or invalid API key".to_string(),
            ApiError::RouteNotFound(path) => format!("No route for {}", path),
            ApiError::MethodNotAllowed(method, path) => {
                format!("Method {} not allowed for {}", method, path)
            }
            ApiError::Service(err) => err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();

        if status.is_server_error() {
            error!("Request failed with {}: {}", status, message);
        } else {
            warn!("Request rejected with {}: {}", status, message);
        }

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

/// Liveness probe, not behind the API key check
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Fallback for paths no route matches
pub async fn route_not_found(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::RouteNotFound(uri.path().to_string())
}

/// Fallback for a known path hit with a verb it does not serve
pub async fn method_not_allowed(method: Method, OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::MethodNotAllowed(method, uri.path().to_string())
}

/// Reject `/api` requests without the configured shared secret
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(secret) = state.api_secret.as_deref() {
        let presented = request
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok());

        if presented != Some(secret) {
            return ApiError::Unauthorized.into_response();
        }
    }

    next.run(request).await
}

/// List all banks
pub async fn list_banks(State(state): State<AppState>) -> Result<Json<Vec<Bank>>, ApiError> {
    info!("GET /api/banks");

    let banks = state.bank_service.list_banks().await?;
    Ok(Json(banks))
}

/// Create a new bank
pub async fn create_bank(
    State(state): State<AppState>,
    payload: Result<Json<CreateBankRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Bank>), ApiError> {
    let Json(request) = payload?;
    info!("POST /api/banks - request: {:?}", request);

    let bank = state
        .bank_service
        .create_bank(&request.name, &request.location)
        .await?;
    Ok((StatusCode::CREATED, Json(bank)))
}

/// Get a bank by ID
pub async fn get_bank(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Bank>, ApiError> {
    let Path(id) = id?;
    info!("GET /api/banks/{}", id);

    let bank = state.bank_service.get_bank(id).await?;
    Ok(Json(bank))
}

/// Update a bank; serves both PUT and PATCH with partial-update semantics
pub async fn update_bank(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateBankRequest>, JsonRejection>,
) -> Result<Json<Bank>, ApiError> {
    let Path(id) = id?;
    let Json(request) = payload?;
    info!("PUT /api/banks/{} - request: {:?}", id, request);

    let bank = state.bank_service.update_bank(id, request).await?;
    Ok(Json(bank))
}

/// Delete a bank
pub async fn delete_bank(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    info!("DELETE /api/banks/{}", id);

    state.bank_service.delete_bank(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
