use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_macros::debug_handler;
use utoipa::OpenApi;

use std::sync::Arc;

use crate::{
    dto::{
        EnvStatus, ErrorResponse, FIELDS_REQUIRED, GenerateEmailRequest, GenerateEmailResponse,
        HealthResponse, PROMPT_REQUIRED, Recipients, SendEmailRequest, SendEmailResponse,
    },
    error::ServiceError,
    service::EmailService,
};

pub const GENERATE_NOT_CONFIGURED: &str =
    "API key not configured. Please set GROQ_API_KEY in your .env file.";
pub const GENERATE_FAILED: &str = "Failed to generate email. Please try again.";
pub const SEND_NOT_CONFIGURED: &str =
    "Email credentials not configured. Please set EMAIL_USER and EMAIL_PASS in your .env file.";
pub const SEND_AUTH_FAILED: &str =
    "Email authentication failed. Please check your email credentials or use an App Password.";
pub const SEND_FAILED: &str = "Failed to send email. Please try again.";

#[derive(OpenApi)]
#[openapi(
    paths(health_check, generate_email, send_email),
    components(schemas(
        GenerateEmailRequest,
        GenerateEmailResponse,
        SendEmailRequest,
        SendEmailResponse,
        Recipients,
        ErrorResponse,
        HealthResponse,
        EnvStatus
    )),
    tags(
        (name = "email", description = "AI email drafting and delivery")
    )
)]
pub struct ApiDoc;

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "email"
)]
#[debug_handler]
pub async fn health_check(State(service): State<Arc<EmailService>>) -> Response {
    (StatusCode::OK, Json(service.health())).into_response()
}

#[utoipa::path(
    post,
    path = "/api/generate-email",
    request_body = GenerateEmailRequest,
    responses(
        (status = 200, description = "Email drafted", body = GenerateEmailResponse),
        (status = 400, description = "Prompt missing", body = ErrorResponse),
        (status = 500, description = "Missing API key or completion failure", body = ErrorResponse)
    ),
    tag = "email"
)]
#[debug_handler]
pub async fn generate_email(
    State(service): State<Arc<EmailService>>,
    payload: Result<Json<GenerateEmailRequest>, JsonRejection>,
) -> Response {
    let payload = match payload {
        Ok(Json(p)) => p,
        Err(e) => {
            tracing::warn!("Rejected generate request body: {e}");
            return error_response(StatusCode::BAD_REQUEST, PROMPT_REQUIRED);
        }
    };

    match service.generate_email(payload).await {
        Ok(r) => (StatusCode::OK, Json(r)).into_response(),
        Err(e) => {
            tracing::error!("Failed to generate email: {e}");
            match e {
                ServiceError::Validation(m) => error_response(StatusCode::BAD_REQUEST, m),
                ServiceError::Configuration(_) => {
                    error_response(StatusCode::INTERNAL_SERVER_ERROR, GENERATE_NOT_CONFIGURED)
                }
                ServiceError::Auth(_) | ServiceError::Upstream(_) => {
                    error_response(StatusCode::INTERNAL_SERVER_ERROR, GENERATE_FAILED)
                }
            }
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/send-email",
    request_body = SendEmailRequest,
    responses(
        (status = 200, description = "Email accepted by the provider", body = SendEmailResponse),
        (status = 400, description = "Missing field or invalid address", body = ErrorResponse),
        (status = 500, description = "Missing credentials, rejected credentials or transport failure", body = ErrorResponse)
    ),
    tag = "email"
)]
#[debug_handler]
pub async fn send_email(
    State(service): State<Arc<EmailService>>,
    payload: Result<Json<SendEmailRequest>, JsonRejection>,
) -> Response {
    let payload = match payload {
        Ok(Json(p)) => p,
        Err(e) => {
            tracing::warn!("Rejected send request body: {e}");
            return error_response(StatusCode::BAD_REQUEST, FIELDS_REQUIRED);
        }
    };

    match service.send_email(payload).await {
        Ok(r) => (StatusCode::OK, Json(r)).into_response(),
        Err(e) => {
            tracing::error!("Failed to send email: {e}");
            match e {
                ServiceError::Validation(m) => error_response(StatusCode::BAD_REQUEST, m),
                ServiceError::Configuration(_) => {
                    error_response(StatusCode::INTERNAL_SERVER_ERROR, SEND_NOT_CONFIGURED)
                }
                ServiceError::Auth(_) => {
                    error_response(StatusCode::INTERNAL_SERVER_ERROR, SEND_AUTH_FAILED)
                }
                ServiceError::Upstream(_) => {
                    error_response(StatusCode::INTERNAL_SERVER_ERROR, SEND_FAILED)
                }
            }
        }
    }
}

#[debug_handler]
pub async fn openapi_json() -> Response {
    (StatusCode::OK, Json(ApiDoc::openapi())).into_response()
}
