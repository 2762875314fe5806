use std::fmt;

use axum::{http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::interfaces::ledger::LedgerError;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct CtxError {
    pub error: AppError,
    pub req_id: Uuid,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppError {
    MissingFields,
    InvalidAction { action: String },
    InvalidBody { source: String },
    QrInvalid { source: String },
    QrExpired,
    QrAlreadyUsed,
    EntityFailIdNotFound { ident: String },
    NotConfigured { setting: String },
    AiProvider { source: String },
    SchemaViolation { source: String },
    Ledger { source: String },
}

/// ApiError has to have the req_id to report to the client and implements IntoResponse.
pub type CtxResult<T> = core::result::Result<T, CtxError>;
/// Any error for storing before composing a response.
/// For errors that either don't affect the response, or are build before attaching the req_id.
pub type AppResult<T> = core::result::Result<T, AppError>;

impl std::error::Error for AppError {}

impl From<LedgerError> for AppError {
    fn from(value: LedgerError) -> Self {
        match value {
            LedgerError::NotConfigured(setting) => Self::NotConfigured { setting },
            other => Self::Ledger {
                source: other.to_string(),
            },
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFields => write!(f, "Missing required fields"),
            Self::InvalidAction { .. } => write!(f, "Invalid action"),
            Self::InvalidBody { source } => write!(f, "Invalid request body - {source}"),
            Self::QrInvalid { .. } => write!(f, "Invalid QR code"),
            Self::QrExpired => write!(f, "QR code expired"),
            Self::QrAlreadyUsed => write!(f, "QR code already used"),
            Self::EntityFailIdNotFound { ident } => write!(f, "Record id= {ident} not found"),
            Self::NotConfigured { setting } => write!(f, "{setting} not configured"),
            // collaborator diagnostics stay in the logs
            Self::AiProvider { .. } => write!(f, "AI provider request failed"),
            Self::SchemaViolation { .. } => {
                write!(f, "AI provider returned an unexpected response")
            }
            Self::Ledger { .. } => write!(f, "Ledger request failed"),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::EntityFailIdNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::MissingFields
            | AppError::InvalidAction { .. }
            | AppError::InvalidBody { .. }
            | AppError::QrInvalid { .. }
            | AppError::QrExpired
            | AppError::QrAlreadyUsed => StatusCode::BAD_REQUEST,
            AppError::NotConfigured { .. }
            | AppError::AiProvider { .. }
            | AppError::SchemaViolation { .. }
            | AppError::Ledger { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponseBody {
    pub success: bool,
    pub error: String,
    pub req_id: String,
}

impl ErrorResponseBody {
    pub fn new(error: String, req_id: Option<String>) -> Self {
        ErrorResponseBody {
            success: false,
            error,
            req_id: req_id.unwrap_or_else(|| Uuid::new_v4().to_string()),
        }
    }
}

impl From<ErrorResponseBody> for String {
    fn from(value: ErrorResponseBody) -> Self {
        serde_json::to_string(&value).unwrap_or_default()
    }
}

impl IntoResponse for CtxError {
    fn into_response(self) -> axum::response::Response {
        let status_code = self.error.status_code();
        if status_code.is_server_error() {
            tracing::error!(req_id = %self.req_id, error = ?self.error, "request failed");
        } else {
            tracing::info!(req_id = %self.req_id, error = ?self.error, "request rejected");
        }
        let err = self.error.clone();
        let body: String =
            ErrorResponseBody::new(self.error.to_string(), Some(self.req_id.to_string())).into();
        let mut response = (
            status_code,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response();
        // the real error stays available to layers after the handler
        response.extensions_mut().insert(err);
        response
    }
}
