use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Request};
use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::Validate;

use crate::middleware::ctx::Ctx;
use crate::middleware::error::{AppError, AppResult, CtxError};

/// JSON body that is deserialized and validated before the handler runs. The
/// content type is not enforced.
#[derive(Debug)]
pub struct JsonValidated<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonValidated<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send + Sync + 'static,
{
    type Rejection = CtxError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();
        let ctx = match Ctx::from_request_parts(&mut parts, state).await {
            Ok(ctx) => ctx,
            Err(never) => match never {},
        };
        let req = Request::from_parts(parts, body);

        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            ctx.to_ctx_error(AppError::InvalidBody {
                source: e.to_string(),
            })
        })?;
        let value: Value = serde_json::from_slice(&bytes).map_err(|e| {
            ctx.to_ctx_error(AppError::InvalidBody {
                source: e.to_string(),
            })
        })?;
        from_value_validated(value)
            .map(Self)
            .map_err(|e| ctx.to_ctx_error(e))
    }
}

/// Deserializes and validates an already parsed body. Validation failures are
/// reported as missing fields.
pub fn from_value_validated<T>(value: Value) -> AppResult<T>
where
    T: DeserializeOwned + Validate,
{
    let payload: T = serde_json::from_value(value).map_err(|e| AppError::InvalidBody {
        source: e.to_string(),
    })?;
    payload.validate().map_err(|_| AppError::MissingFields)?;
    Ok(payload)
}
