//! Transport envelope: one authenticated request, one classified response.
//!
//! A single attempt per call, no retry. Status codes map onto the typed
//! error taxonomy here; the dispatcher above decides what absence means.

use crate::{config::SessionConfig, Error, Result};
use bytes::Bytes;
use protocol_core::ErrorEnvelope;
use reqwest::{header, Method, StatusCode};
use tracing::{debug, warn};

/// Classified outcome of one dispatch attempt
#[derive(Debug)]
pub(crate) enum Outcome {
    /// 2xx, with the raw body (possibly empty)
    Success(Bytes),
    /// 404: the addressed resource does not exist
    Missing,
}

/// Pure classification result, before the success body is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Classified {
    Success,
    Missing,
}

/// Pure, total mapping from status code plus optional error body to the
/// typed outcome. Every non-2xx status not explicitly listed falls through
/// to `ServerError`.
pub(crate) fn classify(status: StatusCode, body: Option<&[u8]>) -> Result<Classified> {
    if status.is_success() {
        return Ok(Classified::Success);
    }
    match status {
        StatusCode::BAD_REQUEST => {
            let envelope: ErrorEnvelope = serde_json::from_slice(body.unwrap_or_default())?;
            Err(Error::BadRequest {
                code: envelope.error,
                message: envelope.error_description,
            })
        }
        StatusCode::UNAUTHORIZED => Err(Error::AccessDenied),
        StatusCode::NOT_FOUND => Ok(Classified::Missing),
        _ => Err(Error::ServerError),
    }
}

/// Execute one authenticated request against the session's endpoint.
pub(crate) async fn send(
    client: &reqwest::Client,
    config: &SessionConfig,
    method: Method,
    path: &str,
    body: Option<&serde_json::Value>,
) -> Result<Outcome> {
    let url = format!("{}{}", config.api_endpoint, path);
    debug!(%method, %path, "dispatching request");

    let mut request = client
        .request(method, url)
        .header(header::AUTHORIZATION, config.authorization())
        .header(header::ACCEPT, "application/json");
    if let Some(body) = body {
        request = request.json(body);
    }

    let response = request.send().await?;
    let status = response.status();

    // The body is read only where the contract consults it: success
    // payloads and the structured 400 error envelope.
    let body = if status.is_success() || status == StatusCode::BAD_REQUEST {
        Some(response.bytes().await?)
    } else {
        None
    };

    match classify(status, body.as_deref()) {
        Ok(Classified::Success) => Ok(Outcome::Success(body.unwrap_or_default())),
        Ok(Classified::Missing) => {
            debug!(%path, "resource not found");
            Ok(Outcome::Missing)
        }
        Err(error) => {
            warn!(%path, status = status.as_u16(), code = error.code(), "request failed");
            Err(error)
        }
    }
}
