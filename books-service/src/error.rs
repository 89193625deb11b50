use crate::services::google_books::UpstreamError;
use crate::utils::validation::FieldError;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::error;

/// Every way a request can end without a success body.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),
    #[error("rate limit exceeded")]
    RateLimited {
        message: &'static str,
        retry_after: Duration,
    },
    #[error("route not found: {path}")]
    NotFound { path: String },
    #[error("{context}: {detail:?}")]
    Upstream {
        context: &'static str,
        detail: Option<String>,
    },
}

impl ApiError {
    /// Wraps an upstream failure. The underlying message is kept only when
    /// `expose_detail` is set (development deployments).
    pub fn upstream(context: &'static str, source: UpstreamError, expose_detail: bool) -> Self {
        error!("{}: {}", context, source);
        ApiError::Upstream {
            context,
            detail: expose_detail.then(|| source.to_string()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum ErrorBody<'a> {
    Validation {
        success: bool,
        errors: &'a [FieldError],
    },
    NotFound {
        success: bool,
        message: &'static str,
        path: &'a str,
    },
    Message {
        success: bool,
        error: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<&'a str>,
    },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Validation(errors) => ErrorBody::Validation {
                success: false,
                errors,
            },
            ApiError::NotFound { path } => ErrorBody::NotFound {
                success: false,
                message: "Route not found",
                path,
            },
            ApiError::RateLimited { message, .. } => ErrorBody::Message {
                success: false,
                error: message,
                message: None,
            },
            ApiError::Upstream { context, detail } => ErrorBody::Message {
                success: false,
                error: context,
                message: detail.as_deref(),
            },
        };

        let mut response = (status, Json(body)).into_response();

        if let ApiError::RateLimited { retry_after, .. } = &self {
            let secs = retry_after.as_secs_f64().ceil() as u64;
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}
