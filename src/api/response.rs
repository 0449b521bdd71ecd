use serde::Serialize;
use axum::Json;
use axum::http::StatusCode;
use chrono::Utc;

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub meta: ResponseMeta,
}

#[derive(Serialize)]
pub struct ResponseMeta {
    pub status: String,
    pub status_code: u16,
    pub timestamp: String,
    pub message: Option<String>,
}

pub type Reply<T> = (StatusCode, Json<ApiResponse<T>>);

pub fn success<T: Serialize>(data: T) -> Reply<T> {
    with_status(StatusCode::OK, data, None)
}

pub fn created<T: Serialize>(data: T) -> Reply<T> {
    with_status(StatusCode::CREATED, data, None)
}

/// Success envelope carrying a human-readable message alongside the data.
pub fn message<T: Serialize>(data: T, message: impl Into<String>) -> Reply<T> {
    with_status(StatusCode::OK, data, Some(message.into()))
}

fn with_status<T: Serialize>(status: StatusCode, data: T, message: Option<String>) -> Reply<T> {
    let meta = ResponseMeta {
        status: "success".to_string(),
        status_code: status.as_u16(),
        timestamp: Utc::now().to_rfc3339(),
        message,
    };

    (
        status,
        Json(ApiResponse {
            data: Some(data),
            meta,
        }),
    )
}

pub fn error<T>(status: StatusCode, message: String) -> Reply<T> {
    let meta = ResponseMeta {
        status: "error".to_string(),
        status_code: status.as_u16(),
        timestamp: Utc::now().to_rfc3339(),
        message: Some(message),
    };

    (
        status,
        Json(ApiResponse {
            data: None,
            meta,
        }),
    )
}
