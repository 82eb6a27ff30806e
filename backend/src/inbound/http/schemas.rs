//! OpenAPI wrappers for the error envelope.
//!
//! `crate::domain::Error` stays free of utoipa derives; these mirror types
//! describe its JSON shape and register under the domain type's name.

use utoipa::ToSchema;

/// Machine-readable error code, serialised in snake case.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// Validation failed or the body could not be parsed (400).
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Missing, malformed or unknown token (401).
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not allowed (403).
    #[schema(rename = "forbidden")]
    Forbidden,
    /// Unknown id, or a row owned by someone else (404).
    #[schema(rename = "not_found")]
    NotFound,
    /// Clashes with stored data (409).
    #[schema(rename = "conflict")]
    Conflict,
    /// Database or media storage unreachable (503).
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// Unexpected failure; the message is redacted (500).
    #[schema(rename = "internal_error")]
    InternalError,
}

/// Per-field validation details attached to `invalid_request` errors.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct FieldErrorSchema {
    /// Request field that failed, e.g. `title` or `image`.
    #[schema(example = "cost")]
    field: String,
    /// Reason code such as `blank`, `max_value` or `invalid_image`.
    #[schema(example = "max_value")]
    code: String,
    /// Position of the offending entry in a list field.
    index: Option<u32>,
    /// Rejected raw value, echoed when safe.
    value: Option<String>,
}

/// Error body returned by every endpoint.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    #[schema(example = "not_found")]
    code: ErrorCodeSchema,
    #[schema(example = "Not found.")]
    message: String,
    /// Request trace id, matching the `trace-id` response header.
    #[schema(rename = "traceId", example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    details: Option<FieldErrorSchema>,
}
