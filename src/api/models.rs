//! Response bodies for the local HTTP surface.
//!
//! - `GET /health` returns [`HealthResponse`]
//! - `GET /snapshot` returns the last [`DeliveredSnapshot`](crate::sink::DeliveredSnapshot)
//! - `GET /stats` returns [`CollectorStats`](crate::observability::CollectorStats)
//!
//! Errors share one envelope:
//!
//! ```json
//! {"code": "NOT_FOUND", "message": "resource not found: no snapshot delivered yet"}
//! ```

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub by_queue: bool,
    pub interval: String,
}
