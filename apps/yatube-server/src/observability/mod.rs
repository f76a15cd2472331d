//! Observability - request IDs and tracing setup.

mod request_id;
mod telemetry;

pub use request_id::{REQUEST_ID_HEADER, RequestIdMiddleware};
pub use telemetry::{TelemetryConfig, init_telemetry};
