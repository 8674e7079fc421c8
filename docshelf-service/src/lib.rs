//! DOCSHELF Service - Document Operations
//!
//! The document service in front of the stores and the viewer-scoped
//! response cache, the upload compensation saga, and tracing setup.

pub mod saga;
pub mod service;
pub mod telemetry;
pub mod types;

pub use saga::{Compensation, UploadSaga};
pub use service::DocumentService;
pub use telemetry::{init_tracing, LogFormat, TelemetryConfig};
pub use types::{DetailResponse, ListRequest, ListResponse};
