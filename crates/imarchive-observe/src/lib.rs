//! Observability setup for imarchive: structured logging with an optional
//! OpenTelemetry span exporter.

pub mod tracing_setup;
