pub mod api;
pub mod app;
pub mod config;
pub mod metrics;
pub mod telemetry;
