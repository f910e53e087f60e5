pub mod telemetry;

pub use telemetry::{init_telemetry, TelemetryConfig, TelemetryError, TelemetryGuard};
