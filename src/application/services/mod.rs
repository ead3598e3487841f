pub mod telemetry;
pub mod transport;
