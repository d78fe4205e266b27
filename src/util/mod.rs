pub mod env;
pub mod speech;
pub mod telemetry;
pub mod vision;
