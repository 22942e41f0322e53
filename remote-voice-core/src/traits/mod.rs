pub mod byte_sink;
pub mod clock;
pub mod command_sink;
pub mod telemetry;
