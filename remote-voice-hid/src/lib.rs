//! # remote-voice-hid
//!
//! HID backend for remote-voice-core.
//!
//! Provides:
//! - `DeviceTable` — which vendor/product ids to bind, and which are game controllers
//! - `OutputReportSink` — start/stop commands written as audio state output reports
//! - `LogTelemetry`, `QueuedTelemetry` — session timing sinks
//! - `RemoteDriver` — probe / raw-event / remove callbacks feeding the capture core
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use remote_voice_hid::{DeviceTable, LogTelemetry, RemoteDriver};
//!
//! let driver = RemoteDriver::new(Default::default(), DeviceTable::default(), Arc::new(LogTelemetry))?;
//! let remote = driver.probe(PeripheralId(1), 0x1949, 0x0401, Box::new(hidraw))?;
//! if !driver.raw_event(remote.id, &report)?.is_consumed() {
//!     input.deliver(&report);
//! }
//! ```

pub mod device_table;
pub mod driver;
pub mod error;
pub mod output_report;
pub mod telemetry;

#[cfg(test)]
mod test_support;

pub use device_table::DeviceTable;
pub use driver::RemoteDriver;
pub use error::DriverError;
pub use output_report::OutputReportSink;
pub use telemetry::{LogTelemetry, QueuedTelemetry, TelemetryEvent};
