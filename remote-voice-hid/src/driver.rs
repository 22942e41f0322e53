//! Probe / raw-event / remove callbacks of the remote HID driver.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use log::{debug, info};
use parking_lot::Mutex;

use remote_voice_core::{
    AudioStream, IngestOutcome, IngestPath, Peripheral, PeripheralId, TelemetrySink,
    VoiceCapture, VoiceCaptureConfig,
};

use crate::device_table::DeviceTable;
use crate::error::DriverError;
use crate::output_report::OutputReportSink;

/// Binds remotes and game controllers to one shared voice capture.
pub struct RemoteDriver {
    table: DeviceTable,
    capture: VoiceCapture,
    ingest: IngestPath,
    output: Arc<OutputReportSink>,
    peripherals: Mutex<HashMap<PeripheralId, Peripheral>>,
}

impl RemoteDriver {
    pub fn new(
        config: VoiceCaptureConfig,
        table: DeviceTable,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Result<Self, DriverError> {
        let output = Arc::new(OutputReportSink::new());
        let capture = VoiceCapture::new(config, output.clone(), telemetry)?;
        Ok(Self {
            table,
            ingest: capture.ingest_path(),
            capture,
            output,
            peripherals: Mutex::new(HashMap::new()),
        })
    }

    pub fn capture(&self) -> &VoiceCapture {
        &self.capture
    }

    /// Consumer side: the audio device node.
    pub fn open_stream(&self) -> AudioStream {
        self.capture.open_stream()
    }

    /// A device appeared. Supported devices get `writer` registered as their
    /// output-report handle.
    pub fn probe(
        &self,
        id: PeripheralId,
        vendor: u16,
        product: u16,
        writer: Box<dyn Write + Send>,
    ) -> Result<Peripheral, DriverError> {
        let kind = self
            .table
            .kind_of(vendor, product)
            .ok_or(DriverError::UnsupportedDevice { vendor, product })?;
        let peripheral = Peripheral { id, kind };

        self.output.register(id, writer);
        self.peripherals.lock().insert(id, peripheral);
        info!(
            "probed {} ({:04x}:{:04x}) as {:?}",
            id, vendor, product, kind
        );
        Ok(peripheral)
    }

    /// An input report arrived from `id`.
    pub fn raw_event(&self, id: PeripheralId, raw: &[u8]) -> Result<IngestOutcome, DriverError> {
        let peripheral = self
            .peripherals
            .lock()
            .get(&id)
            .copied()
            .ok_or(DriverError::UnknownPeripheral(id))?;
        Ok(self.ingest.handle_report(peripheral, raw)?)
    }

    /// A device went away. Returns whether it was bound.
    pub fn remove(&self, id: PeripheralId) -> bool {
        let known = self.peripherals.lock().remove(&id).is_some();
        if !known {
            return false;
        }
        self.capture.peripheral_removed(id);
        self.output.unregister(id);
        debug!("removed {}", id);
        true
    }

    pub fn bound_peripherals(&self) -> usize {
        self.peripherals.lock().len()
    }
}
