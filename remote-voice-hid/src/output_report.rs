//! Session commands delivered as HID output reports.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;

use remote_voice_core::{CommandError, PeripheralId, SessionCommand, SessionCommandSink};

/// [`SessionCommandSink`] that writes the audio state output report to the
/// peripheral's HID handle.
///
/// Each probed peripheral registers its writer (a hidraw node, a socket,
/// anything `Write`); the command is written in one `write_all` and flushed.
/// Writers are locked one by one, so a stalled handle only holds up its own
/// peripheral.
#[derive(Default)]
pub struct OutputReportSink {
    writers: Mutex<HashMap<PeripheralId, ReportWriter>>,
}

type ReportWriter = Arc<Mutex<Box<dyn Write + Send>>>;

impl OutputReportSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the output handle of `peripheral`, replacing any previous one.
    pub fn register(&self, peripheral: PeripheralId, writer: Box<dyn Write + Send>) {
        self.writers
            .lock()
            .insert(peripheral, Arc::new(Mutex::new(writer)));
    }

    /// Detach the output handle of `peripheral`. Returns whether one was
    /// registered.
    pub fn unregister(&self, peripheral: PeripheralId) -> bool {
        self.writers.lock().remove(&peripheral).is_some()
    }

    pub fn is_registered(&self, peripheral: PeripheralId) -> bool {
        self.writers.lock().contains_key(&peripheral)
    }
}

impl SessionCommandSink for OutputReportSink {
    fn send(&self, command: SessionCommand, target: PeripheralId) -> Result<(), CommandError> {
        let handle = self
            .writers
            .lock()
            .get(&target)
            .cloned()
            .ok_or(CommandError::UnknownPeripheral(target.0))?;

        let report = command.output_report();
        let mut writer = handle.lock();
        writer
            .write_all(&report)
            .and_then(|()| writer.flush())
            .map_err(|e| CommandError::Io(e.to_string()))?;

        debug!("sent audio {} report {:02x?} to {}", command, report, target);
        Ok(())
    }
}
