use serde::{Deserialize, Serialize};

use remote_voice_core::PeripheralKind;

/// USB / Bluetooth vendor id of the remotes and game controllers.
pub const DEFAULT_VENDOR_ID: u16 = 0x1949;

/// Which devices the driver binds to, and which of them are game
/// controllers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceTable {
    pub vendor_id: u16,
    /// Accepted product ids. Empty accepts every product of the vendor.
    pub supported_products: Vec<u16>,
    pub game_controller_products: Vec<u16>,
}

impl DeviceTable {
    /// Classify a device, or `None` if the driver should not bind to it.
    pub fn kind_of(&self, vendor: u16, product: u16) -> Option<PeripheralKind> {
        if vendor != self.vendor_id {
            return None;
        }
        if self.game_controller_products.contains(&product) {
            return Some(PeripheralKind::GameController);
        }
        if self.supported_products.is_empty() || self.supported_products.contains(&product) {
            return Some(PeripheralKind::Remote);
        }
        None
    }
}

impl Default for DeviceTable {
    fn default() -> Self {
        Self {
            vendor_id: DEFAULT_VENDOR_ID,
            supported_products: Vec::new(),
            game_controller_products: Vec::new(),
        }
    }
}
