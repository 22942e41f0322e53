use serde::{Deserialize, Serialize};

use super::error::VoiceError;

/// Ring buffer size used by the reference remote: 5 KiB of encoded audio.
pub const DEFAULT_BUFFER_CAPACITY: usize = 5 * 1024;

/// Consumer usage of the voice search key.
pub const DEFAULT_VOICE_KEY_CODE: u16 = 0x0221;

/// Key code the remote sends when every consumer key is released.
pub const DEFAULT_RELEASE_KEY_CODE: u16 = 0x0000;

/// Configuration for a capture core instance.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use remote_voice_core::VoiceCaptureConfig;
///
/// let config = VoiceCaptureConfig::from_json(r#"{ "buffer_capacity": 8 }"#).unwrap();
/// assert_eq!(config.buffer_capacity, 8);
/// assert_eq!(config.voice_key_code, 0x0221);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceCaptureConfig {
    /// Ring buffer capacity in bytes (default: 5120).
    pub buffer_capacity: usize,

    /// Key code that starts a session when pressed (default: 0x0221).
    pub voice_key_code: u16,

    /// Key code that ends the session (default: 0x0000).
    pub release_key_code: u16,

    /// Drop audio packets that arrive while no session is active
    /// (default: true).
    pub gate_idle_audio: bool,
}

impl VoiceCaptureConfig {
    pub fn validate(&self) -> Result<(), VoiceError> {
        if self.buffer_capacity == 0 {
            return Err(VoiceError::ConfigurationFailed(
                "buffer capacity must be positive".into(),
            ));
        }
        if self.voice_key_code == self.release_key_code {
            return Err(VoiceError::ConfigurationFailed(format!(
                "voice key code {:#06x} collides with the release code",
                self.voice_key_code
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, VoiceError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| VoiceError::ConfigurationFailed(format!("invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for VoiceCaptureConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            voice_key_code: DEFAULT_VOICE_KEY_CODE,
            release_key_code: DEFAULT_RELEASE_KEY_CODE,
            gate_idle_audio: true,
        }
    }
}
