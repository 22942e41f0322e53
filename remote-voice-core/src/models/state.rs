use super::peripheral::PeripheralId;

/// Voice session state machine.
///
/// ```text
/// Idle ──key-down(P)──► Active(P) ──key-up(P)──► Idle
///                          │
///                          └─ peripheral P removed ─► Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Active { peripheral: PeripheralId },
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    /// The peripheral that owns the session, if one is active.
    pub fn peripheral(&self) -> Option<PeripheralId> {
        match self {
            Self::Active { peripheral } => Some(*peripheral),
            Self::Idle => None,
        }
    }

    /// Whether `peripheral` currently owns the session.
    pub fn is_owned_by(&self, peripheral: PeripheralId) -> bool {
        self.peripheral() == Some(peripheral)
    }
}
