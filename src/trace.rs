use crate::types::GesturePhase;

/// Snapshot of the most recent poll, for logging and replay tooling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PollTrace {
    pub now_ms: u64,
    /// The poll produced a calibrated sample above the pressure threshold.
    pub present: bool,
    pub contact_count: u8,
    pub pending_count: u8,
    /// Running total of samples dropped as a third contact.
    pub ignored_samples: u16,
    pub phase: GesturePhase,
}
