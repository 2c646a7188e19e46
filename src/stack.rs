//! Interfaces to the protocol backends driven by the background tasks.
//!
//! The coordination layer never interprets protocol state; it only drives
//! these traits from the loops in [`crate::process`]. The controller and
//! the link-layer system backend share protocol state and are therefore
//! held behind one lock; the key-agreement backend is independent.

/// Power mode reported by one controller processing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerMode {
    /// The stack has more work queued; host processing stays scheduled.
    Running,
    /// The stack is drained and the device may sleep.
    Idle,
}

/// Combined event-handler state update applied when a processing step
/// reports pending changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventHandlerUpdate(pub u8);

impl EventHandlerUpdate {
    /// Update selecting every event-handler group at once.
    pub const ALL: Self = Self(0x0F);
}

/// What one controller processing step observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StackVerdict {
    pub power: PowerMode,
    /// Event-handler state changes accumulated during the step and not
    /// yet applied.
    pub event_handlers_pending: bool,
}

/// The link-layer controller stack.
pub trait ControllerBackend {
    /// Run one host/controller processing step.
    fn process(&mut self) -> StackVerdict;

    /// Apply a combined event-handler state update after a step reported
    /// pending changes.
    fn apply_event_handler_update(&mut self, update: EventHandlerUpdate);
}

/// The key-agreement engine's background half.
pub trait KeyAgreementBackend {
    /// Run one key-agreement background step.
    fn bg_process(&mut self);
}

/// The generic link-layer system's background half. Shares protocol state
/// with [`ControllerBackend`].
pub trait LinkLayerSystemBackend {
    /// Run one link-layer system background step.
    fn bg_process(&mut self);
}
