//! Host capabilities consumed by the coordination layer.
//!
//! Everything the core needs from the kernel and the interrupt controller is
//! reached through the traits in this module: interrupt-line control, task
//! suspend/resume, and entropy. `crate::nvic` provides the Cortex-M
//! implementation of the interrupt side; the task side is supplied by the
//! embedding application since task handles are scheduler-specific.

/// Interrupt line number as routed by the interrupt controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IrqLine(pub u16);

/// Vector-level entry function for an interrupt line.
///
/// Entries run in interrupt context and must not block.
pub type IsrEntry = fn();

/// Interrupt controller operations for the two radio lines.
///
/// Priorities passed in are logical levels where numerically lower is more
/// urgent; ports translate them to the hardware encoding. The priority
/// floor is read back and restored in the port's raw encoding, matching the
/// save/restore usage in [`RadioScheduler`](crate::radio::RadioScheduler).
pub trait InterruptControl {
    /// Route `entry` to `line` and program its priority.
    ///
    /// Ports without runtime vector installation program the priority only;
    /// the application is then responsible for routing the vector to
    /// `entry` at link time.
    fn connect(&self, line: IrqLine, priority: u8, entry: IsrEntry);

    /// Unmask `line` at the controller.
    fn enable(&self, line: IrqLine);

    /// Mask `line` at the controller.
    fn disable(&self, line: IrqLine);

    /// Whether `line`'s handler is currently being serviced.
    fn is_active(&self, line: IrqLine) -> bool;

    /// Latch `line` pending so it fires once it is unmasked and eligible.
    fn set_pending(&self, line: IrqLine);

    /// Reprogram the priority of `line`.
    fn set_priority(&self, line: IrqLine, priority: u8);

    /// Current priority floor in the port's raw encoding (0 = no floor).
    fn priority_floor(&self) -> u8;

    /// Raise the priority floor to `priority` if it is not already higher.
    fn raise_priority_floor(&self, priority: u8);

    /// Restore a floor value previously returned by [`priority_floor`].
    ///
    /// [`priority_floor`]: InterruptControl::priority_floor
    fn restore_priority_floor(&self, floor: u8);
}

/// Platform bookkeeping invoked from the dispatch paths.
///
/// All hooks default to no-ops; ports override what their hardware needs.
pub trait RadioHooks {
    /// Called after the high-priority callback ran, so the platform can
    /// clear whatever wake-up request the radio event raised.
    fn radio_wakeup_serviced(&self) {}

    /// Hint that a reschedule may be wanted at interrupt exit.
    fn request_reschedule(&self) {}

    /// Radio event window opened (`true`) or closed (`false`); the port
    /// applies clock and power-manager bookkeeping here.
    fn radio_state_changed(&self, active: bool) {
        let _ = active;
    }
}

/// Task enumeration and suspend/resume, as provided by the host scheduler.
///
/// Handles are opaque to the core; suspend and resume must be idempotent
/// and must accept any handle produced by [`for_each`](TaskControl::for_each).
pub trait TaskControl {
    /// Opaque task identity.
    type Handle: Copy + PartialEq;

    /// Handle of the calling task.
    fn current(&self) -> Self::Handle;

    /// Invoke `f` once per live task.
    fn for_each<F: FnMut(Self::Handle)>(&self, f: F);

    /// Suspend `task`. No-op if already suspended.
    fn suspend(&self, task: Self::Handle);

    /// Resume `task`. No-op if already running.
    fn resume(&self, task: Self::Handle);
}

/// Non-blocking entropy access, callable from interrupt context.
pub trait EntropySource {
    /// Error reported when the hardware cannot supply bytes.
    #[cfg(feature = "defmt")]
    type Error: core::fmt::Debug + defmt::Format;
    /// Error reported when the hardware cannot supply bytes.
    #[cfg(not(feature = "defmt"))]
    type Error: core::fmt::Debug;

    /// Fill `out` with random bytes without blocking.
    fn try_fill(&self, out: &mut [u8]) -> Result<(), Self::Error>;
}
