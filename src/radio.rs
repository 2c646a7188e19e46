//! Two-tier radio interrupt dispatch.
//!
//! The radio exposes two interrupt lines: a hardware line serviced at a
//! fixed urgent priority, and a software-triggerable line whose priority is
//! chosen per activation. [`RadioScheduler`] owns the process-wide dispatch
//! state: the two write-once callback slots, the per-class nesting counters
//! behind [`disable_interrupt_classes`], the saved priority floor, and the
//! reentry flag that coalesces nested software triggers into a single
//! elevated re-arm.
//!
//! The scheduler is built once at bring-up, before any radio interrupt is
//! unmasked, and lives for the rest of the process. Interrupt entries are
//! routed to [`on_high_priority_interrupt`] and
//! [`on_low_priority_interrupt`] by the application's vector table.
//!
//! [`disable_interrupt_classes`]: RadioScheduler::disable_interrupt_classes
//! [`on_high_priority_interrupt`]: RadioScheduler::on_high_priority_interrupt
//! [`on_low_priority_interrupt`]: RadioScheduler::on_low_priority_interrupt

use core::mem;
use core::ptr;
use core::sync::atomic::{AtomicBool, AtomicI32, AtomicPtr, AtomicU8, Ordering};

use crate::irq::{counter_acquire, counter_release, InterruptClass, IrqClassMask, Release};
use crate::port::{InterruptControl, IrqLine, IsrEntry, RadioHooks};

/// Zero-argument protocol-stack handler invoked from interrupt context.
///
/// Handlers run in interrupt context and must not block.
pub type RadioCallback = fn();

/// Line numbers and priority tiers for the two radio interrupt lines.
///
/// Priorities are logical levels where numerically lower is more urgent.
/// `elevated_priority` is the tier shared by urgent software-triggered low
/// work, the SystemLow priority floor, and the high line outside radio
/// event windows; it sits between `high_priority` and `low_priority`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IrqConfig {
    /// Hardware radio line.
    pub high_line: IrqLine,
    /// Software-triggerable low-priority line.
    pub low_line: IrqLine,
    /// Tier of the high line inside a radio event window.
    pub high_priority: u8,
    /// Default tier of the low line.
    pub low_priority: u8,
    /// Urgent tier between the two.
    pub elevated_priority: u8,
}

/// Write-once handler slot, readable from interrupt context without locks.
struct CallbackSlot(AtomicPtr<()>);

impl CallbackSlot {
    const fn new() -> Self {
        Self(AtomicPtr::new(ptr::null_mut()))
    }

    fn set(&self, callback: RadioCallback) {
        let prev = self.0.swap(callback as *mut (), Ordering::SeqCst);
        assert!(prev.is_null(), "radio callback slot set twice");
    }

    fn get(&self) -> Option<RadioCallback> {
        let raw = self.0.load(Ordering::SeqCst);
        if raw.is_null() {
            None
        } else {
            // Non-null only via set(), which stores a valid fn pointer.
            Some(unsafe { mem::transmute::<*mut (), RadioCallback>(raw) })
        }
    }
}

/// Process-wide radio dispatch state.
///
/// `P` supplies the interrupt controller and the platform bookkeeping
/// hooks; all methods take `&self` and are usable from interrupt context
/// unless noted.
pub struct RadioScheduler<P> {
    port: P,
    config: IrqConfig,
    high_callback: CallbackSlot,
    low_callback: CallbackSlot,
    registered: AtomicBool,
    high_counter: AtomicI32,
    low_counter: AtomicI32,
    sys_counter: AtomicI32,
    saved_floor: AtomicU8,
    low_reentry: AtomicBool,
}

impl<P: InterruptControl + RadioHooks> RadioScheduler<P> {
    pub const fn new(port: P, config: IrqConfig) -> Self {
        Self {
            port,
            config,
            high_callback: CallbackSlot::new(),
            low_callback: CallbackSlot::new(),
            registered: AtomicBool::new(false),
            high_counter: AtomicI32::new(0),
            low_counter: AtomicI32::new(0),
            sys_counter: AtomicI32::new(0),
            saved_floor: AtomicU8::new(0),
            low_reentry: AtomicBool::new(false),
        }
    }

    /// Register the handler the high-priority ISR dispatches to.
    ///
    /// Must happen exactly once, before [`register_interrupts`].
    ///
    /// [`register_interrupts`]: RadioScheduler::register_interrupts
    pub fn set_high_priority_callback(&self, callback: RadioCallback) {
        self.high_callback.set(callback);
    }

    /// Register the handler the low-priority ISR dispatches to.
    ///
    /// Must happen exactly once, before [`register_interrupts`].
    ///
    /// [`register_interrupts`]: RadioScheduler::register_interrupts
    pub fn set_low_priority_callback(&self, callback: RadioCallback) {
        self.low_callback.set(callback);
    }

    /// Connect both radio lines and unmask them.
    ///
    /// Each line is connected in the masked state at its initial tier and
    /// only unmasked afterwards. `high_entry` and `low_entry` are the
    /// vector-level functions the application routes to
    /// [`on_high_priority_interrupt`] and [`on_low_priority_interrupt`].
    /// Runs exactly once at bring-up, after both callbacks are registered;
    /// violating either rule halts the system rather than running with an
    /// inconsistent radio interrupt state.
    ///
    /// [`on_high_priority_interrupt`]: RadioScheduler::on_high_priority_interrupt
    /// [`on_low_priority_interrupt`]: RadioScheduler::on_low_priority_interrupt
    pub fn register_interrupts(&self, high_entry: IsrEntry, low_entry: IsrEntry) {
        assert!(
            self.high_callback.get().is_some() && self.low_callback.get().is_some(),
            "radio callbacks must be set before the lines are registered"
        );
        let was_registered = self.registered.swap(true, Ordering::SeqCst);
        assert!(!was_registered, "radio interrupt lines registered twice");

        debug_assert!(self.config.high_priority <= self.config.elevated_priority);
        debug_assert!(self.config.elevated_priority <= self.config.low_priority);

        self.port.disable(self.config.high_line);
        self.port
            .connect(self.config.high_line, self.config.high_priority, high_entry);
        self.port.enable(self.config.high_line);

        self.port.disable(self.config.low_line);
        self.port
            .connect(self.config.low_line, self.config.low_priority, low_entry);
        self.port.enable(self.config.low_line);

        debug!("radio interrupt lines registered");
    }

    /// High-priority ISR body: dispatch to the registered callback, then
    /// let the platform clear the radio wake-up request and decide whether
    /// to reschedule at interrupt exit.
    pub fn on_high_priority_interrupt(&self) {
        if let Some(callback) = self.high_callback.get() {
            callback();
        }

        self.port.radio_wakeup_serviced();
        self.port.request_reschedule();
    }

    /// Low-priority ISR body.
    ///
    /// The line stays masked while the callback runs, so a nested trigger
    /// can only latch the pending bit and mark the reentry flag. If the
    /// flag is set at exit it is consumed and the line is re-armed at the
    /// elevated tier before being unmasked, which delivers the single
    /// pending activation once more.
    pub fn on_low_priority_interrupt(&self) {
        self.port.disable(self.config.low_line);

        if let Some(callback) = self.low_callback.get() {
            callback();
        }

        if self.low_reentry.swap(false, Ordering::AcqRel) {
            self.port
                .set_priority(self.config.low_line, self.config.elevated_priority);
            trace!("nested sw low request re-armed at the elevated tier");
        }

        self.port.enable(self.config.low_line);
        self.port.request_reschedule();
    }

    /// Arm the software-triggerable low-priority line.
    ///
    /// While the line is idle, priority 0 explicitly requests the elevated
    /// default tier and any other value the standard low tier; the line is
    /// then pended for one-shot delivery. While the line's handler is
    /// running, the live priority is left untouched: a non-zero priority
    /// marks the reentry flag so the pending activation is re-armed at the
    /// elevated tier when the handler exits. At most one pending
    /// activation is tracked; bursts coalesce into one servicing pass.
    pub fn trigger_sw_low_interrupt(&self, priority: u8) {
        trace!("sw low trigger, priority {}", priority);

        if !self.port.is_active(self.config.low_line) {
            let tier = if priority == 0 {
                self.config.elevated_priority
            } else {
                self.config.low_priority
            };
            self.port.set_priority(self.config.low_line, tier);
        } else if priority != 0 {
            self.low_reentry.store(true, Ordering::SeqCst);
        }

        self.port.set_pending(self.config.low_line);
    }

    /// Enter a critical section against the classes in `mask`.
    ///
    /// Each selected class nests independently; the masking action runs
    /// only when its counter transitions 0 to 1. For SystemLow the current
    /// priority floor is saved and the floor raised to the elevated tier.
    /// Non-blocking, callable from interrupt and task context.
    pub fn disable_interrupt_classes(&self, mask: IrqClassMask) {
        trace!("disable interrupt classes {:?}", mask);

        if mask.contains(InterruptClass::HighPriorityRadio) && counter_acquire(&self.high_counter)
        {
            self.port.disable(self.config.high_line);
        }

        if mask.contains(InterruptClass::LowPriorityRadio) && counter_acquire(&self.low_counter) {
            self.port.disable(self.config.low_line);
        }

        if mask.contains(InterruptClass::SystemLow) && counter_acquire(&self.sys_counter) {
            let floor = self.port.priority_floor();
            self.saved_floor.store(floor, Ordering::SeqCst);
            self.port.raise_priority_floor(self.config.elevated_priority);
        }
    }

    /// Leave a critical section against the classes in `mask`.
    ///
    /// The unmasking action runs only when a class counter transitions
    /// 1 to 0; SystemLow restores the floor value saved by the matching
    /// disable. An enable with no matching disable saturates at zero and
    /// never unmasks, since another holder may still rely on the mask.
    pub fn enable_interrupt_classes(&self, mask: IrqClassMask) {
        trace!("enable interrupt classes {:?}", mask);

        if mask.contains(InterruptClass::HighPriorityRadio) {
            match counter_release(&self.high_counter) {
                Release::Unmask => self.port.enable(self.config.high_line),
                Release::StillHeld => {}
                Release::Undercount => undercount(InterruptClass::HighPriorityRadio),
            }
        }

        if mask.contains(InterruptClass::LowPriorityRadio) {
            match counter_release(&self.low_counter) {
                Release::Unmask => self.port.enable(self.config.low_line),
                Release::StillHeld => {}
                Release::Undercount => undercount(InterruptClass::LowPriorityRadio),
            }
        }

        if mask.contains(InterruptClass::SystemLow) {
            match counter_release(&self.sys_counter) {
                Release::Unmask => {
                    let floor = self.saved_floor.load(Ordering::SeqCst);
                    self.port.restore_priority_floor(floor);
                }
                Release::StillHeld => {}
                Release::Undercount => undercount(InterruptClass::SystemLow),
            }
        }
    }

    /// A radio event window is opening: the high line moves to its most
    /// urgent tier and the platform is told the radio is active.
    pub fn radio_event_started(&self) {
        self.port
            .set_priority(self.config.high_line, self.config.high_priority);
        self.port.radio_state_changed(true);
    }

    /// The radio event window closed: the high line relaxes to the
    /// elevated tier and the platform is told the radio is idle.
    pub fn radio_event_ended(&self) {
        self.port
            .set_priority(self.config.high_line, self.config.elevated_priority);
        self.port.radio_state_changed(false);
    }
}

fn undercount(class: InterruptClass) {
    error!("interrupt class enabled with no matching disable: {:?}", class);
    debug_assert!(false, "unbalanced interrupt class enable");
}
