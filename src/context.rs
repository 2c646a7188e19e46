//! Context-switch suspend/resume manager.
//!
//! Protocol code (including interrupt context) asks for context switching
//! to be frozen or thawed around critical radio event windows. The request
//! itself only stores the desired state and raises a signal; the slow
//! suspend/resume sweep runs in the manager's own task, which the
//! application places at a priority above the worker tasks it freezes.
//!
//! Requests coalesce: the sweep always acts on the latest requested state,
//! so an enable immediately after a disable results in a single sweep that
//! reflects the final state. Intermediate states may never be observed.

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use crate::port::TaskControl;

/// Freezes and thaws every task except the survivor and itself.
pub struct ContextSwitchManager<T: TaskControl> {
    tasks: T,
    survivor: T::Handle,
    enabled: AtomicBool,
    signal: Signal<CriticalSectionRawMutex, ()>,
}

impl<T: TaskControl> ContextSwitchManager<T> {
    /// `survivor` is the one task identity exempt from suspension, fixed
    /// for the life of the manager. Context switching starts enabled.
    pub const fn new(tasks: T, survivor: T::Handle) -> Self {
        Self {
            tasks,
            survivor,
            enabled: AtomicBool::new(true),
            signal: Signal::new(),
        }
    }

    /// Request that suspended tasks be resumed.
    ///
    /// Stores the state and raises the manager's signal; never blocks and
    /// never performs the sweep itself. Callable from interrupt context.
    pub fn enable_context_switch(&self) {
        self.enabled.store(true, Ordering::SeqCst);
        self.signal.signal(());
    }

    /// Request that every task except the survivor be suspended.
    ///
    /// Stores the state and raises the manager's signal; never blocks and
    /// never performs the sweep itself. Callable from interrupt context.
    pub fn disable_context_switch(&self) {
        self.enabled.store(false, Ordering::SeqCst);
        self.signal.signal(());
    }

    /// Manager loop: the sole enactor of state transitions.
    pub async fn run(&self) -> ! {
        loop {
            self.signal.wait().await;

            // Latest state wins; a disable/enable pair that raced the
            // signal collapses into this one sweep.
            if self.enabled.load(Ordering::SeqCst) {
                self.resume_others();
            } else {
                self.suspend_others();
            }
        }
    }

    fn suspend_others(&self) {
        let current = self.tasks.current();
        let mut swept = 0u32;
        self.tasks.for_each(|task| {
            if task != current && task != self.survivor {
                self.tasks.suspend(task);
                swept += 1;
            }
        });
        trace!("context switching disabled, {} tasks suspended", swept);
    }

    fn resume_others(&self) {
        let current = self.tasks.current();
        let mut swept = 0u32;
        self.tasks.for_each(|task| {
            if task != current && task != self.survivor {
                self.tasks.resume(task);
                swept += 1;
            }
        });
        trace!("context switching enabled, {} tasks resumed", swept);
    }
}
