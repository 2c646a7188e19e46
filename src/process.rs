//! Signal-gated background processing.
//!
//! One loop per protocol backend, each blocked on a private binary signal
//! and woken from interrupt or task context through the `signal_*` entry
//! points. The controller and link-layer system loops take the shared
//! protocol lock around their backend step; the key-agreement loop runs on
//! independent state.
//!
//! The crate only provides the `run_*` futures. The application decides
//! where they execute, keeping the controller loop at a higher priority
//! than the key-agreement loop and both radio interrupt tiers above all of
//! them. A loop that is never signalled stays suspended indefinitely; that
//! is the idle state, not an error.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;

use crate::stack::{
    ControllerBackend, EventHandlerUpdate, KeyAgreementBackend, LinkLayerSystemBackend, PowerMode,
};

/// Protocol state shared by the controller and link-layer system backends.
struct Shared<C, L> {
    controller: C,
    ll_system: L,
}

/// Owns the three background signals, the shared protocol lock, and the
/// backends themselves.
pub struct BackgroundProcessor<C, K, L> {
    controller_signal: Signal<CriticalSectionRawMutex, ()>,
    key_agreement_signal: Signal<CriticalSectionRawMutex, ()>,
    ll_system_signal: Signal<CriticalSectionRawMutex, ()>,
    shared: Mutex<CriticalSectionRawMutex, Shared<C, L>>,
    // Private to its own loop; the lock only satisfies `&self` access.
    key_agreement: Mutex<CriticalSectionRawMutex, K>,
}

impl<C, K, L> BackgroundProcessor<C, K, L>
where
    C: ControllerBackend,
    K: KeyAgreementBackend,
    L: LinkLayerSystemBackend,
{
    pub const fn new(controller: C, key_agreement: K, ll_system: L) -> Self {
        Self {
            controller_signal: Signal::new(),
            key_agreement_signal: Signal::new(),
            ll_system_signal: Signal::new(),
            shared: Mutex::new(Shared {
                controller,
                ll_system,
            }),
            key_agreement: Mutex::new(key_agreement),
        }
    }

    /// Schedule one more controller processing step. Non-blocking,
    /// idempotent, callable from interrupt context.
    pub fn signal_link_layer_work(&self) {
        self.controller_signal.signal(());
    }

    /// Schedule one more key-agreement background step. Non-blocking,
    /// idempotent, callable from interrupt context.
    pub fn signal_key_agreement_work(&self) {
        self.key_agreement_signal.signal(());
    }

    /// Schedule one more link-layer system background step. Non-blocking,
    /// idempotent, callable from interrupt context.
    pub fn signal_link_layer_system_work(&self) {
        self.ll_system_signal.signal(());
    }

    /// Link-layer controller loop.
    ///
    /// Each step runs under the shared protocol lock and reports a
    /// [`StackVerdict`](crate::stack::StackVerdict). Pending event-handler
    /// changes are applied with the fixed combined update once the lock has
    /// been released; a step that leaves the stack in
    /// [`PowerMode::Running`] re-raises this loop's own signal so host-side
    /// work keeps the same cadence.
    pub async fn run_controller(&self) -> ! {
        loop {
            self.controller_signal.wait().await;

            let verdict = {
                let mut shared = self.shared.lock().await;
                shared.controller.process()
            };
            trace!("controller step: {:?}", verdict);

            if verdict.event_handlers_pending {
                let mut shared = self.shared.lock().await;
                shared
                    .controller
                    .apply_event_handler_update(EventHandlerUpdate::ALL);
            }

            if verdict.power == PowerMode::Running {
                self.signal_link_layer_work();
            }
        }
    }

    /// Key-agreement loop. Independent state, no shared lock.
    pub async fn run_key_agreement(&self) -> ! {
        loop {
            self.key_agreement_signal.wait().await;
            self.key_agreement.lock().await.bg_process();
        }
    }

    /// Link-layer system loop. Takes the same shared protocol lock as the
    /// controller loop, so at most one of the two is inside protocol work
    /// at any time.
    pub async fn run_link_layer_system(&self) -> ! {
        loop {
            self.ll_system_signal.wait().await;
            self.shared.lock().await.ll_system.bg_process();
        }
    }
}
