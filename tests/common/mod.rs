//! Shared test doubles: a recording interrupt port, a scripted task table,
//! and scripted protocol backends.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;

use linklayer_plat::port::{InterruptControl, IrqLine, IsrEntry, RadioHooks, TaskControl};
use linklayer_plat::stack::{
    ControllerBackend, EventHandlerUpdate, KeyAgreementBackend, LinkLayerSystemBackend, PowerMode,
    StackVerdict,
};

/// One recorded interrupt-controller call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortOp {
    Connect(IrqLine, u8),
    Enable(IrqLine),
    Disable(IrqLine),
    SetPending(IrqLine),
    SetPriority(IrqLine, u8),
    RaiseFloor(u8),
    RestoreFloor(u8),
}

impl PortOp {
    /// The line this call addressed, if it addressed one.
    pub fn line(&self) -> Option<IrqLine> {
        match *self {
            PortOp::Connect(line, _)
            | PortOp::Enable(line)
            | PortOp::Disable(line)
            | PortOp::SetPending(line)
            | PortOp::SetPriority(line, _) => Some(line),
            PortOp::RaiseFloor(_) | PortOp::RestoreFloor(_) => None,
        }
    }
}

/// Interior state of [`MockPort`], kept behind an `Rc` so the test body can
/// still reach it after the port has moved into the scheduler.
#[derive(Default)]
pub struct PortState {
    pub ops: RefCell<Vec<PortOp>>,
    pub active: Cell<Option<IrqLine>>,
    pub floor: Cell<u8>,
    pub wakeups: Cell<u32>,
    pub reschedules: Cell<u32>,
    pub radio_active: Cell<Option<bool>>,
}

impl PortState {
    /// Drain and return the recorded calls.
    pub fn take_ops(&self) -> Vec<PortOp> {
        self.ops.take()
    }

    /// How many times exactly `op` was recorded.
    pub fn count(&self, op: PortOp) -> usize {
        self.ops.borrow().iter().filter(|&&o| o == op).count()
    }

    /// The recorded calls that addressed `line`.
    pub fn ops_touching(&self, line: IrqLine) -> Vec<PortOp> {
        self.ops
            .borrow()
            .iter()
            .copied()
            .filter(|op| op.line() == Some(line))
            .collect()
    }
}

/// Recording in-memory interrupt controller.
///
/// `active` emulates the controller's active-handler flag and `floor` the
/// raw priority floor register; both are plain cells the test sets up.
pub struct MockPort {
    state: Rc<PortState>,
}

impl MockPort {
    pub fn new() -> Self {
        Self {
            state: Rc::new(PortState::default()),
        }
    }

    /// Handle onto the interior state, valid after the port is moved.
    pub fn state(&self) -> Rc<PortState> {
        Rc::clone(&self.state)
    }

    fn record(&self, op: PortOp) {
        self.state.ops.borrow_mut().push(op);
    }
}

impl InterruptControl for MockPort {
    fn connect(&self, line: IrqLine, priority: u8, _entry: IsrEntry) {
        self.record(PortOp::Connect(line, priority));
    }

    fn enable(&self, line: IrqLine) {
        self.record(PortOp::Enable(line));
    }

    fn disable(&self, line: IrqLine) {
        self.record(PortOp::Disable(line));
    }

    fn is_active(&self, line: IrqLine) -> bool {
        self.state.active.get() == Some(line)
    }

    fn set_pending(&self, line: IrqLine) {
        self.record(PortOp::SetPending(line));
    }

    fn set_priority(&self, line: IrqLine, priority: u8) {
        self.record(PortOp::SetPriority(line, priority));
    }

    fn priority_floor(&self) -> u8 {
        self.state.floor.get()
    }

    fn raise_priority_floor(&self, priority: u8) {
        self.record(PortOp::RaiseFloor(priority));
        self.state.floor.set(priority);
    }

    fn restore_priority_floor(&self, floor: u8) {
        self.record(PortOp::RestoreFloor(floor));
        self.state.floor.set(floor);
    }
}

impl RadioHooks for MockPort {
    fn radio_wakeup_serviced(&self) {
        self.state.wakeups.set(self.state.wakeups.get() + 1);
    }

    fn request_reschedule(&self) {
        self.state.reschedules.set(self.state.reschedules.get() + 1);
    }

    fn radio_state_changed(&self, active: bool) {
        self.state.radio_active.set(Some(active));
    }
}

/// Interior state of [`MockTasks`].
pub struct TaskState {
    pub handles: Vec<usize>,
    pub current: Cell<usize>,
    pub suspended: RefCell<BTreeSet<usize>>,
    pub suspend_calls: Cell<u32>,
    pub resume_calls: Cell<u32>,
}

/// Recording task table with `usize` handles.
pub struct MockTasks {
    state: Rc<TaskState>,
}

impl MockTasks {
    pub fn new(handles: &[usize], current: usize) -> Self {
        Self {
            state: Rc::new(TaskState {
                handles: handles.to_vec(),
                current: Cell::new(current),
                suspended: RefCell::new(BTreeSet::new()),
                suspend_calls: Cell::new(0),
                resume_calls: Cell::new(0),
            }),
        }
    }

    /// Handle onto the interior state, valid after the table is moved.
    pub fn state(&self) -> Rc<TaskState> {
        Rc::clone(&self.state)
    }
}

impl TaskControl for MockTasks {
    type Handle = usize;

    fn current(&self) -> usize {
        self.state.current.get()
    }

    fn for_each<F: FnMut(usize)>(&self, mut f: F) {
        for &task in &self.state.handles {
            f(task);
        }
    }

    fn suspend(&self, task: usize) {
        self.state.suspend_calls.set(self.state.suspend_calls.get() + 1);
        self.state.suspended.borrow_mut().insert(task);
    }

    fn resume(&self, task: usize) {
        self.state.resume_calls.set(self.state.resume_calls.get() + 1);
        self.state.suspended.borrow_mut().remove(&task);
    }
}

/// Interior state shared by the three scripted backends.
///
/// `verdicts` is consumed front to back by controller steps; once empty,
/// further steps report idle with nothing pending.
#[derive(Default)]
pub struct BackendState {
    pub process_calls: Cell<u32>,
    pub verdicts: RefCell<Vec<StackVerdict>>,
    pub updates: RefCell<Vec<EventHandlerUpdate>>,
    pub key_agreement_calls: Cell<u32>,
    pub ll_system_calls: Cell<u32>,
}

pub struct ScriptedController {
    state: Rc<BackendState>,
}

pub struct ScriptedKeyAgreement {
    state: Rc<BackendState>,
}

pub struct ScriptedLlSystem {
    state: Rc<BackendState>,
}

/// One set of scripted backends plus the handle the test observes them by.
pub fn scripted_backends() -> (
    ScriptedController,
    ScriptedKeyAgreement,
    ScriptedLlSystem,
    Rc<BackendState>,
) {
    let state = Rc::new(BackendState::default());
    (
        ScriptedController {
            state: Rc::clone(&state),
        },
        ScriptedKeyAgreement {
            state: Rc::clone(&state),
        },
        ScriptedLlSystem {
            state: Rc::clone(&state),
        },
        state,
    )
}

impl ControllerBackend for ScriptedController {
    fn process(&mut self) -> StackVerdict {
        self.state.process_calls.set(self.state.process_calls.get() + 1);
        let mut verdicts = self.state.verdicts.borrow_mut();
        if verdicts.is_empty() {
            StackVerdict {
                power: PowerMode::Idle,
                event_handlers_pending: false,
            }
        } else {
            verdicts.remove(0)
        }
    }

    fn apply_event_handler_update(&mut self, update: EventHandlerUpdate) {
        self.state.updates.borrow_mut().push(update);
    }
}

impl KeyAgreementBackend for ScriptedKeyAgreement {
    fn bg_process(&mut self) {
        self.state
            .key_agreement_calls
            .set(self.state.key_agreement_calls.get() + 1);
    }
}

impl LinkLayerSystemBackend for ScriptedLlSystem {
    fn bg_process(&mut self) {
        self.state
            .ll_system_calls
            .set(self.state.ll_system_calls.get() + 1);
    }
}
