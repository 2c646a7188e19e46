//! Cortex-M implementation of the interrupt capability.
//!
//! Thin wrappers over the NVIC and BASEPRI, with logical priority levels
//! shifted into the device's implemented priority bits on every write.
//! Builds on any target so the rest of the crate can be tested on the
//! host; the register paths are only reachable on ARM.

use core::sync::atomic::{compiler_fence, Ordering};

use cortex_m::interrupt::InterruptNumber;
use cortex_m::peripheral::NVIC;

use crate::port::{InterruptControl, IrqLine, IsrEntry, RadioHooks};

/// Raw NVIC line number.
#[derive(Clone, Copy)]
struct RawInterrupt(u16);

unsafe impl InterruptNumber for RawInterrupt {
    fn number(self) -> u16 {
        self.0
    }
}

/// NVIC/BASEPRI-backed interrupt port.
///
/// Vector routing is fixed at link time on this port: `connect` programs
/// the line's priority, and the application routes the two vector table
/// entries to the scheduler's handler methods itself.
pub struct NvicPort {
    prio_bits: u8,
}

impl NvicPort {
    /// `prio_bits` is the number of priority bits the device implements
    /// (4 on STM32WBA-class parts).
    pub const fn new(prio_bits: u8) -> Self {
        Self { prio_bits }
    }

    fn pack(&self, priority: u8) -> u8 {
        priority << (8 - self.prio_bits)
    }
}

impl InterruptControl for NvicPort {
    fn connect(&self, line: IrqLine, priority: u8, _entry: IsrEntry) {
        // Static vector table; only the priority is programmable here.
        self.set_priority(line, priority);
    }

    fn enable(&self, line: IrqLine) {
        // Owned radio lines only; unmasking them cannot break a critical
        // section guarded by the class counters.
        unsafe { NVIC::unmask(RawInterrupt(line.0)) };
        compiler_fence(Ordering::SeqCst);
    }

    fn disable(&self, line: IrqLine) {
        NVIC::mask(RawInterrupt(line.0));
        compiler_fence(Ordering::SeqCst);
    }

    fn is_active(&self, line: IrqLine) -> bool {
        NVIC::is_active(RawInterrupt(line.0))
    }

    fn set_pending(&self, line: IrqLine) {
        NVIC::pend(RawInterrupt(line.0));
    }

    fn set_priority(&self, line: IrqLine, priority: u8) {
        let mut nvic = unsafe { cortex_m::Peripherals::steal() }.NVIC;
        unsafe { nvic.set_priority(RawInterrupt(line.0), self.pack(priority)) };
    }

    fn priority_floor(&self) -> u8 {
        cortex_m::register::basepri::read()
    }

    fn raise_priority_floor(&self, priority: u8) {
        cortex_m::register::basepri_max::write(self.pack(priority));
    }

    fn restore_priority_floor(&self, floor: u8) {
        // Only reinstates a value previously read out of priority_floor().
        unsafe { cortex_m::register::basepri::write(floor) };
    }
}

impl RadioHooks for NvicPort {
    fn radio_wakeup_serviced(&self) {
        cortex_m::asm::isb();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_packs_into_implemented_bits() {
        // Four implemented bits on STM32WBA-class parts.
        let port = NvicPort::new(4);
        assert_eq!(port.pack(0), 0x00);
        assert_eq!(port.pack(5), 0x50);
        assert_eq!(port.pack(15), 0xF0);

        // Narrower devices shift further left.
        let port = NvicPort::new(3);
        assert_eq!(port.pack(7), 0xE0);
    }
}
