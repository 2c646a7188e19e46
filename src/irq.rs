//! Interrupt classes and their critical-section nesting counters.
//!
//! Each class owns a signed nesting counter. The masking action belongs to
//! the 0 to 1 transition and the unmasking action to the 1 to 0 transition;
//! every other transition leaves the hardware alone. Counters are updated
//! with indivisible read-modify-write operations so they stay consistent
//! when interrupt context preempts task context mid-call.

use core::sync::atomic::{AtomicI32, Ordering};

/// The three independently maskable interrupt classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptClass {
    /// Hardware radio line serviced at fixed elevated priority.
    HighPriorityRadio,
    /// Software-triggerable radio line with per-invocation priority.
    LowPriorityRadio,
    /// Everything at or below the elevated tier, masked through the
    /// global priority floor.
    SystemLow,
}

impl InterruptClass {
    /// Single-class mask.
    pub const fn mask(self) -> IrqClassMask {
        match self {
            InterruptClass::HighPriorityRadio => IrqClassMask::HIGH_PRIORITY_RADIO,
            InterruptClass::LowPriorityRadio => IrqClassMask::LOW_PRIORITY_RADIO,
            InterruptClass::SystemLow => IrqClassMask::SYSTEM_LOW,
        }
    }
}

/// Bitmask over [`InterruptClass`], accepted by the enable/disable
/// operations so several classes can be requested in one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IrqClassMask(u8);

impl IrqClassMask {
    pub const HIGH_PRIORITY_RADIO: Self = Self(1 << 0);
    pub const LOW_PRIORITY_RADIO: Self = Self(1 << 1);
    pub const SYSTEM_LOW: Self = Self(1 << 2);

    /// Mask selecting no class.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Mask selecting all three classes.
    pub const fn all() -> Self {
        Self(0b111)
    }

    /// Whether `class` is selected.
    pub const fn contains(self, class: InterruptClass) -> bool {
        self.0 & class.mask().0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Raw bit form.
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl From<InterruptClass> for IrqClassMask {
    fn from(class: InterruptClass) -> Self {
        class.mask()
    }
}

impl core::ops::BitOr for IrqClassMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl core::ops::BitOrAssign for IrqClassMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Outcome of dropping one nesting level on a class counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Release {
    /// Count reached zero; the caller performs the unmasking action.
    Unmask,
    /// Other holders remain; the class stays masked.
    StillHeld,
    /// No matching acquire; the counter saturated at zero.
    Undercount,
}

/// Add one nesting level. Returns `true` on the 0 to 1 transition, when the
/// caller must perform the class's masking action.
pub(crate) fn counter_acquire(counter: &AtomicI32) -> bool {
    counter.fetch_add(1, Ordering::SeqCst) == 0
}

/// Drop one nesting level, saturating at zero on undercount so an unmatched
/// enable can never unmask a class another holder still expects masked.
pub(crate) fn counter_release(counter: &AtomicI32) -> Release {
    let held = counter.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |count| {
        if count > 0 {
            Some(count - 1)
        } else {
            None
        }
    });
    match held {
        Ok(1) => Release::Unmask,
        Ok(_) => Release::StillHeld,
        Err(_) => Release::Undercount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_release_cycle() {
        let counter = AtomicI32::new(0);

        // 0 -> 1 masks, deeper nesting does not.
        assert!(counter_acquire(&counter));
        assert!(!counter_acquire(&counter));

        // 2 -> 1 stays masked, 1 -> 0 unmasks.
        assert_eq!(counter_release(&counter), Release::StillHeld);
        assert_eq!(counter_release(&counter), Release::Unmask);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_masking_action_once_per_cycle() {
        let counter = AtomicI32::new(0);
        let mut masks = 0;
        let mut unmasks = 0;

        for _ in 0..5 {
            if counter_acquire(&counter) {
                masks += 1;
            }
        }
        for _ in 0..5 {
            if counter_release(&counter) == Release::Unmask {
                unmasks += 1;
            }
        }

        assert_eq!(masks, 1);
        assert_eq!(unmasks, 1);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_release_saturates_at_zero() {
        let counter = AtomicI32::new(0);

        assert_eq!(counter_release(&counter), Release::Undercount);
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        // The saturated counter still masks exactly once afterwards.
        assert!(counter_acquire(&counter));
        assert_eq!(counter_release(&counter), Release::Unmask);
    }

    #[test]
    fn test_mask_ops() {
        let mask = IrqClassMask::HIGH_PRIORITY_RADIO | IrqClassMask::SYSTEM_LOW;

        assert!(mask.contains(InterruptClass::HighPriorityRadio));
        assert!(!mask.contains(InterruptClass::LowPriorityRadio));
        assert!(mask.contains(InterruptClass::SystemLow));

        assert!(IrqClassMask::empty().is_empty());
        assert_eq!(IrqClassMask::all().bits(), 0b111);
        assert_eq!(
            IrqClassMask::from(InterruptClass::LowPriorityRadio),
            IrqClassMask::LOW_PRIORITY_RADIO
        );

        let mut combined = IrqClassMask::empty();
        combined |= IrqClassMask::LOW_PRIORITY_RADIO;
        assert!(combined.contains(InterruptClass::LowPriorityRadio));
    }
}
