//! Entropy access for the link layer.

use crate::port::EntropySource;

/// Fill `out` with random bytes from `entropy`.
///
/// A failed read is logged and returns without populating the buffer;
/// missing entropy is non-fatal here and surfaces to the caller through
/// the unchanged buffer contents. Callable from interrupt context.
pub fn fill_random<E: EntropySource>(entropy: &E, out: &mut [u8]) {
    if let Err(err) = entropy.try_fill(out) {
        error!("entropy read failed: {:?}", err);
        return;
    }
    trace!("entropy read, {} bytes", out.len());
}
