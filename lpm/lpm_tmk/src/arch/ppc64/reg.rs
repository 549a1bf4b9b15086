// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use core::arch::asm;

/// Read special purpose register `SPR`.
pub fn mfspr<const SPR: u16>() -> u64 {
    let value: u64;
    // SAFETY: Reading an SPR has no side effects on the registers this
    // kernel touches.
    unsafe {
        asm!(
            "mfspr {0}, {1}",
            out(reg) value,
            const SPR,
            options(nomem, nostack, preserves_flags),
        );
    }
    value
}

/// Write `value` to special purpose register `SPR`.
pub fn mtspr<const SPR: u16>(value: u64) {
    // SAFETY: Only called for registers whose contents the kernel does not
    // depend on for its own execution.
    unsafe {
        asm!(
            "mtspr {1}, {0}",
            in(reg) value,
            const SPR,
            options(nomem, nostack, preserves_flags),
        );
    }
}

/// Read the timebase.
pub fn mftb() -> u64 {
    let value: u64;
    // SAFETY: The timebase is always readable.
    unsafe {
        asm!(
            "mftb {0}",
            out(reg) value,
            options(nomem, nostack, preserves_flags),
        );
    }
    value
}
