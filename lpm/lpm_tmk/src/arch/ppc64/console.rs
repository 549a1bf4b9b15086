// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Firmware console output.

use core::fmt;

unsafe extern "C" {
    fn console_init();
    fn putchar(c: u8);
}

/// A writer for the firmware console.
pub struct Console(());

impl Console {
    /// Creates a writer. Output is dropped until [`Console::init`] runs.
    pub const fn new() -> Self {
        Self(())
    }

    /// Brings up the console device.
    pub fn init(&self) {
        // SAFETY: Called once, before any output, from the entry point.
        unsafe { console_init() };
    }
}

impl fmt::Write for Console {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for b in s.bytes() {
            if b == b'\n' {
                // SAFETY: `putchar` accepts any byte.
                unsafe { putchar(b'\r') };
            }
            // SAFETY: `putchar` accepts any byte.
            unsafe { putchar(b) };
        }
        Ok(())
    }
}
