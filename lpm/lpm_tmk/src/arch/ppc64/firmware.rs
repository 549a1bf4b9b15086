// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Calls into the startup code and RTAS.

use core::ffi::CStr;
use core::ffi::c_char;

use rtas_defs::RtasArgs;

use crate::rtas::RtasEntry;

unsafe extern "C" {
    /// Enters RTAS in real mode with the parameter block at `args`.
    fn enter_rtas(args: u64);
    /// The NUL-terminated boot command line, or null.
    fn boot_cmdline() -> *const c_char;
}

/// RTAS as instantiated by the startup code.
pub struct Firmware;

impl RtasEntry for Firmware {
    fn enter(&mut self, args: &mut RtasArgs) {
        let addr = core::ptr::from_mut(args) as u64;
        // SAFETY: `args` is a valid, exclusively borrowed parameter block for
        // the duration of the call and the firmware only writes within it.
        unsafe { enter_rtas(addr) };
    }
}

/// The boot command line. Empty when absent or not UTF-8.
pub fn bootargs() -> &'static str {
    // SAFETY: The startup code keeps the command line alive and unmodified
    // for the lifetime of the kernel.
    let ptr = unsafe { boot_cmdline() };
    if ptr.is_null() {
        return "";
    }
    // SAFETY: Non-null pointers returned by `boot_cmdline` are
    // NUL-terminated.
    let cmdline = unsafe { CStr::from_ptr(ptr) };
    cmdline.to_str().unwrap_or_default()
}
