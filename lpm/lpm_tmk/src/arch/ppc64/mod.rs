// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// UNSAFETY: Needed to access special purpose registers and to call into the
// startup code and the platform firmware.
#![expect(unsafe_code)]

pub mod console;
pub mod firmware;
mod reg;
pub mod spr;

pub use console::Console;
pub use firmware::Firmware;
pub use firmware::bootargs;
pub use spr::SprRegisters;
pub use spr::Timebase;
pub use spr::read_tb;
