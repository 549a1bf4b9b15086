// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(
    all(target_arch = "powerpc64", target_os = "none"),
    feature(asm_experimental_arch)
)]
#![doc = include_str!("../README.md")]
#![cfg_attr(all(not(test), target_os = "none"), no_main)]
#![cfg_attr(all(not(test), target_os = "none"), no_std)]

// Actual entrypoint is `runtime::entry`, exported as `main` to the startup code
#[cfg(any(test, not(target_os = "none")))]
fn main() {}

#[macro_use]
extern crate alloc;

pub mod arch;
pub mod compare;
pub mod config;
pub mod driver;
pub mod lpm_assert;
pub mod lpm_logger;
pub mod rtas;
#[cfg(all(not(test), target_os = "none"))]
mod runtime;
pub mod spr;
#[cfg(test)]
mod test_helpers;
pub mod timebase;
pub mod tmkdefs;
