// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Processor and firmware access. Only the bare-metal POWER build has a
//! backend; hosted builds exercise the test logic through the traits in
//! [`crate::rtas`], [`crate::spr`] and [`crate::timebase`].

cfg_if::cfg_if! {
    if #[cfg(all(target_arch = "powerpc64", target_os = "none"))] {
        pub mod ppc64;
        pub use ppc64::*;
    }
}
