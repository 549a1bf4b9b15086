// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Bare-metal entry point, heap and panic handling.

// UNSAFETY: Needed to export the entry point and to hand the heap arena to
// the allocator.
#![expect(unsafe_code)]

use linked_list_allocator::LockedHeap;
use rtas_defs::RtasArgs;
use spin::Mutex;
use spin::MutexGuard;

use crate::arch::Console;
use crate::arch::Firmware;
use crate::arch::SprRegisters;
use crate::arch::Timebase;
use crate::arch::bootargs;
use crate::arch::read_tb;
use crate::config::TestConfig;
use crate::driver::Validator;
use crate::driver::conclude;
use crate::lpm_assert;
use crate::lpm_logger;
use crate::lpm_logger::LpmLogger;
use crate::rtas::RtasChannel;
use crate::tmkdefs::TmkError;
use crate::tmkdefs::TmkResult;

const HEAP_SIZE: usize = 64 * 1024;

static mut HEAP: [u8; HEAP_SIZE] = [0; HEAP_SIZE];

#[global_allocator]
static ALLOCATOR: LockedHeap = LockedHeap::empty();

pub static LOGGER: LpmLogger<Mutex<Console>> = LpmLogger::new(Console::new(), read_tb);

static RTAS_ARGS: Mutex<RtasArgs> = Mutex::new(RtasArgs::new());

/// Claims the RTAS argument buffer for the rest of the run.
fn take_rtas_args() -> TmkResult<&'static mut RtasArgs> {
    RTAS_ARGS
        .try_lock()
        .map(MutexGuard::leak)
        .ok_or(TmkError::ChannelTaken)
}

#[panic_handler]
fn panic_handler(panic: &core::panic::PanicInfo<'_>) -> ! {
    log::error!("Panic at runtime: {}", panic);
    log::warn!("TEST_END");
    loop {
        core::hint::spin_loop();
    }
}

#[unsafe(export_name = "main")]
extern "C" fn entry() -> ! {
    // SAFETY: The arena is only ever referenced here, once, before any
    // allocation.
    unsafe {
        ALLOCATOR
            .lock()
            .init(core::ptr::addr_of_mut!(HEAP).cast(), HEAP_SIZE)
    };

    LOGGER.get_writer().init();
    let logger_installed = lpm_logger::init(&LOGGER).is_ok();

    let mut config = TestConfig::new();
    config.parse(bootargs());
    log::info!("{:?}", config);

    let args = match take_rtas_args() {
        Ok(args) => args,
        Err(err) => {
            log::error!("{}", err);
            loop {
                core::hint::spin_loop();
            }
        }
    };
    let mut rtas = RtasChannel::new(args, Firmware);
    lpm_assert!(&mut rtas, logger_installed, "logger installed");

    let mut validator = Validator::new(config);
    let outcome = validator.run(&mut SprRegisters, &Timebase, &mut rtas);
    conclude(&outcome, &mut rtas);
    loop {
        core::hint::spin_loop();
    }
}
