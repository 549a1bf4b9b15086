// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Busy-wait on the timebase, cross-checked against the platform clock.

use bitfield_struct::bitfield;
use rtas_defs::TimeOfDay;

use crate::rtas::RtasChannel;
use crate::rtas::RtasEntry;
use crate::tmkdefs::TmkError;
use crate::tmkdefs::TmkResult;

/// Source of the two free running counters the wait is measured on.
pub trait TimeBase {
    /// Reads the timebase.
    fn tb(&self) -> u64;
    /// Reads the virtual timebase.
    fn vtb(&self) -> u64;
}

/// Time of day packed so that later times compare greater within a day.
/// Only the low six bits of a difference are meaningful as seconds.
#[bitfield(u64)]
#[derive(PartialEq, Eq, PartialOrd, Ord)]
pub struct TodStamp {
    /// Seconds.
    #[bits(6)]
    pub second: u8,
    /// Minutes.
    #[bits(6)]
    pub minute: u8,
    /// Hours.
    #[bits(52)]
    pub hour: u64,
}

impl From<TimeOfDay> for TodStamp {
    fn from(tod: TimeOfDay) -> Self {
        TodStamp::new()
            .with_second((tod.second & 0x3f) as u8)
            .with_minute((tod.minute & 0x3f) as u8)
            .with_hour(tod.hour.into())
    }
}

fn stamp<E: RtasEntry>(rtas: &mut RtasChannel<'_, E>) -> TmkResult<TodStamp> {
    Ok(rtas.time_of_day()?.into())
}

/// Checks that the platform clock moved forward by at least `seconds`
/// between `before` and `after`.
pub fn check_elapsed(before: TodStamp, after: TodStamp, seconds: u64) -> TmkResult<()> {
    let (before, after) = (before.into_bits(), after.into_bits());
    if after <= before {
        return Err(TmkError::TimeNotAdvanced { before, after });
    }
    let elapsed = (after - before) & 0x3f;
    if elapsed < seconds {
        return Err(TmkError::WaitTooShort {
            elapsed,
            requested: seconds,
        });
    }
    Ok(())
}

/// Spins until both the timebase and the virtual timebase have advanced by
/// `seconds` worth of ticks.
///
/// There is no timeout: a stalled counter hangs here rather than letting
/// the test pass. The platform clock is sampled on either side of the wait
/// as a sanity check.
pub fn sleep<T: TimeBase, E: RtasEntry>(
    clock: &T,
    rtas: &mut RtasChannel<'_, E>,
    tb_freq: u64,
    seconds: u64,
) -> TmkResult<()> {
    let count = tb_freq.saturating_mul(seconds);
    let ts0 = stamp(rtas)?;

    // some redundancy in case one of them gets corrupted
    let tb0 = clock.tb();
    let vtb0 = clock.vtb();
    while clock.tb().wrapping_sub(tb0) < count || clock.vtb().wrapping_sub(vtb0) < count {
        core::hint::spin_loop();
    }

    let ts1 = stamp(rtas)?;
    log::trace!("slept {}s, tod {:#x} -> {:#x}", seconds, ts0.into_bits(), ts1.into_bits());
    check_elapsed(ts0, ts1, seconds)
}
