// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Definitions for the RTAS (Run-Time Abstraction Services) platform call
//! interface used by PAPR guests.
//!
//! The argument buffer is shared between the guest and firmware. Every
//! integer field the firmware interprets is big-endian regardless of the
//! byte order the guest runs in, so the layout here is expressed with
//! zerocopy's byte-order aware types and callers never swap by hand.

#![no_std]
#![forbid(unsafe_code)]

use core::mem::offset_of;
use core::mem::size_of;

use static_assertions::const_assert_eq;
use thiserror::Error;
use zerocopy::FromBytes;
use zerocopy::Immutable;
use zerocopy::IntoBytes;
use zerocopy::KnownLayout;
use zerocopy::byteorder::big_endian::U32;

/// Number of 32-bit words available for arguments and returns combined.
pub const RTAS_MAX_WORDS: usize = 16;

/// Number of return words produced by `get-time-of-day`.
pub const TIME_OF_DAY_RETURNS: usize = 8;

/// An RTAS service token.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RtasToken(pub u32);

impl RtasToken {
    /// `get-time-of-day`
    pub const GET_TIME_OF_DAY: Self = Self(0x2001);
    /// `ibm,os-term`
    pub const OS_TERM: Self = Self(0x201f);
}

/// Errors reported by the firmware through the status word, or produced
/// while marshalling a call.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum RtasError {
    /// Status -1.
    #[error("hardware error")]
    HardwareError,
    /// Status -2.
    #[error("busy, try again later")]
    Busy,
    /// Status -3.
    #[error("parameter error")]
    ParameterError,
    /// Status 9900 to 9905, carrying the suggested delay in milliseconds.
    #[error("extended delay of {0} ms requested")]
    ExtendedDelay(u32),
    /// Any other non-zero status.
    #[error("unknown status {0}")]
    Unknown(i32),
    /// The call does not fit in the argument buffer.
    #[error("{nargs} arguments and {nret} returns exceed the {RTAS_MAX_WORDS} word buffer")]
    TooManyWords {
        /// Requested argument words.
        nargs: usize,
        /// Requested return words.
        nret: usize,
    },
    /// A return word outside of the declared return count was requested.
    #[error("return word {0} was not requested")]
    MissingReturn(usize),
}

impl RtasError {
    /// Maps a status word to a result.
    pub fn check(status: i32) -> Result<(), Self> {
        match status {
            0 => Ok(()),
            -1 => Err(Self::HardwareError),
            -2 => Err(Self::Busy),
            -3 => Err(Self::ParameterError),
            9900..=9905 => Err(Self::ExtendedDelay(10u32.pow((status - 9900) as u32))),
            other => Err(Self::Unknown(other)),
        }
    }
}

/// The RTAS argument buffer.
///
/// Arguments are stored starting at `args[0]`; returns follow directly after
/// the arguments. `rets` holds the guest address of `args` and is only
/// meaningful to the guest.
#[repr(C)]
#[derive(Clone, Debug, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct RtasArgs {
    token: U32,
    nargs: U32,
    nret: U32,
    args: [U32; RTAS_MAX_WORDS],
    reserved: u32,
    rets: u64,
}

const_assert_eq!(size_of::<RtasArgs>(), 88);
const_assert_eq!(offset_of!(RtasArgs, args), 12);
const_assert_eq!(offset_of!(RtasArgs, rets), 80);

impl RtasArgs {
    /// Returns an empty buffer. [`Self::init`] must run once it has reached
    /// its final address.
    pub const fn new() -> Self {
        Self {
            token: U32::ZERO,
            nargs: U32::ZERO,
            nret: U32::ZERO,
            args: [U32::ZERO; RTAS_MAX_WORDS],
            reserved: 0,
            rets: 0,
        }
    }

    /// Points the return pointer at the argument area. Called once, after
    /// the buffer has reached its final address.
    pub fn init(&mut self) {
        self.rets = self.args.as_ptr() as u64;
    }

    /// Guest address of the argument area, as recorded by [`Self::init`].
    pub fn rets_address(&self) -> u64 {
        self.rets
    }

    /// Loads a request. Any previous contents of the argument area are
    /// discarded.
    pub fn load(&mut self, token: RtasToken, inputs: &[u32], nret: usize) -> Result<(), RtasError> {
        let nargs = inputs.len();
        if nargs + nret > RTAS_MAX_WORDS {
            return Err(RtasError::TooManyWords { nargs, nret });
        }

        self.clear();
        self.token = U32::new(token.0);
        self.nargs = U32::new(nargs as u32);
        self.nret = U32::new(nret as u32);
        for (slot, &word) in self.args.iter_mut().zip(inputs) {
            *slot = U32::new(word);
        }
        Ok(())
    }

    /// Zeroes the request and any results. The return pointer is kept.
    pub fn clear(&mut self) {
        self.token = U32::ZERO;
        self.nargs = U32::ZERO;
        self.nret = U32::ZERO;
        self.args = [U32::ZERO; RTAS_MAX_WORDS];
    }

    /// The token of the loaded request.
    pub fn token(&self) -> RtasToken {
        RtasToken(self.token.get())
    }

    /// Number of argument words.
    pub fn nargs(&self) -> usize {
        self.nargs.get() as usize
    }

    /// Number of return words.
    pub fn nret(&self) -> usize {
        self.nret.get() as usize
    }

    /// Argument word `index`.
    pub fn input(&self, index: usize) -> Option<u32> {
        (index < self.nargs()).then(|| self.args[index].get())
    }

    fn ret_slot(&self, index: usize) -> Result<usize, RtasError> {
        let slot = self.nargs() + index;
        if index >= self.nret() || slot >= RTAS_MAX_WORDS {
            return Err(RtasError::MissingReturn(index));
        }
        Ok(slot)
    }

    /// Return word `index`.
    pub fn ret(&self, index: usize) -> Result<u32, RtasError> {
        let slot = self.ret_slot(index)?;
        Ok(self.args[slot].get())
    }

    /// Stores return word `index`, as the firmware would.
    pub fn set_ret(&mut self, index: usize, value: u32) -> Result<(), RtasError> {
        let slot = self.ret_slot(index)?;
        self.args[slot] = U32::new(value);
        Ok(())
    }

    /// Interprets return word 0 as the call status.
    pub fn status(&self) -> Result<(), RtasError> {
        RtasError::check(self.ret(0)? as i32)
    }
}

/// The result of `get-time-of-day`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct TimeOfDay {
    /// Calendar year.
    pub year: u32,
    /// Month, 1 to 12.
    pub month: u32,
    /// Day of the month.
    pub day: u32,
    /// Hour, 0 to 23.
    pub hour: u32,
    /// Minute, 0 to 59.
    pub minute: u32,
    /// Second, 0 to 59.
    pub second: u32,
    /// Nanoseconds within the second.
    pub nanosecond: u32,
}

impl TimeOfDay {
    /// Decodes the return block of a completed `get-time-of-day` call.
    pub fn from_returns(args: &RtasArgs) -> Result<Self, RtasError> {
        args.status()?;
        Ok(Self {
            year: args.ret(1)?,
            month: args.ret(2)?,
            day: args.ret(3)?,
            hour: args.ret(4)?,
            minute: args.ret(5)?,
            second: args.ret(6)?,
            nanosecond: args.ret(7)?,
        })
    }
}
