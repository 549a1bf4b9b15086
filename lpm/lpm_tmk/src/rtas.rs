// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! RTAS call channel.
//!
//! A single argument buffer is shared by every platform call. The channel
//! owns exclusive access to it; each call hands out an [`RtasReturn`] guard
//! that borrows the channel until the results have been read, and wipes the
//! buffer when dropped.

use core::ffi::CStr;
use core::fmt;

use rtas_defs::RtasArgs;
use rtas_defs::RtasToken;
use rtas_defs::TIME_OF_DAY_RETURNS;
use rtas_defs::TimeOfDay;

use crate::tmkdefs::TmkResult;

/// Transfers control to the platform firmware.
pub trait RtasEntry {
    /// Enters RTAS with `args` as the parameter block. Returns once the
    /// firmware has written its results back into `args`.
    fn enter(&mut self, args: &mut RtasArgs);
}

/// The verdict reported to the platform.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TestStatus {
    /// Register state survived the migration.
    Pass,
    /// Register state diverged, or the test could not run.
    Fail,
}

impl TestStatus {
    /// The NUL-terminated label handed to `ibm,os-term`.
    pub fn label(self) -> &'static CStr {
        match self {
            TestStatus::Pass => c"PASS",
            TestStatus::Fail => c"FAIL",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The labels are ASCII literals.
        f.write_str(self.label().to_str().unwrap_or("?"))
    }
}

/// Exclusive access to the RTAS argument buffer.
pub struct RtasChannel<'a, E> {
    args: &'a mut RtasArgs,
    entry: E,
}

impl<'a, E: RtasEntry> RtasChannel<'a, E> {
    /// Takes over `args` for the lifetime of the channel.
    pub fn new(args: &'a mut RtasArgs, entry: E) -> Self {
        args.init();
        Self { args, entry }
    }

    /// Loads a request, enters the firmware and returns a guard over the
    /// results. No other call can be made until the guard is dropped.
    pub fn call(
        &mut self,
        token: RtasToken,
        inputs: &[u32],
        nret: usize,
    ) -> TmkResult<RtasReturn<'_>> {
        self.args.load(token, inputs, nret)?;
        self.entry.enter(&mut *self.args);
        Ok(RtasReturn {
            args: &mut *self.args,
        })
    }

    /// Queries the platform time of day.
    pub fn time_of_day(&mut self) -> TmkResult<TimeOfDay> {
        let ret = self.call(RtasToken::GET_TIME_OF_DAY, &[], TIME_OF_DAY_RETURNS)?;
        Ok(TimeOfDay::from_returns(ret.args())?)
    }

    /// Asks the platform to terminate the partition with `status` as the
    /// reason. The platform is not expected to return.
    pub fn os_term(&mut self, status: TestStatus) -> TmkResult<()> {
        // RTAS runs in real mode with 32-bit addressing; the kernel image is
        // loaded low so the truncation is lossless on hardware.
        let label = status.label().as_ptr() as usize as u32;
        let _ret = self.call(RtasToken::OS_TERM, &[label], 1)?;
        Ok(())
    }

    /// The firmware entry this channel calls through.
    pub fn entry(&self) -> &E {
        &self.entry
    }
}

/// Results of a completed call. Dropping the guard clears the buffer.
pub struct RtasReturn<'c> {
    args: &'c mut RtasArgs,
}

impl RtasReturn<'_> {
    /// The raw buffer as left by the firmware.
    pub fn args(&self) -> &RtasArgs {
        self.args
    }

    /// Return word `index`, decoded to host order.
    pub fn word(&self, index: usize) -> TmkResult<u32> {
        Ok(self.args.ret(index)?)
    }
}

impl Drop for RtasReturn<'_> {
    fn drop(&mut self) {
        self.args.clear();
    }
}

/// Reports `status` to the platform. Returns only if the platform does.
pub fn report<E: RtasEntry>(channel: &mut RtasChannel<'_, E>, status: TestStatus) {
    log::warn!("TEST_END {}", status);
    if let Err(err) = channel.os_term(status) {
        log::error!("os-term failed: {}", err);
    }
}

/// Reports `status` to the platform and never returns.
pub fn terminate<E: RtasEntry>(channel: &mut RtasChannel<'_, E>, status: TestStatus) -> ! {
    report(channel, status);
    loop {
        core::hint::spin_loop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::FakeFirmware;
    use crate::tmkdefs::TmkError;
    use rtas_defs::RtasError;

    #[test]
    fn time_of_day_decodes_hour_minute_second() {
        let mut args = RtasArgs::new();
        let mut rtas = RtasChannel::new(&mut args, FakeFirmware::at(9, 42, 23));
        let tod = rtas.time_of_day().unwrap();
        assert_eq!((tod.hour, tod.minute, tod.second), (9, 42, 23));

        let call = &rtas.entry().calls[0];
        assert_eq!(call.token, RtasToken::GET_TIME_OF_DAY);
        assert_eq!(call.nargs, 0);
        assert_eq!(call.nret, 8);
    }

    #[test]
    fn time_of_day_failure_is_reported() {
        let mut firmware = FakeFirmware::at(0, 0, 0);
        firmware.status = -2;
        let mut args = RtasArgs::new();
        let mut rtas = RtasChannel::new(&mut args, firmware);
        assert_eq!(rtas.time_of_day(), Err(TmkError::Rtas(RtasError::Busy)));
    }

    #[test]
    fn results_are_cleared_on_release() {
        let mut args = RtasArgs::new();
        {
            let mut rtas = RtasChannel::new(&mut args, FakeFirmware::at(9, 42, 23));
            let ret = rtas
                .call(RtasToken::GET_TIME_OF_DAY, &[], TIME_OF_DAY_RETURNS)
                .unwrap();
            assert_eq!(ret.word(6).unwrap(), 23);
        }
        assert_eq!(args.nret(), 0);
        assert_eq!(args.token(), RtasToken(0));
        assert_eq!(args.ret(0), Err(RtasError::MissingReturn(0)));
    }

    #[test]
    fn os_term_passes_label_address() {
        let mut args = RtasArgs::new();
        let mut rtas = RtasChannel::new(&mut args, FakeFirmware::at(0, 0, 0));
        rtas.os_term(TestStatus::Fail).unwrap();

        let call = &rtas.entry().calls[0];
        assert_eq!(call.token, RtasToken::OS_TERM);
        assert_eq!(call.nargs, 1);
        assert_eq!(call.nret, 1);
        assert_eq!(
            call.inputs[0],
            TestStatus::Fail.label().as_ptr() as usize as u32
        );
        assert_eq!(rtas.entry().terminated, Some(TestStatus::Fail));
    }

    #[test]
    fn report_reaches_platform() {
        let mut args = RtasArgs::new();
        let mut rtas = RtasChannel::new(&mut args, FakeFirmware::at(0, 0, 0));
        report(&mut rtas, TestStatus::Pass);
        assert_eq!(rtas.entry().calls.len(), 1);
        assert_eq!(rtas.entry().terminated, Some(TestStatus::Pass));
    }

    #[test]
    fn labels() {
        assert_eq!(TestStatus::Pass.label().to_bytes_with_nul(), b"PASS\0");
        assert_eq!(TestStatus::Fail.label().to_bytes_with_nul(), b"FAIL\0");
        assert_eq!(alloc::format!("{}", TestStatus::Pass), "PASS");
    }
}
