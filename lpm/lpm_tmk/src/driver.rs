// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The validation loop.
//!
//! Each pass dirties the tracked registers, waits long enough for the
//! orchestrator to migrate the partition, reads the registers back and
//! compares. A pass that matches ends the test; a mismatch opens another
//! window until the retry budget runs out. A partition that is never
//! migrated is indistinguishable from one whose state was corrupted.

use alloc::boxed::Box;

use thiserror::Error;

use crate::compare::SprMismatch;
use crate::compare::compare;
use crate::config::TestConfig;
use crate::rtas::RtasChannel;
use crate::rtas::RtasEntry;
use crate::rtas::TestStatus;
use crate::rtas::report;
use crate::spr::SEEDS;
use crate::spr::SprFile;
use crate::spr::SprSeed;
use crate::spr::SprTable;
use crate::timebase::TimeBase;
use crate::timebase::sleep;
use crate::tmkdefs::TmkError;

/// A run that ended with matching register state.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Verdict {
    /// Migration windows used, including the one that matched.
    pub passes: u32,
}

/// Why a pass, or the whole run, failed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum Failure {
    /// An internal check failed; the result of the run is meaningless.
    #[error("sanity check failed")]
    Sanity(#[from] TmkError),
    /// A register differed after the wait.
    #[error("register mismatch: {0}")]
    RegisterMismatch(SprMismatch),
    /// Every window ended in a mismatch.
    #[error("registers still differ after {attempts} windows, last: {last}")]
    Exhausted {
        /// Windows offered.
        attempts: u32,
        /// The mismatch seen in the final window.
        last: SprMismatch,
    },
}

impl From<&Result<Verdict, Failure>> for TestStatus {
    fn from(outcome: &Result<Verdict, Failure>) -> Self {
        match outcome {
            Ok(_) => TestStatus::Pass,
            Err(_) => TestStatus::Fail,
        }
    }
}

/// Logs the outcome of a run and reports its verdict to the platform.
///
/// The tagged failure only shows up in the log; the platform sees `PASS` or
/// `FAIL`.
pub fn conclude<E: RtasEntry>(
    outcome: &Result<Verdict, Failure>,
    rtas: &mut RtasChannel<'_, E>,
) -> TestStatus {
    match outcome {
        Ok(verdict) => log::info!("passed after {} windows", verdict.passes),
        Err(failure) => log::error!("{}", failure),
    }
    let status = TestStatus::from(outcome);
    report(rtas, status);
    status
}

/// Owns the expected and observed snapshots for a run.
pub struct Validator {
    config: TestConfig,
    seeds: &'static [SprSeed],
    expected: Box<SprTable>,
    observed: Box<SprTable>,
}

impl Validator {
    /// Creates a validator for the default register set.
    pub fn new(config: TestConfig) -> Self {
        Self::with_seeds(config, SEEDS)
    }

    /// Creates a validator dirtying and checking `seeds`.
    pub fn with_seeds(config: TestConfig, seeds: &'static [SprSeed]) -> Self {
        let expected = Box::new(SprTable::seeded(seeds));
        let mut observed = Box::new(SprTable::new());
        observed.adopt_names(&expected);
        Self {
            config,
            seeds,
            expected,
            observed,
        }
    }

    /// The values written before each wait.
    pub fn expected(&self) -> &SprTable {
        &self.expected
    }

    /// The values read back after the most recent wait.
    pub fn observed(&self) -> &SprTable {
        &self.observed
    }

    /// Runs passes until one matches or the retry budget is spent.
    pub fn run<R: SprFile, T: TimeBase, E: RtasEntry>(
        &mut self,
        regs: &mut R,
        clock: &T,
        rtas: &mut RtasChannel<'_, E>,
    ) -> Result<Verdict, Failure> {
        log::info!("Test {:02}:", 1);
        let mut remaining = self.config.retries;
        let mut passes = 0;
        loop {
            passes += 1;
            match self.run_pass(regs, clock, rtas) {
                Ok(matched) => {
                    log::info!("{} SPRs preserved after {} windows", matched, passes);
                    return Ok(Verdict { passes });
                }
                Err(Failure::RegisterMismatch(mismatch)) => {
                    remaining = remaining.saturating_sub(1);
                    if remaining == 0 {
                        return Err(Failure::Exhausted {
                            attempts: passes,
                            last: mismatch,
                        });
                    }
                    log::debug!("window {} mismatched, {} left", passes, remaining);
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn run_pass<R: SprFile, T: TimeBase, E: RtasEntry>(
        &mut self,
        regs: &mut R,
        clock: &T,
        rtas: &mut RtasChannel<'_, E>,
    ) -> Result<usize, Failure> {
        log::info!("Dirtying SPRs (migrate now)");
        self.expected.reseed(self.seeds);
        regs.load(&self.expected);

        sleep(clock, rtas, self.config.tb_freq, self.config.wait_seconds)?;

        regs.save(&mut self.observed);
        compare(&self.expected, &self.observed, &self.config.tolerance())
            .map_err(Failure::RegisterMismatch)
    }
}
