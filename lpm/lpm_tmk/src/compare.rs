// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Comparison of a register snapshot against the values written before the
//! migration window.

use core::fmt;

use crate::spr::SPR_SCAN_LIMIT;
use crate::spr::SprId;
use crate::spr::SprTable;

/// Parameters bounding how far a timebase-derived register may drift.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Tolerance {
    /// Timebase ticks per second.
    pub tb_freq: u64,
    /// Length of the wait between seeding and capturing, in seconds.
    pub wait_seconds: u64,
    /// Ticks allowed on top of the wait for the migration pause itself.
    pub migration_slack: u64,
}

impl Tolerance {
    /// Largest decrementer drift that is still considered equal, exclusive.
    pub fn decrementer_threshold(&self) -> u64 {
        self.tb_freq
            .saturating_mul(self.wait_seconds)
            .saturating_add(self.migration_slack)
    }
}

/// How a register is compared.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SprPolicy {
    /// Bit-for-bit equality.
    Exact,
    /// The register counts with the timebase; values closer than
    /// `threshold` are equal.
    Decrementer {
        /// Exclusive bound on the difference.
        threshold: u64,
    },
}

impl SprPolicy {
    /// The policy for register `id`.
    pub fn for_spr(id: SprId, tolerance: &Tolerance) -> Self {
        match id {
            SprId::DECR => SprPolicy::Decrementer {
                threshold: tolerance.decrementer_threshold(),
            },
            _ => SprPolicy::Exact,
        }
    }

    /// Whether `observed` matches `expected` under this policy.
    pub fn equal(self, expected: u64, observed: u64) -> bool {
        match self {
            SprPolicy::Exact => expected == observed,
            SprPolicy::Decrementer { threshold } => expected.abs_diff(observed) < threshold,
        }
    }
}

/// The first register found to differ.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SprMismatch {
    /// Register number.
    pub id: SprId,
    /// Register name.
    pub name: &'static str,
    /// Value written before the wait.
    pub expected: u64,
    /// Value read back after the wait.
    pub observed: u64,
    /// Registers below this one that were found equal.
    pub matched: usize,
}

impl fmt::Display for SprMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) 0x{:016x} != 0x{:016x}",
            self.name, self.id, self.expected, self.observed
        )
    }
}

/// Compares every tracked register of `expected` against `observed` in
/// ascending id order, stopping at the first mismatch.
///
/// Returns the number of registers that matched.
pub fn compare(
    expected: &SprTable,
    observed: &SprTable,
    tolerance: &Tolerance,
) -> Result<usize, SprMismatch> {
    log::info!("Checking SPRs");
    let mut matched = 0;
    for (id, name, value) in expected
        .tracked()
        .take_while(|(id, _, _)| usize::from(id.get()) < SPR_SCAN_LIMIT)
    {
        let observed = observed.get(id).value;
        if !SprPolicy::for_spr(id, tolerance).equal(value, observed) {
            let mismatch = SprMismatch {
                id,
                name,
                expected: value,
                observed,
                matched,
            };
            log::error!("{}", mismatch);
            return Err(mismatch);
        }
        log::debug!("{} 0x{:016x} == 0x{:016x}", name, value, observed);
        matched += 1;
    }
    log::info!("OK");
    Ok(matched)
}
