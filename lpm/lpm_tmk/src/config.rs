// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Test parameters and their boot command line overrides.

use crate::compare::Tolerance;

/// Timebase frequency. The test does not probe it from the device tree.
const TBFREQ: &str = "lpm.tb_freq=";

/// Seconds to wait in each migration window. The elapsed time check only
/// sees the time of day modulo 64 seconds, so values above 63 are refused.
const WAIT: &str = "lpm.wait=";

/// Number of migration windows offered before the test fails.
const RETRIES: &str = "lpm.retries=";

/// Decrementer ticks allowed for the migration pause, on top of the wait.
const SLACK: &str = "lpm.slack=";

/// POWER9 timebase frequency.
pub const DEFAULT_TB_FREQ: u64 = 512_000_000;

/// ~160ms in TB units, enough for a local migration
pub const DEFAULT_MIGRATION_SLACK: u64 = 0x500_0000;

const MAX_WAIT_SECONDS: u64 = 63;

/// Parameters of a validation run.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TestConfig {
    /// Timebase ticks per second.
    pub tb_freq: u64,
    /// Length of each migration window, in seconds.
    pub wait_seconds: u64,
    /// Migration windows offered before giving up.
    pub retries: u32,
    /// Decrementer ticks allowed for the migration pause.
    pub migration_slack: u64,
}

impl TestConfig {
    /// The built-in parameters.
    pub const fn new() -> Self {
        TestConfig {
            tb_freq: DEFAULT_TB_FREQ,
            wait_seconds: 2,
            retries: 100,
            migration_slack: DEFAULT_MIGRATION_SLACK,
        }
    }

    /// The drift allowed on timebase derived registers under this config.
    pub fn tolerance(&self) -> Tolerance {
        Tolerance {
            tb_freq: self.tb_freq,
            wait_seconds: self.wait_seconds,
            migration_slack: self.migration_slack,
        }
    }

    /// Parse arguments from a command line. Unknown arguments are ignored;
    /// malformed values keep the current setting.
    pub fn parse(&mut self, cmdline: &str) {
        for arg in cmdline.split_whitespace() {
            if let Some(value) = arg.strip_prefix(TBFREQ) {
                if let Some(freq) = parse_number(value).filter(|&f| f != 0) {
                    self.tb_freq = freq;
                } else {
                    log::warn!("ignoring invalid {}{}", TBFREQ, value);
                }
            } else if let Some(value) = arg.strip_prefix(WAIT) {
                if let Some(wait) =
                    parse_number(value).filter(|w| (1..=MAX_WAIT_SECONDS).contains(w))
                {
                    self.wait_seconds = wait;
                } else {
                    log::warn!("ignoring invalid {}{}", WAIT, value);
                }
            } else if let Some(value) = arg.strip_prefix(RETRIES) {
                match parse_number(value).and_then(|r| u32::try_from(r).ok()) {
                    Some(retries) if retries != 0 => self.retries = retries,
                    _ => log::warn!("ignoring invalid {}{}", RETRIES, value),
                }
            } else if let Some(value) = arg.strip_prefix(SLACK) {
                if let Some(slack) = parse_number(value) {
                    self.migration_slack = slack;
                } else {
                    log::warn!("ignoring invalid {}{}", SLACK, value);
                }
            }
        }
    }
}

fn parse_number(value: &str) -> Option<u64> {
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}
