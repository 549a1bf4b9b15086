// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Special purpose register snapshots.

use core::fmt;

/// Size of the SPR number space.
pub const SPR_COUNT: usize = 1024;

/// Ids below this bound take part in name propagation and comparison. The
/// topmost slot is never compared.
pub const SPR_SCAN_LIMIT: usize = SPR_COUNT - 1;

/// An architected SPR number.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct SprId(u16);

impl SprId {
    /// Decrementer.
    pub const DECR: Self = Self(0x16);
    /// Timebase, lower.
    pub const TBL: Self = Self(0x10c);
    /// Virtual timebase.
    pub const VTB: Self = Self(0x351);

    /// Returns the id for `spr`, if it is inside the SPR number space.
    pub const fn new(spr: u16) -> Option<Self> {
        if (spr as usize) < SPR_COUNT {
            Some(Self(spr))
        } else {
            None
        }
    }

    /// The SPR number.
    pub const fn get(self) -> u16 {
        self.0
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// The last known value of one register. Registers without a name, or with
/// an empty one, are not tracked.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct SprRecord {
    /// Display name; `None` or empty for untracked registers.
    pub name: Option<&'static str>,
    /// Register contents.
    pub value: u64,
}

impl SprRecord {
    const UNTRACKED: Self = Self {
        name: None,
        value: 0,
    };

    /// The display name, if the register is tracked.
    pub fn tracked_name(&self) -> Option<&'static str> {
        self.name.filter(|name| !name.is_empty())
    }
}

/// A register that is written before each migration window.
#[derive(Copy, Clone, Debug)]
pub struct SprSeed {
    /// Register to write.
    pub id: SprId,
    /// Display name.
    pub name: &'static str,
    /// Value to write.
    pub value: u64,
}

#[cfg(feature = "large-decr")]
const DECR_SEED: u64 = 0x007a_fafa_dead_beef;
#[cfg(not(feature = "large-decr"))]
const DECR_SEED: u64 = 0x7ead_beef;

/// Registers dirtied before every wait. The values are arbitrary but
/// unlikely to be produced by a reset.
pub const SEEDS: &[SprSeed] = &[SprSeed {
    id: SprId::DECR,
    name: "DECR",
    value: DECR_SEED,
}];

/// A table of register values indexed by SPR number.
#[derive(Clone)]
pub struct SprTable {
    records: [SprRecord; SPR_COUNT],
}

impl SprTable {
    /// Returns a table with nothing tracked.
    pub const fn new() -> Self {
        Self {
            records: [SprRecord::UNTRACKED; SPR_COUNT],
        }
    }

    /// Returns a table tracking every register in `seeds`.
    pub fn seeded(seeds: &[SprSeed]) -> Self {
        let mut table = Self::new();
        for seed in seeds {
            table.track(seed.id, seed.name, seed.value);
        }
        table
    }

    /// Starts tracking `id` under `name`. An empty name leaves it untracked.
    pub fn track(&mut self, id: SprId, name: &'static str, value: u64) {
        self.records[id.index()] = SprRecord {
            name: Some(name),
            value,
        };
    }

    /// Restores the seeded values. Names are left alone.
    pub fn reseed(&mut self, seeds: &[SprSeed]) {
        for seed in seeds {
            self.records[seed.id.index()].value = seed.value;
        }
    }

    /// Copies the set of tracked names from `other`, leaving values alone.
    pub fn adopt_names(&mut self, other: &SprTable) {
        for (record, theirs) in self.records[..SPR_SCAN_LIMIT]
            .iter_mut()
            .zip(&other.records)
        {
            record.name = theirs.name;
        }
    }

    /// The record for `id`.
    pub fn get(&self, id: SprId) -> &SprRecord {
        &self.records[id.index()]
    }

    /// Stores `value` for `id`, keeping its name.
    pub fn set_value(&mut self, id: SprId, value: u64) {
        self.records[id.index()].value = value;
    }

    /// Tracked registers in ascending id order, as `(id, name, value)`.
    pub fn tracked(&self) -> impl Iterator<Item = (SprId, &'static str, u64)> + '_ {
        self.records
            .iter()
            .enumerate()
            .filter_map(|(spr, record)| {
                record
                    .tracked_name()
                    .map(|name| (SprId(spr as u16), name, record.value))
            })
    }
}

/// Bulk access to the processor's register file.
pub trait SprFile {
    /// Writes every tracked register in `table` to the processor.
    fn load(&mut self, table: &SprTable);

    /// Reads every tracked register of `table` back from the processor.
    fn save(&mut self, table: &mut SprTable);
}
