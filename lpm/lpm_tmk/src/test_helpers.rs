// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Stand-ins for the firmware, the timebase and the register file.

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::cell::Cell;

use rtas_defs::RtasArgs;
use rtas_defs::RtasToken;

use crate::rtas::RtasEntry;
use crate::rtas::TestStatus;
use crate::spr::SprFile;
use crate::spr::SprId;
use crate::spr::SprTable;
use crate::timebase::TimeBase;

/// A call as the firmware saw it.
pub struct RecordedCall {
    pub token: RtasToken,
    pub nargs: usize,
    pub nret: usize,
    pub inputs: Vec<u32>,
}

/// Firmware answering `get-time-of-day` from a counter and recording every
/// call.
pub struct FakeFirmware {
    /// Seconds since midnight reported by the next query.
    pub now: u64,
    /// Seconds added after every query.
    pub step: u64,
    /// Status word written to every return block.
    pub status: i32,
    pub calls: Vec<RecordedCall>,
    pub terminated: Option<TestStatus>,
}

impl FakeFirmware {
    /// A clock that never moves.
    pub fn at(hour: u64, minute: u64, second: u64) -> Self {
        Self::ticking(hour, minute, second, 0)
    }

    /// A clock that advances `step` seconds per query.
    pub fn ticking(hour: u64, minute: u64, second: u64, step: u64) -> Self {
        Self {
            now: hour * 3600 + minute * 60 + second,
            step,
            status: 0,
            calls: Vec::new(),
            terminated: None,
        }
    }
}

impl RtasEntry for FakeFirmware {
    fn enter(&mut self, args: &mut RtasArgs) {
        self.calls.push(RecordedCall {
            token: args.token(),
            nargs: args.nargs(),
            nret: args.nret(),
            inputs: (0..args.nargs()).filter_map(|i| args.input(i)).collect(),
        });
        args.set_ret(0, self.status as u32).unwrap();

        match args.token() {
            RtasToken::GET_TIME_OF_DAY => {
                let now = self.now;
                self.now += self.step;
                let words = [
                    2026,
                    10,
                    19,
                    (now / 3600) % 24,
                    (now / 60) % 60,
                    now % 60,
                    0,
                ];
                for (i, word) in words.into_iter().enumerate() {
                    args.set_ret(i + 1, word as u32).unwrap();
                }
            }
            RtasToken::OS_TERM => {
                let label = args.input(0).unwrap();
                self.terminated = [TestStatus::Pass, TestStatus::Fail]
                    .into_iter()
                    .find(|s| s.label().as_ptr() as usize as u32 == label);
            }
            _ => {}
        }
    }
}

/// Counters that advance by a fixed step on every read.
pub struct FakeClock {
    tb: Cell<u64>,
    tb_start: u64,
    tb_step: u64,
    tb_reads: Cell<u64>,
    vtb: Cell<u64>,
    vtb_start: u64,
    vtb_step: u64,
    vtb_reads: Cell<u64>,
}

impl FakeClock {
    pub fn new(tb: u64, tb_step: u64, vtb: u64, vtb_step: u64) -> Self {
        Self {
            tb: Cell::new(tb),
            tb_start: tb,
            tb_step,
            tb_reads: Cell::new(0),
            vtb: Cell::new(vtb),
            vtb_start: vtb,
            vtb_step,
            vtb_reads: Cell::new(0),
        }
    }

    fn read(value: &Cell<u64>, step: u64, reads: &Cell<u64>) -> u64 {
        let current = value.get();
        value.set(current.wrapping_add(step));
        reads.set(reads.get() + 1);
        current
    }

    /// Ticks between the first and the last timebase read.
    pub fn tb_elapsed(&self) -> u64 {
        self.tb
            .get()
            .wrapping_sub(self.tb_step)
            .wrapping_sub(self.tb_start)
    }

    /// Ticks between the first and the last virtual timebase read.
    pub fn vtb_elapsed(&self) -> u64 {
        self.vtb
            .get()
            .wrapping_sub(self.vtb_step)
            .wrapping_sub(self.vtb_start)
    }

    pub fn tb_reads(&self) -> u64 {
        self.tb_reads.get()
    }

    pub fn vtb_reads(&self) -> u64 {
        self.vtb_reads.get()
    }
}

impl TimeBase for FakeClock {
    fn tb(&self) -> u64 {
        Self::read(&self.tb, self.tb_step, &self.tb_reads)
    }

    fn vtb(&self) -> u64 {
        Self::read(&self.vtb, self.vtb_step, &self.vtb_reads)
    }
}

/// What the processor holds when the registers are read back.
#[derive(Copy, Clone, Debug)]
pub enum Capture {
    /// Exactly what was loaded.
    Clean,
    /// What was loaded, with one register replaced.
    Set(SprId, u64),
    /// What was loaded, with one register counted down.
    Sub(SprId, u64),
}

/// A register file that replays a script of captures.
pub struct FakeSprFile {
    live: Box<SprTable>,
    script: VecDeque<Capture>,
    fallback: Capture,
    pub loads: u32,
    pub saves: u32,
}

impl FakeSprFile {
    /// Returns `capture` on every read once the script runs out.
    pub fn repeating(capture: Capture) -> Self {
        Self {
            live: Box::new(SprTable::new()),
            script: VecDeque::new(),
            fallback: capture,
            loads: 0,
            saves: 0,
        }
    }

    /// Queues `capture` for the next read.
    pub fn script(&mut self, capture: Capture) {
        self.script.push_back(capture);
    }
}

impl SprFile for FakeSprFile {
    fn load(&mut self, table: &SprTable) {
        self.loads += 1;
        for (id, _, value) in table.tracked() {
            self.live.set_value(id, value);
        }
    }

    fn save(&mut self, table: &mut SprTable) {
        self.saves += 1;
        match self.script.pop_front().unwrap_or(self.fallback) {
            Capture::Clean => {}
            Capture::Set(id, value) => self.live.set_value(id, value),
            Capture::Sub(id, ticks) => {
                let value = self.live.get(id).value.wrapping_sub(ticks);
                self.live.set_value(id, value);
            }
        }
        let tracked: Vec<SprId> = table.tracked().map(|(id, _, _)| id).collect();
        for id in tracked {
            table.set_value(id, self.live.get(id).value);
        }
    }
}
