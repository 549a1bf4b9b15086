// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Register file and timebase backed by the processor.

use super::reg::mfspr;
use super::reg::mftb;
use super::reg::mtspr;
use crate::spr::SprFile;
use crate::spr::SprId;
use crate::spr::SprTable;
use crate::timebase::TimeBase;

const DECR: u16 = SprId::DECR.get();
const VTB: u16 = SprId::VTB.get();

/// Reads the timebase, for stamping log records.
pub fn read_tb() -> u64 {
    mftb()
}

/// The processor's timebase and virtual timebase.
pub struct Timebase;

impl TimeBase for Timebase {
    fn tb(&self) -> u64 {
        mftb()
    }

    fn vtb(&self) -> u64 {
        mfspr::<VTB>()
    }
}

/// The live special purpose registers.
pub struct SprRegisters;

impl SprFile for SprRegisters {
    fn load(&mut self, table: &SprTable) {
        for (id, _, value) in table.tracked() {
            match id {
                SprId::DECR => mtspr::<DECR>(value),
                _ => log::warn!("cannot write SPR {}", id),
            }
        }
    }

    fn save(&mut self, table: &mut SprTable) {
        let ids = table.tracked().map(|(id, _, _)| id).collect::<alloc::vec::Vec<_>>();
        for id in ids {
            let value = match id {
                SprId::DECR => mfspr::<DECR>(),
                SprId::TBL => mftb(),
                SprId::VTB => mfspr::<VTB>(),
                _ => {
                    log::warn!("cannot read SPR {}", id);
                    continue;
                }
            };
            table.set_value(id, value);
        }
    }
}
