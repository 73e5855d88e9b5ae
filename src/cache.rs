//! Orchestration: routes processor and snoop events into the
//! per-set storage and the MESI controller, and maintains the
//! lazily-allocated array of sets plus the running statistics.

use std::io::Write;

use log::debug;

use crate::bus::{BusOp, BusPort};
use crate::cache_set::{CacheSet, Victim};
use crate::error::{LlcError, LlcResult};
use crate::geometry::CacheGeometry;
use crate::l1::{L1Message, L1Port};
use crate::line::MesiState;
use crate::mesi;
use crate::stats::Statistics;

pub struct Cache<B: BusPort, L: L1Port> {
    geometry: CacheGeometry,
    sets: Vec<Option<CacheSet>>,
    bus: B,
    l1: L,
    stats: Statistics,
}

impl<B: BusPort, L: L1Port> Cache<B, L> {
    pub fn new(geometry: CacheGeometry, bus: B, l1: L) -> Self {
        let num_sets = geometry.num_sets() as usize;
        debug!("{}", geometry.describe());
        Self {
            geometry,
            sets: (0..num_sets).map(|_| None).collect(),
            bus,
            l1,
            stats: Statistics::default(),
        }
    }

    pub fn geometry(&self) -> &CacheGeometry {
        &self.geometry
    }

    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    fn set_mut(&mut self, index: u32) -> &mut CacheSet {
        let slot = &mut self.sets[index as usize];
        slot.get_or_insert_with(|| CacheSet::new(self.geometry.associativity()))
    }

    pub fn pr_read(&mut self, addr: u32) {
        self.stats.record_read();
        self.processor_access(addr, false);
    }

    pub fn pr_write(&mut self, addr: u32) {
        self.stats.record_write();
        self.processor_access(addr, true);
    }

    fn processor_access(&mut self, addr: u32, is_write: bool) {
        let fields = self.geometry.decompose(addr);
        let set = self.set_mut(fields.index);

        if let Some(way) = set.search(fields.tag, true) {
            let current = set.line(way).state();
            let next = mesi::on_processor(current, addr, is_write, &mut self.bus);
            set.line_mut(way).set_state(next);
            self.stats.record_hit();
        } else {
            let next = mesi::on_processor(MesiState::Invalid, addr, is_write, &mut self.bus);
            let (victim, _way) = set.allocate(fields.tag, next);
            self.stats.record_miss();
            if let Some(victim) = victim {
                Self::handle_victim(&mut self.l1, &mut self.bus, victim, addr);
            }
        }

        self.l1.send(L1Message::SendLine, addr);
    }

    fn handle_victim(l1: &mut L, bus: &mut B, victim: Victim, addr: u32) {
        if victim.state == MesiState::Modified {
            l1.send(L1Message::GetLine, addr);
            l1.send(L1Message::EvictLine, addr);
            bus.bus_op(BusOp::Write, addr);
        } else {
            l1.send(L1Message::EvictLine, addr);
        }
    }

    pub fn handle_snoop(&mut self, bus_op: BusOp, addr: u32) {
        let fields = self.geometry.decompose(addr);
        let Some(set) = self.sets[fields.index as usize].as_mut() else {
            self.bus.put_snoop_result(addr, crate::bus::SnoopResult::NoHit);
            return;
        };

        match set.search(fields.tag, false) {
            Some(way) => {
                let current = set.line(way).state();
                let next = mesi::on_snoop(current, bus_op, addr, &mut self.bus, &mut self.l1);
                set.line_mut(way).set_state(next);
            }
            None => {
                self.bus.put_snoop_result(addr, crate::bus::SnoopResult::NoHit);
            }
        }
    }

    pub fn clear(&mut self) {
        self.sets.iter_mut().for_each(|slot| *slot = None);
        self.stats.reset();
    }

    pub fn print_valid_lines(&self, writer: &mut impl Write) -> std::io::Result<()> {
        let mut header_printed = false;
        for (index, slot) in self.sets.iter().enumerate() {
            let Some(set) = slot else { continue };
            let mut lines = set.valid_lines().peekable();
            if lines.peek().is_none() {
                continue;
            }
            if !header_printed {
                writeln!(writer, "-----------------------------")?;
                writeln!(writer, "Way  | Tag      | MESI State")?;
                writeln!(writer, "-----------------------------")?;
                header_printed = true;
            }
            writeln!(writer, "Valid Lines in Set {index:#010x}")?;
            writeln!(writer, "PLRU State Bits: {:b}", set.plru_bits())?;
            for (way, line) in lines {
                writeln!(writer, "{way:<4} | {:#08x} | {}", line.tag(), line.state().name())?;
            }
        }
        Ok(())
    }

    /// Public accessor over a single way's state, used by tests and
    /// diagnostics that need to bypass the processor/snoop entry
    /// points. Out-of-range `way` is a programmer error.
    pub fn state_of(&self, addr: u32, way: u32) -> LlcResult<Option<MesiState>> {
        let fields = self.geometry.decompose(addr);
        let Some(set) = self.sets.get(fields.index as usize).and_then(|s| s.as_ref()) else {
            return Ok(None);
        };
        if way >= set.associativity() {
            return Err(LlcError::Usage(format!(
                "way {way} out of range for {}-way set",
                set.associativity()
            )));
        }
        Ok(Some(set.line(way).state()))
    }
}
