//! Bus-side collaborator: the coherence traffic this LLC shares with
//! its peers. Only the interface is load-bearing for the MESI
//! controller; [`StubBusPort`] is the concrete default used outside of
//! tests.

use log::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusOp {
    Read,
    Write,
    Invalidate,
    Rwim,
}

impl BusOp {
    fn name(&self) -> &'static str {
        match self {
            BusOp::Read => "READ",
            BusOp::Write => "WRITE",
            BusOp::Invalidate => "INVALIDATE",
            BusOp::Rwim => "RWIM",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnoopResult {
    Hit,
    HitModified,
    NoHit,
}

impl SnoopResult {
    fn name(&self) -> &'static str {
        match self {
            SnoopResult::Hit => "HIT",
            SnoopResult::HitModified => "HITM",
            SnoopResult::NoHit => "NOHIT",
        }
    }
}

/// Everything the MESI controller needs from the shared bus.
pub trait BusPort {
    /// Emit a bus operation for `addr` and return immediately.
    fn bus_op(&mut self, op: BusOp, addr: u32);

    /// Query the aggregate response of every peer LLC snooping `addr`.
    fn get_snoop_result(&mut self, addr: u32) -> SnoopResult;

    /// Publish our own snoop response to a peer's bus operation.
    fn put_snoop_result(&mut self, addr: u32, result: SnoopResult);
}

/// Default bus port: derives a peer snoop response from the two
/// low-order bits of the address (`00` -> Hit, `01` -> HitModified,
/// `10`/`11` -> NoHit) and logs every action at info level.
#[derive(Debug, Default)]
pub struct StubBusPort;

impl BusPort for StubBusPort {
    fn bus_op(&mut self, op: BusOp, addr: u32) {
        let result = Self::derive_snoop_result(addr);
        info!(
            "BusOp: {}, Address: {addr:#010x}, Snoop Result: {}",
            op.name(),
            result.name()
        );
    }

    fn get_snoop_result(&mut self, addr: u32) -> SnoopResult {
        Self::derive_snoop_result(addr)
    }

    fn put_snoop_result(&mut self, addr: u32, result: SnoopResult) {
        info!("Address: {addr:#010x}, Snoop Result: {}", result.name());
    }
}

impl StubBusPort {
    fn derive_snoop_result(addr: u32) -> SnoopResult {
        match addr & 0b11 {
            0b00 => SnoopResult::Hit,
            0b01 => SnoopResult::HitModified,
            _ => SnoopResult::NoHit,
        }
    }
}
