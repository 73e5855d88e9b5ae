//! MESI coherence controller: pure transition logic driven by
//! processor requests and snooped bus traffic. The controller never
//! touches cache storage directly; it only decides the next state and
//! drives the bus/L1 ports.

use log::warn;

use crate::bus::{BusOp, BusPort, SnoopResult};
use crate::l1::{L1Message, L1Port};
use crate::line::MesiState;

/// Handle a processor-originated read or write against a line
/// currently in `state`, returning the new state. Emits a bus
/// operation where the protocol requires one.
pub fn on_processor(
    state: MesiState,
    addr: u32,
    is_write: bool,
    bus: &mut dyn BusPort,
) -> MesiState {
    use MesiState::*;
    match (state, is_write) {
        (Invalid, false) => {
            bus.bus_op(BusOp::Read, addr);
            match bus.get_snoop_result(addr) {
                SnoopResult::Hit | SnoopResult::HitModified => Shared,
                SnoopResult::NoHit => Exclusive,
            }
        }
        (Invalid, true) => {
            bus.bus_op(BusOp::Rwim, addr);
            Modified
        }
        (Shared, false) => Shared,
        (Shared, true) => {
            bus.bus_op(BusOp::Invalidate, addr);
            Modified
        }
        (Exclusive, false) => Exclusive,
        (Exclusive, true) => Modified,
        (Modified, false) => Modified,
        (Modified, true) => Modified,
    }
}

/// Handle a bus operation snooped from a peer against a line currently
/// in `state`. Publishes our snoop response and, for a line we hold
/// valid, drives the L1 inclusion messages and any write-back.
pub fn on_snoop(
    state: MesiState,
    bus_op: BusOp,
    addr: u32,
    bus: &mut dyn BusPort,
    l1: &mut dyn L1Port,
) -> MesiState {
    use MesiState::*;
    match (state, bus_op) {
        (Invalid, _) => {
            bus.put_snoop_result(addr, SnoopResult::NoHit);
            Invalid
        }
        (Shared | Exclusive, BusOp::Read) => {
            bus.put_snoop_result(addr, SnoopResult::Hit);
            Shared
        }
        (Shared | Exclusive, BusOp::Rwim | BusOp::Invalidate) => {
            bus.put_snoop_result(addr, SnoopResult::Hit);
            l1.send(L1Message::InvalidateLine, addr);
            Invalid
        }
        (Modified, BusOp::Read) => {
            bus.put_snoop_result(addr, SnoopResult::HitModified);
            l1.send(L1Message::GetLine, addr);
            bus.bus_op(BusOp::Write, addr);
            Shared
        }
        (Modified, BusOp::Rwim | BusOp::Invalidate) => {
            bus.put_snoop_result(addr, SnoopResult::HitModified);
            l1.send(L1Message::GetLine, addr);
            bus.bus_op(BusOp::Write, addr);
            l1.send(L1Message::InvalidateLine, addr);
            Invalid
        }
        (Shared | Exclusive | Modified, BusOp::Write) => {
            warn!(
                "protocol inconsistency: observed peer Write on address {addr:#010x} \
                 while holding a valid copy in {:?}; ignoring",
                state
            );
            state
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::StubBusPort;
    use crate::l1::StubL1Port;

    #[test]
    fn invalid_read_with_nohit_becomes_exclusive() {
        let mut bus = StubBusPort;
        // 0x...02 -> low bits 10 -> NoHit
        let next = on_processor(MesiState::Invalid, 0x1000_0002, false, &mut bus);
        assert_eq!(next, MesiState::Exclusive);
    }

    #[test]
    fn invalid_read_with_hit_becomes_shared() {
        let mut bus = StubBusPort;
        // low bits 00 -> Hit
        let next = on_processor(MesiState::Invalid, 0x1000_0000, false, &mut bus);
        assert_eq!(next, MesiState::Shared);
    }

    #[test]
    fn invalid_write_becomes_modified() {
        let mut bus = StubBusPort;
        let next = on_processor(MesiState::Invalid, 0x1000_0002, true, &mut bus);
        assert_eq!(next, MesiState::Modified);
    }

    #[test]
    fn shared_write_becomes_modified() {
        let mut bus = StubBusPort;
        let next = on_processor(MesiState::Shared, 0x1000_0002, true, &mut bus);
        assert_eq!(next, MesiState::Modified);
    }

    #[test]
    fn modified_snoop_read_writes_back_and_goes_shared() {
        let mut bus = StubBusPort;
        let mut l1 = StubL1Port;
        let next = on_snoop(MesiState::Modified, BusOp::Read, 0x2000_0000, &mut bus, &mut l1);
        assert_eq!(next, MesiState::Shared);
    }

    #[test]
    fn modified_snoop_invalidate_writes_back_and_goes_invalid() {
        let mut bus = StubBusPort;
        let mut l1 = StubL1Port;
        let next = on_snoop(
            MesiState::Modified,
            BusOp::Invalidate,
            0x2000_0000,
            &mut bus,
            &mut l1,
        );
        assert_eq!(next, MesiState::Invalid);
    }

    #[test]
    fn invalid_snoop_stays_invalid() {
        let mut bus = StubBusPort;
        let mut l1 = StubL1Port;
        let next = on_snoop(MesiState::Invalid, BusOp::Rwim, 0x2000_0000, &mut bus, &mut l1);
        assert_eq!(next, MesiState::Invalid);
    }

    #[test]
    fn peer_write_while_valid_is_ignored() {
        let mut bus = StubBusPort;
        let mut l1 = StubL1Port;
        let next = on_snoop(MesiState::Shared, BusOp::Write, 0x2000_0000, &mut bus, &mut l1);
        assert_eq!(next, MesiState::Shared);
    }
}
