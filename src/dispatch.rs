//! Maps trace opcodes onto `Cache` entry points.

use std::io::Write;

use log::debug;

use crate::bus::{BusOp, BusPort};
use crate::cache::Cache;
use crate::l1::L1Port;
use crate::trace::Opcode;

/// Dispatch one decoded trace record into `cache`. `addr` is `None`
/// only for `ClearCache`/`PrintValidLines`, which don't carry one.
pub fn dispatch<B: BusPort, L: L1Port>(
    cache: &mut Cache<B, L>,
    opcode: Opcode,
    addr: Option<u32>,
    stdout: &mut impl Write,
) -> std::io::Result<()> {
    match opcode {
        Opcode::L1DataRead | Opcode::L1InstructionRead => {
            cache.pr_read(addr.expect("address required for read opcodes"));
        }
        Opcode::L1DataWrite => {
            cache.pr_write(addr.expect("address required for write opcode"));
        }
        Opcode::SnoopRead => cache.handle_snoop(BusOp::Read, addr.expect("address required")),
        Opcode::SnoopWrite => cache.handle_snoop(BusOp::Write, addr.expect("address required")),
        Opcode::SnoopRwim => cache.handle_snoop(BusOp::Rwim, addr.expect("address required")),
        Opcode::SnoopInvalidate => {
            cache.handle_snoop(BusOp::Invalidate, addr.expect("address required"))
        }
        Opcode::ClearCache => cache.clear(),
        Opcode::PrintValidLines => cache.print_valid_lines(stdout)?,
        Opcode::Unknown(code) => debug!("unknown opcode: {code}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::StubBusPort;
    use crate::geometry::CacheGeometry;
    use crate::l1::StubL1Port;

    #[test]
    fn read_write_and_snoop_opcodes_all_route_without_panicking() {
        let geometry = CacheGeometry::default_geometry();
        let mut cache = Cache::new(geometry, StubBusPort, StubL1Port);
        let mut sink = Vec::new();

        dispatch(&mut cache, Opcode::L1DataRead, Some(0x10), &mut sink).unwrap();
        dispatch(&mut cache, Opcode::L1DataWrite, Some(0x20), &mut sink).unwrap();
        dispatch(&mut cache, Opcode::L1InstructionRead, Some(0x30), &mut sink).unwrap();
        dispatch(&mut cache, Opcode::SnoopRead, Some(0x10), &mut sink).unwrap();
        dispatch(&mut cache, Opcode::SnoopWrite, Some(0x10), &mut sink).unwrap();
        dispatch(&mut cache, Opcode::SnoopRwim, Some(0x10), &mut sink).unwrap();
        dispatch(&mut cache, Opcode::SnoopInvalidate, Some(0x10), &mut sink).unwrap();
        dispatch(&mut cache, Opcode::ClearCache, None, &mut sink).unwrap();
        dispatch(&mut cache, Opcode::PrintValidLines, None, &mut sink).unwrap();
        dispatch(&mut cache, Opcode::Unknown(7), None, &mut sink).unwrap();

        assert_eq!(cache.statistics().reads(), 0); // cleared by opcode 8
        assert_eq!(cache.statistics().writes(), 0);
    }
}
