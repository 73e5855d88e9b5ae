//! L1-side collaborator: the inclusion messages this LLC sends
//! upward whenever a line is filled, evicted or invalidated.

use log::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum L1Message {
    GetLine,
    SendLine,
    InvalidateLine,
    EvictLine,
}

impl L1Message {
    fn name(&self) -> &'static str {
        match self {
            L1Message::GetLine => "GETLINE",
            L1Message::SendLine => "SENDLINE",
            L1Message::InvalidateLine => "INVALIDATELINE",
            L1Message::EvictLine => "EVICTLINE",
        }
    }
}

/// Everything the cache needs to preserve inclusion with L1.
pub trait L1Port {
    fn send(&mut self, msg: L1Message, addr: u32);
}

/// Default L1 port: fire-and-forget, observable only through logs.
#[derive(Debug, Default)]
pub struct StubL1Port;

impl L1Port for StubL1Port {
    fn send(&mut self, msg: L1Message, addr: u32) {
        info!("L2: {}, Address: {addr:#010x}", msg.name());
    }
}
