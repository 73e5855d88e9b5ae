//! One set of ways, tag storage and PLRU replacement bookkeeping.

use crate::line::{CacheLine, MesiState};
use crate::plru::PlruTree;

/// The prior contents of a way that was displaced by an allocation.
#[derive(Debug, Clone, Copy)]
pub struct Victim {
    pub tag: u32,
    pub state: MesiState,
}

pub struct CacheSet {
    ways: Vec<CacheLine>,
    plru: PlruTree,
}

impl CacheSet {
    pub fn new(associativity: u32) -> Self {
        Self {
            ways: vec![CacheLine::default(); associativity as usize],
            plru: PlruTree::new(associativity),
        }
    }

    /// Search for `tag` among valid ways. When `update_recency` is
    /// true and the tag is found, mark that way most-recently-used.
    /// Processor accesses pass `true`; snoops pass `false` so that
    /// peer traffic never perturbs our own PLRU ordering.
    pub fn search(&mut self, tag: u32, update_recency: bool) -> Option<u32> {
        let way = self
            .ways
            .iter()
            .position(|line| line.is_valid() && line.tag() == tag)?;
        if update_recency {
            self.plru.access(way as u32);
        }
        Some(way as u32)
    }

    pub fn line(&self, way: u32) -> &CacheLine {
        &self.ways[way as usize]
    }

    pub fn line_mut(&mut self, way: u32) -> &mut CacheLine {
        &mut self.ways[way as usize]
    }

    /// Choose a destination for a new line with `tag`/`initial_state`:
    /// an invalid way if one exists, else the PLRU victim. The chosen
    /// way is overwritten and marked most-recently-used. Returns the
    /// prior contents of the way when an existing valid line was
    /// displaced.
    pub fn allocate(&mut self, tag: u32, initial_state: MesiState) -> (Option<Victim>, u32) {
        if let Some(way) = self.ways.iter().position(|line| !line.is_valid()) {
            self.ways[way] = CacheLine::new(tag, initial_state);
            self.plru.access(way as u32);
            return (None, way as u32);
        }

        let way = self.plru.victim();
        let victim_line = self.ways[way as usize];
        debug_assert_ne!(
            victim_line.tag(),
            tag,
            "allocate must only run after a confirmed miss for this tag"
        );
        self.ways[way as usize] = CacheLine::new(tag, initial_state);
        self.plru.access(way);
        (
            Some(Victim {
                tag: victim_line.tag(),
                state: victim_line.state(),
            }),
            way,
        )
    }

    pub fn plru_bits(&self) -> u32 {
        self.plru.bits()
    }

    pub fn associativity(&self) -> u32 {
        self.ways.len() as u32
    }

    /// Iterate over (way, line) pairs for every currently valid line,
    /// in way order. Used by the opcode-9 diagnostic dump.
    pub fn valid_lines(&self) -> impl Iterator<Item = (u32, &CacheLine)> {
        self.ways
            .iter()
            .enumerate()
            .filter(|(_, line)| line.is_valid())
            .map(|(way, line)| (way as u32, line))
    }
}
