//! Running access counters and the fixed-format summary block.

use std::io::{self, Write};

#[derive(Debug, Default, Clone, Copy)]
pub struct Statistics {
    reads: u64,
    writes: u64,
    hits: u64,
    misses: u64,
}

impl Statistics {
    pub fn record_read(&mut self) {
        self.reads += 1;
    }

    pub fn record_write(&mut self) {
        self.writes += 1;
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn reads(&self) -> u64 {
        self.reads
    }

    pub fn writes(&self) -> u64 {
        self.writes
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Write the fixed-format summary block to `writer`.
    pub fn print(&self, writer: &mut impl Write) -> io::Result<()> {
        writeln!(writer, "Cache Stats:")?;
        writeln!(writer, "  Reads:     {}", self.reads)?;
        writeln!(writer, "  Writes:    {}", self.writes)?;
        writeln!(writer, "  Hits:      {}", self.hits)?;
        writeln!(writer, "  Misses:    {}", self.misses)?;
        writeln!(writer, "  Hit Ratio: {:.1}%", self.hit_ratio() * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_ratio_is_zero_with_no_accesses() {
        let stats = Statistics::default();
        assert_eq!(stats.hit_ratio(), 0.0);
    }

    #[test]
    fn hit_ratio_reflects_hits_over_total() {
        let mut stats = Statistics::default();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert!((stats.hit_ratio() - (2.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn reset_clears_all_counters() {
        let mut stats = Statistics::default();
        stats.record_read();
        stats.record_hit();
        stats.reset();
        assert_eq!(stats.reads(), 0);
        assert_eq!(stats.hits(), 0);
    }
}
