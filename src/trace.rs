//! Line-oriented trace file reader.
//!
//! Each record is `<opcode> <address_hex>` with the address omitted
//! for opcodes that don't need one. Malformed lines are logged and
//! skipped rather than aborting the run.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::{LlcError, LlcResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    L1DataRead,
    L1DataWrite,
    L1InstructionRead,
    SnoopRead,
    SnoopWrite,
    SnoopRwim,
    SnoopInvalidate,
    ClearCache,
    PrintValidLines,
    Unknown(u8),
}

impl Opcode {
    fn from_code(code: u8) -> Self {
        match code {
            0 => Opcode::L1DataRead,
            1 => Opcode::L1DataWrite,
            2 => Opcode::L1InstructionRead,
            3 => Opcode::SnoopRead,
            4 => Opcode::SnoopWrite,
            5 => Opcode::SnoopRwim,
            6 => Opcode::SnoopInvalidate,
            8 => Opcode::ClearCache,
            9 => Opcode::PrintValidLines,
            other => Opcode::Unknown(other),
        }
    }

    fn requires_address(&self) -> bool {
        !matches!(self, Opcode::ClearCache | Opcode::PrintValidLines)
    }
}

pub struct TraceReader {
    path: PathBuf,
    reader: Option<BufReader<File>>,
}

impl TraceReader {
    pub fn open(path: impl AsRef<Path>) -> LlcResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| LlcError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            reader: Some(BufReader::new(file)),
        })
    }

    /// Close the underlying file handle ahead of drop, for the
    /// early-termination and fatal-error paths named in §5. Idempotent:
    /// calling this twice, or calling it and then letting the value
    /// drop, never double-closes anything.
    pub fn close(&mut self) {
        self.reader = None;
    }

    /// Read and parse the next record, skipping blank and malformed
    /// lines. Returns `None` at end of file.
    pub fn next_record(&mut self) -> LlcResult<Option<(Opcode, Option<u32>)>> {
        loop {
            let Some(reader) = self.reader.as_mut() else {
                return Ok(None);
            };
            let mut line = String::new();
            let bytes_read = reader.read_line(&mut line).map_err(|source| LlcError::Io {
                path: self.path.clone(),
                source,
            })?;
            if bytes_read == 0 {
                info!("End of trace file reached.");
                self.close();
                return Ok(None);
            }

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let mut parts = line.split_whitespace();
            let Some(op_token) = parts.next() else {
                continue;
            };
            let Ok(code) = op_token.parse::<u8>() else {
                warn!("invalid line format, opcode token {op_token:?} is not a valid integer; skipping");
                continue;
            };
            let opcode = Opcode::from_code(code);

            if !opcode.requires_address() {
                return Ok(Some((opcode, None)));
            }

            let Some(addr_token) = parts.next() else {
                warn!("missing address for command {code}; skipping");
                continue;
            };
            let trimmed = addr_token.trim_start_matches("0x").trim_start_matches("0X");
            let Ok(addr) = u32::from_str_radix(trimmed, 16) else {
                warn!("invalid address format {addr_token:?}; skipping");
                continue;
            };

            return Ok(Some((opcode, Some(addr))));
        }
    }
}

impl Drop for TraceReader {
    fn drop(&mut self) {
        self.close();
    }
}
