//! Command-line surface: flags in, a validated [`RunConfig`] out.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

use crate::error::{LlcError, LlcResult};
use crate::geometry::CacheGeometry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Protocol {
    Mesi,
    Msi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Silent,
    Normal,
    Debug,
}

impl Verbosity {
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            Verbosity::Silent => LevelFilter::Warn,
            Verbosity::Normal => LevelFilter::Info,
            Verbosity::Debug => LevelFilter::Debug,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about = "Last-level cache coherence simulator", long_about = None)]
pub struct Cli {
    /// Trace file to replay.
    #[arg(short = 'f', long = "file", value_name = "TRACE")]
    pub file: PathBuf,

    /// Total cache capacity, in MiB.
    #[arg(long, default_value_t = 16)]
    pub capacity: u32,

    /// Cache line size, in bytes.
    #[arg(long = "line-size", default_value_t = 64)]
    pub line_size: u32,

    /// Number of ways per set.
    #[arg(long, default_value_t = 16)]
    pub associativity: u32,

    /// Coherence protocol to simulate. Only `mesi` is implemented.
    #[arg(long, value_enum, default_value_t = Protocol::Mesi)]
    pub protocol: Protocol,

    /// Suppress coherence action logging; only the final summary and
    /// opcode-9 dumps are printed.
    #[arg(short = 's', long, conflicts_with = "debug")]
    pub silent: bool,

    /// Emit internal tracing in addition to coherence actions.
    #[arg(short = 'd', long)]
    pub debug: bool,
}

pub struct RunConfig {
    pub geometry: CacheGeometry,
    pub trace_path: PathBuf,
    pub verbosity: Verbosity,
}

impl Cli {
    pub fn into_run_config(self) -> LlcResult<RunConfig> {
        if self.protocol == Protocol::Msi {
            return Err(LlcError::Configuration(
                "MSI is not implemented; pass --protocol mesi".into(),
            ));
        }

        let capacity_bytes = self.capacity.checked_mul(1024 * 1024).ok_or_else(|| {
            LlcError::Configuration(format!("capacity {} MiB overflows", self.capacity))
        })?;
        let geometry = CacheGeometry::new(capacity_bytes, self.line_size, self.associativity)?;

        let verbosity = if self.debug {
            Verbosity::Debug
        } else if self.silent {
            Verbosity::Silent
        } else {
            Verbosity::Normal
        };

        Ok(RunConfig {
            geometry,
            trace_path: self.file,
            verbosity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_flag_set_produces_matching_geometry() {
        let cli = Cli {
            file: PathBuf::from("trace.txt"),
            capacity: 16,
            line_size: 64,
            associativity: 16,
            protocol: Protocol::Mesi,
            silent: false,
            debug: false,
        };
        let run_config = cli.into_run_config().unwrap();
        assert_eq!(run_config.geometry.num_sets(), 16384);
        assert_eq!(run_config.geometry.tag_bits(), 12);
        assert_eq!(run_config.verbosity, Verbosity::Normal);
    }

    #[test]
    fn msi_protocol_is_rejected() {
        let cli = Cli {
            file: PathBuf::from("trace.txt"),
            capacity: 16,
            line_size: 64,
            associativity: 16,
            protocol: Protocol::Msi,
            silent: false,
            debug: false,
        };
        assert!(matches!(
            cli.into_run_config(),
            Err(LlcError::Configuration(_))
        ));
    }

    #[test]
    fn debug_takes_precedence_encoding_order() {
        let cli = Cli {
            file: PathBuf::from("trace.txt"),
            capacity: 16,
            line_size: 64,
            associativity: 16,
            protocol: Protocol::Mesi,
            silent: false,
            debug: true,
        };
        let run_config = cli.into_run_config().unwrap();
        assert_eq!(run_config.verbosity, Verbosity::Debug);
    }
}
