//! Last-level cache coherence simulator.
//!
//! Reads a trace of processor and snooped bus events, drives them
//! through the MESI controller over a set-associative, PLRU-managed
//! cache, and reports the resulting coherence traffic and statistics.

mod bus;
mod cache;
mod cache_set;
mod cli;
mod dispatch;
mod error;
mod geometry;
mod l1;
mod line;
mod mesi;
mod plru;
mod stats;
mod trace;

use std::env;
use std::io::{self, Write};
use std::process;

use clap::Parser;
use env_logger::Builder;

use bus::StubBusPort;
use cache::Cache;
use cli::{Cli, RunConfig};
use error::LlcError;
use l1::StubL1Port;
use trace::TraceReader;

fn main() {
    let cli = Cli::parse();
    let run_config = match cli.into_run_config() {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("llc-sim: {err}");
            process::exit(1);
        }
    };

    init_logging(&run_config);

    if let Err(err) = run(run_config) {
        eprintln!("llc-sim: {err}");
        process::exit(1);
    }
}

/// Seed the log filter from the resolved verbosity unless the user's
/// environment already overrides it, mirroring how the teacher's other
/// CLI tools defer to an environment-supplied filter ahead of the
/// binary's own default.
fn init_logging(run_config: &RunConfig) {
    let mut builder = Builder::new();
    match env::var("RUST_LOG") {
        Ok(filter) => {
            builder.parse_filters(&filter);
        }
        Err(_) => {
            builder.filter_level(run_config.verbosity.to_level_filter());
        }
    }
    builder.init();
}

fn run(run_config: RunConfig) -> Result<(), LlcError> {
    let mut reader = TraceReader::open(&run_config.trace_path)?;
    let mut cache = Cache::new(run_config.geometry, StubBusPort, StubL1Port);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    while let Some((opcode, addr)) = reader.next_record()? {
        dispatch::dispatch(&mut cache, opcode, addr, &mut out)
            .map_err(|source| LlcError::Io {
                path: run_config.trace_path.clone(),
                source,
            })?;
    }

    cache.statistics().print(&mut out).map_err(|source| LlcError::Io {
        path: run_config.trace_path.clone(),
        source,
    })?;
    out.flush().ok();
    Ok(())
}
