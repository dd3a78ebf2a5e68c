//! muon: a blind, table-driven system-call fuzzer.
//!
//! Pipeline: parse CLI → map the shared region → activate the table →
//!           fork the fleet → supervise to the call budget → summarize.

mod cli;
mod logger;
mod supervisor;

use anyhow::{Context, Result, bail};
use clap::Parser;

use muon_core::{MAX_CHILDREN, SharedRegion};
use muon_sys::{Abi, calls, compat_available};
use muon_tables::table;

/// Derives a run seed from the clock and pid when none was given.
fn derive_seed() -> u64 {
    let tv = calls::gettimeofday().unwrap_or_default();
    let pid = u64::from(calls::getpid().unsigned_abs());
    (tv.tv_sec as u64) ^ ((tv.tv_usec as u64) << 20) ^ (pid << 48)
}

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    logger::init(cli.quiet, cli.verbose).context("installing logger")?;

    if cli.children == 0 || cli.children > MAX_CHILDREN {
        bail!("children must be between 1 and {MAX_CHILDREN}");
    }

    let compat_every = if compat_available() {
        cli.compat_every
    } else {
        if cli.compat_every > 0 {
            log::warn!("no compat ABI on this target; --compat-every ignored");
        }
        0
    };

    let seed = if cli.seed == 0 { derive_seed() } else { cli.seed };

    let region = SharedRegion::create().context("mapping the shared region")?;
    let shm = region.shm();

    let t = table();
    match cli.victim.as_deref() {
        Some(name) => {
            if t.activate_only(&shm.active, name, Abi::Native).is_none() {
                bail!("unknown syscall '{name}'");
            }
            if compat_every > 0 {
                let _ = t.activate_only(&shm.active, name, Abi::Compat);
            }
            log::info!("single-victim run: {name}");
        }
        None => {
            t.activate_all(&shm.active, Abi::Native);
            if compat_every > 0 {
                t.activate_all(&shm.active, Abi::Compat);
            }
        }
    }

    log::info!(
        "muon: seed 0x{seed:x}, {} children, budget {} calls, {} of {} entries active",
        cli.children,
        cli.max_calls,
        shm.active.remaining(Abi::Native),
        t.count(),
    );

    let mut sup = supervisor::Supervisor::new(
        shm,
        supervisor::RunConfig {
            children: cli.children,
            seed,
            max_calls: cli.max_calls,
            compat_every,
            hang_threshold: cli.hang_threshold,
        },
    );
    sup.run()?;

    println!(
        "done: {} calls, {} succeeded, {} failed",
        shm.stats.total(),
        shm.stats.successes(),
        shm.stats.failures()
    );
    Ok(())
}
