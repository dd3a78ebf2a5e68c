//! Command-line interface definitions for muon.

use clap::Parser;

/// Blind, table-driven system-call fuzzer.
#[derive(Parser)]
#[command(name = "muon", version, about)]
pub struct Cli {
    /// Number of fuzzing children to keep running.
    #[arg(long, short = 'c', default_value_t = 4)]
    pub children: usize,

    /// Seed for the run; 0 derives one from the clock and pid.
    #[arg(long, short = 's', default_value_t = 0)]
    pub seed: u64,

    /// Stop once this many calls have been made in total.
    #[arg(long, short = 'N', default_value_t = 100_000)]
    pub max_calls: u64,

    /// Fuzz only this syscall, by name.
    #[arg(long)]
    pub victim: Option<String>,

    /// Route roughly one call in N through the 32-bit compat ABI.
    /// 0 disables; ignored where the target has no compat ABI.
    #[arg(long, default_value_t = 0)]
    pub compat_every: u64,

    /// Seconds a record may sit pre-return before its child is killed.
    #[arg(long, default_value_t = 30)]
    pub hang_threshold: i64,

    /// Errors and the final summary only.
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Per-call diagnostics.
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}
