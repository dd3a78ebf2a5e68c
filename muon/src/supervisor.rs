//! Child management: spawn, reap, respawn, and the hang scan.
//!
//! The supervisor is deliberately simple. Children do all the work; this
//! loop keeps the fleet at strength, recycles the slot of anything that
//! died, and kills anything the shared records show stuck inside the
//! kernel past the hang threshold.

use anyhow::{Context, Result};

use muon_core::{Child, KernelInvoke, RecState, Shm};
use muon_sys::calls::{self, ForkResult};
use muon_sys::consts::SIGKILL;
use muon_tables::{GenCtx, table};

/// Everything the run was configured with.
pub struct RunConfig {
    /// Fleet size.
    pub children: usize,
    /// Run seed; children derive their streams from it.
    pub seed: u64,
    /// Shared call budget for the whole run.
    pub max_calls: u64,
    /// Compat-ABI denominator handed to each child.
    pub compat_every: u64,
    /// Seconds a record may sit in `Before` before its child is shot.
    pub hang_threshold: i64,
}

/// The supervising side of the run.
pub struct Supervisor<'a> {
    shm: &'a Shm,
    cfg: RunConfig,
    /// Child pid per slot; `None` when the slot is idle.
    pids: Vec<Option<i32>>,
}

/// Splits a `wait4` status into (terminating signal, exit code).
fn decode_status(status: i32) -> (i32, i32) {
    (status & 0x7F, (status >> 8) & 0xFF)
}

impl<'a> Supervisor<'a> {
    /// Builds a supervisor over an initialized shared region.
    pub fn new(shm: &'a Shm, cfg: RunConfig) -> Self {
        let pids = vec![None; cfg.children];
        Self { shm, cfg, pids }
    }

    /// Runs the whole fleet to the call budget, then tears it down.
    ///
    /// # Errors
    ///
    /// Fails only on spawn problems; anything a child does to itself is
    /// handled by recycling the slot.
    pub fn run(&mut self) -> Result<()> {
        for slot in 0..self.cfg.children {
            self.spawn(slot)?;
        }

        while self.shm.stats.total() < self.cfg.max_calls {
            self.reap()?;
            if self.pids.iter().all(Option::is_none) {
                // Every child stopped on its own: table exhausted.
                log::warn!("all children stopped; ending run early");
                break;
            }
            self.hang_scan();
            let _ = calls::sleep_ms(250);
        }

        self.shutdown();
        Ok(())
    }

    /// Forks one child into `slot`. The child never returns from here.
    fn spawn(&mut self, slot: usize) -> Result<()> {
        match calls::fork().context("forking child")? {
            ForkResult::Child => {
                let ctx = GenCtx::for_child(self.cfg.seed, slot);
                let mut child = Child::new(
                    self.shm,
                    table(),
                    slot,
                    ctx,
                    KernelInvoke,
                    self.cfg.compat_every,
                );
                child.run(self.cfg.max_calls);
                calls::exit_now(0);
            }
            ForkResult::Parent(pid) => {
                log::debug!("spawned child{slot} as pid {pid}");
                self.pids[slot] = Some(pid);
                Ok(())
            }
        }
    }

    /// Reaps every child that has changed state, recycles its slot, and
    /// refills the fleet while budget remains.
    fn reap(&mut self) -> Result<()> {
        while let Ok(Some((pid, status))) = calls::wait4(-1, true) {
            let Some(slot) = self.pids.iter().position(|p| *p == Some(pid)) else {
                continue; // A throwaway the child already accounted for.
            };
            self.pids[slot] = None;

            let (signal, code) = decode_status(status);
            let record = &self.shm.children[slot].record;
            let last_state = record.snapshot().state;
            if signal != 0 && last_state != RecState::GoingAway {
                log::error!(
                    "child{slot} (pid {pid}) killed by signal {signal} in state {last_state:?}; \
                     see its previous record"
                );
            } else {
                log::debug!("child{slot} (pid {pid}) exited with code {code}");
            }

            // The owner is dead, so its lock can be broken and the slot
            // recycled for the replacement child.
            // SAFETY: pid was reaped above; nothing else writes this slot.
            unsafe { record.force_unlock() };
            record.lock().state = RecState::Unused;

            if self.shm.stats.total() < self.cfg.max_calls {
                self.spawn(slot)?;
            }
        }
        Ok(())
    }

    /// Kills any child whose record has sat in `Before` past the
    /// threshold: it went into the kernel and never came back.
    fn hang_scan(&self) {
        let Ok(now) = calls::gettimeofday() else {
            return;
        };
        for (slot, pid) in self.pids.iter().enumerate() {
            let Some(pid) = *pid else { continue };
            let (state, tv) = self.shm.children[slot].record.state_and_stamp();
            // A zero stamp means the child has not completed a call
            // yet; its first trap gets the benefit of the doubt.
            if state == RecState::Before
                && tv.tv_sec > 0
                && now.tv_sec - tv.tv_sec > self.cfg.hang_threshold
            {
                log::warn!(
                    "child{slot} (pid {pid}) stuck in the kernel for {}s; killing",
                    now.tv_sec - tv.tv_sec
                );
                let _ = calls::kill(pid, SIGKILL);
            }
        }
    }

    /// Kills and reaps whatever is still running.
    fn shutdown(&mut self) {
        for (slot, pid) in self.pids.iter_mut().enumerate() {
            if let Some(p) = pid.take() {
                let _ = calls::kill(p, SIGKILL);
                let _ = calls::wait4(p, false);
                log::debug!("child{slot} (pid {p}) shut down");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_decoding_separates_signal_and_code() {
        // Exited with code 3.
        assert_eq!(decode_status(3 << 8), (0, 3));
        // Killed by SIGKILL.
        assert_eq!(decode_status(9), (9, 0));
        // Killed by SIGSEGV.
        assert_eq!(decode_status(11), (11, 0));
    }

    #[test]
    fn fleet_starts_idle() {
        let shm = Box::new(Shm::new());
        let sup = Supervisor::new(
            &shm,
            RunConfig {
                children: 8,
                seed: 1,
                max_calls: 10,
                compat_every: 0,
                hang_threshold: 30,
            },
        );
        assert_eq!(sup.pids.len(), 8);
        assert!(sup.pids.iter().all(Option::is_none));
    }
}
