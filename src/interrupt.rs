//! Ctrl+C handling
//!
//! Outside a critical section an interrupt exits immediately; nothing has
//! been written yet because rendering happens in memory. Inside one (while
//! an artifact set is being committed) the interrupt is deferred until the
//! outermost section finishes, then reported as `ScaffoldError::Interrupted`.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::error::{Result, ScaffoldError};

static DEPTH: AtomicUsize = AtomicUsize::new(0);
static PENDING: AtomicBool = AtomicBool::new(false);

/// Exit code used when the user cancels
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

pub fn install_handler() -> Result<()> {
    ctrlc::set_handler(|| {
        if DEPTH.load(Ordering::SeqCst) > 0 {
            PENDING.store(true, Ordering::SeqCst);
        } else {
            eprintln!("\nCancelled. No files were modified.");
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    })
    .map_err(|e| ScaffoldError::Config(format!("Failed to set Ctrl+C handler: {}", e)))
}

/// Defers interrupts while alive. Sections nest.
pub struct CriticalSection {
    _private: (),
}

impl CriticalSection {
    pub fn enter() -> Self {
        DEPTH.fetch_add(1, Ordering::SeqCst);
        Self { _private: () }
    }

    /// Leave the section. The outermost one surfaces an interrupt that arrived meanwhile.
    pub fn finish(self) -> Result<()> {
        let outermost = DEPTH.load(Ordering::SeqCst) == 1;
        drop(self);
        if outermost && PENDING.swap(false, Ordering::SeqCst) {
            return Err(ScaffoldError::Interrupted);
        }
        Ok(())
    }
}

impl Drop for CriticalSection {
    fn drop(&mut self) {
        DEPTH.fetch_sub(1, Ordering::SeqCst);
    }
}
