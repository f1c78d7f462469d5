//! Signal handling.
//!
//! Only the main thread observes signals: every thread spawn happens under
//! [`BlockedSignals`], so workers inherit a fully-blocked mask. The
//! termination signals latch a shutdown flag from a minimal handler;
//! SIGPIPE is ignored so a dead peer surfaces as a write error instead of
//! killing the process.
//!
//! # Safety
//!
//! This module uses unsafe code for `sigaction`/`pthread_sigmask`. The
//! handler only stores into an atomic through a pre-initialized global
//! slot, which is async-signal-safe.

#![allow(unsafe_code)]

use std::io;
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use once_cell::sync::OnceCell;

static SHUTDOWN_FLAG: OnceCell<Arc<AtomicBool>> = OnceCell::new();

extern "C" fn latch_shutdown(_signo: libc::c_int) {
    if let Some(flag) = SHUTDOWN_FLAG.get() {
        flag.store(true, Ordering::SeqCst);
    }
}

/// Route SIGHUP/SIGINT/SIGQUIT/SIGTERM into `flag`.
///
/// The first registered flag wins; later calls keep routing to it.
pub fn install_shutdown_handlers(flag: Arc<AtomicBool>) -> io::Result<()> {
    let _ = SHUTDOWN_FLAG.set(flag);
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        let handler: extern "C" fn(libc::c_int) = latch_shutdown;
        action.sa_sigaction = handler as usize;
        action.sa_flags = 0;
        libc::sigfillset(&mut action.sa_mask);
        for signo in [libc::SIGHUP, libc::SIGINT, libc::SIGQUIT, libc::SIGTERM] {
            if libc::sigaction(signo, &action, ptr::null_mut()) != 0 {
                return Err(io::Error::last_os_error());
            }
        }
    }
    Ok(())
}

/// Ignore SIGPIPE process-wide.
pub fn ignore_sigpipe() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_IGN);
    }
}

/// RAII guard: blocks every signal on the calling thread, restoring the
/// previous mask on drop. Threads spawned while the guard is live inherit
/// the fully-blocked mask.
pub struct BlockedSignals {
    previous: libc::sigset_t,
}

impl BlockedSignals {
    pub fn new() -> Self {
        unsafe {
            let mut all: libc::sigset_t = std::mem::zeroed();
            libc::sigfillset(&mut all);
            let mut previous: libc::sigset_t = std::mem::zeroed();
            libc::pthread_sigmask(libc::SIG_SETMASK, &all, &mut previous);
            BlockedSignals { previous }
        }
    }
}

impl Default for BlockedSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BlockedSignals {
    fn drop(&mut self) {
        unsafe {
            libc::pthread_sigmask(libc::SIG_SETMASK, &self.previous, ptr::null_mut());
        }
    }
}
