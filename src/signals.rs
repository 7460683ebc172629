//! Async-signal-safe SIGINT/SIGTSTP/SIGCHLD handling (§4.4).
//!
//! Handlers touch only two atomics and the `kill` syscall — no allocation,
//! no formatted I/O, no job-table mutation. All of that happens on the main
//! thread, driven by [`take_pending_reap`].

use std::io;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

static FOREGROUND_PGID: AtomicI32 = AtomicI32::new(0);
static PENDING_REAP: AtomicBool = AtomicBool::new(false);

/// Record the pgid the executor (or `fg`) is currently waiting on
/// synchronously, so SIGINT/SIGTSTP know where to forward.
pub fn set_foreground_pgid(pgid: libc::pid_t) {
    FOREGROUND_PGID.store(pgid, Ordering::SeqCst);
}

pub fn clear_foreground_pgid() {
    FOREGROUND_PGID.store(0, Ordering::SeqCst);
}

/// Read and clear the pending-reap flag; true if SIGCHLD fired since the
/// last call (§4.7 step 1).
pub fn take_pending_reap() -> bool {
    PENDING_REAP.swap(false, Ordering::SeqCst)
}

extern "C" fn forward_to_foreground(signal: libc::c_int) {
    let pgid = FOREGROUND_PGID.load(Ordering::SeqCst);
    if pgid > 0 {
        unsafe {
            libc::kill(-pgid, signal);
        }
    }
}

extern "C" fn mark_pending_reap(_signal: libc::c_int) {
    PENDING_REAP.store(true, Ordering::SeqCst);
}

/// Register the shell's SIGINT/SIGTSTP/SIGCHLD handlers and ignore SIGPIPE
/// (§4.4). Call once at startup, before the first prompt.
pub fn install() -> io::Result<()> {
    install_handler(libc::SIGINT, forward_to_foreground as usize)?;
    install_handler(libc::SIGTSTP, forward_to_foreground as usize)?;
    install_handler(libc::SIGCHLD, mark_pending_reap as usize)?;
    ignore(libc::SIGPIPE)?;
    Ok(())
}

fn install_handler(signal: libc::c_int, handler: usize) -> io::Result<()> {
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = handler;
        action.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&mut action.sa_mask);
        if libc::sigaction(signal, &action, std::ptr::null_mut()) != 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

fn ignore(signal: libc::c_int) -> io::Result<()> {
    unsafe {
        if libc::signal(signal, libc::SIG_IGN) == libc::SIG_ERR {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

/// Reset SIGINT/SIGTSTP/SIGPIPE to their default dispositions. Called in a
/// child after fork, before exec (§4.4, §4.5 redirection primitive step 1) —
/// so a forwarded Ctrl-C/Ctrl-Z acts on the child normally, and a pipeline
/// stage whose downstream reader exits just dies on SIGPIPE instead of
/// taking the shell down with it.
pub fn reset_child_dispositions() {
    unsafe {
        libc::signal(libc::SIGINT, libc::SIG_DFL);
        libc::signal(libc::SIGTSTP, libc::SIG_DFL);
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}
