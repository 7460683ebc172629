//! Unix-only process/job-control primitives shared by the executor,
//! builtins, and signal core (§4.4/§4.5): `setpgid`/`getpgid`/`waitpid`/
//! `kill` wrappers that retry on `EINTR` and translate failures the rest of
//! the crate cares about into [`ShellError`].
//!
//! No `tcsetpgrp` here — the shell does not take over the controlling
//! terminal (§9 "Simplification adopted"); `foreground_pgid` plus signal
//! forwarding is sufficient for the behaviors this crate implements.

use std::io;

use crate::error::{ShellError, ShellResult};
use crate::status::{self, WaitOutcome};

/// `setpgid(pid, pgid)`, tolerant of the child having already exec'd or
/// exited (`EACCES`/`ESRCH`) since callers make this call redundantly from
/// both sides of a fork (§9 "Process groups").
pub fn set_process_group(pid: libc::pid_t, pgid: libc::pid_t) -> ShellResult<()> {
    loop {
        let rc = unsafe { libc::setpgid(pid, pgid) };
        if rc == 0 {
            return Ok(());
        }
        let err = io::Error::last_os_error();
        match err.raw_os_error() {
            Some(code) if code == libc::EINTR => continue,
            Some(code) if code == libc::EACCES || code == libc::ESRCH => return Ok(()),
            _ => return Err(ShellError::SetPgid(err)),
        }
    }
}

/// `getpgid(pid)`, falling back to `pid` itself on failure — a child that
/// has just exited may no longer belong to a queryable group (§4.7 step 1).
pub fn process_group_id_or_self(pid: libc::pid_t) -> libc::pid_t {
    loop {
        let rc = unsafe { libc::getpgid(pid) };
        if rc >= 0 {
            return rc;
        }
        if io::Error::last_os_error().raw_os_error() == Some(libc::EINTR) {
            continue;
        }
        return pid;
    }
}

/// `kill(-pgid, signal)` — forward a terminal signal to a whole group.
pub fn send_signal_to_group(pgid: libc::pid_t, signal: libc::c_int) -> io::Result<()> {
    if pgid <= 0 {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "invalid process group id"));
    }
    loop {
        let rc = unsafe { libc::kill(-pgid, signal) };
        if rc == 0 {
            return Ok(());
        }
        let err = io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::EINTR) {
            continue;
        }
        return Err(err);
    }
}

/// The aggregate outcome of waiting out an entire process group (§4.5
/// "States"): any stopped member makes the group Stopped, otherwise Done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupWaitOutcome {
    Stopped,
    Done,
}

/// Block until every current member of process group `pgid` has exited or
/// been signalled, OR until any one member stops — stop-reporting enabled.
/// A stopped-but-alive child produces no further `waitpid` event until
/// continued or killed, so this returns as soon as the first `WIFSTOPPED`
/// is observed rather than looping toward `ECHILD`. Used for both the
/// executor's foreground wait and `fg`'s wait (§4.5, §4.6).
pub fn wait_for_group(pgid: libc::pid_t) -> ShellResult<GroupWaitOutcome> {
    loop {
        let mut raw_status: libc::c_int = 0;
        let rc = unsafe { libc::waitpid(-pgid, &mut raw_status, libc::WUNTRACED) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            return match err.raw_os_error() {
                Some(code) if code == libc::EINTR => continue,
                Some(code) if code == libc::ECHILD => Ok(GroupWaitOutcome::Done),
                _ => Err(ShellError::Wait(err)),
            };
        }
        if let Some(WaitOutcome::Stopped) = status::decode(raw_status) {
            return Ok(GroupWaitOutcome::Stopped);
        }
    }
}

/// Non-blocking poll for any child with stop/continue/exit reporting
/// (§4.7 step 1). Returns `None` once there is nothing left to report.
pub fn poll_any_child() -> io::Result<Option<(libc::pid_t, WaitOutcome)>> {
    loop {
        let mut raw_status: libc::c_int = 0;
        let rc = unsafe {
            libc::waitpid(-1, &mut raw_status, libc::WUNTRACED | libc::WCONTINUED | libc::WNOHANG)
        };
        if rc == 0 {
            return Ok(None);
        }
        if rc < 0 {
            let err = io::Error::last_os_error();
            return match err.raw_os_error() {
                Some(code) if code == libc::EINTR => continue,
                Some(code) if code == libc::ECHILD => Ok(None),
                _ => Err(err),
            };
        }
        match status::decode(raw_status) {
            Some(outcome) => return Ok(Some((rc, outcome))),
            None => continue,
        }
    }
}
