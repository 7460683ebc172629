//! Typed internal errors for the "internal system-call failure" row of the
//! error table (§7). These never reach the interactive user as formatted
//! text — the REPL driver logs them at `debug` level and abandons the
//! current line, per spec.

use std::io;

/// A system-call failure in the executor or job control layer.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("waitpid() failed: {0}")]
    Wait(#[source] io::Error),

    #[error("setpgid() failed: {0}")]
    SetPgid(#[source] io::Error),
}

pub type ShellResult<T> = Result<T, ShellError>;
