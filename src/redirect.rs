//! File-based redirections applied inside the child, after fork, before
//! exec (§4.5 redirection primitive steps 3-4), plus the pre-fork input
//! probe both executor paths run before committing to a fork (§4.5).

use std::ffi::CString;
use std::io;

use crate::parser::Command;

/// Probe a command's input redirection, if any, before forking. `Ok(())`
/// means either there is no input redirection or the file opened fine.
/// `Err(())` means the file could not be opened for reading — the caller
/// prints one blank line and treats the line as complete (§4.5, §7
/// "Missing input file").
pub fn probe_input_file(command: &Command) -> Result<(), ()> {
    match &command.in_file {
        None => Ok(()),
        Some(path) => std::fs::File::open(path).map(|_| ()).map_err(|_| ()),
    }
}

/// Apply the up-to-three filename redirections on `command`: open, dup2
/// over the matching standard fd, close the original. An open failure
/// exits the process with the `open()` errno (§4.5 step 4). Runs only in
/// the child, after fork, before exec.
pub fn apply_file_redirections(command: &Command) {
    if let Some(path) = &command.in_file {
        open_and_dup(path, libc::O_RDONLY, 0o644, libc::STDIN_FILENO);
    }
    if let Some(path) = &command.out_file {
        open_and_dup(
            path,
            libc::O_WRONLY | libc::O_CREAT | libc::O_TRUNC,
            0o664,
            libc::STDOUT_FILENO,
        );
    }
    if let Some(path) = &command.err_file {
        open_and_dup(
            path,
            libc::O_WRONLY | libc::O_CREAT | libc::O_TRUNC,
            0o664,
            libc::STDERR_FILENO,
        );
    }
}

/// dup2 an inherited pipe fd over `target_fd`, closing the original
/// (§4.5 redirection primitive steps 2-3).
pub fn dup2_pipe_fd(fd: libc::c_int, target_fd: libc::c_int) {
    if fd != target_fd {
        unsafe {
            libc::dup2(fd, target_fd);
            libc::close(fd);
        }
    }
}

fn open_and_dup(path: &str, flags: libc::c_int, mode: libc::mode_t, target_fd: libc::c_int) {
    let c_path = match CString::new(path) {
        Ok(c) => c,
        Err(_) => std::process::exit(libc::EINVAL),
    };
    let fd = unsafe { libc::open(c_path.as_ptr(), flags, mode as libc::c_uint) };
    if fd < 0 {
        let errno = io::Error::last_os_error().raw_os_error().unwrap_or(1);
        std::process::exit(errno);
    }
    dup2_pipe_fd(fd, target_fd);
}
