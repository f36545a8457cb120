use anyhow::{Context, Result, bail};
use pweb_config::paths;
use std::path::Path;
use tracing::debug;

/// Read the server pid. `Ok(None)` when no pid file exists.
pub(crate) fn read_pid(pid_path: &Path) -> Result<Option<i32>> {
    let content = match std::fs::read_to_string(pid_path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", pid_path.display()));
        }
    };
    let pid: i32 = content
        .trim()
        .parse()
        .with_context(|| format!("Invalid pid in {}: {:?}", pid_path.display(), content.trim()))?;
    // kill(2) treats 0 and negative pids as process groups.
    if pid <= 0 {
        bail!("Refusing to signal pid {pid} from {}", pid_path.display());
    }
    Ok(Some(pid))
}

fn send_sigterm(pid: i32) -> Result<()> {
    // SAFETY: `kill` has no memory-safety preconditions; `pid` is a positive
    // process id validated by `read_pid`.
    let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
    if rc != 0 {
        return Err(std::io::Error::last_os_error())
            .with_context(|| format!("Failed to send SIGTERM to pid {pid}"));
    }
    Ok(())
}

/// `pweb stop`: signal the server recorded in `<root>/var/rnet.pid`.
pub(crate) fn handle_stop(root: &Path) -> Result<()> {
    let pid_path = paths::pid_file_path(root);
    debug!(pid_file = %pid_path.display(), "Stopping server");
    match read_pid(&pid_path)? {
        Some(pid) => {
            eprintln!("Stopping rnet webserver (pid {pid})");
            send_sigterm(pid)
        }
        None => {
            eprintln!("No running server found ({} missing)", pid_path.display());
            Ok(())
        }
    }
}
