//! Fire-and-forget launching of external programs.

use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::error::{AppError, Result};

/// Open `path` with the desktop's default application.
pub fn open_default(path: &Path) -> Result<()> {
    let mut cmd = opener(path);
    spawn_detached(&mut cmd)
}

/// Open `path` in `editor` (e.g. `code`).
pub fn open_in_editor(editor: &str, path: &Path) -> Result<()> {
    let mut parts = editor.split_whitespace();
    let program = parts.next().ok_or_else(|| AppError::LaunchFailed {
        program: editor.to_string(),
        reason: "no editor configured".into(),
    })?;
    let mut cmd = Command::new(program);
    cmd.args(parts).arg(path);
    spawn_detached(&mut cmd)
}

#[cfg(target_os = "macos")]
fn opener(path: &Path) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(path);
    cmd
}

#[cfg(windows)]
fn opener(path: &Path) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/c", "start", ""]).arg(path);
    cmd
}

#[cfg(all(unix, not(target_os = "macos")))]
fn opener(path: &Path) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(path);
    cmd
}

/// Start `cmd` with its stdio detached from the TUI. A background thread
/// reaps the child.
fn spawn_detached(cmd: &mut Command) -> Result<()> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| AppError::LaunchFailed {
            program: program.clone(),
            reason: e.to_string(),
        })?;
    info!(program = %program, pid = child.id(), "launched");
    std::thread::spawn(move || {
        let status = child.wait();
        debug!(program = %program, ?status, "launched program exited");
    });
    Ok(())
}
