//! Process spawning primitives.
//!
//! Two shapes of child process exist here: a detached one whose output goes
//! to a log file and whose lifetime is independent of ours, and an attached
//! one that inherits our standard streams and is waited on.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};

/// Everything needed to start one child.
#[derive(Debug, Clone)]
pub struct ProcessSpec {
    pub program: String,
    pub args: Vec<String>,
    pub dir: PathBuf,
    pub env: BTreeMap<String, String>,
}

impl ProcessSpec {
    /// `program arg1 arg2`, for messages.
    pub fn display_command(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).current_dir(&self.dir).envs(&self.env);
        cmd
    }
}

/// Start `spec` in the background with stdout and stderr both redirected to
/// `log`, which is truncated first.
///
/// The child gets its own process group so a terminal interrupt aimed at the
/// foreground job does not reach it. The child is never waited on.
///
/// Nothing here is fatal to the caller. If `log` cannot be opened the backend
/// is not started at all; if the program cannot be started the error is
/// written into the log. Both cases return `None` after a warning. Otherwise
/// the pid is returned for diagnostics only.
pub fn spawn_detached(spec: &ProcessSpec, log: &Path) -> Option<u32> {
    let (stdout, stderr) = match open_log(log) {
        Ok(handles) => handles,
        Err(e) => {
            tracing::warn!(log = %log.display(), error = %e, "cannot create backend log");
            return None;
        }
    };

    let mut cmd = spec.command();
    cmd.stdin(Stdio::null())
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::from(stderr));

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
        cmd.creation_flags(CREATE_NEW_PROCESS_GROUP);
    }

    match cmd.spawn() {
        // Dropping a `Child` neither kills nor waits for it. A backend that
        // exits early stays a zombie until the launcher itself exits.
        Ok(child) => Some(child.id()),
        Err(e) => {
            tracing::warn!(
                command = %spec.display_command(),
                error = %e,
                "backend failed to start"
            );
            if let Err(write_err) = append_spawn_error(spec, log, &e) {
                tracing::warn!(log = %log.display(), error = %write_err, "cannot write backend log");
            }
            None
        }
    }
}

fn open_log(log: &Path) -> io::Result<(File, File)> {
    let stdout = File::create(log)?;
    let stderr = stdout.try_clone()?;
    Ok((stdout, stderr))
}

fn append_spawn_error(spec: &ProcessSpec, log: &Path, err: &io::Error) -> io::Result<()> {
    let mut file = File::options().append(true).open(log)?;
    writeln!(
        file,
        "stackup: failed to start `{}` in {}: {}",
        spec.display_command(),
        spec.dir.display(),
        err
    )
}

/// Start `spec` in the foreground, inheriting our standard streams. The
/// caller is expected to wait on the returned child.
pub fn spawn_attached(spec: &ProcessSpec) -> io::Result<Child> {
    spec.command()
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
}

/// Collapse an exit status into a single process exit code.
///
/// Signal terminations follow the shell convention of `128 + signal`.
pub fn exit_code(status: ExitStatus) -> u8 {
    if let Some(code) = status.code() {
        return (code & 0xff) as u8;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return (128 + signal).clamp(0, 255) as u8;
        }
    }

    1
}
