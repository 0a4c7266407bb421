use crate::config::StackConfig;
use crate::error::LaunchError;
use crate::process::{self, ProcessSpec};
use std::path::PathBuf;

/// Where the launch sequence is. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    BackendStarted,
    FrontendRunning,
    Terminal,
}

/// Result of a launch that reached the frontend.
#[derive(Debug)]
pub struct LaunchOutcome {
    /// Backend pid for reporting; `None` when it failed to start.
    pub backend_pid: Option<u32>,
    pub log_path: PathBuf,
    /// The frontend's exit code, which is also ours.
    pub exit_code: u8,
}

/// Starts the backend detached, then runs the frontend attached.
pub struct Launcher<'a> {
    root: PathBuf,
    config: &'a StackConfig,
    stage: Stage,
}

impl<'a> Launcher<'a> {
    pub fn new(root: impl Into<PathBuf>, config: &'a StackConfig) -> Self {
        Self {
            root: root.into(),
            config,
            stage: Stage::Init,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn advance(&mut self, next: Stage) {
        tracing::debug!(from = ?self.stage, to = ?next, "launch stage");
        self.stage = next;
    }

    /// Run the whole sequence.
    ///
    /// Fails fast on a missing directory. Backend trouble (an unusable log
    /// file or a program that will not start) is only warned about and the
    /// frontend is started regardless. Once the backend has been started
    /// nothing here stops it again: it outlives the launcher whether the
    /// frontend succeeds, fails, or never starts.
    pub fn run(&mut self) -> Result<LaunchOutcome, LaunchError> {
        let backend_dir = require_dir("backend", self.config.backend_dir(&self.root))?;
        let log_path = self.config.log_path(&self.root);

        let backend = ProcessSpec {
            program: self.config.backend.program.clone(),
            args: self.config.backend.args.clone(),
            dir: backend_dir,
            env: self.config.backend.env.clone(),
        };
        tracing::info!(
            command = %backend.display_command(),
            dir = %backend.dir.display(),
            log = %log_path.display(),
            "starting backend"
        );
        let backend_pid = process::spawn_detached(&backend, &log_path);
        if let Some(pid) = backend_pid {
            tracing::info!(pid, "backend running detached");
        }
        self.advance(Stage::BackendStarted);

        let frontend_dir = require_dir("frontend", self.config.frontend_dir(&self.root))?;
        let frontend = ProcessSpec {
            program: self.config.frontend.program.clone(),
            args: self.config.frontend.args.clone(),
            dir: frontend_dir,
            env: self.config.frontend.env.clone(),
        };
        tracing::info!(
            command = %frontend.display_command(),
            dir = %frontend.dir.display(),
            "starting frontend"
        );
        let mut child =
            process::spawn_attached(&frontend).map_err(|source| LaunchError::FrontendSpawn {
                program: frontend.program.clone(),
                source,
            })?;
        self.advance(Stage::FrontendRunning);
        let status = child.wait().map_err(|source| LaunchError::FrontendWait {
            program: frontend.program.clone(),
            source,
        })?;
        self.advance(Stage::Terminal);

        let exit_code = process::exit_code(status);
        tracing::info!(%status, exit_code, "frontend exited");

        Ok(LaunchOutcome {
            backend_pid,
            log_path,
            exit_code,
        })
    }
}

fn require_dir(role: &'static str, path: PathBuf) -> Result<PathBuf, LaunchError> {
    if path.is_dir() {
        Ok(path)
    } else {
        Err(LaunchError::MissingDir { role, path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_backend_dir_stops_before_anything_starts() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("frontend")).unwrap();
        let config = StackConfig::default();

        let mut launcher = Launcher::new(root.path(), &config);
        let err = launcher.run().unwrap_err();

        assert!(matches!(err, LaunchError::MissingDir { role: "backend", .. }));
        assert_eq!(launcher.stage(), Stage::Init);
        assert!(!root.path().join("backend/backend.log").exists());
    }

    #[test]
    fn missing_frontend_dir_fails_after_backend_started() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("backend")).unwrap();
        let mut config = StackConfig::default();
        config.backend.program = "stackup-no-such-program-xyz".to_string();

        let mut launcher = Launcher::new(root.path(), &config);
        let err = launcher.run().unwrap_err();

        assert!(matches!(err, LaunchError::MissingDir { role: "frontend", .. }));
        assert_eq!(launcher.stage(), Stage::BackendStarted);
        assert!(root.path().join("backend/backend.log").exists());
    }

    #[cfg(unix)]
    #[test]
    fn unusable_backend_log_still_runs_frontend() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("backend/backend.log")).unwrap();
        std::fs::create_dir(root.path().join("frontend")).unwrap();
        let mut config = StackConfig::default();
        config.backend.program = "true".to_string();
        config.backend.args = Vec::new();
        config.frontend.program = "sh".to_string();
        config.frontend.args = vec!["-c".to_string(), "touch ../frontend_ran".to_string()];

        let mut launcher = Launcher::new(root.path(), &config);
        let outcome = launcher.run().unwrap();

        assert_eq!(outcome.exit_code, 0);
        assert!(outcome.backend_pid.is_none());
        assert_eq!(launcher.stage(), Stage::Terminal);
        assert!(root.path().join("frontend_ran").exists());
    }

    #[test]
    fn missing_frontend_program_maps_to_127() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("backend")).unwrap();
        std::fs::create_dir(root.path().join("frontend")).unwrap();
        let mut config = StackConfig::default();
        config.backend.program = "stackup-no-such-program-xyz".to_string();
        config.frontend.program = "stackup-no-such-program-xyz".to_string();

        let err = Launcher::new(root.path(), &config).run().unwrap_err();

        assert!(matches!(err, LaunchError::FrontendSpawn { .. }));
        assert_eq!(err.exit_code(), 127);
    }
}
