use std::io;
use std::path::PathBuf;

/// Failures that stop the launch sequence.
///
/// Backend failures are absent: the backend log or a warning records them and
/// the sequence continues.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("{role} directory not found: {}", path.display())]
    MissingDir { role: &'static str, path: PathBuf },

    #[error("failed to start frontend `{program}`")]
    FrontendSpawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed waiting for frontend `{program}`")]
    FrontendWait {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl LaunchError {
    /// Process exit code the launcher reports for this failure.
    ///
    /// Mirrors what a POSIX shell returns for the same situation: 127 for an
    /// unknown command, 126 for one that cannot be executed, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        match self {
            LaunchError::FrontendSpawn { source, .. } => match source.kind() {
                io::ErrorKind::NotFound => 127,
                io::ErrorKind::PermissionDenied => 126,
                _ => 1,
            },
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_error(kind: io::ErrorKind) -> LaunchError {
        LaunchError::FrontendSpawn {
            program: "npm".to_string(),
            source: io::Error::from(kind),
        }
    }

    #[test]
    fn missing_command_maps_to_127() {
        assert_eq!(spawn_error(io::ErrorKind::NotFound).exit_code(), 127);
    }

    #[test]
    fn unexecutable_command_maps_to_126() {
        assert_eq!(spawn_error(io::ErrorKind::PermissionDenied).exit_code(), 126);
    }

    #[test]
    fn environment_errors_map_to_1() {
        let err = LaunchError::MissingDir {
            role: "backend",
            path: PathBuf::from("backend"),
        };
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.to_string(), "backend directory not found: backend");
    }
}
