use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Application activated before the interactive capture starts
const SNAP_APP_NAME: &str = "SNAP";

/// Time the activation script waits for the app to reach the foreground
const FOREGROUND_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Error capturing screenshot: {0}")]
    Cancelled(String),

    #[error("Screenshot file not found at {}", .0.display())]
    MissingOutput(PathBuf),

    #[error("Error moving screenshot to {}: {source}", .to.display())]
    Move {
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Source of full-board screenshots
pub trait BoardCapture: Send + Sync {
    /// Capture the board and store it at `output_path`.
    fn capture(&self, output_path: &Path) -> Result<PathBuf, CaptureError>;
}

/// User-driven capture through the macOS `screencapture -i` crosshair.
///
/// The capture lands in an intermediate file first and is then moved to the
/// requested output path.
#[derive(Debug, Clone)]
pub struct InteractiveCapture {
    app_name: Option<String>,
    capture_command: String,
    intermediate_path: PathBuf,
}

impl Default for InteractiveCapture {
    fn default() -> Self {
        Self {
            app_name: Some(SNAP_APP_NAME.to_string()),
            capture_command: "screencapture".to_string(),
            intermediate_path: default_intermediate_path(),
        }
    }
}

impl InteractiveCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip bringing an application to the foreground before capturing.
    pub fn without_activation(mut self) -> Self {
        self.app_name = None;
        self
    }

    pub fn with_capture_command(mut self, command: impl Into<String>) -> Self {
        self.capture_command = command.into();
        self
    }

    pub fn with_intermediate_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.intermediate_path = path.into();
        self
    }

    /// Best-effort: the script's outcome is never checked.
    fn activate(&self, app_name: &str) {
        let script = format!(
            "tell application \"{}\" to activate\ndelay {}",
            app_name,
            FOREGROUND_DELAY.as_secs()
        );

        match Command::new("osascript").arg("-e").arg(&script).output() {
            Ok(output) if !output.status.success() => {
                debug!(
                    "Activation of {} exited with {}: {}",
                    app_name,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                );
            }
            Ok(_) => debug!("Activated {}", app_name),
            Err(e) => debug!("osascript unavailable, skipping activation: {}", e),
        }
    }
}

impl BoardCapture for InteractiveCapture {
    fn capture(&self, output_path: &Path) -> Result<PathBuf, CaptureError> {
        if let Some(app_name) = &self.app_name {
            self.activate(app_name);
        }

        // A stale capture from an earlier run must not be mistaken for this one
        if self.intermediate_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.intermediate_path) {
                warn!(
                    "Could not remove stale {}: {}",
                    self.intermediate_path.display(),
                    e
                );
            }
        }

        info!("Please select the SNAP window when the crosshair appears.");
        let output = Command::new(&self.capture_command)
            .arg("-i")
            .arg(&self.intermediate_path)
            .output()
            .map_err(|source| CaptureError::Spawn {
                command: self.capture_command.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let reason = if stderr.is_empty() {
                format!("{} exited with {}", self.capture_command, output.status)
            } else {
                stderr
            };
            return Err(CaptureError::Cancelled(reason));
        }

        if !self.intermediate_path.exists() {
            return Err(CaptureError::MissingOutput(self.intermediate_path.clone()));
        }

        std::fs::rename(&self.intermediate_path, output_path).map_err(|source| {
            CaptureError::Move {
                to: output_path.to_path_buf(),
                source,
            }
        })?;

        debug!("Screenshot moved to {}", output_path.display());
        Ok(output_path.to_path_buf())
    }
}

/// `~/Desktop/screenshot.png`, falling back to the temp dir without `$HOME`
fn default_intermediate_path() -> PathBuf {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join("Desktop"))
        .unwrap_or_else(std::env::temp_dir)
        .join("screenshot.png")
}
