//! Handing a resolved file URL to the host.

use std::process::{Command, Stdio};
use std::sync::Mutex;

use tracing::debug;

use super::OpenFileError;

/// Something that can display a URL to the user.
pub trait UrlOpener: Send + Sync {
    /// Opens `url`.
    ///
    /// # Errors
    ///
    /// Returns [`OpenFileError::Opener`] if the host could not open it.
    fn open(&self, url: &str) -> Result<(), OpenFileError>;
}

/// Opens URLs with the platform's default handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

impl SystemOpener {
    fn command(url: &str) -> Command {
        #[cfg(target_os = "macos")]
        let command = {
            let mut cmd = Command::new("open");
            cmd.arg(url);
            cmd
        };
        #[cfg(target_os = "windows")]
        let command = {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", "", url]);
            cmd
        };
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        let command = {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(url);
            cmd
        };
        command
    }
}

impl UrlOpener for SystemOpener {
    fn open(&self, url: &str) -> Result<(), OpenFileError> {
        launch(Self::command(url))
    }
}

/// Spawns the handler detached; the caller never waits on its exit.
fn launch(mut command: Command) -> Result<(), OpenFileError> {
    let child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|err| OpenFileError::Opener {
            reason: format!("failed to launch url opener: {err}"),
        })?;
    debug!(pid = child.id(), "URL opener launched");
    Ok(())
}

/// Records URLs instead of opening them.
///
/// Used for `--print-url` and in tests.
#[derive(Debug, Default)]
pub struct RecordingOpener {
    opened: Mutex<Vec<String>>,
}

impl RecordingOpener {
    /// Creates an opener with nothing recorded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// URLs passed to [`UrlOpener::open`] so far.
    #[must_use]
    pub fn opened(&self) -> Vec<String> {
        self.opened
            .lock()
            .map(|urls| urls.clone())
            .unwrap_or_default()
    }
}

impl UrlOpener for RecordingOpener {
    fn open(&self, url: &str) -> Result<(), OpenFileError> {
        let mut opened = self.opened.lock().map_err(|_| OpenFileError::Opener {
            reason: "recording opener lock poisoned".to_string(),
        })?;
        opened.push(url.to_string());
        Ok(())
    }
}
