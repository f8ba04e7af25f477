use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "windows")]
pub mod windows;

/// Upper bound on how long one capture attempt may block the scheduler.
pub const CAPTURE_TIMEOUT: Duration = Duration::from_secs(10);

/// Transient screen capture failures. A failed capture skips that cycle's
/// check; the next cycle proceeds unaffected.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("screen capture timed out after {0:?}")]
    Timeout(Duration),

    #[error("`{tool}` failed: {detail}")]
    Tool { tool: &'static str, detail: String },

    #[error("no screen capture tool found (tried: {tried})")]
    NoBackend { tried: &'static str },

    #[error("capture produced an empty image")]
    EmptyImage,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("screen capture is not supported on this platform")]
    UnsupportedPlatform,
}

/// Screen capture port: grabs the primary display as encoded PNG bytes.
#[async_trait]
pub trait ScreenCapture: Send + Sync {
    /// Capture the screen once. No side effects beyond reading the display.
    async fn capture(&self) -> Result<Vec<u8>, CaptureError>;
}

/// Create the platform-specific screen capturer.
///
/// # Errors
///
/// Returns an error if the current platform is not supported.
pub fn create_capturer() -> Result<Box<dyn ScreenCapture>, CaptureError> {
    #[cfg(target_os = "macos")]
    {
        Ok(Box::new(macos::MacOsCapturer::new()))
    }

    #[cfg(target_os = "linux")]
    {
        Ok(Box::new(linux::LinuxCapturer::new()))
    }

    #[cfg(target_os = "windows")]
    {
        Ok(Box::new(windows::WindowsCapturer::new()))
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        Err(CaptureError::UnsupportedPlatform)
    }
}

/// Run a capture tool to completion, bounded by [`CAPTURE_TIMEOUT`].
/// The child is killed if the timeout fires mid-capture.
#[cfg(any(target_os = "macos", target_os = "linux", target_os = "windows"))]
pub(crate) async fn run_capture_tool(
    tool: &'static str,
    cmd: &mut tokio::process::Command,
) -> Result<(), CaptureError> {
    cmd.kill_on_drop(true);

    let output = match tokio::time::timeout(CAPTURE_TIMEOUT, cmd.output()).await {
        Ok(result) => result?,
        Err(_) => return Err(CaptureError::Timeout(CAPTURE_TIMEOUT)),
    };

    if !output.status.success() {
        return Err(CaptureError::Tool {
            tool,
            detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}

/// Read the PNG a capture tool wrote, rejecting empty output.
#[cfg(any(target_os = "macos", target_os = "linux", target_os = "windows"))]
pub(crate) async fn read_image(path: &std::path::Path) -> Result<Vec<u8>, CaptureError> {
    let bytes = tokio::fs::read(path).await?;
    if bytes.is_empty() {
        return Err(CaptureError::EmptyImage);
    }
    Ok(bytes)
}
