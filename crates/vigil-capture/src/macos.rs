use async_trait::async_trait;
use tokio::process::Command;

use crate::{read_image, run_capture_tool, CaptureError, ScreenCapture};

/// macOS screen capturer backed by the system `screencapture` utility.
pub struct MacOsCapturer;

impl MacOsCapturer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for MacOsCapturer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScreenCapture for MacOsCapturer {
    async fn capture(&self) -> Result<Vec<u8>, CaptureError> {
        let file = tempfile::Builder::new()
            .prefix("vigil-shot")
            .suffix(".png")
            .tempfile()?;
        let path = file.path().to_path_buf();

        // -x: no shutter sound; main display only.
        let mut cmd = Command::new("screencapture");
        cmd.arg("-x").arg("-t").arg("png").arg(&path);
        run_capture_tool("screencapture", &mut cmd).await?;

        read_image(&path).await
    }
}
