use async_trait::async_trait;
use tokio::process::Command;

use crate::{read_image, run_capture_tool, CaptureError, ScreenCapture};

/// Linux screen capturer. Tries `grim` (Wayland compositors) first and
/// falls back to ImageMagick's `import` (X11).
pub struct LinuxCapturer;

impl LinuxCapturer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for LinuxCapturer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScreenCapture for LinuxCapturer {
    async fn capture(&self) -> Result<Vec<u8>, CaptureError> {
        let file = tempfile::Builder::new()
            .prefix("vigil-shot")
            .suffix(".png")
            .tempfile()?;
        let path = file.path().to_path_buf();

        let mut grim = Command::new("grim");
        grim.arg(&path);
        match run_capture_tool("grim", &mut grim).await {
            Ok(()) => return read_image(&path).await,
            Err(e) => log::debug!("grim capture failed ({e}), trying import"),
        }

        let mut import = Command::new("import");
        import.arg("-window").arg("root").arg(&path);
        match run_capture_tool("import", &mut import).await {
            Ok(()) => read_image(&path).await,
            Err(CaptureError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(CaptureError::NoBackend { tried: "grim, import" })
            }
            Err(e) => Err(e),
        }
    }
}
