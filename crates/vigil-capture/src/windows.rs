use async_trait::async_trait;
use tokio::process::Command;

use crate::{read_image, run_capture_tool, CaptureError, ScreenCapture};

/// Windows screen capturer driven through PowerShell and GDI.
pub struct WindowsCapturer;

impl WindowsCapturer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for WindowsCapturer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScreenCapture for WindowsCapturer {
    async fn capture(&self) -> Result<Vec<u8>, CaptureError> {
        let file = tempfile::Builder::new()
            .prefix("vigil-shot")
            .suffix(".png")
            .tempfile()?;
        let path = file.path().to_path_buf();

        let script = format!(
            "Add-Type -AssemblyName System.Windows.Forms,System.Drawing; \
             $b = [System.Windows.Forms.SystemInformation]::VirtualScreen; \
             $bmp = New-Object System.Drawing.Bitmap $b.Width, $b.Height; \
             $g = [System.Drawing.Graphics]::FromImage($bmp); \
             $g.CopyFromScreen($b.Left, $b.Top, 0, 0, $bmp.Size); \
             $bmp.Save('{}', [System.Drawing.Imaging.ImageFormat]::Png)",
            path.display()
        );

        let mut cmd = Command::new("powershell");
        cmd.arg("-NoProfile").arg("-WindowStyle").arg("Hidden").arg("-Command").arg(script);
        run_capture_tool("powershell", &mut cmd).await?;

        read_image(&path).await
    }
}
