use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::process::{Child, Command};
use vigil_core::PenaltyPresenter;

/// Blocking penalty surface: a terminal countdown, plus an optional
/// full-screen video played through an external `mpv` process.
pub struct TakeoverPresenter {
    video: Option<PathBuf>,
}

impl TakeoverPresenter {
    #[must_use]
    pub fn new(video: Option<PathBuf>) -> Self {
        Self { video }
    }

    /// Start the penalty video, if one is configured. A missing or broken
    /// player never blocks the penalty itself.
    fn spawn_video(&self) -> Option<Child> {
        let path = self.video.as_ref()?;
        let spawned = Command::new("mpv")
            .arg("--fullscreen")
            .arg("--loop-file=inf")
            .arg("--no-terminal")
            .arg(path)
            .kill_on_drop(true)
            .spawn();

        match spawned {
            Ok(child) => Some(child),
            Err(e) => {
                log::warn!("Could not start mpv for the penalty video: {e}");
                None
            }
        }
    }
}

#[async_trait]
impl PenaltyPresenter for TakeoverPresenter {
    async fn present(&self, duration: Duration) -> Result<()> {
        // kill_on_drop tears the player down when the countdown ends.
        let _player = self.spawn_video();

        println!();
        println!("  DISTRACTION DETECTED");
        for remaining in (1..=duration.as_secs()).rev() {
            print!("\r  Back to work in {remaining:>3}s ");
            let _ = std::io::stdout().flush();
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        println!("\r  Penalty over. Stay focused. ");
        Ok(())
    }
}
