//! ffmpeg-backed implementation of the engine's muxer seam.
//!
//! Three black-box invocations: concatenate the video list, concatenate
//! the audio list, then stream-copy both combined tracks into the final
//! container. Only the concat-list format is shared with the engine; the
//! argument syntax lives entirely here.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};
use vodfetch_engine::{DownloadError, Muxer};

pub struct FfmpegMuxer {
    program: PathBuf,
}

impl FfmpegMuxer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-y").arg("-loglevel").arg("error").arg("-stats");
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            // CREATE_NO_WINDOW
            cmd.as_std_mut().creation_flags(0x0800_0000);
        }
        cmd
    }

    async fn run(&self, mut cmd: Command, what: &'static str) -> Result<(), DownloadError> {
        debug!("running {what}: {:?}", cmd.as_std());
        let output = cmd
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                DownloadError::mux(format!("failed to spawn {}: {e}", self.program.display()))
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DownloadError::mux(format!(
                "{what} failed with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }

    /// `ffmpeg -f concat -safe 0 -i <list> -c copy <output>`
    async fn concat(&self, list: &Path, output: &Path) -> Result<(), DownloadError> {
        let mut cmd = self.command();
        cmd.arg("-f")
            .arg("concat")
            .arg("-safe")
            .arg("0")
            .arg("-i")
            .arg(list)
            .arg("-c")
            .arg("copy")
            .arg(output);
        self.run(cmd, "segment concatenation").await
    }
}

#[async_trait]
impl Muxer for FfmpegMuxer {
    async fn mux(
        &self,
        video_list: &Path,
        audio_list: &Path,
        output: &Path,
    ) -> Result<(), DownloadError> {
        // The concat demuxer resolves relative list entries against the
        // list file's own directory, so the combined intermediates can
        // live right next to the lists.
        let work = video_list.parent().unwrap_or_else(|| Path::new("."));
        let combined_video = work.join("combined_video.ts");
        let combined_audio = work.join("combined_audio.aac");

        info!("combining video segments");
        self.concat(video_list, &combined_video).await?;
        info!("combining audio segments");
        self.concat(audio_list, &combined_audio).await?;

        info!(output = %output.display(), "muxing audio and video");
        let mut cmd = self.command();
        cmd.arg("-i")
            .arg(&combined_video)
            .arg("-i")
            .arg(&combined_audio)
            .arg("-c")
            .arg("copy")
            .arg(output);
        self.run(cmd, "muxing").await
    }
}
