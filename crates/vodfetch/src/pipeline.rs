//! End-to-end download orchestration.

use chrono::Local;
use tokio::fs;
use tracing::info;
use url::Url;

use crate::acquire::{SegmentAcquirer, TrackKind};
use crate::config::PipelineConfig;
use crate::error::DownloadError;
use crate::fetcher::{ManifestFetcher, build_client};
use crate::mux::Muxer;
use crate::progress::ProgressCallback;
use crate::select::{select_audio_track, select_video_variant};
use crate::workspace::Workspace;

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub output_path: std::path::PathBuf,
    pub selected_bandwidth: u64,
    pub video_segments: usize,
    pub audio_segments: usize,
}

/// Sequences a full VOD download: workspace reset, master resolution,
/// variant selection, per-track segment acquisition, concat-list
/// generation and muxer hand-off.
///
/// Every collaborator (HTTP client, workspace root, progress sink, muxer)
/// is injected at construction; there is no ambient state and no retry:
/// the first error from any stage aborts the run, leaving the workspace
/// populated up to the point of failure.
pub struct DownloadPipeline<M: Muxer> {
    config: PipelineConfig,
    workspace: Workspace,
    fetcher: ManifestFetcher,
    acquirer: SegmentAcquirer,
    muxer: M,
}

impl<M: Muxer> DownloadPipeline<M> {
    pub fn new(
        config: PipelineConfig,
        muxer: M,
        progress: Option<ProgressCallback>,
    ) -> Result<Self, DownloadError> {
        let client = build_client(&config.http)?;
        Ok(Self {
            workspace: Workspace::new(config.workspace_root.clone()),
            fetcher: ManifestFetcher::new(client.clone()),
            acquirer: SegmentAcquirer::new(client, progress),
            config,
            muxer,
        })
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Runs the whole pipeline for one master manifest URL.
    ///
    /// Stage order: reset workspace → fetch master → select variant and
    /// audio rendition (a master without an AUDIO rendition aborts here,
    /// before any segment request) → acquire video segments → acquire
    /// audio segments → write both concat lists → mux into a timestamped
    /// file under the output directory.
    pub async fn run(&self, master_url: &str) -> Result<PipelineReport, DownloadError> {
        let master_url = Url::parse(master_url)
            .map_err(|e| DownloadError::invalid_url(master_url, e.to_string()))?;

        self.workspace.reset().await?;

        info!(url = %master_url, "retrieving master manifest");
        let master = self.fetcher.fetch_master(&master_url).await?;

        let variant = select_video_variant(&master, &self.config.selection_policy).ok_or_else(
            || DownloadError::invalid_manifest(master_url.as_str(), "no variant streams"),
        )?;
        let audio = select_audio_track(&master).ok_or(DownloadError::MissingAudioTrack)?;
        info!(
            bandwidth = variant.bandwidth,
            audio = %audio.name,
            "selected video variant and audio rendition"
        );

        let video_files = self
            .acquirer
            .acquire(
                &variant.uri,
                &self.workspace.track_dir(TrackKind::Video),
                TrackKind::Video,
            )
            .await?;
        let audio_files = self
            .acquirer
            .acquire(
                &audio.uri,
                &self.workspace.track_dir(TrackKind::Audio),
                TrackKind::Audio,
            )
            .await?;

        let video_list = self
            .workspace
            .write_concat_list(TrackKind::Video, &video_files)
            .await?;
        let audio_list = self
            .workspace
            .write_concat_list(TrackKind::Audio, &audio_files)
            .await?;

        fs::create_dir_all(&self.config.output_dir).await?;
        let stamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let output_path = self.config.output_dir.join(format!(
            "output_video_{stamp}.{}",
            self.config.output_container
        ));

        info!(output = %output_path.display(), "handing off to muxer");
        self.muxer
            .mux(&video_list, &audio_list, &output_path)
            .await?;

        info!(
            output = %output_path.display(),
            video_segments = video_files.len(),
            audio_segments = audio_files.len(),
            "download complete"
        );
        Ok(PipelineReport {
            output_path,
            selected_bandwidth: variant.bandwidth,
            video_segments: video_files.len(),
            audio_segments: audio_files.len(),
        })
    }
}
