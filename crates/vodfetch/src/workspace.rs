//! Scratch workspace lifecycle and concat-list generation.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use crate::acquire::{SegmentFile, TrackKind};
use crate::error::DownloadError;

/// Scratch directory owned exclusively by one pipeline run.
///
/// Layout: `<root>/video_segments/`, `<root>/audio_segments/`, and the
/// two generated concat lists next to them. A run always begins with
/// [`Workspace::reset`], so nothing from a previous run survives; on
/// failure the populated portion is deliberately left behind for
/// inspection.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn track_dir(&self, track: TrackKind) -> PathBuf {
        self.root.join(track.dir_name())
    }

    pub fn list_path(&self, track: TrackKind) -> PathBuf {
        self.root.join(format!("{}_list.txt", track.dir_name()))
    }

    /// Deletes the root recursively if it exists (a missing root is not
    /// an error) and recreates it empty. Idempotent.
    pub async fn reset(&self) -> Result<(), DownloadError> {
        info!(root = %self.root.display(), "resetting workspace");
        match fs::remove_dir_all(&self.root).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(root = %self.root.display(), "workspace already clean");
            }
            Err(e) => return Err(e.into()),
        }
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Writes the concat-demuxer list for one fully acquired track: one
    /// `file '<dir>/<segment file>'` line per segment, in order,
    /// overwriting any existing list at that path. Returns the list path.
    pub async fn write_concat_list(
        &self,
        track: TrackKind,
        files: &[SegmentFile],
    ) -> Result<PathBuf, DownloadError> {
        let mut contents = String::with_capacity(files.len() * 40);
        for file in files {
            contents.push_str(&format!("file '{}/{}'\n", track.dir_name(), file.file_name));
        }
        let path = self.list_path(track);
        fs::write(&path, contents).await?;
        debug!(list = %path.display(), entries = files.len(), "wrote concat list");
        Ok(path)
    }
}
