//! Segment acquisition: turns one media manifest into a complete,
//! gap-free set of numbered segment files on disk.
//!
//! Fetches are strictly sequential and the whole acquisition fails on the
//! first bad segment; a partial segment set is never a valid input to
//! muxing, so there is nothing useful to salvage past the first failure.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use reqwest::{Client, StatusCode};
use tokio::fs;
use tracing::{debug, info};
use url::Url;

use crate::error::DownloadError;
use crate::fetcher::ManifestFetcher;
use crate::progress::{ProgressCallback, ProgressEvent};

/// Which track a media manifest belongs to. Decides the segment file
/// extension and the workspace subdirectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Video,
    Audio,
}

impl TrackKind {
    pub fn extension(self) -> &'static str {
        match self {
            TrackKind::Video => "ts",
            TrackKind::Audio => "aac",
        }
    }

    pub fn dir_name(self) -> &'static str {
        match self {
            TrackKind::Video => "video_segments",
            TrackKind::Audio => "audio_segments",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TrackKind::Video => "video",
            TrackKind::Audio => "audio",
        }
    }
}

/// One written segment file. `index` is the zero-based manifest-order
/// position; `file_name` is `segment_{index:04}.{ext}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentFile {
    pub index: usize,
    pub file_name: String,
    pub path: PathBuf,
}

/// Downloads every segment of a media manifest, in manifest order, into a
/// destination directory.
pub struct SegmentAcquirer {
    client: Client,
    fetcher: ManifestFetcher,
    progress: Option<ProgressCallback>,
}

impl SegmentAcquirer {
    pub fn new(client: Client, progress: Option<ProgressCallback>) -> Self {
        Self {
            fetcher: ManifestFetcher::new(client.clone()),
            client,
            progress,
        }
    }

    /// Fetches the media manifest at `manifest_url` and downloads its
    /// segments one by one into `dest_dir`, writing each response body
    /// verbatim to `segment_{i:04}.{ext}`.
    ///
    /// The destination directory is created if absent (already existing
    /// is fine, unlike the workspace reset). The returned sequence
    /// preserves manifest order exactly: element `i` is the i-th manifest
    /// segment, with no gaps. Any non-200 status or transport error on a
    /// segment aborts the whole acquisition with
    /// [`DownloadError::SegmentFetch`].
    pub async fn acquire(
        &self,
        manifest_url: &Url,
        dest_dir: &Path,
        track: TrackKind,
    ) -> Result<Vec<SegmentFile>, DownloadError> {
        let manifest = self.fetcher.fetch_media(manifest_url).await?;
        fs::create_dir_all(dest_dir).await?;

        let total = manifest.segments.len();
        info!(
            track = track.label(),
            segments = total,
            dir = %dest_dir.display(),
            "downloading segments"
        );
        self.emit(ProgressEvent::TrackStarted { track, total });

        let mut files = Vec::with_capacity(total);
        for (index, segment) in manifest.segments.iter().enumerate() {
            let body = self.fetch_segment(index, &segment.uri).await?;
            let file_name = format!("segment_{index:04}.{}", track.extension());
            let path = dest_dir.join(&file_name);
            fs::write(&path, &body).await?;

            debug!(
                track = track.label(),
                index,
                total,
                bytes = body.len(),
                "segment written"
            );
            self.emit(ProgressEvent::SegmentFinished {
                track,
                index,
                total,
                bytes: body.len() as u64,
            });
            files.push(SegmentFile {
                index,
                file_name,
                path,
            });
        }

        self.emit(ProgressEvent::TrackFinished {
            track,
            segments: files.len(),
        });
        Ok(files)
    }

    async fn fetch_segment(&self, index: usize, url: &Url) -> Result<Bytes, DownloadError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| DownloadError::segment_fetch(index, url.as_str(), e.to_string()))?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(DownloadError::segment_fetch(
                index,
                url.as_str(),
                format!("HTTP {status}"),
            ));
        }
        response
            .bytes()
            .await
            .map_err(|e| DownloadError::segment_fetch(index, url.as_str(), e.to_string()))
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(progress) = &self.progress {
            progress(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;
    use crate::fetcher::build_client;
    use std::sync::{Arc, Mutex};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MEDIA: &str = "#EXTM3U\n\
#EXT-X-VERSION:3\n\
#EXT-X-TARGETDURATION:6\n\
#EXTINF:6.0,\n\
seg_0.ts\n\
#EXTINF:6.0,\n\
seg_1.ts\n\
#EXTINF:4.2,\n\
seg_2.ts\n\
#EXT-X-ENDLIST\n";

    async fn mount_media(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/track/playlist.m3u8"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MEDIA))
            .mount(server)
            .await;
    }

    async fn mount_segment(server: &MockServer, name: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/track/{name}")))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.as_bytes().to_vec()))
            .mount(server)
            .await;
    }

    fn acquirer(progress: Option<ProgressCallback>) -> SegmentAcquirer {
        SegmentAcquirer::new(
            build_client(&HttpConfig::default()).expect("client"),
            progress,
        )
    }

    fn manifest_url(server: &MockServer) -> Url {
        Url::parse(&format!("{}/track/playlist.m3u8", server.uri())).expect("valid url")
    }

    #[tokio::test]
    async fn acquires_all_segments_in_manifest_order() {
        let server = MockServer::start().await;
        mount_media(&server).await;
        mount_segment(&server, "seg_0.ts", "first").await;
        mount_segment(&server, "seg_1.ts", "second").await;
        mount_segment(&server, "seg_2.ts", "third").await;

        let dir = tempfile::tempdir().expect("tempdir");
        let dest = dir.path().join("video_segments");
        let files = acquirer(None)
            .acquire(&manifest_url(&server), &dest, TrackKind::Video)
            .await
            .expect("acquisition succeeds");

        let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(
            names,
            ["segment_0000.ts", "segment_0001.ts", "segment_0002.ts"]
        );
        for (i, (file, expected)) in files.iter().zip(["first", "second", "third"]).enumerate() {
            assert_eq!(file.index, i);
            let body = std::fs::read_to_string(&file.path).expect("segment file exists");
            assert_eq!(body, expected);
        }
    }

    #[tokio::test]
    async fn failing_segment_aborts_with_its_index() {
        let server = MockServer::start().await;
        mount_media(&server).await;
        mount_segment(&server, "seg_0.ts", "first").await;
        Mock::given(method("GET"))
            .and(path("/track/seg_1.ts"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        // seg_2.ts is deliberately not mounted: the acquisition must stop
        // at index 1 and never request it.

        let dir = tempfile::tempdir().expect("tempdir");
        let dest = dir.path().join("audio_segments");
        let err = acquirer(None)
            .acquire(&manifest_url(&server), &dest, TrackKind::Audio)
            .await
            .expect_err("must abort");

        match err {
            DownloadError::SegmentFetch { index, .. } => assert_eq!(index, 1),
            other => panic!("expected SegmentFetch, got {other:?}"),
        }
        assert!(dest.join("segment_0000.aac").exists());
        assert!(!dest.join("segment_0001.aac").exists());
        assert!(!dest.join("segment_0002.aac").exists());
    }

    #[tokio::test]
    async fn reports_progress_per_segment() {
        let server = MockServer::start().await;
        mount_media(&server).await;
        mount_segment(&server, "seg_0.ts", "a").await;
        mount_segment(&server, "seg_1.ts", "bb").await;
        mount_segment(&server, "seg_2.ts", "ccc").await;

        let events: Arc<Mutex<Vec<ProgressEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let progress: ProgressCallback =
            Arc::new(move |event| sink.lock().unwrap().push(event));

        let dir = tempfile::tempdir().expect("tempdir");
        acquirer(Some(progress))
            .acquire(
                &manifest_url(&server),
                &dir.path().join("video_segments"),
                TrackKind::Video,
            )
            .await
            .expect("acquisition succeeds");

        let events = events.lock().unwrap();
        assert!(matches!(
            events.first(),
            Some(ProgressEvent::TrackStarted { total: 3, .. })
        ));
        let finished: Vec<(usize, u64)> = events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::SegmentFinished { index, bytes, .. } => Some((*index, *bytes)),
                _ => None,
            })
            .collect();
        assert_eq!(finished, [(0, 1), (1, 2), (2, 3)]);
        assert!(matches!(
            events.last(),
            Some(ProgressEvent::TrackFinished { segments: 3, .. })
        ));
    }

    #[tokio::test]
    async fn existing_destination_directory_is_reused() {
        let server = MockServer::start().await;
        mount_media(&server).await;
        mount_segment(&server, "seg_0.ts", "x").await;
        mount_segment(&server, "seg_1.ts", "y").await;
        mount_segment(&server, "seg_2.ts", "z").await;

        let dir = tempfile::tempdir().expect("tempdir");
        let dest = dir.path().join("video_segments");
        std::fs::create_dir_all(&dest).expect("pre-create");

        let files = acquirer(None)
            .acquire(&manifest_url(&server), &dest, TrackKind::Video)
            .await
            .expect("idempotent directory creation");
        assert_eq!(files.len(), 3);
    }
}
