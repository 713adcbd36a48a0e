//! Seam to the external muxing tool.

use std::path::Path;

use async_trait::async_trait;

use crate::error::DownloadError;

/// External collaborator that concatenates the two segment lists and
/// muxes the result into `output`.
///
/// The engine guarantees both lists are complete and in order before
/// calling this; the only contract shared with implementations is the
/// concat-list format (`file '<dir>/segment_XXXX.<ext>'`, one per line).
/// Tool choice and argument syntax belong entirely to the implementor.
#[async_trait]
pub trait Muxer: Send + Sync {
    async fn mux(
        &self,
        video_list: &Path,
        audio_list: &Path,
        output: &Path,
    ) -> Result<(), DownloadError>;
}
