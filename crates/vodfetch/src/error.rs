use reqwest::StatusCode;

/// Errors produced by the download pipeline.
///
/// Every variant is terminal for the current run: there is no retry
/// anywhere in this engine, callers propagate with `?` and the run aborts
/// with the workspace left as-is for inspection.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("invalid URL `{input}`: {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("HTTP request failed: {source}")]
    Network {
        #[from]
        source: reqwest::Error,
    },

    #[error("request failed with HTTP {status} during {operation} for {url}")]
    HttpStatus {
        status: StatusCode,
        url: String,
        operation: &'static str,
    },

    #[error("failed to parse manifest from {url}: {reason}")]
    ManifestParse { url: String, reason: String },

    #[error("invalid master manifest at {url}: {reason}")]
    InvalidManifest { url: String, reason: String },

    #[error("segment {index} fetch failed for {url}: {reason}")]
    SegmentFetch {
        index: usize,
        url: String,
        reason: String,
    },

    #[error("master manifest lists no AUDIO rendition")]
    MissingAudioTrack,

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("muxing failed: {reason}")]
    Mux { reason: String },
}

impl DownloadError {
    pub fn invalid_url(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn http_status(
        status: StatusCode,
        url: impl Into<String>,
        operation: &'static str,
    ) -> Self {
        Self::HttpStatus {
            status,
            url: url.into(),
            operation,
        }
    }

    pub fn manifest_parse(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ManifestParse {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_manifest(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidManifest {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn segment_fetch(index: usize, url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SegmentFetch {
            index,
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn mux(reason: impl Into<String>) -> Self {
        Self::Mux {
            reason: reason.into(),
        }
    }
}
