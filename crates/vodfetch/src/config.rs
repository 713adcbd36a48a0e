use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};

use crate::select::VariantSelectionPolicy;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/142.0.0.0 Safari/537.36";

/// HTTP client options shared by manifest and segment requests.
///
/// Only the connect timeout is set; request bodies run on the transport
/// defaults, so a slow segment is not cut off mid-download.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub user_agent: String,

    /// Connection timeout (time to establish the initial connection)
    pub connect_timeout: Duration,

    /// Whether to follow redirects
    pub follow_redirects: bool,

    /// Custom HTTP headers for requests
    pub headers: HeaderMap,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            connect_timeout: Duration::from_secs(30),
            follow_redirects: true,
            headers: HttpConfig::default_headers(),
        }
    }
}

impl HttpConfig {
    /// Accept-Encoding is left to the client: reqwest manages it (and the
    /// matching decompression) through its gzip/deflate features.
    pub fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static("application/vnd.apple.mpegurl,application/x-mpegurl,*/*"),
        );
        headers
    }
}

/// Everything a pipeline run needs, injected at construction. There is no
/// ambient global state: workspace root, output location and selection
/// policy all live here.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Scratch directory owned exclusively by one run; destroyed and
    /// recreated at run start.
    pub workspace_root: PathBuf,

    /// Persistent directory the muxed output file lands in.
    pub output_dir: PathBuf,

    /// Container extension of the muxed output file.
    pub output_container: String,

    pub selection_policy: VariantSelectionPolicy,

    pub http: HttpConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workspace_root: PathBuf::from("temp"),
            output_dir: PathBuf::from("downloads"),
            output_container: "mp4".to_owned(),
            selection_policy: VariantSelectionPolicy::default(),
            http: HttpConfig::default(),
        }
    }
}
