//! Typed manifest model and parse constructors.
//!
//! A master manifest enumerates bitrate variants and alternative
//! renditions; a media manifest lists the ordered segment URIs of one
//! track. Parsing is delegated to `m3u8-rs` (unrecognized directives are
//! collected by the parser and ignored here) and every URI is resolved
//! against the manifest's own fetch URL, so the rest of the engine only
//! ever sees absolute URLs.

use m3u8_rs::{AlternativeMediaType, Playlist, parse_playlist_res};
use url::Url;

use crate::error::DownloadError;

/// Top-level manifest: the available variants and alternative audio
/// renditions, in manifest order.
///
/// Holds at least one variant; a master with zero variants is rejected at
/// parse time with [`DownloadError::InvalidManifest`].
#[derive(Debug, Clone)]
pub struct MasterManifest {
    pub variants: Vec<VariantRef>,
    pub audio_tracks: Vec<AudioTrackRef>,
}

/// One selectable video encoding at a given bandwidth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantRef {
    pub uri: Url,
    /// Peak bandwidth in bits per second, from the BANDWIDTH attribute.
    pub bandwidth: u64,
}

/// An alternative rendition of type AUDIO that carries a URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioTrackRef {
    pub uri: Url,
    pub name: String,
}

/// Ordered segment list of one track. The order is playback and
/// concatenation order and must be preserved exactly through download and
/// reassembly.
#[derive(Debug, Clone)]
pub struct MediaManifest {
    pub segments: Vec<SegmentRef>,
}

/// A single downloadable media segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentRef {
    pub uri: Url,
}

fn resolve(base: &Url, uri: &str) -> Result<Url, DownloadError> {
    base.join(uri).map_err(|e| {
        DownloadError::manifest_parse(base.as_str(), format!("could not resolve URI `{uri}`: {e}"))
    })
}

/// Parses master manifest text fetched from `base`.
///
/// Variant and rendition URIs are resolved against `base`. I-frame-only
/// variant streams are not selectable content and are skipped, as are
/// renditions without a URI.
pub fn parse_master(text: &str, base: &Url) -> Result<MasterManifest, DownloadError> {
    match parse_playlist_res(text.as_bytes()) {
        Ok(Playlist::MasterPlaylist(pl)) => {
            let mut variants = Vec::with_capacity(pl.variants.len());
            for variant in pl.variants.iter().filter(|v| !v.is_i_frame) {
                variants.push(VariantRef {
                    uri: resolve(base, &variant.uri)?,
                    bandwidth: variant.bandwidth,
                });
            }
            if variants.is_empty() {
                return Err(DownloadError::invalid_manifest(
                    base.as_str(),
                    "no variant streams",
                ));
            }

            let mut audio_tracks = Vec::new();
            for media in &pl.alternatives {
                if !matches!(media.media_type, AlternativeMediaType::Audio) {
                    continue;
                }
                let Some(uri) = media.uri.as_deref() else {
                    continue;
                };
                audio_tracks.push(AudioTrackRef {
                    uri: resolve(base, uri)?,
                    name: media.name.clone(),
                });
            }

            Ok(MasterManifest {
                variants,
                audio_tracks,
            })
        }
        Ok(Playlist::MediaPlaylist(_)) => Err(DownloadError::manifest_parse(
            base.as_str(),
            "expected a master playlist, got a media playlist",
        )),
        Err(e) => Err(DownloadError::manifest_parse(base.as_str(), e.to_string())),
    }
}

/// Parses media manifest text fetched from `base`, resolving each segment
/// URI against it. Segment order is preserved exactly.
pub fn parse_media(text: &str, base: &Url) -> Result<MediaManifest, DownloadError> {
    match parse_playlist_res(text.as_bytes()) {
        Ok(Playlist::MediaPlaylist(pl)) => {
            let mut segments = Vec::with_capacity(pl.segments.len());
            for segment in &pl.segments {
                segments.push(SegmentRef {
                    uri: resolve(base, &segment.uri)?,
                });
            }
            Ok(MediaManifest { segments })
        }
        Ok(Playlist::MasterPlaylist(_)) => Err(DownloadError::manifest_parse(
            base.as_str(),
            "expected a media playlist, got a master playlist",
        )),
        Err(e) => Err(DownloadError::manifest_parse(base.as_str(), e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://cdn.example.com/vod/master.m3u8").expect("valid url")
    }

    const MASTER: &str = "#EXTM3U\n\
#EXT-X-VERSION:4\n\
#EXT-X-INDEPENDENT-SEGMENTS\n\
#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID=\"aud\",NAME=\"English\",DEFAULT=YES,URI=\"audio/en/playlist.m3u8\"\n\
#EXT-X-STREAM-INF:BANDWIDTH=500000,RESOLUTION=640x360,AUDIO=\"aud\"\n\
low/playlist.m3u8\n\
#EXT-X-STREAM-INF:BANDWIDTH=2000000,RESOLUTION=1920x1080,AUDIO=\"aud\"\n\
https://mirror.example.net/high/playlist.m3u8\n";

    #[test]
    fn parse_master_resolves_uris_and_keeps_order() {
        let master = parse_master(MASTER, &base()).expect("master should parse");

        assert_eq!(master.variants.len(), 2);
        assert_eq!(
            master.variants[0].uri.as_str(),
            "https://cdn.example.com/vod/low/playlist.m3u8"
        );
        assert_eq!(master.variants[0].bandwidth, 500_000);
        assert_eq!(
            master.variants[1].uri.as_str(),
            "https://mirror.example.net/high/playlist.m3u8"
        );
        assert_eq!(master.variants[1].bandwidth, 2_000_000);

        assert_eq!(master.audio_tracks.len(), 1);
        assert_eq!(master.audio_tracks[0].name, "English");
        assert_eq!(
            master.audio_tracks[0].uri.as_str(),
            "https://cdn.example.com/vod/audio/en/playlist.m3u8"
        );
    }

    #[test]
    fn parse_master_ignores_unrecognized_directives() {
        let text = format!("{MASTER}#EXT-X-SESSION-DATA:DATA-ID=\"com.example.title\",VALUE=\"x\"\n");
        let master = parse_master(&text, &base()).expect("extra directives are ignored");
        assert_eq!(master.variants.len(), 2);
    }

    #[test]
    fn parse_master_skips_renditions_without_uri() {
        let text = "#EXTM3U\n\
#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID=\"aud\",NAME=\"Embedded\"\n\
#EXT-X-STREAM-INF:BANDWIDTH=800000,AUDIO=\"aud\"\n\
video.m3u8\n";
        let master = parse_master(text, &base()).expect("master should parse");
        assert!(master.audio_tracks.is_empty());
    }

    #[test]
    fn parse_master_rejects_zero_variants() {
        let text = "#EXTM3U\n\
#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID=\"aud\",NAME=\"English\",URI=\"audio.m3u8\"\n";
        let err = parse_master(text, &base()).expect_err("zero variants must be rejected");
        assert!(matches!(err, DownloadError::InvalidManifest { .. }));
    }

    #[test]
    fn parse_master_rejects_media_playlist_input() {
        let text = "#EXTM3U\n#EXT-X-TARGETDURATION:6\n#EXTINF:6.0,\nseg_0.ts\n";
        let err = parse_master(text, &base()).expect_err("media input is not a master");
        assert!(matches!(err, DownloadError::ManifestParse { .. }));
    }

    #[test]
    fn parse_master_rejects_malformed_text() {
        let err = parse_master("this is not a manifest", &base()).expect_err("must fail");
        assert!(matches!(err, DownloadError::ManifestParse { .. }));
    }

    #[test]
    fn parse_media_preserves_segment_order() {
        let text = "#EXTM3U\n\
#EXT-X-VERSION:3\n\
#EXT-X-TARGETDURATION:6\n\
#EXT-X-MEDIA-SEQUENCE:0\n\
#EXTINF:6.0,\n\
seg_0.ts\n\
#EXTINF:6.0,\n\
seg_1.ts\n\
#EXTINF:5.4,\n\
https://other.example.net/seg_2.ts\n\
#EXT-X-ENDLIST\n";
        let media = parse_media(text, &base()).expect("media should parse");

        let uris: Vec<&str> = media.segments.iter().map(|s| s.uri.as_str()).collect();
        assert_eq!(
            uris,
            [
                "https://cdn.example.com/vod/seg_0.ts",
                "https://cdn.example.com/vod/seg_1.ts",
                "https://other.example.net/seg_2.ts",
            ]
        );
    }

    #[test]
    fn parse_media_rejects_master_playlist_input() {
        let err = parse_media(MASTER, &base()).expect_err("master input is not a media playlist");
        assert!(matches!(err, DownloadError::ManifestParse { .. }));
    }
}
