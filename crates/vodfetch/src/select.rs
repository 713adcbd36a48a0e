//! Deterministic variant and rendition selection over a parsed master
//! manifest.

use crate::manifest::{AudioTrackRef, MasterManifest, VariantRef};

/// Policy for picking the video variant to download.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VariantSelectionPolicy {
    /// Select the variant with the highest bandwidth
    #[default]
    HighestBandwidth,
    LowestBandwidth,
    /// Select the variant whose bandwidth is closest to the given value
    ClosestToBandwidth(u64),
}

/// Picks the video variant according to `policy`.
///
/// Ties always resolve to the first matching variant in manifest order,
/// so repeated calls on the same manifest select the same variant.
/// Returns `None` only for a manifest with no variants, which
/// [`crate::manifest::parse_master`] never produces.
pub fn select_video_variant<'a>(
    master: &'a MasterManifest,
    policy: &VariantSelectionPolicy,
) -> Option<&'a VariantRef> {
    let mut best: Option<&VariantRef> = None;
    for variant in &master.variants {
        let better = match (best, policy) {
            (None, _) => true,
            (Some(b), VariantSelectionPolicy::HighestBandwidth) => variant.bandwidth > b.bandwidth,
            (Some(b), VariantSelectionPolicy::LowestBandwidth) => variant.bandwidth < b.bandwidth,
            (Some(b), VariantSelectionPolicy::ClosestToBandwidth(target)) => {
                variant.bandwidth.abs_diff(*target) < b.bandwidth.abs_diff(*target)
            }
        };
        if better {
            best = Some(variant);
        }
    }
    best
}

/// Returns the first AUDIO rendition in manifest order, if any.
///
/// No language or quality preference is applied: the first eligible
/// rendition wins, deterministically. Absence is a valid outcome here;
/// the pipeline decides whether that is fatal.
pub fn select_audio_track(master: &MasterManifest) -> Option<&AudioTrackRef> {
    master.audio_tracks.first()
}
