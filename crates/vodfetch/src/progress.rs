//! Progress side channel.
//!
//! Acquisition reports per-segment progress through an injected callback;
//! presentation (bars, logging) is entirely the caller's concern and none
//! of these events affect the acquisition contract.

use std::sync::Arc;

use crate::acquire::TrackKind;

#[derive(Debug, Clone)]
pub enum ProgressEvent {
    TrackStarted {
        track: TrackKind,
        total: usize,
    },
    /// Emitted after each segment has been written to disk.
    SegmentFinished {
        track: TrackKind,
        /// Zero-based manifest-order index of the finished segment.
        index: usize,
        total: usize,
        bytes: u64,
    },
    TrackFinished {
        track: TrackKind,
        segments: usize,
    },
}

pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;
