//! indicatif-backed sink for the engine's progress events: one bar per
//! track, created when acquisition starts and finished when the track
//! completes.

use std::sync::{Arc, Mutex};

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use vodfetch_engine::{ProgressCallback, ProgressEvent, TrackKind};

fn slot(track: TrackKind) -> usize {
    match track {
        TrackKind::Video => 0,
        TrackKind::Audio => 1,
    }
}

pub fn track_bars() -> ProgressCallback {
    let multi = MultiProgress::new();
    let style = ProgressStyle::with_template("{msg:>5} [{bar:30.cyan/blue}] {pos}/{len} segments")
        .expect("valid progress template")
        .progress_chars("=> ");
    let bars: Mutex<[Option<ProgressBar>; 2]> = Mutex::new([None, None]);

    Arc::new(move |event| {
        let mut bars = bars.lock().expect("progress state");
        match event {
            ProgressEvent::TrackStarted { track, total } => {
                let bar = multi.add(ProgressBar::new(total as u64));
                bar.set_style(style.clone());
                bar.set_message(track.label());
                bars[slot(track)] = Some(bar);
            }
            ProgressEvent::SegmentFinished { track, .. } => {
                if let Some(bar) = &bars[slot(track)] {
                    bar.inc(1);
                }
            }
            ProgressEvent::TrackFinished { track, .. } => {
                if let Some(bar) = bars[slot(track)].take() {
                    bar.finish_with_message(format!("{} done", track.label()));
                }
            }
        }
    })
}
