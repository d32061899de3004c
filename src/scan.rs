use std::iter::StepBy;
use std::slice;

use tracing::debug;

pub use tokio_util::sync::CancellationToken;

use crate::classify::PlayClassifier;
use crate::config::Config;
use crate::formation;
use crate::frame::FrameRecord;
use crate::play::PlaySegment;
use crate::segmenter::{PlayWindow, Segmenter, SegmenterState};

/// Lazily turns a frame timeline into finished plays.
///
/// Each `next` folds the segmenter over sampled frames until a play closes,
/// then classifies it. Play ids run from 1 without gaps. Once the token is
/// cancelled the scanner drops any open play and stops; plays already
/// yielded are unaffected. The token is only polled, once per sampled frame,
/// so no async runtime is involved.
pub struct PlayScanner<'a> {
    frames: StepBy<slice::Iter<'a, FrameRecord>>,
    state: Option<SegmenterState<'a>>,
    segmenter: Segmenter,
    classifier: PlayClassifier,
    formation_min_players: usize,
    formation_overlap: f32,
    next_id: u32,
    cancel: CancellationToken,
    cancelled: bool,
}

impl<'a> PlayScanner<'a> {
    /// `cfg` is expected to be validated; a zero `frame_skip` is read as 1.
    /// `fps` must be the rate the records were built with.
    pub fn new(
        frames: &'a [FrameRecord],
        cfg: &Config,
        fps: f64,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            frames: frames.iter().step_by(cfg.frame_skip.max(1)),
            state: Some(SegmenterState::Idle),
            segmenter: Segmenter::new(cfg, fps),
            classifier: PlayClassifier::new(cfg),
            formation_min_players: cfg.formation_min_players,
            formation_overlap: cfg.formation_overlap_ratio,
            next_id: 1,
            cancel,
            cancelled: false,
        }
    }

    /// True when the scan stopped because of the cancellation token
    #[inline]
    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }

    fn finalize(&mut self, window: PlayWindow<'a>) -> PlaySegment {
        let formation = window.frames.first().and_then(|snap| {
            formation::describe(
                snap.players(),
                self.formation_min_players,
                self.formation_overlap,
            )
        });

        let (play_type, key_events) = self.classifier.classify(&window.frames, formation);

        let play_id = self.next_id;
        self.next_id += 1;

        debug!(
            play_id,
            start = window.start_frame,
            end = window.end_frame,
            %play_type,
            "play finalized"
        );

        PlaySegment {
            play_id,
            start_time: window.start_time,
            end_time: window.end_time,
            duration: window.duration(),
            start_frame: window.start_frame,
            end_frame: window.end_frame,
            player_count: window.player_count,
            play_type,
            key_events,
        }
    }
}

impl<'a> Iterator for PlayScanner<'a> {
    type Item = PlaySegment;

    fn next(&mut self) -> Option<PlaySegment> {
        loop {
            let state = self.state.take()?;

            if self.cancel.is_cancelled() {
                if state.is_active() {
                    debug!("scan cancelled, open play discarded");
                }

                self.cancelled = true;
                return None;
            }

            match self.frames.next() {
                Some(frame) => {
                    let (next, closed) = self.segmenter.step(state, frame);
                    self.state = Some(next);

                    if let Some(window) = closed {
                        return Some(self.finalize(window));
                    }
                }

                None => {
                    let window = self.segmenter.finish(state)?;
                    return Some(self.finalize(window));
                }
            }
        }
    }
}
