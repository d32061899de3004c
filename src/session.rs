use serde_derive::{Deserialize, Serialize};

use ndarray::ArrayView3;
use tracing::{info, trace};

use crate::config::Config;
use crate::detection::Detection;
use crate::error::Error;
use crate::frame::FrameRecord;
use crate::play::PlaySegment;
use crate::reconcile;
use crate::scan::{CancellationToken, PlayScanner};
use crate::team::{TeamClassifier, TeamColorCache};
use crate::track::Track;

/// Result of one analysis request. `frames` stays empty unless
/// `Config::return_frames` is set.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Analysis {
    pub fps: f64,
    pub plays: Vec<PlaySegment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<FrameRecord>,
    pub cancelled: bool,
}

/// Request-scoped state of one video: the validated config, the team color
/// cache and every frame record ingested so far.
pub struct AnalysisSession {
    config: Config,
    fps: f64,
    classifier: TeamClassifier,
    colors: TeamColorCache,
    frames: Vec<FrameRecord>,
}

impl AnalysisSession {
    pub fn new(config: Config, fps: f64) -> Result<Self, Error> {
        config.validate()?;

        if !(fps.is_finite() && fps > 0.0) {
            return Err(Error::InvalidFps(fps));
        }

        info!(fps, frame_skip = config.frame_skip, "analysis session created");

        Ok(Self {
            classifier: TeamClassifier::new(&config),
            colors: TeamColorCache::new(),
            frames: Vec::new(),
            config,
            fps,
        })
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn fps(&self) -> f64 {
        self.fps
    }

    #[inline]
    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    #[inline]
    pub fn team_colors(&self) -> &TeamColorCache {
        &self.colors
    }

    /// Reconciles one frame of detector and tracker output, colors its
    /// players and appends the resulting record. `image` is the frame as
    /// height x width x RGB; without it only cached team colors are known.
    ///
    /// Frame numbers must strictly increase; a late frame is rejected and
    /// leaves the session untouched.
    pub fn ingest(
        &mut self,
        frame_number: u64,
        detections: &[Detection],
        tracks: &[Track],
        image: Option<ArrayView3<'_, u8>>,
    ) -> Result<&FrameRecord, Error> {
        if let Some(last) = self.frames.last() {
            if frame_number <= last.frame_number {
                return Err(Error::OutOfOrderFrame {
                    frame: frame_number,
                    last: last.frame_number,
                });
            }
        }

        let mut objects = reconcile::reconcile(detections, tracks, &self.config);
        self.classifier.assign(&mut self.colors, &mut objects, image);

        let record = FrameRecord::new(frame_number, self.fps, objects);
        trace!(
            frame_number,
            players = record.player_count,
            ball = record.ball_detected,
            "frame ingested"
        );

        self.frames.push(record);
        Ok(&self.frames[self.frames.len() - 1])
    }

    /// Plays over the frames ingested so far, produced lazily
    pub fn plays(&self, cancel: CancellationToken) -> PlayScanner<'_> {
        PlayScanner::new(&self.frames, &self.config, self.fps, cancel)
    }

    /// Segments every ingested frame. The frame records are handed back
    /// alongside the plays when the config asks for them, otherwise they are
    /// dropped with the session.
    pub fn finish(self, cancel: &CancellationToken) -> Analysis {
        let (plays, cancelled) = {
            let mut scanner = self.plays(cancel.clone());
            let plays: Vec<PlaySegment> = scanner.by_ref().collect();

            (plays, scanner.was_cancelled())
        };

        info!(
            frames = self.frames.len(),
            plays = plays.len(),
            cancelled,
            "analysis finished"
        );

        let frames = if self.config.return_frames {
            self.frames
        } else {
            Vec::new()
        };

        Analysis {
            fps: self.fps,
            plays,
            frames,
            cancelled,
        }
    }
}
