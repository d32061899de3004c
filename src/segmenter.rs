use nalgebra as na;
use tracing::debug;

use crate::config::Config;
use crate::frame::FrameRecord;
use crate::math;
use crate::window::TimeWindow;

// tolerance for comparing durations built from frame_number / fps
const TIME_EPSILON: f64 = 1e-9;

/// Player cluster that opened a play
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub centroid: na::Point2<f32>,
    pub spread: f32,
}

impl Anchor {
    pub fn of(frame: &FrameRecord) -> Self {
        let centers = frame.player_centers();

        Self {
            centroid: math::centroid(&centers).unwrap_or_else(na::Point2::origin),
            spread: math::mean_pairwise_distance(&centers),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ActivePlay<'a> {
    pub start_frame: u64,
    pub start_time: f64,
    pub anchor: Anchor,
    frames: Vec<&'a FrameRecord>,
    ball: TimeWindow<na::Point2<f32>>,
    peak_players: usize,
}

impl<'a> ActivePlay<'a> {
    fn observe(&mut self, frame: &'a FrameRecord) {
        if let Some(pos) = frame.ball_position() {
            self.ball.push(frame.timestamp, pos);
        }

        self.peak_players = self.peak_players.max(frame.player_count);
        self.frames.push(frame);
    }

    fn last_frame(&self) -> (u64, f64) {
        self.frames
            .last()
            .map(|f| (f.frame_number, f.timestamp))
            .unwrap_or((self.start_frame, self.start_time))
    }
}

#[derive(Debug, Clone)]
pub enum SegmenterState<'a> {
    Idle,
    Active(ActivePlay<'a>),
}

impl<'a> SegmenterState<'a> {
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self, SegmenterState::Active(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    BallSettled,
    Dispersed,
    Capped,
    EndOfStream,
}

/// A closed play interval together with the sampled frames it spans
#[derive(Debug, Clone)]
pub struct PlayWindow<'a> {
    pub start_frame: u64,
    pub end_frame: u64,
    pub start_time: f64,
    pub end_time: f64,
    pub player_count: usize,
    pub reason: CloseReason,
    pub frames: Vec<&'a FrameRecord>,
}

impl<'a> PlayWindow<'a> {
    #[inline]
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Idle/Active play detector. `step` is a pure transition over one sampled
/// frame; driving it over a whole timeline is left to the caller (see
/// `PlayScanner`).
#[derive(Debug, Clone)]
pub struct Segmenter {
    min_duration: f64,
    max_duration: f64,
    settle_window: f64,
    ball_threshold: f32,
    dispersal_distance: f32,
    activation_players: usize,
    dispersal_players: usize,
    fps: f64,
}

impl Segmenter {
    /// `fps` is the rate frame timestamps were derived with; it maps the
    /// duration cap back to a frame number.
    pub fn new(cfg: &Config, fps: f64) -> Self {
        Self {
            min_duration: cfg.min_play_duration,
            max_duration: cfg.max_play_duration,
            settle_window: cfg.ball_settle_window,
            ball_threshold: cfg.ball_movement_threshold,
            dispersal_distance: cfg.player_clustering_threshold,
            activation_players: cfg.activation_player_count,
            dispersal_players: cfg.dispersal_player_count,
            fps,
        }
    }

    pub fn step<'a>(
        &self,
        state: SegmenterState<'a>,
        frame: &'a FrameRecord,
    ) -> (SegmenterState<'a>, Option<PlayWindow<'a>>) {
        let mut play = match state {
            SegmenterState::Idle => return (self.try_open(frame), None),
            SegmenterState::Active(play) => play,
        };

        if frame.timestamp - play.start_time > self.max_duration + TIME_EPSILON {
            // the overrunning frame starts afresh
            let capped = self.cap(play);
            return (self.try_open(frame), Some(capped));
        }

        play.observe(frame);

        match self.close_reason(&play, frame) {
            Some(reason) => {
                let closed = self.close(play, frame.frame_number, frame.timestamp, reason);
                (SegmenterState::Idle, closed)
            }

            None => (SegmenterState::Active(play), None),
        }
    }

    /// Closes a play left open when the stream ends
    pub fn finish<'a>(&self, state: SegmenterState<'a>) -> Option<PlayWindow<'a>> {
        match state {
            SegmenterState::Idle => None,
            SegmenterState::Active(play) => {
                let (end_frame, end_time) = play.last_frame();
                self.close(play, end_frame, end_time, CloseReason::EndOfStream)
            }
        }
    }

    fn try_open<'a>(&self, frame: &'a FrameRecord) -> SegmenterState<'a> {
        if frame.player_count < self.activation_players {
            return SegmenterState::Idle;
        }

        let anchor = Anchor::of(frame);
        debug!(
            frame = frame.frame_number,
            players = frame.player_count,
            spread = anchor.spread,
            "play opened"
        );

        let mut play = ActivePlay {
            start_frame: frame.frame_number,
            start_time: frame.timestamp,
            anchor,
            frames: Vec::new(),
            ball: TimeWindow::new(self.settle_window),
            peak_players: 0,
        };
        play.observe(frame);

        SegmenterState::Active(play)
    }

    fn close_reason(&self, play: &ActivePlay<'_>, frame: &FrameRecord) -> Option<CloseReason> {
        if play.ball.is_full() && play.ball.max_displacement() < self.ball_threshold {
            return Some(CloseReason::BallSettled);
        }

        if frame.player_count < self.dispersal_players {
            return Some(CloseReason::Dispersed);
        }

        let spread = math::mean_pairwise_distance(&frame.player_centers());
        if spread - play.anchor.spread > self.dispersal_distance {
            return Some(CloseReason::Dispersed);
        }

        None
    }

    fn cap<'a>(&self, play: ActivePlay<'a>) -> PlayWindow<'a> {
        // last frame at or before the cap, sampled or not
        let (last_seen, _) = play.last_frame();
        let end_time = play.start_time + self.max_duration;
        let end_frame = ((end_time * self.fps + TIME_EPSILON).floor() as u64).max(last_seen);

        debug!(
            start = play.start_frame,
            end = end_frame,
            "play reached the duration cap, force-closed"
        );

        PlayWindow {
            start_frame: play.start_frame,
            end_frame,
            start_time: play.start_time,
            end_time,
            player_count: play.peak_players,
            reason: CloseReason::Capped,
            frames: play.frames,
        }
    }

    fn close<'a>(
        &self,
        play: ActivePlay<'a>,
        end_frame: u64,
        end_time: f64,
        reason: CloseReason,
    ) -> Option<PlayWindow<'a>> {
        let duration = end_time - play.start_time;

        if duration + TIME_EPSILON < self.min_duration {
            debug!(
                start = play.start_frame,
                end = end_frame,
                duration,
                ?reason,
                "play too short, discarded"
            );
            return None;
        }

        debug!(
            start = play.start_frame,
            end = end_frame,
            duration,
            ?reason,
            "play closed"
        );

        Some(PlayWindow {
            start_frame: play.start_frame,
            end_frame,
            start_time: play.start_time,
            end_time,
            player_count: play.peak_players,
            reason,
            frames: play.frames,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BBox;
    use crate::detection::ObjectClass;
    use crate::track::TrackedObject;

    // exact binary timestamps
    const FPS: f64 = 8.0;

    fn object(class: ObjectClass, x: f32, y: f32) -> TrackedObject {
        TrackedObject {
            track_id: None,
            class,
            bbox: BBox::ltrb(x - 5.0, y - 5.0, x + 5.0, y + 5.0),
            confidence: 0.9,
            team_color: None,
        }
    }

    /// `players` in a row `gap` pixels apart, optional ball
    fn frame(n: u64, players: usize, gap: f32, ball: Option<(f32, f32)>) -> FrameRecord {
        let mut objects: Vec<_> = (0..players)
            .map(|i| object(ObjectClass::Player, 100.0 + i as f32 * gap, 300.0))
            .collect();
        objects.extend(ball.map(|(x, y)| object(ObjectClass::Ball, x, y)));

        FrameRecord::new(n, FPS, objects)
    }

    fn run<'a>(seg: &Segmenter, frames: &'a [FrameRecord]) -> Vec<PlayWindow<'a>> {
        let mut out = Vec::new();
        let mut state = SegmenterState::Idle;

        for f in frames {
            let (next, closed) = seg.step(state, f);
            state = next;
            out.extend(closed);
        }

        out.extend(seg.finish(state));
        out
    }

    #[test]
    fn idle_stays_idle_below_activation() {
        let seg = Segmenter::new(&Config::default(), FPS);
        let f = frame(0, 5, 20.0, None);

        let (state, closed) = seg.step(SegmenterState::Idle, &f);
        assert!(!state.is_active());
        assert!(closed.is_none());
    }

    #[test]
    fn opens_on_cluster_and_closes_on_dispersal() {
        let seg = Segmenter::new(&Config::default(), FPS);
        let frames: Vec<_> = (0..60)
            .map(|n| {
                let players = if (10..40).contains(&n) { 8 } else { 2 };
                frame(n, players, 20.0, None)
            })
            .collect();

        let plays = run(&seg, &frames);
        assert_eq!(plays.len(), 1);

        let p = &plays[0];
        assert_eq!((p.start_frame, p.end_frame), (10, 40));
        assert_eq!(p.duration(), 3.75);
        assert_eq!(p.player_count, 8);
        assert_eq!(p.reason, CloseReason::Dispersed);
        assert_eq!(p.frames.len(), 31);
    }

    #[test]
    fn short_burst_is_noise() {
        let seg = Segmenter::new(&Config::default(), FPS);
        let frames: Vec<_> = (0..30)
            .map(|n| frame(n, if (5..15).contains(&n) { 7 } else { 1 }, 20.0, None))
            .collect();

        assert!(run(&seg, &frames).is_empty());
    }

    #[test]
    fn spreading_cluster_disperses() {
        let seg = Segmenter::new(&Config::default(), FPS);
        // same head count, but the line spreads out from 20px to 80px gaps
        let frames: Vec<_> = (0..45)
            .map(|n| frame(n, 8, if n < 30 { 20.0 } else { 80.0 }, None))
            .collect();

        let plays = run(&seg, &frames);
        assert_eq!(plays.len(), 1);
        assert_eq!(plays[0].end_frame, 30);
        assert_eq!(plays[0].reason, CloseReason::Dispersed);
    }

    #[test]
    fn settled_ball_closes_play() {
        let seg = Segmenter::new(&Config::default(), FPS);
        // ball travels for 2.5s, then sits still
        let frames: Vec<_> = (0..80)
            .map(|n| {
                let x = 100.0 + (n.min(20) as f32) * 30.0;
                frame(n, 8, 20.0, Some((x, 300.0)))
            })
            .collect();

        let plays = run(&seg, &frames);
        assert_eq!(plays[0].reason, CloseReason::BallSettled);
        // the window needs 2s of samples all within 50px of the oldest
        assert_eq!(plays[0].end_frame, 35);
        assert_eq!(plays[0].start_frame, 0);
    }

    #[test]
    fn runaway_play_is_capped_and_scanning_resumes() {
        let cfg = Config {
            max_play_duration: 5.0,
            ..Config::default()
        };
        let seg = Segmenter::new(&cfg, FPS);
        let frames: Vec<_> = (0..120).map(|n| frame(n, 8, 20.0, None)).collect();

        let plays = run(&seg, &frames);
        assert!(plays.len() >= 2);
        assert_eq!(plays[0].reason, CloseReason::Capped);
        assert_eq!(plays[0].start_frame, 0);
        assert_eq!(plays[0].duration(), 5.0);
        assert_eq!(plays[0].end_frame, 40);
        // the overrunning frame opens the next play
        assert_eq!(plays[1].start_frame, 41);

        for p in &plays {
            assert!(p.duration() <= 5.0 + 1e-9);
            assert!(p.duration() + 1e-9 >= cfg.min_play_duration);
        }
        for w in plays.windows(2) {
            assert!(w[0].end_time <= w[1].start_time);
        }
    }

    #[test]
    fn capped_play_ends_on_the_cap_frame_despite_gaps() {
        let cfg = Config {
            max_play_duration: 5.0,
            ..Config::default()
        };
        let seg = Segmenter::new(&cfg, FPS);
        // every third frame only: 39 is the last one seen before the 5s cap
        let frames: Vec<_> = (0..90)
            .step_by(3)
            .map(|n| frame(n, 8, 20.0, None))
            .collect();

        let plays = run(&seg, &frames);
        assert_eq!(plays[0].reason, CloseReason::Capped);
        assert_eq!(plays[0].end_frame, 40);
        assert_eq!(plays[0].end_time, 5.0);
        assert_eq!(plays[0].end_time, plays[0].end_frame as f64 / FPS);
        assert_eq!(plays[1].start_frame, 42);
    }

    #[test]
    fn open_play_closes_at_end_of_stream() {
        let seg = Segmenter::new(&Config::default(), FPS);
        let frames: Vec<_> = (0..35).map(|n| frame(n, 8, 20.0, None)).collect();

        let plays = run(&seg, &frames);
        assert_eq!(plays.len(), 1);
        assert_eq!(plays[0].reason, CloseReason::EndOfStream);
        assert_eq!(plays[0].end_frame, 34);
    }

    #[test]
    fn empty_stream_has_no_plays() {
        let seg = Segmenter::new(&Config::default(), FPS);
        let frames: Vec<_> = (0..100).map(|n| frame(n, 0, 0.0, None)).collect();

        assert!(run(&seg, &frames).is_empty());
        assert!(run(&seg, &[]).is_empty());
    }
}
