use ndarray::{s, Array3};
use proptest::prelude::*;

use qplay::bbox::BBox;
use qplay::{
    Analysis, AnalysisSession, CancellationToken, Config, Detection, KeyEvent, PlayType,
    TeamColor, Track,
};

const FPS: f64 = 30.0;

fn player_at(x: f32, y: f32) -> Detection {
    Detection::player(BBox::ltrb(x - 10.0, y - 20.0, x + 10.0, y + 20.0), 0.9)
}

fn ball_at(x: f32, y: f32) -> Detection {
    Detection::ball(BBox::ltrb(x - 3.0, y - 3.0, x + 3.0, y + 3.0), 0.7)
}

/// `n` players on one line, far enough apart that no three form a pile
fn line(n: usize) -> Vec<Detection> {
    (0..n).map(|i| player_at(50.0 + i as f32 * 150.0, 300.0)).collect()
}

fn run(frames: impl IntoIterator<Item = (u64, Vec<Detection>)>) -> Analysis {
    let mut session = AnalysisSession::new(Config::default(), FPS).unwrap();
    for (n, dets) in frames {
        session.ingest(n, &dets, &[], None).unwrap();
    }

    session.finish(&CancellationToken::new())
}

fn players_for(n: u64) -> usize {
    match n {
        0..=9 => 2,
        10..=69 => 8,
        _ => 3,
    }
}

fn lerp(from: f32, to: f32, n: u64) -> f32 {
    let t = (n.clamp(10, 70) - 10) as f32 / 60.0;
    from + (to - from) * t
}

#[test]
fn crowd_forms_and_disperses() {
    let analysis = run((0..100).map(|n| (n, line(players_for(n)))));

    assert_eq!(analysis.plays.len(), 1);
    let play = &analysis.plays[0];
    assert_eq!(play.play_id, 1);
    assert_eq!((play.start_frame, play.end_frame), (10, 70));
    assert!((play.duration - 2.0).abs() < 1e-6);
    assert_eq!(play.player_count, 8);
    assert_eq!(play.play_type, PlayType::Unknown);
}

#[test]
fn sideways_ball_is_a_run() {
    let analysis = run((0..100).map(|n| {
        let mut dets = line(players_for(n));
        dets.push(ball_at(lerp(100.0, 450.0, n), 300.0));
        (n, dets)
    }));

    assert_eq!(analysis.plays.len(), 1);
    assert_eq!(analysis.plays[0].play_type, PlayType::Run);
    assert_eq!(
        analysis.plays[0].key_events,
        vec![KeyEvent::Snap, KeyEvent::Handoff]
    );
}

#[test]
fn upfield_ball_is_a_pass() {
    let analysis = run((0..100).map(|n| {
        let mut dets = line(players_for(n));
        dets.push(ball_at(200.0, lerp(300.0, 150.0, n)));
        (n, dets)
    }));

    assert_eq!(analysis.plays.len(), 1);
    let play = &analysis.plays[0];
    assert_eq!(play.play_type, PlayType::Pass);
    assert!(play.key_events.contains(&KeyEvent::Pass));

    let events: Vec<String> = play.key_events.iter().map(|e| e.to_string()).collect();
    assert!(events.iter().any(|e| e == "pass"));
}

#[test]
fn pile_up_is_one_tackle() {
    let pile = [(500.0, 500.0), (540.0, 520.0), (520.0, 560.0)];

    let analysis = run((0..100).map(|n| {
        let mut dets = line(players_for(n));
        if (40..46).contains(&n) {
            for (det, &(x, y)) in dets.iter_mut().zip(pile.iter()) {
                *det = player_at(x, y);
            }
        }
        (n, dets)
    }));

    assert_eq!(analysis.plays.len(), 1);
    let tackles = analysis.plays[0]
        .key_events
        .iter()
        .filter(|e| **e == KeyEvent::Tackle)
        .count();
    assert_eq!(tackles, 1);
}

#[test]
fn empty_stream_has_no_plays() {
    let analysis = run(std::iter::empty());

    assert!(analysis.plays.is_empty());
    assert!(analysis.frames.is_empty());
    assert!(!analysis.cancelled);
}

#[test]
fn tracked_players_keep_their_color() {
    let bbox = BBox::ltrb(40.0, 40.0, 80.0, 120.0);
    let painted = |rgb: [u8; 3]| {
        let mut img = Array3::<u8>::zeros((200, 200, 3));
        img.slice_mut(s![.., .., 1]).fill(128);
        for (c, v) in rgb.iter().enumerate() {
            img.slice_mut(s![40..120, 40..60, c]).fill(*v);
        }
        img
    };

    let red = painted([255, 0, 0]);
    let blue = painted([0, 0, 255]);
    let track = [Track::new(3, bbox)];

    let mut session = AnalysisSession::new(Config::default(), FPS).unwrap();

    let confident = [Detection::player(bbox, 0.9)];
    for n in 0..5 {
        let img = if n == 0 { &red } else { &blue };
        let rec = session.ingest(n, &confident, &track, Some(img.view())).unwrap();
        assert_eq!(rec.objects[0].team_color, Some(TeamColor::Red));
    }

    // a shaky re-detection forces a fresh look
    let shaky = [Detection::player(bbox, 0.1)];
    let rec = session.ingest(5, &shaky, &track, Some(blue.view())).unwrap();
    assert_eq!(rec.objects[0].team_color, Some(TeamColor::Blue));
    assert_eq!(session.team_colors().get(3), Some(TeamColor::Blue));
}

#[test]
fn analysis_serializes_for_the_caller() {
    let analysis = run((0..100).map(|n| {
        let mut dets = line(players_for(n));
        dets.push(ball_at(lerp(100.0, 450.0, n), 300.0));
        (n, dets)
    }));

    let json = serde_json::to_value(&analysis).unwrap();
    assert_eq!(json["plays"][0]["play_type"], "run");
    assert_eq!(json["plays"][0]["key_events"][1], "handoff");

    let back: Analysis = serde_json::from_value(json).unwrap();
    assert_eq!(back.plays, analysis.plays);
}

fn timeline() -> impl Strategy<Value = Vec<(u64, usize, Option<(f32, f32)>)>> {
    prop::collection::vec(
        (1u64..4, 0usize..12, prop::option::of((0.0f32..1000.0, 0.0f32..600.0))),
        0..600,
    )
    .prop_map(|steps| {
        let mut n = 0;
        steps
            .into_iter()
            .map(|(gap, players, ball)| {
                n += gap;
                (n, players, ball)
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn segments_are_bounded_ordered_and_numbered(frames in timeline(), skip in 1usize..4) {
        let cfg = Config {
            max_play_duration: 5.0,
            frame_skip: skip,
            ..Config::default()
        };
        let (min, max) = (cfg.min_play_duration, cfg.max_play_duration);

        let mut session = AnalysisSession::new(cfg, FPS).unwrap();
        for (n, players, ball) in frames {
            let mut dets = line(players);
            dets.extend(ball.map(|(x, y)| ball_at(x, y)));
            session.ingest(n, &dets, &[], None).unwrap();
        }

        let plays = session.finish(&CancellationToken::new()).plays;

        for (i, play) in plays.iter().enumerate() {
            prop_assert_eq!(play.play_id as usize, i + 1);
            prop_assert!(play.duration >= min - 1e-6);
            prop_assert!(play.duration <= max + 1e-6);
            prop_assert!(play.start_frame <= play.end_frame);
            prop_assert!(play.start_time <= play.end_time);
        }

        for pair in plays.windows(2) {
            prop_assert!(pair[0].end_time <= pair[1].start_time + 1e-9);
            prop_assert!(pair[0].end_frame <= pair[1].start_frame);
        }
    }
}
