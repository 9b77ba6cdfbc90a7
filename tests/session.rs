//! Headless sessions played end to end through the public API

use std::cell::RefCell;
use std::rc::Rc;

use powder_run::consts::SIM_DT;
use powder_run::services::{
    Cue, FeedbackSink, HudSink, HudSnapshot, PlayerProfile, RunRecord, ScoreSink, Services,
};
use powder_run::sim::{CollectibleKind, GamePhase, MeshResolution};
use powder_run::{Session, SessionLeaderboard, Tuning};

#[derive(Default)]
struct Log {
    cues: Vec<Cue>,
    runs: Vec<RunRecord>,
    last_hud: Option<HudSnapshot>,
}

#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Log>>);

impl FeedbackSink for Recorder {
    fn cue(&mut self, cue: Cue) {
        self.0.borrow_mut().cues.push(cue);
    }
}

impl ScoreSink for Recorder {
    fn record(&mut self, record: RunRecord) {
        self.0.borrow_mut().runs.push(record);
    }
}

impl HudSink for Recorder {
    fn update(&mut self, hud: &HudSnapshot) {
        self.0.borrow_mut().last_hud = Some(*hud);
    }

    fn toast(&mut self, _item: CollectibleKind, _delta: i64) {}
}

const FRAME_MS: f64 = SIM_DT * 1000.0;

fn new_session(seed: u64, recorder: &Recorder) -> Session {
    Session::new(
        seed,
        Tuning::default(),
        MeshResolution { cols: 8, rows: 8 },
        PlayerProfile {
            name: "Tester".to_string(),
            thumbnail: None,
        },
        Services::new(recorder.clone(), recorder.clone(), recorder.clone()),
        0.0,
    )
}

/// Play until the level ends, weaving left and right. Returns the end time.
fn play_level(session: &mut Session, mut now: f64) -> f64 {
    let mut frames = 0u64;
    while session.phase() == GamePhase::Playing {
        now += FRAME_MS;
        frames += 1;
        let direction = if (frames / 90) % 2 == 0 { 1 } else { -1 };
        session.set_direction(direction);
        session.frame(now);
        session.clock(now);
        assert!(frames < 10_000, "level never finished");
    }
    now
}

#[test]
fn test_full_level_runs_to_completion() {
    let recorder = Recorder::default();
    let mut session = new_session(11, &recorder);
    let budget = session.state.tuning.level.time_budget_secs;

    let end = play_level(&mut session, 0.0);

    assert_eq!(session.phase(), GamePhase::LevelComplete);
    assert!(end >= budget as f64 * 1000.0);
    let log = recorder.0.borrow();
    assert_eq!(log.runs.len(), 1);
    assert_eq!(log.runs[0].level, 1);
    assert_eq!(log.runs[0].score, session.state.score);
    assert_eq!(log.runs[0].name, "Tester");
    assert!(log.cues.contains(&Cue::LevelComplete));
    let hud = log.last_hud.expect("hud updated");
    assert_eq!(hud.time_remaining, 0);
    assert_eq!(hud.phase, GamePhase::LevelComplete);
}

#[test]
fn test_levels_progress_and_reset() {
    let recorder = Recorder::default();
    let mut session = new_session(5, &recorder);
    let level_one_speed = session.state.difficulty.speed_baseline;

    let mut now = play_level(&mut session, 0.0);
    assert!(session.advance_level(now));
    assert!(!session.advance_level(now), "advance only from level complete");

    assert_eq!(session.state.level, 2);
    assert_eq!(session.state.score, 0);
    assert_eq!(
        session.state.time_remaining,
        session.state.tuning.level.time_budget_secs
    );
    assert!(session.state.difficulty.speed_baseline > level_one_speed);
    assert!(!session.state.spawner.pool.is_empty());

    now = play_level(&mut session, now);
    assert!(session.advance_level(now));
    assert_eq!(session.state.level, 3);

    let log = recorder.0.borrow();
    let levels: Vec<u32> = log.runs.iter().map(|r| r.level).collect();
    assert_eq!(levels, vec![1, 2]);
}

#[test]
fn test_same_seed_same_run() {
    let play = |seed| {
        let recorder = Recorder::default();
        let mut session = new_session(seed, &recorder);
        play_level(&mut session, 0.0);
        (
            session.state.score,
            session.state.steps,
            session.state.player.lateral,
        )
    };
    assert_eq!(play(99), play(99));
}

#[test]
fn test_teardown_mid_level_stops_everything() {
    let recorder = Recorder::default();
    let mut session = new_session(8, &recorder);
    let mut now = 0.0;
    for _ in 0..120 {
        now += FRAME_MS;
        session.frame(now);
        session.clock(now);
    }
    session.teardown();
    let steps = session.state.steps;
    let time_left = session.state.time_remaining;

    for _ in 0..600 {
        now += 100.0;
        assert_eq!(session.frame(now), 0);
        session.clock(now);
    }
    assert_eq!(session.state.steps, steps);
    assert_eq!(session.state.time_remaining, time_left);
    assert!(recorder.0.borrow().runs.is_empty());
}

#[test]
fn test_leaderboard_as_score_sink() {
    let mut board = SessionLeaderboard::new();
    for (score, level) in [(500, 1), (1500, 2), (900, 3)] {
        board.record(RunRecord {
            name: "Tester".to_string(),
            thumbnail: None,
            score,
            level,
        });
    }
    let scores: Vec<u64> = board.entries.iter().map(|e| e.score).collect();
    assert_eq!(scores, vec![1500, 900, 500]);
    assert_eq!(board.top_score(), Some(1500));
}
