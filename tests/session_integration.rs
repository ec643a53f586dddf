//! Integration tests for complete simulation sessions

use std::path::Path;

use clinical_sim::core::config::EngineConfig;
use clinical_sim::core::error::SimError;
use clinical_sim::core::types::{EventId, Phase};
use clinical_sim::engine::{CompletionReason, RecordingObserver, SessionController};
use clinical_sim::scenario::{library, ClinicalEvent, ScenarioDefinition};
use clinical_sim::vitals::{VitalChannel, VitalSigns, VitalsDelta};

fn controller() -> SessionController {
    SessionController::new(EngineConfig::without_drift()).unwrap()
}

/// Heart rate 80, one decision at t=5, correct option 1, impact HR +20
fn reference_scenario() -> ScenarioDefinition {
    let vitals = VitalSigns {
        heart_rate: 80.0,
        ..VitalSigns::default()
    };
    ScenarioDefinition::new("reference", "Reference", vitals).with_event(
        ClinicalEvent::decision("choice", 5, "Pick one", &["A", "B"], 1)
            .with_impact(VitalsDelta::new().with(VitalChannel::HeartRate, 20.0)),
    )
}

/// Play a session to completion, answering with `choose`
fn play(
    controller: &mut SessionController,
    mut choose: impl FnMut(&ClinicalEvent) -> Option<usize>,
) {
    let mut guard = 0;
    while controller.phase() != Phase::Completed {
        guard += 1;
        assert!(guard < 10_000, "session never completed");

        match controller.phase() {
            Phase::AwaitingDecision => {
                let choice = controller
                    .state()
                    .and_then(|s| s.pending_event())
                    .and_then(|e| choose(e));
                controller.submit_decision(choice).unwrap();
            }
            _ => {
                controller.advance(60).unwrap();
            }
        }
    }
}

#[test]
fn test_incorrect_answer_walkthrough() {
    let mut c = controller();
    c.start(reference_scenario()).unwrap();

    c.advance(5).unwrap();
    assert_eq!(c.phase(), Phase::AwaitingDecision);
    assert_eq!(c.state().unwrap().time(), 5);
    assert!(!c.clock().is_running());

    c.submit_decision(Some(0)).unwrap();
    let state = c.state().unwrap();
    assert_eq!(state.score(), 90);
    assert_eq!(state.vitals().heart_rate, 100.0);
    assert_eq!(state.history().len(), 1);
    assert!(!state.history().records()[0].correct);
    assert_eq!(c.phase(), Phase::Running);
}

#[test]
fn test_zero_event_scenario_keeps_full_score() {
    let mut c = controller();
    c.start(ScenarioDefinition::new("quiet", "Quiet shift", VitalSigns::default()))
        .unwrap();

    for _ in 0..30 {
        c.tick().unwrap();
        assert_ne!(c.phase(), Phase::AwaitingDecision);
    }

    let result = c.complete().unwrap();
    assert_eq!(result.final_score, 100);
    assert!(result.decision_history.is_empty());
    assert_eq!(result.total_time_elapsed, 30);
}

#[test]
fn test_second_completion_rejected_but_result_kept() {
    let mut c = controller();
    c.start(reference_scenario()).unwrap();
    c.advance(3).unwrap();

    let first = c.complete().unwrap();
    let second = c.complete();
    assert!(matches!(
        second,
        Err(SimError::InvalidPhaseTransition {
            phase: Phase::Completed,
            ..
        })
    ));
    assert_eq!(c.result(), Some(&first));
}

#[test]
fn test_complete_while_awaiting_decision() {
    let mut c = controller();
    c.start(reference_scenario()).unwrap();
    c.advance(5).unwrap();

    let result = c.complete().unwrap();
    assert_eq!(result.reason, CompletionReason::Manual);
    assert!(result.decision_history.is_empty());
    assert_eq!(result.total_time_elapsed, 5);
}

#[test]
fn test_builtin_scenarios_all_correct() {
    for scenario in library::all() {
        let expected = scenario.events.iter().filter(|e| e.has_options()).count();
        let total = scenario.events.len();
        let mut c = SessionController::new(EngineConfig::default().with_seed(11)).unwrap();
        c.start(scenario).unwrap();

        play(&mut c, |e| e.correct_option);

        let result = c.result().unwrap();
        assert_eq!(result.final_score, 100);
        assert_eq!(result.decision_history.len(), total);
        assert_eq!(
            result.decision_history.iter().filter(|r| r.chosen_option.is_some()).count(),
            expected
        );
        assert_eq!(result.reason, CompletionReason::AllEventsResolved);
        assert!(result.final_vitals.within_hard_ranges());
    }
}

#[test]
fn test_lapsing_every_decision() {
    let scenario = library::acute_mi();
    let with_options = scenario.events.iter().filter(|e| e.has_options()).count() as u32;

    let mut c = SessionController::new(EngineConfig::default().with_seed(5)).unwrap();
    c.start(scenario).unwrap();
    play(&mut c, |_| None);

    let result = c.result().unwrap();
    assert_eq!(result.final_score, 100 - 10 * with_options);
}

#[test]
fn test_score_floors_at_zero() {
    let mut scenario = ScenarioDefinition::new("drill", "Drill", VitalSigns::default());
    for i in 0..15 {
        scenario = scenario.with_event(ClinicalEvent::decision(
            format!("q{i}"),
            i + 1,
            "?",
            &["A", "B"],
            0,
        ));
    }
    let mut c = controller();
    c.start(scenario).unwrap();

    play(&mut c, |_| Some(1));

    let result = c.result().unwrap();
    assert_eq!(result.decision_history.len(), 15);
    assert!(result.decision_history.iter().all(|r| !r.correct));
    assert_eq!(result.final_score, 0);
}

#[test]
fn test_score_stays_at_zero_while_wrong() {
    let mut scenario = ScenarioDefinition::new("drill", "Drill", VitalSigns::default());
    for i in 0..12 {
        scenario = scenario.with_event(ClinicalEvent::decision(
            format!("q{i}"),
            i + 1,
            "?",
            &["A", "B"],
            0,
        ));
    }
    let mut c = controller();
    c.start(scenario).unwrap();

    let mut seen = Vec::new();
    while c.phase() != Phase::Completed {
        if c.phase() == Phase::AwaitingDecision {
            c.submit_decision(None).unwrap();
            seen.push(c.state().unwrap().score());
        } else {
            c.advance(5).unwrap();
        }
    }

    assert_eq!(seen, vec![90, 80, 70, 60, 50, 40, 30, 20, 10, 0, 0, 0]);
    assert_eq!(c.result().unwrap().final_score, 0);
}

#[test]
fn test_history_matches_resolution_order() {
    let mut c = controller();
    c.start(library::septic_shock()).unwrap();
    play(&mut c, |e| e.correct_option);

    let history = &c.result().unwrap().decision_history;
    let ids: Vec<&str> = history.iter().map(|r| r.event_id.as_str()).collect();
    // fluid-bolus and antibiotics share t=40 and resolve in definition order
    assert_eq!(
        ids,
        vec!["recognition", "fluid-bolus", "antibiotics", "vasopressor"]
    );
    assert!(history.windows(2).all(|w| w[0].resolved_at <= w[1].resolved_at));
}

#[test]
fn test_seeded_sessions_are_reproducible() {
    let run = |seed| {
        let mut c = SessionController::new(EngineConfig::default().with_seed(seed)).unwrap();
        c.start(library::anaphylaxis()).unwrap();
        play(&mut c, |e| e.correct_option);
        c.result().unwrap().final_vitals
    };
    assert_eq!(run(99), run(99));
}

#[test]
fn test_stale_decision_after_superseded_event() {
    let scenario = ScenarioDefinition::new("two", "Two", VitalSigns::default())
        .with_event(ClinicalEvent::decision("first", 2, "?", &["A", "B"], 0))
        .with_event(ClinicalEvent::decision("second", 4, "?", &["A", "B"], 0));
    let mut c = controller();
    c.start(scenario).unwrap();

    c.advance(2).unwrap();
    c.submit_decision_for(&EventId::from("first"), Some(0)).unwrap();
    c.advance(2).unwrap();

    // A late callback from the first prompt arrives while the second is pending
    let err = c
        .submit_decision_for(&EventId::from("first"), Some(1))
        .unwrap_err();
    match err {
        SimError::StaleDecision { submitted, pending } => {
            assert_eq!(submitted, EventId::from("first"));
            assert_eq!(pending, Some(EventId::from("second")));
        }
        other => panic!("expected stale decision, got {other:?}"),
    }
    assert_eq!(c.state().unwrap().history().len(), 1);
}

#[test]
fn test_load_scenario_from_data_dir() {
    let scenario =
        ScenarioDefinition::load_from_toml(Path::new("data/scenarios/post_op_hemorrhage.toml"))
            .unwrap();
    assert_eq!(scenario.id, "post-op-hemorrhage");
    assert_eq!(scenario.events.len(), 3);
    assert_eq!(scenario.duration_seconds, Some(120));

    let mut c = controller();
    c.start(scenario).unwrap();
    play(&mut c, |e| e.correct_option);

    let result = c.result().unwrap();
    assert_eq!(result.final_score, 100);
    // 118 - 10 + 8
    assert_eq!(result.final_vitals.heart_rate, 116.0);
}

#[test]
fn test_observer_sees_every_tick() {
    let recorder = RecordingObserver::new();
    let mut c = controller();
    c.add_observer(Box::new(recorder.clone()));
    c.start(ScenarioDefinition::new("quiet", "Quiet", VitalSigns::default()).with_duration(10))
        .unwrap();
    c.advance(100).unwrap();

    assert_eq!(c.phase(), Phase::Completed);
    // start + 10 ticks + completion
    assert_eq!(recorder.snapshot_count(), 12);
    let times: Vec<u64> = recorder
        .snapshots
        .lock()
        .unwrap()
        .iter()
        .map(|s| s.time)
        .collect();
    assert!(times.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(recorder.results()[0].reason, CompletionReason::DurationReached);
}
