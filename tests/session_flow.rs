//! End-to-end specifications for the quiz session state machine, driven
//! through the public library surface the way the rendering layer drives it.

use std::collections::HashSet;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use elasticity_quiz::quiz::{
    Dataset, GoodRecord, QuizKind, QuizSession, QuizStage, ScoringMode, SessionLedger,
    SessionRules, Submission,
};

fn oil_dataset() -> Arc<Dataset> {
    let dataset = Dataset::new(vec![GoodRecord {
        name: "Crude Oil".to_string(),
        demand_elasticity: -0.4,
        supply_elasticity: 0.15,
    }])
    .expect("valid dataset");
    Arc::new(dataset)
}

fn trio_dataset() -> Arc<Dataset> {
    let goods = vec![
        GoodRecord {
            name: "Gasoline".to_string(),
            demand_elasticity: -0.25,
            supply_elasticity: 0.6,
        },
        GoodRecord {
            name: "Coffee".to_string(),
            demand_elasticity: -0.55,
            supply_elasticity: 0.8,
        },
        GoodRecord {
            name: "Salt".to_string(),
            demand_elasticity: -0.1,
            supply_elasticity: 0.7,
        },
    ];
    Arc::new(Dataset::new(goods).expect("valid dataset"))
}

#[test]
fn perfect_guesses_earn_the_maximum_question_total() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut session = QuizSession::new(oil_dataset(), SessionRules::continuous(), &mut rng)
        .expect("session starts");

    assert_eq!(session.submit_demand_guess("-0.4"), Submission::Accepted);
    assert_eq!(session.submit_supply_guess("0.15"), Submission::Accepted);
    assert_eq!(session.stage(), QuizStage::ShowingResult);

    let result = session
        .ledger()
        .history
        .last()
        .expect("question recorded");
    assert_eq!(result.demand.points, 2_000);
    assert_eq!(
        result.supply.as_ref().expect("supply scored").points,
        2_000
    );

    let incidence = result.incidence.as_ref().expect("incidence scored");
    let guessed = incidence.guessed_share.expect("guessed share defined");
    let actual = incidence.actual_share.expect("actual share defined");
    assert!((guessed - actual).abs() < 1e-12);
    assert!((actual - 0.272727).abs() < 1e-6);
    assert_eq!(incidence.points, 1_000);

    assert_eq!(result.total_points, 5_000);
    assert_eq!(session.ledger().total_score, 5_000);
}

#[test]
fn fixed_length_session_completes_and_resets_cleanly() {
    let rules = SessionRules {
        mode: ScoringMode::Continuous,
        kind: QuizKind::Full,
        length: Some(2),
    };
    let mut rng = StdRng::seed_from_u64(2);
    let mut session =
        QuizSession::new(oil_dataset(), rules, &mut rng).expect("session starts");

    for _ in 0..2 {
        assert_eq!(session.submit_demand_guess("-0.4"), Submission::Accepted);
        assert_eq!(session.submit_supply_guess("0.15"), Submission::Accepted);
        session.advance(&mut rng).expect("advance succeeds");
    }

    assert_eq!(session.stage(), QuizStage::SessionComplete);
    assert_eq!(session.ledger().questions_completed, 2);

    // Terminal until reset: nothing moves the machine.
    assert_eq!(session.submit_demand_guess("-0.4"), Submission::Ignored);
    session.advance(&mut rng).expect("advance is a no-op");
    assert_eq!(session.stage(), QuizStage::SessionComplete);

    session.reset(&mut rng).expect("reset succeeds");
    assert_eq!(session.stage(), QuizStage::AwaitingDemandGuess);
    assert_eq!(session.ledger(), &SessionLedger::new());
}

#[test]
fn final_advance_lands_in_session_complete_not_a_new_question() {
    let rules = SessionRules {
        mode: ScoringMode::Continuous,
        kind: QuizKind::Full,
        length: Some(1),
    };
    let mut rng = StdRng::seed_from_u64(3);
    let mut session =
        QuizSession::new(trio_dataset(), rules, &mut rng).expect("session starts");

    session.submit_demand_guess("-0.3");
    session.submit_supply_guess("0.5");
    session.advance(&mut rng).expect("advance succeeds");

    assert_eq!(session.stage(), QuizStage::SessionComplete);
    assert!(session.current_good().is_some());
    assert_eq!(session.ledger().questions_completed, 1);
}

#[test]
fn streak_sessions_run_forever_and_track_streaks() {
    let mut rng = StdRng::seed_from_u64(4);
    let mut session = QuizSession::new(oil_dataset(), SessionRules::streak(), &mut rng)
        .expect("session starts");

    // Correct, correct, wrong, correct.
    let guesses = ["-0.4", "-0.35", "-2.0", "-0.45"];
    for guess in guesses {
        assert_eq!(session.submit_demand_guess(guess), Submission::Accepted);
        session.advance(&mut rng).expect("advance succeeds");
        assert_eq!(session.stage(), QuizStage::AwaitingDemandGuess);
    }

    let ledger = session.ledger();
    assert_eq!(ledger.questions_completed, 4);
    assert_eq!(ledger.total_score, 3);
    assert_eq!(ledger.streak, 1);
    assert_eq!(ledger.best_streak, 2);
}

#[test]
fn goods_do_not_repeat_within_a_cycle() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut session = QuizSession::new(trio_dataset(), SessionRules::streak(), &mut rng)
        .expect("session starts");

    let mut seen = HashSet::new();
    for _ in 0..3 {
        let name = session
            .current_good()
            .expect("a good is on display")
            .to_string();
        assert!(seen.insert(name), "good repeated before the pool emptied");

        session.submit_demand_guess("-0.5");
        session.advance(&mut rng).expect("advance succeeds");
    }

    // The pool is spent; the cycle restarts and keeps serving questions.
    assert!(session.current_good().is_some());
    assert_eq!(session.ledger().questions_completed, 3);
}

#[test]
fn advancing_before_the_reveal_changes_nothing() {
    let mut rng = StdRng::seed_from_u64(6);
    let mut session = QuizSession::new(oil_dataset(), SessionRules::continuous(), &mut rng)
        .expect("session starts");

    let before = session.snapshot();
    session.advance(&mut rng).expect("advance is a no-op");
    assert_eq!(session.snapshot(), before);
}

#[test]
fn reset_mid_session_matches_a_fresh_start() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut session = QuizSession::new(trio_dataset(), SessionRules::continuous(), &mut rng)
        .expect("session starts");

    session.submit_demand_guess("-1.0");
    session.submit_supply_guess("0.4");
    session.advance(&mut rng).expect("advance succeeds");
    session.submit_demand_guess("-0.2");

    session.reset(&mut rng).expect("reset succeeds");

    assert_eq!(session.stage(), QuizStage::AwaitingDemandGuess);
    assert_eq!(session.ledger(), &SessionLedger::new());
    let snapshot = session.snapshot();
    assert_eq!(snapshot.questions_completed, 0);
    assert!(snapshot.history.is_empty());
    assert!(snapshot.last_result.is_none());
}
