use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use super::dataset::Dataset;
use super::domain::{GoodRecord, QuestionResult, QuizKind, QuizStage, SessionLedger};
use super::scoring::{self, ScoringMode};
use super::selector::{self, EmptyDatasetError};

/// Default number of questions in a points-based session.
pub const DEFAULT_SESSION_LENGTH: u32 = 10;

/// How a session scores, what it asks, and when it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRules {
    pub mode: ScoringMode,
    pub kind: QuizKind,
    /// `None` runs forever; `Some(n)` completes after `n` questions.
    pub length: Option<u32>,
}

impl SessionRules {
    /// Points-based run: the full question set over a fixed ten questions.
    pub fn continuous() -> Self {
        Self {
            mode: ScoringMode::Continuous,
            kind: QuizKind::Full,
            length: Some(DEFAULT_SESSION_LENGTH),
        }
    }

    /// Streak-based run: demand only, endless.
    pub fn streak() -> Self {
        Self {
            mode: ScoringMode::Binary,
            kind: QuizKind::DemandOnly,
            length: None,
        }
    }

    /// Highest total a single question can award under these rules.
    pub const fn per_question_ceiling(&self) -> u32 {
        match self.kind {
            QuizKind::Full => scoring::MAX_QUESTION_POINTS,
            QuizKind::DemandOnly => scoring::DEMAND_MAX_POINTS,
        }
    }
}

/// Whether a submission was folded into the session or ignored at the
/// boundary (wrong stage, empty, or non-numeric input).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Submission {
    Accepted,
    Ignored,
}

/// One user's quiz run: the current stage, the accumulating ledger, and the
/// pool of goods not yet presented this cycle.
///
/// Every transition is synchronous and guarded by the current stage, so
/// out-of-order submissions are no-ops and a question can never be scored
/// twice.
#[derive(Debug, Clone)]
pub struct QuizSession {
    rules: SessionRules,
    dataset: Arc<Dataset>,
    stage: QuizStage,
    ledger: SessionLedger,
    used: HashSet<String>,
    current: Option<GoodRecord>,
    pending_demand: Option<f64>,
}

impl QuizSession {
    /// Start a session by drawing the first good.
    pub fn new<R: Rng + ?Sized>(
        dataset: Arc<Dataset>,
        rules: SessionRules,
        rng: &mut R,
    ) -> Result<Self, EmptyDatasetError> {
        let mut session = Self {
            rules,
            dataset,
            stage: QuizStage::AwaitingDemandGuess,
            ledger: SessionLedger::new(),
            used: HashSet::new(),
            current: None,
            pending_demand: None,
        };
        session.draw_next(rng)?;
        Ok(session)
    }

    pub fn rules(&self) -> &SessionRules {
        &self.rules
    }

    pub fn stage(&self) -> QuizStage {
        self.stage
    }

    pub fn ledger(&self) -> &SessionLedger {
        &self.ledger
    }

    /// Name of the good currently being asked about.
    pub fn current_good(&self) -> Option<&str> {
        self.current.as_ref().map(|good| good.name.as_str())
    }

    /// Submit a demand elasticity guess. Accepted only while the session is
    /// awaiting one; in a demand-only session this is the scoring step.
    pub fn submit_demand_guess(&mut self, raw: &str) -> Submission {
        if self.stage != QuizStage::AwaitingDemandGuess {
            return Submission::Ignored;
        }
        let Some(value) = parse_guess(raw) else {
            return Submission::Ignored;
        };

        match self.rules.kind {
            QuizKind::Full => {
                self.pending_demand = Some(value);
                self.stage = QuizStage::AwaitingSupplyGuess;
            }
            QuizKind::DemandOnly => {
                self.score_question(value, None);
            }
        }
        Submission::Accepted
    }

    /// Submit a supply elasticity guess. This is the scoring step of a full
    /// session; demand-only sessions ignore it entirely.
    pub fn submit_supply_guess(&mut self, raw: &str) -> Submission {
        if self.stage != QuizStage::AwaitingSupplyGuess {
            return Submission::Ignored;
        }
        let Some(value) = parse_guess(raw) else {
            return Submission::Ignored;
        };
        let Some(demand) = self.pending_demand.take() else {
            return Submission::Ignored;
        };

        self.score_question(demand, Some(value));
        Submission::Accepted
    }

    /// Leave the result screen: either complete the session or mark the
    /// current good used and draw the next one. A no-op in any other stage.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), EmptyDatasetError> {
        if self.stage != QuizStage::ShowingResult {
            return Ok(());
        }

        if self
            .rules
            .length
            .is_some_and(|length| self.ledger.questions_completed >= length)
        {
            self.stage = QuizStage::SessionComplete;
            return Ok(());
        }

        if let Some(good) = self.current.take() {
            self.used.insert(good.name);
        }
        self.pending_demand = None;
        self.draw_next(rng)?;
        self.stage = QuizStage::AwaitingDemandGuess;
        Ok(())
    }

    /// Throw away all progress and start over with a zeroed ledger and a
    /// fresh cycle.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), EmptyDatasetError> {
        self.ledger = SessionLedger::new();
        self.used.clear();
        self.pending_demand = None;
        self.current = None;
        self.draw_next(rng)?;
        self.stage = QuizStage::AwaitingDemandGuess;
        Ok(())
    }

    /// Immutable view for the rendering layer.
    pub fn snapshot(&self) -> SessionSnapshot {
        let showing_result = self.stage == QuizStage::ShowingResult;
        let continuous = self.rules.mode == ScoringMode::Continuous;
        let ceiling = self.rules.per_question_ceiling();

        SessionSnapshot {
            stage: self.stage,
            mode: self.rules.mode,
            kind: self.rules.kind,
            session_length: self.rules.length,
            current_good: self.current.as_ref().map(|good| good.name.clone()),
            total_score: self.ledger.total_score,
            questions_completed: self.ledger.questions_completed,
            streak: self.ledger.streak,
            best_streak: self.ledger.best_streak,
            average_points: continuous.then(|| self.ledger.average_points()).flatten(),
            accuracy_percent: continuous
                .then(|| self.ledger.accuracy_percent(ceiling))
                .flatten(),
            max_session_points: (continuous)
                .then(|| {
                    self.rules
                        .length
                        .map(|length| u64::from(length) * u64::from(ceiling))
                })
                .flatten(),
            last_result: showing_result
                .then(|| self.ledger.history.last().cloned())
                .flatten(),
            history: self.ledger.history.clone(),
        }
    }

    /// The single scoring point: build the question result and fold it in.
    fn score_question(&mut self, demand_guess: f64, supply_guess: Option<f64>) {
        let Some(good) = self.current.as_ref() else {
            return;
        };

        let result = QuestionResult::evaluate(
            good,
            self.ledger.questions_completed + 1,
            demand_guess,
            supply_guess,
        );
        self.ledger.record(result, self.rules.mode);
        self.stage = QuizStage::ShowingResult;
    }

    fn draw_next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), EmptyDatasetError> {
        let selection = selector::select_good(self.dataset.goods(), &self.used, rng)?;
        if selection.cycle_exhausted {
            self.used.clear();
        }
        self.current = Some(selection.good.clone());
        Ok(())
    }
}

/// Parse a guess string: trimmed, non-empty, and a finite number.
fn parse_guess(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Read-only projection of a session handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub stage: QuizStage,
    pub mode: ScoringMode,
    pub kind: QuizKind,
    pub session_length: Option<u32>,
    pub current_good: Option<String>,
    pub total_score: u64,
    pub questions_completed: u32,
    pub streak: u32,
    pub best_streak: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_points: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy_percent: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_session_points: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_result: Option<QuestionResult>,
    pub history: Vec<QuestionResult>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn oil_only() -> Arc<Dataset> {
        let dataset = Dataset::new(vec![GoodRecord {
            name: "Crude Oil".to_string(),
            demand_elasticity: -0.4,
            supply_elasticity: 0.15,
        }])
        .expect("dataset is valid");
        Arc::new(dataset)
    }

    fn full_session() -> (QuizSession, StdRng) {
        let mut rng = StdRng::seed_from_u64(42);
        let session = QuizSession::new(oil_only(), SessionRules::continuous(), &mut rng)
            .expect("session starts");
        (session, rng)
    }

    #[test]
    fn blank_and_non_numeric_input_leaves_the_session_untouched() {
        let (mut session, _) = full_session();

        for raw in ["", "   ", "not a number", "NaN", "inf"] {
            assert_eq!(session.submit_demand_guess(raw), Submission::Ignored);
            assert_eq!(session.stage(), QuizStage::AwaitingDemandGuess);
            assert_eq!(session.ledger().questions_completed, 0);
        }
    }

    #[test]
    fn supply_guess_before_demand_guess_is_a_no_op() {
        let (mut session, _) = full_session();

        assert_eq!(session.submit_supply_guess("0.15"), Submission::Ignored);
        assert_eq!(session.stage(), QuizStage::AwaitingDemandGuess);
        assert_eq!(session.ledger().questions_completed, 0);
    }

    #[test]
    fn the_scoring_transition_cannot_fire_twice() {
        let (mut session, _) = full_session();

        assert_eq!(session.submit_demand_guess("-0.4"), Submission::Accepted);
        assert_eq!(session.submit_supply_guess("0.15"), Submission::Accepted);
        assert_eq!(session.stage(), QuizStage::ShowingResult);
        let score_after_reveal = session.ledger().total_score;

        assert_eq!(session.submit_supply_guess("0.15"), Submission::Ignored);
        assert_eq!(session.submit_demand_guess("-0.4"), Submission::Ignored);
        assert_eq!(session.ledger().questions_completed, 1);
        assert_eq!(session.ledger().total_score, score_after_reveal);
    }

    #[test]
    fn demand_only_sessions_score_on_the_first_submission() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut session = QuizSession::new(oil_only(), SessionRules::streak(), &mut rng)
            .expect("session starts");

        assert_eq!(session.submit_demand_guess("-0.45"), Submission::Accepted);
        assert_eq!(session.stage(), QuizStage::ShowingResult);

        let result = session.ledger().history.last().expect("question recorded");
        assert!(result.correct);
        assert!(result.supply.is_none());
        assert!(result.incidence.is_none());
        assert_eq!(session.ledger().total_score, 1);

        // Supply submissions never apply to this variant.
        assert_eq!(session.submit_supply_guess("0.5"), Submission::Ignored);
    }

    #[test]
    fn degenerate_guessed_incidence_contributes_zero_points() {
        let (mut session, _) = full_session();

        // |demand| + supply == 0 for the guessed pair.
        assert_eq!(session.submit_demand_guess("0"), Submission::Accepted);
        assert_eq!(session.submit_supply_guess("0"), Submission::Accepted);

        let result = session.ledger().history.last().expect("question recorded");
        let incidence = result.incidence.as_ref().expect("incidence attempted");
        assert_eq!(incidence.guessed_share, None);
        assert_eq!(incidence.points, 0);
        assert!(incidence.actual_share.is_some());
        assert_eq!(
            result.total_points,
            result.demand.points + result.supply.as_ref().expect("supply scored").points
        );
    }

    #[test]
    fn snapshot_hides_answers_until_the_reveal() {
        let (mut session, _) = full_session();

        let before = session.snapshot();
        assert_eq!(before.current_good.as_deref(), Some("Crude Oil"));
        assert!(before.last_result.is_none());

        session.submit_demand_guess("-0.4");
        session.submit_supply_guess("0.15");

        let after = session.snapshot();
        let result = after.last_result.expect("result visible after reveal");
        assert_eq!(result.demand.actual, -0.4);
        assert_eq!(after.max_session_points, Some(50_000));
    }
}
