use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::incidence::{self, IncidenceBand};
use super::scoring::{self, AccuracyTier, ScoringMode};

/// A named good with its reference elasticities.
///
/// Deserialization accepts the field names used by the published
/// `dataset.json` (`good`, `demandElasticity`, `supplyElasticity`) as well as
/// the single-value form that only carries `elasticity`. A missing supply
/// elasticity defaults to zero, which demand-only sessions never read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoodRecord {
    #[serde(alias = "good")]
    pub name: String,
    #[serde(alias = "demandElasticity", alias = "elasticity")]
    pub demand_elasticity: f64,
    #[serde(alias = "supplyElasticity", default)]
    pub supply_elasticity: f64,
}

/// Where a session currently sits in the per-question cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizStage {
    AwaitingDemandGuess,
    AwaitingSupplyGuess,
    ShowingResult,
    SessionComplete,
}

impl QuizStage {
    pub const fn label(self) -> &'static str {
        match self {
            Self::AwaitingDemandGuess => "awaiting demand guess",
            Self::AwaitingSupplyGuess => "awaiting supply guess",
            Self::ShowingResult => "showing result",
            Self::SessionComplete => "session complete",
        }
    }
}

/// Which quantities a session asks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizKind {
    /// Demand elasticity only; the guess stage collapses to a single step.
    DemandOnly,
    /// Demand, supply, and the derived tax incidence.
    Full,
}

impl QuizKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::DemandOnly => "demand only",
            Self::Full => "demand, supply & tax incidence",
        }
    }
}

/// Which quantity a submitted guess is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuessQuantity {
    Demand,
    Supply,
}

/// Scored outcome for one guessed elasticity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityOutcome {
    pub guess: f64,
    pub actual: f64,
    pub difference: f64,
    pub points: u32,
    pub tier: AccuracyTier,
    pub correct: bool,
}

impl QuantityOutcome {
    pub(crate) fn score(guess: f64, actual: f64, max_points: u32) -> Self {
        let difference = (guess - actual).abs();
        Self {
            guess,
            actual,
            difference,
            points: scoring::calculate_points(
                difference,
                max_points,
                scoring::ELASTICITY_SCALE_FACTOR,
            ),
            tier: AccuracyTier::from_difference(difference),
            correct: scoring::is_correct(guess, actual),
        }
    }
}

/// Scored outcome for the derived tax incidence comparison.
///
/// Either share may be undefined (both elasticities zero); the award then
/// degrades to zero instead of poisoning the question total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidenceOutcome {
    pub guessed_share: Option<f64>,
    pub actual_share: Option<f64>,
    pub points: u32,
    pub band: Option<IncidenceBand>,
}

impl IncidenceOutcome {
    pub(crate) fn score(demand_guess: f64, supply_guess: f64, good: &GoodRecord) -> Self {
        let guessed_share = incidence::buyer_share(demand_guess, supply_guess).ok();
        let actual_share =
            incidence::buyer_share(good.demand_elasticity, good.supply_elasticity).ok();

        let points = match (guessed_share, actual_share) {
            (Some(guessed), Some(actual)) => scoring::calculate_points(
                (guessed - actual).abs(),
                scoring::INCIDENCE_MAX_POINTS,
                scoring::INCIDENCE_SCALE_FACTOR,
            ),
            _ => 0,
        };

        Self {
            guessed_share,
            actual_share,
            points,
            band: actual_share.map(IncidenceBand::from_share),
        }
    }
}

/// Immutable record of one completed question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question_number: u32,
    pub good: String,
    pub demand: QuantityOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supply: Option<QuantityOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incidence: Option<IncidenceOutcome>,
    pub total_points: u32,
    /// Streak-mode verdict: every guessed elasticity within tolerance.
    pub correct: bool,
    pub answered_at: DateTime<Utc>,
}

impl QuestionResult {
    /// Score one question: every point function runs here and nowhere else.
    /// Passing no supply guess scores the demand quantity alone, with no
    /// derived incidence comparison.
    pub fn evaluate(
        good: &GoodRecord,
        question_number: u32,
        demand_guess: f64,
        supply_guess: Option<f64>,
    ) -> Self {
        let demand = QuantityOutcome::score(
            demand_guess,
            good.demand_elasticity,
            scoring::DEMAND_MAX_POINTS,
        );
        let supply = supply_guess.map(|guess| {
            QuantityOutcome::score(guess, good.supply_elasticity, scoring::SUPPLY_MAX_POINTS)
        });
        let incidence = supply_guess
            .map(|supply_guess| IncidenceOutcome::score(demand_guess, supply_guess, good));

        let total_points = demand.points
            + supply.as_ref().map_or(0, |outcome| outcome.points)
            + incidence.as_ref().map_or(0, |outcome| outcome.points);
        let correct = demand.correct && supply.as_ref().map_or(true, |outcome| outcome.correct);

        Self {
            question_number,
            good: good.name.clone(),
            demand,
            supply,
            incidence,
            total_points,
            correct,
            answered_at: Utc::now(),
        }
    }
}

/// Accumulating state for one run of questions.
///
/// Created zeroed, folded exactly once per completed question, and replaced
/// wholesale on reset. History is append-only in chronological order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionLedger {
    pub total_score: u64,
    pub questions_completed: u32,
    pub streak: u32,
    pub best_streak: u32,
    pub history: Vec<QuestionResult>,
}

impl SessionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one completed question into the running totals.
    pub(crate) fn record(&mut self, result: QuestionResult, mode: ScoringMode) {
        self.questions_completed += 1;
        match mode {
            ScoringMode::Binary => {
                if result.correct {
                    self.total_score += 1;
                    self.streak += 1;
                    self.best_streak = self.best_streak.max(self.streak);
                } else {
                    self.streak = 0;
                }
            }
            ScoringMode::Continuous => {
                self.total_score += u64::from(result.total_points);
            }
        }
        self.history.push(result);
    }

    /// Mean points per completed question, rounded to the nearest integer.
    pub fn average_points(&self) -> Option<u64> {
        if self.questions_completed == 0 {
            return None;
        }
        let average =
            self.total_score as f64 / f64::from(self.questions_completed);
        Some(average.round() as u64)
    }

    /// Share of the attainable points actually earned, as a whole percentage.
    pub fn accuracy_percent(&self, per_question_ceiling: u32) -> Option<u8> {
        if self.questions_completed == 0 || per_question_ceiling == 0 {
            return None;
        }
        let ceiling = u64::from(self.questions_completed) * u64::from(per_question_ceiling);
        let percent = (self.total_score as f64 / ceiling as f64) * 100.0;
        Some(percent.round() as u8)
    }

    /// The most recent `count` results, oldest first.
    pub fn recent(&self, count: usize) -> &[QuestionResult] {
        let start = self.history.len().saturating_sub(count);
        &self.history[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn result(correct: bool, total_points: u32, number: u32) -> QuestionResult {
        QuestionResult {
            question_number: number,
            good: "Coffee".to_string(),
            demand: QuantityOutcome::score(-0.5, -0.5, scoring::DEMAND_MAX_POINTS),
            supply: None,
            incidence: None,
            total_points,
            correct,
            answered_at: Utc::now(),
        }
    }

    #[test]
    fn binary_mode_counts_correct_answers_and_streaks() {
        let mut ledger = SessionLedger::new();
        ledger.record(result(true, 0, 1), ScoringMode::Binary);
        ledger.record(result(true, 0, 2), ScoringMode::Binary);
        ledger.record(result(false, 0, 3), ScoringMode::Binary);
        ledger.record(result(true, 0, 4), ScoringMode::Binary);

        assert_eq!(ledger.total_score, 3);
        assert_eq!(ledger.questions_completed, 4);
        assert_eq!(ledger.streak, 1);
        assert_eq!(ledger.best_streak, 2);
        assert_eq!(ledger.history.len(), 4);
    }

    #[test]
    fn continuous_mode_sums_points_and_leaves_streaks_alone() {
        let mut ledger = SessionLedger::new();
        ledger.record(result(true, 4_200, 1), ScoringMode::Continuous);
        ledger.record(result(false, 1_800, 2), ScoringMode::Continuous);

        assert_eq!(ledger.total_score, 6_000);
        assert_eq!(ledger.streak, 0);
        assert_eq!(ledger.best_streak, 0);
        assert_eq!(ledger.average_points(), Some(3_000));
        assert_eq!(ledger.accuracy_percent(scoring::MAX_QUESTION_POINTS), Some(60));
    }

    #[test]
    fn recent_returns_the_tail_of_history() {
        let mut ledger = SessionLedger::new();
        for number in 1..=5 {
            ledger.record(result(true, 1_000, number), ScoringMode::Continuous);
        }

        let tail = ledger.recent(3);
        assert_eq!(tail.len(), 3);
        assert_eq!(tail[0].question_number, 3);
        assert_eq!(tail[2].question_number, 5);
        assert_eq!(ledger.recent(10).len(), 5);
    }

    #[test]
    fn fresh_ledger_reports_no_averages() {
        let ledger = SessionLedger::new();
        assert_eq!(ledger.average_points(), None);
        assert_eq!(ledger.accuracy_percent(scoring::MAX_QUESTION_POINTS), None);
    }

    #[test]
    fn dataset_json_field_names_are_accepted() {
        let record: GoodRecord = serde_json::from_str(
            r#"{ "good": "Crude Oil", "demandElasticity": -0.4, "supplyElasticity": 0.15 }"#,
        )
        .expect("record parses");
        assert_eq!(record.name, "Crude Oil");
        assert_eq!(record.demand_elasticity, -0.4);
        assert_eq!(record.supply_elasticity, 0.15);

        let single: GoodRecord =
            serde_json::from_str(r#"{ "name": "Salt", "elasticity": -0.1 }"#)
                .expect("single-value record parses");
        assert_eq!(single.demand_elasticity, -0.1);
        assert_eq!(single.supply_elasticity, 0.0);
    }
}
