use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::dataset::Dataset;
use super::domain::{GuessQuantity, QuizKind};
use super::scoring::ScoringMode;
use super::selector::EmptyDatasetError;
use super::session::{QuizSession, SessionRules, SessionSnapshot, Submission};

/// Identifier wrapper for quiz sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("quiz-{id:06}"))
}

/// Caller-facing description of the session to create. Omitted fields fall
/// back to the defaults for the chosen scoring mode.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SessionSpec {
    pub mode: Option<ScoringMode>,
    pub kind: Option<QuizKind>,
    pub session_length: Option<u32>,
}

/// In-memory session registry behind the HTTP surface.
///
/// Sessions live for the process lifetime only; the registry hands out
/// snapshots and interprets actions, one locked transition at a time.
pub struct QuizService {
    dataset: Arc<Dataset>,
    default_length: Option<u32>,
    sessions: Mutex<HashMap<String, QuizSession>>,
}

impl QuizService {
    pub fn new(dataset: Arc<Dataset>, default_length: Option<u32>) -> Self {
        Self {
            dataset,
            default_length,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Resolve a spec against the per-mode defaults: points-based sessions
    /// run a fixed length, streak sessions run until reset.
    fn resolve_rules(&self, spec: SessionSpec) -> SessionRules {
        let mode = spec.mode.unwrap_or(ScoringMode::Continuous);
        let defaults = match mode {
            ScoringMode::Continuous => SessionRules::continuous(),
            ScoringMode::Binary => SessionRules::streak(),
        };

        let length = match mode {
            ScoringMode::Continuous => spec
                .session_length
                .or(self.default_length)
                .or(defaults.length),
            ScoringMode::Binary => spec.session_length,
        };

        SessionRules {
            mode,
            kind: spec.kind.unwrap_or(defaults.kind),
            length,
        }
    }

    /// Open a new session and return its first snapshot.
    pub fn create(
        &self,
        spec: SessionSpec,
    ) -> Result<(SessionId, SessionSnapshot), QuizServiceError> {
        let rules = self.resolve_rules(spec);
        let mut rng = rand::thread_rng();
        let session = QuizSession::new(self.dataset.clone(), rules, &mut rng)?;
        let snapshot = session.snapshot();

        let id = next_session_id();
        self.lock_sessions()?.insert(id.0.clone(), session);
        info!(session = %id, mode = rules.mode.label(), kind = rules.kind.label(), "quiz session created");
        Ok((id, snapshot))
    }

    pub fn snapshot(&self, id: &SessionId) -> Result<SessionSnapshot, QuizServiceError> {
        let sessions = self.lock_sessions()?;
        let session = Self::get(&sessions, id)?;
        Ok(session.snapshot())
    }

    /// Route a guess to the session's current stage.
    pub fn submit_guess(
        &self,
        id: &SessionId,
        quantity: GuessQuantity,
        raw: &str,
    ) -> Result<(Submission, SessionSnapshot), QuizServiceError> {
        let mut sessions = self.lock_sessions()?;
        let session = Self::get_mut(&mut sessions, id)?;
        let submission = match quantity {
            GuessQuantity::Demand => session.submit_demand_guess(raw),
            GuessQuantity::Supply => session.submit_supply_guess(raw),
        };
        Ok((submission, session.snapshot()))
    }

    pub fn advance(&self, id: &SessionId) -> Result<SessionSnapshot, QuizServiceError> {
        let mut sessions = self.lock_sessions()?;
        let session = Self::get_mut(&mut sessions, id)?;
        let mut rng = rand::thread_rng();
        session.advance(&mut rng)?;
        Ok(session.snapshot())
    }

    pub fn reset(&self, id: &SessionId) -> Result<SessionSnapshot, QuizServiceError> {
        let mut sessions = self.lock_sessions()?;
        let session = Self::get_mut(&mut sessions, id)?;
        let mut rng = rand::thread_rng();
        session.reset(&mut rng)?;
        Ok(session.snapshot())
    }

    fn lock_sessions(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<String, QuizSession>>, QuizServiceError> {
        self.sessions
            .lock()
            .map_err(|_| QuizServiceError::RegistryPoisoned)
    }

    fn get<'a>(
        sessions: &'a MutexGuard<'_, HashMap<String, QuizSession>>,
        id: &SessionId,
    ) -> Result<&'a QuizSession, QuizServiceError> {
        sessions
            .get(&id.0)
            .ok_or_else(|| QuizServiceError::SessionNotFound(id.0.clone()))
    }

    fn get_mut<'a>(
        sessions: &'a mut MutexGuard<'_, HashMap<String, QuizSession>>,
        id: &SessionId,
    ) -> Result<&'a mut QuizSession, QuizServiceError> {
        sessions
            .get_mut(&id.0)
            .ok_or_else(|| QuizServiceError::SessionNotFound(id.0.clone()))
    }
}

#[derive(Debug)]
pub enum QuizServiceError {
    SessionNotFound(String),
    EmptyDataset(EmptyDatasetError),
    RegistryPoisoned,
}

impl fmt::Display for QuizServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizServiceError::SessionNotFound(id) => {
                write!(f, "session '{}' not found", id)
            }
            QuizServiceError::EmptyDataset(err) => write!(f, "{}", err),
            QuizServiceError::RegistryPoisoned => {
                write!(f, "session registry lock poisoned")
            }
        }
    }
}

impl std::error::Error for QuizServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QuizServiceError::EmptyDataset(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EmptyDatasetError> for QuizServiceError {
    fn from(err: EmptyDatasetError) -> Self {
        Self::EmptyDataset(err)
    }
}
