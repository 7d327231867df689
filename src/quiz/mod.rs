//! The quiz domain core: accuracy and point functions, the tax incidence
//! calculator, the random good selector, and the per-session state machine,
//! plus the dataset loading and HTTP plumbing around them.

pub mod catalog;
pub mod dataset;
pub mod domain;
pub mod explainer;
pub mod http;
pub mod incidence;
pub mod registry;
pub mod scoring;
pub mod selector;
pub mod session;

pub use dataset::{Dataset, DatasetError};
pub use domain::{
    GoodRecord, GuessQuantity, IncidenceOutcome, QuantityOutcome, QuestionResult, QuizKind,
    QuizStage, SessionLedger,
};
pub use http::quiz_router;
pub use incidence::{buyer_share, IncidenceBand, IncidenceError};
pub use registry::{QuizService, QuizServiceError, SessionId, SessionSpec};
pub use scoring::{calculate_points, is_correct, AccuracyTier, ScoringMode};
pub use selector::{select_good, EmptyDatasetError, Selection};
pub use session::{QuizSession, SessionRules, SessionSnapshot, Submission, DEFAULT_SESSION_LENGTH};
