//! Scoring engine and service surface for an economic elasticity
//! estimation quiz.
//!
//! The `quiz` module holds the domain core: point/accuracy functions, the
//! tax incidence calculator, the random good selector, and the per-session
//! state machine. The rendering layer is an external collaborator that
//! drives sessions through the HTTP router in [`quiz::http`] and only ever
//! reads snapshots.

pub mod config;
pub mod error;
pub mod quiz;
pub mod telemetry;
