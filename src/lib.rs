//! Touchpoints - customer-satisfaction survey service
//!
//! Records survey responses given by realtors and sellers about realtors,
//! deals and properties, and answers filtered lookups by touchpoint.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{query_touchpoints, submit_survey, ApiError, SubmitOutcome};
pub use models::{ObjectClass, RespondentClass, Survey};
pub use services::{MemoryStore, PostgresStore, StoreError, SurveyStore};
