// Request pipeline exports
pub mod errors;
pub mod sanitizer;
pub mod survey;
pub mod touchpoints;

pub use errors::{ApiError, Endpoint};
pub use sanitizer::{sanitize, ParamRules};
pub use survey::{submit_survey, validate_submission, SubmitOutcome, ValidatedSurvey, SURVEY_RULES};
pub use touchpoints::{build_filter, query_touchpoints, TouchpointResult, TOUCHPOINT_RULES};
