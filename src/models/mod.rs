// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    BridgeTable, NewSurvey, ObjectClass, RespondentClass, Survey, SurveyIdentity, TouchpointFilter,
    UnknownClass,
};
pub use requests::{Params, ScoreValue, SurveyRequest, TouchpointRequest};
pub use responses::{EmptyTouchpointsResponse, HealthResponse, SurveyResponse};
