use serde::{Deserialize, Serialize};
use crate::models::domain::Survey;

/// Response for a created or updated survey
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyResponse {
    pub success: String,
    pub survey: Survey,
}

impl SurveyResponse {
    pub fn created(survey: Survey) -> Self {
        Self {
            success: "Survey response created successfully.".to_string(),
            survey,
        }
    }

    pub fn updated(survey: Survey) -> Self {
        Self {
            success: "Survey response updated".to_string(),
            survey,
        }
    }
}

/// Response when a touchpoint lookup matched nothing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmptyTouchpointsResponse {
    pub touchpoints: Option<Vec<Survey>>,
    pub message: String,
    pub requested_touchpoint: String,
}

impl EmptyTouchpointsResponse {
    pub fn new(requested_touchpoint: &str) -> Self {
        Self {
            touchpoints: None,
            message: "No such touchpoints exist.".to_string(),
            requested_touchpoint: requested_touchpoint.to_string(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}
