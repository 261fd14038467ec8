use std::collections::BTreeMap;
use validator::Validate;

/// Raw request parameters, every value as a string
pub type Params = BTreeMap<String, String>;

fn param(params: &Params, key: &str) -> String {
    params.get(key).cloned().unwrap_or_default()
}

/// Survey submission after the parameter shape has been checked
///
/// POST /survey
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyRequest {
    pub touchpoint: String,
    pub respondent_id: String,
    pub object_id: String,
    pub respondent_class: String,
    pub object_class: String,
    pub score: String,
}

impl SurveyRequest {
    pub const FIELDS: [&'static str; 6] = [
        "touchpoint",
        "respondent_id",
        "object_id",
        "respondent_class",
        "object_class",
        "score",
    ];

    /// Read the fields out of parameters that already passed the sanitizer
    pub fn from_params(params: &Params) -> Self {
        Self {
            touchpoint: param(params, "touchpoint"),
            respondent_id: param(params, "respondent_id"),
            object_id: param(params, "object_id"),
            respondent_class: param(params, "respondent_class"),
            object_class: param(params, "object_class"),
            score: param(params, "score"),
        }
    }
}

/// Touchpoint lookup
///
/// GET /touchpoint
#[derive(Debug, Clone, PartialEq)]
pub struct TouchpointRequest {
    pub touchpoint: String,
    pub respondent_class: Option<String>,
    pub object_class: Option<String>,
}

impl TouchpointRequest {
    pub const REQUIRED: [&'static str; 1] = ["touchpoint"];
    pub const PERMITTED: [&'static str; 3] = ["touchpoint", "respondent_class", "object_class"];

    pub fn from_params(params: &Params) -> Self {
        Self {
            touchpoint: param(params, "touchpoint"),
            respondent_class: params.get("respondent_class").cloned(),
            object_class: params.get("object_class").cloned(),
        }
    }
}

/// Integer score as submitted
#[derive(Debug, Clone, Copy, Validate)]
pub struct ScoreValue {
    #[validate(range(min = 1, max = 10))]
    pub value: i64,
}
