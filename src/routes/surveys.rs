use actix_web::{http::header, web, HttpRequest, HttpResponse};
use serde_json::Value;
use crate::core::{self, ApiError, SubmitOutcome};
use crate::models::{EmptyTouchpointsResponse, HealthResponse, Params, SurveyResponse};
use crate::services::SurveyStore;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SurveyStore>,
}

/// Configure survey and touchpoint routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/survey", web::post().to(submit_survey))
        .route("/touchpoint", web::get().to(get_touchpoints));
}

fn stringify(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn parse_urlencoded(input: &str) -> Result<Params, ApiError> {
    web::Query::<BTreeMap<String, String>>::from_query(input)
        .map(web::Query::into_inner)
        .map_err(|e| ApiError::MalformedPayload(e.to_string()))
}

/// Merge query string and body parameters; body keys win
pub fn collect_params(req: &HttpRequest, body: &[u8]) -> Result<Params, ApiError> {
    let mut params = parse_urlencoded(req.query_string())?;

    if body.is_empty() {
        return Ok(params);
    }

    let is_json = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |ct| ct.starts_with("application/json"));

    if is_json {
        let object: serde_json::Map<String, Value> = serde_json::from_slice(body)
            .map_err(|e| ApiError::MalformedPayload(e.to_string()))?;
        params.extend(object.into_iter().map(|(k, v)| (k, stringify(v))));
    } else {
        let form = std::str::from_utf8(body)
            .map_err(|e| ApiError::MalformedPayload(e.to_string()))?;
        params.extend(parse_urlencoded(form)?);
    }

    Ok(params)
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let healthy = state.store.health_check().await.unwrap_or(false);

    let status = if healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Record a survey response
///
/// POST /survey
///
/// Parameters (query string, form or JSON body):
/// `touchpoint`, `respondent_id`, `object_id`, `respondent_class`,
/// `object_class`, `score`
///
/// 201 when a new survey was created, 200 when an existing one was updated.
async fn submit_survey(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let params = collect_params(&req, &body)?;

    match core::submit_survey(&*state.store, &params).await? {
        SubmitOutcome::Created(survey) => {
            Ok(HttpResponse::Created().json(SurveyResponse::created(survey)))
        }
        SubmitOutcome::Updated(survey) => Ok(HttpResponse::Ok().json(SurveyResponse::updated(survey))),
    }
}

/// List surveys for a touchpoint
///
/// GET /touchpoint?touchpoint={name}[&respondent_class={class}][&object_class={class}]
///
/// An empty result is still a 200, with `touchpoints: null`.
async fn get_touchpoints(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let params = collect_params(&req, &body)?;
    let result = core::query_touchpoints(&*state.store, &params).await?;

    if result.surveys.is_empty() {
        return Ok(HttpResponse::Ok().json(EmptyTouchpointsResponse::new(&result.touchpoint)));
    }

    // Matches are keyed by the requested touchpoint name
    let mut response = BTreeMap::new();
    response.insert(result.touchpoint, result.surveys);

    Ok(HttpResponse::Ok().json(response))
}
