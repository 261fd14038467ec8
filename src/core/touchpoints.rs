use crate::core::errors::{ApiError, Endpoint};
use crate::core::sanitizer::{sanitize, ParamRules};
use crate::models::{ObjectClass, Params, RespondentClass, Survey, TouchpointFilter, TouchpointRequest};
use crate::services::SurveyStore;
use std::str::FromStr;

pub const TOUCHPOINT_RULES: ParamRules = ParamRules {
    endpoint: Endpoint::Touchpoint,
    required: &TouchpointRequest::REQUIRED,
    permitted: &TouchpointRequest::PERMITTED,
};

/// Matches for one touchpoint, in creation order
#[derive(Debug, Clone, PartialEq)]
pub struct TouchpointResult {
    pub touchpoint: String,
    pub surveys: Vec<Survey>,
}

/// Single requested class, or every class when the filter is omitted.
///
/// An unknown class yields an empty list, which matches nothing.
fn class_filter<T: FromStr + Copy>(requested: Option<&str>, all: &[T]) -> Vec<T> {
    match requested {
        Some(name) => name.parse().ok().into_iter().collect(),
        None => all.to_vec(),
    }
}

/// Build the lookup filter from sanitized parameters
pub fn build_filter(params: &Params) -> Result<TouchpointFilter, ApiError> {
    sanitize(params, &TOUCHPOINT_RULES)?;

    let request = TouchpointRequest::from_params(params);

    Ok(TouchpointFilter {
        respondent_classes: class_filter(request.respondent_class.as_deref(), &RespondentClass::ALL),
        object_classes: class_filter(request.object_class.as_deref(), &ObjectClass::ALL),
        touchpoint: request.touchpoint,
    })
}

pub async fn query_touchpoints(
    store: &dyn SurveyStore,
    params: &Params,
) -> Result<TouchpointResult, ApiError> {
    let filter = build_filter(params)?;
    let surveys = store.find_touchpoints(&filter).await?;

    tracing::debug!(
        "Touchpoint {} matched {} surveys (respondents: {:?}, objects: {:?})",
        filter.touchpoint,
        surveys.len(),
        filter.respondent_classes,
        filter.object_classes
    );

    Ok(TouchpointResult {
        touchpoint: filter.touchpoint,
        surveys,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_cover_every_class() {
        let filter = build_filter(&params(&[("touchpoint", "deal_feedback")])).unwrap();

        assert_eq!(filter.touchpoint, "deal_feedback");
        assert_eq!(filter.respondent_classes, RespondentClass::ALL.to_vec());
        assert_eq!(filter.object_classes, ObjectClass::ALL.to_vec());
    }

    #[test]
    fn test_single_class_filters() {
        let filter = build_filter(&params(&[
            ("touchpoint", "deal_feedback"),
            ("respondent_class", "Seller"),
            ("object_class", "deal"),
        ]))
        .unwrap();

        assert_eq!(filter.respondent_classes, vec![RespondentClass::Seller]);
        assert_eq!(filter.object_classes, vec![ObjectClass::Deal]);
    }

    #[test]
    fn test_unknown_class_matches_nothing() {
        let filter = build_filter(&params(&[
            ("touchpoint", "deal_feedback"),
            ("object_class", "seller"),
        ]))
        .unwrap();

        assert!(filter.object_classes.is_empty());
        assert_eq!(filter.respondent_classes.len(), 2);
    }

    #[test]
    fn test_touchpoint_required() {
        let err = build_filter(&params(&[("respondent_class", "seller")])).unwrap_err();
        assert!(matches!(err, ApiError::MissingParameters { endpoint: Endpoint::Touchpoint, .. }));
    }
}
