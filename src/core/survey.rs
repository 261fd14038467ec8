use crate::core::errors::{ApiError, Endpoint};
use crate::core::sanitizer::{sanitize, ParamRules};
use crate::models::{
    NewSurvey, ObjectClass, Params, RespondentClass, ScoreValue, Survey, SurveyIdentity,
    SurveyRequest,
};
use crate::services::{StoreError, SurveyStore};
use validator::Validate;

pub const SURVEY_RULES: ParamRules = ParamRules {
    endpoint: Endpoint::Survey,
    required: &SurveyRequest::FIELDS,
    permitted: &SurveyRequest::FIELDS,
};

/// Result of a survey submission
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Created(Survey),
    Updated(Survey),
}

/// Submission that passed every check that does not need the datastore
///
/// Ids stay as submitted: the object is looked up before the respondent is
/// considered, and a value that is not an integer cannot reference any row.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSurvey {
    pub touchpoint: String,
    pub respondent_id: String,
    pub object_id: String,
    pub respondent_class: RespondentClass,
    pub object_class: ObjectClass,
    pub score: i32,
}

/// Parse a score as a base-10 integer in `1..=10`
pub fn parse_score(raw: &str) -> Result<i32, ApiError> {
    let invalid = || ApiError::InvalidScore {
        provided: raw.to_string(),
    };

    let value: i64 = raw.parse().map_err(|_| invalid())?;
    ScoreValue { value }.validate().map_err(|_| invalid())?;

    i32::try_from(value).map_err(|_| invalid())
}

/// Resolve both class names, case-insensitively
pub fn parse_classes(
    respondent_class: &str,
    object_class: &str,
) -> Result<(RespondentClass, ObjectClass), ApiError> {
    match (respondent_class.parse(), object_class.parse()) {
        (Ok(respondent), Ok(object)) => Ok((respondent, object)),
        _ => Err(ApiError::InvalidClass {
            respondent_class: respondent_class.to_string(),
            object_class: object_class.to_string(),
        }),
    }
}

/// Sanitize and validate a submission without touching the datastore
pub fn validate_submission(params: &Params) -> Result<ValidatedSurvey, ApiError> {
    sanitize(params, &SURVEY_RULES)?;
    let request = SurveyRequest::from_params(params);

    let score = parse_score(&request.score)?;
    let (respondent_class, object_class) =
        parse_classes(&request.respondent_class, &request.object_class)?;

    Ok(ValidatedSurvey {
        touchpoint: request.touchpoint,
        respondent_id: request.respondent_id,
        object_id: request.object_id,
        respondent_class,
        object_class,
        score,
    })
}

/// Record a survey response: update the score of the existing survey for
/// this respondent/object pair, or create the survey and its bridge row.
pub async fn submit_survey(
    store: &dyn SurveyStore,
    params: &Params,
) -> Result<SubmitOutcome, ApiError> {
    let survey = validate_submission(params)?;

    let object_not_found = || ApiError::ObjectNotFound {
        class: survey.object_class,
        provided: survey.object_id.clone(),
    };
    let object_id: i64 = survey.object_id.parse().map_err(|_| object_not_found())?;
    if !store.object_exists(survey.object_class, object_id).await? {
        return Err(object_not_found());
    }

    let respondent_not_found = || ApiError::RespondentNotFound {
        class: survey.respondent_class,
        provided: survey.respondent_id.clone(),
    };
    let respondent_id: i64 = survey
        .respondent_id
        .parse()
        .map_err(|_| respondent_not_found())?;

    let identity = SurveyIdentity {
        respondent_id,
        object_id,
        respondent_class: survey.respondent_class,
        object_class: survey.object_class,
    };

    if let Some(existing) = store.find_survey(&identity).await? {
        let updated = store.update_score(existing.id, survey.score).await?;
        tracing::info!(
            "Updated survey {} score {} -> {}",
            updated.id,
            existing.score,
            updated.score
        );
        return Ok(SubmitOutcome::Updated(updated));
    }

    let new_survey = NewSurvey {
        touchpoint: survey.touchpoint.clone(),
        identity,
        score: survey.score,
    };

    match store.create_survey(&new_survey).await {
        Ok(created) => {
            tracing::info!(
                "Created survey {} for {} {} on {} {}",
                created.id,
                identity.respondent_class,
                identity.respondent_id,
                identity.object_class,
                identity.object_id
            );
            Ok(SubmitOutcome::Created(created))
        }
        Err(StoreError::RespondentNotFound) => Err(respondent_not_found()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemoryStore;

    fn params(score: &str, respondent_class: &str, object_class: &str) -> Params {
        [
            ("touchpoint", "realtor_feedback"),
            ("respondent_id", "1"),
            ("object_id", "1"),
            ("respondent_class", respondent_class),
            ("object_class", object_class),
            ("score", score),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_score_bounds() {
        assert_eq!(parse_score("1").ok(), Some(1));
        assert_eq!(parse_score("10").ok(), Some(10));
        assert_eq!(parse_score("010").ok(), Some(10));
        for bad in ["0", "11", "-3", "abc", "", "1_0", "99999999999999999999"] {
            assert!(
                matches!(parse_score(bad), Err(ApiError::InvalidScore { .. })),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_classes_are_case_insensitive() {
        let (respondent, object) = parse_classes("SELLER", "Deal").unwrap();
        assert_eq!(respondent, RespondentClass::Seller);
        assert_eq!(object, ObjectClass::Deal);
    }

    #[test]
    fn test_class_error_echoes_both_values() {
        let err = parse_classes("seller", "seller").unwrap_err();
        assert!(matches!(
            err,
            ApiError::InvalidClass { ref respondent_class, ref object_class }
                if respondent_class == "seller" && object_class == "seller"
        ));
    }

    #[test]
    fn test_score_checked_before_classes() {
        let err = validate_submission(&params("11", "buyer", "car")).unwrap_err();
        assert!(matches!(err, ApiError::InvalidScore { .. }));
    }

    #[test]
    fn test_validated_submission_is_canonical() {
        let survey = validate_submission(&params("8", "Seller", "REALTOR")).unwrap();
        assert_eq!(survey.score, 8);
        assert_eq!(survey.respondent_class, RespondentClass::Seller);
        assert_eq!(survey.object_class, ObjectClass::Realtor);
        assert_eq!(survey.respondent_id, "1");
    }

    #[tokio::test]
    async fn test_object_checked_before_respondent() {
        let store = MemoryStore::new();
        store.seed_demo_data().await.unwrap();

        let mut p = params("5", "seller", "deal");
        p.insert("object_id".to_string(), "abc".to_string());
        let err = submit_survey(&store, &p).await.unwrap_err();
        assert!(matches!(err, ApiError::ObjectNotFound { class: ObjectClass::Deal, ref provided } if provided == "abc"));

        p.insert("object_id".to_string(), "999".to_string());
        p.insert("respondent_id".to_string(), "abc".to_string());
        let err = submit_survey(&store, &p).await.unwrap_err();
        assert!(matches!(err, ApiError::ObjectNotFound { class: ObjectClass::Deal, ref provided } if provided == "999"));

        p.insert("object_id".to_string(), "1".to_string());
        let err = submit_survey(&store, &p).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::RespondentNotFound { class: RespondentClass::Seller, ref provided } if provided == "abc"
        ));
        assert_eq!(store.survey_count().await, 0);
    }

    #[tokio::test]
    async fn test_resubmission_updates_in_place() {
        let store = MemoryStore::new();
        store.seed_demo_data().await.unwrap();

        let first = submit_survey(&store, &params("10", "seller", "realtor")).await.unwrap();
        let second = submit_survey(&store, &params("8", "Seller", "realtor")).await.unwrap();

        assert!(matches!(first, SubmitOutcome::Created(ref s) if s.score == 10));
        assert!(matches!(second, SubmitOutcome::Updated(ref s) if s.id == 1 && s.score == 8));
        assert_eq!(store.survey_count().await, 1);
        assert_eq!(store.bridge_rows(RespondentClass::Seller).await.len(), 1);
    }
}
