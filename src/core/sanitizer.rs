//! Parameter sanitizer
//!
//! Runs before any business logic. Checks, in order:
//! 1. every value matches `^[a-zA-Z0-9_]*$`
//! 2. every required key is present with a non-empty value
//! 3. no key outside the endpoint's allow-list is present

use crate::core::errors::{ApiError, Endpoint};
use crate::models::Params;
use once_cell::sync::Lazy;
use regex::Regex;

static SAFE_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_]*$").expect("Invalid safe value regex"));

/// Allowed and required keys for one endpoint
#[derive(Debug, Clone, Copy)]
pub struct ParamRules {
    pub endpoint: Endpoint,
    pub required: &'static [&'static str],
    pub permitted: &'static [&'static str],
}

/// Reject any value that contains characters outside `[a-zA-Z0-9_]`
pub fn check_data_integrity(params: &Params) -> Result<(), ApiError> {
    match params.iter().find(|(_, value)| !SAFE_VALUE.is_match(value)) {
        Some((key, _)) => Err(ApiError::DataIntegrity { key: key.clone() }),
        None => Ok(()),
    }
}

pub fn require(params: &Params, rules: &ParamRules) -> Result<(), ApiError> {
    let missing: Vec<String> = rules
        .required
        .iter()
        .filter(|key| params.get(**key).map_or(true, |value| value.is_empty()))
        .map(|key| key.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ApiError::MissingParameters {
            endpoint: rules.endpoint,
            missing,
            required: rules.required.to_vec(),
        })
    }
}

pub fn permit(params: &Params, rules: &ParamRules) -> Result<(), ApiError> {
    let unpermitted: Vec<String> = params
        .keys()
        .filter(|key| !rules.permitted.contains(&key.as_str()))
        .cloned()
        .collect();

    if unpermitted.is_empty() {
        Ok(())
    } else {
        Err(ApiError::UnpermittedParameters {
            unpermitted,
            valid: rules.permitted.to_vec(),
        })
    }
}

/// Full sanitizer pass, short-circuiting on the first failure
pub fn sanitize(params: &Params, rules: &ParamRules) -> Result<(), ApiError> {
    check_data_integrity(params)?;
    require(params, rules)?;
    permit(params, rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: ParamRules = ParamRules {
        endpoint: Endpoint::Touchpoint,
        required: &["touchpoint"],
        permitted: &["touchpoint", "respondent_class", "object_class"],
    };

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_accepts_clean_params() {
        let p = params(&[("touchpoint", "deal_feedback"), ("respondent_class", "Seller")]);
        assert!(sanitize(&p, &RULES).is_ok());
    }

    #[test]
    fn test_rejects_sql_metacharacters() {
        for bad in ["realtor; drop table surveys;", "a b", "x'--", "10.5", "-1", "caf\u{e9}"] {
            let p = params(&[("touchpoint", "deal_feedback"), ("respondent_class", bad)]);
            let err = sanitize(&p, &RULES).unwrap_err();
            assert!(
                matches!(err, ApiError::DataIntegrity { ref key } if key == "respondent_class"),
                "expected data integrity error for {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_integrity_runs_before_shape_checks() {
        let p = params(&[("bogus", "a;b")]);
        assert!(matches!(sanitize(&p, &RULES), Err(ApiError::DataIntegrity { .. })));
    }

    #[test]
    fn test_empty_required_value_is_missing() {
        let p = params(&[("touchpoint", "")]);
        let err = sanitize(&p, &RULES).unwrap_err();
        assert!(matches!(err, ApiError::MissingParameters { ref missing, .. } if missing == &["touchpoint"]));
    }

    #[test]
    fn test_missing_reported_before_unpermitted() {
        let p = params(&[("extra", "1")]);
        assert!(matches!(sanitize(&p, &RULES), Err(ApiError::MissingParameters { .. })));
    }

    #[test]
    fn test_unpermitted_key() {
        let p = params(&[("touchpoint", "deal_feedback"), ("limit", "3")]);
        let err = sanitize(&p, &RULES).unwrap_err();
        assert!(matches!(err, ApiError::UnpermittedParameters { ref unpermitted, .. } if unpermitted == &["limit"]));
    }
}
