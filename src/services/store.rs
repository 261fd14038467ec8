use crate::models::{NewSurvey, ObjectClass, Survey, SurveyIdentity, TouchpointFilter};
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when reading or writing surveys
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The bridge row would reference a respondent that does not exist
    #[error("Respondent not found")]
    RespondentNotFound,

    #[error("Survey not found: {0}")]
    SurveyNotFound(i64),

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

/// Datastore contract for surveys and the entities they reference
///
/// Implementations must make `create_survey` all-or-nothing: either the
/// survey and its bridge row both exist afterwards, or neither does.
#[async_trait]
pub trait SurveyStore: Send + Sync {
    /// Whether a row of the given object class exists with this primary key
    async fn object_exists(&self, class: ObjectClass, id: i64) -> Result<bool, StoreError>;

    /// First survey (lowest id) linked through the respondent class bridge
    async fn find_survey(&self, identity: &SurveyIdentity) -> Result<Option<Survey>, StoreError>;

    async fn update_score(&self, survey_id: i64, score: i32) -> Result<Survey, StoreError>;

    /// Insert a survey and its bridge row atomically
    async fn create_survey(&self, survey: &NewSurvey) -> Result<Survey, StoreError>;

    /// All surveys matching the filter, in id order
    async fn find_touchpoints(&self, filter: &TouchpointFilter) -> Result<Vec<Survey>, StoreError>;

    /// Insert the demo realtor, seller, property and deal when empty
    async fn seed_demo_data(&self) -> Result<(), StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}
