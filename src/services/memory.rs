use crate::models::{NewSurvey, ObjectClass, RespondentClass, Survey, SurveyIdentity, TouchpointFilter};
use crate::services::store::{StoreError, SurveyStore};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tokio::sync::Mutex;

/// Row in a respondent class bridge table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeRow {
    pub id: i64,
    pub respondent_id: i64,
    pub survey_id: i64,
}

#[derive(Debug, Default)]
struct Tables {
    realtors: BTreeSet<i64>,
    sellers: BTreeSet<i64>,
    deals: BTreeSet<i64>,
    properties: BTreeSet<i64>,
    surveys: BTreeMap<i64, Survey>,
    bridges: HashMap<RespondentClass, Vec<BridgeRow>>,
    next_survey_id: i64,
    next_bridge_id: i64,
}

impl Tables {
    fn respondents(&self, class: RespondentClass) -> &BTreeSet<i64> {
        match class {
            RespondentClass::Realtor => &self.realtors,
            RespondentClass::Seller => &self.sellers,
        }
    }

    fn objects(&self, class: ObjectClass) -> &BTreeSet<i64> {
        match class {
            ObjectClass::Realtor => &self.realtors,
            ObjectClass::Deal => &self.deals,
            ObjectClass::Property => &self.properties,
        }
    }

    fn find_bridge_row(&self, class: RespondentClass, survey_id: i64) -> Option<&BridgeRow> {
        self.bridges
            .get(&class)
            .and_then(|rows| rows.iter().find(|row| row.survey_id == survey_id))
    }

    fn insert_bridge_row(&mut self, class: RespondentClass, respondent_id: i64, survey_id: i64) {
        self.next_bridge_id += 1;
        let row = BridgeRow {
            id: self.next_bridge_id,
            respondent_id,
            survey_id,
        };
        self.bridges.entry(class).or_default().push(row);
    }
}

/// In-process survey store
///
/// Holds every table behind one mutex, so a create is atomic with respect to
/// every other operation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_realtor(&self, id: i64) {
        self.tables.lock().await.realtors.insert(id);
    }

    pub async fn insert_seller(&self, id: i64) {
        self.tables.lock().await.sellers.insert(id);
    }

    pub async fn insert_property(&self, id: i64) {
        self.tables.lock().await.properties.insert(id);
    }

    pub async fn insert_deal(&self, id: i64) {
        self.tables.lock().await.deals.insert(id);
    }

    pub async fn survey_count(&self) -> usize {
        self.tables.lock().await.surveys.len()
    }

    pub async fn bridge_rows(&self, class: RespondentClass) -> Vec<BridgeRow> {
        self.tables
            .lock()
            .await
            .bridges
            .get(&class)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl SurveyStore for MemoryStore {
    async fn object_exists(&self, class: ObjectClass, id: i64) -> Result<bool, StoreError> {
        Ok(self.tables.lock().await.objects(class).contains(&id))
    }

    async fn find_survey(&self, identity: &SurveyIdentity) -> Result<Option<Survey>, StoreError> {
        let tables = self.tables.lock().await;

        // BTreeMap iterates in id order, so the lowest id wins.
        let found = tables
            .surveys
            .values()
            .filter(|survey| identity.matches(survey))
            .find(|survey| {
                tables
                    .find_bridge_row(identity.respondent_class, survey.id)
                    .is_some()
            })
            .cloned();

        Ok(found)
    }

    async fn update_score(&self, survey_id: i64, score: i32) -> Result<Survey, StoreError> {
        let mut tables = self.tables.lock().await;
        let survey = tables
            .surveys
            .get_mut(&survey_id)
            .ok_or(StoreError::SurveyNotFound(survey_id))?;

        survey.score = score;
        survey.updated_at = Utc::now();

        Ok(survey.clone())
    }

    async fn create_survey(&self, new: &NewSurvey) -> Result<Survey, StoreError> {
        let mut tables = self.tables.lock().await;
        let identity = &new.identity;

        // Nothing is written unless the bridge row can be linked.
        if !tables
            .respondents(identity.respondent_class)
            .contains(&identity.respondent_id)
        {
            return Err(StoreError::RespondentNotFound);
        }

        tables.next_survey_id += 1;
        let now = Utc::now();
        let survey = Survey {
            id: tables.next_survey_id,
            touchpoint: new.touchpoint.clone(),
            respondent_id: identity.respondent_id,
            object_id: identity.object_id,
            respondent_class: identity.respondent_class,
            object_class: identity.object_class,
            score: new.score,
            created_at: now,
            updated_at: now,
        };

        tables.surveys.insert(survey.id, survey.clone());
        tables.insert_bridge_row(identity.respondent_class, identity.respondent_id, survey.id);

        Ok(survey)
    }

    async fn find_touchpoints(&self, filter: &TouchpointFilter) -> Result<Vec<Survey>, StoreError> {
        let tables = self.tables.lock().await;

        Ok(tables
            .surveys
            .values()
            .filter(|survey| filter.matches(survey))
            .cloned()
            .collect())
    }

    async fn seed_demo_data(&self) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        if !tables.realtors.is_empty() {
            return Ok(());
        }

        tables.realtors.insert(1);
        tables.sellers.insert(1);
        tables.properties.insert(1);
        tables.deals.insert(1);

        tracing::info!("Seeded demo realtor, seller, property and deal");

        Ok(())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn new_survey(respondent_id: i64, score: i32) -> NewSurvey {
        NewSurvey {
            touchpoint: "deal_feedback".to_string(),
            identity: SurveyIdentity {
                respondent_id,
                object_id: 1,
                respondent_class: RespondentClass::Seller,
                object_class: ObjectClass::Deal,
            },
            score,
        }
    }

    #[tokio::test]
    async fn test_create_links_bridge_row() {
        let store = MemoryStore::new();
        assert_ok!(store.seed_demo_data().await);

        let survey = assert_ok!(store.create_survey(&new_survey(1, 7)).await);

        assert_eq!(survey.id, 1);
        assert_eq!(store.survey_count().await, 1);
        let rows = store.bridge_rows(RespondentClass::Seller).await;
        assert_eq!(rows, vec![BridgeRow { id: 1, respondent_id: 1, survey_id: 1 }]);
        assert!(store.bridge_rows(RespondentClass::Realtor).await.is_empty());
    }

    #[tokio::test]
    async fn test_create_with_unknown_respondent_writes_nothing() {
        let store = MemoryStore::new();
        assert_ok!(store.seed_demo_data().await);

        let err = assert_err!(store.create_survey(&new_survey(42, 7)).await);

        assert!(matches!(err, StoreError::RespondentNotFound));
        assert_eq!(store.survey_count().await, 0);
        assert!(store.bridge_rows(RespondentClass::Seller).await.is_empty());
    }

    #[tokio::test]
    async fn test_find_survey_requires_bridge_of_same_class() {
        let store = MemoryStore::new();
        assert_ok!(store.seed_demo_data().await);
        assert_ok!(store.create_survey(&new_survey(1, 7)).await);

        let mut identity = new_survey(1, 7).identity;
        assert!(assert_ok!(store.find_survey(&identity).await).is_some());

        identity.respondent_class = RespondentClass::Realtor;
        assert!(assert_ok!(store.find_survey(&identity).await).is_none());
    }

    #[tokio::test]
    async fn test_duplicates_resolve_to_lowest_id() {
        let store = MemoryStore::new();
        assert_ok!(store.seed_demo_data().await);
        assert_ok!(store.create_survey(&new_survey(1, 3)).await);
        assert_ok!(store.create_survey(&new_survey(1, 9)).await);

        let found = assert_ok!(store.find_survey(&new_survey(1, 0).identity).await);

        assert_eq!(found.map(|s| (s.id, s.score)), Some((1, 3)));
    }

    #[tokio::test]
    async fn test_update_missing_survey() {
        let store = MemoryStore::new();
        let err = assert_err!(store.update_score(5, 4).await);
        assert!(matches!(err, StoreError::SurveyNotFound(5)));
    }
}
