use crate::models::{NewSurvey, ObjectClass, Survey, SurveyIdentity, TouchpointFilter};
use crate::services::store::{StoreError, SurveyStore};
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;

const SURVEY_COLUMNS: &str = "s.id, s.touchpoint, s.respondent_id, s.object_id, s.respondent_class, \
     s.object_class, s.score, s.created_at, s.updated_at";

/// PostgreSQL-backed survey store
///
/// Surveys live in `surveys`; each respondent class owns a bridge table
/// (`realtor_surveys`, `seller_surveys`) with a foreign key to its
/// respondent table. Schema migrations run on connect.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new store from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn survey_from_row(row: &PgRow) -> Result<Survey, StoreError> {
    let respondent_class: String = row.try_get("respondent_class")?;
    let object_class: String = row.try_get("object_class")?;

    Ok(Survey {
        id: row.try_get("id")?,
        touchpoint: row.try_get("touchpoint")?,
        respondent_id: row.try_get("respondent_id")?,
        object_id: row.try_get("object_id")?,
        respondent_class: respondent_class
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("surveys.respondent_class: {}", e)))?,
        object_class: object_class
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("surveys.object_class: {}", e)))?,
        score: row.try_get("score")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn map_bridge_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_foreign_key_violation() {
            return StoreError::RespondentNotFound;
        }
    }

    StoreError::Database(err)
}

#[async_trait]
impl SurveyStore for PostgresStore {
    async fn object_exists(&self, class: ObjectClass, id: i64) -> Result<bool, StoreError> {
        let query = format!("SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1)", class.table());

        let row = sqlx::query(&query).bind(id).fetch_one(&self.pool).await?;

        Ok(row.try_get(0)?)
    }

    async fn find_survey(&self, identity: &SurveyIdentity) -> Result<Option<Survey>, StoreError> {
        let bridge = identity.respondent_class.bridge();
        let query = format!(
            r#"
            SELECT {}
            FROM surveys s
            INNER JOIN {} b ON b.survey_id = s.id
            WHERE s.respondent_id = $1
              AND s.object_id = $2
              AND s.respondent_class = $3
              AND s.object_class = $4
            ORDER BY s.id ASC
            LIMIT 1
            "#,
            SURVEY_COLUMNS, bridge.table
        );

        let row = sqlx::query(&query)
            .bind(identity.respondent_id)
            .bind(identity.object_id)
            .bind(identity.respondent_class.as_str())
            .bind(identity.object_class.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(survey_from_row).transpose()
    }

    async fn update_score(&self, survey_id: i64, score: i32) -> Result<Survey, StoreError> {
        let query = format!(
            r#"
            UPDATE surveys s
            SET score = $1, updated_at = NOW()
            WHERE s.id = $2
            RETURNING {}
            "#,
            SURVEY_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(score)
            .bind(survey_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::SurveyNotFound(survey_id))?;

        survey_from_row(&row)
    }

    async fn create_survey(&self, survey: &NewSurvey) -> Result<Survey, StoreError> {
        let identity = &survey.identity;
        let bridge = identity.respondent_class.bridge();

        // Dropping the transaction without commit rolls both inserts back.
        let mut tx = self.pool.begin().await?;

        let insert_survey = format!(
            r#"
            INSERT INTO surveys AS s
                (touchpoint, respondent_id, object_id, respondent_class, object_class, score, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
            RETURNING {}
            "#,
            SURVEY_COLUMNS
        );

        let row = sqlx::query(&insert_survey)
            .bind(&survey.touchpoint)
            .bind(identity.respondent_id)
            .bind(identity.object_id)
            .bind(identity.respondent_class.as_str())
            .bind(identity.object_class.as_str())
            .bind(survey.score)
            .fetch_one(&mut *tx)
            .await?;
        let created = survey_from_row(&row)?;

        let insert_bridge = format!(
            r#"
            INSERT INTO {} ({}, survey_id, created_at, updated_at)
            VALUES ($1, $2, NOW(), NOW())
            "#,
            bridge.table, bridge.respondent_column
        );

        sqlx::query(&insert_bridge)
            .bind(identity.respondent_id)
            .bind(created.id)
            .execute(&mut *tx)
            .await
            .map_err(map_bridge_error)?;

        tx.commit().await?;

        tracing::debug!(
            "Linked survey {} to {} {} via {}",
            created.id,
            identity.respondent_class,
            identity.respondent_id,
            bridge.table
        );

        Ok(created)
    }

    async fn find_touchpoints(&self, filter: &TouchpointFilter) -> Result<Vec<Survey>, StoreError> {
        let query = format!(
            r#"
            SELECT {}
            FROM surveys s
            WHERE s.touchpoint = $1
              AND s.respondent_class = ANY($2)
              AND s.object_class = ANY($3)
            ORDER BY s.id ASC
            "#,
            SURVEY_COLUMNS
        );

        let respondent_classes: Vec<String> = filter
            .respondent_classes
            .iter()
            .map(|c| c.as_str().to_string())
            .collect();
        let object_classes: Vec<String> = filter
            .object_classes
            .iter()
            .map(|c| c.as_str().to_string())
            .collect();

        let rows = sqlx::query(&query)
            .bind(&filter.touchpoint)
            .bind(&respondent_classes)
            .bind(&object_classes)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(survey_from_row).collect()
    }

    async fn seed_demo_data(&self) -> Result<(), StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM realtors")
            .fetch_one(&self.pool)
            .await?;
        let existing: i64 = row.try_get("total")?;
        if existing > 0 {
            tracing::info!("Skipping demo seed, {} realtors already present", existing);
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        let realtor_id: i64 = sqlx::query(
            r#"
            INSERT INTO realtors (name, address, email, phone_number, company)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind("Real Realtor")
        .bind("2 Home Street")
        .bind("realtor@example.com")
        .bind("+353 112 221")
        .bind("tTRC - the Totally Real Company")
        .fetch_one(&mut *tx)
        .await?
        .try_get("id")?;

        let seller_id: i64 = sqlx::query(
            r#"
            INSERT INTO sellers (name, address, email, phone_number)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind("John")
        .bind("5 Somewhere Street")
        .bind("john@example.com")
        .bind("+44 784 380 4570")
        .fetch_one(&mut *tx)
        .await?
        .try_get("id")?;

        let property_id: i64 = sqlx::query(
            r#"
            INSERT INTO properties (property_type, address, seller_id)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind("house")
        .bind("5 Somewhere Street")
        .bind(seller_id)
        .fetch_one(&mut *tx)
        .await?
        .try_get("id")?;

        sqlx::query("INSERT INTO deals (property_id, realtor_id, seller_id) VALUES ($1, $2, $3)")
            .bind(property_id)
            .bind(realtor_id)
            .bind(seller_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!("Seeded demo realtor, seller, property and deal");

        Ok(())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
