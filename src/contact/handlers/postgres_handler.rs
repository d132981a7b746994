use crate::contact::types::ContactSubmission;
use crate::contact::util::handler::ContactHandler;
use crate::shared::util::handler::StoreError;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use sqlx::Row;
use sqlx::postgres::{PgPool, PgRow};

#[derive(Clone)]
pub struct PostgresHandler {
    pool: PgPool
}

impl PostgresHandler {
    pub fn new(pool: PgPool) -> PostgresHandler {
        PostgresHandler { pool }
    }
}

fn submission_from_row(row: &PgRow) -> Result<ContactSubmission, StoreError> {
    Ok(ContactSubmission {
        id: row.try_get::<Uuid, &str>("id")?,
        first_name: row.try_get::<String, &str>("first_name")?,
        last_name: row.try_get::<String, &str>("last_name")?,
        email: row.try_get::<String, &str>("email")?,
        organization: row.try_get::<Option<String>, &str>("organization")?,
        role: row.try_get::<Option<String>, &str>("role")?,
        interest: row.try_get::<Option<String>, &str>("interest")?,
        message: row.try_get::<Option<String>, &str>("message")?,
        consent: row.try_get::<bool, &str>("consent")?,
        created: row.try_get::<DateTime<Utc>, &str>("created_at")?
    })
}

#[async_trait]
impl ContactHandler for PostgresHandler {
    // Called on first launch for setup
    async fn init(&self) -> Result<(), StoreError> {
        sqlx::query(r#"
        CREATE TABLE IF NOT EXISTS contact_submissions (
            id uuid primary key unique,
            first_name text NOT NULL CHECK(length(first_name) <= 50),
            last_name text NOT NULL CHECK(length(last_name) <= 50),
            email text NOT NULL CHECK(length(email) <= 255),
            organization text CHECK(length(organization) <= 100),
            role text,
            interest text,
            message text CHECK(length(message) <= 2000),
            consent boolean NOT NULL,
            created_at timestamptz NOT NULL,
            processed boolean NOT NULL DEFAULT false,
            metadata json
        );"#).execute(&self.pool).await?;
        Ok(())
    }

    async fn insert(&self, submission: &ContactSubmission) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO contact_submissions(id, first_name, last_name, email, organization,
                role, interest, message, consent, created_at)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10);")
            .bind(submission.id)
            .bind(submission.first_name.as_str())
            .bind(submission.last_name.as_str())
            .bind(submission.email.as_str())
            .bind(submission.organization.as_deref())
            .bind(submission.role.as_deref())
            .bind(submission.interest.as_deref())
            .bind(submission.message.as_deref())
            .bind(submission.consent)
            .bind(submission.created)
            .execute(&self.pool).await?;
        Ok(())
    }

    async fn get(&self, id: &Uuid) -> Result<Option<ContactSubmission>, StoreError> {
        let row = sqlx::query("SELECT * FROM contact_submissions WHERE id = $1;")
            .bind(id)
            .fetch_optional(&self.pool).await?;
        row.as_ref().map(submission_from_row).transpose()
    }
}
