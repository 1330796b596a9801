use crate::domain::source::Source;
use crate::error::{AppError, AppResult};
use crate::infrastructure::db::{check_connection, DbPool};
use async_trait::async_trait;
use std::sync::Arc;

/// Storage of source records and their generated-audio metadata
#[async_trait]
pub trait SourceRepository: Send + Sync {
    /// Find a source by ID
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Source>>;

    /// Record a generated artifact on an existing source, leaving its text untouched
    async fn update_audio(
        &self,
        id: &str,
        audio_file: &str,
        audio_generation_command: &str,
    ) -> AppResult<()>;

    /// Check that the store is reachable
    async fn ping(&self) -> AppResult<()>;
}

pub struct PgSourceRepository {
    pool: Arc<DbPool>,
}

impl PgSourceRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SourceRepository for PgSourceRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Source>> {
        let pool = self.pool.as_ref();
        let source = sqlx::query_as::<_, Source>(
            r#"
            SELECT id, full_text, audio_file, audio_generation_command
            FROM sources
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(source)
    }

    async fn update_audio(
        &self,
        id: &str,
        audio_file: &str,
        audio_generation_command: &str,
    ) -> AppResult<()> {
        let pool = self.pool.as_ref();
        let result = sqlx::query(
            r#"
            UPDATE sources
            SET audio_file = $2,
                audio_generation_command = $3,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(audio_file)
        .bind(audio_generation_command)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Source {} no longer exists", id)));
        }

        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        check_connection(&self.pool).await?;
        Ok(())
    }
}
