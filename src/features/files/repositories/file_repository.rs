use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::files::models::{
    FileRecord, ListingScope, NewFileRecord, ProcessedMessage, SortKey,
};

/// Persistence of file metadata
#[async_trait]
pub trait FileRecordRepository: Send + Sync {
    async fn insert(&self, new_file: NewFileRecord) -> Result<FileRecord>;

    async fn find_by_id(&self, id: i64) -> Result<Option<FileRecord>>;

    /// One page of records plus the total number matching `scope`
    async fn list(
        &self,
        scope: ListingScope,
        sort: SortKey,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<FileRecord>, i64)>;

    /// Store the parse outcome as one unit of work: insert every message and
    /// set the processed flag, or change nothing at all.
    async fn complete_processing(
        &self,
        file_id: i64,
        processed: bool,
        messages: &[String],
    ) -> Result<u64>;

    /// Remove the record and any messages still attached to it as one unit
    /// of work. Returns `false` when no record had that id.
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// Persistence of extracted messages
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Messages of a file in extraction order
    async fn find_by_file(&self, file_id: i64) -> Result<Vec<ProcessedMessage>>;

    async fn count_by_file(&self, file_id: i64) -> Result<i64>;

    async fn delete_by_file(&self, file_id: i64) -> Result<u64>;
}

pub struct PgFileRepository {
    pool: PgPool,
}

impl PgFileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn owner_filter(scope: ListingScope) -> Option<i64> {
        match scope {
            ListingScope::All => None,
            ListingScope::Owner(user_id) => Some(user_id),
        }
    }
}

#[async_trait]
impl FileRecordRepository for PgFileRepository {
    async fn insert(&self, new_file: NewFileRecord) -> Result<FileRecord> {
        sqlx::query_as::<_, FileRecord>(
            r#"
            INSERT INTO process_files (user_id, original_file_name, system_file_name, file_size)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, original_file_name, system_file_name, file_size, upload_date, processed
            "#,
        )
        .bind(new_file.user_id)
        .bind(&new_file.original_file_name)
        .bind(&new_file.system_file_name)
        .bind(&new_file.file_size)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert file record: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<FileRecord>> {
        sqlx::query_as::<_, FileRecord>(
            r#"
            SELECT id, user_id, original_file_name, system_file_name, file_size, upload_date, processed
            FROM process_files
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn list(
        &self,
        scope: ListingScope,
        sort: SortKey,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<FileRecord>, i64)> {
        let owner = Self::owner_filter(scope);

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM process_files
            WHERE ($1::BIGINT IS NULL OR user_id = $1)
            "#,
        )
        .bind(owner)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count file records: {:?}", e);
            AppError::Database(e)
        })?;

        // Sort column comes from the SortKey allow-list, never from user input
        let query = format!(
            r#"
            SELECT id, user_id, original_file_name, system_file_name, file_size, upload_date, processed
            FROM process_files
            WHERE ($1::BIGINT IS NULL OR user_id = $1)
            ORDER BY {} ASC
            OFFSET $2 LIMIT $3
            "#,
            sort.column()
        );

        let records = sqlx::query_as::<_, FileRecord>(&query)
            .bind(owner)
            .bind(offset)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list file records: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((records, total))
    }

    async fn complete_processing(
        &self,
        file_id: i64,
        processed: bool,
        messages: &[String],
    ) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO processed_messages (message, processed_file_id)
            SELECT t.message, $2
            FROM UNNEST($1::TEXT[]) WITH ORDINALITY AS t(message, ord)
            ORDER BY t.ord
            "#,
        )
        .bind(messages.to_vec())
        .bind(file_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert messages for file {}: {:?}", file_id, e);
            AppError::Database(e)
        })?
        .rows_affected();

        let updated = sqlx::query(
            r#"
            UPDATE process_files
            SET processed = $2
            WHERE id = $1
            "#,
        )
        .bind(file_id)
        .bind(processed)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update file {}: {:?}", file_id, e);
            AppError::Database(e)
        })?
        .rows_affected();

        if updated == 0 {
            tx.rollback().await?;
            return Err(AppError::NotFound(format!(
                "File {} disappeared before processing completed",
                file_id
            )));
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        // Row lock makes a concurrent outcome commit land wholly before or after
        let locked = sqlx::query("SELECT id FROM process_files WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to lock file record {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        if locked.is_none() {
            tx.rollback().await?;
            return Ok(false);
        }

        let late_messages =
            sqlx::query("DELETE FROM processed_messages WHERE processed_file_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to delete messages of file {}: {:?}", id, e);
                    AppError::Database(e)
                })?
                .rows_affected();

        if late_messages > 0 {
            tracing::debug!(
                "Removed {} messages committed to file {} during deletion",
                late_messages,
                id
            );
        }

        let deleted = sqlx::query("DELETE FROM process_files WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete file record {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .rows_affected();

        tx.commit().await?;
        Ok(deleted > 0)
    }
}

#[async_trait]
impl MessageRepository for PgFileRepository {
    async fn find_by_file(&self, file_id: i64) -> Result<Vec<ProcessedMessage>> {
        sqlx::query_as::<_, ProcessedMessage>(
            r#"
            SELECT id, message, processed_file_id
            FROM processed_messages
            WHERE processed_file_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(file_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn count_by_file(&self, file_id: i64) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM processed_messages WHERE processed_file_id = $1")
            .bind(file_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete_by_file(&self, file_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM processed_messages WHERE processed_file_id = $1")
            .bind(file_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete messages of file {}: {:?}", file_id, e);
                AppError::Database(e)
            })?;

        Ok(result.rows_affected())
    }
}
