use crate::domain::ports::{DocumentStore, Expected, StoredDocument};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{Row, SqliteConnection, SqlitePool};
use chrono::Utc;

/// Field name under which whole documents are stored.
const ROOT_FIELD: &str = "";

pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn read(&self, key: &str, field: &str) -> Result<Option<StoredDocument>, AppError> {
        let row = sqlx::query("SELECT value, version FROM documents WHERE doc_key = ? AND field_name = ?")
            .bind(key).bind(field)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?;

        Ok(row.map(|r| StoredDocument { value: r.get("value"), version: r.get("version") }))
    }

    async fn write(&self, key: &str, field: &str, value: &str, expected: Expected) -> Result<i64, AppError> {
        let mut conn = self.pool.acquire().await.map_err(AppError::Database)?;
        write_on(&mut conn, key, field, value, expected).await
    }
}

async fn write_on(conn: &mut SqliteConnection, key: &str, field: &str, value: &str, expected: Expected) -> Result<i64, AppError> {
    let now = Utc::now();
    let version: Option<i64> = match expected {
        Expected::Any => Some(sqlx::query_scalar::<_, i64>(
            "INSERT INTO documents (doc_key, field_name, value, version, updated_at) VALUES (?, ?, ?, 1, ?)
             ON CONFLICT (doc_key, field_name) DO UPDATE SET value = excluded.value, version = documents.version + 1, updated_at = excluded.updated_at
             RETURNING version"
        )
            .bind(key).bind(field).bind(value).bind(now)
            .fetch_one(&mut *conn).await.map_err(AppError::Database)?),
        Expected::Absent => sqlx::query_scalar::<_, i64>(
            "INSERT INTO documents (doc_key, field_name, value, version, updated_at) VALUES (?, ?, ?, 1, ?)
             ON CONFLICT (doc_key, field_name) DO NOTHING
             RETURNING version"
        )
            .bind(key).bind(field).bind(value).bind(now)
            .fetch_optional(&mut *conn).await.map_err(AppError::Database)?,
        Expected::Version(current) => sqlx::query_scalar::<_, i64>(
            "UPDATE documents SET value = ?, version = version + 1, updated_at = ?
             WHERE doc_key = ? AND field_name = ? AND version = ?
             RETURNING version"
        )
            .bind(value).bind(now).bind(key).bind(field).bind(current)
            .fetch_optional(&mut *conn).await.map_err(AppError::Database)?,
    };

    version.ok_or(AppError::StoreConflict)
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn get(&self, key: &str) -> Result<Option<StoredDocument>, AppError> {
        self.read(key, ROOT_FIELD).await
    }

    async fn set(&self, key: &str, value: &str, expected: Expected) -> Result<i64, AppError> {
        self.write(key, ROOT_FIELD, value, expected).await
    }

    async fn set_linked(&self, key: &str, value: &str, expected: Expected, linked_key: &str, linked_value: &str) -> Result<i64, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let version = write_on(&mut tx, key, ROOT_FIELD, value, expected).await?;
        write_on(&mut tx, linked_key, ROOT_FIELD, linked_value, Expected::Any).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(version)
    }

    async fn get_field(&self, key: &str, field: &str) -> Result<Option<StoredDocument>, AppError> {
        self.read(key, field).await
    }

    async fn get_fields(&self, key: &str) -> Result<Vec<(String, StoredDocument)>, AppError> {
        let rows = sqlx::query("SELECT field_name, value, version FROM documents WHERE doc_key = ? AND field_name <> '' ORDER BY field_name")
            .bind(key)
            .fetch_all(&self.pool).await.map_err(AppError::Database)?;

        Ok(rows.into_iter()
            .map(|r| (r.get("field_name"), StoredDocument { value: r.get("value"), version: r.get("version") }))
            .collect())
    }

    async fn set_field(&self, key: &str, field: &str, value: &str, expected: Expected) -> Result<i64, AppError> {
        if field.is_empty() {
            return Err(AppError::Validation("Field name must not be empty".into()));
        }
        self.write(key, field, value, expected).await
    }

    async fn delete_field(&self, key: &str, field: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM documents WHERE doc_key = ? AND field_name = ?")
            .bind(key).bind(field)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
