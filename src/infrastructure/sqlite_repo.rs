use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    query::Query,
    sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use uuid::Uuid;

use crate::domain::{
    filter::{Predicate, SqlParam},
    pagination::PageRequest,
    repository::TaskRepository,
    task::{NewTask, Priority, Task, TaskChanges, TaskId, UserId},
};

const COLUMNS: &str = "id, title, description, completed, priority, category, tags, user_id, created_at";

#[derive(Clone)]
pub struct SqliteTaskRepository {
    pool: Arc<Pool<Sqlite>>,
}

impl SqliteTaskRepository {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid database url {database_url}"))?
            .create_if_missing(true);
        let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections.max(1));
        if database_url.contains(":memory:") {
            // one connection that never recycles, so every caller sees the same database
            pool_options = pool_options.max_connections(1).idle_timeout(None).max_lifetime(None);
        }
        let pool = pool_options.connect_with(options).await?;
        Ok(Self { pool: Arc::new(pool) })
    }

    pub async fn close(&self) { self.pool.close().await }
}

#[async_trait]
impl TaskRepository for SqliteTaskRepository {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT,
                completed INTEGER NOT NULL DEFAULT 0,
                priority TEXT NOT NULL CHECK (priority IN ('low', 'medium', 'high')),
                category TEXT,
                tags TEXT,
                user_id TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            )",
        )
        .execute(&*self.pool)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_tasks_user_created ON tasks (user_id, created_at DESC)")
            .execute(&*self.pool)
            .await?;
        Ok(())
    }

    async fn insert(&self, task: NewTask) -> Result<Task> {
        let sql = format!(
            "INSERT INTO tasks (id, title, description, priority, category, tags, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) RETURNING {COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(task.id.0.to_string())
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.priority.as_str())
            .bind(&task.category)
            .bind(&task.tags)
            .bind(task.user_id.as_str())
            .fetch_one(&*self.pool)
            .await
            .context("insert task")?;
        row_to_task(row)
    }

    async fn find(&self, user_id: &UserId, id: TaskId) -> Result<Option<Task>> {
        let sql = format!("SELECT {COLUMNS} FROM tasks WHERE id = ?1 AND user_id = ?2");
        let row = sqlx::query(&sql)
            .bind(id.0.to_string())
            .bind(user_id.as_str())
            .fetch_optional(&*self.pool)
            .await
            .context("find task")?;
        row.map(row_to_task).transpose()
    }

    async fn count(&self, predicate: &Predicate) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM tasks WHERE {}", predicate.where_clause());
        let row = bind_params(sqlx::query(&sql), predicate.params())
            .fetch_one(&*self.pool)
            .await
            .context("count tasks")?;
        Ok(row.try_get::<i64, _>(0)? as u64)
    }

    async fn list(&self, predicate: &Predicate, page: &PageRequest) -> Result<Vec<Task>> {
        let Some(offset) = page.offset() else { return Ok(Vec::new()) };
        let sql = format!(
            "SELECT {COLUMNS} FROM tasks WHERE {} ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?",
            predicate.where_clause()
        );
        let rows = bind_params(sqlx::query(&sql), predicate.params())
            .bind(page.limit as i64)
            .bind(offset)
            .fetch_all(&*self.pool)
            .await
            .context("list tasks")?;
        rows.into_iter().map(row_to_task).collect()
    }

    async fn update(&self, user_id: &UserId, id: TaskId, changes: TaskChanges) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE tasks SET
                title = COALESCE(?1, title),
                description = COALESCE(?2, description),
                completed = COALESCE(?3, completed),
                priority = COALESCE(?4, priority),
                category = COALESCE(?5, category),
                tags = COALESCE(?6, tags)
             WHERE id = ?7 AND user_id = ?8",
        )
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.completed)
        .bind(changes.priority.map(|p| p.as_str()))
        .bind(changes.category)
        .bind(changes.tags)
        .bind(id.0.to_string())
        .bind(user_id.as_str())
        .execute(&*self.pool)
        .await
        .context("update task")?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, user_id: &UserId, id: TaskId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?1 AND user_id = ?2")
            .bind(id.0.to_string())
            .bind(user_id.as_str())
            .execute(&*self.pool)
            .await
            .context("delete task")?;
        Ok(result.rows_affected())
    }

    async fn stats(&self, user_id: &UserId) -> Result<(u64, u64)> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total, COALESCE(SUM(completed), 0) AS completed FROM tasks WHERE user_id = ?1",
        )
        .bind(user_id.as_str())
        .fetch_one(&*self.pool)
        .await
        .context("task stats")?;
        let total: i64 = row.try_get("total")?;
        let completed: i64 = row.try_get("completed")?;
        Ok((total as u64, completed as u64))
    }
}

fn bind_params<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: Vec<SqlParam>,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for param in params {
        query = match param {
            SqlParam::Text(text) => query.bind(text),
            SqlParam::Bool(flag) => query.bind(flag),
        };
    }
    query
}

fn row_to_task(row: SqliteRow) -> Result<Task> {
    let id_str: String = row.try_get("id")?;
    let priority_str: String = row.try_get("priority")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    Ok(Task {
        id: TaskId(Uuid::parse_str(&id_str).with_context(|| format!("malformed task id {id_str}"))?),
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        completed: row.try_get("completed")?,
        priority: priority_str.parse::<Priority>().map_err(|e| anyhow!(e))?,
        category: row.try_get("category")?,
        tags: row.try_get("tags")?,
        user_id: UserId(row.try_get("user_id")?),
        created_at,
    })
}
