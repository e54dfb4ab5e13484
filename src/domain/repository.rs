use async_trait::async_trait;

use super::filter::Predicate;
use super::pagination::PageRequest;
use super::task::{NewTask, Task, TaskChanges, TaskId, UserId};

/// Persistence contract for task rows. Every single-row operation is scoped
/// by both id and owner; `update`/`delete` report affected row counts.
#[async_trait]
pub trait TaskRepository: Send + Sync + 'static {
    async fn init(&self) -> anyhow::Result<()>;
    async fn insert(&self, task: NewTask) -> anyhow::Result<Task>;
    async fn find(&self, user_id: &UserId, id: TaskId) -> anyhow::Result<Option<Task>>;
    async fn count(&self, predicate: &Predicate) -> anyhow::Result<u64>;
    /// Page of matching rows, newest first.
    async fn list(&self, predicate: &Predicate, page: &PageRequest) -> anyhow::Result<Vec<Task>>;
    async fn update(&self, user_id: &UserId, id: TaskId, changes: TaskChanges) -> anyhow::Result<u64>;
    async fn delete(&self, user_id: &UserId, id: TaskId) -> anyhow::Result<u64>;
    /// `(total, completed)` for one owner.
    async fn stats(&self, user_id: &UserId) -> anyhow::Result<(u64, u64)>;
}
