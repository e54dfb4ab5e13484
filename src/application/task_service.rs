use std::sync::Arc;

use async_trait::async_trait;

use crate::application::cache::TaskCache;
use crate::application::error::{TaskError, TaskResult};
use crate::domain::filter::{Predicate, TaskQuery};
use crate::domain::pagination::{MAX_LIMIT, PageMeta, PageRequest};
use crate::domain::repository::TaskRepository;
use crate::domain::task::{CreateTask, Task, TaskId, TaskStats, UpdateTask, UserId};

#[derive(Debug, Clone, PartialEq)]
pub struct TaskPage {
    pub items: Vec<Task>,
    pub meta: PageMeta,
}

#[async_trait]
pub trait TaskService: Send + Sync + 'static {
    async fn list(&self, user_id: &UserId, query: &TaskQuery) -> TaskResult<TaskPage>;
    async fn create(&self, user_id: &UserId, input: CreateTask) -> TaskResult<Task>;
    async fn get(&self, user_id: &UserId, id: TaskId) -> TaskResult<Task>;
    async fn update(&self, user_id: &UserId, id: TaskId, input: UpdateTask) -> TaskResult<Task>;
    async fn delete(&self, user_id: &UserId, id: TaskId) -> TaskResult<()>;
    async fn stats(&self, user_id: &UserId) -> TaskResult<TaskStats>;
}

#[derive(Clone)]
pub struct TaskServiceImpl<R: TaskRepository> {
    repo: R,
    cache: Arc<TaskCache>,
    max_limit: u64,
}

impl<R: TaskRepository> TaskServiceImpl<R> {
    pub fn new(repo: R, cache: Arc<TaskCache>) -> Self { Self { repo, cache, max_limit: MAX_LIMIT } }

    pub fn with_max_limit(mut self, max_limit: u64) -> Self {
        self.max_limit = max_limit;
        self
    }

    pub fn cache(&self) -> &Arc<TaskCache> { &self.cache }
}

#[async_trait]
impl<R: TaskRepository> TaskService for TaskServiceImpl<R> {
    async fn list(&self, user_id: &UserId, query: &TaskQuery) -> TaskResult<TaskPage> {
        let predicate = Predicate::compile(user_id, &query.filter());
        let page = PageRequest::new(query.page(), query.limit(), self.max_limit);
        let total = self.repo.count(&predicate).await?;
        let items = self.repo.list(&predicate, &page).await?;
        tracing::debug!(user_id = %user_id, total, page = page.page, returned = items.len(), "listed tasks");
        Ok(TaskPage { items, meta: PageMeta::new(total, &page) })
    }

    async fn create(&self, user_id: &UserId, input: CreateTask) -> TaskResult<Task> {
        let new = input.validate(TaskId::generate(), user_id.clone()).map_err(TaskError::Validation)?;
        let task = self.repo.insert(new).await?;
        self.cache.invalidate_all().await;
        tracing::info!(user_id = %user_id, task_id = %task.id, "task created");
        Ok(task)
    }

    async fn get(&self, user_id: &UserId, id: TaskId) -> TaskResult<Task> {
        if let Some(task) = self.cache.lookup(user_id, id).await {
            tracing::debug!(user_id = %user_id, task_id = %id, "cache hit");
            return Ok(task);
        }
        tracing::debug!(user_id = %user_id, task_id = %id, "cache miss");
        let task = self.repo.find(user_id, id).await?.ok_or(TaskError::NotFound)?;
        self.cache.store(user_id, id, &task).await;
        Ok(task)
    }

    async fn update(&self, user_id: &UserId, id: TaskId, input: UpdateTask) -> TaskResult<Task> {
        let changes = input.validate().map_err(TaskError::Validation)?;
        if self.repo.update(user_id, id, changes).await? == 0 {
            return Err(TaskError::NotFound);
        }
        self.cache.invalidate(user_id, id).await;
        self.cache.invalidate_all().await;
        tracing::info!(user_id = %user_id, task_id = %id, "task updated");
        // deleted between the write and this read
        self.repo.find(user_id, id).await?.ok_or(TaskError::NotFound)
    }

    async fn delete(&self, user_id: &UserId, id: TaskId) -> TaskResult<()> {
        if self.repo.delete(user_id, id).await? == 0 {
            return Err(TaskError::NotFound);
        }
        self.cache.invalidate(user_id, id).await;
        self.cache.invalidate_all().await;
        tracing::info!(user_id = %user_id, task_id = %id, "task deleted");
        Ok(())
    }

    async fn stats(&self, user_id: &UserId) -> TaskResult<TaskStats> {
        let (total, completed) = self.repo.stats(user_id).await?;
        Ok(TaskStats::from_counts(total, completed))
    }
}
