//! Read-through cache for single-task reads.
//!
//! Entries are JSON snapshots keyed by `(owner, task id)` and expire a fixed
//! TTL after insertion. Expiry is checked on lookup only; nothing sweeps in
//! the background, and an expired entry is indistinguishable from a missing
//! one. Writers must call [`TaskCache::invalidate`] / [`TaskCache::invalidate_all`]
//! after their store write and before reporting success.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::domain::task::{Task, TaskId, UserId};

pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant { Instant::now() }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub user_id: UserId,
    pub task_id: TaskId,
}

impl CacheKey {
    pub fn new(user_id: &UserId, task_id: TaskId) -> Self { Self { user_id: user_id.clone(), task_id } }
}

struct Entry {
    snapshot: String,
    inserted_at: Instant,
}

pub struct TaskCache {
    entries: RwLock<HashMap<CacheKey, Entry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TaskCache {
    pub fn new(ttl: Duration) -> Self { Self::with_clock(ttl, Arc::new(SystemClock)) }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { entries: RwLock::new(HashMap::new()), ttl, clock }
    }

    pub fn ttl(&self) -> Duration { self.ttl }

    pub async fn lookup(&self, user_id: &UserId, task_id: TaskId) -> Option<Task> {
        let key = CacheKey::new(user_id, task_id);
        let entries = self.entries.read().await;
        let entry = entries.get(&key)?;
        if self.clock.now().saturating_duration_since(entry.inserted_at) >= self.ttl {
            return None;
        }
        match serde_json::from_str(&entry.snapshot) {
            Ok(task) => Some(task),
            Err(e) => {
                tracing::warn!(user_id = %user_id, task_id = %task_id, error = %e, "dropping undecodable cache entry");
                None
            }
        }
    }

    pub async fn store(&self, user_id: &UserId, task_id: TaskId, task: &Task) {
        let snapshot = match serde_json::to_string(task) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(task_id = %task_id, error = %e, "task not cacheable");
                return;
            }
        };
        let entry = Entry { snapshot, inserted_at: self.clock.now() };
        self.entries.write().await.insert(CacheKey::new(user_id, task_id), entry);
    }

    pub async fn invalidate(&self, user_id: &UserId, task_id: TaskId) {
        self.entries.write().await.remove(&CacheKey::new(user_id, task_id));
    }

    pub async fn invalidate_all(&self) {
        self.entries.write().await.clear();
    }

    /// Drops every entry; called on shutdown.
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        let dropped = entries.len();
        entries.clear();
        tracing::debug!(dropped, "task cache cleared");
    }

    /// Number of held entries, expired ones included.
    pub async fn len(&self) -> usize { self.entries.read().await.len() }

    pub async fn is_empty(&self) -> bool { self.entries.read().await.is_empty() }
}

impl Default for TaskCache {
    fn default() -> Self { Self::new(DEFAULT_TTL) }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::task::Priority;
    use chrono::Utc;
    use std::sync::Mutex;

    /// Clock that only moves when told to.
    pub(crate) struct ManualClock {
        now: Mutex<Instant>,
    }

    impl ManualClock {
        pub(crate) fn new() -> Arc<Self> { Arc::new(Self { now: Mutex::new(Instant::now()) }) }

        pub(crate) fn advance(&self, by: Duration) { *self.now.lock().unwrap() += by; }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant { *self.now.lock().unwrap() }
    }

    fn task(user: &UserId, title: &str) -> Task {
        Task {
            id: TaskId::generate(),
            title: title.into(),
            description: None,
            completed: false,
            priority: Priority::Low,
            category: None,
            tags: None,
            user_id: user.clone(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn hit_until_ttl_then_miss() {
        let clock = ManualClock::new();
        let cache = TaskCache::with_clock(Duration::from_secs(60), clock.clone());
        let user = UserId("u1".into());
        let t = task(&user, "A");

        assert!(cache.lookup(&user, t.id).await.is_none());
        cache.store(&user, t.id, &t).await;
        assert_eq!(cache.lookup(&user, t.id).await, Some(t.clone()));

        clock.advance(Duration::from_secs(59));
        assert!(cache.lookup(&user, t.id).await.is_some());
        clock.advance(Duration::from_secs(1));
        assert!(cache.lookup(&user, t.id).await.is_none());
        // passive expiry: still held until overwritten or invalidated
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn store_refreshes_ttl() {
        let clock = ManualClock::new();
        let cache = TaskCache::with_clock(Duration::from_secs(60), clock.clone());
        let user = UserId("u1".into());
        let t = task(&user, "A");
        cache.store(&user, t.id, &t).await;
        clock.advance(Duration::from_secs(50));
        cache.store(&user, t.id, &t).await;
        clock.advance(Duration::from_secs(50));
        assert!(cache.lookup(&user, t.id).await.is_some());
    }

    #[tokio::test]
    async fn key_is_scoped_by_owner() {
        let cache = TaskCache::default();
        let owner = UserId("u1".into());
        let other = UserId("u2".into());
        let t = task(&owner, "A");
        cache.store(&owner, t.id, &t).await;
        assert!(cache.lookup(&other, t.id).await.is_none());
    }

    #[tokio::test]
    async fn invalidate_one_and_all() {
        let cache = TaskCache::default();
        let u1 = UserId("u1".into());
        let u2 = UserId("u2".into());
        let a = task(&u1, "A");
        let b = task(&u2, "B");
        cache.store(&u1, a.id, &a).await;
        cache.store(&u2, b.id, &b).await;

        cache.invalidate(&u1, a.id).await;
        assert!(cache.lookup(&u1, a.id).await.is_none());
        assert!(cache.lookup(&u2, b.id).await.is_some());

        cache.invalidate_all().await;
        assert!(cache.is_empty().await);
    }
}
