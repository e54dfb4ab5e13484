use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TaskId(pub Uuid);

impl TaskId {
    pub fn generate() -> Self { Self(Uuid::new_v4()) }
}

impl FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> { Uuid::parse_str(s).map(Self) }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// Identity of the authenticated caller, as resolved by the auth layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority { Low, Medium, High }

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self { Priority::Low => "low", Priority::Medium => "medium", Priority::High => "high" }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: Priority,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// Client payload for task creation. Fields stay loosely typed so that a bad
/// value is reported as a validation error instead of a body rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub tags: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub tags: Option<String>,
}

/// A validated row ready for insertion. `created_at` is assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub id: TaskId,
    pub user_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub category: Option<String>,
    pub tags: Option<String>,
}

/// Validated partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub tags: Option<String>,
}

impl CreateTask {
    pub fn validate(self, id: TaskId, user_id: UserId) -> Result<NewTask, String> {
        let title = match self.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => return Err("title is required".into()),
        };
        let priority = match self.priority.as_deref() {
            Some(p) => p.parse::<Priority>()?,
            None => return Err("priority is required".into()),
        };
        Ok(NewTask { id, user_id, title, description: self.description, priority, category: self.category, tags: self.tags })
    }
}

impl UpdateTask {
    pub fn validate(self) -> Result<TaskChanges, String> {
        let title = match self.title {
            Some(t) if t.trim().is_empty() => return Err("title must not be empty".into()),
            Some(t) => Some(t.trim().to_string()),
            None => None,
        };
        let priority = self.priority.as_deref().map(str::parse::<Priority>).transpose()?;
        Ok(TaskChanges { title, description: self.description, completed: self.completed, priority, category: self.category, tags: self.tags })
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
    pub completion_rate: f64,
}

impl TaskStats {
    pub fn from_counts(total: u64, completed: u64) -> Self {
        let completion_rate = if total == 0 {
            0.0
        } else {
            ((completed as f64 / total as f64) * 100.0 * 100.0).round() / 100.0
        };
        Self { total, completed, pending: total.saturating_sub(completed), completion_rate }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> UserId { UserId("u1".into()) }

    #[test]
    fn create_requires_title_and_known_priority() {
        let missing = CreateTask { title: Some("   ".into()), priority: Some("high".into()), ..Default::default() };
        assert!(missing.validate(TaskId::generate(), owner()).is_err());

        let bad_priority = CreateTask { title: Some("X".into()), priority: Some("urgent".into()), ..Default::default() };
        assert!(bad_priority.validate(TaskId::generate(), owner()).is_err());

        let no_priority = CreateTask { title: Some("X".into()), ..Default::default() };
        assert!(no_priority.validate(TaskId::generate(), owner()).is_err());

        let ok = CreateTask { title: Some(" X ".into()), priority: Some("high".into()), ..Default::default() };
        let new = ok.validate(TaskId::generate(), owner()).unwrap();
        assert_eq!(new.title, "X");
        assert_eq!(new.priority, Priority::High);
    }

    #[test]
    fn update_rejects_blank_title_and_unknown_priority() {
        assert!(UpdateTask { title: Some("".into()), ..Default::default() }.validate().is_err());
        assert!(UpdateTask { priority: Some("HIGH".into()), ..Default::default() }.validate().is_err());
        let changes = UpdateTask { completed: Some(true), ..Default::default() }.validate().unwrap();
        assert_eq!(changes, TaskChanges { completed: Some(true), ..Default::default() });
    }

    #[test]
    fn completion_rate_rounds_to_two_places() {
        assert_eq!(TaskStats::from_counts(0, 0).completion_rate, 0.0);
        let stats = TaskStats::from_counts(3, 1);
        assert_eq!(stats.completion_rate, 33.33);
        assert_eq!(stats.pending, 2);
        assert_eq!(TaskStats::from_counts(3, 2).completion_rate, 66.67);
    }

    #[test]
    fn task_serializes_with_wire_field_names() {
        let task = Task {
            id: TaskId::generate(),
            title: "X".into(),
            description: None,
            completed: false,
            priority: Priority::High,
            category: None,
            tags: Some("a,b".into()),
            user_id: owner(),
            created_at: Utc::now(),
        };
        let v = serde_json::to_value(&task).unwrap();
        for key in ["id", "title", "description", "completed", "priority", "category", "tags", "userId", "createdAt"] {
            assert!(v.get(key).is_some(), "missing {key}");
        }
        assert_eq!(v["priority"], "high");
        assert_eq!(v["userId"], "u1");
    }
}
