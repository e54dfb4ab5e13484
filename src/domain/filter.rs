//! Filter criteria for task listings and their compilation into a
//! parameterized predicate.
//!
//! The compiled [`Predicate`] is an ordered list of conditions. Each one
//! renders to a static SQL fragment with a single `?` placeholder and carries
//! its value separately, so the same predicate drives both the count query
//! and the paged query without any value ever entering the statement text.

use chrono::NaiveDate;

use super::task::{Priority, UserId};

/// Optional, AND-combined constraints on a listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Raw listing query string as sent by clients.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub completed: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl TaskQuery {
    /// Builds the query from decoded `key=value` pairs. The first occurrence
    /// of a key wins; unknown keys are skipped.
    pub fn from_pairs<K: AsRef<str>, V: Into<String>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        let mut q = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "page" => &mut q.page,
                "limit" => &mut q.limit,
                "completed" => &mut q.completed,
                "priority" => &mut q.priority,
                "category" => &mut q.category,
                "tags" => &mut q.tags,
                "startDate" => &mut q.start_date,
                "endDate" => &mut q.end_date,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into());
            }
        }
        q
    }

    /// Values that cannot be coerced are dropped rather than rejected.
    pub fn filter(&self) -> TaskFilter {
        TaskFilter {
            completed: non_empty(&self.completed).and_then(parse_bool),
            priority: non_empty(&self.priority).and_then(|p| p.parse().ok()),
            category: non_empty(&self.category).map(str::to_string),
            tags: non_empty(&self.tags).map(str::to_string),
            start_date: non_empty(&self.start_date).and_then(parse_date),
            end_date: non_empty(&self.end_date).and_then(parse_date),
        }
    }

    pub fn page(&self) -> Option<i64> { non_empty(&self.page).and_then(|p| p.parse().ok()) }

    pub fn limit(&self) -> Option<i64> { non_empty(&self.limit).and_then(|l| l.parse().ok()) }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Owner(UserId),
    Completed(bool),
    Priority(Priority),
    Category(String),
    TagsContain(String),
    CreatedOnOrAfter(NaiveDate),
    CreatedOnOrBefore(NaiveDate),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Bool(bool),
}

impl Condition {
    pub fn clause(&self) -> &'static str {
        match self {
            Condition::Owner(_) => "user_id = ?",
            Condition::Completed(_) => "completed = ?",
            Condition::Priority(_) => "priority = ?",
            Condition::Category(_) => "category = ?",
            // instr keeps `%` and `_` in the needle literal
            Condition::TagsContain(_) => "instr(tags, ?) > 0",
            Condition::CreatedOnOrAfter(_) => "date(created_at) >= ?",
            Condition::CreatedOnOrBefore(_) => "date(created_at) <= ?",
        }
    }

    pub fn param(&self) -> SqlParam {
        match self {
            Condition::Owner(user) => SqlParam::Text(user.0.clone()),
            Condition::Completed(done) => SqlParam::Bool(*done),
            Condition::Priority(p) => SqlParam::Text(p.as_str().to_string()),
            Condition::Category(c) | Condition::TagsContain(c) => SqlParam::Text(c.clone()),
            Condition::CreatedOnOrAfter(d) | Condition::CreatedOnOrBefore(d) => {
                SqlParam::Text(d.format("%Y-%m-%d").to_string())
            }
        }
    }
}

/// Ownership-scoped, AND-combined list of conditions.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    conditions: Vec<Condition>,
}

impl Predicate {
    pub fn compile(user_id: &UserId, filter: &TaskFilter) -> Self {
        let mut conditions = vec![Condition::Owner(user_id.clone())];
        if let Some(done) = filter.completed { conditions.push(Condition::Completed(done)); }
        if let Some(p) = filter.priority { conditions.push(Condition::Priority(p)); }
        if let Some(c) = &filter.category { conditions.push(Condition::Category(c.clone())); }
        if let Some(t) = &filter.tags { conditions.push(Condition::TagsContain(t.clone())); }
        if let Some(d) = filter.start_date { conditions.push(Condition::CreatedOnOrAfter(d)); }
        if let Some(d) = filter.end_date { conditions.push(Condition::CreatedOnOrBefore(d)); }
        Self { conditions }
    }

    pub fn conditions(&self) -> &[Condition] { &self.conditions }

    /// `WHERE` body; placeholders line up with [`Predicate::params`].
    pub fn where_clause(&self) -> String {
        self.conditions.iter().map(Condition::clause).collect::<Vec<_>>().join(" AND ")
    }

    pub fn params(&self) -> Vec<SqlParam> {
        self.conditions.iter().map(Condition::param).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserId { UserId("u1".into()) }

    fn query(pairs: &[(&str, &str)]) -> TaskQuery { TaskQuery::from_pairs(pairs.iter().copied()) }

    #[test]
    fn empty_filter_only_scopes_by_owner() {
        let p = Predicate::compile(&user(), &TaskFilter::default());
        assert_eq!(p.where_clause(), "user_id = ?");
        assert_eq!(p.params(), vec![SqlParam::Text("u1".into())]);
    }

    #[test]
    fn every_criterion_adds_one_bound_condition() {
        let filter = query(&[
            ("completed", "false"),
            ("priority", "high"),
            ("category", "work"),
            ("tags", "urgent"),
            ("startDate", "2024-01-01"),
            ("endDate", "2024-01-31"),
        ])
        .filter();
        let p = Predicate::compile(&user(), &filter);
        assert_eq!(
            p.where_clause(),
            "user_id = ? AND completed = ? AND priority = ? AND category = ? AND instr(tags, ?) > 0 \
             AND date(created_at) >= ? AND date(created_at) <= ?"
        );
        assert_eq!(
            p.params(),
            vec![
                SqlParam::Text("u1".into()),
                SqlParam::Bool(false),
                SqlParam::Text("high".into()),
                SqlParam::Text("work".into()),
                SqlParam::Text("urgent".into()),
                SqlParam::Text("2024-01-01".into()),
                SqlParam::Text("2024-01-31".into()),
            ]
        );
    }

    #[test]
    fn hostile_values_never_reach_statement_text() {
        let filter = query(&[("category", "x' OR '1'='1"), ("tags", "%_")]).filter();
        let p = Predicate::compile(&user(), &filter);
        let sql = p.where_clause();
        assert!(!sql.contains("OR"));
        assert!(!sql.contains('%'));
        assert_eq!(p.params().len(), 3);
    }

    #[test]
    fn malformed_values_are_ignored() {
        let q = query(&[
            ("completed", "yes"),
            ("priority", "urgent"),
            ("startDate", "01/02/2024"),
            ("endDate", ""),
            ("page", "two"),
            ("limit", "-"),
        ]);
        assert_eq!(q.filter(), TaskFilter::default());
        assert_eq!(q.page(), None);
        assert_eq!(q.limit(), None);
    }

    #[test]
    fn repeated_keys_keep_the_first_value() {
        let q = query(&[("priority", "high"), ("priority", "low"), ("sort", "title"), ("page", "2"), ("page", "9")]);
        assert_eq!(q.filter().priority, Some(Priority::High));
        assert_eq!(q.page(), Some(2));
    }

    #[test]
    fn completed_is_tri_state() {
        assert_eq!(query(&[]).filter().completed, None);
        assert_eq!(query(&[("completed", "true")]).filter().completed, Some(true));
        assert_eq!(query(&[("completed", "0")]).filter().completed, Some(false));
    }
}
