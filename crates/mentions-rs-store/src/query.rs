//! Composable mention filter rendered to a parameterised SQL predicate.

use crate::model::TimeInterval;
use crate::value::MentionValue;
use rusqlite::types::Value;

/// Accumulated filter conditions over mention records.
///
/// Empty room or user lists mean "no filter" on that column. Bot-authored
/// records are included unless [`MentionQuery::include_bots`] is set to false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionQuery {
    value: Option<String>,
    interval: Option<TimeInterval>,
    rooms: Vec<String>,
    users: Vec<String>,
    include_bots: bool,
}

impl Default for MentionQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl MentionQuery {
    /// A query matching every record of the store's category.
    pub fn new() -> Self {
        Self {
            value: None,
            interval: None,
            rooms: Vec::new(),
            users: Vec::new(),
            include_bots: true,
        }
    }

    /// Restrict to one exact value.
    pub fn for_value<V: MentionValue>(mut self, value: &V) -> Self {
        self.value = Some(value.as_stored());
        self
    }

    /// Restrict to mentions inside `[start, end)`.
    pub fn within(mut self, interval: TimeInterval) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Restrict to the given rooms; an empty list leaves rooms unfiltered.
    pub fn rooms<I, S>(mut self, rooms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rooms = rooms.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict to the given users; an empty list leaves users unfiltered.
    pub fn users<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.users = users.into_iter().map(Into::into).collect();
        self
    }

    /// Include or exclude bot-authored records.
    pub fn include_bots(mut self, include_bots: bool) -> Self {
        self.include_bots = include_bots;
        self
    }

    /// Render the `WHERE` body and its positional parameters for `category`.
    pub(crate) fn to_sql(&self, category: &str) -> SqlPredicate {
        let mut predicate = SqlPredicate::default();
        predicate.push("category = ?", [Value::Text(category.to_string())]);
        if let Some(value) = &self.value {
            predicate.push("value = ?", [Value::Text(value.clone())]);
        }
        if let Some(interval) = &self.interval {
            predicate.push(
                "mention_time >= ? AND mention_time < ?",
                [
                    Value::Integer(interval.start().timestamp_millis()),
                    Value::Integer(interval.end().timestamp_millis()),
                ],
            );
        }
        predicate.push_in("room_name", &self.rooms);
        predicate.push_in("username", &self.users);
        if !self.include_bots {
            predicate.push("is_bot = 0", []);
        }
        predicate
    }
}

/// A SQL condition list joined with `AND`, plus its bound values in order.
#[derive(Debug, Default)]
pub(crate) struct SqlPredicate {
    conditions: Vec<String>,
    pub(crate) params: Vec<Value>,
}

impl SqlPredicate {
    fn push<const N: usize>(&mut self, condition: &str, params: [Value; N]) {
        self.conditions.push(condition.to_string());
        self.params.extend(params);
    }

    fn push_in(&mut self, column: &str, values: &[String]) {
        if values.is_empty() {
            return;
        }
        let placeholders = vec!["?"; values.len()].join(", ");
        self.conditions
            .push(format!("{column} IN ({placeholders})"));
        self.params
            .extend(values.iter().cloned().map(Value::Text));
    }

    /// The joined condition text, suitable after `WHERE`.
    pub(crate) fn clause(&self) -> String {
        self.conditions.join(" AND ")
    }
}
