//! Mood log model
//!
//! Timestamped mood entries per child, queryable by time range and latest.

use chrono::NaiveDateTime;
use rusqlite::Row;
use serde::Serialize;
use serde_json::Value;

use super::{choice_column, time, Child, Choice, Listed, Mood, QueryParams};
use crate::store::{sql, Columns, Entity, Filter, Order, Record, Reference};
use crate::validation::{
    choice, integer, string, FromJson, Patch, QueryReader, ValidationError, Validator,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodLog {
    pub mood_log_id: i64,
    pub child_id: i64,
    pub mood: Mood,
    pub notes: Option<String>,
    #[serde(serialize_with = "time::serialize_timestamp")]
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoodLogCreate {
    pub child_id: i64,
    pub mood: Mood,
    pub notes: Option<String>,
}

/// Only the mood and its notes can change after logging
#[derive(Debug, Clone, PartialEq)]
pub struct MoodLogUpdate {
    pub mood: Patch<Mood>,
    pub notes: Patch<String>,
}

/// Inclusive creation-time window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeRange {
    /// Read `start` and `end`; both are required and `start` may not pass `end`
    pub fn from_query(params: &QueryParams) -> Result<Self, ValidationError> {
        let mut q = QueryReader::new(params);
        let start = q.timestamp("start", true);
        let end = q.timestamp("end", true);

        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                q.error("end", "Must not be earlier than start.");
            }
        }
        q.finish()?;

        match (start, end) {
            (Some(start), Some(end)) => Ok(Self { start, end }),
            _ => Err(ValidationError::single("start", "Invalid time range.")),
        }
    }
}

impl MoodLog {
    pub fn for_child(child_id: i64) -> Filter {
        Filter::new().equals("child_id", Some(child_id))
    }

    /// Newest entry first; equal timestamps resolve to the highest id
    pub fn latest_for(child_id: i64) -> Filter {
        Self::for_child(child_id)
            .order_by(Order::Descending("created_at"))
            .limit(1)
    }

    /// `start` rounds up to stored microsecond precision
    pub fn in_range(child_id: i64, range: &TimeRange) -> Filter {
        Self::for_child(child_id)
            .between(
                "created_at",
                time::timestamp_sql(&time::ceil_micros(&range.start)),
                time::timestamp_sql(&range.end),
            )
            .order_by(Order::Ascending("created_at"))
    }
}

impl FromJson for MoodLogCreate {
    fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let mut v = Validator::new(body)?;
        let child_id = v.required("child_id", integer);
        let mood = v.required("mood", choice::<Mood>);
        let notes = v.optional("notes", string);

        v.finish(|| {
            Some(Self {
                child_id: child_id?,
                mood: mood?,
                notes,
            })
        })
    }
}

impl FromJson for MoodLogUpdate {
    fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let mut v = Validator::new(body)?;
        let update = Self {
            mood: v.patch("mood", false, choice::<Mood>),
            notes: v.patch("notes", true, string),
        };
        v.finish(|| Some(update))
    }
}

impl Record for MoodLogCreate {
    fn columns(&self) -> Columns {
        Columns::new()
            .with("child_id", self.child_id)
            .with("mood", self.mood.to_sql())
            .with("notes", self.notes.clone())
    }

    fn references(&self) -> Vec<Reference> {
        vec![Reference::to::<Child>(self.child_id)]
    }
}

impl Record for MoodLogUpdate {
    fn columns(&self) -> Columns {
        Columns::new()
            .with_patch("mood", &self.mood, Mood::to_sql)
            .with_patch("notes", &self.notes, sql)
    }
}

impl Entity for MoodLog {
    const NAME: &'static str = "MoodLog";
    const TABLE: &'static str = "mood_logs";
    const ID_COLUMN: &'static str = "mood_log_id";
    const CREATED_AT: Option<&'static str> = Some("created_at");

    type Create = MoodLogCreate;
    type Update = MoodLogUpdate;

    fn id(&self) -> i64 {
        self.mood_log_id
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            mood_log_id: row.get("mood_log_id")?,
            child_id: row.get("child_id")?,
            mood: choice_column(row, "mood")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
        })
    }
}

impl Listed for MoodLog {
    fn filter_from_query(params: &QueryParams) -> Result<Filter, ValidationError> {
        let mut q = QueryReader::new(params);
        let ids = q.id_list("ids");
        let child_id = q.integer("child_id", None, None);
        q.finish()?;

        Ok(Filter::new()
            .id_in("mood_log_id", ids)
            .equals("child_id", child_id))
    }
}
