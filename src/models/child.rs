//! Child model
//!
//! The root entity; meals and mood logs belong to a child and are removed
//! with it.

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Row;
use serde::Serialize;
use serde_json::Value;

use super::{choice_column, time, Choice, Gender, Listed, QueryParams};
use crate::store::{sql, Columns, Dependent, Entity, Filter, Record};
use crate::validation::{
    choice, date, integer_in, string, FromJson, Patch, QueryReader, ValidationError, Validator,
};

const MEALS_PER_DAY_MIN: i64 = 1;
const MEALS_PER_DAY_MAX: i64 = 10;

/// A child profile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Child {
    pub child_id: i64,
    pub name: String,
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
    pub meals_per_day: Option<i64>,
    #[serde(serialize_with = "time::serialize_timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(serialize_with = "time::serialize_timestamp")]
    pub updated_at: NaiveDateTime,
}

/// Data for creating a new child
#[derive(Debug, Clone, PartialEq)]
pub struct ChildCreate {
    pub name: String,
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
    pub meals_per_day: Option<i64>,
}

/// Data for updating a child
#[derive(Debug, Clone, PartialEq)]
pub struct ChildUpdate {
    pub name: Patch<String>,
    pub gender: Patch<Gender>,
    pub date_of_birth: Patch<NaiveDate>,
    pub meals_per_day: Patch<i64>,
}

impl FromJson for ChildCreate {
    fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let mut v = Validator::new(body)?;
        let name = v.required("name", string);
        let gender = v.required("gender", choice::<Gender>);
        let date_of_birth = v.required("date_of_birth", date);
        let meals_per_day = v.optional(
            "meals_per_day",
            integer_in(Some(MEALS_PER_DAY_MIN), Some(MEALS_PER_DAY_MAX)),
        );

        v.finish(|| {
            Some(Self {
                name: name?,
                gender: gender?,
                date_of_birth: date_of_birth?,
                meals_per_day,
            })
        })
    }
}

impl FromJson for ChildUpdate {
    fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let mut v = Validator::new(body)?;
        let update = Self {
            name: v.patch("name", false, string),
            gender: v.patch("gender", false, choice::<Gender>),
            date_of_birth: v.patch("date_of_birth", false, date),
            meals_per_day: v.patch(
                "meals_per_day",
                true,
                integer_in(Some(MEALS_PER_DAY_MIN), Some(MEALS_PER_DAY_MAX)),
            ),
        };
        v.finish(|| Some(update))
    }
}

impl Record for ChildCreate {
    fn columns(&self) -> Columns {
        Columns::new()
            .with("name", self.name.clone())
            .with("gender", self.gender.to_sql())
            .with("date_of_birth", time::date_sql(&self.date_of_birth))
            .with("meals_per_day", self.meals_per_day)
    }
}

impl Record for ChildUpdate {
    fn columns(&self) -> Columns {
        Columns::new()
            .with_patch("name", &self.name, sql)
            .with_patch("gender", &self.gender, Gender::to_sql)
            .with_patch("date_of_birth", &self.date_of_birth, time::date_sql)
            .with_patch("meals_per_day", &self.meals_per_day, sql)
    }
}

impl Entity for Child {
    const NAME: &'static str = "Child";
    const TABLE: &'static str = "children";
    const ID_COLUMN: &'static str = "child_id";
    const CREATED_AT: Option<&'static str> = Some("created_at");
    const UPDATED_AT: Option<&'static str> = Some("updated_at");
    const CASCADES: &'static [Dependent] = &[
        Dependent {
            entity: "Meal",
            table: "meals",
            column: "child_id",
        },
        Dependent {
            entity: "MoodLog",
            table: "mood_logs",
            column: "child_id",
        },
    ];

    type Create = ChildCreate;
    type Update = ChildUpdate;

    fn id(&self) -> i64 {
        self.child_id
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            child_id: row.get("child_id")?,
            name: row.get("name")?,
            gender: choice_column(row, "gender")?,
            date_of_birth: row.get("date_of_birth")?,
            meals_per_day: row.get("meals_per_day")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

impl Listed for Child {
    fn filter_from_query(params: &QueryParams) -> Result<Filter, ValidationError> {
        let mut q = QueryReader::new(params);
        let ids = q.id_list("ids");
        q.finish()?;

        Ok(Filter::new().id_in("child_id", ids))
    }
}
