//! Fixed value sets
//!
//! Gender, meal type and mood are stored and sent as their exact,
//! case-sensitive names.

use rusqlite::types::{Type, Value as SqlValue};
use rusqlite::Row;
use serde::Serialize;

/// An enum restricted to a fixed, case-sensitive set of names
pub trait Choice: Sized + Copy + 'static {
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;

    fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == s)
    }

    /// Error message naming the allowed set
    fn invalid_message() -> String {
        let names: Vec<&str> = Self::ALL.iter().map(Choice::as_str).collect();
        format!("Must be one of: {}.", names.join(", "))
    }

    fn to_sql(&self) -> SqlValue {
        SqlValue::Text(self.as_str().to_string())
    }
}

/// Read a choice column, failing on values outside the set
pub fn choice_column<C: Choice>(row: &Row, column: &str) -> rusqlite::Result<C> {
    let raw: String = row.get(column)?;
    C::parse(&raw).ok_or_else(|| {
        let index = row.as_ref().column_index(column).unwrap_or_default();
        rusqlite::Error::FromSqlConversionFailure(
            index,
            Type::Text,
            format!("unexpected {} value {:?}", column, raw).into(),
        )
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Gender {
    M,
    F,
}

impl Choice for Gender {
    const ALL: &'static [Self] = &[Gender::M, Gender::F];

    fn as_str(&self) -> &'static str {
        match self {
            Gender::M => "M",
            Gender::F => "F",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    Dessert,
}

impl Choice for MealType {
    const ALL: &'static [Self] = &[
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
        MealType::Dessert,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snack => "Snack",
            MealType::Dessert => "Dessert",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Laugh,
    Happy,
    Neutral,
    Sad,
    Angry,
}

impl Choice for Mood {
    const ALL: &'static [Self] = &[Mood::Laugh, Mood::Happy, Mood::Neutral, Mood::Sad, Mood::Angry];

    fn as_str(&self) -> &'static str {
        match self {
            Mood::Laugh => "laugh",
            Mood::Happy => "happy",
            Mood::Neutral => "neutral",
            Mood::Sad => "sad",
            Mood::Angry => "angry",
        }
    }
}
