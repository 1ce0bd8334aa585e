//! Meal model
//!
//! A meal eaten by a child, with servings per food group.

use chrono::NaiveDateTime;
use rusqlite::Row;
use serde::Serialize;
use serde_json::Value;

use super::{choice_column, time, Child, Choice, FoodGroups, MealType};
use crate::store::{sql, Columns, Entity, Filter, Record, Reference};
use crate::validation::{choice, integer, string, FromJson, Patch, ValidationError, Validator};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Meal {
    pub meal_id: i64,
    pub meal_name: String,
    #[serde(flatten)]
    pub servings: FoodGroups<f64>,
    pub child_id: i64,
    pub meal_type: MealType,
    #[serde(serialize_with = "time::serialize_timestamp")]
    pub created_at: NaiveDateTime,
}

/// Data for logging a meal; missing servings default to zero
#[derive(Debug, Clone, PartialEq)]
pub struct MealCreate {
    pub meal_name: String,
    pub servings: FoodGroups<f64>,
    pub child_id: i64,
    pub meal_type: MealType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MealUpdate {
    pub meal_name: Patch<String>,
    pub servings: FoodGroups<Patch<f64>>,
    pub child_id: Patch<i64>,
    pub meal_type: Patch<MealType>,
}

impl Meal {
    /// All meals of a child, oldest first
    pub fn for_child(child_id: i64) -> Filter {
        Filter::new().equals("child_id", Some(child_id))
    }
}

impl FromJson for MealCreate {
    fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let mut v = Validator::new(body)?;
        let meal_name = v.required("meal_name", string);
        let servings = FoodGroups::<f64>::read(&mut v);
        let child_id = v.required("child_id", integer);
        let meal_type = v.required("meal_type", choice::<MealType>);

        v.finish(|| {
            Some(Self {
                meal_name: meal_name?,
                servings,
                child_id: child_id?,
                meal_type: meal_type?,
            })
        })
    }
}

impl FromJson for MealUpdate {
    fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let mut v = Validator::new(body)?;
        let update = Self {
            meal_name: v.patch("meal_name", false, string),
            servings: FoodGroups::<Patch<f64>>::read(&mut v, false),
            child_id: v.patch("child_id", false, integer),
            meal_type: v.patch("meal_type", false, choice::<MealType>),
        };
        v.finish(|| Some(update))
    }
}

impl Record for MealCreate {
    fn columns(&self) -> Columns {
        let columns = Columns::new().with("meal_name", self.meal_name.clone());
        self.servings
            .columns(columns)
            .with("child_id", self.child_id)
            .with("meal_type", self.meal_type.to_sql())
    }

    fn references(&self) -> Vec<Reference> {
        vec![Reference::to::<Child>(self.child_id)]
    }
}

impl Record for MealUpdate {
    fn columns(&self) -> Columns {
        let columns = Columns::new().with_patch("meal_name", &self.meal_name, sql);
        self.servings
            .columns(columns)
            .with_patch("child_id", &self.child_id, sql)
            .with_patch("meal_type", &self.meal_type, MealType::to_sql)
    }

    fn references(&self) -> Vec<Reference> {
        self.child_id
            .as_set()
            .map(|id| Reference::to::<Child>(*id))
            .into_iter()
            .collect()
    }
}

impl Entity for Meal {
    const NAME: &'static str = "Meal";
    const TABLE: &'static str = "meals";
    const ID_COLUMN: &'static str = "meal_id";
    const CREATED_AT: Option<&'static str> = Some("created_at");

    type Create = MealCreate;
    type Update = MealUpdate;

    fn id(&self) -> i64 {
        self.meal_id
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            meal_id: row.get("meal_id")?,
            meal_name: row.get("meal_name")?,
            servings: FoodGroups::from_row(row)?,
            child_id: row.get("child_id")?,
            meal_type: choice_column(row, "meal_type")?,
            created_at: row.get("created_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_defaults_missing_servings() {
        let meal = MealCreate::from_json(&json!({
            "meal_name": "Porridge",
            "servings_grain": 1,
            "child_id": 1,
            "meal_type": "Breakfast"
        }))
        .unwrap();

        assert_eq!(meal.servings.servings_grain, 1.0);
        assert_eq!(meal.servings.servings_fruit, 0.0);
        assert_eq!(meal.references(), vec![Reference::to::<Child>(1)]);
    }

    #[test]
    fn test_create_rejects_bad_meal_type_and_negative_serving() {
        let err = MealCreate::from_json(&json!({
            "meal_name": "Porridge",
            "servings_fruit": -2,
            "child_id": 1,
            "meal_type": "breakfast"
        }))
        .unwrap_err();

        assert_eq!(
            err.messages("meal_type"),
            ["Must be one of: Breakfast, Lunch, Dinner, Snack, Dessert."]
        );
        assert_eq!(
            err.messages("servings_fruit"),
            ["Must be greater than or equal to 0."]
        );
    }

    #[test]
    fn test_update_servings_may_not_be_null() {
        let err = MealUpdate::from_json(&json!({"servings_fruit": null})).unwrap_err();
        assert_eq!(err.messages("servings_fruit"), ["Field may not be null."]);
    }

    #[test]
    fn test_update_references_only_supplied_child() {
        let update = MealUpdate::from_json(&json!({"meal_name": "Toast"})).unwrap();
        assert!(update.references().is_empty());

        let moved = MealUpdate::from_json(&json!({"child_id": 7})).unwrap();
        assert_eq!(moved.references(), vec![Reference::to::<Child>(7)]);
    }

    #[test]
    fn test_serializes_flat_servings() {
        let meal = Meal {
            meal_id: 3,
            meal_name: "Apple".to_string(),
            servings: FoodGroups {
                servings_fruit: 1.0,
                ..Default::default()
            },
            child_id: 1,
            meal_type: MealType::Snack,
            created_at: time::parse_timestamp("2025-03-01T08:00:00").unwrap(),
        };
        let json = serde_json::to_value(&meal).unwrap();

        assert_eq!(json["meal_id"], 3);
        assert_eq!(json["servings_fruit"], 1.0);
        assert_eq!(json["meal_type"], "Snack");
        assert_eq!(json["created_at"], "2025-03-01T08:00:00.000000");
    }
}
