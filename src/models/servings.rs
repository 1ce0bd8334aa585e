//! Food group serving counts
//!
//! Shared by meals, recipes and dietary guidelines.

use rusqlite::types::FromSql;
use rusqlite::Row;
use serde::Serialize;

use crate::store::Columns;
use crate::validation::{non_negative_number, Patch, Validator};

/// Wire and column names of the five food groups
pub const FOOD_GROUP_FIELDS: [&str; 5] = [
    "servings_fruit",
    "servings_grain",
    "servings_meat_fish_eggs_nuts_seeds",
    "servings_milk_yoghurt_cheese",
    "servings_veg_legumes_beans",
];

/// Serving counts per food group
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FoodGroups<T> {
    pub servings_fruit: T,
    pub servings_grain: T,
    /// Protein
    pub servings_meat_fish_eggs_nuts_seeds: T,
    /// Dairy
    pub servings_milk_yoghurt_cheese: T,
    pub servings_veg_legumes_beans: T,
}

impl<T> FoodGroups<T> {
    /// Build each group from its field name, in [`FOOD_GROUP_FIELDS`] order
    pub fn from_fn(mut f: impl FnMut(&'static str) -> T) -> Self {
        Self {
            servings_fruit: f(FOOD_GROUP_FIELDS[0]),
            servings_grain: f(FOOD_GROUP_FIELDS[1]),
            servings_meat_fish_eggs_nuts_seeds: f(FOOD_GROUP_FIELDS[2]),
            servings_milk_yoghurt_cheese: f(FOOD_GROUP_FIELDS[3]),
            servings_veg_legumes_beans: f(FOOD_GROUP_FIELDS[4]),
        }
    }

    pub fn fields(&self) -> [(&'static str, &T); 5] {
        [
            (FOOD_GROUP_FIELDS[0], &self.servings_fruit),
            (FOOD_GROUP_FIELDS[1], &self.servings_grain),
            (FOOD_GROUP_FIELDS[2], &self.servings_meat_fish_eggs_nuts_seeds),
            (FOOD_GROUP_FIELDS[3], &self.servings_milk_yoghurt_cheese),
            (FOOD_GROUP_FIELDS[4], &self.servings_veg_legumes_beans),
        ]
    }

    pub fn from_row(row: &Row) -> rusqlite::Result<Self>
    where
        T: FromSql,
    {
        Ok(Self {
            servings_fruit: row.get(FOOD_GROUP_FIELDS[0])?,
            servings_grain: row.get(FOOD_GROUP_FIELDS[1])?,
            servings_meat_fish_eggs_nuts_seeds: row.get(FOOD_GROUP_FIELDS[2])?,
            servings_milk_yoghurt_cheese: row.get(FOOD_GROUP_FIELDS[3])?,
            servings_veg_legumes_beans: row.get(FOOD_GROUP_FIELDS[4])?,
        })
    }
}

impl FoodGroups<f64> {
    /// Non-nullable counts, 0.0 when absent
    pub fn read(v: &mut Validator) -> Self {
        Self::from_fn(|field| v.or_default(field, 0.0, non_negative_number))
    }

    pub fn columns(&self, columns: Columns) -> Columns {
        self.fields()
            .into_iter()
            .fold(columns, |cols, (name, value)| cols.with(name, *value))
    }
}

impl FoodGroups<Option<f64>> {
    /// Nullable counts, null when absent
    pub fn read(v: &mut Validator) -> Self {
        Self::from_fn(|field| v.optional(field, non_negative_number))
    }

    pub fn columns(&self, columns: Columns) -> Columns {
        self.fields()
            .into_iter()
            .fold(columns, |cols, (name, value)| cols.with(name, *value))
    }
}

impl FoodGroups<Patch<f64>> {
    pub fn read(v: &mut Validator, nullable: bool) -> Self {
        Self::from_fn(|field| v.patch(field, nullable, non_negative_number))
    }

    pub fn columns(&self, columns: Columns) -> Columns {
        self.fields()
            .into_iter()
            .fold(columns, |cols, (name, patch)| cols.with_patch(name, patch, |n| (*n).into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_read_defaults_to_zero() {
        let body = json!({"servings_fruit": 1.5});
        let mut v = Validator::new(&body).unwrap();
        let groups = FoodGroups::<f64>::read(&mut v);
        assert!(v.finish(|| Some(())).is_ok());

        assert_eq!(groups.servings_fruit, 1.5);
        assert_eq!(groups.servings_grain, 0.0);
        assert_eq!(groups.servings_veg_legumes_beans, 0.0);
    }

    #[test]
    fn test_negative_serving_reported_per_field() {
        let body = json!({"servings_grain": -1, "servings_fruit": "lots"});
        let mut v = Validator::new(&body).unwrap();
        let _ = FoodGroups::<Option<f64>>::read(&mut v);
        let err = v.finish(|| Some(())).unwrap_err();

        assert_eq!(
            err.messages("servings_grain"),
            ["Must be greater than or equal to 0."]
        );
        assert_eq!(err.messages("servings_fruit"), ["Not a valid number."]);
    }

    #[test]
    fn test_serializes_flat_field_names() {
        let groups = FoodGroups::<Option<f64>> {
            servings_fruit: Some(2.0),
            ..Default::default()
        };
        let json = serde_json::to_value(groups).unwrap();
        assert_eq!(json["servings_fruit"], 2.0);
        assert!(json["servings_grain"].is_null());
        assert_eq!(json.as_object().unwrap().len(), 5);
    }

    #[test]
    fn test_patch_columns_skip_absent_groups() {
        let groups = FoodGroups::<Patch<f64>> {
            servings_fruit: Patch::Set(1.0),
            servings_grain: Patch::Null,
            servings_meat_fish_eggs_nuts_seeds: Patch::Absent,
            servings_milk_yoghurt_cheese: Patch::Absent,
            servings_veg_legumes_beans: Patch::Absent,
        };
        let columns = groups.columns(Columns::new());
        assert_eq!(columns.names(), vec!["servings_fruit", "servings_grain"]);
    }
}
