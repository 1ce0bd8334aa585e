//! Recipe model
//!
//! A recipe with optional descriptive fields and per-serving food groups.
//! Its ingredient lines live in `recipe_ingredients` and go with it.

use rusqlite::Row;
use serde::Serialize;
use serde_json::Value;

use super::{FoodGroups, Listed, QueryParams};
use crate::store::{sql, Columns, Dependent, Entity, Filter, Record};
use crate::validation::{
    non_empty_string, string, FromJson, Patch, QueryReader, ValidationError, Validator,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    pub recipe_id: i64,
    pub recipe_name: String,
    pub recipe_type: Option<String>,
    pub cuisine_type: Option<String>,
    pub dietary_preferences: Option<String>,
    pub cooking_steps: Option<String>,
    #[serde(flatten)]
    pub servings: FoodGroups<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeCreate {
    pub recipe_name: String,
    pub recipe_type: Option<String>,
    pub cuisine_type: Option<String>,
    pub dietary_preferences: Option<String>,
    pub cooking_steps: Option<String>,
    pub servings: FoodGroups<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeUpdate {
    pub recipe_name: Patch<String>,
    pub recipe_type: Patch<String>,
    pub cuisine_type: Patch<String>,
    pub dietary_preferences: Patch<String>,
    pub cooking_steps: Patch<String>,
    pub servings: FoodGroups<Patch<f64>>,
}

/// Optional descriptive text fields, in column order
const TEXT_FIELDS: [&str; 4] = [
    "recipe_type",
    "cuisine_type",
    "dietary_preferences",
    "cooking_steps",
];

impl FromJson for RecipeCreate {
    fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let mut v = Validator::new(body)?;
        let recipe_name = v.required("recipe_name", non_empty_string);
        let [recipe_type, cuisine_type, dietary_preferences, cooking_steps] =
            TEXT_FIELDS.map(|field| v.optional(field, string));
        let servings = FoodGroups::<Option<f64>>::read(&mut v);

        v.finish(|| {
            Some(Self {
                recipe_name: recipe_name?,
                recipe_type,
                cuisine_type,
                dietary_preferences,
                cooking_steps,
                servings,
            })
        })
    }
}

impl FromJson for RecipeUpdate {
    fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let mut v = Validator::new(body)?;
        let recipe_name = v.patch("recipe_name", false, non_empty_string);
        let [recipe_type, cuisine_type, dietary_preferences, cooking_steps] =
            TEXT_FIELDS.map(|field| v.patch(field, true, string));
        let servings = FoodGroups::<Patch<f64>>::read(&mut v, true);

        let update = Self {
            recipe_name,
            recipe_type,
            cuisine_type,
            dietary_preferences,
            cooking_steps,
            servings,
        };
        v.finish(|| Some(update))
    }
}

impl Record for RecipeCreate {
    fn columns(&self) -> Columns {
        let columns = Columns::new()
            .with("recipe_name", self.recipe_name.clone())
            .with("recipe_type", self.recipe_type.clone())
            .with("cuisine_type", self.cuisine_type.clone())
            .with("dietary_preferences", self.dietary_preferences.clone())
            .with("cooking_steps", self.cooking_steps.clone());
        self.servings.columns(columns)
    }
}

impl Record for RecipeUpdate {
    fn columns(&self) -> Columns {
        let columns = Columns::new()
            .with_patch("recipe_name", &self.recipe_name, sql)
            .with_patch("recipe_type", &self.recipe_type, sql)
            .with_patch("cuisine_type", &self.cuisine_type, sql)
            .with_patch("dietary_preferences", &self.dietary_preferences, sql)
            .with_patch("cooking_steps", &self.cooking_steps, sql);
        self.servings.columns(columns)
    }
}

impl Entity for Recipe {
    const NAME: &'static str = "Recipe";
    const TABLE: &'static str = "recipes";
    const ID_COLUMN: &'static str = "recipe_id";
    const CASCADES: &'static [Dependent] = &[Dependent {
        entity: "RecipeIngredient",
        table: "recipe_ingredients",
        column: "recipe_id",
    }];

    type Create = RecipeCreate;
    type Update = RecipeUpdate;

    fn id(&self) -> i64 {
        self.recipe_id
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            recipe_id: row.get("recipe_id")?,
            recipe_name: row.get("recipe_name")?,
            recipe_type: row.get("recipe_type")?,
            cuisine_type: row.get("cuisine_type")?,
            dietary_preferences: row.get("dietary_preferences")?,
            cooking_steps: row.get("cooking_steps")?,
            servings: FoodGroups::from_row(row)?,
        })
    }
}

impl Listed for Recipe {
    fn filter_from_query(params: &QueryParams) -> Result<Filter, ValidationError> {
        let mut q = QueryReader::new(params);
        let ids = q.id_list("ids");
        let filter = Filter::new()
            .id_in("recipe_id", ids)
            .contains("recipe_name", q.text("recipe_name"))
            .equals("recipe_type", q.text("recipe_type"))
            .equals("cuisine_type", q.text("cuisine_type"))
            .equals("dietary_preferences", q.text("dietary_preferences"));
        q.finish()?;

        Ok(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Predicate;
    use serde_json::json;

    #[test]
    fn test_create_requires_non_empty_name() {
        let err = RecipeCreate::from_json(&json!({"recipe_name": ""})).unwrap_err();
        assert_eq!(err.messages("recipe_name"), ["Shorter than minimum length 1."]);
    }

    #[test]
    fn test_create_leaves_absent_fields_null() {
        let recipe = RecipeCreate::from_json(&json!({
            "recipe_name": "Veggie pasta",
            "cuisine_type": "Italian",
            "servings_grain": 2
        }))
        .unwrap();

        assert_eq!(recipe.cuisine_type.as_deref(), Some("Italian"));
        assert_eq!(recipe.recipe_type, None);
        assert_eq!(recipe.servings.servings_grain, Some(2.0));
        assert_eq!(recipe.servings.servings_fruit, None);
    }

    #[test]
    fn test_update_allows_clearing_optional_fields() {
        let update = RecipeUpdate::from_json(&json!({
            "cooking_steps": null,
            "servings_fruit": null
        }))
        .unwrap();
        assert_eq!(update.columns().names(), vec!["cooking_steps", "servings_fruit"]);

        let err = RecipeUpdate::from_json(&json!({"recipe_name": null})).unwrap_err();
        assert_eq!(err.messages("recipe_name"), ["Field may not be null."]);
    }

    #[test]
    fn test_filter_mixes_substring_and_exact_matches() {
        let params: QueryParams = [
            ("recipe_name", "pasta"),
            ("cuisine_type", "Italian"),
            ("unknown", "ignored"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let filter = Recipe::filter_from_query(&params).unwrap();

        assert!(matches!(
            filter.predicates(),
            [
                Predicate::Contains { column: "recipe_name", .. },
                Predicate::Equals { column: "cuisine_type", .. },
            ]
        ));
    }
}
