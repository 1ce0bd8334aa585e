//! Recipe ingredient model
//!
//! Junction between recipes and ingredients. Rows are read through a join so
//! responses carry the recipe and ingredient names.

use rusqlite::Row;
use serde::Serialize;
use serde_json::Value;

use super::{Ingredient, Listed, QueryParams, Recipe};
use crate::store::{sql, Columns, Entity, Filter, Record, Reference};
use crate::validation::{
    integer, non_negative_integer, FromJson, Patch, QueryReader, ValidationError, Validator,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeIngredient {
    pub recipe_ingredient_id: i64,
    pub recipe_id: i64,
    pub ingredient_id: i64,
    pub grams: Option<i64>,
    pub recipe_name: Option<String>,
    pub ingredient_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeIngredientCreate {
    pub recipe_id: i64,
    pub ingredient_id: i64,
    pub grams: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeIngredientUpdate {
    pub recipe_id: Patch<i64>,
    pub ingredient_id: Patch<i64>,
    pub grams: Patch<i64>,
}

impl FromJson for RecipeIngredientCreate {
    fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let mut v = Validator::new(body)?;
        let recipe_id = v.required("recipe_id", integer);
        let ingredient_id = v.required("ingredient_id", integer);
        let grams = v.optional("grams", non_negative_integer);

        v.finish(|| {
            Some(Self {
                recipe_id: recipe_id?,
                ingredient_id: ingredient_id?,
                grams,
            })
        })
    }
}

impl FromJson for RecipeIngredientUpdate {
    fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let mut v = Validator::new(body)?;
        let update = Self {
            recipe_id: v.patch("recipe_id", false, integer),
            ingredient_id: v.patch("ingredient_id", false, integer),
            grams: v.patch("grams", true, non_negative_integer),
        };
        v.finish(|| Some(update))
    }
}

impl Record for RecipeIngredientCreate {
    fn columns(&self) -> Columns {
        Columns::new()
            .with("recipe_id", self.recipe_id)
            .with("ingredient_id", self.ingredient_id)
            .with("grams", self.grams)
    }

    fn references(&self) -> Vec<Reference> {
        vec![
            Reference::to::<Recipe>(self.recipe_id),
            Reference::to::<Ingredient>(self.ingredient_id),
        ]
    }
}

impl Record for RecipeIngredientUpdate {
    fn columns(&self) -> Columns {
        Columns::new()
            .with_patch("recipe_id", &self.recipe_id, sql)
            .with_patch("ingredient_id", &self.ingredient_id, sql)
            .with_patch("grams", &self.grams, sql)
    }

    fn references(&self) -> Vec<Reference> {
        let recipe = self.recipe_id.as_set().map(|id| Reference::to::<Recipe>(*id));
        let ingredient = self
            .ingredient_id
            .as_set()
            .map(|id| Reference::to::<Ingredient>(*id));
        recipe.into_iter().chain(ingredient).collect()
    }
}

impl Entity for RecipeIngredient {
    const NAME: &'static str = "RecipeIngredient";
    const TABLE: &'static str = "recipe_ingredients";
    const ID_COLUMN: &'static str = "recipe_ingredient_id";
    const SOURCE: &'static str = "(SELECT ri.recipe_ingredient_id, ri.recipe_id, \
        ri.ingredient_id, ri.grams, r.recipe_name, i.ingredient_name \
        FROM recipe_ingredients ri \
        LEFT JOIN recipes r ON r.recipe_id = ri.recipe_id \
        LEFT JOIN ingredients i ON i.ingredient_id = ri.ingredient_id)";

    type Create = RecipeIngredientCreate;
    type Update = RecipeIngredientUpdate;

    fn id(&self) -> i64 {
        self.recipe_ingredient_id
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            recipe_ingredient_id: row.get("recipe_ingredient_id")?,
            recipe_id: row.get("recipe_id")?,
            ingredient_id: row.get("ingredient_id")?,
            grams: row.get("grams")?,
            recipe_name: row.get("recipe_name")?,
            ingredient_name: row.get("ingredient_name")?,
        })
    }
}

impl Listed for RecipeIngredient {
    fn filter_from_query(params: &QueryParams) -> Result<Filter, ValidationError> {
        let mut q = QueryReader::new(params);
        let filter = Filter::new()
            .id_in("recipe_ingredient_id", q.id_list("ids"))
            .id_in("recipe_id", q.id_list("recipe_id"))
            .id_in("ingredient_id", q.id_list("ingredient_id"));
        q.finish()?;

        Ok(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::types::Value as SqlValue;
    use serde_json::json;

    #[test]
    fn test_create_references_both_parents() {
        let line = RecipeIngredientCreate::from_json(&json!({
            "recipe_id": 1,
            "ingredient_id": 4,
            "grams": 120
        }))
        .unwrap();

        assert_eq!(
            line.references(),
            vec![Reference::to::<Recipe>(1), Reference::to::<Ingredient>(4)]
        );
    }

    #[test]
    fn test_update_references_only_supplied_parents() {
        let both = RecipeIngredientUpdate::from_json(&json!({"recipe_id": 2, "ingredient_id": 9}))
            .unwrap();
        assert_eq!(
            both.references(),
            vec![Reference::to::<Recipe>(2), Reference::to::<Ingredient>(9)]
        );

        let grams_only = RecipeIngredientUpdate::from_json(&json!({"grams": 40})).unwrap();
        assert!(grams_only.references().is_empty());
    }

    #[test]
    fn test_grams_must_be_non_negative_integer() {
        let err = RecipeIngredientCreate::from_json(&json!({
            "recipe_id": 1,
            "ingredient_id": 4,
            "grams": -5
        }))
        .unwrap_err();
        assert_eq!(err.messages("grams"), ["Must be greater than or equal to 0."]);

        let err = RecipeIngredientUpdate::from_json(&json!({"grams": 1.5})).unwrap_err();
        assert_eq!(err.messages("grams"), ["Not a valid integer."]);
    }

    #[test]
    fn test_names_are_read_only() {
        let err = RecipeIngredientUpdate::from_json(&json!({"recipe_name": "Soup"})).unwrap_err();
        assert_eq!(err.messages("recipe_name"), ["Unknown field."]);
    }

    #[test]
    fn test_filter_accepts_parent_id_lists() {
        let params: QueryParams = [("recipe_id".to_string(), "1,2".to_string())]
            .into_iter()
            .collect();
        let (sql, values) = RecipeIngredient::filter_from_query(&params)
            .unwrap()
            .to_sql(RecipeIngredient::ID_COLUMN);

        assert!(sql.starts_with(" WHERE recipe_id IN (SELECT value FROM json_each(?))"));
        assert_eq!(values, vec![SqlValue::Text("[1,2]".to_string())]);
    }
}
