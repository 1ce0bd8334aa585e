//! Ingredient catalog model

use rusqlite::Row;
use serde::Serialize;
use serde_json::Value;

use super::{Listed, QueryParams};
use crate::store::{sql, Columns, Dependent, Entity, Filter, Record};
use crate::validation::{
    non_empty_string, string, FromJson, Patch, QueryReader, ValidationError, Validator,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ingredient {
    pub ingredient_id: i64,
    pub ingredient_name: String,
    pub category: String,
    pub emoji: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngredientCreate {
    pub ingredient_name: String,
    pub category: String,
    pub emoji: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngredientUpdate {
    pub ingredient_name: Patch<String>,
    pub category: Patch<String>,
    pub emoji: Patch<String>,
}

impl FromJson for IngredientCreate {
    fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let mut v = Validator::new(body)?;
        let ingredient_name = v.required("ingredient_name", non_empty_string);
        let category = v.required("category", string);
        let emoji = v.optional("emoji", string);

        v.finish(|| {
            Some(Self {
                ingredient_name: ingredient_name?,
                category: category?,
                emoji,
            })
        })
    }
}

impl FromJson for IngredientUpdate {
    fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let mut v = Validator::new(body)?;
        let update = Self {
            ingredient_name: v.patch("ingredient_name", false, non_empty_string),
            category: v.patch("category", false, string),
            emoji: v.patch("emoji", true, string),
        };
        v.finish(|| Some(update))
    }
}

impl Record for IngredientCreate {
    fn columns(&self) -> Columns {
        Columns::new()
            .with("ingredient_name", self.ingredient_name.clone())
            .with("category", self.category.clone())
            .with("emoji", self.emoji.clone())
    }
}

impl Record for IngredientUpdate {
    fn columns(&self) -> Columns {
        Columns::new()
            .with_patch("ingredient_name", &self.ingredient_name, sql)
            .with_patch("category", &self.category, sql)
            .with_patch("emoji", &self.emoji, sql)
    }
}

impl Entity for Ingredient {
    const NAME: &'static str = "Ingredient";
    const TABLE: &'static str = "ingredients";
    const ID_COLUMN: &'static str = "ingredient_id";
    const UNIQUE: &'static [&'static str] = &["ingredient_name"];
    const RESTRICTS: &'static [Dependent] = &[Dependent {
        entity: "RecipeIngredient",
        table: "recipe_ingredients",
        column: "ingredient_id",
    }];

    type Create = IngredientCreate;
    type Update = IngredientUpdate;

    fn id(&self) -> i64 {
        self.ingredient_id
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            ingredient_id: row.get("ingredient_id")?,
            ingredient_name: row.get("ingredient_name")?,
            category: row.get("category")?,
            emoji: row.get("emoji")?,
        })
    }
}

impl Listed for Ingredient {
    fn filter_from_query(params: &QueryParams) -> Result<Filter, ValidationError> {
        let mut q = QueryReader::new(params);
        let filter = Filter::new()
            .id_in("ingredient_id", q.id_list("ids"))
            .equals("category", q.text("category"))
            .contains("ingredient_name", q.text("ingredient_name"));
        q.finish()?;

        Ok(filter)
    }
}
