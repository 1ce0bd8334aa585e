//! Data models
//!
//! Rust structs representing stored entities, their create/update inputs
//! and the query filters each list endpoint accepts.

pub mod time;

mod child;
mod choices;
mod dietary_guideline;
mod ingredient;
mod meal;
mod mood_log;
mod recipe;
mod recipe_ingredient;
mod servings;

use std::collections::HashMap;

use crate::store::{Entity, Filter};
use crate::validation::ValidationError;

pub use child::{Child, ChildCreate, ChildUpdate};
pub use choices::{choice_column, Choice, Gender, MealType, Mood};
pub use dietary_guideline::{DietaryGuideline, DietaryGuidelineCreate, DietaryGuidelineUpdate};
pub use ingredient::{Ingredient, IngredientCreate, IngredientUpdate};
pub use meal::{Meal, MealCreate, MealUpdate};
pub use mood_log::{MoodLog, MoodLogCreate, MoodLogUpdate, TimeRange};
pub use recipe::{Recipe, RecipeCreate, RecipeUpdate};
pub use recipe_ingredient::{RecipeIngredient, RecipeIngredientCreate, RecipeIngredientUpdate};
pub use servings::{FoodGroups, FOOD_GROUP_FIELDS};

/// Query parameters shared by every list endpoint
pub type QueryParams = HashMap<String, String>;

/// An entity whose list endpoint accepts query-string filters
pub trait Listed: Entity {
    fn filter_from_query(params: &QueryParams) -> Result<Filter, ValidationError>;
}
