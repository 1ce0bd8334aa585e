//! Recipe catalog routes
//!
//! Recipes, ingredients, recipe ingredient lines and dietary guidelines all
//! live under `/recipes`.

use axum::routing::get;
use axum::Router;

use super::{create, fetch, list, remove, update};
use crate::models::{DietaryGuideline, Ingredient, Recipe, RecipeIngredient};
use crate::store::Store;

pub fn routes() -> Router<Store> {
    Router::new()
        .route("/recipes", get(list::<Recipe>).post(create::<Recipe>))
        .route("/recipes/", get(list::<Recipe>).post(create::<Recipe>))
        .route(
            "/recipes/:id",
            get(fetch::<Recipe>)
                .put(update::<Recipe>)
                .delete(remove::<Recipe>),
        )
        .route(
            "/recipes/ingredients",
            get(list::<Ingredient>).post(create::<Ingredient>),
        )
        .route(
            "/recipes/ingredients/:id",
            get(fetch::<Ingredient>)
                .put(update::<Ingredient>)
                .delete(remove::<Ingredient>),
        )
        .route(
            "/recipes/recipe_ingredients",
            get(list::<RecipeIngredient>).post(create::<RecipeIngredient>),
        )
        .route(
            "/recipes/recipe_ingredients/:id",
            get(fetch::<RecipeIngredient>)
                .put(update::<RecipeIngredient>)
                .delete(remove::<RecipeIngredient>),
        )
        .route(
            "/recipes/dietary-guidelines",
            get(list::<DietaryGuideline>).post(create::<DietaryGuideline>),
        )
        .route(
            "/recipes/dietary-guidelines/:id",
            get(fetch::<DietaryGuideline>)
                .put(update::<DietaryGuideline>)
                .delete(remove::<DietaryGuideline>),
        )
}

#[cfg(test)]
mod tests {
    use super::super::tests::{app, send};
    use axum::http::{Method, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};

    async fn post(app: &Router, uri: &str, body: Value) -> Value {
        let (status, created) = send(app, Method::POST, uri, Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "{}", created);
        created
    }

    #[tokio::test]
    async fn test_recipe_filters() {
        let app = app();
        post(&app, "/recipes/", json!({"recipe_name": "Veggie Pasta", "cuisine_type": "Italian"})).await;
        post(&app, "/recipes/", json!({"recipe_name": "Pasta Bake", "cuisine_type": "British"})).await;
        post(&app, "/recipes/", json!({"recipe_name": "Fried Rice", "cuisine_type": "Chinese"})).await;

        let (status, body) = send(&app, Method::GET, "/recipes/?recipe_name=PASTA", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (_, body) = send(
            &app,
            Method::GET,
            "/recipes?recipe_name=pasta&cuisine_type=Italian",
            None,
        )
        .await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["recipe_name"], "Veggie Pasta");
        assert!(body[0]["servings_fruit"].is_null());
    }

    #[tokio::test]
    async fn test_recipe_ingredient_lines_carry_names_and_cascade() {
        let app = app();
        let recipe = post(&app, "/recipes/", json!({"recipe_name": "Stew"})).await;
        let carrot = post(
            &app,
            "/recipes/ingredients",
            json!({"ingredient_name": "Carrot", "category": "Vegetable", "emoji": "🥕"}),
        )
        .await;
        let line = post(
            &app,
            "/recipes/recipe_ingredients",
            json!({
                "recipe_id": recipe["recipe_id"],
                "ingredient_id": carrot["ingredient_id"],
                "grams": 80
            }),
        )
        .await;
        assert_eq!(line["recipe_name"], "Stew");
        assert_eq!(line["ingredient_name"], "Carrot");

        let (status, body) = send(
            &app,
            Method::DELETE,
            &format!("/recipes/ingredients/{}", carrot["ingredient_id"]),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], 409);

        let (status, _) = send(
            &app,
            Method::DELETE,
            &format!("/recipes/{}", recipe["recipe_id"]),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, lines) = send(
            &app,
            Method::GET,
            &format!("/recipes/recipe_ingredients?recipe_id={}", recipe["recipe_id"]),
            None,
        )
        .await;
        assert_eq!(lines, json!([]));

        let (status, _) = send(
            &app,
            Method::DELETE,
            &format!("/recipes/ingredients/{}", carrot["ingredient_id"]),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_recipe_ingredient_requires_existing_parents() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/recipes/recipe_ingredients",
            Some(json!({"recipe_id": 3, "ingredient_id": 4})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Recipe with id 3 not found");
    }

    #[tokio::test]
    async fn test_duplicate_ingredient_conflicts() {
        let app = app();
        let apple = json!({"ingredient_name": "Apple", "category": "Fruit"});
        post(&app, "/recipes/ingredients", apple.clone()).await;

        let (status, body) = send(&app, Method::POST, "/recipes/ingredients", Some(apple)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["status"], "Conflict");
    }

    #[tokio::test]
    async fn test_guidelines_filter_by_age() {
        let app = app();
        post(
            &app,
            "/recipes/dietary-guidelines",
            json!({"gender": "F", "age_group": "2-3", "min_age": 2, "max_age": 3, "servings_fruit": 1}),
        )
        .await;
        post(
            &app,
            "/recipes/dietary-guidelines",
            json!({"gender": "F", "age_group": "4-8", "min_age": 4, "max_age": 8, "servings_fruit": 1.5}),
        )
        .await;

        let (status, body) = send(
            &app,
            Method::GET,
            "/recipes/dietary-guidelines?gender=F&age=4",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["age_group"], "4-8");
        assert_eq!(body[0]["servings_fruit"], 1.5);

        let (status, _) = send(&app, Method::GET, "/recipes/dietary-guidelines?age=-1", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_guideline_update_keeps_age_order() {
        let app = app();
        let guideline = post(
            &app,
            "/recipes/dietary-guidelines",
            json!({"gender": "M", "age_group": "9-11", "min_age": 9, "max_age": 11}),
        )
        .await;

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/recipes/dietary-guidelines/{}", guideline["guideline_id"]),
            Some(json!({"max_age": 5})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["errors"]["max_age"].is_array());
    }
}
