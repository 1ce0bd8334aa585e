use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};

use super::{blocking, create, fetch, remove, update, ApiResult, Id};
use crate::models::{Child, Meal};
use crate::store::Store;

pub fn routes() -> Router<Store> {
    Router::new()
        .route("/meals", post(create::<Meal>))
        .route("/meals/", post(create::<Meal>))
        .route("/meals/child/:child_id", get(meals_for_child))
        .route(
            "/meals/:id",
            get(fetch::<Meal>).put(update::<Meal>).delete(remove::<Meal>),
        )
}

async fn meals_for_child(
    State(store): State<Store>,
    Id(child_id): Id,
) -> ApiResult<Json<Vec<Meal>>> {
    let meals = blocking(move || {
        store.ensure_exists::<Child>(child_id)?;
        store.list::<Meal>(&Meal::for_child(child_id))
    })
    .await?;
    Ok(Json(meals))
}
