use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use super::{blocking, create, fetch, list, remove, update, ApiResult, Id, Params};
use crate::models::{Child, MoodLog, TimeRange};
use crate::store::{Store, StoreError};

pub fn routes() -> Router<Store> {
    Router::new()
        .route("/mood_logs", get(list::<MoodLog>).post(create::<MoodLog>))
        .route("/mood_logs/", get(list::<MoodLog>).post(create::<MoodLog>))
        .route("/mood_logs/:child_id", get(logs_for_child))
        .route("/mood_logs/latest/:child_id", get(latest_log))
        .route("/mood_logs/range/:child_id", get(logs_in_range))
        .route(
            "/mood_logs/entry/:id",
            get(fetch::<MoodLog>)
                .put(update::<MoodLog>)
                .delete(remove::<MoodLog>),
        )
}

async fn logs_for_child(
    State(store): State<Store>,
    Id(child_id): Id,
) -> ApiResult<Json<Vec<MoodLog>>> {
    let logs = blocking(move || {
        store.ensure_exists::<Child>(child_id)?;
        store.list::<MoodLog>(&MoodLog::for_child(child_id))
    })
    .await?;
    Ok(Json(logs))
}

async fn latest_log(State(store): State<Store>, Id(child_id): Id) -> ApiResult<Json<MoodLog>> {
    let log = blocking(move || {
        store.ensure_exists::<Child>(child_id)?;
        store
            .first::<MoodLog>(&MoodLog::latest_for(child_id))?
            .ok_or_else(|| StoreError::NoMatch(format!("No mood logs found for child {}", child_id)))
    })
    .await?;
    Ok(Json(log))
}

async fn logs_in_range(
    State(store): State<Store>,
    Id(child_id): Id,
    Params(params): Params,
) -> ApiResult<Json<Vec<MoodLog>>> {
    let range = TimeRange::from_query(&params)?;
    let logs = blocking(move || {
        store.ensure_exists::<Child>(child_id)?;
        store.list::<MoodLog>(&MoodLog::in_range(child_id, &range))
    })
    .await?;
    Ok(Json(logs))
}
